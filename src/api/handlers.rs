use actix_web::{get, post, web, HttpResponse};

use crate::errors::CustomError;
use crate::models::api_response::success_response;
use crate::models::transfer::{TransferIntent, TransferRequest};
use crate::services::session_service::SessionService;

#[post("/session/connect")]
async fn connect(sessions: web::Data<SessionService>) -> Result<HttpResponse, CustomError> {
    let handle = sessions.connect().await?;
    Ok(success_response(handle.session.clone()))
}

#[post("/session/disconnect")]
async fn disconnect(sessions: web::Data<SessionService>) -> Result<HttpResponse, CustomError> {
    sessions.disconnect().await;
    Ok(success_response(()))
}

#[get("/balances")]
async fn balances(sessions: web::Data<SessionService>) -> Result<HttpResponse, CustomError> {
    let handle = sessions.current().await?;
    let snapshot = handle.balances.refresh(handle.session.account, None).await;
    // A newer refresh may have completed while this one ran; serve the winner.
    let snapshot = handle.balances.latest().await.unwrap_or(snapshot);
    Ok(success_response(snapshot))
}

#[post("/transfer")]
async fn transfer(
    sessions: web::Data<SessionService>,
    transfer_req: web::Json<TransferRequest>,
) -> Result<HttpResponse, CustomError> {
    let handle = sessions.current().await?;
    let intent = TransferIntent::new(&transfer_req.recipient, &transfer_req.amount)?;
    let outcome = handle
        .transfers
        .execute_transfer(handle.session.account, &intent)
        .await?;
    Ok(success_response(outcome))
}
