use actix_web::web;
mod handlers;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(handlers::connect)
            .service(handlers::disconnect)
            .service(handlers::balances)
            .service(handlers::transfer),
    );
}
