use actix_web::web;

use crate::handlers::token_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/token")
            .route("/approve", web::post().to(token_handlers::approve))
            .route("/balance/{account}", web::get().to(token_handlers::balance))
            .route("/supply", web::get().to(token_handlers::supply)),
    );
}
