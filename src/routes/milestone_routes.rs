use actix_web::web;

use crate::handlers::milestone_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/milestones")
            .route("", web::post().to(milestone_handlers::deploy))
            .route("/{id}", web::get().to(milestone_handlers::info_handler))
            .route("/{id}/claim", web::post().to(milestone_handlers::claim))
            .route("/{id}/finish", web::post().to(milestone_handlers::finish))
            .route(
                "/{id}/rewards/{account}",
                web::get().to(milestone_handlers::reward_balances),
            ),
    );
}
