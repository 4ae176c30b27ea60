use actix_web::web;

use crate::handlers::market_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/market")
            .route("/status", web::get().to(market_handlers::status))
            .route("/events", web::get().to(market_handlers::events))
            .route("/price/{unit}", web::get().to(market_handlers::spot_price))
            .route("/quote/buy/{amount}", web::get().to(market_handlers::quote_buy))
            .route("/quote/sell/{amount}", web::get().to(market_handlers::quote_sell))
            .route("/buy", web::post().to(market_handlers::buy))
            .route("/sell", web::post().to(market_handlers::sell))
            .route("/milestones", web::post().to(market_handlers::add_milestone))
            .route("/milestones/{idx}", web::get().to(market_handlers::milestone_at))
            .route("/presale/allow", web::post().to(market_handlers::allow_presale))
            .route("/presale/disallow", web::post().to(market_handlers::disallow_presale))
            .route("/presale/{account}", web::get().to(market_handlers::presale_status))
            .route("/shutdown", web::post().to(market_handlers::shutdown)),
    );
}
