mod market_routes;
mod milestone_routes;
mod token_routes;

pub use market_routes::configure as configure_market_routes;
pub use milestone_routes::configure as configure_milestone_routes;
pub use token_routes::configure as configure_token_routes;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    configure_market_routes(cfg);
    configure_milestone_routes(cfg);
    configure_token_routes(cfg);
}
