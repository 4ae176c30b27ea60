pub mod market_handlers;
pub mod milestone_handlers;
pub mod token_handlers;
