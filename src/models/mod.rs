mod account;
mod error;
mod event;
mod sale_period;
mod wei;

pub use account::AccountId;
pub use error::{ErrorResponse, MarketError};
pub use event::MarketEvent;
pub use sale_period::{Phase, SalePeriodGate};
pub use wei::{wei_string, Wei};
