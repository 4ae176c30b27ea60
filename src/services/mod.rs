mod market_service;
pub mod milestones;
mod token_ledger;

pub use market_service::{
    BuyReceipt, ContractInfo, MarketService, MarketStatus, MilestoneInfo, RewardBalances,
    SellReceipt, MARKET_ACCOUNT,
};
pub use token_ledger::TokenLedger;
