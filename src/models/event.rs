use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{wei_string, AccountId, Wei};

/// Outcome events, appended to the market's ordered log only when the
/// enclosing operation commits. `at` is the clock reading at commit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketEvent {
    TokensBought {
        purchaser: AccountId,
        amount: u64,
        #[serde(with = "wei_string")]
        value: Wei,
        at: i64,
    },
    TokensSold {
        seller: AccountId,
        amount: u64,
        #[serde(with = "wei_string")]
        value: Wei,
        at: i64,
    },
    TokensBurned {
        amount: u64,
        at: i64,
    },
    MilestoneLaunched {
        milestone: Uuid,
        at: i64,
    },
    Airdropped {
        recipient: AccountId,
        amount: u64,
        at: i64,
    },
}
