use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{AccountId, MarketError, Wei};
use crate::services::TokenLedger;

/// One slot of the milestone schedule. Index 0 is the implicit genesis
/// entry: threshold 0, no contract, already activated.
#[derive(Debug, Clone)]
pub struct MilestoneEntry {
    pub start_price: Wei,
    pub contract: Option<Uuid>,
    pub activated: bool,
}

/// Append-only milestone schedule with an explicit cursor. Thresholds are
/// non-decreasing and only entries at or below the cursor are activated;
/// the cursor advances by at most one per settled buy.
#[derive(Debug, Clone)]
pub struct MilestoneList {
    entries: Vec<MilestoneEntry>,
    current_idx: usize,
}

impl MilestoneList {
    pub fn new() -> Self {
        Self {
            entries: vec![MilestoneEntry {
                start_price: 0,
                contract: None,
                activated: true,
            }],
            current_idx: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn current_idx(&self) -> usize {
        self.current_idx
    }

    pub fn get(&self, idx: usize) -> Option<&MilestoneEntry> {
        self.entries.get(idx)
    }

    /// Appends a milestone. `spot_next` is the spot price of the next
    /// sellable unit; a threshold below it would be retroactively due the
    /// moment it is added, so it is rejected.
    pub fn append(
        &mut self,
        start_price: Wei,
        contract: Uuid,
        spot_next: Wei,
    ) -> Result<(), MarketError> {
        if contract.is_nil() {
            return Err(MarketError::InvalidArgument(
                "contract id cannot be nil".to_string(),
            ));
        }
        if self
            .entries
            .iter()
            .any(|entry| entry.contract == Some(contract))
        {
            return Err(MarketError::InvalidArgument(
                "contract already attached".to_string(),
            ));
        }
        if start_price < spot_next {
            return Err(MarketError::OrderingViolation("wrong price".to_string()));
        }
        let last = &self.entries[self.entries.len() - 1];
        if start_price < last.start_price {
            return Err(MarketError::OrderingViolation(
                "start price is less than last".to_string(),
            ));
        }
        self.entries.push(MilestoneEntry {
            start_price,
            contract: Some(contract),
            activated: false,
        });
        Ok(())
    }

    /// Index of the next milestone whose threshold `spot` has reached, if
    /// any. Never looks past `current_idx + 1`.
    pub fn next_due(&self, spot: Wei) -> Option<usize> {
        let idx = self.current_idx + 1;
        self.entries
            .get(idx)
            .filter(|entry| spot >= entry.start_price)
            .map(|_| idx)
    }

    /// Flips the entry's activated flag and moves the cursor onto it. Must
    /// only be called with an index returned by `next_due`.
    pub fn activate(&mut self, idx: usize) {
        if let Some(entry) = self.entries.get_mut(idx) {
            entry.activated = true;
            self.current_idx = idx;
        }
    }
}

/// Result of a milestone launch, telling the orchestrator whether the
/// contract has fully discharged and must be removed from the registry.
#[derive(Debug, PartialEq, Eq)]
pub enum LaunchOutcome {
    Burned { amount: u64 },
    AirdropStarted,
}

/// Burns a fixed percentage of the market's own token balance, reducing
/// total supply. Discharges in one shot.
#[derive(Debug, Clone)]
pub struct BurnMilestone {
    pub deployer: AccountId,
    pub burn_percent: u64,
    pub requires_token_ownership: bool,
}

impl BurnMilestone {
    pub fn new(deployer: AccountId, burn_percent: u64) -> Result<Self, MarketError> {
        if burn_percent == 0 || burn_percent >= 100 {
            return Err(MarketError::InvalidArgument(
                "wrong burn percentage".to_string(),
            ));
        }
        if deployer.is_null() {
            return Err(MarketError::InvalidArgument(
                "account cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            deployer,
            burn_percent,
            requires_token_ownership: true,
        })
    }

    /// Borrows the ledger's administrative capability from the market,
    /// burns, and hands the capability straight back.
    fn launch(
        &self,
        own: &AccountId,
        token: &mut TokenLedger,
        market: &AccountId,
    ) -> Result<u64, MarketError> {
        token.transfer_ownership(market, own.clone())?;
        let balance = token.balance_of(market);
        let amount = (balance as u128 * self.burn_percent as u128 / 100) as u64;
        token.burn(own, market, amount)?;
        token.transfer_ownership(own, market.clone())?;
        Ok(amount)
    }
}

/// Pays reward tokens out of a dedicated fixed-supply pool, proportional
/// to each account's cumulative market purchases. Stays resident after
/// launch to service claims; `finish` sweeps the leftover pool back to
/// the deployer and retires it.
#[derive(Debug, Clone)]
pub struct AirdropMilestone {
    pub deployer: AccountId,
    pub started: bool,
    reward: TokenLedger,
    airdropped: HashMap<AccountId, u64>,
}

impl AirdropMilestone {
    pub fn new(
        deployer: AccountId,
        own: &AccountId,
        reward_name: impl Into<String>,
        reward_symbol: impl Into<String>,
        reward_supply: u64,
    ) -> Result<Self, MarketError> {
        if deployer.is_null() {
            return Err(MarketError::InvalidArgument(
                "account cannot be empty".to_string(),
            ));
        }
        let reward = TokenLedger::new(
            reward_name,
            reward_symbol,
            deployer.clone(),
            reward_supply,
            own.clone(),
        )?;
        Ok(Self {
            deployer,
            started: false,
            reward,
            airdropped: HashMap::new(),
        })
    }

    /// `purchased_total` is the claimer's cumulative market purchase
    /// count; the entitlement is whatever has not been claimed yet.
    pub fn claim(
        &mut self,
        own: &AccountId,
        account: &AccountId,
        purchased_total: u64,
    ) -> Result<u64, MarketError> {
        if !self.started {
            return Err(MarketError::NotStarted);
        }
        let already = self.airdropped.get(account).copied().unwrap_or(0);
        let entitled = purchased_total.saturating_sub(already);
        if entitled == 0 {
            return Err(MarketError::NothingToClaim);
        }
        self.reward.transfer(own, account, entitled)?;
        *self.airdropped.entry(account.clone()).or_insert(0) += entitled;
        Ok(entitled)
    }

    pub fn airdropped_to(&self, account: &AccountId) -> u64 {
        self.airdropped.get(account).copied().unwrap_or(0)
    }

    pub fn reward_balance_of(&self, account: &AccountId) -> u64 {
        self.reward.balance_of(account)
    }

    /// Deployer-only. Returns the unclaimed pool that was swept back; the
    /// caller retires the instance afterwards.
    pub fn finish(&mut self, own: &AccountId, caller: &AccountId) -> Result<u64, MarketError> {
        if caller != &self.deployer {
            return Err(MarketError::NotAuthorized(
                "caller is not the owner".to_string(),
            ));
        }
        let leftover = self.reward.balance_of(own);
        if leftover > 0 {
            self.reward.transfer(own, caller, leftover)?;
        }
        Ok(leftover)
    }
}

/// Tagged dispatch over the milestone contract variants.
#[derive(Debug, Clone)]
pub enum MilestoneContract {
    Burn(BurnMilestone),
    Airdrop(AirdropMilestone),
}

impl MilestoneContract {
    /// The one-shot milestone side effect.
    pub fn launch(
        &mut self,
        own: &AccountId,
        token: &mut TokenLedger,
        market: &AccountId,
    ) -> Result<LaunchOutcome, MarketError> {
        match self {
            MilestoneContract::Burn(burn) => {
                let amount = burn.launch(own, token, market)?;
                Ok(LaunchOutcome::Burned { amount })
            }
            MilestoneContract::Airdrop(airdrop) => {
                airdrop.started = true;
                Ok(LaunchOutcome::AirdropStarted)
            }
        }
    }
}
