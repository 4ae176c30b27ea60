use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::config::MarketConfig;
use crate::models::{wei_string, AccountId, MarketError, MarketEvent, Phase, SalePeriodGate, Wei};
use crate::services::milestones::{
    AirdropMilestone, BurnMilestone, LaunchOutcome, MilestoneContract, MilestoneList,
};
use crate::services::TokenLedger;
use crate::traits::Clock;
use crate::utils::bonding_curve::BondingCurve;

/// Account under which the market holds its own token custody.
pub const MARKET_ACCOUNT: &str = "market";

#[derive(Debug, Serialize)]
pub struct BuyReceipt {
    pub amount: u64,
    #[serde(with = "wei_string")]
    pub value: Wei,
    #[serde(with = "wei_string")]
    pub refund: Wei,
}

#[derive(Debug, Serialize)]
pub struct SellReceipt {
    pub amount: u64,
    #[serde(with = "wei_string")]
    pub value: Wei,
}

#[derive(Debug, Serialize)]
pub struct MarketStatus {
    pub tokens_bought: u64,
    #[serde(with = "wei_string")]
    pub balance: Wei,
    pub phase: Phase,
    pub presale_start: i64,
    pub sale_start: i64,
    pub milestone_count: usize,
    pub current_milestone_idx: usize,
    pub closed: bool,
}

#[derive(Debug, Serialize)]
pub struct MilestoneInfo {
    pub idx: usize,
    #[serde(with = "wei_string")]
    pub start_price: Wei,
    pub contract: Option<Uuid>,
    pub activated: bool,
}

#[derive(Debug, Serialize)]
pub struct ContractInfo {
    pub kind: &'static str,
    pub deployer: AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burn_percent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RewardBalances {
    pub balance: u64,
    pub airdropped: u64,
}

/// Everything a settlement may touch. Cloned wholesale at the start of
/// each mutating operation; the clone replaces the live state only when
/// the operation succeeds, which gives every public entry point
/// all-effects-or-none semantics.
#[derive(Clone)]
struct MarketState {
    tokens_bought: u64,
    balance: Wei,
    gate: SalePeriodGate,
    milestones: MilestoneList,
    contracts: HashMap<Uuid, MilestoneContract>,
    token: TokenLedger,
    purchases: HashMap<AccountId, u64>,
    events: Vec<MarketEvent>,
    closed: bool,
}

/// Order-entry surface of the token sale: prices orders against the
/// bonding curve, keeps custody of received value, and drives the
/// milestone schedule after each settled buy.
pub struct MarketService {
    state: Mutex<MarketState>,
    curve: BondingCurve,
    clock: Arc<dyn Clock>,
    admin: AccountId,
    market_account: AccountId,
}

impl MarketService {
    pub fn new(config: &MarketConfig, clock: Arc<dyn Clock>) -> Result<Self, MarketError> {
        let market_account = AccountId::new(MARKET_ACCOUNT);
        let gate = SalePeriodGate::new(clock.now(), config.presale_start, config.sale_start)?;

        let mut token = TokenLedger::new(
            &config.token_name,
            &config.token_symbol,
            market_account.clone(),
            config.total_supply,
            market_account.clone(),
        )?;
        for (recipient, amount) in &config.distributions {
            token.transfer(&market_account, recipient, *amount)?;
        }
        info!(
            "market token {} ({}) minted: supply {}, custody {}",
            token.name(),
            token.symbol(),
            token.total_supply(),
            token.balance_of(&market_account)
        );

        Ok(Self {
            state: Mutex::new(MarketState {
                tokens_bought: 0,
                balance: 0,
                gate,
                milestones: MilestoneList::new(),
                contracts: HashMap::new(),
                token,
                purchases: HashMap::new(),
                events: Vec::new(),
                closed: false,
            }),
            curve: BondingCurve::new(config.unit_price),
            clock,
            admin: config.admin.clone(),
            market_account,
        })
    }

    /// Fills up to `max_tokens` against `value`, refunding any surplus.
    /// When the budget does not cover the full request, the fill shrinks
    /// to what the budget affords; a fill below `min_tokens` aborts the
    /// whole order.
    pub fn buy(
        &self,
        buyer: &AccountId,
        max_tokens: u64,
        min_tokens: u64,
        value: Wei,
    ) -> Result<BuyReceipt, MarketError> {
        if max_tokens == 0 || min_tokens == 0 {
            return Err(MarketError::InvalidArgument("must be > 0".to_string()));
        }
        let now = self.clock.now();
        self.commit(|state| {
            Self::ensure_open(state)?;
            match state.gate.phase_at(now) {
                Phase::Before => {
                    return Err(MarketError::PhaseViolation("not sale period".to_string()))
                }
                Phase::Presale if !state.gate.is_allowed(buyer) => {
                    return Err(MarketError::PhaseViolation("presale not allowed".to_string()))
                }
                _ => {}
            }

            let cost = self.curve.cost_to_buy(state.tokens_bought, max_tokens)?;
            let fill = if value >= cost {
                max_tokens
            } else {
                self.curve.max_units_affordable(state.tokens_bought, value)?
            };
            if fill < min_tokens {
                return Err(MarketError::SlippageViolation("less than min".to_string()));
            }
            let charge = self.curve.cost_to_buy(state.tokens_bought, fill)?;
            let refund = value - charge;

            state.token.transfer(&self.market_account, buyer, fill)?;
            state.tokens_bought += fill;
            state.balance = state
                .balance
                .checked_add(charge)
                .ok_or(MarketError::Overflow)?;
            *state.purchases.entry(buyer.clone()).or_insert(0) += fill;
            info!(
                "{} bought {} tokens for {} wei ({} wei refunded)",
                buyer, fill, charge, refund
            );
            state.events.push(MarketEvent::TokensBought {
                purchaser: buyer.clone(),
                amount: fill,
                value: charge,
                at: now,
            });

            // milestone side effects run last so a failing launch takes the
            // whole settlement down with it
            self.advance_milestone(state, now)?;

            Ok(BuyReceipt {
                amount: fill,
                value: charge,
                refund,
            })
        })
    }

    /// Sells `amount` tokens back to the curve. Never advances milestones:
    /// thresholds are only crossed going forward.
    pub fn sell(
        &self,
        seller: &AccountId,
        amount: u64,
        min_value: Wei,
    ) -> Result<SellReceipt, MarketError> {
        if amount == 0 || min_value == 0 {
            return Err(MarketError::InvalidArgument("must be > 0".to_string()));
        }
        let now = self.clock.now();
        self.commit(|state| {
            Self::ensure_open(state)?;
            if state.token.balance_of(seller) < amount {
                return Err(MarketError::InsufficientBalance(
                    "not enough tokens".to_string(),
                ));
            }
            let proceeds = self.curve.proceeds_from_sell(state.tokens_bought, amount)?;
            if proceeds < min_value {
                return Err(MarketError::SlippageViolation(
                    "value out less than min".to_string(),
                ));
            }
            state
                .token
                .transfer_from(&self.market_account, seller, &self.market_account, amount)?;
            state.tokens_bought -= amount;
            state.balance = state
                .balance
                .checked_sub(proceeds)
                .ok_or(MarketError::Overflow)?;
            info!("{} sold {} tokens for {} wei", seller, amount, proceeds);
            state.events.push(MarketEvent::TokensSold {
                seller: seller.clone(),
                amount,
                value: proceeds,
                at: now,
            });
            Ok(SellReceipt {
                amount,
                value: proceeds,
            })
        })
    }

    pub fn quote_buy(&self, amount: u64) -> Result<Wei, MarketError> {
        self.read(|state| self.curve.cost_to_buy(state.tokens_bought, amount))
    }

    pub fn quote_sell(&self, amount: u64) -> Result<Wei, MarketError> {
        self.read(|state| self.curve.proceeds_from_sell(state.tokens_bought, amount))
    }

    pub fn spot_price(&self, unit: u64) -> Wei {
        self.curve.spot_price(unit)
    }

    pub fn status(&self) -> MarketStatus {
        let now = self.clock.now();
        self.read(|state| MarketStatus {
            tokens_bought: state.tokens_bought,
            balance: state.balance,
            phase: state.gate.phase_at(now),
            presale_start: state.gate.presale_start(),
            sale_start: state.gate.sale_start(),
            milestone_count: state.milestones.count(),
            current_milestone_idx: state.milestones.current_idx(),
            closed: state.closed,
        })
    }

    pub fn events(&self) -> Vec<MarketEvent> {
        self.read(|state| state.events.clone())
    }

    pub fn milestone_at(&self, idx: usize) -> Result<MilestoneInfo, MarketError> {
        self.read(|state| {
            state
                .milestones
                .get(idx)
                .map(|entry| MilestoneInfo {
                    idx,
                    start_price: entry.start_price,
                    contract: entry.contract,
                    activated: entry.activated,
                })
                .ok_or_else(|| MarketError::NotFound("milestone".to_string()))
        })
    }

    /// Admin-only. Attaches a deployed milestone contract at the given
    /// threshold price.
    pub fn add_milestone(
        &self,
        caller: &AccountId,
        start_price: Wei,
        contract_id: Uuid,
    ) -> Result<usize, MarketError> {
        self.ensure_admin(caller)?;
        self.commit(|state| {
            Self::ensure_open(state)?;
            if !contract_id.is_nil() && !state.contracts.contains_key(&contract_id) {
                return Err(MarketError::NotFound("milestone contract".to_string()));
            }
            let spot_next = self.curve.spot_price(state.tokens_bought + 1);
            state.milestones.append(start_price, contract_id, spot_next)?;
            let idx = state.milestones.count() - 1;
            info!("milestone {} added at price {}", idx, start_price);
            Ok(idx)
        })
    }

    pub fn deploy_burn_milestone(
        &self,
        deployer: &AccountId,
        burn_percent: u64,
    ) -> Result<Uuid, MarketError> {
        let contract = BurnMilestone::new(deployer.clone(), burn_percent)?;
        self.commit(|state| {
            let id = Uuid::new_v4();
            state.contracts.insert(id, MilestoneContract::Burn(contract));
            info!("burn milestone {} deployed ({}%)", id, burn_percent);
            Ok(id)
        })
    }

    pub fn deploy_airdrop_milestone(
        &self,
        deployer: &AccountId,
        reward_name: &str,
        reward_symbol: &str,
        reward_supply: u64,
    ) -> Result<Uuid, MarketError> {
        self.commit(|state| {
            let id = Uuid::new_v4();
            let own = contract_account(&id);
            let contract =
                AirdropMilestone::new(deployer.clone(), &own, reward_name, reward_symbol, reward_supply)?;
            state
                .contracts
                .insert(id, MilestoneContract::Airdrop(contract));
            info!(
                "airdrop milestone {} deployed with {} reward tokens",
                id, reward_supply
            );
            Ok(id)
        })
    }

    pub fn milestone_contract_info(&self, id: Uuid) -> Result<ContractInfo, MarketError> {
        self.read(|state| match state.contracts.get(&id) {
            Some(MilestoneContract::Burn(burn)) => Ok(ContractInfo {
                kind: "burn",
                deployer: burn.deployer.clone(),
                burn_percent: Some(burn.burn_percent),
                started: None,
            }),
            Some(MilestoneContract::Airdrop(airdrop)) => Ok(ContractInfo {
                kind: "airdrop",
                deployer: airdrop.deployer.clone(),
                burn_percent: None,
                started: Some(airdrop.started),
            }),
            None => Err(MarketError::NotFound("milestone contract".to_string())),
        })
    }

    pub fn claim_airdrop(&self, id: Uuid, account: &AccountId) -> Result<u64, MarketError> {
        let now = self.clock.now();
        self.commit(|state| {
            let purchased = state.purchases.get(account).copied().unwrap_or(0);
            let own = contract_account(&id);
            let contract = state
                .contracts
                .get_mut(&id)
                .ok_or_else(|| MarketError::NotFound("milestone contract".to_string()))?;
            match contract {
                MilestoneContract::Airdrop(airdrop) => {
                    let amount = airdrop.claim(&own, account, purchased)?;
                    info!("{} claimed {} reward tokens from {}", account, amount, id);
                    state.events.push(MarketEvent::Airdropped {
                        recipient: account.clone(),
                        amount,
                        at: now,
                    });
                    Ok(amount)
                }
                MilestoneContract::Burn(_) => Err(MarketError::InvalidArgument(
                    "not an airdrop milestone".to_string(),
                )),
            }
        })
    }

    /// Deployer-only. Sweeps the unclaimed reward pool back and retires
    /// the airdrop instance; its id stops resolving afterwards.
    pub fn finish_milestone(&self, id: Uuid, caller: &AccountId) -> Result<u64, MarketError> {
        self.commit(|state| {
            let own = contract_account(&id);
            let contract = state
                .contracts
                .get_mut(&id)
                .ok_or_else(|| MarketError::NotFound("milestone contract".to_string()))?;
            match contract {
                MilestoneContract::Airdrop(airdrop) => {
                    let swept = airdrop.finish(&own, caller)?;
                    state.contracts.remove(&id);
                    info!("milestone {} finished, {} reward tokens swept", id, swept);
                    Ok(swept)
                }
                MilestoneContract::Burn(_) => Err(MarketError::InvalidArgument(
                    "not an airdrop milestone".to_string(),
                )),
            }
        })
    }

    pub fn reward_balances(&self, id: Uuid, account: &AccountId) -> Result<RewardBalances, MarketError> {
        self.read(|state| match state.contracts.get(&id) {
            Some(MilestoneContract::Airdrop(airdrop)) => Ok(RewardBalances {
                balance: airdrop.reward_balance_of(account),
                airdropped: airdrop.airdropped_to(account),
            }),
            Some(MilestoneContract::Burn(_)) => Err(MarketError::InvalidArgument(
                "not an airdrop milestone".to_string(),
            )),
            None => Err(MarketError::NotFound("milestone contract".to_string())),
        })
    }

    pub fn allow_presale(&self, caller: &AccountId, account: &AccountId) -> Result<(), MarketError> {
        self.ensure_admin(caller)?;
        self.commit(|state| {
            Self::ensure_open(state)?;
            state.gate.allow(account)
        })
    }

    pub fn disallow_presale(
        &self,
        caller: &AccountId,
        account: &AccountId,
    ) -> Result<(), MarketError> {
        self.ensure_admin(caller)?;
        self.commit(|state| {
            Self::ensure_open(state)?;
            state.gate.disallow(account)
        })
    }

    pub fn is_presale_allowed(&self, account: &AccountId) -> bool {
        self.read(|state| state.gate.is_allowed(account))
    }

    /// Admin-only. Sweeps the whole custody balance to the admin and
    /// closes the market for good.
    pub fn shutdown(&self, caller: &AccountId) -> Result<Wei, MarketError> {
        self.ensure_admin(caller)?;
        self.commit(|state| {
            Self::ensure_open(state)?;
            let swept = state.balance;
            state.balance = 0;
            state.closed = true;
            info!("market shut down, {} wei swept to {}", swept, self.admin);
            Ok(swept)
        })
    }

    // --- token collaborator surface ---

    pub fn approve(
        &self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u64,
    ) -> Result<(), MarketError> {
        if owner.is_null() || spender.is_null() {
            return Err(MarketError::InvalidArgument(
                "account cannot be empty".to_string(),
            ));
        }
        self.commit(|state| {
            state.token.approve(owner, spender, amount);
            Ok(())
        })
    }

    pub fn token_balance(&self, account: &AccountId) -> u64 {
        self.read(|state| state.token.balance_of(account))
    }

    pub fn token_supply(&self) -> u64 {
        self.read(|state| state.token.total_supply())
    }

    // --- internals ---

    /// Fires at most one due milestone for the new cumulative position.
    /// The activated flag flips before the contract runs, so the same
    /// entry can never fire twice.
    fn advance_milestone(&self, state: &mut MarketState, now: i64) -> Result<(), MarketError> {
        let spot = self.curve.spot_price(state.tokens_bought);
        let idx = match state.milestones.next_due(spot) {
            Some(idx) => idx,
            None => return Ok(()),
        };
        let id = state
            .milestones
            .get(idx)
            .and_then(|entry| entry.contract)
            .ok_or_else(|| MarketError::NotFound("milestone contract".to_string()))?;
        state.milestones.activate(idx);

        let own = contract_account(&id);
        let contract = state
            .contracts
            .get_mut(&id)
            .ok_or_else(|| MarketError::NotFound("milestone contract".to_string()))?;
        match contract.launch(&own, &mut state.token, &self.market_account)? {
            LaunchOutcome::Burned { amount } => {
                state.contracts.remove(&id);
                info!("milestone {} burned {} tokens", id, amount);
                state.events.push(MarketEvent::TokensBurned { amount, at: now });
            }
            LaunchOutcome::AirdropStarted => {
                info!("milestone {} airdrop started", id);
            }
        }
        state.events.push(MarketEvent::MilestoneLaunched {
            milestone: id,
            at: now,
        });
        Ok(())
    }

    fn ensure_admin(&self, caller: &AccountId) -> Result<(), MarketError> {
        if caller != &self.admin {
            return Err(MarketError::NotAuthorized(
                "caller is not the owner".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_open(state: &MarketState) -> Result<(), MarketError> {
        if state.closed {
            return Err(MarketError::PhaseViolation("market closed".to_string()));
        }
        Ok(())
    }

    fn commit<T>(
        &self,
        op: impl FnOnce(&mut MarketState) -> Result<T, MarketError>,
    ) -> Result<T, MarketError> {
        let mut live = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut working = live.clone();
        let result = op(&mut working)?;
        *live = working;
        Ok(result)
    }

    fn read<T>(&self, op: impl FnOnce(&MarketState) -> T) -> T {
        let live = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        op(&live)
    }
}

/// Custody account of a milestone contract instance.
fn contract_account(id: &Uuid) -> AccountId {
    AccountId::new(format!("milestone:{}", id))
}
