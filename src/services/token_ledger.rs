use std::collections::HashMap;

use crate::models::{AccountId, MarketError};

/// In-memory fungible-token ledger standing in for the external token
/// collaborator. Lives inside the market state so that ledger mutations
/// commit or roll back together with the rest of a settlement.
///
/// `owner` is the single holder of the ledger's administrative
/// capability; burn and ownership transfer check it explicitly.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    owner: AccountId,
    total_supply: u64,
    balances: HashMap<AccountId, u64>,
    allowances: HashMap<AccountId, HashMap<AccountId, u64>>,
}

impl TokenLedger {
    /// Mints `total_supply` units to `initial_holder` with `owner` holding
    /// the administrative capability.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        owner: AccountId,
        total_supply: u64,
        initial_holder: AccountId,
    ) -> Result<Self, MarketError> {
        if total_supply == 0 {
            return Err(MarketError::InvalidArgument(
                "wrong total supply".to_string(),
            ));
        }
        if owner.is_null() || initial_holder.is_null() {
            return Err(MarketError::InvalidArgument(
                "account cannot be empty".to_string(),
            ));
        }
        let mut balances = HashMap::new();
        balances.insert(initial_holder, total_supply);
        Ok(Self {
            name: name.into(),
            symbol: symbol.into(),
            owner,
            total_supply,
            balances,
            allowances: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), MarketError> {
        if to.is_null() {
            return Err(MarketError::InvalidArgument(
                "account cannot be empty".to_string(),
            ));
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(MarketError::InsufficientBalance(
                "not enough tokens".to_string(),
            ));
        }
        self.balances.insert(from.clone(), from_balance - amount);
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: u64) {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u64 {
        self.allowances
            .get(owner)
            .and_then(|per_spender| per_spender.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Allowance-gated transfer on behalf of `from`, consuming the spent
    /// allowance.
    pub fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), MarketError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(MarketError::NotAuthorized("amount not allowed".to_string()));
        }
        self.transfer(from, to, amount)?;
        self.allowances
            .entry(from.clone())
            .or_default()
            .insert(spender.clone(), allowed - amount);
        Ok(())
    }

    /// Owner-only. Removes `amount` from `account` and from the total
    /// supply.
    pub fn burn(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: u64,
    ) -> Result<(), MarketError> {
        self.ensure_owner(caller)?;
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(MarketError::InsufficientBalance(
                "not enough tokens".to_string(),
            ));
        }
        self.balances.insert(account.clone(), balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Owner-only hand-over of the administrative capability.
    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<(), MarketError> {
        self.ensure_owner(caller)?;
        if new_owner.is_null() {
            return Err(MarketError::InvalidArgument(
                "account cannot be empty".to_string(),
            ));
        }
        self.owner = new_owner;
        Ok(())
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), MarketError> {
        if caller != &self.owner {
            return Err(MarketError::NotAuthorized(
                "caller is not the owner".to_string(),
            ));
        }
        Ok(())
    }
}
