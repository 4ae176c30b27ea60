use serde::Serialize;
use std::collections::HashSet;

use super::{AccountId, MarketError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Before,
    Presale,
    Sale,
}

/// Decides whether order entry is currently open for a given account.
/// Presale runs over `[presale_start, sale_start)` and only admits
/// allowlisted accounts; from `sale_start` on everyone may trade.
#[derive(Debug, Clone)]
pub struct SalePeriodGate {
    presale_start: i64,
    sale_start: i64,
    allowlist: HashSet<AccountId>,
}

impl SalePeriodGate {
    pub fn new(now: i64, presale_start: i64, sale_start: i64) -> Result<Self, MarketError> {
        if presale_start <= now {
            return Err(MarketError::InvalidArgument(
                "wrong presale start".to_string(),
            ));
        }
        if sale_start <= presale_start {
            return Err(MarketError::InvalidArgument("wrong sale start".to_string()));
        }
        Ok(Self {
            presale_start,
            sale_start,
            allowlist: HashSet::new(),
        })
    }

    pub fn presale_start(&self) -> i64 {
        self.presale_start
    }

    pub fn sale_start(&self) -> i64 {
        self.sale_start
    }

    pub fn phase_at(&self, now: i64) -> Phase {
        if now < self.presale_start {
            Phase::Before
        } else if now < self.sale_start {
            Phase::Presale
        } else {
            Phase::Sale
        }
    }

    pub fn is_presale_period(&self, now: i64) -> bool {
        self.phase_at(now) == Phase::Presale
    }

    pub fn is_sale_period(&self, now: i64) -> bool {
        self.phase_at(now) == Phase::Sale
    }

    pub fn can_transact(&self, account: &AccountId, now: i64) -> bool {
        match self.phase_at(now) {
            Phase::Before => false,
            Phase::Presale => self.is_allowed(account),
            Phase::Sale => true,
        }
    }

    pub fn is_allowed(&self, account: &AccountId) -> bool {
        self.allowlist.contains(account)
    }

    pub fn allow(&mut self, account: &AccountId) -> Result<(), MarketError> {
        if account.is_null() {
            return Err(MarketError::InvalidArgument(
                "account cannot be empty".to_string(),
            ));
        }
        self.allowlist.insert(account.clone());
        Ok(())
    }

    pub fn disallow(&mut self, account: &AccountId) -> Result<(), MarketError> {
        if account.is_null() {
            return Err(MarketError::InvalidArgument(
                "account cannot be empty".to_string(),
            ));
        }
        self.allowlist.remove(account);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_000_000;

    fn gate() -> SalePeriodGate {
        // presale opens in 10s, sale a minute later
        SalePeriodGate::new(NOW, NOW + 10, NOW + 70).unwrap()
    }

    #[test]
    fn test_construction_rejects_presale_in_the_past_or_now() {
        assert!(SalePeriodGate::new(NOW, NOW - 1, NOW + 70).is_err());
        assert!(SalePeriodGate::new(NOW, NOW, NOW + 70).is_err());
    }

    #[test]
    fn test_construction_rejects_sale_before_presale() {
        assert!(SalePeriodGate::new(NOW, NOW + 10, NOW + 10).is_err());
        assert!(SalePeriodGate::new(NOW, NOW + 10, NOW - 60).is_err());
    }

    #[test]
    fn test_phase_boundaries() {
        let gate = gate();

        assert_eq!(gate.phase_at(NOW), Phase::Before);
        assert_eq!(gate.phase_at(NOW + 9), Phase::Before);
        // presale start is inclusive
        assert_eq!(gate.phase_at(NOW + 10), Phase::Presale);
        assert_eq!(gate.phase_at(NOW + 69), Phase::Presale);
        // sale start is inclusive
        assert_eq!(gate.phase_at(NOW + 70), Phase::Sale);
        assert_eq!(gate.phase_at(NOW + 7000), Phase::Sale);
    }

    #[test]
    fn test_presale_and_sale_predicates() {
        let gate = gate();

        assert!(!gate.is_presale_period(NOW));
        assert!(gate.is_presale_period(NOW + 30));
        assert!(!gate.is_presale_period(NOW + 120));

        assert!(!gate.is_sale_period(NOW));
        assert!(!gate.is_sale_period(NOW + 30));
        assert!(gate.is_sale_period(NOW + 120));
    }

    #[test]
    fn test_allowlist_round_trip() {
        let mut gate = gate();
        let alice = AccountId::new("alice");

        assert!(!gate.is_allowed(&alice));
        gate.allow(&alice).unwrap();
        assert!(gate.is_allowed(&alice));
        gate.disallow(&alice).unwrap();
        assert!(!gate.is_allowed(&alice));
    }

    #[test]
    fn test_allowlist_rejects_empty_account() {
        let mut gate = gate();
        assert!(gate.allow(&AccountId::new("")).is_err());
        assert!(gate.disallow(&AccountId::new(" ")).is_err());
    }

    #[test]
    fn test_can_transact() {
        let mut gate = gate();
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");
        gate.allow(&alice).unwrap();

        // nobody before presale
        assert!(!gate.can_transact(&alice, NOW));
        // allowlisted only during presale
        assert!(gate.can_transact(&alice, NOW + 30));
        assert!(!gate.can_transact(&bob, NOW + 30));
        // everyone once the sale opens
        assert!(gate.can_transact(&alice, NOW + 70));
        assert!(gate.can_transact(&bob, NOW + 70));
    }
}
