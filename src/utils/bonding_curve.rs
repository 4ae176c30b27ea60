use crate::models::{MarketError, Wei};

/// Linear-marginal-price bonding curve: the k-th unit ever sold costs
/// `k * unit_price`, so the cost of a range is an arithmetic series and
/// total cost grows with the square of cumulative units sold.
///
/// All arithmetic is exact and integer-only. Amounts of the native
/// currency are wei-scaled `u128`; token amounts are `u64`.
pub struct BondingCurve {
    pub unit_price: Wei,
}

impl BondingCurve {
    pub fn new(unit_price: Wei) -> Self {
        Self { unit_price }
    }

    /// Marginal price of the `unit`-th cumulative unit (1-indexed).
    pub fn spot_price(&self, unit: u64) -> Wei {
        (unit as u128).saturating_mul(self.unit_price)
    }

    /// Exact cost of buying `amount` units starting from `sold` cumulative
    /// units: sum of spot prices for units `sold+1 ..= sold+amount`.
    pub fn cost_to_buy(&self, sold: u64, amount: u64) -> Result<Wei, MarketError> {
        if amount == 0 {
            return Err(MarketError::InvalidArgument("must be > 0".to_string()));
        }
        let steps = unit_steps(sold, amount).ok_or(MarketError::Overflow)?;
        self.unit_price
            .checked_mul(steps)
            .ok_or(MarketError::Overflow)
    }

    /// Exact proceeds of selling `amount` units back at `sold` cumulative
    /// units: sum of spot prices for units `sold-amount+1 ..= sold`.
    /// Mirrors `cost_to_buy`, so an immediate buy-then-sell of the same
    /// amount is value-neutral.
    pub fn proceeds_from_sell(&self, sold: u64, amount: u64) -> Result<Wei, MarketError> {
        if amount == 0 {
            return Err(MarketError::InvalidArgument("must be > 0".to_string()));
        }
        if amount > sold {
            return Err(MarketError::InvalidArgument(
                "exceeds tokens sold".to_string(),
            ));
        }
        self.cost_to_buy(sold - amount, amount)
    }

    /// Largest `n` with `cost_to_buy(sold, n) <= budget`, 0 if even one
    /// unit is unaffordable.
    ///
    /// Solves n^2 + (2S+1)n - 2*(budget/U) = 0 for the positive root, then
    /// re-verifies the floor boundary: the integer square root only
    /// approximates the real root, so the closed form can land one unit off.
    pub fn max_units_affordable(&self, sold: u64, budget: Wei) -> Result<u64, MarketError> {
        let affordable_steps = budget / self.unit_price;
        let b = 2 * (sold as u128) + 1;
        let disc = b
            .checked_mul(b)
            .and_then(|bb| bb.checked_add(affordable_steps.checked_mul(8)?))
            .ok_or(MarketError::Overflow)?;
        let root = integer_sqrt(disc);
        let mut n = (root.saturating_sub(b) / 2) as u64;

        while unit_steps(sold, n + 1).ok_or(MarketError::Overflow)? <= affordable_steps {
            n += 1;
        }
        while n > 0 && unit_steps(sold, n).ok_or(MarketError::Overflow)? > affordable_steps {
            n -= 1;
        }
        Ok(n)
    }
}

/// `amount * (2*sold + amount + 1) / 2` — the range sum in units of the
/// unit price. The product is always even, so the halving is exact.
fn unit_steps(sold: u64, amount: u64) -> Option<u128> {
    let n = amount as u128;
    n.checked_mul(2 * (sold as u128) + n + 1).map(|p| p / 2)
}

// Integer square root using Newton's method
fn integer_sqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let mut x = n / 2 + 1;
    let mut y = (x + n / x) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0.00001 of the native currency per price step, wei-scaled
    const UNIT: Wei = 10_000_000_000_000;

    fn curve() -> BondingCurve {
        BondingCurve::new(UNIT)
    }

    #[test]
    fn test_spot_price() {
        let curve = curve();

        assert_eq!(curve.spot_price(10), 10 * UNIT); // 0.0001
        assert_eq!(curve.spot_price(1111), 1111 * UNIT); // 0.01111
        assert_eq!(curve.spot_price(6454), 6454 * UNIT); // 0.06454
        assert_eq!(curve.spot_price(25420), 25420 * UNIT); // 0.2542
        assert_eq!(curve.spot_price(67274), 67274 * UNIT); // 0.67274
        assert_eq!(curve.spot_price(97330), 97330 * UNIT); // 0.9733
        assert_eq!(curve.spot_price(115164), 115164 * UNIT); // 1.15164
        assert_eq!(curve.spot_price(140222), 140222 * UNIT); // 1.40222
        assert_eq!(curve.spot_price(247920), 247920 * UNIT); // 2.4792
    }

    #[test]
    fn test_spot_price_strictly_increasing() {
        let curve = curve();
        for k in 1..1000 {
            assert!(curve.spot_price(k + 1) > curve.spot_price(k));
        }
    }

    #[test]
    fn test_cost_to_buy_rejects_zero() {
        assert!(matches!(
            curve().cost_to_buy(0, 0),
            Err(MarketError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_cost_to_buy_from_genesis() {
        let curve = curve();

        // 0.00001 + 0.00002 + ... + 0.0001 = 0.00055
        assert_eq!(curve.cost_to_buy(0, 10).unwrap(), 55 * UNIT);
        assert_eq!(curve.cost_to_buy(0, 100).unwrap(), 5_050 * UNIT); // 0.0505
        assert_eq!(curve.cost_to_buy(0, 1000).unwrap(), 500_500 * UNIT); // 5.005
        assert_eq!(curve.cost_to_buy(0, 5000).unwrap(), 12_502_500 * UNIT); // 125.025
        assert_eq!(curve.cost_to_buy(0, 2222).unwrap(), 2_469_753 * UNIT); // 24.69753
    }

    #[test]
    fn test_cost_to_buy_mid_curve() {
        let curve = curve();

        assert_eq!(curve.cost_to_buy(100, 900).unwrap(), 495_450 * UNIT); // 4.9545
        assert_eq!(
            curve.cost_to_buy(5000, 19541).unwrap(),
            288_640_111 * UNIT // 2886.40111
        );
        assert_eq!(
            curve.cost_to_buy(0, 45678).unwrap(),
            1_043_262_681 * UNIT // 10432.62681
        );
    }

    #[test]
    fn test_cost_to_buy_strictly_increasing_in_both_arguments() {
        let curve = curve();
        for sold in [0u64, 1, 57, 1000] {
            for amount in 1..100 {
                let here = curve.cost_to_buy(sold, amount).unwrap();
                assert!(curve.cost_to_buy(sold, amount + 1).unwrap() > here);
                assert!(curve.cost_to_buy(sold + 1, amount).unwrap() > here);
            }
        }
    }

    #[test]
    fn test_proceeds_from_sell_rejects_zero_and_overdraw() {
        let curve = curve();
        assert!(matches!(
            curve.proceeds_from_sell(10, 0),
            Err(MarketError::InvalidArgument(_))
        ));
        assert!(matches!(
            curve.proceeds_from_sell(10, 11),
            Err(MarketError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_proceeds_from_sell() {
        let curve = curve();

        // selling everything bought returns exactly what was paid
        assert_eq!(curve.proceeds_from_sell(10, 10).unwrap(), 55 * UNIT);
        assert_eq!(curve.proceeds_from_sell(10, 6).unwrap(), 45 * UNIT); // 0.00045

        assert_eq!(curve.proceeds_from_sell(1000, 351).unwrap(), 289_575 * UNIT); // 2.89575
        assert_eq!(curve.proceeds_from_sell(1000, 548).unwrap(), 398_122 * UNIT); // 3.98122
        assert_eq!(curve.proceeds_from_sell(1000, 756).unwrap(), 470_610 * UNIT); // 4.7061
        assert_eq!(curve.proceeds_from_sell(1000, 991).unwrap(), 500_455 * UNIT); // 5.00455
    }

    #[test]
    fn test_proceeds_from_sell_deep_curve() {
        let curve = curve();

        assert_eq!(
            curve.proceeds_from_sell(45678, 5679).unwrap(),
            243_282_681 * UNIT // 2432.82681
        );
        assert_eq!(
            curve.proceeds_from_sell(39999, 7896).unwrap(),
            284_662_644 * UNIT // 2846.62644
        );
        assert_eq!(
            curve.proceeds_from_sell(32103, 19759).unwrap(),
            439_124_016 * UNIT // 4391.24016
        );
    }

    #[test]
    fn test_buy_sell_round_trip_is_value_neutral() {
        let curve = curve();
        for sold in [1u64, 10, 99, 1234, 45678] {
            for amount in [1u64, 2, 7, sold / 2 + 1, sold] {
                assert_eq!(
                    curve.proceeds_from_sell(sold, amount).unwrap(),
                    curve.cost_to_buy(sold - amount, amount).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_max_units_affordable_exact_boundary() {
        let curve = curve();

        // budget covers exactly 100 units from genesis
        assert_eq!(curve.max_units_affordable(0, 5_050 * UNIT).unwrap(), 100);
        // one step short of the 100th unit
        assert_eq!(curve.max_units_affordable(0, 5_049 * UNIT).unwrap(), 99);
        // surplus that cannot pay for the 101st unit
        let budget = 5_050 * UNIT + 55 * UNIT / 10; // 0.050555
        assert_eq!(curve.max_units_affordable(0, budget).unwrap(), 100);
    }

    #[test]
    fn test_max_units_affordable_small_budgets() {
        let curve = curve();

        assert_eq!(curve.max_units_affordable(0, 0).unwrap(), 0);
        assert_eq!(curve.max_units_affordable(0, UNIT - 1).unwrap(), 0);
        assert_eq!(curve.max_units_affordable(0, UNIT).unwrap(), 1);
        // mid-curve the next unit costs (sold + 1) * UNIT
        assert_eq!(curve.max_units_affordable(100, 100 * UNIT).unwrap(), 0);
        assert_eq!(curve.max_units_affordable(100, 101 * UNIT).unwrap(), 1);
    }

    #[test]
    fn test_max_units_affordable_inverts_cost() {
        let curve = curve();
        for sold in [0u64, 1, 100, 5000, 45678] {
            for amount in [1u64, 9, 100, 2222] {
                let cost = curve.cost_to_buy(sold, amount).unwrap();
                assert_eq!(curve.max_units_affordable(sold, cost).unwrap(), amount);
                assert_eq!(
                    curve.max_units_affordable(sold, cost - 1).unwrap(),
                    amount - 1
                );
            }
        }
    }

    #[test]
    fn test_max_units_affordable_result_is_maximal() {
        let curve = curve();
        for sold in [0u64, 3, 101, 999] {
            for budget in [UNIT / 2, 7 * UNIT, 5_051 * UNIT, 123_456 * UNIT + 1] {
                let n = curve.max_units_affordable(sold, budget).unwrap();
                if n > 0 {
                    assert!(curve.cost_to_buy(sold, n).unwrap() <= budget);
                }
                assert!(curve.cost_to_buy(sold, n + 1).unwrap() > budget);
            }
        }
    }

    #[test]
    fn test_integer_sqrt() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(3), 1);
        assert_eq!(integer_sqrt(4), 2);
        assert_eq!(integer_sqrt(99), 9);
        assert_eq!(integer_sqrt(100), 10);
        assert_eq!(
            integer_sqrt(u64::MAX as u128 * u64::MAX as u128),
            u64::MAX as u128
        );
    }
}
