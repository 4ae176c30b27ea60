use std::env;

use log::info;

use crate::models::{AccountId, Wei};

/// Construction parameters of the market, loaded from the environment
/// with reference defaults: a 300k-unit token, four 10k distributions,
/// and a unit rate of 0.00001 currency units per price step.
pub struct MarketConfig {
    pub presale_start: i64,
    pub sale_start: i64,
    pub unit_price: Wei,
    pub token_name: String,
    pub token_symbol: String,
    pub total_supply: u64,
    pub admin: AccountId,
    pub distributions: Vec<(AccountId, u64)>,
}

impl MarketConfig {
    pub fn load(now: i64) -> Result<Self, Box<dyn std::error::Error>> {
        let presale_start = env_parse("PRESALE_START", now + 60)?;
        let sale_start = env_parse("SALE_START", now + 360)?;
        let unit_price: Wei = env_parse("UNIT_PRICE_WEI", 10_000_000_000_000)?;
        let total_supply = env_parse("TOTAL_SUPPLY", 300_000)?;
        let token_name = env::var("TOKEN_NAME").unwrap_or_else(|_| "Solid".to_string());
        let token_symbol = env::var("TOKEN_SYMBOL").unwrap_or_else(|_| "SLD".to_string());
        let admin = AccountId::new(env::var("ADMIN_ACCOUNT").unwrap_or_else(|_| "admin".to_string()));

        let raw_distributions = env::var("DISTRIBUTIONS").unwrap_or_else(|_| {
            "team_1=10000,team_2=10000,team_3=10000,marketing=10000".to_string()
        });
        let distributions = parse_distributions(&raw_distributions)?;

        if unit_price == 0 {
            return Err("UNIT_PRICE_WEI must be > 0".into());
        }

        info!(
            "market config: presale at {}, sale at {}, supply {}, {} distributions",
            presale_start,
            sale_start,
            total_supply,
            distributions.len()
        );

        Ok(Self {
            presale_start,
            sale_start,
            unit_price,
            token_name,
            token_symbol,
            total_supply,
            admin,
            distributions,
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| format!("invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

/// Parses `account=amount,account=amount` pairs.
fn parse_distributions(raw: &str) -> Result<Vec<(AccountId, u64)>, String> {
    let mut distributions = Vec::new();
    for pair in raw.split(',').filter(|pair| !pair.trim().is_empty()) {
        let (account, amount) = pair
            .split_once('=')
            .ok_or_else(|| format!("invalid distribution entry: {}", pair))?;
        let account = AccountId::new(account.trim());
        if account.is_null() {
            return Err(format!("invalid distribution entry: {}", pair));
        }
        let amount = amount
            .trim()
            .parse()
            .map_err(|_| format!("invalid distribution amount: {}", pair))?;
        distributions.push((account, amount));
    }
    Ok(distributions)
}
