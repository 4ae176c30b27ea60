use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::models::{wei_string, AccountId, MarketError, Wei};
use crate::services::MarketService;

#[derive(Deserialize)]
pub struct BuyRequest {
    pub account: AccountId,
    pub max_tokens: u64,
    pub min_tokens: u64,
    #[serde(with = "wei_string")]
    pub value: Wei,
}

#[derive(Deserialize)]
pub struct SellRequest {
    pub account: AccountId,
    pub amount: u64,
    #[serde(with = "wei_string")]
    pub min_value: Wei,
}

#[derive(Deserialize)]
pub struct AddMilestoneRequest {
    pub caller: AccountId,
    #[serde(with = "wei_string")]
    pub start_price: Wei,
    pub contract_id: Uuid,
}

#[derive(Deserialize)]
pub struct PresaleRequest {
    pub caller: AccountId,
    pub account: AccountId,
}

#[derive(Deserialize)]
pub struct ShutdownRequest {
    pub caller: AccountId,
}

pub async fn buy(
    market: web::Data<MarketService>,
    order: web::Json<BuyRequest>,
) -> Result<HttpResponse, MarketError> {
    info!(
        "buy order from {}: up to {} tokens, min {}",
        order.account, order.max_tokens, order.min_tokens
    );
    let receipt = market.buy(
        &order.account,
        order.max_tokens,
        order.min_tokens,
        order.value,
    )?;
    Ok(HttpResponse::Ok().json(receipt))
}

pub async fn sell(
    market: web::Data<MarketService>,
    order: web::Json<SellRequest>,
) -> Result<HttpResponse, MarketError> {
    info!("sell order from {}: {} tokens", order.account, order.amount);
    let receipt = market.sell(&order.account, order.amount, order.min_value)?;
    Ok(HttpResponse::Ok().json(receipt))
}

pub async fn quote_buy(
    market: web::Data<MarketService>,
    amount: web::Path<u64>,
) -> Result<HttpResponse, MarketError> {
    let value = market.quote_buy(*amount)?;
    Ok(HttpResponse::Ok().json(json!({ "amount": *amount, "value": value.to_string() })))
}

pub async fn quote_sell(
    market: web::Data<MarketService>,
    amount: web::Path<u64>,
) -> Result<HttpResponse, MarketError> {
    let value = market.quote_sell(*amount)?;
    Ok(HttpResponse::Ok().json(json!({ "amount": *amount, "value": value.to_string() })))
}

pub async fn spot_price(
    market: web::Data<MarketService>,
    unit: web::Path<u64>,
) -> Result<HttpResponse, MarketError> {
    if *unit == 0 {
        return Err(MarketError::InvalidArgument("must be > 0".to_string()));
    }
    let price = market.spot_price(*unit);
    Ok(HttpResponse::Ok().json(json!({ "unit": *unit, "price": price.to_string() })))
}

pub async fn status(market: web::Data<MarketService>) -> HttpResponse {
    HttpResponse::Ok().json(market.status())
}

pub async fn events(market: web::Data<MarketService>) -> HttpResponse {
    HttpResponse::Ok().json(market.events())
}

pub async fn add_milestone(
    market: web::Data<MarketService>,
    request: web::Json<AddMilestoneRequest>,
) -> Result<HttpResponse, MarketError> {
    let idx = market.add_milestone(&request.caller, request.start_price, request.contract_id)?;
    Ok(HttpResponse::Created().json(json!({ "idx": idx })))
}

pub async fn milestone_at(
    market: web::Data<MarketService>,
    idx: web::Path<usize>,
) -> Result<HttpResponse, MarketError> {
    Ok(HttpResponse::Ok().json(market.milestone_at(*idx)?))
}

pub async fn allow_presale(
    market: web::Data<MarketService>,
    request: web::Json<PresaleRequest>,
) -> Result<HttpResponse, MarketError> {
    market.allow_presale(&request.caller, &request.account)?;
    Ok(HttpResponse::Ok().json(json!({ "account": request.account, "allowed": true })))
}

pub async fn disallow_presale(
    market: web::Data<MarketService>,
    request: web::Json<PresaleRequest>,
) -> Result<HttpResponse, MarketError> {
    market.disallow_presale(&request.caller, &request.account)?;
    Ok(HttpResponse::Ok().json(json!({ "account": request.account, "allowed": false })))
}

pub async fn presale_status(
    market: web::Data<MarketService>,
    account: web::Path<AccountId>,
) -> HttpResponse {
    let allowed = market.is_presale_allowed(&account);
    HttpResponse::Ok().json(json!({ "account": *account, "allowed": allowed }))
}

pub async fn shutdown(
    market: web::Data<MarketService>,
    request: web::Json<ShutdownRequest>,
) -> Result<HttpResponse, MarketError> {
    let swept = market.shutdown(&request.caller)?;
    info!("market shut down by {}", request.caller);
    Ok(HttpResponse::Ok().json(json!({ "swept": swept.to_string() })))
}
