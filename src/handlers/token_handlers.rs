use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::models::{AccountId, MarketError};
use crate::services::MarketService;

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub owner: AccountId,
    pub spender: AccountId,
    pub amount: u64,
}

pub async fn approve(
    market: web::Data<MarketService>,
    request: web::Json<ApproveRequest>,
) -> Result<HttpResponse, MarketError> {
    info!(
        "{} approves {} for {} tokens",
        request.owner, request.spender, request.amount
    );
    market.approve(&request.owner, &request.spender, request.amount)?;
    Ok(HttpResponse::Ok().json(json!({
        "owner": request.owner,
        "spender": request.spender,
        "amount": request.amount,
    })))
}

pub async fn balance(market: web::Data<MarketService>, account: web::Path<AccountId>) -> HttpResponse {
    let balance = market.token_balance(&account);
    HttpResponse::Ok().json(json!({ "account": *account, "balance": balance }))
}

pub async fn supply(market: web::Data<MarketService>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "total_supply": market.token_supply() }))
}
