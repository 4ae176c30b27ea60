use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::models::{AccountId, MarketError};
use crate::services::MarketService;

/// Deployment request for a milestone contract instance. The instance id
/// returned here is what `POST /market/milestones` attaches to a
/// threshold price.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeployRequest {
    Burn {
        deployer: AccountId,
        burn_percent: u64,
    },
    Airdrop {
        deployer: AccountId,
        reward_name: String,
        reward_symbol: String,
        reward_supply: u64,
    },
}

#[derive(Deserialize)]
pub struct ClaimRequest {
    pub account: AccountId,
}

#[derive(Deserialize)]
pub struct FinishRequest {
    pub caller: AccountId,
}

pub async fn deploy(
    market: web::Data<MarketService>,
    request: web::Json<DeployRequest>,
) -> Result<HttpResponse, MarketError> {
    let id = match request.into_inner() {
        DeployRequest::Burn {
            deployer,
            burn_percent,
        } => market.deploy_burn_milestone(&deployer, burn_percent)?,
        DeployRequest::Airdrop {
            deployer,
            reward_name,
            reward_symbol,
            reward_supply,
        } => market.deploy_airdrop_milestone(
            &deployer,
            &reward_name,
            &reward_symbol,
            reward_supply,
        )?,
    };
    info!("milestone contract {} deployed", id);
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

pub async fn info_handler(
    market: web::Data<MarketService>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, MarketError> {
    Ok(HttpResponse::Ok().json(market.milestone_contract_info(*id)?))
}

pub async fn claim(
    market: web::Data<MarketService>,
    id: web::Path<Uuid>,
    request: web::Json<ClaimRequest>,
) -> Result<HttpResponse, MarketError> {
    let amount = market.claim_airdrop(*id, &request.account)?;
    Ok(HttpResponse::Ok().json(json!({ "account": request.account, "amount": amount })))
}

pub async fn finish(
    market: web::Data<MarketService>,
    id: web::Path<Uuid>,
    request: web::Json<FinishRequest>,
) -> Result<HttpResponse, MarketError> {
    let swept = market.finish_milestone(*id, &request.caller)?;
    Ok(HttpResponse::Ok().json(json!({ "swept": swept })))
}

pub async fn reward_balances(
    market: web::Data<MarketService>,
    path: web::Path<(Uuid, AccountId)>,
) -> Result<HttpResponse, MarketError> {
    let (id, account) = path.into_inner();
    Ok(HttpResponse::Ok().json(market.reward_balances(id, &account)?))
}
