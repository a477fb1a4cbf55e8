//! 지갑(입출금) endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/wallet/{user_id}/balance` - 잔고 조회
//! - `POST /api/v1/wallet/deposit` - 입금
//! - `POST /api/v1/wallet/withdraw` - 출금
//! - `GET /api/v1/wallet/{user_id}/history` - 입출금 내역 (페이지네이션)
//! - `GET /api/v1/wallet/{user_id}/trades` - 거래 내역 (페이지네이션)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use paper_core::{BalanceMethod, LedgerError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 잔고 조회 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// 사용자 ID
    pub user_id: String,
    /// 현금 잔고
    pub balance: Decimal,
}

/// 입출금 요청 본문.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoneyRequest {
    /// 사용자 ID
    pub user_id: String,
    /// 금액 (양수)
    pub amount: Decimal,
}

/// 입출금 내역 항목.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceHistoryItem {
    /// 기록 시각
    pub timestamp: DateTime<Utc>,
    /// 금액
    pub amount: Decimal,
    /// 구분 ("DEPOSIT" | "WITHDRAW")
    pub method: String,
}

/// 거래 내역 항목.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TradeHistoryItem {
    /// 기록 시각
    pub timestamp: DateTime<Utc>,
    /// 종목 ID
    pub stock_id: String,
    /// 체결 가격
    pub price: Decimal,
    /// 체결 수량
    pub amount: u64,
    /// 거래 상태
    pub status: String,
    /// 주문 유형
    pub order_type: String,
    /// 주문 방법
    pub order_method: String,
}

/// 입출금 내역 쿼리 파라미터.
#[derive(Debug, Deserialize)]
pub struct BalanceHistoryQuery {
    /// 구분 필터 ("DEPOSIT" | "WITHDRAW", 선택)
    pub method: Option<String>,
    /// 페이지 (0부터, 기본 0)
    #[serde(default)]
    pub page: usize,
}

/// 거래 내역 쿼리 파라미터.
#[derive(Debug, Deserialize)]
pub struct TradeHistoryQuery {
    /// 종목 필터 (선택)
    pub stock_id: Option<String>,
    /// 페이지 (0부터, 기본 0)
    #[serde(default)]
    pub page: usize,
}

/// 잔고 조회.
#[utoipa::path(
    get,
    path = "/api/v1/wallet/{user_id}/balance",
    params(("user_id" = String, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "현금 잔고", body = BalanceResponse),
        (status = 404, description = "계좌 없음", body = ApiErrorResponse)
    ),
    tag = "wallet"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<BalanceResponse>> {
    let balance = state
        .ledger
        .get_balance(&user_id)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(Json(BalanceResponse { user_id, balance }))
}

/// 입금.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/deposit",
    request_body = MoneyRequest,
    responses(
        (status = 204, description = "입금 완료"),
        (status = 400, description = "잘못된 금액", body = ApiErrorResponse)
    ),
    tag = "wallet"
)]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MoneyRequest>,
) -> ApiResult<StatusCode> {
    state
        .ledger
        .deposit(&request.user_id, request.amount)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(StatusCode::NO_CONTENT)
}

/// 출금.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/withdraw",
    request_body = MoneyRequest,
    responses(
        (status = 204, description = "출금 완료"),
        (status = 400, description = "잘못된 금액", body = ApiErrorResponse),
        (status = 422, description = "잔고 부족", body = ApiErrorResponse)
    ),
    tag = "wallet"
)]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MoneyRequest>,
) -> ApiResult<StatusCode> {
    state
        .ledger
        .withdraw(&request.user_id, request.amount)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(StatusCode::NO_CONTENT)
}

/// 입출금 내역 조회.
#[utoipa::path(
    get,
    path = "/api/v1/wallet/{user_id}/history",
    params(
        ("user_id" = String, Path, description = "사용자 ID"),
        ("method" = Option<String>, Query, description = "구분 필터 (DEPOSIT | WITHDRAW)"),
        ("page" = Option<usize>, Query, description = "페이지 (0부터)")
    ),
    responses(
        (status = 200, description = "최신순 내역, 페이지당 10개", body = [BalanceHistoryItem]),
        (status = 400, description = "잘못된 필터", body = ApiErrorResponse)
    ),
    tag = "wallet"
)]
pub async fn balance_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<BalanceHistoryQuery>,
) -> ApiResult<Json<Vec<BalanceHistoryItem>>> {
    let method = match query.method {
        Some(raw) => Some(
            raw.parse::<BalanceMethod>()
                .map_err(|_| ApiErrorResponse::from_ledger(LedgerError::InvalidData))?,
        ),
        None => None,
    };

    let entries = state
        .ledger
        .get_balance_history(&user_id, method, query.page)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(Json(
        entries
            .into_iter()
            .map(|e| BalanceHistoryItem {
                timestamp: e.timestamp,
                amount: e.amount,
                method: e.method.to_string(),
            })
            .collect(),
    ))
}

/// 거래 내역 조회.
#[utoipa::path(
    get,
    path = "/api/v1/wallet/{user_id}/trades",
    params(
        ("user_id" = String, Path, description = "사용자 ID"),
        ("stock_id" = Option<String>, Query, description = "종목 필터"),
        ("page" = Option<usize>, Query, description = "페이지 (0부터)")
    ),
    responses(
        (status = 200, description = "최신순 거래 내역, 페이지당 10개", body = [TradeHistoryItem])
    ),
    tag = "wallet"
)]
pub async fn trade_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<TradeHistoryQuery>,
) -> ApiResult<Json<Vec<TradeHistoryItem>>> {
    let entries = state
        .ledger
        .get_trade_history(&user_id, query.stock_id.as_deref(), query.page)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(Json(
        entries
            .into_iter()
            .map(|e| TradeHistoryItem {
                timestamp: e.timestamp,
                stock_id: e.stock_id,
                price: e.price,
                amount: e.amount,
                status: e.status.to_string(),
                order_type: e.order_type.to_string(),
                order_method: e.order_method.to_string(),
            })
            .collect(),
    ))
}

/// 지갑 라우터 생성.
pub fn wallet_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .route("/{user_id}/balance", get(get_balance))
        .route("/{user_id}/history", get(balance_history))
        .route("/{user_id}/trades", get(trade_history))
}
