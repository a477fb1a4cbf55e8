//! 종목 조회 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/stocks` - 전체 종목 요약
//! - `GET /api/v1/stocks/{stock_id}` - 종목 상세
//! - `GET /api/v1/stocks/{stock_id}/price` - 현재가
//! - `GET /api/v1/stocks/{stock_id}/history` - 체결 내역
//! - `GET /api/v1/stocks/{stock_id}/graph` - 분 단위 캔들

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use paper_core::LedgerError;
use paper_store::StoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 종목 요약.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockSummaryItem {
    /// 종목 ID
    pub stock_id: String,
    /// 티커 심볼
    pub sign: String,
    /// 현재가
    pub price: Decimal,
}

/// 종목 체결 내역 항목.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockTradeItem {
    /// 체결한 사용자 ID
    pub user_id: String,
    /// 체결 시각
    pub timestamp: DateTime<Utc>,
    /// 체결 가격
    pub price: Decimal,
    /// 체결 수량
    pub amount: u64,
}

/// 분 단위 캔들.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandleItem {
    /// 캔들 시작 시각
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 체결 수량 합계
    pub volume: u64,
}

/// 종목 상세 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockDetailResponse {
    /// 종목 ID
    pub stock_id: String,
    /// 종목명
    pub name: String,
    /// 티커 심볼
    pub sign: String,
    /// 종목 이미지 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// 현재가
    pub price: Decimal,
    /// 등록 시각
    pub created_at: DateTime<Utc>,
}

/// 현재가 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockPriceResponse {
    /// 종목 ID
    pub stock_id: String,
    /// 현재가
    pub price: Decimal,
}

fn map_store_error(err: StoreError) -> (axum::http::StatusCode, Json<ApiErrorResponse>) {
    ApiErrorResponse::from_ledger(LedgerError::from(err))
}

/// 전체 종목 요약.
#[utoipa::path(
    get,
    path = "/api/v1/stocks",
    responses((status = 200, description = "심볼순 종목 요약", body = [StockSummaryItem])),
    tag = "stocks"
)]
pub async fn list_stocks(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<StockSummaryItem>>> {
    let summaries = state.stocks.list_stocks().await.map_err(map_store_error)?;

    Ok(Json(
        summaries
            .into_iter()
            .map(|s| StockSummaryItem {
                stock_id: s.stock_id,
                sign: s.sign,
                price: s.price,
            })
            .collect(),
    ))
}

/// 종목 상세.
#[utoipa::path(
    get,
    path = "/api/v1/stocks/{stock_id}",
    params(("stock_id" = String, Path, description = "종목 ID")),
    responses(
        (status = 200, description = "종목 상세", body = StockDetailResponse),
        (status = 404, description = "종목 없음", body = ApiErrorResponse)
    ),
    tag = "stocks"
)]
pub async fn get_stock(
    State(state): State<Arc<AppState>>,
    Path(stock_id): Path<String>,
) -> ApiResult<Json<StockDetailResponse>> {
    let record = state
        .stocks
        .get_stock(&stock_id)
        .await
        .map_err(map_store_error)?;

    Ok(Json(StockDetailResponse {
        stock_id: record.stock_id,
        name: record.name,
        sign: record.sign,
        image: record.image,
        price: record.price,
        created_at: record.created_at,
    }))
}

/// 현재가.
#[utoipa::path(
    get,
    path = "/api/v1/stocks/{stock_id}/price",
    params(("stock_id" = String, Path, description = "종목 ID")),
    responses(
        (status = 200, description = "현재가", body = StockPriceResponse),
        (status = 404, description = "종목 없음", body = ApiErrorResponse)
    ),
    tag = "stocks"
)]
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Path(stock_id): Path<String>,
) -> ApiResult<Json<StockPriceResponse>> {
    let price = state
        .stocks
        .get_price(&stock_id)
        .await
        .map_err(map_store_error)?;

    Ok(Json(StockPriceResponse { stock_id, price }))
}

/// 체결 내역.
#[utoipa::path(
    get,
    path = "/api/v1/stocks/{stock_id}/history",
    params(("stock_id" = String, Path, description = "종목 ID")),
    responses(
        (status = 200, description = "시간순 체결 내역", body = [StockTradeItem]),
        (status = 404, description = "종목 없음", body = ApiErrorResponse)
    ),
    tag = "stocks"
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(stock_id): Path<String>,
) -> ApiResult<Json<Vec<StockTradeItem>>> {
    let history = state
        .stocks
        .get_history(&stock_id)
        .await
        .map_err(map_store_error)?;

    Ok(Json(
        history
            .into_iter()
            .map(|t| StockTradeItem {
                user_id: t.user_id,
                timestamp: t.timestamp,
                price: t.price,
                amount: t.amount,
            })
            .collect(),
    ))
}

/// 분 단위 캔들 그래프.
#[utoipa::path(
    get,
    path = "/api/v1/stocks/{stock_id}/graph",
    params(("stock_id" = String, Path, description = "종목 ID")),
    responses(
        (status = 200, description = "분 단위 캔들", body = [CandleItem]),
        (status = 404, description = "종목 없음", body = ApiErrorResponse)
    ),
    tag = "stocks"
)]
pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Path(stock_id): Path<String>,
) -> ApiResult<Json<Vec<CandleItem>>> {
    let candles = state
        .stocks
        .get_graph(&stock_id)
        .await
        .map_err(map_store_error)?;

    Ok(Json(
        candles
            .into_iter()
            .map(|c| CandleItem {
                open_time: c.open_time,
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume: c.volume,
            })
            .collect(),
    ))
}

/// 종목 라우터 생성.
pub fn stocks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_stocks))
        .route("/{stock_id}", get(get_stock))
        .route("/{stock_id}/price", get(get_price))
        .route("/{stock_id}/history", get(get_history))
        .route("/{stock_id}/graph", get(get_graph))
}
