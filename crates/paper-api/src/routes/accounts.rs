//! 계좌 관리 endpoint.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/accounts` - 계좌 생성
//! - `GET /api/v1/accounts/{user_id}` - 계좌 조회
//! - `DELETE /api/v1/accounts/{user_id}` - 계좌 삭제

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use paper_core::NewAccount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 계좌 생성 요청.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// 사용자 ID
    pub user_id: String,
    /// 표시 이름
    pub name: String,
    /// 이메일
    pub email: String,
    /// 프로필 이미지 URL
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// 계좌 생성 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
    /// 생성된 계좌의 사용자 ID
    pub user_id: String,
}

/// 보유 포지션 정보.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    /// 종목 ID
    pub stock_id: String,
    /// 보유 수량
    pub amount: u64,
}

/// 계좌 조회 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// 사용자 ID
    pub user_id: String,
    /// 표시 이름
    pub name: String,
    /// 이메일
    pub email: String,
    /// 프로필 이미지 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// 현금 잔고
    pub balance: Decimal,
    /// 보유 포지션
    pub positions: Vec<PositionInfo>,
    /// 관심 종목
    pub favorites: Vec<String>,
    /// 가입 시각
    pub created_at: DateTime<Utc>,
}

/// 계좌 생성.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "계좌 생성됨", body = CreateAccountResponse),
        (status = 400, description = "잘못된 요청", body = ApiErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<CreateAccountResponse>)> {
    let user_id = state
        .ledger
        .create_account(NewAccount {
            user_id: request.user_id,
            name: request.name,
            email: request.email,
            profile_image: request.profile_image,
        })
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok((StatusCode::CREATED, Json(CreateAccountResponse { user_id })))
}

/// 계좌 조회.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{user_id}",
    params(("user_id" = String, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "계좌 정보", body = AccountResponse),
        (status = 404, description = "계좌 없음", body = ApiErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<AccountResponse>> {
    let account = state
        .ledger
        .get_account(&user_id)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(Json(AccountResponse {
        user_id: account.user_id,
        name: account.name,
        email: account.email,
        profile_image: account.profile_image,
        balance: account.balance,
        positions: account
            .positions
            .into_iter()
            .map(|p| PositionInfo {
                stock_id: p.stock_id,
                amount: p.amount,
            })
            .collect(),
        favorites: account.favorites,
        created_at: account.created_at,
    }))
}

/// 계좌 삭제.
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{user_id}",
    params(("user_id" = String, Path, description = "사용자 ID")),
    responses(
        (status = 204, description = "계좌 삭제됨"),
        (status = 404, description = "계좌 없음", body = ApiErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .ledger
        .delete_account(&user_id)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(StatusCode::NO_CONTENT)
}

/// 계좌 라우터 생성.
pub fn accounts_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_account))
        .route("/{user_id}", get(get_account).delete(delete_account))
}
