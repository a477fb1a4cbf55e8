//! 관심 종목 endpoint.
//!
//! 중복 추가는 멱등 처리하지 않고 409로 거부합니다. 제거는 멱등입니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/favorites/{user_id}` - 관심 종목 목록
//! - `PUT /api/v1/favorites/{user_id}/{stock_id}` - 추가
//! - `DELETE /api/v1/favorites/{user_id}/{stock_id}` - 제거

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 관심 종목 목록 조회.
#[utoipa::path(
    get,
    path = "/api/v1/favorites/{user_id}",
    params(("user_id" = String, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "관심 종목 ID 목록", body = [String]),
        (status = 404, description = "계좌 없음", body = ApiErrorResponse)
    ),
    tag = "favorites"
)]
pub async fn get_favorites(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let favorites = state
        .ledger
        .get_favorites(&user_id)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(Json(favorites))
}

/// 관심 종목 추가.
#[utoipa::path(
    put,
    path = "/api/v1/favorites/{user_id}/{stock_id}",
    params(
        ("user_id" = String, Path, description = "사용자 ID"),
        ("stock_id" = String, Path, description = "종목 ID")
    ),
    responses(
        (status = 204, description = "추가됨"),
        (status = 409, description = "이미 등록됨", body = ApiErrorResponse)
    ),
    tag = "favorites"
)]
pub async fn set_favorite(
    State(state): State<Arc<AppState>>,
    Path((user_id, stock_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .ledger
        .set_favorite(&user_id, &stock_id)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(StatusCode::NO_CONTENT)
}

/// 관심 종목 제거.
#[utoipa::path(
    delete,
    path = "/api/v1/favorites/{user_id}/{stock_id}",
    params(
        ("user_id" = String, Path, description = "사용자 ID"),
        ("stock_id" = String, Path, description = "종목 ID")
    ),
    responses((status = 204, description = "제거됨 (없어도 성공)")),
    tag = "favorites"
)]
pub async fn delete_favorite(
    State(state): State<Arc<AppState>>,
    Path((user_id, stock_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .ledger
        .delete_favorite(&user_id, &stock_id)
        .await
        .map_err(ApiErrorResponse::from_ledger)?;

    Ok(StatusCode::NO_CONTENT)
}

/// 관심 종목 라우터 생성.
pub fn favorites_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{user_id}", get(get_favorites))
        .route(
            "/{user_id}/{stock_id}",
            put(set_favorite).delete(delete_favorite),
        )
}
