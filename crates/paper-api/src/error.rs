//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! 검증 에러의 `message`는 원장이 정의한 계약 문자열 그대로입니다.

use axum::{http::StatusCode, Json};
use paper_core::LedgerError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "INSUFFICIENT_BALANCE",
///   "message": "balance not enough",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_DATA", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 원장 에러를 HTTP 응답으로 변환합니다.
    pub fn from_ledger(err: LedgerError) -> (StatusCode, Json<ApiErrorResponse>) {
        let (status, code) = match &err {
            LedgerError::InvalidUser => (StatusCode::BAD_REQUEST, "INVALID_USER"),
            LedgerError::InvalidData => (StatusCode::BAD_REQUEST, "INVALID_DATA"),
            LedgerError::InvalidMoney => (StatusCode::BAD_REQUEST, "INVALID_MONEY"),
            LedgerError::InvalidStock => (StatusCode::BAD_REQUEST, "INVALID_STOCK"),
            LedgerError::InvalidOrderType => (StatusCode::BAD_REQUEST, "INVALID_ORDER_TYPE"),
            LedgerError::InvalidOrderMethod => {
                (StatusCode::BAD_REQUEST, "INVALID_ORDER_METHOD")
            }
            LedgerError::InsufficientBalance => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_BALANCE")
            }
            LedgerError::InsufficientStock => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_STOCK")
            }
            LedgerError::AlreadyFavorited => (StatusCode::CONFLICT, "ALREADY_FAVORITED"),
            LedgerError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LedgerError::Cache(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CACHE_ERROR"),
            LedgerError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR")
            }
            LedgerError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        };

        (status, Json(ApiErrorResponse::new(code, err.to_string())))
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_client_errors() {
        let (status, body) = ApiErrorResponse::from_ledger(LedgerError::InvalidData);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_DATA");
        assert_eq!(body.message, "invalid data");
    }

    #[test]
    fn test_insufficient_balance_is_unprocessable() {
        let (status, body) = ApiErrorResponse::from_ledger(LedgerError::InsufficientBalance);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.message, "balance not enough");
    }

    #[test]
    fn test_already_favorited_is_conflict() {
        let (status, _) = ApiErrorResponse::from_ledger(LedgerError::AlreadyFavorited);
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_store_errors_are_server_errors() {
        let (status, body) =
            ApiErrorResponse::from_ledger(LedgerError::Store("down".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "STORE_ERROR");
    }
}
