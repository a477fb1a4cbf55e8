//! 저장소 모듈 오류 타입.

use paper_core::LedgerError;
use thiserror::Error;

/// 저장소 관련 오류.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// 원자 연산의 선행 조건이 동시 변경으로 깨짐
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 연결 오류
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// 캐시 오류
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => LedgerError::NotFound(entity),
            StoreError::CacheError(msg) => LedgerError::Cache(msg),
            StoreError::SerializationError(msg) => LedgerError::Serialization(msg),
            other => LedgerError::Store(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
