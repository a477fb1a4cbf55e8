//! 캐시 레이어.
//!
//! 캐시는 조언적(advisory)입니다. 쓰기 경로의 진실 공급원이 아니며,
//! 읽기 경로에서 캐시 장애는 로그만 남기고 저장소 조회로 넘어갑니다.
//! 변경 연산 후에는 관련 키를 삭제(무효화)할 뿐, 제자리 갱신은 하지
//! 않습니다.

pub mod memory;
pub mod redis;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use tracing::warn;

use crate::error::Result;

/// 직렬화된 값의 키-값 캐시.
///
/// 값은 JSON 문자열로 저장됩니다. 타입별 직렬화는 [`read_through`]가
/// 담당하므로 트레이트는 object-safe하게 유지됩니다.
#[async_trait]
pub trait Cache: Send + Sync {
    /// 키의 값을 조회합니다. 미스면 `None`.
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// TTL과 함께 값을 저장합니다.
    async fn set_raw(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// 키들을 삭제하고 삭제된 개수를 반환합니다.
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    /// 패턴(`prefix:*`)과 일치하는 키들을 삭제합니다.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64>;

    /// 백엔드 상태를 확인합니다.
    async fn health_check(&self) -> Result<bool>;
}

/// cache-aside 읽기.
///
/// 캐시를 먼저 확인하고, 미스면 `loader`로 저장소를 읽은 뒤 캐시를
/// 채웁니다. 캐시 조회/저장 실패는 결과에 영향을 주지 않습니다 -
/// 저장소의 값이 항상 반환됩니다.
pub async fn read_through<T, F, Fut>(
    cache: &dyn Cache,
    key: &str,
    ttl_secs: u64,
    loader: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match cache.get_raw(key).await {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => return Ok(value),
            Err(e) => {
                // 손상된 항목은 버리고 저장소에서 다시 읽는다
                warn!(key, error = %e, "discarding undecodable cache entry");
                let _ = cache.delete(std::slice::from_ref(&key.to_string())).await;
            }
        },
        Ok(None) => {}
        Err(e) => warn!(key, error = %e, "cache read failed, falling back to store"),
    }

    let value = loader().await?;

    match serde_json::to_string(&value) {
        Ok(json) => {
            if let Err(e) = cache.set_raw(key, &json, ttl_secs).await {
                warn!(key, error = %e, "cache populate failed");
            }
        }
        Err(e) => warn!(key, error = %e, "cache serialization failed"),
    }

    Ok(value)
}

/// 키들을 무효화합니다. 실패는 로그만 남깁니다.
pub async fn invalidate(cache: &dyn Cache, keys: &[String]) {
    if let Err(e) = cache.delete(keys).await {
        warn!(?keys, error = %e, "cache invalidation failed");
    }
}

/// 패턴과 일치하는 키들을 무효화합니다.
pub async fn invalidate_pattern(cache: &dyn Cache, pattern: &str) {
    if let Err(e) = cache.delete_pattern(pattern).await {
        warn!(pattern, error = %e, "cache invalidation failed");
    }
}

/// 캐시 키 빌더.
///
/// 키 형식은 여기에서만 정의합니다. 호출부마다 문자열을 조립하지
/// 않습니다.
pub mod keys {
    use paper_core::BalanceMethod;

    /// 계좌 전체 캐시 키.
    pub fn account(user_id: &str) -> String {
        format!("account:{}", user_id)
    }

    /// 잔고 캐시 키.
    pub fn balance(user_id: &str) -> String {
        format!("balance:{}", user_id)
    }

    /// 관심 종목 캐시 키.
    pub fn favorites(user_id: &str) -> String {
        format!("favorites:{}", user_id)
    }

    /// 입출금 내역 페이지 캐시 키.
    pub fn balance_history(user_id: &str, method: Option<BalanceMethod>, page: usize) -> String {
        let filter = method
            .map(|m| m.to_string().to_lowercase())
            .unwrap_or_else(|| "all".to_string());
        format!("history:balance:{}:{}:{}", user_id, filter, page)
    }

    /// 사용자의 모든 입출금 내역 페이지와 일치하는 패턴.
    pub fn balance_history_pattern(user_id: &str) -> String {
        format!("history:balance:{}:*", user_id)
    }

    /// 거래 내역 페이지 캐시 키.
    pub fn trade_history(user_id: &str, stock_id: Option<&str>, page: usize) -> String {
        format!(
            "history:trade:{}:{}:{}",
            user_id,
            stock_id.unwrap_or("all"),
            page
        )
    }

    /// 사용자의 모든 거래 내역 페이지와 일치하는 패턴.
    pub fn trade_history_pattern(user_id: &str) -> String {
        format!("history:trade:{}:*", user_id)
    }

    /// 종목 레코드 캐시 키.
    pub fn stock(stock_id: &str) -> String {
        format!("stock:{}", stock_id)
    }
}
