//! 원장 작업.
//!
//! 입출금, 관심 종목 관리, 그리고 cache-aside 조회를 제공합니다.
//! 조회 경로는 캐시를 먼저 확인하지만, 캐시는 조언적일 뿐 진실
//! 공급원은 항상 저장소입니다.

use std::sync::Arc;

use paper_core::{
    Account, AppConfig, BalanceHistoryEntry, BalanceMethod, LedgerError, LedgerResult,
    NewAccount, TradeHistoryEntry,
};
use paper_store::{cache, keys, read_through, AccountStore, Cache, StoreError};
use rust_decimal::Decimal;
use tracing::info;

/// 원장 작업 설정.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// cache-aside 항목 TTL (초)
    pub cache_ttl_secs: u64,
    /// 내역 페이지당 항목 수
    pub history_page_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            history_page_size: 10,
        }
    }
}

impl LedgerConfig {
    /// 애플리케이션 설정에서 생성합니다.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            cache_ttl_secs: config.cache.ttl_secs,
            history_page_size: config.history.page_size,
        }
    }
}

/// 원장 작업.
pub struct LedgerOperations {
    accounts: Arc<dyn AccountStore>,
    cache: Arc<dyn Cache>,
    config: LedgerConfig,
}

impl LedgerOperations {
    /// 새 원장 작업 인스턴스를 생성합니다.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        cache: Arc<dyn Cache>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            accounts,
            cache,
            config,
        }
    }

    // ==================== 계좌 수명주기 ====================

    /// 새 계좌를 생성합니다.
    pub async fn create_account(&self, input: NewAccount) -> LedgerResult<String> {
        if input.user_id.trim().is_empty() {
            return Err(LedgerError::InvalidUser);
        }
        if input.name.trim().is_empty() || input.email.trim().is_empty() {
            return Err(LedgerError::InvalidData);
        }

        let user_id = self.accounts.create(input).await.map_err(|e| match e {
            // 중복 가입은 클라이언트 요청 오류로 취급
            StoreError::Duplicate(_) => LedgerError::InvalidData,
            other => other.into(),
        })?;

        info!(%user_id, "account created");
        Ok(user_id)
    }

    /// 계좌를 조회합니다 (cache-aside).
    pub async fn get_account(&self, user_id: &str) -> LedgerResult<Account> {
        let key = keys::account(user_id);
        let accounts = self.accounts.clone();
        let user = user_id.to_string();
        let account = read_through(self.cache.as_ref(), &key, self.config.cache_ttl_secs, || {
            async move { accounts.get_account(&user).await }
        })
        .await?;
        Ok(account)
    }

    /// 계좌를 삭제하고 관련 캐시를 모두 무효화합니다.
    pub async fn delete_account(&self, user_id: &str) -> LedgerResult<()> {
        self.accounts.delete_account(user_id).await?;
        self.invalidate_user(user_id).await;
        info!(%user_id, "account deleted");
        Ok(())
    }

    // ==================== 입출금 ====================

    /// 입금.
    pub async fn deposit(&self, user_id: &str, amount: Decimal) -> LedgerResult<()> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidMoney);
        }

        let entry = BalanceHistoryEntry::new(amount, BalanceMethod::Deposit);
        self.accounts.deposit(user_id, amount, entry).await?;
        self.invalidate_balance(user_id).await;

        info!(%user_id, %amount, "deposit applied");
        Ok(())
    }

    /// 출금. 잔고를 초과할 수 없습니다.
    pub async fn withdraw(&self, user_id: &str, amount: Decimal) -> LedgerResult<()> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidMoney);
        }

        let balance = self.accounts.get_balance(user_id).await?;
        if amount > balance {
            return Err(LedgerError::InsufficientBalance);
        }

        let entry = BalanceHistoryEntry::new(amount, BalanceMethod::Withdraw);
        self.accounts
            .withdraw(user_id, amount, entry)
            .await
            .map_err(|e| match e {
                // 읽기와 적용 사이에 잔고가 줄어든 경우
                StoreError::Conflict(_) => LedgerError::InsufficientBalance,
                other => other.into(),
            })?;
        self.invalidate_balance(user_id).await;

        info!(%user_id, %amount, "withdrawal applied");
        Ok(())
    }

    // ==================== 관심 종목 ====================

    /// 관심 종목을 추가합니다. 중복 추가는 거부됩니다.
    pub async fn set_favorite(&self, user_id: &str, stock_id: &str) -> LedgerResult<()> {
        if stock_id.trim().is_empty() {
            return Err(LedgerError::InvalidStock);
        }

        self.accounts
            .set_favorite(user_id, stock_id)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => LedgerError::AlreadyFavorited,
                other => other.into(),
            })?;

        cache::invalidate(
            self.cache.as_ref(),
            &[keys::favorites(user_id), keys::account(user_id)],
        )
        .await;
        Ok(())
    }

    /// 관심 종목을 제거합니다. 없는 종목 제거는 에러가 아닙니다.
    pub async fn delete_favorite(&self, user_id: &str, stock_id: &str) -> LedgerResult<()> {
        self.accounts.delete_favorite(user_id, stock_id).await?;

        cache::invalidate(
            self.cache.as_ref(),
            &[keys::favorites(user_id), keys::account(user_id)],
        )
        .await;
        Ok(())
    }

    // ==================== 조회 (cache-aside) ====================

    /// 현금 잔고를 조회합니다.
    pub async fn get_balance(&self, user_id: &str) -> LedgerResult<Decimal> {
        let key = keys::balance(user_id);
        let accounts = self.accounts.clone();
        let user = user_id.to_string();
        let balance = read_through(self.cache.as_ref(), &key, self.config.cache_ttl_secs, || {
            async move { accounts.get_balance(&user).await }
        })
        .await?;
        Ok(balance)
    }

    /// 관심 종목 목록을 조회합니다.
    pub async fn get_favorites(&self, user_id: &str) -> LedgerResult<Vec<String>> {
        let key = keys::favorites(user_id);
        let accounts = self.accounts.clone();
        let user = user_id.to_string();
        let favorites = read_through(self.cache.as_ref(), &key, self.config.cache_ttl_secs, || {
            async move { accounts.get_favorites(&user).await }
        })
        .await?;
        Ok(favorites)
    }

    /// 입출금 내역을 조회합니다. 최신순, 페이지당 10개.
    pub async fn get_balance_history(
        &self,
        user_id: &str,
        method: Option<BalanceMethod>,
        page: usize,
    ) -> LedgerResult<Vec<BalanceHistoryEntry>> {
        let key = keys::balance_history(user_id, method, page);
        let accounts = self.accounts.clone();
        let user = user_id.to_string();
        let page_size = self.config.history_page_size;
        let entries = read_through(self.cache.as_ref(), &key, self.config.cache_ttl_secs, || {
            async move {
                accounts
                    .get_balance_history(&user, method, page, page_size)
                    .await
            }
        })
        .await?;
        Ok(entries)
    }

    /// 거래 내역을 조회합니다. 최신순, 페이지당 10개.
    pub async fn get_trade_history(
        &self,
        user_id: &str,
        stock_id: Option<&str>,
        page: usize,
    ) -> LedgerResult<Vec<TradeHistoryEntry>> {
        let key = keys::trade_history(user_id, stock_id, page);
        let accounts = self.accounts.clone();
        let user = user_id.to_string();
        let stock = stock_id.map(|s| s.to_string());
        let page_size = self.config.history_page_size;
        let entries = read_through(self.cache.as_ref(), &key, self.config.cache_ttl_secs, || {
            async move {
                accounts
                    .get_trade_history(&user, stock.as_deref(), page, page_size)
                    .await
            }
        })
        .await?;
        Ok(entries)
    }

    // ==================== 내부 ====================

    async fn invalidate_balance(&self, user_id: &str) {
        cache::invalidate(
            self.cache.as_ref(),
            &[keys::balance(user_id), keys::account(user_id)],
        )
        .await;
        cache::invalidate_pattern(self.cache.as_ref(), &keys::balance_history_pattern(user_id))
            .await;
    }

    async fn invalidate_user(&self, user_id: &str) {
        cache::invalidate(
            self.cache.as_ref(),
            &[
                keys::account(user_id),
                keys::balance(user_id),
                keys::favorites(user_id),
            ],
        )
        .await;
        cache::invalidate_pattern(self.cache.as_ref(), &keys::balance_history_pattern(user_id))
            .await;
        cache::invalidate_pattern(self.cache.as_ref(), &keys::trade_history_pattern(user_id))
            .await;
    }
}
