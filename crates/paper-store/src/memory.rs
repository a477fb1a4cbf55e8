//! 인메모리 저장소 구현.
//!
//! 시뮬레이션 서버의 기본 저장소이자 테스트의 참조 구현입니다.
//! 계좌 변경 연산은 하나의 쓰기 잠금 임계 구역 안에서 수행되므로
//! 잔고 + 포지션 + 내역의 3중 갱신이 원자적으로 적용됩니다.

use std::collections::HashMap;

use async_trait::async_trait;
use paper_core::{
    Account, BalanceHistoryEntry, BalanceMethod, Candle, NewAccount, Position, StockRecord,
    StockSummary, StockTradeEntry, TradeHistoryEntry,
};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::account::AccountStore;
use crate::error::{Result, StoreError};
use crate::stock::StockStore;

/// 인메모리 계좌 저장소.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryAccountStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }
}

/// 최신순 페이지 조회.
///
/// 내역은 시간순 append-only이므로 역방향 순회가 곧 최신순입니다.
fn page_desc<T: Clone>(
    entries: &[T],
    filter: impl Fn(&T) -> bool,
    page: usize,
    page_size: usize,
) -> Vec<T> {
    entries
        .iter()
        .rev()
        .filter(|e| filter(e))
        .skip(page * page_size)
        .take(page_size)
        .cloned()
        .collect()
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, input: NewAccount) -> Result<String> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&input.user_id) {
            return Err(StoreError::Duplicate(format!("account {}", input.user_id)));
        }
        let account = Account::from_new(input);
        let user_id = account.user_id.clone();
        accounts.insert(user_id.clone(), account);
        Ok(user_id)
    }

    async fn get_account(&self, user_id: &str) -> Result<Account> {
        let accounts = self.accounts.read().await;
        accounts
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))
    }

    async fn get_balance(&self, user_id: &str) -> Result<Decimal> {
        let accounts = self.accounts.read().await;
        accounts
            .get(user_id)
            .map(|a| a.balance)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))
    }

    async fn get_favorites(&self, user_id: &str) -> Result<Vec<String>> {
        let accounts = self.accounts.read().await;
        accounts
            .get(user_id)
            .map(|a| a.favorites.clone())
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))
    }

    async fn get_balance_history(
        &self,
        user_id: &str,
        method: Option<BalanceMethod>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<BalanceHistoryEntry>> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;

        Ok(page_desc(
            &account.balance_history,
            |e| method.map(|m| e.method == m).unwrap_or(true),
            page,
            page_size,
        ))
    }

    async fn get_trade_history(
        &self,
        user_id: &str,
        stock_id: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<TradeHistoryEntry>> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;

        Ok(page_desc(
            &account.trade_history,
            |e| stock_id.map(|s| e.stock_id == s).unwrap_or(true),
            page,
            page_size,
        ))
    }

    async fn apply_buy(
        &self,
        user_id: &str,
        stock_id: &str,
        amount: u64,
        value: Decimal,
        entry: TradeHistoryEntry,
    ) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;

        // 적용 시점 재검증: 호출자의 읽기 이후 잔고가 바뀌었을 수 있음
        if value > account.balance {
            return Err(StoreError::Conflict(format!(
                "balance {} below order value {}",
                account.balance, value
            )));
        }

        account.balance -= value;
        match account.positions.iter_mut().find(|p| p.stock_id == stock_id) {
            Some(position) => position.amount += amount,
            None => account.positions.push(Position {
                stock_id: stock_id.to_string(),
                amount,
            }),
        }
        account.trade_history.push(entry);
        Ok(())
    }

    async fn apply_sale(
        &self,
        user_id: &str,
        stock_id: &str,
        amount: u64,
        value: Decimal,
        entry: TradeHistoryEntry,
    ) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;

        let index = account
            .positions
            .iter()
            .position(|p| p.stock_id == stock_id)
            .ok_or_else(|| StoreError::Conflict(format!("no position for {}", stock_id)))?;

        if amount > account.positions[index].amount {
            return Err(StoreError::Conflict(format!(
                "position {} below sale amount {}",
                account.positions[index].amount, amount
            )));
        }

        if account.positions[index].amount == amount {
            // 전량 매도 - 포지션은 0으로 남기지 않고 제거
            account.positions.remove(index);
        } else {
            account.positions[index].amount -= amount;
        }
        account.balance += value;
        account.trade_history.push(entry);
        Ok(())
    }

    async fn deposit(
        &self,
        user_id: &str,
        amount: Decimal,
        entry: BalanceHistoryEntry,
    ) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;

        account.balance += amount;
        account.balance_history.push(entry);
        Ok(())
    }

    async fn withdraw(
        &self,
        user_id: &str,
        amount: Decimal,
        entry: BalanceHistoryEntry,
    ) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;

        if amount > account.balance {
            return Err(StoreError::Conflict(format!(
                "balance {} below withdrawal {}",
                account.balance, amount
            )));
        }

        account.balance -= amount;
        account.balance_history.push(entry);
        Ok(())
    }

    async fn set_favorite(&self, user_id: &str, stock_id: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;

        if account.has_favorite(stock_id) {
            return Err(StoreError::Duplicate(format!("favorite {}", stock_id)));
        }
        account.favorites.push(stock_id.to_string());
        Ok(())
    }

    async fn delete_favorite(&self, user_id: &str, stock_id: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))?;

        account.favorites.retain(|s| s != stock_id);
        Ok(())
    }

    async fn delete_account(&self, user_id: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts
            .remove(user_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("account {}", user_id)))
    }
}

/// 인메모리 종목 저장소.
#[derive(Debug, Default)]
pub struct MemoryStockStore {
    stocks: RwLock<HashMap<String, StockRecord>>,
}

impl MemoryStockStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn create_stock(&self, record: StockRecord) -> Result<String> {
        let mut stocks = self.stocks.write().await;
        if stocks.contains_key(&record.stock_id) {
            return Err(StoreError::Duplicate(format!("stock {}", record.stock_id)));
        }
        let stock_id = record.stock_id.clone();
        stocks.insert(stock_id.clone(), record);
        Ok(stock_id)
    }

    async fn get_stock(&self, stock_id: &str) -> Result<StockRecord> {
        let stocks = self.stocks.read().await;
        stocks
            .get(stock_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("stock {}", stock_id)))
    }

    async fn get_price(&self, stock_id: &str) -> Result<Decimal> {
        let stocks = self.stocks.read().await;
        stocks
            .get(stock_id)
            .map(|s| s.price)
            .ok_or_else(|| StoreError::NotFound(format!("stock {}", stock_id)))
    }

    async fn list_stocks(&self) -> Result<Vec<StockSummary>> {
        let stocks = self.stocks.read().await;
        let mut summaries: Vec<StockSummary> = stocks.values().map(StockSummary::from).collect();
        summaries.sort_by(|a, b| a.sign.cmp(&b.sign));
        Ok(summaries)
    }

    async fn append_trade(&self, stock_id: &str, entry: StockTradeEntry) -> Result<()> {
        let mut stocks = self.stocks.write().await;
        let stock = stocks
            .get_mut(stock_id)
            .ok_or_else(|| StoreError::NotFound(format!("stock {}", stock_id)))?;

        stock.history.push(entry);
        Ok(())
    }

    async fn get_history(&self, stock_id: &str) -> Result<Vec<StockTradeEntry>> {
        let stocks = self.stocks.read().await;
        stocks
            .get(stock_id)
            .map(|s| s.history.clone())
            .ok_or_else(|| StoreError::NotFound(format!("stock {}", stock_id)))
    }

    async fn get_graph(&self, stock_id: &str) -> Result<Vec<Candle>> {
        let stocks = self.stocks.read().await;
        stocks
            .get(stock_id)
            .map(|s| Candle::from_trades(&s.history))
            .ok_or_else(|| StoreError::NotFound(format!("stock {}", stock_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use paper_core::{OrderMethod, OrderType};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn new_account(user_id: &str) -> NewAccount {
        NewAccount {
            user_id: user_id.to_string(),
            name: "tester".to_string(),
            email: "tester@example.com".to_string(),
            profile_image: None,
        }
    }

    fn buy_entry(stock_id: &str, price: Decimal, amount: u64) -> TradeHistoryEntry {
        TradeHistoryEntry::pending(stock_id, price, amount, OrderType::Order, OrderMethod::Buy)
    }

    async fn seeded_store(balance: Decimal) -> MemoryAccountStore {
        let store = MemoryAccountStore::new();
        store.create(new_account("u-1")).await.unwrap();
        store
            .deposit(
                "u-1",
                balance,
                BalanceHistoryEntry::new(balance, BalanceMethod::Deposit),
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate() {
        let store = MemoryAccountStore::new();
        store.create(new_account("u-1")).await.unwrap();

        let result = store.create(new_account("u-1")).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_apply_buy_creates_and_increments_position() {
        let store = seeded_store(dec!(1000)).await;

        store
            .apply_buy("u-1", "AAPL", 10, dec!(500), buy_entry("AAPL", dec!(50), 10))
            .await
            .unwrap();

        let account = store.get_account("u-1").await.unwrap();
        assert_eq!(account.balance, dec!(500));
        assert_eq!(account.position_amount("AAPL"), 10);
        assert_eq!(account.trade_history.len(), 1);

        store
            .apply_buy("u-1", "AAPL", 10, dec!(500), buy_entry("AAPL", dec!(50), 10))
            .await
            .unwrap();

        let account = store.get_account("u-1").await.unwrap();
        assert_eq!(account.balance, dec!(0));
        assert_eq!(account.position_amount("AAPL"), 20);
        // 종목당 포지션은 하나만
        assert_eq!(account.positions.len(), 1);
    }

    #[tokio::test]
    async fn test_apply_sale_removes_consumed_position() {
        let store = seeded_store(dec!(1000)).await;
        store
            .apply_buy("u-1", "AAPL", 10, dec!(500), buy_entry("AAPL", dec!(50), 10))
            .await
            .unwrap();

        store
            .apply_sale(
                "u-1",
                "AAPL",
                10,
                dec!(600),
                TradeHistoryEntry::pending("AAPL", dec!(60), 10, OrderType::Order, OrderMethod::Sale),
            )
            .await
            .unwrap();

        let account = store.get_account("u-1").await.unwrap();
        assert!(account.positions.is_empty());
        assert_eq!(account.balance, dec!(1100));
    }

    #[tokio::test]
    async fn test_apply_sale_conflict_leaves_state_unchanged() {
        let store = seeded_store(dec!(1000)).await;
        store
            .apply_buy("u-1", "AAPL", 5, dec!(250), buy_entry("AAPL", dec!(50), 5))
            .await
            .unwrap();

        let result = store
            .apply_sale(
                "u-1",
                "AAPL",
                6,
                dec!(360),
                TradeHistoryEntry::pending("AAPL", dec!(60), 6, OrderType::Order, OrderMethod::Sale),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        let account = store.get_account("u-1").await.unwrap();
        assert_eq!(account.position_amount("AAPL"), 5);
        assert_eq!(account.balance, dec!(750));
        assert_eq!(account.trade_history.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_buys_cannot_overdraw() {
        let store = Arc::new(seeded_store(dec!(100)).await);

        let mut handles = Vec::new();
        for _ in 0..2 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .apply_buy("u-1", "AAPL", 1, dec!(80), buy_entry("AAPL", dec!(80), 1))
                    .await
            }));
        }

        let mut ok = 0;
        let mut conflict = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(StoreError::Conflict(_)) => conflict += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(ok, 1);
        assert_eq!(conflict, 1);
        let balance = store.get_balance("u-1").await.unwrap();
        assert_eq!(balance, dec!(20));
    }

    #[tokio::test]
    async fn test_withdraw_conflict_on_insufficient_balance() {
        let store = seeded_store(dec!(100)).await;

        let result = store
            .withdraw(
                "u-1",
                dec!(150),
                BalanceHistoryEntry::new(dec!(150), BalanceMethod::Withdraw),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.get_balance("u-1").await.unwrap(), dec!(100));
    }

    #[tokio::test]
    async fn test_favorites_duplicate_and_idempotent_delete() {
        let store = seeded_store(dec!(0)).await;

        store.set_favorite("u-1", "AAPL").await.unwrap();
        let result = store.set_favorite("u-1", "AAPL").await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));

        let favorites = store.get_favorites("u-1").await.unwrap();
        assert_eq!(favorites, vec!["AAPL".to_string()]);

        store.delete_favorite("u-1", "AAPL").await.unwrap();
        // 없는 종목 제거는 에러가 아님
        store.delete_favorite("u-1", "AAPL").await.unwrap();
        assert!(store.get_favorites("u-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_balance_history_pagination_and_filter() {
        let store = MemoryAccountStore::new();
        store.create(new_account("u-1")).await.unwrap();

        for i in 1..=15i64 {
            store
                .deposit(
                    "u-1",
                    Decimal::from(i),
                    BalanceHistoryEntry {
                        timestamp: Utc::now() + chrono::Duration::seconds(i),
                        amount: Decimal::from(i),
                        method: BalanceMethod::Deposit,
                    },
                )
                .await
                .unwrap();
        }
        store
            .withdraw(
                "u-1",
                dec!(5),
                BalanceHistoryEntry {
                    timestamp: Utc::now() + chrono::Duration::seconds(100),
                    amount: dec!(5),
                    method: BalanceMethod::Withdraw,
                },
            )
            .await
            .unwrap();

        // 첫 페이지는 최신순 10개
        let page0 = store
            .get_balance_history("u-1", None, 0, 10)
            .await
            .unwrap();
        assert_eq!(page0.len(), 10);
        assert_eq!(page0[0].method, BalanceMethod::Withdraw);
        assert_eq!(page0[1].amount, dec!(15));

        let page1 = store
            .get_balance_history("u-1", None, 1, 10)
            .await
            .unwrap();
        assert_eq!(page1.len(), 6);

        // 필터는 구분 일치만 반환
        let withdrawals = store
            .get_balance_history("u-1", Some(BalanceMethod::Withdraw), 0, 10)
            .await
            .unwrap();
        assert_eq!(withdrawals.len(), 1);
    }

    #[tokio::test]
    async fn test_stock_store_roundtrip() {
        let store = MemoryStockStore::new();
        store
            .create_stock(StockRecord {
                stock_id: "s-1".to_string(),
                name: "Apple".to_string(),
                sign: "AAPL".to_string(),
                image: None,
                price: dec!(180),
                created_at: Utc::now(),
                history: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(store.get_price("s-1").await.unwrap(), dec!(180));

        store
            .append_trade(
                "s-1",
                StockTradeEntry {
                    user_id: "u-1".to_string(),
                    timestamp: Utc::now(),
                    price: dec!(181),
                    amount: 3,
                },
            )
            .await
            .unwrap();

        assert_eq!(store.get_history("s-1").await.unwrap().len(), 1);
        assert_eq!(store.get_graph("s-1").await.unwrap().len(), 1);
        assert!(matches!(
            store.get_price("missing").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
