//! 원장 불변식 property 테스트.
//!
//! 임의의 입금/출금/매수/매도 시퀀스를 적용해도 다음이 유지되어야 합니다:
//! - 잔고는 절대 음수가 되지 않는다
//! - 종목별 포지션은 성공한 매수 - 매도 수량의 합과 일치한다
//! - 잔고는 성공한 연산들의 정확한 합산과 일치한다

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use paper_core::{NewAccount, OrderRequest, StockRecord};
use paper_ledger::{LedgerConfig, LedgerOperations, OrderExecutor};
use paper_store::{
    AccountStore, MemoryAccountStore, MemoryCache, MemoryStockStore, StockStore,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const STOCKS: [&str; 2] = ["AAPL", "TSLA"];

#[derive(Debug, Clone)]
enum Op {
    Deposit(u32),
    Withdraw(u32),
    Buy { stock: usize, price: u32, amount: u64 },
    Sale { stock: usize, price: u32, amount: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..500).prop_map(Op::Deposit),
        (1u32..500).prop_map(Op::Withdraw),
        (0usize..2, 1u32..20, 1u64..10).prop_map(|(stock, price, amount)| Op::Buy {
            stock,
            price,
            amount
        }),
        (0usize..2, 1u32..20, 1u64..10).prop_map(|(stock, price, amount)| Op::Sale {
            stock,
            price,
            amount
        }),
    ]
}

fn order(stock: usize, price: u32, amount: u64, method: &str) -> OrderRequest {
    OrderRequest {
        user_id: "u-1".to_string(),
        stock_id: STOCKS[stock].to_string(),
        price: Decimal::from(price),
        amount,
        order_type: "order".to_string(),
        order_method: method.to_string(),
    }
}

async fn build_fixture() -> (LedgerOperations, OrderExecutor, Arc<MemoryAccountStore>) {
    let accounts = Arc::new(MemoryAccountStore::new());
    let stocks = Arc::new(MemoryStockStore::new());
    let cache = Arc::new(MemoryCache::new());

    accounts
        .create(NewAccount {
            user_id: "u-1".to_string(),
            name: "prop".to_string(),
            email: "prop@example.com".to_string(),
            profile_image: None,
        })
        .await
        .unwrap();

    for sign in STOCKS {
        stocks
            .create_stock(StockRecord {
                stock_id: sign.to_string(),
                name: sign.to_string(),
                sign: sign.to_string(),
                image: None,
                price: dec!(10),
                created_at: Utc::now(),
                history: Vec::new(),
            })
            .await
            .unwrap();
    }

    let ledger = LedgerOperations::new(accounts.clone(), cache.clone(), LedgerConfig::default());
    let executor = OrderExecutor::new(accounts.clone(), stocks, cache);
    (ledger, executor, accounts)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn balance_and_positions_stay_consistent(ops in prop::collection::vec(op_strategy(), 1..50)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async move {
            let (ledger, executor, accounts) = build_fixture().await;

            let mut expected_balance = Decimal::ZERO;
            let mut expected_positions: HashMap<&str, u64> = HashMap::new();

            for op in ops {
                match op {
                    Op::Deposit(amount) => {
                        let amount = Decimal::from(amount);
                        if ledger.deposit("u-1", amount).await.is_ok() {
                            expected_balance += amount;
                        }
                    }
                    Op::Withdraw(amount) => {
                        let amount = Decimal::from(amount);
                        if ledger.withdraw("u-1", amount).await.is_ok() {
                            expected_balance -= amount;
                        }
                    }
                    Op::Buy { stock, price, amount } => {
                        if executor.buy(order(stock, price, amount, "buy")).await.is_ok() {
                            expected_balance -= Decimal::from(price) * Decimal::from(amount);
                            *expected_positions.entry(STOCKS[stock]).or_insert(0) += amount;
                        }
                    }
                    Op::Sale { stock, price, amount } => {
                        if executor.sale(order(stock, price, amount, "sale")).await.is_ok() {
                            expected_balance += Decimal::from(price) * Decimal::from(amount);
                            *expected_positions.entry(STOCKS[stock]).or_insert(0) -= amount;
                        }
                    }
                }

                // 모든 단계에서 잔고는 음수가 아니어야 한다
                let balance = accounts.get_balance("u-1").await.unwrap();
                prop_assert!(balance >= Decimal::ZERO, "balance went negative: {}", balance);
            }

            let account = accounts.get_account("u-1").await.unwrap();
            prop_assert_eq!(account.balance, expected_balance);

            for sign in STOCKS {
                let expected = expected_positions.get(sign).copied().unwrap_or(0);
                prop_assert_eq!(
                    account.position_amount(sign),
                    expected,
                    "position mismatch for {}",
                    sign
                );
                // 수량 0 포지션은 목록에 남지 않는다
                if expected == 0 {
                    prop_assert!(account.position(sign).is_none());
                }
            }

            Ok(())
        })?;
    }
}

#[tokio::test]
async fn cache_never_serves_stale_balance_after_order() {
    let (ledger, executor, _) = build_fixture().await;

    ledger.deposit("u-1", dec!(1000)).await.unwrap();
    assert_eq!(ledger.get_balance("u-1").await.unwrap(), dec!(1000));

    executor
        .buy(OrderRequest {
            user_id: "u-1".to_string(),
            stock_id: "AAPL".to_string(),
            price: dec!(50),
            amount: 10,
            order_type: "order".to_string(),
            order_method: "buy".to_string(),
        })
        .await
        .unwrap();

    // 주문 실행이 잔고 캐시를 무효화했으므로 조회는 새 값을 반환한다
    assert_eq!(ledger.get_balance("u-1").await.unwrap(), dec!(500));

    let trades = ledger.get_trade_history("u-1", None, 0).await.unwrap();
    assert_eq!(trades.len(), 1);

    let filtered = ledger
        .get_trade_history("u-1", Some("TSLA"), 0)
        .await
        .unwrap();
    assert!(filtered.is_empty());
}
