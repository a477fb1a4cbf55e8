//! 주문 실행기.
//!
//! 매수/매도 주문을 검증하고 계좌 원장에 적용합니다.
//!
//! 검증은 다음 순서로 수행되며 각 단계는 고유한 에러 종류로
//! 단락(short-circuit)합니다:
//!
//! 1. 사용자 ID 존재 → `InvalidUser`
//! 2. 필드 누락/0 이하 가격/0 수량 → `InvalidData`
//! 3. 주문 유형 파싱 → `InvalidOrderType`
//! 4. 주문 방법 파싱 및 엔드포인트 일치 → `InvalidOrderMethod`
//! 5. 종목 존재 → `InvalidStock`
//!
//! 체결은 잔고 + 포지션 + 내역을 함께 바꾸는 저장소의 단일 원자
//! 연산입니다. 검증 읽기와 적용 사이에 다른 주문이 끼어들어 선행
//! 조건이 깨지면 저장소가 Conflict를 반환하고, 이는 해당 방향의
//! 부족 에러로 되돌려집니다.

use std::sync::Arc;

use paper_core::{
    LedgerError, LedgerResult, OrderMethod, OrderRequest, OrderType, StockTradeEntry,
    TradeHistoryEntry,
};
use paper_store::{cache, keys, AccountStore, Cache, StockStore, StoreError};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// 주문 실행기.
pub struct OrderExecutor {
    accounts: Arc<dyn AccountStore>,
    stocks: Arc<dyn StockStore>,
    cache: Arc<dyn Cache>,
}

impl OrderExecutor {
    /// 새 주문 실행기를 생성합니다.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        stocks: Arc<dyn StockStore>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            accounts,
            stocks,
            cache,
        }
    }

    /// 매수 주문을 실행합니다. `order_method`는 "buy"여야 합니다.
    pub async fn buy(&self, request: OrderRequest) -> LedgerResult<String> {
        self.execute(request, OrderMethod::Buy).await
    }

    /// 매도 주문을 실행합니다. `order_method`는 "sale"이어야 합니다.
    pub async fn sale(&self, request: OrderRequest) -> LedgerResult<String> {
        self.execute(request, OrderMethod::Sale).await
    }

    async fn execute(
        &self,
        request: OrderRequest,
        entrypoint: OrderMethod,
    ) -> LedgerResult<String> {
        let (order_type, order_method) = validate(&request, entrypoint)?;

        // 종목 존재 확인을 겸한 현재가 조회
        self.stocks
            .get_price(&request.stock_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => LedgerError::InvalidStock,
                other => other.into(),
            })?;

        // 잔고와 포지션을 한 번의 읽기로 가져온다
        let account = self
            .accounts
            .get_account(&request.user_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => LedgerError::InvalidUser,
                other => other.into(),
            })?;

        let value = request.price * Decimal::from(request.amount);
        let entry = TradeHistoryEntry::pending(
            &request.stock_id,
            request.price,
            request.amount,
            order_type,
            order_method,
        );
        let stock_entry = StockTradeEntry {
            user_id: request.user_id.clone(),
            timestamp: entry.timestamp,
            price: request.price,
            amount: request.amount,
        };

        match order_method {
            OrderMethod::Buy => {
                if value > account.balance {
                    return Err(LedgerError::InsufficientBalance);
                }

                self.accounts
                    .apply_buy(&request.user_id, &request.stock_id, request.amount, value, entry)
                    .await
                    .map_err(|e| match e {
                        StoreError::Conflict(msg) => {
                            warn!(user_id = %request.user_id, %msg, "buy lost race, rejecting");
                            LedgerError::InsufficientBalance
                        }
                        other => other.into(),
                    })?;
            }
            OrderMethod::Sale => {
                let held = account
                    .position(&request.stock_id)
                    .ok_or(LedgerError::InvalidStock)?
                    .amount;
                if request.amount > held {
                    return Err(LedgerError::InsufficientStock);
                }

                self.accounts
                    .apply_sale(&request.user_id, &request.stock_id, request.amount, value, entry)
                    .await
                    .map_err(|e| match e {
                        StoreError::Conflict(msg) => {
                            warn!(user_id = %request.user_id, %msg, "sale lost race, rejecting");
                            LedgerError::InsufficientStock
                        }
                        other => other.into(),
                    })?;
            }
        }

        // 부수 효과: 종목 체결 내역 추가
        self.stocks
            .append_trade(&request.stock_id, stock_entry)
            .await
            .map_err(LedgerError::from)?;

        self.invalidate(&request.user_id, &request.stock_id).await;

        info!(
            user_id = %request.user_id,
            stock_id = %request.stock_id,
            method = %order_method,
            amount = request.amount,
            %value,
            "order executed"
        );

        Ok("success".to_string())
    }

    async fn invalidate(&self, user_id: &str, stock_id: &str) {
        cache::invalidate(
            self.cache.as_ref(),
            &[
                keys::account(user_id),
                keys::balance(user_id),
                keys::stock(stock_id),
            ],
        )
        .await;
        cache::invalidate_pattern(self.cache.as_ref(), &keys::trade_history_pattern(user_id))
            .await;
    }
}

/// 주문 선행 조건 검증.
fn validate(
    request: &OrderRequest,
    entrypoint: OrderMethod,
) -> LedgerResult<(OrderType, OrderMethod)> {
    if request.user_id.trim().is_empty() {
        return Err(LedgerError::InvalidUser);
    }

    if request.stock_id.trim().is_empty()
        || request.order_type.is_empty()
        || request.order_method.is_empty()
        || request.price <= Decimal::ZERO
        || request.amount == 0
    {
        return Err(LedgerError::InvalidData);
    }

    let order_type: OrderType = request
        .order_type
        .parse()
        .map_err(|_| LedgerError::InvalidOrderType)?;

    let order_method: OrderMethod = request
        .order_method
        .parse()
        .map_err(|_| LedgerError::InvalidOrderMethod)?;

    if order_method != entrypoint {
        return Err(LedgerError::InvalidOrderMethod);
    }

    Ok((order_type, order_method))
}
