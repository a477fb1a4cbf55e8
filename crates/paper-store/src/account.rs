//! 계좌 저장소 트레이트.
//!
//! 영속 저장소는 이 트레이트 뒤에 숨겨집니다. 질의 언어 자체는
//! 이 크레이트의 관심사가 아닙니다.

use async_trait::async_trait;
use paper_core::{
    Account, BalanceHistoryEntry, BalanceMethod, NewAccount, TradeHistoryEntry,
};
use rust_decimal::Decimal;

use crate::error::Result;

/// 계좌 원장의 영속 저장소.
///
/// `apply_buy`/`apply_sale`/`withdraw`는 잔고 + 포지션 + 내역을 하나의
/// 원자 연산으로 변경해야 합니다. 호출자가 읽은 시점과 적용 시점 사이에
/// 선행 조건(잔고/보유 수량)이 깨졌다면 [`StoreError::Conflict`]를
/// 반환하고 아무것도 변경하지 않아야 합니다.
///
/// [`StoreError::Conflict`]: crate::error::StoreError::Conflict
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 새 계좌를 생성합니다. 이미 존재하는 사용자 ID면 `Duplicate`.
    async fn create(&self, input: NewAccount) -> Result<String>;

    /// 계좌 전체를 조회합니다.
    async fn get_account(&self, user_id: &str) -> Result<Account>;

    /// 현금 잔고를 조회합니다.
    async fn get_balance(&self, user_id: &str) -> Result<Decimal>;

    /// 관심 종목 목록을 조회합니다.
    async fn get_favorites(&self, user_id: &str) -> Result<Vec<String>>;

    /// 입출금 내역을 조회합니다.
    ///
    /// 시간 내림차순, `page`는 0부터 시작하며 페이지당 `page_size`개.
    /// `method`가 주어지면 해당 구분만 반환합니다.
    async fn get_balance_history(
        &self,
        user_id: &str,
        method: Option<BalanceMethod>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<BalanceHistoryEntry>>;

    /// 거래 내역을 조회합니다.
    ///
    /// 시간 내림차순, `stock_id`가 주어지면 해당 종목만 반환합니다.
    async fn get_trade_history(
        &self,
        user_id: &str,
        stock_id: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<TradeHistoryEntry>>;

    /// 매수를 적용합니다: 잔고 차감 + 포지션 증가(또는 생성) + 내역 추가.
    async fn apply_buy(
        &self,
        user_id: &str,
        stock_id: &str,
        amount: u64,
        value: Decimal,
        entry: TradeHistoryEntry,
    ) -> Result<()>;

    /// 매도를 적용합니다: 잔고 증가 + 포지션 감소(0이면 제거) + 내역 추가.
    async fn apply_sale(
        &self,
        user_id: &str,
        stock_id: &str,
        amount: u64,
        value: Decimal,
        entry: TradeHistoryEntry,
    ) -> Result<()>;

    /// 입금을 적용합니다: 잔고 증가 + 내역 추가.
    async fn deposit(
        &self,
        user_id: &str,
        amount: Decimal,
        entry: BalanceHistoryEntry,
    ) -> Result<()>;

    /// 출금을 적용합니다: 잔고 차감 + 내역 추가.
    async fn withdraw(
        &self,
        user_id: &str,
        amount: Decimal,
        entry: BalanceHistoryEntry,
    ) -> Result<()>;

    /// 관심 종목을 추가합니다. 이미 있으면 `Duplicate`.
    async fn set_favorite(&self, user_id: &str, stock_id: &str) -> Result<()>;

    /// 관심 종목을 제거합니다. 없어도 에러가 아닙니다.
    async fn delete_favorite(&self, user_id: &str, stock_id: &str) -> Result<()>;

    /// 계좌를 삭제합니다.
    async fn delete_account(&self, user_id: &str) -> Result<()>;
}
