//! 종목 저장소 트레이트.

use async_trait::async_trait;
use paper_core::{Candle, StockRecord, StockSummary, StockTradeEntry};
use rust_decimal::Decimal;

use crate::error::Result;

/// 종목 레코드 저장소.
///
/// 주문 실행기는 현재가 조회와 체결 내역 추가에만 이 저장소를 사용합니다.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// 새 종목을 등록합니다.
    async fn create_stock(&self, record: StockRecord) -> Result<String>;

    /// 종목 레코드를 조회합니다.
    async fn get_stock(&self, stock_id: &str) -> Result<StockRecord>;

    /// 현재가를 조회합니다.
    async fn get_price(&self, stock_id: &str) -> Result<Decimal>;

    /// 전체 종목 요약 목록을 조회합니다.
    async fn list_stocks(&self) -> Result<Vec<StockSummary>>;

    /// 종목의 체결 내역에 항목을 추가합니다.
    async fn append_trade(&self, stock_id: &str, entry: StockTradeEntry) -> Result<()>;

    /// 종목의 체결 내역을 조회합니다.
    async fn get_history(&self, stock_id: &str) -> Result<Vec<StockTradeEntry>>;

    /// 체결 내역의 분 단위 캔들 집계를 조회합니다.
    async fn get_graph(&self, stock_id: &str) -> Result<Vec<Candle>>;
}
