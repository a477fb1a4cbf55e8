//! 종목 도메인 모델.
//!
//! 종목 레코드는 컬렉션 관리자가 소유하는 외부 엔티티입니다.
//! 주문 실행기는 현재가를 읽고, 체결 시 종목의 거래 내역에 항목을
//! 추가하는 부수 효과만 가집니다.

use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 종목의 체결 내역 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTradeEntry {
    /// 체결한 사용자 ID
    pub user_id: String,
    /// 체결 시각
    pub timestamp: DateTime<Utc>,
    /// 체결 가격
    pub price: Decimal,
    /// 체결 수량
    pub amount: u64,
}

/// 종목 레코드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    /// 종목 ID
    pub stock_id: String,
    /// 종목명
    pub name: String,
    /// 티커 심볼
    pub sign: String,
    /// 종목 이미지 URL
    #[serde(default)]
    pub image: Option<String>,
    /// 현재가
    pub price: Decimal,
    /// 등록 시각
    pub created_at: DateTime<Utc>,
    /// 체결 내역
    pub history: Vec<StockTradeEntry>,
}

/// 종목 목록 요약.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSummary {
    /// 종목 ID
    pub stock_id: String,
    /// 티커 심볼
    pub sign: String,
    /// 현재가
    pub price: Decimal,
}

impl From<&StockRecord> for StockSummary {
    fn from(record: &StockRecord) -> Self {
        Self {
            stock_id: record.stock_id.clone(),
            sign: record.sign.clone(),
            price: record.price,
        }
    }
}

/// 분 단위 캔들.
///
/// 그래프 스트림 토픽이 사용하는 체결 내역의 분 단위 집계입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시각 (분 경계)
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 체결 수량 합계
    pub volume: u64,
}

impl Candle {
    /// 체결 내역을 분 단위 캔들로 집계합니다.
    ///
    /// 입력은 시간 오름차순으로 정렬되어 있다고 가정합니다.
    pub fn from_trades(trades: &[StockTradeEntry]) -> Vec<Candle> {
        let mut candles: Vec<Candle> = Vec::new();

        for trade in trades {
            let bucket = minute_floor(trade.timestamp);
            match candles.last_mut() {
                Some(candle) if candle.open_time == bucket => {
                    candle.high = candle.high.max(trade.price);
                    candle.low = candle.low.min(trade.price);
                    candle.close = trade.price;
                    candle.volume += trade.amount;
                }
                _ => candles.push(Candle {
                    open_time: bucket,
                    open: trade.price,
                    high: trade.price,
                    low: trade.price,
                    close: trade.price,
                    volume: trade.amount,
                }),
            }
        }

        candles
    }
}

fn minute_floor(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
