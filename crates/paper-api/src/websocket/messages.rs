//! WebSocket 스트림 메시지 타입.

use chrono::Utc;
use paper_core::{Candle, StockTradeEntry};
use rust_decimal::Decimal;
use serde::Serialize;

/// WebSocket 에러.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("알 수 없는 방: {0}")]
    UnknownRoom(String),
    #[error("직렬화 실패: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("데이터 공급 실패: {0}")]
    FeedError(String),
}

/// 서버에서 클라이언트로 보내는 스트림 메시지.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// 현재가
    Price {
        /// 방 키
        room: String,
        /// 종목 ID
        stock_id: String,
        /// 현재가
        price: Decimal,
        /// 서버 타임스탬프 (ms)
        timestamp: i64,
    },
    /// 최근 체결 피드
    Trades {
        /// 방 키
        room: String,
        /// 종목 ID
        stock_id: String,
        /// 최신순 체결 목록
        trades: Vec<StockTradeEntry>,
        /// 서버 타임스탬프 (ms)
        timestamp: i64,
    },
    /// 분 단위 캔들 그래프
    Graph {
        /// 방 키
        room: String,
        /// 종목 ID
        stock_id: String,
        /// 캔들 목록
        candles: Vec<Candle>,
        /// 서버 타임스탬프 (ms)
        timestamp: i64,
    },
    /// 같은 방 구독자에게 되울리는 텍스트.
    ///
    /// 범용 프리미티브로 남겨둔 것으로, 트레이딩 토픽은 사용하지 않습니다.
    Chat {
        /// 방 키
        room: String,
        /// 메시지 본문
        text: String,
        /// 서버 타임스탬프 (ms)
        timestamp: i64,
    },
}

impl StreamMessage {
    /// JSON 문자열로 직렬화.
    pub fn to_json(&self) -> Result<String, WsError> {
        serde_json::to_string(self).map_err(WsError::from)
    }

    /// 채팅 메시지 생성 헬퍼.
    pub fn chat(room: impl Into<String>, text: impl Into<String>) -> Self {
        StreamMessage::Chat {
            room: room.into(),
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_serialization() {
        let msg = StreamMessage::Price {
            room: "price-AAPL".to_string(),
            stock_id: "AAPL".to_string(),
            price: dec!(182.5),
            timestamp: 1234567890,
        };
        let json = msg.to_json().unwrap();

        assert!(json.contains(r#""type":"price""#));
        assert!(json.contains("price-AAPL"));
    }

    #[test]
    fn test_chat_helper() {
        let msg = StreamMessage::chat("tx-AAPL", "hello");
        let json = msg.to_json().unwrap();

        assert!(json.contains(r#""type":"chat""#));
        assert!(json.contains("hello"));
    }
}
