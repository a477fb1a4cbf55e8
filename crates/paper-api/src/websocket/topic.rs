//! 스트림 토픽.
//!
//! 방 키의 접두사가 구독 데이터의 종류를 결정합니다:
//!
//! - `price-<stockId>` - 현재가
//! - `tx-<stockId>` - 체결 피드
//! - `graph-<stockId>` - 분 단위 캔들

/// 구독 토픽.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// 현재가 스트림
    Price(String),
    /// 체결 스트림
    Trades(String),
    /// 캔들 그래프 스트림
    Graph(String),
}

impl Topic {
    /// 방 키에서 토픽을 파싱합니다.
    ///
    /// 쿼리 파라미터로 들어오므로 앞뒤 공백은 무시합니다.
    pub fn from_room(room: &str) -> Option<Self> {
        let room = room.trim();

        if let Some(stock_id) = room.strip_prefix("price-") {
            (!stock_id.is_empty()).then(|| Topic::Price(stock_id.to_string()))
        } else if let Some(stock_id) = room.strip_prefix("tx-") {
            (!stock_id.is_empty()).then(|| Topic::Trades(stock_id.to_string()))
        } else if let Some(stock_id) = room.strip_prefix("graph-") {
            (!stock_id.is_empty()).then(|| Topic::Graph(stock_id.to_string()))
        } else {
            None
        }
    }

    /// 토픽이 가리키는 종목 ID.
    pub fn stock_id(&self) -> &str {
        match self {
            Topic::Price(stock_id) | Topic::Trades(stock_id) | Topic::Graph(stock_id) => stock_id,
        }
    }

    /// 정규화된 방 키.
    pub fn room(&self) -> String {
        match self {
            Topic::Price(stock_id) => format!("price-{}", stock_id),
            Topic::Trades(stock_id) => format!("tx-{}", stock_id),
            Topic::Graph(stock_id) => format!("graph-{}", stock_id),
        }
    }
}
