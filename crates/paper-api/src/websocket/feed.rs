//! 구독자 데이터 공급자.
//!
//! writer 루프의 틱마다 토픽 종류에 맞는 최신 데이터를 종목 저장소에서
//! 읽어 스트림 메시지로 만듭니다.

use std::sync::Arc;

use chrono::Utc;
use paper_store::StockStore;

use super::messages::{StreamMessage, WsError};
use super::topic::Topic;

/// 체결 피드 한 번에 싣는 최대 체결 수.
const TRADE_FEED_LIMIT: usize = 20;

/// 토픽별 데이터 공급자.
pub struct StockFeed {
    stocks: Arc<dyn StockStore>,
}

impl StockFeed {
    /// 새 공급자를 생성합니다.
    pub fn new(stocks: Arc<dyn StockStore>) -> Self {
        Self { stocks }
    }

    /// 토픽의 최신 데이터를 읽어 스트림 메시지로 만듭니다.
    pub async fn fetch(&self, topic: &Topic) -> Result<StreamMessage, WsError> {
        let timestamp = Utc::now().timestamp_millis();

        match topic {
            Topic::Price(stock_id) => {
                let price = self
                    .stocks
                    .get_price(stock_id)
                    .await
                    .map_err(|e| WsError::FeedError(e.to_string()))?;

                Ok(StreamMessage::Price {
                    room: topic.room(),
                    stock_id: stock_id.clone(),
                    price,
                    timestamp,
                })
            }
            Topic::Trades(stock_id) => {
                let history = self
                    .stocks
                    .get_history(stock_id)
                    .await
                    .map_err(|e| WsError::FeedError(e.to_string()))?;

                // 최신순으로 최근 체결만
                let trades = history.into_iter().rev().take(TRADE_FEED_LIMIT).collect();

                Ok(StreamMessage::Trades {
                    room: topic.room(),
                    stock_id: stock_id.clone(),
                    trades,
                    timestamp,
                })
            }
            Topic::Graph(stock_id) => {
                let candles = self
                    .stocks
                    .get_graph(stock_id)
                    .await
                    .map_err(|e| WsError::FeedError(e.to_string()))?;

                Ok(StreamMessage::Graph {
                    room: topic.room(),
                    stock_id: stock_id.clone(),
                    candles,
                    timestamp,
                })
            }
        }
    }
}
