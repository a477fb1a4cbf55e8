//! 주문 타입.
//!
//! 이 모듈은 주문 처리에 사용되는 타입을 정의합니다:
//! - `OrderMethod` - 주문 방향 (매수/매도)
//! - `OrderType` - 주문 유형 (자동/일반)
//! - `TradeStatus` - 거래 상태
//! - `OrderRequest` - 주문 요청 (와이어 형식)
//! - `TradeHistoryEntry` - 계좌 거래 내역 항목

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 주문 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMethod {
    /// 매수
    Buy,
    /// 매도
    Sale,
}

impl std::fmt::Display for OrderMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderMethod::Buy => write!(f, "buy"),
            OrderMethod::Sale => write!(f, "sale"),
        }
    }
}

impl std::str::FromStr for OrderMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(OrderMethod::Buy),
            "sale" => Ok(OrderMethod::Sale),
            _ => Err(format!("unknown order method: {}", s)),
        }
    }
}

/// 주문 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// 자동 주문 (가격 조건 충족 시 체결)
    Auto,
    /// 일반 주문
    Order,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Auto => write!(f, "auto"),
            OrderType::Order => write!(f, "order"),
        }
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(OrderType::Auto),
            "order" => Ok(OrderType::Order),
            _ => Err(format!("unknown order type: {}", s)),
        }
    }
}

/// 거래 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// 접수됨
    Pending,
    /// 체결 완료
    Success,
    /// 취소됨
    Cancelled,
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeStatus::Pending => write!(f, "pending"),
            TradeStatus::Success => write!(f, "success"),
            TradeStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 주문 요청.
///
/// `order_type`/`order_method`는 와이어에서 온 문자열 그대로 보관되며,
/// 검증 단계에서 enum으로 파싱됩니다. 파싱 실패는 각각
/// `InvalidOrderType`/`InvalidOrderMethod`로 구분됩니다.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    /// 사용자 ID
    pub user_id: String,
    /// 종목 ID
    pub stock_id: String,
    /// 주문 가격
    pub price: Decimal,
    /// 주문 수량
    pub amount: u64,
    /// 주문 유형 ("auto" | "order")
    pub order_type: String,
    /// 주문 방법 ("buy" | "sale")
    pub order_method: String,
}

/// 계좌 거래 내역 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeHistoryEntry {
    /// 기록 시각
    pub timestamp: DateTime<Utc>,
    /// 종목 ID
    pub stock_id: String,
    /// 체결 가격
    pub price: Decimal,
    /// 체결 수량
    pub amount: u64,
    /// 거래 상태
    pub status: TradeStatus,
    /// 주문 유형
    pub order_type: OrderType,
    /// 주문 방법
    pub order_method: OrderMethod,
}

impl TradeHistoryEntry {
    /// 접수 상태의 새 내역 항목을 생성합니다.
    pub fn pending(
        stock_id: impl Into<String>,
        price: Decimal,
        amount: u64,
        order_type: OrderType,
        order_method: OrderMethod,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            stock_id: stock_id.into(),
            price,
            amount,
            status: TradeStatus::Pending,
            order_type,
            order_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_method_parse() {
        assert_eq!("buy".parse::<OrderMethod>().unwrap(), OrderMethod::Buy);
        assert_eq!("sale".parse::<OrderMethod>().unwrap(), OrderMethod::Sale);
        // 대소문자를 구분함 - 와이어 형식은 소문자 고정
        assert!("BUY".parse::<OrderMethod>().is_err());
        assert!("sell".parse::<OrderMethod>().is_err());
    }

    #[test]
    fn test_order_type_parse() {
        assert_eq!("auto".parse::<OrderType>().unwrap(), OrderType::Auto);
        assert_eq!("order".parse::<OrderType>().unwrap(), OrderType::Order);
        assert!("market".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_trade_status_serde() {
        let json = serde_json::to_string(&TradeStatus::Pending).unwrap();
        assert_eq!(json, r#""pending""#);
    }

    #[test]
    fn test_pending_entry() {
        let entry = TradeHistoryEntry::pending(
            "AAPL",
            dec!(50),
            10,
            OrderType::Order,
            OrderMethod::Buy,
        );
        assert_eq!(entry.status, TradeStatus::Pending);
        assert_eq!(entry.amount, 10);
        assert_eq!(entry.order_method, OrderMethod::Buy);
    }
}
