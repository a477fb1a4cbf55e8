//! 계좌 도메인 모델.
//!
//! 사용자 한 명의 금융 상태를 표현합니다:
//! - 현금 잔고 (음수 불가)
//! - 종목별 보유 포지션 (종목당 최대 1개, 수량 0이면 목록에서 제거)
//! - 입출금 내역 및 거래 내역 (append-only)
//! - 관심 종목 목록 (중복 불가)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::TradeHistoryEntry;

/// 입출금 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BalanceMethod {
    /// 입금
    Deposit,
    /// 출금
    Withdraw,
}

impl std::fmt::Display for BalanceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceMethod::Deposit => write!(f, "DEPOSIT"),
            BalanceMethod::Withdraw => write!(f, "WITHDRAW"),
        }
    }
}

impl std::str::FromStr for BalanceMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEPOSIT" => Ok(BalanceMethod::Deposit),
            "WITHDRAW" => Ok(BalanceMethod::Withdraw),
            _ => Err(format!("unknown balance method: {}", s)),
        }
    }
}

/// 입출금 내역 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceHistoryEntry {
    /// 기록 시각
    pub timestamp: DateTime<Utc>,
    /// 입출금 금액 (항상 양수)
    pub amount: Decimal,
    /// 입출금 구분
    pub method: BalanceMethod,
}

impl BalanceHistoryEntry {
    /// 현재 시각으로 새 항목을 생성합니다.
    pub fn new(amount: Decimal, method: BalanceMethod) -> Self {
        Self {
            timestamp: Utc::now(),
            amount,
            method,
        }
    }
}

/// 보유 포지션.
///
/// 목록에 존재하는 동안 `amount > 0`이 유지됩니다.
/// 매도로 수량이 정확히 0이 되면 포지션은 목록에서 제거됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 종목 ID
    pub stock_id: String,
    /// 보유 수량
    pub amount: u64,
}

/// 신규 계좌 입력.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    /// 외부 인증 시스템의 사용자 ID
    pub user_id: String,
    /// 표시 이름
    pub name: String,
    /// 이메일
    pub email: String,
    /// 프로필 이미지 URL
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// 사용자 계좌.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// 사용자 ID (외부 인증 시스템 기준, 불변)
    pub user_id: String,
    /// 표시 이름
    pub name: String,
    /// 이메일
    pub email: String,
    /// 프로필 이미지 URL
    #[serde(default)]
    pub profile_image: Option<String>,
    /// 현금 잔고
    pub balance: Decimal,
    /// 종목별 보유 포지션
    pub positions: Vec<Position>,
    /// 입출금 내역
    pub balance_history: Vec<BalanceHistoryEntry>,
    /// 거래 내역
    pub trade_history: Vec<TradeHistoryEntry>,
    /// 관심 종목 ID 목록
    pub favorites: Vec<String>,
    /// 가입 시각
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// 신규 가입 입력으로 빈 계좌를 생성합니다.
    pub fn from_new(input: NewAccount) -> Self {
        Self {
            user_id: input.user_id,
            name: input.name,
            email: input.email,
            profile_image: input.profile_image,
            balance: Decimal::ZERO,
            positions: Vec::new(),
            balance_history: Vec::new(),
            trade_history: Vec::new(),
            favorites: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// 종목의 보유 포지션을 조회합니다.
    pub fn position(&self, stock_id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.stock_id == stock_id)
    }

    /// 종목의 보유 수량을 조회합니다. 미보유 시 0.
    pub fn position_amount(&self, stock_id: &str) -> u64 {
        self.position(stock_id).map(|p| p.amount).unwrap_or(0)
    }

    /// 관심 종목 등록 여부를 확인합니다.
    pub fn has_favorite(&self, stock_id: &str) -> bool {
        self.favorites.iter().any(|s| s == stock_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_account() -> Account {
        let mut account = Account::from_new(NewAccount {
            user_id: "u-1".to_string(),
            name: "tester".to_string(),
            email: "tester@example.com".to_string(),
            profile_image: None,
        });
        account.balance = dec!(1000);
        account.positions.push(Position {
            stock_id: "AAPL".to_string(),
            amount: 10,
        });
        account.favorites.push("TSLA".to_string());
        account
    }

    #[test]
    fn test_position_lookup() {
        let account = test_account();
        assert_eq!(account.position_amount("AAPL"), 10);
        assert_eq!(account.position_amount("MSFT"), 0);
        assert!(account.position("MSFT").is_none());
    }

    #[test]
    fn test_favorites() {
        let account = test_account();
        assert!(account.has_favorite("TSLA"));
        assert!(!account.has_favorite("AAPL"));
    }

    #[test]
    fn test_balance_method_parse() {
        assert_eq!(
            "DEPOSIT".parse::<BalanceMethod>().unwrap(),
            BalanceMethod::Deposit
        );
        assert_eq!(
            "withdraw".parse::<BalanceMethod>().unwrap(),
            BalanceMethod::Withdraw
        );
        assert!("transfer".parse::<BalanceMethod>().is_err());
    }

    #[test]
    fn test_balance_method_serde() {
        let json = serde_json::to_string(&BalanceMethod::Deposit).unwrap();
        assert_eq!(json, r#""DEPOSIT""#);
    }
}
