//! 도메인 모델.
//!
//! - [`account`]: 계좌, 포지션, 입출금/거래 내역
//! - [`order`]: 주문 요청 및 주문 enum 타입
//! - [`stock`]: 종목 레코드, 체결 내역, 캔들

pub mod account;
pub mod order;
pub mod stock;

pub use account::*;
pub use order::*;
pub use stock::*;
