//! 실시간 데이터 스트리밍을 위한 WebSocket 서버.
//!
//! # 구독 방(room)
//!
//! 연결은 `GET /ws?room=<key>`로 하나의 방에 들어가며, 세션이 끝날
//! 때까지 그 방에 머뭅니다:
//!
//! - `price-{stockId}` - 현재가
//! - `tx-{stockId}` - 최근 체결 피드
//! - `graph-{stockId}` - 분 단위 캔들
//!
//! # 전달 모델
//!
//! 구독자 데이터는 고정 주기 폴링으로 갱신됩니다. 가격이 실제로 바뀔
//! 때만 푸시하는 것이 아니라 틱마다 공급자를 읽습니다. 지연/처리량
//! 트레이드오프이며, 변경 알림으로 바꾸려면 [`feed`]의 공급자만 갈아
//! 끼우면 됩니다.
//!
//! 브로드캐스트는 best-effort입니다. outbound 버퍼가 가득 찬 구독자는
//! 방에서 제거되고, 브로드캐스터는 절대 기다리지 않습니다.

pub mod feed;
pub mod handler;
pub mod hub;
pub mod messages;
pub mod topic;

pub use feed::StockFeed;
pub use handler::{websocket_handler, websocket_router, WsQuery, WsState};
pub use hub::{Connection, Hub, HubHandle, RoomMessage, Subscription};
pub use messages::{StreamMessage, WsError};
pub use topic::Topic;
