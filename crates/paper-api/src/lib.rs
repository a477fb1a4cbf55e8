//! REST API 및 WebSocket 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 실시간 업데이트를 위한 WebSocket 서버 (방 단위 브로드캐스트 허브)
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`websocket`]: 브로드캐스트 허브와 연결별 스트림 루프
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod error;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod websocket;

pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use openapi::swagger_ui_router;
pub use routes::create_api_router;
pub use state::AppState;
pub use websocket::{
    websocket_router, Hub, HubHandle, StockFeed, StreamMessage, Subscription, Topic, WsState,
};
