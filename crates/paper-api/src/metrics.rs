//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! 주문/스트림 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 패닉
///
/// 레코더가 이미 설치되어 있으면 패닉합니다.
pub fn setup_metrics_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Prometheus 레코더 설치 실패")
}

/// 주문 카운터 증가.
pub fn record_order(method: &str, outcome: &str) {
    counter!(
        "trading_orders_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// WebSocket 연결 수 증가.
pub fn increment_websocket_connections() {
    gauge!("websocket_connections_active").increment(1.0);
}

/// WebSocket 연결 수 감소.
pub fn decrement_websocket_connections() {
    gauge!("websocket_connections_active").decrement(1.0);
}

/// 브로드캐스트에서 떨어져 나간 구독자 기록.
pub fn record_dropped_broadcast(room: &str) {
    counter!(
        "websocket_broadcast_dropped_total",
        "room" => room.to_string()
    )
    .increment(1);
}
