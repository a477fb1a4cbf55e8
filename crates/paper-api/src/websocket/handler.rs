//! WebSocket 연결 handler.
//!
//! Axum WebSocket 엔드포인트와 연결별 reader/writer 루프.
//!
//! 연결 하나당 루프 두 개가 돕니다:
//! - writer: 허브가 보낸 페이로드 전달 + 폴링 틱마다 공급자 데이터 전송
//!   + keep-alive ping
//! - reader: 유휴 데드라인 아래에서 수신, 텍스트 프레임은 허브
//!   브로드캐스트로 전달
//!
//! 어느 쪽이든 끝나면 다른 쪽을 중단하고 구독을 해제합니다. 정리는
//! 항상 연결 범위에서 일어나며, 허브 전역 정리는 없습니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use paper_core::config::StreamConfig;

use super::feed::StockFeed;
use super::hub::{Connection, HubHandle, Subscription};
use super::messages::StreamMessage;
use super::topic::Topic;
use crate::metrics::{decrement_websocket_connections, increment_websocket_connections};

/// WebSocket 상태.
#[derive(Clone)]
pub struct WsState {
    /// 허브 제어 핸들
    pub hub: HubHandle,
    /// 토픽별 데이터 공급자
    pub feed: Arc<StockFeed>,
    /// 스트림 설정
    pub config: StreamConfig,
}

impl WsState {
    /// 새로운 WebSocket 상태 생성.
    pub fn new(hub: HubHandle, feed: Arc<StockFeed>, config: StreamConfig) -> Self {
        Self { hub, feed, config }
    }
}

/// WebSocket 쿼리 파라미터.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// 방 키 (예: "price-AAPL")
    pub room: String,
}

/// WebSocket 업그레이드 핸들러.
///
/// # 엔드포인트
///
/// `GET /ws?room=price-<stockId>`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<WsState>,
) -> Response {
    match Topic::from_room(&query.room) {
        Some(topic) => ws.on_upgrade(move |socket| handle_socket(socket, state, topic)),
        None => (StatusCode::BAD_REQUEST, "unknown room").into_response(),
    }
}

/// WebSocket 연결 처리.
async fn handle_socket(socket: WebSocket, state: WsState, topic: Topic) {
    let room = topic.room();
    let (conn, outbound_rx) = Connection::new(state.config.send_buffer);
    let conn_id = conn.id;

    let subscription = Subscription {
        room: room.clone(),
        conn,
    };
    state.hub.register(subscription.clone()).await;
    increment_websocket_connections();
    info!(%conn_id, %room, "WebSocket connected");

    let (sender, receiver) = socket.split();

    let mut write_task = tokio::spawn(write_loop(
        sender,
        outbound_rx,
        state.feed.clone(),
        topic,
        state.config.clone(),
    ));
    let mut read_task = tokio::spawn(read_loop(
        receiver,
        state.hub.clone(),
        room.clone(),
        state.config.pong_wait_secs,
    ));

    tokio::select! {
        _ = &mut write_task => {
            debug!(%conn_id, "write loop ended");
            read_task.abort();
        }
        _ = &mut read_task => {
            debug!(%conn_id, "read loop ended");
            write_task.abort();
        }
    }

    state.hub.unregister(subscription).await;
    decrement_websocket_connections();
    info!(%conn_id, %room, "WebSocket disconnected");
}

/// writer 루프.
async fn write_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<String>,
    feed: Arc<StockFeed>,
    topic: Topic,
    config: StreamConfig,
) {
    let mut poll = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ping = tokio::time::interval(Duration::from_secs(config.ping_period_secs));
    ping.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // interval의 첫 틱은 즉시 발화하므로 ping이 폴링보다 먼저 가지 않게 한 번 소비
    ping.tick().await;

    loop {
        tokio::select! {
            delivered = outbound.recv() => {
                match delivered {
                    Some(text) => {
                        if sender.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    // 허브가 연결을 제거하고 송신 단을 버린 경우
                    None => break,
                }
            }
            _ = poll.tick() => {
                match feed.fetch(&topic).await {
                    Ok(message) => match message.to_json() {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "stream message serialization failed"),
                    },
                    // 공급자 오류는 이번 틱만 건너뛴다
                    Err(e) => warn!(error = %e, "feed fetch failed"),
                }
            }
            _ = ping.tick() => {
                if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// reader 루프.
///
/// 어떤 프레임이든 수신하면 유휴 데드라인이 갱신됩니다. 텍스트 프레임은
/// 같은 방으로 되울립니다.
async fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    hub: HubHandle,
    room: String,
    pong_wait_secs: u64,
) {
    let idle = Duration::from_secs(pong_wait_secs);

    loop {
        match tokio::time::timeout(idle, receiver.next()).await {
            Err(_) => {
                debug!(%room, "read idle timeout");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                debug!(%room, error = %e, "read error");
                break;
            }
            Ok(Some(Ok(Message::Text(text)))) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                if let Ok(json) = StreamMessage::chat(&room, text).to_json() {
                    hub.broadcast(&room, json).await;
                }
            }
            Ok(Some(Ok(Message::Close(_)))) => break,
            // ping/pong/binary는 데드라인 갱신 역할만 한다
            Ok(Some(Ok(_))) => {}
        }
    }
}

/// WebSocket 라우터 생성.
pub fn websocket_router(ws_state: WsState) -> Router {
    Router::new()
        .route("/", get(websocket_handler))
        .with_state(ws_state)
}
