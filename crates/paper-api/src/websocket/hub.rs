//! 브로드캐스트 허브.
//!
//! 방(room)별 구독자 집합을 관리하고 메시지를 팬아웃합니다.
//!
//! 방 멤버십은 단 하나의 제어 루프에서만 변경됩니다. 등록/해제/
//! 브로드캐스트는 각각의 채널을 통해 제어 루프로 직렬화되므로 방 맵에는
//! 잠금이 필요 없습니다. 허브 값 자체는 컴포지션 루트가 소유하며,
//! 엔드포인트에는 [`HubHandle`]만 전달됩니다.
//!
//! 전달 실패(버퍼 가득 참/연결 종료)는 해당 구독자를 방에서 제거할 뿐
//! 브로드캐스터를 막지 않습니다. 뒤처진 구독자는 업데이트를 잃습니다.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::metrics::record_dropped_broadcast;

/// 채널 버퍼 크기. 제어 루프가 소비하는 동안의 버스트만 흡수하면 된다.
const CONTROL_BUFFER: usize = 64;

/// 연결의 송신 단.
///
/// 실제 소켓 쓰기는 연결의 writer 루프가 담당하고, 허브는 outbound
/// 채널의 송신 단만 보관합니다.
#[derive(Debug, Clone)]
pub struct Connection {
    /// 연결 식별자
    pub id: Uuid,
    /// outbound 채널 송신 단
    pub sender: mpsc::Sender<String>,
}

impl Connection {
    /// 새 연결을 생성하고 outbound 수신 단을 함께 반환합니다.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            Self {
                id: Uuid::new_v4(),
                sender: tx,
            },
            rx,
        )
    }
}

/// 연결 하나와 방 하나의 결합.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// 방 키 (예: "price-AAPL")
    pub room: String,
    /// 구독 연결
    pub conn: Connection,
}

/// 방으로 보내는 브로드캐스트 메시지.
#[derive(Debug, Clone)]
pub struct RoomMessage {
    /// 대상 방 키
    pub room: String,
    /// 직렬화된 페이로드
    pub data: String,
}

/// 방 구독자 수 질의.
struct StatsRequest {
    room: String,
    reply: oneshot::Sender<usize>,
}

/// 브로드캐스트 허브.
///
/// [`Hub::run`]을 태스크로 띄운 뒤에는 [`HubHandle`]로만 접근합니다.
pub struct Hub {
    /// 방 키 → (연결 ID → outbound 송신 단)
    rooms: HashMap<String, HashMap<Uuid, mpsc::Sender<String>>>,
    /// 방 키 → 살아있는 구독자 수
    active: HashMap<String, usize>,
    register_rx: mpsc::Receiver<Subscription>,
    unregister_rx: mpsc::Receiver<Subscription>,
    broadcast_rx: mpsc::Receiver<RoomMessage>,
    stats_rx: mpsc::Receiver<StatsRequest>,
}

/// 허브 제어 채널 핸들.
#[derive(Clone)]
pub struct HubHandle {
    register_tx: mpsc::Sender<Subscription>,
    unregister_tx: mpsc::Sender<Subscription>,
    broadcast_tx: mpsc::Sender<RoomMessage>,
    stats_tx: mpsc::Sender<StatsRequest>,
}

impl Hub {
    /// 허브와 핸들 쌍을 생성합니다.
    pub fn new() -> (Self, HubHandle) {
        let (register_tx, register_rx) = mpsc::channel(CONTROL_BUFFER);
        let (unregister_tx, unregister_rx) = mpsc::channel(CONTROL_BUFFER);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(CONTROL_BUFFER);
        let (stats_tx, stats_rx) = mpsc::channel(CONTROL_BUFFER);

        (
            Self {
                rooms: HashMap::new(),
                active: HashMap::new(),
                register_rx,
                unregister_rx,
                broadcast_rx,
                stats_rx,
            },
            HubHandle {
                register_tx,
                unregister_tx,
                broadcast_tx,
                stats_tx,
            },
        )
    }

    /// 제어 루프를 실행합니다.
    ///
    /// 토큰이 취소되거나 모든 핸들이 닫힐 때까지 이벤트를 하나씩
    /// 처리합니다.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Broadcast hub running");

        loop {
            // biased: 멤버십 변경을 질의보다 먼저 소진한다
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,
                Some(subscription) = self.register_rx.recv() => self.register(subscription),
                Some(subscription) = self.unregister_rx.recv() => {
                    self.remove(&subscription.room, subscription.conn.id);
                }
                Some(message) = self.broadcast_rx.recv() => self.broadcast(message),
                Some(request) = self.stats_rx.recv() => {
                    let count = self.active.get(&request.room).copied().unwrap_or(0);
                    let _ = request.reply.send(count);
                }
                else => break,
            }
        }

        info!("Broadcast hub stopped");
    }

    fn register(&mut self, subscription: Subscription) {
        let connections = self.rooms.entry(subscription.room.clone()).or_default();
        connections.insert(subscription.conn.id, subscription.conn.sender);
        *self.active.entry(subscription.room.clone()).or_insert(0) += 1;

        debug!(
            room = %subscription.room,
            subscribers = self.active[&subscription.room],
            "subscriber registered"
        );
    }

    /// 연결을 방에서 제거하고, 마지막 구독자였다면 방도 제거합니다.
    fn remove(&mut self, room: &str, conn_id: Uuid) {
        let Some(connections) = self.rooms.get_mut(room) else {
            return;
        };

        // 브로드캐스트 중 이미 제거된 연결의 해제가 뒤따라올 수 있으므로
        // 실제로 제거된 경우에만 카운터를 줄인다
        if connections.remove(&conn_id).is_none() {
            return;
        }

        let count = self.active.entry(room.to_string()).or_insert(1);
        *count -= 1;

        if *count == 0 {
            self.rooms.remove(room);
            self.active.remove(room);
            debug!(%room, "room removed");
        } else {
            debug!(room = %room, subscribers = *count, "subscriber removed");
        }
    }

    fn broadcast(&mut self, message: RoomMessage) {
        let Some(connections) = self.rooms.get(&message.room) else {
            return;
        };

        let mut dead = Vec::new();
        for (conn_id, sender) in connections {
            if sender.try_send(message.data.clone()).is_err() {
                // 버퍼가 가득 찼거나 닫힘 - 죽은 구독자로 간주, 재시도 없음
                dead.push(*conn_id);
            }
        }

        for conn_id in dead {
            record_dropped_broadcast(&message.room);
            self.remove(&message.room, conn_id);
        }
    }
}

impl HubHandle {
    /// 구독을 등록합니다.
    pub async fn register(&self, subscription: Subscription) {
        let _ = self.register_tx.send(subscription).await;
    }

    /// 구독을 해제합니다.
    pub async fn unregister(&self, subscription: Subscription) {
        let _ = self.unregister_tx.send(subscription).await;
    }

    /// 방의 모든 구독자에게 페이로드를 전달합니다.
    pub async fn broadcast(&self, room: &str, data: String) {
        let _ = self
            .broadcast_tx
            .send(RoomMessage {
                room: room.to_string(),
                data,
            })
            .await;
    }

    /// 방의 살아있는 구독자 수를 조회합니다. 없는 방은 0.
    pub async fn room_subscribers(&self, room: &str) -> usize {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = StatsRequest {
            room: room.to_string(),
            reply: reply_tx,
        };

        if self.stats_tx.send(request).await.is_err() {
            return 0;
        }
        reply_rx.await.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_hub() -> (HubHandle, CancellationToken) {
        let (hub, handle) = Hub::new();
        let shutdown = CancellationToken::new();
        tokio::spawn(hub.run(shutdown.clone()));
        (handle, shutdown)
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let (handle, shutdown) = spawn_hub();

        let mut receivers = Vec::new();
        let mut subscriptions = Vec::new();
        for _ in 0..3 {
            let (conn, rx) = Connection::new(8);
            let subscription = Subscription {
                room: "price-AAPL".to_string(),
                conn,
            };
            handle.register(subscription.clone()).await;
            receivers.push(rx);
            subscriptions.push(subscription);
        }

        assert_eq!(handle.room_subscribers("price-AAPL").await, 3);

        handle.broadcast("price-AAPL", "payload".to_string()).await;

        for rx in &mut receivers {
            assert_eq!(rx.recv().await.unwrap(), "payload");
        }

        // 전원 해제하면 방 자체가 사라진다
        for subscription in subscriptions {
            handle.unregister(subscription).await;
        }
        assert_eq!(handle.room_subscribers("price-AAPL").await, 0);

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let (handle, shutdown) = spawn_hub();

        let (conn_a, mut rx_a) = Connection::new(8);
        let (conn_b, mut rx_b) = Connection::new(8);
        handle
            .register(Subscription {
                room: "price-AAPL".to_string(),
                conn: conn_a,
            })
            .await;
        handle
            .register(Subscription {
                room: "tx-AAPL".to_string(),
                conn: conn_b,
            })
            .await;

        handle.broadcast("price-AAPL", "price".to_string()).await;

        assert_eq!(rx_a.recv().await.unwrap(), "price");
        assert!(rx_b.try_recv().is_err());

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_full_buffer_drops_subscriber_without_blocking() {
        let (handle, shutdown) = spawn_hub();

        // 버퍼 1짜리 느린 구독자와 넉넉한 구독자
        let (slow_conn, _slow_rx) = Connection::new(1);
        let (fast_conn, mut fast_rx) = Connection::new(8);
        handle
            .register(Subscription {
                room: "price-AAPL".to_string(),
                conn: slow_conn,
            })
            .await;
        handle
            .register(Subscription {
                room: "price-AAPL".to_string(),
                conn: fast_conn,
            })
            .await;

        // 첫 브로드캐스트는 둘 다 수신 가능 (느린 쪽 버퍼 1/1)
        handle.broadcast("price-AAPL", "m1".to_string()).await;
        // 두 번째에서 느린 쪽 버퍼가 가득 차 제거된다
        handle.broadcast("price-AAPL", "m2".to_string()).await;

        assert_eq!(fast_rx.recv().await.unwrap(), "m1");
        assert_eq!(fast_rx.recv().await.unwrap(), "m2");

        assert_eq!(handle.room_subscribers("price-AAPL").await, 1);

        // 허브는 계속 동작한다
        handle.broadcast("price-AAPL", "m3".to_string()).await;
        assert_eq!(fast_rx.recv().await.unwrap(), "m3");

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_last_drop_removes_room() {
        let (handle, shutdown) = spawn_hub();

        let (conn, rx) = Connection::new(1);
        handle
            .register(Subscription {
                room: "graph-AAPL".to_string(),
                conn,
            })
            .await;

        // 수신 단을 버려 채널을 닫는다
        drop(rx);
        handle.broadcast("graph-AAPL", "m".to_string()).await;

        assert_eq!(handle.room_subscribers("graph-AAPL").await, 0);

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_unregister_after_broadcast_drop_is_harmless() {
        let (handle, shutdown) = spawn_hub();

        let (conn, rx) = Connection::new(1);
        let subscription = Subscription {
            room: "price-AAPL".to_string(),
            conn,
        };
        handle.register(subscription.clone()).await;

        drop(rx);
        handle.broadcast("price-AAPL", "m".to_string()).await;
        // 연결 정리 루틴이 뒤늦게 해제를 보내는 경우
        handle.unregister(subscription).await;

        assert_eq!(handle.room_subscribers("price-AAPL").await, 0);

        shutdown.cancel();
    }
}
