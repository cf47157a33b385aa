use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::event::{OrderEvent, OrderEventKind};
use crate::models::order::Order;
use crate::models::user::User;
use crate::notify::NotificationSender;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub users: DashMap<Uuid, User>,
    /// Opaque bearer token -> user id.
    pub tokens: DashMap<String, Uuid>,
    pub orders: DashMap<Uuid, Order>,
    pub order_events_tx: broadcast::Sender<OrderEvent>,
    pub notifier: Arc<dyn NotificationSender>,
    pub otp_ttl: Duration,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        event_buffer_size: usize,
        otp_ttl: Duration,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        let (order_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            users: DashMap::new(),
            tokens: DashMap::new(),
            orders: DashMap::new(),
            order_events_tx,
            notifier,
            otp_ttl,
            metrics: Metrics::new(),
        }
    }

    /// Best-effort fan-out; a lagging or absent subscriber never blocks a
    /// transition.
    pub fn publish(&self, kind: OrderEventKind, order: Order) {
        let _ = self.order_events_tx.send(OrderEvent { kind, order });
    }
}
