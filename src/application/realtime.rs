//! In-process fan-out of row change events, and the reducers that fold
//! them into view state.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::presenter::format_brl;

pub const SUBSCRIBER_QUEUE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
}

impl FromStr for ChangeOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(ChangeOp::Insert),
            "UPDATE" => Ok(ChangeOp::Update),
            other => Err(format!("unsupported change operation '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub id: i64,
    pub table: String,
    pub op: ChangeOp,
    /// The changed row as the database serialized it.
    pub row: Value,
    pub at: DateTime<Utc>,
}

/// Table plus optional operation, like a row-level channel subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    pub table: &'static str,
    pub op: Option<ChangeOp>,
}

impl ChangeFilter {
    pub fn table(table: &'static str) -> Self {
        Self { table, op: None }
    }

    pub fn with_op(mut self, op: ChangeOp) -> Self {
        self.op = Some(op);
        self
    }

    fn accepts(&self, event: &ChangeEvent) -> bool {
        self.table == event.table && self.op.map_or(true, |op| op == event.op)
    }
}

struct Subscriber {
    filter: ChangeFilter,
    sender: mpsc::Sender<ChangeEvent>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<u64, Subscriber>,
}

#[derive(Clone, Default)]
pub struct ChangeFeed {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, filter: ChangeFilter) -> Subscription {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_QUEUE);
        let mut registry = self.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        log::debug!("change feed subscriber {id} registered for {}", filter.table);
        registry.subscribers.insert(id, Subscriber { filter, sender });
        Subscription {
            id,
            receiver,
            feed: self.clone(),
        }
    }

    /// Delivers to every matching subscriber without waiting. A full
    /// queue drops the event for that subscriber only.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let mut registry = self.lock();
        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, subscriber) in registry.subscribers.iter() {
            if !subscriber.filter.accepts(event) {
                continue;
            }
            match subscriber.sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "change feed subscriber {id} is lagging; dropped event {}",
                        event.id
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => closed.push(*id),
            }
        }
        for id in closed {
            registry.subscribers.remove(&id);
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn unsubscribe(&self, id: u64) {
        if self.lock().subscribers.remove(&id).is_some() {
            log::debug!("change feed subscriber {id} removed");
        }
    }
}

/// Receiving end of a feed subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    receiver: mpsc::Receiver<ChangeEvent>,
    feed: ChangeFeed,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.feed.unsubscribe(self.id);
    }
}

/// Folds a change event into view state.
pub trait Reducer {
    type Output;

    fn filter() -> ChangeFilter;

    fn apply(&mut self, event: &ChangeEvent) -> Option<Self::Output>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderAlert {
    pub order_id: Uuid,
    pub title: String,
    pub message: String,
    pub total_amount: String,
}

#[derive(Debug, Deserialize)]
struct OrderRowChange {
    id: Uuid,
    total_amount: Value,
}

/// New-order alerts. Updates to existing orders produce nothing.
#[derive(Debug, Default)]
pub struct OrderAlerts {
    pub received: usize,
}

impl Reducer for OrderAlerts {
    type Output = OrderAlert;

    fn filter() -> ChangeFilter {
        ChangeFilter::table("orders").with_op(ChangeOp::Insert)
    }

    fn apply(&mut self, event: &ChangeEvent) -> Option<OrderAlert> {
        let row: OrderRowChange = match serde_json::from_value(event.row.clone()) {
            Ok(row) => row,
            Err(e) => {
                log::warn!("ignoring malformed order change {}: {e}", event.id);
                return None;
            }
        };
        // Numeric columns arrive as JSON numbers from row_to_json.
        let amount = match &row.total_amount {
            Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
            Value::String(s) => BigDecimal::from_str(s).ok(),
            _ => None,
        }?;
        self.received += 1;
        let formatted = format_brl(&amount);
        Some(OrderAlert {
            order_id: row.id,
            title: "Novo Pedido Recebido!".into(),
            message: format!(
                "Um novo pedido de {formatted} foi criado. Acompanhe o status de entrega."
            ),
            total_amount: formatted,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsUpdate {
    pub id: Uuid,
    pub points: i32,
}

/// Latest points balance per user. Last write wins.
#[derive(Debug, Default)]
pub struct PointsBoard {
    points: HashMap<Uuid, i32>,
}

impl PointsBoard {
    pub fn points_of(&self, user_id: Uuid) -> Option<i32> {
        self.points.get(&user_id).copied()
    }
}

impl Reducer for PointsBoard {
    type Output = PointsUpdate;

    fn filter() -> ChangeFilter {
        ChangeFilter::table("profiles").with_op(ChangeOp::Update)
    }

    fn apply(&mut self, event: &ChangeEvent) -> Option<PointsUpdate> {
        let update: PointsUpdate = serde_json::from_value(event.row.clone())
            .map_err(|e| log::warn!("ignoring malformed profile change {}: {e}", event.id))
            .ok()?;
        self.points.insert(update.id, update.points);
        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event(id: i64, table: &str, op: ChangeOp, row: Value) -> ChangeEvent {
        ChangeEvent {
            id,
            table: table.into(),
            op,
            row,
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn delivers_only_matching_events() {
        let feed = ChangeFeed::new();
        let mut orders = feed.subscribe(OrderAlerts::filter());
        let mut points = feed.subscribe(PointsBoard::filter());

        let insert = event(1, "orders", ChangeOp::Insert, json!({}));
        let update = event(2, "orders", ChangeOp::Update, json!({}));
        assert_eq!(feed.publish(&insert), 1);
        assert_eq!(feed.publish(&update), 0);

        assert_eq!(orders.recv().await.map(|e| e.id), Some(1));
        assert!(points.receiver.try_recv().is_err());
    }

    #[test]
    fn dropping_a_subscription_unsubscribes() {
        let feed = ChangeFeed::new();
        let sub = feed.subscribe(ChangeFilter::table("orders"));
        assert_eq!(feed.subscriber_count(), 1);
        drop(sub);
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn full_queue_drops_for_that_subscriber_only() {
        let feed = ChangeFeed::new();
        let _slow = feed.subscribe(ChangeFilter::table("orders"));
        let mut fast = feed.subscribe(ChangeFilter::table("orders"));

        for i in 0..SUBSCRIBER_QUEUE as i64 {
            feed.publish(&event(i, "orders", ChangeOp::Insert, json!({})));
            assert!(fast.receiver.try_recv().is_ok());
        }
        let delivered = feed.publish(&event(999, "orders", ChangeOp::Insert, json!({})));
        assert_eq!(delivered, 1);
        assert_eq!(fast.receiver.try_recv().map(|e| e.id).ok(), Some(999));
    }

    #[test]
    fn order_alert_formats_amount() {
        let mut alerts = OrderAlerts::default();
        let id = Uuid::new_v4();
        let alert = alerts
            .apply(&event(
                1,
                "orders",
                ChangeOp::Insert,
                json!({ "id": id, "total_amount": 1234.5, "status": "pending" }),
            ))
            .unwrap();
        assert_eq!(alert.order_id, id);
        assert_eq!(alert.title, "Novo Pedido Recebido!");
        assert_eq!(
            alert.message,
            "Um novo pedido de R$ 1.234,50 foi criado. Acompanhe o status de entrega."
        );
        assert_eq!(alerts.received, 1);
    }

    #[test]
    fn points_board_keeps_latest_balance() {
        let mut board = PointsBoard::default();
        let user = Uuid::new_v4();
        board.apply(&event(1, "profiles", ChangeOp::Update, json!({ "id": user, "points": 10 })));
        board.apply(&event(2, "profiles", ChangeOp::Update, json!({ "id": user, "points": 25 })));
        assert_eq!(board.points_of(user), Some(25));
        assert!(board
            .apply(&event(3, "profiles", ChangeOp::Update, json!({ "id": "nope" })))
            .is_none());
    }
}
