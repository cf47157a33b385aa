use serde::{Deserialize, Serialize};

use crate::models::order::Order;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    StatusUpdated,
    OutForDelivery,
    Delivered,
    Received,
    PickedUp,
}

/// Published on every successful transition so dashboards can re-fetch
/// without polling blindly. Carries the post-transition order snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub kind: OrderEventKind,
    pub order: Order,
}
