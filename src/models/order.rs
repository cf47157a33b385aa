use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::otp::OtpChallenge;

/// Seller-facing confirmation status, toggled from the seller dashboard.
/// `Cancelled` and `Fulfilled` are reachable only through surfaces outside
/// this service; they stay in the enum for wire fidelity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Confirmed,
    Delivered,
    Cancelled,
    Fulfilled,
}

/// Physical delivery progress, independent of [`OrderStatus`]. Moves strictly
/// forward. Store-pickup orders reuse `Delivered` for "picked up".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    Pending,
    OutForDelivery,
    Delivered,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    RetailerToConsumer,
    WholesalerToRetailer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// unit_price x quantity, computed once at creation and never recomputed.
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub customer_id: Uuid,
    pub delivery_type: DeliveryType,
    pub status: OrderStatus,
    pub tracking_status: TrackingStatus,
    /// `None` means the seller delivers the order themselves.
    pub delivery_person_id: Option<Uuid>,
    pub out_for_delivery: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    /// The code leaves the process only through the notification sender.
    #[serde(skip)]
    pub delivery_otp: Option<OtpChallenge>,
    pub scheduled_pickup_time: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub address: String,
    pub payment_order_id: Option<String>,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_pickup(&self) -> bool {
        self.scheduled_pickup_time.is_some()
    }
}
