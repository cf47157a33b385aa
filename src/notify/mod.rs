use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Out-of-band transport for delivery OTP codes. The production system emails
/// the order recipient; tests swap in a recording implementation.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_delivery_otp(&self, recipient: &str, order_id: Uuid, code: &str);
}

/// Default sender: records the dispatch in the log. The code itself stays
/// out of the log line.
pub struct TracingSender;

#[async_trait]
impl NotificationSender for TracingSender {
    async fn send_delivery_otp(&self, recipient: &str, order_id: Uuid, _code: &str) {
        info!(order_id = %order_id, recipient = %recipient, "delivery otp dispatched");
    }
}
