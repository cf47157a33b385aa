use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Consumer,
    Retailer,
    Wholesaler,
    Delivery,
}

impl Role {
    /// Retailers and wholesalers own catalogs and fulfill orders.
    pub fn is_seller(self) -> bool {
        matches!(self, Role::Retailer | Role::Wholesaler)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Wire shape for the delivery-person picker on the seller dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPerson {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl From<&User> for DeliveryPerson {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
        }
    }
}
