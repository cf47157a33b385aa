use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::event::OrderEventKind;
use crate::models::order::{DeliveryType, Order, OrderItem, OrderStatus, TrackingStatus};
use crate::models::user::{DeliveryPerson, Role, User};
use crate::state::AppState;
use crate::tracking;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/mine", get(list_my_orders))
        .route("/orders/seller", get(list_seller_orders))
        .route("/orders/delivery/assigned", get(list_assigned_orders))
        .route("/orders/delivery/persons", get(list_delivery_persons))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", put(update_status))
        .route("/orders/:id/out-for-delivery", put(mark_out_for_delivery))
        .route("/orders/:id/request-delivery-otp", post(request_delivery_otp))
        .route("/orders/:id/mark-delivered", put(mark_delivered))
        .route("/orders/:id/mark-received", put(mark_received))
        .route("/orders/:id/confirm-pickup", put(confirm_pickup))
}

#[derive(Deserialize)]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub seller_id: Uuid,
    pub items: Vec<CreateOrderItemRequest>,
    pub address: String,
    pub scheduled_pickup_time: Option<DateTime<Utc>>,
    pub payment_order_id: Option<String>,
    pub payment_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct OutForDeliveryRequest {
    pub delivery_person_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct MarkDeliveredRequest {
    pub otp: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// Checkout happens after the payment collaborator has verified payment, so
// orders start out confirmed.
async fn create_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(buyer): CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let seller = state
        .users
        .get(&payload.seller_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("seller {} not found", payload.seller_id)))?;

    let delivery_type = match (seller.role, buyer.role) {
        (Role::Retailer, Role::Consumer) => DeliveryType::RetailerToConsumer,
        (Role::Wholesaler, Role::Retailer) => DeliveryType::WholesalerToRetailer,
        _ => {
            return Err(AppError::Forbidden(
                "order role pairing not allowed".to_string(),
            ))
        }
    };

    if payload.items.is_empty() {
        return Err(AppError::BadRequest(
            "order needs at least one item".to_string(),
        ));
    }

    let mut items = Vec::with_capacity(payload.items.len());
    for item in payload.items {
        if item.quantity == 0 {
            return Err(AppError::BadRequest("item quantity must be > 0".to_string()));
        }

        items.push(OrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.unit_price * Decimal::from(item.quantity),
        });
    }
    let total: Decimal = items.iter().map(|item| item.subtotal).sum();

    let order = Order {
        id: Uuid::new_v4(),
        seller_id: seller.id,
        customer_id: buyer.id,
        delivery_type,
        status: OrderStatus::Confirmed,
        tracking_status: TrackingStatus::Pending,
        delivery_person_id: None,
        out_for_delivery: None,
        delivered_at: None,
        received_at: None,
        delivery_otp: None,
        scheduled_pickup_time: payload.scheduled_pickup_time,
        items,
        total,
        address: payload.address,
        payment_order_id: payload.payment_order_id,
        payment_id: payload.payment_id,
        created_at: Utc::now(),
    };

    state.orders.insert(order.id, order.clone());
    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    let visible = user.id == order.seller_id
        || user.id == order.customer_id
        || order.delivery_person_id == Some(user.id);
    if !visible {
        return Err(AppError::Forbidden(
            "order belongs to another party".to_string(),
        ));
    }

    Ok(Json(order))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let updated = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        require_owner_seller(&user, &order)?;
        tracking::set_status(&mut order, payload.status)?;
        order.clone()
    };

    state
        .metrics
        .order_transitions_total
        .with_label_values(&["status_updated"])
        .inc();
    state.publish(OrderEventKind::StatusUpdated, updated.clone());

    tracing::info!(order_id = %id, status = ?updated.status, "order status updated");
    Ok(Json(updated))
}

async fn mark_out_for_delivery(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OutForDeliveryRequest>,
) -> Result<Json<Order>, AppError> {
    if let Some(assignee) = payload.delivery_person_id {
        let is_delivery = state
            .users
            .get(&assignee)
            .map(|entry| entry.value().role == Role::Delivery)
            .unwrap_or(false);

        if !is_delivery {
            return Err(AppError::BadRequest(format!(
                "user {assignee} is not a delivery person"
            )));
        }
    }

    let updated = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        require_owner_seller(&user, &order)?;
        tracking::mark_out_for_delivery(&mut order, payload.delivery_person_id, Utc::now())?;
        order.clone()
    };

    state
        .metrics
        .order_transitions_total
        .with_label_values(&["out_for_delivery"])
        .inc();
    state.metrics.orders_out_for_delivery.inc();
    state.publish(OrderEventKind::OutForDelivery, updated.clone());

    tracing::info!(
        order_id = %id,
        delivery_person = ?updated.delivery_person_id,
        "order out for delivery"
    );
    Ok(Json(updated))
}

async fn request_delivery_otp(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    let (code, customer_id) = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        require_delivery_actor(&user, &order)?;
        let code = tracking::issue_delivery_otp(&mut order, state.otp_ttl, Utc::now())?;
        (code, order.customer_id)
    };

    let recipient = state
        .users
        .get(&customer_id)
        .map(|entry| entry.value().email.clone())
        .ok_or_else(|| AppError::Internal("order customer no longer exists".to_string()))?;

    state.metrics.otp_issued_total.inc();
    state.notifier.send_delivery_otp(&recipient, id, &code).await;

    tracing::info!(order_id = %id, "delivery otp issued");
    Ok(Json(SuccessResponse { success: true }))
}

async fn mark_delivered(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkDeliveredRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let result = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        require_delivery_actor(&user, &order)?;
        tracking::confirm_delivery(&mut order, &payload.otp, Utc::now()).map(|()| order.clone())
    };

    match &result {
        Ok(_) => state
            .metrics
            .otp_verifications_total
            .with_label_values(&["success"])
            .inc(),
        Err(AppError::InvalidOtp) => state
            .metrics
            .otp_verifications_total
            .with_label_values(&["invalid"])
            .inc(),
        Err(AppError::OtpExpired) => state
            .metrics
            .otp_verifications_total
            .with_label_values(&["expired"])
            .inc(),
        Err(_) => {}
    }

    let updated = result?;
    state
        .metrics
        .order_transitions_total
        .with_label_values(&["delivered"])
        .inc();
    state.metrics.orders_out_for_delivery.dec();
    state.publish(OrderEventKind::Delivered, updated);

    tracing::info!(order_id = %id, "delivery confirmed");
    Ok(Json(SuccessResponse { success: true }))
}

async fn mark_received(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let updated = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        if order.customer_id != user.id {
            return Err(AppError::Forbidden(
                "only the order recipient may confirm receipt".to_string(),
            ));
        }

        tracking::confirm_receipt(&mut order, Utc::now())?;
        order.clone()
    };

    state
        .metrics
        .order_transitions_total
        .with_label_values(&["received"])
        .inc();
    state.publish(OrderEventKind::Received, updated.clone());

    tracing::info!(order_id = %id, "receipt confirmed");
    Ok(Json(updated))
}

async fn confirm_pickup(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let updated = {
        let mut order = state
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        require_owner_seller(&user, &order)?;
        tracking::confirm_pickup(&mut order, Utc::now())?;
        order.clone()
    };

    state
        .metrics
        .order_transitions_total
        .with_label_values(&["picked_up"])
        .inc();
    state.publish(OrderEventKind::PickedUp, updated.clone());

    tracing::info!(order_id = %id, "pickup confirmed");
    Ok(Json(updated))
}

async fn list_my_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Json<Vec<Order>> {
    let orders = state
        .orders
        .iter()
        .filter(|entry| entry.value().customer_id == user.id)
        .map(|entry| entry.value().clone())
        .collect();

    Json(orders)
}

async fn list_seller_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>, AppError> {
    if !user.role.is_seller() {
        return Err(AppError::Forbidden("seller role required".to_string()));
    }

    let orders = state
        .orders
        .iter()
        .filter(|entry| entry.value().seller_id == user.id)
        .map(|entry| entry.value().clone())
        .collect();

    Ok(Json(orders))
}

async fn list_assigned_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>, AppError> {
    if user.role != Role::Delivery {
        return Err(AppError::Forbidden("delivery role required".to_string()));
    }

    let orders = state
        .orders
        .iter()
        .filter(|entry| entry.value().delivery_person_id == Some(user.id))
        .map(|entry| entry.value().clone())
        .collect();

    Ok(Json(orders))
}

async fn list_delivery_persons(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<DeliveryPerson>>, AppError> {
    if !user.role.is_seller() {
        return Err(AppError::Forbidden("seller role required".to_string()));
    }

    let persons = state
        .users
        .iter()
        .filter(|entry| entry.value().role == Role::Delivery)
        .map(|entry| DeliveryPerson::from(entry.value()))
        .collect();

    Ok(Json(persons))
}

fn require_owner_seller(user: &User, order: &Order) -> Result<(), AppError> {
    if !user.role.is_seller() || order.seller_id != user.id {
        return Err(AppError::Forbidden(
            "only the fulfilling seller may manage this order".to_string(),
        ));
    }
    Ok(())
}

/// The assigned delivery person, or the seller when no one is assigned
/// (self-delivery).
fn require_delivery_actor(user: &User, order: &Order) -> Result<(), AppError> {
    let allowed = match order.delivery_person_id {
        Some(assignee) => assignee == user.id,
        None => order.seller_id == user.id,
    };

    if !allowed {
        return Err(AppError::Forbidden(
            "not the delivery actor for this order".to_string(),
        ));
    }
    Ok(())
}
