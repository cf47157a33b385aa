//! Order lifecycle transitions. Every function validates its preconditions
//! and mutates the order in place; callers hold the store entry guard for the
//! whole call, so each transition is a single atomic read-modify-write.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus, TrackingStatus};
use crate::otp;

/// Seller toggle between `confirmed` and `delivered`. Never touches the
/// tracking status.
pub fn set_status(order: &mut Order, new_status: OrderStatus) -> Result<(), AppError> {
    if !matches!(new_status, OrderStatus::Confirmed | OrderStatus::Delivered) {
        return Err(AppError::BadRequest(
            "status must be confirmed or delivered".to_string(),
        ));
    }

    order.status = new_status;
    Ok(())
}

pub fn mark_out_for_delivery(
    order: &mut Order,
    delivery_person_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if order.is_pickup() {
        return Err(AppError::InvalidState(
            "pickup orders are collected in store, not couriered".to_string(),
        ));
    }

    if order.status != OrderStatus::Confirmed {
        return Err(AppError::InvalidState("order is not confirmed".to_string()));
    }

    if order.tracking_status != TrackingStatus::Pending {
        return Err(AppError::InvalidState(
            "delivery has already started".to_string(),
        ));
    }

    order.tracking_status = TrackingStatus::OutForDelivery;
    order.out_for_delivery = Some(now);
    order.delivery_person_id = delivery_person_id;
    Ok(())
}

/// Issues a fresh challenge, replacing any previous one at the same instant.
/// Returns the code so the caller can hand it to the notification sender.
pub fn issue_delivery_otp(
    order: &mut Order,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    if order.tracking_status != TrackingStatus::OutForDelivery {
        return Err(AppError::InvalidState(
            "order is not out for delivery".to_string(),
        ));
    }

    let challenge = otp::issue(ttl, now);
    let code = challenge.code.clone();
    order.delivery_otp = Some(challenge);
    Ok(code)
}

/// OTP-gated handoff confirmation. An absent challenge is reported as
/// expired, matching how an expired one is treated: re-request and retry.
pub fn confirm_delivery(
    order: &mut Order,
    submitted: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if order.tracking_status != TrackingStatus::OutForDelivery {
        return Err(AppError::InvalidState(
            "order is not out for delivery".to_string(),
        ));
    }

    let challenge = order.delivery_otp.as_ref().ok_or(AppError::OtpExpired)?;
    otp::verify(challenge, submitted, now)?;

    order.tracking_status = TrackingStatus::Delivered;
    order.delivered_at = Some(now);
    order.delivery_otp = None;
    Ok(())
}

pub fn confirm_receipt(order: &mut Order, now: DateTime<Utc>) -> Result<(), AppError> {
    if order.tracking_status != TrackingStatus::Delivered {
        return Err(AppError::InvalidState(
            "order has not been delivered".to_string(),
        ));
    }

    if order.received_at.is_some() {
        return Err(AppError::InvalidState(
            "receipt already confirmed".to_string(),
        ));
    }

    order.received_at = Some(now);
    Ok(())
}

/// OTP-free parallel track for store-pickup orders. "Picked up" reuses the
/// `delivered` tracking value.
pub fn confirm_pickup(order: &mut Order, now: DateTime<Utc>) -> Result<(), AppError> {
    if !order.is_pickup() {
        return Err(AppError::InvalidState(
            "order is not a store-pickup order".to_string(),
        ));
    }

    if order.tracking_status != TrackingStatus::Pending {
        return Err(AppError::InvalidState(
            "pickup already confirmed".to_string(),
        ));
    }

    order.tracking_status = TrackingStatus::Delivered;
    order.delivered_at = Some(now);
    Ok(())
}
