use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::error::AppError;

/// Short-lived shared secret authenticating a physical handoff. Only one
/// challenge exists per order at a time; issuing a new one replaces it.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

pub fn issue(ttl: Duration, now: DateTime<Utc>) -> OtpChallenge {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);

    OtpChallenge {
        code: format!("{code:06}"),
        expires_at: now + ttl,
    }
}

/// Expiry wins over mismatch: a stale code is reported as expired even if
/// the digits happen to differ too, so the client knows to re-request.
pub fn verify(challenge: &OtpChallenge, submitted: &str, now: DateTime<Utc>) -> Result<(), AppError> {
    if now >= challenge.expires_at {
        return Err(AppError::OtpExpired);
    }

    if !constant_time_eq(&challenge.code, submitted) {
        return Err(AppError::InvalidOtp);
    }

    Ok(())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}
