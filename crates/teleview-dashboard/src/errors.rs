//! Displayable error messages
//!
//! The dashboard-level error is always a plain string the render layer can show
//! as-is, whatever shape the failure took.

use std::any::Any;
use tokio::task::JoinError;

pub const FALLBACK_ERROR_MESSAGE: &str = "request failed";

/// Message of an error value, or the fallback when it renders empty
pub fn error_message(err: &(dyn std::error::Error + 'static)) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

/// Message carried by a panic payload
///
/// String payloads are used as-is; anything else gets the fallback.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    FALLBACK_ERROR_MESSAGE.to_string()
}

/// Message for a loader task that did not complete normally
pub fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        panic_message(payload.as_ref())
    } else {
        error_message(&err)
    }
}
