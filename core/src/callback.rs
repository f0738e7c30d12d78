//! Outcome notifications from an `InquireApi` instance to its owner.
//!
//! A delegate receives at most one of the two messages per client instance,
//! exactly once, after the instance leaves `Sending` (or `Idle`, when the
//! request failed validation). Both methods default to no-ops, so a delegate
//! may implement only the one it cares about, and a client without a
//! delegate is valid.

use tokio::sync::mpsc::UnboundedSender;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::types::{ApiMethod, CallId};

pub trait ApiDelegate: Send + Sync {
    fn request_finished(&self, call: CallId, method: ApiMethod, response: &ApiResponse) {
        let _ = (call, method, response);
    }

    fn request_failed(&self, call: CallId, method: ApiMethod, error: &ApiError) {
        let _ = (call, method, error);
    }
}

/// Owned form of a delegate message, for delivery over a channel.
#[derive(Debug)]
pub enum Notification {
    Finished {
        call: CallId,
        method: ApiMethod,
        response: ApiResponse,
    },
    Failed {
        call: CallId,
        method: ApiMethod,
        error: ApiError,
    },
}

impl Notification {
    pub fn call(&self) -> CallId {
        match self {
            Notification::Finished { call, .. } | Notification::Failed { call, .. } => *call,
        }
    }

    pub fn method(&self) -> ApiMethod {
        match self {
            Notification::Finished { method, .. } | Notification::Failed { method, .. } => *method,
        }
    }
}

/// Forwards notifications to a channel. A closed receiver drops them.
impl ApiDelegate for UnboundedSender<Notification> {
    fn request_finished(&self, call: CallId, method: ApiMethod, response: &ApiResponse) {
        let _ = self.send(Notification::Finished {
            call,
            method,
            response: response.clone(),
        });
    }

    fn request_failed(&self, call: CallId, method: ApiMethod, error: &ApiError) {
        let _ = self.send(Notification::Failed {
            call,
            method,
            error: error.clone(),
        });
    }
}
