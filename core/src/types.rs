//! Shared value types for the Inquire API.
//!
//! # Design
//! Server identifiers are integers; each gets a transparent newtype so a
//! question id cannot be passed where an answer id is expected. `ApiMethod`
//! is the discriminator attached to every notification and error.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Server-assigned identity of a user account.
    UserId
);
id_type!(
    /// Server-assigned identity of a question.
    QuestionId
);
id_type!(
    /// Server-assigned identity of an answer.
    AnswerId
);

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// The API method that produced a request, notification, or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    Auth,
    Register,
    Ask,
    Answer,
    Accept,
    ListQuestionsNear,
    ListAnswersFor,
    Logout,
}

impl ApiMethod {
    /// Path of the endpoint, relative to the configured base URL.
    pub fn path(self) -> &'static str {
        match self {
            ApiMethod::Auth => "/auth",
            ApiMethod::Register => "/register",
            ApiMethod::Ask => "/ask",
            ApiMethod::Answer => "/answer",
            ApiMethod::Accept => "/accept",
            ApiMethod::ListQuestionsNear => "/questions",
            ApiMethod::ListAnswersFor => "/answers",
            ApiMethod::Logout => "/logout",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ApiMethod::Auth => "auth",
            ApiMethod::Register => "register",
            ApiMethod::Ask => "ask",
            ApiMethod::Answer => "answer",
            ApiMethod::Accept => "accept",
            ApiMethod::ListQuestionsNear => "listQuestionsNear",
            ApiMethod::ListAnswersFor => "listAnswersFor",
            ApiMethod::Logout => "logout",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of one `InquireApi` instance, carried by its notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(Uuid);

impl CallId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of the device's current position.
pub trait LocationProvider: Send + Sync {
    /// `None` when no fix is available yet.
    fn current_location(&self) -> Option<Coordinate>;
}

/// Producer of the opaque token handed over by a completed payment.
pub trait PaymentTokenSource: Send + Sync {
    fn payment_token(&self) -> Option<String>;
}

impl LocationProvider for Coordinate {
    fn current_location(&self) -> Option<Coordinate> {
        Some(*self)
    }
}

impl PaymentTokenSource for String {
    fn payment_token(&self) -> Option<String> {
        Some(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_bounds() {
        assert!(Coordinate::new(37.33, -122.03).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.1).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn method_paths_match_endpoint_table() {
        assert_eq!(ApiMethod::Auth.path(), "/auth");
        assert_eq!(ApiMethod::ListQuestionsNear.path(), "/questions");
        assert_eq!(ApiMethod::ListAnswersFor.path(), "/answers");
        assert_eq!(ApiMethod::Accept.to_string(), "accept");
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&QuestionId(42)).unwrap();
        assert_eq!(json, "42");
        let back: AnswerId = serde_json::from_str("7").unwrap();
        assert_eq!(back, AnswerId(7));
    }

    #[test]
    fn call_ids_are_unique() {
        assert_ne!(CallId::new(), CallId::new());
    }
}
