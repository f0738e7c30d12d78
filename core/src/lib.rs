//! Asynchronous API client core for the Inquire location-based Q&A service.
//!
//! # Overview
//! Users ask questions pinned to a location, pay to post them, and other
//! users answer; the asker accepts one answer. This crate is the layer the
//! presentation code talks to:
//!
//! - `request` builds and validates one `HttpRequest` per API method.
//! - `client` runs a single call through a `Transport` and reports the
//!   outcome through the returned future and an optional `ApiDelegate`.
//! - `model` decodes response records into `Question`, `Answer` and `User`.
//! - `session` holds the acting user between calls.
//!
//! # Design
//! - One `InquireApi` instance is one call; reuse is refused.
//! - Requests and responses are plain data, so the transport can be swapped
//!   for a scripted one in tests.
//! - Ownership flags are derived from the caller's acting user id, never read
//!   from the server.

pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;
pub mod types;

pub use callback::{ApiDelegate, Notification};
pub use client::{ClientState, InquireApi, Outcome};
pub use config::ClientConfig;
pub use error::{
    ApiError, ConfigError, FieldProblem, MalformedRecordError, TransportError, ValidationError,
};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use model::{
    decode_answer, decode_answers, decode_question, decode_questions, decode_user, Answer,
    Question, Record, User,
};
pub use request::{Limits, NearbySearch, RequestBuilder};
pub use response::ApiResponse;
pub use session::Session;
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    AnswerId, ApiMethod, CallId, Coordinate, LocationProvider, PaymentTokenSource, QuestionId,
    UserId,
};
