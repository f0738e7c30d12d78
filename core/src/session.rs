//! The acting user's session context.
//!
//! The current user is the one long-lived, mutable piece of model state. It
//! is owned by the caller rather than held globally. Every update decodes a
//! complete replacement first and swaps it in only on success, so readers
//! never see a half-applied change.

use tracing::info;

use crate::error::MalformedRecordError;
use crate::model::{decode_user, Record, User};
use crate::response::ApiResponse;
use crate::types::{Coordinate, UserId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    current_user: Option<User>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, user: User) {
        info!(user_id = %user.user_id, "signed in");
        self.current_user = Some(user);
    }

    /// Decode the `user` record of an `/auth` response and sign that user in.
    pub fn sign_in_from(&mut self, response: &ApiResponse) -> Result<bool, MalformedRecordError> {
        match response.user()? {
            Some(user) => {
                self.sign_in(user);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.current_user.take() {
            info!(user_id = %user.user_id, "signed out");
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// The id to compare records against when deriving ownership flags.
    pub fn acting_user_id(&self) -> Option<UserId> {
        self.current_user.as_ref().map(|user| user.user_id)
    }

    /// Replace the current user's server-reported fields with `record`.
    ///
    /// Records for a different user are ignored and reported as `false`, as
    /// is any update while signed out. The last known location is kept.
    pub fn update_user(&mut self, record: &Record) -> Result<bool, MalformedRecordError> {
        let mut updated = decode_user(record)?;
        let Some(current) = self.current_user.as_mut() else {
            return Ok(false);
        };
        if updated.user_id != current.user_id {
            return Ok(false);
        }
        updated.location = current.location;
        *current = updated;
        Ok(true)
    }

    /// Apply the `user` record carried by any response, if there is one.
    pub fn apply_response(&mut self, response: &ApiResponse) -> Result<bool, MalformedRecordError> {
        match response.record("user")? {
            Some(record) => self.update_user(record),
            None => Ok(false),
        }
    }

    /// Record the device's latest position for the current user.
    pub fn set_location(&mut self, location: Coordinate) {
        if let Some(user) = self.current_user.as_mut() {
            user.location = Some(location);
        }
    }
}
