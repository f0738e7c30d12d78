//! Domain entities and the decoders that build them from server records.
//!
//! # Design
//! Records arrive as loosely typed JSON objects. Decoding is pure: it reads
//! the fields it needs, fails with `MalformedRecordError` when a required one
//! is absent or mistyped, and fills optional ones with defaults. Ownership
//! flags are derived by comparing the record's `user_id` with the acting user
//! id supplied by the caller; a server-provided flag is never trusted.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{FieldProblem, MalformedRecordError};
use crate::types::{AnswerId, Coordinate, QuestionId, UserId};

/// A loosely typed server record.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub question_id: QuestionId,
    pub user_id: UserId,
    /// True iff the question was written by the acting user.
    pub is_owner: bool,
    pub text: String,
    pub location: Coordinate,
    /// Closed once the asker accepts an answer.
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub answer_id: AnswerId,
    pub user_id: UserId,
    pub is_owner: bool,
    pub is_accepted: bool,
    pub text: String,
    question: Arc<Question>,
}

impl Answer {
    /// The question this answer responds to.
    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn question_handle(&self) -> Arc<Question> {
        Arc::clone(&self.question)
    }
}

/// The acting user's account as last reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub karma: i64,
    /// Set by the caller from the device; the server never reports it.
    pub location: Option<Coordinate>,
}

pub fn decode_question(
    record: &Record,
    acting_user_id: UserId,
) -> Result<Question, MalformedRecordError> {
    let user_id = UserId(required_int(record, "user_id")?);
    Ok(Question {
        question_id: QuestionId(required_int(record, "question_id")?),
        user_id,
        is_owner: user_id == acting_user_id,
        text: required_str(record, "question")?,
        location: Coordinate::new(
            required_number(record, "latitude")?,
            required_number(record, "longitude")?,
        ),
        closed: optional_bool(record, "closed")?.unwrap_or(false),
    })
}

/// Decode an answer to `parent`. A `question_id` in the record, when present,
/// must name the parent.
pub fn decode_answer(
    record: &Record,
    acting_user_id: UserId,
    parent: Arc<Question>,
) -> Result<Answer, MalformedRecordError> {
    if let Some(question_id) = optional_int(record, "question_id")? {
        if question_id != parent.question_id.0 {
            return Err(MalformedRecordError {
                field: "question_id",
                problem: FieldProblem::Mismatch {
                    expected: parent.question_id.to_string(),
                    found: question_id.to_string(),
                },
            });
        }
    }

    let user_id = UserId(required_int(record, "user_id")?);
    Ok(Answer {
        answer_id: AnswerId(required_int(record, "answer_id")?),
        user_id,
        is_owner: user_id == acting_user_id,
        is_accepted: optional_bool(record, "accepted_answer")?.unwrap_or(false),
        text: required_str(record, "answer")?,
        question: parent,
    })
}

pub fn decode_user(record: &Record) -> Result<User, MalformedRecordError> {
    Ok(User {
        user_id: UserId(required_int(record, "user_id")?),
        email: required_str(record, "email")?,
        karma: optional_int(record, "karma")?.unwrap_or(0),
        location: None,
    })
}

/// Decode a list of question records, failing on the first malformed one.
pub fn decode_questions<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    acting_user_id: UserId,
) -> Result<Vec<Question>, MalformedRecordError> {
    records
        .into_iter()
        .map(|record| decode_question(record, acting_user_id))
        .collect()
}

pub fn decode_answers<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    acting_user_id: UserId,
    parent: &Arc<Question>,
) -> Result<Vec<Answer>, MalformedRecordError> {
    records
        .into_iter()
        .map(|record| decode_answer(record, acting_user_id, Arc::clone(parent)))
        .collect()
}

// Absent and explicit null are treated alike.
fn field<'a>(record: &'a Record, name: &str) -> Option<&'a Value> {
    record.get(name).filter(|value| !value.is_null())
}

fn required_int(record: &Record, name: &'static str) -> Result<i64, MalformedRecordError> {
    optional_int(record, name)?.ok_or_else(|| MalformedRecordError::missing(name))
}

fn optional_int(record: &Record, name: &'static str) -> Result<Option<i64>, MalformedRecordError> {
    field(record, name)
        .map(|value| {
            value
                .as_i64()
                .ok_or_else(|| MalformedRecordError::wrong_type(name, "integer"))
        })
        .transpose()
}

fn required_str(record: &Record, name: &'static str) -> Result<String, MalformedRecordError> {
    let value = field(record, name).ok_or_else(|| MalformedRecordError::missing(name))?;
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| MalformedRecordError::wrong_type(name, "string"))
}

fn required_number(record: &Record, name: &'static str) -> Result<f64, MalformedRecordError> {
    let value = field(record, name).ok_or_else(|| MalformedRecordError::missing(name))?;
    value
        .as_f64()
        .ok_or_else(|| MalformedRecordError::wrong_type(name, "number"))
}

fn optional_bool(record: &Record, name: &'static str) -> Result<Option<bool>, MalformedRecordError> {
    field(record, name)
        .map(|value| {
            value
                .as_bool()
                .ok_or_else(|| MalformedRecordError::wrong_type(name, "boolean"))
        })
        .transpose()
}
