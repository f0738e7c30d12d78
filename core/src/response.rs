//! Parsed response bodies.
//!
//! The server wraps every reply in an envelope of the form
//! `{"success": bool, "msg": string, ...payload}`. `ApiResponse` keeps the
//! whole object and offers typed access to the payload keys; decoding into
//! domain entities stays with the caller, who knows the acting user.

use std::sync::Arc;

use serde_json::Value;

use crate::error::MalformedRecordError;
use crate::model::{
    decode_answers, decode_question, decode_questions, decode_user, Answer, Question, Record, User,
};
use crate::types::UserId;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    body: Record,
}

impl ApiResponse {
    /// Parse a body that must be a JSON object. A `success` flag, when
    /// present, must be a boolean.
    pub fn parse(body: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(body)) => match body.get("success") {
                None | Some(Value::Bool(_)) => Ok(Self { body }),
                Some(other) => Err(format!(
                    "'success' must be a boolean, got {}",
                    kind(other)
                )),
            },
            Ok(other) => Err(format!("expected a JSON object, got {}", kind(&other))),
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn body(&self) -> &Record {
        &self.body
    }

    /// The envelope's `success` flag. A body without one counts as success.
    pub fn success(&self) -> bool {
        self.body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn message(&self) -> Option<&str> {
        self.body.get("msg").and_then(Value::as_str)
    }

    /// The object stored under `key`, if any.
    pub fn record(&self, key: &'static str) -> Result<Option<&Record>, MalformedRecordError> {
        match self.body.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(record)) => Ok(Some(record)),
            Some(_) => Err(MalformedRecordError::wrong_type(key, "object")),
        }
    }

    /// The array of objects stored under `key`. Missing means empty.
    pub fn records(&self, key: &'static str) -> Result<Vec<&Record>, MalformedRecordError> {
        match self.body.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_object()
                        .ok_or_else(|| MalformedRecordError::wrong_type(key, "array of objects"))
                })
                .collect(),
            Some(_) => Err(MalformedRecordError::wrong_type(key, "array")),
        }
    }

    pub fn user(&self) -> Result<Option<User>, MalformedRecordError> {
        self.record("user")?.map(decode_user).transpose()
    }

    pub fn question(&self, acting_user_id: UserId) -> Result<Option<Question>, MalformedRecordError> {
        self.record("question")?
            .map(|record| decode_question(record, acting_user_id))
            .transpose()
    }

    pub fn questions(&self, acting_user_id: UserId) -> Result<Vec<Question>, MalformedRecordError> {
        decode_questions(self.records("questions")?, acting_user_id)
    }

    pub fn answers(
        &self,
        acting_user_id: UserId,
        parent: &Arc<Question>,
    ) -> Result<Vec<Answer>, MalformedRecordError> {
        decode_answers(self.records("answers")?, acting_user_id, parent)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionId;

    #[test]
    fn parse_rejects_non_objects() {
        assert!(ApiResponse::parse("not json").is_err());
        assert_eq!(
            ApiResponse::parse("[1, 2]").unwrap_err(),
            "expected a JSON object, got an array"
        );
    }

    #[test]
    fn envelope_accessors() {
        let resp =
            ApiResponse::parse(r#"{"success": false, "msg": "Email or password is invalid."}"#)
                .unwrap();
        assert!(!resp.success());
        assert_eq!(resp.message(), Some("Email or password is invalid."));
        assert!(ApiResponse::parse("{}").unwrap().success());
    }

    #[test]
    fn mistyped_success_flag_is_rejected() {
        assert_eq!(
            ApiResponse::parse(r#"{"success": "false"}"#).unwrap_err(),
            "'success' must be a boolean, got a string"
        );
        assert!(ApiResponse::parse(r#"{"success": 0}"#).is_err());
        assert!(ApiResponse::parse(r#"{"success": null}"#).is_err());
    }

    #[test]
    fn user_payload_is_decoded() {
        let resp = ApiResponse::parse(
            r#"{"success": true, "msg": "OK", "user": {"user_id": 3, "email": "a@example.com", "karma": 4}}"#,
        )
        .unwrap();
        let user = resp.user().unwrap().unwrap();
        assert_eq!(user.user_id, UserId(3));
        assert_eq!(user.karma, 4);
    }

    #[test]
    fn absent_payload_is_none() {
        let resp = ApiResponse::parse(r#"{"success": true}"#).unwrap();
        assert_eq!(resp.user().unwrap(), None);
        assert!(resp.questions(UserId(1)).unwrap().is_empty());
    }

    #[test]
    fn questions_payload_is_decoded_with_ownership() {
        let resp = ApiResponse::parse(
            r#"{"questions": [
                {"user_id": 1, "question_id": 10, "question": "A?", "latitude": 1, "longitude": 2},
                {"user_id": 2, "question_id": 11, "question": "B?", "latitude": 3, "longitude": 4}
            ]}"#,
        )
        .unwrap();
        let questions = resp.questions(UserId(1)).unwrap();
        assert_eq!(questions.len(), 2);
        assert!(questions[0].is_owner);
        assert!(!questions[1].is_owner);
        assert_eq!(questions[1].question_id, QuestionId(11));
    }

    #[test]
    fn answers_payload_shares_parent() {
        let resp = ApiResponse::parse(
            r#"{"answers": [{"user_id": 2, "answer_id": 1, "answer": "Yes", "question_id": 10}]}"#,
        )
        .unwrap();
        let parent = Arc::new(Question {
            question_id: QuestionId(10),
            user_id: UserId(1),
            is_owner: true,
            text: "A?".to_string(),
            location: crate::types::Coordinate::new(1.0, 2.0),
            closed: false,
        });
        let answers = resp.answers(UserId(1), &parent).unwrap();
        assert_eq!(answers.len(), 1);
        assert!(Arc::ptr_eq(&answers[0].question_handle(), &parent));
    }

    #[test]
    fn mistyped_payload_is_malformed() {
        let resp = ApiResponse::parse(r#"{"questions": {"oops": true}}"#).unwrap();
        assert_eq!(
            resp.questions(UserId(1)).unwrap_err(),
            MalformedRecordError::wrong_type("questions", "array")
        );
    }
}
