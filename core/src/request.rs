//! Request builder for the Inquire API.
//!
//! # Design
//! One pure `build_*` method per API method. Each takes typed arguments,
//! validates them, and produces an `HttpRequest` without touching the
//! network. POST bodies are form encoded; GET parameters travel in the query
//! string. Length limits are enforced here and nowhere else.

use url::form_urlencoded::Serializer;

use crate::error::ValidationError;
use crate::http::{HttpMethod, HttpRequest, CONTENT_TYPE, FORM_URLENCODED};
use crate::model::{Answer, Question};
use crate::types::{ApiMethod, Coordinate};

/// Maximum lengths, in characters, for user-written text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_question_length: usize,
    pub max_answer_length: usize,
}

/// Optional parameters of the nearby-questions search. Unset values fall
/// back to the server defaults (25 results within 50 miles).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NearbySearch {
    pub max_results: Option<u32>,
    pub max_distance_miles: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    limits: Limits,
}

impl RequestBuilder {
    pub fn new(base_url: &str, limits: Limits) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            limits,
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn build_auth(&self, email: &str, password: &str) -> Result<HttpRequest, ValidationError> {
        self.credentials(ApiMethod::Auth, email, password)
    }

    pub fn build_register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<HttpRequest, ValidationError> {
        self.credentials(ApiMethod::Register, email, password)
    }

    pub fn build_ask(
        &self,
        question: &str,
        location: Option<Coordinate>,
        pay_key: &str,
    ) -> Result<HttpRequest, ValidationError> {
        bounded("question", question, self.limits.max_question_length)?;
        let location = valid_location(location)?;
        if pay_key.trim().is_empty() {
            return Err(ValidationError::MissingPaymentToken);
        }
        Ok(self.post(
            ApiMethod::Ask,
            &[
                ("question", question),
                ("latitude", &location.latitude.to_string()),
                ("longitude", &location.longitude.to_string()),
                ("pay_key", pay_key),
            ],
        ))
    }

    pub fn build_answer(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<HttpRequest, ValidationError> {
        bounded("answer", answer, self.limits.max_answer_length)?;
        Ok(self.post(
            ApiMethod::Answer,
            &[
                ("question_id", &question.question_id.to_string()),
                ("answer", answer),
            ],
        ))
    }

    pub fn build_accept(&self, answer: &Answer) -> Result<HttpRequest, ValidationError> {
        Ok(self.post(
            ApiMethod::Accept,
            &[("answer_id", &answer.answer_id.to_string())],
        ))
    }

    pub fn build_list_questions_near(
        &self,
        location: Option<Coordinate>,
    ) -> Result<HttpRequest, ValidationError> {
        self.build_list_questions_near_with(location, NearbySearch::default())
    }

    pub fn build_list_questions_near_with(
        &self,
        location: Option<Coordinate>,
        search: NearbySearch,
    ) -> Result<HttpRequest, ValidationError> {
        let location = valid_location(location)?;
        let mut fields = vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
        ];
        if let Some(max_results) = search.max_results {
            fields.push(("max_results", max_results.to_string()));
        }
        if let Some(max_distance) = search.max_distance_miles {
            fields.push(("max_distance", max_distance.to_string()));
        }
        Ok(self.get(ApiMethod::ListQuestionsNear, &fields))
    }

    pub fn build_list_answers_for(&self, question: &Question) -> Result<HttpRequest, ValidationError> {
        Ok(self.get(
            ApiMethod::ListAnswersFor,
            &[("question_id", question.question_id.to_string())],
        ))
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.get::<&str>(ApiMethod::Logout, &[])
    }

    fn credentials(
        &self,
        method: ApiMethod,
        email: &str,
        password: &str,
    ) -> Result<HttpRequest, ValidationError> {
        present("email", email)?;
        present("password", password)?;
        Ok(self.post(method, &[("email", email), ("password", password)]))
    }

    fn url(&self, method: ApiMethod) -> String {
        format!("{}{}", self.base_url, method.path())
    }

    fn post(&self, method: ApiMethod, fields: &[(&str, &str)]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: self.url(method),
            headers: vec![(CONTENT_TYPE.to_string(), FORM_URLENCODED.to_string())],
            body: Some(encode(fields)),
        }
    }

    fn get<V: AsRef<str>>(&self, method: ApiMethod, fields: &[(&str, V)]) -> HttpRequest {
        let mut url = self.url(method);
        if !fields.is_empty() {
            url.push('?');
            url.push_str(&encode(fields));
        }
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }
}

fn encode<V: AsRef<str>>(fields: &[(&str, V)]) -> String {
    let mut serializer = Serializer::new(String::new());
    for (key, value) in fields {
        serializer.append_pair(key, value.as_ref());
    }
    serializer.finish()
}

/// Credentials are sent verbatim, so only an empty value is missing.
fn present(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

/// Question and answer text must contain something besides whitespace.
fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    required(field, value)?;
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

fn valid_location(location: Option<Coordinate>) -> Result<Coordinate, ValidationError> {
    let location = location.ok_or(ValidationError::MissingCoordinate)?;
    if !location.is_valid() {
        return Err(ValidationError::InvalidCoordinate {
            latitude: location.latitude,
            longitude: location.longitude,
        });
    }
    Ok(location)
}
