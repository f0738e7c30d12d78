//! HTTP requests and responses described as plain data.
//!
//! # Design
//! The request builder produces `HttpRequest` values without touching the
//! network, and a `Transport` turns them into `HttpResponse` values. Keeping
//! both sides as owned data lets tests script the transport entirely.

use std::fmt;

pub const CONTENT_TYPE: &str = "content-type";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// HTTP verb used by the Inquire API. The server only speaks GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries the query string for GET requests.
/// POST requests carry a form-encoded `body` and the matching content type
/// header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the form body (POST) or query string (GET) into key/value pairs.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let encoded = match (&self.method, &self.body) {
            (HttpMethod::Post, Some(body)) => body.as_str(),
            _ => self.url.split_once('?').map(|(_, query)| query).unwrap_or(""),
        };
        url::form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect()
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
