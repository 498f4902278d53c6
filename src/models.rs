use chrono::{DateTime, Utc};
use humansize::{FormatSizeOptions, WINDOWS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::headers::HeaderList;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
        HttpMethod::HEAD,
        HttpMethod::OPTIONS,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// Case-insensitive lookup of a method name
    pub fn parse(s: &str) -> Option<HttpMethod> {
        let s = s.trim();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }

    /// Whether a request body is sent at all. GET, DELETE, HEAD and OPTIONS
    /// never carry one, even when the editor holds text.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A saved HTTP request. Headers are stored flattened: one value per key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Request {
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Request {
            name: name.into(),
            method,
            url: url.into(),
            ..Default::default()
        }
    }
}

/// A collection of requests
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collection {
    pub name: String,
    pub requests: Vec<Request>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            name: name.into(),
            requests: Vec::new(),
        }
    }
}

/// Top-level grouping of collections
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    pub name: String,
    pub collections: Vec<Collection>,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Workspace {
            name: name.into(),
            collections: Vec::new(),
        }
    }
}

/// Display class of a status code, keyed off by the status indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Neutral,
    Error,
}

impl StatusClass {
    pub fn of(code: u16) -> StatusClass {
        match code {
            200..=299 => StatusClass::Success,
            400.. => StatusClass::Error,
            _ => StatusClass::Neutral,
        }
    }
}

/// Response from HTTP request
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: HeaderList,
    /// Body as shown to the user: re-indented when it is JSON
    pub body: String,
    pub elapsed_ms: u64,
    pub request_bytes: usize,
    pub response_bytes: usize,
    pub received_at: DateTime<Utc>,
}

impl HttpResponse {
    pub fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status_code)
    }

    /// Status indicator text, e.g. "200 OK", "404 Error", "301".
    pub fn status_label(&self) -> String {
        match self.status_class() {
            StatusClass::Success => format!("{} OK", self.status_code),
            StatusClass::Error => format!("{} Error", self.status_code),
            StatusClass::Neutral => self.status_code.to_string(),
        }
    }

    pub fn meta_line(&self) -> String {
        format!(
            "{} ms    Req: {}    Resp: {}",
            self.elapsed_ms,
            format_size(self.request_bytes),
            format_size(self.response_bytes)
        )
    }
}

/// Human-readable payload size: plain bytes below 1 KB, then 1024-based units.
pub fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let options = FormatSizeOptions::from(WINDOWS)
        .decimal_places(2)
        .decimal_zeroes(2);
    humansize::format_size(bytes as u64, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_class() {
        assert_eq!(StatusClass::of(200), StatusClass::Success);
        assert_eq!(StatusClass::of(204), StatusClass::Success);
        assert_eq!(StatusClass::of(101), StatusClass::Neutral);
        assert_eq!(StatusClass::of(302), StatusClass::Neutral);
        assert_eq!(StatusClass::of(400), StatusClass::Error);
        assert_eq!(StatusClass::of(503), StatusClass::Error);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(HttpMethod::parse("patch"), Some(HttpMethod::PATCH));
        assert_eq!(HttpMethod::parse(" OPTIONS "), Some(HttpMethod::OPTIONS));
        assert_eq!(HttpMethod::parse("BREW"), None);
    }

    #[test]
    fn test_method_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&HttpMethod::DELETE).unwrap(), "\"DELETE\"");
    }

    #[test]
    fn test_request_tolerates_missing_fields() {
        let req: Request = serde_json::from_str(r#"{"name":"only name"}"#).unwrap();
        assert_eq!(req.name, "only name");
        assert_eq!(req.method, HttpMethod::GET);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 bytes");
        assert_eq!(format_size(1023), "1023 bytes");
        assert!(format_size(2048).contains("KB"));
        assert!(format_size(3 * 1024 * 1024).contains("MB"));
    }
}
