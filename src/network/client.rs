//! HTTP client wrapper - executes requests and formats responses

use std::time::Instant;

use chrono::Utc;
use reqwest::{Method, Url};
use serde::de::IgnoredAny;

use crate::constants::{APP_NAME, APP_VERSION};
use crate::error::{Error, Result};
use crate::headers::HeaderList;
use crate::messages::network::OutgoingRequest;
use crate::models::{HttpMethod, HttpResponse};

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::GET => Method::GET,
        HttpMethod::POST => Method::POST,
        HttpMethod::PUT => Method::PUT,
        HttpMethod::DELETE => Method::DELETE,
        HttpMethod::PATCH => Method::PATCH,
        HttpMethod::HEAD => Method::HEAD,
        HttpMethod::OPTIONS => Method::OPTIONS,
    }
}

/// The body actually sent: `None` for methods that never carry one,
/// otherwise the editor text, even when empty.
pub fn outgoing_body(method: HttpMethod, body: &str) -> Option<&str> {
    method.has_body().then_some(body)
}

/// Re-indents a strictly valid JSON document with four spaces. `None` when
/// the payload is not JSON.
///
/// Only whitespace between tokens changes: numbers, string escapes and
/// duplicate keys come out exactly as the server sent them.
pub fn pretty_json(raw: &[u8]) -> Option<String> {
    serde_json::from_slice::<IgnoredAny>(raw).ok()?;
    let text = std::str::from_utf8(raw).ok()?;
    Some(reindent(text, "    "))
}

fn newline(out: &mut String, indent: &str, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(indent);
    }
}

/// Token-level re-indent of already validated JSON. Empty `{}` and `[]`
/// stay on one line.
fn reindent(text: &str, indent: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut just_opened = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            continue;
        }
        if just_opened {
            just_opened = false;
            if matches!(c, '}' | ']') {
                depth = depth.saturating_sub(1);
                out.push(c);
                continue;
            }
            newline(&mut out, indent, depth);
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' | '[' => {
                out.push(c);
                depth += 1;
                just_opened = true;
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, indent, depth);
                out.push(c);
            }
            ',' => {
                out.push(c);
                newline(&mut out, indent, depth);
            }
            ':' => out.push_str(": "),
            _ => out.push(c),
        }
    }
    out
}

fn map_send_error(e: reqwest::Error) -> Error {
    if e.is_builder() {
        Error::RequestBuild(e.to_string())
    } else if e.is_timeout() {
        Error::Transport(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        Error::Transport(format!("Connection failed: {}", e))
    } else {
        Error::Transport(e.to_string())
    }
}

/// Build a request from the given parameters
fn build_request(
    client: &reqwest::Client,
    method: HttpMethod,
    url: &str,
    headers: &HeaderList,
    body: &str,
) -> Result<(reqwest::Request, usize)> {
    let url = url.trim();
    let parsed = Url::parse(url).map_err(|e| Error::RequestBuild(format!("{}: {}", e, url)))?;

    let mut req_builder = client.request(to_reqwest_method(method), parsed);
    for (key, value) in headers.iter() {
        req_builder = req_builder.header(key, value);
    }

    let request_bytes = match outgoing_body(method, body) {
        Some(body) => {
            req_builder = req_builder.body(body.to_string());
            body.len()
        }
        None => 0,
    };

    let request = req_builder
        .build()
        .map_err(|e| Error::RequestBuild(e.to_string()))?;
    Ok((request, request_bytes))
}

/// Executes one HTTP call.
///
/// `elapsed_ms` covers sending the request and receiving the response head;
/// reading the body is not included.
pub async fn execute(
    client: &reqwest::Client,
    method: HttpMethod,
    url: &str,
    headers: &HeaderList,
    body: &str,
) -> Result<HttpResponse> {
    let (request, request_bytes) = build_request(client, method, url, headers, body)?;

    let start = Instant::now();
    let response = client.execute(request).await.map_err(map_send_error)?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let status = response.status();
    let response_headers: HeaderList = response
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::Read(e.to_string()))?;

    let body = match pretty_json(&bytes) {
        Some(formatted) => formatted,
        None => String::from_utf8_lossy(&bytes).into_owned(),
    };

    Ok(HttpResponse {
        status_code: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers: response_headers,
        body,
        elapsed_ms,
        request_bytes,
        response_bytes: bytes.len(),
        received_at: Utc::now(),
    })
}

/// Executes a request composed in the editor.
pub async fn execute_request(client: &reqwest::Client, request: &OutgoingRequest) -> Result<HttpResponse> {
    execute(
        client,
        request.method,
        &request.url,
        &request.headers,
        &request.body,
    )
    .await
}

/// Create an HTTP client with default configuration.
///
/// No overall timeout is set; the transport defaults apply.
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(format!("{}/{}", APP_NAME, APP_VERSION))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::parse_headers;
    use crate::models::StatusClass;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_with(status: u16, content_type: &str, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(path("/"))
            .respond_with(ResponseTemplate::new(status).set_body_raw(body.to_string(), content_type))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_outgoing_body() {
        assert_eq!(outgoing_body(HttpMethod::GET, "x"), None);
        assert_eq!(outgoing_body(HttpMethod::DELETE, "x"), None);
        assert_eq!(outgoing_body(HttpMethod::HEAD, "x"), None);
        assert_eq!(outgoing_body(HttpMethod::OPTIONS, "x"), None);
        assert_eq!(outgoing_body(HttpMethod::POST, ""), Some(""));
        assert_eq!(outgoing_body(HttpMethod::PATCH, "x"), Some("x"));
    }

    #[test]
    fn test_pretty_json() {
        assert_eq!(pretty_json(br#"{"a":1}"#).unwrap(), "{\n    \"a\": 1\n}");
        assert_eq!(
            pretty_json(br#"{"z":[1,2],"a":null}"#).unwrap(),
            "{\n    \"z\": [\n        1,\n        2\n    ],\n    \"a\": null\n}"
        );
        assert_eq!(
            pretty_json(b" { \"o\" : { } , \"l\" : [ ] } ").unwrap(),
            "{\n    \"o\": {},\n    \"l\": []\n}"
        );
        assert!(pretty_json(b"not json").is_none());
        assert!(pretty_json(b"{'a': 1}").is_none());
        assert!(pretty_json(b"").is_none());
    }

    #[test]
    fn test_pretty_json_keeps_tokens_verbatim() {
        let raw = br#"{"id":12345678901234567890123,"price":1.10,"e":"\u00e9","s":"a,b:{[\"]}","a":1,"a":2}"#;
        assert_eq!(
            pretty_json(raw).unwrap(),
            concat!(
                "{\n",
                "    \"id\": 12345678901234567890123,\n",
                "    \"price\": 1.10,\n",
                "    \"e\": \"\\u00e9\",\n",
                "    \"s\": \"a,b:{[\\\"]}\",\n",
                "    \"a\": 1,\n",
                "    \"a\": 2\n",
                "}"
            )
        );
    }

    #[tokio::test]
    async fn test_json_response_is_reindented() {
        let server = server_with(200, "application/json", r#"{"a":1}"#).await;

        let resp = execute(&create_client(), HttpMethod::GET, &server.uri(), &HeaderList::new(), "")
            .await
            .unwrap();

        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.status_text, "OK");
        assert_eq!(resp.status_class(), StatusClass::Success);
        assert_eq!(resp.body, "{\n    \"a\": 1\n}");
        assert_eq!(resp.response_bytes, 7);
        assert_eq!(
            resp.headers.get_all("content-type").collect::<Vec<_>>(),
            vec!["application/json"]
        );
    }

    #[tokio::test]
    async fn test_non_json_passes_through() {
        let server = server_with(404, "text/plain", "not json").await;
        let resp = execute(&create_client(), HttpMethod::GET, &server.uri(), &HeaderList::new(), "")
            .await
            .unwrap();

        assert_eq!(resp.body, "not json");
        assert_eq!(resp.status_class(), StatusClass::Error);
        assert_eq!(resp.status_label(), "404 Error");
    }

    #[tokio::test]
    async fn test_get_omits_body() {
        let server = server_with(200, "text/plain", "ok").await;
        let resp = execute(&create_client(), HttpMethod::GET, &server.uri(), &HeaderList::new(), "payload")
            .await
            .unwrap();

        assert_eq!(resp.request_bytes, 0);
        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_body_methods_send_editor_text() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let resp = execute(&create_client(), HttpMethod::PUT, &server.uri(), &HeaderList::new(), "hello")
            .await
            .unwrap();
        assert_eq!(resp.status_code, 201);
        assert_eq!(resp.request_bytes, 5);

        let resp = execute(&create_client(), HttpMethod::PUT, &server.uri(), &HeaderList::new(), "")
            .await
            .unwrap();
        assert_eq!(resp.request_bytes, 0);

        let received = server.received_requests().await.unwrap();
        assert_eq!(received[0].body, b"hello");
        assert!(received[1].body.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_headers_are_all_sent() {
        let server = server_with(200, "text/plain", "").await;
        let headers = parse_headers("X-Dup: a\nX-Dup: b\nAccept: text/plain");
        execute(&create_client(), HttpMethod::GET, &server.uri(), &headers, "")
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        let dup: Vec<_> = received[0]
            .headers
            .get_all("x-dup")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(dup, vec!["a", "b"]);
        assert_eq!(received[0].headers.get("accept").unwrap(), "text/plain");
    }

    #[tokio::test]
    async fn test_build_errors() {
        let client = create_client();
        let err = execute(&client, HttpMethod::GET, "not a url", &HeaderList::new(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RequestBuild(_)));

        let headers = parse_headers("bad header: x");
        let err = execute(&client, HttpMethod::GET, "http://127.0.0.1:1", &headers, "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RequestBuild(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = execute(
            &create_client(),
            HttpMethod::GET,
            &format!("http://{}", addr),
            &HeaderList::new(),
            "",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_truncated_body_is_read_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // A mock server always sends well-formed responses, so this one is hand-rolled.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await.unwrap();
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nshort")
                .await
                .unwrap();
        });

        let err = execute(
            &create_client(),
            HttpMethod::GET,
            &format!("http://{}", addr),
            &HeaderList::new(),
            "",
        )
        .await
        .unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, Error::Read(_)));
    }
}
