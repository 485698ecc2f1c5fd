//! Minimal request/response surface shared by controllers.
//!
//! Controllers are written against [`HandlerRequest`] and the
//! [`HandlerResponse`] trait rather than against Actix types, so the same
//! controller runs behind the HTTP server (via [`ActixResponse`]) and inside
//! the contract harness (via a recording response).

use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::Value;
use tracing::warn;

/// Route parameters or query values keyed by name.
pub type Params = BTreeMap<String, String>;

/// Route parameters and query values of an inbound request.
///
/// # Examples
/// ```
/// use storefront::inbound::http::HandlerRequest;
///
/// let request = HandlerRequest::with_params([("id", "42")]).with_query([("page", "2")]);
/// assert_eq!(request.param("id"), Some("42"));
/// assert_eq!(request.query_value("page"), Some("2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerRequest {
    params: Params,
    query: Params,
}

impl HandlerRequest {
    /// Build a request carrying the given route parameters.
    #[must_use]
    pub fn with_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: collect_pairs(params),
            query: Params::new(),
        }
    }

    /// Attach query-string values.
    #[must_use]
    pub fn with_query<I, K, V>(mut self, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query = collect_pairs(query);
        self
    }

    /// Capture route parameters and query values from an Actix request.
    ///
    /// A query string that does not decode is treated as empty.
    #[must_use]
    pub fn from_http_request(request: &HttpRequest) -> Self {
        let params = request
            .match_info()
            .iter()
            .map(|(name, value)| (name.to_owned(), value.to_owned()));
        let query = match web::Query::<Params>::from_query(request.query_string()) {
            Ok(decoded) => decoded.into_inner(),
            Err(error) => {
                warn!(%error, "ignoring undecodable query string");
                Params::new()
            }
        };
        Self::with_params(params).with_query(query)
    }

    /// All route parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// A single route parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// All query values.
    #[must_use]
    pub const fn query(&self) -> &Params {
        &self.query
    }

    /// A single query value.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

fn collect_pairs<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Response operations a controller may perform.
///
/// Each operation returns the response so calls compose fluently:
/// `res.status(500).send(body)`.
pub trait HandlerResponse {
    /// Set the status code.
    fn status(&mut self, code: u16) -> &mut Self;

    /// Send a body. String bodies are sent as text, anything else as JSON.
    fn send(&mut self, body: Value) -> &mut Self;

    /// Set a response header.
    fn set(&mut self, name: &str, value: &str) -> &mut Self;

    /// Send a JSON body.
    fn json(&mut self, body: Value) -> &mut Self;
}

#[derive(Debug, Clone, PartialEq)]
enum Body {
    Text(String),
    Json(Value),
}

/// [`HandlerResponse`] that renders into an Actix [`HttpResponse`].
#[derive(Debug, Clone, Default)]
pub struct ActixResponse {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Option<Body>,
}

impl ActixResponse {
    /// Start an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the accumulated calls. The status defaults to `200 OK`.
    #[must_use]
    pub fn into_http_response(self) -> HttpResponse {
        let status = self
            .status
            .map_or(Ok(StatusCode::OK), StatusCode::from_u16)
            .unwrap_or_else(|error| {
                warn!(%error, "controller set an invalid status code");
                StatusCode::INTERNAL_SERVER_ERROR
            });
        let mut builder = HttpResponse::build(status);
        for (name, value) in &self.headers {
            builder.insert_header((name.as_str(), value.as_str()));
        }
        match self.body {
            Some(Body::Text(text)) => builder.content_type("text/plain; charset=utf-8").body(text),
            Some(Body::Json(value)) => builder.json(value),
            None => builder.finish(),
        }
    }
}

impl HandlerResponse for ActixResponse {
    fn status(&mut self, code: u16) -> &mut Self {
        self.status = Some(code);
        self
    }

    fn send(&mut self, body: Value) -> &mut Self {
        self.body = Some(match body {
            Value::String(text) => Body::Text(text),
            other => Body::Json(other),
        });
        self
    }

    fn set(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    fn json(&mut self, body: Value) -> &mut Self {
        self.body = Some(Body::Json(body));
        self
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::header;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn with_params_collects_owned_pairs() {
        let request = HandlerRequest::with_params([("id", "5")]);
        assert_eq!(request.param("id"), Some("5"));
        assert_eq!(request.param("slug"), None);
        assert!(request.query().is_empty());
    }

    #[rstest]
    fn from_http_request_reads_match_info_and_query() {
        let http = TestRequest::get()
            .uri("/products/42?page=2&limit=5")
            .param("id", "42")
            .to_http_request();
        let request = HandlerRequest::from_http_request(&http);
        assert_eq!(request.param("id"), Some("42"));
        assert_eq!(request.query_value("page"), Some("2"));
        assert_eq!(request.query_value("limit"), Some("5"));
    }

    #[actix_web::test]
    async fn renders_status_headers_and_json() {
        let mut response = ActixResponse::new();
        response
            .status(201)
            .set("Cache-Control", "no-store")
            .json(json!({ "success": true }));
        let http = response.into_http_response();

        assert_eq!(http.status(), StatusCode::CREATED);
        assert_eq!(
            http.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(b"no-store".as_slice())
        );
        let body = to_bytes(http.into_body()).await.expect("body bytes");
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value, json!({ "success": true }));
    }

    #[actix_web::test]
    async fn string_bodies_are_sent_as_text() {
        let mut response = ActixResponse::new();
        response.send(Value::String("pong".to_owned()));
        let http = response.into_http_response();

        assert_eq!(http.status(), StatusCode::OK);
        let content_type = http
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
        let body = to_bytes(http.into_body()).await.expect("body bytes");
        assert_eq!(body.as_ref(), b"pong");
    }

    #[rstest]
    fn invalid_status_codes_become_internal_errors() {
        let mut response = ActixResponse::new();
        response.status(42);
        assert_eq!(
            response.into_http_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
