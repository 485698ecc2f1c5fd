//! Recording request/response pair for driving controllers directly.

use serde_json::Value;

use crate::inbound::http::{HandlerRequest, HandlerResponse};

/// One call made on a [`MockResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseCall {
    /// `status(code)`.
    Status(u16),
    /// `send(body)`.
    Send(Value),
    /// `set(name, value)`.
    Set {
        /// Header name.
        name: String,
        /// Header value.
        value: String,
    },
    /// `json(body)`.
    Json(Value),
}

/// Response double that records every call in order.
///
/// Each recording method returns the response itself so controllers can
/// chain `res.status(500).send(body)` exactly as they do against the real
/// adapter.
#[derive(Debug, Clone, Default)]
pub struct MockResponse {
    calls: Vec<ResponseCall>,
}

impl MockResponse {
    /// A response with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call, in order.
    #[must_use]
    pub fn calls(&self) -> &[ResponseCall] {
        &self.calls
    }

    /// Arguments of every `status` call.
    #[must_use]
    pub fn status_calls(&self) -> Vec<u16> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ResponseCall::Status(code) => Some(*code),
                _ => None,
            })
            .collect()
    }

    /// Bodies of every `send` call.
    #[must_use]
    pub fn send_calls(&self) -> Vec<&Value> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ResponseCall::Send(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    /// Bodies of every `json` call.
    #[must_use]
    pub fn json_calls(&self) -> Vec<&Value> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ResponseCall::Json(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    /// Every header set, as `(name, value)`.
    #[must_use]
    pub fn header_calls(&self) -> Vec<(&str, &str)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ResponseCall::Set { name, value } => Some((name.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Position of the first call matching `predicate`.
    pub(crate) fn position(&self, predicate: impl Fn(&ResponseCall) -> bool) -> Option<usize> {
        self.calls.iter().position(predicate)
    }
}

impl HandlerResponse for MockResponse {
    fn status(&mut self, code: u16) -> &mut Self {
        self.calls.push(ResponseCall::Status(code));
        self
    }

    fn send(&mut self, body: Value) -> &mut Self {
        self.calls.push(ResponseCall::Send(body));
        self
    }

    fn set(&mut self, name: &str, value: &str) -> &mut Self {
        self.calls.push(ResponseCall::Set {
            name: name.to_owned(),
            value: value.to_owned(),
        });
        self
    }

    fn json(&mut self, body: Value) -> &mut Self {
        self.calls.push(ResponseCall::Json(body));
        self
    }
}

/// Build a request carrying `params` as path parameters and a fresh
/// recording response.
///
/// ```
/// use storefront::test_support::mock_request_response;
///
/// let (req, res) = mock_request_response([("id", "42")]);
/// assert_eq!(req.param("id"), Some("42"));
/// assert!(res.calls().is_empty());
/// ```
#[must_use]
pub fn mock_request_response<I, K, V>(params: I) -> (HandlerRequest, MockResponse)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    (HandlerRequest::with_params(params), MockResponse::new())
}
