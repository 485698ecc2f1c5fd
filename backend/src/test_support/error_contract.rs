//! The data-access failure contract.
//!
//! When the document model fails at any step of a query chain, a compliant
//! controller:
//!
//! 1. sets status `500` exactly once, before sending the body;
//! 2. sends exactly one [`ErrorEnvelope`] (any `error` string is accepted
//!    unless [`ErrorContract::with_exact_error`] is set);
//! 3. emits exactly one `ERROR` event.
//!
//! [`ErrorContract::verify`] injects the failure at a chosen chain point,
//! runs the controller under a [`LogCapture`] and checks all three.

use tracing::debug;

use super::{
    CapturedEvent, ContractViolation, LogCapture, MockModel, MockResponse, ResponseCall,
    mock_request_response,
};
use crate::domain::ports::DataAccessError;
use crate::inbound::http::{ErrorEnvelope, HandlerRequest};

/// Status a compliant controller answers with.
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Failure injected by [`verify_database_error`].
pub const DATABASE_ERROR_MESSAGE: &str = "Database error";

/// Parameters of the failure contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContract {
    status: u16,
    failure_message: String,
    error_events: usize,
    exact_error: bool,
}

impl Default for ErrorContract {
    fn default() -> Self {
        Self {
            status: INTERNAL_SERVER_ERROR,
            failure_message: DATABASE_ERROR_MESSAGE.to_owned(),
            error_events: 1,
            exact_error: false,
        }
    }
}

/// Evidence gathered from a compliant run.
#[derive(Debug, Clone)]
pub struct ContractReport {
    /// The decoded failure body.
    pub envelope: ErrorEnvelope,
    /// Every event the controller emitted.
    pub events: Vec<CapturedEvent>,
    /// The recorded response.
    pub response: MockResponse,
}

impl ErrorContract {
    /// The default contract: `500`, `"Database error"`, one error event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect a different failure status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Inject a different failure message.
    #[must_use]
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    /// Expect a different number of `ERROR` events.
    #[must_use]
    pub const fn with_error_events(mut self, count: usize) -> Self {
        self.error_events = count;
        self
    }

    /// Also require the envelope's `error` to be the rendered injected
    /// failure, verbatim.
    #[must_use]
    pub const fn with_exact_error(mut self) -> Self {
        self.exact_error = true;
        self
    }

    /// Make `method` reject on `model`, run `controller` with a request
    /// carrying `params` and check the response and logs.
    ///
    /// The model is reprogrammed in place; other chain points keep whatever
    /// behaviour they had. The log capture is scoped to the controller run
    /// and is released however the run ends.
    ///
    /// # Errors
    /// Returns [`ContractViolation::Harness`] when `method` is not a
    /// whitelisted chain point (the controller is not run), otherwise the
    /// first contract clause the controller broke.
    pub async fn verify<D, C, I, K, V>(
        &self,
        controller: C,
        model: &MockModel<D>,
        method: &str,
        params: I,
    ) -> Result<ContractReport, ContractViolation>
    where
        C: AsyncFnOnce(&MockModel<D>, &HandlerRequest, &mut MockResponse),
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        model.set_rejected(method, DataAccessError::database(self.failure_message.as_str()))?;
        let (request, mut response) = mock_request_response(params);
        let capture = LogCapture::new();

        capture.capture(controller(model, &request, &mut response)).await;
        debug!(method, calls = response.calls().len(), "controller finished");

        self.check(response, &capture)
    }

    fn check(
        &self,
        response: MockResponse,
        capture: &LogCapture,
    ) -> Result<ContractReport, ContractViolation> {
        let statuses = response.status_calls();
        if statuses != [self.status] {
            return Err(ContractViolation::Status {
                expected: self.status,
                observed: statuses,
            });
        }

        let sends = response.send_calls();
        let [body] = sends.as_slice() else {
            return Err(ContractViolation::SendCount {
                observed: sends.len(),
            });
        };
        let envelope: ErrorEnvelope =
            serde_json::from_value((*body).clone()).map_err(|err| ContractViolation::Envelope {
                body: (*body).clone(),
                reason: err.to_string(),
            })?;
        if self.exact_error {
            let expected = DataAccessError::database(self.failure_message.as_str()).to_string();
            if envelope.error() != expected {
                return Err(ContractViolation::ErrorMismatch {
                    expected,
                    observed: envelope.error().to_owned(),
                });
            }
        }

        let status_at = response.position(|call| matches!(call, ResponseCall::Status(_)));
        let send_at = response.position(|call| matches!(call, ResponseCall::Send(_)));
        if status_at > send_at {
            return Err(ContractViolation::StatusAfterSend);
        }

        let observed = capture.error_count();
        if observed != self.error_events {
            return Err(ContractViolation::LogCount {
                expected: self.error_events,
                observed,
            });
        }

        Ok(ContractReport {
            envelope,
            events: capture.events(),
            response,
        })
    }
}

/// Check `controller` against the default contract with the failure
/// injected at `method`.
///
/// ```
/// use storefront::domain::Product;
/// use storefront::inbound::http::catalogue::get_product;
/// use storefront::test_support::{MockModel, MockResponse, verify_database_error};
///
/// # futures_util::FutureExt::now_or_never(async {
/// let model = MockModel::<Product>::new();
/// let report = verify_database_error(
///     get_product::<MockModel<Product>, MockResponse>,
///     &model,
///     "find_by_id",
///     [("id", "42")],
/// )
/// .await
/// .expect("controller honours the contract");
/// assert_eq!(report.envelope.error(), "Database error");
/// # }).expect("ready future");
/// ```
///
/// # Errors
/// See [`ErrorContract::verify`].
pub async fn verify_database_error<D, C, I, K, V>(
    controller: C,
    model: &MockModel<D>,
    method: &str,
    params: I,
) -> Result<ContractReport, ContractViolation>
where
    C: AsyncFnOnce(&MockModel<D>, &HandlerRequest, &mut MockResponse),
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    ErrorContract::default()
        .verify(controller, model, method, params)
        .await
}

#[cfg(test)]
mod tests {
    //! Compliant and non-compliant controllers against the contract.
    use super::*;
    use crate::domain::ports::{DocumentModel, DocumentQuery, QueryMethod};
    use crate::inbound::http::HandlerResponse;
    use crate::test_support::{HarnessError, StubBehaviour};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tracing::error;

    #[derive(Debug, Clone, PartialEq)]
    struct Doc;

    type Model = MockModel<Doc>;
    type Outcome = Result<Vec<Doc>, DataAccessError>;

    #[fixture]
    fn model() -> Model {
        MockModel::new()
    }

    async fn query(model: &Model) -> Outcome {
        model.find(json!({})).sort("name").limit(5).await
    }

    async fn compliant(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        match query(model).await {
            Ok(docs) => {
                res.status(200).json(json!(docs.len()));
            }
            Err(err) => {
                error!(error = %err, "query failed");
                res.status(500)
                    .send(ErrorEnvelope::new("Error fetching docs", &err).into());
            }
        }
    }

    async fn silent(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        if let Err(err) = query(model).await {
            res.status(500)
                .send(ErrorEnvelope::new("Error fetching docs", &err).into());
        }
    }

    async fn chatty(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        if let Err(err) = query(model).await {
            error!(error = %err, "query failed");
            error!("and again");
            res.status(500)
                .send(ErrorEnvelope::new("Error fetching docs", &err).into());
        }
    }

    async fn wrong_status(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        if let Err(err) = query(model).await {
            error!(error = %err, "query failed");
            res.status(503)
                .send(ErrorEnvelope::new("Error fetching docs", &err).into());
        }
    }

    async fn bare_body(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        if let Err(err) = query(model).await {
            error!(error = %err, "query failed");
            res.status(500).send(json!({ "message": err.to_string() }));
        }
    }

    async fn extra_key(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        if let Err(err) = query(model).await {
            error!(error = %err, "query failed");
            res.status(500).send(json!({
                "success": false,
                "message": "Error fetching docs",
                "error": err.to_string(),
                "stack": "trace",
            }));
        }
    }

    async fn swallowed(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        if let Err(err) = query(model).await {
            error!(error = %err, "query failed");
            res.status(500)
                .send(ErrorEnvelope::new("Error fetching docs", "something went wrong").into());
        }
    }

    async fn prefixed(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        if let Err(err) = query(model).await {
            error!(error = %err, "query failed");
            res.status(500).send(json!({
                "success": false,
                "message": "Error fetching docs",
                "error": format!("Error: {err}"),
            }));
        }
    }

    async fn send_first(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        if let Err(err) = query(model).await {
            error!(error = %err, "query failed");
            res.send(ErrorEnvelope::new("Error fetching docs", &err).into())
                .status(500);
        }
    }

    async fn double_send(model: &Model, _req: &HandlerRequest, res: &mut MockResponse) {
        if let Err(err) = query(model).await {
            error!(error = %err, "query failed");
            let body: serde_json::Value = ErrorEnvelope::new("Error fetching docs", &err).into();
            res.status(500).send(body.clone()).send(body);
        }
    }

    #[rstest]
    #[case("find")]
    #[case("sort")]
    #[case("limit")]
    #[tokio::test]
    async fn compliant_controllers_pass_at_every_link(model: Model, #[case] method: &str) {
        let report = verify_database_error(compliant, &model, method, [("id", "42")])
            .await
            .expect("controller honours the contract");

        assert_eq!(report.envelope.message(), "Error fetching docs");
        assert_eq!(report.envelope.error(), DATABASE_ERROR_MESSAGE);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.response.status_calls(), vec![500]);
    }

    #[rstest]
    #[tokio::test]
    async fn custom_failure_messages_flow_into_the_envelope(model: Model) {
        let report = ErrorContract::new()
            .with_failure_message("connection reset")
            .verify(compliant, &model, "find", Vec::<(String, String)>::new())
            .await
            .expect("controller honours the contract");
        assert_eq!(report.envelope.error(), "connection reset");
    }

    #[rstest]
    #[tokio::test]
    async fn verification_leaves_other_links_chaining(model: Model) {
        verify_database_error(compliant, &model, "sort", [("id", "1")])
            .await
            .expect("controller honours the contract");

        let methods: Vec<_> = model.calls().into_iter().map(|call| call.method).collect();
        assert_eq!(
            methods,
            vec![QueryMethod::Find, QueryMethod::Sort, QueryMethod::Limit]
        );
        assert!(
            model
                .behaviour("find")
                .is_ok_and(|behaviour| behaviour == StubBehaviour::Chain)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn missing_log_events_are_reported(model: Model) {
        let err = verify_database_error(silent, &model, "find", [("id", "1")])
            .await
            .expect_err("controller does not log");
        assert_eq!(
            err,
            ContractViolation::LogCount {
                expected: 1,
                observed: 0
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn extra_log_events_are_reported(model: Model) {
        let err = verify_database_error(chatty, &model, "find", [("id", "1")])
            .await
            .expect_err("controller logs twice");
        assert_eq!(
            err,
            ContractViolation::LogCount {
                expected: 1,
                observed: 2
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn the_expected_log_count_is_configurable(model: Model) {
        ErrorContract::new()
            .with_error_events(2)
            .verify(chatty, &model, "find", [("id", "1")])
            .await
            .expect("two events were expected");
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_status_codes_are_reported(model: Model) {
        let err = verify_database_error(wrong_status, &model, "limit", [("id", "1")])
            .await
            .expect_err("controller answers 503");
        assert_eq!(
            err,
            ContractViolation::Status {
                expected: 500,
                observed: vec![503]
            }
        );

        ErrorContract::new()
            .with_status(503)
            .verify(wrong_status, &model, "limit", [("id", "1")])
            .await
            .expect("503 was expected");
    }

    #[rstest]
    #[tokio::test]
    async fn bodies_without_the_success_flag_are_reported(model: Model) {
        let err = verify_database_error(bare_body, &model, "find", [("id", "1")])
            .await
            .expect_err("body is not an error envelope");
        assert!(matches!(err, ContractViolation::Envelope { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn bodies_with_extra_keys_are_reported(model: Model) {
        let err = verify_database_error(extra_key, &model, "find", [("id", "1")])
            .await
            .expect_err("body leaks a stack");
        let ContractViolation::Envelope { reason, .. } = err else {
            panic!("expected an envelope violation, got {err:?}");
        };
        assert!(reason.contains("stack"));
    }

    #[rstest]
    #[tokio::test]
    async fn decorated_error_strings_are_accepted_by_default(model: Model) {
        let report = verify_database_error(prefixed, &model, "find", [("id", "1")])
            .await
            .expect("the error text is not interpreted");
        assert_eq!(report.envelope.error(), "Error: Database error");
    }

    #[rstest]
    #[tokio::test]
    async fn rewritten_error_strings_are_accepted_by_default(model: Model) {
        let report = verify_database_error(swallowed, &model, "find", [("id", "1")])
            .await
            .expect("the error text is not interpreted");
        assert_eq!(report.envelope.error(), "something went wrong");
    }

    #[rstest]
    #[tokio::test]
    async fn exact_errors_must_carry_the_injected_failure(model: Model) {
        let err = ErrorContract::new()
            .with_exact_error()
            .verify(prefixed, &model, "find", [("id", "1")])
            .await
            .expect_err("failure text is decorated");
        assert_eq!(
            err,
            ContractViolation::ErrorMismatch {
                expected: DATABASE_ERROR_MESSAGE.to_owned(),
                observed: "Error: Database error".to_owned(),
            }
        );

        ErrorContract::new()
            .with_exact_error()
            .verify(compliant, &model, "find", [("id", "1")])
            .await
            .expect("compliant controllers forward the failure verbatim");
    }

    #[rstest]
    #[tokio::test]
    async fn status_must_precede_the_body(model: Model) {
        let err = verify_database_error(send_first, &model, "find", [("id", "1")])
            .await
            .expect_err("body sent before status");
        assert_eq!(err, ContractViolation::StatusAfterSend);
    }

    #[rstest]
    #[tokio::test]
    async fn repeated_sends_are_reported(model: Model) {
        let err = verify_database_error(double_send, &model, "find", [("id", "1")])
            .await
            .expect_err("body sent twice");
        assert_eq!(err, ContractViolation::SendCount { observed: 2 });
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_methods_fail_before_the_controller_runs(model: Model) {
        let err = verify_database_error(compliant, &model, "aggregate", [("id", "1")])
            .await
            .expect_err("method is not whitelisted");

        assert!(matches!(
            err,
            ContractViolation::Harness(HarnessError::UnknownMethod(_))
        ));
        assert!(err.to_string().contains("aggregate"));
        assert!(model.calls().is_empty());
    }
}
