//! Webhook gateway — one JSON POST to the intake endpoint.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::GatewayError;

use super::{IntakePayload, SubmissionGateway, SubmissionOutcome};

/// Response fields that mark a body as an intake acknowledgement.
const RECOGNIZED_FIELDS: &[&str] = &["success", "message", "ai_response"];

/// Maximum error body length kept for logs.
const MAX_ERROR_BODY: usize = 512;

/// Posts intake payloads to a webhook URL.
///
/// The URL is kept secret because webhook URLs embed their auth token.
pub struct WebhookGateway {
    url: SecretString,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl WebhookGateway {
    pub fn new(url: SecretString, timeout: Option<Duration>) -> Self {
        Self {
            url,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, payload: &IntakePayload) -> Result<Option<String>, GatewayError> {
        let mut request = self.client.post(self.url.expose_secret()).json(payload);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        classify_response(&body)
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        match self.timeout {
            Some(timeout) if e.is_timeout() => GatewayError::Timeout(timeout),
            // Strip the URL so the token never reaches the logs.
            _ => GatewayError::Transport(e.without_url().to_string()),
        }
    }
}

#[async_trait]
impl SubmissionGateway for WebhookGateway {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn submit(&self, payload: &IntakePayload) -> SubmissionOutcome {
        tracing::info!(action = %payload.action, "Posting trip submission to intake webhook");
        let result = self.post(payload).await;
        match &result {
            Ok(message) => tracing::info!(server_message = ?message, "Intake accepted submission"),
            Err(e) => tracing::warn!(error = %e, "Intake submission failed"),
        }
        result.into()
    }
}

/// Decide whether a 2xx body acknowledges the submission.
///
/// The body must be a JSON object holding at least one recognized field,
/// and `success` must not be `false`. Returns the server's message, if any.
pub fn classify_response(body: &str) -> Result<Option<String>, GatewayError> {
    let value: serde_json::Value = serde_json::from_str(body.trim())
        .map_err(|e| GatewayError::MalformedBody(format!("not JSON: {e}")))?;

    let obj = value
        .as_object()
        .ok_or_else(|| GatewayError::MalformedBody("expected a JSON object".into()))?;

    if !RECOGNIZED_FIELDS.iter().any(|f| obj.contains_key(*f)) {
        return Err(GatewayError::MalformedBody(format!(
            "none of {} present",
            RECOGNIZED_FIELDS.join(", ")
        )));
    }

    let message = ["message", "ai_response"]
        .iter()
        .find_map(|f| obj.get(*f).and_then(|v| v.as_str()))
        .map(String::from);

    if obj.get("success").and_then(|v| v.as_bool()) == Some(false) {
        return Err(GatewayError::Rejected(
            message.unwrap_or_else(|| "success=false".to_string()),
        ));
    }

    Ok(message)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use chrono::Utc;
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    use super::*;
    use crate::gateway::TripDetails;

    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

    /// Start a stub intake server that answers every POST with `status` and
    /// `body`, recording request bodies.
    async fn start_intake(status: StatusCode, body: &'static str) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/webhook/trip",
                post(
                    move |State(seen): State<Captured>, axum::Json(v): axum::Json<serde_json::Value>| async move {
                        seen.lock().unwrap().push(v);
                        (status, body)
                    },
                ),
            )
            .with_state(Arc::clone(&captured));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://127.0.0.1:{port}/webhook/trip"), captured)
    }

    fn payload() -> IntakePayload {
        IntakePayload::new(
            "start_planning",
            Utc::now(),
            TripDetails {
                destination: "Paris".into(),
                ..Default::default()
            },
        )
    }

    fn gateway(url: String) -> WebhookGateway {
        WebhookGateway::new(SecretString::from(url), Some(Duration::from_secs(2)))
    }

    #[tokio::test]
    async fn success_response_resolves_success() {
        let (url, captured) =
            start_intake(StatusCode::OK, r#"{"success": true, "message": "Plan queued"}"#).await;

        let outcome = timeout(TEST_TIMEOUT, gateway(url).submit(&payload()))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SubmissionOutcome::Success {
                server_message: Some("Plan queued".into())
            }
        );
        let seen = captured.lock().unwrap();
        assert_eq!(seen.len(), 1, "exactly one POST per submission");
        assert_eq!(seen[0]["action"], "start_planning");
        assert_eq!(seen[0]["form_state"]["destination"], "Paris");
        assert!(seen[0]["submittedAt"].is_string());
    }

    #[tokio::test]
    async fn non_2xx_resolves_failure() {
        let (url, captured) = start_intake(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;

        let outcome = timeout(TEST_TIMEOUT, gateway(url).submit(&payload()))
            .await
            .unwrap();

        assert_eq!(outcome.kind(), crate::gateway::OutcomeKind::Failure);
        assert_eq!(captured.lock().unwrap().len(), 1, "no retry after failure");
    }

    #[tokio::test]
    async fn malformed_body_resolves_failure() {
        let (url, _) = start_intake(StatusCode::OK, "<html>ok</html>").await;
        let outcome = timeout(TEST_TIMEOUT, gateway(url).submit(&payload()))
            .await
            .unwrap();
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn unreachable_endpoint_resolves_failure() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let outcome = timeout(
            TEST_TIMEOUT,
            gateway(format!("http://127.0.0.1:{port}/webhook/trip")).submit(&payload()),
        )
        .await
        .unwrap();

        match outcome {
            SubmissionOutcome::Failure { reason } => {
                assert!(!reason.contains("127.0.0.1:"), "URL must not leak: {reason}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn classify_accepts_recognized_fields() {
        assert_eq!(classify_response(r#"{"success": true}"#).unwrap(), None);
        assert_eq!(
            classify_response(r#"{"ai_response": "Sounds lovely!"}"#).unwrap(),
            Some("Sounds lovely!".into())
        );
        assert_eq!(
            classify_response(r#"{"message": "ok", "ai_response": "later"}"#).unwrap(),
            Some("ok".into())
        );
    }

    #[test]
    fn classify_rejects_unrecognized_bodies() {
        assert!(matches!(
            classify_response(""),
            Err(GatewayError::MalformedBody(_))
        ));
        assert!(matches!(
            classify_response("[1, 2]"),
            Err(GatewayError::MalformedBody(_))
        ));
        assert!(matches!(
            classify_response(r#"{"status": "ok"}"#),
            Err(GatewayError::MalformedBody(_))
        ));
        assert!(matches!(
            classify_response(r#"{"success": false, "message": "quota"}"#),
            Err(GatewayError::Rejected(m)) if m == "quota"
        ));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo", 2), "h…");
    }
}
