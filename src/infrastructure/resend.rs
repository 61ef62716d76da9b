use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::errors::DomainError;
use crate::domain::ports::{Mailer, OutboundEmail};

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// Resend delivery client. One blocking POST per email, no retry or queueing;
/// the caller decides what a failed delivery means.
pub struct ResendMailer {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    from: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, from)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

/// Resend wants attachments as `{filename, content}` with base64 content.
fn build_payload(from: &str, email: &OutboundEmail) -> Value {
    let attachments: Vec<Value> = email
        .attachments
        .iter()
        .map(|a| {
            json!({
                "filename": a.filename,
                "content": BASE64.encode(&a.content),
            })
        })
        .collect();

    json!({
        "from": from,
        "to": [email.to],
        "subject": email.subject,
        "html": email.html,
        "attachments": attachments,
    })
}

impl Mailer for ResendMailer {
    fn send(&self, email: &OutboundEmail) -> Result<String, DomainError> {
        let payload = build_payload(&self.from, email);

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| DomainError::NotificationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DomainError::NotificationFailed(format!(
                "provider returned HTTP {}",
                response.status()
            )));
        }

        let body: SendResponse = response
            .json()
            .map_err(|e| DomainError::NotificationFailed(e.to_string()))?;

        let id = body.id.unwrap_or_else(|| "unknown".into());
        log::info!("email sent to {} (id: {})", email.to, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Attachment;

    #[test]
    fn payload_encodes_attachments_as_base64() {
        let email = OutboundEmail {
            to: "ada@example.com".into(),
            subject: "Your tickets".into(),
            html: "<p>hi</p>".into(),
            attachments: vec![Attachment {
                filename: "Ticket_ABC.pdf".into(),
                content: b"%PDF-1.4 fake".to_vec(),
            }],
        };

        let payload = build_payload("Tickets <no-reply@example.com>", &email);

        assert_eq!(payload["to"][0], "ada@example.com");
        assert_eq!(payload["attachments"][0]["filename"], "Ticket_ABC.pdf");
        let encoded = payload["attachments"][0]["content"].as_str().unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap(), b"%PDF-1.4 fake");
    }

    #[test]
    fn payload_without_attachments_has_empty_list() {
        let email = OutboundEmail {
            to: "ops@example.com".into(),
            subject: "New order".into(),
            html: "<p>summary</p>".into(),
            attachments: vec![],
        };

        let payload = build_payload("Tickets <no-reply@example.com>", &email);
        assert_eq!(payload["attachments"].as_array().unwrap().len(), 0);
    }

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_email() -> OutboundEmail {
        OutboundEmail {
            to: "ada@example.com".into(),
            subject: "Your Ticket(s) - Ref: Xy7Qw2Lm9a".into(),
            html: "<p>tickets attached</p>".into(),
            attachments: vec![Attachment {
                filename: "Ticket_ABC.pdf".into(),
                content: b"%PDF-1.4 fake".to_vec(),
            }],
        }
    }

    #[tokio::test]
    async fn send_posts_the_email_and_returns_the_provider_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test_key"))
            .and(body_partial_json(json!({
                "from": "Tickets <no-reply@example.com>",
                "to": ["ada@example.com"],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mail_123" })))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let id = tokio::task::spawn_blocking(move || {
            let mailer =
                ResendMailer::with_base_url(uri, "re_test_key", "Tickets <no-reply@example.com>");
            let email = sample_email();
            mailer.send(&email)
        })
            .await
            .unwrap()
            .expect("send failed");
        assert_eq!(id, "mail_123");
    }

    #[tokio::test]
    async fn provider_rejection_is_a_notification_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Invalid `from` field"
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let err = tokio::task::spawn_blocking(move || {
            let mailer = ResendMailer::with_base_url(uri, "re_test_key", "nonsense");
            let email = sample_email();
            mailer.send(&email)
        })
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, DomainError::NotificationFailed(_)));
    }
}
