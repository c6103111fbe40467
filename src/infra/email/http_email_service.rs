use crate::domain::models::message_log::OutboundEmail;
use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Delivers mail through an HTTP relay that accepts a JSON envelope.
pub struct HttpEmailService {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpEmailService {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[derive(Serialize)]
struct AttachmentPayload {
    filename: String,
    content_type: String,
    content_base64: String,
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from_addr: &'a str,
    to_addr: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    attachments: Vec<AttachmentPayload>,
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send(&self, email: &OutboundEmail) -> Result<(), AppError> {
        let attachments = email
            .attachments
            .iter()
            .map(|a| AttachmentPayload {
                filename: a.filename.clone(),
                content_type: a.content_type.clone(),
                content_base64: general_purpose::STANDARD.encode(&a.data),
            })
            .collect();

        let payload = EmailPayload {
            from_addr: &self.from,
            to_addr: &email.to,
            subject: &email.subject,
            html_body: &email.html_body,
            text_body: &email.text_body,
            attachments,
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Email service connection error: {}", e);
                error!("{}", msg);
                AppError::Delivery(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Email service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Delivery(msg));
        }

        Ok(())
    }
}
