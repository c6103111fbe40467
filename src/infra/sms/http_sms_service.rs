use crate::domain::ports::SmsService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub struct HttpSmsService {
    client: Client,
    api_url: String,
    api_key: String,
    from_number: String,
}

impl HttpSmsService {
    pub fn new(api_url: String, api_key: String, from_number: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
            from_number,
        }
    }
}

#[derive(Serialize)]
struct SmsPayload<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SmsResponse {
    data: SmsResponseData,
}

#[derive(Deserialize)]
struct SmsResponseData {
    id: String,
}

#[async_trait]
impl SmsService for HttpSmsService {
    async fn send(&self, to: &str, body: &str) -> Result<String, AppError> {
        if self.api_key.is_empty() || self.from_number.is_empty() {
            return Err(AppError::Delivery("SMS provider is not configured".to_string()));
        }

        let payload = SmsPayload { from: &self.from_number, to, text: body };

        let res = self.client.post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("SMS provider connection error: {}", e);
                error!("{}", msg);
                AppError::Delivery(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("SMS provider rejected message. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Delivery(msg));
        }

        let parsed: SmsResponse = res.json().await.map_err(|e| {
            AppError::Delivery(format!("Unreadable SMS provider response: {}", e))
        })?;
        debug!(provider_id = %parsed.data.id, "SMS accepted");
        Ok(parsed.data.id)
    }
}
