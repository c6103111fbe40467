use std::time::Duration;

use crate::config::AccountingConfig;
use crate::domain::models::invoice::{CreatedInvoice, InvoiceRequest, InvoiceStatus};
use crate::domain::ports::AccountingProvider;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Tokens are refreshed this long before the provider says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Accounting API client authenticated with an OAuth refresh token.
pub struct HttpAccountingProvider {
    client: Client,
    config: AccountingConfig,
    token: RwLock<Option<CachedToken>>,
}

impl HttpAccountingProvider {
    pub fn new(config: AccountingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            token: RwLock::new(None),
        }
    }

    fn invoice_url(&self) -> String {
        format!("{}/v3/company/{}/invoice", self.config.api_base.trim_end_matches('/'), self.config.realm_id)
    }

    async fn access_token(&self) -> Result<String, AppError> {
        if let Some(cached) = self.token.read().await.as_ref()
            && cached.expires_at > Instant::now()
        {
            return Ok(cached.access_token.clone());
        }

        let mut guard = self.token.write().await;
        if let Some(cached) = guard.as_ref()
            && cached.expires_at > Instant::now()
        {
            return Ok(cached.access_token.clone());
        }

        let res = self.client.post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.config.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| upstream("token refresh", e))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            error!("Accounting token refresh failed. Status: {}, Body: {}", status, body);
            return Err(AppError::Upstream(format!("Accounting token refresh failed with status {}", status)));
        }

        let token: TokenResponse = res.json().await.map_err(|e| upstream("token refresh", e))?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        info!(expires_in = token.expires_in, "Accounting access token refreshed");

        let access_token = token.access_token.clone();
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime,
        });
        Ok(access_token)
    }
}

fn upstream(stage: &str, e: reqwest::Error) -> AppError {
    let msg = format!("Accounting provider {} error: {}", stage, e);
    error!("{}", msg);
    AppError::Upstream(msg)
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct InvoiceEnvelope {
    #[serde(rename = "Invoice")]
    invoice: RemoteInvoice,
}

#[derive(Deserialize)]
struct RemoteInvoice {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "TotalAmt", default)]
    total: f64,
    #[serde(rename = "Balance", default)]
    balance: f64,
}

impl RemoteInvoice {
    fn status(&self) -> InvoiceStatus {
        if self.total <= 0.0 {
            InvoiceStatus::Voided
        } else if self.balance < 0.005 {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Open
        }
    }
}

#[async_trait]
impl AccountingProvider for HttpAccountingProvider {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<CreatedInvoice, AppError> {
        let token = self.access_token().await?;

        let mut body = json!({
            "DocNumber": request.booking_id,
            "TxnDate": request.service_date.format("%Y-%m-%d").to_string(),
            "CustomerMemo": { "value": format!("{} (booking {})", request.customer_name, request.booking_id) },
            "Line": [{
                "Amount": request.amount,
                "Description": request.description,
                "DetailType": "SalesItemLineDetail",
                "SalesItemLineDetail": {
                    "ServiceDate": request.service_date.format("%Y-%m-%d").to_string(),
                    "Qty": 1,
                    "UnitPrice": request.amount
                }
            }]
        });
        if let Some(email) = &request.customer_email {
            body["BillEmail"] = json!({ "Address": email });
        }

        let res = self.client.post(self.invoice_url())
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| upstream("create invoice", e))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            error!(booking_id = %request.booking_id, "Invoice creation failed. Status: {}, Body: {}", status, text);
            return Err(AppError::Upstream(format!("Invoice creation failed with status {}", status)));
        }

        let envelope: InvoiceEnvelope = res.json().await.map_err(|e| upstream("create invoice", e))?;
        debug!(booking_id = %request.booking_id, invoice_id = %envelope.invoice.id, "Invoice created");
        Ok(CreatedInvoice {
            invoice_id: envelope.invoice.id,
            total: envelope.invoice.total,
        })
    }

    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, AppError> {
        let token = self.access_token().await?;

        let res = self.client.get(format!("{}/{}", self.invoice_url(), invoice_id))
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| upstream("invoice lookup", e))?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Invoice {} not found", invoice_id)));
        }
        if !res.status().is_success() {
            let status = res.status();
            return Err(AppError::Upstream(format!("Invoice lookup failed with status {}", status)));
        }

        let envelope: InvoiceEnvelope = res.json().await.map_err(|e| upstream("invoice lookup", e))?;
        Ok(envelope.invoice.status())
    }
}

/// Stand-in used when no accounting credentials are configured.
pub struct DisabledAccounting;

#[async_trait]
impl AccountingProvider for DisabledAccounting {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn create_invoice(&self, _request: &InvoiceRequest) -> Result<CreatedInvoice, AppError> {
        Err(AppError::Validation("Invoicing is not configured".to_string()))
    }

    async fn invoice_status(&self, _invoice_id: &str) -> Result<InvoiceStatus, AppError> {
        Err(AppError::Validation("Invoicing is not configured".to_string()))
    }
}
