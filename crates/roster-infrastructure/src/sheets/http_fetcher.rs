use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use roster_core::error::DomainError;
use roster_core::ports::SheetFetcher;

/// Fetches a spreadsheet published as CSV.
#[derive(Clone)]
pub struct HttpSheetFetcher {
    client: Client,
}

impl HttpSheetFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[async_trait]
impl SheetFetcher for HttpSheetFetcher {
    async fn fetch_csv(&self, url: &str) -> Result<String, DomainError> {
        debug!("Fetching sheet {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::SheetFetchError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Sheet download failed ({}): {}", status, url);
            return Err(DomainError::SheetFetchError(format!("HTTP {} from {}", status, url)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::SheetFetchError(e.to_string()))?;
        // Unpublished Google sheets answer 200 with a sign-in page.
        if body.trim_start().starts_with('<') {
            return Err(DomainError::SheetFetchError("Expected CSV, got HTML".into()));
        }
        Ok(body)
    }
}
