use crate::error::SinkError;
use crate::pipeline::payload::{CompanyPayload, UserPayload};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;

/// JSON endpoints of the ticketing system
pub struct HttpSinks {
    client: Client,
    company_url: String,
    user_url: String,
}

impl HttpSinks {
    pub fn new(company_url: &str, user_url: &str, timeout: Duration) -> Result<Self, SinkError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SinkError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpSinks {
            client,
            company_url: company_url.to_string(),
            user_url: user_url.to_string(),
        })
    }

    pub fn post_company(&self, payload: &CompanyPayload) -> Result<u16, SinkError> {
        self.post_json(&self.company_url, payload)
    }

    pub fn post_user(&self, payload: &UserPayload) -> Result<u16, SinkError> {
        self.post_json(&self.user_url, payload)
    }

    /// POST a JSON body; anything outside 2xx is an error.
    fn post_json<T: Serialize>(&self, url: &str, payload: &T) -> Result<u16, SinkError> {
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(payload).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(status.as_u16())
    }
}
