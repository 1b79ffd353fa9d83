/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! HTTP transport layer for Financial Datasets API requests

use ipv_core::{Config, Endpoint, Error, Result, API_KEY_HEADER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// HTTP transport layer for making requests to the Financial Datasets API
pub struct Transport {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    max_retries: u32,
}

impl Transport {
    /// Create a new transport instance
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("ipv-client/0.1.0")
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
        })
    }

    /// Create a mock transport for testing
    #[cfg(test)]
    pub fn new_mock() -> Self {
        Self {
            client: Client::new(),
            base_url: "https://mock.financialdatasets.ai".to_string(),
            api_key: "test_key".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    /// Make a GET request to the Financial Datasets API
    ///
    /// Transport failures and throttling are retried with exponential backoff.
    /// A 404 is reported as [`Error::DataUnavailable`] and never retried, neither are
    /// authentication or credit errors.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The API endpoint to call
    /// * `params` - Query parameters for the request
    #[instrument(skip(self, params), fields(endpoint = %endpoint))]
    pub async fn get<T>(&self, endpoint: Endpoint, params: HashMap<String, String>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.build_url(endpoint, params)?;
        debug!("Making request to: {}", url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(2_u64.pow(attempt) * 1000); // Exponential backoff
                warn!("Retrying request in {}ms (attempt {})", delay.as_millis(), attempt + 1);
                tokio::time::sleep(delay).await;
            }

            match self.fetch_text(&url).await {
                Ok(text) => {
                    debug!("Response body length: {} bytes", text.len());

                    self.check_api_error(&text)?;

                    return match serde_json::from_str::<T>(&text) {
                        Ok(data) => {
                            info!("Successfully parsed response for endpoint: {}", endpoint);
                            Ok(data)
                        }
                        Err(e) => {
                            error!("Failed to parse JSON response: {}", e);
                            Err(Error::Parse(format!(
                                "Failed to parse response: {}. Response: {}",
                                e,
                                truncate(&text, 200)
                            )))
                        }
                    };
                }
                Err(e) if is_retryable(&e) => {
                    warn!("Request failed (attempt {}): {}", attempt + 1, e);
                    last_error = Some(e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Http("Max retries exceeded".to_string())))
    }

    /// Build the full URL for an API request
    fn build_url(&self, endpoint: Endpoint, params: HashMap<String, String>) -> Result<String> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint.path()))
            .map_err(|e| Error::Http(format!("Invalid base URL: {}", e)))?;

        {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in params {
                query_pairs.append_pair(&key, &value);
            }
        }

        Ok(url.to_string())
    }

    /// Send the request and return the body of a successful response
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read response body: {}", e)))?;

        if status.is_success() {
            debug!("Request successful with status: {}", status);
            Ok(text)
        } else {
            error!("Request failed with status: {}", status);
            Err(classify_status(status, &text))
        }
    }

    /// Check for provider error messages in a successful response body
    fn check_api_error(&self, response_text: &str) -> Result<()> {
        if mentions_insufficient_credits(response_text) {
            return Err(Error::InsufficientCredits(truncate(response_text, 200).to_string()));
        }

        if response_text.contains("\"error\"") {
            if let Ok(serde_json::Value::Object(body)) = serde_json::from_str(response_text) {
                if let Some(message) = body.get("error").and_then(|v| v.as_str()) {
                    let detail = body.get("message").and_then(|v| v.as_str()).unwrap_or_default();
                    return Err(Error::Api(format!("{} {}", message, detail).trim().to_string()));
                }
            }
        }

        Ok(())
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get request timeout duration
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Map a non-success HTTP status to the error taxonomy
fn classify_status(status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::DataUnavailable(format!("provider returned {}", status)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::ApiKey("Invalid API key or unauthorized request".to_string())
        }
        StatusCode::PAYMENT_REQUIRED => Error::InsufficientCredits(truncate(body, 200).to_string()),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimit(format!("provider returned {}", status)),
        _ if mentions_insufficient_credits(body) => {
            Error::InsufficientCredits(truncate(body, 200).to_string())
        }
        _ => Error::Http(format!("HTTP error: {}", status)),
    }
}

fn mentions_insufficient_credits(body: &str) -> bool {
    body.to_lowercase().contains("insufficient credits")
}

fn is_retryable(error: &Error) -> bool {
    matches!(error, Error::Http(_) | Error::RateLimit(_))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
