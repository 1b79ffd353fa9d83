//! Endpoint groups of the Financial Datasets API

pub mod financials;
pub mod market;

use crate::transport::Transport;
use governor::{
  clock::DefaultClock,
  middleware::NoOpMiddleware,
  state::{InMemoryState, NotKeyed},
  RateLimiter,
};
use ipv_core::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Direct (un-keyed) rate limiter shared by all endpoint groups
pub type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Base trait for endpoint implementations
///
/// Provides common functionality needed by all endpoint modules
pub trait EndpointBase {
  /// Wait for rate limit before making a request
  async fn wait_for_rate_limit(&self) -> Result<()>;

  /// Get a reference to the transport layer
  fn transport(&self) -> &Arc<Transport>;
}

/// Macro to implement the EndpointBase trait for endpoint structs
macro_rules! impl_endpoint_base {
  ($struct_name:ident) => {
    impl EndpointBase for $struct_name {
      async fn wait_for_rate_limit(&self) -> Result<()> {
        self.rate_limiter.until_ready().await;
        Ok(())
      }

      fn transport(&self) -> &Arc<Transport> {
        &self.transport
      }
    }
  };
}

pub(crate) use impl_endpoint_base;

/// Query parameters for a periodic statement request
pub(crate) fn statement_params(ticker: &str, limit: usize) -> HashMap<String, String> {
  let mut params = HashMap::new();
  params.insert("ticker".to_string(), ticker.to_string());
  params.insert("period".to_string(), ipv_core::ANNUAL_PERIOD.to_string());
  params.insert("limit".to_string(), limit.to_string());
  params
}

/// Query parameters for a snapshot request
pub(crate) fn ticker_params(ticker: &str) -> HashMap<String, String> {
  let mut params = HashMap::new();
  params.insert("ticker".to_string(), ticker.to_string());
  params
}
