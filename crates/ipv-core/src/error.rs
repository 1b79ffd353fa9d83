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

use thiserror::Error;

/// The main error type for ipv-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Environment variable error
  #[error("Environment variable error: {0}")]
  EnvVar(#[from] std::env::VarError),

  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// API key error
  #[error("Failed to retrieve API key: {0}")]
  ApiKey(String),

  /// Serialization/Deserialization error
  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),

  /// API rate limit exceeded
  #[error("Rate limit exceeded: {0}")]
  RateLimit(String),

  /// Provider account has no credits left
  #[error("Insufficient API credits: {0}")]
  InsufficientCredits(String),

  /// HTTP transport error
  #[error("HTTP error: {0}")]
  Http(String),

  /// API error reported by the data provider
  #[error("API error: {0}")]
  Api(String),

  /// Parse error for data processing
  #[error("Parse error: {0}")]
  Parse(String),

  /// The data source returned nothing usable for a ticker
  #[error("No financial data available: {0}")]
  DataUnavailable(String),

  /// Requested segment label matched nothing in any fetched period
  #[error("Segment '{segment}' not found for {ticker}. Available segments: {}", available.join(", "))]
  SegmentNotFound { ticker: String, segment: String, available: Vec<String> },

  /// Requested segment label matched several line items with different amounts
  #[error("Segment '{segment}' is ambiguous for {ticker}. Matching items: {}", matches.join(", "))]
  AmbiguousSegment { ticker: String, segment: String, matches: Vec<String> },

  /// A valuation received an empty or unusable series
  #[error("Insufficient data: {0}")]
  InsufficientData(String),

  /// Unrecognized valuation method selector
  #[error("Unknown valuation method: {0}")]
  UnknownMethod(String),

  /// An assumption that would make the computation meaningless
  #[error("Invalid assumption for {field}: {reason}")]
  InvalidAssumption { field: String, reason: String },

  /// Failure writing an export artifact
  #[error("Export error: {0}")]
  Export(String),
}

impl Error {
  /// Shorthand for `Error::InvalidAssumption`
  pub fn invalid_assumption(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Error::InvalidAssumption { field: field.into(), reason: reason.into() }
  }

  /// Whether a portfolio valuation may skip the failing segment or asset and continue.
  ///
  /// Structural errors (malformed asset definitions, impossible assumptions, missing
  /// credentials) are never recoverable.
  pub fn is_recoverable(&self) -> bool {
    !matches!(
      self,
      Error::UnknownMethod(_)
        | Error::InvalidAssumption { .. }
        | Error::Config(_)
        | Error::ApiKey(_)
        | Error::EnvVar(_)
    )
  }
}

/// Result type alias for ipv-* crates
pub type Result<T> = std::result::Result<T, Error>;
