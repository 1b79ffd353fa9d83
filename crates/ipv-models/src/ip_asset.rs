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

//! Intellectual property asset definitions

use ipv_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of intangible being valued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpType {
  Patent,
  Trademark,
  TradeSecret,
  Copyright,
}

impl fmt::Display for IpType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IpType::Patent => write!(f, "patent"),
      IpType::Trademark => write!(f, "trademark"),
      IpType::TradeSecret => write!(f, "trade_secret"),
      IpType::Copyright => write!(f, "copyright"),
    }
  }
}

/// Present-value algorithm applied to an asset's segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ValuationMethod {
  ReliefFromRoyalty,
  ExcessEarnings,
  TechnologyFactor,
}

impl ValuationMethod {
  pub const ALL: [ValuationMethod; 3] =
    [ValuationMethod::ReliefFromRoyalty, ValuationMethod::ExcessEarnings, ValuationMethod::TechnologyFactor];

  pub fn as_str(&self) -> &'static str {
    match self {
      ValuationMethod::ReliefFromRoyalty => "relief_from_royalty",
      ValuationMethod::ExcessEarnings => "excess_earnings",
      ValuationMethod::TechnologyFactor => "technology_factor",
    }
  }

  /// Whether the method capitalizes a perpetuity after the forecast years
  pub fn has_terminal_value(&self) -> bool {
    !matches!(self, ValuationMethod::TechnologyFactor)
  }
}

impl fmt::Display for ValuationMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ValuationMethod {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().replace('-', "_").as_str() {
      "relief_from_royalty" => Ok(ValuationMethod::ReliefFromRoyalty),
      "excess_earnings" => Ok(ValuationMethod::ExcessEarnings),
      "technology_factor" => Ok(ValuationMethod::TechnologyFactor),
      _ => Err(Error::UnknownMethod(s.to_string())),
    }
  }
}

impl TryFrom<String> for ValuationMethod {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> {
    value.parse()
  }
}

/// A business segment and the share of its economics attributable to one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAttribution {
  pub name: String,

  #[serde(alias = "attribution_pct")]
  pub attribution_fraction: f64,
}

fn default_total_legal_life() -> u32 {
  20
}

/// Patent-quality inputs for the technology factor method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyScores {
  /// Innovation score in [0, 1]
  pub innovation_score: Option<f64>,

  /// Commercial success score in [0, 1]
  pub commercial_score: Option<f64>,

  /// Legal strength score in [0, 1]
  pub legal_strength: Option<f64>,

  pub remaining_life_years: Option<u32>,

  #[serde(default = "default_total_legal_life")]
  pub total_legal_life_years: u32,
}

impl Default for TechnologyScores {
  fn default() -> Self {
    Self {
      innovation_score: None,
      commercial_score: None,
      legal_strength: None,
      remaining_life_years: None,
      total_legal_life_years: default_total_legal_life(),
    }
  }
}

/// One intangible asset and the segments it contributes to.
///
/// Immutable once built; callers construct it through [`IpAsset::new`] and the
/// `with_*` builders, or deserialize it from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpAsset {
  pub id: String,

  #[serde(rename = "type", alias = "ip_type")]
  pub ip_type: IpType,

  pub description: String,

  pub related_segments: Vec<SegmentAttribution>,

  pub royalty_rate: f64,

  pub valuation_method: ValuationMethod,

  #[serde(flatten)]
  pub technology: TechnologyScores,
}

impl IpAsset {
  pub fn new(
    id: impl Into<String>,
    ip_type: IpType,
    description: impl Into<String>,
    royalty_rate: f64,
    valuation_method: ValuationMethod,
  ) -> Self {
    Self {
      id: id.into(),
      ip_type,
      description: description.into(),
      related_segments: Vec::new(),
      royalty_rate,
      valuation_method,
      technology: TechnologyScores::default(),
    }
  }

  /// Builder: attribute part of a segment to this asset
  pub fn with_segment(mut self, name: impl Into<String>, attribution_fraction: f64) -> Self {
    self.related_segments.push(SegmentAttribution { name: name.into(), attribution_fraction });
    self
  }

  /// Builder: set the technology factor scores
  pub fn with_technology_scores(mut self, scores: TechnologyScores) -> Self {
    self.technology = scores;
    self
  }

  /// Reject definitions that cannot produce a meaningful valuation
  pub fn validate(&self) -> Result<()> {
    if self.related_segments.is_empty() {
      return Err(Error::invalid_assumption(
        "related_segments",
        format!("asset {} has no related segments", self.id),
      ));
    }

    if !self.royalty_rate.is_finite() || self.royalty_rate < 0.0 {
      return Err(Error::invalid_assumption(
        "royalty_rate",
        format!("asset {} royalty rate {} must be a non-negative number", self.id, self.royalty_rate),
      ));
    }

    for segment in &self.related_segments {
      let fraction = segment.attribution_fraction;
      if !(0.0..=1.0).contains(&fraction) {
        return Err(Error::invalid_assumption(
          "attribution_fraction",
          format!("asset {} segment {} attribution {} outside [0, 1]", self.id, segment.name, fraction),
        ));
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_method_from_str() {
    assert_eq!("relief_from_royalty".parse::<ValuationMethod>().unwrap(), ValuationMethod::ReliefFromRoyalty);
    assert_eq!("Excess-Earnings".parse::<ValuationMethod>().unwrap(), ValuationMethod::ExcessEarnings);
    assert!(matches!("cost_approach".parse::<ValuationMethod>(), Err(Error::UnknownMethod(m)) if m == "cost_approach"));
  }

  #[test]
  fn test_asset_deserialization() {
    let json = r#"{
      "id": "PAT-001",
      "type": "patent",
      "description": "Face ID biometric authentication",
      "related_segments": [
        {"name": "IPhone", "attribution_pct": 0.2},
        {"name": "IPad", "attribution_fraction": 0.3}
      ],
      "royalty_rate": 0.05,
      "valuation_method": "technology_factor",
      "innovation_score": 0.9,
      "remaining_life_years": 12
    }"#;

    let asset: IpAsset = serde_json::from_str(json).unwrap();
    assert_eq!(asset.ip_type, IpType::Patent);
    assert_eq!(asset.related_segments.len(), 2);
    assert_eq!(asset.related_segments[0].attribution_fraction, 0.2);
    assert_eq!(asset.valuation_method, ValuationMethod::TechnologyFactor);
    assert_eq!(asset.technology.innovation_score, Some(0.9));
    assert_eq!(asset.technology.commercial_score, None);
    assert_eq!(asset.technology.remaining_life_years, Some(12));
    assert_eq!(asset.technology.total_legal_life_years, 20);
  }

  #[test]
  fn test_asset_with_unknown_method_fails_to_parse() {
    let json = r#"{
      "id": "TM-001", "type": "trademark", "description": "Brand",
      "related_segments": [{"name": "Services", "attribution_pct": 0.1}],
      "royalty_rate": 0.03, "valuation_method": "market_approach"
    }"#;

    let err = serde_json::from_str::<IpAsset>(json).unwrap_err();
    assert!(err.to_string().contains("Unknown valuation method: market_approach"));
  }

  #[test]
  fn test_method_serializes_snake_case() {
    let json = serde_json::to_string(&ValuationMethod::ExcessEarnings).unwrap();
    assert_eq!(json, "\"excess_earnings\"");
    let json = serde_json::to_string(&IpType::TradeSecret).unwrap();
    assert_eq!(json, "\"trade_secret\"");
  }

  #[test]
  fn test_validate() {
    let asset = IpAsset::new("P1", IpType::Patent, "Widget patent", 0.05, ValuationMethod::ReliefFromRoyalty);
    assert!(matches!(asset.validate(), Err(Error::InvalidAssumption { field, .. }) if field == "related_segments"));

    let asset = asset.with_segment("Widgets", 0.4);
    assert!(asset.validate().is_ok());

    let bad = asset.clone().with_segment("Gadgets", 1.5);
    assert!(bad.validate().is_err());

    let mut negative = asset;
    negative.royalty_rate = -0.01;
    assert!(negative.validate().is_err());
  }
}
