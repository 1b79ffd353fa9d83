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

//! Valuation result records: segment, asset and portfolio level

use crate::assumptions::{AssumptionSet, GlobalAssumptions};
use crate::ip_asset::{IpType, ValuationMethod};
use crate::segments::SegmentFinancialProfile;
use serde::{Deserialize, Serialize};

/// Asset class charged a required return before excess earnings are attributed to IP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributoryAsset {
  pub name: String,
  pub required_return: f64,
}

impl ContributoryAsset {
  pub fn new(name: impl Into<String>, required_return: f64) -> Self {
    Self { name: name.into(), required_return }
  }
}

/// One forecast year of a valuation ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyCashFlow {
  /// 1-based forecast year
  pub year: u32,
  pub revenue: f64,

  /// After-tax cash flow attributed to the IP
  pub cash_flow: f64,

  /// 1 / (1 + WACC)^year
  pub discount_factor: f64,
  pub present_value: f64,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub operating_income: Option<f64>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contributory_asset_charge: Option<f64>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub excess_earnings: Option<f64>,

  /// Technology factor value retention for the year
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub decay_factor: Option<f64>,
}

impl YearlyCashFlow {
  pub fn new(year: u32, revenue: f64, cash_flow: f64, discount_factor: f64) -> Self {
    Self {
      year,
      revenue,
      cash_flow,
      discount_factor,
      present_value: cash_flow * discount_factor,
      operating_income: None,
      contributory_asset_charge: None,
      excess_earnings: None,
      decay_factor: None,
    }
  }
}

/// Snapshot of the inputs a method ran with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MethodAssumptions {
  ReliefFromRoyalty {
    royalty_rate: f64,
    attribution_fraction: f64,
    tax_rate: f64,
    wacc: f64,
    terminal_growth: f64,
  },
  ExcessEarnings {
    operating_margin: f64,
    contributory_assets: Vec<ContributoryAsset>,
    ip_contribution: f64,
    tax_rate: f64,
    wacc: f64,
    terminal_growth: f64,
  },
  TechnologyFactor {
    base_royalty_rate: f64,
    technology_factor: f64,
    adjusted_royalty_rate: f64,
    innovation_score: f64,
    commercial_score: f64,
    legal_strength: f64,
    remaining_life_years: u32,
    total_legal_life_years: u32,
    projection_years: usize,
    tax_rate: f64,
    wacc: f64,
  },
}

/// Present value of one revenue stream under one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
  pub method: ValuationMethod,
  pub total_value: f64,
  pub pv_explicit_period: f64,

  /// Zero for methods without a perpetuity
  pub pv_terminal_value: f64,

  /// Undiscounted terminal value
  pub terminal_value: f64,

  pub yearly_details: Vec<YearlyCashFlow>,
  pub assumptions: MethodAssumptions,
}

/// A method result for one of an asset's segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentValuation {
  pub segment: String,
  pub attribution_fraction: f64,
  pub profile: SegmentFinancialProfile,
  pub result: ValuationResult,
}

impl SegmentValuation {
  pub fn total_value(&self) -> f64 {
    self.result.total_value
  }
}

/// Why a segment or asset is missing from a valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationDiagnostic {
  pub asset_id: String,

  /// `None` when the whole asset was skipped
  pub segment: Option<String>,

  pub error: String,
}

/// Sum of an asset's segment valuations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetValuation {
  pub asset_id: String,
  pub ip_type: IpType,
  pub description: String,
  pub ticker: String,
  pub method: ValuationMethod,
  pub total_value: f64,
  pub segment_valuations: Vec<SegmentValuation>,

  #[serde(default)]
  pub diagnostics: Vec<ValuationDiagnostic>,
}

/// Sum of asset valuations for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
  pub ticker: String,
  pub total_portfolio_value: f64,
  pub asset_count: usize,
  pub asset_valuations: Vec<AssetValuation>,
  pub assumptions: GlobalAssumptions,

  /// Present when any assumption was estimated rather than supplied
  #[serde(default)]
  pub assumption_details: Option<AssumptionSet>,

  /// Every skipped segment and asset, in input order
  #[serde(default)]
  pub diagnostics: Vec<ValuationDiagnostic>,
}

/// Flat, spreadsheet-friendly view of one segment valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
  pub asset_id: String,
  pub ip_type: IpType,
  pub description: String,
  pub segment: String,
  pub total_value: f64,
  pub method: ValuationMethod,
  pub attribution_fraction: f64,
}

impl PortfolioValuation {
  /// One row per segment valuation, in asset then segment order
  pub fn export_rows(&self) -> Vec<ExportRow> {
    self
      .asset_valuations
      .iter()
      .flat_map(|asset| {
        asset.segment_valuations.iter().map(move |segment| ExportRow {
          asset_id: asset.asset_id.clone(),
          ip_type: asset.ip_type,
          description: asset.description.clone(),
          segment: segment.segment.clone(),
          total_value: segment.total_value(),
          method: segment.result.method,
          attribution_fraction: segment.attribution_fraction,
        })
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_yearly_cash_flow_present_value() {
    let entry = YearlyCashFlow::new(1, 100.0, 3.95, 1.0 / 1.1);
    assert!((entry.present_value - 3.95 / 1.1).abs() < 1e-12);
    assert!(entry.decay_factor.is_none());
  }

  #[test]
  fn test_optional_ledger_fields_are_omitted() {
    let entry = YearlyCashFlow::new(2, 50.0, 1.0, 0.5);
    let json = serde_json::to_value(&entry).unwrap();
    assert!(json.get("decay_factor").is_none());
    assert!(json.get("excess_earnings").is_none());
    assert_eq!(json["year"], 2);
  }

  #[test]
  fn test_method_assumptions_tagging() {
    let assumptions = MethodAssumptions::ReliefFromRoyalty {
      royalty_rate: 0.05,
      attribution_fraction: 1.0,
      tax_rate: 0.21,
      wacc: 0.1,
      terminal_growth: 0.02,
    };
    let json = serde_json::to_value(&assumptions).unwrap();
    assert_eq!(json["method"], "relief_from_royalty");

    let back: MethodAssumptions = serde_json::from_value(json).unwrap();
    assert_eq!(back, assumptions);
  }
}
