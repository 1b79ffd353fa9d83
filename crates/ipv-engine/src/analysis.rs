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

//! What-if helpers: one-at-a-time sensitivity for Relief from Royalty and a side-by-side
//! run of every valuation method on the same revenue series.

use crate::methods::{relief_from_royalty, run_method, MethodInputs, RoyaltyInputs};
use ipv_core::Result;
use ipv_models::ValuationMethod;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance each driver moves up and down from its base value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySteps {
  pub royalty_rate: f64,
  pub attribution_fraction: f64,
  pub wacc: f64,
  pub terminal_growth: f64,
}

impl Default for SensitivitySteps {
  fn default() -> Self {
    Self { royalty_rate: 0.02, attribution_fraction: 0.05, wacc: 0.02, terminal_growth: 0.01 }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityDriver {
  RoyaltyRate,
  AttributionFraction,
  Wacc,
  TerminalGrowth,
}

impl SensitivityDriver {
  pub const ALL: [SensitivityDriver; 4] = [
    SensitivityDriver::RoyaltyRate,
    SensitivityDriver::AttributionFraction,
    SensitivityDriver::Wacc,
    SensitivityDriver::TerminalGrowth,
  ];

  fn get(&self, inputs: &RoyaltyInputs) -> f64 {
    match self {
      SensitivityDriver::RoyaltyRate => inputs.royalty_rate,
      SensitivityDriver::AttributionFraction => inputs.attribution_fraction,
      SensitivityDriver::Wacc => inputs.wacc,
      SensitivityDriver::TerminalGrowth => inputs.terminal_growth,
    }
  }

  fn with(&self, inputs: RoyaltyInputs, value: f64) -> RoyaltyInputs {
    match self {
      SensitivityDriver::RoyaltyRate => RoyaltyInputs { royalty_rate: value, ..inputs },
      SensitivityDriver::AttributionFraction => RoyaltyInputs { attribution_fraction: value, ..inputs },
      SensitivityDriver::Wacc => RoyaltyInputs { wacc: value, ..inputs },
      SensitivityDriver::TerminalGrowth => RoyaltyInputs { terminal_growth: value, ..inputs },
    }
  }

  fn step(&self, steps: &SensitivitySteps) -> f64 {
    match self {
      SensitivityDriver::RoyaltyRate => steps.royalty_rate,
      SensitivityDriver::AttributionFraction => steps.attribution_fraction,
      SensitivityDriver::Wacc => steps.wacc,
      SensitivityDriver::TerminalGrowth => steps.terminal_growth,
    }
  }

  /// Low and high inputs, kept inside the driver's valid range
  fn bounds(&self, base: f64, step: f64) -> (f64, f64) {
    match self {
      SensitivityDriver::RoyaltyRate => ((base - step).max(0.0), base + step),
      SensitivityDriver::AttributionFraction => ((base - step).max(0.0), (base + step).min(1.0)),
      SensitivityDriver::Wacc | SensitivityDriver::TerminalGrowth => (base - step, base + step),
    }
  }
}

impl fmt::Display for SensitivityDriver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SensitivityDriver::RoyaltyRate => write!(f, "Royalty rate"),
      SensitivityDriver::AttributionFraction => write!(f, "Attribution"),
      SensitivityDriver::Wacc => write!(f, "WACC"),
      SensitivityDriver::TerminalGrowth => write!(f, "Terminal growth"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
  pub driver: SensitivityDriver,
  pub low_input: f64,
  pub base_input: f64,
  pub high_input: f64,

  /// Value at `low_input`
  pub low_value: f64,
  pub base_value: f64,

  /// Value at `high_input`
  pub high_value: f64,

  /// Spread between the two scenario values as a percentage of the base value
  pub swing_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
  pub base_value: f64,
  pub rows: Vec<SensitivityRow>,
}

impl SensitivityReport {
  /// The driver with the widest swing
  pub fn dominant_driver(&self) -> Option<SensitivityDriver> {
    self.rows.iter().max_by(|a, b| a.swing_pct.total_cmp(&b.swing_pct)).map(|row| row.driver)
  }
}

/// Re-run Relief from Royalty moving one driver at a time by its step.
///
/// Royalty and attribution scenarios are clamped to their valid ranges. A WACC or growth
/// scenario that lands the discount rate at or below terminal growth fails the whole
/// analysis with `InvalidAssumption`.
pub fn sensitivity_analysis(
  revenues: &[f64],
  base: &RoyaltyInputs,
  steps: &SensitivitySteps,
) -> Result<SensitivityReport> {
  let base_value = relief_from_royalty(revenues, base)?.total_value;

  let rows = SensitivityDriver::ALL
    .iter()
    .map(|driver| {
      let base_input = driver.get(base);
      let (low_input, high_input) = driver.bounds(base_input, driver.step(steps));
      let low_value = relief_from_royalty(revenues, &driver.with(*base, low_input))?.total_value;
      let high_value = relief_from_royalty(revenues, &driver.with(*base, high_input))?.total_value;

      let swing_pct =
        if base_value != 0.0 { (high_value - low_value).abs() / base_value.abs() * 100.0 } else { 0.0 };

      Ok(SensitivityRow {
        driver: *driver,
        low_input,
        base_input,
        high_input,
        low_value,
        base_value,
        high_value,
        swing_pct,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(SensitivityReport { base_value, rows })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodTotal {
  pub method: ValuationMethod,
  pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodComparison {
  pub totals: Vec<MethodTotal>,
  pub mean_value: f64,
}

/// Value the same revenue series with every method
pub fn compare_methods(revenues: &[f64], inputs: &MethodInputs<'_>) -> Result<MethodComparison> {
  let totals = ValuationMethod::ALL
    .iter()
    .map(|method| {
      run_method(*method, revenues, inputs).map(|result| MethodTotal { method: *method, total_value: result.total_value })
    })
    .collect::<Result<Vec<_>>>()?;

  let mean_value = totals.iter().map(|t| t.total_value).sum::<f64>() / totals.len() as f64;
  Ok(MethodComparison { totals, mean_value })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::EngineConfig;
  use ipv_core::test_utils::assert_relative_eq;
  use ipv_core::Error;
  use ipv_models::{GlobalAssumptions, TechnologyScores};

  const REVENUES: [f64; 3] = [1000.0, 1100.0, 1210.0];

  fn base() -> RoyaltyInputs {
    RoyaltyInputs { royalty_rate: 0.05, attribution_fraction: 0.2, tax_rate: 0.21, wacc: 0.10, terminal_growth: 0.02 }
  }

  #[test]
  fn test_sensitivity_rows() {
    let report = sensitivity_analysis(&REVENUES, &base(), &SensitivitySteps::default()).unwrap();
    assert_eq!(report.rows.len(), 4);

    // Value is linear in the royalty rate: 3% and 7% are -40% and +40%
    let royalty = &report.rows[0];
    assert_eq!(royalty.driver, SensitivityDriver::RoyaltyRate);
    assert_relative_eq(royalty.low_value, report.base_value * 0.6, 1e-12);
    assert_relative_eq(royalty.high_value, report.base_value * 1.4, 1e-12);
    assert_relative_eq(royalty.swing_pct, 80.0, 1e-9);

    // Attribution 15% / 25% around 20%: -25% and +25%
    let attribution = &report.rows[1];
    assert_relative_eq(attribution.swing_pct, 50.0, 1e-9);

    let wacc = &report.rows[2];
    assert!(wacc.low_value > wacc.base_value);
    assert!(wacc.high_value < wacc.base_value);

    let growth = &report.rows[3];
    assert!(growth.high_value > growth.low_value);
  }

  #[test]
  fn test_inputs_are_clamped() {
    let tiny = RoyaltyInputs { royalty_rate: 0.01, attribution_fraction: 0.98, ..base() };
    let report = sensitivity_analysis(&REVENUES, &tiny, &SensitivitySteps::default()).unwrap();

    assert_eq!(report.rows[0].low_input, 0.0);
    assert_eq!(report.rows[0].low_value, 0.0);
    assert_eq!(report.rows[1].high_input, 1.0);
  }

  #[test]
  fn test_dominant_driver() {
    let report = sensitivity_analysis(&REVENUES, &base(), &SensitivitySteps::default()).unwrap();
    assert_eq!(report.dominant_driver(), Some(SensitivityDriver::RoyaltyRate));
  }

  #[test]
  fn test_invalid_scenario_propagates() {
    // WACC 4% -> 2% meets terminal growth
    let narrow = RoyaltyInputs { wacc: 0.04, ..base() };
    let result = sensitivity_analysis(&REVENUES, &narrow, &SensitivitySteps::default());
    assert!(matches!(result, Err(Error::InvalidAssumption { .. })));
  }

  #[test]
  fn test_compare_methods() {
    let config = EngineConfig::default();
    let scores = TechnologyScores::default();
    let inputs = MethodInputs {
      royalty_rate: 0.05,
      operating_margin: 0.30,
      technology: &scores,
      assumptions: GlobalAssumptions::default(),
      config: &config,
    };

    let comparison = compare_methods(&REVENUES, &inputs).unwrap();
    assert_eq!(comparison.totals.len(), 3);
    assert_eq!(comparison.totals[0].method, ValuationMethod::ReliefFromRoyalty);

    let sum: f64 = comparison.totals.iter().map(|t| t.total_value).sum();
    assert_relative_eq(comparison.mean_value, sum / 3.0, 1e-12);
  }
}
