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

//! Discount rate, tax rate and growth assumptions

use ipv_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// How an assumption was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
  /// Derived from the company's statements
  Calculated,
  /// Fixed fallback constant
  Default,
  /// Supplied by the caller
  Override,
}

/// Effective tax rate estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRateEstimate {
  pub effective_tax_rate: f64,
  pub source: EstimateSource,
  pub note: String,

  /// Per-period rates that passed the sanity filter, most recent first
  #[serde(default)]
  pub yearly_rates: Vec<f64>,
}

/// Inputs and intermediate values of a WACC calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccComponents {
  pub market_cap: f64,
  pub total_debt: f64,
  pub cost_of_equity: f64,
  pub cost_of_debt: f64,
  pub beta: f64,
  pub equity_weight: f64,
  pub debt_weight: f64,
  pub tax_rate: f64,
}

/// Weighted average cost of capital estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccEstimate {
  pub wacc: f64,
  pub source: EstimateSource,
  pub note: String,
  pub components: Option<WaccComponents>,
}

/// Terminal (perpetuity) growth estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthEstimate {
  pub terminal_growth: f64,
  pub source: EstimateSource,
  pub note: String,

  /// Mean of the accepted year-over-year rates, before clamping
  pub historical_avg_growth: Option<f64>,

  #[serde(default)]
  pub yearly_growth_rates: Vec<f64>,
}

/// The three estimates with their explanations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionSet {
  pub wacc: WaccEstimate,
  pub tax_rate: TaxRateEstimate,
  pub terminal_growth: GrowthEstimate,
}

impl AssumptionSet {
  pub fn to_global(&self) -> GlobalAssumptions {
    GlobalAssumptions {
      wacc: self.wacc.wacc,
      tax_rate: self.tax_rate.effective_tax_rate,
      terminal_growth: self.terminal_growth.terminal_growth,
    }
  }
}

/// Caller-supplied values that take precedence over estimation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssumptionOverrides {
  pub wacc: Option<f64>,
  pub tax_rate: Option<f64>,
  pub terminal_growth: Option<f64>,
}

impl AssumptionOverrides {
  /// True when every assumption is supplied and nothing needs estimating
  pub fn is_complete(&self) -> bool {
    self.wacc.is_some() && self.tax_rate.is_some() && self.terminal_growth.is_some()
  }
}

/// Portfolio-wide rates applied to every segment valuation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalAssumptions {
  pub wacc: f64,
  pub tax_rate: f64,
  pub terminal_growth: f64,
}

impl Default for GlobalAssumptions {
  fn default() -> Self {
    Self { wacc: 0.10, tax_rate: 0.21, terminal_growth: 0.02 }
  }
}

impl GlobalAssumptions {
  /// Reject rates that would make the perpetuity math meaningless
  pub fn validate(&self) -> Result<()> {
    for (field, value) in
      [("wacc", self.wacc), ("tax_rate", self.tax_rate), ("terminal_growth", self.terminal_growth)]
    {
      if !value.is_finite() {
        return Err(Error::invalid_assumption(field, format!("{} is not a finite number", value)));
      }
    }

    if self.wacc <= -1.0 {
      return Err(Error::invalid_assumption("wacc", format!("{} must be greater than -100%", self.wacc)));
    }

    if !(0.0..=1.0).contains(&self.tax_rate) {
      return Err(Error::invalid_assumption(
        "tax_rate",
        format!("{} must lie within [0, 1]", self.tax_rate),
      ));
    }

    if self.wacc <= self.terminal_growth {
      return Err(Error::invalid_assumption(
        "wacc",
        format!("WACC {} must exceed terminal growth {}", self.wacc, self.terminal_growth),
      ));
    }

    Ok(())
  }
}
