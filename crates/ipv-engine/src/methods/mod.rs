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

//! Valuation method library.
//!
//! Each method turns a forecast revenue series (year 1 first) into a present value plus
//! a yearly ledger. Inputs are validated up front; a method never returns a non-finite
//! value for validated inputs.

pub mod excess_earnings;
pub mod relief_from_royalty;
pub mod technology_factor;

pub use excess_earnings::{multi_period_excess_earnings, ExcessEarningsInputs, ASSET_BASE_TO_REVENUE};
pub use relief_from_royalty::{relief_from_royalty, RoyaltyInputs};
pub use technology_factor::{technology_factor, TechnologyFactorInputs};

use crate::config::EngineConfig;
use ipv_core::{Error, Result};
use ipv_models::{GlobalAssumptions, TechnologyScores, ValuationMethod, ValuationResult};

/// `1 / (1 + wacc)^year`
pub fn discount_factor(wacc: f64, year: u32) -> f64 {
  1.0 / (1.0 + wacc).powi(year as i32)
}

/// Gordon growth perpetuity of a cash flow already grown into the first terminal year.
///
/// Fails with `InvalidAssumption` unless `wacc > terminal_growth`.
pub fn gordon_terminal_value(cash_flow: f64, wacc: f64, terminal_growth: f64) -> Result<f64> {
  if wacc <= terminal_growth {
    return Err(Error::invalid_assumption(
      "wacc",
      format!("WACC ({}) must exceed terminal growth ({})", wacc, terminal_growth),
    ));
  }
  Ok(cash_flow / (wacc - terminal_growth))
}

pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<()> {
  if value.is_finite() {
    Ok(())
  } else {
    Err(Error::invalid_assumption(field, format!("{} is not a finite number", value)))
  }
}

pub(crate) fn ensure_unit_interval(field: &str, value: f64) -> Result<()> {
  ensure_finite(field, value)?;
  if (0.0..=1.0).contains(&value) {
    Ok(())
  } else {
    Err(Error::invalid_assumption(field, format!("{} must be between 0 and 1", value)))
  }
}

pub(crate) fn ensure_non_negative(field: &str, value: f64) -> Result<()> {
  ensure_finite(field, value)?;
  if value >= 0.0 {
    Ok(())
  } else {
    Err(Error::invalid_assumption(field, format!("{} must not be negative", value)))
  }
}

pub(crate) fn ensure_discount_rate(wacc: f64) -> Result<()> {
  ensure_finite("wacc", wacc)?;
  if wacc > -1.0 {
    Ok(())
  } else {
    Err(Error::invalid_assumption("wacc", format!("{} must be greater than -100%", wacc)))
  }
}

pub(crate) fn ensure_revenues(method: ValuationMethod, revenues: &[f64]) -> Result<()> {
  if revenues.is_empty() {
    return Err(Error::InsufficientData(format!("{} needs at least one year of revenue", method)));
  }
  if let Some(bad) = revenues.iter().find(|r| !r.is_finite()) {
    return Err(Error::InsufficientData(format!("{} received a non-finite revenue ({})", method, bad)));
  }
  Ok(())
}

/// Everything any method may need besides the revenue series
#[derive(Debug, Clone)]
pub struct MethodInputs<'a> {
  pub royalty_rate: f64,

  /// Operating margin applied by the excess earnings method
  pub operating_margin: f64,

  pub technology: &'a TechnologyScores,
  pub assumptions: GlobalAssumptions,
  pub config: &'a EngineConfig,
}

/// Run `method` on a revenue series that already carries any attribution scaling
pub fn run_method(method: ValuationMethod, revenues: &[f64], inputs: &MethodInputs<'_>) -> Result<ValuationResult> {
  let GlobalAssumptions { wacc, tax_rate, terminal_growth } = inputs.assumptions;

  match method {
    ValuationMethod::ReliefFromRoyalty => relief_from_royalty(
      revenues,
      &RoyaltyInputs {
        royalty_rate: inputs.royalty_rate,
        attribution_fraction: 1.0,
        tax_rate,
        wacc,
        terminal_growth,
      },
    ),
    ValuationMethod::ExcessEarnings => multi_period_excess_earnings(
      revenues,
      &ExcessEarningsInputs {
        operating_margin: inputs.operating_margin,
        contributory_assets: inputs.config.contributory_assets.clone(),
        ip_contribution: inputs.config.ip_contribution,
        tax_rate,
        wacc,
        terminal_growth,
      },
    ),
    ValuationMethod::TechnologyFactor => {
      let scores = inputs.technology;
      let fallback = inputs.config.default_technology_score;
      technology_factor(
        revenues,
        &TechnologyFactorInputs {
          base_royalty_rate: inputs.royalty_rate,
          innovation_score: scores.innovation_score.unwrap_or(fallback),
          commercial_score: scores.commercial_score.unwrap_or(fallback),
          legal_strength: scores.legal_strength.unwrap_or(fallback),
          remaining_life_years: scores
            .remaining_life_years
            .unwrap_or(inputs.config.default_remaining_life_years),
          total_legal_life_years: scores.total_legal_life_years,
          tax_rate,
          wacc,
        },
      )
    }
  }
}
