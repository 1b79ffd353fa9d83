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

//! Technology Factor: a base royalty scaled up by patent quality, valued only over the
//! patent's remaining legal life.

use super::{
  discount_factor, ensure_discount_rate, ensure_non_negative, ensure_revenues, ensure_unit_interval,
};
use ipv_core::{Error, Result};
use ipv_models::{MethodAssumptions, ValuationMethod, ValuationResult, YearlyCashFlow};

const INNOVATION_WEIGHT: f64 = 0.30;
const COMMERCIAL_WEIGHT: f64 = 0.35;
const LEGAL_WEIGHT: f64 = 0.25;
const LIFE_WEIGHT: f64 = 0.10;

/// Share of value retained however close the patent is to expiry
pub const MIN_DECAY_FACTOR: f64 = 0.3;

/// Decay reaches the floor only after this multiple of the remaining life
const DECAY_HORIZON_MULTIPLE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnologyFactorInputs {
  pub base_royalty_rate: f64,
  pub innovation_score: f64,
  pub commercial_score: f64,
  pub legal_strength: f64,
  pub remaining_life_years: u32,
  pub total_legal_life_years: u32,
  pub tax_rate: f64,
  pub wacc: f64,
}

impl TechnologyFactorInputs {
  fn validate(&self) -> Result<()> {
    ensure_non_negative("base_royalty_rate", self.base_royalty_rate)?;
    ensure_unit_interval("innovation_score", self.innovation_score)?;
    ensure_unit_interval("commercial_score", self.commercial_score)?;
    ensure_unit_interval("legal_strength", self.legal_strength)?;
    if self.total_legal_life_years == 0 {
      return Err(Error::invalid_assumption("total_legal_life_years", "must be at least one year"));
    }
    if self.remaining_life_years > self.total_legal_life_years {
      return Err(Error::invalid_assumption(
        "remaining_life_years",
        format!(
          "{} years exceeds the total legal life of {} years",
          self.remaining_life_years, self.total_legal_life_years
        ),
      ));
    }
    ensure_unit_interval("tax_rate", self.tax_rate)?;
    ensure_discount_rate(self.wacc)
  }

  /// Weighted blend of the three scores and the remaining share of legal life
  pub fn technology_factor(&self) -> f64 {
    let life_ratio = self.remaining_life_years as f64 / self.total_legal_life_years as f64;
    INNOVATION_WEIGHT * self.innovation_score
      + COMMERCIAL_WEIGHT * self.commercial_score
      + LEGAL_WEIGHT * self.legal_strength
      + LIFE_WEIGHT * life_ratio
  }

  /// Linear loss of value toward expiry, floored at [`MIN_DECAY_FACTOR`]
  fn decay_factor(&self, year: u32) -> f64 {
    let horizon = self.remaining_life_years as f64 * DECAY_HORIZON_MULTIPLE;
    (1.0 - year as f64 / horizon).max(MIN_DECAY_FACTOR)
  }
}

/// Value a revenue series by the Technology Factor method.
///
/// Only `min(revenues.len(), remaining_life_years)` years are projected and no terminal
/// value is added, so a patent at the end of its life is worth nothing.
pub fn technology_factor(revenues: &[f64], inputs: &TechnologyFactorInputs) -> Result<ValuationResult> {
  inputs.validate()?;
  ensure_revenues(ValuationMethod::TechnologyFactor, revenues)?;

  let technology_factor = inputs.technology_factor();
  let adjusted_royalty_rate = inputs.base_royalty_rate * (1.0 + technology_factor);
  let projection_years = revenues.len().min(inputs.remaining_life_years as usize);

  let yearly_details: Vec<YearlyCashFlow> = (1u32..)
    .zip(&revenues[..projection_years])
    .map(|(year, &revenue)| {
      let decay = inputs.decay_factor(year);
      let cash_flow = revenue * adjusted_royalty_rate * (1.0 - inputs.tax_rate) * decay;
      YearlyCashFlow {
        decay_factor: Some(decay),
        ..YearlyCashFlow::new(year, revenue, cash_flow, discount_factor(inputs.wacc, year))
      }
    })
    .collect();
  let pv_explicit_period: f64 = yearly_details.iter().map(|y| y.present_value).sum();

  Ok(ValuationResult {
    method: ValuationMethod::TechnologyFactor,
    total_value: pv_explicit_period,
    pv_explicit_period,
    pv_terminal_value: 0.0,
    terminal_value: 0.0,
    yearly_details,
    assumptions: MethodAssumptions::TechnologyFactor {
      base_royalty_rate: inputs.base_royalty_rate,
      technology_factor,
      adjusted_royalty_rate,
      innovation_score: inputs.innovation_score,
      commercial_score: inputs.commercial_score,
      legal_strength: inputs.legal_strength,
      remaining_life_years: inputs.remaining_life_years,
      total_legal_life_years: inputs.total_legal_life_years,
      projection_years,
      tax_rate: inputs.tax_rate,
      wacc: inputs.wacc,
    },
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use ipv_core::test_utils::{assert_approx_eq, assert_approx_zero};

  fn inputs() -> TechnologyFactorInputs {
    TechnologyFactorInputs {
      base_royalty_rate: 0.05,
      innovation_score: 0.8,
      commercial_score: 0.6,
      legal_strength: 0.9,
      remaining_life_years: 10,
      total_legal_life_years: 20,
      tax_rate: 0.21,
      wacc: 0.10,
    }
  }

  #[test]
  fn test_technology_factor_blend() {
    // 0.24 + 0.21 + 0.225 + 0.05
    assert_approx_eq(inputs().technology_factor(), 0.725, 1e-12);
  }

  #[test]
  fn test_ledger_applies_decay_and_adjusted_royalty() {
    let result = technology_factor(&[1000.0, 1000.0], &inputs()).unwrap();
    let adjusted = 0.05 * 1.725;

    let year1 = &result.yearly_details[0];
    assert_approx_eq(year1.decay_factor.unwrap(), 1.0 - 1.0 / 15.0, 1e-12);
    assert_approx_eq(year1.cash_flow, 1000.0 * adjusted * 0.79 * (1.0 - 1.0 / 15.0), 1e-9);
    assert_eq!(result.pv_terminal_value, 0.0);
    assert_eq!(result.total_value, result.pv_explicit_period);
  }

  #[test]
  fn test_projection_capped_by_remaining_life() {
    let revenues = [100.0; 8];
    let result = technology_factor(&revenues, &TechnologyFactorInputs { remaining_life_years: 3, ..inputs() }).unwrap();
    assert_eq!(result.yearly_details.len(), 3);

    // Year 3 of a 3-year life: 1 - 3/4.5 = 0.333
    assert_approx_eq(result.yearly_details[2].decay_factor.unwrap(), 1.0 / 3.0, 1e-12);
  }

  #[test]
  fn test_decay_floor() {
    let short = TechnologyFactorInputs { remaining_life_years: 2, ..inputs() };
    // 1 - 2/3 = 0.333, 1 - 1/3 = 0.667; floor applies past the horizon
    assert_approx_eq(short.decay_factor(2), 1.0 / 3.0, 1e-12);
    assert_eq!(short.decay_factor(3), MIN_DECAY_FACTOR);
  }

  #[test]
  fn test_value_vanishes_as_life_runs_out() {
    let revenues = [500.0, 500.0, 500.0];
    let value =
      |years: u32| technology_factor(&revenues, &TechnologyFactorInputs { remaining_life_years: years, ..inputs() });

    let expired = value(0).unwrap();
    assert_approx_zero(expired.total_value);
    assert!(expired.yearly_details.is_empty());

    assert!(value(1).unwrap().total_value < value(2).unwrap().total_value);
    assert!(value(2).unwrap().total_value < value(3).unwrap().total_value);
  }

  #[test]
  fn test_rejects_out_of_range_scores() {
    let bad = TechnologyFactorInputs { innovation_score: 1.2, ..inputs() };
    assert!(matches!(technology_factor(&[1.0], &bad), Err(Error::InvalidAssumption { .. })));

    let no_life = TechnologyFactorInputs { total_legal_life_years: 0, ..inputs() };
    assert!(matches!(technology_factor(&[1.0], &no_life), Err(Error::InvalidAssumption { .. })));

    assert!(matches!(technology_factor(&[], &inputs()), Err(Error::InsufficientData(_))));
  }

  #[test]
  fn test_rejects_remaining_life_beyond_legal_life() {
    let outlived = TechnologyFactorInputs { remaining_life_years: 25, total_legal_life_years: 20, ..inputs() };
    match technology_factor(&[100.0], &outlived) {
      Err(Error::InvalidAssumption { field, .. }) => assert_eq!(field, "remaining_life_years"),
      other => panic!("unexpected result: {:?}", other),
    }

    // A brand-new patent uses its full life and the blend stays within the weights
    let fresh = TechnologyFactorInputs { remaining_life_years: 20, total_legal_life_years: 20, ..inputs() };
    assert!(technology_factor(&[100.0], &fresh).is_ok());
    assert!(fresh.technology_factor() <= 1.0);
  }
}
