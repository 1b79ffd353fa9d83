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

//! Relief from Royalty: the IP is worth the after-tax royalties its owner avoids paying.

use super::{
  discount_factor, ensure_discount_rate, ensure_finite, ensure_non_negative, ensure_revenues,
  ensure_unit_interval, gordon_terminal_value,
};
use ipv_core::Result;
use ipv_models::{MethodAssumptions, ValuationMethod, ValuationResult, YearlyCashFlow};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoyaltyInputs {
  pub royalty_rate: f64,
  pub attribution_fraction: f64,
  pub tax_rate: f64,
  pub wacc: f64,
  pub terminal_growth: f64,
}

impl RoyaltyInputs {
  fn validate(&self) -> Result<()> {
    ensure_non_negative("royalty_rate", self.royalty_rate)?;
    ensure_unit_interval("attribution_fraction", self.attribution_fraction)?;
    ensure_unit_interval("tax_rate", self.tax_rate)?;
    ensure_discount_rate(self.wacc)?;
    ensure_finite("terminal_growth", self.terminal_growth)
  }

  /// After-tax royalty avoided on `revenue`
  fn royalty_savings(&self, revenue: f64) -> f64 {
    revenue * self.royalty_rate * (1.0 - self.tax_rate) * self.attribution_fraction
  }
}

/// Value a revenue series by Relief from Royalty.
///
/// The terminal value grows the final year's revenue once more by `terminal_growth`,
/// capitalizes its royalty as a growing perpetuity and discounts it back N years.
pub fn relief_from_royalty(revenues: &[f64], inputs: &RoyaltyInputs) -> Result<ValuationResult> {
  inputs.validate()?;
  ensure_revenues(ValuationMethod::ReliefFromRoyalty, revenues)?;

  let yearly_details: Vec<YearlyCashFlow> = (1u32..)
    .zip(revenues)
    .map(|(year, &revenue)| {
      YearlyCashFlow::new(year, revenue, inputs.royalty_savings(revenue), discount_factor(inputs.wacc, year))
    })
    .collect();
  let pv_explicit_period: f64 = yearly_details.iter().map(|y| y.present_value).sum();

  let last_revenue = revenues[revenues.len() - 1];
  let terminal_royalty = inputs.royalty_savings(last_revenue * (1.0 + inputs.terminal_growth));
  let terminal_value = gordon_terminal_value(terminal_royalty, inputs.wacc, inputs.terminal_growth)?;
  let pv_terminal_value = terminal_value * discount_factor(inputs.wacc, revenues.len() as u32);

  Ok(ValuationResult {
    method: ValuationMethod::ReliefFromRoyalty,
    total_value: pv_explicit_period + pv_terminal_value,
    pv_explicit_period,
    pv_terminal_value,
    terminal_value,
    yearly_details,
    assumptions: MethodAssumptions::ReliefFromRoyalty {
      royalty_rate: inputs.royalty_rate,
      attribution_fraction: inputs.attribution_fraction,
      tax_rate: inputs.tax_rate,
      wacc: inputs.wacc,
      terminal_growth: inputs.terminal_growth,
    },
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use ipv_core::test_utils::{assert_approx_eq, assert_relative_eq};
  use ipv_core::Error;

  fn inputs() -> RoyaltyInputs {
    RoyaltyInputs { royalty_rate: 0.05, attribution_fraction: 1.0, tax_rate: 0.21, wacc: 0.10, terminal_growth: 0.02 }
  }

  #[test]
  fn test_hand_computed_three_year_series() {
    let result = relief_from_royalty(&[100.0, 110.0, 121.0], &inputs()).unwrap();

    let y1 = 100.0 * 0.05 * 0.79 / 1.1;
    let y2 = 110.0 * 0.05 * 0.79 / 1.1f64.powi(2);
    let y3 = 121.0 * 0.05 * 0.79 / 1.1f64.powi(3);
    let terminal = 121.0 * 1.02 * 0.05 * 0.79 / 0.08;

    assert_approx_eq(result.yearly_details[0].cash_flow, 3.95, 1e-12);
    assert_approx_eq(result.yearly_details[0].present_value, 3.590909090909091, 1e-12);
    assert_relative_eq(result.pv_explicit_period, y1 + y2 + y3, 1e-9);
    assert_relative_eq(result.terminal_value, terminal, 1e-9);
    assert_relative_eq(result.total_value, y1 + y2 + y3 + terminal / 1.1f64.powi(3), 1e-9);
  }

  #[test]
  fn test_attribution_scales_linearly() {
    let full = relief_from_royalty(&[100.0, 100.0], &inputs()).unwrap();
    let quarter =
      relief_from_royalty(&[100.0, 100.0], &RoyaltyInputs { attribution_fraction: 0.25, ..inputs() }).unwrap();
    assert_relative_eq(quarter.total_value, full.total_value * 0.25, 1e-12);
  }

  #[test]
  fn test_monotonic_in_royalty_and_wacc() {
    let revenues = [50.0, 60.0, 70.0, 80.0];
    let value = |royalty_rate: f64, wacc: f64| {
      relief_from_royalty(&revenues, &RoyaltyInputs { royalty_rate, wacc, ..inputs() }).unwrap().total_value
    };

    let mut previous = value(0.0, 0.10);
    assert_eq!(previous, 0.0);
    for royalty in [0.01, 0.03, 0.05, 0.10] {
      let current = value(royalty, 0.10);
      assert!(current >= previous);
      previous = current;
    }

    let mut previous = value(0.05, 0.03);
    for wacc in [0.05, 0.08, 0.12, 0.20] {
      let current = value(0.05, wacc);
      assert!(current < previous, "value should fall as WACC rises to {}", wacc);
      previous = current;
    }
  }

  #[test]
  fn test_rejects_wacc_not_above_growth() {
    let result = relief_from_royalty(&[100.0], &RoyaltyInputs { wacc: 0.02, ..inputs() });
    assert!(matches!(result, Err(Error::InvalidAssumption { .. })));
  }

  #[test]
  fn test_rejects_bad_inputs() {
    assert!(matches!(relief_from_royalty(&[], &inputs()), Err(Error::InsufficientData(_))));
    assert!(relief_from_royalty(&[100.0], &RoyaltyInputs { royalty_rate: -0.01, ..inputs() }).is_err());
    assert!(relief_from_royalty(&[100.0], &RoyaltyInputs { tax_rate: 1.5, ..inputs() }).is_err());
    assert!(relief_from_royalty(&[100.0], &RoyaltyInputs { attribution_fraction: 1.2, ..inputs() }).is_err());
  }

  #[test]
  fn test_assumption_snapshot() {
    let result = relief_from_royalty(&[100.0], &inputs()).unwrap();
    match result.assumptions {
      MethodAssumptions::ReliefFromRoyalty { royalty_rate, wacc, .. } => {
        assert_eq!(royalty_rate, 0.05);
        assert_eq!(wacc, 0.10);
      }
      other => panic!("unexpected assumptions: {:?}", other),
    }
  }
}
