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

//! Multi-Period Excess Earnings.
//!
//! Operating income is charged a required return for every contributory asset class;
//! a share of what remains is attributed to the IP, taxed and discounted.

use super::{
  discount_factor, ensure_discount_rate, ensure_finite, ensure_revenues, ensure_unit_interval,
  gordon_terminal_value,
};
use ipv_core::Result;
use ipv_models::{ContributoryAsset, MethodAssumptions, ValuationMethod, ValuationResult, YearlyCashFlow};

/// Contributory asset base as a fraction of revenue.
///
/// A revenue proxy stands in for balance-sheet asset values.
pub const ASSET_BASE_TO_REVENUE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ExcessEarningsInputs {
  pub operating_margin: f64,
  pub contributory_assets: Vec<ContributoryAsset>,

  /// Share of excess earnings attributed to the IP being valued
  pub ip_contribution: f64,

  pub tax_rate: f64,
  pub wacc: f64,
  pub terminal_growth: f64,
}

struct YearEarnings {
  operating_income: f64,
  contributory_asset_charge: f64,
  excess_earnings: f64,
  cash_flow: f64,
}

impl ExcessEarningsInputs {
  fn validate(&self) -> Result<()> {
    ensure_finite("operating_margin", self.operating_margin)?;
    for asset in &self.contributory_assets {
      ensure_finite(&format!("contributory_assets.{}", asset.name), asset.required_return)?;
    }
    ensure_unit_interval("ip_contribution", self.ip_contribution)?;
    ensure_unit_interval("tax_rate", self.tax_rate)?;
    ensure_discount_rate(self.wacc)?;
    ensure_finite("terminal_growth", self.terminal_growth)
  }

  fn earnings(&self, revenue: f64) -> YearEarnings {
    let operating_income = revenue * self.operating_margin;
    let asset_base = revenue * ASSET_BASE_TO_REVENUE;
    let contributory_asset_charge: f64 =
      self.contributory_assets.iter().map(|asset| asset_base * asset.required_return).sum();
    let excess_earnings = operating_income - contributory_asset_charge;

    YearEarnings {
      operating_income,
      contributory_asset_charge,
      excess_earnings,
      cash_flow: excess_earnings * self.ip_contribution * (1.0 - self.tax_rate),
    }
  }
}

/// Value a revenue series by the Multi-Period Excess Earnings method
pub fn multi_period_excess_earnings(revenues: &[f64], inputs: &ExcessEarningsInputs) -> Result<ValuationResult> {
  inputs.validate()?;
  ensure_revenues(ValuationMethod::ExcessEarnings, revenues)?;

  let yearly_details: Vec<YearlyCashFlow> = (1u32..)
    .zip(revenues)
    .map(|(year, &revenue)| {
      let earnings = inputs.earnings(revenue);
      YearlyCashFlow {
        operating_income: Some(earnings.operating_income),
        contributory_asset_charge: Some(earnings.contributory_asset_charge),
        excess_earnings: Some(earnings.excess_earnings),
        ..YearlyCashFlow::new(year, revenue, earnings.cash_flow, discount_factor(inputs.wacc, year))
      }
    })
    .collect();
  let pv_explicit_period: f64 = yearly_details.iter().map(|y| y.present_value).sum();

  let last_revenue = revenues[revenues.len() - 1];
  let terminal = inputs.earnings(last_revenue * (1.0 + inputs.terminal_growth));
  let terminal_value = gordon_terminal_value(terminal.cash_flow, inputs.wacc, inputs.terminal_growth)?;
  let pv_terminal_value = terminal_value * discount_factor(inputs.wacc, revenues.len() as u32);

  Ok(ValuationResult {
    method: ValuationMethod::ExcessEarnings,
    total_value: pv_explicit_period + pv_terminal_value,
    pv_explicit_period,
    pv_terminal_value,
    terminal_value,
    yearly_details,
    assumptions: MethodAssumptions::ExcessEarnings {
      operating_margin: inputs.operating_margin,
      contributory_assets: inputs.contributory_assets.clone(),
      ip_contribution: inputs.ip_contribution,
      tax_rate: inputs.tax_rate,
      wacc: inputs.wacc,
      terminal_growth: inputs.terminal_growth,
    },
  })
}
