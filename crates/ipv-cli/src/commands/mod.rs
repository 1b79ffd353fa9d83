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

pub mod analyze;
pub mod assumptions;
pub mod fair_value;
pub mod segments;
pub mod sensitivity;
pub mod value;

use ipv_models::AssumptionOverrides;

/// `$1.23B`-style rendering for large currency amounts
pub fn format_money(value: f64) -> String {
  let sign = if value < 0.0 { "-" } else { "" };
  let abs = value.abs();
  if abs >= 1e12 {
    format!("{}${:.2}T", sign, abs / 1e12)
  } else if abs >= 1e9 {
    format!("{}${:.2}B", sign, abs / 1e9)
  } else if abs >= 1e6 {
    format!("{}${:.2}M", sign, abs / 1e6)
  } else if abs >= 1e3 {
    format!("{}${:.2}K", sign, abs / 1e3)
  } else {
    format!("{}${:.2}", sign, abs)
  }
}

pub fn format_pct(value: f64) -> String {
  format!("{:.2}%", value * 100.0)
}

/// Overrides from optional `--wacc`, `--tax-rate` and `--terminal-growth` flags
pub fn overrides(wacc: Option<f64>, tax_rate: Option<f64>, terminal_growth: Option<f64>) -> AssumptionOverrides {
  AssumptionOverrides { wacc, tax_rate, terminal_growth }
}
