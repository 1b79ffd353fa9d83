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

//! Segmented revenue disclosures and derived segment profiles

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dimension label attached to a revenue line item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentLabel {
  #[serde(default)]
  pub key: String,

  #[serde(default)]
  pub label: String,

  /// e.g. "Product or Service", "Statement Business Segments"
  #[serde(rename = "type", default)]
  pub segment_type: String,
}

/// A reported revenue amount and the segment dimensions it belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentRevenueItem {
  #[serde(default)]
  pub name: String,

  pub amount: Option<f64>,

  #[serde(default)]
  pub segments: Vec<SegmentLabel>,
}

/// All segment revenue line items for one fiscal period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentedRevenues {
  pub ticker: Option<String>,
  pub period: Option<String>,
  pub report_period: Option<NaiveDate>,

  #[serde(default)]
  pub items: Vec<SegmentRevenueItem>,
}

/// Envelope for the segmented revenues endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentedRevenuesResponse {
  #[serde(default)]
  pub segmented_revenues: Vec<SegmentedRevenues>,
}

/// Lowercase and strip spaces and hyphens so "Wearables-Home" matches "wearables home"
pub fn normalize_segment_name(name: &str) -> String {
  name.chars().filter(|c| *c != ' ' && *c != '-').flat_map(char::to_lowercase).collect()
}

/// Outcome of looking a segment up in one period's disclosure
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentMatch {
  Found(f64),
  Missing,
  /// Several line items with different amounts match; each described by its labels
  Ambiguous(Vec<String>),
}

fn item_amount(item: &SegmentRevenueItem) -> f64 {
  item.amount.unwrap_or(0.0)
}

fn describe_item(item: &SegmentRevenueItem) -> String {
  let labels: Vec<&str> = item.segments.iter().map(|s| s.label.as_str()).collect();
  format!("{} ({})", labels.join(" x "), item_amount(item))
}

impl SegmentedRevenues {
  /// Resolve `segment` to one revenue figure.
  ///
  /// Line items tagged with the segment alone win over cross-tabulated items (e.g.
  /// product by geography), which only count when no plain item exists. Matches that
  /// disagree on the amount are ambiguous.
  pub fn find_segment(&self, segment: &str) -> SegmentMatch {
    let target = normalize_segment_name(segment);
    let matching: Vec<&SegmentRevenueItem> = self
      .items
      .iter()
      .filter(|item| item.segments.iter().any(|s| normalize_segment_name(&s.label) == target))
      .collect();

    let plain: Vec<&SegmentRevenueItem> = matching.iter().copied().filter(|item| item.segments.len() == 1).collect();
    let candidates = if plain.is_empty() { matching } else { plain };

    match candidates.as_slice() {
      [] => SegmentMatch::Missing,
      [first, rest @ ..] if rest.iter().all(|item| item_amount(item) == item_amount(first)) => {
        SegmentMatch::Found(item_amount(first))
      }
      _ => SegmentMatch::Ambiguous(candidates.iter().map(|item| describe_item(item)).collect()),
    }
  }

  /// The segment's amount when it resolves unambiguously
  pub fn find_segment_amount(&self, segment: &str) -> Option<f64> {
    match self.find_segment(segment) {
      SegmentMatch::Found(amount) => Some(amount),
      _ => None,
    }
  }

  /// Every non-empty segment label reported in this period
  pub fn labels(&self) -> impl Iterator<Item = &str> {
    self
      .items
      .iter()
      .flat_map(|item| item.segments.iter())
      .map(|s| s.label.as_str())
      .filter(|label| !label.is_empty())
  }

  /// (label, amount) for every single-dimension line item.
  ///
  /// Items tagged with several dimensions at once (e.g. product by geography) are
  /// skipped since they double count revenue.
  pub fn single_segment_amounts(&self) -> Vec<(&SegmentLabel, f64)> {
    self
      .items
      .iter()
      .filter_map(|item| match item.segments.as_slice() {
        [label] => item.amount.map(|amount| (label, amount)),
        _ => None,
      })
      .collect()
  }
}

/// Sorted, de-duplicated labels across several periods
pub fn available_segment_labels(periods: &[SegmentedRevenues]) -> Vec<String> {
  periods
    .iter()
    .flat_map(|p| p.labels())
    .map(str::to_string)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// Segment figures for one fiscal period, allocated from consolidated results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPeriod {
  pub report_period: Option<NaiveDate>,

  /// Revenue reported for the segment
  pub revenue: f64,

  /// Consolidated company revenue for the same period
  pub consolidated_revenue: f64,

  /// Segment share of consolidated revenue, in [0, 1]
  pub allocation_fraction: f64,

  pub gross_profit: f64,
  pub operating_income: f64,
  pub rd_expense: f64,

  /// Consolidated gross margin applied to the segment
  pub gross_margin: f64,

  /// Consolidated operating margin applied to the segment
  pub operating_margin: f64,
}

/// Segment-level financial profile, most recent period first.
///
/// Derived from consolidated statements by linear allocation: a segment is assumed to
/// share the company's margins in proportion to its revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentFinancialProfile {
  pub ticker: String,
  pub segment: String,

  /// Year count requested when the profile was built
  pub years: usize,

  pub periods: Vec<SegmentPeriod>,
}

impl SegmentFinancialProfile {
  pub fn len(&self) -> usize {
    self.periods.len()
  }

  pub fn is_empty(&self) -> bool {
    self.periods.is_empty()
  }

  pub fn revenues(&self) -> Vec<f64> {
    self.periods.iter().map(|p| p.revenue).collect()
  }

  pub fn gross_profits(&self) -> Vec<f64> {
    self.periods.iter().map(|p| p.gross_profit).collect()
  }

  pub fn operating_incomes(&self) -> Vec<f64> {
    self.periods.iter().map(|p| p.operating_income).collect()
  }

  pub fn rd_expenses(&self) -> Vec<f64> {
    self.periods.iter().map(|p| p.rd_expense).collect()
  }

  pub fn gross_margins(&self) -> Vec<f64> {
    self.periods.iter().map(|p| p.gross_margin).collect()
  }

  pub fn operating_margins(&self) -> Vec<f64> {
    self.periods.iter().map(|p| p.operating_margin).collect()
  }

  pub fn allocation_fractions(&self) -> Vec<f64> {
    self.periods.iter().map(|p| p.allocation_fraction).collect()
  }

  /// Mean operating margin across periods, `None` for an empty profile
  pub fn average_operating_margin(&self) -> Option<f64> {
    if self.periods.is_empty() {
      return None;
    }
    Some(self.periods.iter().map(|p| p.operating_margin).sum::<f64>() / self.periods.len() as f64)
  }

  /// Segment revenues scaled by an IP asset's attribution fraction
  pub fn attributed_revenues(&self, attribution_fraction: f64) -> Vec<f64> {
    self.periods.iter().map(|p| p.revenue * attribution_fraction).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn apple_period() -> SegmentedRevenues {
    let json = r#"{
      "ticker": "AAPL",
      "period": "annual",
      "report_period": "2024-09-28",
      "items": [
        {"name": "Revenue", "amount": 201183000000.0,
         "segments": [{"key": "aapl:IPhoneMember", "label": "IPhone", "type": "Product or Service"}]},
        {"name": "Revenue", "amount": 37005000000.0,
         "segments": [{"key": "aapl:WearablesHomeandAccessoriesMember", "label": "Wearables, Home and Accessories", "type": "Product or Service"}]},
        {"name": "Revenue", "amount": 50000000000.0,
         "segments": [
           {"key": "aapl:IPhoneMember", "label": "IPhone", "type": "Product or Service"},
           {"key": "country:US", "label": "United States", "type": "Geography"}
         ]}
      ]
    }"#;
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn test_normalize_segment_name() {
    assert_eq!(normalize_segment_name("Intelligent Cloud"), "intelligentcloud");
    assert_eq!(normalize_segment_name("Wearables-Home"), "wearableshome");
    assert_eq!(normalize_segment_name("IPHONE"), "iphone");
  }

  #[test]
  fn test_find_segment_amount_is_case_and_space_insensitive() {
    let period = apple_period();
    assert_eq!(period.find_segment_amount("iphone"), Some(201183000000.0));
    assert_eq!(period.find_segment_amount("I-Phone"), Some(201183000000.0));
    assert_eq!(period.find_segment_amount("Mac"), None);
  }

  fn item(amount: f64, labels: &[(&str, &str)]) -> SegmentRevenueItem {
    SegmentRevenueItem {
      name: "Revenue".to_string(),
      amount: Some(amount),
      segments: labels
        .iter()
        .map(|(label, kind)| SegmentLabel {
          key: String::new(),
          label: label.to_string(),
          segment_type: kind.to_string(),
        })
        .collect(),
    }
  }

  fn period_with(items: Vec<SegmentRevenueItem>) -> SegmentedRevenues {
    SegmentedRevenues { items, ..Default::default() }
  }

  #[test]
  fn test_plain_item_wins_over_earlier_cross_tab() {
    let period = period_with(vec![
      item(40.0, &[("iPhone", "Product or Service"), ("Americas", "Geography")]),
      item(200.0, &[("iPhone", "Product or Service")]),
    ]);
    assert_eq!(period.find_segment("iPhone"), SegmentMatch::Found(200.0));
    assert_eq!(period.find_segment_amount("iphone"), Some(200.0));
  }

  #[test]
  fn test_lone_cross_tab_item_is_used() {
    let period = period_with(vec![item(75.0, &[("Cloud", "Business Segments"), ("Americas", "Geography")])]);
    assert_eq!(period.find_segment("cloud"), SegmentMatch::Found(75.0));
  }

  #[test]
  fn test_conflicting_matches_are_ambiguous() {
    let period = period_with(vec![
      item(200.0, &[("iPhone", "Product or Service")]),
      item(180.0, &[("I Phone", "Business Segments")]),
    ]);
    match period.find_segment("iPhone") {
      SegmentMatch::Ambiguous(matches) => {
        assert_eq!(matches, vec!["iPhone (200)".to_string(), "I Phone (180)".to_string()]);
      }
      other => panic!("expected ambiguity, got {:?}", other),
    }
    assert_eq!(period.find_segment_amount("iPhone"), None);

    let crossed = period_with(vec![
      item(40.0, &[("iPhone", "Product or Service"), ("Americas", "Geography")]),
      item(60.0, &[("iPhone", "Product or Service"), ("Europe", "Geography")]),
    ]);
    assert!(matches!(crossed.find_segment("iPhone"), SegmentMatch::Ambiguous(_)));
  }

  #[test]
  fn test_repeated_item_with_same_amount_resolves() {
    let period = period_with(vec![
      item(200.0, &[("iPhone", "Product or Service")]),
      item(200.0, &[("iPhone", "Statement Business Segments")]),
    ]);
    assert_eq!(period.find_segment("iPhone"), SegmentMatch::Found(200.0));
  }

  #[test]
  fn test_labels_and_available_segments() {
    let period = apple_period();
    let labels = available_segment_labels(&[period.clone(), period]);
    assert_eq!(labels, vec!["IPhone", "United States", "Wearables, Home and Accessories"]);
  }

  #[test]
  fn test_single_segment_amounts_skips_cross_tabulated_items() {
    let period = apple_period();
    let amounts = period.single_segment_amounts();
    assert_eq!(amounts.len(), 2);
    assert_eq!(amounts[0].0.label, "IPhone");
    assert_eq!(amounts[0].0.segment_type, "Product or Service");
    assert_eq!(amounts[0].1, 201183000000.0);
  }

  #[test]
  fn test_profile_accessors() {
    let period = |revenue: f64, margin: f64| SegmentPeriod {
      report_period: None,
      revenue,
      consolidated_revenue: revenue * 2.0,
      allocation_fraction: 0.5,
      gross_profit: revenue * 0.4,
      operating_income: revenue * margin,
      rd_expense: revenue * 0.1,
      gross_margin: 0.4,
      operating_margin: margin,
    };
    let profile = SegmentFinancialProfile {
      ticker: "TEST".to_string(),
      segment: "Widgets".to_string(),
      years: 2,
      periods: vec![period(100.0, 0.2), period(80.0, 0.3)],
    };

    assert_eq!(profile.revenues(), vec![100.0, 80.0]);
    assert_eq!(profile.allocation_fractions(), vec![0.5, 0.5]);
    assert_eq!(profile.attributed_revenues(0.25), vec![25.0, 20.0]);
    assert!((profile.average_operating_margin().unwrap() - 0.25).abs() < 1e-12);
  }
}
