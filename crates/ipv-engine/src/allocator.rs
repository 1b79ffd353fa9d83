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

//! Segment financial allocation.
//!
//! Consolidated statements are pushed down to a business segment in proportion to the
//! segment's share of consolidated revenue. Segments are assumed to carry the company's
//! overall gross and operating margins.

use crate::cache::{CacheConfig, CacheHelper, CacheResult, InMemoryProfileCache, ProfileCache, SegmentKey};
use ipv_client::FinancialDataSource;
use ipv_core::{Error, Result};
use ipv_models::{
  available_segment_labels, FinancialStatement, SegmentFinancialProfile, SegmentMatch, SegmentPeriod,
  SegmentedRevenues,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Slack allowed before a dimension's shares are flagged as exceeding consolidated revenue
pub const ALLOCATION_EPSILON: f64 = 1e-6;

/// Build a segment profile from already-fetched data.
///
/// `statements` and `segmented` are most-recent-first. At most `years` segmented periods
/// are used; periods where the segment is not reported, or that have no consolidated
/// statement, are skipped. A period where the segment matches several conflicting line
/// items fails the lookup.
pub fn allocate_segment(
  ticker: &str,
  segment: &str,
  years: usize,
  statements: &[FinancialStatement],
  segmented: &[SegmentedRevenues],
) -> Result<SegmentFinancialProfile> {
  if statements.is_empty() || segmented.is_empty() {
    return Err(Error::DataUnavailable(format!("Unable to fetch data for {}", ticker)));
  }

  let mut periods = Vec::new();
  let mut matched_any = false;

  for (idx, disclosure) in segmented.iter().take(years).enumerate() {
    let segment_revenue = match disclosure.find_segment(segment) {
      SegmentMatch::Found(amount) => amount,
      SegmentMatch::Missing => {
        debug!("{} not reported in period {:?}", segment, disclosure.report_period);
        continue;
      }
      SegmentMatch::Ambiguous(matches) => {
        return Err(Error::AmbiguousSegment {
          ticker: ticker.to_string(),
          segment: segment.to_string(),
          matches,
        });
      }
    };
    matched_any = true;

    let Some(statement) = aligned_statement(statements, disclosure, idx) else {
      debug!("No consolidated statement for {:?}, skipping", disclosure.report_period);
      continue;
    };

    periods.push(allocate_period(ticker, segment, segment_revenue, statement, disclosure));
  }

  if !matched_any {
    return Err(Error::SegmentNotFound {
      ticker: ticker.to_string(),
      segment: segment.to_string(),
      available: available_segment_labels(segmented),
    });
  }

  if periods.is_empty() {
    return Err(Error::InsufficientData(format!(
      "No consolidated statements align with the periods reporting {} for {}",
      segment, ticker
    )));
  }

  Ok(SegmentFinancialProfile {
    ticker: ticker.to_uppercase(),
    segment: segment.to_string(),
    years,
    periods,
  })
}

/// Consolidated statement for a segment disclosure: same report period, else same position
fn aligned_statement<'a>(
  statements: &'a [FinancialStatement],
  disclosure: &SegmentedRevenues,
  idx: usize,
) -> Option<&'a FinancialStatement> {
  disclosure
    .report_period
    .and_then(|period| statements.iter().find(|s| s.report_period == Some(period)))
    .or_else(|| statements.get(idx))
}

fn allocate_period(
  ticker: &str,
  segment: &str,
  segment_revenue: f64,
  statement: &FinancialStatement,
  disclosure: &SegmentedRevenues,
) -> SegmentPeriod {
  let consolidated_revenue = statement.revenue.unwrap_or(0.0);
  let gross_profit = statement.gross_profit.unwrap_or(0.0);
  let operating_income = statement.operating_income.unwrap_or(0.0);
  let rd_expense = statement.research_and_development.unwrap_or(0.0);

  let (fraction, gross_margin, operating_margin) = if consolidated_revenue > 0.0 {
    let raw = segment_revenue / consolidated_revenue;
    if raw > 1.0 {
      warn!(
        "{} {} revenue {} exceeds consolidated revenue {}, clamping allocation to 100%",
        ticker, segment, segment_revenue, consolidated_revenue
      );
    }
    (
      raw.clamp(0.0, 1.0),
      gross_profit / consolidated_revenue,
      operating_income / consolidated_revenue,
    )
  } else {
    (0.0, 0.0, 0.0)
  };

  SegmentPeriod {
    report_period: disclosure.report_period.or(statement.report_period),
    revenue: segment_revenue,
    consolidated_revenue,
    allocation_fraction: fraction,
    gross_profit: gross_profit * fraction,
    operating_income: operating_income * fraction,
    rd_expense: rd_expense * fraction,
    gross_margin,
    operating_margin,
  }
}

/// Share of consolidated revenue reported for one segment label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentShare {
  pub segment: String,
  pub revenue: f64,
  pub allocation_fraction: f64,
}

/// All segments of one reporting dimension ("Product or Service", "Geography", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAllocation {
  pub dimension: String,
  pub segments: Vec<SegmentShare>,
  pub total_fraction: f64,

  /// Shares sum past 100% of consolidated revenue; overlapping disclosures do this
  pub exceeds_consolidated: bool,
}

/// Per-dimension allocation of one fiscal period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAllocation {
  pub report_period: Option<ipv_models::NaiveDate>,
  pub consolidated_revenue: f64,
  pub dimensions: Vec<DimensionAllocation>,
}

impl PeriodAllocation {
  pub fn has_overlap(&self) -> bool {
    self.dimensions.iter().any(|d| d.exceeds_consolidated)
  }
}

/// Allocation fractions of every reported single-dimension segment, grouped by dimension.
///
/// Fractions are left unclamped so over-reporting stays visible; the `exceeds_consolidated`
/// flag is a warning, never an error.
pub fn allocation_breakdown(
  statements: &[FinancialStatement],
  segmented: &[SegmentedRevenues],
  years: usize,
) -> Vec<PeriodAllocation> {
  segmented
    .iter()
    .take(years)
    .enumerate()
    .filter_map(|(idx, disclosure)| {
      let statement = aligned_statement(statements, disclosure, idx)?;
      let consolidated_revenue = statement.revenue.unwrap_or(0.0);

      let mut grouped: BTreeMap<String, Vec<SegmentShare>> = BTreeMap::new();
      for (label, revenue) in disclosure.single_segment_amounts() {
        let allocation_fraction =
          if consolidated_revenue > 0.0 { revenue / consolidated_revenue } else { 0.0 };
        grouped.entry(label.segment_type.clone()).or_default().push(SegmentShare {
          segment: label.label.clone(),
          revenue,
          allocation_fraction,
        });
      }

      let dimensions = grouped
        .into_iter()
        .map(|(dimension, segments)| {
          let total_fraction: f64 = segments.iter().map(|s| s.allocation_fraction).sum();
          DimensionAllocation {
            dimension,
            segments,
            total_fraction,
            exceeds_consolidated: total_fraction > 1.0 + ALLOCATION_EPSILON,
          }
        })
        .collect();

      Some(PeriodAllocation {
        report_period: disclosure.report_period.or(statement.report_period),
        consolidated_revenue,
        dimensions,
      })
    })
    .collect()
}

/// Fetches and allocates segment profiles through an injected cache
pub struct SegmentAllocator {
  source: Arc<dyn FinancialDataSource>,
  cache: Arc<dyn ProfileCache>,
  helper: CacheHelper,
}

impl SegmentAllocator {
  /// Allocator with its own in-memory cache
  pub fn new(source: Arc<dyn FinancialDataSource>) -> Self {
    Self::with_cache(source, Arc::new(InMemoryProfileCache::new()), CacheConfig::default())
  }

  pub fn with_cache(
    source: Arc<dyn FinancialDataSource>,
    cache: Arc<dyn ProfileCache>,
    config: CacheConfig,
  ) -> Self {
    Self { source, cache, helper: CacheHelper::new(config) }
  }

  pub fn cache(&self) -> &Arc<dyn ProfileCache> {
    &self.cache
  }

  /// Segment profile for `years` periods, served from cache when possible
  #[instrument(skip(self), fields(source = self.source.name()))]
  pub async fn prepare_segment_financials(
    &self,
    ticker: &str,
    segment: &str,
    years: usize,
  ) -> Result<Arc<SegmentFinancialProfile>> {
    let key = SegmentKey::new(ticker, segment, years);

    if let CacheResult::Hit(profile) = self.helper.get(self.cache.as_ref(), &key) {
      if profile.segment == segment {
        return Ok(profile);
      }
      // Same entry under another spelling: report the caller's name, keep the figures
      return Ok(Arc::new(SegmentFinancialProfile { segment: segment.to_string(), ..(*profile).clone() }));
    }

    let (segmented, income) = futures::try_join!(
      self.source.segmented_revenues(ticker, years),
      self.source.income_statements(ticker, years),
    )?;
    let statements = FinancialStatement::combine(&income, &[]);

    let profile = Arc::new(allocate_segment(ticker, segment, years, &statements, &segmented)?);
    info!(
      "Allocated {} {} over {} periods (latest share {:.1}%)",
      ticker,
      segment,
      profile.len(),
      profile.periods.first().map(|p| p.allocation_fraction * 100.0).unwrap_or(0.0)
    );

    self.helper.set(self.cache.as_ref(), key, profile.clone());
    Ok(profile)
  }

  /// Per-dimension allocation of every reported segment
  #[instrument(skip(self), fields(source = self.source.name()))]
  pub async fn allocation_breakdown(&self, ticker: &str, years: usize) -> Result<Vec<PeriodAllocation>> {
    let (segmented, income) = futures::try_join!(
      self.source.segmented_revenues(ticker, years),
      self.source.income_statements(ticker, years),
    )?;
    if segmented.is_empty() || income.is_empty() {
      return Err(Error::DataUnavailable(format!("Unable to fetch data for {}", ticker)));
    }

    let breakdown = allocation_breakdown(&FinancialStatement::combine(&income, &[]), &segmented, years);
    for period in breakdown.iter().filter(|p| p.has_overlap()) {
      warn!(
        "{} segment shares exceed consolidated revenue in {:?}; disclosures overlap",
        ticker, period.report_period
      );
    }
    Ok(breakdown)
  }
}
