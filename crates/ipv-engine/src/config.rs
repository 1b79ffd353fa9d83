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

//! Engine tuning knobs: projection horizon, method defaults, fan-out width and cache policy

use crate::cache::CacheConfig;
use ipv_core::DEFAULT_PROJECTION_YEARS;
use ipv_models::ContributoryAsset;

/// Share of excess earnings attributed to the IP when the caller does not choose one
pub const DEFAULT_IP_CONTRIBUTION: f64 = 0.50;

/// Score assumed for any Technology Factor score an asset leaves unset
pub const DEFAULT_TECHNOLOGY_SCORE: f64 = 0.7;

/// Remaining patent life assumed when an asset leaves it unset
pub const DEFAULT_REMAINING_LIFE_YEARS: u32 = 10;

/// Required returns charged to the standard contributory asset classes
pub fn default_contributory_assets() -> Vec<ContributoryAsset> {
  vec![
    ContributoryAsset::new("working_capital", 0.02),
    ContributoryAsset::new("fixed_assets", 0.10),
    ContributoryAsset::new("other_intangibles", 0.12),
  ]
}

/// Configuration for the valuation engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Number of fiscal periods pulled per segment
  pub projection_years: usize,

  /// Asset classes charged before MPEEM excess earnings
  pub contributory_assets: Vec<ContributoryAsset>,

  /// Share of excess earnings attributed to the IP
  pub ip_contribution: f64,

  /// Fallback for unset innovation, commercial and legal-strength scores
  pub default_technology_score: f64,

  /// Fallback for an unset remaining life
  pub default_remaining_life_years: u32,

  /// Maximum segment valuations in flight at once
  pub max_concurrent_requests: usize,

  pub cache: CacheConfig,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      projection_years: DEFAULT_PROJECTION_YEARS,
      contributory_assets: default_contributory_assets(),
      ip_contribution: DEFAULT_IP_CONTRIBUTION,
      default_technology_score: DEFAULT_TECHNOLOGY_SCORE,
      default_remaining_life_years: DEFAULT_REMAINING_LIFE_YEARS,
      max_concurrent_requests: 4,
      cache: CacheConfig::default(),
    }
  }
}

impl EngineConfig {
  /// Builder: set projection_years
  pub fn with_projection_years(mut self, years: usize) -> Self {
    self.projection_years = years;
    self
  }

  /// Builder: replace the contributory asset table
  pub fn with_contributory_assets(mut self, assets: Vec<ContributoryAsset>) -> Self {
    self.contributory_assets = assets;
    self
  }

  /// Builder: set ip_contribution
  pub fn with_ip_contribution(mut self, contribution: f64) -> Self {
    self.ip_contribution = contribution;
    self
  }

  /// Builder: set max_concurrent_requests (at least 1)
  pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
    self.max_concurrent_requests = max.max(1);
    self
  }

  /// Builder: set the cache policy
  pub fn with_cache(mut self, cache: CacheConfig) -> Self {
    self.cache = cache;
    self
  }
}
