use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use statrs::statistics::Statistics;

use cycle_core::{
    smoothing, stats, CompanyScore, CompanyScorer, CycleError, MetricDefinition, MetricSeries,
    MetricStats, TimePoint,
};

pub mod derive;
pub use derive::derive_metric_series;

const SMOOTH_WINDOW: usize = 5;
const SMOOTH_DEGREE: usize = 3;
/// Series with 5 or fewer points are returned unsmoothed; the filter is
/// unstable on shorter histories.
const MIN_POINTS_TO_SMOOTH: usize = 6;

#[derive(Debug)]
pub struct CompanyScoringEngine;

impl CompanyScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Normalize one metric series into weighted, direction-corrected
    /// contributions: clamp outliers into the metric's typical range,
    /// z-score over the clipped values, negate when lower is healthier,
    /// then scale by the metric weight.
    ///
    /// An empty series yields an empty result — callers treat "no usable
    /// data" as a skip, not a failure.
    pub fn normalize_metric(
        &self,
        series: &MetricSeries,
        def: &MetricDefinition,
    ) -> Vec<TimePoint> {
        if series.is_empty() {
            return Vec::new();
        }
        let (low, high) = def.typical_range;
        let clipped = stats::clip(&series.values(), low, high);
        let scores = stats::z_scores(&clipped);
        let direction = if def.higher_is_better { 1.0 } else { -1.0 };
        series
            .points
            .iter()
            .zip(scores)
            .map(|(p, s)| TimePoint::new(p.date, s * direction * def.weight))
            .collect()
    }

    /// Summary statistics over the raw, unclipped observations so they stay
    /// interpretable in the metric's native units. `None` for an empty series.
    fn raw_stats(&self, series: &MetricSeries) -> Option<MetricStats> {
        let values = series.values();
        let current = values.last().copied()?;
        let v = values.as_slice();
        Some(MetricStats {
            current,
            mean: v.mean(),
            std: if values.len() < 2 { 0.0 } else { v.std_dev() },
            min: v.min(),
            max: v.max(),
        })
    }
}

impl CompanyScorer for CompanyScoringEngine {
    /// Combine a company's metric series into one smoothed score series.
    ///
    /// Alignment is by date, not position: contributions are summed over the
    /// union of dates across metrics, and a metric with no observation at a
    /// date contributes nothing there. Metrics named in `defs` but absent
    /// from the data are skipped; zero usable metrics yields an empty score.
    fn score(
        &self,
        company_id: &str,
        data: &HashMap<String, MetricSeries>,
        defs: &[MetricDefinition],
    ) -> Result<CompanyScore, CycleError> {
        let mut combined: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut metric_stats = HashMap::new();

        for def in defs {
            let series = match data.get(&def.name) {
                Some(s) if !s.is_empty() => s,
                _ => continue,
            };
            series.validate(&format!("{}/{}", company_id, def.name))?;

            for point in self.normalize_metric(series, def) {
                *combined.entry(point.date).or_insert(0.0) += point.value;
            }
            if let Some(stats) = self.raw_stats(series) {
                metric_stats.insert(def.name.clone(), stats);
            }
        }

        if combined.is_empty() {
            return Ok(CompanyScore::empty(company_id));
        }

        let dates: Vec<NaiveDate> = combined.keys().copied().collect();
        let values: Vec<f64> = combined.values().copied().collect();
        let smoothed = if values.len() >= MIN_POINTS_TO_SMOOTH {
            smoothing::savitzky_golay(&values, SMOOTH_WINDOW, SMOOTH_DEGREE)
        } else {
            values
        };

        Ok(CompanyScore {
            company_id: company_id.to_string(),
            score_series: dates
                .into_iter()
                .zip(smoothed)
                .map(|(date, value)| TimePoint::new(date, value))
                .collect(),
            metric_stats,
        })
    }
}

impl Default for CompanyScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}
