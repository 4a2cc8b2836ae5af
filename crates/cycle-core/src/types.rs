use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CycleError;

/// One dated observation in a quarterly series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Raw observations for one (company, metric) pair.
///
/// Dates are strictly increasing; a quarter with no observation is simply
/// absent, never stored as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub points: Vec<TimePoint>,
}

impl MetricSeries {
    pub fn new(points: Vec<TimePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Reject out-of-order or duplicate dates
    pub fn validate(&self, label: &str) -> Result<(), CycleError> {
        for w in self.points.windows(2) {
            if w[1].date <= w[0].date {
                return Err(CycleError::InvalidSeries(format!(
                    "{}: dates must be strictly increasing ({} then {})",
                    label, w[0].date, w[1].date
                )));
            }
        }
        Ok(())
    }
}

/// Where a metric sits in the cycle relative to the turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleTiming {
    Leading,
    Coincident,
    Lagging,
}

/// How a metric participates in scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    /// Contribution weight, in (0, 1]
    pub weight: f64,
    pub higher_is_better: bool,
    /// Outlier clamp bounds in the metric's native units, low < high
    pub typical_range: (f64, f64),
    pub timing: CycleTiming,
    pub description: String,
}

impl MetricDefinition {
    pub fn validate(&self) -> Result<(), CycleError> {
        if !(self.weight > 0.0 && self.weight <= 1.0) {
            return Err(CycleError::InvalidConfig(format!(
                "metric '{}': weight {} outside (0, 1]",
                self.name, self.weight
            )));
        }
        let (low, high) = self.typical_range;
        if low >= high {
            return Err(CycleError::InvalidConfig(format!(
                "metric '{}': typical_range ({}, {}) has low >= high",
                self.name, low, high
            )));
        }
        Ok(())
    }
}

/// Summary statistics over the raw (unclipped) observations of one metric,
/// kept in the metric's native units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub current: f64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-company output of the scoring stage. Immutable once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyScore {
    pub company_id: String,
    pub score_series: Vec<TimePoint>,
    pub metric_stats: HashMap<String, MetricStats>,
}

impl CompanyScore {
    pub fn empty(company_id: &str) -> Self {
        Self {
            company_id: company_id.to_string(),
            score_series: Vec::new(),
            metric_stats: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.score_series.is_empty()
    }
}

/// How hard a category swings with the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleSensitivity {
    VeryHigh,
    High,
    MediumHigh,
    Medium,
}

impl CycleSensitivity {
    pub fn name(&self) -> &'static str {
        match self {
            CycleSensitivity::VeryHigh => "very high",
            CycleSensitivity::High => "high",
            CycleSensitivity::MediumHigh => "medium-high",
            CycleSensitivity::Medium => "medium",
        }
    }
}

/// Static sub-segment definition (equipment makers, memory makers, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    pub members: Vec<String>,
    /// Contribution weight, in (0, 1]
    pub weight: f64,
    pub sensitivity: CycleSensitivity,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CategoryDefinition {
    pub fn validate(&self) -> Result<(), CycleError> {
        if !(self.weight > 0.0 && self.weight <= 1.0) {
            return Err(CycleError::InvalidConfig(format!(
                "category '{}': weight {} outside (0, 1]",
                self.name, self.weight
            )));
        }
        if self.members.is_empty() {
            return Err(CycleError::InvalidConfig(format!(
                "category '{}': no member companies",
                self.name
            )));
        }
        Ok(())
    }
}

/// Weighted cross-company mean series for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryIndicator {
    pub category: String,
    pub series: Vec<TimePoint>,
}

/// Position within the boom/bust cycle, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CyclePhase {
    Downturn,
    EarlyRecovery,
    Expansion,
    Peak,
}

impl CyclePhase {
    pub fn name(&self) -> &'static str {
        match self {
            CyclePhase::Downturn => "Downturn",
            CyclePhase::EarlyRecovery => "Early Recovery",
            CyclePhase::Expansion => "Expansion",
            CyclePhase::Peak => "Peak",
        }
    }
}

/// One fully derived point of the composite indicator.
///
/// Momentum is undefined at the first point and acceleration at the first
/// two, so both are optional rather than NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositePoint {
    pub date: NaiveDate,
    pub score: f64,
    pub momentum: Option<f64>,
    pub acceleration: Option<f64>,
    pub phase: CyclePhase,
}

/// Mean/std/min/max of the composite score series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// The industry-level output series with derived momentum, acceleration and
/// phase labels. Phase bucket edges come from this run's observed range, so
/// re-running on an extended history can relabel older points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompositeIndicator {
    pub points: Vec<CompositePoint>,
    pub summary: ScoreSummary,
}

impl CompositeIndicator {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Latest-point status readout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub as_of: NaiveDate,
    pub phase: CyclePhase,
    pub score: f64,
    pub momentum: Option<f64>,
    pub acceleration: Option<f64>,
}

/// Rolling volatility band around the composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub mean: f64,
    pub upper: f64,
    pub lower: f64,
}

/// One quarterly statement row as delivered by the data-fetch collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawFinancials {
    pub date: NaiveDate,
    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub inventory: Option<f64>,
}

/// Named boom/bust reference window. Static configuration for consumers that
/// want to overlay past cycles; never derived by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalCycle {
    pub label: String,
    pub boom: (NaiveDate, NaiveDate),
    pub bust: (NaiveDate, NaiveDate),
    pub notes: String,
    pub boom_drivers: Vec<String>,
    pub bust_drivers: Vec<String>,
}
