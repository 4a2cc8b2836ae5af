use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use company_scorer::{derive_metric_series, CompanyScoringEngine};
use composite_builder::{CategoryAggregationEngine, CompositeEngine};
use cycle_core::{
    BandPoint, CategoryAggregator, CategoryDefinition, CategoryIndicator, CompanyScore,
    CompanyScorer, CompositeBuilder, CompositeIndicator, CycleError, CycleSnapshot,
    MetricDefinition, MetricSeries, MetricStats, RawFinancials,
};

pub mod config;
pub use config::{default_categories, default_metrics, historical_cycles};

/// Per-company input: metric name -> chronologically ordered series
pub type CompanyData = HashMap<String, HashMap<String, MetricSeries>>;

/// Full engine configuration: the metric catalog plus the category map.
/// Shared read-only across runs; concurrent analyses need no coordination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    pub metrics: Vec<MetricDefinition>,
    pub categories: Vec<CategoryDefinition>,
}

impl CycleConfig {
    /// The default semiconductor catalog
    pub fn semiconductor() -> Self {
        Self {
            metrics: default_metrics(),
            categories: default_categories(),
        }
    }

    /// Reject malformed configuration before any computation runs; a bad
    /// definition would silently corrupt every downstream score.
    pub fn validate(&self) -> Result<(), CycleError> {
        if self.metrics.is_empty() {
            return Err(CycleError::InvalidConfig("no metrics defined".to_string()));
        }
        if self.categories.is_empty() {
            return Err(CycleError::InvalidConfig(
                "no categories defined".to_string(),
            ));
        }

        let mut metric_names = HashSet::new();
        for metric in &self.metrics {
            metric.validate()?;
            if !metric_names.insert(metric.name.as_str()) {
                return Err(CycleError::InvalidConfig(format!(
                    "duplicate metric '{}'",
                    metric.name
                )));
            }
        }

        let mut category_names = HashSet::new();
        for category in &self.categories {
            category.validate()?;
            if !category_names.insert(category.name.as_str()) {
                return Err(CycleError::InvalidConfig(format!(
                    "duplicate category '{}'",
                    category.name
                )));
            }
        }
        Ok(())
    }
}

/// Read-only snapshot handed to presentation/persistence collaborators.
/// Never mutated after the run that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleAnalysis {
    pub composite: CompositeIndicator,
    pub categories: Vec<CategoryIndicator>,
    /// Raw-unit summary stats per company and metric
    pub company_stats: HashMap<String, HashMap<String, MetricStats>>,
    pub snapshot: Option<CycleSnapshot>,
}

/// One-shot pipeline: per-company scoring, category aggregation, composite
/// build. Pure batch computation over already-materialized series.
#[derive(Debug)]
pub struct CycleAnalyzer {
    config: CycleConfig,
    scorer: CompanyScoringEngine,
    aggregator: CategoryAggregationEngine,
    builder: CompositeEngine,
}

impl CycleAnalyzer {
    pub fn new(config: CycleConfig) -> Result<Self, CycleError> {
        config.validate()?;
        Ok(Self {
            config,
            scorer: CompanyScoringEngine::new(),
            aggregator: CategoryAggregationEngine::new(),
            builder: CompositeEngine::new(),
        })
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Run the full pipeline over pre-derived metric series.
    ///
    /// Companies and metrics without usable data are skipped and logged, and
    /// a category whose members all lack data is omitted from the composite;
    /// only structural problems (malformed series) abort the run.
    pub fn analyze(&self, data: &CompanyData) -> Result<CycleAnalysis, CycleError> {
        tracing::info!(
            companies = data.len(),
            categories = self.config.categories.len(),
            "starting cycle analysis"
        );

        let mut category_indicators = Vec::new();
        let mut company_stats = HashMap::new();

        for category in &self.config.categories {
            let scores: Vec<CompanyScore> = category
                .members
                .par_iter()
                .map(|id| match data.get(id) {
                    Some(series) => self.scorer.score(id, series, &self.config.metrics),
                    None => Ok(CompanyScore::empty(id)),
                })
                .collect::<Result<_, _>>()?;

            for score in &scores {
                if score.is_empty() {
                    tracing::debug!(
                        company = %score.company_id,
                        category = %category.name,
                        "no usable data, company skipped"
                    );
                } else {
                    company_stats.insert(score.company_id.clone(), score.metric_stats.clone());
                }
            }

            match self.aggregator.aggregate(&scores, category) {
                Some(indicator) => category_indicators.push(indicator),
                None => tracing::warn!(
                    category = %category.name,
                    "no member produced a usable score, category omitted"
                ),
            }
        }

        let composite = self.builder.build(&category_indicators)?;
        let snapshot = self.builder.snapshot(&composite);
        tracing::info!(
            points = composite.points.len(),
            categories = category_indicators.len(),
            "cycle analysis complete"
        );

        Ok(CycleAnalysis {
            composite,
            categories: category_indicators,
            company_stats,
            snapshot,
        })
    }

    /// Convenience path for callers holding raw quarterly statements:
    /// derives the metric series first, then runs `analyze`.
    pub fn analyze_financials(
        &self,
        raw: &HashMap<String, Vec<RawFinancials>>,
    ) -> Result<CycleAnalysis, CycleError> {
        let data: CompanyData = raw
            .iter()
            .map(|(id, rows)| (id.clone(), derive_metric_series(rows)))
            .collect();
        self.analyze(&data)
    }

    /// Rolling volatility band around a finished run's composite score
    pub fn volatility_bands(&self, analysis: &CycleAnalysis, window: usize) -> Vec<BandPoint> {
        self.builder.volatility_bands(&analysis.composite, window)
    }
}
