use std::collections::HashMap;

use crate::{
    CategoryDefinition, CategoryIndicator, CompanyScore, CompositeIndicator, CycleError,
    MetricDefinition, MetricSeries,
};

/// Turns one company's raw metric series into a scored series
pub trait CompanyScorer: Send + Sync {
    fn score(
        &self,
        company_id: &str,
        data: &HashMap<String, MetricSeries>,
        defs: &[MetricDefinition],
    ) -> Result<CompanyScore, CycleError>;
}

/// Averages member company scores into one category series.
/// Returns `None` when no member produced a usable score, so callers can
/// observe the omission instead of receiving injected zeros.
pub trait CategoryAggregator: Send + Sync {
    fn aggregate(
        &self,
        scores: &[CompanyScore],
        category: &CategoryDefinition,
    ) -> Option<CategoryIndicator>;
}

/// Merges category series into the composite indicator
pub trait CompositeBuilder: Send + Sync {
    fn build(&self, categories: &[CategoryIndicator]) -> Result<CompositeIndicator, CycleError>;
}
