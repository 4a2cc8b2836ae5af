use std::collections::BTreeMap;

use chrono::NaiveDate;

use cycle_core::{
    stats, BandPoint, CategoryAggregator, CategoryDefinition, CategoryIndicator, CompanyScore,
    CompositeBuilder, CompositeIndicator, CompositePoint, CycleError, CyclePhase, CycleSnapshot,
    ScoreSummary, TimePoint,
};

/// Averages member company score series into one weighted category series
#[derive(Debug)]
pub struct CategoryAggregationEngine;

impl CategoryAggregationEngine {
    pub fn new() -> Self {
        Self
    }
}

impl CategoryAggregator for CategoryAggregationEngine {
    /// Mean of member scores at each date, scaled by the category weight.
    ///
    /// Companies with an empty score series are excluded entirely, and the
    /// mean at each date runs only over members that have a value there —
    /// company histories start at different dates and partial participation
    /// is expected. Returns `None` when no member produced a usable score.
    fn aggregate(
        &self,
        scores: &[CompanyScore],
        category: &CategoryDefinition,
    ) -> Option<CategoryIndicator> {
        let members: Vec<&CompanyScore> = scores
            .iter()
            .filter(|s| !s.is_empty() && category.members.iter().any(|m| m == &s.company_id))
            .collect();
        if members.is_empty() {
            return None;
        }

        let mut acc: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for score in &members {
            for point in &score.score_series {
                let entry = acc.entry(point.date).or_insert((0.0, 0));
                entry.0 += point.value;
                entry.1 += 1;
            }
        }

        Some(CategoryIndicator {
            category: category.name.clone(),
            series: acc
                .into_iter()
                .map(|(date, (sum, n))| {
                    TimePoint::new(date, sum / n as f64 * category.weight)
                })
                .collect(),
        })
    }
}

impl Default for CategoryAggregationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Merges category indicators into the composite series and derives
/// momentum, acceleration and cycle-phase labels
#[derive(Debug)]
pub struct CompositeEngine;

impl CompositeEngine {
    pub fn new() -> Self {
        Self
    }

    /// Latest-point status readout, `None` on an empty indicator
    pub fn snapshot(&self, indicator: &CompositeIndicator) -> Option<CycleSnapshot> {
        indicator.points.last().map(|p| CycleSnapshot {
            as_of: p.date,
            phase: p.phase,
            score: p.score,
            momentum: p.momentum,
            acceleration: p.acceleration,
        })
    }

    /// Rolling mean +/- 1.96 sigma band around the composite score, with a
    /// minimum of one observation per window
    pub fn volatility_bands(
        &self,
        indicator: &CompositeIndicator,
        window: usize,
    ) -> Vec<BandPoint> {
        let values: Vec<f64> = indicator.points.iter().map(|p| p.score).collect();
        let means = stats::rolling_mean(&values, window);
        let stds = stats::rolling_std(&values, window);
        indicator
            .points
            .iter()
            .zip(means.into_iter().zip(stds))
            .map(|(p, (mean, std))| BandPoint {
                date: p.date,
                mean,
                upper: mean + 1.96 * std,
                lower: mean - 1.96 * std,
            })
            .collect()
    }
}

impl CompositeBuilder for CompositeEngine {
    /// Sum the category indicators over the union of their dates, then
    /// derive first/second differences and phase labels.
    ///
    /// A category with no value at a date contributes nothing at that point;
    /// a date no category covers never appears in the output. Duplicate or
    /// unordered dates within a category are an input-validation failure.
    fn build(&self, categories: &[CategoryIndicator]) -> Result<CompositeIndicator, CycleError> {
        let mut acc: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for cat in categories {
            for w in cat.series.windows(2) {
                if w[1].date <= w[0].date {
                    return Err(CycleError::InvalidSeries(format!(
                        "category '{}': dates must be strictly increasing ({} then {})",
                        cat.category, w[0].date, w[1].date
                    )));
                }
            }
            for point in &cat.series {
                *acc.entry(point.date).or_insert(0.0) += point.value;
            }
        }

        if acc.is_empty() {
            return Ok(CompositeIndicator::default());
        }

        let dates: Vec<NaiveDate> = acc.keys().copied().collect();
        let scores: Vec<f64> = acc.values().copied().collect();

        let momentum = stats::diff(&scores);
        let acceleration: Vec<Option<f64>> = (0..momentum.len())
            .map(|i| match (i.checked_sub(1).and_then(|j| momentum[j]), momentum[i]) {
                (Some(prev), Some(cur)) => Some(cur - prev),
                _ => None,
            })
            .collect();
        let phases = classify_phases(&scores);

        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let summary = ScoreSummary {
            mean: stats::mean(&scores),
            std: stats::std_dev(&scores),
            min,
            max,
        };

        let points = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| CompositePoint {
                date,
                score: scores[i],
                momentum: momentum[i],
                acceleration: acceleration[i],
                phase: phases[i],
            })
            .collect();

        Ok(CompositeIndicator { points, summary })
    }
}

impl Default for CompositeEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Label every score by binning the observed min-max range into four
/// equal-width buckets. Edges are recomputed per run, so extending the
/// history can relabel older points.
pub fn classify_phases(scores: &[f64]) -> Vec<CyclePhase> {
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    scores.iter().map(|&s| classify_phase(s, min, max)).collect()
}

/// Assign one score to its bucket within `[min, max]`.
///
/// Interior boundary values belong to the lower-indexed bucket; the maximum
/// belongs to Peak. A zero-width range means every value is the maximum, so
/// everything classifies as Peak.
pub fn classify_phase(score: f64, min: f64, max: f64) -> CyclePhase {
    const PHASES: [CyclePhase; 4] = [
        CyclePhase::Downturn,
        CyclePhase::EarlyRecovery,
        CyclePhase::Expansion,
        CyclePhase::Peak,
    ];
    let range = max - min;
    if range <= 0.0 {
        return CyclePhase::Peak;
    }
    let t = (score - min) / range * PHASES.len() as f64;
    if t <= 0.0 {
        return CyclePhase::Downturn;
    }
    PHASES[(t.ceil() as usize - 1).min(PHASES.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use cycle_core::CycleSensitivity;

    fn date(q: u32) -> NaiveDate {
        let year = 2023 + (q as i32 - 1) / 4;
        let month = ((q - 1) % 4) * 3 + 3;
        NaiveDate::from_ymd_opt(year, month, 28).unwrap()
    }

    fn score(company: &str, values: &[f64]) -> CompanyScore {
        CompanyScore {
            company_id: company.to_string(),
            score_series: values
                .iter()
                .enumerate()
                .map(|(i, &v)| TimePoint::new(date(i as u32 + 1), v))
                .collect(),
            metric_stats: Default::default(),
        }
    }

    fn category(name: &str, members: &[&str], weight: f64) -> CategoryDefinition {
        CategoryDefinition {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
            weight,
            sensitivity: CycleSensitivity::High,
            notes: None,
        }
    }

    fn indicator(name: &str, values: &[f64]) -> CategoryIndicator {
        CategoryIndicator {
            category: name.to_string(),
            series: values
                .iter()
                .enumerate()
                .map(|(i, &v)| TimePoint::new(date(i as u32 + 1), v))
                .collect(),
        }
    }

    #[test]
    fn single_member_category_equals_weighted_company_series() {
        let engine = CategoryAggregationEngine::new();
        let scores = vec![score("ASML", &[-1.0, 0.0, 1.0])];
        let cat = category("equipment", &["ASML"], 0.3);

        let result = engine.aggregate(&scores, &cat).unwrap();
        for (p, expected) in result.series.iter().zip([-0.3, 0.0, 0.3]) {
            assert!((p.value - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_companies_are_excluded_from_the_mean() {
        let engine = CategoryAggregationEngine::new();
        let scores = vec![score("A", &[2.0, 4.0]), CompanyScore::empty("B")];
        let cat = category("memory", &["A", "B"], 1.0);

        // B contributes nothing; the mean is A alone, not pulled toward zero
        let result = engine.aggregate(&scores, &cat).unwrap();
        assert_eq!(result.series[0].value, 2.0);
        assert_eq!(result.series[1].value, 4.0);
    }

    #[test]
    fn category_with_no_usable_members_is_omitted() {
        let engine = CategoryAggregationEngine::new();
        let scores = vec![CompanyScore::empty("A"), CompanyScore::empty("B")];
        let cat = category("foundry", &["A", "B"], 0.25);
        assert!(engine.aggregate(&scores, &cat).is_none());
    }

    #[test]
    fn non_member_scores_are_ignored() {
        let engine = CategoryAggregationEngine::new();
        let scores = vec![score("A", &[1.0]), score("OUTSIDER", &[100.0])];
        let cat = category("logic", &["A"], 1.0);

        let result = engine.aggregate(&scores, &cat).unwrap();
        assert_eq!(result.series.len(), 1);
        assert_eq!(result.series[0].value, 1.0);
    }

    #[test]
    fn mean_runs_over_members_present_at_each_date() {
        let engine = CategoryAggregationEngine::new();
        // B's history starts one quarter later
        let b = CompanyScore {
            company_id: "B".to_string(),
            score_series: vec![TimePoint::new(date(2), 4.0), TimePoint::new(date(3), 6.0)],
            metric_stats: Default::default(),
        };
        let scores = vec![score("A", &[2.0, 2.0, 2.0]), b];
        let cat = category("equipment", &["A", "B"], 1.0);

        let result = engine.aggregate(&scores, &cat).unwrap();
        assert_eq!(result.series[0].value, 2.0); // A only
        assert_eq!(result.series[1].value, 3.0); // (2 + 4) / 2
        assert_eq!(result.series[2].value, 4.0); // (2 + 6) / 2
    }

    #[test]
    fn rising_company_lifts_category_monotonically() {
        // Two companies, one rising and one flat, pre-standardized
        let engine = CategoryAggregationEngine::new();
        let a = score("A", &stats::z_scores(&[50.0, 60.0, 70.0]));
        let b = score("B", &stats::z_scores(&[30.0, 30.0, 30.0]));
        let cat = category("memory", &["A", "B"], 1.0);

        let result = engine.aggregate(&[a, b], &cat).unwrap();
        assert!(result.series[0].value < result.series[1].value);
        assert!(result.series[1].value < result.series[2].value);
    }

    #[test]
    fn composite_sums_categories_over_the_date_union() {
        let engine = CompositeEngine::new();
        let mut short = indicator("memory", &[10.0]);
        short.series[0].date = date(2); // only covers Q2
        let cats = vec![indicator("equipment", &[1.0, 2.0, 3.0]), short];

        let composite = engine.build(&cats).unwrap();
        assert_eq!(composite.points.len(), 3);
        assert_eq!(composite.points[0].score, 1.0);
        assert_eq!(composite.points[1].score, 12.0);
        assert_eq!(composite.points[2].score, 3.0);
    }

    #[test]
    fn momentum_and_acceleration_lead_with_undefined_points() {
        let engine = CompositeEngine::new();
        let composite = engine
            .build(&[indicator("equipment", &[1.0, 3.0, 2.0, 5.0])])
            .unwrap();

        let momentum: Vec<_> = composite.points.iter().map(|p| p.momentum).collect();
        assert_eq!(momentum, vec![None, Some(2.0), Some(-1.0), Some(3.0)]);

        let accel: Vec<_> = composite.points.iter().map(|p| p.acceleration).collect();
        assert_eq!(accel, vec![None, None, Some(-3.0), Some(4.0)]);

        assert_eq!(momentum.iter().flatten().count(), composite.points.len() - 1);
        assert_eq!(accel.iter().flatten().count(), composite.points.len() - 2);
    }

    #[test]
    fn phase_buckets_partition_the_observed_range() {
        // min 0, max 4: bucket width exactly 1
        assert_eq!(classify_phase(0.0, 0.0, 4.0), CyclePhase::Downturn);
        assert_eq!(classify_phase(0.5, 0.0, 4.0), CyclePhase::Downturn);
        // Interior boundaries belong to the lower bucket
        assert_eq!(classify_phase(1.0, 0.0, 4.0), CyclePhase::Downturn);
        assert_eq!(classify_phase(1.5, 0.0, 4.0), CyclePhase::EarlyRecovery);
        assert_eq!(classify_phase(2.0, 0.0, 4.0), CyclePhase::EarlyRecovery);
        assert_eq!(classify_phase(2.5, 0.0, 4.0), CyclePhase::Expansion);
        assert_eq!(classify_phase(3.0, 0.0, 4.0), CyclePhase::Expansion);
        assert_eq!(classify_phase(3.5, 0.0, 4.0), CyclePhase::Peak);
        // The maximum always classifies as Peak
        assert_eq!(classify_phase(4.0, 0.0, 4.0), CyclePhase::Peak);
    }

    #[test]
    fn maximum_score_maps_to_peak_in_a_built_series() {
        let engine = CompositeEngine::new();
        let composite = engine
            .build(&[indicator("equipment", &[-2.0, 0.5, 3.0, 1.0])])
            .unwrap();
        let top = composite
            .points
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap())
            .unwrap();
        assert_eq!(top.phase, CyclePhase::Peak);
        assert_eq!(composite.points[0].phase, CyclePhase::Downturn);
    }

    #[test]
    fn constant_composite_classifies_as_peak() {
        // Zero-width range: every value is the maximum
        let engine = CompositeEngine::new();
        let composite = engine
            .build(&[indicator("equipment", &[1.5, 1.5, 1.5])])
            .unwrap();
        assert!(composite.points.iter().all(|p| p.phase == CyclePhase::Peak));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let engine = CompositeEngine::new();
        let mut cat = indicator("equipment", &[1.0, 2.0]);
        cat.series[1].date = cat.series[0].date;
        let err = engine.build(&[cat]).unwrap_err();
        assert!(matches!(err, CycleError::InvalidSeries(_)));
    }

    #[test]
    fn empty_input_builds_an_empty_indicator() {
        let engine = CompositeEngine::new();
        let composite = engine.build(&[]).unwrap();
        assert!(composite.is_empty());
        assert!(engine.snapshot(&composite).is_none());
    }

    #[test]
    fn summary_covers_the_composite_score_series() {
        let engine = CompositeEngine::new();
        let composite = engine
            .build(&[indicator("equipment", &[1.0, 2.0, 3.0])])
            .unwrap();
        assert_eq!(composite.summary.min, 1.0);
        assert_eq!(composite.summary.max, 3.0);
        assert!((composite.summary.mean - 2.0).abs() < 1e-12);
        assert!((composite.summary.std - 1.0).abs() < 1e-12);
    }

    #[test]
    fn snapshot_reads_the_latest_point() {
        let engine = CompositeEngine::new();
        let composite = engine
            .build(&[indicator("equipment", &[1.0, 2.0, 1.5])])
            .unwrap();
        let snap = engine.snapshot(&composite).unwrap();
        assert_eq!(snap.as_of, date(3));
        assert_eq!(snap.score, 1.5);
        assert_eq!(snap.momentum, Some(-0.5));
    }

    #[test]
    fn volatility_bands_bracket_the_rolling_mean() {
        let engine = CompositeEngine::new();
        let composite = engine
            .build(&[indicator("equipment", &[1.0, 2.0, 3.0, 2.0, 1.0])])
            .unwrap();
        let bands = engine.volatility_bands(&composite, 3);
        assert_eq!(bands.len(), 5);
        // First window holds a single observation: zero width
        assert_eq!(bands[0].upper, bands[0].lower);
        for band in &bands[1..] {
            assert!(band.upper > band.mean);
            assert!(band.lower < band.mean);
        }
    }
}
