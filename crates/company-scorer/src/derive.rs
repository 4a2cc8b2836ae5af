//! Derives the scored metric series from raw quarterly statements.
//!
//! The data-fetch collaborator normally delivers these series already
//! computed; this module exists for callers that hold raw income-statement
//! and balance-sheet rows and want the exact same arithmetic applied.

use std::collections::HashMap;

use cycle_core::{MetricSeries, RawFinancials, TimePoint};

pub const QUARTERLY_REVENUE_GROWTH: &str = "quarterly_revenue_growth";
pub const GROSS_MARGIN: &str = "gross_margin";
pub const OPERATING_MARGIN: &str = "operating_margin";
pub const INVENTORY_TURNOVER: &str = "inventory_turnover";
pub const TTM_REVENUE: &str = "ttm_revenue";
pub const TTM_REVENUE_GROWTH: &str = "ttm_revenue_growth";

/// Compute the per-metric series for one company from its quarterly
/// statement rows.
///
/// - revenue growth: quarter-over-quarter pct-change of revenue x 100,
///   undefined at the first quarter and when the prior revenue is missing
///   or non-positive;
/// - gross margin: gross_profit / revenue x 100 (revenue > 0);
/// - operating margin: operating_income / revenue x 100 (revenue > 0);
/// - inventory turnover: revenue x 4 / inventory, annualized, undefined
///   whenever inventory <= 0;
/// - ttm revenue: rolling 4-quarter revenue sum, plus its year-over-year
///   pct-change x 100.
///
/// Quarters where a metric is undefined are omitted from that metric's
/// series, never emitted as zero. Metrics with no defined quarter at all are
/// absent from the returned map.
pub fn derive_metric_series(financials: &[RawFinancials]) -> HashMap<String, MetricSeries> {
    let mut rows = financials.to_vec();
    rows.sort_by_key(|r| r.date);

    let mut growth = Vec::new();
    let mut gross = Vec::new();
    let mut operating = Vec::new();
    let mut turnover = Vec::new();
    let mut ttm = Vec::new();
    // Row-aligned TTM values for the pct-change below
    let mut ttm_by_row: Vec<Option<f64>> = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        if let Some(revenue) = row.revenue {
            if i > 0 {
                if let Some(prev) = rows[i - 1].revenue {
                    if prev > 0.0 {
                        growth.push(TimePoint::new(row.date, (revenue - prev) / prev * 100.0));
                    }
                }
            }
            if revenue > 0.0 {
                if let Some(gp) = row.gross_profit {
                    gross.push(TimePoint::new(row.date, gp / revenue * 100.0));
                }
                if let Some(oi) = row.operating_income {
                    operating.push(TimePoint::new(row.date, oi / revenue * 100.0));
                }
            }
            match row.inventory {
                Some(inv) if inv > 0.0 => {
                    turnover.push(TimePoint::new(row.date, revenue * 4.0 / inv));
                }
                _ => {}
            }
        }

        // Trailing twelve months needs 4 consecutive quarters of revenue
        let window_sum = if i >= 3 {
            rows[i - 3..=i]
                .iter()
                .map(|r| r.revenue)
                .collect::<Option<Vec<f64>>>()
                .map(|vs| vs.iter().sum::<f64>())
        } else {
            None
        };
        if let Some(sum) = window_sum {
            ttm.push(TimePoint::new(row.date, sum));
        }
        ttm_by_row.push(window_sum);
    }

    let ttm_growth: Vec<TimePoint> = (4..rows.len())
        .filter_map(|i| match (ttm_by_row[i], ttm_by_row[i - 4]) {
            (Some(cur), Some(prior)) if prior > 0.0 => {
                Some(TimePoint::new(rows[i].date, (cur - prior) / prior * 100.0))
            }
            _ => None,
        })
        .collect();

    let mut out = HashMap::new();
    for (name, points) in [
        (QUARTERLY_REVENUE_GROWTH, growth),
        (GROSS_MARGIN, gross),
        (OPERATING_MARGIN, operating),
        (INVENTORY_TURNOVER, turnover),
        (TTM_REVENUE, ttm),
        (TTM_REVENUE_GROWTH, ttm_growth),
    ] {
        if !points.is_empty() {
            out.insert(name.to_string(), MetricSeries::new(points));
        }
    }
    out
}
