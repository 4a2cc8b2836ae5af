//! Default semiconductor configuration: the metric catalog, the category
//! map, and the named historical boom/bust windows. All static reference
//! data — supplied to the engine, never derived by it.

use chrono::NaiveDate;

use company_scorer::derive::{
    GROSS_MARGIN, INVENTORY_TURNOVER, OPERATING_MARGIN, QUARTERLY_REVENUE_GROWTH,
};
use cycle_core::{
    CategoryDefinition, CycleSensitivity, CycleTiming, HistoricalCycle, MetricDefinition,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("static date literal")
}

/// The four scoring metrics with their cycle-relevance metadata
pub fn default_metrics() -> Vec<MetricDefinition> {
    vec![
        MetricDefinition {
            name: QUARTERLY_REVENUE_GROWTH.to_string(),
            weight: 0.25,
            higher_is_better: true,
            typical_range: (-15.0, 25.0),
            timing: CycleTiming::Leading,
            description: "QoQ revenue growth".to_string(),
        },
        MetricDefinition {
            name: GROSS_MARGIN.to_string(),
            weight: 0.25,
            higher_is_better: true,
            typical_range: (30.0, 65.0),
            timing: CycleTiming::Coincident,
            description: "Gross profit margin".to_string(),
        },
        MetricDefinition {
            name: INVENTORY_TURNOVER.to_string(),
            weight: 0.25,
            higher_is_better: true,
            typical_range: (3.0, 8.0),
            timing: CycleTiming::Leading,
            description: "Revenue/Inventory (annualized)".to_string(),
        },
        MetricDefinition {
            name: OPERATING_MARGIN.to_string(),
            weight: 0.25,
            higher_is_better: true,
            typical_range: (15.0, 45.0),
            timing: CycleTiming::Coincident,
            description: "Operating profit margin".to_string(),
        },
    ]
}

fn category(
    name: &str,
    members: &[&str],
    weight: f64,
    sensitivity: CycleSensitivity,
    notes: &str,
) -> CategoryDefinition {
    CategoryDefinition {
        name: name.to_string(),
        members: members.iter().map(|m| m.to_string()).collect(),
        weight,
        sensitivity,
        notes: Some(notes.to_string()),
    }
}

/// Industry sub-segments and their member tickers. Weights are contribution
/// scalars, not shares of a normalized average, so they need not sum to 1.
pub fn default_categories() -> Vec<CategoryDefinition> {
    vec![
        category(
            "equipment",
            &[
                "ASML", "AMAT", "LRCX", "KLAC", "TER", "TOELY", "ACLS", "CCMP", "UCTT", "MKSI",
            ],
            0.30,
            CycleSensitivity::VeryHigh,
            "First to show cycle turns, high operating leverage",
        ),
        category(
            "foundry",
            &["TSM", "UMC", "GWGRF", "SUMCF", "SIMO", "SILC", "VSH", "OIIM"],
            0.25,
            CycleSensitivity::High,
            "Capex driven, capacity indicates cycle",
        ),
        category(
            "memory",
            &["MU", "WDC", "STX", "SSNLF", "KIOXF", "NTDOF"],
            0.25,
            CycleSensitivity::VeryHigh,
            "Most volatile, pricing sensitivity",
        ),
        category(
            "logic",
            &[
                "NVDA", "AMD", "INTC", "QCOM", "AVGO", "MRVL", "ADI", "TXN", "NXPI", "ON",
            ],
            0.20,
            CycleSensitivity::Medium,
            "More stable margins, end-market diversity",
        ),
        category(
            "specialized",
            &["SWKS", "QRVO", "MPWR", "WOLF", "DIOD", "POWI", "SITM", "AMBA"],
            0.10,
            CycleSensitivity::MediumHigh,
            "Niche markets, specialized applications",
        ),
    ]
}

fn cycle(
    label: &str,
    boom: (NaiveDate, NaiveDate),
    bust: (NaiveDate, NaiveDate),
    notes: &str,
    boom_drivers: &[&str],
    bust_drivers: &[&str],
) -> HistoricalCycle {
    HistoricalCycle {
        label: label.to_string(),
        boom,
        bust,
        notes: notes.to_string(),
        boom_drivers: boom_drivers.iter().map(|d| d.to_string()).collect(),
        bust_drivers: bust_drivers.iter().map(|d| d.to_string()).collect(),
    }
}

/// Named boom/bust reference windows for overlaying past cycles
pub fn historical_cycles() -> Vec<HistoricalCycle> {
    vec![
        cycle(
            "1990s",
            (date(1993, 1, 1), date(1995, 12, 31)),
            (date(1996, 1, 1), date(1998, 12, 31)),
            "PC-driven cycle",
            &["Mass PC adoption", "Windows 95 launch", "Corporate PC refresh"],
            &[
                "Manufacturing overcapacity",
                "Asian financial crisis",
                "Inventory correction",
            ],
        ),
        cycle(
            "dotcom",
            (date(1999, 1, 1), date(2000, 12, 31)),
            (date(2001, 1, 1), date(2002, 12, 31)),
            "Internet bubble",
            &[
                "Internet infrastructure buildout",
                "Y2K spending surge",
                "Telecom expansion",
            ],
            &[
                "Dot-com bubble burst",
                "Telecom crash",
                "Enterprise spending freeze",
            ],
        ),
        cycle(
            "2006-2009",
            (date(2006, 1, 1), date(2007, 12, 31)),
            (date(2008, 1, 1), date(2009, 12, 31)),
            "Financial crisis",
            &[
                "Mobile phone growth",
                "Early smartphone era",
                "Gaming console cycle",
            ],
            &[
                "Global financial crisis",
                "Consumer spending drop",
                "Credit market freeze",
            ],
        ),
        cycle(
            "2016-2019",
            (date(2016, 1, 1), date(2018, 12, 31)),
            (date(2019, 1, 1), date(2019, 12, 31)),
            "Memory-led cycle",
            &[
                "Data center expansion",
                "Memory price increases",
                "Crypto mining demand",
            ],
            &[
                "Memory oversupply",
                "Trade tensions",
                "Inventory correction",
            ],
        ),
        cycle(
            "2020-2023",
            (date(2020, 3, 1), date(2022, 9, 30)),
            (date(2022, 10, 1), date(2023, 12, 31)),
            "Post-COVID super cycle",
            &[
                "Work-from-home demand",
                "Supply chain shortages",
                "Cloud/AI expansion",
            ],
            &[
                "PC/smartphone slowdown",
                "Inventory digestion",
                "Consumer weakness",
            ],
        ),
    ]
}
