use crate::config::{validate_top_markets, Filters};
use crate::dataset::Dataset;
use crate::error::DashboardError;
use crate::types::{
    Axes, Dashboard, LineChart, Metrics, PieChart, PieSlice, Round, RoundBar, RoundHistogram,
    ScatterChart, ScatterPoint, StatusBar, StatusHistogram, TrendLine, YearPoint,
};
use crate::util::{cmp_year, round_half_even};
use std::collections::{BTreeMap, HashMap, HashSet};

const BILLION: f64 = 1e9;
/// Companies raising this many billions or more are left off the scatter.
const SCATTER_MAX_FUNDING_BILLIONS: f64 = 30.0;

pub fn total_companies(data: &Dataset) -> usize {
    data.records()
        .iter()
        .map(|r| r.name.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Sum of every round column over every row, rounded half to even.
pub fn total_investments(data: &Dataset) -> i64 {
    // Per-column sums first, then the grand total.
    let per_round: Vec<f64> = Round::ALL
        .iter()
        .map(|round| data.records().iter().map(|r| r.round(*round)).sum())
        .collect();
    round_half_even(per_round.iter().sum())
}

/// Exact sum of `funding_total_usd`. Saturates instead of overflowing.
pub fn total_funding(data: &Dataset) -> u128 {
    data.records()
        .iter()
        .fold(0u128, |acc, r| acc.saturating_add(r.funding_total_usd))
}

pub fn metrics(data: &Dataset) -> Metrics {
    Metrics {
        total_companies: total_companies(data),
        total_investments: total_investments(data),
        total_funding: total_funding(data),
    }
}

/// The `n` most frequent markets. Equal counts are ordered by market name.
pub fn top_markets(data: &Dataset, n: usize) -> Result<PieChart, DashboardError> {
    let n = validate_top_markets(n)?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in data.records() {
        *counts.entry(r.market.as_str()).or_default() += 1;
    }
    // Most frequent first, ties by name
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let slices = ranked
        .into_iter()
        .take(n)
        .map(|(label, count)| PieSlice {
            label: label.to_string(),
            count,
        })
        .collect();
    Ok(PieChart {
        title: format!("Top {} most expensive markets", n),
        slices,
    })
}

/// Row counts for the allowed statuses, smallest bar first.
///
/// Allowed statuses with no rows get no bar.
pub fn status_histogram<S: AsRef<str>>(data: &Dataset, allow: &[S]) -> StatusHistogram {
    let allow: HashSet<&str> = allow.iter().map(|s| s.as_ref()).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in data.records() {
        if allow.contains(r.status.as_str()) {
            *counts.entry(r.status.as_str()).or_default() += 1;
        }
    }
    let mut bars: Vec<StatusBar> = counts
        .into_iter()
        .map(|(status, count)| StatusBar {
            status: status.to_string(),
            count,
        })
        .collect();
    // Smallest first, ties by name
    bars.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.status.cmp(&b.status)));
    StatusHistogram {
        title: "Startups status",
        axes: Axes {
            x: "Status",
            y: "Count",
        },
        bars,
    }
}

/// Total invested per selected round, in the order the rounds were given.
pub fn rounds_histogram(data: &Dataset, select: &[Round]) -> RoundHistogram {
    let bars = select
        .iter()
        .map(|round| RoundBar {
            round: *round,
            investments: data.records().iter().map(|r| r.round(*round)).sum(),
        })
        .collect();
    RoundHistogram {
        title: "Investments in Round",
        axes: Axes {
            x: "Rounds",
            y: "Investments",
        },
        bars,
    }
}

/// Funding per founding year in billions of USD. Only years present in the
/// data appear.
pub fn funding_by_year(data: &Dataset) -> LineChart {
    let mut by_year: BTreeMap<&str, u128> = BTreeMap::new();
    for r in data.records() {
        let total = by_year.entry(r.founded_year.as_str()).or_default();
        *total = total.saturating_add(r.funding_total_usd);
    }
    // Keys are strings, so re-sort numerically.
    let mut points: Vec<YearPoint> = by_year
        .into_iter()
        .map(|(year, total)| YearPoint {
            year: year.to_string(),
            billions: total as f64 / BILLION,
        })
        .collect();
    points.sort_by(|a, b| cmp_year(&a.year, &b.year));
    LineChart {
        title: "Funding required each year",
        axes: Axes {
            x: "Year",
            y: "Funding in $ billions",
        },
        points,
    }
}

/// Debt financing against total funding for companies that took on debt,
/// with an OLS trend line.
pub fn debt_funding_scatter(data: &Dataset) -> ScatterChart {
    let points: Vec<ScatterPoint> = data
        .records()
        .iter()
        // Only debt-financed companies, without the outliers
        .filter(|r| {
            r.debt_financing > 0.0
                && (r.funding_total_usd as f64 / BILLION) < SCATTER_MAX_FUNDING_BILLIONS
        })
        .map(|r| ScatterPoint {
            name: r.name.clone(),
            funding_total_usd: r.funding_total_usd as f64,
            debt_financing: r.debt_financing,
        })
        .collect();
    let xy: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.funding_total_usd, p.debt_financing))
        .collect();
    ScatterChart {
        title: "Correlation between debt financing and startup funding",
        axes: Axes {
            x: "Total Funding in USD",
            y: "Debt Financing",
        },
        trend: ols(&xy),
        points,
    }
}

/// Ordinary least squares over `(x, y)` pairs.
///
/// `None` with fewer than two points or when every `x` is the same.
pub fn ols(points: &[(f64, f64)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    // A flat y series is fit exactly by the horizontal line.
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };
    Some(TrendLine {
        slope,
        intercept,
        r_squared,
    })
}

/// Every metric and chart for one set of filters.
pub fn build_dashboard(data: &Dataset, filters: &Filters) -> Result<Dashboard, DashboardError> {
    Ok(Dashboard {
        metrics: metrics(data),
        top_markets: top_markets(data, filters.top_markets())?,
        rounds: rounds_histogram(data, filters.rounds()),
        funding_by_year: funding_by_year(data),
        status: status_histogram(data, filters.statuses()),
        debt_vs_funding: debt_funding_scatter(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CleanReport;
    use crate::types::StartupRecord;

    fn record(name: &str) -> StartupRecord {
        StartupRecord {
            name: name.to_string(),
            market: "Software".to_string(),
            status: "operating".to_string(),
            city: "Berlin".to_string(),
            founded_at: "2010-01-01".to_string(),
            founded_year: "2010".to_string(),
            first_funding_at: "2011-01-01".to_string(),
            last_funding_at: "2012-01-01".to_string(),
            funding_total_usd: 1_000,
            debt_financing: 0.0,
            rounds: [0.0; 8],
            country: "Germany".to_string(),
            extras: Vec::new(),
        }
    }

    fn dataset(records: Vec<StartupRecord>) -> Dataset {
        Dataset {
            columns: Vec::new(),
            extra_columns: Vec::new(),
            report: CleanReport::default(),
            records,
        }
    }

    #[test]
    fn total_investments_sums_all_rounds() {
        let mut a = record("a");
        a.rounds[0] = 100.0;
        let mut b = record("b");
        b.rounds[0] = 50.0;
        let mut c = record("c");
        c.rounds[1] = 200.0;
        assert_eq!(total_investments(&dataset(vec![a, b, c])), 350);
    }

    #[test]
    fn total_companies_counts_distinct_names() {
        let data = dataset(vec![record("a"), record("a"), record("b")]);
        assert_eq!(total_companies(&data), 2);
        assert_eq!(total_funding(&data), 3_000);
    }

    #[test]
    fn funding_sums_past_u64_range() {
        let mut a = record("a");
        a.funding_total_usd = 10_000_000_000_000_000_000_000;
        let b = StartupRecord {
            name: "b".into(),
            ..a.clone()
        };
        let data = dataset(vec![a, b]);
        assert_eq!(total_funding(&data), 20_000_000_000_000_000_000_000);
        assert_eq!(metrics(&data).total_funding, 20_000_000_000_000_000_000_000);
        let line = funding_by_year(&data);
        assert_eq!(line.points.len(), 1);
        assert!((line.points[0].billions - 2e13).abs() < 1.0);
    }

    #[test]
    fn top_markets_breaks_ties_by_name() {
        let mut records = Vec::new();
        for (market, n) in [("Software", 5), ("Fintech", 3), ("Biotech", 3)] {
            for i in 0..n {
                let mut r = record(&format!("{market}{i}"));
                r.market = market.to_string();
                records.push(r);
            }
        }
        let data = dataset(records);
        let pie = top_markets(&data, 2).unwrap();
        assert_eq!(pie.title, "Top 2 most expensive markets");
        assert_eq!(
            pie.slices,
            vec![
                PieSlice { label: "Software".into(), count: 5 },
                PieSlice { label: "Biotech".into(), count: 3 },
            ]
        );
        assert_eq!(top_markets(&data, 2).unwrap(), pie);
    }

    #[test]
    fn top_markets_rejects_out_of_range() {
        let data = dataset(vec![record("a")]);
        assert!(matches!(
            top_markets(&data, 31),
            Err(DashboardError::MarketCountOutOfRange { n: 31 })
        ));
    }

    #[test]
    fn status_histogram_filters_and_orders_ascending() {
        let mut records = Vec::new();
        for (status, n) in [("operating", 3), ("acquired", 1), ("closed", 2)] {
            for i in 0..n {
                let mut r = record(&format!("{status}{i}"));
                r.status = status.to_string();
                records.push(r);
            }
        }
        let hist = status_histogram(&dataset(records), &["acquired", "operating", "ipo"]);
        let bars: Vec<(&str, usize)> = hist.bars.iter().map(|b| (b.status.as_str(), b.count)).collect();
        assert_eq!(bars, vec![("acquired", 1), ("operating", 3)]);
    }

    #[test]
    fn rounds_histogram_keeps_caller_order() {
        let mut a = record("a");
        a.rounds = [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 8.0];
        let mut b = record("b");
        b.rounds = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0];
        let hist = rounds_histogram(&dataset(vec![a, b]), &[Round::H, Round::A]);
        assert_eq!(
            hist.bars,
            vec![
                RoundBar { round: Round::H, investments: 10.0 },
                RoundBar { round: Round::A, investments: 2.0 },
            ]
        );
    }

    #[test]
    fn funding_by_year_in_billions() {
        let mut r = record("a");
        r.funding_total_usd = 2_000_000_000;
        let line = funding_by_year(&dataset(vec![r]));
        assert_eq!(line.points, vec![YearPoint { year: "2010".into(), billions: 2.0 }]);
    }

    #[test]
    fn funding_by_year_sorted_without_gap_filling() {
        let mut a = record("a");
        a.founded_year = "2012".into();
        let mut b = record("b");
        b.founded_year = "1999".into();
        let mut c = record("c");
        c.founded_year = "2012".into();
        let line = funding_by_year(&dataset(vec![a, b, c]));
        let years: Vec<&str> = line.points.iter().map(|p| p.year.as_str()).collect();
        assert_eq!(years, vec!["1999", "2012"]);
        assert_eq!(line.points[1].billions, 2_000.0 / 1e9);
    }

    #[test]
    fn scatter_excludes_no_debt_and_outliers() {
        let mut no_debt = record("no_debt");
        no_debt.funding_total_usd = 5_000;
        let mut outlier = record("outlier");
        outlier.funding_total_usd = 31_000_000_000;
        outlier.debt_financing = 1_000.0;
        let mut kept = record("kept");
        kept.debt_financing = 10.0;
        let scatter = debt_funding_scatter(&dataset(vec![no_debt, outlier, kept]));
        assert_eq!(scatter.points.len(), 1);
        assert_eq!(scatter.points[0].name, "kept");
        assert!(scatter.trend.is_none());
    }

    #[test]
    fn ols_fits_a_line() {
        let fit = ols(&[(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(ols(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
    }

    #[test]
    fn build_dashboard_uses_filters() {
        let data = dataset(vec![record("a"), record("b")]);
        let filters = Filters::new(3).unwrap().with_rounds(vec![Round::B]);
        let dash = build_dashboard(&data, &filters).unwrap();
        assert_eq!(dash.metrics.total_companies, 2);
        assert_eq!(dash.rounds.bars.len(), 1);
        assert_eq!(dash.status.bars[0].count, 2);
    }
}
