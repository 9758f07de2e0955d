use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

use crate::error::DashboardError;

/// Outcome of coercing one raw cell into a typed value.
///
/// `Unparseable` and `Missing` are both "not usable": the null-drop step
/// removes a row holding either, so a value that failed to parse ends up on
/// the same removal path as a genuinely empty cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<T> {
    Parsed(T),
    Unparseable(String),
    Missing,
}

impl<T> Coerced<T> {
    pub fn usable(self) -> Option<T> {
        match self {
            Coerced::Parsed(v) => Some(v),
            Coerced::Unparseable(_) | Coerced::Missing => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Coerced::Parsed(_))
    }
}

/// One of the eight named funding-round columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Round {
    #[serde(rename = "round_A")]
    A,
    #[serde(rename = "round_B")]
    B,
    #[serde(rename = "round_C")]
    C,
    #[serde(rename = "round_D")]
    D,
    #[serde(rename = "round_E")]
    E,
    #[serde(rename = "round_F")]
    F,
    #[serde(rename = "round_G")]
    G,
    #[serde(rename = "round_H")]
    H,
}

impl Round {
    pub const ALL: [Round; 8] = [
        Round::A,
        Round::B,
        Round::C,
        Round::D,
        Round::E,
        Round::F,
        Round::G,
        Round::H,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Round::A => "round_A",
            Round::B => "round_B",
            Round::C => "round_C",
            Round::D => "round_D",
            Round::E => "round_E",
            Round::F => "round_F",
            Round::G => "round_G",
            Round::H => "round_H",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Round {
    type Err = DashboardError;

    /// Accepts the column name (`round_C`) or the bare stage letter (`C`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let letter = s.strip_prefix("round_").unwrap_or(s);
        Round::ALL
            .into_iter()
            .find(|r| r.column()[6..].eq_ignore_ascii_case(letter))
            .ok_or_else(|| DashboardError::UnknownRound {
                name: s.to_string(),
            })
    }
}

/// A row of the cleaned dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupRecord {
    pub name: String,
    pub market: String,
    pub status: String,
    pub city: String,
    pub founded_at: String,
    /// Canonical integer string, e.g. `"2007"`.
    pub founded_year: String,
    pub first_funding_at: String,
    pub last_funding_at: String,
    pub funding_total_usd: u128,
    pub debt_financing: f64,
    pub rounds: [f64; 8],
    pub country: String,
    /// Values of the non-core columns, aligned with `Dataset::extra_columns`.
    pub extras: Vec<String>,
}

impl StartupRecord {
    pub fn round(&self, round: Round) -> f64 {
        self.rounds[round.index()]
    }
}

// Report rows. Each is serializable for JSON/CSV export and `Tabled` for
// the console preview.

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct PieSlice {
    #[serde(rename = "Market")]
    #[tabled(rename = "Market")]
    pub label: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StatusBar {
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RoundBar {
    #[serde(rename = "Rounds")]
    #[tabled(rename = "Rounds")]
    pub round: Round,
    #[serde(rename = "Investments")]
    #[tabled(rename = "Investments")]
    pub investments: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct YearPoint {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: String,
    #[serde(rename = "FundingBillions")]
    #[tabled(rename = "Funding in $ billions")]
    pub billions: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ScatterPoint {
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "FundingTotalUsd")]
    #[tabled(rename = "Total Funding in USD")]
    pub funding_total_usd: f64,
    #[serde(rename = "DebtFinancing")]
    #[tabled(rename = "Debt Financing")]
    pub debt_financing: f64,
}

/// Ordinary-least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Axes {
    pub x: &'static str,
    pub y: &'static str,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StatusHistogram {
    pub title: &'static str,
    pub axes: Axes,
    pub bars: Vec<StatusBar>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RoundHistogram {
    pub title: &'static str,
    pub axes: Axes,
    pub bars: Vec<RoundBar>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LineChart {
    pub title: &'static str,
    pub axes: Axes,
    pub points: Vec<YearPoint>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: &'static str,
    pub axes: Axes,
    pub points: Vec<ScatterPoint>,
    pub trend: Option<TrendLine>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Metrics {
    pub total_companies: usize,
    pub total_investments: i64,
    pub total_funding: u128,
}

/// Everything the presentation layer draws for one set of filters.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Dashboard {
    pub metrics: Metrics,
    pub top_markets: PieChart,
    pub rounds: RoundHistogram,
    pub funding_by_year: LineChart,
    pub status: StatusHistogram,
    pub debt_vs_funding: ScatterChart,
}
