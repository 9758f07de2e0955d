// Dashboard configuration and the validated sidebar filters.
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::DashboardError;
use crate::types::Round;

pub const MIN_TOP_MARKETS: usize = 2;
pub const MAX_TOP_MARKETS: usize = 30;

pub const DEFAULT_DATA_PATH: &str = "investments_VC.csv";
pub const DEFAULT_STATUSES: [&str; 2] = ["acquired", "operating"];
pub const DEFAULT_TABLE_COLUMNS: [&str; 8] = [
    "name",
    "market",
    "funding_total_usd",
    "status",
    "city",
    "founded_at",
    "first_funding_at",
    "last_funding_at",
];

/// What to do with a row whose country code is not a known alpha-3 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CountryPolicy {
    /// Exclude the row from the cleaned dataset.
    #[default]
    DropRow,
    /// Keep the row with the country set to [`UNKNOWN_COUNTRY`].
    Unknown,
}

pub const UNKNOWN_COUNTRY: &str = "Unknown";

impl FromStr for CountryPolicy {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(CountryPolicy::DropRow),
            "unknown" => Ok(CountryPolicy::Unknown),
            _ => Err(DashboardError::UnknownCountryPolicy {
                name: s.to_string(),
            }),
        }
    }
}

/// User-facing filter selections for one render.
///
/// Construct via [`Filters::new`] (validates the market count), then chain
/// `with_*` methods to override the defaults.
///
/// # Defaults
///
/// | Field         | Default                    |
/// |---------------|----------------------------|
/// | `top_markets` | 5                          |
/// | `rounds`      | `round_A` .. `round_H`     |
/// | `statuses`    | `acquired`, `operating`    |
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    pub(crate) top_markets: usize,
    pub(crate) rounds: Vec<Round>,
    pub(crate) statuses: Vec<String>,
}

impl Filters {
    /// # Errors
    ///
    /// [`DashboardError::MarketCountOutOfRange`] when `top_markets` is outside `2..=30`.
    pub fn new(top_markets: usize) -> Result<Self, DashboardError> {
        Ok(Self {
            top_markets: validate_top_markets(top_markets)?,
            rounds: Round::ALL.to_vec(),
            statuses: DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[must_use]
    pub fn with_rounds(mut self, rounds: Vec<Round>) -> Self {
        self.rounds = rounds;
        self
    }

    #[must_use]
    pub fn with_statuses(mut self, statuses: Vec<String>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn top_markets(&self) -> usize {
        self.top_markets
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            top_markets: 5,
            rounds: Round::ALL.to_vec(),
            statuses: DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub(crate) fn validate_top_markets(n: usize) -> Result<usize, DashboardError> {
    if (MIN_TOP_MARKETS..=MAX_TOP_MARKETS).contains(&n) {
        Ok(n)
    } else {
        Err(DashboardError::MarketCountOutOfRange { n })
    }
}

/// Process-level settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub country_policy: CountryPolicy,
    pub filters: Filters,
    pub table_columns: Vec<String>,
    pub search: Option<String>,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            country_policy: CountryPolicy::default(),
            filters: Filters::default(),
            table_columns: DEFAULT_TABLE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            search: None,
            preview_rows: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_count_bounds() {
        assert!(Filters::new(2).is_ok());
        assert!(Filters::new(30).is_ok());
        assert!(matches!(
            Filters::new(1),
            Err(DashboardError::MarketCountOutOfRange { n: 1 })
        ));
        assert!(Filters::new(31).is_err());
    }

    #[test]
    fn defaults_match_sidebar() {
        let f = Filters::default();
        assert_eq!(f.top_markets(), 5);
        assert_eq!(f.rounds().len(), 8);
        assert_eq!(f.statuses(), ["acquired", "operating"]);
    }

    #[test]
    fn country_policy_parses() {
        assert_eq!("drop".parse::<CountryPolicy>().unwrap(), CountryPolicy::DropRow);
        assert_eq!("Unknown".parse::<CountryPolicy>().unwrap(), CountryPolicy::Unknown);
        assert!("raise".parse::<CountryPolicy>().is_err());
    }
}
