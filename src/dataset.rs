use serde::Serialize;

use crate::types::{Round, StartupRecord};

pub const TEXT_COLUMNS: [&str; 7] = [
    "name",
    "market",
    "status",
    "city",
    "founded_at",
    "first_funding_at",
    "last_funding_at",
];
pub const FOUNDED_YEAR: &str = "founded_year";
pub const FUNDING_TOTAL_USD: &str = "funding_total_usd";
pub const DEBT_FINANCING: &str = "debt_financing";
pub const COUNTRY_CODE: &str = "country_code";
pub const COUNTRY: &str = "country";

/// A column of the cleaned table, resolved once from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Text(usize),
    FoundedYear,
    FundingTotalUsd,
    DebtFinancing,
    Round(Round),
    Country,
    Extra(usize),
}

/// Row counts at each cleaning stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub input_rows: usize,
    pub zero_funding: usize,
    pub incomplete: usize,
    pub duplicates: usize,
    pub unknown_country: usize,
    pub kept: usize,
}

/// The cleaned, immutable table every report reads from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub(crate) columns: Vec<String>,
    pub(crate) extra_columns: Vec<String>,
    pub(crate) records: Vec<StartupRecord>,
    pub(crate) report: CleanReport,
}

impl Dataset {
    pub fn records(&self) -> &[StartupRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names in table order; `country` takes the place of the dropped
    /// `country_code` at the end.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn report(&self) -> &CleanReport {
        &self.report
    }

    pub fn resolve(&self, name: &str) -> Option<Column> {
        if !self.columns.iter().any(|c| c == name) {
            return None;
        }
        if let Some(i) = TEXT_COLUMNS.iter().position(|c| *c == name) {
            return Some(Column::Text(i));
        }
        match name {
            FOUNDED_YEAR => Some(Column::FoundedYear),
            FUNDING_TOTAL_USD => Some(Column::FundingTotalUsd),
            DEBT_FINANCING => Some(Column::DebtFinancing),
            COUNTRY => Some(Column::Country),
            _ => match Round::ALL.into_iter().find(|r| r.column() == name) {
                Some(r) => Some(Column::Round(r)),
                None => self
                    .extra_columns
                    .iter()
                    .position(|c| c == name)
                    .map(Column::Extra),
            },
        }
    }

    /// Render one cell as text, the way it is shown and exported.
    pub fn value(record: &StartupRecord, column: Column) -> String {
        match column {
            Column::Text(i) => match i {
                0 => record.name.clone(),
                1 => record.market.clone(),
                2 => record.status.clone(),
                3 => record.city.clone(),
                4 => record.founded_at.clone(),
                5 => record.first_funding_at.clone(),
                _ => record.last_funding_at.clone(),
            },
            Column::FoundedYear => record.founded_year.clone(),
            Column::FundingTotalUsd => record.funding_total_usd.to_string(),
            Column::DebtFinancing => record.debt_financing.to_string(),
            Column::Round(r) => record.round(r).to_string(),
            Column::Country => record.country.clone(),
            Column::Extra(i) => record.extras.get(i).cloned().unwrap_or_default(),
        }
    }
}
