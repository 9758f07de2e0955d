// Normalization pipeline: raw table in, immutable `Dataset` out.
//
// Stage order matters. Renames and drops run first so the coercion steps can
// find their columns by canonical name, the zero-funding filter runs before
// the null drop, and duplicates are removed before the country is derived.
use crate::config::{CountryPolicy, UNKNOWN_COUNTRY};
use crate::country::code_to_country;
use crate::dataset::{
    CleanReport, Dataset, COUNTRY, COUNTRY_CODE, DEBT_FINANCING, FOUNDED_YEAR, FUNDING_TOTAL_USD,
    TEXT_COLUMNS,
};
use crate::error::DashboardError;
use crate::loader::RawTable;
use crate::types::{Coerced, Round, StartupRecord};
use crate::util::{float_to_str, parse_f64_safe, str_to_int};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Columns with no use in any report.
pub const DROPPED_COLUMNS: [&str; 4] = ["state_code", "permalink", "homepage_url", "category_list"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountrySource {
    Code(usize),
    /// An already-cleaned table carries the derived name instead of the code.
    Name(usize),
}

/// Column positions of everything the pipeline reads.
struct Layout {
    text: [usize; 7],
    founded_year: usize,
    funding: usize,
    debt: usize,
    rounds: [usize; 8],
    country: CountrySource,
    extras: Vec<usize>,
}

impl Layout {
    fn resolve(table: &RawTable) -> Result<Self, DashboardError> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| DashboardError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let mut text = [0usize; 7];
        for (slot, name) in text.iter_mut().zip(TEXT_COLUMNS) {
            *slot = find(name)?;
        }
        let mut rounds = [0usize; 8];
        for (slot, round) in rounds.iter_mut().zip(Round::ALL) {
            *slot = find(round.column())?;
        }
        let country = match (table.column_index(COUNTRY_CODE), table.column_index(COUNTRY)) {
            (Some(i), _) => CountrySource::Code(i),
            (None, Some(i)) => CountrySource::Name(i),
            (None, None) => {
                return Err(DashboardError::MissingColumn {
                    column: COUNTRY_CODE.to_string(),
                })
            }
        };

        let mut layout = Layout {
            text,
            founded_year: find(FOUNDED_YEAR)?,
            funding: find(FUNDING_TOTAL_USD)?,
            debt: find(DEBT_FINANCING)?,
            rounds,
            country,
            extras: Vec::new(),
        };
        let extras = (0..table.headers.len())
            .filter(|i| !layout.is_known(table, *i))
            .collect();
        layout.extras = extras;
        Ok(layout)
    }

    fn is_known(&self, table: &RawTable, i: usize) -> bool {
        let name = table.headers[i].as_str();
        self.text.contains(&i)
            || self.rounds.contains(&i)
            || [self.founded_year, self.funding, self.debt].contains(&i)
            || name == COUNTRY_CODE
            || name == COUNTRY
    }

    /// Coerce one raw row. Nothing fails here; bad values are carried as
    /// `Unparseable` for the null drop to remove.
    fn stage(&self, row: &[Option<String>]) -> StagedRow {
        let cell = |i: usize| row.get(i).and_then(|c| c.as_deref());
        let country_idx = match self.country {
            CountrySource::Code(i) | CountrySource::Name(i) => i,
        };
        StagedRow {
            text: self.text.map(|i| cell(i).map(str::to_string)),
            founded_year: float_to_str(cell(self.founded_year)),
            funding: str_to_int(cell(self.funding)),
            debt: parse_f64_safe(cell(self.debt)),
            rounds: self.rounds.map(|i| parse_f64_safe(cell(i))),
            country: cell(country_idx).map(str::to_string),
            extras: self
                .extras
                .iter()
                .map(|i| cell(*i).map(str::to_string))
                .collect(),
        }
    }
}

struct StagedRow {
    text: [Option<String>; 7],
    founded_year: Coerced<String>,
    funding: Coerced<u128>,
    debt: Coerced<f64>,
    rounds: [Coerced<f64>; 8],
    country: Option<String>,
    extras: Vec<Option<String>>,
}

impl StagedRow {
    fn has_zero_funding(&self) -> bool {
        matches!(self.funding, Coerced::Parsed(0))
    }

    /// `None` when any value is missing or failed to parse.
    fn complete(self) -> Option<CompleteRow> {
        let mut text: [String; 7] = Default::default();
        for (slot, cell) in text.iter_mut().zip(self.text) {
            *slot = cell?;
        }
        let mut rounds = [0.0f64; 8];
        for (slot, cell) in rounds.iter_mut().zip(self.rounds) {
            *slot = cell.usable()?;
        }
        let extras = self.extras.into_iter().collect::<Option<Vec<String>>>()?;
        Some(CompleteRow {
            text,
            founded_year: self.founded_year.usable()?,
            funding: self.funding.usable()?,
            debt: self.debt.usable()?,
            rounds,
            country: self.country?,
            extras,
        })
    }
}

struct CompleteRow {
    text: [String; 7],
    founded_year: String,
    funding: u128,
    debt: f64,
    rounds: [f64; 8],
    country: String,
    extras: Vec<String>,
}

/// Full-row equality key. Floats compare by value, with `-0.0 == 0.0`.
#[derive(PartialEq, Eq, Hash)]
struct RowKey<'a> {
    text: &'a [String; 7],
    founded_year: &'a str,
    funding: u128,
    debt: u64,
    rounds: [u64; 8],
    country: &'a str,
    extras: &'a [String],
}

fn float_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl CompleteRow {
    fn key(&self) -> RowKey<'_> {
        RowKey {
            text: &self.text,
            founded_year: &self.founded_year,
            funding: self.funding,
            debt: float_bits(self.debt),
            rounds: self.rounds.map(float_bits),
            country: &self.country,
            extras: &self.extras,
        }
    }

    fn into_record(self, country: String) -> StartupRecord {
        let [name, market, status, city, founded_at, first_funding_at, last_funding_at] =
            self.text;
        StartupRecord {
            name,
            market,
            status,
            city,
            founded_at,
            founded_year: self.founded_year,
            first_funding_at,
            last_funding_at,
            funding_total_usd: self.funding,
            debt_financing: self.debt,
            rounds: self.rounds,
            country,
            extras: self.extras,
        }
    }
}

/// Run the whole normalization pipeline.
///
/// # Errors
///
/// [`DashboardError::MissingColumn`] when a required column is absent after
/// renaming. Bad cells never fail; their rows are dropped.
#[instrument(skip_all, fields(rows = raw.rows.len()))]
pub fn clean(raw: RawTable, policy: CountryPolicy) -> Result<Dataset, DashboardError> {
    // Trim header names, then drop the link and category columns.
    let table = raw.rename_trimmed().drop_columns(&DROPPED_COLUMNS);
    let layout = Layout::resolve(&table)?;
    let mut report = CleanReport {
        input_rows: table.rows.len(),
        ..CleanReport::default()
    };

    // Coerce funding, founding year and the numeric columns.
    let staged: Vec<StagedRow> = table.rows.iter().map(|r| layout.stage(r)).collect();

    // Zero funding means "no data" upstream.
    let before = staged.len();
    let staged: Vec<StagedRow> = staged.into_iter().filter(|r| !r.has_zero_funding()).collect();
    report.zero_funding = before - staged.len();
    debug!(dropped = report.zero_funding, "zero funding");

    // Missing and unparseable cells go the same way.
    let before = staged.len();
    let complete: Vec<CompleteRow> = staged.into_iter().filter_map(StagedRow::complete).collect();
    report.incomplete = before - complete.len();
    debug!(dropped = report.incomplete, "null or unparseable values");

    // First occurrence wins.
    let keep: Vec<bool> = {
        let mut seen = HashSet::new();
        complete.iter().map(|r| seen.insert(r.key())).collect()
    };
    let before = complete.len();
    let unique: Vec<CompleteRow> = complete
        .into_iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then_some(r))
        .collect();
    report.duplicates = before - unique.len();
    debug!(dropped = report.duplicates, "duplicates");

    // An already-cleaned table carries the country name; take it as is.
    let mut records = Vec::with_capacity(unique.len());
    for row in unique {
        let country = match layout.country {
            CountrySource::Name(_) => row.country.clone(),
            CountrySource::Code(_) => match code_to_country(&row.country) {
                Some(name) => name.to_string(),
                None => {
                    report.unknown_country += 1;
                    warn!(code = %row.country, name = %row.text[0], ?policy, "unrecognized country code");
                    match policy {
                        CountryPolicy::DropRow => continue,
                        CountryPolicy::Unknown => UNKNOWN_COUNTRY.to_string(),
                    }
                }
            },
        };
        records.push(row.into_record(country));
    }
    report.kept = records.len();

    // `country` replaces `country_code` and goes last.
    let columns: Vec<String> = table
        .headers
        .iter()
        .filter(|h| h.as_str() != COUNTRY_CODE && h.as_str() != COUNTRY)
        .cloned()
        .chain(std::iter::once(COUNTRY.to_string()))
        .collect();
    let extra_columns: Vec<String> = layout
        .extras
        .iter()
        .map(|i| table.headers[*i].clone())
        .collect();

    info!(
        input = report.input_rows,
        kept = report.kept,
        zero_funding = report.zero_funding,
        incomplete = report.incomplete,
        duplicates = report.duplicates,
        unknown_country = report.unknown_country,
        "cleaned dataset"
    );
    Ok(Dataset {
        columns,
        extra_columns,
        records,
        report,
    })
}
