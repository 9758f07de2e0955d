use crate::error::DashboardError;
use crate::util::is_na;
use csv::ReaderBuilder;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// The input file as read: a header row plus loosely-typed cells.
///
/// A cell is `None` when it is empty or holds one of the usual NA markers.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Rename every header to its whitespace-trimmed form
    /// (`" funding_total_usd "` becomes `funding_total_usd`).
    pub fn rename_trimmed(mut self) -> Self {
        for h in &mut self.headers {
            let trimmed = h.trim();
            if trimmed.len() != h.len() {
                *h = trimmed.to_string();
            }
        }
        self
    }

    /// Remove the named columns. Names that are not present are ignored.
    pub fn drop_columns(mut self, names: &[&str]) -> Self {
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|h| !names.contains(&h.as_str()))
            .collect();
        if keep.iter().all(|k| *k) {
            return self;
        }
        let retain = |cells: Vec<Option<String>>| -> Vec<Option<String>> {
            cells
                .into_iter()
                .zip(&keep)
                .filter_map(|(c, k)| k.then_some(c))
                .collect()
        };
        self.headers = self
            .headers
            .into_iter()
            .zip(&keep)
            .filter_map(|(h, k)| k.then_some(h))
            .collect();
        self.rows = self.rows.into_iter().map(retain).collect();
        self
    }
}

/// Decode one field without ever failing the load.
///
/// A field that is not valid UTF-8 is read as Windows-1252, unless it also
/// holds valid multibyte UTF-8 characters. Then it is mostly UTF-8 and only
/// the stray bytes become U+FFFD.
fn decode_field(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    let lossy = String::from_utf8_lossy(bytes);
    if lossy
        .chars()
        .any(|c| !c.is_ascii() && c != char::REPLACEMENT_CHARACTER)
    {
        return lossy.into_owned();
    }
    encoding_rs::WINDOWS_1252
        .decode_without_bom_handling(bytes)
        .0
        .into_owned()
}

fn to_cell(bytes: &[u8]) -> Option<String> {
    let s = decode_field(bytes);
    if is_na(&s) {
        None
    } else {
        Some(s)
    }
}

pub fn read_table(path: &Path) -> Result<RawTable, DashboardError> {
    let file = std::fs::File::open(path).map_err(|e| DashboardError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_table_from(file, path)
}

/// Read a CSV with a header row from any reader. `origin` only labels errors.
#[instrument(skip(rdr, origin), fields(origin = %origin.display()))]
pub fn read_table_from<R: Read>(rdr: R, origin: &Path) -> Result<RawTable, DashboardError> {
    let csv_err = |e: csv::Error| DashboardError::Csv {
        path: PathBuf::from(origin),
        source: e,
    };
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(rdr);

    let headers: Vec<String> = rdr
        .byte_headers()
        .map_err(csv_err)?
        .iter()
        .map(decode_field)
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DashboardError::EmptyHeader {
            path: origin.to_path_buf(),
        });
    }
    debug!(columns = headers.len(), "read CSV header");

    let width = headers.len();
    let mut rows = Vec::new();
    let mut ragged = 0usize;
    for result in rdr.byte_records() {
        let record = result.map_err(csv_err)?;
        let mut cells: Vec<Option<String>> = record.iter().take(width).map(to_cell).collect();
        if record.len() != width {
            ragged += 1;
        }
        // Short rows are padded with nulls so the null-drop step removes them.
        cells.resize(width, None);
        rows.push(cells);
    }
    if ragged > 0 {
        debug!(ragged, "rows with a column count different from the header");
    }
    info!(rows = rows.len(), columns = width, "loaded CSV");
    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &[u8]) -> RawTable {
        read_table_from(csv, Path::new("test.csv")).unwrap()
    }

    #[test]
    fn reads_cells_and_nulls() {
        let t = table(b"name, market ,x\nAcme,Software,\nBeta,NaN,1\n");
        assert_eq!(t.headers, vec!["name", " market ", "x"]);
        assert_eq!(
            t.rows[0],
            vec![Some("Acme".into()), Some("Software".into()), None]
        );
        assert_eq!(t.rows[1][1], None);
    }

    #[test]
    fn tolerates_invalid_utf8() {
        let t = table(b"name\nCaf\xe9 Ltd\n");
        assert_eq!(t.rows[0][0].as_deref(), Some("Caf\u{e9} Ltd"));
    }

    #[test]
    fn mixed_utf8_field_keeps_valid_characters() {
        let t = table(b"name\nCaf\xc3\xa9 \xe1\n");
        assert_eq!(t.rows[0][0].as_deref(), Some("Caf\u{e9} \u{FFFD}"));
    }

    #[test]
    fn pads_short_rows() {
        let t = table(b"a,b,c\n1\n");
        assert_eq!(t.rows[0], vec![Some("1".into()), None, None]);
    }

    #[test]
    fn rename_and_drop() {
        let t = table(b" funding_total_usd ,permalink, market \n1,/x,Games\n")
            .rename_trimmed()
            .drop_columns(&["permalink", "homepage_url"]);
        assert_eq!(t.headers, vec!["funding_total_usd", "market"]);
        assert_eq!(t.rows[0], vec![Some("1".into()), Some("Games".into())]);
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = read_table_from(&b""[..], Path::new("empty.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::EmptyHeader { .. }));
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = read_table(Path::new("/nonexistent/investments.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::Open { .. }));
    }
}
