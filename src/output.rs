use crate::dataset::Dataset;
use crate::error::DashboardError;
use crate::view::TableView;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DashboardError> {
    let csv_err = |e: csv::Error| DashboardError::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for r in rows {
        wtr.serialize(r).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| DashboardError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Export the cleaned table with every column, in table order.
///
/// The export feeds straight back into the cleaning pipeline unchanged.
pub fn write_dataset_csv(path: &Path, data: &Dataset) -> Result<(), DashboardError> {
    let view = TableView::new(data, data.columns(), None)?;
    let csv_err = |e: csv::Error| DashboardError::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(&view.headers).map_err(csv_err)?;
    for row in &view.rows {
        wtr.write_record(row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| DashboardError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DashboardError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|e| DashboardError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Markdown table of the first `max_rows` rows.
pub fn render_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn render_view(view: &TableView, max_rows: usize) -> String {
    if view.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(view.headers.iter().cloned());
    for row in view.rows.iter().take(max_rows) {
        builder.push_record(row.iter().cloned());
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_rows(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieSlice;

    #[test]
    fn renders_markdown() {
        let rows = vec![
            PieSlice { label: "Software".into(), count: 5 },
            PieSlice { label: "Biotech".into(), count: 3 },
        ];
        let md = render_rows(&rows, 1);
        assert!(md.contains("| Market"));
        assert!(md.contains("Software"));
        assert!(!md.contains("Biotech"));
        assert_eq!(render_rows::<PieSlice>(&[], 5), "(no rows)");
    }

    #[test]
    fn writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let rows = vec![PieSlice { label: "Games".into(), count: 2 }];
        write_json(&path, &rows).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v[0]["Market"], "Games");
        assert_eq!(v[0]["Count"], 2);
    }

    #[test]
    fn writes_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pie.csv");
        let rows = vec![PieSlice { label: "Games".into(), count: 2 }];
        write_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Market,Count\nGames,2\n");
    }
}
