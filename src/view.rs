// Column-subset view of the cleaned table, with optional text search.
use crate::dataset::{Column, Dataset};
use crate::error::DashboardError;

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    /// Project `data` onto `columns` (in the order given), keeping only rows
    /// where some selected cell contains `search`, ignoring case.
    ///
    /// # Errors
    ///
    /// [`DashboardError::UnknownColumn`] for a name not in the cleaned table.
    pub fn new<S: AsRef<str>>(
        data: &Dataset,
        columns: &[S],
        search: Option<&str>,
    ) -> Result<Self, DashboardError> {
        let resolved: Vec<Column> = columns
            .iter()
            .map(|c| {
                data.resolve(c.as_ref())
                    .ok_or_else(|| DashboardError::UnknownColumn {
                        column: c.as_ref().to_string(),
                    })
            })
            .collect::<Result<_, _>>()?;
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let rows = data
            .records()
            .iter()
            .map(|r| {
                resolved
                    .iter()
                    .map(|c| Dataset::value(r, *c))
                    .collect::<Vec<String>>()
            })
            .filter(|cells| match &needle {
                Some(n) => cells.iter().any(|c| c.to_lowercase().contains(n.as_str())),
                None => true,
            })
            .collect();

        Ok(TableView {
            headers: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::clean;
    use crate::config::{CountryPolicy, DEFAULT_TABLE_COLUMNS};
    use crate::loader::read_table_from;
    use std::path::Path;

    fn data() -> Dataset {
        let csv = "name,market,funding_total_usd,status,country_code,city,founded_at,founded_year,first_funding_at,last_funding_at,debt_financing,round_A,round_B,round_C,round_D,round_E,round_F,round_G,round_H\n\
                   Acme,Software,100,operating,USA,Austin,2010-01-01,2010,2011-01-01,2012-01-01,0,1,0,0,0,0,0,0,0\n\
                   Pharmo,Biotech,200,acquired,FRA,Paris,2009-01-01,2009,2010-01-01,2013-01-01,5,0,0,0,0,0,0,0,0\n";
        let raw = read_table_from(csv.as_bytes(), Path::new("t.csv")).unwrap();
        clean(raw, CountryPolicy::DropRow).unwrap()
    }

    #[test]
    fn default_columns_project() {
        let view = TableView::new(&data(), &DEFAULT_TABLE_COLUMNS, None).unwrap();
        assert_eq!(view.headers.len(), 8);
        assert_eq!(view.rows[0][0], "Acme");
        assert_eq!(view.rows[1][2], "200");
    }

    #[test]
    fn search_is_case_insensitive() {
        let view = TableView::new(&data(), &["name", "country"], Some("FRANCE")).unwrap();
        assert_eq!(view.rows, vec![vec!["Pharmo".to_string(), "France".to_string()]]);
    }

    #[test]
    fn unknown_column_rejected() {
        let err = TableView::new(&data(), &["permalink"], None).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownColumn { .. }));
    }
}
