// Console front end for the startup investments dashboard.
//
// Sidebar controls become startup flags. The data table, the three counters
// and a markdown preview of each chart are printed to stdout; the full chart
// descriptions can be written as JSON for a chart renderer.
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use startup_dashboard::config::{DEFAULT_DATA_PATH, DEFAULT_STATUSES, DEFAULT_TABLE_COLUMNS};
use startup_dashboard::util::{format_int, format_number};
use startup_dashboard::{
    output, reports, CountryPolicy, DashboardConfig, DashboardError, DatasetCache, Filters, Round,
    TableView,
};

#[derive(Parser)]
#[command(name = "startup-dashboard")]
#[command(about = "StartUp Investment Dashboard over a CSV of funding records")]
#[command(version)]
struct Cli {
    /// Funding records CSV
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Number of markets in the top-markets pie (2-30)
    #[arg(long, default_value_t = 5)]
    top_markets: usize,

    /// Funding rounds to include, e.g. round_A or A (default: all eight)
    #[arg(long, num_args = 1..)]
    rounds: Vec<Round>,

    /// Startup statuses to include in the status histogram
    #[arg(long, num_args = 1.., default_values_t = DEFAULT_STATUSES.map(String::from))]
    status: Vec<String>,

    /// Columns shown in the data table
    #[arg(long, num_args = 1.., default_values_t = DEFAULT_TABLE_COLUMNS.map(String::from))]
    columns: Vec<String>,

    /// Only show data-table rows containing this text
    #[arg(long)]
    search: Option<String>,

    /// Rows shown in each preview table
    #[arg(long, default_value_t = 10)]
    preview_rows: usize,

    /// What to do with unrecognized country codes: drop or unknown
    #[arg(long, default_value = "drop")]
    unknown_country: CountryPolicy,

    /// Write every chart description as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the cleaned table as CSV to this path
    #[arg(long)]
    export: Option<PathBuf>,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all logging except errors
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    /// Returns the config plus the optional JSON and CSV output paths.
    fn into_config(
        self,
    ) -> Result<(DashboardConfig, Option<PathBuf>, Option<PathBuf>), DashboardError> {
        let rounds = if self.rounds.is_empty() {
            Round::ALL.to_vec()
        } else {
            self.rounds
        };
        let filters = Filters::new(self.top_markets)?
            .with_rounds(rounds)
            .with_statuses(self.status);
        let config = DashboardConfig {
            data_path: self.data,
            country_policy: self.unknown_country,
            filters,
            table_columns: self.columns,
            search: self.search,
            preview_rows: self.preview_rows,
        };
        Ok((config, self.json, self.export))
    }
}

fn render(
    config: &DashboardConfig,
    cache: &DatasetCache,
    json: Option<PathBuf>,
    export: Option<PathBuf>,
) -> Result<(), DashboardError> {
    let data = cache.get()?;
    let report = data.report();
    println!(
        "Processing dataset... ({} rows loaded, {} kept after cleaning)",
        format_int(report.input_rows),
        format_int(report.kept)
    );
    println!(
        "Note: {} zero-funding, {} incomplete, {} duplicate and {} unknown-country rows.\n",
        format_int(report.zero_funding),
        format_int(report.incomplete),
        format_int(report.duplicates),
        format_int(report.unknown_country)
    );

    let dashboard = reports::build_dashboard(&data, &config.filters)?;
    let view = TableView::new(&data, config.table_columns.as_slice(), config.search.as_deref())?;

    println!("## StartUp Investment Dashboard\n");
    println!("VIEW EXCEL DATASET ({} rows)\n", format_int(view.len()));
    println!("{}\n", output::render_view(&view, config.preview_rows));

    let m = &dashboard.metrics;
    println!("Total Invested Companies: {}", format_int(m.total_companies));
    println!("Total Investment: $ {}", format_int(m.total_investments));
    println!("Total Funding: $ {}\n", format_int(m.total_funding));

    println!("{}\n", dashboard.top_markets.title);
    output::preview_rows(&dashboard.top_markets.slices, config.preview_rows);

    println!("{}\n", dashboard.rounds.title);
    output::preview_rows(&dashboard.rounds.bars, config.preview_rows);

    println!("{}\n", dashboard.funding_by_year.title);
    output::preview_rows(&dashboard.funding_by_year.points, config.preview_rows);

    println!("{}\n", dashboard.status.title);
    output::preview_rows(&dashboard.status.bars, config.preview_rows);

    let scatter = &dashboard.debt_vs_funding;
    println!("{} ({} points)\n", scatter.title, format_int(scatter.points.len()));
    output::preview_rows(&scatter.points, config.preview_rows);
    match scatter.trend {
        Some(t) => println!(
            "OLS trendline: debt = {} * funding + {} (R² = {})\n",
            format_number(t.slope, 6),
            format_number(t.intercept, 2),
            format_number(t.r_squared, 4)
        ),
        None => println!("OLS trendline: not enough points\n"),
    }

    if let Some(path) = json {
        output::write_json(&path, &dashboard)?;
        info!(path = %path.display(), "wrote dashboard JSON");
    }
    if let Some(path) = export {
        output::write_dataset_csv(&path, &data)?;
        info!(path = %path.display(), rows = data.len(), "exported cleaned dataset");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = cli.into_config().and_then(|(config, json, export)| {
        let cache = DatasetCache::new(config.data_path.clone(), config.country_policy);
        render(&config, &cache, json, export)
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut msg = e.to_string();
            let mut source = std::error::Error::source(&e);
            while let Some(s) = source {
                msg.push_str(&format!(": {}", s));
                source = s.source();
            }
            error!("{}", msg);
            ExitCode::FAILURE
        }
    }
}
