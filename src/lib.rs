// Cleaning and chart preparation for the startup investments dashboard.
//
// `loader::read_table` reads the CSV, `clean::clean` normalizes it into
// an immutable `Dataset`, and the functions in `reports` turn that into
// metrics and chart descriptions. `DatasetCache` holds the dataset for the
// lifetime of the process.
pub mod cache;
pub mod clean;
pub mod config;
pub mod country;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
pub mod view;

pub use cache::DatasetCache;
pub use config::{CountryPolicy, DashboardConfig, Filters};
pub use dataset::{CleanReport, Dataset};
pub use error::DashboardError;
pub use types::{Dashboard, Round, StartupRecord};
pub use view::TableView;
