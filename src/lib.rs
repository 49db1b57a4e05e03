//! In-memory record browsing and aggregation for dashboard tables and charts.
//!
//! [`aggregate`] turns a record collection into rankings and distributions,
//! [`browser::Browser`] keeps the search / sort / page state of one table.

pub mod aggregate;
pub mod browser;
pub mod domain;
pub mod export;
pub mod loader;
pub mod record;

pub use aggregate::{Bins, Bucket, Rank, RankingEntry, count_by, distribute, top_n, value_counts};
pub use browser::{Browser, BrowserMessage, SortDirection, View, ViewState};
pub use domain::{DashConfig, DashError};
pub use record::{ColumnDescriptor, Record, Value};
