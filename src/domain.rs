use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;

pub const DEFAULT_PAGE_SIZE: usize = 10;

pub const HELP_TEXT: &str = "\
q          quit
/          search all fields
Esc        clear search / close popup
s          sort by selected column (again to flip)
S          clear sort
Left/Right select column
Up/Down    select row
n, PgDn    next page
p, PgUp    previous page
g / G      first / last page
+ / -      grow / shrink page size
h          summary of selected column
y / Y      copy row / copy filtered records
t          toggle theme
?          this help";

// Error type shared by the engine and the front-end.
#[derive(Debug)]
pub enum DashError {
    InvalidPageSize(usize),
    UnknownBucketLabel(String),
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashError::InvalidPageSize(size) => write!(f, "invalid page size {size}"),
            DashError::UnknownBucketLabel(label) => {
                write!(f, "classifier produced undeclared bucket \"{label}\"")
            }
            DashError::IoError(e) => write!(f, "io error: {e}"),
            DashError::PolarsError(e) => write!(f, "polars error: {e}"),
            DashError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            DashError::FileNotFound => write!(f, "file not found"),
            DashError::PermissionDenied => write!(f, "permission denied"),
            DashError::UnknownFileType => write!(f, "unknown file type"),
        }
    }
}

impl std::error::Error for DashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashError::IoError(e) => Some(e),
            DashError::PolarsError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Error> for DashError {
    fn from(err: Error) -> Self {
        DashError::IoError(err)
    }
}

impl From<PolarsError> for DashError {
    fn from(err: PolarsError) -> Self {
        DashError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct DashConfig {
    /// Rows per page for freshly created browsers.
    pub page_size: usize,
    /// Event poll timeout of the front-end loop in ms.
    pub event_poll_time: u64,
    pub max_column_width: usize,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            event_poll_time: 100,
            max_column_width: 30,
        }
    }
}

/// Interaction events of the front-end, produced by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GrowPage,
    ShrinkPage,
    Search,
    Sort,
    ClearSort,
    Summary,
    CopyRow,
    CopyFiltered,
    ToggleTheme,
    Help,
    Exit,
    RawKey(ratatui::crossterm::event::KeyEvent),
}
