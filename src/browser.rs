//! Interactive search / sort / paging over one record collection.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::{DEFAULT_PAGE_SIZE, DashConfig, DashError};
use crate::record::{ColumnDescriptor, Record, Value};

const MISSING: &Value = &Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// The mutable interaction state of one browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_term: String,
    pub sort_key: Option<String>,
    pub sort_direction: SortDirection,
    pub page_index: usize,
    pub page_size: usize,
}

impl ViewState {
    fn with_page_size(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            sort_key: None,
            sort_direction: SortDirection::Asc,
            page_index: 0,
            page_size,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

/// Snapshot of what is currently visible.
#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    pub records: Vec<&'a Record>,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub sort: Option<(&'a str, SortDirection)>,
    /// Position of the first visible record in the filtered sequence
    pub first_row: usize,
    /// One past the position of the last visible record
    pub last_row: usize,
}

/// Interaction events a browser understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserMessage {
    Search(String),
    Sort(String),
    ClearSort,
    Page(usize),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    PageSize(usize),
}

/// A view over one dataset.
///
/// The record collection is shared read-only; the [`ViewState`] belongs to
/// this browser alone. The pipeline is always filter, then sort, then page.
pub struct Browser {
    name: String,
    records: Arc<Vec<Record>>,
    columns: Vec<ColumnDescriptor>,
    state: ViewState,
    default_page_size: usize,
    filtered: Vec<usize>, // Indices of records matching the search term, input order
    rows: Vec<usize>,     // `filtered` after sorting
}

impl Browser {
    pub fn new(
        name: impl Into<String>,
        records: impl Into<Arc<Vec<Record>>>,
        columns: Vec<ColumnDescriptor>,
    ) -> Self {
        let mut browser = Self {
            name: name.into(),
            records: records.into(),
            columns,
            state: ViewState::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            filtered: Vec::new(),
            rows: Vec::new(),
        };
        browser.refilter();
        browser
    }

    /// Takes the default page size from `config`.
    pub fn with_config(mut self, config: &DashConfig) -> Result<Self, DashError> {
        if config.page_size == 0 {
            return Err(DashError::InvalidPageSize(config.page_size));
        }
        self.default_page_size = config.page_size;
        self.state.page_size = config.page_size;
        self.clamp_page();
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn records(&self) -> &Arc<Vec<Record>> {
        &self.records
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Swaps in a new collection and resets the view state.
    pub fn replace_records(&mut self, records: impl Into<Arc<Vec<Record>>>) {
        self.records = records.into();
        self.state = ViewState::with_page_size(self.default_page_size);
        debug!("[{}] Replaced records, now {}", self.name, self.records.len());
        self.refilter();
    }

    pub fn set_search_term(&mut self, text: impl Into<String>) {
        self.state.search_term = text.into();
        self.state.page_index = 0;
        trace!("[{}] Search term \"{}\"", self.name, self.state.search_term);
        self.refilter();
    }

    /// Sorts by `key`, flipping the direction if `key` is already sorted on.
    pub fn set_sort(&mut self, key: impl Into<String>) {
        let key = key.into();
        if self.state.sort_key.as_deref() == Some(key.as_str()) {
            self.state.sort_direction = self.state.sort_direction.toggled();
        } else {
            self.state.sort_key = Some(key);
            self.state.sort_direction = SortDirection::Asc;
        }
        trace!(
            "[{}] Sort {:?} {:?}",
            self.name, self.state.sort_key, self.state.sort_direction
        );
        self.resort();
    }

    pub fn clear_sort(&mut self) {
        self.state.sort_key = None;
        self.state.sort_direction = SortDirection::Asc;
        self.resort();
    }

    /// Moves to page `index`, clamped into the valid page range.
    pub fn set_page(&mut self, index: usize) {
        self.state.page_index = index.min(self.last_page_index());
        trace!("[{}] Page {} (requested {index})", self.name, self.state.page_index);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.state.page_index.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.state.page_index.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.set_page(0);
    }

    pub fn last_page(&mut self) {
        self.set_page(self.last_page_index());
    }

    /// Changes the page size and goes back to the first page.
    /// A size of 0 is rejected and leaves the state untouched.
    pub fn set_page_size(&mut self, size: usize) -> Result<(), DashError> {
        if size == 0 {
            return Err(DashError::InvalidPageSize(size));
        }
        self.state.page_size = size;
        self.state.page_index = 0;
        trace!("[{}] Page size {size}", self.name);
        Ok(())
    }

    pub fn update(&mut self, message: BrowserMessage) -> Result<(), DashError> {
        match message {
            BrowserMessage::Search(text) => self.set_search_term(text),
            BrowserMessage::Sort(key) => self.set_sort(key),
            BrowserMessage::ClearSort => self.clear_sort(),
            BrowserMessage::Page(index) => self.set_page(index),
            BrowserMessage::NextPage => self.next_page(),
            BrowserMessage::PrevPage => self.prev_page(),
            BrowserMessage::FirstPage => self.first_page(),
            BrowserMessage::LastPage => self.last_page(),
            BrowserMessage::PageSize(size) => self.set_page_size(size)?,
        }
        Ok(())
    }

    pub fn total_filtered(&self) -> usize {
        self.rows.len()
    }

    pub fn total_pages(&self) -> usize {
        self.rows.len().div_ceil(self.state.page_size)
    }

    pub fn view(&self) -> View<'_> {
        let first_row = (self.state.page_index * self.state.page_size).min(self.rows.len());
        let last_row = (first_row + self.state.page_size).min(self.rows.len());
        View {
            records: self.rows[first_row..last_row]
                .iter()
                .map(|&idx| &self.records[idx])
                .collect(),
            total_filtered: self.rows.len(),
            total_pages: self.total_pages(),
            current_page: self.state.page_index,
            sort: self
                .state
                .sort_key
                .as_deref()
                .map(|key| (key, self.state.sort_direction)),
            first_row,
            last_row,
        }
    }

    /// Every record passing the search, in sorted order, without paging.
    pub fn filtered_records(&self) -> Vec<&Record> {
        self.rows.iter().map(|&idx| &self.records[idx]).collect()
    }

    fn last_page_index(&self) -> usize {
        self.total_pages().saturating_sub(1)
    }

    fn clamp_page(&mut self) {
        self.state.page_index = self.state.page_index.min(self.last_page_index());
    }

    fn refilter(&mut self) {
        let needle = self.state.search_term.to_lowercase();
        self.filtered = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.matches(&needle))
            .map(|(idx, _)| idx)
            .collect();
        debug!(
            "[{}] {} of {} records match \"{}\"",
            self.name,
            self.filtered.len(),
            self.records.len(),
            self.state.search_term
        );
        self.resort();
    }

    fn resort(&mut self) {
        let mut rows = self.filtered.clone();
        if let Some(key) = &self.state.sort_key {
            let records = &self.records;
            let direction = self.state.sort_direction;
            // Stable, so equal keys keep their filtered order in both directions
            rows.sort_by(|&a, &b| {
                let va = records[a].get(key).unwrap_or(MISSING);
                let vb = records[b].get(key).unwrap_or(MISSING);
                let ord = va.compare(vb);
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        self.rows = rows;
        self.clamp_page();
    }
}
