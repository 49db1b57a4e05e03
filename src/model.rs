use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{error, info, trace};

use dashview::aggregate::{Bucket, Rank, RankingEntry, top_n, value_counts};
use dashview::browser::{Browser, BrowserMessage};
use dashview::domain::{DashConfig, DashError, HELP_TEXT, Message};
use dashview::export;
use dashview::loader::Dataset;
use dashview::record::Value;

use crate::inputter::{InputResult, Inputter};
use crate::theme::Theme;

const SUMMARY_RANKING_SIZE: usize = 5;

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modus {
    TABLE,
    SEARCH,
    SUMMARY,
    POPUP,
}

/// Aggregates of one column over the filtered records.
pub struct Summary {
    pub column: String,
    pub counts: Vec<Bucket>,
    pub top: Vec<RankingEntry>,
    pub bottom: Vec<RankingEntry>,
}

pub struct Model {
    config: DashConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    browser: Browser,
    selected_row: usize, // Position in the visible page
    selected_column: usize,
    summary: Option<Summary>,
    input: Inputter,
    last_input: InputResult,
    theme: Theme,
    status_message: String,
    popup_message: String,
}

impl Model {
    pub fn init(config: &DashConfig, dataset: Dataset) -> Result<Self, DashError> {
        let records = dataset.records.len();
        let browser =
            Browser::new(dataset.name, dataset.records, dataset.columns).with_config(config)?;
        Ok(Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            browser,
            selected_row: 0,
            selected_column: 0,
            summary: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            theme: Theme::default(),
            status_message: format!("Loaded {records} records"),
            popup_message: String::new(),
        })
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn modus(&self) -> Modus {
        self.modus
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    pub fn selected(&self) -> (usize, usize) {
        (self.selected_row, self.selected_column)
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn input(&self) -> &InputResult {
        &self.last_input
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn popup_message(&self) -> &str {
        &self.popup_message
    }

    /// While the search prompt is open every key goes to the inputter.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::SEARCH
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), DashError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.selected_row = self.selected_row.saturating_sub(1),
                Message::MoveDown => self.move_selection_down(),
                Message::MoveLeft => self.selected_column = self.selected_column.saturating_sub(1),
                Message::MoveRight => self.move_selection_right(),
                Message::NextPage => self.apply(BrowserMessage::NextPage)?,
                Message::PrevPage => self.apply(BrowserMessage::PrevPage)?,
                Message::FirstPage => self.apply(BrowserMessage::FirstPage)?,
                Message::LastPage => self.apply(BrowserMessage::LastPage)?,
                Message::GrowPage => self.resize_page(true)?,
                Message::ShrinkPage => self.resize_page(false)?,
                Message::Search => self.enter_search(),
                Message::Sort => self.sort_selected_column()?,
                Message::ClearSort => self.apply(BrowserMessage::ClearSort)?,
                Message::Summary => self.build_summary(),
                Message::CopyRow => self.copy_row(),
                Message::CopyFiltered => self.copy_filtered(),
                Message::ToggleTheme => self.theme = self.theme.toggled(),
                Message::Help => self.show_help(),
                Message::Exit => {
                    if !self.browser.state().search_term.is_empty() {
                        self.apply(BrowserMessage::Search(String::new()))?;
                        self.set_status_message("Search cleared");
                    }
                }
                Message::RawKey(_) => (),
            },
            Modus::SEARCH => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)?
                }
            }
            Modus::SUMMARY | Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Summary | Message::Help => self.close_overlay(),
                Message::ToggleTheme => self.theme = self.theme.toggled(),
                _ => (),
            },
        }
        Ok(())
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn apply(&mut self, message: BrowserMessage) -> Result<(), DashError> {
        self.browser.update(message)?;
        self.clamp_selection();
        Ok(())
    }

    fn visible_rows(&self) -> usize {
        let view = self.browser.view();
        view.last_row - view.first_row
    }

    fn clamp_selection(&mut self) {
        self.selected_row = self.selected_row.min(self.visible_rows().saturating_sub(1));
        self.selected_column = self
            .selected_column
            .min(self.browser.columns().len().saturating_sub(1));
    }

    fn move_selection_down(&mut self) {
        if self.selected_row + 1 < self.visible_rows() {
            self.selected_row += 1;
        } else if self.browser.state().page_index + 1 < self.browser.total_pages() {
            // Scrolling past the last row continues on the next page
            self.browser.next_page();
            self.selected_row = 0;
        }
    }

    fn move_selection_right(&mut self) {
        if self.selected_column + 1 < self.browser.columns().len() {
            self.selected_column += 1;
        }
    }

    fn resize_page(&mut self, grow: bool) -> Result<(), DashError> {
        let size = self.browser.state().page_size;
        let new_size = if grow { size + 5 } else { size.saturating_sub(5).max(1) };
        self.apply(BrowserMessage::PageSize(new_size))?;
        self.set_status_message(format!("{new_size} rows per page"));
        Ok(())
    }

    fn selected_key(&self) -> Option<String> {
        self.browser
            .columns()
            .get(self.selected_column)
            .map(|c| c.key.clone())
    }

    fn sort_selected_column(&mut self) -> Result<(), DashError> {
        if let Some(key) = self.selected_key() {
            self.apply(BrowserMessage::Sort(key))?;
        }
        Ok(())
    }

    fn enter_search(&mut self) {
        trace!("Entering search mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::SEARCH;
        self.input.set(&self.browser.state().search_term);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) -> Result<(), DashError> {
        self.last_input = self.input.read(key);
        if !self.last_input.finished {
            return Ok(());
        }
        self.modus = self.previous_modus;
        self.previous_modus = Modus::SEARCH;
        if self.last_input.canceled {
            return Ok(());
        }
        let term = self.last_input.input.clone();
        self.apply(BrowserMessage::Search(term.clone()))?;
        self.selected_row = 0;
        let found = self.browser.total_filtered();
        info!("Search \"{term}\" matched {found} records");
        self.set_status_message(if found == 0 {
            "Found no matches!".to_string()
        } else {
            format!("Found {found} results")
        });
        Ok(())
    }

    fn build_summary(&mut self) {
        let Some(key) = self.selected_key() else {
            return;
        };
        let filtered = self.browser.filtered_records();
        let counts = value_counts(filtered.iter().copied(), &key);

        let numeric: Vec<(String, f64)> = filtered
            .iter()
            .filter_map(|r| {
                let value = r.get(&key).and_then(Value::as_number)?;
                let label = self
                    .browser
                    .columns()
                    .first()
                    .map(|c| c.display(r))
                    .unwrap_or_default();
                Some((label, value))
            })
            .collect();
        let rank = |direction| {
            top_n(&numeric, |e| e.1, |e| e.0.clone(), SUMMARY_RANKING_SIZE, direction)
        };
        let (top, bottom) = (rank(Rank::Top), rank(Rank::Bottom));

        trace!("Summary for {key}: {} distinct values", counts.len());
        self.summary = Some(Summary {
            column: key,
            counts,
            top,
            bottom,
        });
        self.previous_modus = self.modus;
        self.modus = Modus::SUMMARY;
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.popup_message = HELP_TEXT.to_string();
    }

    fn close_overlay(&mut self) {
        trace!("Close {:?} ...", self.modus);
        self.modus = Modus::TABLE;
        self.previous_modus = Modus::TABLE;
        self.summary = None;
    }

    fn copy_row(&mut self) {
        let view = self.browser.view();
        let Some(record) = view.records.get(self.selected_row) else {
            return;
        };
        let row = export::row_to_csv(self.browser.columns(), record);
        self.copy_to_clipboard(row, "Copied row");
    }

    fn copy_filtered(&mut self) {
        let content = export::export_filtered(&self.browser);
        let message = format!("Copied {} records", self.browser.total_filtered());
        self.copy_to_clipboard(content, &message);
    }

    fn copy_to_clipboard(&mut self, content: String, success: &str) {
        match Clipboard::new().and_then(|mut c| c.set_text(content)) {
            Ok(_) => self.set_status_message(success),
            Err(e) => {
                error!("Error copying to clipboard: {:?}", e);
                self.set_status_message("Clipboard not available");
            }
        }
    }
}
