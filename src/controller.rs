use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::model::Model;
use dashview::domain::{DashConfig, DashError, Message};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &DashConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, DashError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            if model.raw_keyevents() {
                return Ok(Some(Message::RawKey(key)));
            }
            return Ok(Self::handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(key: KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Up | KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down | KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Left, _) => Some(Message::MoveLeft),
            (KeyCode::Right, _) => Some(Message::MoveRight),
            (KeyCode::PageDown | KeyCode::Char('n'), _) => Some(Message::NextPage),
            (KeyCode::PageUp | KeyCode::Char('p'), _) => Some(Message::PrevPage),
            (KeyCode::Home | KeyCode::Char('g'), _) => Some(Message::FirstPage),
            (KeyCode::End | KeyCode::Char('G'), _) => Some(Message::LastPage),
            (KeyCode::Char('+'), _) => Some(Message::GrowPage),
            (KeyCode::Char('-'), _) => Some(Message::ShrinkPage),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Char('s'), _) => Some(Message::Sort),
            (KeyCode::Char('S'), _) => Some(Message::ClearSort),
            (KeyCode::Char('h'), _) => Some(Message::Summary),
            (KeyCode::Char('y'), _) => Some(Message::CopyRow),
            (KeyCode::Char('Y'), _) => Some(Message::CopyFiltered),
            (KeyCode::Char('t'), _) => Some(Message::ToggleTheme),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Option<Message> {
        Controller::handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn maps_keys_to_messages() {
        assert_eq!(press(KeyCode::Char('q')), Some(Message::Quit));
        assert_eq!(press(KeyCode::Char('/')), Some(Message::Search));
        assert_eq!(press(KeyCode::PageDown), Some(Message::NextPage));
        assert_eq!(press(KeyCode::Char('S')), Some(Message::ClearSort));
        assert_eq!(press(KeyCode::Char('x')), None);
        assert_eq!(
            Controller::handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Message::Quit)
        );
    }
}
