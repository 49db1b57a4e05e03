use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Single line editor for the search prompt. The cursor counts chars.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.finished = true,
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.curser_pos = self.curser_pos.saturating_sub(1),
            (KeyCode::Right, _) => {
                self.curser_pos = (self.curser_pos + 1).min(self.current_input.chars().count())
            }
            (KeyCode::Home, _) => self.curser_pos = 0,
            (KeyCode::End, _) => self.curser_pos = self.current_input.chars().count(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.clear(),
            (KeyCode::Char(chr), m) if !m.contains(KeyModifiers::CONTROL) => {
                let at = self.byte_pos(self.curser_pos);
                self.current_input.insert(at, chr);
                self.curser_pos += 1;
            }
            _ => (),
        }
        trace!("Input \"{}\" at {}", self.current_input, self.curser_pos);
        self.get()
    }

    /// Starts editing from `s` with the cursor at its end.
    pub fn set(&mut self, s: &str) {
        self.clear();
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn escape(&mut self) {
        self.clear();
        self.canceled = true;
        self.finished = true;
    }

    fn backspace(&mut self) {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let at = self.byte_pos(self.curser_pos);
            self.current_input.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.curser_pos < self.current_input.chars().count() {
            let at = self.byte_pos(self.curser_pos);
            self.current_input.remove(at);
        }
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.current_input
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut Inputter, s: &str) -> InputResult {
        let mut last = input.get();
        for c in s.chars() {
            last = input.read(key(KeyCode::Char(c)));
        }
        last
    }

    #[test]
    fn typing_and_editing() {
        let mut input = Inputter::default();
        type_str(&mut input, "8o5");
        input.read(key(KeyCode::Left));
        input.read(key(KeyCode::Backspace));
        let res = type_str(&mut input, "0");
        assert_eq!(res.input, "805");
        assert_eq!(res.curser_pos, 2);
        assert!(!res.finished);

        let res = input.read(key(KeyCode::Enter));
        assert!(res.finished);
        assert!(!res.canceled);
    }

    #[test]
    fn multibyte_chars() {
        let mut input = Inputter::default();
        input.set("↵ä");
        input.read(key(KeyCode::Home));
        input.read(key(KeyCode::Delete));
        assert_eq!(input.get().input, "ä");
        assert_eq!(type_str(&mut input, "ö").input, "öä");
    }

    #[test]
    fn escape_cancels() {
        let mut input = Inputter::default();
        type_str(&mut input, "fault");
        let res = input.read(key(KeyCode::Esc));
        assert!(res.canceled && res.finished);
        assert_eq!(res.input, "");
    }
}
