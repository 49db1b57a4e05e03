use ratatui::style::{Color, Modifier, Style};

/// Color scheme of the front-end. Only the renderer asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn base(self) -> Style {
        match self {
            Theme::Dark => Style::new().fg(Color::Gray).bg(Color::Black),
            Theme::Light => Style::new().fg(Color::Black).bg(Color::White),
        }
    }

    pub fn header(self) -> Style {
        let style = Style::new().add_modifier(Modifier::BOLD);
        match self {
            Theme::Dark => style.fg(Color::Yellow),
            Theme::Light => style.fg(Color::Blue),
        }
    }

    pub fn selected_row(self) -> Style {
        match self {
            Theme::Dark => Style::new().bg(Color::DarkGray),
            Theme::Light => Style::new().bg(Color::Gray),
        }
    }

    pub fn selected_cell(self) -> Style {
        self.selected_row().add_modifier(Modifier::REVERSED)
    }

    pub fn status(self) -> Style {
        match self {
            Theme::Dark => Style::new().fg(Color::Black).bg(Color::Cyan),
            Theme::Light => Style::new().fg(Color::White).bg(Color::Blue),
        }
    }
}
