use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::Stylize,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::model::{Model, Modus, Summary};
use dashview::browser::SortDirection;

pub const COLUMN_WIDTH_MARGIN: usize = 1;
pub const CMDLINE_HEIGHT: u16 = 1;

pub fn draw(model: &Model, frame: &mut Frame) {
    let theme = model.theme();
    frame.render_widget(Block::new().style(theme.base()), frame.area());

    let [table_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(CMDLINE_HEIGHT)])
            .areas(frame.area());

    draw_table(model, frame, table_area);
    draw_statusline(model, frame, status_area);

    match model.modus() {
        Modus::SUMMARY => {
            if let Some(summary) = model.summary() {
                draw_summary(model, summary, frame);
            }
        }
        Modus::POPUP => draw_popup(model, frame),
        Modus::TABLE | Modus::SEARCH => {}
    }
}

fn truncate(s: String, width: usize) -> String {
    if s.chars().count() <= width {
        return s;
    }
    let mut reduced: String = s.chars().take(width.saturating_sub(1)).collect();
    reduced.push('…');
    reduced
}

fn draw_table(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.theme();
    let browser = model.browser();
    let view = browser.view();
    let max_width = model.config().max_column_width;
    let (selected_row, selected_column) = model.selected();

    let header = Row::new(browser.columns().iter().map(|c| {
        let marker = match view.sort {
            Some((key, SortDirection::Asc)) if key == c.key => " ▲",
            Some((key, SortDirection::Desc)) if key == c.key => " ▼",
            _ => "",
        };
        Cell::from(format!("{}{marker}", c.header))
    }))
    .style(theme.header());

    let cells: Vec<Vec<String>> = view
        .records
        .iter()
        .map(|r| {
            browser
                .columns()
                .iter()
                .map(|c| truncate(c.display(r), max_width))
                .collect()
        })
        .collect();

    let widths: Vec<Constraint> = browser
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let widest = cells
                .iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(c.header.chars().count() + 2))
                .max()
                .unwrap_or(0);
            Constraint::Length((widest.min(max_width) + COLUMN_WIDTH_MARGIN) as u16)
        })
        .collect();

    let rows = cells.into_iter().map(Row::new);
    let title = Line::from(format!(" {} ", browser.name())).bold();
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::bordered().title(title.centered()))
        .row_highlight_style(theme.selected_row())
        .cell_highlight_style(theme.selected_cell());

    let mut state = TableState::default()
        .with_selected(if view.records.is_empty() { None } else { Some(selected_row) })
        .with_selected_column(Some(selected_column));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_statusline(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.theme();
    let browser = model.browser();
    let view = browser.view();

    let line = if model.modus() == Modus::SEARCH {
        let input = model.input();
        frame.set_cursor_position((area.x + 1 + input.curser_pos as u16, area.y));
        Line::from(vec![Span::raw("/"), Span::raw(input.input.clone())])
    } else {
        let position = if view.total_pages == 0 {
            "page 0/0 | no rows".to_string()
        } else {
            format!(
                "page {}/{} | rows {}-{} of {}",
                view.current_page + 1,
                view.total_pages,
                view.first_row + 1,
                view.last_row,
                view.total_filtered
            )
        };
        let search = &browser.state().search_term;
        let mut spans = vec![Span::raw(format!(" {position} "))];
        if !search.is_empty() {
            spans.push(Span::raw(format!("| /{search} ")));
        }
        spans.push(Span::raw(format!("| {}", model.status_message())));
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line).style(theme.status()), area);
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn draw_summary(model: &Model, summary: &Summary, frame: &mut Frame) {
    let theme = model.theme();
    let area = popup_area(frame.area(), 70, 70);
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(Line::from(format!(" Summary [{}] ", summary.column)).centered())
        .style(theme.base());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let total: usize = summary.counts.iter().map(|b| b.count).sum();
    let count_lines: Vec<Line> = summary
        .counts
        .iter()
        .map(|b| {
            let pct = b.count as f64 * 100.0 / total.max(1) as f64;
            Line::from(format!("{:>6} {:>4.0}%  {}", b.count, pct, b.label))
        })
        .collect();

    if summary.top.is_empty() {
        frame.render_widget(Paragraph::new(count_lines), inner);
        return;
    }

    let [counts_area, ranking_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);
    frame.render_widget(Paragraph::new(count_lines), counts_area);

    let mut ranking_lines = vec![Line::from("Top").style(theme.header())];
    ranking_lines.extend(
        summary
            .top
            .iter()
            .map(|e| Line::from(format!("{:>10}  {}", e.value, e.name))),
    );
    ranking_lines.push(Line::from("Bottom").style(theme.header()));
    ranking_lines.extend(
        summary
            .bottom
            .iter()
            .map(|e| Line::from(format!("{:>10}  {}", e.value, e.name))),
    );
    frame.render_widget(Paragraph::new(ranking_lines), ranking_area);
}

fn draw_popup(model: &Model, frame: &mut Frame) {
    let area = popup_area(frame.area(), 50, 60);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(model.popup_message())
            .block(Block::bordered().title(Line::from(" Help ").centered()))
            .style(model.theme().base()),
        area,
    );
}
