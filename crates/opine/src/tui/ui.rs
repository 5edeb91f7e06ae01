//! UI rendering for the TUI

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{
    identity_label, indicator_label, App, EvaluateFocus, EvaluateState, FormFocus, IdentityForm,
    Screen, ViewState,
};
use crate::report::title_case;

/// Turn a `"<name>\n\t<id>"` picker label into a two-line list row. The
/// id line renders dimmed under a fixed indent.
fn picker_item(label: &str) -> ListItem<'static> {
    let lines: Vec<Line> = label
        .split('\n')
        .map(|line| {
            if let Some(id) = line.strip_prefix('\t') {
                Line::styled(format!("    {}", id), Style::default().fg(Color::DarkGray))
            } else {
                Line::raw(line.to_string())
            }
        })
        .collect();
    ListItem::new(lines)
}

fn selection_list(title: &str, items: Vec<ListItem<'static>>, cursor: usize) -> (List<'static>, ListState) {
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default();
    state.select(Some(cursor));
    (list, state)
}

/// Standard screen frame: title bar, body, one-line action hints.
fn screen_chunks(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

fn draw_frame(frame: &mut Frame, area: Rect, title: &str, hints: &str) -> Rect {
    let (top, body, bottom) = screen_chunks(area);
    let header = Paragraph::new(title.to_string())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, top);
    let footer = Paragraph::new(hints.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, bottom);
    body
}

/// Draw the entire UI
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    match &app.screen {
        Screen::SelectIdentity { cursor } => draw_select_identity(frame, app, area, *cursor),
        Screen::NewIdentity(form) => draw_new_identity(frame, area, form),
        Screen::SelectIndicator { cursor, .. } => draw_select_indicator(frame, app, area, *cursor),
        Screen::Evaluate(state) => draw_evaluate(frame, app, area, state),
        Screen::ViewOpinions(state) => draw_view_opinions(frame, area, state),
    }
}

fn draw_select_identity(frame: &mut Frame, app: &App, area: Rect, cursor: usize) {
    let body = draw_frame(
        frame,
        area,
        "Who is evaluating?",
        "↑/↓ Select  Enter Confirm  Esc Cancel",
    );

    let mut items = vec![ListItem::new(Line::styled(
        "NEW IDENTITY",
        Style::default().add_modifier(Modifier::ITALIC),
    ))];
    items.extend(
        app.identities()
            .iter()
            .map(|identity| picker_item(&identity_label(identity))),
    );

    let (list, mut state) = selection_list("Choose an Identity", items, cursor);
    frame.render_stateful_widget(list, body, &mut state);
}

fn draw_new_identity(frame: &mut Frame, area: Rect, form: &IdentityForm) {
    let body = draw_frame(
        frame,
        area,
        "New Identity",
        "Tab Switch field  Enter Use  Esc Back",
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(body);

    let field = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Paragraph::new(value.to_string()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(label.to_string()),
        )
    };

    frame.render_widget(
        field(
            "What's your name?",
            &form.name,
            form.focus == FormFocus::Name,
        ),
        chunks[0],
    );
    frame.render_widget(
        field(
            "What's your email address?",
            &form.email,
            form.focus == FormFocus::Email,
        ),
        chunks[1],
    );
}

fn draw_select_indicator(frame: &mut Frame, app: &App, area: Rect, cursor: usize) {
    let body = draw_frame(
        frame,
        area,
        "Choose an Indicator",
        "↑/↓ Select  Enter Confirm  Esc Back",
    );

    let items: Vec<ListItem> = app
        .indicators()
        .iter()
        .map(|indicator| picker_item(&indicator_label(indicator)))
        .collect();

    let (list, mut state) = selection_list("Indicators", items, cursor);
    frame.render_stateful_widget(list, body, &mut state);
}

fn draw_evaluate(frame: &mut Frame, app: &App, area: Rect, state: &EvaluateState) {
    let title = format!(
        "Evaluate Indicator: {} {}",
        state.indicator.display_name(),
        state.indicator.id
    );
    let body = draw_frame(
        frame,
        area,
        &title,
        "↑/↓ Select value  Tab Switch focus  Ctrl+S Save  Esc Cancel",
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2 + app.opinion_values.len() as u16),
            Constraint::Min(3),
        ])
        .split(body);

    let focus_style = |focused: bool| {
        if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    let items: Vec<ListItem> = app
        .opinion_values
        .iter()
        .map(|value| ListItem::new(title_case(value)))
        .collect();
    let values = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(state.focus == EvaluateFocus::Values))
                .title("This indicator is effective. Do you agree or disagree?"),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        );
    let mut list_state = ListState::default();
    list_state.select(Some(state.value_cursor));
    frame.render_stateful_widget(values, chunks[0], &mut list_state);

    let explanation = Paragraph::new(state.explanation.as_str())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(state.focus == EvaluateFocus::Explanation))
                .title("Why?"),
        );
    frame.render_widget(explanation, chunks[1]);
}

fn draw_view_opinions(frame: &mut Frame, area: Rect, state: &ViewState) {
    let body = draw_frame(
        frame,
        area,
        &state.title,
        "↑/↓ Scroll  PgUp/PgDn Page  Esc Return",
    );

    let report = Paragraph::new(state.report.as_str())
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("Opinions"));
    frame.render_widget(report, body);
}
