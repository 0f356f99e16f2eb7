//! Rendering routines for the bug tracker TUI.

use crate::app::{App, Screen};
use crate::form::{BugForm, FormField, FormMode};
use crate::state::ListState;
use bugtracker_rs_protocol::{BugPriority, BugRecord, BugStatus};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation,
    ScrollbarState, Wrap,
};

const PRIMARY: Color = Color::Rgb(236, 91, 43); // #EC5B2B
const SECONDARY: Color = Color::Rgb(238, 121, 72); // #EE7948
const TEXT: Color = Color::Rgb(238, 238, 238); // #eeeeee
const TEXT_MUTED: Color = Color::Rgb(128, 128, 128); // #808080
const BORDER: Color = Color::Rgb(60, 60, 60); // #3c3c3c
const BORDER_ACTIVE: Color = Color::Rgb(238, 121, 72); // #EE7948
const YELLOW: Color = Color::Rgb(229, 192, 123); // #e5c07b
const GREEN: Color = Color::Rgb(120, 220, 140);
const RED: Color = Color::Rgb(255, 110, 110);
const POPUP_BG: Color = Color::Rgb(20, 20, 20);

const HEADER_HEIGHT: u16 = 4; // 2 inner lines + 2 border lines
const FORM_WIDTH: u16 = 70;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draw the entire TUI frame.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT), // header bar
            Constraint::Length(3),             // filters
            Constraint::Min(0),                // bug list
            Constraint::Length(1),             // status bar
        ])
        .split(area);

    draw_header(frame, app, root[0]);
    draw_filters(frame, app, root[1]);
    draw_list(frame, app, root[2]);
    draw_status_bar(frame, app, root[3]);

    match &app.screen {
        Screen::List => {}
        Screen::Form(form) => draw_form(frame, form, area),
        Screen::ConfirmDelete { title, .. } => draw_confirm(frame, title, area),
    }
}

fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label_style = Style::default().fg(TEXT_MUTED);
    let value_style = Style::default().fg(TEXT);
    let bugs = app.tracker.bugs();
    let open = bugs
        .iter()
        .filter(|bug| bug.status == BugStatus::Open)
        .count();

    let lines = vec![
        Line::from(vec![
            Span::styled(
                " Bug Tracker",
                Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  v{VERSION}"), label_style),
        ]),
        Line::from(vec![
            Span::styled(" api ", label_style),
            Span::styled(app.base_url.as_str(), value_style),
            Span::styled("  total ", label_style),
            Span::styled(bugs.len().to_string(), value_style),
            Span::styled("  open ", label_style),
            Span::styled(open.to_string(), value_style),
            Span::styled("  shown ", label_style),
            Span::styled(app.tracker.visible().len().to_string(), value_style),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_filters(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let filter = app.tracker.filter();
    let border_color = if app.searching { BORDER_ACTIVE } else { BORDER };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            if app.searching { " Search " } else { " Filters " },
            Style::default().fg(if app.searching { SECONDARY } else { TEXT_MUTED }),
        ));
    let inner = block.inner(area);

    let label_style = Style::default().fg(TEXT_MUTED);
    let status = filter.status.map(BugStatus::as_str).unwrap_or("all");
    let priority = filter.priority.map(BugPriority::as_str).unwrap_or("all");
    let search_style = if app.searching {
        Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT)
    };

    let line = Line::from(vec![
        Span::styled(" status ", label_style),
        Span::styled(status, Style::default().fg(SECONDARY)),
        Span::styled("  priority ", label_style),
        Span::styled(priority, Style::default().fg(SECONDARY)),
        Span::styled("  search ", label_style),
        Span::styled(filter.search.as_str(), search_style),
    ]);

    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(line), inner);

    if app.searching {
        let offset = " status ".len()
            + status.len()
            + "  priority ".len()
            + priority.len()
            + "  search ".len()
            + filter.search.chars().count();
        frame.set_cursor_position((inner.x + offset as u16, inner.y));
    }
}

fn draw_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(" Bugs ", Style::default().fg(TEXT_MUTED)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = match app.tracker.list_state() {
        ListState::Loading => vec![Line::from(Span::styled(
            " Loading bugs...",
            Style::default().fg(TEXT_MUTED),
        ))],
        ListState::Error(message) => vec![
            Line::from(Span::styled(
                format!(" Failed to load bugs: {message}"),
                Style::default().fg(RED),
            )),
            Line::from(""),
            Line::from(Span::styled(
                " Press r to retry",
                Style::default().fg(TEXT_MUTED),
            )),
        ],
        ListState::Empty if app.tracker.bugs().is_empty() => vec![Line::from(Span::styled(
            " No bugs yet. Press n to report one.",
            Style::default().fg(TEXT_MUTED),
        ))],
        ListState::Empty => vec![Line::from(Span::styled(
            " No bugs match the current filters. Press c to clear them.",
            Style::default().fg(TEXT_MUTED),
        ))],
        ListState::Populated => {
            draw_rows(frame, app, inner);
            return;
        }
    };
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Column header plus one line per visible bug, scrolled to keep the
/// selection in view.
fn draw_rows(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let visible = app.tracker.visible();
    let heading = Style::default().fg(TEXT_MUTED).add_modifier(Modifier::BOLD);
    let header = vec![
        Line::from(vec![
            Span::styled("   ", Style::default()),
            Span::styled(format!("{:<13}", "Status"), heading),
            Span::styled(format!("{:<10}", "Priority"), heading),
            Span::styled(format!("{:<12}", "Assignee"), heading),
            Span::styled(format!("{:<12}", "Updated"), heading),
            Span::styled("Title", heading),
        ]),
        Line::from(Span::styled(
            " ─".to_string() + &"─".repeat(area.width.saturating_sub(3) as usize),
            Style::default().fg(BORDER),
        )),
    ];
    let header_height = header.len() as u16;
    let header_area = Rect {
        height: header_height.min(area.height),
        ..area
    };
    frame.render_widget(Paragraph::new(header), header_area);

    let rows_area = Rect {
        y: area.y + header_area.height,
        height: area.height.saturating_sub(header_area.height),
        width: area.width.saturating_sub(1), // -1 for scrollbar
        ..area
    };
    let height = rows_area.height as usize;
    if height == 0 {
        return;
    }
    let offset = app.selected.saturating_sub(height - 1);

    let lines: Vec<Line<'_>> = visible
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(idx, bug)| render_bug_line(bug, idx == app.selected))
        .collect();
    frame.render_widget(Paragraph::new(lines), rows_area);

    if visible.len() > height {
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(visible.len())
            .position(app.selected)
            .viewport_content_length(height);
        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: rows_area.y,
            width: 1,
            height: rows_area.height,
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .style(Style::default().fg(BORDER))
                .thumb_style(Style::default().fg(TEXT_MUTED)),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }
}

fn render_bug_line(bug: &BugRecord, selected: bool) -> Line<'static> {
    let (prefix, style) = if selected {
        (
            Span::styled(" ▸ ", Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)),
            Style::default().fg(PRIMARY),
        )
    } else {
        (Span::styled("   ", Style::default()), Style::default().fg(TEXT))
    };
    let status_style = if selected {
        style
    } else {
        Style::default().fg(status_color(bug.status))
    };
    let priority_style = if selected {
        style
    } else {
        Style::default().fg(priority_color(bug.priority))
    };
    let mut title = bug.title.clone();
    if !bug.tags.is_empty() {
        title.push_str(&format!("  [{}]", bug.tags.join(", ")));
    }

    Line::from(vec![
        prefix,
        Span::styled(format!("{:<13}", bug.status.as_str()), status_style),
        Span::styled(format!("{:<10}", bug.priority.as_str()), priority_style),
        Span::styled(
            format!("{:<12}", truncate(bug.assignee.as_deref().unwrap_or("-"), 11)),
            style,
        ),
        Span::styled(format!("{:<12}", bug.updated_at.format("%Y-%m-%d")), style),
        Span::styled(title, style),
    ])
}

fn status_color(status: BugStatus) -> Color {
    match status {
        BugStatus::Open => SECONDARY,
        BugStatus::InProgress => YELLOW,
        BugStatus::Resolved => GREEN,
        BugStatus::Closed => TEXT_MUTED,
    }
}

fn priority_color(priority: BugPriority) -> Color {
    match priority {
        BugPriority::Low => TEXT_MUTED,
        BugPriority::Medium => TEXT,
        BugPriority::High => YELLOW,
        BugPriority::Critical => RED,
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn draw_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let status_color = match app.status.as_str() {
        "loading" | "saving" | "deleting" => PRIMARY,
        "idle" => TEXT_MUTED,
        _ => YELLOW,
    };

    let hints: &[(&str, &str)] = match &app.screen {
        Screen::List if app.searching => &[(" Enter/Esc", " done"), ("  Backspace", " delete")],
        Screen::List => &[
            (" q", " quit"),
            ("  j/k", " move"),
            ("  n", " new"),
            ("  e", " edit"),
            ("  x", " advance"),
            ("  d", " delete"),
            ("  s/p", " filter"),
            ("  /", " search"),
            ("  c", " clear"),
            ("  r", " reload"),
        ],
        Screen::Form(_) => &[
            (" Tab", " next"),
            ("  ←/→", " cycle"),
            ("  Enter", " save"),
            ("  Esc", " cancel"),
        ],
        Screen::ConfirmDelete { .. } => &[(" y", " delete"), ("  n", " keep")],
    };
    let shortcuts: Vec<Span<'_>> = hints
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, Style::default().fg(TEXT_MUTED)),
                Span::styled(*label, Style::default().fg(BORDER)),
            ]
        })
        .collect();

    let right_text = format!(" {} ", app.status);
    let right_len = right_text.chars().count() as u16;
    let left_area = Rect {
        width: area.width.saturating_sub(right_len),
        ..area
    };
    let right_area = Rect {
        x: area.x + area.width.saturating_sub(right_len),
        width: right_len.min(area.width),
        ..area
    };

    frame.render_widget(Paragraph::new(Line::from(shortcuts)), left_area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            right_text,
            Style::default().fg(status_color),
        ))),
        right_area,
    );
}

fn draw_form(frame: &mut Frame<'_>, form: &BugForm, area: Rect) {
    let title = match form.mode {
        FormMode::Create => " New Bug ",
        FormMode::Edit(_) => " Edit Bug ",
    };
    let label_width = FormField::ORDER
        .iter()
        .map(|field| field.label().len())
        .max()
        .unwrap_or_default()
        + 2;

    let mut lines: Vec<Line<'_>> = vec![Line::from("")];
    for field in FormField::ORDER {
        let focused = field == form.focus;
        let label_style = if focused {
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_MUTED)
        };
        let marker = if focused { " ▸ " } else { "   " };
        let value = match field {
            FormField::Status | FormField::Priority => format!("‹ {} ›", form.value(field)),
            _ => form.value(field).to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<label_width$}", field.label()), label_style),
            Span::styled(value, Style::default().fg(TEXT)),
        ]));
    }
    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(RED),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " Tags are comma separated",
            Style::default()
                .fg(TEXT_MUTED)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let width = FORM_WIDTH.min(area.width);
    let inner_width = width.saturating_sub(2);
    let text_height = Paragraph::new(lines.clone())
        .wrap(Wrap { trim: false })
        .line_count(inner_width) as u16;
    let popup = centered(area, width, text_height + 2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(PRIMARY))
        .title(Span::styled(
            title,
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(POPUP_BG));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        popup,
    );

    if !matches!(form.focus, FormField::Status | FormField::Priority) {
        let row = FormField::ORDER
            .iter()
            .position(|field| *field == form.focus)
            .unwrap_or_default() as u16;
        let col = 3 + label_width + form.value(form.focus).chars().count();
        let x = (popup.x + 1 + col as u16).min(popup.right().saturating_sub(2));
        frame.set_cursor_position((x, popup.y + 2 + row));
    }
}

fn draw_confirm(frame: &mut Frame<'_>, title: &str, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Delete ", Style::default().fg(TEXT)),
            Span::styled(
                format!("\"{}\"", truncate(title, 40)),
                Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled("?", Style::default().fg(TEXT)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " y to delete, n to keep",
            Style::default().fg(TEXT_MUTED),
        )),
    ];
    let popup = centered(area, 60, lines.len() as u16 + 2);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(RED))
        .title(Span::styled(
            " Confirm ",
            Style::default().fg(RED).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(POPUP_BG));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
