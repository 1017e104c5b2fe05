use std::time::Instant;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::app::{EntryForm, FormField, Journal};
use crate::config::Palette;
use crate::render::Rendered;
use crate::storage::KeyValueStore;
use crate::toast::{Toast, ToastKind, ToastPhase};

pub fn draw_app<S: KeyValueStore>(
    frame: &mut Frame,
    journal: &Journal<S>,
    scroll: u16,
    now: Instant,
) {
    let palette = journal.theme().current().palette();
    let base = Style::default().fg(palette.foreground).bg(palette.background);
    frame.render_widget(Block::default().style(base), frame.size());

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_header(frame, vertical[0], journal, &palette);

    let rendered = journal.render_all();
    let list = Paragraph::new(entry_lines(&rendered, &palette))
        .block(
            Block::default()
                .title(format!(" Logs ({}) ", journal.entries().len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(list, vertical[1]);

    let hints = if journal.form().is_open() {
        "Tab switch field • Enter next/newline • Ctrl-s save • Esc cancel"
    } else {
        "n new log • t theme • j/k scroll • q quit"
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(palette.muted)),
        vertical[2],
    );

    if journal.form().is_open() {
        draw_dialog(frame, journal.form(), &palette);
    }
    if let Some((toast, phase)) = journal.toast().current(now) {
        draw_toast(frame, toast, phase, &palette);
    }
}

fn draw_header<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    journal: &Journal<S>,
    palette: &Palette,
) {
    let label = journal.theme().toggle_label();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(label.width() as u16 + 6),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "Logbook",
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, columns[0]);

    let toggle = Paragraph::new(Line::from(vec![
        Span::styled("[t] ", Style::default().fg(palette.muted)),
        Span::raw(label),
    ]));
    frame.render_widget(toggle, columns[1]);
}

/// One line per visual row of the rendered list.
pub fn entry_lines(rendered: &Rendered, palette: &Palette) -> Text<'static> {
    match rendered {
        Rendered::Placeholder(text) => Text::from(Line::from(Span::styled(
            *text,
            Style::default().add_modifier(Modifier::BOLD),
        ))),
        Rendered::Blocks(blocks) => {
            let mut lines = Vec::new();
            for (idx, block) in blocks.iter().enumerate() {
                if idx > 0 {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(vec![
                    Span::styled(
                        block.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        format!(" {} ", block.date),
                        Style::default().fg(palette.background).bg(palette.badge),
                    ),
                ]));
                for line in block.body.lines() {
                    lines.push(Line::from(line.to_owned()));
                }
            }
            Text::from(lines)
        }
    }
}

fn draw_dialog(frame: &mut Frame, form: &EntryForm, palette: &Palette) {
    let area = centered_rect(60, 60, frame.size());
    frame.render_widget(Clear, area);
    let outer = Block::default()
        .title(" New log ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().fg(palette.foreground).bg(palette.background));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(inner);

    frame.render_widget(
        field_widget(form, FormField::Title, form.title(), palette),
        rows[0],
    );
    frame.render_widget(
        field_widget(form, FormField::Body, form.body(), palette),
        rows[1],
    );
}

fn field_widget<'a>(
    form: &EntryForm,
    field: FormField,
    value: &'a str,
    palette: &Palette,
) -> Paragraph<'a> {
    let name = match field {
        FormField::Title => "Title",
        FormField::Body => "Body",
    };
    let focused = form.focus() == field;
    let (label, border) = if form.is_invalid(field) {
        (format!(" {name} (required) "), Style::default().fg(palette.error))
    } else if focused {
        (format!(" {name} "), Style::default().fg(palette.accent))
    } else {
        (format!(" {name} "), Style::default().fg(palette.muted))
    };

    let mut lines: Vec<Line<'a>> = value.split('\n').map(Line::from).collect();
    if focused {
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::styled("▌", Style::default().fg(palette.accent)));
        }
    }

    Paragraph::new(lines)
        .block(
            Block::default()
                .title(label)
                .borders(Borders::ALL)
                .border_style(border),
        )
        .wrap(Wrap { trim: false })
}

fn draw_toast(frame: &mut Frame, toast: &Toast, phase: ToastPhase, palette: &Palette) {
    let screen = frame.size();
    let text = format!("{} {}", toast.kind.icon(), toast.message);
    let width = (text.width() as u16 + 4).min(screen.width);
    let area = Rect {
        x: screen.x + screen.width.saturating_sub(width + 1),
        y: screen.y + 1,
        width,
        height: 3,
    }
    .intersection(screen);
    if area.is_empty() {
        return;
    }

    let color = match toast.kind {
        ToastKind::Success => palette.success,
        ToastKind::Error => palette.error,
    };
    let mut style = Style::default().fg(color).bg(palette.background);
    if phase == ToastPhase::Exiting {
        style = style.add_modifier(Modifier::DIM);
    }

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(style)),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
