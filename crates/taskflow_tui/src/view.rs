//! TUI view: auth card, task board, quick-add form, extract screen.
//!
//! Pure render pass over [TuiState]; nothing here mutates state. Rows are
//! composed as spans with a gap fill so tags stay right-aligned at any width.

use chrono::{Local, NaiveDate};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use taskflow_auth::{AuthMode, MessageKind};
use taskflow_core::{Priority, StatusFilter, Task};

use crate::state::{AddField, AuthField, ExtractFocus, Screen, TuiState};
use crate::theme::Palette;

/// Draw the full TUI for the current screen.
pub fn draw(frame: &mut Frame, state: &TuiState) {
    let area = frame.area();
    let background =
        Block::default().style(Style::default().bg(state.palette.background.into()));
    frame.render_widget(background, area);

    match state.screen {
        Screen::Auth => draw_auth(frame, state, area),
        Screen::Board => draw_board(frame, state, area),
        Screen::QuickAdd => draw_quick_add(frame, state, area),
        Screen::Extract => draw_extract(frame, state, area),
    }
}

// ---- Region math ----

/// Strip `height` rows starting `offset` rows into `area`.
fn strip(area: Rect, offset: u16, height: u16) -> Rect {
    let offset = offset.min(area.height);
    Rect {
        x: area.x,
        y: area.y.saturating_add(offset),
        width: area.width,
        height: height.min(area.height.saturating_sub(offset)),
    }
}

/// One column of horizontal padding on each side.
fn padded(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y,
        width: area.width.saturating_sub(2),
        height: area.height,
    }
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

/// Top, filter/context, list, status, and hint strips of a full-frame screen.
struct BoardSplits {
    header: Rect,
    filter: Rect,
    list: Rect,
    status: Rect,
    hints: Rect,
}

fn board_splits(area: Rect) -> BoardSplits {
    let list_h = area.height.saturating_sub(5);
    BoardSplits {
        header: strip(area, 0, 1),
        filter: strip(area, 1, 1),
        list: strip(area, 3, list_h.saturating_sub(1)),
        status: strip(area, area.height.saturating_sub(2), 1),
        hints: strip(area, area.height.saturating_sub(1), 1),
    }
}

/// First row index so that `selected` stays inside a `viewport`-row window.
fn window_offset(selected: usize, len: usize, viewport: usize) -> usize {
    if viewport == 0 || len <= viewport {
        return 0;
    }
    selected.saturating_sub(viewport - 1).min(len - viewport)
}

// ---- Text helpers ----

/// Truncate to a display width, appending an ellipsis when cut.
fn fit(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Left spans, a gap, then right spans, filled to `width`.
fn gap_line(left: Vec<Span<'static>>, right: Vec<Span<'static>>, width: usize) -> Line<'static> {
    let left_w: usize = left.iter().map(|s| s.width()).sum();
    let right_w: usize = right.iter().map(|s| s.width()).sum();
    let gap = width.saturating_sub(left_w + right_w);
    let mut spans = left;
    spans.push(Span::raw(" ".repeat(gap)));
    spans.extend(right);
    Line::from(spans)
}

fn priority_style(palette: &Palette, priority: Priority) -> Style {
    match priority {
        Priority::Urgent => palette.danger_style().add_modifier(Modifier::BOLD),
        Priority::High => palette.warning_style(),
        Priority::Medium => palette.accent_style(),
        Priority::Low => palette.muted_style(),
    }
}

/// Tag spans shared by board and preview rows: category, priority, due date.
fn tag_spans(task: &Task, today: NaiveDate, palette: &Palette) -> Vec<Span<'static>> {
    let mut tags = vec![
        Span::styled(format!("#{}", task.category), palette.muted_style()),
        Span::raw("  "),
        Span::styled(format!("!{}", task.priority), priority_style(palette, task.priority)),
    ];
    if let Some(due) = task.due_date {
        let style = if task.is_overdue(today) {
            palette.danger_style()
        } else {
            palette.muted_style()
        };
        tags.push(Span::raw("  "));
        tags.push(Span::styled(format!("due {due}"), style));
    }
    tags
}

fn task_line(
    task: &Task,
    selected: bool,
    today: NaiveDate,
    palette: &Palette,
    width: usize,
) -> Line<'static> {
    let (mark, mark_style) = if task.completed {
        ("[x] ", palette.success_style())
    } else {
        ("[ ] ", palette.muted_style())
    };
    let title_style = if task.completed {
        palette.done_style()
    } else {
        palette.text_style()
    };
    let tags = tag_spans(task, today, palette);
    let tags_w: usize = tags.iter().map(|s| s.width()).sum();
    let title = fit(&task.title, width.saturating_sub(4 + tags_w + 2));

    let line = gap_line(
        vec![
            Span::styled(mark.to_string(), mark_style),
            Span::styled(title, title_style),
        ],
        tags,
        width,
    );
    if selected {
        line.style(palette.selection_style())
    } else {
        line
    }
}

/// Footer status strip: busy label wins, then transient status, else blank.
fn status_line(state: &TuiState) -> Line<'static> {
    let palette = &state.palette;
    if let Some(label) = &state.busy {
        return Line::from(Span::styled(format!("{label}…"), palette.warning_style()));
    }
    if state.status.is_empty() {
        return Line::default();
    }
    let lowered = state.status.to_lowercase();
    let style = if lowered.contains("failed") || lowered.contains("error") {
        palette.danger_style()
    } else {
        palette.accent_style()
    };
    Line::from(Span::styled(state.status.clone(), style))
}

fn hint_line(text: &str, palette: &Palette) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), palette.muted_style()))
}

/// Bordered one-line input. Returns the inner rect so the caller can place
/// the cursor.
#[allow(clippy::too_many_arguments)]
fn input_box(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    masked: bool,
    placeholder: &str,
    focused: bool,
    palette: &Palette,
) -> Rect {
    let block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(palette.border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = if value.is_empty() {
        Line::from(Span::styled(placeholder.to_string(), palette.placeholder_style()))
    } else if masked {
        Line::from(Span::styled("•".repeat(value.chars().count()), palette.text_style()))
    } else {
        Line::from(Span::styled(value.to_string(), palette.text_style()))
    };
    frame.render_widget(Paragraph::new(line), inner);
    inner
}

/// Bordered pick-one field cycled with Left/Right.
fn cycle_box(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    palette: &Palette,
) {
    let block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(palette.border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let value_style = if focused {
        palette.accent_style()
    } else {
        palette.text_style()
    };
    let line = Line::from(vec![
        Span::styled("◂ ".to_string(), palette.muted_style()),
        Span::styled(value.to_string(), value_style),
        Span::styled(" ▸".to_string(), palette.muted_style()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

// ---- Auth ----

fn auth_field_label(field: AuthField) -> &'static str {
    match field {
        AuthField::Email => "Email",
        AuthField::Password => "Password",
        AuthField::Code => "Verification code",
        AuthField::NewPassword => "New password",
    }
}

fn auth_field_placeholder(field: AuthField) -> &'static str {
    match field {
        AuthField::Email => "you@example.com",
        AuthField::Code => "code from your inbox",
        AuthField::Password | AuthField::NewPassword => "",
    }
}

fn auth_hints(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::SignIn => "Enter sign in · Tab next · Ctrl+U create account · Ctrl+C quit",
        AuthMode::SignUp => "Enter create account · Tab next · Ctrl+U sign in",
        AuthMode::Verify => "Enter verify · Ctrl+R resend code · Ctrl+U sign in",
        AuthMode::NewPassword => "Enter save password · Ctrl+U sign in",
    }
}

fn draw_auth(frame: &mut Frame, state: &TuiState, area: Rect) {
    let palette = &state.palette;
    let form = &state.auth;
    let fields = form.fields();
    let card = centered(area, 46, fields.len() as u16 * 3 + 6);
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.surface.into())),
        card,
    );

    let title = Line::from(Span::styled(form.mode.title().to_string(), palette.title_style()));
    frame.render_widget(
        Paragraph::new(title).alignment(Alignment::Center),
        strip(card, 0, 1),
    );

    let mut cursor = None;
    for (i, field) in fields.iter().enumerate() {
        let rect = strip(card, 2 + i as u16 * 3, 3);
        let focused = form.focused() == *field;
        let masked = matches!(field, AuthField::Password | AuthField::NewPassword);
        let value = form.value(*field);
        let inner = input_box(
            frame,
            rect,
            auth_field_label(*field),
            value,
            masked,
            auth_field_placeholder(*field),
            focused,
            palette,
        );
        if focused {
            let w = if masked {
                value.chars().count()
            } else {
                value.width()
            };
            cursor = Some((inner.x + (w as u16).min(inner.width), inner.y));
        }
    }
    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }

    let message_rect = strip(card, 2 + fields.len() as u16 * 3, 2);
    if let Some(message) = &form.message {
        let style = match message.kind {
            MessageKind::Info => palette.accent_style(),
            MessageKind::Error => palette.danger_style(),
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(message.text.clone(), style)))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, message_rect);
    }

    let bottom = strip(card, card.height.saturating_sub(1), 1);
    let line = if let Some(label) = &state.busy {
        Line::from(Span::styled(format!("{label}…"), palette.warning_style()))
    } else {
        hint_line(auth_hints(form.mode), palette)
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), bottom);
}

// ---- Board ----

fn draw_board(frame: &mut Frame, state: &TuiState, area: Rect) {
    let palette = &state.palette;
    let splits = board_splits(area);
    let today = Local::now().date_naive();

    let header = padded(splits.header);
    let user = state.username.clone().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(gap_line(
            vec![Span::styled("taskflow".to_string(), palette.title_style())],
            vec![Span::styled(user, palette.muted_style())],
            header.width as usize,
        )),
        header,
    );

    let filter = padded(splits.filter);
    frame.render_widget(
        Paragraph::new(filter_line(state, filter.width as usize)),
        filter,
    );

    let list = padded(splits.list);
    let visible = state.visible();
    if visible.is_empty() {
        let (title, sub) = if state.tasks.is_empty() {
            ("No tasks yet", "Press a to add one, or x to extract from text")
        } else {
            ("Nothing matches this filter", "Tab cycles status, c cycles category")
        };
        let lines = vec![
            Line::default(),
            Line::from(Span::styled(title.to_string(), palette.text_style())),
            Line::default(),
            Line::from(Span::styled(sub.to_string(), palette.muted_style())),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), list);
    } else {
        let offset = window_offset(state.selected, visible.len(), list.height as usize);
        let rows: Vec<Line> = visible
            .iter()
            .enumerate()
            .skip(offset)
            .take(list.height as usize)
            .map(|(i, task)| task_line(task, i == state.selected, today, palette, list.width as usize))
            .collect();
        frame.render_widget(Paragraph::new(rows), list);
    }

    frame.render_widget(Paragraph::new(status_line(state)), padded(splits.status));
    frame.render_widget(
        Paragraph::new(hint_line(
            "space toggle · a add · x extract · d delete · tab status · c category · r reload · q quit",
            palette,
        )),
        padded(splits.hints),
    );
}

fn filter_line(state: &TuiState, width: usize) -> Line<'static> {
    let palette = &state.palette;
    let mut left = Vec::new();
    for status in [StatusFilter::All, StatusFilter::Active, StatusFilter::Completed] {
        let style = if state.filter.status == status {
            palette.accent_style().add_modifier(Modifier::BOLD)
        } else {
            palette.muted_style()
        };
        left.push(Span::styled(status.label().to_string(), style));
        left.push(Span::raw("  "));
    }
    left.push(Span::styled("· category ".to_string(), palette.muted_style()));
    match state.filter.category {
        Some(category) => left.push(Span::styled(category.to_string(), palette.accent_style())),
        None => left.push(Span::styled("all".to_string(), palette.muted_style())),
    }

    let counts = state.counts();
    let right = vec![Span::styled(
        format!(
            "{} active · {} done · {} total",
            counts.active, counts.completed, counts.total
        ),
        palette.muted_style(),
    )];
    gap_line(left, right, width)
}

// ---- Quick add ----

fn draw_quick_add(frame: &mut Frame, state: &TuiState, area: Rect) {
    let palette = &state.palette;
    let form = &state.add;
    let card = centered(area, 46, 18);
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.surface.into())),
        card,
    );

    let title = Line::from(Span::styled("Add task".to_string(), palette.title_style()));
    frame.render_widget(
        Paragraph::new(title).alignment(Alignment::Center),
        strip(card, 0, 1),
    );

    let title_inner = input_box(
        frame,
        strip(card, 2, 3),
        "Title",
        &form.title,
        false,
        "What needs doing?",
        form.focus == AddField::Title,
        palette,
    );
    cycle_box(
        frame,
        strip(card, 5, 3),
        "Category",
        form.category.as_str(),
        form.focus == AddField::Category,
        palette,
    );
    cycle_box(
        frame,
        strip(card, 8, 3),
        "Priority",
        form.priority.as_str(),
        form.focus == AddField::Priority,
        palette,
    );
    let due_inner = input_box(
        frame,
        strip(card, 11, 3),
        "Due",
        &form.due,
        false,
        "YYYY-MM-DD, optional",
        form.focus == AddField::Due,
        palette,
    );

    match form.focus {
        AddField::Title => frame.set_cursor_position((
            title_inner.x + (form.title.width() as u16).min(title_inner.width),
            title_inner.y,
        )),
        AddField::Due => frame.set_cursor_position((
            due_inner.x + (form.due.width() as u16).min(due_inner.width),
            due_inner.y,
        )),
        AddField::Category | AddField::Priority => {}
    }

    let bottom = strip(card, card.height.saturating_sub(2), 1);
    let line = if let Some(label) = &state.busy {
        Line::from(Span::styled(format!("{label}…"), palette.warning_style()))
    } else if !state.status.is_empty() {
        Line::from(Span::styled(state.status.clone(), palette.danger_style()))
    } else {
        hint_line("Enter save · Tab next · ◂ ▸ change · Esc cancel", palette)
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), bottom);
}

// ---- Extract ----

fn draw_extract(frame: &mut Frame, state: &TuiState, area: Rect) {
    let palette = &state.palette;
    let panel = &state.extract;
    let input_h = 8u16.min(area.height.saturating_sub(6));
    let results_h = area
        .height
        .saturating_sub(1 + input_h + 2);

    let header = padded(strip(area, 0, 1));
    let user = state.username.clone().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(gap_line(
            vec![Span::styled("Extract tasks".to_string(), palette.title_style())],
            vec![Span::styled(user, palette.muted_style())],
            header.width as usize,
        )),
        header,
    );

    let input_rect = strip(area, 1, input_h);
    let input_focused = panel.focus == ExtractFocus::Input;
    let block = Block::default()
        .title(format!(" Text · mode ◂ {} ▸ ", panel.mode))
        .borders(Borders::ALL)
        .border_style(palette.border_style(input_focused));
    let inner = block.inner(input_rect);
    frame.render_widget(block, input_rect);
    if panel.text.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Paste notes, an email, or meeting minutes".to_string(),
                palette.placeholder_style(),
            ))),
            inner,
        );
    } else {
        let lines: Vec<Line> = panel
            .text
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), palette.text_style())))
            .collect();
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    let results_rect = strip(area, 1 + input_h, results_h);
    draw_extract_results(frame, state, results_rect);

    frame.render_widget(
        Paragraph::new(status_line(state)),
        padded(strip(area, area.height.saturating_sub(2), 1)),
    );
    let hints = match panel.focus {
        ExtractFocus::Input => "Ctrl+E extract · ◂ ▸ mode · Tab preview · Esc board",
        ExtractFocus::Results => "Enter add · a add all · j/k move · Tab text · Esc board",
    };
    frame.render_widget(
        Paragraph::new(hint_line(hints, palette)),
        padded(strip(area, area.height.saturating_sub(1), 1)),
    );
}

fn draw_extract_results(frame: &mut Frame, state: &TuiState, area: Rect) {
    let palette = &state.palette;
    let panel = &state.extract;
    let today = Local::now().date_naive();

    let title = match (panel.engine, panel.elapsed_ms) {
        (Some(engine), Some(ms)) => format!(
            " Preview · {} found · {} engine · {} ms ",
            panel.results.len(),
            engine,
            ms
        ),
        _ => " Preview ".to_string(),
    };
    let focused = panel.focus == ExtractFocus::Results;
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(palette.border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if panel.results.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Ctrl+E previews the tasks found in the text above".to_string(),
                palette.placeholder_style(),
            ))),
            inner,
        );
        return;
    }

    let offset = window_offset(panel.selected, panel.results.len(), inner.height as usize);
    let rows: Vec<Line> = panel
        .results
        .iter()
        .enumerate()
        .skip(offset)
        .take(inner.height as usize)
        .map(|(i, task)| {
            let tags = tag_spans(task, today, palette);
            let tags_w: usize = tags.iter().map(|s| s.width()).sum();
            let width = inner.width as usize;
            let title = fit(&task.title, width.saturating_sub(2 + tags_w + 2));
            let line = gap_line(
                vec![
                    Span::styled("+ ".to_string(), palette.accent_style()),
                    Span::styled(title, palette.text_style()),
                ],
                tags,
                width,
            );
            if focused && i == panel.selected {
                line.style(palette.selection_style())
            } else {
                line
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(rows), inner);
}
