use lingodocs_shared::DocumentStatus;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, FormField, FormState, Mode, LANGUAGES};

/// Color for a status chip, matching the web dashboard's palette
fn status_color(status: DocumentStatus) -> Color {
    match status {
        DocumentStatus::Completed => Color::Green,
        DocumentStatus::Pending => Color::Yellow,
        DocumentStatus::Rejected => Color::Red,
        DocumentStatus::Processing => Color::Blue,
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Toolbar
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Pagination footer
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_toolbar(f, chunks[1], app);
    draw_table(f, chunks[2], app);
    draw_pagination(f, chunks[3], app);
    draw_status_bar(f, chunks[4], app);

    if let Some(form) = &app.form {
        draw_form_popup(f, form);
    }

    if app.mode == Mode::ConfirmDelete {
        draw_delete_confirm_popup(f, app);
    }

    // Draw error overlay if present
    if let Some(ref error) = app.error_message {
        draw_error_popup(f, error);
    }

    // Draw loading overlay if loading
    if app.loading {
        draw_loading_overlay(f, &app.loading_message);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "LINGODOCS",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    if let Some(metrics) = &app.metrics {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("users {}", metrics.users),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("online {}", metrics.current_users),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("active {}", metrics.active_users),
            Style::default().fg(Color::Yellow),
        ));
    }

    let header =
        Paragraph::new(vec![Line::from(spans)]).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_toolbar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("sort: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} {}", app.sort_column.label(), app.sort_direction.arrow()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled("per page: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.per_page.to_string(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
    ];

    if app.mode == Mode::Search {
        spans.push(Span::styled("search: ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            format!("{}_", app.search_input),
            Style::default().fg(Color::Yellow),
        ));
    } else if !app.search.is_empty() {
        spans.push(Span::styled("search: ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            app.search.as_str(),
            Style::default().fg(Color::Yellow),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = &app.page_data else {
        let empty = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Documents "));
        f.render_widget(empty, area);
        return;
    };

    if page.data.is_empty() {
        let message = if app.search.is_empty() {
            "No documents yet. Press 'n' to upload one."
        } else {
            "No documents match the search."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Documents "));
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Original Language"),
        Cell::from("Convert Language"),
        Cell::from("Status"),
        Cell::from("Updated"),
    ])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = page
        .data
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let bg = if i == app.selected_row {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(doc.name.clone()).style(bg.fg(Color::White)),
                Cell::from(doc.current_language.clone()).style(bg),
                Cell::from(doc.process_language.clone()).style(bg),
                Cell::from(doc.status.as_str()).style(bg.fg(status_color(doc.status))),
                Cell::from(doc.updated_at.format("%Y-%m-%d %H:%M").to_string())
                    .style(bg.fg(Color::DarkGray)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(18),
            Constraint::Percentage(18),
            Constraint::Percentage(12),
            Constraint::Percentage(17),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" Documents ({}) ", page.total))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(table, area);
}

fn draw_pagination(f: &mut Frame, area: Rect, app: &App) {
    let (total, last_page) = app
        .page_data
        .as_ref()
        .map(|p| (p.total, p.last_page))
        .unwrap_or((0, 1));

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        format!("page {}/{} | {} total", app.page, last_page, total),
        Style::default().fg(Color::DarkGray),
    )]))
    .alignment(Alignment::Right);

    f.render_widget(footer, area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (mode, mode_color) = match app.mode {
        Mode::Normal => ("NORMAL", Color::Blue),
        Mode::Search => ("SEARCH", Color::Yellow),
        Mode::Form => ("FORM", Color::Green),
        Mode::ConfirmDelete => ("DELETE", Color::Red),
    };

    let hints = match app.mode {
        Mode::Normal => {
            "n: new | e: edit | d: delete | /: search | o/O: sort | p: per page | h/l: page | r: refresh | q: quit"
        }
        Mode::Search => "Type to filter | Enter: apply | Esc: cancel",
        Mode::Form => "Tab: next field | Left/Right: change option | Enter: save | Esc: cancel",
        Mode::ConfirmDelete => "y: confirm | n/Esc: cancel",
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", mode),
            Style::default().bg(mode_color).fg(Color::White),
        ),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]));

    f.render_widget(status, area);
}

fn field_title(label: &str, errors: &lingodocs_shared::api::FieldErrors, key: &str) -> String {
    match errors.get(key).and_then(|messages| messages.first()) {
        Some(message) => format!(" {} - {} ", label, message),
        None => format!(" {} ", label),
    }
}

fn draw_form_popup(f: &mut Frame, form: &FormState) {
    let area = centered_rect(60, 70, f.area());

    f.render_widget(Clear, area);

    let title = if form.editing_id.is_some() {
        " Edit Document "
    } else {
        " New Document "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(3), // File path
            Constraint::Length(3), // Original language
            Constraint::Length(3), // Convert language
            Constraint::Length(3), // Status
            Constraint::Length(2), // Hint
            Constraint::Min(0),    // Spacer
        ])
        .split(inner);

    let field_style = |field: FormField| -> Style {
        if form.field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let error_style = |key: &str, style: Style| -> Style {
        if form.errors.contains_key(key) {
            Style::default().fg(Color::Red)
        } else {
            style
        }
    };

    // Name field
    let name_block = Block::default()
        .title(field_title("Name", &form.errors, "name"))
        .borders(Borders::ALL)
        .border_style(error_style("name", field_style(FormField::Name)));
    f.render_widget(
        Paragraph::new(form.name.as_str()).block(name_block),
        chunks[0],
    );

    // File path field
    let file_label = if form.editing_id.is_some() {
        "File path (blank keeps current file)"
    } else {
        "File path"
    };
    let file_block = Block::default()
        .title(field_title(file_label, &form.errors, "document"))
        .borders(Borders::ALL)
        .border_style(error_style("document", field_style(FormField::File)));
    f.render_widget(
        Paragraph::new(form.file_path.as_str()).block(file_block),
        chunks[1],
    );

    // Original language selector
    let current_block = Block::default()
        .title(field_title(
            "Original Language",
            &form.errors,
            "current_language",
        ))
        .borders(Borders::ALL)
        .border_style(field_style(FormField::CurrentLanguage));
    f.render_widget(
        Paragraph::new(LANGUAGES[form.current_language_idx]).block(current_block),
        chunks[2],
    );

    // Convert language selector
    let process_block = Block::default()
        .title(field_title(
            "Convert Language",
            &form.errors,
            "process_language",
        ))
        .borders(Borders::ALL)
        .border_style(field_style(FormField::ProcessLanguage));
    f.render_widget(
        Paragraph::new(LANGUAGES[form.process_language_idx]).block(process_block),
        chunks[3],
    );

    // Status selector
    let status = DocumentStatus::ALL[form.status_idx];
    let status_block = Block::default()
        .title(field_title("Status", &form.errors, "status"))
        .borders(Borders::ALL)
        .border_style(field_style(FormField::Status));
    f.render_widget(
        Paragraph::new(Span::styled(
            status.as_str(),
            Style::default().fg(status_color(status)),
        ))
        .block(status_block),
        chunks[4],
    );

    // Hint
    let hint = Paragraph::new("Tab: next field | Enter: save | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[5]);

    // Set cursor position in text fields
    let cursor = match form.field {
        FormField::Name => Some((form.name.as_str(), chunks[0])),
        FormField::File => Some((form.file_path.as_str(), chunks[1])),
        _ => None,
    };
    if let Some((text, area)) = cursor {
        f.set_cursor_position((area.x + 1 + cursor_column(text, area.width), area.y + 1));
    }
}

fn draw_delete_confirm_popup(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 20, f.area());

    f.render_widget(Clear, area);

    let document_name = app
        .delete_target
        .as_ref()
        .map(|d| d.name.as_str())
        .unwrap_or("Unknown");

    let block = Block::default()
        .title(" Confirm Delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Message
            Constraint::Length(2), // Hint
            Constraint::Min(0),    // Spacer
        ])
        .split(inner);

    let message = Paragraph::new(vec![
        Line::from(Span::raw("Delete document:")),
        Line::from(Span::styled(
            format!("\"{}\"", document_name),
            Style::default().fg(Color::Yellow),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(message, chunks[0]);

    let hint = Paragraph::new("y: yes, delete | n: no, cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);
}

fn draw_loading_overlay(f: &mut Frame, message: &str) {
    let area = centered_rect(40, 10, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Loading ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(block);

    f.render_widget(text, area);
}

fn draw_error_popup(f: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(text, area);
}

/// Cursor offset within a bordered input: characters typed, not bytes, and
/// never past the field's inner width.
fn cursor_column(text: &str, field_width: u16) -> u16 {
    let chars = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    chars.min(field_width.saturating_sub(2))
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_column_counts_characters_not_bytes() {
        assert_eq!(cursor_column("name", 40), 4);
        assert_eq!(cursor_column("r\u{e9}sum\u{e9}", 40), 6);
    }

    #[test]
    fn cursor_column_stays_inside_the_field() {
        let long = "x".repeat(100);
        assert_eq!(cursor_column(&long, 20), 18);
        assert_eq!(cursor_column(&long, 1), 0);
    }
}
