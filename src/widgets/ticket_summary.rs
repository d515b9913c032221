use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::edit_ticket::{priority_style, status_style};
use crate::app::App;
use crate::ticket::Ticket;

/// Read-only view of the canonical ticket, shown behind the edit form.
pub fn render(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.ticket_path.display()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let ticket = match app.record.as_deref() {
        Some(t) => t,
        None => {
            let empty = Paragraph::new("(no ticket loaded, press r to reload)")
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, inner);
            return;
        }
    };

    // Split into body and footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let body = Paragraph::new(summary_lines(ticket, &app.unassigned_label)).wrap(Wrap { trim: false });
    f.render_widget(body, chunks[0]);

    let footer = Paragraph::new(Line::from(Span::styled(
        "[e] edit   [r] reload   [?] keys   [q] quit",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(footer, chunks[1]);
}

fn summary_lines(ticket: &Ticket, unassigned: &str) -> Vec<Line<'static>> {
    let key = Style::default().fg(Color::DarkGray);
    let mut lines: Vec<Line> = Vec::new();

    let mut title = vec![Span::styled(
        ticket.title.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    if ticket.is_urgent {
        title.push(Span::styled(
            "  URGENT",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::from(title));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::styled("Status: ", key),
        Span::styled(format!(" {} ", ticket.status.as_str()), status_style(ticket.status)),
        Span::styled("    Priority: ", key),
        Span::styled(ticket.priority.as_str(), priority_style(ticket.priority)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Incident date: ", key),
        Span::raw(ticket.incident_date.format("%Y-%m-%d").to_string()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Requester: ", key),
        Span::raw(ticket.requester.clone()),
        Span::styled("    Location: ", key),
        Span::raw(ticket.location.clone().unwrap_or_else(|| "-".to_string())),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Responsible: ", key),
        Span::raw(
            ticket
                .responsible
                .clone()
                .unwrap_or_else(|| unassigned.to_string()),
        ),
    ]));
    if let Some(image) = &ticket.image {
        lines.push(Line::from(vec![
            Span::styled("Image: ", key),
            Span::raw(super::image_preview::short_label(image)),
        ]));
    }
    lines.push(Line::from(""));

    for line in ticket.description.lines() {
        lines.push(Line::from(Span::styled(
            line.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }
    lines
}
