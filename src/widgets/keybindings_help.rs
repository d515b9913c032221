use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::form;

fn heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

pub fn render(f: &mut ratatui::Frame) {
    let area = form::centered_rect(64, 66, f.area());
    let inner = form::render_modal_frame(f, "Keybindings", area);

    let lines = vec![
        heading("Ticket"),
        Line::from("  e / Enter: edit ticket"),
        Line::from("  r: reload ticket file"),
        Line::from("  q: quit (prints the saved ticket as JSON)"),
        Line::from(""),
        heading("Edit form"),
        Line::from("  Tab / Shift+Tab: next / previous field"),
        Line::from("  Up / Down: move between fields (outside Description)"),
        Line::from("  Left / Right / Space: change selected option"),
        Line::from("  Space: toggle Urgent"),
        Line::from("  Enter: save (newline inside Description)"),
        Line::from("  Ctrl+S: save from any field"),
        Line::from("  Ctrl+R: reload ticket file (discards unsaved edits)"),
        Line::from("  Esc: cancel"),
        Line::from(""),
        heading("Image preview"),
        Line::from("  Enter on the attachment or click it: open"),
        Line::from("  Esc, [x] or click outside: close"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let body = Paragraph::new(lines).block(Block::default());
    f.render_widget(body, inner);
}
