use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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

fn modal_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
}

/// Inner area of a modal drawn at `area`.
pub fn modal_inner(area: Rect) -> Rect {
    modal_block("").inner(area)
}

pub fn render_modal_frame(f: &mut ratatui::Frame, title: &str, area: Rect) -> Rect {
    f.render_widget(Clear, area);
    let block = modal_block(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

fn label_style(focused: bool) -> Style {
    Style::default().fg(if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    })
}

fn label_span(label: &str, required: bool, focused: bool) -> Span<'static> {
    let marker = if required { "*" } else { "" };
    Span::styled(format!("{}{}: ", label, marker), label_style(focused))
}

/// Single-line text input with label.
pub fn text_input_line(label: &str, value: &str, required: bool, focused: bool) -> Line<'static> {
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        label_span(label, required, focused),
        Span::styled(
            value.to_string(),
            Style::default().fg(Color::White).add_modifier(if focused {
                Modifier::BOLD
            } else {
                Modifier::empty()
            }),
        ),
        Span::styled(cursor, Style::default().fg(Color::DarkGray)),
    ])
}

/// Inline selector showing the current option, or a dimmed placeholder.
pub fn select_line(
    label: &str,
    value: Option<&str>,
    placeholder: &str,
    value_style: Style,
    required: bool,
    focused: bool,
) -> Line<'static> {
    let arrows = Style::default().fg(if focused {
        Color::Yellow
    } else {
        Color::DarkGray
    });
    let current = match value {
        Some(v) => Span::styled(v.to_string(), value_style),
        None => Span::styled(
            placeholder.to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    };
    Line::from(vec![
        label_span(label, required, focused),
        Span::styled("< ", arrows),
        current,
        Span::styled(" >", arrows),
    ])
}

pub fn checkbox_line(label: &str, checked: bool, label_color: Color, focused: bool) -> Line<'static> {
    let mark = if checked { "[x] " } else { "[ ] " };
    let mut style = Style::default().fg(label_color);
    if focused {
        style = style.add_modifier(Modifier::BOLD);
    }
    Line::from(vec![
        Span::styled(mark, label_style(focused)),
        Span::styled(label.to_string(), style),
    ])
}

/// Bracketed button caption, e.g. `[ Save ]`.
pub fn button_text(caption: &str) -> String {
    format!("[ {} ]", caption)
}

pub fn button_line(caption: &str, accent: Color, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(accent)
    };
    Line::from(Span::styled(button_text(caption), style))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 10);
    }

    #[test]
    fn required_label_is_marked() {
        assert_eq!(text(&text_input_line("Title", "x", true, false)), "Title*: x");
        assert_eq!(text(&text_input_line("Title", "x", false, true)), "Title: x_");
    }

    #[test]
    fn select_line_falls_back_to_placeholder() {
        let line = select_line("Location", None, "Select a location", Style::default(), true, false);
        assert_eq!(text(&line), "Location*: < Select a location >");
    }

    #[test]
    fn checkbox_reflects_state() {
        assert!(text(&checkbox_line("Urgent", true, Color::Red, false)).starts_with("[x]"));
        assert!(text(&checkbox_line("Urgent", false, Color::Red, false)).starts_with("[ ]"));
    }
}
