use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::form;
use crate::edit_form::TicketEditForm;

const CLOSE_LABEL: &str = "[x]";

/// Where an attached image reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    DataUri { media_type: &'a str, bytes: usize },
    Remote(&'a str),
    File(&'a str),
}

pub fn classify(reference: &str) -> ImageSource<'_> {
    if let Some(rest) = reference.strip_prefix("data:") {
        let (meta, payload) = rest.split_once(',').unwrap_or((rest, ""));
        let media_type = meta.split(';').next().unwrap_or("");
        let media_type = if media_type.is_empty() {
            "application/octet-stream"
        } else {
            media_type
        };
        let bytes = if meta.ends_with(";base64") {
            let trimmed = payload.trim_end_matches('=');
            trimmed.len() * 3 / 4
        } else {
            payload.len()
        };
        return ImageSource::DataUri { media_type, bytes };
    }
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return ImageSource::Remote(reference);
    }
    ImageSource::File(reference)
}

/// One-line summary used by the thumbnail.
pub fn short_label(reference: &str) -> String {
    match classify(reference) {
        ImageSource::DataUri { media_type, bytes } => {
            format!("embedded {} ({} bytes)", media_type, bytes)
        }
        ImageSource::Remote(url) => url.to_string(),
        ImageSource::File(path) => path.to_string(),
    }
}

/// Screen regions of the overlay. Anything outside `frame` is backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLayout {
    pub frame: Rect,
    pub image: Rect,
    pub close: Rect,
}

pub fn layout(area: Rect) -> PreviewLayout {
    let frame = form::centered_rect(80, 80, area);
    let width = CLOSE_LABEL.len() as u16;
    let close = Rect {
        x: frame.right().saturating_sub(width + 2).max(frame.x),
        y: frame.y,
        width: width.min(frame.width),
        height: 1.min(frame.height),
    };
    PreviewLayout {
        frame,
        image: form::modal_inner(frame),
        close,
    }
}

fn detail_lines(reference: &str) -> Vec<Line<'static>> {
    let key = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);
    let mut lines = vec![Line::from("")];
    match classify(reference) {
        ImageSource::DataUri { media_type, bytes } => {
            lines.push(Line::from(vec![
                Span::styled("Embedded image  ", key),
                Span::styled(media_type.to_string(), value),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Size            ", key),
                Span::styled(format!("{} bytes", bytes), value),
            ]));
        }
        ImageSource::Remote(url) => {
            lines.push(Line::from(vec![
                Span::styled("Remote image    ", key),
                Span::styled(url.to_string(), value.fg(Color::Cyan)),
            ]));
        }
        ImageSource::File(path) => {
            lines.push(Line::from(vec![
                Span::styled("Image file      ", key),
                Span::styled(path.to_string(), value),
            ]));
            let size = match std::fs::metadata(path) {
                Ok(meta) => format!("{} bytes", meta.len()),
                Err(_) => "(file not found)".to_string(),
            };
            lines.push(Line::from(vec![
                Span::styled("Size            ", key),
                Span::styled(size, value),
            ]));
        }
    }
    lines
}

pub fn render(f: &mut ratatui::Frame, form: &TicketEditForm) {
    if !form.is_preview_open() {
        return;
    }
    let reference = match form.image() {
        Some(r) => r,
        None => return,
    };

    let area = f.area();
    f.buffer_mut()
        .set_style(area, Style::default().add_modifier(Modifier::DIM));

    let regions = layout(area);
    f.render_widget(Clear, regions.frame);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Attached image ");
    f.render_widget(block, regions.frame);

    let mut lines = detail_lines(reference);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Esc] or [x] close   click outside to dismiss",
        Style::default().fg(Color::DarkGray),
    )));
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(body, regions.image);

    let close = Paragraph::new(Span::styled(
        CLOSE_LABEL,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(close, regions.close);
}
