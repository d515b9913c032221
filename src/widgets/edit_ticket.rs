use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{form, image_preview};
use crate::edit_form::{ControlKind, Field, Focus, TicketEditForm};
use crate::ticket::{Priority, Status};

const CANCEL_CAPTION: &str = "Cancel";
const SAVE_CAPTION: &str = "Save Changes";
const LOCATION_PLACEHOLDER: &str = "Select a location";

/// Badge style for a status.
pub fn status_style(status: Status) -> Style {
    let style = match status {
        Status::Pending => Style::default().fg(Color::Black).bg(Color::Yellow),
        Status::InProgress => Style::default().fg(Color::White).bg(Color::Blue),
        Status::Done => Style::default().fg(Color::Black).bg(Color::Green),
    };
    style.add_modifier(Modifier::BOLD)
}

pub fn priority_style(priority: Priority) -> Style {
    Style::default().fg(match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    })
}

/// Screen regions of the edit form, shared by rendering and mouse hit-testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLayout {
    pub modal: Rect,
    pub thumbnail: Option<Rect>,
    pub badge: Rect,
    pub fields: Vec<(Field, Rect)>,
    pub message: Rect,
    pub cancel: Rect,
    pub save: Rect,
    pub hints: Rect,
}

pub fn layout(area: Rect, edit: &TicketEditForm) -> FormLayout {
    let modal = form::centered_rect(80, 90, area);
    let inner = form::modal_inner(modal);
    let thumb_height = if edit.image().is_some() { 3 } else { 0 };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(thumb_height),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1), // Validation message
            Constraint::Length(1), // Buttons
            Constraint::Length(1), // Hints
        ])
        .split(inner);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(48),
            Constraint::Percentage(4),
            Constraint::Percentage(48),
        ])
        .split(rows[2]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status badge
            Constraint::Length(1),
            Constraint::Length(1), // Title
            Constraint::Length(1),
            Constraint::Length(1), // Incident date
            Constraint::Length(1),
            Constraint::Length(1), // Urgent
            Constraint::Length(1),
            Constraint::Length(1), // Status
            Constraint::Min(0),
        ])
        .split(columns[0]);

    let description_height = edit.description_field().map(|d| d.height()).unwrap_or(6);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(description_height),
            Constraint::Length(1),
            Constraint::Length(1), // Priority
            Constraint::Length(1),
            Constraint::Length(1), // Requester
            Constraint::Length(1),
            Constraint::Length(1), // Location
            Constraint::Length(1),
            Constraint::Length(1), // Responsible
            Constraint::Min(0),
        ])
        .split(columns[2]);

    let cancel_width = form::button_text(CANCEL_CAPTION).len() as u16;
    let save_width = form::button_text(SAVE_CAPTION).len() as u16;
    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(cancel_width),
            Constraint::Length(2),
            Constraint::Length(save_width),
        ])
        .split(rows[4]);

    FormLayout {
        modal,
        thumbnail: (thumb_height > 0).then_some(rows[0]),
        badge: left[0],
        fields: vec![
            (Field::Title, left[2]),
            (Field::IncidentDate, left[4]),
            (Field::IsUrgent, left[6]),
            (Field::Status, left[8]),
            (Field::Description, right[0]),
            (Field::Priority, right[2]),
            (Field::Requester, right[4]),
            (Field::Location, right[6]),
            (Field::Responsible, right[8]),
        ],
        message: rows[3],
        cancel: buttons[1],
        save: buttons[3],
        hints: rows[5],
    }
}

pub fn render(f: &mut ratatui::Frame, edit: &TicketEditForm) {
    let ticket = match edit.ticket() {
        Some(t) => t,
        None => return,
    };

    let regions = layout(f.area(), edit);
    form::render_modal_frame(f, "Edit Ticket", regions.modal);

    if let (Some(area), Some(reference)) = (regions.thumbnail, edit.image()) {
        let focused = edit.focus() == Focus::Thumbnail;
        let border = if focused { Color::Yellow } else { Color::DarkGray };
        let thumb = Paragraph::new(Line::from(vec![
            Span::styled(
                image_preview::short_label(reference),
                Style::default().fg(Color::White),
            ),
            Span::styled("  (Enter or click to enlarge)", Style::default().fg(Color::DarkGray)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" Attachment "),
        );
        f.render_widget(thumb, area);
    }

    let badge = Paragraph::new(Line::from(vec![
        Span::styled("Current status  ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!(" {} ", ticket.status.as_str()), status_style(ticket.status)),
    ]));
    f.render_widget(badge, regions.badge);

    for (field, area) in &regions.fields {
        let field = *field;
        let focused = edit.focus() == Focus::Field(field);
        let line = match field.kind() {
            ControlKind::TextArea => {
                if let Some(description) = edit.description_field() {
                    f.render_widget(description, *area);
                }
                continue;
            }
            ControlKind::Text => {
                let value = match field {
                    Field::Title => ticket.title.as_str(),
                    Field::Requester => ticket.requester.as_str(),
                    _ => "",
                };
                form::text_input_line(field.label(), value, field.is_required(), focused)
            }
            ControlKind::Date => form::text_input_line(
                field.label(),
                edit.date_input().unwrap_or_default(),
                field.is_required(),
                focused,
            ),
            ControlKind::Checkbox => {
                form::checkbox_line(field.label(), ticket.is_urgent, Color::Red, focused)
            }
            ControlKind::Select => {
                let value = edit.select_value(field);
                let style = match field {
                    Field::Status => status_style(ticket.status),
                    Field::Priority => priority_style(ticket.priority),
                    _ => Style::default().fg(Color::White),
                };
                form::select_line(
                    field.label(),
                    value.as_deref(),
                    LOCATION_PLACEHOLDER,
                    style,
                    field.is_required(),
                    focused,
                )
            }
        };
        f.render_widget(Paragraph::new(line), *area);
    }

    if let Some(issue) = edit.validation() {
        let message = Paragraph::new(Line::from(Span::styled(
            format!("! {}: {}", issue.field.label(), issue.message),
            Style::default().fg(Color::Red),
        )));
        f.render_widget(message, regions.message);
    }

    f.render_widget(
        Paragraph::new(form::button_line(
            CANCEL_CAPTION,
            Color::Gray,
            edit.focus() == Focus::Cancel,
        )),
        regions.cancel,
    );
    f.render_widget(
        Paragraph::new(form::button_line(
            SAVE_CAPTION,
            Color::Blue,
            edit.focus() == Focus::Save,
        )),
        regions.save,
    );

    let hints = Paragraph::new(Line::from(Span::styled(
        "[Tab] next field  [</>/Space] change option  [Ctrl+S] save  [Esc] cancel",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(hints, regions.hints);

    image_preview::render(f, edit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit_form::{ControlValue, FieldChoices};
    use crate::preview::{PreviewToggle, SharedFlag};
    use crate::ticket::{sample_ticket, Ticket};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;
    use std::rc::Rc;

    fn choices() -> FieldChoices {
        FieldChoices {
            locations: vec!["Building A".to_string(), "Library".to_string()],
            responsibles: vec!["Unassigned".to_string(), "Electrician".to_string()],
        }
    }

    fn edit_form(ticket: Option<Ticket>, flag: &SharedFlag) -> TicketEditForm {
        TicketEditForm::new(ticket.map(Rc::new), choices(), Rc::new(flag.clone()))
    }

    fn render_form(edit: &TicketEditForm) -> Buffer {
        let backend = TestBackend::new(120, 48);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, edit)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn row_text(buf: &Buffer, row: u16) -> String {
        (0..buf.area.width)
            .filter_map(|col| buf.cell((col, row)).map(|c| c.symbol().to_string()))
            .collect()
    }

    fn screen_text(buf: &Buffer) -> String {
        (0..buf.area.height)
            .map(|row| row_text(buf, row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn field_rect(edit: &TicketEditForm, field: Field) -> Rect {
        layout(Rect::new(0, 0, 120, 48), edit)
            .fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, r)| *r)
            .unwrap()
    }

    #[test]
    fn renders_input_values_before_any_edit() {
        let flag = SharedFlag::default();
        let edit = edit_form(Some(sample_ticket()), &flag);
        let buf = render_form(&edit);

        let expect = |field: Field, text: &str| {
            let rect = field_rect(&edit, field);
            let row = row_text(&buf, rect.y);
            assert!(row.contains(text), "{:?} row {:?} missing {:?}", field, row, text);
        };
        expect(Field::Title, "Title*: Broken window");
        expect(Field::IncidentDate, "Incident Date*: 2024-03-05");
        expect(Field::IsUrgent, "[ ] Urgent");
        expect(Field::Status, "< Pending >");
        expect(Field::Priority, "< Medium >");
        expect(Field::Requester, "Requester*: Ana");
        expect(Field::Location, "< Building A >");
        expect(Field::Responsible, "< Unassigned >");

        let desc = field_rect(&edit, Field::Description);
        assert!(row_text(&buf, desc.y + 1).contains("Second floor, east wing"));
        assert!(screen_text(&buf).contains("https://example.com/window.jpg"));
    }

    #[test]
    fn renders_nothing_without_a_ticket() {
        let flag = SharedFlag::default();
        let edit = edit_form(None, &flag);
        let buf = render_form(&edit);
        assert!(screen_text(&buf).trim().is_empty());
    }

    #[test]
    fn status_badge_uses_status_colour() {
        let flag = SharedFlag::default();
        let mut ticket = sample_ticket();
        ticket.status = Status::Done;
        let edit = edit_form(Some(ticket), &flag);
        let buf = render_form(&edit);

        let regions = layout(Rect::new(0, 0, 120, 48), &edit);
        let y = regions.badge.y;
        let col = (0..buf.area.width)
            .find(|&x| buf.cell((x, y)).map(|c| c.symbol()) == Some("D"))
            .unwrap();
        let cell = buf.cell((col, y)).unwrap();
        assert_eq!(cell.bg, Color::Green);
    }

    #[test]
    fn unset_location_shows_placeholder() {
        let flag = SharedFlag::default();
        let mut ticket = sample_ticket();
        ticket.location = None;
        let edit = edit_form(Some(ticket), &flag);
        let buf = render_form(&edit);
        let rect = field_rect(&edit, Field::Location);
        assert!(row_text(&buf, rect.y).contains("< Select a location >"));
    }

    #[test]
    fn validation_message_is_shown() {
        let flag = SharedFlag::default();
        let mut edit = edit_form(Some(sample_ticket()), &flag);
        edit.handle_change(Field::Title, ControlValue::Text(String::new()));

        struct NoopSink;
        impl crate::edit_form::TicketSink for NoopSink {
            fn save(&mut self, _: Ticket) {}
            fn close(&mut self) {}
        }
        edit.submit(&mut NoopSink);

        let buf = render_form(&edit);
        let regions = layout(Rect::new(0, 0, 120, 48), &edit);
        assert!(row_text(&buf, regions.message.y).contains("Title: Please fill out this field."));
    }

    #[test]
    fn edits_show_up_on_next_render() {
        let flag = SharedFlag::default();
        let mut edit = edit_form(Some(sample_ticket()), &flag);
        edit.handle_change(Field::IsUrgent, ControlValue::Checked(true));
        edit.cycle_select(Field::Priority, true);

        let buf = render_form(&edit);
        assert!(row_text(&buf, field_rect(&edit, Field::IsUrgent).y).contains("[x] Urgent"));
        assert!(row_text(&buf, field_rect(&edit, Field::Priority).y).contains("< High >"));
    }

    #[test]
    fn preview_overlay_renders_over_form() {
        let flag = SharedFlag::default();
        let mut ticket = sample_ticket();
        ticket.image = Some("data:image/png;base64,AAAA".to_string());
        let mut edit = edit_form(Some(ticket), &flag);

        let before = screen_text(&render_form(&edit));
        assert!(!before.contains("Attached image"));

        edit.open_preview();
        assert!(flag.is_open());
        let buf = render_form(&edit);
        let text = screen_text(&buf);
        assert!(text.contains("Attached image"));
        assert!(text.contains("image/png"));

        let close = image_preview::layout(Rect::new(0, 0, 120, 48)).close;
        assert!(row_text(&buf, close.y).contains("[x]"));
    }

    #[test]
    fn thumbnail_omitted_without_image() {
        let flag = SharedFlag::default();
        let mut ticket = sample_ticket();
        ticket.image = None;
        let edit = edit_form(Some(ticket), &flag);
        assert!(layout(Rect::new(0, 0, 120, 48), &edit).thumbnail.is_none());
    }
}
