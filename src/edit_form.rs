use std::cell::Cell;
use std::rc::Rc;

use chrono::NaiveDate;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};

use crate::config::AppConfig;
use crate::listeners::{KeyListeners, ListenerGuard};
use crate::preview::PreviewToggle;
use crate::ticket::{FieldChange, Priority, Status, Ticket};
use crate::widgets::text_area::{TextAreaAttrs, TextAreaField};
use crate::widgets::{edit_ticket, image_preview};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A ticket attribute bound to one form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    IncidentDate,
    IsUrgent,
    Status,
    Description,
    Priority,
    Requester,
    Location,
    Responsible,
}

/// What kind of control edits a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Date,
    Checkbox,
    Select,
    TextArea,
}

impl Field {
    /// Focus order: left column, then right column.
    pub fn all() -> &'static [Field] {
        &[
            Field::Title,
            Field::IncidentDate,
            Field::IsUrgent,
            Field::Status,
            Field::Description,
            Field::Priority,
            Field::Requester,
            Field::Location,
            Field::Responsible,
        ]
    }

    /// Attribute name, as it appears in the ticket JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::IncidentDate => "incidentDate",
            Field::IsUrgent => "isUrgent",
            Field::Status => "status",
            Field::Description => "description",
            Field::Priority => "priority",
            Field::Requester => "requester",
            Field::Location => "location",
            Field::Responsible => "responsible",
        }
    }

    #[cfg(test)]
    pub fn from_name(name: &str) -> Option<Field> {
        Field::all().iter().copied().find(|f| f.name() == name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::IncidentDate => "Incident Date",
            Field::IsUrgent => "Urgent",
            Field::Status => "Status",
            Field::Description => "Description",
            Field::Priority => "Priority",
            Field::Requester => "Requester",
            Field::Location => "Location",
            Field::Responsible => "Responsible",
        }
    }

    pub fn kind(&self) -> ControlKind {
        match self {
            Field::Title | Field::Requester => ControlKind::Text,
            Field::IncidentDate => ControlKind::Date,
            Field::IsUrgent => ControlKind::Checkbox,
            Field::Status | Field::Priority | Field::Location | Field::Responsible => {
                ControlKind::Select
            }
            Field::Description => ControlKind::TextArea,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Field::Title
                | Field::IncidentDate
                | Field::Description
                | Field::Requester
                | Field::Location
        )
    }
}

/// The value a control reports when it changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlValue {
    Checked(bool),
    Text(String),
}

/// Focusable element of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Thumbnail,
    Field(Field),
    Cancel,
    Save,
}

/// Fixed option lists for the location and responsible selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChoices {
    pub locations: Vec<String>,
    /// First entry is the unassigned sentinel.
    pub responsibles: Vec<String>,
}

impl FieldChoices {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            locations: config.location_options(),
            responsibles: config.responsible_options(),
        }
    }
}

/// Receives the outcome of the form.
pub trait TicketSink {
    fn save(&mut self, ticket: Ticket);
    fn close(&mut self);
}

/// A required field that blocks submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: Field,
    pub message: &'static str,
}

struct Draft {
    source: Rc<Ticket>,
    ticket: Ticket,
    /// Raw text of the date control; the ticket only takes parseable dates.
    date_input: String,
    description: TextAreaField<'static>,
}

impl Draft {
    fn new(source: Rc<Ticket>) -> Self {
        let ticket = (*source).clone();
        let description = TextAreaField::new(TextAreaAttrs {
            value: ticket.description.clone(),
            placeholder: Some("Describe the incident".to_string()),
            title: Some(Field::Description.label().to_string()),
            required: true,
            rows: Some(4),
            ..TextAreaAttrs::default()
        });
        Self {
            date_input: ticket.incident_date.format(DATE_FORMAT).to_string(),
            source,
            ticket,
            description,
        }
    }
}

/// Modal form editing a draft copy of one ticket.
pub struct TicketEditForm {
    draft: Option<Draft>,
    choices: FieldChoices,
    preview: Rc<dyn PreviewToggle>,
    focus: Focus,
    validation: Option<ValidationIssue>,
    escape_guard: Option<ListenerGuard>,
    /// Set when the window listener closed the preview with Escape, so the
    /// same key reaching `handle_key` does not also cancel the form.
    escape_consumed: Rc<Cell<bool>>,
}

impl TicketEditForm {
    pub fn new(
        ticket: Option<Rc<Ticket>>,
        choices: FieldChoices,
        preview: Rc<dyn PreviewToggle>,
    ) -> Self {
        let mut form = Self {
            draft: None,
            choices,
            preview,
            focus: Focus::Field(Field::Title),
            validation: None,
            escape_guard: None,
            escape_consumed: Rc::new(Cell::new(false)),
        };
        form.sync_ticket(ticket.as_ref());
        form
    }

    /// Point the form at `ticket`. A different ticket (by identity) replaces
    /// the draft and drops unsaved edits; the same one keeps them.
    pub fn sync_ticket(&mut self, ticket: Option<&Rc<Ticket>>) {
        let unchanged = match (&self.draft, ticket) {
            (Some(draft), Some(t)) => Rc::ptr_eq(&draft.source, t),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        tracing::info!(present = ticket.is_some(), "edit form loaded ticket");
        self.draft = ticket.map(|t| Draft::new(Rc::clone(t)));
        self.validation = None;
        self.set_focus(Focus::Field(Field::Title));
    }

    /// Register the window-level Escape handler that closes the preview.
    /// Calling this while already mounted does nothing.
    pub fn mount(&mut self, listeners: &KeyListeners) {
        if self.escape_guard.is_some() {
            return;
        }
        let preview = Rc::clone(&self.preview);
        let consumed = Rc::clone(&self.escape_consumed);
        self.escape_guard = Some(listeners.subscribe(move |key| {
            if key.code == KeyCode::Esc && key.kind == KeyEventKind::Press && preview.is_open() {
                preview.set_open(false);
                consumed.set(true);
            }
        }));
    }

    pub fn unmount(&mut self) {
        self.escape_guard = None;
    }

    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.escape_guard.is_some()
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.draft.as_ref().map(|d| &d.ticket)
    }

    /// The ticket the draft was copied from.
    #[cfg(test)]
    pub fn source(&self) -> Option<&Rc<Ticket>> {
        self.draft.as_ref().map(|d| &d.source)
    }

    pub fn date_input(&self) -> Option<&str> {
        self.draft.as_ref().map(|d| d.date_input.as_str())
    }

    pub fn description_field(&self) -> Option<&TextAreaField<'static>> {
        self.draft.as_ref().map(|d| &d.description)
    }

    pub fn image(&self) -> Option<&str> {
        self.draft.as_ref().and_then(|d| d.source.image.as_deref())
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn validation(&self) -> Option<&ValidationIssue> {
        self.validation.as_ref()
    }

    pub fn is_preview_open(&self) -> bool {
        self.preview.is_open()
    }

    pub fn open_preview(&mut self) {
        if self.image().is_some() {
            self.escape_consumed.set(false);
            self.preview.set_open(true);
        }
    }

    pub fn close_preview(&mut self) {
        self.preview.set_open(false);
    }

    pub fn focus_order(&self) -> Vec<Focus> {
        let mut order = Vec::with_capacity(Field::all().len() + 3);
        if self.image().is_some() {
            order.push(Focus::Thumbnail);
        }
        order.extend(Field::all().iter().map(|f| Focus::Field(*f)));
        order.push(Focus::Cancel);
        order.push(Focus::Save);
        order
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        if let Some(draft) = self.draft.as_mut() {
            if focus == Focus::Field(Field::Description) {
                draft.description.focus();
            } else {
                draft.description.blur();
            }
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let len = order.len();
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.set_focus(order[next]);
    }

    /// Single change handler for every bound control. Checkbox controls
    /// report `Checked`, all others report `Text`. Returns true when the
    /// draft or a control buffer changed.
    pub fn handle_change(&mut self, field: Field, value: ControlValue) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        let change = match (field.kind(), value) {
            (ControlKind::Checkbox, ControlValue::Checked(checked)) => match field {
                Field::IsUrgent => FieldChange::IsUrgent(checked),
                _ => return false,
            },
            (ControlKind::Checkbox, ControlValue::Text(_))
            | (_, ControlValue::Checked(_)) => {
                tracing::warn!(field = field.name(), "control value does not match field type");
                return false;
            }
            (ControlKind::Text, ControlValue::Text(text)) => match field {
                Field::Title => FieldChange::Title(text),
                Field::Requester => FieldChange::Requester(text),
                _ => {
                    tracing::warn!(field = field.name(), "no text attribute for field");
                    return false;
                }
            },
            (ControlKind::TextArea, ControlValue::Text(text)) => {
                if draft.description.value() != text {
                    draft.description.set_value(&text);
                }
                FieldChange::Description(text)
            }
            (ControlKind::Date, ControlValue::Text(text)) => {
                let parsed = NaiveDate::parse_from_str(&text, DATE_FORMAT).ok();
                draft.date_input = text;
                match parsed {
                    Some(date) => FieldChange::IncidentDate(date),
                    None => return true,
                }
            }
            (ControlKind::Select, ControlValue::Text(text)) => {
                match select_change(field, text, &self.choices) {
                    Some(change) => change,
                    None => {
                        tracing::warn!(field = field.name(), "value is not a listed option");
                        return false;
                    }
                }
            }
        };
        tracing::debug!(field = field.name(), "draft field changed");
        draft.ticket.apply(change);
        if self.validation.as_ref().is_some_and(|v| v.field == field) {
            self.validation = None;
        }
        true
    }

    /// Options a selector offers, in display order.
    pub fn select_options(&self, field: Field) -> Vec<String> {
        match field {
            Field::Status => Status::all().iter().map(|s| s.as_str().to_string()).collect(),
            Field::Priority => Priority::all()
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            Field::Location => self.choices.locations.clone(),
            Field::Responsible => self.choices.responsibles.clone(),
            _ => Vec::new(),
        }
    }

    /// Currently selected option of a selector. `None` means the location
    /// placeholder is showing.
    pub fn select_value(&self, field: Field) -> Option<String> {
        let ticket = self.ticket()?;
        match field {
            Field::Status => Some(ticket.status.as_str().to_string()),
            Field::Priority => Some(ticket.priority.as_str().to_string()),
            Field::Location => ticket
                .location
                .as_ref()
                .filter(|loc| self.choices.locations.contains(loc))
                .cloned(),
            Field::Responsible => ticket
                .responsible
                .as_ref()
                .filter(|r| self.choices.responsibles.contains(r))
                .cloned()
                .or_else(|| self.choices.responsibles.first().cloned()),
            _ => None,
        }
    }

    /// Step a selector to its next or previous option. The location
    /// placeholder is never returned to once left.
    pub fn cycle_select(&mut self, field: Field, forward: bool) {
        let options = self.select_options(field);
        let len = options.len();
        if len == 0 {
            return;
        }
        let current = self
            .select_value(field)
            .and_then(|v| options.iter().position(|o| *o == v));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.handle_change(field, ControlValue::Text(options[next].clone()));
    }

    /// First required field that would block submission.
    pub fn validate(&self) -> Option<ValidationIssue> {
        let draft = self.draft.as_ref()?;
        let ticket = &draft.ticket;
        let missing = |field| {
            Some(ValidationIssue {
                field,
                message: "Please fill out this field.",
            })
        };
        if ticket.title.is_empty() {
            return missing(Field::Title);
        }
        if draft.date_input.is_empty() {
            return missing(Field::IncidentDate);
        }
        if NaiveDate::parse_from_str(&draft.date_input, DATE_FORMAT).is_err() {
            return Some(ValidationIssue {
                field: Field::IncidentDate,
                message: "Please enter a valid date (YYYY-MM-DD).",
            });
        }
        if !draft.description.is_valid() {
            return missing(Field::Description);
        }
        if ticket.requester.is_empty() {
            return missing(Field::Requester);
        }
        if self.select_value(Field::Location).is_none() {
            return Some(ValidationIssue {
                field: Field::Location,
                message: "Please select an item in the list.",
            });
        }
        None
    }

    /// Hand the full draft to the sink, then ask it to close. Blocked when a
    /// required field is empty.
    pub fn submit(&mut self, sink: &mut dyn TicketSink) {
        if self.draft.is_none() {
            return;
        }
        if let Some(issue) = self.validate() {
            tracing::debug!(field = issue.field.name(), "submission blocked");
            self.set_focus(Focus::Field(issue.field));
            self.validation = Some(issue);
            return;
        }
        let Some(ticket) = self.ticket().cloned() else {
            return;
        };
        tracing::info!(title = %ticket.title, "ticket submitted");
        sink.save(ticket);
        sink.close();
    }

    pub fn cancel(&mut self, sink: &mut dyn TicketSink) {
        tracing::info!("ticket edit cancelled");
        sink.close();
    }

    /// Route a key press. Window-level listeners are expected to have seen the
    /// key already; while the preview is open the form ignores keys, and an
    /// Escape that just closed the preview goes no further.
    pub fn handle_key(&mut self, key: KeyEvent, sink: &mut dyn TicketSink) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.escape_consumed.replace(false) && key.code == KeyCode::Esc {
            return;
        }
        if self.preview.is_open() {
            return;
        }
        if self.draft.is_none() {
            if key.code == KeyCode::Esc {
                self.cancel(sink);
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => return self.submit(sink),
            KeyCode::Esc => return self.cancel(sink),
            KeyCode::Tab => return self.move_focus(true),
            KeyCode::BackTab => return self.move_focus(false),
            _ => {}
        }

        match self.focus {
            Focus::Thumbnail => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.open_preview(),
                KeyCode::Down => self.move_focus(true),
                KeyCode::Up => self.move_focus(false),
                _ => {}
            },
            Focus::Cancel => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.cancel(sink),
                KeyCode::Right => self.set_focus(Focus::Save),
                KeyCode::Up => self.move_focus(false),
                _ => {}
            },
            Focus::Save => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.submit(sink),
                KeyCode::Left | KeyCode::Up => self.set_focus(Focus::Cancel),
                _ => {}
            },
            Focus::Field(field) => self.handle_field_key(field, key, sink),
        }
    }

    fn handle_field_key(&mut self, field: Field, key: KeyEvent, sink: &mut dyn TicketSink) {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        if field.kind() == ControlKind::TextArea {
            let Some(draft) = self.draft.as_mut() else {
                return;
            };
            if draft.description.input(key) {
                let value = draft.description.value();
                self.handle_change(field, ControlValue::Text(value));
            }
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit(sink),
            KeyCode::Down => self.move_focus(true),
            KeyCode::Up => self.move_focus(false),
            _ => match field.kind() {
                ControlKind::Text | ControlKind::Date => {
                    let Some(mut text) = self.text_value(field) else {
                        return;
                    };
                    match key.code {
                        KeyCode::Char(c) if plain => text.push(c),
                        KeyCode::Backspace => {
                            if text.pop().is_none() {
                                return;
                            }
                        }
                        _ => return,
                    }
                    self.handle_change(field, ControlValue::Text(text));
                }
                ControlKind::Checkbox => {
                    if key.code == KeyCode::Char(' ') {
                        self.toggle_checkbox(field);
                    }
                }
                ControlKind::Select => match key.code {
                    KeyCode::Right | KeyCode::Char(' ') => self.cycle_select(field, true),
                    KeyCode::Left => self.cycle_select(field, false),
                    _ => {}
                },
                ControlKind::TextArea => {}
            },
        }
    }

    fn text_value(&self, field: Field) -> Option<String> {
        let draft = self.draft.as_ref()?;
        match field {
            Field::Title => Some(draft.ticket.title.clone()),
            Field::Requester => Some(draft.ticket.requester.clone()),
            Field::IncidentDate => Some(draft.date_input.clone()),
            Field::Description => Some(draft.ticket.description.clone()),
            _ => None,
        }
    }

    fn toggle_checkbox(&mut self, field: Field) {
        let Some(ticket) = self.ticket() else {
            return;
        };
        let checked = match field {
            Field::IsUrgent => ticket.is_urgent,
            _ => return,
        };
        self.handle_change(field, ControlValue::Checked(!checked));
    }

    /// Route a mouse event. `area` is the full frame the form was drawn into.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect, sink: &mut dyn TicketSink) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let pos = Position::new(mouse.column, mouse.row);

        if self.preview.is_open() {
            let overlay = image_preview::layout(area);
            if overlay.close.contains(pos) || !overlay.frame.contains(pos) {
                self.close_preview();
            }
            return;
        }
        if self.draft.is_none() {
            return;
        }

        let layout = edit_ticket::layout(area, self);
        if layout.thumbnail.is_some_and(|r| r.contains(pos)) {
            self.set_focus(Focus::Thumbnail);
            self.open_preview();
        } else if layout.cancel.contains(pos) {
            self.cancel(sink);
        } else if layout.save.contains(pos) {
            self.submit(sink);
        } else if let Some((field, _)) = layout.fields.iter().find(|(_, r)| r.contains(pos)) {
            let field = *field;
            self.set_focus(Focus::Field(field));
            match field.kind() {
                ControlKind::Checkbox => self.toggle_checkbox(field),
                ControlKind::Select => self.cycle_select(field, true),
                _ => {}
            }
        }
    }
}

fn select_change(field: Field, text: String, choices: &FieldChoices) -> Option<FieldChange> {
    match field {
        Field::Status => Status::from_value(&text).map(FieldChange::Status),
        Field::Priority => Priority::from_value(&text).map(FieldChange::Priority),
        Field::Location if choices.locations.contains(&text) => Some(FieldChange::Location(text)),
        Field::Responsible if choices.responsibles.contains(&text) => {
            Some(FieldChange::Responsible(text))
        }
        _ => None,
    }
}
