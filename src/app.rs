use std::path::PathBuf;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;

use crate::config::AppConfig;
use crate::edit_form::{FieldChoices, TicketEditForm, TicketSink};
use crate::listeners::KeyListeners;
use crate::preview::{PreviewToggle, SharedFlag};
use crate::ticket::Ticket;
use crate::widgets::{edit_ticket, keybindings_help, ticket_summary};

/// What the edit form asked for while handling one event.
#[derive(Debug, Default)]
struct EditOutcome {
    saved: Option<Ticket>,
    close: bool,
}

impl TicketSink for EditOutcome {
    fn save(&mut self, ticket: Ticket) {
        self.saved = Some(ticket);
    }

    fn close(&mut self) {
        self.close = true;
    }
}

/// Host state: the canonical ticket record plus the edit form when open.
pub struct App {
    pub ticket_path: PathBuf,
    pub record: Option<Rc<Ticket>>,
    pub choices: FieldChoices,
    pub unassigned_label: String,
    pub preview: SharedFlag,
    pub listeners: KeyListeners,
    pub edit: Option<TicketEditForm>,
    pub flash: Option<String>,
    pub show_keybindings: bool,
    /// Set once the form has saved a ticket this session.
    pub saved: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &AppConfig, ticket_path: PathBuf, ticket: Option<Ticket>) -> Self {
        Self {
            ticket_path,
            record: ticket.map(Rc::new),
            choices: FieldChoices::from_config(config),
            unassigned_label: config.unassigned_label.clone(),
            preview: SharedFlag::new(false),
            listeners: KeyListeners::new(),
            edit: None,
            flash: None,
            show_keybindings: false,
            saved: false,
            should_quit: false,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn open_editor(&mut self) {
        if self.edit.is_some() {
            return;
        }
        if self.record.is_none() {
            self.flash = Some("No ticket loaded".to_string());
            return;
        }
        let mut form = TicketEditForm::new(
            self.record.clone(),
            self.choices.clone(),
            Rc::new(self.preview.clone()),
        );
        form.mount(&self.listeners);
        tracing::info!(path = %self.ticket_path.display(), "editor opened");
        self.edit = Some(form);
    }

    pub fn close_editor(&mut self) {
        if let Some(mut form) = self.edit.take() {
            form.unmount();
            tracing::info!("editor closed");
        }
        self.preview.set_open(false);
    }

    /// Re-read the ticket file. A successful reload is a new ticket identity,
    /// so an open form discards its draft.
    pub fn reload_ticket(&mut self) {
        match Ticket::load(&self.ticket_path) {
            Ok(ticket) => {
                self.record = Some(Rc::new(ticket));
                self.saved = false;
                if let Some(form) = self.edit.as_mut() {
                    self.preview.set_open(false);
                    form.sync_ticket(self.record.as_ref());
                }
                self.flash = Some("Ticket reloaded".to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "ticket reload failed");
                self.flash = Some(format!("Reload failed: {}", e));
            }
        }
    }

    fn apply_outcome(&mut self, outcome: EditOutcome) {
        if let Some(ticket) = outcome.saved {
            tracing::info!(title = %ticket.title, "ticket record replaced");
            self.record = Some(Rc::new(ticket));
            self.saved = true;
            self.flash = Some("Ticket saved".to_string());
        }
        if outcome.close {
            self.close_editor();
        }
    }

    /// Window-level listeners see every key first, then the open form does.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        // Clear flash on any keypress
        self.flash = None;

        self.listeners.dispatch(&key);

        if self.show_keybindings {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_keybindings = false;
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if self.is_editing() {
            if ctrl && key.code == KeyCode::Char('r') && !self.preview.is_open() {
                self.reload_ticket();
                return;
            }
            let mut outcome = EditOutcome::default();
            if let Some(form) = self.edit.as_mut() {
                form.handle_key(key, &mut outcome);
            }
            self.apply_outcome(outcome);
            return;
        }

        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('e') | KeyCode::Enter => self.open_editor(),
            KeyCode::Char('r') => self.reload_ticket(),
            KeyCode::Char('?') => self.show_keybindings = true,
            _ => {}
        }
    }

    /// `area` is the full frame, as passed to [`App::render`].
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if self.show_keybindings {
            return;
        }
        let mut outcome = EditOutcome::default();
        if let Some(form) = self.edit.as_mut() {
            form.handle_mouse(mouse, area, &mut outcome);
        }
        self.apply_outcome(outcome);
    }

    pub fn render(&self, f: &mut ratatui::Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Ticket summary
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        ticket_summary::render(f, chunks[0], self);

        let status = match &self.flash {
            Some(flash) => Span::styled(flash.as_str(), Style::default().fg(Color::Red)),
            None => {
                let state = if self.saved { "saved" } else { "unchanged" };
                Span::styled(
                    format!(" {} | ? for keys", state),
                    Style::default().fg(Color::DarkGray),
                )
            }
        };
        f.render_widget(Paragraph::new(status), chunks[1]);

        if let Some(form) = &self.edit {
            edit_ticket::render(f, form);
        }
        if self.show_keybindings {
            keybindings_help::render(f);
        }
    }
}
