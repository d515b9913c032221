use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Widget};
use tui_textarea::{Input, Key, TextArea};

/// Native attributes of a multi-line text input. All of them are forwarded
/// to the underlying `TextArea`.
#[derive(Debug, Clone, Default)]
pub struct TextAreaAttrs {
    pub value: String,
    pub placeholder: Option<String>,
    pub title: Option<String>,
    pub disabled: bool,
    pub required: bool,
    /// Preferred number of visible text rows.
    pub rows: Option<u16>,
    /// Maximum number of characters, newlines included.
    pub max_length: Option<usize>,
    pub classes: Option<TextAreaClasses>,
}

/// Style set for a text area. Unset fields in a caller-supplied set fall
/// back to the defaults, set fields win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextAreaClasses {
    pub text: Style,
    pub placeholder: Style,
    pub border: Style,
    pub focus_border: Style,
    pub cursor: Style,
}

impl Default for TextAreaClasses {
    fn default() -> Self {
        Self {
            text: Style::default().fg(Color::White),
            placeholder: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::Gray),
            focus_border: Style::default().fg(Color::Blue),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
        }
    }
}

impl TextAreaClasses {
    /// Layer `overrides` on top of `self`.
    pub fn merge(self, overrides: &TextAreaClasses) -> Self {
        Self {
            text: self.text.patch(overrides.text),
            placeholder: self.placeholder.patch(overrides.placeholder),
            border: self.border.patch(overrides.border),
            focus_border: self.focus_border.patch(overrides.focus_border),
            cursor: self.cursor.patch(overrides.cursor),
        }
    }

    /// A set with nothing specified, for building partial overrides.
    pub fn none() -> Self {
        Self {
            text: Style::default(),
            placeholder: Style::default(),
            border: Style::default(),
            focus_border: Style::default(),
            cursor: Style::default(),
        }
    }
}

const DEFAULT_ROWS: u16 = 3;

/// Styled multi-line text input.
pub struct TextAreaField<'a> {
    textarea: TextArea<'a>,
    attrs: TextAreaAttrs,
    classes: TextAreaClasses,
    focused: bool,
}

impl<'a> TextAreaField<'a> {
    pub fn new(attrs: TextAreaAttrs) -> Self {
        let classes = match &attrs.classes {
            Some(overrides) => TextAreaClasses::default().merge(overrides),
            None => TextAreaClasses::default(),
        };
        let mut field = Self {
            textarea: TextArea::default(),
            attrs,
            classes,
            focused: false,
        };
        let value = field.attrs.value.clone();
        field.reset(&value);
        field
    }

    fn reset(&mut self, value: &str) {
        let lines: Vec<String> = value.split('\n').map(|s| s.to_string()).collect();
        self.textarea = TextArea::new(lines);
        self.textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        self.textarea.move_cursor(tui_textarea::CursorMove::End);
        if let Some(placeholder) = &self.attrs.placeholder {
            self.textarea.set_placeholder_text(placeholder.clone());
        }
        self.restyle();
    }

    fn restyle(&mut self) {
        let mut text = self.classes.text;
        if self.attrs.disabled {
            text = text.add_modifier(Modifier::DIM);
        }
        self.textarea.set_style(text);
        self.textarea.set_placeholder_style(self.classes.placeholder);
        self.textarea.set_cursor_line_style(Style::default());
        let cursor = if self.focused && !self.attrs.disabled {
            self.classes.cursor
        } else {
            text
        };
        self.textarea.set_cursor_style(cursor);

        let border = if self.focused {
            self.classes.focus_border
        } else {
            self.classes.border
        };
        let mut block = Block::default().borders(Borders::ALL).border_style(border);
        if let Some(title) = &self.attrs.title {
            block = block.title(format!(" {} ", title));
        }
        self.textarea.set_block(block);
    }

    pub fn value(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// Replace the content, moving the cursor to the end.
    pub fn set_value(&mut self, value: &str) {
        self.attrs.value = value.to_string();
        self.reset(value);
    }

    pub fn attrs(&self) -> &TextAreaAttrs {
        &self.attrs
    }

    pub fn classes(&self) -> &TextAreaClasses {
        &self.classes
    }

    pub fn focus(&mut self) {
        self.focused = true;
        self.restyle();
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.restyle();
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// False when the field is required and empty.
    pub fn is_valid(&self) -> bool {
        !self.attrs.required || !self.value().is_empty()
    }

    /// Height including borders.
    pub fn height(&self) -> u16 {
        self.attrs.rows.unwrap_or(DEFAULT_ROWS) + 2
    }

    /// The underlying control.
    pub fn control(&self) -> &TextArea<'a> {
        &self.textarea
    }

    pub fn control_mut(&mut self) -> &mut TextArea<'a> {
        &mut self.textarea
    }

    /// Feed one input. Returns true when the text changed.
    pub fn input(&mut self, input: impl Into<Input>) -> bool {
        if self.attrs.disabled {
            return false;
        }
        let input = input.into();
        if let Some(max) = self.attrs.max_length {
            let inserts = matches!(input.key, Key::Char(_) | Key::Enter | Key::Tab)
                && !input.ctrl
                && !input.alt;
            if inserts && self.char_count() >= max {
                return false;
            }
        }
        let changed = self.textarea.input(input);
        if changed {
            self.attrs.value = self.value();
        }
        changed
    }

    fn char_count(&self) -> usize {
        let lines = self.textarea.lines();
        let chars: usize = lines.iter().map(|l| l.chars().count()).sum();
        chars + lines.len().saturating_sub(1)
    }
}

impl Widget for &TextAreaField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self.textarea, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn attrs(value: &str) -> TextAreaAttrs {
        TextAreaAttrs {
            value: value.to_string(),
            ..TextAreaAttrs::default()
        }
    }

    #[test]
    fn forwards_initial_value_and_typing() {
        let mut field = TextAreaField::new(attrs("hello"));
        assert_eq!(field.value(), "hello");

        assert!(field.input(key(KeyCode::Char('!'))));
        assert!(field.input(key(KeyCode::Enter)));
        assert!(field.input(key(KeyCode::Char('x'))));
        assert_eq!(field.value(), "hello!\nx");
        assert_eq!(field.attrs().value, "hello!\nx");
    }

    #[test]
    fn multi_line_value_is_preserved() {
        let field = TextAreaField::new(attrs("one\ntwo"));
        assert_eq!(
            field.control().lines().to_vec(),
            vec!["one".to_string(), "two".to_string()]
        );
    }

    #[test]
    fn disabled_ignores_input() {
        let mut field = TextAreaField::new(TextAreaAttrs {
            disabled: true,
            ..attrs("fixed")
        });
        assert!(!field.input(key(KeyCode::Char('a'))));
        assert_eq!(field.value(), "fixed");
    }

    #[test]
    fn max_length_caps_insertions() {
        let mut field = TextAreaField::new(TextAreaAttrs {
            max_length: Some(3),
            ..attrs("ab")
        });
        assert!(field.input(key(KeyCode::Char('c'))));
        assert!(!field.input(key(KeyCode::Char('d'))));
        assert!(!field.input(key(KeyCode::Enter)));
        assert!(field.input(key(KeyCode::Backspace)));
        assert_eq!(field.value(), "ab");
    }

    #[test]
    fn required_empty_is_invalid() {
        let mut field = TextAreaField::new(TextAreaAttrs {
            required: true,
            ..attrs("")
        });
        assert!(!field.is_valid());
        field.set_value("filled");
        assert!(field.is_valid());
        assert!(TextAreaField::new(attrs("")).is_valid());
    }

    #[test]
    fn caller_classes_override_only_what_they_set() {
        let overrides = TextAreaClasses {
            text: Style::default().fg(Color::Yellow),
            ..TextAreaClasses::none()
        };
        let field = TextAreaField::new(TextAreaAttrs {
            classes: Some(overrides),
            ..attrs("")
        });
        let defaults = TextAreaClasses::default();
        assert_eq!(field.classes().text.fg, Some(Color::Yellow));
        assert_eq!(field.classes().border, defaults.border);
        assert_eq!(field.classes().placeholder, defaults.placeholder);
    }

    #[test]
    fn caller_classes_keep_default_modifiers() {
        let overrides = TextAreaClasses {
            cursor: Style::default().fg(Color::Red),
            ..TextAreaClasses::none()
        };
        let merged = TextAreaClasses::default().merge(&overrides);
        assert_eq!(merged.cursor.fg, Some(Color::Red));
        assert!(merged.cursor.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn height_follows_rows() {
        assert_eq!(TextAreaField::new(attrs("")).height(), DEFAULT_ROWS + 2);
        let field = TextAreaField::new(TextAreaAttrs {
            rows: Some(6),
            ..attrs("")
        });
        assert_eq!(field.height(), 8);
    }

    #[test]
    fn control_mut_gives_access_to_underlying_textarea() {
        let mut field = TextAreaField::new(attrs("abc"));
        field.control_mut().insert_str("def");
        assert_eq!(field.value(), "abcdef");
    }

    #[test]
    fn focus_uses_focus_border() {
        let mut field = TextAreaField::new(TextAreaAttrs {
            title: Some("Notes".to_string()),
            ..attrs("text")
        });
        field.focus();
        assert!(field.is_focused());

        let backend = TestBackend::new(20, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(&field, f.area()))
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        assert_eq!(buf.cell((0, 0)).unwrap().fg, Color::Blue);
        let top: String = (0..20)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        assert!(top.contains("Notes"));

        field.blur();
        terminal
            .draw(|f| f.render_widget(&field, f.area()))
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        assert_eq!(buf.cell((0, 0)).unwrap().fg, Color::Gray);
    }

    #[test]
    fn placeholder_shown_when_empty() {
        let field = TextAreaField::new(TextAreaAttrs {
            placeholder: Some("Describe".to_string()),
            ..attrs("")
        });
        let backend = TestBackend::new(20, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(&field, f.area()))
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let row: String = (0..20)
            .map(|x| buf.cell((x, 1)).unwrap().symbol().to_string())
            .collect();
        assert!(row.contains("Describe"));
    }
}
