pub mod edit_ticket;
pub mod form;
pub mod image_preview;
pub mod keybindings_help;
pub mod text_area;
pub mod ticket_summary;
