pub mod ansi;
pub mod assistant_message;
pub mod markdown;
pub mod node;
pub mod terminal_color;
pub mod theme;
