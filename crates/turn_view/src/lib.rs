//! Terminal presentation of assistant turns.
//!
//! [`AssistantMessageView`] turns an [`AssistantTurn`] (text, thinking and tool
//! call blocks plus a stop reason) into an ordered list of [`RenderNode`]s that
//! a [`Container`] lays out to ratatui lines.

pub mod config;
pub mod types;
pub mod ui;

pub use config::{ConfigError, Settings};
pub use types::{AssistantTurn, ContentBlock, StopReason, ToolCall};
pub use ui::terminal::assistant_message::{render_turn, AssistantMessageView, RenderOptions};
pub use ui::terminal::markdown::{MarkdownEngine, MarkdownStyle, MarkdownTheme, TuiMarkdownEngine};
pub use ui::terminal::node::{Container, MarkdownNode, NodeSink, RenderNode, TextNode};
pub use ui::terminal::theme::{Theme, ThemeColor, ThemeError};
