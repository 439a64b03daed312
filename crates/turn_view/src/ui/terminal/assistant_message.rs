use std::sync::Arc;

use tracing::{debug, trace};

use super::markdown::MarkdownStyle;
use super::node::{Container, MarkdownNode, NodeSink, RenderNode, TextNode};
use super::theme::{Theme, ThemeColor};
use crate::config::Settings;
use crate::types::{AssistantTurn, ContentBlock, StopReason};

/// Marker on the first text block and the first thinking block of a turn.
pub const BULLET: &str = "● ";
/// Shown in place of reasoning when thinking blocks are hidden.
pub const THINKING_LABEL: &str = "Thinking...";
/// Generic abort message the backend reports when the user cancels.
pub const DEFAULT_ABORT_MESSAGE: &str = "Request was aborted";
pub const OPERATION_ABORTED: &str = "Operation aborted";
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Default horizontal padding for text, thinking and status nodes.
pub const DEFAULT_PADDING_X: u16 = 1;

/// Configuration for a single render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub hide_thinking: bool,
    pub padding_x: u16,
    pub theme: &'a Theme,
}

impl<'a> RenderOptions<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            hide_thinking: false,
            padding_x: DEFAULT_PADDING_X,
            theme,
        }
    }

    pub fn hide_thinking(mut self, hide: bool) -> Self {
        self.hide_thinking = hide;
        self
    }
}

/// Translate an assistant turn into render nodes.
///
/// Pure function of `(turn, options)`: bullet tracking lives in locals, so
/// rendering the same turn twice yields identical output.
pub fn render_turn(turn: &AssistantTurn, options: &RenderOptions<'_>) -> Vec<RenderNode> {
    let theme = options.theme;
    let padding_x = options.padding_x;
    let mut nodes = Vec::new();
    let mut prefixed_text = false;
    let mut prefixed_thinking = false;

    let has_visible_content = turn.has_visible_content();
    if has_visible_content {
        nodes.push(RenderNode::spacer());
    }

    for (index, block) in turn.content.iter().enumerate() {
        let Some(content) = block.visible_text() else {
            continue;
        };

        match block {
            ContentBlock::Text { .. } => {
                let bullet = bullet(&mut prefixed_text);
                trace!(index, "rendering text block");
                nodes.push(RenderNode::Markdown(MarkdownNode::new(
                    format!("{bullet}{content}"),
                    padding_x,
                    0,
                    theme.markdown_theme(),
                )));
            }
            ContentBlock::Thinking { .. } => {
                let bullet = bullet(&mut prefixed_thinking);
                trace!(index, hidden = options.hide_thinking, "rendering thinking block");
                let node = if options.hide_thinking {
                    let label = theme.italic(
                        theme.fg(ThemeColor::ThinkingText, format!("{bullet}{THINKING_LABEL}")),
                    );
                    RenderNode::Text(TextNode::new(label, padding_x, 0))
                } else {
                    RenderNode::Markdown(
                        MarkdownNode::new(
                            format!("{bullet}{content}"),
                            padding_x,
                            0,
                            theme.markdown_theme(),
                        )
                        .with_style(MarkdownStyle {
                            color: Some(theme.color(ThemeColor::ThinkingText)),
                            italic: true,
                        }),
                    )
                };
                nodes.push(node);
                if turn.has_visible_after(index) {
                    nodes.push(RenderNode::spacer());
                }
            }
            ContentBlock::ToolCall(_) | ContentBlock::Other => {}
        }
    }

    // Tool execution views own the failure display when the turn called tools.
    if !turn.has_tool_calls() {
        if let Some(message) = status_message(turn) {
            nodes.push(RenderNode::spacer());
            nodes.push(RenderNode::Text(TextNode::new(
                theme.fg(ThemeColor::Error, message),
                padding_x,
                0,
            )));
        }
    }

    nodes
}

/// First call per kind yields the bullet, later calls yield nothing.
fn bullet(prefixed: &mut bool) -> &'static str {
    if std::mem::replace(prefixed, true) {
        ""
    } else {
        BULLET
    }
}

fn status_message(turn: &AssistantTurn) -> Option<String> {
    match turn.stop_reason {
        StopReason::Aborted => Some(
            turn.error_message()
                .filter(|msg| *msg != DEFAULT_ABORT_MESSAGE)
                .unwrap_or(OPERATION_ABORTED)
                .to_string(),
        ),
        StopReason::Error => Some(format!(
            "Error: {}",
            turn.error_message().unwrap_or(UNKNOWN_ERROR)
        )),
        _ => None,
    }
}

/// View that renders a complete assistant turn and keeps it for re-rendering
/// after configuration changes.
pub struct AssistantMessageView {
    content: Container,
    hide_thinking: bool,
    padding_x: u16,
    theme: Arc<Theme>,
    last_turn: Option<AssistantTurn>,
}

impl AssistantMessageView {
    pub fn new(turn: Option<AssistantTurn>, hide_thinking: bool, theme: Arc<Theme>) -> Self {
        let mut view = Self {
            content: Container::new(),
            hide_thinking,
            padding_x: DEFAULT_PADDING_X,
            theme,
            last_turn: None,
        };
        if let Some(turn) = turn {
            view.render(turn);
        }
        view
    }

    pub fn from_settings(settings: &Settings, theme: Arc<Theme>) -> Self {
        let mut view = Self::new(None, settings.hide_thinking_block, theme);
        view.padding_x = settings.padding_x;
        view
    }

    /// Replace the retained turn and rebuild the output from it.
    pub fn render(&mut self, turn: AssistantTurn) {
        self.last_turn = Some(turn);
        self.rebuild();
    }

    /// Re-render the retained turn with the current configuration.
    pub fn refresh(&mut self) {
        if self.last_turn.is_none() {
            return;
        }
        self.rebuild();
    }

    /// Takes effect on the next `render` or `refresh`.
    pub fn set_hide_thinking(&mut self, hide: bool) {
        self.hide_thinking = hide;
    }

    pub fn hide_thinking(&self) -> bool {
        self.hide_thinking
    }

    /// Takes effect on the next `render` or `refresh`.
    pub fn set_theme(&mut self, theme: Arc<Theme>) {
        self.theme = theme;
    }

    pub fn set_padding_x(&mut self, padding_x: u16) {
        self.padding_x = padding_x;
    }

    pub fn last_turn(&self) -> Option<&AssistantTurn> {
        self.last_turn.as_ref()
    }

    pub fn nodes(&self) -> &[RenderNode] {
        self.content.children()
    }

    pub fn container(&self) -> &Container {
        &self.content
    }

    /// Push the current output into a parent container.
    pub fn append_to(&self, parent: &mut impl NodeSink) {
        for node in self.nodes() {
            parent.push(node.clone());
        }
    }

    fn rebuild(&mut self) {
        let Some(turn) = self.last_turn.as_ref() else {
            return;
        };
        let options = RenderOptions {
            hide_thinking: self.hide_thinking,
            padding_x: self.padding_x,
            theme: &self.theme,
        };
        let nodes = render_turn(turn, &options);
        debug!(
            blocks = turn.content.len(),
            nodes = nodes.len(),
            hide_thinking = self.hide_thinking,
            "Rendered assistant turn"
        );
        self.content.clear();
        self.content.extend_nodes(nodes);
    }
}
