use derive_more::IsVariant;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};
use unicode_width::UnicodeWidthChar;

use super::markdown::{MarkdownEngine, MarkdownStyle, MarkdownTheme, TuiMarkdownEngine};

/// One visual child of a container.
#[derive(Debug, Clone, PartialEq, IsVariant)]
pub enum RenderNode {
    Spacer { height: u16 },
    Text(TextNode),
    Markdown(MarkdownNode),
}

impl RenderNode {
    pub fn spacer() -> Self {
        RenderNode::Spacer { height: 1 }
    }

    /// Lay the node out to `width` columns (0 means unbounded).
    pub fn lines(&self, width: u16, engine: &dyn MarkdownEngine) -> Vec<Line<'static>> {
        match self {
            RenderNode::Spacer { height } => (0..*height).map(|_| Line::default()).collect(),
            RenderNode::Text(node) => node.lines(width),
            RenderNode::Markdown(node) => node.lines(width, engine),
        }
    }
}

/// A single styled line, wrapped to the available width.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub line: Line<'static>,
    pub padding_x: u16,
    pub padding_y: u16,
}

impl TextNode {
    pub fn new(line: impl Into<Line<'static>>, padding_x: u16, padding_y: u16) -> Self {
        Self {
            line: line.into(),
            padding_x,
            padding_y,
        }
    }

    /// Concatenated span content, without styling.
    pub fn plain_text(&self) -> String {
        plain(&self.line)
    }

    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let body = match inner_width(width, self.padding_x) {
            Some(inner) => wrap_line(&self.line, inner),
            None => vec![self.line.clone()],
        };
        pad_lines(body, self.padding_x, self.padding_y)
    }
}

/// Markdown source laid out by a [`MarkdownEngine`] at paint time.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownNode {
    pub source: String,
    pub padding_x: u16,
    pub padding_y: u16,
    pub theme: MarkdownTheme,
    pub style: Option<MarkdownStyle>,
}

impl MarkdownNode {
    pub fn new(source: impl Into<String>, padding_x: u16, padding_y: u16, theme: MarkdownTheme) -> Self {
        Self {
            source: source.into(),
            padding_x,
            padding_y,
            theme,
            style: None,
        }
    }

    pub fn with_style(mut self, style: MarkdownStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn lines(&self, width: u16, engine: &dyn MarkdownEngine) -> Vec<Line<'static>> {
        let inner = inner_width(width, self.padding_x).map(usize::from);
        let body = engine.render_lines(&self.source, inner, &self.theme, self.style.as_ref());
        pad_lines(body, self.padding_x, self.padding_y)
    }
}

/// Child-append interface for anything that collects render nodes.
pub trait NodeSink {
    fn clear(&mut self);
    fn push(&mut self, node: RenderNode);

    fn extend_nodes<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = RenderNode>,
        Self: Sized,
    {
        for node in nodes {
            self.push(node);
        }
    }
}

impl NodeSink for Vec<RenderNode> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push(&mut self, node: RenderNode) {
        Vec::push(self, node);
    }
}

/// Ordered list of render nodes, laid out top to bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    children: Vec<RenderNode>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[RenderNode] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Lay out every child in order to `width` columns (0 means unbounded).
    pub fn lines(&self, width: u16, engine: &dyn MarkdownEngine) -> Vec<Line<'static>> {
        self.children
            .iter()
            .flat_map(|child| child.lines(width, engine))
            .collect()
    }

    /// Calculate the height needed to render this container
    pub fn calculate_height(&self, width: u16, engine: &dyn MarkdownEngine) -> u16 {
        let rows = self
            .children
            .iter()
            .map(|child| child.lines(width, engine).len())
            .sum::<usize>();
        rows.min(u16::MAX as usize) as u16
    }
}

impl NodeSink for Container {
    fn clear(&mut self) {
        self.children.clear();
    }

    fn push(&mut self, node: RenderNode) {
        self.children.push(node);
    }
}

impl Widget for &Container {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines(area.width, &TuiMarkdownEngine);
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

pub(crate) fn plain(line: &Line<'_>) -> String {
    line.spans
        .iter()
        .map(|span| span.content.as_ref())
        .collect::<String>()
}

/// Width left after horizontal padding on both sides; `None` when unbounded.
fn inner_width(width: u16, padding_x: u16) -> Option<u16> {
    if width == 0 {
        return None;
    }
    Some(width.saturating_sub(padding_x.saturating_mul(2)).max(1))
}

/// Prepend `padding_x` columns to each line and surround with `padding_y`
/// blank rows.
fn pad_lines(lines: Vec<Line<'static>>, padding_x: u16, padding_y: u16) -> Vec<Line<'static>> {
    let indent = " ".repeat(padding_x as usize);
    let mut out = Vec::with_capacity(lines.len() + 2 * padding_y as usize);
    out.extend((0..padding_y).map(|_| Line::default()));
    out.extend(lines.into_iter().map(|mut line| {
        if !indent.is_empty() {
            line.spans.insert(0, Span::raw(indent.clone()));
        }
        line
    }));
    out.extend((0..padding_y).map(|_| Line::default()));
    out
}

/// Word-wrap uniformly styled lines with textwrap; fall back to column
/// wrapping that keeps per-span styles otherwise.
fn wrap_line(line: &Line<'static>, width: u16) -> Vec<Line<'static>> {
    let width = width as usize;
    let Some(style) = uniform_style(line) else {
        return wrap_line_by_columns(line, width);
    };

    let opts = textwrap::Options::new(width).wrap_algorithm(textwrap::WrapAlgorithm::FirstFit);
    textwrap::wrap(&plain(line), &opts)
        .into_iter()
        .map(|part| Line::from(Span::styled(part.into_owned(), style)).style(line.style))
        .collect()
}

fn uniform_style(line: &Line<'_>) -> Option<Style> {
    let mut styles = line.spans.iter().map(|span| span.style);
    let first = styles.next().unwrap_or_default();
    styles.all(|style| style == first).then_some(first)
}

fn wrap_line_by_columns(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    for span in &line.spans {
        let mut chunk = String::new();
        for ch in span.content.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if ch_width > 0 && current_width + ch_width > width && current_width > 0 {
                if !chunk.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                out.push(Line::from(std::mem::take(&mut current)).style(line.style));
                current_width = 0;
            }
            chunk.push(ch);
            current_width += ch_width;
        }
        if !chunk.is_empty() {
            current.push(Span::styled(chunk, span.style));
        }
    }

    if !current.is_empty() || out.is_empty() {
        out.push(Line::from(current).style(line.style));
    }
    out
}
