use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use tracing::warn;
use tui_markdown as md;
use unicode_width::UnicodeWidthStr;

/// Base styling handed to the markdown engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownTheme {
    /// Foreground for spans the markdown parser leaves unstyled.
    pub text: Color,
}

impl Default for MarkdownTheme {
    fn default() -> Self {
        Self { text: Color::Reset }
    }
}

/// Per-node override applied on top of the markdown styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkdownStyle {
    pub color: Option<Color>,
    pub italic: bool,
}

/// Markdown layout capability used by the container to turn markdown nodes
/// into terminal lines.
pub trait MarkdownEngine {
    /// Lay out `source` to at most `width` columns (unbounded when `None`).
    fn render_lines(
        &self,
        source: &str,
        width: Option<usize>,
        theme: &MarkdownTheme,
        style: Option<&MarkdownStyle>,
    ) -> Vec<Line<'static>>;
}

/// Markdown engine backed by `tui-markdown` and ratatui's paragraph wrapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct TuiMarkdownEngine;

impl MarkdownEngine for TuiMarkdownEngine {
    fn render_lines(
        &self,
        source: &str,
        width: Option<usize>,
        theme: &MarkdownTheme,
        style: Option<&MarkdownStyle>,
    ) -> Vec<Line<'static>> {
        let lines = render_markdown_lines(source, width);
        apply_markdown_style(lines, theme, style)
    }
}

/// Rows laid out per scratch buffer when rendering at a fixed width.
const PAGE_ROWS: u16 = 256;

/// Render markdown to owned lines, wrapped to `width` when one is given.
pub fn render_markdown_lines(source: &str, width: Option<usize>) -> Vec<Line<'static>> {
    let Some(width) = width.filter(|w| *w > 0) else {
        let text = md::from_str(source);
        let mut lines = text.lines.iter().map(line_to_static).collect::<Vec<_>>();
        if lines.is_empty() {
            lines.push(Line::from(""));
        }
        return lines;
    };

    let width = width.min(u16::MAX as usize) as u16;
    let paragraph = Paragraph::new(md::from_str(source)).wrap(Wrap { trim: false });
    let total = paragraph.line_count(width);
    // Paragraph scroll offsets are u16, so that is as far as layout can reach.
    let total_rows = u16::try_from(total).unwrap_or_else(|_| {
        warn!(rows = total, "Markdown output truncated to {} rows", u16::MAX);
        u16::MAX
    });

    let mut lines = Vec::with_capacity(total_rows as usize);
    let mut offset = 0u16;
    while offset < total_rows {
        let height = (total_rows - offset).min(PAGE_ROWS);
        let area = Rect::new(0, 0, width, height);
        let mut page = Buffer::empty(area);
        paragraph
            .clone()
            .scroll((offset, 0))
            .render(area, &mut page);
        lines.extend((0..height).map(|y| buffer_row_to_line(&page, y, width)));
        offset += height;
    }

    while lines.last().is_some_and(is_blank) {
        lines.pop();
    }
    if lines.is_empty() {
        lines.push(Line::from(""));
    }

    lines
}

/// Apply the theme's base color and the node's override to every span while
/// preserving markdown modifiers (bold, code, links).
fn apply_markdown_style(
    lines: Vec<Line<'static>>,
    theme: &MarkdownTheme,
    style: Option<&MarkdownStyle>,
) -> Vec<Line<'static>> {
    let override_color = style.and_then(|s| s.color);
    let italic = style.is_some_and(|s| s.italic);

    lines
        .into_iter()
        .map(|line| {
            let spans = line
                .spans
                .into_iter()
                .map(|span| {
                    let mut span_style = span.style;
                    if let Some(color) = override_color {
                        span_style = span_style.fg(color);
                    } else if matches!(span_style.fg, None | Some(Color::Reset))
                        && theme.text != Color::Reset
                    {
                        span_style = span_style.fg(theme.text);
                    }
                    if italic {
                        span_style = span_style.add_modifier(Modifier::ITALIC);
                    }
                    Span::styled(span.content, span_style)
                })
                .collect::<Vec<_>>();
            Line {
                spans,
                ..line
            }
        })
        .collect()
}

fn buffer_row_to_line(buffer: &Buffer, y: u16, width: u16) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run: Option<(Style, String)> = None;

    let mut x = 0;
    while x < width {
        let Some(cell) = buffer.cell((x, y)) else {
            break;
        };
        let symbol = cell.symbol();
        // A wide glyph owns the cells after it; they hold filler, not text.
        x = x.saturating_add(UnicodeWidthStr::width(symbol).max(1) as u16);
        if symbol.is_empty() {
            continue;
        }

        let style = cell.style();
        if let Some((run_style, content)) = run.as_mut() {
            if *run_style == style {
                content.push_str(symbol);
                continue;
            }
        }
        if let Some((run_style, content)) = run.take() {
            spans.push(Span::styled(content, run_style));
        }
        run = Some((style, symbol.to_string()));
    }

    if let Some((style, content)) = run {
        spans.push(Span::styled(content, style));
    }

    // Paragraph pads every row to full width; drop the trailing fill.
    if let Some(last) = spans.last_mut() {
        let trimmed = last.content.trim_end().to_string();
        last.content = trimmed.into();
    }
    spans.retain(|span| !span.content.is_empty());

    Line::from(spans)
}

fn is_blank(line: &Line<'_>) -> bool {
    line.spans.iter().all(|span| span.content.trim().is_empty())
}

fn line_to_static(line: &Line<'_>) -> Line<'static> {
    Line {
        style: line.style,
        alignment: line.alignment,
        spans: line
            .spans
            .iter()
            .map(|span| Span::styled(span.content.to_string(), span.style))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line<'_>) -> String {
        line.spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect::<String>()
    }

    #[test]
    fn unbounded_render_keeps_logical_lines() {
        let lines = render_markdown_lines("hello world", None);
        assert_eq!(lines.len(), 1);
        assert_eq!(plain(&lines[0]), "hello world");
    }

    #[test]
    fn width_aware_render_wraps() {
        let lines = render_markdown_lines("hello world", Some(5));
        assert!(
            lines.len() >= 2,
            "expected wrapped output, got {:?}",
            lines.iter().map(plain).collect::<Vec<_>>()
        );
    }

    #[test]
    fn trailing_fill_is_trimmed() {
        let lines = render_markdown_lines("● Hello", Some(40));
        assert_eq!(lines.len(), 1);
        assert_eq!(plain(&lines[0]), "● Hello");
    }

    #[test]
    fn style_override_replaces_color_and_adds_italic() {
        let style = MarkdownStyle {
            color: Some(Color::DarkGray),
            italic: true,
        };
        let lines = TuiMarkdownEngine.render_lines(
            "some **bold** reasoning",
            None,
            &MarkdownTheme::default(),
            Some(&style),
        );
        assert!(!lines.is_empty());
        for span in lines.iter().flat_map(|line| line.spans.iter()) {
            assert_eq!(span.style.fg, Some(Color::DarkGray));
            assert!(span.style.add_modifier.contains(Modifier::ITALIC));
        }
        let bold = lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .find(|span| span.content.contains("bold"))
            .expect("bold span");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn theme_text_color_fills_unstyled_spans() {
        let theme = MarkdownTheme {
            text: Color::White,
        };
        let lines = TuiMarkdownEngine.render_lines("plain", None, &theme, None);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::White));
    }

    #[test]
    fn wide_glyphs_are_not_followed_by_filler() {
        let lines = render_markdown_lines("你好世界", Some(40));
        assert_eq!(lines.iter().map(plain).collect::<Vec<_>>(), vec!["你好世界"]);

        let lines = render_markdown_lines("emoji 🎉 done", Some(40));
        assert_eq!(plain(&lines[0]), "emoji 🎉 done");
    }

    #[test]
    fn wide_glyphs_wrap_within_width() {
        let lines = render_markdown_lines("你好世界", Some(5));
        assert!(lines.len() >= 2);
        assert!(lines
            .iter()
            .all(|line| UnicodeWidthStr::width(plain(line).as_str()) <= 5));
        assert_eq!(lines.iter().map(plain).collect::<String>(), "你好世界");
    }

    #[test]
    fn sparse_wrapping_keeps_every_word() {
        let words = (0..100)
            .map(|i| format!("{i:03}{}", "x".repeat(38)))
            .collect::<Vec<_>>();
        let lines = render_markdown_lines(&words.join(" "), Some(80));
        let rendered = lines.iter().map(plain).collect::<Vec<_>>().join(" ");
        for word in &words {
            assert!(rendered.contains(word.as_str()), "missing {word}");
        }
        assert_eq!(lines.len(), 100);
    }

    #[test]
    fn output_longer_than_one_page_is_complete() {
        let source = "y".repeat(1000);
        let lines = render_markdown_lines(&source, Some(1));
        assert_eq!(lines.len(), 1000);
        assert_eq!(lines.iter().map(plain).collect::<String>(), source);
    }

    #[test]
    fn empty_source_yields_one_blank_line() {
        assert_eq!(render_markdown_lines("", Some(20)).len(), 1);
        assert_eq!(render_markdown_lines("", None).len(), 1);
    }
}
