// Styled line output for plain (non-alternate-screen) terminals.
// Adapted from codex-rs (https://github.com/openai/codex) under the Apache License 2.0.
//
// Translates ratatui `Line`s into crossterm style commands so laid-out nodes
// can be printed straight into the terminal's scrollback.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{
    Attribute as CAttribute, Color as CColor, Colors, Print, SetAttribute, SetBackgroundColor,
    SetColors, SetForegroundColor,
};
use ratatui::style::{Color, Modifier};
use ratatui::text::{Line, Span};

/// Write each line followed by a newline, then flush.
pub fn write_lines<W: Write>(writer: &mut W, lines: &[Line<'_>]) -> io::Result<()> {
    for line in lines {
        // Merge line-level style into each span so that ANSI colors reflect
        // line styles (e.g., blockquotes with green fg).
        let merged_spans: Vec<Span> = line
            .spans
            .iter()
            .map(|s| Span {
                style: line.style.patch(s.style),
                content: s.content.clone(),
            })
            .collect();
        write_spans(writer, merged_spans.iter())?;
        queue!(writer, Print("\n"))?;
    }
    writer.flush()
}

fn write_spans<'a, I>(writer: &mut impl Write, content: I) -> io::Result<()>
where
    I: IntoIterator<Item = &'a Span<'a>>,
{
    let mut fg = Color::Reset;
    let mut bg = Color::Reset;
    let mut last_modifier = Modifier::empty();
    for span in content {
        let mut modifier = Modifier::empty();
        modifier.insert(span.style.add_modifier);
        modifier.remove(span.style.sub_modifier);
        if modifier != last_modifier {
            ModifierDiff {
                from: last_modifier,
                to: modifier,
            }
            .queue(&mut *writer)?;
            last_modifier = modifier;
        }
        let next_fg = span.style.fg.unwrap_or(Color::Reset);
        let next_bg = span.style.bg.unwrap_or(Color::Reset);
        if next_fg != fg || next_bg != bg {
            queue!(
                writer,
                SetColors(Colors::new(next_fg.into(), next_bg.into()))
            )?;
            fg = next_fg;
            bg = next_bg;
        }

        queue!(writer, Print(&span.content))?;
    }

    queue!(
        writer,
        SetForegroundColor(CColor::Reset),
        SetBackgroundColor(CColor::Reset),
        SetAttribute(CAttribute::Reset),
    )
}

struct ModifierDiff {
    from: Modifier,
    to: Modifier,
}

impl ModifierDiff {
    fn queue<W>(self, mut w: W) -> io::Result<()>
    where
        W: Write,
    {
        let removed = self.from - self.to;
        if removed.contains(Modifier::REVERSED) {
            queue!(w, SetAttribute(CAttribute::NoReverse))?;
        }
        if removed.contains(Modifier::BOLD) {
            queue!(w, SetAttribute(CAttribute::NormalIntensity))?;
            if self.to.contains(Modifier::DIM) {
                queue!(w, SetAttribute(CAttribute::Dim))?;
            }
        }
        if removed.contains(Modifier::ITALIC) {
            queue!(w, SetAttribute(CAttribute::NoItalic))?;
        }
        if removed.contains(Modifier::UNDERLINED) {
            queue!(w, SetAttribute(CAttribute::NoUnderline))?;
        }
        if removed.contains(Modifier::DIM) {
            queue!(w, SetAttribute(CAttribute::NormalIntensity))?;
        }
        if removed.contains(Modifier::CROSSED_OUT) {
            queue!(w, SetAttribute(CAttribute::NotCrossedOut))?;
        }

        let added = self.to - self.from;
        if added.contains(Modifier::REVERSED) {
            queue!(w, SetAttribute(CAttribute::Reverse))?;
        }
        if added.contains(Modifier::BOLD) {
            queue!(w, SetAttribute(CAttribute::Bold))?;
        }
        if added.contains(Modifier::ITALIC) {
            queue!(w, SetAttribute(CAttribute::Italic))?;
        }
        if added.contains(Modifier::UNDERLINED) {
            queue!(w, SetAttribute(CAttribute::Underlined))?;
        }
        if added.contains(Modifier::DIM) {
            queue!(w, SetAttribute(CAttribute::Dim))?;
        }
        if added.contains(Modifier::CROSSED_OUT) {
            queue!(w, SetAttribute(CAttribute::CrossedOut))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Style;

    fn output(lines: &[Line<'_>]) -> String {
        let mut buf = Vec::new();
        write_lines(&mut buf, lines).expect("write to vec");
        String::from_utf8(buf).expect("utf8 output")
    }

    #[test]
    fn plain_lines_are_newline_separated() {
        let out = output(&[Line::from("ab"), Line::from("cd")]);
        let ab = out.find("ab").expect("first line");
        let cd = out.find("cd").expect("second line");
        assert!(ab < cd);
        assert_eq!(out.matches('\n').count(), 2);
        assert!(!out.contains("\x1b[3m"));
    }

    #[test]
    fn italic_span_toggles_attribute() {
        let line = Line::from(Span::styled(
            "Thinking...",
            Style::default().add_modifier(Modifier::ITALIC),
        ));
        let out = output(&[line]);
        let italic = out.find("\x1b[3m").expect("italic on");
        assert!(italic < out.find("Thinking...").expect("text"));
        assert!(out.ends_with("\x1b[0m\n"));
    }

    #[test]
    fn line_style_applies_to_spans() {
        let line = Line::from("err").style(Style::default().fg(Color::Red));
        let out = output(&[line]);
        // ratatui's Red is the dark ANSI red (palette index 1).
        assert!(out.contains("38;5;1"));
    }
}
