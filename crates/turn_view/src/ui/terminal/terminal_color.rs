// Terminal background detection and color blending.
// Adapted from codex-rs (https://github.com/openai/codex) under the Apache License 2.0.
//
// The background is read once from `COLORFGBG` ("fg;bg" or "fg;default;bg"
// with ANSI palette indices), which most terminal emulators export. When it is
// missing or unparsable the background is unknown and callers fall back to the
// dark palette.

use ratatui::style::Color;
use std::sync::OnceLock;

/// Cached terminal background color, detected once per process.
static TERMINAL_BG: OnceLock<Option<(u8, u8, u8)>> = OnceLock::new();

/// xterm default RGB values for the 16 ANSI palette entries.
const ANSI_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

/// Return the cached terminal background color.
pub fn terminal_bg() -> Option<(u8, u8, u8)> {
    *TERMINAL_BG.get_or_init(query_terminal_bg)
}

/// Color for de-emphasized text (thinking traces) on the given background:
/// the background blended toward the opposite extreme so it stays readable
/// without competing with regular text.
pub fn dimmed_text(bg: (u8, u8, u8)) -> Color {
    let top = if is_light(bg) { (0, 0, 0) } else { (255, 255, 255) };
    let (r, g, b) = blend(top, bg, 0.45);
    Color::Rgb(r, g, b)
}

/// Determine if a background color is "light" using ITU-R BT.601 luminance.
pub fn is_light(bg: (u8, u8, u8)) -> bool {
    let (r, g, b) = bg;
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y > 128.0
}

/// Blend `fg` over `bg` at the given alpha (0.0 = fully bg, 1.0 = fully fg).
pub fn blend(fg: (u8, u8, u8), bg: (u8, u8, u8), alpha: f32) -> (u8, u8, u8) {
    let r = (fg.0 as f32 * alpha + bg.0 as f32 * (1.0 - alpha)) as u8;
    let g = (fg.1 as f32 * alpha + bg.1 as f32 * (1.0 - alpha)) as u8;
    let b = (fg.2 as f32 * alpha + bg.2 as f32 * (1.0 - alpha)) as u8;
    (r, g, b)
}

/// Parse a `COLORFGBG` value into the background's RGB approximation.
pub fn parse_colorfgbg(value: &str) -> Option<(u8, u8, u8)> {
    let index: usize = value.rsplit(';').next()?.trim().parse().ok()?;
    ANSI_PALETTE.get(index).copied()
}

/// Background from a `COLORFGBG` value, warning when the value is unusable.
fn background_from_colorfgbg(value: &str) -> Option<(u8, u8, u8)> {
    let bg = parse_colorfgbg(value);
    if bg.is_none() {
        tracing::warn!("Ignoring unparsable COLORFGBG value: {value:?}");
    }
    bg
}

#[cfg(not(test))]
fn query_terminal_bg() -> Option<(u8, u8, u8)> {
    let value = std::env::var("COLORFGBG").ok()?;
    background_from_colorfgbg(&value)
}

#[cfg(test)]
fn query_terminal_bg() -> Option<(u8, u8, u8)> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_is_light() {
        assert!(is_light((255, 255, 255))); // white
        assert!(is_light((229, 229, 229))); // ANSI 7
        assert!(!is_light((0, 0, 0))); // black
        assert!(!is_light((30, 30, 30))); // dark grey
    }

    #[test]
    fn test_blend_dark_bg() {
        let result = blend((255, 255, 255), (0, 0, 0), 0.12);
        assert_eq!(result, (30, 30, 30));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unparsable_colorfgbg_warns() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(background_from_colorfgbg("15;bogus"), None);
            assert_eq!(background_from_colorfgbg("0;15"), Some((255, 255, 255)));
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("WARN").count(), 1);
        assert!(output.contains("15;bogus"));
    }

    #[test]
    fn test_parse_colorfgbg() {
        assert_eq!(parse_colorfgbg("15;0"), Some((0, 0, 0)));
        assert_eq!(parse_colorfgbg("0;default;15"), Some((255, 255, 255)));
        assert_eq!(parse_colorfgbg("12;7"), Some((229, 229, 229)));
        assert_eq!(parse_colorfgbg("15;42"), None);
        assert_eq!(parse_colorfgbg("garbage"), None);
    }

    #[test]
    fn test_dimmed_text_sits_between_bg_and_fg() {
        let Color::Rgb(r, _, _) = dimmed_text((0, 0, 0)) else {
            panic!("expected rgb color");
        };
        assert!(r > 0 && r < 255);

        let Color::Rgb(r, _, _) = dimmed_text((255, 255, 255)) else {
            panic!("expected rgb color");
        };
        assert!(r > 0 && r < 255);
    }

    #[test]
    fn test_background_unknown_under_test() {
        assert_eq!(terminal_bg(), None);
    }
}
