use chrono::{DateTime, FixedOffset, Local};
use yansi::Paint;

use crate::model::Tag;

/// Color palette for consistent theming
pub struct ColorPalette {
    pub muted: (u8, u8, u8),     // ids, hints
    pub header: (u8, u8, u8),    // section titles
    pub link: (u8, u8, u8),      // urls
    pub highlight: (u8, u8, u8), // search matches
    pub error: (u8, u8, u8),     // error banner
}

impl ColorPalette {
    pub const SLATE: Self = Self {
        muted: (108, 112, 134),
        header: (148, 226, 213),
        link: (137, 180, 250),
        highlight: (243, 139, 168),
        error: (248, 113, 113),
    };
}

/// Formatting context passed through rendering pipeline
pub struct FormatContext {
    pub use_color: bool,
    pub palette: ColorPalette,
    pub width: usize,
}

impl FormatContext {
    pub fn new(use_color: bool) -> Self {
        Self { use_color, palette: ColorPalette::SLATE, width: 100 }
    }

    /// Color unless `NO_COLOR` is set or `--plain` was passed; width from the
    /// attached terminal.
    pub fn from_env(plain: bool) -> Self {
        let use_color = !plain && std::env::var("NO_COLOR").is_err();
        let mut ctx = Self::new(use_color);
        ctx.width = terminal_columns();
        ctx
    }

    fn paint(&self, text: &str, rgb: (u8, u8, u8)) -> String {
        if self.use_color {
            let (r, g, b) = rgb;
            Paint::rgb(text, r, g, b).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_id(&self, id: i64) -> String {
        self.paint(&id.to_string(), self.palette.muted)
    }

    pub fn format_muted(&self, text: &str) -> String {
        self.paint(text, self.palette.muted)
    }

    pub fn format_url(&self, url: &str) -> String {
        self.paint(url, self.palette.link)
    }

    pub fn format_header(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.header;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn format_error(&self, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = self.palette.error;
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Paint `text` in the tag's own color.
    pub fn format_tag_text(&self, tag: &Tag, text: &str) -> String {
        if self.use_color {
            let (r, g, b) = crate::tags::chip_rgb(tag);
            Paint::rgb(text, r, g, b).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn highlight_match(&self, text: &str, query: Option<&str>) -> String {
        let Some(q) = query else { return text.to_string() };
        if q.is_empty() || !self.use_color {
            return text.to_string();
        }

        let q_lower = q.to_lowercase();
        let mut out = String::new();
        let mut remaining = text;

        // Lowercasing can change byte lengths outside ASCII; only split on
        // positions that land on char boundaries of the original.
        while let Some(pos) = remaining.to_lowercase().find(&q_lower) {
            let end = pos + q.len();
            if !remaining.is_char_boundary(pos)
                || end > remaining.len()
                || !remaining.is_char_boundary(end)
            {
                break;
            }
            let (before, rest) = remaining.split_at(pos);
            let (matched, after) = rest.split_at(q.len());
            out.push_str(before);
            out.push_str(&self.paint(matched, self.palette.highlight));
            remaining = after;
        }
        out.push_str(remaining);
        out
    }
}

/// Relative timestamps ("3d 4h ago") for server-provided dates.
pub struct TimeFormatter {
    now: DateTime<FixedOffset>,
}

impl TimeFormatter {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    pub fn now_local() -> Self {
        let now = Local::now();
        Self::new(now.with_timezone(now.offset()))
    }

    pub fn format_relative(&self, dt: DateTime<FixedOffset>) -> String {
        let dur = self.now.signed_duration_since(dt);
        let total_minutes = dur.num_minutes().max(0);
        let total_hours = dur.num_hours().max(0);
        let total_days = dur.num_days().max(0);

        if total_hours == 0 {
            if total_minutes == 0 {
                return "just now".to_string();
            }
            return format!("{}m ago", total_minutes);
        }
        if total_days < 30 {
            if total_days == 0 {
                return format!("{}h ago", total_hours);
            }
            let hours = (total_hours - total_days * 24).max(0);
            if hours > 0 {
                format!("{}d {}h ago", total_days, hours)
            } else {
                format!("{}d ago", total_days)
            }
        } else if total_days < 365 {
            let months = total_days / 30;
            let days = total_days % 30;
            if days > 0 {
                format!("{}mo {}d ago", months, days)
            } else {
                format!("{}mo ago", months)
            }
        } else {
            let years = total_days / 365;
            let months = (total_days % 365) / 30;
            if months > 0 {
                format!("{}y {}mo ago", years, months)
            } else {
                format!("{}y ago", years)
            }
        }
    }
}

pub fn terminal_columns() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| usize::from(w))
        .filter(|w| *w >= 40)
        .unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_format_context_no_color() {
        let ctx = FormatContext::new(false);
        assert_eq!(ctx.format_id(42), "42");
        assert_eq!(ctx.format_header("Filter"), "Filter");
        assert_eq!(ctx.format_url("https://a.dev"), "https://a.dev");
    }

    #[test]
    fn test_format_context_with_color() {
        let ctx = FormatContext::new(true);
        let tag = Tag { id: 1, name: "uw".into(), color: "#60a5fa".into() };
        let painted = ctx.format_tag_text(&tag, "uw");
        assert!(painted.contains("uw"));
        assert!(painted.len() > "uw".len()); // Has ANSI codes
    }

    #[test]
    fn test_highlight_match() {
        let ctx = FormatContext::new(false);
        assert_eq!(
            ctx.highlight_match("hello world", Some("world")),
            "hello world"
        );

        let ctx = FormatContext::new(true);
        let result = ctx.highlight_match("Hello World", Some("world"));
        assert!(result.starts_with("Hello "));
        assert!(result.contains("World"));
        assert!(result.len() > "Hello World".len());
    }

    #[test]
    fn test_time_formatter_relative() {
        let f = TimeFormatter::new(at("2025-03-10T12:00:00+00:00"));
        assert_eq!(f.format_relative(at("2025-03-10T12:00:00+00:00")), "just now");
        assert_eq!(f.format_relative(at("2025-03-10T11:15:00+00:00")), "45m ago");
        assert_eq!(f.format_relative(at("2025-03-10T07:00:00+00:00")), "5h ago");
        assert_eq!(f.format_relative(at("2025-03-08T09:00:00+00:00")), "2d 3h ago");
        assert_eq!(f.format_relative(at("2024-12-10T12:00:00+00:00")), "3mo ago");
        assert_eq!(f.format_relative(at("2023-03-10T12:00:00+00:00")), "2y ago");
    }

    #[test]
    fn test_future_dates_clamp_to_now() {
        let f = TimeFormatter::new(at("2025-03-10T12:00:00+00:00"));
        assert_eq!(f.format_relative(at("2025-03-11T12:00:00+00:00")), "just now");
    }
}
