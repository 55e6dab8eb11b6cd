//! Display styles for conversation text.
//!
//! Operators describe each conversation part as a comma-separated list of
//! format names, e.g. `red,bold`. Unknown names are logged and skipped so a
//! typo degrades one style instead of failing the reload.

use std::fmt::Write as _;

/// A text decoration, rendered as its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    /// Bold text.
    Bold,
    /// Italic text.
    Italic,
    /// Underlined text.
    Underlined,
    /// Struck-through text.
    Strikethrough,
    /// Scrambled, unreadable text.
    Obfuscated,
}

impl Decoration {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "bold" => Some(Self::Bold),
            "italic" => Some(Self::Italic),
            "underlined" => Some(Self::Underlined),
            "strikethrough" => Some(Self::Strikethrough),
            "obfuscated" => Some(Self::Obfuscated),
            _ => None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Bold => "<b>",
            Self::Italic => "<i>",
            Self::Underlined => "<u>",
            Self::Strikethrough => "<st>",
            Self::Obfuscated => "<obf>",
        }
    }
}

const COLOR_NAMES: [&str; 16] = [
    "black",
    "dark_blue",
    "dark_green",
    "dark_aqua",
    "dark_red",
    "dark_purple",
    "gold",
    "gray",
    "dark_gray",
    "blue",
    "green",
    "aqua",
    "red",
    "light_purple",
    "yellow",
    "white",
];

/// The style of one conversation part: at most one color plus decorations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    color: Option<String>,
    decorations: Vec<Decoration>,
}

impl Style {
    /// Parse a comma-separated format list. A later color replaces an
    /// earlier one; unknown names are logged and skipped.
    pub fn parse(part: &str, formats: &str) -> Self {
        let mut style = Self::default();
        for name in formats.split(',') {
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                continue;
            }
            if let Some(decoration) = Decoration::parse(&name) {
                if !style.decorations.contains(&decoration) {
                    style.decorations.push(decoration);
                }
            } else if COLOR_NAMES.contains(&name.as_str()) || name.starts_with('#') {
                style.color = Some(name);
            } else {
                tracing::warn!(part, format = %name, "unknown conversation format, skipping");
            }
        }
        style
    }

    /// Apply the style by prefixing the text with the style's tags.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::new();
        if let Some(color) = &self.color {
            let _ = write!(out, "<{color}>");
        }
        for decoration in &self.decorations {
            out.push_str(decoration.tag());
        }
        out.push_str(text);
        out
    }
}

/// The source strings for every conversation part, as configured.
#[derive(Debug, Clone)]
pub struct StyleSource {
    /// Format list for the NPC's name.
    pub npc: String,
    /// Format list for the player's name.
    pub player: String,
    /// Format list for the NPC's spoken text.
    pub text: String,
    /// Format list for a chosen answer echoed back.
    pub answer: String,
    /// Format list for option numbers.
    pub number: String,
    /// Format list for option texts.
    pub option: String,
}

impl Default for StyleSource {
    fn default() -> Self {
        Self {
            npc: "gold".to_string(),
            player: "white".to_string(),
            text: "white".to_string(),
            answer: "gray".to_string(),
            number: "yellow".to_string(),
            option: "white".to_string(),
        }
    }
}

/// Parsed styles for every conversation part.
///
/// Built once per (re)load and shared immutably; a reload swaps the whole
/// sheet so running conversations keep a consistent snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    /// Style for the NPC's name.
    pub npc: Style,
    /// Style for the player's name.
    pub player: Style,
    /// Style for the NPC's spoken text.
    pub text: Style,
    /// Style for a chosen answer echoed back.
    pub answer: Style,
    /// Style for option numbers.
    pub number: Style,
    /// Style for option texts.
    pub option: Style,
}

impl StyleSheet {
    /// Parse all parts from their configured format lists.
    pub fn parse(source: &StyleSource) -> Self {
        Self {
            npc: Style::parse("npc", &source.npc),
            player: Style::parse("player", &source.player),
            text: Style::parse("text", &source.text),
            answer: Style::parse("answer", &source.answer),
            number: Style::parse("number", &source.number),
            option: Style::parse("option", &source.option),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_and_decorations_combine() {
        let style = Style::parse("npc", "red,bold,italic");
        assert_eq!(style.apply("Innkeeper"), "<red><b><i>Innkeeper");
    }

    #[test]
    fn later_color_wins() {
        let style = Style::parse("npc", "red,green");
        assert_eq!(style.apply("x"), "<green>x");
    }

    #[test]
    fn unknown_formats_are_skipped() {
        let style = Style::parse("npc", "red,sparkly,bold");
        assert_eq!(style.apply("x"), "<red><b>x");
    }

    #[test]
    fn hex_colors_pass_through() {
        let style = Style::parse("npc", "#1a2b3c");
        assert_eq!(style.apply("x"), "<#1a2b3c>x");
    }

    #[test]
    fn names_are_trimmed_and_case_insensitive() {
        let style = Style::parse("npc", " Red , BOLD ");
        assert_eq!(style.apply("x"), "<red><b>x");
    }

    #[test]
    fn empty_format_list_is_plain() {
        let style = Style::parse("npc", "");
        assert_eq!(style.apply("x"), "x");
    }

    #[test]
    fn default_sheet_styles_every_part() {
        let sheet = StyleSheet::parse(&StyleSource::default());
        assert_eq!(sheet.npc.apply("Guard"), "<gold>Guard");
        assert_eq!(sheet.number.apply("1."), "<yellow>1.");
    }
}
