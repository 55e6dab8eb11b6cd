//! Conversion of legacy `&`/`§` format codes to tagged markup.
//!
//! Legacy coloring resets all text decorations whenever a new color code is
//! introduced. Tagged markup inherits styles instead, so a `<reset>` tag is
//! prepended to every converted color (and hex color) to mimic the legacy
//! behaviour. Decoration codes (`k`–`o`) and `r` convert without the extra
//! reset.

/// Whether the input contains any legacy format code (`&`/`§` followed by
/// `0`–`9`, `a`–`f`, `k`–`o`, or `r`, case-insensitive).
pub fn has_legacy_format(input: &str) -> bool {
    let chars: Vec<char> = input.chars().collect();
    chars
        .windows(2)
        .any(|pair| is_marker(pair[0]) && is_code(pair[1]))
}

/// Convert legacy format codes to tagged markup.
///
/// Handles the hex form `&x&1&A&2&B&3&C` (producing `<reset><#1A2B3C>`, hex
/// digit case preserved) and the single-character color and decoration
/// codes. Both `&` and `§` markers are accepted, mixed freely. Characters
/// that do not form a complete code pass through unchanged.
pub fn legacy_to_tagged(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if is_marker(chars[i]) {
            if let Some((hex, consumed)) = parse_hex(&chars[i..]) {
                out.push_str("<reset><#");
                out.push_str(&hex);
                out.push('>');
                i += consumed;
                continue;
            }
            if i + 1 < chars.len() && is_code(chars[i + 1]) {
                out.push_str(tag_for(chars[i + 1]));
                i += 2;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn is_marker(c: char) -> bool {
    c == '&' || c == '§'
}

fn is_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
}

/// Parse the hex color form starting at a marker: `&x` followed by six
/// marker-prefixed digits. Returns the digits (case preserved) and how many
/// characters the form spans.
fn parse_hex(rest: &[char]) -> Option<(String, usize)> {
    if rest.len() < 14 || !rest[1].eq_ignore_ascii_case(&'x') {
        return None;
    }
    let mut hex = String::with_capacity(6);
    let mut i = 2;
    for _ in 0..6 {
        if !is_marker(rest[i]) || !is_code(rest[i + 1]) {
            return None;
        }
        hex.push(rest[i + 1]);
        i += 2;
    }
    Some((hex, i))
}

fn tag_for(code: char) -> &'static str {
    match code.to_ascii_lowercase() {
        '0' => "<reset><black>",
        '1' => "<reset><dark_blue>",
        '2' => "<reset><dark_green>",
        '3' => "<reset><dark_aqua>",
        '4' => "<reset><dark_red>",
        '5' => "<reset><dark_purple>",
        '6' => "<reset><gold>",
        '7' => "<reset><gray>",
        '8' => "<reset><dark_gray>",
        '9' => "<reset><blue>",
        'a' => "<reset><green>",
        'b' => "<reset><aqua>",
        'c' => "<reset><red>",
        'd' => "<reset><light_purple>",
        'e' => "<reset><yellow>",
        'f' => "<reset><white>",
        'k' => "<obf>",
        'l' => "<b>",
        'm' => "<st>",
        'n' => "<u>",
        'o' => "<i>",
        _ => "<reset>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn convert(input: &str) -> String {
        let converted = legacy_to_tagged(input);
        assert!(
            !has_legacy_format(&converted),
            "converted message still has legacy formatting: {converted}"
        );
        converted
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(convert(""), "");
        assert_eq!(convert("Bist du bereit?"), "Bist du bereit?");
    }

    #[test]
    fn all_colors_convert_with_reset() {
        let cases = [
            ("§0black", "<reset><black>black"),
            ("§1dark blue", "<reset><dark_blue>dark blue"),
            ("§2dark green", "<reset><dark_green>dark green"),
            ("§3dark aqua", "<reset><dark_aqua>dark aqua"),
            ("§4dark red", "<reset><dark_red>dark red"),
            ("§5dark purple", "<reset><dark_purple>dark purple"),
            ("§6gold", "<reset><gold>gold"),
            ("§7gray", "<reset><gray>gray"),
            ("§8dark gray", "<reset><dark_gray>dark gray"),
            ("§9blue", "<reset><blue>blue"),
            ("§agreen", "<reset><green>green"),
            ("§Baqua", "<reset><aqua>aqua"),
            ("§cred", "<reset><red>red"),
            ("§Dlight purple", "<reset><light_purple>light purple"),
            ("§eyellow", "<reset><yellow>yellow"),
            ("§Fwhite", "<reset><white>white"),
        ];
        for (input, expected) in cases {
            assert_eq!(convert(input), expected);
        }
    }

    #[test]
    fn decorations_convert_without_reset() {
        let cases = [
            ("§kobfuscated", "<obf>obfuscated"),
            ("§Lbold", "<b>bold"),
            ("§mstrikethrough", "<st>strikethrough"),
            ("§Nunderlined", "<u>underlined"),
            ("§oitalic", "<i>italic"),
            ("§Rreset", "<reset>reset"),
        ];
        for (input, expected) in cases {
            assert_eq!(convert(input), expected);
        }
    }

    #[test]
    fn mixed_markers_convert() {
        assert_eq!(
            convert("§0Bist &4du §6bereit?"),
            "<reset><black>Bist <reset><dark_red>du <reset><gold>bereit?"
        );
        assert_eq!(
            convert("&aActive Quest: §aFlint"),
            "<reset><green>Active Quest: <reset><green>Flint"
        );
    }

    #[test]
    fn hex_colors_convert_preserving_case() {
        assert_eq!(
            convert("§x§1§a§2§b§3§cLower case hex"),
            "<reset><#1a2b3c>Lower case hex"
        );
        assert_eq!(
            convert("&x&1&A&2&B&3&CUppercase hex"),
            "<reset><#1A2B3C>Uppercase hex"
        );
    }

    #[test]
    fn incomplete_hex_falls_back_to_single_codes() {
        assert_eq!(convert("&x&1&2"), "&x<reset><dark_blue><reset><dark_green>");
    }

    #[test]
    fn lone_marker_passes_through() {
        assert_eq!(convert("100% & counting"), "100% & counting");
        assert_eq!(convert("trailing &"), "trailing &");
        assert_eq!(convert("&zzz"), "&zzz");
    }

    #[test]
    fn detection_finds_codes() {
        assert!(has_legacy_format("&aGreen"));
        assert!(has_legacy_format("prefix §R"));
        assert!(!has_legacy_format("no codes here"));
        assert!(!has_legacy_format("50% & counting"));
    }

    proptest! {
        #[test]
        fn conversion_eliminates_all_legacy_codes(input in "[&§0-9a-zA-Z ]{0,40}") {
            let converted = legacy_to_tagged(&input);
            prop_assert!(!has_legacy_format(&converted));
        }

        #[test]
        fn code_free_input_is_identity(input in "[0-9a-zA-Z ]{0,40}") {
            prop_assert_eq!(legacy_to_tagged(&input), input);
        }
    }
}
