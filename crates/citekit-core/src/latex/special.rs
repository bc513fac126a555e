//! Accent and special-character macro tables, plus the inverse helpers the
//! output formatter needs (ASCII folding, brace balancing, markup
//! re-rendering).
//!
//! Patterns are matched longest-first so e.g. `\oe` wins over `\o` and
//! `\'{\i}` over `\i`.

use lazy_static::lazy_static;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref MACRO_REPLACEMENTS: Vec<(&'static str, &'static str)> = {
        let mut table: Vec<(&'static str, &'static str)> = vec![
            // Umlaut (diaeresis)
            ("\\\"a", "ä"), ("\\\"A", "Ä"), ("\\\"e", "ë"), ("\\\"E", "Ë"),
            ("\\\"i", "ï"), ("\\\"I", "Ï"), ("\\\"o", "ö"), ("\\\"O", "Ö"),
            ("\\\"u", "ü"), ("\\\"U", "Ü"), ("\\\"y", "ÿ"),
            ("\\\"{a}", "ä"), ("\\\"{A}", "Ä"), ("\\\"{e}", "ë"), ("\\\"{E}", "Ë"),
            ("\\\"{i}", "ï"), ("\\\"{o}", "ö"), ("\\\"{O}", "Ö"),
            ("\\\"{u}", "ü"), ("\\\"{U}", "Ü"),
            // Acute
            ("\\'a", "á"), ("\\'A", "Á"), ("\\'e", "é"), ("\\'E", "É"),
            ("\\'i", "í"), ("\\'o", "ó"), ("\\'O", "Ó"), ("\\'u", "ú"),
            ("\\'y", "ý"), ("\\'c", "ć"), ("\\'n", "ń"), ("\\'s", "ś"),
            ("\\'{a}", "á"), ("\\'{e}", "é"), ("\\'{E}", "É"), ("\\'{i}", "í"),
            ("\\'{\\i}", "í"), ("\\'{o}", "ó"), ("\\'{u}", "ú"),
            // Grave
            ("\\`a", "à"), ("\\`A", "À"), ("\\`e", "è"), ("\\`E", "È"),
            ("\\`i", "ì"), ("\\`o", "ò"), ("\\`u", "ù"),
            ("\\`{a}", "à"), ("\\`{e}", "è"), ("\\`{o}", "ò"), ("\\`{u}", "ù"),
            // Circumflex
            ("\\^a", "â"), ("\\^e", "ê"), ("\\^i", "î"), ("\\^o", "ô"), ("\\^u", "û"),
            ("\\^{a}", "â"), ("\\^{e}", "ê"), ("\\^{o}", "ô"), ("\\^{u}", "û"),
            // Tilde
            ("\\~a", "ã"), ("\\~A", "Ã"), ("\\~n", "ñ"), ("\\~N", "Ñ"),
            ("\\~o", "õ"), ("\\~{a}", "ã"), ("\\~{n}", "ñ"), ("\\~{o}", "õ"),
            // Cedilla
            ("\\c c", "ç"), ("\\c C", "Ç"), ("\\c{c}", "ç"), ("\\c{C}", "Ç"),
            // Ring
            ("\\r a", "å"), ("\\r A", "Å"), ("\\r{a}", "å"), ("\\r{A}", "Å"),
            ("\\aa", "å"), ("\\AA", "Å"),
            // Caron
            ("\\v c", "č"), ("\\v C", "Č"), ("\\v s", "š"), ("\\v S", "Š"),
            ("\\v z", "ž"), ("\\v Z", "Ž"),
            ("\\v{c}", "č"), ("\\v{s}", "š"), ("\\v{z}", "ž"),
            // Breve, macron, dot, ogonek
            ("\\u{a}", "ă"), ("\\u{g}", "ğ"),
            ("\\=a", "ā"), ("\\=e", "ē"), ("\\=i", "ī"), ("\\=o", "ō"), ("\\=u", "ū"),
            ("\\.z", "ż"), ("\\.{z}", "ż"), ("\\.Z", "Ż"),
            ("\\k a", "ą"), ("\\k e", "ę"), ("\\k{a}", "ą"), ("\\k{e}", "ę"),
            // Stroke, dotless i
            ("\\l", "ł"), ("\\L", "Ł"), ("\\o", "ø"), ("\\O", "Ø"),
            ("\\i", "ı"), ("{\\i}", "ı"),
            // Ligatures and letters
            ("\\ae", "æ"), ("\\AE", "Æ"), ("\\oe", "œ"), ("\\OE", "Œ"),
            ("\\ss", "ß"),
            // Escaped BibTeX/TeX punctuation
            ("\\&", "&"), ("\\%", "%"), ("\\$", "$"), ("\\#", "#"),
            ("\\_", "_"), ("\\{", "{"), ("\\}", "}"),
            // Common symbols
            ("\\textendash", "–"), ("\\textemdash", "—"),
            ("\\textquotedblleft", "\u{201C}"), ("\\textquotedblright", "\u{201D}"),
            ("\\ldots", "…"), ("\\dots", "…"),
            ("\\times", "×"), ("\\deg", "°"),
            ("\\copyright", "©"), ("\\P", "¶"), ("\\S", "§"),
            ("\\pounds", "£"), ("\\euro", "€"),
            // Non-breaking space
            ("~", "\u{00A0}"),
        ];
        table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        table
    };
}

/// Match a macro at the start of `rest`; returns the consumed byte length
/// and the Unicode replacement.
pub(crate) fn resolve(rest: &str) -> Option<(usize, &'static str)> {
    for (pattern, replacement) in MACRO_REPLACEMENTS.iter() {
        if rest.starts_with(pattern) {
            return Some((pattern.len(), replacement));
        }
    }
    None
}

/// Fold a value to ASCII: NFKD-decompose, then drop every non-ASCII
/// character. Combining marks decompose away; characters with no ASCII
/// decomposition (e.g. Cyrillic) are stripped entirely.
pub fn fold_ascii(value: &str) -> String {
    value.nfkd().filter(char::is_ascii).collect()
}

/// Replace neutral protected-span markup with BibTeX brace protection.
pub fn markup_to_braces(value: &str) -> String {
    value
        .replace("<span class=\"nocase\">", "{")
        .replace("</span>", "}")
}

/// Ensure a value is brace-balanced for output; unbalanced values lose
/// their braces rather than producing an unparseable entry.
pub fn balance_braces(value: &str) -> String {
    let mut depth = 0i32;
    for b in value.bytes() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth < 0 {
                    return value.replace(['{', '}'], "");
                }
            }
            _ => {}
        }
    }
    if depth == 0 {
        value.to_string()
    } else {
        value.replace(['{', '}'], "")
    }
}
