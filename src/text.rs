//! Text transform chain for generated names
//!
//! Pure string operations, no I/O. The chain is always applied in the fixed
//! order normalize -> glue -> prefix -> suffix -> case; enabling a subset
//! skips the disabled steps but never reorders them.

use serde::{Deserialize, Serialize};

/// Fallback token when normalization strips a name down to nothing
const EMPTY_NAME_FALLBACK: &str = "image";

/// Case transform modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Upper,
    Lower,
    /// Capitalize every word, lowercase the rest of each word
    Title,
    /// Capitalize only the first character of the whole string
    Sentence,
}

/// Keep only ASCII letters, digits and whitespace, collapse whitespace runs
/// to a single space and trim. An empty result falls back to `"image"`.
pub fn normalize(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        EMPTY_NAME_FALLBACK.to_string()
    } else {
        collapsed
    }
}

/// Replace every space with `separator`. Meant to run on normalized text,
/// where only single spaces remain.
pub fn glue(name: &str, separator: &str) -> String {
    name.replace(' ', separator)
}

/// Prepend `string` verbatim, no separator inserted
pub fn prefix(name: &str, string: &str) -> String {
    format!("{string}{name}")
}

/// Append `string` verbatim
pub fn suffix(name: &str, string: &str) -> String {
    format!("{name}{string}")
}

/// Apply a case transform
pub fn change_case(name: &str, mode: CaseMode) -> String {
    match mode {
        CaseMode::Upper => name.to_uppercase(),
        CaseMode::Lower => name.to_lowercase(),
        CaseMode::Title => title_case(name),
        CaseMode::Sentence => capitalize_word(name),
    }
}

/// Capitalize every letter that starts a word. A word starts after any
/// non-alphabetic character, so glued names like "a-red-car" title-case to
/// "A-Red-Car".
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_is_alpha = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_is_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            out.push(c);
            prev_is_alpha = false;
        }
    }
    out
}

/// Apply a case transform when a mode is set; `None` leaves the text unchanged
pub fn apply_case(name: &str, mode: Option<CaseMode>) -> String {
    match mode {
        Some(mode) => change_case(name, mode),
        None => name.to_string(),
    }
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("a red  car, on a street!"), "a red car on a street");
        assert_eq!(normalize("  spaced   out  "), "spaced out");
        assert_eq!(normalize("IMG_1234.CR2"), "IMG1234CR2");
    }

    #[test]
    fn test_normalize_empty_fallback() {
        assert_eq!(normalize(""), "image");
        assert_eq!(normalize("!!! ... ???"), "image");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["a red car", "  x!  y?  ", "", "Hello, World 42"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_glue() {
        assert_eq!(glue("a red car", "-"), "a-red-car");
        assert_eq!(glue("a red car", "__"), "a__red__car");
        // No spaces means glue is the identity
        assert_eq!(glue("already-glued", "-"), "already-glued");
    }

    #[test]
    fn test_prefix_suffix_verbatim() {
        assert_eq!(prefix("car", "IMG_"), "IMG_car");
        assert_eq!(suffix("car", "_v2"), "car_v2");
    }

    #[test]
    fn test_case_modes() {
        assert_eq!(change_case("a red car", CaseMode::Upper), "A RED CAR");
        assert_eq!(change_case("A Red CAR", CaseMode::Lower), "a red car");
        assert_eq!(change_case("a red CAR", CaseMode::Title), "A Red Car");
        assert_eq!(change_case("a red CAR", CaseMode::Sentence), "A red car");
    }

    #[test]
    fn test_absent_case_is_noop() {
        assert_eq!(apply_case("mIxEd CaSe", None), "mIxEd CaSe");
    }

    #[test]
    fn test_unrecognized_case_mode_fails_to_parse() {
        assert!(CaseMode::from_str("spongebob", true).is_err());
        assert!(CaseMode::from_str("title", true).is_ok());
    }

    #[test]
    fn test_title_case_after_glue_separator() {
        // Title casing restarts words at the glue separator
        let glued = glue("a red car on a street", "-");
        assert_eq!(
            change_case(&glued, CaseMode::Title),
            "A-Red-Car-On-A-Street"
        );
    }

    #[test]
    fn test_title_case_restarts_after_digits() {
        assert_eq!(change_case("img2photo", CaseMode::Title), "Img2Photo");
    }
}
