// SPDX-License-Identifier: GPL-3.0-only

//! Sentence-start detection for auto-capitalization.

/// Returns `true` if the text before the cursor is at the start of a sentence.
///
/// A sentence starts when there is no context at all, when the context is
/// empty or whitespace-only, when it ends with a newline, or when it ends with
/// one or more `.` followed by at least one whitespace character.
///
/// A `true` result only ever turns shift on; callers never use `false` to turn
/// it off.
pub fn should_auto_capitalize(context: Option<&str>) -> bool {
    let Some(text) = context else {
        return true;
    };

    if text.trim().is_empty() || text.ends_with('\n') {
        return true;
    }

    let body = text.trim_end();
    body.len() < text.len() && body.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_starts() {
        assert!(should_auto_capitalize(None));
        assert!(should_auto_capitalize(Some("")));
        assert!(should_auto_capitalize(Some("   ")));
        assert!(should_auto_capitalize(Some("Hello. ")));
        assert!(should_auto_capitalize(Some("Wait...  ")));
        assert!(should_auto_capitalize(Some("Hello.\t")));
        assert!(should_auto_capitalize(Some("Hello\n")));
        assert!(should_auto_capitalize(Some("Привет. ")));
    }

    #[test]
    fn test_mid_sentence() {
        assert!(!should_auto_capitalize(Some("Hello ")));
        assert!(!should_auto_capitalize(Some("Hello.")));
        assert!(!should_auto_capitalize(Some("Hello")));
        assert!(!should_auto_capitalize(Some("Hello! ")));
        assert!(!should_auto_capitalize(Some("e.g. x")));
    }
}
