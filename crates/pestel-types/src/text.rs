//! Keyword matching over free-form decision and state text.
//!
//! Decisions, scenario relevance, and fallback impacts are all driven by
//! keyword tests against lowercase text. Short keywords such as `ai` would
//! match inside unrelated words ("sust*ai*nability", "maint*ai*n"), so any
//! keyword of two characters or fewer only matches a whole word.

/// Keywords at or below this length must match a whole word.
const WHOLE_WORD_MAX_LEN: usize = 2;

/// Return `true` if `text` mentions `keyword`, case-insensitively.
pub fn mentions(text: &str, keyword: &str) -> bool {
    let text = text.to_lowercase();
    let keyword = keyword.to_lowercase();
    if keyword.is_empty() {
        return false;
    }
    if keyword.chars().count() > WHOLE_WORD_MAX_LEN {
        return text.contains(&keyword);
    }
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| word == keyword)
}

/// Return `true` if `text` mentions any of `keywords`.
pub fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| mentions(text, keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_keywords_match_substrings() {
        assert!(mentions("Accelerate renewable energy", "renew"));
        assert!(mentions("CLIMATE action", "climate"));
    }

    #[test]
    fn short_keywords_need_whole_words() {
        assert!(mentions("Launch AI-powered product", "ai"));
        assert!(!mentions("Launch sustainability initiative", "ai"));
        assert!(!mentions("Maintain market share", "ai"));
    }

    #[test]
    fn empty_keyword_never_matches() {
        assert!(!mentions("anything", ""));
    }

    #[test]
    fn any_of_several() {
        assert!(mentions_any("Form strategic alliance", &["cooperation", "alliance"]));
        assert!(!mentions_any("Form strategic alliance", &["quantum"]));
    }
}
