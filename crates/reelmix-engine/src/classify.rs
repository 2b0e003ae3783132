//! Role detection from filenames.
//!
//! Uploaders usually name clips after their role ("hook_v2.mp4",
//! "CTA-final.mov"). Tokens are matched case-insensitively on the file stem.

use std::path::Path;

use reelmix_models::ClipRole;

const HOOK_TOKENS: &[&str] = &["hook", "hooks", "intro", "opener"];
const CTA_TOKENS: &[&str] = &["cta", "outro", "closer", "calltoaction"];
const POINT_TOKENS: &[&str] = &[
    "sp",
    "point",
    "points",
    "sellingpoint",
    "feature",
    "benefit",
    "usp",
];

/// Guess a clip's role from its filename, if any token matches.
pub fn role_from_filename(name: &str) -> Option<ClipRole> {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_lowercase();

    let tokens: Vec<&str> = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(strip_trailing_digits)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| HOOK_TOKENS.contains(t)) {
        return Some(ClipRole::Hook);
    }
    if tokens.iter().any(|t| CTA_TOKENS.contains(t))
        || contains_phrase(&tokens, &["call", "to", "action"])
    {
        return Some(ClipRole::Cta);
    }
    if tokens.iter().any(|t| POINT_TOKENS.contains(t))
        || contains_phrase(&tokens, &["selling", "point"])
    {
        return Some(ClipRole::SellingPoint);
    }
    None
}

/// "hook2" and "hook" are the same token.
fn strip_trailing_digits(token: &str) -> &str {
    token.trim_end_matches(|c: char| c.is_ascii_digit())
}

fn contains_phrase(tokens: &[&str], phrase: &[&str]) -> bool {
    tokens.windows(phrase.len()).any(|w| w == phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_names() {
        assert_eq!(role_from_filename("hook_v2.mp4"), Some(ClipRole::Hook));
        assert_eq!(role_from_filename("Hook1.MOV"), Some(ClipRole::Hook));
        assert_eq!(role_from_filename("brand-intro.webm"), Some(ClipRole::Hook));
    }

    #[test]
    fn test_cta_names() {
        assert_eq!(role_from_filename("CTA-final.mov"), Some(ClipRole::Cta));
        assert_eq!(role_from_filename("call_to_action.mp4"), Some(ClipRole::Cta));
    }

    #[test]
    fn test_selling_point_names() {
        assert_eq!(role_from_filename("sp3.mp4"), Some(ClipRole::SellingPoint));
        assert_eq!(role_from_filename("selling point 2.mp4"), Some(ClipRole::SellingPoint));
        assert_eq!(role_from_filename("feature-battery.mp4"), Some(ClipRole::SellingPoint));
    }

    #[test]
    fn test_no_substring_matches() {
        // "shook" and "factor" must not match "hook" / "cta"
        assert_eq!(role_from_filename("shook_factor.mp4"), None);
        assert_eq!(role_from_filename("IMG_0042.mp4"), None);
    }

    #[test]
    fn test_hook_wins_over_cta() {
        assert_eq!(role_from_filename("hook_or_cta.mp4"), Some(ClipRole::Hook));
    }
}
