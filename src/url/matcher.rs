/// Checks if a host matches a pattern
///
/// `"discord.gg"` matches only that host. `"*.discord.com"` matches the bare
/// `discord.com` as well as any subdomain of it.
///
/// # Examples
///
/// ```
/// use siteseeker::url::matches_wildcard;
///
/// assert!(matches_wildcard("open.kakao.com", "open.kakao.com"));
/// assert!(!matches_wildcard("open.kakao.com", "kakao.com"));
/// assert!(matches_wildcard("*.discord.com", "discord.com"));
/// assert!(matches_wildcard("*.discord.com", "ptb.discord.com"));
/// assert!(!matches_wildcard("*.discord.com", "notdiscord.com"));
/// ```
pub fn matches_wildcard(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || (host.len() > base.len()
                    && host.ends_with(base)
                    && host.as_bytes()[host.len() - base.len() - 1] == b'.')
        }
        None => host == pattern,
    }
}

/// Returns true if `host` matches any of `patterns`
pub fn matches_any<S: AsRef<str>>(patterns: &[S], host: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| matches_wildcard(pattern.as_ref(), host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern() {
        assert!(matches_wildcard("t.me", "t.me"));
        assert!(!matches_wildcard("t.me", "x.t.me"));
    }

    #[test]
    fn test_wildcard_pattern() {
        assert!(matches_wildcard("*.discord.com", "discord.com"));
        assert!(matches_wildcard("*.discord.com", "canary.discord.com"));
        assert!(matches_wildcard("*.discord.com", "a.b.discord.com"));
    }

    #[test]
    fn test_wildcard_requires_label_boundary() {
        assert!(!matches_wildcard("*.discord.com", "fakediscord.com"));
        assert!(!matches_wildcard("*.discord.com", "discord.com.evil.net"));
    }

    #[test]
    fn test_matches_any() {
        let patterns = vec!["open.kakao.com".to_string(), "*.discord.com".to_string()];
        assert!(matches_any(&patterns, "open.kakao.com"));
        assert!(matches_any(&patterns, "ptb.discord.com"));
        assert!(!matches_any(&patterns, "kakao.com"));

        let empty: Vec<String> = Vec::new();
        assert!(!matches_any(&empty, "kakao.com"));
    }
}
