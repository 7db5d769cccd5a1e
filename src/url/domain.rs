use url::Url;

/// Normalizes a URL or bare domain to its lowercase host without a `www.` prefix
///
/// Input without a scheme is treated as `http://`. Port, path, query and fragment
/// are dropped. When the input does not parse as a URL, a best-effort textual
/// cleanup is returned instead so callers never have to handle an error.
///
/// # Examples
///
/// ```
/// use siteseeker::url::normalize_domain;
///
/// assert_eq!(normalize_domain("https://www.DCInside.com/board/1"), "dcinside.com");
/// assert_eq!(normalize_domain("fmkorea.com"), "fmkorea.com");
/// assert_eq!(normalize_domain("http://gall.dcinside.com:8080/x"), "gall.dcinside.com");
/// ```
pub fn normalize_domain(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match parse_lenient(trimmed).and_then(|url| url.host_str().map(str::to_lowercase)) {
        Some(host) => strip_www(&host).to_string(),
        None => fallback_domain(trimmed),
    }
}

/// Parses `input` as a URL, assuming `http://` when no scheme is present
pub fn parse_lenient(input: &str) -> Option<Url> {
    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Url::parse(input).ok()
    } else {
        Url::parse(&format!("http://{}", input)).ok()
    }
}

/// Returns the first label of a normalized domain (`"casino-royal"` for `"casino-royal.net"`)
pub fn leading_label(domain: &str) -> Option<&str> {
    domain.split('.').next().filter(|label| !label.is_empty())
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn fallback_domain(input: &str) -> String {
    let lower = input.to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let host = without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .split(':')
        .next()
        .unwrap_or_default();
    let host = strip_www(host);

    if host.is_empty() {
        input.to_string()
    } else {
        host.to_string()
    }
}
