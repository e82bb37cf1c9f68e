use url::Url;

/// Extracts the lowercase host from a URL string
///
/// # Examples
///
/// ```
/// use shelf_crawler::url::extract_domain;
///
/// assert_eq!(extract_domain("https://Okala.com/12345"), Some("okala.com".to_string()));
/// assert_eq!(extract_domain("not a url"), None);
/// ```
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Returns the URL path with every `/` removed
///
/// Product pages on some sites are addressed by a bare numeric path, so this
/// doubles as their product identifier.
///
/// # Examples
///
/// ```
/// use shelf_crawler::url::path_key;
///
/// assert_eq!(path_key("https://okala.com/12345/"), Some("12345".to_string()));
/// ```
pub fn path_key(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| u.path().replace('/', ""))
}

/// Returns the non-empty path segments of a URL
pub fn path_segments(url: &str) -> Vec<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .map(|segments| segments.filter(|s| !s.is_empty()).map(String::from).collect())
        })
        .unwrap_or_default()
}
