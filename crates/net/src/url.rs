//! Site URL assembly.

pub const PROTOCOL: &str = "http";
pub const DOMAIN: &str = "samlib.ru";

/// Combine path segments into a fully qualified URL.
///
/// Empty segments are skipped; a `/` is inserted before a segment unless
/// it already starts with `/` — or with `.`, so suffix segments like
/// `.shtml` attach to the previous one.
pub fn to_url_with(protocol: &str, domain: &str, segments: &[&str]) -> String {
    let mut url = format!("{protocol}://{domain}");
    for segment in segments.iter().filter(|segment| !segment.is_empty()) {
        if !segment.starts_with('/') && !segment.starts_with('.') {
            url.push('/');
        }
        url.push_str(segment);
    }
    url
}

/// [`to_url_with`] against the site defaults.
pub fn to_url(segments: &[&str]) -> String {
    to_url_with(PROTOCOL, DOMAIN, segments)
}

/// Reduce a fully qualified site URL to its site-relative path.
///
/// URLs not mentioning the site domain pass through unchanged (they are
/// assumed to be site-relative already).
pub fn strip_domain(url: &str) -> &str {
    match url.find(DOMAIN) {
        Some(position) => &url[position + DOMAIN.len()..],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_url_inserts_separators() {
        assert_eq!(to_url(&["s", "sedrik"]), "http://samlib.ru/s/sedrik");
        assert_eq!(to_url(&["/s/sedrik/"]), "http://samlib.ru/s/sedrik/");
    }

    #[test]
    fn test_to_url_attaches_suffix_segments() {
        assert_eq!(to_url(&["/s/sedrik", "/sbornik", ".shtml"]), "http://samlib.ru/s/sedrik/sbornik.shtml");
    }

    #[test]
    fn test_to_url_skips_empty_segments() {
        assert_eq!(to_url(&["", "/s/sedrik/", ""]), "http://samlib.ru/s/sedrik/");
        assert_eq!(to_url(&[]), "http://samlib.ru");
    }

    #[test]
    fn test_strip_domain() {
        assert_eq!(strip_domain("http://samlib.ru/s/sedrik/"), "/s/sedrik/");
        assert_eq!(strip_domain("/s/sedrik/"), "/s/sedrik/");
    }
}
