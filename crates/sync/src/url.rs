//! Author-URL canonicalisation.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ErrorKind, Result};

/// The accepted author-URL shapes. Either the full site-relative form
/// `/x/xname/` (optionally prefixed by a scheme and one of the known
/// domains, optionally followed by a page path), or a bare tail like
/// `xname`. Full-form captures: (1) site-relative path, (2) directory
/// letter, (3) first letter of the name — the two must agree, which the
/// original ECMAScript pattern expressed with a backreference. Bare-tail
/// capture: (4).
static AUTHOR_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:http://(?:samlib\.ru|zhurnal\.lib\.ru))?",
        r"(/?([a-z])/([a-z])[a-z0-9_-]+/?).*$",
        r"|^([a-z0-9_-]+/?)$",
    ))
    .unwrap()
});

/// Canonicalise a user-supplied author URL to its fully qualified form.
///
/// `"sedrik"` becomes `http://samlib.ru/s/sedrik`, any full form keeps
/// its path verbatim. Strip the domain with
/// [`strip_domain`](samlib_net::strip_domain) before storing the result.
pub fn canonical_author_url(url: &str) -> Result<String> {
    if url.is_empty() {
        exn::bail!(ErrorKind::InvalidUrl(url.to_owned()));
    }
    let Some(found) = AUTHOR_URL.captures(url) else {
        exn::bail!(ErrorKind::InvalidUrl(url.to_owned()));
    };

    if let (Some(path), Some(directory), Some(initial)) = (found.get(1), found.get(2), found.get(3)) {
        if !directory.as_str().eq_ignore_ascii_case(initial.as_str()) {
            exn::bail!(ErrorKind::InvalidUrl(url.to_owned()));
        }
        return Ok(samlib_net::to_url(&[path.as_str()]));
    }

    match found.get(4) {
        Some(tail) => Ok(samlib_net::to_url(&[&tail.as_str()[..1], tail.as_str()])),
        None => exn::bail!(ErrorKind::InvalidUrl(url.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use samlib_net::strip_domain;

    #[rstest]
    #[case("sedrik", "http://samlib.ru/s/sedrik")]
    #[case("http://samlib.ru/s/sedrik/", "http://samlib.ru/s/sedrik/")]
    #[case("http://zhurnal.lib.ru/s/sedrik/", "http://samlib.ru/s/sedrik/")]
    #[case("/s/sedrik/", "http://samlib.ru/s/sedrik/")]
    #[case("s/sedrik/", "http://samlib.ru/s/sedrik/")]
    #[case("http://samlib.ru/s/sedrik/index.shtml", "http://samlib.ru/s/sedrik/")]
    #[case("saggaro_g", "http://samlib.ru/s/saggaro_g")]
    fn test_accepted_shapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical_author_url(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("http://samlib.ru/")]
    #[case("/s/tedrik/")] // directory letter must match the name
    #[case("two words")]
    #[case("http://elsewhere.example/s/sedrik/")]
    fn test_rejected_shapes(#[case] input: &str) {
        assert!(canonical_author_url(input).is_err());
    }

    #[test]
    fn test_canonicalisation_is_stable() {
        for input in ["sedrik", "http://samlib.ru/s/sedrik/", "s/sedrik/"] {
            let once = canonical_author_url(input).unwrap();
            assert_eq!(canonical_author_url(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_stored_form_is_site_relative() {
        let canonical = canonical_author_url("sedrik").unwrap();
        assert_eq!(strip_domain(&canonical), "/s/sedrik");
        let canonical = canonical_author_url("http://samlib.ru/s/sedrik/").unwrap();
        assert_eq!(strip_domain(&canonical), "/s/sedrik/");
    }
}
