use regex::Regex;
use std::sync::LazyLock;

/// One work line on a listing. Groups: (1) url without the `.shtml`
/// suffix, (2) title, (3) size in kilobytes, (4) genre, (5) description.
/// The leading optional group swallows the update marker (a `<font>`
/// prefix) or a co-author marker (a bold prefix); score and comment
/// blocks inside `<small>` are skipped when present.
pub(crate) static WORK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?mi)^<DL><DT><li>",
        r"(?:(?:<font.*?</font>)|(?:\s*<b>.*</b>\s*))?",
        r"<A\s+HREF=([^<>]+)\.shtml><b>",
        r"(.*?)",
        r"</b></A>\s+&nbsp;\s+<b>",
        r"(\d+)",
        r"k</b>\s+&nbsp;\s+<small>",
        r"(?:.*?</b>\s+&nbsp;)?\s*",
        r"([^<>]+)?",
        r#"\s*(?:<A\s+HREF="/comment.*?<DD>)?"#,
        r##"(?:<font\s+color="#555555">"##,
        r"([^<>]+)",
        r"</font>)?",
        r".*</DL>$",
    ))
    .unwrap()
});

/// One group section. Groups: (1) sub-page url of an extended group or
/// nothing, (2) group name, (3) the inner fragment holding the work
/// lines. A section ends at the opening of the next one or at the end
/// of the page content.
pub(crate) static GROUP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"<a\s+name=gr\d+>",
        r"(?:<a\s+href=([^<>]+)\.shtml><font\s+color=#393939>)?",
        r"([^<>]+)",
        r"(?:</font></a>)?",
        r"(?:<gr\d+>)?",
        r"([\S\s]*?)",
        r"(?:(?:</small><p><font.*?)|(?:</dl>))",
    ))
    .unwrap()
});

/// The author page header. Groups: (1) author name, (2) description.
/// A line break separates the two in the markup.
pub(crate) static AUTHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?mi)^<h3>",
        r"([^<>]*)<br>",
        r"(?:\s+<font[^<>]+>",
        r"([^<>]+)",
        r"</font>)?</h3>$",
    ))
    .unwrap()
});

pub(crate) static HTML_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)</?(\S+?)[^>]*?>").unwrap());

pub(crate) static HTML_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)<dd>|<br/?>").unwrap());

pub(crate) static MULTIPLE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)\s{2,}").unwrap());
