//! Plain-text <-> HTML transform for rich fields.
//!
//! Rich fields (`description`, `summary`, `detail`, `lead`, `heroSubtitle`,
//! `body`, achievement `text`) are stored as HTML and edited as plain text.
//!
//! Saving runs [`plain_to_html`]: text is escaped, bare URLs become anchors and
//! newlines become `<br>`. If the text already carries markup (an anchor, a line
//! break or an escaped entity) it is stored as is. Editors rely on this to
//! hand-author links, so the pass-through is part of the contract.
//!
//! Loading runs [`html_to_plain`], which undoes what `plain_to_html` produced.
//! A field holding a hand-authored anchor is shown verbatim so it survives the
//! next save unchanged. Only real tags are stripped: a stray `<`, `>` or `&`
//! in stored text is kept as a character and comes back escaped on save.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"']+"#).unwrap());

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<a\s[^>]*>|<br\s*/?>|&(?:amp|lt|gt|quot|nbsp|#39|#x27);").unwrap()
});

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*"([^"]*)"[^>]*>(.*?)</a\s*>"#).unwrap()
});

static ANCHOR_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<a\s").unwrap());
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static TRAILING_P_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p\s*>\s*$").unwrap());
static P_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p\s*>").unwrap());
/// A tag opens with a letter, `/` or `!` (comments, doctypes).
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[A-Za-z/!][^>]*>").unwrap());

/// Escapes `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn decode_entities(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// True when `text` already contains anchor, line-break or entity markup.
pub fn has_markup(text: &str) -> bool {
    MARKUP_RE.is_match(text)
}

/// Escapes `text` and wraps recognized URLs in anchors. Newlines become `<br>`.
pub fn linkify(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for found in URL_RE.find_iter(&text) {
        let (url, trail) = split_trailing_punctuation(found.as_str());
        let href = if url.len() >= 4 && url[..4].eq_ignore_ascii_case("www.") {
            format!("https://{url}")
        } else {
            url.to_string()
        };

        out.push_str(&escape_html(&text[last..found.start()]));
        out.push_str(&format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            escape_html(&href),
            escape_html(url)
        ));
        out.push_str(&escape_html(trail));
        last = found.end();
    }
    out.push_str(&escape_html(&text[last..]));

    out.replace('\n', "<br>")
}

/// Save direction. Idempotent: feeding its output back in returns it unchanged.
pub fn plain_to_html(text: &str) -> String {
    if has_markup(text) {
        text.to_string()
    } else {
        linkify(text)
    }
}

/// Load direction.
pub fn html_to_plain(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return html.to_string();
    }

    let mut hand_authored = false;
    let unlinked = ANCHOR_RE.replace_all(html, |caps: &Captures| {
        let href = decode_entities(&caps[1]);
        let label = decode_entities(&caps[2]);
        if is_auto_link(&href, &label) {
            caps[2].to_string()
        } else {
            hand_authored = true;
            caps[0].to_string()
        }
    });
    if hand_authored || ANCHOR_OPEN_RE.is_match(&unlinked) {
        return html.to_string();
    }

    let text = BR_RE.replace_all(&unlinked, "\n");
    let text = TRAILING_P_RE.replace(&text, "");
    let text = P_CLOSE_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    decode_entities(&text)
}

fn is_auto_link(href: &str, label: &str) -> bool {
    href == label || href == format!("https://{label}") || href == format!("http://{label}")
}

fn split_trailing_punctuation(url: &str) -> (&str, &str) {
    let mut end = url.len();
    loop {
        let Some(last) = url[..end].chars().last() else {
            break;
        };
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ')' => url[..end].matches('(').count() < url[..end].matches(')').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    url.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_and_links_plain_text() {
        let html = plain_to_html("Tom & Jerry <3\nsee https://example.org/a?b=1.");
        assert_eq!(
            html,
            "Tom &amp; Jerry &lt;3<br>see <a href=\"https://example.org/a?b=1\" target=\"_blank\" rel=\"noopener\">https://example.org/a?b=1</a>."
        );
    }

    #[test]
    fn www_links_get_a_scheme() {
        let html = linkify("www.example.org");
        assert!(html.contains(r#"href="https://www.example.org""#));
        assert!(html.contains(">www.example.org</a>"));
    }

    #[test]
    fn balanced_parentheses_stay_in_url() {
        let html = linkify("(https://en.wikipedia.org/wiki/Foo_(bar))");
        assert!(html.contains(r#"href="https://en.wikipedia.org/wiki/Foo_(bar)""#));
        assert!(html.ends_with("</a>)"));
    }

    #[test]
    fn transform_is_idempotent() {
        for input in [
            "plain words",
            "a & b",
            "line one\nline two",
            "visit https://example.org now",
            r#"<a href="https://x.org">hand made</a>"#,
            "",
        ] {
            let once = plain_to_html(input);
            let twice = plain_to_html(&once);
            assert_eq!(once, twice, "input: {input:?}");
            assert!(!twice.contains("&amp;amp;"));
        }
    }

    #[test]
    fn existing_markup_passes_through() {
        let html = r#"Read <a href="https://x.org">the report</a><br>Thanks"#;
        assert_eq!(plain_to_html(html), html);
    }

    #[test]
    fn html_to_plain_reverses_linkify() {
        for plain in [
            "a & b\nsee https://example.org.",
            "quotes \"here\" and 'there'",
            "trailing newline\n",
            "www.example.org",
            "no markup at all",
        ] {
            assert_eq!(html_to_plain(&plain_to_html(plain)), plain, "plain: {plain:?}");
        }
    }

    #[test]
    fn paragraphs_become_newlines() {
        assert_eq!(html_to_plain("<p>First</p><p>Second &amp; last</p>"), "First\nSecond & last");
        assert_eq!(html_to_plain("one<br/>two<BR>three"), "one\ntwo\nthree");
        assert_eq!(html_to_plain("<strong>bold</strong> text"), "bold text");
    }

    #[test]
    fn stray_brackets_and_ampersands_are_text() {
        for stored in ["Ages 6 < 12 and 15 > 10", "Fish & chips", "1<2 & 3>2, R&D <3"] {
            let plain = html_to_plain(stored);
            assert_eq!(plain, stored);

            let saved = plain_to_html(&plain);
            assert!(!saved.contains('<'), "{saved}");
            assert_eq!(html_to_plain(&saved), stored);
            assert_eq!(plain_to_html(&html_to_plain(&saved)), saved);
        }
        assert_eq!(plain_to_html("Ages 6 < 12 and 15 > 10"), "Ages 6 &lt; 12 and 15 &gt; 10");
    }

    #[test]
    fn only_real_tags_are_stripped() {
        assert_eq!(html_to_plain("<p>Ages 6 < 12</p><p>R&D</p>"), "Ages 6 < 12\nR&D");
        assert_eq!(html_to_plain("<em>a</em> > b <!-- note -->"), "a > b ");
        assert_eq!(html_to_plain("x <= y"), "x <= y");
    }

    #[test]
    fn hand_authored_anchor_is_kept_verbatim() {
        let html = r#"<p>Intro</p><a href="https://x.org">label</a>"#;
        assert_eq!(html_to_plain(html), html);
        assert_eq!(plain_to_html(&html_to_plain(html)), html);
    }
}
