#![forbid(unsafe_code)]

//! HTML escaping for text spliced into rendered fragments.
//!
//! Output matches what a browser produces when text is assigned through
//! `textContent` and read back through `innerHTML`: only `&`, `<` and `>`
//! are replaced. Attribute values additionally escape `"`.

fn narrow(escaped: &str, keep_double_quote: bool) -> String {
    // `&` is always escaped first, so these entities cannot come from input.
    let out = escaped.replace("&#x2f;", "/").replace("&#x27;", "'");
    if keep_double_quote {
        out.replace("&quot;", "\"")
    } else {
        out
    }
}

/// Escape `value` for use as element text.
#[must_use]
pub fn escape(value: &str) -> String {
    narrow(&v_htmlescape::escape(value).to_string(), true)
}

/// Escape `value` for use inside a double-quoted attribute.
#[must_use]
pub fn escape_attr(value: &str) -> String {
    narrow(&v_htmlescape::escape(value).to_string(), false)
}

#[cfg(test)]
mod tests {
    use super::{escape, escape_attr};
    use pretty_assertions::assert_eq;

    #[test]
    fn escapes_markup_characters() {
        let out = escape("<b>Tom & \"Jerry\"</b>");
        assert_eq!(out, "&lt;b&gt;Tom &amp; \"Jerry\"&lt;/b&gt;");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape("hey! whats going on?"), "hey! whats going on?");
        assert_eq!(escape("don't stop at 1/2"), "don't stop at 1/2");
    }

    #[test]
    fn urls_keep_their_slashes() {
        let url = "https://www.linkedin.com/in/sepi-chakaveh/";
        assert_eq!(escape_attr(url), url);
        assert_eq!(escape(url), url);
    }

    #[test]
    fn attributes_escape_double_quotes() {
        assert_eq!(escape_attr("a\"b<c>&"), "a&quot;b&lt;c&gt;&amp;");
    }

    #[test]
    fn literal_entities_in_input_stay_escaped() {
        assert_eq!(escape("&#x2f; &quot;"), "&amp;#x2f; &amp;quot;");
    }
}
