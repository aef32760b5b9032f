//! Markup neutralisation for user-supplied text.
//!
//! Every tag is stripped, `<script>`/`<style>` bodies are dropped, and the
//! remaining text is re-serialized with `&`, `<` and `>` escaped. The result
//! can be embedded verbatim as HTML element content.
//!
//! The output is HTML text, so feeding it back in parses to the same text and
//! serializes identically: `sanitize(sanitize(x)) == sanitize(x)`.

use std::collections::HashSet;

pub fn sanitize(input: &str) -> String {
    ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize("Hello there"), "Hello there");
        assert_eq!(sanitize("ana@example.com"), "ana@example.com");
    }

    #[test]
    fn tags_are_stripped_and_scripts_dropped() {
        assert_eq!(sanitize("<b>bold</b> move"), "bold move");
        assert_eq!(sanitize("hi<script>alert(1)</script>"), "hi");
        assert_eq!(sanitize("<img src=x onerror=alert(1)>pic"), "pic");
    }

    #[test]
    fn stray_markup_characters_are_escaped() {
        assert_eq!(sanitize("1 < 2 & 3 > 2"), "1 &lt; 2 &amp; 3 &gt; 2");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "Hello",
            "<script>alert(1)</script>",
            "Tom & Jerry",
            "a < b > c",
            "&lt;script&gt;alert(1)&lt;/script&gt;",
            "&amp;amp;",
            "<p>para</p><!-- comment --><style>p{}</style>",
            "line one\nline two",
            "quotes \" and ' stay",
            "unterminated <b",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn output_never_contains_a_tag() {
        let hostile = "<scr<script>ipt>alert(1)</script><iframe src=javascript:alert(1)>";
        let clean = sanitize(hostile);
        assert!(!clean.contains('<'), "{clean}");
    }
}
