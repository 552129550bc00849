use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;

/// Render a description as HTML.
///
/// Tables and strikethrough are enabled; a single newline inside a paragraph is
/// kept as a line break, since descriptions are written as doc comments rather
/// than reflowed prose.
pub fn markdown(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Pretty JSON with a four-space indent, non-ASCII kept as is.
pub fn dumps<T: Serialize + ?Sized>(value: &T) -> String {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_default(),
        Err(_) => String::from("null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_markdown_line_breaks() {
        assert_eq!(markdown("one\ntwo"), "<p>one<br />\ntwo</p>\n");
    }

    #[test]
    fn test_markdown_extensions() {
        let table = markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(table.contains("<table>"));
        assert!(markdown("~~gone~~").contains("<del>gone</del>"));
        assert!(markdown("```\ncode\n```").contains("<pre><code>code\n</code></pre>"));
    }

    #[test]
    fn test_dumps() {
        assert_eq!(dumps(&json!({"a": "中文"})), "{\n    \"a\": \"中文\"\n}");
        assert_eq!(dumps(&json!("x")), "\"x\"");
    }
}
