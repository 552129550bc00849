/// Titles longer than this many characters are truncated.
pub const TITLE_MAX_CHARS: usize = 20;

/// Short title for a route: the first line of its description.
///
/// Truncation counts Unicode scalar values, not display width.
///
/// ```
/// use docroute::doc::get_title;
///
/// assert_eq!(get_title("Say hello\n\nMore text"), "Say hello");
/// assert_eq!(get_title("A very long first line of text"), "A very long first li...");
/// ```
#[must_use]
pub fn get_title(desc: &str) -> String {
    let first = desc
        .trim_matches('\n')
        .split('\n')
        .next()
        .unwrap_or_default()
        .trim();
    if first.chars().count() > TITLE_MAX_CHARS {
        let mut title: String = first.chars().take(TITLE_MAX_CHARS).collect();
        title.push_str("...");
        title
    } else {
        first.to_string()
    }
}
