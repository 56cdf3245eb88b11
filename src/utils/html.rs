use std::collections::HashSet;

/// Strips markup from user or model supplied text using the ammonia library.
///
/// Every tag is removed; the contents of scripts and styles are dropped
/// entirely. The result is plain text: the entities ammonia writes while
/// serialising are decoded again, so `&` and `>` in a question stay as typed.
/// Applied to question text and options before storage.
pub fn clean_html(input: &str) -> String {
    let cleaned = ammonia::Builder::default()
        .tags(HashSet::new())
        .clean(input)
        .to_string();

    // `&amp;` last so an escaped entity is decoded only once.
    cleaned
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
