//! Response parsing for LLM outputs.
//!
//! Pulls SQL or JSON out of responses that may wrap them in markdown fences.

/// Returns the body of the first fenced block tagged `lang`.
///
/// An empty `lang` matches only untagged fences.
fn fenced_block<'a>(text: &'a str, lang: &str) -> Option<&'a str> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find("```") {
        let fence_start = search_from + offset + 3;
        let line_end = text[fence_start..].find('\n')? + fence_start;
        let tag = text[fence_start..line_end].trim();
        let body_start = line_end + 1;
        let body_end = text[body_start..].find("```")? + body_start;

        if tag.eq_ignore_ascii_case(lang) {
            return Some(&text[body_start..body_end]);
        }
        search_from = body_end + 3;
    }

    None
}

/// Extracts the SQL statement from a generation response.
///
/// Prefers a ```sql block, then an untagged block, then the whole response.
pub fn extract_sql(response: &str) -> String {
    fenced_block(response, "sql")
        .or_else(|| fenced_block(response, ""))
        .unwrap_or(response)
        .trim()
        .to_string()
}

/// Extracts a JSON object from a response.
///
/// Prefers a ```json or untagged block, then the outermost `{...}` span.
pub fn extract_json(response: &str) -> &str {
    if let Some(block) = fenced_block(response, "json").or_else(|| fenced_block(response, "")) {
        return block.trim();
    }

    let trimmed = response.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}
