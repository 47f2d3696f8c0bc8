//! Fenced code block extraction from model responses.

const FENCE: &str = "```";
const HTML_FENCE: &str = "```html";

/// Pull the generated document out of a model response.
///
/// Prefers a block opened with ```` ```html ```` (case-insensitive) and falls
/// back to the first plain triple-backtick block. The result has CRLF
/// normalized to LF and is trimmed. Returns `None` when no block is closed.
pub fn extract_code_block(response: &str) -> Option<String> {
    if let Some(start) = find_ascii_case_insensitive(response, HTML_FENCE) {
        let rest = &response[start + HTML_FENCE.len()..];
        if let Some(end) = rest.find(FENCE) {
            return Some(normalize(&rest[..end]));
        }
    }

    let start = response.find(FENCE)?;
    let rest = &response[start + FENCE.len()..];
    let end = rest.find(FENCE)?;
    Some(normalize(&rest[..end]))
}

/// Wrap a document in an `html` fence for display
pub fn fence_html(code: &str) -> String {
    format!("{}\n{}\n{}", HTML_FENCE, code, FENCE)
}

fn normalize(snippet: &str) -> String {
    snippet.replace("\r\n", "\n").trim().to_string()
}

/// Byte offset of the first ASCII case-insensitive match of `needle`.
///
/// Lowercasing only ASCII keeps byte offsets aligned with `haystack`.
fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(&needle.to_ascii_lowercase())
}
