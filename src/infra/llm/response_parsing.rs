const MAX_ERROR_MESSAGE_LEN: usize = 256;
const FENCE: &str = "```";
const FENCE_LANGUAGE: &str = "json";

pub(crate) fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

/// Removes every ```` ```json ```` (any case) and bare ```` ``` ```` marker, then trims.
pub(crate) fn strip_code_fences(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find(FENCE) {
        cleaned.push_str(&rest[..index]);
        rest = &rest[index + FENCE.len()..];
        let language = rest.get(..FENCE_LANGUAGE.len());
        if language.is_some_and(|language| language.eq_ignore_ascii_case(FENCE_LANGUAGE)) {
            rest = &rest[FENCE_LANGUAGE.len()..];
        }
    }
    cleaned.push_str(rest);
    cleaned.trim().to_string()
}

/// Slices from the first `{` to the last `}`. Braces inside surrounding prose defeat it.
pub(crate) fn extract_json_payload(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start <= end).then_some(&text[start..=end])
}

pub(crate) fn strip_control_characters(text: &str) -> String {
    text.chars()
        .filter(|ch| !matches!(ch, '\u{0000}'..='\u{001F}' | '\u{007F}'))
        .collect()
}
