/// Parses the free-form `tags` field into an ordered list.
///
/// A JSON array of strings is taken as-is. Anything else (malformed JSON,
/// a JSON value that is not a string array) is treated as a comma separated
/// list whose tokens are trimmed. Order and duplicates are preserved.
pub fn parse_tags(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => list,
        Err(_) => raw.split(',').map(|tag| tag.trim().to_string()).collect(),
    }
}
