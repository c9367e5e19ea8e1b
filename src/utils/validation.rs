use validator::ValidationErrors;

/// Longest staged name component we keep, in bytes
pub const MAX_FILENAME_LEN: usize = 200;

/// Sanitizes an uploaded filename so it can be used as a single path segment
/// both on the staging disk and in the remote repository.
pub fn sanitize_filename(filename: &str) -> String {
    // Only the last component survives, whichever separator the client used
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if filename.contains("..") {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
                || c == '#'
                || c == '%'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    let sanitized = sanitized.trim_start_matches('.');

    let sanitized = if sanitized.len() > MAX_FILENAME_LEN {
        let mut end = MAX_FILENAME_LEN;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        &sanitized[..end]
    } else {
        sanitized
    };

    if sanitized.is_empty() {
        "unnamed".to_string()
    } else {
        sanitized.to_string()
    }
}

/// Renders the fields that failed a presence check as a stable, sorted list
pub fn describe_missing(errors: &ValidationErrors, extra: &[&str]) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|k| k.to_string())
        .chain(extra.iter().map(|e| e.to_string()))
        .collect();
    fields.sort_unstable();
    fields.dedup();
    format!("Missing required fields: {}", fields.join(", "))
}
