use pillory_shared::clients::minotar::sanitize_nickname;
use pillory_shared::errors::{AppError, AppResult, ErrorCode};

pub const REASON_MIN_LEN: usize = 10;
pub const REPORTER_MIN_LEN: usize = 3;
pub const REPORTER_MAX_LEN: usize = 100;

/// Strips HTML tags, then the characters `< > " '`, then surrounding whitespace.
pub fn sanitize_input(text: &str) -> String {
    let mut without_tags = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        without_tags.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                // Unclosed tag; the bare '<' is dropped below.
                without_tags.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    without_tags.push_str(rest);

    without_tags
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn validate_nickname(raw: &str) -> AppResult<String> {
    let cleaned = sanitize_input(raw);
    sanitize_nickname(&cleaned)
        .map(str::to_string)
        .ok_or_else(|| AppError::new(ErrorCode::InvalidNickname, "invalid Minecraft nickname"))
}

pub fn validate_reason(raw: &str) -> AppResult<String> {
    let reason = sanitize_input(raw);
    if reason.chars().count() < REASON_MIN_LEN {
        return Err(AppError::new(
            ErrorCode::ReasonTooShort,
            "reason must be at least 10 characters",
        ));
    }
    Ok(reason)
}

pub fn validate_reporter(raw: &str) -> AppResult<String> {
    let reporter = sanitize_input(raw);
    let len = reporter.chars().count();
    if !(REPORTER_MIN_LEN..=REPORTER_MAX_LEN).contains(&len) {
        return Err(AppError::new(
            ErrorCode::ReporterRequired,
            "reported_by must be 3-100 characters",
        ));
    }
    Ok(reporter)
}

/// `ILIKE` pattern matching `term` as a literal substring.
pub fn search_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Parses a comma separated size list such as `"32,128"`, skipping junk.
pub fn parse_sizes(raw: &str) -> Vec<u32> {
    raw.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(err: AppError) -> ErrorCode {
        match err {
            AppError::Known { code, .. } => code,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sanitize_strips_tags_and_quotes() {
        assert_eq!(sanitize_input("<b>hello</b>"), "hello");
        assert_eq!(sanitize_input("  <script>alert('x')</script> ok "), "alert(x) ok");
        assert_eq!(sanitize_input(r#"say "hi""#), "say hi");
        assert_eq!(sanitize_input("a < b"), "a  b");
        assert_eq!(sanitize_input("1 > 0"), "1  0");
        assert_eq!(sanitize_input("<a<b>c"), "c");
        assert_eq!(sanitize_input(""), "");
    }

    #[test]
    fn nickname_rules() {
        assert_eq!(validate_nickname(" Steve_42 ").unwrap(), "Steve_42");
        assert_eq!(validate_nickname("<i>Notch</i>").unwrap(), "Notch");
        assert_eq!(code_of(validate_nickname("ab").unwrap_err()), ErrorCode::InvalidNickname);
        assert_eq!(code_of(validate_nickname("has space").unwrap_err()), ErrorCode::InvalidNickname);
        assert!(validate_nickname("abcdefghijklmnopq").is_err());
    }

    #[test]
    fn reason_needs_ten_characters() {
        assert!(validate_reason("griefing!!").is_ok());
        assert_eq!(code_of(validate_reason("griefing").unwrap_err()), ErrorCode::ReasonTooShort);
        assert!(validate_reason("<p>short</p>   ").is_err());
    }

    #[test]
    fn reporter_bounds() {
        assert_eq!(validate_reporter(" Alex ").unwrap(), "Alex");
        assert_eq!(code_of(validate_reporter("Al").unwrap_err()), ErrorCode::ReporterRequired);
        assert!(validate_reporter(&"r".repeat(101)).is_err());
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern("not"), "%not%");
        assert_eq!(search_pattern("a_b%"), "%a\\_b\\%%");
    }

    #[test]
    fn sizes_skip_invalid_entries() {
        assert_eq!(parse_sizes("32, 128,abc,,64"), vec![32, 128, 64]);
        assert!(parse_sizes("").is_empty());
    }
}
