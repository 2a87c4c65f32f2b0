/// Keep only the ASCII digits of a string
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a phone number for display.
/// Ten-digit numbers (optionally with a +91/0 prefix) become `XXXXX XXXXX`.
pub fn format_phone(phone: &str) -> String {
    let digits = digits_only(phone);

    let national = match digits.len() {
        10 => &digits[..],
        11 if digits.starts_with('0') => &digits[1..],
        12 if digits.starts_with("91") => &digits[2..],
        _ => return phone.to_string(),
    };
    format!("{} {}", &national[0..5], &national[5..10])
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring match. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Derive a display name from an email local part: `jane.doe_k@x` -> `Jane Doe K`
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    local
        .split(['.', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Format an ISO timestamp as a short date, falling back to the raw text
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 && date.is_char_boundary(10) {
        date[..10].to_string()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("9876543210"), "98765 43210");
        assert_eq!(format_phone("+91 98765-43210"), "98765 43210");
        assert_eq!(format_phone("09876543210"), "98765 43210");
        assert_eq!(format_phone("123"), "123");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Team Rocket", "rock"));
        assert!(contains_ignore_case("Team Rocket", ""));
        assert!(!contains_ignore_case("Team Rocket", "apollo"));
    }

    #[test]
    fn test_display_name_from_email() {
        assert_eq!(display_name_from_email("jane.doe@amrita.edu"), "Jane Doe");
        assert_eq!(display_name_from_email("RAVI_kumar.s@cb.amrita.edu"), "Ravi Kumar S");
        assert_eq!(display_name_from_email("x@amrita.edu"), "X");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-02-14T10:30:00Z"), "Feb 14, 2025");
        assert_eq!(format_date("2025-02-14 10:30"), "2025-02-14");
        assert_eq!(format_date("soon"), "soon");
    }
}
