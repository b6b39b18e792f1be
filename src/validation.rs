use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$")
        .unwrap_or_else(|e| panic!("email pattern must compile: {}", e))
});

/// Conservative email shape check: allowed local-part characters, a single
/// `@`, and a domain containing at least one dot.
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 255 && EMAIL_REGEX.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("user.name@example.com"));
        assert!(is_valid_email("user+tag@example.com"));
        assert!(is_valid_email("user_name@sub.example.co.uk"));
        assert!(is_valid_email("user-name@my-domain.io"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@exa@mple.com"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email(" a@b.com"));
    }

    #[test]
    fn test_rejects_overlong_address() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(!is_valid_email(&email));
    }
}
