use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Outcome of checking a presented admin key against the configured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAccess {
    Granted,
    Denied,
    /// No admin key is configured; admin endpoints are off.
    Disabled,
}

/// Check the `X-API-Key` value a client presented.
pub fn check_admin_key(configured: Option<&str>, presented: Option<&str>) -> AdminAccess {
    match (configured, presented) {
        (None, _) => AdminAccess::Disabled,
        (Some(expected), Some(given)) if constant_time_compare(expected, given) => AdminAccess::Granted,
        (Some(_), _) => AdminAccess::Denied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("reload-key", "reload-key"));
        assert!(!constant_time_compare("reload-key", "reload-kez"));
        assert!(!constant_time_compare("reload-key", "reload"));
        assert!(!constant_time_compare("", "reload-key"));
    }

    #[test]
    fn test_check_admin_key() {
        assert_eq!(check_admin_key(Some("k1"), Some("k1")), AdminAccess::Granted);
        assert_eq!(check_admin_key(Some("k1"), Some("k2")), AdminAccess::Denied);
        assert_eq!(check_admin_key(Some("k1"), None), AdminAccess::Denied);
        assert_eq!(check_admin_key(None, Some("k1")), AdminAccess::Disabled);
        assert_eq!(check_admin_key(None, None), AdminAccess::Disabled);
    }
}
