// Favorites badge display rule

/// Largest count shown verbatim on the badge
pub const BADGE_MAX: usize = 99;

/// Text for a favorites badge, or `None` when the badge should be hidden
pub fn badge_text(count: usize) -> Option<String> {
    match count {
        0 => None,
        n if n > BADGE_MAX => Some(format!("{}+", BADGE_MAX)),
        n => Some(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_hidden_at_zero() {
        assert_eq!(badge_text(0), None);
    }

    #[test]
    fn badge_shows_plain_counts_up_to_99() {
        assert_eq!(badge_text(1).as_deref(), Some("1"));
        assert_eq!(badge_text(42).as_deref(), Some("42"));
        assert_eq!(badge_text(99).as_deref(), Some("99"));
    }

    #[test]
    fn badge_caps_above_99() {
        assert_eq!(badge_text(100).as_deref(), Some("99+"));
        assert_eq!(badge_text(5000).as_deref(), Some("99+"));
    }
}
