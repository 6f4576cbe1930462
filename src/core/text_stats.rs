//! Word and character counters for the navbar

/// Number of characters (Unicode scalar values)
pub fn count_chars(text: &str) -> usize {
    text.chars().count()
}

/// Number of whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words("  # Title\n\nsome  words here "), 5);

        assert_eq!(count_chars(""), 0);
        assert_eq!(count_chars("héllo"), 5);
        assert_eq!(count_chars("a\nb"), 3);
    }
}
