pub struct Rule;

impl Rule {
    pub const SPELLINGS: [&'static str; 3] = ["---", "***", "___"];

    pub fn matches(line: &str) -> bool {
        Self::SPELLINGS.contains(&line.trim())
    }

    /// Could still turn out to be a rule (or grow past one) with more input.
    pub fn is_pending(line: &str) -> bool {
        let t = line.trim();
        !t.is_empty() && Self::SPELLINGS.iter().any(|s| s.starts_with(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spellings() {
        assert!(Rule::matches("---"));
        assert!(Rule::matches("  ***  "));
        assert!(Rule::matches("___"));
        assert!(!Rule::matches("----"));
        assert!(!Rule::matches("* * *"));
    }

    #[test]
    fn pending() {
        assert!(Rule::is_pending("-"));
        assert!(Rule::is_pending("__"));
        assert!(Rule::is_pending("***"));
        assert!(!Rule::is_pending("-x"));
        assert!(!Rule::is_pending(""));
    }
}
