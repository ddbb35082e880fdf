use super::leading_ws;

pub struct Bullet;

impl Bullet {
    pub const MARKERS: [u8; 3] = [b'-', b'*', b'+'];
    pub const CANONICAL: &'static str = "- ";

    /// Returns `(indent_len, content_offset)` when the line is a list item.
    pub fn parse(line: &str) -> Option<(usize, usize)> {
        let indent = leading_ws(line);
        let rest = &line[indent..];
        let marker = *rest.as_bytes().first()?;
        if !Self::MARKERS.contains(&marker) {
            return None;
        }
        let ws = leading_ws(&rest[1..]);
        if ws == 0 {
            return None;
        }
        Some((indent, indent + 1 + ws))
    }

    /// Indentation followed by a lone marker: not yet decidable.
    pub fn is_pending(line: &str) -> bool {
        let rest = line.trim_start();
        rest.len() == 1 && Self::MARKERS.contains(&rest.as_bytes()[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("- item", Some((0, 2)))]
    #[case("  * nested", Some((2, 4)))]
    #[case("+\tplus", Some((0, 2)))]
    #[case("- ", Some((0, 2)))]
    #[case("-item", None)]
    #[case("**bold** text", None)]
    #[case("plain", None)]
    fn parse_cases(#[case] line: &str, #[case] expected: Option<(usize, usize)>) {
        assert_eq!(Bullet::parse(line), expected);
    }

    #[test]
    fn pending_markers() {
        assert!(Bullet::is_pending("  +"));
        assert!(Bullet::is_pending("-"));
        assert!(!Bullet::is_pending("- "));
        assert!(!Bullet::is_pending("--"));
    }
}
