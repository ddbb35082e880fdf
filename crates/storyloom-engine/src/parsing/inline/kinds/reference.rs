/// Canonical reference token: `[[TYPE:NAME]]`.
pub struct Reference;

impl Reference {
    pub const OPEN: &'static [u8; 2] = b"[[";
    pub const CLOSE: &'static [u8; 2] = b"]]";
    pub const SEP: u8 = b':';

    /// Type: non-empty, no separator, brackets or line breaks.
    pub fn is_valid_type(s: &str) -> bool {
        !s.is_empty() && !s.bytes().any(|b| b == Self::SEP || Self::is_forbidden(b))
    }

    /// Name: non-empty, no brackets or line breaks. The separator is allowed.
    pub fn is_valid_name(s: &str) -> bool {
        !s.is_empty() && !s.bytes().any(Self::is_forbidden)
    }

    pub fn encode(entity_type: &str, name: &str) -> String {
        format!("[[{entity_type}:{name}]]")
    }

    fn is_forbidden(b: u8) -> bool {
        matches!(b, b'[' | b']' | b'\n' | b'\r')
    }
}
