use super::leading_ws;

pub struct Heading;

impl Heading {
    pub const MARKER: u8 = b'#';
    pub const MAX_LEVEL: u8 = 4;

    /// Returns `(level, content_offset)` when the line opens a heading.
    pub fn parse(line: &str) -> Option<(u8, usize)> {
        let markers = line.bytes().take_while(|&b| b == Self::MARKER).count();
        if markers == 0 || markers > Self::MAX_LEVEL as usize {
            return None;
        }
        let ws = leading_ws(&line[markers..]);
        if ws == 0 {
            return None;
        }
        Some((markers as u8, markers + ws))
    }

    /// A bare marker run that might still become a heading once more input arrives.
    pub fn is_pending(line: &str) -> bool {
        !line.is_empty()
            && line.len() <= Self::MAX_LEVEL as usize
            && line.bytes().all(|b| b == Self::MARKER)
    }

    /// Canonical prefix for a level, e.g. `"## "`.
    pub fn prefix(level: u8) -> String {
        let level = level.clamp(1, Self::MAX_LEVEL) as usize;
        format!("{} ", "#".repeat(level))
    }
}
