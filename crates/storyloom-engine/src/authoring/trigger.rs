use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::parsing::rope::{floor_boundary, line_start};

/// Which menu a trigger opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Cross-reference to a bible entity.
    Reference,
    /// Formatting command.
    Command,
}

/// The characters that open each menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerConfig {
    pub reference: char,
    pub command: char,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            reference: '[',
            command: '/',
        }
    }
}

impl TriggerConfig {
    pub fn kind_of(&self, c: char) -> Option<TriggerKind> {
        if c == self.reference {
            Some(TriggerKind::Reference)
        } else if c == self.command {
            Some(TriggerKind::Command)
        } else {
            None
        }
    }
}

/// Whether the text just before the cursor is an open trigger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TriggerState {
    #[default]
    Inactive,
    Active {
        kind: TriggerKind,
        /// Byte offset of the trigger character.
        anchor: usize,
        /// Text typed after the trigger, possibly empty.
        query: String,
    },
}

impl TriggerState {
    pub fn is_active(&self) -> bool {
        matches!(self, TriggerState::Active { .. })
    }

    pub fn kind(&self) -> Option<TriggerKind> {
        match self {
            TriggerState::Active { kind, .. } => Some(*kind),
            TriggerState::Inactive => None,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            TriggerState::Active { query, .. } => Some(query),
            TriggerState::Inactive => None,
        }
    }

    /// Bytes an accepted candidate replaces: trigger character through the cursor.
    pub fn replace_range(&self, cursor: usize) -> Option<Range<usize>> {
        match self {
            TriggerState::Active { anchor, .. } => Some(*anchor..cursor.max(*anchor)),
            TriggerState::Inactive => None,
        }
    }
}

/// Finds the trigger the cursor is currently typing after, if any.
///
/// Looks backward from the cursor over the current line only. The nearest
/// trigger character counts when it starts the line or follows whitespace,
/// and when no whitespace sits between it and the cursor.
pub fn scan(text: &str, cursor: usize, config: &TriggerConfig) -> TriggerState {
    let cursor = floor_boundary(text, cursor);
    let start = line_start(text, cursor);
    scan_line(&text[start..cursor], start, config)
}

/// [`scan`] over a line already cut at the cursor. `base` is the byte offset
/// the line starts at in the document.
pub fn scan_line(line: &str, base: usize, config: &TriggerConfig) -> TriggerState {
    for (i, c) in line.char_indices().rev() {
        if c.is_whitespace() {
            return TriggerState::Inactive;
        }
        let Some(kind) = config.kind_of(c) else {
            continue;
        };
        let preceded_ok = line[..i].chars().next_back().is_none_or(char::is_whitespace);
        if !preceded_ok {
            return TriggerState::Inactive;
        }
        return TriggerState::Active {
            kind,
            anchor: base + i,
            query: line[i + c.len_utf8()..].to_string(),
        };
    }
    TriggerState::Inactive
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn active(kind: TriggerKind, anchor: usize, query: &str) -> TriggerState {
        TriggerState::Active {
            kind,
            anchor,
            query: query.to_string(),
        }
    }

    #[rstest]
    #[case("[", 1, active(TriggerKind::Reference, 0, ""))]
    #[case("Hello [Ela", 10, active(TriggerKind::Reference, 6, "Ela"))]
    #[case("Hello /head", 11, active(TriggerKind::Command, 6, "head"))]
    #[case("one\n/b", 6, active(TriggerKind::Command, 4, "b"))]
    #[case("  [x", 4, active(TriggerKind::Reference, 2, "x"))]
    #[case("Hello [Ela", 8, active(TriggerKind::Reference, 6, "E"))]
    fn active_triggers(#[case] text: &str, #[case] cursor: usize, #[case] expected: TriggerState) {
        assert_eq!(scan(text, cursor, &TriggerConfig::default()), expected);
    }

    #[rstest]
    #[case("Hello", 5)]
    #[case("a/b", 3)]
    #[case("word[ref", 8)]
    #[case("[Ela rest", 9)]
    #[case("[Ela ", 5)]
    #[case("[[char", 6)]
    #[case("", 0)]
    fn inactive_triggers(#[case] text: &str, #[case] cursor: usize) {
        assert_eq!(scan(text, cursor, &TriggerConfig::default()), TriggerState::Inactive);
    }

    #[test]
    fn scan_stops_at_line_start() {
        // trigger on the previous line does not reach across the newline
        assert_eq!(
            scan("[abc\ndef", 8, &TriggerConfig::default()),
            TriggerState::Inactive
        );
    }

    #[test]
    fn cursor_inside_multibyte_char_is_clamped() {
        let state = scan("[Zoë", 4, &TriggerConfig::default());
        assert_eq!(state, active(TriggerKind::Reference, 0, "Zo"));
    }

    #[test]
    fn configured_characters() {
        let config = TriggerConfig {
            reference: '@',
            command: '\\',
        };
        assert_eq!(scan("hi @El", 6, &config).kind(), Some(TriggerKind::Reference));
        assert_eq!(scan("hi \\b", 5, &config).kind(), Some(TriggerKind::Command));
        assert_eq!(scan("hi [El", 6, &config), TriggerState::Inactive);
    }

    #[test]
    fn line_scan_offsets_anchor_by_base() {
        let config = TriggerConfig::default();
        assert_eq!(
            scan_line("see [Cr", 120, &config),
            active(TriggerKind::Reference, 124, "Cr")
        );
        assert_eq!(
            scan_line("see [Cr", 120, &config),
            scan(&format!("{}\nsee [Cr", "x".repeat(118)), 127, &config)
        );
    }

    #[test]
    fn replace_range_runs_to_cursor() {
        let state = scan("Hello [Ela", 10, &TriggerConfig::default());
        assert_eq!(state.replace_range(10), Some(6..10));
        assert_eq!(state.query(), Some("Ela"));
        assert_eq!(TriggerState::Inactive.replace_range(3), None);
    }
}
