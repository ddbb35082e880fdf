use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::models::ReferenceToken;
use crate::parsing::blocks::kinds::{Bullet, Heading};
use crate::parsing::rope::{floor_boundary, line_start};

/// Formatting commands offered behind the command trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCommand {
    Bold,
    Italic,
    Heading(u8),
    BulletList,
}

impl FormatCommand {
    /// The catalogue in menu order.
    pub const ALL: [FormatCommand; 5] = [
        FormatCommand::Bold,
        FormatCommand::Italic,
        FormatCommand::Heading(1),
        FormatCommand::Heading(2),
        FormatCommand::BulletList,
    ];

    pub fn id(self) -> String {
        match self {
            FormatCommand::Bold => "bold".to_string(),
            FormatCommand::Italic => "italic".to_string(),
            FormatCommand::Heading(level) => format!("heading-{level}"),
            FormatCommand::BulletList => "bullet-list".to_string(),
        }
    }

    pub fn title(self) -> String {
        match self {
            FormatCommand::Bold => "Bold".to_string(),
            FormatCommand::Italic => "Italic".to_string(),
            FormatCommand::Heading(level) => format!("Heading {level}"),
            FormatCommand::BulletList => "Bullet List".to_string(),
        }
    }

    /// `style` for inline emphasis, `block` for line-level structure.
    pub fn category(self) -> &'static str {
        match self {
            FormatCommand::Bold | FormatCommand::Italic => "style",
            FormatCommand::Heading(_) | FormatCommand::BulletList => "block",
        }
    }
}

/// Commands that can be applied to the document.
///
/// `InsertReference` and `ApplyFormat` carry the range of the trigger text they
/// replace (trigger character plus query); it is removed in the same edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText {
        at: usize,
        text: String,
    },
    DeleteRange {
        range: Range<usize>,
    },
    ReplaceRange {
        range: Range<usize>,
        text: String,
    },
    InsertReference {
        range: Range<usize>,
        token: ReferenceToken,
    },
    ApplyFormat {
        range: Range<usize>,
        command: FormatCommand,
    },
}

/// A command lowered to one contiguous replacement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Edit {
    pub range: Range<usize>,
    pub text: String,
    /// Where the caret lands, when the command decides it explicitly.
    pub caret: Option<usize>,
}

/// Lowers a command against the current text, clamping ranges to char boundaries.
pub(crate) fn plan_command(text: &str, cmd: &Cmd) -> Edit {
    let clamp = |r: &Range<usize>| {
        let start = floor_boundary(text, r.start);
        start..floor_boundary(text, r.end).max(start)
    };
    match cmd {
        Cmd::InsertText { at, text: ins } => {
            let at = floor_boundary(text, *at);
            Edit {
                range: at..at,
                text: ins.clone(),
                caret: None,
            }
        }
        Cmd::DeleteRange { range } => Edit {
            range: clamp(range),
            text: String::new(),
            caret: None,
        },
        Cmd::ReplaceRange { range, text: ins } => Edit {
            range: clamp(range),
            text: ins.clone(),
            caret: None,
        },
        Cmd::InsertReference { range, token } => {
            let range = clamp(range);
            let ins = format!("{} ", token.canonical());
            Edit {
                caret: Some(range.start + ins.len()),
                range,
                text: ins,
            }
        }
        Cmd::ApplyFormat { range, command } => plan_format(text, clamp(range), *command),
    }
}

fn plan_format(text: &str, range: Range<usize>, command: FormatCommand) -> Edit {
    match command {
        FormatCommand::Bold => empty_pair(range, "**"),
        FormatCommand::Italic => empty_pair(range, "*"),
        FormatCommand::Heading(level) => {
            let start = line_start(text, range.start);
            let prefix = &text[start..range.start];
            let rest = Heading::parse(prefix)
                .map(|(_, offset)| offset)
                .or_else(|| Bullet::parse(prefix).map(|(_, offset)| offset))
                .map_or(prefix, |offset| &prefix[offset..]);
            let ins = format!("{}{rest}", Heading::prefix(level));
            Edit {
                caret: Some(start + ins.len()),
                range: start..range.end,
                text: ins,
            }
        }
        FormatCommand::BulletList => {
            let start = line_start(text, range.start);
            let prefix = &text[start..range.start];
            let ins = match Bullet::parse(prefix) {
                Some((indent, offset)) => format!("{}{}", &prefix[..indent], &prefix[offset..]),
                None => {
                    let indent = crate::parsing::blocks::kinds::leading_ws(prefix);
                    format!("{}{}{}", &prefix[..indent], Bullet::CANONICAL, &prefix[indent..])
                }
            };
            Edit {
                caret: Some(start + ins.len()),
                range: start..range.end,
                text: ins,
            }
        }
    }
}

fn empty_pair(range: Range<usize>, delim: &str) -> Edit {
    Edit {
        caret: Some(range.start + delim.len()),
        text: delim.repeat(2),
        range,
    }
}

/// Compile an edit into a delta over a buffer of `len` bytes.
pub(crate) fn compile_edit(len: usize, edit: &Edit) -> Delta<RopeInfo> {
    let mut builder = Builder::new(len);
    if edit.text.is_empty() {
        builder.delete(edit.range.clone());
    } else {
        builder.replace(edit.range.clone(), Rope::from(edit.text.as_str()));
    }
    builder.build()
}

/// Moves a selection across an edit that did not place the caret itself.
pub(crate) fn transform_selection(selection: &Range<usize>, edit: &Edit) -> Range<usize> {
    if let Some(caret) = edit.caret {
        return caret..caret;
    }
    let removed = edit.range.len();
    let added = edit.text.len();
    let shift = |pos: usize| pos + added - removed;

    if removed == 0 {
        let at = edit.range.start;
        if at <= selection.start {
            shift(selection.start)..shift(selection.end)
        } else if at < selection.end {
            selection.start..selection.end + added
        } else {
            selection.clone()
        }
    } else if edit.range.end <= selection.start {
        shift(selection.start)..shift(selection.end)
    } else if edit.range.start >= selection.end {
        selection.clone()
    } else {
        // Overlap: collapse after the replacement
        let end = edit.range.start + added;
        end..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn apply(text: &str, cmd: &Cmd) -> (String, Edit) {
        let edit = plan_command(text, cmd);
        let rope = compile_edit(text.len(), &edit).apply(&Rope::from(text));
        (rope.to_string(), edit)
    }

    #[test]
    fn reference_replaces_trigger_and_adds_space() {
        let token = ReferenceToken::new(EntityId(7), "character", "Elara").unwrap();
        let (out, edit) = apply(
            "Hello [Ela",
            &Cmd::InsertReference {
                range: 6..10,
                token,
            },
        );
        assert_eq!(out, "Hello [[character:Elara]] ");
        assert_eq!(edit.caret, Some(out.len()));
    }

    #[test]
    fn reference_keeps_text_after_cursor() {
        let token = ReferenceToken::new(EntityId(2), "location", "Harbor").unwrap();
        let (out, _) = apply(
            "to [Har and back",
            &Cmd::InsertReference {
                range: 3..7,
                token,
            },
        );
        assert_eq!(out, "to [[location:Harbor]]  and back");
    }

    #[rstest]
    #[case("/h", 0..2, FormatCommand::Heading(1), "# ", 2)]
    #[case("Title /hea", 6..10, FormatCommand::Heading(2), "## Title ", 9)]
    #[case("# Old /h", 6..8, FormatCommand::Heading(2), "## Old ", 7)]
    #[case("- item /h", 7..9, FormatCommand::Heading(1), "# item ", 7)]
    #[case("one\n/b", 4..6, FormatCommand::BulletList, "one\n- ", 6)]
    #[case("  text /b", 7..9, FormatCommand::BulletList, "  - text ", 9)]
    #[case("  - text /b", 9..11, FormatCommand::BulletList, "  text ", 7)]
    #[case("a /bo", 2..5, FormatCommand::Bold, "a ****", 4)]
    #[case("a /it", 2..5, FormatCommand::Italic, "a **", 3)]
    fn format_commands(
        #[case] text: &str,
        #[case] range: Range<usize>,
        #[case] command: FormatCommand,
        #[case] expected: &str,
        #[case] caret: usize,
    ) {
        let (out, edit) = apply(text, &Cmd::ApplyFormat { range, command });
        assert_eq!(out, expected);
        assert_eq!(edit.caret, Some(caret));
    }

    #[test]
    fn heading_keeps_following_lines() {
        let (out, _) = apply(
            "intro\nchapter /h\nnext",
            &Cmd::ApplyFormat {
                range: 14..16,
                command: FormatCommand::Heading(1),
            },
        );
        assert_eq!(out, "intro\n# chapter \nnext");
    }

    #[test]
    fn stale_ranges_are_clamped() {
        let (out, _) = apply("Zoë", &Cmd::DeleteRange { range: 3..40 });
        assert_eq!(out, "Zo");
    }

    #[test]
    fn catalogue_metadata() {
        assert_eq!(FormatCommand::Heading(2).id(), "heading-2");
        assert_eq!(FormatCommand::BulletList.title(), "Bullet List");
        assert_eq!(FormatCommand::Italic.category(), "style");
        assert_eq!(FormatCommand::Heading(1).category(), "block");
    }

    // ============ Selection transformation ============

    fn edit(range: Range<usize>, text: &str) -> Edit {
        Edit {
            range,
            text: text.to_string(),
            caret: None,
        }
    }

    #[test]
    fn insert_before_selection_shifts_it() {
        assert_eq!(transform_selection(&(8..10), &edit(5..5, " Beautiful")), 18..20);
    }

    #[test]
    fn insert_at_caret_moves_caret() {
        assert_eq!(transform_selection(&(3..3), &edit(3..3, "abc")), 6..6);
    }

    #[test]
    fn delete_before_selection_shifts_left() {
        assert_eq!(transform_selection(&(8..10), &edit(0..6, "")), 2..4);
    }

    #[test]
    fn delete_over_selection_collapses() {
        assert_eq!(transform_selection(&(8..10), &edit(6..11, "")), 6..6);
    }

    #[test]
    fn edit_after_selection_leaves_it() {
        assert_eq!(transform_selection(&(1..2), &edit(5..7, "x")), 1..2);
    }

    #[test]
    fn replace_over_selection_lands_after_replacement() {
        assert_eq!(transform_selection(&(7..7), &edit(6..11, "Universe")), 14..14);
    }
}
