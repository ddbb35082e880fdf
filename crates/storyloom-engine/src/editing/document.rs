use std::ops::Range;

use xi_rope::Rope;
use xi_rope::delta::{Builder, Transformer};

use crate::editing::anchors::{self, AnchorId, ReferenceAnchor};
use crate::editing::commands::{Edit, compile_edit, plan_command, transform_selection};
use crate::editing::{Cmd, Patch, Snapshot};
use crate::error::Result;
use crate::models::EntitySnapshot;
use crate::parsing::inline::kinds::Reference;
use crate::parsing::rope::rope_floor_boundary;
use crate::parsing::{ParsedDoc, decode_canonical, parse_canonical};

/// The editable document: one rope holding the canonical text.
///
/// Every view of the content (blocks, inline nodes, resolved labels) is
/// derived from the rope on demand; there is no second mutable copy. Edits
/// arrive as [`Cmd`]s, each compiled to a single delta and applied once.
///
/// ```rust
/// # use storyloom_engine::editing::{Cmd, Document};
/// # use storyloom_engine::models::EntitySnapshot;
/// let directory = EntitySnapshot::default();
/// let mut doc = Document::from_canonical("# Hello\n", &directory);
/// let patch = doc.apply(Cmd::InsertText { at: 8, text: "world".to_string() });
///
/// assert_eq!(doc.canonical(), "# Hello\nworld");
/// assert_eq!(patch.version, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) buffer: Rope,
    /// Current selection/cursor position as byte offsets in buffer
    pub(crate) selection: Range<usize>,
    /// Version counter incremented on each edit
    pub(crate) version: u64,
    pub(crate) anchors: Vec<ReferenceAnchor>,
    next_anchor: u64,
    focused: bool,
    /// Set when the stored bytes could not be decoded; the whole text is then
    /// shown as one verbatim block until the document is replaced.
    opaque: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            buffer: Rope::from(""),
            selection: 0..0,
            version: 0,
            anchors: Vec::new(),
            next_anchor: 0,
            focused: false,
            opaque: false,
        }
    }
}

impl Document {
    /// Builds a document from canonical text, resolving reference tokens
    /// against the directory by type and name.
    pub fn from_canonical(text: &str, directory: &EntitySnapshot) -> Self {
        let buffer = Rope::from(text);
        let parsed = parse_canonical(&buffer);
        Self::from_parts(buffer, &parsed, directory, false)
    }

    /// Strict decode of stored bytes.
    pub fn from_bytes(bytes: &[u8], directory: &EntitySnapshot) -> Result<Self> {
        let (buffer, parsed) = decode_canonical(bytes)?;
        Ok(Self::from_parts(buffer, &parsed, directory, false))
    }

    /// Decodes stored bytes, never failing: undecodable content becomes a
    /// single opaque block with no reference tokens.
    pub fn load(bytes: &[u8], directory: &EntitySnapshot) -> Self {
        match Self::from_bytes(bytes, directory) {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!("showing stored content verbatim: {err}");
                let buffer = Rope::from(String::from_utf8_lossy(bytes).as_ref());
                let parsed = ParsedDoc::opaque(&buffer);
                Self::from_parts(buffer, &parsed, directory, true)
            }
        }
    }

    fn from_parts(
        buffer: Rope,
        parsed: &ParsedDoc,
        directory: &EntitySnapshot,
        opaque: bool,
    ) -> Self {
        let mut next_anchor = 0;
        let anchors = if opaque {
            Vec::new()
        } else {
            anchors::resolve_anchors(&buffer, parsed, directory, &mut next_anchor)
        };
        let len = buffer.len();
        Self {
            buffer,
            selection: len..len, // cursor at end
            version: 0,
            anchors,
            next_anchor,
            focused: false,
            opaque,
        }
    }

    /// Apply a command: one delta, one version bump, one patch.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let text = self.buffer.to_string();
        let edit = plan_command(&text, &cmd);
        self.apply_edit(&edit);

        if let Cmd::InsertReference { token, .. } = &cmd {
            let token_text = token.canonical();
            let start = edit.range.start;
            self.next_anchor += 1;
            self.anchors.push(ReferenceAnchor {
                id: AnchorId(self.next_anchor),
                range: start..start + token_text.len(),
                entity_id: token.entity_id(),
                token_text,
            });
            self.anchors.sort_by_key(|a| a.range.start);
        }

        self.selection = transform_selection(&self.selection, &edit);
        self.version += 1;
        log::debug!("applied {cmd:?}, version {}", self.version);

        Patch {
            changed: vec![edit.range.start..edit.range.start + edit.text.len()],
            new_selection: self.selection.clone(),
            version: self.version,
        }
    }

    fn apply_edit(&mut self, edit: &Edit) {
        let delta = compile_edit(self.buffer.len(), edit);
        self.buffer = delta.apply(&self.buffer);
        anchors::transform_anchors(&mut self.anchors, &delta, &self.buffer);
    }

    /// Replaces the whole document with externally stored content.
    ///
    /// Ignored while the document has focus: the local editor wins and the
    /// next save overwrites the store. Returns whether the content was taken.
    pub fn replace_from_external(
        &mut self,
        bytes: impl AsRef<[u8]>,
        directory: &EntitySnapshot,
    ) -> Option<Patch> {
        if self.focused {
            log::debug!("ignoring external update while focused");
            return None;
        }
        let version = self.version + 1;
        *self = Self::load(bytes.as_ref(), directory);
        self.version = version;
        Some(Patch {
            changed: vec![0..self.buffer.len()],
            new_selection: self.selection.clone(),
            version,
        })
    }

    /// Rewrites tokens whose entity has been renamed so the canonical text
    /// carries the current name. The entity ids of the anchors are kept.
    ///
    /// All renames land in one edit; returns `None` when nothing changed.
    pub fn refresh_reference_labels(&mut self, directory: &EntitySnapshot) -> Option<Patch> {
        let mut renames: Vec<(usize, String)> = Vec::new();
        for (i, anchor) in self.anchors.iter().enumerate() {
            let Some(entity) = directory.get(anchor.entity_id) else {
                continue;
            };
            let current = Reference::encode(&entity.entity_type, &entity.name);
            if current != anchor.token_text
                && Reference::is_valid_type(&entity.entity_type)
                && Reference::is_valid_name(&entity.name)
            {
                renames.push((i, current));
            }
        }
        if renames.is_empty() {
            return None;
        }

        let mut builder = Builder::new(self.buffer.len());
        for (i, text) in &renames {
            builder.replace(self.anchors[*i].range.clone(), Rope::from(text.as_str()));
        }
        let delta = builder.build();
        self.buffer = delta.apply(&self.buffer);

        // Anchors are sorted and disjoint, so new ranges follow by accumulating
        // the length change of every rewritten token before them.
        let mut renamed = renames.into_iter().peekable();
        let mut shift: isize = 0;
        let mut changed = Vec::new();
        for (i, anchor) in self.anchors.iter_mut().enumerate() {
            let start = anchor.range.start.saturating_add_signed(shift);
            if let Some((_, text)) = renamed.next_if(|(j, _)| *j == i) {
                shift += text.len() as isize - anchor.range.len() as isize;
                anchor.token_text = text;
                changed.push(start..start + anchor.token_text.len());
            }
            anchor.range = start..start + anchor.token_text.len();
        }

        let mut transformer = Transformer::new(&delta);
        let sel_start = transformer.transform(self.selection.start, true);
        let sel_end = transformer.transform(self.selection.end, true);
        self.selection = sel_start..sel_end.max(sel_start);
        self.version += 1;
        log::info!("refreshed reference labels, version {}", self.version);

        Some(Patch {
            changed,
            new_selection: self.selection.clone(),
            version: self.version,
        })
    }

    pub fn snapshot(&self, directory: &EntitySnapshot) -> Snapshot {
        crate::editing::snapshot::create_snapshot(self, directory)
    }

    /// The canonical serialization: the rope text verbatim.
    pub fn canonical(&self) -> String {
        self.buffer.to_string()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.canonical().into_bytes()
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Caret position (end of the selection).
    pub fn cursor(&self) -> usize {
        self.selection.end
    }

    /// Sets the selection, clamped to the text and to char boundaries.
    pub fn set_selection(&mut self, selection: Range<usize>) {
        let start = rope_floor_boundary(&self.buffer, selection.start);
        let end = rope_floor_boundary(&self.buffer, selection.end).max(start);
        self.selection = start..end;
    }

    pub fn anchors(&self) -> &[ReferenceAnchor] {
        &self.anchors
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub(crate) fn rope(&self) -> &Rope {
        &self.buffer
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // Anchor ids are per-instance counters and don't take part
        self.buffer.to_string() == other.buffer.to_string()
            && self.selection == other.selection
            && self.version == other.version
            && self.opaque == other.opaque
            && self
                .anchors
                .iter()
                .map(|a| (&a.range, a.entity_id))
                .eq(other.anchors.iter().map(|a| (&a.range, a.entity_id)))
    }
}
