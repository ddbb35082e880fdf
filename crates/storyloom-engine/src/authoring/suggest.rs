use crate::authoring::TriggerKind;
use crate::models::{Candidate, Entity, EntitySnapshot};

/// Rows shown at once in a suggestion menu.
pub const PAGE_SIZE: usize = 5;

/// Filters candidates by the query with the default page size.
pub fn rank(candidates: &[Candidate], query: &str) -> Vec<Candidate> {
    rank_page(candidates, query, PAGE_SIZE)
}

/// Keeps candidates whose label or kind contains the query, ignoring case,
/// in their original order, and truncates to `page_size`.
pub fn rank_page(candidates: &[Candidate], query: &str, page_size: usize) -> Vec<Candidate> {
    let needle = query.to_lowercase();
    candidates
        .iter()
        .filter(|c| {
            c.label.to_lowercase().contains(&needle) || c.kind.to_lowercase().contains(&needle)
        })
        .take(page_size)
        .cloned()
        .collect()
}

/// Entities worth adding to a curated context: names containing `term`
/// (ignoring case) that are not already listed in `relevant`.
pub fn search_additions(
    directory: &EntitySnapshot,
    relevant: &[String],
    term: &str,
    page_size: usize,
) -> Vec<Entity> {
    let needle = term.to_lowercase();
    directory
        .entities()
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .filter(|e| !relevant.iter().any(|r| r == &e.name))
        .take(page_size)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuOutcome {
    /// Key consumed, selection possibly moved.
    Moved,
    Commit(Candidate),
    Cancel,
    /// Nothing to act on (empty list).
    Ignored,
}

/// The open menu: filtered rows plus the highlighted index.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionMenu {
    kind: TriggerKind,
    items: Vec<Candidate>,
    selected: usize,
    page_size: usize,
}

impl SuggestionMenu {
    pub fn open(kind: TriggerKind, source: &[Candidate], query: &str, page_size: usize) -> Self {
        Self {
            kind,
            items: rank_page(source, query, page_size),
            selected: 0,
            page_size,
        }
    }

    /// Re-runs the filter for a new query. Selection goes back to the top.
    pub fn refilter(&mut self, source: &[Candidate], query: &str) {
        self.items = rank_page(source, query, self.page_size);
        self.selected = 0;
    }

    pub fn key(&mut self, key: MenuKey) -> MenuOutcome {
        let n = self.items.len();
        match key {
            MenuKey::Escape => MenuOutcome::Cancel,
            _ if n == 0 => MenuOutcome::Ignored,
            MenuKey::Up => {
                self.selected = (self.selected + n - 1) % n;
                MenuOutcome::Moved
            }
            MenuKey::Down => {
                self.selected = (self.selected + 1) % n;
                MenuOutcome::Moved
            }
            MenuKey::Enter => MenuOutcome::Commit(self.items[self.selected].clone()),
        }
    }

    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&Candidate> {
        self.items.get(self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn directory() -> EntitySnapshot {
        EntitySnapshot::new(vec![
            Entity::new(1, "character", "Elara"),
            Entity::new(2, "location", "Harbor"),
            Entity::new(3, "character", "Bram"),
            Entity::new(4, "arc", "Homecoming"),
            Entity::new(5, "character", "Celia"),
            Entity::new(6, "character", "Dorn"),
            Entity::new(7, "character", "Eamon"),
        ])
    }

    fn labels(items: &[Candidate]) -> Vec<&str> {
        items.iter().map(|c| c.label.as_str()).collect()
    }

    #[rstest]
    #[case("ela", vec!["Elara"])]
    #[case("HARB", vec!["Harbor"])]
    #[case("loc", vec!["Harbor"])]
    #[case("ar", vec!["Elara", "Harbor", "Bram", "Homecoming", "Celia"])]
    #[case("zzz", vec![])]
    fn rank_matches_label_or_kind(#[case] query: &str, #[case] expected: Vec<&str>) {
        let source = Candidate::references(&directory());
        assert_eq!(labels(&rank(&source, query)), expected);
    }

    #[test]
    fn rank_is_ordered_subset_truncated() {
        let source = Candidate::references(&directory());
        let ranked = rank(&source, "");
        assert_eq!(ranked.len(), PAGE_SIZE);
        let keys: Vec<_> = ranked.iter().map(|c| c.sort_key).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn command_filter_uses_title_and_category() {
        let source = Candidate::commands();
        assert_eq!(labels(&rank(&source, "head")), ["Heading 1", "Heading 2"]);
        assert_eq!(labels(&rank(&source, "style")), ["Bold", "Italic"]);
    }

    #[test]
    fn navigation_wraps() {
        let source = Candidate::references(&directory());
        let mut menu = SuggestionMenu::open(TriggerKind::Reference, &source, "ar", PAGE_SIZE);
        assert_eq!(menu.key(MenuKey::Up), MenuOutcome::Moved);
        assert_eq!(menu.selected(), 4);
        assert_eq!(menu.key(MenuKey::Down), MenuOutcome::Moved);
        assert_eq!(menu.selected(), 0);
        menu.key(MenuKey::Down);
        match menu.key(MenuKey::Enter) {
            MenuOutcome::Commit(c) => assert_eq!(c.label, "Harbor"),
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn refilter_resets_selection() {
        let source = Candidate::references(&directory());
        let mut menu = SuggestionMenu::open(TriggerKind::Reference, &source, "", PAGE_SIZE);
        menu.key(MenuKey::Down);
        menu.key(MenuKey::Down);
        menu.refilter(&source, "e");
        assert_eq!(menu.selected(), 0);
    }

    #[test]
    fn empty_menu_ignores_navigation() {
        let mut menu = SuggestionMenu::open(TriggerKind::Command, &Candidate::commands(), "zzz", 5);
        assert_eq!(menu.key(MenuKey::Down), MenuOutcome::Ignored);
        assert_eq!(menu.key(MenuKey::Enter), MenuOutcome::Ignored);
        assert_eq!(menu.key(MenuKey::Escape), MenuOutcome::Cancel);
        assert_eq!(menu.selected_item(), None);
    }

    #[test]
    fn additions_skip_relevant() {
        let relevant = vec!["Elara".to_string()];
        let found = search_additions(&directory(), &relevant, "a", PAGE_SIZE);
        let ids: Vec<_> = found.iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![EntityId(2), EntityId(3), EntityId(5), EntityId(7)]
        );
    }
}
