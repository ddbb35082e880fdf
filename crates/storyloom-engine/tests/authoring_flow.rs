use pretty_assertions::assert_eq;
use storyloom_engine::authoring::{EditorSession, MenuKey};
use storyloom_engine::editing::{Document, RenderInline};
use storyloom_engine::models::{Entity, EntityId, EntitySnapshot};
use storyloom_engine::parsing::blocks::BlockKind;

fn directory() -> EntitySnapshot {
    EntitySnapshot::new(vec![
        Entity::new(1, "character", "Elara"),
        Entity::new(2, "location", "Crystal Cave"),
        Entity::new(3, "character", "Eldon"),
    ])
}

fn references(inlines: &[RenderInline]) -> Vec<(Option<EntityId>, String)> {
    inlines
        .iter()
        .flat_map(|inline| match inline {
            RenderInline::Reference {
                entity_id, label, ..
            } => vec![(*entity_id, label.clone())],
            RenderInline::Emphasis { children, .. } => references(children),
            RenderInline::Text(_) => vec![],
        })
        .collect()
}

#[test]
fn write_a_line_with_references_and_reload_it() {
    let dir = directory();
    let mut session = EditorSession::new(Document::from_canonical("", &dir), dir.clone());

    session.type_text("/h");
    session.key(MenuKey::Enter).unwrap();
    session.type_text("Into the dark\n");
    session.type_text("Hello [El");
    // Elara and Eldon both match
    session.key(MenuKey::Down).unwrap();
    session.key(MenuKey::Up).unwrap();
    session.key(MenuKey::Enter).unwrap();
    session.type_text("walked into [cave");
    session.key(MenuKey::Enter).unwrap();

    let stored = session.document().to_bytes();
    assert_eq!(
        String::from_utf8(stored.clone()).unwrap(),
        "# Into the dark\nHello [[character:Elara]] walked into [[location:Crystal Cave]] "
    );

    let reloaded = Document::from_bytes(&stored, &dir).unwrap();
    assert_eq!(reloaded.canonical(), session.document().canonical());
    assert_eq!(reloaded.anchors().len(), 2);

    let snap = reloaded.snapshot(&dir);
    assert_eq!(snap.blocks[0].kind, BlockKind::Heading { level: 1 });
    assert_eq!(
        references(&snap.blocks[1].inlines),
        vec![
            (Some(EntityId(1)), "Elara".to_string()),
            (Some(EntityId(2)), "Crystal Cave".to_string()),
        ]
    );
}

#[test]
fn renamed_entity_updates_label_then_text() {
    let dir = directory();
    let doc = Document::from_canonical("**[[character:Elara]]** waits.", &dir);
    let renamed = EntitySnapshot::new(vec![Entity::new(1, "character", "Elara Vance")]);

    // the render view follows the id before the text is rewritten
    let snap = doc.snapshot(&renamed);
    assert_eq!(
        references(&snap.blocks[0].inlines),
        vec![(Some(EntityId(1)), "Elara Vance".to_string())]
    );

    let mut session = EditorSession::new(doc, dir);
    session.update_directory(renamed);
    assert_eq!(
        session.document().canonical(),
        "**[[character:Elara Vance]]** waits."
    );
}

#[test]
fn undecodable_bytes_open_as_one_opaque_block() {
    let dir = directory();
    let bytes = b"[[character:Elara]] \xff\xfe broken";
    assert!(Document::from_bytes(bytes, &dir).is_err());

    let doc = Document::load(bytes, &dir);
    assert!(doc.is_opaque());
    assert!(doc.anchors().is_empty());
    let snap = doc.snapshot(&dir);
    assert_eq!(snap.blocks.len(), 1);
    assert_eq!(snap.blocks[0].kind, BlockKind::Opaque);
    assert!(references(&snap.blocks[0].inlines).is_empty());
}

#[test]
fn unknown_reference_survives_round_trip() {
    let dir = directory();
    let text = "A letter from [[character:Nobody]].\n- [[arc:Homecoming]]\n";
    let doc = Document::from_canonical(text, &dir);
    assert_eq!(doc.canonical(), text);
    assert!(doc.anchors().is_empty());

    let snap = doc.snapshot(&dir);
    assert_eq!(
        references(&snap.blocks[0].inlines),
        vec![(None, "Nobody".to_string())]
    );
}
