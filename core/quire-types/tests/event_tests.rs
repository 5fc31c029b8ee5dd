use quire_types::{ContentEvent, ContentId, ContentKind, EventKind, EventPhase};

// ── Construction ──────────────────────────────────────────────────

#[test]
fn before_sets_phase() {
    let id = ContentId::new();
    let e = ContentEvent::before(EventKind::PermanentDelete, id, "article", ContentKind::Content);
    assert_eq!(e.phase, EventPhase::Before);
    assert_eq!(e.kind, EventKind::PermanentDelete);
    assert_eq!(e.content_id, id);
    assert_eq!(e.content_type, "article");
    assert_eq!(e.content_kind, ContentKind::Content);
}

#[test]
fn after_sets_phase() {
    let e = ContentEvent::after(EventKind::Update, ContentId::new(), "member", ContentKind::User);
    assert_eq!(e.phase, EventPhase::After);
    assert_eq!(e.content_kind, ContentKind::User);
}

// ── Display & serde ───────────────────────────────────────────────

#[test]
fn event_kind_display() {
    assert_eq!(EventKind::PermanentDelete.to_string(), "PERMANENT_DELETE");
    assert_eq!(EventKind::Update.to_string(), "UPDATE");
}

#[test]
fn event_kind_serializes_screaming_snake_case() {
    let json = serde_json::to_string(&EventKind::PermanentDelete).unwrap();
    assert_eq!(json, "\"PERMANENT_DELETE\"");
}

#[test]
fn content_kind_defaults_to_content() {
    assert_eq!(ContentKind::default(), ContentKind::Content);
    assert_eq!(ContentKind::User.to_string(), "user");
}

#[test]
fn event_serde_roundtrip() {
    let e = ContentEvent::before(EventKind::Update, ContentId::new(), "article", ContentKind::Content);
    let json = serde_json::to_string(&e).unwrap();
    let parsed: ContentEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(e, parsed);
}
