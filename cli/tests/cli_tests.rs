use pretty_assertions::assert_eq;
use quire_cli::{Definition, UNKNOWN_CONTENT_TYPE, dry_run_transition, load_config, simulate_delete, validate};
use quire_fields::FieldTypeRegistry;
use quire_types::{ContentId, ContentKind};
use serde_json::{Value, json};
use std::sync::Arc;

const ARTICLE: &str = "0192f0c1-0000-7000-8000-000000000001";
const COMMENT: &str = "0192f0c1-0000-7000-8000-000000000002";
const LIKE: &str = "0192f0c1-0000-7000-8000-000000000003";
const MEMBER: &str = "0192f0c1-0000-7000-8000-000000000004";

fn blog() -> Value {
    json!({
        "identifier": "blog",
        "content_types": [
            {
                "identifier": "article",
                "title": "Article",
                "fields": [
                    { "identifier": "title", "title": "Title", "type": "text" },
                    {
                        "identifier": "status",
                        "title": "Status",
                        "type": "state",
                        "settings": {
                            "initial_place": "draft",
                            "places": {
                                "draft": { "label": "Draft" },
                                "review": { "label": "Review" },
                                "published": { "label": "Published" }
                            },
                            "transitions": {
                                "to_review": { "label": "To review", "from": ["draft"], "to": "review" },
                                "publish": { "label": "Publish", "from": ["review"], "to": "published" }
                            }
                        }
                    },
                    {
                        "identifier": "comments",
                        "title": "Comments",
                        "type": "reference_of",
                        "settings": { "content_type": "comment", "reference_field": "article", "onDelete": "CASCADE" }
                    },
                    {
                        "identifier": "likes",
                        "title": "Likes",
                        "type": "reference_of",
                        "settings": { "content_type": "like", "reference_field": "article" }
                    },
                    {
                        "identifier": "fans",
                        "title": "Fans",
                        "type": "reference_of",
                        "settings": { "content_type": "member", "reference_field": "favorite" }
                    }
                ]
            },
            {
                "identifier": "comment",
                "title": "Comment",
                "fields": [
                    { "identifier": "body", "title": "Body", "type": "text" },
                    { "identifier": "article", "title": "Article", "type": "reference", "settings": { "content_type": "article" } }
                ]
            },
            {
                "identifier": "like",
                "title": "Like",
                "fields": [
                    { "identifier": "article", "title": "Article", "type": "reference", "settings": { "content_type": "article" } }
                ]
            }
        ],
        "user_types": [
            {
                "identifier": "member",
                "title": "Member",
                "fields": [
                    { "identifier": "favorite", "title": "Favorite", "type": "reference", "settings": { "content_type": "article" } }
                ]
            }
        ],
        "content": [
            { "id": ARTICLE, "content_type": "article", "data": { "title": "Hello", "status": "draft" } },
            { "id": COMMENT, "content_type": "comment", "data": { "body": "Nice", "article": ARTICLE } },
            { "id": LIKE, "content_type": "like", "data": { "article": ARTICLE } },
            { "id": MEMBER, "content_type": "member", "data": { "favorite": ARTICLE } }
        ]
    })
}

fn definition(value: Value) -> Definition {
    Definition::from_json(&value.to_string()).unwrap()
}

fn id(s: &str) -> ContentId {
    s.parse().unwrap()
}

// ── Loading ──────────────────────────────────────────────────────

#[test]
fn load_reads_definition_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.json");
    std::fs::write(&path, serde_json::to_string_pretty(&blog()).unwrap()).unwrap();

    let definition = Definition::load(&path).unwrap();
    assert_eq!(definition.identifier(), "blog");
    assert_eq!(definition.content.len(), 4);
    assert_eq!(definition.domain.content_types().count(), 3);
}

#[test]
fn seed_content_takes_kind_from_its_schema() {
    let definition = definition(blog());
    assert_eq!(definition.find(id(MEMBER)).unwrap().kind, ContentKind::User);
    assert_eq!(definition.find(id(ARTICLE)).unwrap().kind, ContentKind::Content);
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = Definition::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn duplicate_types_are_rejected() {
    let mut value = blog();
    let duplicate = value["content_types"][0].clone();
    value["content_types"].as_array_mut().unwrap().push(duplicate);
    assert!(Definition::from_json(&value.to_string()).is_err());
}

// ── validate ─────────────────────────────────────────────────────

#[test]
fn valid_definition_has_no_violations() {
    let report = validate(&definition(blog()), &FieldTypeRegistry::with_defaults());
    assert!(report.is_empty(), "{:?}", report);
}

#[test]
fn violations_carry_schema_and_content_paths() {
    let mut value = blog();
    value["content_types"][0]["fields"][1]["settings"]["initial_place"] = json!("archived");
    value["content"][1]["data"]["rating"] = json!(3);
    value["content"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "content_type": "page", "data": {} }));

    let report = validate(&definition(value), &FieldTypeRegistry::with_defaults());
    let schema_paths: Vec<_> = report.schemas.iter().map(|v| v.to_string()).collect();
    assert_eq!(
        schema_paths,
        vec!["invalid_initial_place at content_types.article.fields.status.settings.initial_place"]
    );
    let content_paths: Vec<_> = report.content.iter().map(|v| v.to_string()).collect();
    assert_eq!(
        content_paths,
        vec![
            "unknown_field at content.1.rating".to_string(),
            format!("{UNKNOWN_CONTENT_TYPE} at content.4.content_type"),
        ]
    );
}

// ── transition ───────────────────────────────────────────────────

#[test]
fn transition_defaults_to_initial_place() {
    let definition = definition(blog());
    let fields = FieldTypeRegistry::with_defaults();
    let outcome = dry_run_transition(&definition, &fields, "article", "status", None, "to_review").unwrap();
    assert_eq!(outcome.from, "draft");
    assert_eq!(outcome.to, "review");
    assert_eq!(outcome.enabled, vec!["publish"]);
}

#[test]
fn illegal_transition_fails() {
    let definition = definition(blog());
    let fields = FieldTypeRegistry::with_defaults();
    let err = dry_run_transition(&definition, &fields, "article", "status", Some("published"), "to_review")
        .unwrap_err();
    assert!(err.to_string().contains("not allowed"));
    assert!(dry_run_transition(&definition, &fields, "article", "status", Some("gone"), "publish").is_err());
    assert!(dry_run_transition(&definition, &fields, "article", "title", None, "publish").is_err());
}

// ── delete ───────────────────────────────────────────────────────

#[test]
fn delete_cascades_and_nullifies() {
    let definition = definition(blog());
    let fields = Arc::new(FieldTypeRegistry::with_defaults());
    let simulation = simulate_delete(&definition, fields, id(ARTICLE), load_config(None).unwrap()).unwrap();

    assert_eq!(simulation.report.deleted(), vec![id(COMMENT)]);
    assert_eq!(simulation.report.nullified(), vec![id(LIKE), id(MEMBER)]);
    assert_eq!(simulation.audit.len(), 3);

    let remaining: Vec<_> = simulation.remaining.iter().map(|c| c.id).collect();
    assert_eq!(remaining, vec![id(LIKE), id(MEMBER)]);
    assert!(simulation.remaining.iter().all(|c| c.data.is_empty()));
}

#[test]
fn delete_of_unknown_id_fails() {
    let definition = definition(blog());
    let fields = Arc::new(FieldTypeRegistry::with_defaults());
    assert!(simulate_delete(&definition, fields, ContentId::new(), Default::default()).is_err());
}

#[test]
fn config_file_sets_max_depth() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cascade.json");
    std::fs::write(&path, r#"{ "max_depth": 0 }"#).unwrap();
    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.max_depth, 0);

    let definition = definition(blog());
    let fields = Arc::new(FieldTypeRegistry::with_defaults());
    assert!(simulate_delete(&definition, fields, id(ARTICLE), config).is_err());
}

#[test]
fn empty_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cascade.json");
    std::fs::write(&path, "{}").unwrap();
    assert_eq!(load_config(Some(&path)).unwrap().max_depth, quire_cascade::DEFAULT_MAX_DEPTH);
}
