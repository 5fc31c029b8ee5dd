use pretty_assertions::assert_eq;
use quire_fields::{ContentLookup, FieldError, FieldKind, FieldTypeRegistry, ResolveContext};
use quire_model::{ContentInstance, ContentTypeSchema, DomainSchemas, FieldDefinition, SchemaRegistry};
use quire_types::{ContentId, ContentKind, FieldSettings};
use serde_json::json;

/// Flat list of instances standing in for a store.
#[derive(Default)]
struct Instances(Vec<ContentInstance>);

impl ContentLookup for Instances {
    fn get(&self, _domain: &str, id: ContentId) -> Option<ContentInstance> {
        self.0.iter().find(|c| c.id == id).cloned()
    }

    fn referencing(
        &self,
        _domain: &str,
        content_type: &str,
        reference_field: &str,
        target: ContentId,
    ) -> Vec<ContentInstance> {
        let target = target.to_string();
        self.0
            .iter()
            .filter(|c| c.content_type == content_type)
            .filter(|c| c.get_str(&format!("/{reference_field}")) == Some(target.as_str()))
            .cloned()
            .collect()
    }
}

fn back_reference(content_type: &str, reference_field: &str) -> FieldSettings {
    FieldSettings::new()
        .with("content_type", content_type)
        .with("reference_field", reference_field)
}

fn schemas() -> SchemaRegistry {
    let mut article = ContentTypeSchema::new("article", "Article");
    article.add_field(FieldDefinition::new("title", "text"));
    article.add_field(
        FieldDefinition::new("comments", "reference_of").with_settings(back_reference("comment", "article")),
    );
    article.add_field(
        FieldDefinition::new("fans", "reference_of").with_settings(back_reference("member", "favorite")),
    );
    article.add_field(
        FieldDefinition::new("ghosts", "reference_of").with_settings(back_reference("ghost", "article")),
    );
    article.add_field(
        FieldDefinition::new("broken", "reference_of").with_settings(back_reference("comment", "missing")),
    );
    article.add_field(
        FieldDefinition::new("by_title", "reference_of").with_settings(back_reference("comment", "body")),
    );

    let mut comment = ContentTypeSchema::new("comment", "Comment");
    comment.add_field(FieldDefinition::new("body", "text"));
    comment.add_field(
        FieldDefinition::new("article", "reference").with_settings(FieldSettings::new().with("content_type", "article")),
    );

    let mut member = ContentTypeSchema::new("member", "Member");
    member.kind = ContentKind::User;
    member.add_field(
        FieldDefinition::new("favorite", "reference").with_settings(FieldSettings::new().with("content_type", "article")),
    );

    let mut domain = DomainSchemas::new("blog");
    domain.add_type(article).unwrap();
    domain.add_type(comment).unwrap();
    domain.add_type(member).unwrap();
    SchemaRegistry::new().with_domain(domain).unwrap()
}

fn comment_on(article: &ContentInstance, body: &str) -> ContentInstance {
    ContentInstance::from_json(
        "comment",
        json!({ "body": body, "article": article.id.to_string() }),
    )
}

struct Fixture {
    schemas: SchemaRegistry,
    content: Instances,
    users: Instances,
    article: ContentInstance,
}

fn fixture() -> Fixture {
    let article = ContentInstance::from_json("article", json!({ "title": "Hello" }));
    let other = ContentInstance::from_json("article", json!({ "title": "Other" }));
    let content = Instances(vec![
        article.clone(),
        other.clone(),
        comment_on(&article, "first"),
        comment_on(&other, "elsewhere"),
        comment_on(&article, "second"),
    ]);
    let mut fan = ContentInstance::user("member", Default::default());
    fan.set_field("favorite", article.id.to_string());
    Fixture {
        schemas: schemas(),
        content,
        users: Instances(vec![fan]),
        article,
    }
}

fn bodies(items: &[ContentInstance]) -> Vec<&str> {
    items.iter().filter_map(|c| c.get_str("/body")).collect()
}

// ── Back-references ──────────────────────────────────────────────

#[test]
fn reference_of_yields_referencing_content_in_store_order() {
    let f = fixture();
    let registry = FieldTypeRegistry::with_defaults();
    let ctx = ResolveContext::new("blog", &f.schemas, &f.content, &f.users);
    let schema = f.schemas.get_type("blog", "article").unwrap();

    let resolved = registry
        .resolve_field(&ctx, &f.article, schema.field("comments").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(resolved.kind, ContentKind::Content);
    assert_eq!(resolved.content_type, "comment");
    assert_eq!(bodies(&resolved.items), vec!["first", "second"]);
}

#[test]
fn user_references_are_looked_up_in_the_user_store() {
    let f = fixture();
    let registry = FieldTypeRegistry::with_defaults();
    let ctx = ResolveContext::new("blog", &f.schemas, &f.content, &f.users);
    let schema = f.schemas.get_type("blog", "article").unwrap();

    let resolved = registry
        .resolve_field(&ctx, &f.article, schema.field("fans").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(resolved.kind, ContentKind::User);
    assert_eq!(resolved.items.len(), 1);
    assert_eq!(resolved.items[0].kind, ContentKind::User);
}

#[test]
fn non_reference_fields_resolve_to_none() {
    let f = fixture();
    let registry = FieldTypeRegistry::with_defaults();
    let ctx = ResolveContext::new("blog", &f.schemas, &f.content, &f.users);
    let schema = f.schemas.get_type("blog", "article").unwrap();
    let resolved = registry
        .resolve_field(&ctx, &f.article, schema.field("title").unwrap())
        .unwrap();
    assert!(resolved.is_none());
}

#[test]
fn aliased_reference_field_is_followed_by_its_kind() {
    let mut article = ContentTypeSchema::new("article", "Article");
    article.add_field(
        FieldDefinition::new("notes", "reference_of").with_settings(back_reference("note", "article")),
    );
    let mut note = ContentTypeSchema::new("note", "Note");
    note.add_field(FieldDefinition::new("article", "link").with_settings(FieldSettings::new().with("content_type", "article")));
    let mut domain = DomainSchemas::new("blog");
    domain.add_type(article).unwrap();
    domain.add_type(note).unwrap();
    let schemas = SchemaRegistry::new().with_domain(domain).unwrap();

    let target = ContentInstance::from_json("article", json!({}));
    let linked = ContentInstance::from_json("note", json!({ "article": target.id.to_string() }));
    let content = Instances(vec![target.clone(), linked.clone()]);
    let users = Instances::default();
    let mut registry = FieldTypeRegistry::with_defaults();
    registry.register("link", FieldKind::Reference);
    let ctx = ResolveContext::new("blog", &schemas, &content, &users);
    let schema = schemas.get_type("blog", "article").unwrap();

    let resolved = registry
        .resolve_field(&ctx, &target, schema.field("notes").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(resolved.items, vec![linked]);
}

// ── Integrity ────────────────────────────────────────────────────

#[test]
fn missing_target_schema_is_an_integrity_failure() {
    let f = fixture();
    let registry = FieldTypeRegistry::with_defaults();
    let ctx = ResolveContext::new("blog", &f.schemas, &f.content, &f.users);
    let schema = f.schemas.get_type("blog", "article").unwrap();

    let err = registry
        .resolve_field(&ctx, &f.article, schema.field("ghosts").unwrap())
        .unwrap_err();
    assert!(matches!(err, FieldError::Integrity { ref field, .. } if field == "ghosts"));
}

#[test]
fn missing_or_mistyped_reference_field_is_an_integrity_failure() {
    let f = fixture();
    let registry = FieldTypeRegistry::with_defaults();
    let ctx = ResolveContext::new("blog", &f.schemas, &f.content, &f.users);
    let schema = f.schemas.get_type("blog", "article").unwrap();

    for field in ["broken", "by_title"] {
        let err = registry
            .resolve_field(&ctx, &f.article, schema.field(field).unwrap())
            .unwrap_err();
        assert!(matches!(err, FieldError::Integrity { .. }), "{field}: {err}");
    }
}

// ── Forward references ───────────────────────────────────────────

#[test]
fn reference_resolves_to_the_target_when_it_exists() {
    let f = fixture();
    let registry = FieldTypeRegistry::with_defaults();
    let ctx = ResolveContext::new("blog", &f.schemas, &f.content, &f.users);
    let comment_schema = f.schemas.get_type("blog", "comment").unwrap();
    let field = comment_schema.field("article").unwrap();

    let comment = comment_on(&f.article, "hi");
    let resolved = registry.resolve_field(&ctx, &comment, field).unwrap().unwrap();
    assert_eq!(resolved.items, vec![f.article.clone()]);

    let dangling = comment_on(&ContentInstance::new("article", Default::default()), "lost");
    let resolved = registry.resolve_field(&ctx, &dangling, field).unwrap().unwrap();
    assert!(resolved.items.is_empty());
}

#[test]
fn malformed_stored_reference_is_an_integrity_failure() {
    let f = fixture();
    let registry = FieldTypeRegistry::with_defaults();
    let ctx = ResolveContext::new("blog", &f.schemas, &f.content, &f.users);
    let comment_schema = f.schemas.get_type("blog", "comment").unwrap();

    let comment = ContentInstance::from_json("comment", json!({ "article": 42 }));
    let err = registry
        .resolve_field(&ctx, &comment, comment_schema.field("article").unwrap())
        .unwrap_err();
    assert!(matches!(err, FieldError::Integrity { .. }));
}
