use pretty_assertions::assert_eq;
use quire_cascade::{
    AuditError, AuditLevel, AuditLog, CascadeConfig, CascadeError, ContentObserver, MemoryAuditLog,
    ObserverError, ReferenceCascade,
};
use quire_fields::FieldTypeRegistry;
use quire_model::{ContentInstance, ContentTypeSchema, DomainSchemas, FieldDefinition, SchemaRegistry};
use quire_storage::MemoryContentStore;
use quire_types::{ContentEvent, ContentId, ContentKind, EventKind, EventPhase, FieldSettings};
use serde_json::json;
use std::sync::{Arc, Mutex};

const DOMAIN: &str = "blog";

fn reference_field(identifier: &str, content_type: &str) -> FieldDefinition {
    FieldDefinition::new(identifier, "reference").with_settings(FieldSettings::new().with("content_type", content_type))
}

fn back_reference(identifier: &str, content_type: &str, field: &str, on_delete: Option<&str>) -> FieldDefinition {
    let mut settings = FieldSettings::new()
        .with("content_type", content_type)
        .with("reference_field", field);
    if let Some(policy) = on_delete {
        settings.insert("onDelete", policy);
    }
    FieldDefinition::new(identifier, "reference_of").with_settings(settings)
}

fn blog_domain() -> DomainSchemas {
    let mut article = ContentTypeSchema::new("article", "Article");
    article.add_field(FieldDefinition::new("title", "text"));
    article.add_field(back_reference("comments", "comment", "article", Some("CASCADE")));
    article.add_field(back_reference("likes", "like", "article", None));
    article.add_field(back_reference("fans", "member", "favorite", Some("SET NULL")));

    let mut comment = ContentTypeSchema::new("comment", "Comment");
    comment.add_field(FieldDefinition::new("body", "text"));
    comment.add_field(reference_field("article", "article"));
    comment.add_field(back_reference("replies", "reply", "comment", Some("CASCADE")));

    let mut reply = ContentTypeSchema::new("reply", "Reply");
    reply.add_field(reference_field("comment", "comment"));

    let mut like = ContentTypeSchema::new("like", "Like");
    like.add_field(FieldDefinition::new("label", "text"));
    like.add_field(reference_field("article", "article"));

    let mut node = ContentTypeSchema::new("node", "Node");
    node.add_field(reference_field("parent", "node"));
    node.add_field(back_reference("children", "node", "parent", Some("CASCADE")));

    let mut member = ContentTypeSchema::new("member", "Member");
    member.kind = ContentKind::User;
    member.add_field(reference_field("favorite", "article"));

    let mut domain = DomainSchemas::new(DOMAIN);
    for schema in [article, comment, reply, like, node, member] {
        domain.add_type(schema).unwrap();
    }
    domain
}

fn registry(domain: DomainSchemas) -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::new().with_domain(domain).unwrap())
}

fn pointing_at(content_type: &str, field: &str, target: &ContentInstance) -> ContentInstance {
    let mut instance = ContentInstance::new(content_type, Default::default());
    instance.set_field(field, target.id.to_string());
    instance
}

struct Blog {
    article: ContentInstance,
    content: MemoryContentStore,
    users: MemoryContentStore,
}

impl Blog {
    fn new() -> Self {
        let article = ContentInstance::from_json("article", json!({ "title": "Hello" }));
        let mut content = MemoryContentStore::for_content();
        content.insert(DOMAIN, article.clone()).unwrap();
        Self {
            article,
            content,
            users: MemoryContentStore::for_users(),
        }
    }

    fn add(&mut self, instance: ContentInstance) -> ContentInstance {
        match instance.kind {
            ContentKind::Content => self.content.insert(DOMAIN, instance.clone()).unwrap(),
            ContentKind::User => self.users.insert(DOMAIN, instance.clone()).unwrap(),
        }
        instance
    }

    fn engine(self, schemas: Arc<SchemaRegistry>) -> ReferenceCascade<MemoryContentStore, MemoryContentStore> {
        ReferenceCascade::new(
            schemas,
            Arc::new(FieldTypeRegistry::with_defaults()),
            self.content,
            self.users,
        )
    }
}

type Seen = Arc<Mutex<Vec<(EventPhase, EventKind, String)>>>;

/// Records every notification as (phase, kind, content type).
struct Recorder(Seen);

impl ContentObserver for Recorder {
    fn before(&mut self, event: &ContentEvent, _content: &ContentInstance) -> Result<(), ObserverError> {
        self.0
            .lock()
            .unwrap()
            .push((event.phase, event.kind, event.content_type.clone()));
        Ok(())
    }

    fn after(&mut self, event: &ContentEvent, _content: &ContentInstance) -> Result<(), ObserverError> {
        self.0
            .lock()
            .unwrap()
            .push((event.phase, event.kind, event.content_type.clone()));
        Ok(())
    }
}

/// Refuses to let content of one type be deleted.
struct Veto(&'static str);

impl ContentObserver for Veto {
    fn before(&mut self, event: &ContentEvent, _content: &ContentInstance) -> Result<(), ObserverError> {
        if event.kind == EventKind::PermanentDelete && event.content_type == self.0 {
            return Err(ObserverError(format!("{} is protected", self.0)));
        }
        Ok(())
    }
}

struct BrokenAudit;

impl AuditLog for BrokenAudit {
    fn log(&self, _level: AuditLevel, _message: &str) -> Result<(), AuditError> {
        Err(AuditError("disk full".into()))
    }
}

// ── CASCADE ──────────────────────────────────────────────────────

#[test]
fn cascade_deletes_referencing_content() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    let comment = blog.add(pointing_at("comment", "article", &article));
    let audit = Arc::new(MemoryAuditLog::new());
    let mut engine = blog.engine(registry(blog_domain())).with_audit_log(audit.clone());

    let report = engine.permanent_delete(DOMAIN, &article).unwrap();

    assert!(!engine.content().contains(DOMAIN, article.id));
    assert!(!engine.content().contains(DOMAIN, comment.id));
    assert_eq!(report.root, article.id);
    assert_eq!(report.deleted(), vec![comment.id]);

    let entries = audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, AuditLevel::Info);
    assert_eq!(
        entries[0].message,
        format!(
            "Cascade delete referenced \"comment\" content with id \"{}\", because \"article\" content with id \"{}\" was hard deleted.",
            comment.id, article.id
        )
    );
}

#[test]
fn cascade_is_transitive() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    let comment = blog.add(pointing_at("comment", "article", &article));
    let reply = blog.add(pointing_at("reply", "comment", &comment));
    let mut engine = blog.engine(registry(blog_domain()));

    let report = engine.permanent_delete(DOMAIN, &article).unwrap();

    assert_eq!(report.deleted(), vec![reply.id, comment.id]);
    assert!(engine.content().is_empty());
}

#[test]
fn unrelated_content_is_left_alone() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    let other = blog.add(ContentInstance::from_json("article", json!({ "title": "Other" })));
    let foreign = blog.add(pointing_at("comment", "article", &other));
    let mut engine = blog.engine(registry(blog_domain()));

    let report = engine.permanent_delete(DOMAIN, &article).unwrap();

    assert!(report.is_empty());
    assert!(engine.content().contains(DOMAIN, other.id));
    assert!(engine.content().contains(DOMAIN, foreign.id));
}

// ── SET NULL ─────────────────────────────────────────────────────

#[test]
fn set_null_removes_only_the_reference_key() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    let like = blog.add(ContentInstance::from_json(
        "like",
        json!({ "label": "great", "article": article.id.to_string() }),
    ));
    let audit = Arc::new(MemoryAuditLog::new());
    let mut engine = blog.engine(registry(blog_domain())).with_audit_log(audit.clone());

    let report = engine.permanent_delete(DOMAIN, &article).unwrap();

    let stored = engine.content().get(DOMAIN, like.id).unwrap();
    assert!(stored.field_data("article").is_none());
    assert_eq!(stored.get_str("/label"), Some("great"));
    assert_eq!(report.nullified(), vec![like.id]);
    assert_eq!(
        audit.messages(),
        vec![format!(
            "Set referenced \"article\" of \"like\" content with id \"{}\" to NULL, because \"article\" content with id \"{}\" was hard deleted.",
            like.id, article.id
        )]
    );
}

#[test]
fn user_content_goes_through_the_user_manager() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    let mut fan = ContentInstance::user("member", Default::default());
    fan.set_field("favorite", article.id.to_string());
    let fan = blog.add(fan);
    let mut engine = blog.engine(registry(blog_domain()));

    let report = engine.permanent_delete(DOMAIN, &article).unwrap();

    assert_eq!(report.nullified(), vec![fan.id]);
    let stored = engine.users().get(DOMAIN, fan.id).unwrap();
    assert_eq!(stored.kind, ContentKind::User);
    assert!(stored.field_data("favorite").is_none());
}

// ── Cycles and depth ─────────────────────────────────────────────

#[test]
fn reference_cycles_terminate() {
    let mut blog = Blog::new();
    let mut a = ContentInstance::from_json("node", json!({}));
    let b = pointing_at("node", "parent", &a);
    a.set_field("parent", b.id.to_string());
    let a = blog.add(a);
    let b = blog.add(b);
    let mut engine = blog.engine(registry(blog_domain()));

    let report = engine.permanent_delete(DOMAIN, &a).unwrap();

    assert_eq!(report.deleted(), vec![b.id]);
    assert!(!engine.content().contains(DOMAIN, a.id));
    assert!(!engine.content().contains(DOMAIN, b.id));
}

#[test]
fn self_reference_is_skipped() {
    let mut blog = Blog::new();
    let mut node = ContentInstance::from_json("node", json!({}));
    let id = node.id;
    node.set_field("parent", id.to_string());
    let node = blog.add(node);
    let mut engine = blog.engine(registry(blog_domain()));

    let report = engine.permanent_delete(DOMAIN, &node).unwrap();
    assert!(report.is_empty());
    assert!(!engine.content().contains(DOMAIN, id));
}

#[test]
fn depth_limit_aborts_long_chains() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    let comment = blog.add(pointing_at("comment", "article", &article));
    blog.add(pointing_at("reply", "comment", &comment));
    let mut engine = blog
        .engine(registry(blog_domain()))
        .with_config(CascadeConfig::default().with_max_depth(1));

    let err = engine.permanent_delete(DOMAIN, &article).unwrap_err();
    assert!(matches!(err, CascadeError::DepthExceeded { max_depth: 1, .. }));
    assert!(engine.content().contains(DOMAIN, article.id));
}

// ── Failures ─────────────────────────────────────────────────────

#[test]
fn dangling_back_reference_aborts_before_any_change() {
    let mut domain = blog_domain();
    let mut article = domain.get_type("article").unwrap().clone();
    article.add_field(back_reference("ghosts", "ghost", "article", Some("CASCADE")));
    domain.replace_type(article);

    let mut blog = Blog::new();
    let target = blog.article.clone();
    let comment = blog.add(pointing_at("comment", "article", &target));
    let mut engine = blog.engine(registry(domain));

    let err = engine.permanent_delete(DOMAIN, &target).unwrap_err();
    assert!(matches!(err, CascadeError::Integrity { ref subject, .. } if subject == "ghosts"));
    assert!(engine.content().contains(DOMAIN, target.id));
    assert!(engine.content().contains(DOMAIN, comment.id));
}

/// The blog domain with `likes` (SET NULL) resolved before `comments`
/// (CASCADE), and comments carrying a back-reference to a missing type.
fn likes_first_with_dangling_comments() -> DomainSchemas {
    let mut domain = blog_domain();
    let mut article = ContentTypeSchema::new("article", "Article");
    article.add_field(FieldDefinition::new("title", "text"));
    article.add_field(back_reference("likes", "like", "article", None));
    article.add_field(back_reference("comments", "comment", "article", Some("CASCADE")));
    domain.replace_type(article);
    let mut comment = domain.get_type("comment").unwrap().clone();
    comment.add_field(back_reference("ghosts", "ghost", "comment", Some("CASCADE")));
    domain.replace_type(comment);
    domain
}

#[test]
fn nested_integrity_failure_leaves_earlier_siblings_untouched() {
    let mut blog = Blog::new();
    let target = blog.article.clone();
    let like = blog.add(pointing_at("like", "article", &target));
    let comment = blog.add(pointing_at("comment", "article", &target));
    let audit = Arc::new(MemoryAuditLog::new());
    let seen: Seen = Arc::default();
    let mut engine = blog
        .engine(registry(likes_first_with_dangling_comments()))
        .with_audit_log(audit.clone())
        .with_observer(Recorder(seen.clone()));

    let err = engine.permanent_delete(DOMAIN, &target).unwrap_err();

    assert!(matches!(err, CascadeError::Integrity { ref subject, .. } if subject == "ghosts"));
    let stored = engine.content().get(DOMAIN, like.id).unwrap();
    assert_eq!(stored.field_data("article"), Some(&json!(target.id.to_string())));
    assert!(engine.content().contains(DOMAIN, comment.id));
    assert!(engine.content().contains(DOMAIN, target.id));
    assert!(audit.entries().is_empty());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn depth_failure_leaves_earlier_siblings_untouched() {
    let mut domain = blog_domain();
    let mut article = ContentTypeSchema::new("article", "Article");
    article.add_field(back_reference("likes", "like", "article", None));
    article.add_field(back_reference("comments", "comment", "article", Some("CASCADE")));
    domain.replace_type(article);

    let mut blog = Blog::new();
    let target = blog.article.clone();
    let like = blog.add(pointing_at("like", "article", &target));
    let comment = blog.add(pointing_at("comment", "article", &target));
    blog.add(pointing_at("reply", "comment", &comment));
    let mut engine = blog
        .engine(registry(domain))
        .with_config(CascadeConfig::default().with_max_depth(1));

    let err = engine.permanent_delete(DOMAIN, &target).unwrap_err();

    assert!(matches!(err, CascadeError::DepthExceeded { .. }));
    assert!(engine.content().get(DOMAIN, like.id).unwrap().field_data("article").is_some());
    assert_eq!(engine.content().len(), 4);
}

#[test]
fn content_nullified_then_cascaded_is_deleted_once() {
    let mut domain = blog_domain();
    let mut article = ContentTypeSchema::new("article", "Article");
    article.add_field(back_reference("likes", "like", "article", None));
    article.add_field(back_reference("liked_by", "like", "article", Some("CASCADE")));
    domain.replace_type(article);

    let mut blog = Blog::new();
    let target = blog.article.clone();
    let like = blog.add(pointing_at("like", "article", &target));
    let mut engine = blog.engine(registry(domain));

    let report = engine.permanent_delete(DOMAIN, &target).unwrap();

    assert_eq!(report.nullified(), vec![like.id]);
    assert_eq!(report.deleted(), vec![like.id]);
    assert!(engine.content().is_empty());
}

#[test]
fn content_without_schema_is_an_integrity_failure() {
    let mut blog = Blog::new();
    let orphan = blog.add(ContentInstance::from_json("page", json!({})));
    let mut engine = blog.engine(registry(blog_domain()));

    let err = engine.permanent_delete(DOMAIN, &orphan).unwrap_err();
    assert!(matches!(err, CascadeError::Integrity { .. }));
    assert!(engine.content().contains(DOMAIN, orphan.id));
}

#[test]
fn audit_failures_do_not_abort() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    let comment = blog.add(pointing_at("comment", "article", &article));
    let mut engine = blog.engine(registry(blog_domain())).with_audit_log(Arc::new(BrokenAudit));

    let report = engine.permanent_delete(DOMAIN, &article).unwrap();
    assert_eq!(report.deleted(), vec![comment.id]);
    assert!(engine.content().is_empty());
}

#[test]
fn observer_error_aborts_the_delete() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    blog.add(pointing_at("comment", "article", &article));
    let mut engine = blog.engine(registry(blog_domain())).with_observer(Veto("comment"));

    let err = engine.permanent_delete(DOMAIN, &article).unwrap_err();
    assert!(matches!(err, CascadeError::Observer(_)));
    assert!(engine.content().contains(DOMAIN, article.id));
}

#[test]
fn deleting_missing_content_is_a_storage_error() {
    let blog = Blog::new();
    let ghost = ContentInstance::from_json("article", json!({}));
    let mut engine = blog.engine(registry(blog_domain()));
    let err = engine.permanent_delete(DOMAIN, &ghost).unwrap_err();
    assert!(matches!(err, CascadeError::Storage(_)));
}

// ── Notifications ────────────────────────────────────────────────

#[test]
fn dependents_are_notified_before_the_root() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    blog.add(pointing_at("comment", "article", &article));
    blog.add(pointing_at("like", "article", &article));
    let seen: Seen = Arc::default();
    let mut engine = blog
        .engine(registry(blog_domain()))
        .with_observer(Recorder(seen.clone()));

    engine.permanent_delete(DOMAIN, &article).unwrap();

    use EventKind::{PermanentDelete, Update};
    use EventPhase::{After, Before};
    let expected: Vec<(EventPhase, EventKind, String)> = vec![
        (Before, PermanentDelete, "comment".into()),
        (After, PermanentDelete, "comment".into()),
        (Before, Update, "like".into()),
        (After, Update, "like".into()),
        (Before, PermanentDelete, "article".into()),
        (After, PermanentDelete, "article".into()),
    ];
    assert_eq!(*seen.lock().unwrap(), expected);
}

#[test]
fn pre_delete_hook_leaves_the_root_in_place() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    let comment = blog.add(pointing_at("comment", "article", &article));
    let mut engine = blog.engine(registry(blog_domain()));

    let report = engine.before_permanent_delete(DOMAIN, &article).unwrap();

    assert_eq!(report.deleted(), vec![comment.id]);
    assert!(engine.content().contains(DOMAIN, article.id));
    let (content, _users) = engine.into_managers();
    assert_eq!(content.len(), 1);
}

#[test]
fn report_serializes_with_action_tags() {
    let mut blog = Blog::new();
    let article = blog.article.clone();
    let comment = blog.add(pointing_at("comment", "article", &article));
    let mut engine = blog.engine(registry(blog_domain()));

    let report = engine.permanent_delete(DOMAIN, &article).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["actions"][0]["action"], json!("deleted"));
    assert_eq!(value["actions"][0]["content_id"], json!(comment.id.to_string()));
    let _: ContentId = serde_json::from_value(value["root"].clone()).unwrap();
}
