//! Referential integrity on permanent delete.
//!
//! Before content is deleted for good, every `reference_of` field of its
//! schema is resolved into the content pointing at it. Depending on the
//! field's `onDelete` policy that content is deleted as well (`CASCADE`,
//! recursively) or loses its reference (`SET NULL`).
//!
//! A delete runs in two passes. The first walks the whole back-reference
//! graph and records every change in order without writing anything, so
//! an integrity failure or an exceeded depth anywhere in the graph leaves
//! the stores untouched. The second applies the recorded changes, each one
//! flushed before the next, and the root last.

use crate::audit::{AuditLevel, AuditLog, TracingAuditLog};
use crate::config::CascadeConfig;
use crate::error::{CascadeError, CascadeResult};
use crate::manager::ContentManager;
use crate::observer::ContentObserver;
use crate::report::{CascadeAction, CascadeReport, CascadeStage};
use quire_fields::{FieldKind, FieldTypeRegistry, OnDelete, ResolveContext, ResolvedContent};
use quire_model::{ContentInstance, SchemaRegistry};
use quire_types::{ContentEvent, ContentId, ContentKind, EventKind};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One change of a root delete, recorded before anything is written.
enum Step {
    Delete {
        domain: String,
        content: ContentInstance,
        cause: Option<ContentInstance>,
    },
    Nullify {
        domain: String,
        content: ContentInstance,
        field: String,
        cause: ContentInstance,
    },
}

/// Changes planned for one root delete.
#[derive(Default)]
struct Plan {
    /// Content on the delete path.
    visited: HashSet<ContentId>,
    /// Planned state of content whose reference gets cleared.
    nullified: HashMap<ContentId, ContentInstance>,
    steps: Vec<Step>,
}

/// A resolved `reference_of` field.
struct BackReference {
    field: String,
    reference_field: String,
    policy: OnDelete,
    resolved: ResolvedContent,
}

fn cascade_message(deleted: &ContentInstance, cause: &ContentInstance) -> String {
    format!(
        "Cascade delete referenced \"{}\" content with id \"{}\", because \"{}\" content with id \"{}\" was hard deleted.",
        deleted.content_type, deleted.id, cause.content_type, cause.id
    )
}

fn nullify_message(field: &str, updated: &ContentInstance, cause: &ContentInstance) -> String {
    format!(
        "Set referenced \"{}\" of \"{}\" content with id \"{}\" to NULL, because \"{}\" content with id \"{}\" was hard deleted.",
        field, updated.content_type, updated.id, cause.content_type, cause.id
    )
}

/// Enforces `CASCADE` / `SET NULL` for back-references on permanent delete.
///
/// Owns one manager per content kind and dispatches every write to the
/// manager matching the instance's kind.
pub struct ReferenceCascade<C, U> {
    schemas: Arc<SchemaRegistry>,
    fields: Arc<FieldTypeRegistry>,
    content: C,
    users: U,
    observers: Vec<Box<dyn ContentObserver>>,
    audit: Arc<dyn AuditLog>,
    config: CascadeConfig,
}

impl<C: ContentManager, U: ContentManager> ReferenceCascade<C, U> {
    pub fn new(schemas: Arc<SchemaRegistry>, fields: Arc<FieldTypeRegistry>, content: C, users: U) -> Self {
        Self {
            schemas,
            fields,
            content,
            users,
            observers: Vec::new(),
            audit: Arc::new(TracingAuditLog),
            config: CascadeConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: CascadeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Appends an observer; observers are notified in registration order.
    #[must_use]
    pub fn with_observer(mut self, observer: impl ContentObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    pub fn users_mut(&mut self) -> &mut U {
        &mut self.users
    }

    /// Gives the managers back.
    pub fn into_managers(self) -> (C, U) {
        (self.content, self.users)
    }

    fn manager(&self, kind: ContentKind) -> &dyn ContentManager {
        match kind {
            ContentKind::Content => &self.content,
            ContentKind::User => &self.users,
        }
    }

    fn manager_mut(&mut self, kind: ContentKind) -> &mut dyn ContentManager {
        match kind {
            ContentKind::Content => &mut self.content,
            ContentKind::User => &mut self.users,
        }
    }

    /// Permanently deletes `content` and everything its back-references
    /// require: dependent changes first, then the root itself.
    pub fn permanent_delete(&mut self, domain: &str, content: &ContentInstance) -> CascadeResult<CascadeReport> {
        info!(
            domain,
            content_id = %content.id,
            content_type = %content.content_type,
            stage = %CascadeStage::Requested,
            "Permanent delete requested"
        );
        let mut plan = Plan::default();
        self.plan_delete(&mut plan, domain, content, None, 0)?;
        let report = self.apply(content.id, plan)?;
        debug!(
            content_id = %content.id,
            stage = %CascadeStage::Committed,
            changes = report.actions.len(),
            "Permanent delete committed"
        );
        Ok(report)
    }

    /// The pre-delete hook alone: applies the back-reference policies of
    /// `content` without deleting it.
    pub fn before_permanent_delete(
        &mut self,
        domain: &str,
        content: &ContentInstance,
    ) -> CascadeResult<CascadeReport> {
        let mut plan = Plan::default();
        self.plan_references(&mut plan, domain, content, 0)?;
        self.apply(content.id, plan)
    }

    fn plan_delete(
        &self,
        plan: &mut Plan,
        domain: &str,
        content: &ContentInstance,
        cause: Option<&ContentInstance>,
        depth: usize,
    ) -> CascadeResult<()> {
        self.plan_references(plan, domain, content, depth)?;
        plan.steps.push(Step::Delete {
            domain: domain.to_string(),
            content: content.clone(),
            cause: cause.cloned(),
        });
        Ok(())
    }

    /// Records the cascades and nullifies everything referencing `content`
    /// needs.
    fn plan_references(
        &self,
        plan: &mut Plan,
        domain: &str,
        content: &ContentInstance,
        depth: usize,
    ) -> CascadeResult<()> {
        if depth > self.config.max_depth {
            return Err(CascadeError::DepthExceeded {
                max_depth: self.config.max_depth,
                content_id: content.id,
            });
        }
        plan.visited.insert(content.id);

        for back in self.resolve_back_references(domain, content)? {
            for item in back.resolved.items {
                if plan.visited.contains(&item.id) {
                    debug!(content_id = %item.id, field = %back.field, "Skipping content already being deleted");
                    continue;
                }
                // Earlier steps may have changed or removed it.
                let current = match plan.nullified.get(&item.id) {
                    Some(planned) => planned.clone(),
                    None => match self.manager(item.kind).get(&back.resolved.domain, item.id) {
                        Some(stored) => stored,
                        None => continue,
                    },
                };
                match back.policy {
                    OnDelete::Cascade => {
                        debug!(
                            content_id = %current.id,
                            because = %content.id,
                            depth = depth + 1,
                            stage = %CascadeStage::Cascading,
                            "Cascading delete"
                        );
                        self.plan_delete(plan, &back.resolved.domain, &current, Some(content), depth + 1)?;
                    }
                    OnDelete::SetNull => {
                        let mut updated = current;
                        if updated.remove_field(&back.reference_field).is_none() {
                            continue;
                        }
                        debug!(
                            content_id = %updated.id,
                            field = %back.reference_field,
                            because = %content.id,
                            stage = %CascadeStage::Nullifying,
                            "Clearing reference"
                        );
                        plan.nullified.insert(updated.id, updated.clone());
                        plan.steps.push(Step::Nullify {
                            domain: back.resolved.domain.clone(),
                            content: updated,
                            field: back.reference_field.clone(),
                            cause: content.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_back_references(&self, domain: &str, content: &ContentInstance) -> CascadeResult<Vec<BackReference>> {
        let schema = self
            .schemas
            .get_any_type(domain, &content.content_type)
            .map_err(|e| CascadeError::Integrity {
                subject: content.content_type.clone(),
                reason: e.to_string(),
            })?;
        debug!(
            content_id = %content.id,
            content_type = schema.identifier(),
            stage = %CascadeStage::Resolving,
            "Resolving back-references"
        );

        let ctx = ResolveContext::new(domain, &self.schemas, &self.content, &self.users);
        let mut back_references = Vec::new();
        for field in schema.fields() {
            if self.fields.kind_of(field).ok() != Some(FieldKind::ReferenceOf) {
                continue;
            }
            let Some(resolved) = self.fields.resolve_field(&ctx, content, field)? else {
                continue;
            };
            back_references.push(BackReference {
                field: field.identifier().to_string(),
                reference_field: field
                    .settings
                    .get_str("reference_field")
                    .unwrap_or_default()
                    .to_string(),
                policy: OnDelete::from_settings(&field.settings),
                resolved,
            });
        }
        Ok(back_references)
    }

    /// Writes the planned steps in order.
    fn apply(&mut self, root: ContentId, plan: Plan) -> CascadeResult<CascadeReport> {
        debug!(content_id = %root, steps = plan.steps.len(), stage = %CascadeStage::Planned, "Cascade planned");
        let mut report = CascadeReport::new(root);
        for step in plan.steps {
            match step {
                Step::Delete { domain, content, cause } => {
                    self.delete(&mut report, &domain, &content, cause.as_ref())?;
                }
                Step::Nullify {
                    domain,
                    content,
                    field,
                    cause,
                } => self.nullify(&mut report, &domain, &content, &field, &cause)?,
            }
        }
        Ok(report)
    }

    fn delete(
        &mut self,
        report: &mut CascadeReport,
        domain: &str,
        content: &ContentInstance,
        cause: Option<&ContentInstance>,
    ) -> CascadeResult<()> {
        let kind = EventKind::PermanentDelete;
        self.notify_before(
            &ContentEvent::before(kind, content.id, content.content_type.clone(), content.kind),
            content,
        )?;

        let manager = self.manager_mut(content.kind);
        manager.permanent_delete(domain, content)?;
        manager.flush(domain)?;

        if let Some(cause) = cause {
            self.audit(&cascade_message(content, cause));
            report.actions.push(CascadeAction::Deleted {
                content_id: content.id,
                content_type: content.content_type.clone(),
                kind: content.kind,
                because: cause.id,
            });
        }

        self.notify_after(
            &ContentEvent::after(kind, content.id, content.content_type.clone(), content.kind),
            content,
        )
    }

    fn nullify(
        &mut self,
        report: &mut CascadeReport,
        domain: &str,
        content: &ContentInstance,
        reference_field: &str,
        cause: &ContentInstance,
    ) -> CascadeResult<()> {
        let kind = EventKind::Update;
        self.notify_before(
            &ContentEvent::before(kind, content.id, content.content_type.clone(), content.kind),
            content,
        )?;

        let manager = self.manager_mut(content.kind);
        manager.update(domain, content)?;
        manager.flush(domain)?;

        self.audit(&nullify_message(reference_field, content, cause));
        report.actions.push(CascadeAction::Nullified {
            content_id: content.id,
            content_type: content.content_type.clone(),
            kind: content.kind,
            field: reference_field.to_string(),
            because: cause.id,
        });

        self.notify_after(
            &ContentEvent::after(kind, content.id, content.content_type.clone(), content.kind),
            content,
        )
    }

    fn notify_before(&mut self, event: &ContentEvent, content: &ContentInstance) -> CascadeResult<()> {
        for observer in &mut self.observers {
            observer.before(event, content)?;
        }
        Ok(())
    }

    fn notify_after(&mut self, event: &ContentEvent, content: &ContentInstance) -> CascadeResult<()> {
        for observer in &mut self.observers {
            observer.after(event, content)?;
        }
        Ok(())
    }

    fn audit(&self, message: &str) {
        if let Err(err) = self.audit.log(AuditLevel::Info, message) {
            warn!(error = %err, "Failed to write audit log entry");
        }
    }
}
