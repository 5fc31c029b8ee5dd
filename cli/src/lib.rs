//! Library side of the `quire` command: loading definition files and the
//! operations behind each subcommand.

use anyhow::{Context, Result, bail};
use quire_cascade::{AuditEntry, CascadeConfig, CascadeReport, MemoryAuditLog, ReferenceCascade};
use quire_fields::FieldTypeRegistry;
use quire_model::{ContentInstance, DomainDocument, DomainSchemas, SchemaRegistry};
use quire_storage::MemoryContentStore;
use quire_types::{ContentId, ContentKind, Violations};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Violation code for seed content whose type is not defined.
pub const UNKNOWN_CONTENT_TYPE: &str = "unknown_content_type";

/// Shape of a definition file: a domain plus optional seed content.
#[derive(Debug, Deserialize)]
struct DefinitionFile {
    #[serde(flatten)]
    domain: DomainDocument,
    #[serde(default)]
    content: Vec<ContentInstance>,
}

/// A loaded domain definition.
#[derive(Debug, Clone)]
pub struct Definition {
    pub domain: DomainSchemas,
    pub content: Vec<ContentInstance>,
}

impl Definition {
    /// Parses a definition from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DefinitionFile = serde_json::from_str(json).context("Failed to parse definition")?;
        let domain = DomainSchemas::try_from(file.domain).context("Invalid domain definition")?;
        let mut content = file.content;
        // Seed content takes its kind from the schema it names.
        for instance in &mut content {
            if domain.get_user_type(&instance.content_type).is_ok() {
                instance.kind = ContentKind::User;
            }
        }
        Ok(Self { domain, content })
    }

    /// Reads and parses a definition file.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading definition from {:?}", path);
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read definition file {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn identifier(&self) -> &str {
        self.domain.identifier()
    }

    /// Seed instance with `id`.
    pub fn find(&self, id: ContentId) -> Option<&ContentInstance> {
        self.content.iter().find(|c| c.id == id)
    }
}

/// Everything wrong with a definition.
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub schemas: Violations,
    pub content: Violations,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.schemas.len() + self.content.len()
    }
}

/// Validates every schema, its field settings and the seed content.
pub fn validate(definition: &Definition, fields: &FieldTypeRegistry) -> ValidationReport {
    let mut report = ValidationReport {
        schemas: fields.validate_domain(&definition.domain),
        content: Violations::new(),
    };
    for (i, instance) in definition.content.iter().enumerate() {
        let path = format!("content.{i}");
        match definition.domain.get_any_type(&instance.content_type) {
            Ok(schema) => report
                .content
                .extend_at(&path, fields.validate_content(schema, instance)),
            Err(_) => report.content.add(UNKNOWN_CONTENT_TYPE, format!("{path}.content_type")),
        }
    }
    debug!(violations = report.len(), "Validated definition");
    report
}

/// Result of a workflow dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub from: String,
    pub to: String,
    /// Transitions available from the new place.
    pub enabled: Vec<String>,
}

/// Applies `transition` to a state field without touching any content.
/// `from` defaults to the workflow's initial place.
pub fn dry_run_transition(
    definition: &Definition,
    fields: &FieldTypeRegistry,
    content_type: &str,
    field: &str,
    from: Option<&str>,
    transition: &str,
) -> Result<TransitionOutcome> {
    let schema = definition.domain.get_any_type(content_type)?;
    let workflow = fields.workflow(schema, field)?;
    let from = from.unwrap_or(&workflow.initial_place).to_string();
    workflow.place(&from)?;
    let to = workflow.apply(&from, transition)?.to_string();
    let enabled = workflow.enabled_transitions(&to).map(str::to_string).collect();
    Ok(TransitionOutcome { from, to, enabled })
}

/// Reads a cascade config file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<CascadeConfig> {
    let Some(path) = path else {
        return Ok(CascadeConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    CascadeConfig::from_json(&json).context("Failed to parse cascade config")
}

/// What a simulated delete did.
#[derive(Debug, Serialize)]
pub struct DeleteSimulation {
    pub report: CascadeReport,
    pub audit: Vec<AuditEntry>,
    /// Seed content left after the delete, in definition order.
    pub remaining: Vec<ContentInstance>,
}

/// Runs a permanent delete of seed content `id` against in-memory stores.
pub fn simulate_delete(
    definition: &Definition,
    fields: Arc<FieldTypeRegistry>,
    id: ContentId,
    config: CascadeConfig,
) -> Result<DeleteSimulation> {
    let Some(root) = definition.find(id).cloned() else {
        bail!("No seed content with id {id}");
    };
    let domain = definition.identifier();

    let mut content = MemoryContentStore::for_content();
    let mut users = MemoryContentStore::for_users();
    for instance in &definition.content {
        match instance.kind {
            ContentKind::Content => content.insert(domain, instance.clone())?,
            ContentKind::User => users.insert(domain, instance.clone())?,
        }
    }

    let schemas = Arc::new(SchemaRegistry::new().with_domain(definition.domain.clone())?);
    let audit = Arc::new(MemoryAuditLog::new());
    let mut engine = ReferenceCascade::new(schemas, fields, content, users)
        .with_config(config)
        .with_audit_log(audit.clone());

    let report = engine.permanent_delete(domain, &root)?;

    let (content, users) = engine.into_managers();
    let remaining = definition
        .content
        .iter()
        .filter_map(|c| match c.kind {
            ContentKind::Content => content.get(domain, c.id),
            ContentKind::User => users.get(domain, c.id),
        })
        .cloned()
        .collect();

    Ok(DeleteSimulation {
        report,
        audit: audit.entries(),
        remaining,
    })
}
