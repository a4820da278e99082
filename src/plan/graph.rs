//! Change graph parsed from a rendered plan.
//!
//! The input is the tool's JSON plan export: an object whose
//! `resource_changes` array lists every resource with its proposed
//! `before`/`after` snapshots.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

use super::path::AttributePath;
use super::value::PlanValue;

/// Parsed plan: the ordered list of proposed resource changes.
///
/// Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeGraph {
    /// Plan export format version, if reported.
    pub format_version: Option<String>,
    /// Version of the tool that produced the plan, if reported.
    pub tool_version: Option<String>,
    resource_changes: Vec<ResourceChange>,
}

/// One declared resource's proposed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    /// Full resource address (e.g. `aws_s3_bucket.this`).
    pub address: Option<String>,
    /// Resource kind.
    pub resource_type: String,
    /// Local name within its module.
    pub name: Option<String>,
    /// `managed` or `data`.
    pub mode: Option<String>,
    /// Provider that owns the resource.
    pub provider_name: Option<String>,
    /// Proposed change.
    pub change: ChangeDetail,
}

/// Before/after snapshots for a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDetail {
    /// Actions the tool would take.
    pub actions: Vec<ChangeAction>,
    /// Snapshot before the change, absent for creates.
    pub before: Option<PlanValue>,
    /// Snapshot after the change, with unknown values marked.
    pub after: PlanValue,
    /// Whether the export carried an `after` field at all. A destroy
    /// renders `"after": null`, which still counts as present.
    pub after_present: bool,
}

/// Action the tool would take on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// Nothing changes.
    #[serde(rename = "no-op")]
    NoOp,
    /// Resource is created.
    Create,
    /// Data source is read.
    Read,
    /// Resource is updated in place.
    Update,
    /// Resource is destroyed.
    Delete,
    /// Action not recognized by this version.
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    format_version: Option<String>,
    #[serde(default)]
    terraform_version: Option<String>,
    #[serde(default)]
    resource_changes: Vec<RawResourceChange>,
}

#[derive(Debug, Deserialize)]
struct RawResourceChange {
    #[serde(default)]
    address: Option<String>,
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    provider_name: Option<String>,
    change: RawChange,
}

#[derive(Debug, Deserialize)]
struct RawChange {
    #[serde(default)]
    actions: Vec<ChangeAction>,
    #[serde(default)]
    before: Option<Value>,
    #[serde(default, deserialize_with = "present_value")]
    after: Option<Value>,
    #[serde(default)]
    after_unknown: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing field is `None`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ChangeGraph {
    /// Parses a plan export.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or does not follow the
    /// plan export shape.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawPlan = serde_json::from_str(json)?;
        Ok(Self::from(raw))
    }

    /// Builds a graph directly from resource changes.
    #[must_use]
    pub const fn from_changes(resource_changes: Vec<ResourceChange>) -> Self {
        Self {
            format_version: None,
            tool_version: None,
            resource_changes,
        }
    }

    /// Returns all resource changes in declaration order.
    #[must_use]
    pub fn resource_changes(&self) -> &[ResourceChange] {
        &self.resource_changes
    }

    /// Returns the number of resource changes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.resource_changes.len()
    }

    /// Returns true if the plan lists no resource changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.resource_changes.is_empty()
    }

    /// Returns the changes whose type equals `resource_type`, in the
    /// plan order. An empty result is a valid answer.
    #[must_use]
    pub fn find_changes(&self, resource_type: &str) -> Vec<&ResourceChange> {
        self.resource_changes
            .iter()
            .filter(|rc| rc.resource_type == resource_type)
            .collect()
    }

    /// Returns the distinct resource types in first-seen order.
    #[must_use]
    pub fn resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for rc in &self.resource_changes {
            if !types.contains(&rc.resource_type.as_str()) {
                types.push(&rc.resource_type);
            }
        }
        types
    }

    /// Computes a deterministic SHA-256 fingerprint of the graph content.
    ///
    /// Two graphs that are structurally equal have the same fingerprint.
    /// Tool version metadata is excluded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        for rc in &self.resource_changes {
            hash_str(&mut hasher, rc.address.as_deref().unwrap_or(""));
            hash_str(&mut hasher, &rc.resource_type);
            for action in &rc.change.actions {
                hash_str(&mut hasher, action.as_str());
            }
            match &rc.change.before {
                Some(before) => hash_value(&mut hasher, before),
                None => hasher.update([0xffu8]),
            }
            hasher.update([u8::from(rc.change.after_present)]);
            hash_value(&mut hasher, &rc.change.after);
        }

        hex::encode(hasher.finalize())
    }
}

impl From<RawPlan> for ChangeGraph {
    fn from(raw: RawPlan) -> Self {
        Self {
            format_version: raw.format_version,
            tool_version: raw.terraform_version,
            resource_changes: raw
                .resource_changes
                .into_iter()
                .map(ResourceChange::from)
                .collect(),
        }
    }
}

impl From<RawResourceChange> for ResourceChange {
    fn from(raw: RawResourceChange) -> Self {
        let RawChange {
            actions,
            before,
            after,
            after_unknown,
        } = raw.change;

        Self {
            address: raw.address,
            resource_type: raw.resource_type,
            name: raw.name,
            mode: raw.mode,
            provider_name: raw.provider_name,
            change: ChangeDetail {
                actions,
                before: before.filter(|v| !v.is_null()).map(PlanValue::from_json),
                after_present: after.is_some(),
                after: PlanValue::with_unknown_mask(after, after_unknown.as_ref()),
            },
        }
    }
}

impl ResourceChange {
    /// Creates a change of the given type with an `after` snapshot.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, after: PlanValue) -> Self {
        Self {
            address: None,
            resource_type: resource_type.into(),
            name: None,
            mode: None,
            provider_name: None,
            change: ChangeDetail {
                actions: vec![ChangeAction::Create],
                before: None,
                after,
                after_present: true,
            },
        }
    }

    /// Navigates the `after` snapshot.
    ///
    /// Returns `None` if any segment is absent or the value is null. Unknown
    /// values are returned as [`PlanValue::Unknown`].
    #[must_use]
    pub fn attribute_after(&self, path: &AttributePath) -> Option<&PlanValue> {
        self.change.after.lookup(path).filter(|v| !v.is_null())
    }

    /// Returns a display label: the address if known, else the type.
    #[must_use]
    pub fn label(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.resource_type)
    }

    /// Returns the actions joined for display (e.g. `delete, create`).
    #[must_use]
    pub fn action_summary(&self) -> String {
        self.change
            .actions
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ChangeAction {
    /// Returns the action as the tool names it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_be_bytes());
    hasher.update(s.as_bytes());
}

fn hash_value(hasher: &mut Sha256, value: &PlanValue) {
    match value {
        PlanValue::Null => hasher.update([0u8]),
        PlanValue::Bool(b) => hasher.update([1u8, u8::from(*b)]),
        PlanValue::Number(n) => {
            hasher.update([2u8]);
            hash_str(hasher, &n.to_string());
        }
        PlanValue::String(s) => {
            hasher.update([3u8]);
            hash_str(hasher, s);
        }
        PlanValue::Sequence(items) => {
            hasher.update([4u8]);
            hasher.update((items.len() as u64).to_be_bytes());
            for item in items {
                hash_value(hasher, item);
            }
        }
        PlanValue::Mapping(map) => {
            hasher.update([5u8]);
            hasher.update((map.len() as u64).to_be_bytes());
            for (key, item) in map {
                hash_str(hasher, key);
                hash_value(hasher, item);
            }
        }
        PlanValue::Unknown => hasher.update([6u8]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE_PLAN: &str = r#"{
        "format_version": "1.2",
        "terraform_version": "1.9.5",
        "resource_changes": [
            {
                "address": "aws_s3_bucket.this",
                "mode": "managed",
                "type": "aws_s3_bucket",
                "name": "this",
                "provider_name": "registry.terraform.io/hashicorp/aws",
                "change": {
                    "actions": ["create"],
                    "before": null,
                    "after": { "bucket": "secure-dev", "force_destroy": false },
                    "after_unknown": { "arn": true, "id": true }
                }
            },
            {
                "address": "aws_s3_bucket_versioning.this",
                "type": "aws_s3_bucket_versioning",
                "change": {
                    "actions": ["create"],
                    "after": { "versioning_configuration": [{ "status": "Enabled" }] },
                    "after_unknown": { "bucket": true }
                }
            },
            {
                "address": "aws_s3_bucket.logs",
                "type": "aws_s3_bucket",
                "change": {
                    "actions": ["delete", "create"],
                    "before": { "bucket": "old-logs" },
                    "after": { "bucket": "logs" }
                }
            }
        ]
    }"#;

    fn path(s: &str) -> AttributePath {
        s.parse().expect("valid path")
    }

    #[test]
    fn test_parse_sample_plan() {
        let graph = ChangeGraph::from_json_str(SAMPLE_PLAN).unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.format_version.as_deref(), Some("1.2"));
        assert_eq!(graph.tool_version.as_deref(), Some("1.9.5"));

        let first = &graph.resource_changes()[0];
        assert_eq!(first.label(), "aws_s3_bucket.this");
        assert_eq!(first.mode.as_deref(), Some("managed"));
        assert!(first.change.before.is_none());
        assert!(first.attribute_after(&path("arn")).is_some_and(PlanValue::is_unknown));
    }

    #[test]
    fn test_find_changes_preserves_order() {
        let graph = ChangeGraph::from_json_str(SAMPLE_PLAN).unwrap();

        let buckets = graph.find_changes("aws_s3_bucket");
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label(), "aws_s3_bucket.this");
        assert_eq!(buckets[1].label(), "aws_s3_bucket.logs");
        assert_eq!(buckets[1].action_summary(), "delete, create");
    }

    #[test]
    fn test_find_changes_missing_type_is_empty() {
        let graph = ChangeGraph::from_json_str(SAMPLE_PLAN).unwrap();
        assert!(graph.find_changes("aws_kms_key").is_empty());
    }

    #[test]
    fn test_find_changes_is_pure() {
        let graph = ChangeGraph::from_json_str(SAMPLE_PLAN).unwrap();
        let snapshot = graph.clone();

        let first = graph.find_changes("aws_s3_bucket");
        let second = graph.find_changes("aws_s3_bucket");
        assert_eq!(first, second);
        assert_eq!(graph, snapshot);
    }

    #[test]
    fn test_missing_resource_changes_means_empty_plan() {
        let graph = ChangeGraph::from_json_str(r#"{ "format_version": "1.2" }"#).unwrap();
        assert!(graph.is_empty());
        assert!(graph.resource_types().is_empty());
    }

    #[test]
    fn test_rejects_non_plan_json() {
        assert!(ChangeGraph::from_json_str("not json").is_err());
        assert!(ChangeGraph::from_json_str(r#"{ "resource_changes": [{ "change": {} }] }"#).is_err());
    }

    #[test]
    fn test_unrecognized_action() {
        let graph = ChangeGraph::from_json_str(
            r#"{ "resource_changes": [{ "type": "x", "change": { "actions": ["forget"] } }] }"#,
        )
        .unwrap();
        assert_eq!(graph.resource_changes()[0].change.actions, vec![ChangeAction::Other]);
    }

    #[test]
    fn test_attribute_after_versioning_status() {
        let graph = ChangeGraph::from_json_str(SAMPLE_PLAN).unwrap();
        let versioning = graph.find_changes("aws_s3_bucket_versioning")[0];

        let status = versioning.attribute_after(&path("versioning_configuration.status"));
        assert_eq!(status.and_then(PlanValue::as_str), Some("Enabled"));
        assert!(versioning.attribute_after(&path("versioning_configuration.mfa_delete")).is_none());
    }

    #[test]
    fn test_after_field_presence() {
        let graph = ChangeGraph::from_json_str(
            r#"{ "resource_changes": [
                { "type": "aws_iam_role", "change": { "actions": ["delete"], "before": { "name": "old" }, "after": null } },
                { "type": "aws_iam_role", "change": { "actions": ["no-op"] } }
            ] }"#,
        )
        .unwrap();

        let destroyed = &graph.resource_changes()[0];
        assert!(destroyed.change.after_present);
        assert!(destroyed.change.after.is_null());

        let bare = &graph.resource_changes()[1];
        assert!(!bare.change.after_present);
    }

    #[test]
    fn test_null_attribute_is_absent() {
        let rc = ResourceChange::new(
            "aws_iam_role",
            PlanValue::from_json(json!({ "description": null, "name": "ci" })),
        );
        assert!(rc.attribute_after(&path("description")).is_none());
        assert!(rc.attribute_after(&path("name")).is_some());
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = ChangeGraph::from_json_str(SAMPLE_PLAN).unwrap();
        let b = ChangeGraph::from_json_str(SAMPLE_PLAN).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let other = ChangeGraph::from_changes(vec![ResourceChange::new(
            "aws_s3_bucket",
            PlanValue::from_json(json!({ "bucket": "secure-dev" })),
        )]);
        assert_ne!(a.fingerprint(), other.fingerprint());
    }

    #[test]
    fn test_resource_types_first_seen_order() {
        let graph = ChangeGraph::from_json_str(SAMPLE_PLAN).unwrap();
        assert_eq!(graph.resource_types(), vec!["aws_s3_bucket", "aws_s3_bucket_versioning"]);
    }
}
