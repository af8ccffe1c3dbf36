//! Domain entities reported by the embedded workflow UI.
//!
//! The backend owns the schema for [`Workflow`] and [`Step`]; the host only
//! needs a handful of well-known fields.  Every other field the page sends is
//! kept verbatim in the entity's `extra` map, so decoding is lossless and
//! re-serializing an entity reproduces what the page reported.
//!
//! # JSON shape
//!
//! Field names follow the backend's lowerCamelCase JSON convention.  The
//! snake_case spelling is accepted as an alias for multi-word fields because
//! older page builds emit it.
//!
//! ```json
//! {"id":"wf-1","name":"KYC","status":"in_progress","steps":[{"id":"s1","done":true}]}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Status string carried by a workflow.
///
/// Only `"pristine"` has meaning to the host (a workflow that has never been
/// started and may be loaded); every other value is passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowStatus(String);

impl WorkflowStatus {
    /// The status of a workflow that has not been started yet.
    pub const PRISTINE: &'static str = "pristine";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    /// `true` when the workflow may be loaded into a surface.
    pub fn is_pristine(&self) -> bool {
        self.0 == Self::PRISTINE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Common behaviour of the two entity shapes the bridge decodes.
pub trait Entity: DeserializeOwned {
    /// Name used in log lines and decode errors.
    const NAME: &'static str;

    /// Paths of fields present in the JSON that this entity does not model,
    /// including those of nested entities (`steps[0].bogus`).  Sorted.
    fn unknown_field_paths(&self) -> Vec<String>;
}

/// Treats an explicit `null` for a known field as that field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn extra_keys<'a>(prefix: &str, extra: &'a Map<String, Value>) -> impl Iterator<Item = String> + 'a {
    let prefix = prefix.to_string();
    extra.keys().map(move |key| format!("{prefix}{key}"))
}

/// A workflow instance as reported by the embedded UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Workflow {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: WorkflowStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Workflow {
    const NAME: &'static str = "workflow";

    fn unknown_field_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = extra_keys("", &self.extra).collect();
        for (index, step) in self.steps.iter().enumerate() {
            paths.extend(extra_keys(&format!("steps[{index}]."), &step.extra));
        }
        paths.sort();
        paths
    }
}

/// A single unit of progress inside a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Step {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(alias = "workflow_id", deserialize_with = "null_as_default")]
    pub workflow_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub done: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Step {
    const NAME: &'static str = "step";

    fn unknown_field_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = extra_keys("", &self.extra).collect();
        paths.sort();
        paths
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_decodes_known_fields() {
        // Arrange
        let json = r#"{"id":"s1","workflowId":"wf-1","done":true}"#;

        // Act
        let step: Step = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(step.id, "s1");
        assert_eq!(step.workflow_id, "wf-1");
        assert!(step.done);
        assert!(step.extra.is_empty());
    }

    #[test]
    fn test_step_accepts_snake_case_workflow_id() {
        let step: Step = serde_json::from_str(r#"{"id":"s1","workflow_id":"wf-9"}"#).unwrap();
        assert_eq!(step.workflow_id, "wf-9");
    }

    #[test]
    fn test_unknown_fields_are_kept_in_extra() {
        // Arrange: `score` and `meta` are not modelled by Step
        let json = r#"{"id":"s1","score":42,"meta":{"a":[1,2]}}"#;

        // Act
        let step: Step = serde_json::from_str(json).unwrap();

        // Assert: nothing is lost
        assert_eq!(step.unknown_field_paths(), vec!["meta".to_string(), "score".to_string()]);
        assert_eq!(step.extra["score"], 42);
        assert_eq!(step.extra["meta"]["a"][1], 2);
    }

    #[test]
    fn test_workflow_with_nested_steps() {
        let json = r#"{
            "id": "wf-1",
            "name": "Onboarding",
            "status": "in_progress",
            "steps": [{"id": "s1", "done": true}, {"id": "s2"}]
        }"#;

        let workflow: Workflow = serde_json::from_str(json).unwrap();

        assert_eq!(workflow.status.as_str(), "in_progress");
        assert!(!workflow.status.is_pristine());
        assert_eq!(workflow.steps.len(), 2);
        assert!(workflow.steps[0].done);
        assert!(!workflow.steps[1].done);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let workflow: Workflow = serde_json::from_str("{}").unwrap();
        assert_eq!(workflow, Workflow::default());
    }

    #[test]
    fn test_null_known_fields_take_defaults() {
        // Arrange: explicit nulls for modelled fields
        let json = r#"{"id":null,"workflowId":null,"done":null,"status":null}"#;

        // Act
        let step: Step = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(step, Step::default());
    }

    #[test]
    fn test_null_steps_and_status_on_workflow() {
        let workflow: Workflow =
            serde_json::from_str(r#"{"id":"wf-1","status":null,"steps":null}"#).unwrap();
        assert_eq!(workflow.id, "wf-1");
        assert_eq!(workflow.status.as_str(), "");
        assert!(workflow.steps.is_empty());
        assert!(workflow.extra.is_empty());
    }

    #[test]
    fn test_workflow_reports_nested_unknown_fields() {
        let json = r#"{"id":"wf","extra1":1,"steps":[{"id":"s1"},{"id":"s2","bogus":1}]}"#;

        let workflow: Workflow = serde_json::from_str(json).unwrap();

        assert_eq!(
            workflow.unknown_field_paths(),
            vec!["extra1".to_string(), "steps[1].bogus".to_string()]
        );
    }

    #[test]
    fn test_mistyped_known_field_is_an_error() {
        // `done` must be a boolean
        let result: Result<Step, _> = serde_json::from_str(r#"{"id":"s1","done":"yes"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_reserialized_step_keeps_unknown_fields() {
        let step: Step = serde_json::from_str(r#"{"id":"s1","color":"red"}"#).unwrap();
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["color"], "red");
        assert_eq!(json["id"], "s1");
    }

    #[test]
    fn test_pristine_status() {
        assert!(WorkflowStatus::new("pristine").is_pristine());
        assert!(!WorkflowStatus::new("used").is_pristine());
        assert_eq!(WorkflowStatus::new("used").to_string(), "used");
    }
}
