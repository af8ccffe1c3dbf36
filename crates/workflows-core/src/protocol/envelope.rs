//! Inbound script-message protocol.
//!
//! The embedded page reports progress by posting a message on a named
//! channel.  Each message body is a JSON object with two fields:
//!
//! ```json
//! {"entity": "step",     "value": {"id": "s1", "done": true}}
//! {"entity": "workflow", "value": {"id": "wf-1", "status": "completed"}}
//! ```
//!
//! # Dispatch rule
//!
//! `entity == "step"` selects the [`Step`] shape.  Every other string,
//! including `"workflow"` and names this host has never heard of, selects the
//! [`Workflow`] shape.  Pages released after this host may add new entity
//! names; routing them to the workflow path keeps those hosts receiving
//! updates instead of silently losing them.
//!
//! # Normalisation
//!
//! Web views hand over message bodies as whatever native structure their
//! platform uses.  The `value` is re-serialized to a canonical JSON string
//! and decoded from that string, so the entity decoder only ever sees one
//! representation.
//!
//! Every step is fallible.  A malformed message yields an
//! [`EnvelopeError`]; it never panics.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::domain::config::DecodingOptions;
use crate::domain::entities::{Entity, Step, Workflow};

/// Channel name shared by the embedded page script and the host bridge.
pub const CHANNEL_NAME: &str = "workflowsWebview";

/// A message as delivered by a rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptMessage {
    /// Channel the page posted on.
    pub channel: String,
    /// The posted body, already converted to JSON by the surface.
    pub body: Value,
}

impl ScriptMessage {
    pub fn new(channel: impl Into<String>, body: Value) -> Self {
        Self {
            channel: channel.into(),
            body,
        }
    }
}

/// Which entity shape an envelope's discriminant selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Step,
    Workflow,
}

impl EntityKind {
    /// Maps the `entity` discriminant to a shape.
    ///
    /// Only `"step"` maps to [`EntityKind::Step`]; anything else maps to
    /// [`EntityKind::Workflow`].
    pub fn from_discriminant(entity: &str) -> Self {
        if entity == Step::NAME {
            EntityKind::Step
        } else {
            EntityKind::Workflow
        }
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Step(Step),
    Workflow(Workflow),
}

impl InboundEvent {
    pub fn kind(&self) -> EntityKind {
        match self {
            InboundEvent::Step(_) => EntityKind::Step,
            InboundEvent::Workflow(_) => EntityKind::Workflow,
        }
    }
}

/// Reasons an inbound message could not be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The message body is not a JSON object.
    #[error("message body is not an object")]
    NotAnObject,

    /// The body has no `entity` field.
    #[error("message has no `entity` field")]
    MissingEntity,

    /// The `entity` field is not a string.
    #[error("message `entity` field is not a string")]
    EntityNotString,

    /// The body has no `value` field.
    #[error("message has no `value` field")]
    MissingValue,

    /// The `value` could not be turned back into a JSON string.
    #[error("could not re-serialize message value: {0}")]
    Reserialize(String),

    /// The `value` does not match the selected entity shape.
    #[error("could not decode {entity}: {reason}")]
    Decode { entity: &'static str, reason: String },

    /// Strict decoding is on and the `value` has fields the entity does not
    /// model.
    #[error("{entity} has unknown fields: {}", .fields.join(", "))]
    UnknownFields {
        entity: &'static str,
        fields: Vec<String>,
    },
}

/// Decodes a raw message body into an [`InboundEvent`].
///
/// # Errors
///
/// Returns an [`EnvelopeError`] describing the first problem found.  The
/// caller is expected to log it and drop the message.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use workflows_core::{decode_message, DecodingOptions, InboundEvent};
///
/// let body = json!({"entity": "step", "value": {"id": "s1", "done": true}});
/// match decode_message(&body, &DecodingOptions::default()).unwrap() {
///     InboundEvent::Step(step) => assert_eq!(step.id, "s1"),
///     other => panic!("expected a step, got {other:?}"),
/// }
/// ```
pub fn decode_message(body: &Value, options: &DecodingOptions) -> Result<InboundEvent, EnvelopeError> {
    let envelope = body.as_object().ok_or(EnvelopeError::NotAnObject)?;

    let entity = match envelope.get("entity") {
        None => return Err(EnvelopeError::MissingEntity),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(EnvelopeError::EntityNotString),
    };
    let value = envelope.get("value").ok_or(EnvelopeError::MissingValue)?;

    let json = serde_json::to_string(value).map_err(|e| EnvelopeError::Reserialize(e.to_string()))?;

    match EntityKind::from_discriminant(entity) {
        EntityKind::Step => decode_entity::<Step>(&json, options).map(InboundEvent::Step),
        EntityKind::Workflow => {
            if entity != Workflow::NAME {
                debug!("unrecognised entity `{entity}`; decoding as {}", Workflow::NAME);
            }
            decode_entity::<Workflow>(&json, options).map(InboundEvent::Workflow)
        }
    }
}

/// Decodes a JSON string into an entity, applying the unknown-field policy.
///
/// # Errors
///
/// - [`EnvelopeError::Decode`] if the JSON does not fit the entity.
/// - [`EnvelopeError::UnknownFields`] if `options.ignore_unknown_fields` is
///   `false` and the JSON carries fields the entity (or a nested step) does
///   not model.
pub fn decode_entity<T: Entity>(json: &str, options: &DecodingOptions) -> Result<T, EnvelopeError> {
    let entity: T = serde_json::from_str(json).map_err(|e| EnvelopeError::Decode {
        entity: T::NAME,
        reason: e.to_string(),
    })?;

    if !options.ignore_unknown_fields {
        let fields = entity.unknown_field_paths();
        if !fields.is_empty() {
            return Err(EnvelopeError::UnknownFields {
                entity: T::NAME,
                fields,
            });
        }
    }

    Ok(entity)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
