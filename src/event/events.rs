//! Mutation intents and their envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::IonInfo;
use crate::dependent::{EnvelopePoint, IonParameters, ParameterSet, ProbeVariable};
use crate::id::Id;
use crate::render::Rgba;

/// Envelope around every queued event.
///
/// Carries a request id and timestamp so a pass can be correlated with the
/// UI interaction that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Correlation id of the request.
    pub request_id: Uuid,
    /// Enqueue time.
    pub issued_at: DateTime<Utc>,
    /// The mutation itself.
    pub event: Event,
}

impl Intent {
    /// Wraps `event` with a fresh request id.
    #[must_use]
    pub fn new(event: Event) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            issued_at: Utc::now(),
            event,
        }
    }
}

/// Partial edit of a definition. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEdit {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New expression text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl DefinitionEdit {
    /// Edit that only replaces the text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            name: None,
            text: Some(text.into()),
        }
    }

    /// Edit that only renames.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            text: None,
        }
    }
}

/// One structural mutation requested by the presentation layer.
///
/// Identifiers of new entities are issued at enqueue time, so follow-up
/// events can refer to an entity before the pass that creates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum Event {
    /// Create a region definition.
    AddRegion { id: Id, name: String, text: String },
    /// Rename a region or replace its text.
    UpdateRegion { id: Id, edit: DefinitionEdit },
    /// Mark a region for removal.
    DeleteRegion { id: Id },

    /// Create a locset definition.
    AddLocset { id: Id, name: String, text: String },
    /// Rename a locset or replace its text.
    UpdateLocset { id: Id, edit: DefinitionEdit },
    /// Mark a locset for removal.
    DeleteLocset { id: Id },

    /// Create an iexpr definition.
    AddIexpr { id: Id, name: String, text: String },
    /// Rename an iexpr or replace its text.
    UpdateIexpr { id: Id, edit: DefinitionEdit },
    /// Mark an iexpr for removal.
    DeleteIexpr { id: Id },

    /// Register an ion species.
    AddIon { id: Id, name: String, defaults: IonInfo },
    /// Replace an ion's defaults.
    UpdateIon { id: Id, defaults: IonInfo },
    /// Remove an ion species and its overrides.
    DeleteIon { id: Id },

    /// Set the ion parameters of one region.
    SetIonOverride { region: Id, ion: Id, values: IonParameters },
    /// Drop the ion parameters of one region.
    ClearIonOverride { region: Id, ion: Id },

    /// Set the electrical parameters of one region.
    SetRegionParameters { region: Id, values: ParameterSet },
    /// Drop the electrical parameters of one region.
    ClearRegionParameters { region: Id },
    /// Replace the cell-wide defaults.
    SetDefaultParameters { values: ParameterSet },

    /// Paint a mechanism on a named region.
    AddMechanism { id: Id, region: String, mechanism: String },
    /// Relink a mechanism or swap its catalog entry.
    UpdateMechanism {
        id: Id,
        region: Option<String>,
        mechanism: Option<String>,
    },
    /// Mark a mechanism for removal.
    DeleteMechanism { id: Id },
    /// Set one mechanism parameter.
    SetMechanismParam { mechanism: Id, name: String, value: f64 },
    /// Drop one mechanism parameter.
    ClearMechanismParam { mechanism: Id, name: String },

    /// Place a probe on a named locset.
    AddProbe {
        id: Id,
        locset: String,
        variable: ProbeVariable,
        frequency: f64,
    },
    /// Edit a probe.
    UpdateProbe {
        id: Id,
        locset: Option<String>,
        variable: Option<ProbeVariable>,
        frequency: Option<f64>,
    },
    /// Mark a probe for removal.
    DeleteProbe { id: Id },

    /// Place a spike detector on a named locset.
    AddDetector { id: Id, locset: String, threshold: f64 },
    /// Edit a detector.
    UpdateDetector {
        id: Id,
        locset: Option<String>,
        threshold: Option<f64>,
    },
    /// Mark a detector for removal.
    DeleteDetector { id: Id },

    /// Place a current clamp on a named locset.
    AddStimulus {
        id: Id,
        locset: String,
        frequency: f64,
        phase: f64,
        envelope: Vec<EnvelopePoint>,
    },
    /// Edit a stimulus.
    UpdateStimulus {
        id: Id,
        locset: Option<String>,
        frequency: Option<f64>,
        phase: Option<f64>,
        envelope: Option<Vec<EnvelopePoint>>,
    },
    /// Mark a stimulus for removal.
    DeleteStimulus { id: Id },

    /// Show or hide a renderable.
    SetVisible { id: Id, visible: bool },
    /// Recolor a renderable.
    SetColor { id: Id, color: Rgba },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_works() {
        let intent = Intent::new(Event::UpdateStimulus {
            id: Id::next(),
            locset: Some("center".to_string()),
            frequency: None,
            phase: None,
            envelope: Some(vec![EnvelopePoint { time: 1.0, amplitude: 0.2 }]),
        });
        let json = serde_json::to_string_pretty(&intent).unwrap();
        assert!(json.contains("\"op\": \"update_stimulus\""));
        let decoded: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(intent, decoded);
    }
}
