//! Saved model documents.
//!
//! A document stores everything the user typed so it can be replayed into a
//! fresh engine. Dependents that link by name keep their names; records that
//! belong to one particular region, locset or ion refer to it by position in
//! the matching list, since names need not be unique. Evaluated data, renderable payloads and
//! statuses are derived and never saved; display attributes are.
//!
//! The content is fingerprinted with BLAKE3 over its compact JSON encoding.
//! Loading recomputes the fingerprint and rejects any mismatch.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::IonInfo;
use crate::definition::DefKind;
use crate::dependent::{EnvelopePoint, IonParameters, ParamValue, ParameterSet, ProbeVariable};
use crate::error::DocumentError;
use crate::render::Rgba;

/// Current document format.
pub const FORMAT_VERSION: u32 = 2;

/// Name and expression text of one definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedText {
    /// Definition name.
    pub name: String,
    /// Expression text.
    pub text: String,
}

/// An ion species with its defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonRecord {
    /// Species name.
    pub name: String,
    /// Species defaults.
    pub defaults: IonInfo,
}

/// Electrical parameters set on one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionParametersRecord {
    /// Index into [`DocumentContent::regions`].
    pub region: usize,
    /// Parameter values.
    pub values: ParameterSet,
}

/// Ion parameters set on one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonOverrideRecord {
    /// Index into [`DocumentContent::regions`].
    pub region: usize,
    /// Index into [`DocumentContent::ions`].
    pub ion: usize,
    /// Parameter values.
    pub values: IonParameters,
}

/// A mechanism assignment with its parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanismRecord {
    /// Linked region name.
    pub region: String,
    /// Catalog name.
    pub mechanism: String,
    /// Parameter overrides in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamValue>,
}

/// A probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    /// Linked locset name.
    pub locset: String,
    /// Sampled quantity.
    pub variable: ProbeVariable,
    /// Sampling frequency (kHz).
    pub frequency: f64,
}

/// A spike detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorRecord {
    /// Linked locset name.
    pub locset: String,
    /// Threshold (mV).
    pub threshold: f64,
}

/// A current clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusRecord {
    /// Linked locset name.
    pub locset: String,
    /// Oscillation frequency (kHz).
    #[serde(default)]
    pub frequency: f64,
    /// Oscillation phase (rad).
    #[serde(default)]
    pub phase: f64,
    /// Amplitude envelope.
    pub envelope: Vec<EnvelopePoint>,
}

/// Color and visibility of the renderable of a region or locset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    /// Region or locset.
    pub kind: DefKind,
    /// Index into the `regions` or `locsets` list, per `kind`.
    pub index: usize,
    /// Draw color.
    pub color: Rgba,
    /// Visibility.
    pub visible: bool,
}

/// Everything a document stores, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentContent {
    /// Region definitions.
    pub regions: Vec<NamedText>,
    /// Locset definitions.
    pub locsets: Vec<NamedText>,
    /// Iexpr definitions.
    pub iexprs: Vec<NamedText>,
    /// Ion species.
    pub ions: Vec<IonRecord>,
    /// Cell-wide electrical defaults.
    pub default_parameters: ParameterSet,
    /// Per-region electrical parameters.
    pub region_parameters: Vec<RegionParametersRecord>,
    /// Per-region ion parameters.
    pub ion_overrides: Vec<IonOverrideRecord>,
    /// Mechanism assignments.
    pub mechanisms: Vec<MechanismRecord>,
    /// Probes.
    pub probes: Vec<ProbeRecord>,
    /// Spike detectors.
    pub detectors: Vec<DetectorRecord>,
    /// Current clamps.
    pub stimuli: Vec<StimulusRecord>,
    /// Renderable colors and visibility.
    pub display: Vec<DisplayRecord>,
}

/// Versioned, fingerprinted envelope around [`DocumentContent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format the document was written in.
    pub format_version: u32,
    /// Identifier of this save.
    pub document_id: Uuid,
    /// Save time.
    pub saved_at: DateTime<Utc>,
    /// BLAKE3 hex digest of the compact JSON encoding of `content`.
    pub fingerprint: String,
    /// The saved model.
    pub content: DocumentContent,
}

impl Document {
    /// Wraps `content` with a fresh id, timestamp and fingerprint.
    ///
    /// # Errors
    /// `DocumentError::Serialize` if the content cannot be encoded.
    pub fn new(content: DocumentContent) -> Result<Self, DocumentError> {
        Ok(Self {
            format_version: FORMAT_VERSION,
            document_id: Uuid::new_v4(),
            saved_at: Utc::now(),
            fingerprint: Self::fingerprint_of(&content)?,
            content,
        })
    }

    /// BLAKE3 hex digest of `content`.
    ///
    /// # Errors
    /// `DocumentError::Serialize` if the content cannot be encoded.
    pub fn fingerprint_of(content: &DocumentContent) -> Result<String, DocumentError> {
        let bytes = serde_json::to_vec(content).map_err(DocumentError::Serialize)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    /// Checks the format version and the fingerprint.
    ///
    /// # Errors
    /// `UnsupportedVersion` or `FingerprintMismatch`.
    pub fn verify(&self) -> Result<(), DocumentError> {
        if self.format_version != FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: self.format_version,
                expected: FORMAT_VERSION,
            });
        }
        let computed = Self::fingerprint_of(&self.content)?;
        if computed != self.fingerprint {
            return Err(DocumentError::FingerprintMismatch {
                stored: self.fingerprint.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Pretty JSON encoding.
    ///
    /// # Errors
    /// `DocumentError::Serialize` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Serialize)
    }

    /// Parses and verifies a document.
    ///
    /// # Errors
    /// Malformed JSON, or any [`verify`](Self::verify) failure.
    pub fn from_json(s: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(s).map_err(DocumentError::Deserialize)?;
        doc.verify()?;
        Ok(doc)
    }

    /// Writes the document to `path`.
    ///
    /// The bytes go to a sibling temp file that is synced and then renamed
    /// over `path`, so a crash never leaves a torn document behind.
    ///
    /// # Errors
    /// Encoding or I/O failures.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        let temp_path = path.with_extension("tmp");

        let mut writer = BufWriter::new(fs::File::create(&temp_path)?);
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        fs::rename(&temp_path, path)?;
        tracing::debug!(path = %path.display(), id = %self.document_id, "document saved");
        Ok(())
    }

    /// Reads and verifies the document at `path`.
    ///
    /// # Errors
    /// I/O failures, malformed JSON, or a failed verification.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let doc = Self::from_json(&fs::read_to_string(path)?)?;
        tracing::debug!(path = %path.display(), id = %doc.document_id, "document loaded");
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentContent {
        DocumentContent {
            regions: vec![NamedText {
                name: "soma".to_string(),
                text: "(tag 1)".to_string(),
            }],
            mechanisms: vec![MechanismRecord {
                region: "soma".to_string(),
                mechanism: "hh".to_string(),
                params: vec![ParamValue {
                    name: "gl".to_string(),
                    value: 0.0003,
                }],
            }],
            ..DocumentContent::default()
        }
    }

    #[test]
    fn fingerprint_is_stable() {
        let a = Document::fingerprint_of(&sample()).unwrap();
        let b = Document::fingerprint_of(&sample()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn json_roundtrip_verifies() {
        let doc = Document::new(sample()).unwrap();
        let back = Document::from_json(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn tampered_content_is_rejected() {
        let mut doc = Document::new(sample()).unwrap();
        doc.content.regions[0].text = "(tag 2)".to_string();
        let err = Document::from_json(&doc.to_json_pretty().unwrap()).unwrap_err();
        assert!(matches!(err, DocumentError::FingerprintMismatch { .. }));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut doc = Document::new(sample()).unwrap();
        doc.format_version = 99;
        assert!(matches!(
            doc.verify(),
            Err(DocumentError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn missing_sections_default() {
        let content: DocumentContent = serde_json::from_str(r#"{ "regions": [] }"#).unwrap();
        assert!(content.probes.is_empty());
        assert_eq!(content.default_parameters, ParameterSet::default());
    }
}
