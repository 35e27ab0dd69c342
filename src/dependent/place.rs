//! Locset-scoped assignments: probes, spike detectors and current clamps.

use serde::{Deserialize, Serialize};

use crate::dependent::Status;

/// Quantity sampled by a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ion", rename_all = "snake_case")]
pub enum ProbeVariable {
    /// Membrane voltage.
    Voltage,
    /// Axial current.
    AxialCurrent,
    /// Total transmembrane current.
    MembraneCurrent,
    /// Transmembrane current of one ion species.
    IonCurrent(String),
    /// Internal concentration of one ion species.
    IonInternalConcentration(String),
    /// External concentration of one ion species.
    IonExternalConcentration(String),
}

impl ProbeVariable {
    /// Ion species the variable refers to, if any.
    #[must_use]
    pub fn ion(&self) -> Option<&str> {
        match self {
            Self::IonCurrent(ion)
            | Self::IonInternalConcentration(ion)
            | Self::IonExternalConcentration(ion) => Some(ion),
            Self::Voltage | Self::AxialCurrent | Self::MembraneCurrent => None,
        }
    }
}

/// A sampler placed on a named locset.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    /// Name of the locset sampled.
    pub locset: String,
    /// Sampled quantity.
    pub variable: ProbeVariable,
    /// Sampling frequency (kHz).
    pub frequency: f64,
    /// Validity, kept current by propagation.
    pub status: Status,
}

impl Probe {
    /// Unvalidated probe on the locset named `locset`.
    pub fn new(locset: impl Into<String>, variable: ProbeVariable, frequency: f64) -> Self {
        Self {
            locset: locset.into(),
            variable,
            frequency,
            status: Status::default(),
        }
    }

    pub(crate) fn check(&self, ion_known: impl Fn(&str) -> bool) -> Option<String> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Some("sampling frequency must be positive".to_string());
        }
        match self.variable.ion() {
            Some(ion) if !ion_known(ion) => Some(format!("unknown ion '{ion}'")),
            _ => None,
        }
    }
}

/// A threshold spike detector placed on a named locset.
#[derive(Debug, Clone, PartialEq)]
pub struct Detector {
    /// Name of the locset watched.
    pub locset: String,
    /// Threshold (mV).
    pub threshold: f64,
    /// Validity, kept current by propagation.
    pub status: Status,
}

impl Detector {
    /// Unvalidated detector on the locset named `locset`.
    pub fn new(locset: impl Into<String>, threshold: f64) -> Self {
        Self {
            locset: locset.into(),
            threshold,
            status: Status::default(),
        }
    }

    pub(crate) fn check(&self) -> Option<String> {
        (!self.threshold.is_finite()).then(|| "threshold must be finite".to_string())
    }
}

/// One point of a current-clamp envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    /// Time (ms).
    pub time: f64,
    /// Amplitude (nA).
    pub amplitude: f64,
}

/// A current clamp placed on a named locset.
#[derive(Debug, Clone, PartialEq)]
pub struct Stimulus {
    /// Name of the locset injected into.
    pub locset: String,
    /// Oscillation frequency (kHz); zero for a plain envelope.
    pub frequency: f64,
    /// Oscillation phase (rad).
    pub phase: f64,
    /// Amplitude envelope; times must not decrease.
    pub envelope: Vec<EnvelopePoint>,
    /// Validity, kept current by propagation.
    pub status: Status,
}

impl Stimulus {
    /// Unvalidated, non-oscillating clamp on the locset named `locset`.
    pub fn new(locset: impl Into<String>, envelope: Vec<EnvelopePoint>) -> Self {
        Self {
            locset: locset.into(),
            frequency: 0.0,
            phase: 0.0,
            envelope,
            status: Status::default(),
        }
    }

    pub(crate) fn check(&self) -> Option<String> {
        if !(self.frequency.is_finite() && self.frequency >= 0.0) || !self.phase.is_finite() {
            return Some("frequency and phase must be finite, frequency non-negative".to_string());
        }
        if self
            .envelope
            .iter()
            .any(|p| !p.time.is_finite() || !p.amplitude.is_finite())
        {
            return Some("envelope values must be finite".to_string());
        }
        if self.envelope.windows(2).any(|w| w[1].time < w[0].time) {
            return Some("envelope times must be non-decreasing".to_string());
        }
        None
    }
}
