//! Read-only catalog of mechanisms and ion species.
//!
//! Built once at startup and shared by reference with the engine; nothing
//! mutates it afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Mechanism '{mechanism}' lists unknown ion '{ion}'")]
    UnknownIon { mechanism: String, ion: String },

    #[error("Catalog entry name cannot be empty")]
    EmptyName,
}

/// Where a mechanism can be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    /// Painted over a region.
    Density,
    /// Placed at discrete locations.
    Point,
}

/// Catalog description of one mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanismInfo {
    /// Density or point mechanism.
    pub kind: MechanismKind,
    /// Parameter name -> default value.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    /// Ions read or written by the mechanism.
    #[serde(default)]
    pub ions: Vec<String>,
}

/// How the reversal potential of an ion is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevPotMethod {
    /// Fixed reversal potential.
    #[default]
    Constant,
    /// Reversal potential from the Nernst equation.
    Nernst,
}

/// Default properties of an ion species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonInfo {
    /// Valence.
    pub charge: i32,
    /// Internal concentration (mM).
    pub int_concentration: f64,
    /// External concentration (mM).
    pub ext_concentration: f64,
    /// Reversal potential (mV).
    pub reversal_potential: f64,
    /// How the reversal potential is determined.
    #[serde(default)]
    pub method: RevPotMethod,
}

/// Mechanisms and ions known to the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Mechanisms by name.
    #[serde(default)]
    pub mechanisms: BTreeMap<String, MechanismInfo>,
    /// Ion species by name.
    #[serde(default)]
    pub ions: BTreeMap<String, IonInfo>,
}

fn params(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

fn density(pairs: &[(&str, f64)], ions: &[&str]) -> MechanismInfo {
    MechanismInfo {
        kind: MechanismKind::Density,
        parameters: params(pairs),
        ions: ions.iter().map(|s| (*s).to_string()).collect(),
    }
}

fn point(pairs: &[(&str, f64)]) -> MechanismInfo {
    MechanismInfo {
        kind: MechanismKind::Point,
        parameters: params(pairs),
        ions: Vec::new(),
    }
}

impl Catalog {
    /// The built-in catalog: a handful of standard channels and synapses plus
    /// sodium, potassium and calcium.
    #[must_use]
    pub fn default_catalog() -> Self {
        let mut mechanisms = BTreeMap::new();
        mechanisms.insert("pas".to_string(), density(&[("g", 0.001), ("e", -70.0)], &[]));
        mechanisms.insert(
            "hh".to_string(),
            density(
                &[("gnabar", 0.12), ("gkbar", 0.036), ("gl", 0.0003), ("el", -54.3)],
                &["na", "k"],
            ),
        );
        mechanisms.insert("nax".to_string(), density(&[("gbar", 0.01), ("sh", 5.0)], &["na"]));
        mechanisms.insert("kdrmt".to_string(), density(&[("gbar", 0.002), ("vhalfn", 13.0)], &["k"]));
        mechanisms.insert("kamt".to_string(), density(&[("gbar", 0.002), ("vhalfn", -33.6)], &["k"]));
        mechanisms.insert("expsyn".to_string(), point(&[("tau", 2.0), ("e", 0.0)]));
        mechanisms.insert("exp2syn".to_string(), point(&[("tau1", 0.5), ("tau2", 2.0), ("e", 0.0)]));

        let mut ions = BTreeMap::new();
        ions.insert(
            "na".to_string(),
            IonInfo {
                charge: 1,
                int_concentration: 10.0,
                ext_concentration: 140.0,
                reversal_potential: 50.0,
                method: RevPotMethod::Constant,
            },
        );
        ions.insert(
            "k".to_string(),
            IonInfo {
                charge: 1,
                int_concentration: 54.4,
                ext_concentration: 2.5,
                reversal_potential: -77.0,
                method: RevPotMethod::Constant,
            },
        );
        ions.insert(
            "ca".to_string(),
            IonInfo {
                charge: 2,
                int_concentration: 5e-5,
                ext_concentration: 2.0,
                reversal_potential: 132.457_934_86,
                method: RevPotMethod::Nernst,
            },
        );

        Self { mechanisms, ions }
    }

    /// Loads and validates a catalog from JSON.
    ///
    /// # Errors
    /// Malformed JSON, empty names, or mechanisms depending on undeclared ions.
    pub fn from_json(s: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(s)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks internal consistency.
    ///
    /// # Errors
    /// See [`CatalogError`].
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.mechanisms.keys().chain(self.ions.keys()).any(|k| k.trim().is_empty()) {
            return Err(CatalogError::EmptyName);
        }
        for (name, mech) in &self.mechanisms {
            if let Some(ion) = mech.ions.iter().find(|ion| !self.ions.contains_key(*ion)) {
                return Err(CatalogError::UnknownIon {
                    mechanism: name.clone(),
                    ion: ion.clone(),
                });
            }
        }
        Ok(())
    }

    /// Catalog entry of the mechanism called `name`.
    #[must_use]
    pub fn mechanism(&self, name: &str) -> Option<&MechanismInfo> {
        self.mechanisms.get(name)
    }

    /// Defaults of the ion species called `name`.
    #[must_use]
    pub fn ion(&self, name: &str) -> Option<&IonInfo> {
        self.ions.get(name)
    }
}
