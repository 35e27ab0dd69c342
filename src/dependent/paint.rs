//! Region-scoped assignments: mechanisms, parameters and ion overrides.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, IonInfo, MechanismKind};
use crate::dependent::Status;

/// A mechanism painted onto a named region.
///
/// Parameter overrides are stored as children of the assignment; see
/// [`ParamValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct MechanismAssignment {
    /// Name of the region painted on.
    pub region: String,
    /// Catalog name of the mechanism.
    pub mechanism: String,
    /// Validity, kept current by propagation.
    pub status: Status,
}

impl MechanismAssignment {
    /// Unvalidated assignment of `mechanism` to the region named `region`.
    pub fn new(region: impl Into<String>, mechanism: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            mechanism: mechanism.into(),
            status: Status::default(),
        }
    }

    /// Catalog problems with this assignment, if any.
    ///
    /// `ion_known` tells whether the model still has an ion species.
    pub(crate) fn check<'a>(
        &self,
        catalog: &Catalog,
        mut params: impl Iterator<Item = &'a ParamValue>,
        ion_known: impl Fn(&str) -> bool,
    ) -> Option<String> {
        let Some(info) = catalog.mechanism(&self.mechanism) else {
            return Some(format!("unknown mechanism '{}'", self.mechanism));
        };
        if info.kind != MechanismKind::Density {
            return Some(format!("mechanism '{}' is not a density mechanism", self.mechanism));
        }
        if let Some(ion) = info.ions.iter().find(|ion| !ion_known(ion.as_str())) {
            return Some(format!("mechanism '{}' needs missing ion '{ion}'", self.mechanism));
        }
        params
            .find(|p| !info.parameters.contains_key(&p.name) || !p.value.is_finite())
            .map(|p| {
                if info.parameters.contains_key(&p.name) {
                    format!("parameter '{}' must be finite", p.name)
                } else {
                    format!("unknown parameter '{}' for mechanism '{}'", p.name, self.mechanism)
                }
            })
    }
}

/// Override of one mechanism parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamValue {
    /// Parameter name as listed in the catalog.
    pub name: String,
    /// Overriding value.
    pub value: f64,
}

/// Electrical properties; `None` inherits the cell-wide default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Temperature (K).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Initial membrane potential (mV).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membrane_potential: Option<f64>,
    /// Axial resistivity (Ω·cm).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axial_resistivity: Option<f64>,
    /// Membrane capacitance (F/m²).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membrane_capacitance: Option<f64>,
}

impl ParameterSet {
    /// Arbor's cell-wide defaults.
    #[must_use]
    pub const fn cell_defaults() -> Self {
        Self {
            temperature: Some(279.45),
            membrane_potential: Some(-65.0),
            axial_resistivity: Some(35.4),
            membrane_capacitance: Some(0.01),
        }
    }

    pub(crate) fn check(&self) -> Option<String> {
        let fields = [
            ("temperature", self.temperature),
            ("membrane potential", self.membrane_potential),
            ("axial resistivity", self.axial_resistivity),
            ("membrane capacitance", self.membrane_capacitance),
        ];
        for (name, value) in fields {
            match value {
                Some(v) if !v.is_finite() => return Some(format!("{name} must be finite")),
                Some(v) if v < 0.0 && name != "membrane potential" => {
                    return Some(format!("{name} must not be negative"));
                }
                _ => {}
            }
        }
        None
    }
}

/// Parameter overrides of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionParameters {
    /// Overrides; unset fields inherit the defaults.
    pub values: ParameterSet,
    /// Follows the region's state.
    pub status: Status,
}

/// An ion species available to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct IonSpecies {
    /// Species name, e.g. `na`.
    pub name: String,
    /// Species defaults used where no override applies.
    pub defaults: IonInfo,
}

/// Ion property overrides; `None` inherits the species default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IonParameters {
    /// Internal concentration (mM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_concentration: Option<f64>,
    /// External concentration (mM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext_concentration: Option<f64>,
    /// Reversal potential (mV).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversal_potential: Option<f64>,
}

impl IonParameters {
    pub(crate) fn check(&self) -> Option<String> {
        for (name, value) in [
            ("internal concentration", self.int_concentration),
            ("external concentration", self.ext_concentration),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Some(format!("{name} must be a non-negative number"));
                }
            }
        }
        match self.reversal_potential {
            Some(v) if !v.is_finite() => Some("reversal potential must be finite".to_string()),
            _ => None,
        }
    }
}

/// Ion overrides of one region x ion pair.
#[derive(Debug, Clone, PartialEq)]
pub struct IonOverride {
    /// Overrides; unset fields inherit the species defaults.
    pub values: IonParameters,
    /// Follows the region's state.
    pub status: Status,
}
