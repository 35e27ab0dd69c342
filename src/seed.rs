//! Named definitions handed over by morphology loaders.

use serde::{Deserialize, Serialize};

/// Regions and locsets a loader suggests for a freshly opened morphology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    /// `(name, text)` region definitions.
    #[serde(default)]
    pub regions: Vec<(String, String)>,
    /// `(name, text)` locset definitions.
    #[serde(default)]
    pub locsets: Vec<(String, String)>,
}

impl Seed {
    /// Standard SWC structure identifiers plus root and terminal points.
    #[must_use]
    pub fn swc_default() -> Self {
        let pair = |n: &str, t: &str| (n.to_string(), t.to_string());
        Self {
            regions: vec![
                pair("soma", "(tag 1)"),
                pair("axon", "(tag 2)"),
                pair("dend", "(tag 3)"),
                pair("apic", "(tag 4)"),
            ],
            locsets: vec![pair("root", "(root)"), pair("terminal", "(terminal)")],
        }
    }

    /// True if the loader suggested nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.locsets.is_empty()
    }
}
