//! Conversion between a live engine and a [`Document`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::definition::{DefKind, Definition};
use crate::dependent::{
    Detector, IonOverride, IonSpecies, MechanismAssignment, Probe, RegionParameters, Status, Stimulus,
};
use crate::document::{
    DetectorRecord, DisplayRecord, Document, DocumentContent, IonOverrideRecord, IonRecord, MechanismRecord,
    NamedText, ProbeRecord, RegionParametersRecord, StimulusRecord,
};
use crate::engine::Engine;
use crate::error::CoreResult;
use crate::evaluator::Evaluator;
use crate::id::Id;
use crate::render::{Palette, Renderable};
use crate::storage::{IndexedStore, OrderedStore};

impl<E: Evaluator> Engine<E> {
    /// Captures the user-entered model as a fingerprinted document.
    ///
    /// Entries marked for removal are left out.
    ///
    /// # Errors
    /// `CoreError::Document` if the content cannot be encoded.
    pub fn snapshot(&self) -> CoreResult<Document> {
        let region_at = positions(&self.regions);
        let ion_at: HashMap<Id, usize> = self.ions.iter().enumerate().map(|(i, (id, _))| (id, i)).collect();
        let content = DocumentContent {
            regions: named_texts(&self.regions),
            locsets: named_texts(&self.locsets),
            iexprs: named_texts(&self.iexprs),
            ions: self
                .ions
                .iter()
                .map(|(_, ion)| IonRecord {
                    name: ion.name.clone(),
                    defaults: ion.defaults.clone(),
                })
                .collect(),
            default_parameters: self.default_parameters,
            region_parameters: self
                .region_parameters
                .iter()
                .filter(|(_, p)| !p.status.is_erased())
                .filter_map(|(region, p)| {
                    Some(RegionParametersRecord {
                        region: *region_at.get(&region)?,
                        values: p.values,
                    })
                })
                .collect(),
            ion_overrides: self
                .ion_overrides
                .iter()
                .filter(|(_, o)| !o.status.is_erased())
                .filter_map(|((region, ion), o)| {
                    Some(IonOverrideRecord {
                        region: *region_at.get(&region)?,
                        ion: *ion_at.get(&ion)?,
                        values: o.values,
                    })
                })
                .collect(),
            mechanisms: self
                .mechanisms
                .iter()
                .filter(|(_, m)| !m.status.is_erased())
                .map(|(id, m)| MechanismRecord {
                    region: m.region.clone(),
                    mechanism: m.mechanism.clone(),
                    params: self.mechanism_params(id).cloned().collect(),
                })
                .collect(),
            probes: self
                .probes
                .iter()
                .filter(|(_, p)| !p.status.is_erased())
                .map(|(_, p)| ProbeRecord {
                    locset: p.locset.clone(),
                    variable: p.variable.clone(),
                    frequency: p.frequency,
                })
                .collect(),
            detectors: self
                .detectors
                .iter()
                .filter(|(_, d)| !d.status.is_erased())
                .map(|(_, d)| DetectorRecord {
                    locset: d.locset.clone(),
                    threshold: d.threshold,
                })
                .collect(),
            stimuli: self
                .stimuli
                .iter()
                .filter(|(_, s)| !s.status.is_erased())
                .map(|(_, s)| StimulusRecord {
                    locset: s.locset.clone(),
                    frequency: s.frequency,
                    phase: s.phase,
                    envelope: s.envelope.clone(),
                })
                .collect(),
            display: self.display_records(&region_at),
        };
        Ok(Document::new(content)?)
    }

    /// Rebuilds an engine from a verified document.
    ///
    /// Every definition starts out `changed`, so the next pass evaluates the
    /// whole model. Records that point past the end of the region, locset
    /// or ion lists are skipped with a warning.
    ///
    /// # Errors
    /// `CoreError::Document` if the document fails verification.
    pub fn from_document(doc: &Document, catalog: Arc<Catalog>, config: EngineConfig) -> CoreResult<Self> {
        doc.verify()?;
        let content = &doc.content;
        let mut engine = Self::empty(catalog, config);

        let mut regions = Vec::with_capacity(content.regions.len());
        for def in &content.regions {
            regions.push(engine.regions.add(Id::next(), Definition::new(def.name.clone(), def.text.clone())));
        }
        let mut locsets = Vec::with_capacity(content.locsets.len());
        for def in &content.locsets {
            locsets.push(engine.locsets.add(Id::next(), Definition::new(def.name.clone(), def.text.clone())));
        }
        for def in &content.iexprs {
            engine.iexprs.add(Id::next(), Definition::new(def.name.clone(), def.text.clone()));
        }
        let mut ions = Vec::with_capacity(content.ions.len());
        for ion in &content.ions {
            ions.push(engine.ions.add(Id::next(), IonSpecies {
                name: ion.name.clone(),
                defaults: ion.defaults.clone(),
            }));
        }
        engine.default_parameters = content.default_parameters;

        for record in &content.region_parameters {
            let Some(&region) = regions.get(record.region) else {
                tracing::warn!(region = record.region, "skipping parameters of unknown region");
                continue;
            };
            engine.region_parameters.add(region, RegionParameters {
                values: record.values,
                status: Status::default(),
            });
        }
        for record in &content.ion_overrides {
            let (Some(&region), Some(&ion)) = (regions.get(record.region), ions.get(record.ion)) else {
                tracing::warn!(region = record.region, ion = record.ion, "skipping unresolved ion override");
                continue;
            };
            engine.ion_overrides.add(region, ion, IonOverride {
                values: record.values,
                status: Status::default(),
            });
        }

        for record in &content.mechanisms {
            let id = engine
                .mechanisms
                .add(Id::next(), MechanismAssignment::new(record.region.clone(), record.mechanism.clone()));
            for param in &record.params {
                engine.mechanism_params.add(id, param.clone());
            }
        }
        for record in &content.probes {
            engine.probes.add(
                Id::next(),
                Probe::new(record.locset.clone(), record.variable.clone(), record.frequency),
            );
        }
        for record in &content.detectors {
            engine.detectors.add(Id::next(), Detector::new(record.locset.clone(), record.threshold));
        }
        for record in &content.stimuli {
            let mut stimulus = Stimulus::new(record.locset.clone(), record.envelope.clone());
            stimulus.frequency = record.frequency;
            stimulus.phase = record.phase;
            engine.stimuli.add(Id::next(), stimulus);
        }

        for record in &content.display {
            let target = match record.kind {
                DefKind::Region => regions.get(record.index),
                DefKind::Locset => locsets.get(record.index),
                DefKind::Iexpr => None,
            };
            match target {
                Some(&id) => {
                    engine.renderables.add(id, Renderable::new(record.color, record.visible));
                }
                None => tracing::warn!(kind = %record.kind, index = record.index, "skipping display of unknown definition"),
            }
        }
        // Restored renderables keep their colors; new ones continue the cycle.
        engine.palette = Palette::skipping(engine.renderables.len());

        tracing::debug!(
            id = %doc.document_id,
            regions = content.regions.len(),
            locsets = content.locsets.len(),
            "engine restored from document"
        );
        Ok(engine)
    }

    fn display_records(&self, region_at: &HashMap<Id, usize>) -> Vec<DisplayRecord> {
        let locset_at = positions(&self.locsets);
        let regions = self.regions.iter().map(|(id, _)| (DefKind::Region, id, region_at.get(&id)));
        let locsets = self.locsets.iter().map(|(id, _)| (DefKind::Locset, id, locset_at.get(&id)));
        regions
            .chain(locsets)
            .filter_map(|(kind, id, index)| {
                let renderable = self.renderables.find(id)?;
                Some(DisplayRecord {
                    kind,
                    index: *index?,
                    color: renderable.color,
                    visible: renderable.visible,
                })
            })
            .collect()
    }
}

/// Position of each saved definition in its [`named_texts`] list.
fn positions<T>(table: &OrderedStore<Definition<T>>) -> HashMap<Id, usize> {
    table
        .iter()
        .filter(|(_, def)| !def.is_erased())
        .enumerate()
        .map(|(index, (id, _))| (id, index))
        .collect()
}

fn named_texts<T>(table: &OrderedStore<Definition<T>>) -> Vec<NamedText> {
    table
        .iter()
        .filter(|(_, def)| !def.is_erased())
        .map(|(_, def)| NamedText {
            name: def.name.clone(),
            text: def.text().to_string(),
        })
        .collect()
}
