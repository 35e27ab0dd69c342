//! Step 1 of the pass: apply one drained event.

use crate::definition::Definition;
use crate::dependent::{
    Detector, IonOverride, IonSpecies, MechanismAssignment, ParamValue, Probe, RegionParameters, Status,
    Stimulus,
};
use crate::engine::Engine;
use crate::error::CoreResult;
use crate::evaluator::Evaluator;
use crate::event::{DefinitionEdit, Event};
use crate::id::Id;
use crate::render::Renderable;
use crate::storage::{IndexedStore, OrderedStore};

impl<E: Evaluator> Engine<E> {
    /// Applies `event`; returns `false` if it was dropped because it refers
    /// to an entity that no longer exists (or is being erased).
    pub(super) fn apply(&mut self, event: Event) -> CoreResult<bool> {
        tracing::trace!(?event, "applying event");
        let applied = match event {
            Event::AddRegion { id, name, text } => {
                self.regions.add(id, Definition::new(name, text));
                true
            }
            Event::UpdateRegion { id, edit } => edit_definition(&mut self.regions, id, edit),
            Event::DeleteRegion { id } => erase_definition(&mut self.regions, id),

            Event::AddLocset { id, name, text } => {
                self.locsets.add(id, Definition::new(name, text));
                true
            }
            Event::UpdateLocset { id, edit } => edit_definition(&mut self.locsets, id, edit),
            Event::DeleteLocset { id } => erase_definition(&mut self.locsets, id),

            Event::AddIexpr { id, name, text } => {
                self.iexprs.add(id, Definition::new(name, text));
                true
            }
            Event::UpdateIexpr { id, edit } => edit_definition(&mut self.iexprs, id, edit),
            Event::DeleteIexpr { id } => erase_definition(&mut self.iexprs, id),

            Event::AddIon { id, name, defaults } => {
                self.ions.add(id, IonSpecies { name, defaults });
                true
            }
            Event::UpdateIon { id, defaults } => match self.ions.find_mut(id) {
                Some(ion) => {
                    ion.defaults = defaults;
                    true
                }
                None => false,
            },
            Event::DeleteIon { id } => {
                if self.ions.contains(id) {
                    let ion = self.ions.remove(id)?;
                    let overrides = self.ion_overrides.remove_by_second(id)?;
                    tracing::debug!(%id, name = %ion.name, overrides, "ion removed");
                    true
                } else {
                    false
                }
            }

            Event::SetIonOverride { region, ion, values } => {
                if self.region_is_live(region) && self.ions.contains(ion) {
                    self.ion_overrides.add(region, ion, IonOverride {
                        values,
                        status: Status::default(),
                    });
                    true
                } else {
                    false
                }
            }
            Event::ClearIonOverride { region, ion } => match self.ion_overrides.get_mut(region, ion) {
                Ok(entry) => {
                    entry.status.mark_erase();
                    true
                }
                Err(_) => false,
            },

            Event::SetRegionParameters { region, values } => {
                if self.region_is_live(region) {
                    self.region_parameters.add(region, RegionParameters {
                        values,
                        status: Status::default(),
                    });
                    true
                } else {
                    false
                }
            }
            Event::ClearRegionParameters { region } => match self.region_parameters.find_mut(region) {
                Some(entry) => {
                    entry.status.mark_erase();
                    true
                }
                None => false,
            },
            Event::SetDefaultParameters { values } => {
                self.default_parameters = values;
                true
            }

            Event::AddMechanism { id, region, mechanism } => {
                self.mechanisms.add(id, MechanismAssignment::new(region, mechanism));
                true
            }
            Event::UpdateMechanism { id, region, mechanism } => match live(&mut self.mechanisms, id, |m| &m.status) {
                Some(entry) => {
                    if let Some(region) = region {
                        entry.region = region;
                    }
                    if let Some(mechanism) = mechanism {
                        entry.mechanism = mechanism;
                    }
                    true
                }
                None => false,
            },
            Event::DeleteMechanism { id } => erase_dependent(&mut self.mechanisms, id, |m| &mut m.status),
            Event::SetMechanismParam { mechanism, name, value } => {
                if live(&mut self.mechanisms, mechanism, |m| &m.status).is_none() {
                    false
                } else {
                    let existing = self
                        .mechanism_params
                        .values_of(mechanism)
                        .find(|(_, p)| p.name == name)
                        .map(|(child, _)| child);
                    match existing {
                        Some(child) => self.mechanism_params.get_mut(child)?.value = value,
                        None => {
                            self.mechanism_params.add(mechanism, ParamValue { name, value });
                        }
                    }
                    true
                }
            }
            Event::ClearMechanismParam { mechanism, name } => {
                let existing = self
                    .mechanism_params
                    .values_of(mechanism)
                    .find(|(_, p)| p.name == name)
                    .map(|(child, _)| child);
                match existing {
                    Some(child) => {
                        self.mechanism_params.remove(child)?;
                        true
                    }
                    None => false,
                }
            }

            Event::AddProbe {
                id,
                locset,
                variable,
                frequency,
            } => {
                self.probes.add(id, Probe::new(locset, variable, frequency));
                true
            }
            Event::UpdateProbe {
                id,
                locset,
                variable,
                frequency,
            } => match live(&mut self.probes, id, |p| &p.status) {
                Some(probe) => {
                    if let Some(locset) = locset {
                        probe.locset = locset;
                    }
                    if let Some(variable) = variable {
                        probe.variable = variable;
                    }
                    if let Some(frequency) = frequency {
                        probe.frequency = frequency;
                    }
                    true
                }
                None => false,
            },
            Event::DeleteProbe { id } => erase_dependent(&mut self.probes, id, |p| &mut p.status),

            Event::AddDetector { id, locset, threshold } => {
                self.detectors.add(id, Detector::new(locset, threshold));
                true
            }
            Event::UpdateDetector { id, locset, threshold } => match live(&mut self.detectors, id, |d| &d.status) {
                Some(detector) => {
                    if let Some(locset) = locset {
                        detector.locset = locset;
                    }
                    if let Some(threshold) = threshold {
                        detector.threshold = threshold;
                    }
                    true
                }
                None => false,
            },
            Event::DeleteDetector { id } => erase_dependent(&mut self.detectors, id, |d| &mut d.status),

            Event::AddStimulus {
                id,
                locset,
                frequency,
                phase,
                envelope,
            } => {
                let mut stimulus = Stimulus::new(locset, envelope);
                stimulus.frequency = frequency;
                stimulus.phase = phase;
                self.stimuli.add(id, stimulus);
                true
            }
            Event::UpdateStimulus {
                id,
                locset,
                frequency,
                phase,
                envelope,
            } => match live(&mut self.stimuli, id, |s| &s.status) {
                Some(stimulus) => {
                    if let Some(locset) = locset {
                        stimulus.locset = locset;
                    }
                    if let Some(frequency) = frequency {
                        stimulus.frequency = frequency;
                    }
                    if let Some(phase) = phase {
                        stimulus.phase = phase;
                    }
                    if let Some(envelope) = envelope {
                        stimulus.envelope = envelope;
                    }
                    true
                }
                None => false,
            },
            Event::DeleteStimulus { id } => erase_dependent(&mut self.stimuli, id, |s| &mut s.status),

            Event::SetVisible { id, visible } => match self.display_target(id) {
                Some(renderable) => {
                    renderable.visible = visible;
                    true
                }
                None => false,
            },
            Event::SetColor { id, color } => match self.display_target(id) {
                Some(renderable) => {
                    renderable.color = color;
                    true
                }
                None => false,
            },
        };
        Ok(applied)
    }

    fn region_is_live(&self, id: Id) -> bool {
        self.regions.find(id).is_some_and(|def| !def.is_erased())
    }

    /// Renderable of a live region or locset, created on demand so display
    /// attributes can be set before the first successful evaluation.
    fn display_target(&mut self, id: Id) -> Option<&mut Renderable> {
        let drawable = self.region_is_live(id) || self.locsets.find(id).is_some_and(|def| !def.is_erased());
        if !drawable {
            return None;
        }
        if !self.renderables.contains(id) {
            let color = self.palette.next_color(&self.config.palette);
            self.renderables.add(id, Renderable::new(color, self.config.default_visible));
        }
        self.renderables.find_mut(id)
    }
}

fn edit_definition<T>(table: &mut OrderedStore<Definition<T>>, id: Id, edit: DefinitionEdit) -> bool {
    let Some(def) = table.find_mut(id).filter(|def| !def.is_erased()) else {
        return false;
    };
    if let Some(name) = edit.name {
        def.name = name;
    }
    if let Some(text) = edit.text {
        def.set_text(text);
    }
    true
}

fn erase_definition<T>(table: &mut OrderedStore<Definition<T>>, id: Id) -> bool {
    match table.find_mut(id).filter(|def| !def.is_erased()) {
        Some(def) => {
            def.mark_erase();
            true
        }
        None => false,
    }
}

/// Entry `id` unless it is missing or already marked for removal.
fn live<T>(table: &mut OrderedStore<T>, id: Id, status: impl Fn(&T) -> &Status) -> Option<&mut T> {
    table.find_mut(id).filter(|entry| !status(&**entry).is_erased())
}

fn erase_dependent<T>(table: &mut OrderedStore<T>, id: Id, status: impl Fn(&mut T) -> &mut Status) -> bool {
    let Some(entry) = table.find_mut(id) else {
        return false;
    };
    let status = status(entry);
    if status.is_erased() {
        return false;
    }
    status.mark_erase();
    true
}
