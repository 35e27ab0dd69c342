//! Steps 4 and 5 of the pass: dependent validity and dependent compaction.

use crate::definition::{DefKind, Definition, State};
use crate::dependent::{link_status, parent_status, refine, Status};
use crate::engine::{find_by_name, Engine};
use crate::error::{CoreResult, InvariantViolation};
use crate::evaluator::Evaluator;
use crate::id::Id;
use crate::storage::{IndexedStore, OrderedStore};

impl<E: Evaluator> Engine<E> {
    /// Recomputes the status of every dependent not marked for removal.
    ///
    /// Returns how many ended up invalid.
    pub(super) fn propagate(&mut self) -> CoreResult<usize> {
        let mut invalid = 0;

        for id in self.mechanisms.ids().to_vec() {
            let entry = self.mechanisms.get(id)?;
            if entry.status.is_erased() {
                continue;
            }
            let linked = link_status(DefKind::Region, &entry.region, state_of(&self.regions, &entry.region))?;
            let params = self.mechanism_params.values_of(id).map(|(_, p)| p);
            let status = refine(linked, || {
                entry.check(&self.catalog, params, |ion| self.find_ion(ion).is_some())
            });
            invalid += settle(&mut self.mechanisms.get_mut(id)?.status, status);
        }

        for id in self.probes.ids().to_vec() {
            let entry = self.probes.get(id)?;
            if entry.status.is_erased() {
                continue;
            }
            let linked = link_status(DefKind::Locset, &entry.locset, state_of(&self.locsets, &entry.locset))?;
            let status = refine(linked, || entry.check(|ion| self.find_ion(ion).is_some()));
            invalid += settle(&mut self.probes.get_mut(id)?.status, status);
        }

        for id in self.detectors.ids().to_vec() {
            let entry = self.detectors.get(id)?;
            if entry.status.is_erased() {
                continue;
            }
            let linked = link_status(DefKind::Locset, &entry.locset, state_of(&self.locsets, &entry.locset))?;
            let status = refine(linked, || entry.check());
            invalid += settle(&mut self.detectors.get_mut(id)?.status, status);
        }

        for id in self.stimuli.ids().to_vec() {
            let entry = self.stimuli.get(id)?;
            if entry.status.is_erased() {
                continue;
            }
            let linked = link_status(DefKind::Locset, &entry.locset, state_of(&self.locsets, &entry.locset))?;
            let status = refine(linked, || entry.check());
            invalid += settle(&mut self.stimuli.get_mut(id)?.status, status);
        }

        for region in self.region_parameters.ids_where(|p| !p.status.is_erased()) {
            let parent = self.region_state(region)?;
            let values = self.region_parameters.get(region)?.values;
            let status = refine(parent_status(DefKind::Region, Some(parent))?, || values.check());
            invalid += settle(&mut self.region_parameters.get_mut(region)?.status, status);
        }

        let pairs: Vec<(Id, Id)> = self
            .ion_overrides
            .iter()
            .filter(|(_, o)| !o.status.is_erased())
            .map(|(key, _)| key)
            .collect();
        for (region, ion) in pairs {
            let parent = self.region_state(region)?;
            if !self.ions.contains(ion) {
                return Err(InvariantViolation::DanglingId { kind: "ion", id: ion }.into());
            }
            let values = self.ion_overrides.get(region, ion)?.values;
            let status = refine(parent_status(DefKind::Region, Some(parent))?, || values.check());
            invalid += settle(&mut self.ion_overrides.get_mut(region, ion)?.status, status);
        }

        Ok(invalid)
    }

    /// Removes dependents marked for removal, with their children.
    pub(super) fn compact_dependents(&mut self) -> CoreResult<usize> {
        let mut erased = 0;

        for (id, entry) in self.mechanisms.remove_where(|m| m.status.is_erased())? {
            let params = self.mechanism_params.remove_children(id)?;
            tracing::trace!(%id, mechanism = %entry.mechanism, params, "mechanism removed");
            erased += 1;
        }
        erased += self.probes.remove_where(|p| p.status.is_erased())?.len();
        erased += self.detectors.remove_where(|d| d.status.is_erased())?.len();
        erased += self.stimuli.remove_where(|s| s.status.is_erased())?.len();

        for region in self.region_parameters.ids_where(|p| p.status.is_erased()) {
            self.region_parameters.remove(region)?;
            erased += 1;
        }
        let pairs: Vec<(Id, Id)> = self
            .ion_overrides
            .iter()
            .filter(|(_, o)| o.status.is_erased())
            .map(|(key, _)| key)
            .collect();
        for (region, ion) in pairs {
            self.ion_overrides.remove(region, ion)?;
            erased += 1;
        }

        Ok(erased)
    }

    fn region_state(&self, region: Id) -> CoreResult<State> {
        self.regions
            .find(region)
            .map(Definition::state)
            .ok_or_else(|| InvariantViolation::DanglingId { kind: "region", id: region }.into())
    }
}

/// State of the first definition named `link`, if any.
fn state_of<T>(table: &OrderedStore<Definition<T>>, link: &str) -> Option<State> {
    find_by_name(table, link).map(|(_, def)| def.state())
}

/// Stores `status`, returning 1 if it is not good.
fn settle(slot: &mut Status, status: Status) -> usize {
    let invalid = usize::from(!status.is_good());
    *slot = status;
    invalid
}
