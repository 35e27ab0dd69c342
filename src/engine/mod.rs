//! Reconciliation engine.
//!
//! The engine owns every store. Once per frame, [`Engine::update`] runs one
//! pass in a fixed order:
//!
//! 1. drain the event queue and apply each event;
//! 2. re-evaluate changed locsets, regions and iexprs and refresh their
//!    renderables;
//! 3. compact erased definitions (and everything keyed by them);
//! 4. recompute the status of every dependent;
//! 5. compact erased dependents.
//!
//! The presentation layer reads the results between passes and only talks
//! back through the queue.

mod apply;
mod persist;
mod propagate;

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::definition::{DefKind, Definition, State};
use crate::dependent::{
    Detector, IonOverride, IonSpecies, MechanismAssignment, ParamValue, ParameterSet, Probe,
    RegionParameters, Stimulus,
};
use crate::error::CoreResult;
use crate::evaluator::{Evaluator, GeometryBuilder};
use crate::event::{EventQueue, EventSender};
use crate::id::Id;
use crate::render::{locset_mesh, region_mesh, MeshPayload, Palette, RenderBackend, Renderable};
use crate::storage::{IndexedStore, JoinStore, ManyStore, OrderedStore, UniqueStore};

/// Counters describing one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Events that changed the model.
    pub events_applied: usize,
    /// Events naming a dead or erased entity.
    pub events_dropped: usize,
    /// Definitions evaluated this pass.
    pub reevaluated: usize,
    /// Definitions removed this pass.
    pub definitions_erased: usize,
    /// Dependents removed this pass.
    pub dependents_erased: usize,
    /// Dependents left in `error` after propagation.
    pub dependents_invalid: usize,
}

/// Owner of the editable model and its renderable projection.
pub struct Engine<E: Evaluator> {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    queue: EventQueue,
    palette: Palette,

    regions: OrderedStore<Definition<E::Region>>,
    locsets: OrderedStore<Definition<E::Locset>>,
    iexprs: OrderedStore<Definition<E::Expr>>,
    renderables: UniqueStore<Renderable>,

    ions: OrderedStore<IonSpecies>,
    ion_overrides: JoinStore<IonOverride>,
    region_parameters: UniqueStore<RegionParameters>,
    default_parameters: ParameterSet,

    mechanisms: OrderedStore<MechanismAssignment>,
    mechanism_params: ManyStore<ParamValue>,
    probes: OrderedStore<Probe>,
    detectors: OrderedStore<Detector>,
    stimuli: OrderedStore<Stimulus>,
}

impl<E: Evaluator> Engine<E> {
    /// Creates an engine with the catalog's ion species pre-registered.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        let mut engine = Self::empty(catalog, config);
        let species: Vec<IonSpecies> = engine
            .catalog
            .ions
            .iter()
            .map(|(name, info)| IonSpecies {
                name: name.clone(),
                defaults: info.clone(),
            })
            .collect();
        for ion in species {
            engine.ions.add(Id::next(), ion);
        }
        engine
    }

    fn empty(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        Self {
            catalog,
            config,
            queue: EventQueue::new(),
            palette: Palette::default(),
            regions: OrderedStore::new(),
            locsets: OrderedStore::new(),
            iexprs: OrderedStore::new(),
            renderables: UniqueStore::new(),
            ions: OrderedStore::new(),
            ion_overrides: JoinStore::new(),
            region_parameters: UniqueStore::new(),
            default_parameters: ParameterSet::cell_defaults(),
            mechanisms: OrderedStore::new(),
            mechanism_params: ManyStore::new(),
            probes: OrderedStore::new(),
            detectors: OrderedStore::new(),
            stimuli: OrderedStore::new(),
        }
    }

    /// Producer handle for the presentation layer.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.queue.sender()
    }

    /// Runs one reconciliation pass.
    ///
    /// Bad user input never fails the pass; it ends up as state and message
    /// on the entity concerned.
    ///
    /// # Errors
    /// `CoreError::Invariant` if a store lookup that must succeed does not,
    /// or a definition is still in a transient state when dependents are
    /// derived. The model must not be used further after such an error.
    pub fn update(
        &mut self,
        evaluator: &E,
        geometry: &dyn GeometryBuilder<E>,
        backend: &mut dyn RenderBackend,
    ) -> CoreResult<PassReport> {
        let mut report = PassReport::default();

        for intent in self.queue.drain() {
            let request_id = intent.request_id;
            if self.apply(intent.event)? {
                report.events_applied += 1;
            } else {
                report.events_dropped += 1;
                tracing::trace!(%request_id, "dropped event for a deleted entity");
            }
        }

        report.reevaluated += self.reevaluate_locsets(evaluator, geometry, backend)?;
        report.reevaluated += self.reevaluate_regions(evaluator, geometry, backend)?;
        report.reevaluated += reevaluate_all(&mut self.iexprs, DefKind::Iexpr, |t| evaluator.parse_iexpr(t))?;

        report.definitions_erased = self.compact_definitions(backend)?;
        report.dependents_invalid = self.propagate()?;
        report.dependents_erased = self.compact_dependents()?;

        tracing::debug!(
            applied = report.events_applied,
            dropped = report.events_dropped,
            reevaluated = report.reevaluated,
            erased = report.definitions_erased + report.dependents_erased,
            invalid = report.dependents_invalid,
            "reconciliation pass complete"
        );
        Ok(report)
    }

    fn reevaluate_locsets(
        &mut self,
        evaluator: &E,
        geometry: &dyn GeometryBuilder<E>,
        backend: &mut dyn RenderBackend,
    ) -> CoreResult<usize> {
        let mut count = 0;
        for id in self.locsets.ids().to_vec() {
            let def = self.locsets.get_mut(id)?;
            if !def.reevaluate(|t| evaluator.parse_locset(t)) {
                continue;
            }
            count += 1;
            log_outcome(DefKind::Locset, id, &def.name, def.state(), def.message());
            let payload = def
                .data()
                .map(|locset| locset_mesh(&geometry.points_for(locset), self.config.marker_scale));
            project(&mut self.renderables, &mut self.palette, &self.config, backend, id, payload);
        }
        Ok(count)
    }

    fn reevaluate_regions(
        &mut self,
        evaluator: &E,
        geometry: &dyn GeometryBuilder<E>,
        backend: &mut dyn RenderBackend,
    ) -> CoreResult<usize> {
        let mut count = 0;
        for id in self.regions.ids().to_vec() {
            let def = self.regions.get_mut(id)?;
            if !def.reevaluate(|t| evaluator.parse_region(t)) {
                continue;
            }
            count += 1;
            log_outcome(DefKind::Region, id, &def.name, def.state(), def.message());
            let payload = def
                .data()
                .map(|region| region_mesh(&geometry.segments_for(region), self.config.sides()));
            project(&mut self.renderables, &mut self.palette, &self.config, backend, id, payload);
        }
        Ok(count)
    }

    fn compact_definitions(&mut self, backend: &mut dyn RenderBackend) -> CoreResult<usize> {
        let locsets = self.locsets.remove_where(Definition::is_erased)?;
        let regions = self.regions.remove_where(Definition::is_erased)?;
        let iexprs = self.iexprs.remove_where(Definition::is_erased)?;

        let drawn = locsets.iter().map(|(id, _)| *id).chain(regions.iter().map(|(id, _)| *id));
        for id in drawn {
            if self.renderables.contains(id) {
                self.renderables.remove(id)?.clear(backend);
            }
        }
        for (id, def) in &regions {
            let overrides = self.ion_overrides.remove_by_first(*id)?;
            let params = self.region_parameters.find(*id).is_some();
            if params {
                self.region_parameters.remove(*id)?;
            }
            tracing::debug!(region = %id, name = %def.name, overrides, params, "region erased");
        }
        Ok(locsets.len() + regions.len() + iexprs.len())
    }

    /// The catalog the engine validates against.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Regions in display order.
    pub fn regions(&self) -> impl Iterator<Item = (Id, &Definition<E::Region>)> {
        self.regions.iter()
    }

    /// Region definition by identifier.
    #[must_use]
    pub fn region(&self, id: Id) -> Option<&Definition<E::Region>> {
        self.regions.find(id)
    }

    /// First region named `name`.
    #[must_use]
    pub fn find_region(&self, name: &str) -> Option<Id> {
        find_by_name(&self.regions, name).map(|(id, _)| id)
    }

    /// Locsets in display order.
    pub fn locsets(&self) -> impl Iterator<Item = (Id, &Definition<E::Locset>)> {
        self.locsets.iter()
    }

    /// Locset definition by identifier.
    #[must_use]
    pub fn locset(&self, id: Id) -> Option<&Definition<E::Locset>> {
        self.locsets.find(id)
    }

    /// First locset named `name`.
    #[must_use]
    pub fn find_locset(&self, name: &str) -> Option<Id> {
        find_by_name(&self.locsets, name).map(|(id, _)| id)
    }

    /// Ion expressions in display order.
    pub fn iexprs(&self) -> impl Iterator<Item = (Id, &Definition<E::Expr>)> {
        self.iexprs.iter()
    }

    /// Iexpr definition by identifier.
    #[must_use]
    pub fn iexpr(&self, id: Id) -> Option<&Definition<E::Expr>> {
        self.iexprs.find(id)
    }

    /// Renderable of a region or locset.
    #[must_use]
    pub fn renderable(&self, id: Id) -> Option<&Renderable> {
        self.renderables.find(id)
    }

    /// All renderables, keyed by their definition.
    pub fn renderables(&self) -> impl Iterator<Item = (Id, &Renderable)> {
        self.renderables.iter()
    }

    /// Ion species in registration order.
    pub fn ions(&self) -> impl Iterator<Item = (Id, &IonSpecies)> {
        self.ions.iter()
    }

    /// Identifier of the ion species called `name`.
    #[must_use]
    pub fn find_ion(&self, name: &str) -> Option<Id> {
        self.ions.iter().find(|(_, ion)| ion.name == name).map(|(id, _)| id)
    }

    /// All region x ion overrides.
    pub fn ion_overrides(&self) -> impl Iterator<Item = ((Id, Id), &IonOverride)> {
        self.ion_overrides.iter()
    }

    /// Ion override of one region, if set.
    #[must_use]
    pub fn ion_override(&self, region: Id, ion: Id) -> Option<&IonOverride> {
        self.ion_overrides.find(region, ion)
    }

    /// Electrical parameters of one region, if set.
    #[must_use]
    pub fn region_parameters(&self, region: Id) -> Option<&RegionParameters> {
        self.region_parameters.find(region)
    }

    /// Cell-wide electrical defaults.
    #[must_use]
    pub const fn default_parameters(&self) -> &ParameterSet {
        &self.default_parameters
    }

    /// Mechanism assignments in insertion order.
    pub fn mechanisms(&self) -> impl Iterator<Item = (Id, &MechanismAssignment)> {
        self.mechanisms.iter()
    }

    /// Mechanism assignment by identifier.
    #[must_use]
    pub fn mechanism(&self, id: Id) -> Option<&MechanismAssignment> {
        self.mechanisms.find(id)
    }

    /// Parameter overrides of a mechanism assignment, in insertion order.
    pub fn mechanism_params(&self, mechanism: Id) -> impl Iterator<Item = &ParamValue> {
        self.mechanism_params.values_of(mechanism).map(|(_, p)| p)
    }

    /// Probes in insertion order.
    pub fn probes(&self) -> impl Iterator<Item = (Id, &Probe)> {
        self.probes.iter()
    }

    /// Probe by identifier.
    #[must_use]
    pub fn probe(&self, id: Id) -> Option<&Probe> {
        self.probes.find(id)
    }

    /// Detectors in insertion order.
    pub fn detectors(&self) -> impl Iterator<Item = (Id, &Detector)> {
        self.detectors.iter()
    }

    /// Detector by identifier.
    #[must_use]
    pub fn detector(&self, id: Id) -> Option<&Detector> {
        self.detectors.find(id)
    }

    /// Stimuli in insertion order.
    pub fn stimuli(&self) -> impl Iterator<Item = (Id, &Stimulus)> {
        self.stimuli.iter()
    }

    /// Stimulus by identifier.
    #[must_use]
    pub fn stimulus(&self, id: Id) -> Option<&Stimulus> {
        self.stimuli.find(id)
    }

    /// Self-test of every store's slot bookkeeping.
    ///
    /// # Errors
    /// The first corrupted store found.
    pub fn check_invariants(&self) -> CoreResult<()> {
        self.regions.check_invariants()?;
        self.locsets.check_invariants()?;
        self.iexprs.check_invariants()?;
        self.renderables.check_invariants()?;
        self.ions.check_invariants()?;
        self.ion_overrides.check_invariants()?;
        self.region_parameters.check_invariants()?;
        self.mechanisms.check_invariants()?;
        self.mechanism_params.check_invariants()?;
        self.probes.check_invariants()?;
        self.detectors.check_invariants()?;
        self.stimuli.check_invariants()?;
        Ok(())
    }
}

/// First definition whose trimmed name equals the trimmed `name`.
fn find_by_name<'a, T>(table: &'a OrderedStore<Definition<T>>, name: &str) -> Option<(Id, &'a Definition<T>)> {
    let name = name.trim();
    table.iter().find(|(_, def)| def.name.trim() == name)
}

fn reevaluate_all<T>(
    table: &mut OrderedStore<Definition<T>>,
    kind: DefKind,
    mut parse: impl FnMut(&str) -> Result<T, crate::evaluator::Diagnostic>,
) -> CoreResult<usize> {
    let mut count = 0;
    for id in table.ids().to_vec() {
        let def = table.get_mut(id)?;
        if def.reevaluate(&mut parse) {
            count += 1;
            log_outcome(kind, id, &def.name, def.state(), def.message());
        }
    }
    Ok(count)
}

fn log_outcome(kind: DefKind, id: Id, name: &str, state: State, message: &str) {
    tracing::debug!(%kind, %id, name, %state, message, "definition re-evaluated");
}

/// Refreshes the renderable of `id` from a fresh evaluation.
///
/// `payload` is `None` when the definition did not evaluate to `good`; the
/// renderable then loses its payload but keeps color and visibility.
fn project(
    renderables: &mut UniqueStore<Renderable>,
    palette: &mut Palette,
    config: &EngineConfig,
    backend: &mut dyn RenderBackend,
    id: Id,
    payload: Option<MeshPayload>,
) {
    match (renderables.find_mut(id), payload) {
        (Some(existing), Some(payload)) => existing.replace(&payload, backend),
        (Some(existing), None) => existing.clear(backend),
        (None, Some(payload)) => {
            let mut fresh = Renderable::new(palette.next_color(&config.palette), config.default_visible);
            fresh.replace(&payload, backend);
            renderables.add(id, fresh);
        }
        (None, None) => {}
    }
}
