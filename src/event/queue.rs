//! FIFO queue between the presentation layer and the engine.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::catalog::IonInfo;
use crate::dependent::{EnvelopePoint, IonParameters, ParameterSet, ProbeVariable};
use crate::event::events::{DefinitionEdit, Event, Intent};
use crate::id::Id;
use crate::render::Rgba;
use crate::seed::Seed;

/// Engine-side end of the queue.
#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<Intent>,
    rx: Receiver<Intent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A new producer handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender { tx: self.tx.clone() }
    }

    /// Takes every queued intent, oldest first.
    pub fn drain(&self) -> Vec<Intent> {
        self.rx.try_iter().collect()
    }

    /// Number of queued intents.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Producer handle given to the presentation layer.
///
/// `add_*` methods issue the new entity's identifier immediately.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<Intent>,
}

impl EventSender {
    /// Enqueue a raw event.
    pub fn send(&self, event: Event) {
        if self.tx.send(Intent::new(event)).is_err() {
            tracing::debug!("event dropped: engine queue closed");
        }
    }

    /// Enqueue every region and locset of a loader seed, returning their ids
    /// in seed order (regions first).
    pub fn seed(&self, seed: &Seed) -> Vec<Id> {
        let regions = seed.regions.iter().map(|(name, text)| self.add_region(name, text));
        let locsets = seed.locsets.iter().map(|(name, text)| self.add_locset(name, text));
        regions.chain(locsets).collect()
    }

    /// Adds a region definition.
    pub fn add_region(&self, name: impl Into<String>, text: impl Into<String>) -> Id {
        let id = Id::next();
        self.send(Event::AddRegion {
            id,
            name: name.into(),
            text: text.into(),
        });
        id
    }

    /// Renames a region or replaces its text.
    pub fn update_region(&self, id: Id, edit: DefinitionEdit) {
        self.send(Event::UpdateRegion { id, edit });
    }

    /// Marks a region for removal. Its overrides go with it.
    pub fn delete_region(&self, id: Id) {
        self.send(Event::DeleteRegion { id });
    }

    /// Adds a locset definition.
    pub fn add_locset(&self, name: impl Into<String>, text: impl Into<String>) -> Id {
        let id = Id::next();
        self.send(Event::AddLocset {
            id,
            name: name.into(),
            text: text.into(),
        });
        id
    }

    /// Renames a locset or replaces its text.
    pub fn update_locset(&self, id: Id, edit: DefinitionEdit) {
        self.send(Event::UpdateLocset { id, edit });
    }

    /// Marks a locset for removal.
    pub fn delete_locset(&self, id: Id) {
        self.send(Event::DeleteLocset { id });
    }

    /// Adds an inhomogeneous expression.
    pub fn add_iexpr(&self, name: impl Into<String>, text: impl Into<String>) -> Id {
        let id = Id::next();
        self.send(Event::AddIexpr {
            id,
            name: name.into(),
            text: text.into(),
        });
        id
    }

    /// Renames an iexpr or replaces its text.
    pub fn update_iexpr(&self, id: Id, edit: DefinitionEdit) {
        self.send(Event::UpdateIexpr { id, edit });
    }

    /// Marks an iexpr for removal.
    pub fn delete_iexpr(&self, id: Id) {
        self.send(Event::DeleteIexpr { id });
    }

    /// Registers an ion species.
    pub fn add_ion(&self, name: impl Into<String>, defaults: IonInfo) -> Id {
        let id = Id::next();
        self.send(Event::AddIon {
            id,
            name: name.into(),
            defaults,
        });
        id
    }

    /// Replaces an ion's defaults.
    pub fn update_ion(&self, id: Id, defaults: IonInfo) {
        self.send(Event::UpdateIon { id, defaults });
    }

    /// Removes an ion species and every override that names it.
    pub fn delete_ion(&self, id: Id) {
        self.send(Event::DeleteIon { id });
    }

    /// Sets the ion parameters used on `region`.
    pub fn set_ion_override(&self, region: Id, ion: Id, values: IonParameters) {
        self.send(Event::SetIonOverride { region, ion, values });
    }

    /// Drops the ion parameters set on `region`.
    pub fn clear_ion_override(&self, region: Id, ion: Id) {
        self.send(Event::ClearIonOverride { region, ion });
    }

    /// Sets the electrical parameters of `region`.
    pub fn set_region_parameters(&self, region: Id, values: ParameterSet) {
        self.send(Event::SetRegionParameters { region, values });
    }

    /// Drops the electrical parameters of `region`.
    pub fn clear_region_parameters(&self, region: Id) {
        self.send(Event::ClearRegionParameters { region });
    }

    /// Replaces the cell-wide electrical defaults.
    pub fn set_default_parameters(&self, values: ParameterSet) {
        self.send(Event::SetDefaultParameters { values });
    }

    /// Paints a density mechanism on the region named `region`.
    pub fn add_mechanism(&self, region: impl Into<String>, mechanism: impl Into<String>) -> Id {
        let id = Id::next();
        self.send(Event::AddMechanism {
            id,
            region: region.into(),
            mechanism: mechanism.into(),
        });
        id
    }

    /// Relinks a mechanism or swaps the catalog entry. `None` keeps a field.
    pub fn update_mechanism(&self, id: Id, region: Option<String>, mechanism: Option<String>) {
        self.send(Event::UpdateMechanism { id, region, mechanism });
    }

    /// Marks a mechanism for removal, parameters included.
    pub fn delete_mechanism(&self, id: Id) {
        self.send(Event::DeleteMechanism { id });
    }

    /// Sets one parameter, overwriting any earlier value of the same name.
    pub fn set_mechanism_param(&self, mechanism: Id, name: impl Into<String>, value: f64) {
        self.send(Event::SetMechanismParam {
            mechanism,
            name: name.into(),
            value,
        });
    }

    /// Drops one parameter.
    pub fn clear_mechanism_param(&self, mechanism: Id, name: impl Into<String>) {
        self.send(Event::ClearMechanismParam {
            mechanism,
            name: name.into(),
        });
    }

    /// Places a probe on the locset named `locset`.
    pub fn add_probe(&self, locset: impl Into<String>, variable: ProbeVariable, frequency: f64) -> Id {
        let id = Id::next();
        self.send(Event::AddProbe {
            id,
            locset: locset.into(),
            variable,
            frequency,
        });
        id
    }

    /// Edits a probe. `None` keeps a field.
    pub fn update_probe(
        &self,
        id: Id,
        locset: Option<String>,
        variable: Option<ProbeVariable>,
        frequency: Option<f64>,
    ) {
        self.send(Event::UpdateProbe {
            id,
            locset,
            variable,
            frequency,
        });
    }

    /// Marks a probe for removal.
    pub fn delete_probe(&self, id: Id) {
        self.send(Event::DeleteProbe { id });
    }

    /// Places a spike detector on the locset named `locset`.
    pub fn add_detector(&self, locset: impl Into<String>, threshold: f64) -> Id {
        let id = Id::next();
        self.send(Event::AddDetector {
            id,
            locset: locset.into(),
            threshold,
        });
        id
    }

    /// Edits a detector. `None` keeps a field.
    pub fn update_detector(&self, id: Id, locset: Option<String>, threshold: Option<f64>) {
        self.send(Event::UpdateDetector { id, locset, threshold });
    }

    /// Marks a detector for removal.
    pub fn delete_detector(&self, id: Id) {
        self.send(Event::DeleteDetector { id });
    }

    /// Places a current clamp on the locset named `locset`.
    pub fn add_stimulus(
        &self,
        locset: impl Into<String>,
        frequency: f64,
        phase: f64,
        envelope: Vec<EnvelopePoint>,
    ) -> Id {
        let id = Id::next();
        self.send(Event::AddStimulus {
            id,
            locset: locset.into(),
            frequency,
            phase,
            envelope,
        });
        id
    }

    /// Edits a stimulus. `None` keeps a field.
    pub fn update_stimulus(
        &self,
        id: Id,
        locset: Option<String>,
        frequency: Option<f64>,
        phase: Option<f64>,
        envelope: Option<Vec<EnvelopePoint>>,
    ) {
        self.send(Event::UpdateStimulus {
            id,
            locset,
            frequency,
            phase,
            envelope,
        });
    }

    /// Replaces only the envelope of a stimulus.
    pub fn update_stimulus_envelope(&self, id: Id, envelope: Vec<EnvelopePoint>) {
        self.update_stimulus(id, None, None, None, Some(envelope));
    }

    /// Marks a stimulus for removal.
    pub fn delete_stimulus(&self, id: Id) {
        self.send(Event::DeleteStimulus { id });
    }

    /// Shows or hides the renderable of a region or locset.
    pub fn set_visible(&self, id: Id, visible: bool) {
        self.send(Event::SetVisible { id, visible });
    }

    /// Recolors the renderable of a region or locset.
    pub fn set_color(&self, id: Id, color: Rgba) {
        self.send(Event::SetColor { id, color });
    }
}
