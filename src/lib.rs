//! # cellforge - definition/render reconciliation for neuron models
//!
//! cellforge keeps the editable half of a morphology editor consistent: the
//! named region and locset expressions a user types, the assignments that
//! hang off them, and the renderable geometry derived from them.
//!
//! ## Core Concepts
//!
//! - **Definition**: a named expression with a validity state (`empty`,
//!   `changed`, `good`, `error`, `erase`) and a user-facing message
//! - **Dependent**: a mechanism, probe, detector, stimulus or per-region
//!   override whose validity follows the definition it links to
//! - **Event**: one structural mutation queued by the presentation layer
//! - **Renderable**: the GPU-facing projection of a `good` region or locset,
//!   with a color and visibility that survive re-evaluation
//!
//! Everything is referenced by [`Id`], never by storage position.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cellforge::{Catalog, Engine, EngineConfig, HeadlessBackend, Seed};
//!
//! let mut engine = Engine::new(Arc::new(Catalog::default_catalog()), EngineConfig::default());
//! let ui = engine.sender();
//! ui.seed(&Seed::swc_default());
//! ui.add_probe("terminal", ProbeVariable::Voltage, 1.0);
//!
//! let mut backend = HeadlessBackend::new();
//! let report = engine.update(&evaluator, &geometry, &mut backend)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Identity and storage
pub mod id;
pub mod storage;

// Model
pub mod catalog;
pub mod definition;
pub mod dependent;
pub mod evaluator;
pub mod seed;

// Reconciliation
pub mod config;
pub mod engine;
pub mod event;
pub mod render;

// Persistence and errors
pub mod document;
pub mod error;

pub use catalog::{Catalog, CatalogError, IonInfo, MechanismInfo, MechanismKind, RevPotMethod};
pub use config::EngineConfig;
pub use definition::{sanitize_diagnostic, DefKind, Definition, State};
pub use dependent::{
    Detector, EnvelopePoint, IonOverride, IonParameters, IonSpecies, MechanismAssignment, ParamValue,
    ParameterSet, Probe, ProbeVariable, RegionParameters, Status, Stimulus,
};
pub use document::{Document, DocumentContent, FORMAT_VERSION};
pub use engine::{Engine, PassReport};
pub use error::{CoreError, CoreResult, DocumentError, InvariantViolation};
pub use evaluator::{Diagnostic, Evaluator, GeometryBuilder, Point3, Segment};
pub use event::{DefinitionEdit, Event, EventQueue, EventSender, Intent};
pub use id::Id;
pub use render::{GpuHandle, HeadlessBackend, MeshPayload, RenderBackend, RenderError, Renderable, Rgba};
pub use seed::Seed;
pub use storage::{IndexedStore, JoinStore, ManyStore, OrderedStore, StoreError, UniqueStore};
