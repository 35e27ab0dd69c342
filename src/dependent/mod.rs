//! Entities whose validity follows a parent definition.
//!
//! Assignments made by the user (mechanisms, probes, detectors, stimuli)
//! link to their parent by name. Per-region tables (parameter and ion
//! overrides) are keyed by the region identifier instead and disappear with
//! the region. Either way the status is recomputed from scratch every pass.

mod paint;
mod place;

pub use paint::{IonOverride, IonParameters, IonSpecies, MechanismAssignment, ParamValue, ParameterSet, RegionParameters};
pub use place::{Detector, EnvelopePoint, Probe, ProbeVariable, Stimulus};

use serde::{Deserialize, Serialize};

use crate::definition::{DefKind, State, MSG_OK};
use crate::error::InvariantViolation;

/// State plus user-facing message of a dependent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Status {
    /// Validity of the dependent.
    pub state: State,
    /// `Ok.` or the reason the dependent is invalid.
    pub message: String,
}

impl Status {
    /// Valid.
    #[must_use]
    pub fn good() -> Self {
        Self {
            state: State::Good,
            message: MSG_OK.to_string(),
        }
    }

    /// Invalid for `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: State::Error,
            message: message.into(),
        }
    }

    /// True if the dependent is valid.
    #[must_use]
    pub fn is_good(&self) -> bool {
        self.state == State::Good
    }

    /// True if the dependent is marked for removal.
    #[must_use]
    pub fn is_erased(&self) -> bool {
        self.state == State::Erase
    }

    /// Marks for removal at the end of the pass.
    pub fn mark_erase(&mut self) {
        self.state = State::Erase;
    }
}

/// Status of a dependent given its link and the linked definition's state.
///
/// `parent` is `None` when no live definition matches the link. Only
/// settled states may reach this point; a parent still `changed` or `erase`
/// means the pass ran out of order.
///
/// # Errors
/// `InvariantViolation::TransientParentState` for `changed`/`erase` parents.
pub fn link_status(kind: DefKind, link: &str, parent: Option<State>) -> Result<Status, InvariantViolation> {
    if link.trim().is_empty() {
        return Ok(Status::error(format!("no linked {kind}")));
    }
    parent_status(kind, parent)
}

/// Like [`link_status`] for entries keyed by the parent identifier, which
/// cannot have a blank link.
///
/// # Errors
/// `InvariantViolation::TransientParentState` for `changed`/`erase` parents.
pub fn parent_status(kind: DefKind, parent: Option<State>) -> Result<Status, InvariantViolation> {
    match parent {
        None => Ok(Status::error(format!("linked {kind} absent"))),
        Some(State::Good) => Ok(Status::good()),
        Some(State::Empty) => Ok(Status::error(format!("linked {kind} empty"))),
        Some(State::Error) => Ok(Status::error(format!("linked {kind} malformed"))),
        Some(state @ (State::Changed | State::Erase)) => {
            Err(InvariantViolation::TransientParentState { kind, state })
        }
    }
}

/// Applies an entity-specific check on top of a good link status.
pub(crate) fn refine(status: Status, check: impl FnOnce() -> Option<String>) -> Status {
    if !status.is_good() {
        return status;
    }
    match check() {
        Some(problem) => Status::error(problem),
        None => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn propagation_table() {
        let k = DefKind::Locset;
        assert_eq!(link_status(k, "tips", Some(State::Good)).unwrap(), Status::good());
        assert_eq!(
            link_status(k, "tips", Some(State::Empty)).unwrap().message,
            "linked locset empty"
        );
        assert_eq!(
            link_status(k, "tips", Some(State::Error)).unwrap().message,
            "linked locset malformed"
        );
        assert_eq!(link_status(k, "tips", None).unwrap().message, "linked locset absent");
        assert_eq!(
            link_status(DefKind::Region, "  ", Some(State::Good)).unwrap().message,
            "no linked region"
        );
    }

    #[test]
    fn transient_parent_is_invariant_violation() {
        assert!(link_status(DefKind::Region, "soma", Some(State::Changed)).is_err());
        assert!(link_status(DefKind::Region, "soma", Some(State::Erase)).is_err());
    }

    #[test]
    fn refine_only_runs_on_good() {
        let bad = Status::error("linked region absent");
        assert_eq!(refine(bad.clone(), || Some("other".into())), bad);
        assert_eq!(refine(Status::good(), || Some("other".into())).message, "other");
        assert!(refine(Status::good(), || None).is_good());
    }
}
