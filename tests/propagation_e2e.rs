mod common;

use cellforge::{DefinitionEdit, EnvelopePoint, ProbeVariable, State};
use common::Harness;

#[test]
fn probe_follows_malformed_locset_and_recovers() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    let tips = ui.add_locset("L", "(bad syntax");
    let probe = ui.add_probe("L", ProbeVariable::Voltage, 1.0);

    h.pass();
    assert_eq!(h.engine.locset(tips).unwrap().state(), State::Error);
    let status = &h.engine.probe(probe).unwrap().status;
    assert_eq!(status.state, State::Error);
    assert!(status.message.contains("malformed"));

    ui.update_locset(tips, DefinitionEdit::text("(location 0 0.5)"));
    h.pass();
    assert_eq!(h.engine.locset(tips).unwrap().state(), State::Good);
    assert!(h.engine.probe(probe).unwrap().status.is_good());
}

#[test]
fn link_messages() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    ui.add_locset("blank", "  ");
    let absent = ui.add_detector("nowhere", -10.0);
    let empty = ui.add_detector("blank", -10.0);
    let unlinked = ui.add_detector("", -10.0);
    let report = h.pass();

    let message = |id| h.engine.detector(id).unwrap().status.message.clone();
    assert_eq!(message(absent), "linked locset absent");
    assert_eq!(message(empty), "linked locset empty");
    assert_eq!(message(unlinked), "no linked locset");
    assert_eq!(report.dependents_invalid, 3);
}

#[test]
fn link_appears_later() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    let stim = ui.add_stimulus("center", 0.0, 0.0, vec![EnvelopePoint { time: 0.0, amplitude: 0.1 }]);
    h.pass();
    assert_eq!(h.engine.stimulus(stim).unwrap().status.message, "linked locset absent");

    ui.add_locset("center", "(location 0 0.5)");
    h.pass();
    assert!(h.engine.stimulus(stim).unwrap().status.is_good());
}

#[test]
fn renaming_the_parent_breaks_the_link() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    let tips = ui.add_locset("tips", "(terminal)");
    let probe = ui.add_probe("tips", ProbeVariable::Voltage, 1.0);
    h.pass();
    assert!(h.engine.probe(probe).unwrap().status.is_good());

    ui.update_locset(tips, DefinitionEdit::rename("ends"));
    h.pass();
    assert_eq!(h.engine.probe(probe).unwrap().status.message, "linked locset absent");

    ui.update_probe(probe, Some("ends".to_string()), None, None);
    h.pass();
    assert!(h.engine.probe(probe).unwrap().status.is_good());
}

#[test]
fn mechanism_catalog_errors() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    ui.add_region("soma", "(tag 1)");
    let bogus = ui.add_mechanism("soma", "bogus");
    let synapse = ui.add_mechanism("soma", "expsyn");
    let hh = ui.add_mechanism("soma", "hh");
    ui.set_mechanism_param(hh, "gkbar", 0.04);
    h.pass();

    assert_eq!(h.engine.mechanism(bogus).unwrap().status.message, "unknown mechanism 'bogus'");
    assert!(h.engine.mechanism(synapse).unwrap().status.message.contains("not a density"));
    assert!(h.engine.mechanism(hh).unwrap().status.is_good());

    ui.set_mechanism_param(hh, "tau", 1.0);
    h.pass();
    assert_eq!(
        h.engine.mechanism(hh).unwrap().status.message,
        "unknown parameter 'tau' for mechanism 'hh'"
    );

    ui.clear_mechanism_param(hh, "tau");
    h.pass();
    assert!(h.engine.mechanism(hh).unwrap().status.is_good());
    let params: Vec<_> = h.engine.mechanism_params(hh).map(|p| (p.name.clone(), p.value)).collect();
    assert_eq!(params, vec![("gkbar".to_string(), 0.04)]);
}

#[test]
fn setting_a_param_twice_overwrites() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    ui.add_region("soma", "(tag 1)");
    let pas = ui.add_mechanism("soma", "pas");
    ui.set_mechanism_param(pas, "g", 0.002);
    ui.set_mechanism_param(pas, "g", 0.003);
    h.pass();
    let values: Vec<f64> = h.engine.mechanism_params(pas).map(|p| p.value).collect();
    assert_eq!(values, vec![0.003]);
}

#[test]
fn deleting_a_mechanism_drops_its_params() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    ui.add_region("soma", "(tag 1)");
    let hh = ui.add_mechanism("soma", "hh");
    ui.set_mechanism_param(hh, "gl", 0.0005);
    ui.set_mechanism_param(hh, "el", -60.0);
    h.pass();
    assert_eq!(h.engine.mechanism_params(hh).count(), 2);

    ui.delete_mechanism(hh);
    ui.set_mechanism_param(hh, "gnabar", 0.1);
    let report = h.pass();
    assert_eq!(report.events_dropped, 1);
    assert_eq!(report.dependents_erased, 1);
    assert!(h.engine.mechanism(hh).is_none());
    assert_eq!(h.engine.mechanism_params(hh).count(), 0);
}

#[test]
fn deleting_an_ion_invalidates_users() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    let soma = ui.add_region("soma", "(tag 1)");
    ui.add_locset("center", "(location 0 0.5)");
    let probe = ui.add_probe("center", ProbeVariable::IonInternalConcentration("k".into()), 1.0);
    let hh = ui.add_mechanism("soma", "hh");
    let k = h.engine.find_ion("k").unwrap();
    ui.set_ion_override(soma, k, Default::default());
    h.pass();
    assert!(h.engine.probe(probe).unwrap().status.is_good());
    assert_eq!(h.engine.ion_overrides().count(), 1);

    ui.delete_ion(k);
    h.pass();
    assert_eq!(h.engine.probe(probe).unwrap().status.message, "unknown ion 'k'");
    assert_eq!(
        h.engine.mechanism(hh).unwrap().status.message,
        "mechanism 'hh' needs missing ion 'k'"
    );
    assert_eq!(h.engine.ion_overrides().count(), 0);
}

#[test]
fn region_parameters_follow_region_state() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    let soma = ui.add_region("soma", "(tag 1)");
    ui.set_region_parameters(soma, Default::default());
    h.pass();
    assert!(h.engine.region_parameters(soma).unwrap().status.is_good());

    ui.update_region(soma, DefinitionEdit::text("(tag"));
    h.pass();
    assert_eq!(
        h.engine.region_parameters(soma).unwrap().status.message,
        "linked region malformed"
    );

    ui.clear_region_parameters(soma);
    let report = h.pass();
    assert_eq!(report.dependents_erased, 1);
    assert!(h.engine.region_parameters(soma).is_none());
}

#[test]
fn stimulus_envelope_validation() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    ui.add_locset("root", "(root)");
    let pt = |time, amplitude| EnvelopePoint { time, amplitude };
    let stim = ui.add_stimulus("root", 0.0, 0.0, vec![pt(5.0, 0.1), pt(1.0, 0.0)]);
    h.pass();
    assert_eq!(
        h.engine.stimulus(stim).unwrap().status.message,
        "envelope times must be non-decreasing"
    );

    ui.update_stimulus_envelope(stim, vec![pt(1.0, 0.1), pt(5.0, 0.0)]);
    h.pass();
    assert!(h.engine.stimulus(stim).unwrap().status.is_good());
}

#[test]
fn duplicate_names_resolve_to_first_in_order() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    ui.add_locset("x", "(root)");
    ui.add_locset("x", "(nonsense)");
    let probe = ui.add_probe("x", ProbeVariable::Voltage, 1.0);
    h.pass();
    assert!(h.engine.probe(probe).unwrap().status.is_good());
}

#[test]
fn stimulus_can_be_relinked_and_retuned() {
    let mut h = Harness::new();
    let ui = h.engine.sender();
    ui.add_locset("root", "(root)");
    ui.add_locset("tips", "(terminal)");
    let envelope = vec![EnvelopePoint { time: 0.0, amplitude: 0.1 }];
    let stim = ui.add_stimulus("root", 0.0, 0.0, envelope.clone());
    h.pass();

    ui.update_stimulus(stim, Some("tips".to_string()), Some(0.05), Some(1.5), None);
    h.pass();
    let stimulus = h.engine.stimulus(stim).unwrap();
    assert_eq!(stimulus.locset, "tips");
    assert_eq!(stimulus.frequency, 0.05);
    assert_eq!(stimulus.phase, 1.5);
    assert_eq!(stimulus.envelope, envelope);
    assert!(stimulus.status.is_good());

    ui.update_stimulus(stim, Some("gone".to_string()), None, None, None);
    h.pass();
    assert_eq!(h.engine.stimulus(stim).unwrap().status.message, "linked locset absent");
}
