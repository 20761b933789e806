mod common;

use common::{Call, Rig};
use saavy_poly::{io::midi::MidiEvent, EngineConfig, PolyMode};

fn trigger_of(call: &(usize, Call)) -> Option<(usize, Option<u8>, bool)> {
    match call {
        (v, Call::Trigger { key, retrigger, .. }) => Some((*v, *key, *retrigger)),
        _ => None,
    }
}

fn triggers(rig: &Rig) -> Vec<(usize, Option<u8>, bool)> {
    rig.take_commands().iter().filter_map(trigger_of).collect()
}

fn mono(mode: PolyMode, unison: usize) -> Rig {
    Rig::new(
        EngineConfig::default()
            .with_poly_mode(mode)
            .with_unison_voices(unison),
        4,
    )
}

// -------------------------------------------------------------------------
// Sustain pedal, poly mode
// -------------------------------------------------------------------------

#[test]
fn pedal_keeps_released_key_sounding() {
    let mut rig = Rig::poly(4);
    rig.play(MidiEvent::sustain(true));
    rig.play(MidiEvent::note_on(60, 100));
    rig.play(MidiEvent::note_off(60));

    assert!(rig.held().is_empty());
    assert_eq!(rig.sustained(), vec![60]);
    assert!(Rig::releases(&rig.take_commands()).is_empty());
    assert_eq!(rig.bound_keys()[0], Some(60));
    assert!(rig.engine.voice_status().is_busy(0));

    rig.play(MidiEvent::sustain(false));
    assert_eq!(Rig::releases(&rig.take_commands()), vec![0]);
    assert!(rig.sustained().is_empty());
}

#[test]
fn pedal_up_spares_keys_still_held() {
    let mut rig = Rig::poly(4);
    rig.play(MidiEvent::sustain(true));
    rig.play(MidiEvent::note_on(60, 100));
    rig.play(MidiEvent::note_on(64, 100));
    rig.play(MidiEvent::note_off(60));
    rig.take_calls();

    rig.play(MidiEvent::sustain(false));

    assert_eq!(Rig::releases(&rig.take_commands()), vec![0]);
    assert_eq!(rig.sustained(), vec![64]);
    assert_eq!(rig.held(), vec![64]);

    rig.play(MidiEvent::note_off(64));
    assert_eq!(Rig::releases(&rig.take_commands()), vec![1]);
}

#[test]
fn pedal_threshold_is_half_travel() {
    let mut rig = Rig::poly(1);
    rig.play(MidiEvent::control(64, 64));
    assert!(rig.engine.sustain_pedal());
    rig.play(MidiEvent::control(64, 63));
    assert!(!rig.engine.sustain_pedal());
}

// -------------------------------------------------------------------------
// Mono
// -------------------------------------------------------------------------

#[test]
fn mono_falls_back_to_previous_held_key() {
    let mut rig = mono(PolyMode::Mono, 1);

    rig.play(MidiEvent::note_on(60, 100));
    assert_eq!(triggers(&rig), vec![(0, Some(60), false)]);

    rig.play(MidiEvent::note_on(64, 100));
    assert_eq!(triggers(&rig), vec![(0, Some(64), true)]);
    assert_eq!(rig.held(), vec![60, 64]);
    assert_eq!(rig.sustained(), vec![64]);

    rig.play(MidiEvent::note_off(64));
    assert_eq!(triggers(&rig), vec![(0, Some(60), true)]);
    assert_eq!(rig.held(), vec![60]);
    assert_eq!(rig.sustained(), vec![60]);

    rig.play(MidiEvent::note_off(60));
    assert_eq!(Rig::releases(&rig.take_commands()), vec![0]);
    assert!(rig.held().is_empty());
    assert_eq!(rig.bound_keys()[0], None);
}

#[test]
fn mono_ignores_release_of_a_key_that_is_not_sounding() {
    let mut rig = mono(PolyMode::Mono, 1);
    rig.play(MidiEvent::note_on(60, 100));
    rig.play(MidiEvent::note_on(64, 100));
    rig.take_calls();

    rig.play(MidiEvent::note_off(60));
    assert!(rig.take_commands().is_empty());
    assert_eq!(rig.bound_keys()[0], Some(64));
}

#[test]
fn mono_uses_first_slots_for_unison() {
    let mut rig = mono(PolyMode::Mono, 2);
    rig.play(MidiEvent::note_on(60, 100));

    let calls = rig.take_commands();
    let stack: Vec<(usize, usize)> = calls
        .iter()
        .filter_map(|(v, c)| match c {
            Call::Trigger { stack_index, .. } => Some((*v, *stack_index)),
            _ => None,
        })
        .collect();
    assert_eq!(stack, vec![(0, 0), (1, 1)]);
    assert_eq!(rig.bound_keys(), vec![Some(60), Some(60), None, None]);
}

#[test]
fn mono_pedal_holds_last_note_until_pedal_up() {
    let mut rig = mono(PolyMode::Mono, 1);
    rig.play(MidiEvent::sustain(true));
    rig.play(MidiEvent::note_on(60, 100));
    rig.play(MidiEvent::note_off(60));
    assert!(Rig::releases(&rig.take_commands()).is_empty());
    assert!(rig.held().is_empty());
    assert_eq!(rig.sustained(), vec![60]);

    rig.play(MidiEvent::note_on(64, 100));
    rig.play(MidiEvent::note_off(64));
    assert_eq!(triggers(&rig), vec![(0, Some(64), true)]);
    assert_eq!(rig.sustained(), vec![64]);

    rig.play(MidiEvent::sustain(false));
    assert_eq!(Rig::releases(&rig.take_commands()), vec![0]);
    assert!(rig.sustained().is_empty());
}

#[test]
fn mono_pedal_returns_to_sustained_note() {
    let mut rig = mono(PolyMode::Mono, 1);
    rig.play(MidiEvent::sustain(true));
    rig.play(MidiEvent::note_on(60, 100));
    rig.play(MidiEvent::note_on(64, 100));
    // 60 lifted while 64 sounds: stack now [64]
    rig.play(MidiEvent::note_off(60));
    rig.take_calls();

    rig.play(MidiEvent::note_off(64));
    // 64 is still the sustained note and already bound
    assert!(rig.take_commands().is_empty());
    assert_eq!(rig.bound_keys()[0], Some(64));
}

// -------------------------------------------------------------------------
// Legato
// -------------------------------------------------------------------------

#[test]
fn legato_glides_without_reattack() {
    let mut rig = mono(PolyMode::Legato, 1);

    rig.play(MidiEvent::note_on(60, 100));
    assert_eq!(triggers(&rig), vec![(0, Some(60), false)]);

    rig.play(MidiEvent::note_on(64, 100));
    assert!(triggers(&rig).is_empty());
    let info = rig.engine.voice_info(0).copied().unwrap();
    assert_eq!(info.key, Some(64));
    assert_eq!(info.base_pitch, 64.0);

    // back down to 60, still no re-attack
    rig.play(MidiEvent::note_off(64));
    assert!(triggers(&rig).is_empty());
    assert_eq!(rig.bound_keys()[0], Some(60));

    rig.play(MidiEvent::note_off(60));
    assert_eq!(Rig::releases(&rig.take_commands()), vec![0]);
}

#[test]
fn legato_reattacks_a_releasing_voice() {
    let mut rig = mono(PolyMode::Legato, 1);
    rig.play(MidiEvent::note_on(60, 100));
    rig.play(MidiEvent::note_off(60));
    rig.take_calls();
    assert!(rig.engine.voice_status().is_busy(0));

    rig.play(MidiEvent::note_on(64, 100));
    assert_eq!(triggers(&rig), vec![(0, Some(64), true)]);
}

#[test]
fn legato_starts_idle_voice_fresh() {
    let mut rig = mono(PolyMode::Legato, 1);
    rig.play(MidiEvent::note_on(60, 100));
    rig.play(MidiEvent::note_off(60));
    rig.block(128);
    rig.take_calls();

    rig.play(MidiEvent::note_on(64, 100));
    assert_eq!(triggers(&rig), vec![(0, Some(64), false)]);
}

#[test]
fn switching_modes_changes_routing() {
    let mut rig = Rig::poly(4);
    rig.play(MidiEvent::note_on(60, 100));
    rig.engine.set_poly_mode(PolyMode::Mono);
    rig.take_calls();

    rig.play(MidiEvent::note_on(64, 100));
    // mono always plays on slot 0
    assert_eq!(triggers(&rig), vec![(0, Some(64), true)]);
}
