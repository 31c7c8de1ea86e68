//! Integration test for the monitoring kill switch: a disabled monitor must
//! refuse to pull or classify phrases.

mod common;

use std::sync::atomic::AtomicBool;

use common::{MarkingTranslator, ScriptedSource, StubSpeech, engine_with_store};
use safe_echo_app::run_monitor_loop;
use safe_echo_audio::{AudioMonitor, Language};
use safe_echo_core::CallerContext;
use safe_echo_store::AlertSource;

#[test]
fn kill_switch_behavior_tests_disabled_monitor_processes_no_phrases() {
    // Safety:
    // - Integration tests mutate process env in a single-threaded test body.
    // - This file holds the only test touching the variable, and it resets
    //   the variable before returning.
    unsafe { std::env::set_var("SAFE_ECHO_MONITOR_ENABLED", "0") };

    let (engine, store) = engine_with_store(None);
    let monitor = AudioMonitor::new(
        engine,
        Box::new(StubSpeech { failure: None }),
        Box::new(MarkingTranslator),
    );
    let mut source = ScriptedSource::of(&["urgent wire transfer needed", "see you later"]);
    let stop = AtomicBool::new(false);

    let report = run_monitor_loop(
        &monitor,
        &mut source,
        Language::English,
        CallerContext::unknown_sender(),
        &stop,
        |_| panic!("a disabled monitor must not classify anything"),
    )
    .expect("disabled monitor shuts down cleanly");

    assert!(report.disabled_by_kill_switch);
    assert_eq!(report.iterations, 0);
    assert_eq!(report.scams_detected, 0);
    assert_eq!(source.phrases.len(), 2, "no phrase may be pulled");
    assert!(store.list().expect("list").is_empty());

    // Re-enabling lets the same loop drain the source.
    // Safety: see rationale above.
    unsafe { std::env::remove_var("SAFE_ECHO_MONITOR_ENABLED") };

    let report = run_monitor_loop(
        &monitor,
        &mut source,
        Language::English,
        CallerContext::unknown_sender(),
        &stop,
        |_| {},
    )
    .expect("enabled monitor drains the source");

    assert!(!report.disabled_by_kill_switch);
    assert_eq!(report.iterations, 2);
    assert_eq!(report.scams_detected, 1);
}
