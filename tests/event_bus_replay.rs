// tests/event_bus_replay.rs

mod common;
use crate::common::builders::passing_result;
use crate::common::drain_ready;

use testsieve::bus::protocol::{EngineStatus, OutboundEvent, TestResultPayload};
use testsieve::bus::EventBus;

fn status(status: EngineStatus) -> OutboundEvent {
    OutboundEvent::EngineStatus { status }
}

fn test_result(file: &str) -> OutboundEvent {
    OutboundEvent::TestResult(TestResultPayload {
        run_id: Some(1),
        replayed: false,
        result: passing_result(file),
    })
}

#[test]
fn late_subscriber_receives_cached_state_then_live_events() {
    let mut bus = EventBus::new();

    bus.publish(status(EngineStatus::Running));
    bus.publish(test_result("/work/t1.test.ts"));

    // Attach mid-run.
    let mut rx = bus.subscribe();
    let replayed = drain_ready(&mut rx);
    assert_eq!(replayed.len(), 2);
    assert!(matches!(
        replayed[0].event,
        OutboundEvent::EngineStatus {
            status: EngineStatus::Running
        }
    ));
    assert!(matches!(replayed[1].event, OutboundEvent::TestResult(_)));

    // Live messages follow the replay.
    bus.publish(status(EngineStatus::Idle));
    let live = drain_ready(&mut rx);
    assert_eq!(live.len(), 1);
    assert!(matches!(
        live[0].event,
        OutboundEvent::EngineStatus {
            status: EngineStatus::Idle
        }
    ));
}

#[test]
fn state_types_cache_only_the_latest_value() {
    let mut bus = EventBus::new();

    bus.publish(status(EngineStatus::Scanning));
    bus.publish(status(EngineStatus::Running));
    bus.publish(status(EngineStatus::Idle));

    let mut rx = bus.subscribe();
    let replayed = drain_ready(&mut rx);
    assert_eq!(replayed.len(), 1);
    assert!(matches!(
        replayed[0].event,
        OutboundEvent::EngineStatus {
            status: EngineStatus::Idle
        }
    ));
}

#[test]
fn repeated_results_for_the_same_test_overwrite() {
    let mut bus = EventBus::new();

    // Same test id published twice, plus a different test.
    bus.publish(test_result("/work/t1.test.ts"));
    bus.publish(test_result("/work/t1.test.ts"));
    bus.publish(test_result("/work/t2.test.ts"));

    let mut rx = bus.subscribe();
    let replayed = drain_ready(&mut rx);
    assert_eq!(replayed.len(), 2);
}

#[test]
fn sequence_numbers_are_monotonic_across_publishes() {
    let mut bus = EventBus::new();

    let first = bus.publish(status(EngineStatus::Idle)).seq;
    let second = bus.publish(test_result("/work/t1.test.ts")).seq;
    let third = bus.publish(status(EngineStatus::Running)).seq;

    assert!(first < second && second < third);
    assert_eq!(bus.seq(), third);
}

#[test]
fn disconnected_subscribers_are_pruned() {
    let mut bus = EventBus::new();

    let rx = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 1);
    drop(rx);

    bus.publish(status(EngineStatus::Idle));
    assert_eq!(bus.subscriber_count(), 0);
}
