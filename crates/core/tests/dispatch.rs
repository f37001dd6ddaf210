// Path: crates/core/tests/dispatch.rs
mod common;

use common::harness;
use gaugebridge_core::DispatchOutcome;
use gaugebridge_types::{ChannelBinding, Scalar, Update};

#[test]
fn test_fan_out_invokes_each_handler_once() {
    let h = harness(&[
        ChannelBinding::new("a", "a_value"),
        ChannelBinding::new("b", "b_value"),
        ChannelBinding::new("a", "a_bit_0").with_extract_bit(0),
        ChannelBinding::new("a", "a_bit_2").with_extract_bit(2),
    ]);

    let outcome = h.dispatcher.dispatch(&Update::value("a", Scalar::UInt8(0x04)));
    assert_eq!(outcome, DispatchOutcome::Handled { succeeded: 3, failed: 0 });

    assert_eq!(h.factory.values("a_value"), vec![4.0]);
    assert_eq!(h.factory.values("a_bit_0"), vec![0.0]);
    assert_eq!(h.factory.values("a_bit_2"), vec![1.0]);
    assert!(h.factory.values("b_value").is_empty());
}

#[test]
fn test_failing_handler_does_not_stop_the_rest() {
    let h = harness(&[
        ChannelBinding::new("a", "first"),
        ChannelBinding::new("a", "out_of_range").with_extract_bit(22),
        ChannelBinding::new("a", "last"),
    ]);

    let outcome = h.dispatcher.dispatch(&Update::value("a", Scalar::UInt16(32768)));
    assert_eq!(outcome, DispatchOutcome::Handled { succeeded: 2, failed: 1 });
    assert_eq!(h.factory.values("first"), vec![32768.0]);
    assert!(h.factory.values("out_of_range").is_empty());
    assert_eq!(h.factory.values("last"), vec![32768.0]);
}

#[test]
fn test_unsupported_value_sets_nothing() {
    let h = harness(&[ChannelBinding::new("a", "a_value")]);
    let outcome = h
        .dispatcher
        .dispatch(&Update::value("a", Scalar::Text("not a number".into())));
    assert_eq!(outcome, DispatchOutcome::Handled { succeeded: 0, failed: 1 });
    assert!(h.factory.values("a_value").is_empty());
}

#[test]
fn test_skipped_updates_are_still_counted() {
    let h = harness(&[ChannelBinding::new("a", "a_value")]);

    assert_eq!(
        h.dispatcher.dispatch(&Update::error("a", "BadNodeIdUnknown")),
        DispatchOutcome::UpstreamError
    );
    assert_eq!(h.dispatcher.dispatch(&Update::empty("a")), DispatchOutcome::NoValue);
    assert_eq!(
        h.dispatcher.dispatch(&Update::value("a", Scalar::Null)),
        DispatchOutcome::NoValue
    );
    assert_eq!(
        h.dispatcher.dispatch(&Update::value("unconfigured", Scalar::Bool(true))),
        DispatchOutcome::Unbound
    );
    assert!(h.factory.values("a_value").is_empty());

    let snap = h.summary.snapshot();
    assert_eq!(snap.counts["a"], 3);
    assert_eq!(snap.counts["unconfigured"], 1);
    assert_eq!(snap.total, 4);
}

#[test]
fn test_updates_apply_in_order() {
    let h = harness(&[ChannelBinding::new("a", "a_value")]);
    for v in [1.5, -2.0, 7.25] {
        h.dispatcher.dispatch(&Update::value("a", Scalar::Double(v)));
    }
    assert_eq!(h.factory.values("a_value"), vec![1.5, -2.0, 7.25]);
}
