//! End-to-end sessions against the in-memory transport.

use openept_core::{
    FakeError, FakeTransport, Link, LinkConfig, LinkError, LinkState, SyncLevel, WireEvent,
};
use openept_protocol::{FrameParser, MsgType};

/// Parse everything the device sent into (type, payload) pairs
fn decode(bytes: &[u8]) -> Vec<(MsgType, Vec<u8>)> {
    let mut parser: FrameParser = FrameParser::new();
    bytes
        .iter()
        .filter_map(|&b| parser.feed(b).expect("well-formed output"))
        .map(|f| (f.msg_type, f.payload.to_vec()))
        .collect()
}

#[test]
fn full_session() {
    let mut link: Link<_> = Link::new(FakeTransport::with_response(b"OK\rOK\r").unwrap());
    link.init().unwrap();
    link.send_info("EP Link started").unwrap();
    link.start().unwrap();
    assert!(link.state().is_linked());

    link.set_ep_fast(b"regionA").unwrap();
    link.set_ep_slow(b"regionB").unwrap();
    link.stop().unwrap();
    assert_eq!(link.state(), LinkState::Idle);

    let transport = link.release();
    assert_eq!(
        &transport.sent_bytes()[..],
        &b"2:EP Link started\r0:START\r\r1:regionA\r0:regionB\r0:STOP\r\r"[..]
    );
    assert_eq!(transport.pending_rx(), 0);
    assert_eq!(transport.events()[0], WireEvent::Init);
}

#[test]
fn session_output_parses_back() {
    let mut link: Link<_> = Link::new(FakeTransport::with_response(b"OK\r").unwrap());
    link.init().unwrap();
    link.start().unwrap();
    link.set_ep_fast(b"DataL sending 1").unwrap();
    link.send_info("note").unwrap();

    let frames = decode(&link.transport().sent_bytes());
    // The control payload's own '\r' ends the line early; the trailing
    // terminator then shows up as a blank line the parser skips
    assert_eq!(
        frames,
        vec![
            (MsgType::Control, b"START".to_vec()),
            (MsgType::EnergyPoint, b"DataL sending 1".to_vec()),
            (MsgType::Info, b"note".to_vec()),
        ]
    );
}

#[test]
fn rejected_start_sends_once() {
    let mut link: Link<_> = Link::new(FakeTransport::with_response(b"FAIL\r").unwrap());
    link.init().unwrap();

    assert_eq!(link.start(), Err(LinkError::Rejected));
    assert_eq!(&link.transport().sent_bytes()[..], b"0:START\r\r");
    assert!(link.receive_buffer().is_empty());
}

#[test]
fn silent_device_times_out_after_each_attempt() {
    for attempts in 1..=4u8 {
        let mut link: Link<_> =
            Link::with_config(FakeTransport::new(), LinkConfig::new(attempts));
        link.init().unwrap();

        assert_eq!(link.start(), Err(LinkError::Timeout));
        let sent = link.transport().sent_bytes();
        assert_eq!(sent.len(), b"0:START\r\r".len() * attempts as usize);
        assert_eq!(link.transport().read_count(), attempts as usize);
    }
}

#[test]
fn zero_attempts_still_tries_once() {
    let mut link: Link<_> = Link::with_config(FakeTransport::new(), LinkConfig::new(0));
    assert_eq!(link.config().max_attempts, 1);
    assert_eq!(link.stop(), Err(LinkError::Timeout));
    assert_eq!(link.transport().read_count(), 1);
}

#[test]
fn fast_marks_alternate_the_line() {
    let mut link: Link<_> = Link::new(FakeTransport::new());
    link.init().unwrap();

    let mut expected = SyncLevel::Low;
    for i in 0..5 {
        let name = [b'a' + i];
        link.set_ep_fast(&name).unwrap();
        expected = expected.toggled();
        assert_eq!(link.sync_level(), expected);
        assert_eq!(link.transport().sync_is_high(), expected.is_high());
    }
    assert_eq!(link.transport().toggle_count(), 5);
}

#[test]
fn slow_mark_holds_line_for_every_byte() {
    let mut link: Link<_> = Link::new(FakeTransport::new());
    link.init().unwrap();
    link.transport_mut().clear_events();

    link.set_ep_slow(b"flash erase").unwrap();

    let bytes: Vec<_> = link
        .transport()
        .events()
        .iter()
        .filter_map(|e| match e {
            WireEvent::Byte { sync_high, .. } => Some(*sync_high),
            _ => None,
        })
        .collect();
    assert_eq!(bytes.len(), b"0:flash erase\r".len());
    assert!(bytes.iter().all(|high| *high));
    assert!(!link.transport().sync_is_high());
}

#[test]
fn slow_mark_send_failure_leaves_line_high() {
    let mut link: Link<_> = Link::new(FakeTransport::new());
    link.init().unwrap();
    link.transport_mut().fail_sends_after(0);

    assert_eq!(
        link.set_ep_slow(b"x"),
        Err(LinkError::Transport(FakeError::SendFailed))
    );
    assert!(link.transport().sync_is_high());
}

#[test]
fn fast_mark_toggle_failure_sends_nothing() {
    let mut link: Link<_> = Link::new(FakeTransport::new());
    link.init().unwrap();
    link.transport_mut().clear_events();
    link.transport_mut().fail_syncs_after(0);

    assert_eq!(
        link.set_ep_fast(b"regionA"),
        Err(LinkError::Transport(FakeError::SyncFailed))
    );
    assert!(link.transport().sent_bytes().is_empty());
    assert_eq!(link.sync_level(), SyncLevel::Low);
}

#[test]
fn slow_mark_sync_up_failure_sends_nothing() {
    let mut link: Link<_> = Link::new(FakeTransport::new());
    link.init().unwrap();
    link.transport_mut().clear_events();
    link.transport_mut().fail_syncs_after(0);

    assert_eq!(
        link.set_ep_slow(b"bulk"),
        Err(LinkError::Transport(FakeError::SyncFailed))
    );
    assert!(link.transport().events().is_empty());
    assert_eq!(link.sync_level(), SyncLevel::Low);
}

#[test]
fn slow_mark_sync_down_failure_after_full_frame() {
    let mut link: Link<_> = Link::new(FakeTransport::new());
    link.init().unwrap();
    link.transport_mut().clear_events();
    link.transport_mut().fail_syncs_after(1);

    assert_eq!(
        link.set_ep_slow(b"bulk"),
        Err(LinkError::Transport(FakeError::SyncFailed))
    );
    assert_eq!(&link.transport().sent_bytes()[..], b"0:bulk\r");
    assert_eq!(link.sync_level(), SyncLevel::High);
    assert!(link.transport().sync_is_high());
}

#[test]
fn overflow_does_not_leak_into_next_handshake() {
    let transport = FakeTransport::with_response(b"TOOLONG\rOK\r").unwrap();
    let mut link: Link<FakeTransport, 4> = Link::new(transport);
    link.init().unwrap();

    assert_eq!(link.start(), Err(LinkError::BufferOverflow));
    assert_eq!(link.start(), Ok(()));
    assert!(link.state().is_linked());
    assert_eq!(link.transport().pending_rx(), 0);
}

#[test]
fn oversized_reply_reports_overflow() {
    let reply = [b'X'; 40];
    let mut transport = FakeTransport::new();
    transport.queue_response(&reply).unwrap();
    transport.queue_response(b"\r").unwrap();

    let mut link: Link<FakeTransport, 16> = Link::new(transport);
    link.init().unwrap();
    assert_eq!(link.start(), Err(LinkError::BufferOverflow));
    assert!(link.receive_buffer().is_empty());
    assert_eq!(link.state(), LinkState::Idle);
    assert_eq!(link.transport().pending_rx(), 0);
}

#[test]
fn reply_filling_buffer_exactly_is_accepted() {
    let transport = FakeTransport::with_response(b"OK\r").unwrap();
    let mut link: Link<FakeTransport, 3> = Link::new(transport);
    link.init().unwrap();
    assert_eq!(link.start(), Ok(()));
}

#[test]
fn invalid_names_touch_nothing() {
    let mut link: Link<_> = Link::new(FakeTransport::new());
    link.init().unwrap();
    link.transport_mut().clear_events();

    assert_eq!(link.set_ep_fast(b"a\rb"), Err(LinkError::InvalidPayload));
    assert_eq!(link.set_ep_slow(b"a\rb"), Err(LinkError::InvalidPayload));
    assert_eq!(link.send_ep_name(b"\r"), Err(LinkError::InvalidPayload));
    assert!(link.transport().events().is_empty());
}

#[test]
fn init_resets_after_failures() {
    let mut link: Link<_> = Link::new(FakeTransport::new());
    link.init().unwrap();
    link.sync_up().unwrap();
    assert_eq!(link.start(), Err(LinkError::Timeout));

    link.init().unwrap();
    assert_eq!(link.sync_level(), SyncLevel::Low);
    assert!(!link.transport().sync_is_high());
    assert_eq!(link.state(), LinkState::Idle);
}

#[test]
fn link_works_through_mutable_reference() {
    let mut transport = FakeTransport::with_response(b"OK\r").unwrap();
    {
        let mut link: Link<&mut FakeTransport> = Link::new(&mut transport);
        link.init().unwrap();
        link.start().unwrap();
    }
    assert_eq!(&transport.sent_bytes()[..], b"0:START\r\r");
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn name() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>().prop_filter("no terminator", |b| *b != b'\r'), 0..48)
    }

    proptest! {
        #[test]
        fn fast_mark_is_one_toggle_then_frame(name in name()) {
            let mut link: Link<_> = Link::new(FakeTransport::new());
            link.init().unwrap();
            link.transport_mut().clear_events();

            link.set_ep_fast(&name).unwrap();

            let events = link.transport().events();
            prop_assert_eq!(events[0], WireEvent::SyncToggle);
            prop_assert_eq!(link.transport().toggle_count(), 1);

            let mut expected = b"1:".to_vec();
            expected.extend_from_slice(&name);
            expected.push(b'\r');
            prop_assert_eq!(&link.transport().sent_bytes()[..], &expected[..]);
        }

        #[test]
        fn slow_mark_never_sends_with_line_low(name in name()) {
            let mut link: Link<_> = Link::new(FakeTransport::new());
            link.init().unwrap();

            link.set_ep_slow(&name).unwrap();

            let low_bytes = link
                .transport()
                .events()
                .iter()
                .filter(|e| matches!(e, WireEvent::Byte { sync_high: false, .. }))
                .count();
            prop_assert_eq!(low_bytes, 0);
            prop_assert!(!link.transport().sync_is_high());
        }
    }
}
