// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Round-trip properties for the wire framing: for any `Request`/`Response`
//! value, encode-then-decode must reproduce it.

use proptest::prelude::*;

use crate::{decode, encode, Request, Response, TickSummary};

fn arb_request() -> impl Strategy<Value = Request> {
    prop_oneof![Just(Request::Ping), Just(Request::Status), Just(Request::Shutdown)]
}

fn arb_tick_summary() -> impl Strategy<Value = TickSummary> {
    (
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        prop::collection::vec("[a-z_]{0,12}", 0..4),
        prop::collection::vec("[a-z_]{0,12}", 0..4),
    )
        .prop_map(|(tick_number, started_at_ms, duration_ms, check_lines, errors)| TickSummary {
            tick_number,
            started_at_ms,
            duration_ms,
            check_lines,
            errors,
        })
}

fn arb_response() -> impl Strategy<Value = Response> {
    prop_oneof![
        Just(Response::Pong),
        Just(Response::ShuttingDown),
        "[a-z ]{0,40}".prop_map(|message| Response::Error { message }),
        (any::<u32>(), any::<u64>(), proptest::option::of(arb_tick_summary()), any::<usize>(), any::<usize>(), any::<usize>()).prop_map(
            |(pid, uptime_secs, last_tick, alive_agent_count, pending_escalation_count, merge_queue_depth)| {
                Response::Status {
                    pid,
                    uptime_secs,
                    last_tick,
                    alive_agent_count,
                    pending_escalation_count,
                    merge_queue_depth,
                }
            }
        ),
    ]
}

proptest! {
    #[test]
    fn request_round_trips(req in arb_request()) {
        let frame = encode(&req).unwrap();
        let decoded: Request = decode(&frame[4..]).unwrap();
        prop_assert_eq!(req, decoded);
    }

    #[test]
    fn response_round_trips(resp in arb_response()) {
        let frame = encode(&resp).unwrap();
        let decoded: Response = decode(&frame[4..]).unwrap();
        prop_assert_eq!(resp, decoded);
    }
}
