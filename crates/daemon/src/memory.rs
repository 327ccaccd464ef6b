// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process, non-persisted bookkeeping the reconciliation checks need
//! across ticks (spec.md §4.3.2a, §4.3.2b, §4.3.3): nudge cooldowns,
//! unchanged-pane-output duration, and stalled-handoff signatures. None of
//! this survives a daemon restart — losing it costs at most one extra
//! nudge or one extra detection cycle, never a correctness violation, since
//! every durable decision still goes through the Store's transactions.

use std::collections::HashMap;

use hive_core::RequirementId;

/// `(count, latest_updated_at_ms)` — identifies a stalled-handoff group so a
/// second detection can tell whether anything has changed since the first.
pub type HandoffSignature = (usize, u64);

#[derive(Debug, Clone, Default)]
struct PaneTrack {
    last_text: String,
    unchanged_since_ms: u64,
}

/// Ephemeral tick-to-tick memory for one Manager Daemon process.
#[derive(Debug, Default)]
pub struct TickMemory {
    last_nudge_ms: HashMap<String, u64>,
    pane_track: HashMap<String, PaneTrack>,
    work_complete_notified: HashMap<String, bool>,
    handoff: HashMap<RequirementId, (HandoffSignature, u64)>,
}

impl TickMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a nudge may be sent to `session` right now, given
    /// `cooldown_ms`. Does not itself record the nudge — call
    /// [`Self::record_nudge`] once the send actually happens.
    pub fn may_nudge(&self, session: &str, now_ms: u64, cooldown_ms: u64) -> bool {
        match self.last_nudge_ms.get(session) {
            Some(last) => now_ms.saturating_sub(*last) >= cooldown_ms,
            None => true,
        }
    }

    pub fn record_nudge(&mut self, session: &str, now_ms: u64) {
        self.last_nudge_ms.insert(session.to_string(), now_ms);
    }

    /// Update the unchanged-output tracker for `session` and return how long
    /// (in ms) its captured pane text has been unchanged.
    pub fn track_pane(&mut self, session: &str, text: &str, now_ms: u64) -> u64 {
        let entry = self.pane_track.entry(session.to_string()).or_insert_with(|| PaneTrack {
            last_text: text.to_string(),
            unchanged_since_ms: now_ms,
        });
        if entry.last_text != text {
            entry.last_text = text.to_string();
            entry.unchanged_since_ms = now_ms;
        }
        now_ms.saturating_sub(entry.unchanged_since_ms)
    }

    /// Whether a `WORK_COMPLETE` completion reminder has already been sent
    /// for `session` (spec.md §4.3.2: "send exactly one completion reminder").
    pub fn work_complete_notified(&self, session: &str) -> bool {
        *self.work_complete_notified.get(session).unwrap_or(&false)
    }

    pub fn mark_work_complete_notified(&mut self, session: &str) {
        self.work_complete_notified.insert(session.to_string(), true);
    }

    /// Clear all per-session tracking for a session that no longer exists
    /// (spun down, killed, or otherwise gone), so a future session reusing
    /// the same name starts with a clean slate.
    pub fn forget_session(&mut self, session: &str) {
        self.last_nudge_ms.remove(session);
        self.pane_track.remove(session);
        self.work_complete_notified.remove(session);
    }

    /// Stalled-handoff two-stage policy bookkeeping (spec.md §4.3.3).
    /// Returns `FirstDetection` the first time `requirement` is seen with
    /// this signature, or the time of the first detection. Returns
    /// `Repeated { first_detected_ms }` on a later call with the same
    /// signature, which the caller compares against
    /// `proactive_handoff_retry_delay_ms`. A changed signature resets the
    /// tracker (the group moved, so an old detection no longer applies).
    pub fn observe_handoff(
        &mut self,
        requirement_id: &RequirementId,
        signature: HandoffSignature,
        now_ms: u64,
    ) -> HandoffObservation {
        match self.handoff.get(requirement_id) {
            Some((sig, first_seen)) if *sig == signature => {
                HandoffObservation::Repeated { first_detected_ms: *first_seen }
            }
            _ => {
                self.handoff.insert(requirement_id.clone(), (signature, now_ms));
                HandoffObservation::FirstDetection
            }
        }
    }

    pub fn forget_handoff(&mut self, requirement_id: &RequirementId) {
        self.handoff.remove(requirement_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffObservation {
    FirstDetection,
    Repeated { first_detected_ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_nudge_is_suppressed_within_the_cooldown_window() {
        let mut memory = TickMemory::new();
        assert!(memory.may_nudge("hive-senior-a", 1_000, 60_000));
        memory.record_nudge("hive-senior-a", 1_000);
        assert!(!memory.may_nudge("hive-senior-a", 30_000, 60_000));
        assert!(memory.may_nudge("hive-senior-a", 61_001, 60_000));
    }

    #[test]
    fn pane_tracking_resets_the_unchanged_clock_on_a_text_change() {
        let mut memory = TickMemory::new();
        assert_eq!(memory.track_pane("s", "hello", 0), 0);
        assert_eq!(memory.track_pane("s", "hello", 5_000), 5_000);
        assert_eq!(memory.track_pane("s", "world", 6_000), 0);
    }

    #[test]
    fn handoff_signature_match_reports_repeated_with_first_seen_time() {
        let mut memory = TickMemory::new();
        let req = RequirementId::new();
        let sig = (2, 1_000);
        assert_eq!(memory.observe_handoff(&req, sig, 1_000), HandoffObservation::FirstDetection);
        assert_eq!(
            memory.observe_handoff(&req, sig, 400_000),
            HandoffObservation::Repeated { first_detected_ms: 1_000 }
        );
    }

    #[test]
    fn a_changed_handoff_signature_resets_the_tracker() {
        let mut memory = TickMemory::new();
        let req = RequirementId::new();
        memory.observe_handoff(&req, (2, 1_000), 1_000);
        assert_eq!(memory.observe_handoff(&req, (3, 2_000), 2_000), HandoffObservation::FirstDetection);
    }
}
