//! A synchronous replacement for the teacher's `des`-scheduled `TimerCtrl`
//! (`examples/PetrichorIT-inet/inet/src/ipv6/timer.rs`): instead of handing
//! a message to a discrete-event runtime and waking up when it arrives, the
//! engine owns a small deadline heap and the host stack calls [`TimerWheel::poll`]
//! whenever its own clock fires (or before blocking on the next
//! [`TimerWheel::next_deadline`]).

use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    time::{Duration, Instant},
};

use crate::ids::IfId;

/// What a fired timer was scheduled to do. The engine's top level
/// (`crate::engine`) matches on this to run the appropriate component
/// logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Retransmit a Neighbor Solicitation for a cache entry under active
    /// resolution or NUD probing.
    NeighborSolicitationRetransmit,
    /// An entry's reachable-time window elapsed; transition `REACHABLE` ->
    /// `STALE`.
    ReachableTimeout,
    /// An entry's delay-first-probe window elapsed; transition `DELAY` ->
    /// `PROBE`.
    DelayFirstProbe,
    /// Retransmit a Router Solicitation on interface bring-up.
    RouterSolicitationRetransmit,
    /// A default router's lifetime elapsed.
    RouterLifetimeExpiry,
    /// A prefix's valid lifetime elapsed.
    PrefixValidLifetimeExpiry,
    /// Retransmit (or conclude) a DAD probe sequence.
    DadProbe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub ifid: IfId,
    pub kind: TimerKind,
    /// Opaque sequence number identifying which entry/router/prefix/DAD
    /// task this timer belongs to; interpreted by the caller, not by the
    /// wheel itself.
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    deadline: Instant,
    token: TimerToken,
    /// Timers are invalidated rather than removed from the heap (a binary
    /// heap has no efficient arbitrary removal); `generation` lets a
    /// cancellation bump a counter the firing check compares against.
    generation: u64,
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline.cmp(&other.deadline)
    }
}

/// A min-heap of pending deadlines, keyed loosely by `TimerToken` so stale
/// entries left behind by a cancellation are silently dropped when they'd
/// otherwise fire.
#[derive(Debug, Default)]
pub struct TimerWheel {
    heap: BinaryHeap<Reverse<Scheduled>>,
    generation: u64,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new(), generation: 0 }
    }

    pub fn schedule(&mut self, now: Instant, after: Duration, token: TimerToken) {
        self.heap.push(Reverse(Scheduled {
            deadline: now + after,
            token,
            generation: self.generation,
        }));
    }

    /// Invalidates every still-pending timer. Used when an entry/router/
    /// prefix is removed outright; a generation bump is cheaper than
    /// scanning the heap for matching tokens.
    pub fn cancel_all(&mut self) {
        self.generation += 1;
        self.heap.clear();
    }

    /// Removes and returns every timer whose deadline is `<= now`.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerToken> {
        let mut fired = Vec::new();
        while let Some(Reverse(top)) = self.heap.peek() {
            if top.deadline > now {
                break;
            }
            let Reverse(top) = self.heap.pop().unwrap();
            if top.generation == self.generation {
                fired.push(top.token);
            }
        }
        fired
    }

    /// The earliest pending deadline, if any, for a caller that wants to
    /// sleep until the next event instead of polling.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(s)| s.deadline)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(seq: u64) -> TimerToken {
        TimerToken { ifid: IfId(0), kind: TimerKind::ReachableTimeout, seq }
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut wheel = TimerWheel::new();
        let now = Instant::now();
        wheel.schedule(now, Duration::from_millis(50), token(2));
        wheel.schedule(now, Duration::from_millis(10), token(1));
        wheel.schedule(now, Duration::from_millis(30), token(3));

        let fired = wheel.poll(now + Duration::from_millis(40));
        assert_eq!(fired, vec![token(1), token(3)]);
        assert_eq!(wheel.next_deadline(), Some(now + Duration::from_millis(50)));
    }

    #[test]
    fn cancel_all_invalidates_pending_timers() {
        let mut wheel = TimerWheel::new();
        let now = Instant::now();
        wheel.schedule(now, Duration::from_millis(5), token(1));
        wheel.cancel_all();
        let fired = wheel.poll(now + Duration::from_millis(100));
        assert!(fired.is_empty());
    }
}
