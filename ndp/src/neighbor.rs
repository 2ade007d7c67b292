//! The neighbor reachability state machine (C2), grounded on the teacher's
//! `NeighborCacheEntry::{process, update, confirm}` family in
//! `examples/PetrichorIT-inet/inet/src/ipv6/ndp.rs`, generalized to the full
//! RFC 4861 §7.3.2/§7.2.5 transition table the teacher's version only
//! partially implements (the teacher has no `DELAY`/`PROBE` timeout path at
//! all; this module adds it).
//!
//! These functions are pure state transitions over a [`NeighborEntry`]; they
//! return a [`NeighborAction`] describing what the caller (`crate::engine`)
//! must do next (send a probe, flush queued traffic, schedule a timer). The
//! FSM itself never touches collaborators or timers directly.

use std::time::Instant;

use ndp_types::MacAddress;

use crate::cache::{NeighborEntry, NeighborState};

/// A side effect the FSM determined is necessary; the engine performs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborAction {
    /// Nothing further is required.
    None,
    /// Send a Neighbor Solicitation to `target` (multicast if `multicast`
    /// is set, else unicast to the entry's own `lladdr`).
    SendSolicitation { multicast: bool },
    /// The entry now has a link-layer address; flush its queued payloads
    /// to it.
    Flush(MacAddress),
    /// The entry just transitioned into `REACHABLE` (§8: every `REACHABLE`
    /// entry has an armed expiry timer); the caller must schedule one, then
    /// flush `flush` if it carries a freshly learned link-layer address.
    Reachable { flush: Option<MacAddress> },
    /// Retry budget exhausted; the entry should be dropped and the caller
    /// notified via `on_neighbor_unreachable`.
    Unreachable,
}

/// RFC 4861 §7.2.3: a Neighbor Solicitation's Source Link-Layer Address
/// option updates or creates a cache entry. `is_new` tells the caller
/// whether `entry` was just created by `NeighborCache::get_or_insert`.
pub fn on_solicitation(entry: &mut NeighborEntry, slla: Option<MacAddress>, now: Instant) -> NeighborAction {
    let Some(lladdr) = slla else {
        return NeighborAction::None;
    };
    let changed = entry.lladdr != Some(lladdr);
    entry.lladdr = Some(lladdr);
    if entry.state == NeighborState::Incomplete {
        entry.state = NeighborState::Stale;
        entry.stale_since = Some(now);
        entry.probes_sent = 0;
        return NeighborAction::Flush(lladdr);
    }
    if changed {
        entry.state = NeighborState::Stale;
        entry.stale_since = Some(now);
    } else {
        entry.last_confirmed = Some(now);
    }
    NeighborAction::None
}

/// RFC 4861 §7.2.5: applying a received Neighbor Advertisement to the
/// entry it targets.
pub fn on_advertisement(
    entry: &mut NeighborEntry,
    tlla: Option<MacAddress>,
    router: bool,
    solicited: bool,
    override_flag: bool,
    now: Instant,
) -> NeighborAction {
    entry.is_router = router;

    if entry.state == NeighborState::Incomplete {
        let Some(lladdr) = tlla else {
            // No TLLA option on an INCOMPLETE entry: the advertisement is
            // useless for resolution purposes, ignore it.
            return NeighborAction::None;
        };
        entry.lladdr = Some(lladdr);
        entry.probes_sent = 0;
        if solicited {
            entry.state = NeighborState::Reachable;
            entry.last_confirmed = Some(now);
            entry.stale_since = None;
            return NeighborAction::Reachable { flush: Some(lladdr) };
        }
        entry.state = NeighborState::Stale;
        entry.stale_since = Some(now);
        return NeighborAction::Flush(lladdr);
    }

    let same_lladdr = tlla.is_none() || tlla == entry.lladdr;
    if !same_lladdr && !override_flag {
        if solicited && entry.state != NeighborState::Reachable {
            entry.state = NeighborState::Reachable;
            entry.last_confirmed = Some(now);
            entry.stale_since = None;
            return NeighborAction::Reachable { flush: None };
        }
        return NeighborAction::None;
    }

    let mut flush = None;
    if let Some(lladdr) = tlla {
        if Some(lladdr) != entry.lladdr {
            entry.lladdr = Some(lladdr);
            flush = Some(lladdr);
        }
    }

    if solicited {
        entry.state = NeighborState::Reachable;
        entry.probes_sent = 0;
        entry.last_confirmed = Some(now);
        entry.stale_since = None;
        return NeighborAction::Reachable { flush };
    }
    if !same_lladdr {
        entry.state = NeighborState::Stale;
        entry.stale_since = Some(now);
    }

    match flush {
        Some(lladdr) => NeighborAction::Flush(lladdr),
        None => NeighborAction::None,
    }
}

/// Upper-layer traffic was just sent over a `STALE` entry: start the
/// `DELAY` timer (§4.2).
pub fn on_traffic_sent(entry: &mut NeighborEntry) -> bool {
    if entry.state == NeighborState::Stale {
        entry.state = NeighborState::Delay;
        entry.stale_since = None;
        true
    } else {
        false
    }
}

/// `reachable_time` elapsed on a `REACHABLE` entry.
pub fn on_reachable_timeout(entry: &mut NeighborEntry, now: Instant) {
    if entry.state == NeighborState::Reachable {
        entry.state = NeighborState::Stale;
        entry.stale_since = Some(now);
    }
}

/// `delay_first_probe` elapsed on a `DELAY` entry: start actively probing.
pub fn on_delay_timeout(entry: &mut NeighborEntry, max_unicast_solicit: u32) -> NeighborAction {
    if entry.state != NeighborState::Delay {
        return NeighborAction::None;
    }
    entry.state = NeighborState::Probe;
    entry.probes_sent = 0;
    probe_or_give_up(entry, max_unicast_solicit)
}

/// A Neighbor Solicitation retransmit timer fired for an `INCOMPLETE` or
/// `PROBE` entry.
pub fn on_solicit_timeout(entry: &mut NeighborEntry, max_solicit: u32) -> NeighborAction {
    probe_or_give_up(entry, max_solicit)
}

fn probe_or_give_up(entry: &mut NeighborEntry, max_solicit: u32) -> NeighborAction {
    if entry.probes_sent >= max_solicit {
        return NeighborAction::Unreachable;
    }
    entry.probes_sent += 1;
    NeighborAction::SendSolicitation { multicast: entry.state == NeighborState::Incomplete }
}
