//! The default router list (C3), grounded on the teacher's
//! `DefaultRouterList` in `examples/PetrichorIT-inet/inet/src/ipv6/ndp.rs`,
//! keyed per-interface (§9 Open Question resolution: round-robin selection
//! is confined to one interface's routers, not pooled across interfaces).

use std::{net::Ipv6Addr, time::Instant};

use fxhash::FxHashMap;

use crate::ids::IfId;

/// A router's neighbor-reachability status as seen by [`RouterList::select_with`]
/// (§4.3 selection algorithm); computed by the caller from the neighbor
/// cache since `RouterList` itself has no visibility into C2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterReachability {
    Reachable,
    Incomplete,
    Other,
}

#[derive(Debug, Clone)]
pub struct RouterEntry {
    pub addr: Ipv6Addr,
    /// Wall-clock deadline at which this router is no longer a default
    /// router, derived from the advertisement's `router_lifetime`.
    pub expires_at: Instant,
}

#[derive(Default)]
struct PerInterface {
    routers: Vec<RouterEntry>,
    next: usize,
}

/// The set of default routers known on every interface.
#[derive(Default)]
pub struct RouterList {
    by_iface: FxHashMap<IfId, PerInterface>,
}

impl RouterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a Router Advertisement's `(addr, router_lifetime)` pair.
    /// `lifetime_secs == 0` removes `addr` from the list (RFC 4861 §6.3.4).
    pub fn update(&mut self, ifid: IfId, addr: Ipv6Addr, lifetime_secs: u16, now: Instant) {
        let per = self.by_iface.entry(ifid).or_default();
        if lifetime_secs == 0 {
            per.routers.retain(|r| r.addr != addr);
            return;
        }
        let expires_at = now + std::time::Duration::from_secs(lifetime_secs as u64);
        if let Some(existing) = per.routers.iter_mut().find(|r| r.addr == addr) {
            existing.expires_at = expires_at;
        } else {
            per.routers.push(RouterEntry { addr, expires_at });
        }
    }

    /// Drops routers whose lifetime has elapsed as of `now`; returns the
    /// addresses removed so the caller can also purge matching destination
    /// cache next-hop entries.
    pub fn expire(&mut self, ifid: IfId, now: Instant) -> Vec<Ipv6Addr> {
        let Some(per) = self.by_iface.get_mut(&ifid) else { return Vec::new() };
        let (keep, expired): (Vec<_>, Vec<_>) =
            per.routers.drain(..).partition(|r| r.expires_at > now);
        per.routers = keep;
        expired.into_iter().map(|r| r.addr).collect()
    }

    /// Round-robin default router selection (RFC 4861 §6.3.6): successive
    /// calls cycle through the known routers on `ifid`, with no preference
    /// among them. Used directly by callers that have no notion of
    /// per-router neighbor reachability; [`Self::select_with`] implements
    /// the full §4.3 preference order.
    pub fn select(&mut self, ifid: IfId) -> Option<Ipv6Addr> {
        self.select_with(ifid, |_| RouterReachability::Other)
    }

    /// Default router selection per §4.3: prefer any router whose
    /// associated neighbor `status` reports `Reachable`; else round-robin
    /// over routers whose neighbor is not `Incomplete`; else round-robin
    /// over all routers on `ifid`. Rotation only advances within whichever
    /// pool the round-robin branch picked from, so preferring a
    /// `Reachable` router never perturbs the round-robin sequence.
    pub fn select_with<F>(&mut self, ifid: IfId, mut status: F) -> Option<Ipv6Addr>
    where
        F: FnMut(Ipv6Addr) -> RouterReachability,
    {
        let per = self.by_iface.get_mut(&ifid)?;
        if per.routers.is_empty() {
            return None;
        }

        if let Some(r) = per.routers.iter().find(|r| status(r.addr) == RouterReachability::Reachable) {
            return Some(r.addr);
        }

        let eligible: Vec<usize> = per
            .routers
            .iter()
            .enumerate()
            .filter(|(_, r)| status(r.addr) != RouterReachability::Incomplete)
            .map(|(i, _)| i)
            .collect();
        let pool = if eligible.is_empty() { (0..per.routers.len()).collect() } else { eligible };

        per.next %= pool.len();
        let addr = per.routers[pool[per.next]].addr;
        per.next = (per.next + 1) % pool.len();
        Some(addr)
    }

    pub fn is_empty(&self, ifid: IfId) -> bool {
        self.by_iface.get(&ifid).map_or(true, |p| p.routers.is_empty())
    }

    /// All default routers currently known on `ifid`, for diagnostics.
    pub fn entries(&self, ifid: IfId) -> &[RouterEntry] {
        self.by_iface.get(&ifid).map_or(&[], |p| p.routers.as_slice())
    }

    pub fn remove_interface(&mut self, ifid: IfId) {
        self.by_iface.remove(&ifid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lifetime_removes_router() {
        let mut list = RouterList::new();
        let now = Instant::now();
        list.update(IfId(0), Ipv6Addr::LOCALHOST, 1800, now);
        assert!(!list.is_empty(IfId(0)));
        list.update(IfId(0), Ipv6Addr::LOCALHOST, 0, now);
        assert!(list.is_empty(IfId(0)));
    }

    #[test]
    fn round_robin_cycles_through_routers() {
        let mut list = RouterList::new();
        let now = Instant::now();
        let a = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        let b = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);
        list.update(IfId(0), a, 1800, now);
        list.update(IfId(0), b, 1800, now);
        let first = list.select(IfId(0)).unwrap();
        let second = list.select(IfId(0)).unwrap();
        let third = list.select(IfId(0)).unwrap();
        assert_ne!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn select_with_prefers_reachable_router_over_round_robin() {
        let mut list = RouterList::new();
        let now = Instant::now();
        let a = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        let b = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);
        list.update(IfId(0), a, 1800, now);
        list.update(IfId(0), b, 1800, now);

        // b is REACHABLE, a is not: b wins every time regardless of rotation.
        for _ in 0..3 {
            let picked = list.select_with(IfId(0), |addr| {
                if addr == b { RouterReachability::Reachable } else { RouterReachability::Other }
            });
            assert_eq!(picked, Some(b));
        }
    }

    #[test]
    fn select_with_skips_incomplete_routers_when_an_alternative_exists() {
        let mut list = RouterList::new();
        let now = Instant::now();
        let a = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        let b = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);
        list.update(IfId(0), a, 1800, now);
        list.update(IfId(0), b, 1800, now);

        for _ in 0..3 {
            let picked = list.select_with(IfId(0), |addr| {
                if addr == a { RouterReachability::Incomplete } else { RouterReachability::Other }
            });
            assert_eq!(picked, Some(b));
        }
    }

    #[test]
    fn expire_drops_lapsed_routers_only() {
        let mut list = RouterList::new();
        let now = Instant::now();
        let a = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        list.update(IfId(0), a, 1, now);
        let expired = list.expire(IfId(0), now + std::time::Duration::from_secs(2));
        assert_eq!(expired, vec![a]);
        assert!(list.is_empty(IfId(0)));
    }
}
