//! The destination cache (C5), grounded on the teacher's `DestinationCache`
//! in `examples/PetrichorIT-inet/inet/src/ipv6/ndp.rs`: maps a destination
//! address to the next-hop address (itself, if on-link; a default router,
//! otherwise) that `resolver.rs` then resolves to a link-layer address.

use std::net::Ipv6Addr;

use fxhash::FxHashMap;

use crate::ids::IfId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationEntry {
    pub next_hop: Ipv6Addr,
    /// True once a Redirect (or direct on-link determination) has pinned
    /// `destination` itself as the next hop.
    pub on_link: bool,
    /// False for a negative-cache entry recorded when no default router
    /// existed at lookup time (§4.5, §8 "valid=false entries may persist
    /// as negative-cache"); such entries short-circuit further lookups
    /// with the same `NoRoute` failure instead of re-walking the router
    /// list on every send.
    pub valid: bool,
}

#[derive(Default)]
pub struct DestinationCache {
    entries: FxHashMap<(IfId, Ipv6Addr), DestinationEntry>,
}

impl DestinationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, ifid: IfId, dst: Ipv6Addr) -> Option<DestinationEntry> {
        self.entries.get(&(ifid, dst)).copied()
    }

    pub fn set(&mut self, ifid: IfId, dst: Ipv6Addr, next_hop: Ipv6Addr, on_link: bool) {
        self.entries.insert((ifid, dst), DestinationEntry { next_hop, on_link, valid: true });
    }

    /// Records that `dst` had no default router to resolve against at
    /// lookup time. Preferred for eviction over a valid entry (§3
    /// `DestinationEntry` invariants).
    pub fn mark_no_route(&mut self, ifid: IfId, dst: Ipv6Addr) {
        self.entries.insert((ifid, dst), DestinationEntry { next_hop: dst, on_link: false, valid: false });
    }

    /// Applies a Redirect message (RFC 4861 §8.1). When `target ==
    /// destination` the destination is reclassified as on-link; otherwise
    /// `target` becomes the new next hop (another, presumably better,
    /// router).
    pub fn apply_redirect(&mut self, ifid: IfId, destination: Ipv6Addr, target: Ipv6Addr) {
        let on_link = target == destination;
        self.set(ifid, destination, target, on_link);
    }

    /// Drops every cached next hop pointing at `next_hop`, used when a
    /// default router's lifetime expires.
    pub fn invalidate_next_hop(&mut self, ifid: IfId, next_hop: Ipv6Addr) {
        self.entries.retain(|(e_ifid, _), e| !(*e_ifid == ifid && e.next_hop == next_hop && !e.on_link));
    }

    pub fn remove_interface(&mut self, ifid: IfId) {
        self.entries.retain(|(e_ifid, _), _| *e_ifid != ifid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_to_self_marks_on_link() {
        let mut cache = DestinationCache::new();
        let dst = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 5);
        cache.set(IfId(0), dst, Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1), false);
        cache.apply_redirect(IfId(0), dst, dst);
        let entry = cache.lookup(IfId(0), dst).unwrap();
        assert!(entry.on_link);
        assert_eq!(entry.next_hop, dst);
    }

    #[test]
    fn redirect_to_another_router_changes_next_hop() {
        let mut cache = DestinationCache::new();
        let dst = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 5);
        let old_router = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        let new_router = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2);
        cache.set(IfId(0), dst, old_router, false);
        cache.apply_redirect(IfId(0), dst, new_router);
        let entry = cache.lookup(IfId(0), dst).unwrap();
        assert!(!entry.on_link);
        assert_eq!(entry.next_hop, new_router);
    }

    #[test]
    fn invalidate_next_hop_leaves_on_link_entries_alone() {
        let mut cache = DestinationCache::new();
        let dst = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 5);
        let router = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        cache.set(IfId(0), dst, router, false);
        cache.set(IfId(0), dst, dst, true);
        cache.invalidate_next_hop(IfId(0), router);
        assert!(cache.lookup(IfId(0), dst).is_some());
    }
}
