//! The neighbor cache (C1), grounded on the teacher's `NeighborCache` /
//! `ArpTable` (`examples/PetrichorIT-inet/inet/src/ipv6/ndp.rs`): an arena of
//! entries keyed by `(interface, protocol address)`, generalized from the
//! teacher's single global `FxHashMap` into an explicit slot arena so stale
//! `EntryId`s can't alias a reused slot's new occupant, and so an eviction
//! candidate can be found without rehashing the whole map.

use fxhash::FxHashMap;
use std::{net::Ipv6Addr, time::Instant};

use ndp_types::{queue::BoundedQueue, MacAddress};

use crate::{
    error::CacheError,
    ids::{EntryId, IfId},
};

/// RFC 4861 §7.3.2 neighbor reachability state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighborState {
    /// Address resolution is in progress; no link-layer address is known.
    Incomplete,
    /// Reachability was confirmed within the last `reachable_time`.
    Reachable,
    /// `reachable_time` elapsed without confirmation; usable, unconfirmed.
    Stale,
    /// Upper-layer traffic was sent to a `STALE` entry; waiting out
    /// `delay_first_probe` before actively probing.
    Delay,
    /// Actively retransmitting unicast Neighbor Solicitations to confirm
    /// reachability.
    Probe,
}

#[derive(Debug, Clone)]
pub struct NeighborEntry {
    pub ifid: IfId,
    pub addr: Ipv6Addr,
    pub lladdr: Option<MacAddress>,
    pub state: NeighborState,
    pub is_router: bool,
    /// Number of Neighbor Solicitations sent in the current `INCOMPLETE`/
    /// `PROBE` episode; compared against `max_multicast_solicit` /
    /// `max_unicast_solicit`.
    pub probes_sent: u32,
    /// Payloads accepted while no link-layer address was known yet
    /// (§4.1's `Unresolved`/`Pending` split).
    pub queue: BoundedQueue<Vec<u8>>,
    pub last_confirmed: Option<Instant>,
    /// When this entry most recently entered `STALE`, used to garbage-
    /// collect entries nobody has used in `stale_timeout` (§4.9's
    /// "Neighbor-cache STALE timeout" knob). `None` whenever the entry is
    /// not currently `STALE`.
    pub stale_since: Option<Instant>,
    /// Monotonic identity surviving slot reuse, used to correlate fired
    /// [`crate::timer::TimerToken`]s back to this entry.
    pub seq: u64,
}

impl NeighborEntry {
    fn new(ifid: IfId, addr: Ipv6Addr, seq: u64, queue_cap: usize) -> Self {
        Self {
            ifid,
            addr,
            lladdr: None,
            state: NeighborState::Incomplete,
            is_router: false,
            probes_sent: 0,
            queue: BoundedQueue::new(queue_cap),
            last_confirmed: None,
            stale_since: None,
            seq,
        }
    }
}

enum Slot {
    Occupied(NeighborEntry),
    Free(Option<usize>),
}

/// An arena-backed neighbor cache for a single NDP engine instance,
/// spanning every interface (entries are disambiguated by the `(IfId,
/// Ipv6Addr)` index key, per §4.1's uniqueness invariant).
#[derive(Default)]
pub struct NeighborCache {
    slots: Vec<Slot>,
    free_head: Option<usize>,
    index: FxHashMap<(IfId, Ipv6Addr), EntryId>,
    cap: usize,
    queue_cap: usize,
    next_seq: u64,
}

impl NeighborCache {
    pub fn new(cap: usize, queue_cap: usize) -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            index: FxHashMap::default(),
            cap,
            queue_cap,
            next_seq: 0,
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&NeighborEntry> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(e)) => Some(e),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut NeighborEntry> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(e)) => Some(e),
            _ => None,
        }
    }

    pub fn lookup(&self, ifid: IfId, addr: Ipv6Addr) -> Option<EntryId> {
        self.index.get(&(ifid, addr)).copied()
    }

    pub fn lookup_entry(&self, ifid: IfId, addr: Ipv6Addr) -> Option<&NeighborEntry> {
        self.lookup(ifid, addr).and_then(|id| self.get(id))
    }

    /// Finds or creates the entry for `(ifid, addr)`. Creation may evict the
    /// least-recently-confirmed `STALE` entry to make room; if no entry is
    /// evictable and the arena is at `cap`, returns [`CacheError::PoolFull`].
    pub fn get_or_insert(&mut self, ifid: IfId, addr: Ipv6Addr) -> Result<EntryId, CacheError> {
        if let Some(id) = self.lookup(ifid, addr) {
            return Ok(id);
        }

        let id = if let Some(free) = self.free_head {
            let next = match &self.slots[free] {
                Slot::Free(next) => *next,
                Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
            };
            self.free_head = next;
            EntryId(free)
        } else if self.slots.len() < self.cap {
            self.slots.push(Slot::Free(None));
            EntryId(self.slots.len() - 1)
        } else {
            let victim = self.find_eviction_candidate().ok_or(CacheError::PoolFull)?;
            self.remove(victim);
            victim
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots[id.0] = Slot::Occupied(NeighborEntry::new(ifid, addr, seq, self.queue_cap));
        self.index.insert((ifid, addr), id);
        Ok(id)
    }

    /// Prefers a `STALE` entry (cheapest to re-resolve) over `REACHABLE`/
    /// `PROBE`/`DELAY`/`INCOMPLETE` ones, mirroring the teacher's MRU-list
    /// eviction bias towards entries nobody is actively depending on.
    fn find_eviction_candidate(&self) -> Option<EntryId> {
        self.slots.iter().enumerate().find_map(|(i, slot)| match slot {
            Slot::Occupied(e) if e.state == NeighborState::Stale => Some(EntryId(i)),
            _ => None,
        })
    }

    pub fn remove(&mut self, id: EntryId) {
        if let Some(Slot::Occupied(entry)) = self.slots.get(id.0) {
            self.index.remove(&(entry.ifid, entry.addr));
            self.slots[id.0] = Slot::Free(self.free_head);
            self.free_head = Some(id.0);
        }
    }

    pub fn remove_interface(&mut self, ifid: IfId) {
        let victims: Vec<EntryId> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Slot::Occupied(e) if e.ifid == ifid => Some(EntryId(i)),
                _ => None,
            })
            .collect();
        for id in victims {
            self.remove(id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &NeighborEntry)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(e) => Some((EntryId(i), e)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u16) -> Ipv6Addr {
        Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, n)
    }

    #[test]
    fn insert_and_lookup_roundtrip() {
        let mut cache = NeighborCache::new(4, 2);
        let id = cache.get_or_insert(IfId(0), addr(1)).unwrap();
        assert_eq!(cache.lookup(IfId(0), addr(1)), Some(id));
        assert_eq!(cache.get(id).unwrap().state, NeighborState::Incomplete);
    }

    #[test]
    fn pool_full_without_evictable_entry() {
        let mut cache = NeighborCache::new(1, 1);
        cache.get_or_insert(IfId(0), addr(1)).unwrap();
        let err = cache.get_or_insert(IfId(0), addr(2)).unwrap_err();
        assert_eq!(err, CacheError::PoolFull);
    }

    #[test]
    fn stale_entry_is_evicted_to_make_room() {
        let mut cache = NeighborCache::new(1, 1);
        let first = cache.get_or_insert(IfId(0), addr(1)).unwrap();
        cache.get_mut(first).unwrap().state = NeighborState::Stale;
        let second = cache.get_or_insert(IfId(0), addr(2)).unwrap();
        assert!(cache.lookup(IfId(0), addr(1)).is_none());
        assert_eq!(cache.lookup(IfId(0), addr(2)), Some(second));
    }

    #[test]
    fn remove_interface_drops_only_its_entries() {
        let mut cache = NeighborCache::new(4, 2);
        cache.get_or_insert(IfId(0), addr(1)).unwrap();
        cache.get_or_insert(IfId(1), addr(1)).unwrap();
        cache.remove_interface(IfId(0));
        assert!(cache.lookup(IfId(0), addr(1)).is_none());
        assert!(cache.lookup(IfId(1), addr(1)).is_some());
    }
}
