//! Address resolution (C7), grounded on the shape of the teacher's
//! `arp::arp_lookup` (`examples/PetrichorIT-inet/inet/src/arp/mod.rs`):
//! given a destination, determine the on-link next hop via the destination
//! cache / prefix list / default router list, then drive the neighbor cache
//! to resolve that next hop's link-layer address.

use std::net::Ipv6Addr;

use ndp_types::MacAddress;

use crate::{
    cache::{NeighborCache, NeighborState},
    destination::DestinationCache,
    error::{ResolveError, ResolveOutcome},
    ids::IfId,
    prefix::PrefixList,
    router::{RouterList, RouterReachability},
};

/// What the caller must additionally do once `resolve` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveAction {
    None,
    /// A fresh `INCOMPLETE` entry was created for `next_hop`; multicast a
    /// Neighbor Solicitation to it.
    StartResolution { next_hop: Ipv6Addr },
    /// `next_hop`'s entry just served traffic while `STALE`; the caller
    /// should start the delay-first-probe timer for it.
    EnteredDelay { next_hop: Ipv6Addr },
}

/// Determines the on-link next hop for `dst`, consulting (in order) the
/// destination cache, the prefix list's on-link determination, and
/// preference-ordered default router selection (§4.3: a router whose
/// neighbor entry is `REACHABLE` first, else round-robin over non-
/// `INCOMPLETE` routers, else round-robin over all) — creating and caching
/// the decision if this is the first time `dst` is seen. A miss with no
/// router available is cached as a negative (`valid=false`) entry so
/// repeated sends don't re-walk the router list (§4.5).
pub(crate) fn next_hop(
    ifid: IfId,
    dst: Ipv6Addr,
    destinations: &mut DestinationCache,
    prefixes: &PrefixList,
    routers: &mut RouterList,
    neighbors: &NeighborCache,
) -> Option<Ipv6Addr> {
    if let Some(entry) = destinations.lookup(ifid, dst) {
        return entry.valid.then_some(entry.next_hop);
    }
    if prefixes.is_on_link(ifid, dst) {
        destinations.set(ifid, dst, dst, true);
        return Some(dst);
    }
    let Some(next_hop) = routers.select_with(ifid, |addr| {
        match neighbors.lookup_entry(ifid, addr).map(|e| e.state) {
            Some(NeighborState::Reachable) => RouterReachability::Reachable,
            Some(NeighborState::Incomplete) => RouterReachability::Incomplete,
            Some(_) | None => RouterReachability::Other,
        }
    }) else {
        destinations.mark_no_route(ifid, dst);
        return None;
    };
    destinations.set(ifid, dst, next_hop, false);
    Some(next_hop)
}

/// Resolves `dst`'s link-layer address, enqueuing `payload` (if any) on the
/// owning neighbor cache entry when resolution is not yet complete.
pub fn resolve(
    ifid: IfId,
    dst: Ipv6Addr,
    payload: Option<Vec<u8>>,
    neighbors: &mut NeighborCache,
    destinations: &mut DestinationCache,
    prefixes: &PrefixList,
    routers: &mut RouterList,
) -> (ResolveOutcome<MacAddress>, ResolveAction) {
    let Some(next_hop) = next_hop(ifid, dst, destinations, prefixes, routers, neighbors) else {
        return (ResolveOutcome::Unresolved(ResolveError::NoRoute), ResolveAction::None);
    };

    let existed = neighbors.lookup(ifid, next_hop).is_some();
    let id = match neighbors.get_or_insert(ifid, next_hop) {
        Ok(id) => id,
        Err(e) => return (ResolveOutcome::Unresolved(e.into()), ResolveAction::None),
    };
    let entry = neighbors.get_mut(id).expect("just inserted");

    match entry.state {
        NeighborState::Incomplete => {
            let action =
                if existed { ResolveAction::None } else { ResolveAction::StartResolution { next_hop } };
            if let Some(payload) = payload {
                if entry.queue.push(payload).is_err() {
                    return (ResolveOutcome::Unresolved(ResolveError::QueueFull), action);
                }
            }
            (ResolveOutcome::Pending, action)
        }
        NeighborState::Reachable => {
            let lladdr = entry.lladdr.expect("non-INCOMPLETE entry always has an lladdr");
            (ResolveOutcome::Resolved(lladdr), ResolveAction::None)
        }
        // §4.7: DELAY and PROBE still have a usable link-layer address, but
        // the entry is mid-revalidation, so only a stale resolution is
        // promised, same as STALE itself.
        NeighborState::Delay | NeighborState::Probe => {
            let lladdr = entry.lladdr.expect("non-INCOMPLETE entry always has an lladdr");
            (ResolveOutcome::StaleResolved(lladdr), ResolveAction::None)
        }
        NeighborState::Stale => {
            let lladdr = entry.lladdr.expect("non-INCOMPLETE entry always has an lladdr");
            // The caller (`engine::resolve`) performs the STALE -> DELAY
            // transition itself, since only it can schedule the
            // corresponding delay-first-probe timer.
            (ResolveOutcome::StaleResolved(lladdr), ResolveAction::EnteredDelay { next_hop })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_link_destination_resolves_to_itself_as_next_hop() {
        let mut neighbors = NeighborCache::new(4, 2);
        let mut destinations = DestinationCache::new();
        let mut prefixes = PrefixList::new();
        let mut routers = RouterList::new();
        let dst = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 5);
        prefixes.update(
            ifid(),
            ndp_types::Ipv6Prefix::new(dst, 64),
            true,
            false,
            3600,
            std::time::Instant::now(),
        );

        let (outcome, action) =
            resolve(ifid(), dst, None, &mut neighbors, &mut destinations, &prefixes, &mut routers);
        assert_eq!(outcome, ResolveOutcome::Pending);
        assert_eq!(action, ResolveAction::StartResolution { next_hop: dst });
    }

    #[test]
    fn off_link_destination_with_no_router_is_unresolved() {
        let mut neighbors = NeighborCache::new(4, 2);
        let mut destinations = DestinationCache::new();
        let prefixes = PrefixList::new();
        let mut routers = RouterList::new();
        let dst = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 5);

        let (outcome, _) =
            resolve(ifid(), dst, None, &mut neighbors, &mut destinations, &prefixes, &mut routers);
        assert_eq!(outcome, ResolveOutcome::Unresolved(ResolveError::NoRoute));

        // The miss is now cached negatively; a second call must not need a
        // router to produce the same verdict.
        let (outcome, _) =
            resolve(ifid(), dst, None, &mut neighbors, &mut destinations, &prefixes, &mut routers);
        assert_eq!(outcome, ResolveOutcome::Unresolved(ResolveError::NoRoute));
    }

    fn ifid() -> IfId {
        IfId(0)
    }
}
