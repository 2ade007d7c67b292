//! The top-level engine (§9 design note: "collapse into one `NdpEngine`
//! value owned by the network stack"), gluing C1-C9 together. Grounded on
//! the call shape of `examples/PetrichorIT-inet/inet/src/ipv6/icmp/mod.rs`'s
//! `ipv6_icmp_recv_*` dispatch, but restructured so every component is an
//! owned field instead of being threaded through a shared `IOContext`.

use std::{
    collections::HashSet,
    net::Ipv6Addr,
    time::{Duration, Instant},
};

use fxhash::FxHashMap;
use ndp_types::{
    icmpv6::{NdpMessage, NdpOption},
    Ipv6AddrExt, Ipv6Prefix, MacAddress,
};
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::{
    cache::{NeighborCache, NeighborState},
    collaborators::Collaborators,
    config::Config,
    dad::{DadAction, DadEngine, DadMode},
    destination::DestinationCache,
    error::{DadOutcome, MessageError, ResolveOutcome},
    ids::{EntryId, IfId},
    message,
    neighbor::{self, NeighborAction},
    prefix::{PrefixAction, PrefixEntry, PrefixList},
    resolver::{self, ResolveAction},
    router::{RouterEntry, RouterList},
    timer::{TimerKind, TimerToken, TimerWheel},
};

/// Ties C1-C9 together for one host stack. Generic over the collaborator
/// implementation so a test harness can substitute a fake one.
pub struct NdpEngine<C: Collaborators> {
    pub config: Config,
    neighbors: NeighborCache,
    routers: RouterList,
    prefixes: PrefixList,
    destinations: DestinationCache,
    dad: DadEngine,
    timers: TimerWheel,
    /// DAD run sequence numbers, so a fired `TimerToken` can be matched
    /// back to an `(ifid, addr)` pair without storing them in the token
    /// itself.
    dad_tasks: FxHashMap<u64, (IfId, Ipv6Addr)>,
    next_dad_seq: u64,
    /// Router Solicitations sent so far on bring-up, per interface
    /// (§"SUPPLEMENTED FEATURES" router solicitation retransmission).
    rs_attempts: FxHashMap<IfId, u32>,
    ifaces: HashSet<IfId>,
    collab: C,
}

impl<C: Collaborators> NdpEngine<C> {
    pub fn new(config: Config, collab: C) -> Self {
        let neighbors = NeighborCache::new(config.neighbor_cache_size, config.tx_queue_cap);
        Self {
            config,
            neighbors,
            routers: RouterList::new(),
            prefixes: PrefixList::new(),
            destinations: DestinationCache::new(),
            dad: DadEngine::new(),
            timers: TimerWheel::new(),
            dad_tasks: FxHashMap::default(),
            next_dad_seq: 0,
            rs_attempts: FxHashMap::default(),
            ifaces: HashSet::new(),
            collab,
        }
    }

    pub fn collaborators(&self) -> &C {
        &self.collab
    }

    pub fn collaborators_mut(&mut self) -> &mut C {
        &mut self.collab
    }

    fn track_iface(&mut self, ifid: IfId) {
        self.ifaces.insert(ifid);
    }

    /// Drops all per-interface state; called when the host stack tears an
    /// interface down.
    pub fn remove_interface(&mut self, ifid: IfId) {
        self.neighbors.remove_interface(ifid);
        self.routers.remove_interface(ifid);
        self.prefixes.remove_interface(ifid);
        self.destinations.remove_interface(ifid);
        self.ifaces.remove(&ifid);
    }

    // ---- C7: resolution ----------------------------------------------

    /// Resolves `dst`'s link-layer address on `ifid`, queuing `payload`
    /// (if given) until resolution completes.
    pub fn resolve(
        &mut self,
        ifid: IfId,
        dst: Ipv6Addr,
        payload: Option<Vec<u8>>,
        now: Instant,
    ) -> ResolveOutcome<MacAddress> {
        self.track_iface(ifid);
        let (outcome, action) = resolver::resolve(
            ifid,
            dst,
            payload,
            &mut self.neighbors,
            &mut self.destinations,
            &self.prefixes,
            &mut self.routers,
        );
        match action {
            ResolveAction::StartResolution { next_hop } => {
                self.send_solicitation(ifid, next_hop, true, now);
            }
            ResolveAction::EnteredDelay { next_hop } => {
                if let Some(id) = self.neighbors.lookup(ifid, next_hop) {
                    if let Some(entry) = self.neighbors.get_mut(id) {
                        if neighbor::on_traffic_sent(entry) {
                            self.timers.schedule(
                                now,
                                self.config.delay_first_probe,
                                TimerToken { ifid, kind: TimerKind::DelayFirstProbe, seq: entry.seq },
                            );
                        }
                    }
                }
            }
            ResolveAction::None => {}
        }
        outcome
    }

    fn send_solicitation(&mut self, ifid: IfId, target: Ipv6Addr, multicast: bool, now: Instant) {
        let slla = self.collab.link_addr(ifid);
        let msg = NdpMessage::NeighborSolicitation(message::build_neighbor_solicitation(target, slla));
        let dst = if multicast { Ipv6Addr::solicited_node_multicast(target) } else { target };
        let src = self.source_for(ifid, dst);
        self.collab.send(ifid, src, dst, msg);

        if let Some(id) = self.neighbors.lookup(ifid, target) {
            if let Some(entry) = self.neighbors.get(id) {
                self.timers.schedule(
                    now,
                    self.config.retrans_timer,
                    TimerToken { ifid, kind: TimerKind::NeighborSolicitationRetransmit, seq: entry.seq },
                );
            }
        }
    }

    /// Picks the source address for outgoing traffic to `dst`. A full
    /// implementation asks the address store for the best-scoped source;
    /// this engine defers that policy entirely to the collaborator, using
    /// the unspecified address as a DAD-probe fallback.
    fn source_for(&self, ifid: IfId, dst: Ipv6Addr) -> Ipv6Addr {
        let _ = (ifid, dst);
        Ipv6Addr::UNSPECIFIED
    }

    // ---- C6 + dispatch: receiving NDP messages ------------------------

    /// `dst` is the packet's IPv6 destination address, needed only to
    /// decide the Override flag on a solicited Neighbor Advertisement
    /// (§4.6: set when the solicitation was unicast, i.e. `dst` was not a
    /// multicast address).
    pub fn recv(
        &mut self,
        ifid: IfId,
        src: Ipv6Addr,
        dst: Ipv6Addr,
        hop_limit: u8,
        msg: NdpMessage,
        now: Instant,
    ) -> Result<(), MessageError> {
        self.track_iface(ifid);
        message::validate_hop_limit(hop_limit)?;

        match msg {
            NdpMessage::RouterSolicitation(_) => {
                // Router-side RA origination is out of scope for this
                // engine; a host silently ignores solicitations.
                trace!(%ifid, %src, "ignoring router solicitation (host-only engine)");
            }
            NdpMessage::RouterAdvertisement(ra) => self.recv_router_advertisement(ifid, src, ra, now),
            NdpMessage::NeighborSolicitation(ns) => {
                message::validate_target_not_multicast(ns.target)?;
                message::validate_slla_with_source(src, &ns.options)?;
                self.recv_neighbor_solicitation(ifid, src, dst, ns, now);
            }
            NdpMessage::NeighborAdvertisement(na) => {
                message::validate_target_not_multicast(na.target)?;
                self.recv_neighbor_advertisement(ifid, na, now);
            }
            NdpMessage::Redirect(rd) => self.recv_redirect(ifid, src, rd, now),
        }
        Ok(())
    }

    fn recv_router_advertisement(
        &mut self,
        ifid: IfId,
        src: Ipv6Addr,
        ra: ndp_types::icmpv6::RouterAdvertisement,
        now: Instant,
    ) {
        self.routers.update(ifid, src, ra.router_lifetime, now);

        if let Some(slla) = message::source_link_layer_address(&ra.options) {
            if let Ok(id) = self.neighbors.get_or_insert(ifid, src) {
                if let Some(entry) = self.neighbors.get_mut(id) {
                    entry.is_router = true;
                    let action = neighbor::on_solicitation(entry, Some(slla), now);
                    self.apply_neighbor_action(ifid, src, action, now);
                }
            }
        }

        let (reachable, retrans) = message::router_advertisement_overrides_timers(&ra);
        let mut rng = rand::thread_rng();
        if let Some(base_ms) = reachable {
            let factor: f64 = rng.gen_range(
                ndp_types::icmpv6::NDP_MIN_RANDOM_FACTOR..=ndp_types::icmpv6::NDP_MAX_RANDOM_FACTOR,
            );
            self.config.reachable_time = Duration::from_millis((base_ms as f64 * factor) as u64);
        }
        if let Some(retrans_ms) = retrans {
            self.config.retrans_timer = Duration::from_millis(retrans_ms as u64);
        }

        for option in &ra.options {
            if let NdpOption::PrefixInformation(info) = option {
                let prefix = info.prefix();
                let action = self.prefixes.update(
                    ifid,
                    prefix,
                    info.on_link,
                    info.autonomous_address_configuration,
                    info.valid_lifetime,
                    now,
                );
                if action == PrefixAction::Autoconfigure {
                    self.autoconfigure_from_prefix(ifid, prefix, info.valid_lifetime, now);
                }
            }
        }
    }

    /// §4.4: an autonomous Prefix Information option either refreshes the
    /// lifetime of a host address the interface already owns under that
    /// prefix, or synthesizes a brand new EUI-64 address and submits it for
    /// DAD — never both for the same prefix.
    fn autoconfigure_from_prefix(
        &mut self,
        ifid: IfId,
        prefix: Ipv6Prefix,
        valid_lifetime_secs: u32,
        now: Instant,
    ) {
        let existing = self
            .collab
            .addrs_on_iface(ifid)
            .into_iter()
            .find(|a| a.prefix_len == prefix.len() && prefix.contains(a.addr));

        if let Some(existing) = existing {
            // RFC 4862 §5.5.3(e): never let a re-advertisement shorten a
            // still-valid address's lifetime below two hours.
            const MIN_CLAMPED_LIFETIME_SECS: u32 = 2 * 60 * 60;
            let clamped = if valid_lifetime_secs < MIN_CLAMPED_LIFETIME_SECS {
                MIN_CLAMPED_LIFETIME_SECS
            } else {
                valid_lifetime_secs
            };
            debug!(%ifid, addr = %existing.addr, clamped, "refreshing autoconfigured address lifetime");
            self.collab.refresh_addr_lifetime(ifid, existing.addr, clamped);
            return;
        }

        let Some(mac) = self.collab.link_addr(ifid) else { return };
        let addr = mac.embed_into(prefix.addr());
        debug!(%ifid, %addr, "autoconfiguring address from prefix information");
        self.collab.autoconfigure_addr(ifid, addr, prefix.len());
        self.start_dad(ifid, addr, DadMode::PrefixDerived, now);
    }

    fn recv_neighbor_solicitation(
        &mut self,
        ifid: IfId,
        src: Ipv6Addr,
        dst: Ipv6Addr,
        ns: ndp_types::icmpv6::NeighborSolicitation,
        now: Instant,
    ) {
        if self.dad.is_running(ifid, ns.target) {
            // §4.6: only an unspecified-source solicitation for our
            // tentative address is someone else's DAD probe colliding with
            // ours (RFC 4862 §5.4.3 case (a)). A specified source is just a
            // peer trying to resolve us while we're still tentative; drop
            // it rather than flagging a collision.
            if src.is_unspecified() {
                self.dad.on_conflicting_message(ifid, ns.target);
            }
            return;
        }

        if !self.collab.has_unicast_addr(ifid, ns.target) {
            return;
        }

        if src.is_unspecified() {
            // A DAD probe from another node for an address we already own
            // outright is a misconfiguration on their end, nothing to
            // update here, but RFC 4861 doesn't ask us to respond to
            // unspecified-source solicitations with an NA.
            return;
        }

        let slla = message::source_link_layer_address(&ns.options);
        if let Ok(id) = self.neighbors.get_or_insert(ifid, src) {
            if let Some(entry) = self.neighbors.get_mut(id) {
                let action = neighbor::on_solicitation(entry, slla, now);
                self.apply_neighbor_action(ifid, src, action, now);
            }
        }

        // §4.6: the override flag is only appropriate when the request was
        // unicast; a multicast-addressed solicitation (the common case, to
        // the solicited-node multicast address) gets override=0 so it
        // never clobbers a peer's own more-authoritative cache entry.
        let override_flag = !dst.is_multicast();
        let lladdr = self.collab.link_addr(ifid).unwrap_or(MacAddress::NULL);
        let na = message::build_neighbor_advertisement(ns.target, lladdr, false, true, override_flag);
        self.collab.send(ifid, ns.target, src, NdpMessage::NeighborAdvertisement(na));
    }

    fn recv_neighbor_advertisement(
        &mut self,
        ifid: IfId,
        na: ndp_types::icmpv6::NeighborAdvertisement,
        now: Instant,
    ) {
        if self.dad.is_running(ifid, na.target) {
            self.dad.on_conflicting_message(ifid, na.target);
            return;
        }

        let Some(id) = self.neighbors.lookup(ifid, na.target) else { return };
        let tlla = message::target_link_layer_address(&na.options);
        let Some(entry) = self.neighbors.get_mut(id) else { return };
        let was_router = entry.is_router;
        let action =
            neighbor::on_advertisement(entry, tlla, na.router, na.solicited, na.override_flag, now);
        self.apply_neighbor_action(ifid, na.target, action, now);

        // §4.2: a router demoting itself to a plain host is no longer a
        // valid default router or next hop for anything already cached.
        if was_router && !na.router {
            debug!(%ifid, target = %na.target, "neighbor is no longer a router, purging dependent state");
            self.routers.update(ifid, na.target, 0, now);
            self.destinations.invalidate_next_hop(ifid, na.target);
        }
    }

    /// §4.5/§4.6: a Redirect is only honored when its source is link-local
    /// and equals the destination's *current* next hop — otherwise any
    /// off-path attacker could retarget traffic by spoofing a Redirect.
    fn recv_redirect(&mut self, ifid: IfId, src: Ipv6Addr, rd: ndp_types::icmpv6::Redirect, now: Instant) {
        if !src.is_link_local() {
            trace!(%ifid, %src, "dropping redirect from non-link-local source");
            return;
        }
        match self.destinations.lookup(ifid, rd.destination) {
            Some(entry) if entry.next_hop == src => {}
            _ => {
                trace!(%ifid, %src, destination = %rd.destination, "dropping redirect not from current next hop");
                return;
            }
        }
        self.destinations.apply_redirect(ifid, rd.destination, rd.target);
        if let Some(tlla) = message::target_link_layer_address(&rd.options) {
            if let Ok(id) = self.neighbors.get_or_insert(ifid, rd.target) {
                if let Some(entry) = self.neighbors.get_mut(id) {
                    let action = neighbor::on_solicitation(entry, Some(tlla), now);
                    self.apply_neighbor_action(ifid, rd.target, action, now);
                }
            }
        }
    }

    fn apply_neighbor_action(&mut self, ifid: IfId, addr: Ipv6Addr, action: NeighborAction, now: Instant) {
        match action {
            NeighborAction::None => {}
            NeighborAction::Flush(lladdr) => {
                if let Some(id) = self.neighbors.lookup(ifid, addr) {
                    if let Some(entry) = self.neighbors.get_mut(id) {
                        for payload in entry.queue.drain() {
                            self.collab.send_queued(ifid, lladdr, payload);
                        }
                    }
                }
            }
            // §8: every REACHABLE entry has an armed expiry timer. This is
            // the only place besides `confirm_reachable` that enters
            // REACHABLE, so it arms the timer the same way.
            NeighborAction::Reachable { flush } => {
                if let Some(id) = self.neighbors.lookup(ifid, addr) {
                    if let Some(entry) = self.neighbors.get_mut(id) {
                        self.timers.schedule(
                            now,
                            self.config.reachable_time,
                            TimerToken { ifid, kind: TimerKind::ReachableTimeout, seq: entry.seq },
                        );
                        if let Some(lladdr) = flush {
                            for payload in entry.queue.drain() {
                                self.collab.send_queued(ifid, lladdr, payload);
                            }
                        }
                    }
                }
            }
            NeighborAction::SendSolicitation { multicast } => {
                self.send_solicitation(ifid, addr, multicast, now);
            }
            NeighborAction::Unreachable => {
                if let Some(id) = self.neighbors.lookup(ifid, addr) {
                    self.neighbors.remove(id);
                }
                self.collab.on_neighbor_unreachable(ifid, addr);
            }
        }
    }

    // ---- C6/C9: router solicitation on interface bring-up ----------------

    /// Kicks off the boot-time Router Solicitation retry loop (§"SUPPLEMENTED
    /// FEATURES"): sends up to `max_rtr_solicitations`, `rtr_solicitation_interval`
    /// apart, delaying the very first one by a random jitter in
    /// `[0, NDP_MAX_RTR_SOLICITATION_DELAY)`, and stops early as soon as any
    /// Router Advertisement is received.
    pub fn start_router_solicitation(&mut self, ifid: IfId, now: Instant) {
        self.track_iface(ifid);
        self.rs_attempts.insert(ifid, 0);
        let max_delay_ms = ndp_types::icmpv6::NDP_MAX_RTR_SOLICITATION_DELAY.as_millis().max(1) as u64;
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..max_delay_ms));
        self.timers.schedule(
            now,
            jitter,
            TimerToken { ifid, kind: TimerKind::RouterSolicitationRetransmit, seq: 0 },
        );
    }

    fn fire_router_solicitation_retransmit(&mut self, ifid: IfId, now: Instant) {
        if !self.routers.is_empty(ifid) {
            self.rs_attempts.remove(&ifid);
            return;
        }
        let attempts = self.rs_attempts.entry(ifid).or_insert(0);
        if *attempts >= self.config.max_rtr_solicitations {
            return;
        }
        *attempts += 1;

        let slla = self.collab.link_addr(ifid);
        let rs = message::build_router_solicitation(slla);
        self.collab.send(
            ifid,
            Ipv6Addr::UNSPECIFIED,
            Ipv6Addr::MULTICAST_ALL_ROUTERS,
            NdpMessage::RouterSolicitation(rs),
        );
        self.timers.schedule(
            now,
            self.config.rtr_solicitation_interval,
            TimerToken { ifid, kind: TimerKind::RouterSolicitationRetransmit, seq: 0 },
        );
    }

    // ---- C8: Duplicate Address Detection -------------------------------

    pub fn start_dad(&mut self, ifid: IfId, addr: Ipv6Addr, mode: DadMode, now: Instant) {
        let action = self.dad.start(ifid, addr, mode, self.config.dad_transmits);
        let seq = self.next_dad_seq;
        self.next_dad_seq += 1;
        self.dad_tasks.insert(seq, (ifid, addr));
        self.apply_dad_action(ifid, addr, seq, action, now);
    }

    fn apply_dad_action(&mut self, ifid: IfId, addr: Ipv6Addr, seq: u64, action: DadAction, now: Instant) {
        match action {
            DadAction::SendProbe => {
                let ns = message::build_neighbor_solicitation(addr, None);
                let dst = Ipv6Addr::solicited_node_multicast(addr);
                self.collab.send(ifid, Ipv6Addr::UNSPECIFIED, dst, NdpMessage::NeighborSolicitation(ns));
                self.timers.schedule(
                    now,
                    self.config.retrans_timer,
                    TimerToken { ifid, kind: TimerKind::DadProbe, seq },
                );
            }
            DadAction::Conclude(outcome) => {
                self.dad_tasks.remove(&seq);
                match outcome {
                    DadOutcome::Unique => self.prefixes.record_dad_success(ifid, addr),
                    DadOutcome::Duplicate => {
                        self.prefixes.record_dad_collision(ifid, addr, self.config.dad_max_collisions)
                    }
                }
                warn!(%ifid, %addr, ?outcome, "DAD concluded");
            }
        }
    }

    // ---- C9: timer wheel draining ---------------------------------------

    /// Drives every timer due by `now`: neighbor solicitation retransmits,
    /// reachable/delay timeouts, DAD probes, and periodically expires
    /// default routers and prefixes. The host stack calls this on its own
    /// clock tick (or right before sleeping until
    /// `self.next_deadline()`).
    pub fn poll(&mut self, now: Instant) {
        let fired = self.timers.poll(now);
        for token in fired {
            self.fire(token, now);
        }
        let ifaces: Vec<IfId> = self.ifaces.iter().copied().collect();
        for ifid in ifaces {
            for addr in self.routers.expire(ifid, now) {
                self.destinations.invalidate_next_hop(ifid, addr);
            }
            self.prefixes.expire(ifid, now);
        }
        self.expire_stale_neighbors(now);
    }

    /// Garbage-collects `STALE` entries nobody has used in
    /// `config.stale_timeout` (§4.9 "Neighbor-cache STALE timeout"). Unlike
    /// the `INCOMPLETE`/`PROBE` retry timeouts this isn't itself scheduled
    /// on the timer wheel — a `STALE` entry has no armed timer per §8's
    /// invariant list — so it is swept here instead.
    fn expire_stale_neighbors(&mut self, now: Instant) {
        let expired: Vec<EntryId> = self
            .neighbors
            .iter()
            .filter(|(_, e)| {
                e.state == NeighborState::Stale
                    && e.stale_since.is_some_and(|since| now.duration_since(since) >= self.config.stale_timeout)
            })
            .map(|(id, _)| id)
            .collect();
        for id in expired {
            self.neighbors.remove(id);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn fire(&mut self, token: TimerToken, now: Instant) {
        match token.kind {
            TimerKind::NeighborSolicitationRetransmit => self.fire_solicit_retransmit(token, now),
            TimerKind::ReachableTimeout => self.fire_reachable_timeout(token, now),
            TimerKind::DelayFirstProbe => self.fire_delay_timeout(token, now),
            TimerKind::DadProbe => self.fire_dad_probe(token, now),
            TimerKind::RouterSolicitationRetransmit => {
                self.fire_router_solicitation_retransmit(token.ifid, now)
            }
            TimerKind::RouterLifetimeExpiry | TimerKind::PrefixValidLifetimeExpiry => {
                // Router/prefix lifetimes are swept in `poll` directly;
                // these variants are reserved for a host stack that wants
                // explicit per-entry timers instead of the sweep.
            }
        }
    }

    fn entry_addr(&self, seq: u64) -> Option<(IfId, Ipv6Addr)> {
        self.neighbors.iter().find(|(_, e)| e.seq == seq).map(|(_, e)| (e.ifid, e.addr))
    }

    fn fire_solicit_retransmit(&mut self, token: TimerToken, now: Instant) {
        let Some((ifid, addr)) = self.entry_addr(token.seq) else { return };
        let Some(id) = self.neighbors.lookup(ifid, addr) else { return };
        let max = self.config.max_multicast_solicit.max(self.config.max_unicast_solicit);
        let Some(entry) = self.neighbors.get_mut(id) else { return };
        let action = neighbor::on_solicit_timeout(entry, max);
        self.apply_neighbor_action(ifid, addr, action, now);
        if matches!(action, NeighborAction::SendSolicitation { .. }) {
            if let Some(id) = self.neighbors.lookup(ifid, addr) {
                if let Some(entry) = self.neighbors.get(id) {
                    self.timers.schedule(now, self.config.retrans_timer, TimerToken { seq: entry.seq, ..token });
                }
            }
        }
    }

    fn fire_reachable_timeout(&mut self, token: TimerToken, now: Instant) {
        let Some((ifid, addr)) = self.entry_addr(token.seq) else { return };
        if let Some(id) = self.neighbors.lookup(ifid, addr) {
            if let Some(entry) = self.neighbors.get_mut(id) {
                neighbor::on_reachable_timeout(entry, now);
            }
        }
    }

    fn fire_delay_timeout(&mut self, token: TimerToken, now: Instant) {
        let Some((ifid, addr)) = self.entry_addr(token.seq) else { return };
        let Some(id) = self.neighbors.lookup(ifid, addr) else { return };
        let max = self.config.max_unicast_solicit;
        let Some(entry) = self.neighbors.get_mut(id) else { return };
        let action = neighbor::on_delay_timeout(entry, max);
        self.apply_neighbor_action(ifid, addr, action, now);
        if matches!(action, NeighborAction::SendSolicitation { .. }) {
            if let Some(id) = self.neighbors.lookup(ifid, addr) {
                if let Some(entry) = self.neighbors.get(id) {
                    self.timers.schedule(
                        now,
                        self.config.retrans_timer,
                        TimerToken { ifid, kind: TimerKind::NeighborSolicitationRetransmit, seq: entry.seq },
                    );
                }
            }
        }
    }

    fn fire_dad_probe(&mut self, token: TimerToken, now: Instant) {
        let Some(&(ifid, addr)) = self.dad_tasks.get(&token.seq) else { return };
        if let Some(action) = self.dad.on_probe_timeout(ifid, addr, self.config.dad_transmits) {
            self.apply_dad_action(ifid, addr, token.seq, action, now);
        }
    }

    /// Marks `addr` reachable after an upper-layer confirmation (e.g. a TCP
    /// ACK), per RFC 4861 §7.3.1 — the only way an entry reaches
    /// `REACHABLE` without going through Neighbor Discovery itself.
    pub fn confirm_reachable(&mut self, ifid: IfId, addr: Ipv6Addr, now: Instant) {
        if let Some(id) = self.neighbors.lookup(ifid, addr) {
            if let Some(entry) = self.neighbors.get_mut(id) {
                entry.state = crate::cache::NeighborState::Reachable;
                entry.last_confirmed = Some(now);
                entry.stale_since = None;
                entry.probes_sent = 0;
                self.timers.schedule(
                    now,
                    self.config.reachable_time,
                    TimerToken { ifid, kind: TimerKind::ReachableTimeout, seq: entry.seq },
                );
            }
        }
    }

    // ---- testing / diagnostics -------------------------------------------

    /// Resets every cache/table to its just-constructed state (§8 testable
    /// property: "`cache_clear_all` followed by any lookup returns empty;
    /// followed by re-insertion yields identical state to a fresh engine
    /// insertion"). Interface tracking and configuration survive this, since
    /// neither is cached discovery state.
    pub fn cache_clear_all(&mut self) {
        self.neighbors = NeighborCache::new(self.config.neighbor_cache_size, self.config.tx_queue_cap);
        self.routers = RouterList::new();
        self.prefixes = PrefixList::new();
        self.destinations = DestinationCache::new();
        self.dad = DadEngine::new();
        self.dad_tasks.clear();
        self.next_dad_seq = 0;
        self.rs_attempts.clear();
        self.timers.cancel_all();
    }

    /// Cancels an in-progress DAD run for `addr` on `ifid` (§5): removes the
    /// DAD task and any neighbor-cache entry for the address. Its in-flight
    /// probe timer becomes a no-op the next time it fires, the same way a
    /// naturally concluded run is handled in `fire_dad_probe`.
    pub fn dad_stop(&mut self, ifid: IfId, addr: Ipv6Addr) {
        self.dad.cancel(ifid, addr);
        self.dad_tasks.retain(|_, task| *task != (ifid, addr));
        if let Some(id) = self.neighbors.lookup(ifid, addr) {
            self.neighbors.remove(id);
        }
    }

    /// Cross-interface next-hop selection (§4.5): scores every tracked
    /// interface by (on-link, default-router-reachable, any-router,
    /// hosts-`src`) and resolves on whichever scores highest. Link-local
    /// destinations bypass scoring entirely and resolve on the default
    /// (first tracked) interface.
    pub fn next_hop_pick_iface(
        &mut self,
        src: Option<Ipv6Addr>,
        dest: Ipv6Addr,
    ) -> Option<(IfId, Ipv6Addr, bool)> {
        let ifid = if dest.is_link_local() {
            *self.ifaces.iter().next()?
        } else {
            self.ifaces.iter().copied().max_by_key(|&ifid| self.iface_score(ifid, dest, src))?
        };

        let next_hop = resolver::next_hop(
            ifid,
            dest,
            &mut self.destinations,
            &self.prefixes,
            &mut self.routers,
            &self.neighbors,
        )?;
        let on_link = next_hop == dest;
        Some((ifid, next_hop, on_link))
    }

    /// The (on-link, default-router-reachable, any-router, hosts-`src`)
    /// score tuple `next_hop_pick_iface` ranks interfaces by. Rust's
    /// lexicographic tuple `Ord` implements both the priority ladder and its
    /// tie-break (hosting `src`) in one comparison.
    fn iface_score(&self, ifid: IfId, dest: Ipv6Addr, src: Option<Ipv6Addr>) -> (bool, bool, bool, bool) {
        let on_link = self.prefixes.is_on_link(ifid, dest);
        let default_router_reachable = self.routers.entries(ifid).iter().any(|r| {
            matches!(
                self.neighbors.lookup_entry(ifid, r.addr).map(|e| e.state),
                Some(NeighborState::Reachable)
            )
        });
        let any_router = !self.routers.is_empty(ifid);
        let hosts_src =
            src.is_some_and(|s| self.collab.addrs_on_iface(ifid).iter().any(|a| a.addr == s));
        (on_link, default_router_reachable, any_router, hosts_src)
    }

    /// All default routers known on `ifid`, for diagnostics (§6).
    pub fn router_list(&self, ifid: IfId) -> &[RouterEntry] {
        self.routers.entries(ifid)
    }

    /// All on-link prefixes known on `ifid`, for diagnostics (§6).
    pub fn prefix_list(&self, ifid: IfId) -> &[PrefixEntry] {
        self.prefixes.entries(ifid)
    }

    /// The neighbor-cache reachability state for `(ifid, addr)`, if any
    /// entry exists, for diagnostics (§6).
    pub fn neighbor_state(&self, ifid: IfId, addr: Ipv6Addr) -> Option<NeighborState> {
        self.neighbors.lookup_entry(ifid, addr).map(|e| e.state)
    }
}
