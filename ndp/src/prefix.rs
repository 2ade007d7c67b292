//! The on-link prefix list (C4), grounded on the teacher's `PrefixList` in
//! `examples/PetrichorIT-inet/inet/src/ipv6/ndp.rs`, extended with the
//! autoconfiguration collision counter supplemented from
//! `original_source/IP/IPv6/net_dad.c`.

use std::{net::Ipv6Addr, time::Instant};

use fxhash::FxHashMap;
use ndp_types::Ipv6Prefix;

use crate::ids::IfId;

#[derive(Debug, Clone)]
pub struct PrefixEntry {
    pub prefix: Ipv6Prefix,
    pub on_link: bool,
    pub autonomous: bool,
    pub expires_at: Option<Instant>,
    /// Consecutive DAD failures observed for addresses derived from this
    /// prefix; once this reaches `dad_max_collisions`, autoconfiguration
    /// is abandoned for the prefix (`AutoconfigGuard`, §"SUPPLEMENTED
    /// FEATURES").
    pub dad_collisions: u32,
    pub autoconfig_abandoned: bool,
}

/// What the caller should do after [`PrefixList::update`] applies a Prefix
/// Information option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixAction {
    None,
    /// The prefix is new (or freshly eligible) for autonomous address
    /// configuration; the caller should derive an address and hand it to
    /// `Collaborators::autoconfigure_addr`.
    Autoconfigure,
}

#[derive(Default)]
pub struct PrefixList {
    by_iface: FxHashMap<IfId, Vec<PrefixEntry>>,
}

impl PrefixList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one Prefix Information option (RFC 4861 §6.3.4). Prefixes
    /// that are multicast or link-local are never stored (§4.4 invariant).
    pub fn update(
        &mut self,
        ifid: IfId,
        prefix: Ipv6Prefix,
        on_link: bool,
        autonomous: bool,
        valid_lifetime_secs: u32,
        now: Instant,
    ) -> PrefixAction {
        if prefix.is_multicast_or_link_local() {
            return PrefixAction::None;
        }

        let expires_at = if valid_lifetime_secs == u32::MAX {
            None
        } else {
            Some(now + std::time::Duration::from_secs(valid_lifetime_secs as u64))
        };

        let entries = self.by_iface.entry(ifid).or_default();
        let existing = entries.iter_mut().find(|e| e.prefix == prefix);
        let was_new_or_reset = match existing {
            Some(e) => {
                e.on_link = on_link;
                e.autonomous = autonomous;
                e.expires_at = expires_at;
                false
            }
            None => {
                entries.push(PrefixEntry {
                    prefix,
                    on_link,
                    autonomous,
                    expires_at,
                    dad_collisions: 0,
                    autoconfig_abandoned: false,
                });
                true
            }
        };

        let entry = entries.iter().find(|e| e.prefix == prefix).unwrap();
        if autonomous && !entry.autoconfig_abandoned && (was_new_or_reset || valid_lifetime_secs > 0) {
            PrefixAction::Autoconfigure
        } else {
            PrefixAction::None
        }
    }

    /// Records a DAD failure against whichever stored prefix contains
    /// `addr`, abandoning autoconfiguration for it once
    /// `dad_max_collisions` consecutive failures accumulate.
    pub fn record_dad_collision(&mut self, ifid: IfId, addr: Ipv6Addr, max_collisions: u32) {
        if let Some(entries) = self.by_iface.get_mut(&ifid) {
            if let Some(entry) = entries.iter_mut().find(|e| e.prefix.contains(addr)) {
                entry.dad_collisions += 1;
                if entry.dad_collisions >= max_collisions {
                    entry.autoconfig_abandoned = true;
                }
            }
        }
    }

    /// Clears the collision counter after a successful DAD run, per
    /// `net_dad.c`'s reset-on-success behavior.
    pub fn record_dad_success(&mut self, ifid: IfId, addr: Ipv6Addr) {
        if let Some(entries) = self.by_iface.get_mut(&ifid) {
            if let Some(entry) = entries.iter_mut().find(|e| e.prefix.contains(addr)) {
                entry.dad_collisions = 0;
            }
        }
    }

    pub fn is_on_link(&self, ifid: IfId, addr: Ipv6Addr) -> bool {
        self.by_iface
            .get(&ifid)
            .is_some_and(|entries| entries.iter().any(|e| e.on_link && e.prefix.contains(addr)))
    }

    pub fn expire(&mut self, ifid: IfId, now: Instant) {
        if let Some(entries) = self.by_iface.get_mut(&ifid) {
            entries.retain(|e| e.expires_at.map_or(true, |t| t > now));
        }
    }

    pub fn entries(&self, ifid: IfId) -> &[PrefixEntry] {
        self.by_iface.get(&ifid).map_or(&[], |v| v.as_slice())
    }

    pub fn remove_interface(&mut self, ifid: IfId) {
        self.by_iface.remove(&ifid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix() -> Ipv6Prefix {
        Ipv6Prefix::new(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0), 64)
    }

    #[test]
    fn new_autonomous_prefix_triggers_autoconfigure() {
        let mut list = PrefixList::new();
        let action = list.update(IfId(0), prefix(), true, true, 2_592_000, Instant::now());
        assert_eq!(action, PrefixAction::Autoconfigure);
    }

    #[test]
    fn multicast_or_link_local_prefix_is_never_stored() {
        let mut list = PrefixList::new();
        let ll = Ipv6Prefix::new(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 64);
        list.update(IfId(0), ll, true, true, 2_592_000, Instant::now());
        assert!(list.entries(IfId(0)).is_empty());
    }

    #[test]
    fn autoconfig_abandoned_after_max_collisions() {
        let mut list = PrefixList::new();
        list.update(IfId(0), prefix(), true, true, 2_592_000, Instant::now());
        let addr = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 1, 2, 3, 4);
        for _ in 0..3 {
            list.record_dad_collision(IfId(0), addr, 3);
        }
        assert!(list.entries(IfId(0))[0].autoconfig_abandoned);
    }

    #[test]
    fn expire_drops_lapsed_prefixes() {
        let mut list = PrefixList::new();
        let now = Instant::now();
        list.update(IfId(0), prefix(), true, false, 1, now);
        list.expire(IfId(0), now + std::time::Duration::from_secs(2));
        assert!(list.entries(IfId(0)).is_empty());
    }
}
