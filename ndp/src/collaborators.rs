//! The boundary between the engine and the rest of the network stack (§6).
//!
//! The engine never touches a socket, a clock, or an address store directly;
//! it calls out through this trait. A host stack implements it once; test
//! harnesses implement a fake version to drive scenarios deterministically.

use std::net::Ipv6Addr;

use ndp_types::{icmpv6::NdpMessage, MacAddress};

use crate::ids::IfId;

/// An address-configuration state reported by the host's address store (§6
/// `ipv6.addrs_on_iface`), mirroring RFC 4862 §5.4's address lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressState {
    /// Undergoing Duplicate Address Detection; not yet usable.
    Tentative,
    /// Assigned and usable.
    Preferred,
    /// Assigned but past its preferred lifetime; usable only for existing
    /// connections.
    Deprecated,
    /// DAD found a conflict; permanently unusable.
    Duplicated,
    /// No address configuration at all (placeholder state some collaborator
    /// implementations use instead of omitting the entry).
    None,
}

/// One entry of `ipv6.addrs_on_iface` (§6): an address the host currently
/// has configured (in any lifecycle state) on an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfaceAddr {
    pub addr: Ipv6Addr,
    pub state: AddressState,
    pub prefix_len: u8,
}

/// Everything the engine needs from the rest of the stack.
///
/// Implementors own the actual interface table, address store, and packet
/// transmit path; the engine only ever asks questions or hands back
/// fully-built messages to send.
pub trait Collaborators {
    /// The link-layer address configured on `ifid`, or `None` if the
    /// interface does not exist.
    fn link_addr(&self, ifid: IfId) -> Option<MacAddress>;

    /// True if `addr` is one of `ifid`'s own configured unicast addresses
    /// (used to recognize solicitations that are really DAD probes against
    /// one of our own tentative addresses, and to reject loopback
    /// solicitations).
    fn has_unicast_addr(&self, ifid: IfId, addr: Ipv6Addr) -> bool;

    /// Every address currently configured on `ifid`, in any lifecycle state
    /// (§6 `ipv6.addrs_on_iface`). Consulted before autoconfiguring from a
    /// Prefix Information option, so a host that already owns an address
    /// under the advertised prefix gets its lifetime refreshed instead of a
    /// second address being synthesized alongside it.
    fn addrs_on_iface(&self, ifid: IfId) -> Vec<IfaceAddr>;

    /// Assigns `addr/prefix_len` on `ifid` as a consequence of stateless
    /// address autoconfiguration (§4.4 `PrefixEntry::autonomous`).
    /// Implementations typically mark the address tentative and kick off
    /// DAD themselves.
    fn autoconfigure_addr(&mut self, ifid: IfId, addr: Ipv6Addr, prefix_len: u8);

    /// Refreshes the valid lifetime of an address the host already owns
    /// under a re-advertised autonomous prefix (§4.4, RFC 4862 §5.5.3),
    /// rather than synthesizing a duplicate. `valid_lifetime_secs` is
    /// already clamped by the engine per the §5.5.3 "never shorten below
    /// two hours" rule before this is called.
    fn refresh_addr_lifetime(&mut self, ifid: IfId, addr: Ipv6Addr, valid_lifetime_secs: u32);

    /// Hands a fully-built NDP message to the ICMPv6/IPv6 layer for
    /// transmission from `src` to `dst` over `ifid`. The checksum is
    /// computed by the collaborator once the pseudo-header is known.
    fn send(&mut self, ifid: IfId, src: Ipv6Addr, dst: Ipv6Addr, msg: NdpMessage);

    /// Sends `payload` to `dst`'s resolved link-layer address `lladdr` over
    /// `ifid`; called once a pending resolution completes.
    fn send_queued(&mut self, ifid: IfId, lladdr: MacAddress, payload: Vec<u8>);

    /// Called when resolution for `dst` exhausted its retry budget without
    /// an answer (§9 Open Question: optional ICMPv6 Destination
    /// Unreachable). Default is a no-op; a host stack that wants to notify
    /// upper layers overrides it.
    fn on_neighbor_unreachable(&mut self, _ifid: IfId, _dst: Ipv6Addr) {}
}
