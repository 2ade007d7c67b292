//! Message validation and construction (C6), grounded on
//! `examples/PetrichorIT-inet/inet/src/ipv6/icmp/mod.rs`'s
//! `ipv6_icmp_recv_*`/`ipv6_icmp_send_*` family: the pieces of receive-path
//! validation and message-building that are independent of any particular
//! component's state, kept here so `engine.rs` only has to apply them.

use std::net::Ipv6Addr;

use ndp_types::{
    icmpv6::{NdpOption, NeighborAdvertisement, NeighborSolicitation, Redirect, RouterAdvertisement, RouterSolicitation},
    MacAddress,
};

use crate::error::MessageError;

/// RFC 4861 §6.1.1/7.1.1/7.1.2/8.1: every NDP message must arrive with an
/// IPv6 hop limit of 255, so it cannot have been forwarded by a router —
/// anything else must be silently dropped.
pub fn validate_hop_limit(hop_limit: u8) -> Result<(), MessageError> {
    if hop_limit != 255 {
        return Err(MessageError::HopLimitNotMax);
    }
    Ok(())
}

pub fn validate_target_not_multicast(target: Ipv6Addr) -> Result<(), MessageError> {
    if target.is_multicast() {
        return Err(MessageError::TargetIsMulticast);
    }
    Ok(())
}

/// RFC 4861 §7.1.1: a Router/Neighbor Solicitation from the unspecified
/// address must not carry a Source Link-Layer Address option.
pub fn validate_slla_with_source(src: Ipv6Addr, options: &[NdpOption]) -> Result<(), MessageError> {
    if src.is_unspecified() && source_link_layer_address(options).is_some() {
        return Err(MessageError::SllaWithUnspecifiedSource);
    }
    Ok(())
}

/// §4.2 "Tie-breaks": when an option type repeats in a single message, the
/// *last* occurrence wins, so this scans back-to-front instead of taking the
/// first match.
pub fn source_link_layer_address(options: &[NdpOption]) -> Option<MacAddress> {
    options.iter().rev().find_map(|o| match o {
        NdpOption::SourceLinkLayerAddress(mac) => Some(*mac),
        _ => None,
    })
}

pub fn target_link_layer_address(options: &[NdpOption]) -> Option<MacAddress> {
    options.iter().rev().find_map(|o| match o {
        NdpOption::TargetLinkLayerAddress(mac) => Some(*mac),
        _ => None,
    })
}

/// Builds a Neighbor Solicitation for `target`. `slla` should be `None`
/// when `src` (the caller's chosen source address) is unspecified, per
/// RFC 4861 §7.2.2 — the DAD probe case.
pub fn build_neighbor_solicitation(target: Ipv6Addr, slla: Option<MacAddress>) -> NeighborSolicitation {
    let mut options = Vec::new();
    if let Some(mac) = slla {
        options.push(NdpOption::SourceLinkLayerAddress(mac));
    }
    NeighborSolicitation { target, options }
}

/// Builds a Neighbor Advertisement in response to a solicitation (or
/// unsolicited, when `solicited` is false), per RFC 4861 §7.2.4.
pub fn build_neighbor_advertisement(
    target: Ipv6Addr,
    lladdr: MacAddress,
    router: bool,
    solicited: bool,
    override_flag: bool,
) -> NeighborAdvertisement {
    NeighborAdvertisement {
        target,
        router,
        solicited,
        override_flag,
        options: vec![NdpOption::TargetLinkLayerAddress(lladdr)],
    }
}

pub fn build_router_solicitation(slla: Option<MacAddress>) -> RouterSolicitation {
    let mut options = Vec::new();
    if let Some(mac) = slla {
        options.push(NdpOption::SourceLinkLayerAddress(mac));
    }
    RouterSolicitation { options }
}

pub fn build_redirect(target: Ipv6Addr, destination: Ipv6Addr, tlla: Option<MacAddress>) -> Redirect {
    let mut options = Vec::new();
    if let Some(mac) = tlla {
        options.push(NdpOption::TargetLinkLayerAddress(mac));
    }
    Redirect { target, destination, options }
}

/// True if `ra` carries a non-zero reachable/retrans time, meaning the
/// receiving host should adopt it (RFC 4861 §6.3.4).
pub fn router_advertisement_overrides_timers(ra: &RouterAdvertisement) -> (Option<u32>, Option<u32>) {
    let reachable = (ra.reachable_time != 0).then_some(ra.reachable_time);
    let retrans = (ra.retransmit_time != 0).then_some(ra.retransmit_time);
    (reachable, retrans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_limit_other_than_255_is_rejected() {
        assert_eq!(validate_hop_limit(64), Err(MessageError::HopLimitNotMax));
        assert_eq!(validate_hop_limit(255), Ok(()));
    }

    #[test]
    fn slla_with_unspecified_source_is_rejected() {
        let mac = MacAddress::from([1, 2, 3, 4, 5, 6]);
        let options = vec![NdpOption::SourceLinkLayerAddress(mac)];
        let err = validate_slla_with_source(Ipv6Addr::UNSPECIFIED, &options).unwrap_err();
        assert_eq!(err, MessageError::SllaWithUnspecifiedSource);

        let addr = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        assert!(validate_slla_with_source(addr, &options).is_ok());
    }

    #[test]
    fn repeated_option_type_resolves_to_the_last_occurrence() {
        let first = MacAddress::from([1, 1, 1, 1, 1, 1]);
        let last = MacAddress::from([2, 2, 2, 2, 2, 2]);
        let options = vec![
            NdpOption::SourceLinkLayerAddress(first),
            NdpOption::Mtu(ndp_types::icmpv6::MtuOption { mtu: 1500 }),
            NdpOption::SourceLinkLayerAddress(last),
        ];
        assert_eq!(source_link_layer_address(&options), Some(last));
    }

    #[test]
    fn builds_neighbor_advertisement_with_expected_flags() {
        let target = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);
        let mac = MacAddress::from([1, 2, 3, 4, 5, 6]);
        let na = build_neighbor_advertisement(target, mac, false, true, true);
        assert!(na.solicited);
        assert!(na.override_flag);
        assert!(!na.router);
        assert_eq!(target_link_layer_address(&na.options), Some(mac));
    }
}
