//! Byte-exact ICMPv6 Neighbor Discovery messages (RFC 4861 §4).
//!
//! This module only knows the five NDP message types; the generic ICMPv6
//! codec (echo, destination-unreachable, ...) is an external collaborator's
//! concern. Each message's `type`/`code`/`checksum` triplet is written here
//! with a zero checksum placeholder, mirroring how the collaborator's
//! `icmpv6.tx_msg` computes the real pseudo-header checksum once source and
//! destination are known.

use std::{
    io::{self, Read, Write},
    net::Ipv6Addr,
    time::Duration,
};

use bytepack::{FromBytestream, ReadBytesExt, ToBytestream, WriteBytesExt, BE};

use crate::{ip::Ipv6Prefix, mac::MacAddress};

pub const ICMPV6_TYPE_ROUTER_SOLICITATION: u8 = 133;
pub const ICMPV6_TYPE_ROUTER_ADVERTISEMENT: u8 = 134;
pub const ICMPV6_TYPE_NEIGHBOR_SOLICITATION: u8 = 135;
pub const ICMPV6_TYPE_NEIGHBOR_ADVERTISEMENT: u8 = 136;
pub const ICMPV6_TYPE_REDIRECT: u8 = 137;

pub const NDP_OPT_SOURCE_LINK_LAYER_ADDRESS: u8 = 1;
pub const NDP_OPT_TARGET_LINK_LAYER_ADDRESS: u8 = 2;
pub const NDP_OPT_PREFIX_INFORMATION: u8 = 3;
pub const NDP_OPT_REDIRECTED_HEADER: u8 = 4;
pub const NDP_OPT_MTU: u8 = 5;

/// Any one of the five NDP message types, dispatched on the leading type
/// byte the way `ndp::message` expects to receive them from the ICMPv6
/// demultiplexer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NdpMessage {
    RouterSolicitation(RouterSolicitation),
    RouterAdvertisement(RouterAdvertisement),
    NeighborSolicitation(NeighborSolicitation),
    NeighborAdvertisement(NeighborAdvertisement),
    Redirect(Redirect),
}

impl NdpMessage {
    pub fn icmp_type(&self) -> u8 {
        match self {
            Self::RouterSolicitation(_) => ICMPV6_TYPE_ROUTER_SOLICITATION,
            Self::RouterAdvertisement(_) => ICMPV6_TYPE_ROUTER_ADVERTISEMENT,
            Self::NeighborSolicitation(_) => ICMPV6_TYPE_NEIGHBOR_SOLICITATION,
            Self::NeighborAdvertisement(_) => ICMPV6_TYPE_NEIGHBOR_ADVERTISEMENT,
            Self::Redirect(_) => ICMPV6_TYPE_REDIRECT,
        }
    }
}

impl ToBytestream for NdpMessage {
    type Error = io::Error;
    fn to_bytestream(&self, stream: &mut bytepack::BytestreamWriter) -> Result<(), Self::Error> {
        stream.write_u8(self.icmp_type())?;
        match self {
            Self::RouterSolicitation(m) => m.to_bytestream(stream),
            Self::RouterAdvertisement(m) => m.to_bytestream(stream),
            Self::NeighborSolicitation(m) => m.to_bytestream(stream),
            Self::NeighborAdvertisement(m) => m.to_bytestream(stream),
            Self::Redirect(m) => m.to_bytestream(stream),
        }
    }
}

impl FromBytestream for NdpMessage {
    type Error = io::Error;
    fn from_bytestream(stream: &mut bytepack::BytestreamReader) -> Result<Self, Self::Error> {
        let typ = stream.read_u8()?;
        match typ {
            ICMPV6_TYPE_ROUTER_SOLICITATION => {
                Ok(Self::RouterSolicitation(RouterSolicitation::from_bytestream(stream)?))
            }
            ICMPV6_TYPE_ROUTER_ADVERTISEMENT => {
                Ok(Self::RouterAdvertisement(RouterAdvertisement::from_bytestream(stream)?))
            }
            ICMPV6_TYPE_NEIGHBOR_SOLICITATION => {
                Ok(Self::NeighborSolicitation(NeighborSolicitation::from_bytestream(stream)?))
            }
            ICMPV6_TYPE_NEIGHBOR_ADVERTISEMENT => {
                Ok(Self::NeighborAdvertisement(NeighborAdvertisement::from_bytestream(stream)?))
            }
            ICMPV6_TYPE_REDIRECT => Ok(Self::Redirect(Redirect::from_bytestream(stream)?)),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("not an NDP message type: {other}"),
            )),
        }
    }
}

/// A message sent by a host to prompt routers into generating Router
/// Advertisements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouterSolicitation {
    /// Allowed options: [`NdpOption::SourceLinkLayerAddress`].
    pub options: Vec<NdpOption>,
}

impl ToBytestream for RouterSolicitation {
    type Error = io::Error;
    fn to_bytestream(&self, stream: &mut bytepack::BytestreamWriter) -> Result<(), Self::Error> {
        stream.write_u8(0)?; // code
        stream.write_u16::<BE>(0)?; // checksum
        stream.write_u32::<BE>(0)?; // reserved
        for option in &self.options {
            option.to_bytestream(stream)?;
        }
        Ok(())
    }
}

impl FromBytestream for RouterSolicitation {
    type Error = io::Error;
    fn from_bytestream(stream: &mut bytepack::BytestreamReader) -> Result<Self, Self::Error> {
        expect_zero_u8(stream)?;
        expect_zero_u16(stream)?;
        expect_zero_u32(stream)?;
        Ok(Self {
            options: read_options(stream)?,
        })
    }
}

/// A message sent by routers to advertise their presence and configuration
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouterAdvertisement {
    /// The hop limit hosts should use for outgoing packets; 0 means
    /// unspecified.
    pub current_hop_limit: u8,
    /// A DHCPv6 service is available for address configuration.
    pub managed: bool,
    /// A DHCPv6 service is available for configuration other than
    /// addresses.
    pub other_configuration: bool,
    /// Router lifetime in seconds; 0 removes this router from the recipient's
    /// default router list.
    pub router_lifetime: u16,
    /// Reachable time in milliseconds; 0 means unspecified.
    pub reachable_time: u32,
    /// Retransmit timer in milliseconds; 0 means unspecified.
    pub retransmit_time: u32,
    /// Allowed options: [`NdpOption::SourceLinkLayerAddress`],
    /// [`NdpOption::Mtu`], [`NdpOption::PrefixInformation`].
    pub options: Vec<NdpOption>,
}

impl ToBytestream for RouterAdvertisement {
    type Error = io::Error;
    fn to_bytestream(&self, stream: &mut bytepack::BytestreamWriter) -> Result<(), Self::Error> {
        stream.write_u8(0)?; // code
        stream.write_u16::<BE>(0)?; // checksum
        stream.write_u8(self.current_hop_limit)?;
        let mut flags = 0u8;
        if self.managed {
            flags |= 0b1000_0000;
        }
        if self.other_configuration {
            flags |= 0b0100_0000;
        }
        stream.write_u8(flags)?;
        stream.write_u16::<BE>(self.router_lifetime)?;
        stream.write_u32::<BE>(self.reachable_time)?;
        stream.write_u32::<BE>(self.retransmit_time)?;
        for option in &self.options {
            option.to_bytestream(stream)?;
        }
        Ok(())
    }
}

impl FromBytestream for RouterAdvertisement {
    type Error = io::Error;
    fn from_bytestream(stream: &mut bytepack::BytestreamReader) -> Result<Self, Self::Error> {
        expect_zero_u8(stream)?;
        expect_zero_u16(stream)?;
        let current_hop_limit = stream.read_u8()?;
        let flags = stream.read_u8()?;
        let router_lifetime = stream.read_u16::<BE>()?;
        let reachable_time = stream.read_u32::<BE>()?;
        let retransmit_time = stream.read_u32::<BE>()?;
        Ok(Self {
            current_hop_limit,
            managed: flags & 0b1000_0000 != 0,
            other_configuration: flags & 0b0100_0000 != 0,
            router_lifetime,
            reachable_time,
            retransmit_time,
            options: read_options(stream)?,
        })
    }
}

/// A request for the link-layer address of a neighbor, or a Duplicate
/// Address Detection probe when `target` names the sender's own tentative
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NeighborSolicitation {
    /// The address being resolved or probed. Must not be multicast.
    pub target: Ipv6Addr,
    /// Allowed options: [`NdpOption::SourceLinkLayerAddress`], omitted when
    /// the solicitation's IPv6 source is the unspecified address.
    pub options: Vec<NdpOption>,
}

impl ToBytestream for NeighborSolicitation {
    type Error = io::Error;
    fn to_bytestream(&self, stream: &mut bytepack::BytestreamWriter) -> Result<(), Self::Error> {
        stream.write_u8(0)?; // code
        stream.write_u16::<BE>(0)?; // checksum
        stream.write_u32::<BE>(0)?; // reserved
        stream.write_all(&self.target.octets())?;
        for option in &self.options {
            option.to_bytestream(stream)?;
        }
        Ok(())
    }
}

impl FromBytestream for NeighborSolicitation {
    type Error = io::Error;
    fn from_bytestream(stream: &mut bytepack::BytestreamReader) -> Result<Self, Self::Error> {
        expect_zero_u8(stream)?;
        expect_zero_u16(stream)?;
        expect_zero_u32(stream)?;
        let target = Ipv6Addr::from(stream.read_u128::<BE>()?);
        Ok(Self {
            target,
            options: read_options(stream)?,
        })
    }
}

/// A response to a Neighbor Solicitation, or an unsolicited notice of a
/// link-layer address change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NeighborAdvertisement {
    /// The address of the entity that sent this advertisement. Must not be
    /// multicast.
    pub target: Ipv6Addr,
    /// The sender is a router.
    pub router: bool,
    /// This message was sent in response to a Neighbor Solicitation.
    pub solicited: bool,
    /// The recipient should override any cached link-addr with the one
    /// carried here, even if the target is already reachable.
    pub override_flag: bool,
    /// Allowed options: [`NdpOption::TargetLinkLayerAddress`].
    pub options: Vec<NdpOption>,
}

impl ToBytestream for NeighborAdvertisement {
    type Error = io::Error;
    fn to_bytestream(&self, stream: &mut bytepack::BytestreamWriter) -> Result<(), Self::Error> {
        stream.write_u8(0)?; // code
        stream.write_u16::<BE>(0)?; // checksum
        let mut flags = 0u8;
        if self.router {
            flags |= 0b1000_0000;
        }
        if self.solicited {
            flags |= 0b0100_0000;
        }
        if self.override_flag {
            flags |= 0b0010_0000;
        }
        stream.write_all(&[flags, 0, 0, 0])?;
        stream.write_all(&self.target.octets())?;
        for option in &self.options {
            option.to_bytestream(stream)?;
        }
        Ok(())
    }
}

impl FromBytestream for NeighborAdvertisement {
    type Error = io::Error;
    fn from_bytestream(stream: &mut bytepack::BytestreamReader) -> Result<Self, Self::Error> {
        expect_zero_u8(stream)?;
        expect_zero_u16(stream)?;
        let flags = stream.read_u8()?;
        for _ in 0..3 {
            expect_zero_u8(stream)?;
        }
        let target = Ipv6Addr::from(stream.read_u128::<BE>()?);
        Ok(Self {
            target,
            router: flags & 0b1000_0000 != 0,
            solicited: flags & 0b0100_0000 != 0,
            override_flag: flags & 0b0010_0000 != 0,
            options: read_options(stream)?,
        })
    }
}

/// A router's notice that a better first-hop exists for some destination
/// (RFC 4861 §8).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Redirect {
    /// The better first hop: either an on-link destination itself, or
    /// another router.
    pub target: Ipv6Addr,
    /// The destination the redirect applies to.
    pub destination: Ipv6Addr,
    /// Allowed options: [`NdpOption::TargetLinkLayerAddress`],
    /// [`NdpOption::RedirectedHeader`].
    pub options: Vec<NdpOption>,
}

impl ToBytestream for Redirect {
    type Error = io::Error;
    fn to_bytestream(&self, stream: &mut bytepack::BytestreamWriter) -> Result<(), Self::Error> {
        stream.write_u8(0)?; // code
        stream.write_u16::<BE>(0)?; // checksum
        stream.write_u32::<BE>(0)?; // reserved
        stream.write_all(&self.target.octets())?;
        stream.write_all(&self.destination.octets())?;
        for option in &self.options {
            option.to_bytestream(stream)?;
        }
        Ok(())
    }
}

impl FromBytestream for Redirect {
    type Error = io::Error;
    fn from_bytestream(stream: &mut bytepack::BytestreamReader) -> Result<Self, Self::Error> {
        expect_zero_u8(stream)?;
        expect_zero_u16(stream)?;
        expect_zero_u32(stream)?;
        let target = Ipv6Addr::from(stream.read_u128::<BE>()?);
        let destination = Ipv6Addr::from(stream.read_u128::<BE>()?);
        Ok(Self {
            target,
            destination,
            options: read_options(stream)?,
        })
    }
}

/// An NDP option (RFC 4861 §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NdpOption {
    SourceLinkLayerAddress(MacAddress),
    TargetLinkLayerAddress(MacAddress),
    PrefixInformation(PrefixInformation),
    Mtu(MtuOption),
    /// The IP header (and as much of its payload as fits) of the packet
    /// that triggered a Redirect.
    RedirectedHeader(Vec<u8>),
    /// An option type this crate does not interpret; its body is kept
    /// verbatim so re-encoding is lossless.
    Unknown(u8, Vec<u8>),
}

impl NdpOption {
    fn opt_type(&self) -> u8 {
        match self {
            Self::SourceLinkLayerAddress(_) => NDP_OPT_SOURCE_LINK_LAYER_ADDRESS,
            Self::TargetLinkLayerAddress(_) => NDP_OPT_TARGET_LINK_LAYER_ADDRESS,
            Self::PrefixInformation(_) => NDP_OPT_PREFIX_INFORMATION,
            Self::Mtu(_) => NDP_OPT_MTU,
            Self::RedirectedHeader(_) => NDP_OPT_REDIRECTED_HEADER,
            Self::Unknown(t, _) => *t,
        }
    }
}

impl ToBytestream for NdpOption {
    type Error = io::Error;
    fn to_bytestream(&self, stream: &mut bytepack::BytestreamWriter) -> Result<(), Self::Error> {
        let body = match self {
            Self::SourceLinkLayerAddress(mac) | Self::TargetLinkLayerAddress(mac) => mac.to_vec()?,
            Self::PrefixInformation(info) => info.to_vec()?,
            Self::Mtu(mtu) => mtu.to_vec()?,
            Self::RedirectedHeader(bytes) | Self::Unknown(_, bytes) => bytes.clone(),
        };

        let unpadded = 2 + body.len();
        let len_units = unpadded.div_ceil(8);
        stream.write_u8(self.opt_type())?;
        stream.write_u8(len_units as u8)?;
        stream.write_all(&body)?;
        let padding = len_units * 8 - unpadded;
        stream.write_all(&vec![0u8; padding])?;
        Ok(())
    }
}

impl FromBytestream for NdpOption {
    type Error = io::Error;
    fn from_bytestream(stream: &mut bytepack::BytestreamReader) -> Result<Self, Self::Error> {
        let typ = stream.read_u8()?;
        let len_units = stream.read_u8()?;
        if len_units == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "NDP option length field must not be zero",
            ));
        }
        let body_len = len_units as usize * 8 - 2;
        let mut body = stream.extract(body_len)?;
        let option = match typ {
            NDP_OPT_SOURCE_LINK_LAYER_ADDRESS => {
                Self::SourceLinkLayerAddress(MacAddress::from_bytestream(&mut body)?)
            }
            NDP_OPT_TARGET_LINK_LAYER_ADDRESS => {
                Self::TargetLinkLayerAddress(MacAddress::from_bytestream(&mut body)?)
            }
            NDP_OPT_PREFIX_INFORMATION => {
                Self::PrefixInformation(PrefixInformation::from_bytestream(&mut body)?)
            }
            NDP_OPT_MTU => Self::Mtu(MtuOption::from_bytestream(&mut body)?),
            NDP_OPT_REDIRECTED_HEADER => {
                let mut buf = Vec::new();
                body.read_to_end(&mut buf)?;
                Self::RedirectedHeader(buf)
            }
            other => {
                let mut buf = Vec::new();
                body.read_to_end(&mut buf)?;
                Self::Unknown(other, buf)
            }
        };
        Ok(option)
    }
}

/// An on-link / autonomous-configuration prefix advertisement (RFC 4861
/// §4.6.2).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefixInformation {
    pub prefix_len: u8,
    /// May be used for on-link determination.
    pub on_link: bool,
    /// May be used for stateless address autoconfiguration.
    pub autonomous_address_configuration: bool,
    /// Seconds this prefix remains valid; `0xffff_ffff` means infinite.
    pub valid_lifetime: u32,
    /// Seconds addresses derived from this prefix remain preferred.
    pub preferred_lifetime: u32,
    pub prefix: Ipv6Addr,
}

impl PrefixInformation {
    pub fn prefix(&self) -> Ipv6Prefix {
        Ipv6Prefix::new(self.prefix, self.prefix_len)
    }
}

impl ToBytestream for PrefixInformation {
    type Error = io::Error;
    fn to_bytestream(&self, stream: &mut bytepack::BytestreamWriter) -> Result<(), Self::Error> {
        stream.write_u8(self.prefix_len)?;
        let mut flags = 0u8;
        if self.on_link {
            flags |= 0b1000_0000;
        }
        if self.autonomous_address_configuration {
            flags |= 0b0100_0000;
        }
        stream.write_u8(flags)?;
        stream.write_u32::<BE>(self.valid_lifetime)?;
        stream.write_u32::<BE>(self.preferred_lifetime)?;
        stream.write_u32::<BE>(0)?; // reserved
        stream.write_all(&self.prefix.octets())?;
        Ok(())
    }
}

impl FromBytestream for PrefixInformation {
    type Error = io::Error;
    fn from_bytestream(stream: &mut bytepack::BytestreamReader) -> Result<Self, Self::Error> {
        let prefix_len = stream.read_u8()?;
        let flags = stream.read_u8()?;
        let valid_lifetime = stream.read_u32::<BE>()?;
        let preferred_lifetime = stream.read_u32::<BE>()?;
        expect_zero_u32(stream)?;
        let prefix = Ipv6Addr::from(stream.read_u128::<BE>()?);
        Ok(Self {
            prefix_len,
            on_link: flags & 0b1000_0000 != 0,
            autonomous_address_configuration: flags & 0b0100_0000 != 0,
            valid_lifetime,
            preferred_lifetime,
            prefix,
        })
    }
}

/// A router's recommended link MTU (RFC 4861 §4.6.4).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MtuOption {
    pub mtu: u32,
}

impl ToBytestream for MtuOption {
    type Error = io::Error;
    fn to_bytestream(&self, stream: &mut bytepack::BytestreamWriter) -> Result<(), Self::Error> {
        stream.write_u16::<BE>(0)?; // reserved
        stream.write_u32::<BE>(self.mtu)?;
        Ok(())
    }
}

impl FromBytestream for MtuOption {
    type Error = io::Error;
    fn from_bytestream(stream: &mut bytepack::BytestreamReader) -> Result<Self, Self::Error> {
        expect_zero_u16(stream)?;
        Ok(Self {
            mtu: stream.read_u32::<BE>()?,
        })
    }
}

fn read_options(stream: &mut bytepack::BytestreamReader) -> io::Result<Vec<NdpOption>> {
    let mut options = Vec::new();
    while !stream.is_empty() {
        options.push(NdpOption::from_bytestream(stream)?);
    }
    Ok(options)
}

fn expect_zero_u8(stream: &mut bytepack::BytestreamReader) -> io::Result<()> {
    let v = stream.read_u8()?;
    if v != 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "expected reserved byte to be zero"));
    }
    Ok(())
}

fn expect_zero_u16(stream: &mut bytepack::BytestreamReader) -> io::Result<()> {
    let v = stream.read_u16::<BE>()?;
    if v != 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "expected reserved field to be zero"));
    }
    Ok(())
}

fn expect_zero_u32(stream: &mut bytepack::BytestreamReader) -> io::Result<()> {
    let v = stream.read_u32::<BE>()?;
    if v != 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "expected reserved field to be zero"));
    }
    Ok(())
}

// RFC 4861 host/router/node constants (§10), carried as documented defaults
// for `ndp::config::Config`.

pub const NDP_MAX_INITIAL_RTR_ADVERT_INTERVAL: Duration = Duration::from_secs(16);
pub const NDP_MAX_INITIAL_RTR_ADVERTISEMENTS: usize = 3;
pub const NDP_MAX_FINAL_RTR_ADVERTISEMENTS: usize = 3;
pub const NDP_MIN_DELAY_BETWEEN_RAS: Duration = Duration::from_secs(5);
pub const NDP_MAX_DELAY_BETWEEN_RAS: Duration = Duration::from_secs(1000);
pub const NDP_MAX_RA_DELAY_TIME: Duration = Duration::from_millis(500);

pub const NDP_MAX_RTR_SOLICITATION_DELAY: Duration = Duration::from_secs(1);
pub const NDP_RTR_SOLICITATION_INTERVAL: Duration = Duration::from_secs(4);
pub const NDP_MAX_RTR_SOLICITATIONS: usize = 3;

pub const NDP_MAX_MULTICAST_SOLICIT: usize = 3;
pub const NDP_MAX_UNICAST_SOLICIT: usize = 3;
pub const NDP_MAX_ANYCAST_DELAY_TIME: Duration = Duration::from_secs(3);
pub const NDP_MAX_NEIGHBOR_ADVERTISEMENT: usize = 3;
pub const NDP_REACHABLE_TIME: Duration = Duration::from_millis(30_000);
pub const NDP_RETRANS_TIMER: Duration = Duration::from_millis(1_000);
pub const NDP_DELAY_FIRST_PROBE: Duration = Duration::from_secs(5);
pub const NDP_MIN_RANDOM_FACTOR: f64 = 0.5;
pub const NDP_MAX_RANDOM_FACTOR: f64 = 1.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_solicitation_round_trip() {
        let ns = NeighborSolicitation {
            target: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 2),
            options: vec![NdpOption::SourceLinkLayerAddress(MacAddress::from([
                0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x02,
            ]))],
        };
        let bytes = ns.to_vec().unwrap();
        let back = NeighborSolicitation::from_slice(&bytes).unwrap();
        assert_eq!(ns, back);
    }

    #[test]
    fn neighbor_advertisement_flags() {
        let na = NeighborAdvertisement {
            target: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 2),
            router: false,
            solicited: true,
            override_flag: true,
            options: vec![],
        };
        let bytes = na.to_vec().unwrap();
        assert_eq!(bytes[4], 0b0110_0000);
        let back = NeighborAdvertisement::from_slice(&bytes).unwrap();
        assert_eq!(na, back);
    }

    #[test]
    fn router_advertisement_round_trip() {
        let ra = RouterAdvertisement {
            current_hop_limit: 64,
            managed: false,
            other_configuration: true,
            router_lifetime: 1800,
            reachable_time: 30_000,
            retransmit_time: 1_000,
            options: vec![NdpOption::Mtu(MtuOption { mtu: 1500 })],
        };
        let bytes = ra.to_vec().unwrap();
        let back = RouterAdvertisement::from_slice(&bytes).unwrap();
        assert_eq!(ra, back);
    }

    #[test]
    fn prefix_information_option_len_is_four_units() {
        let opt = NdpOption::PrefixInformation(PrefixInformation {
            prefix_len: 64,
            on_link: true,
            autonomous_address_configuration: true,
            valid_lifetime: 2_592_000,
            preferred_lifetime: 604_800,
            prefix: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0),
        });
        let bytes = opt.to_vec().unwrap();
        assert_eq!(bytes[1], 4);
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn zero_length_option_is_rejected() {
        let bytes = [NDP_OPT_MTU, 0, 0, 0, 0, 0, 5, 220];
        let err = NdpOption::from_slice(&bytes).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn redirect_round_trip() {
        let redirect = Redirect {
            target: Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0xb),
            destination: Ipv6Addr::new(0x2001, 0xdb8, 1, 0, 0, 0, 0, 5),
            options: vec![NdpOption::TargetLinkLayerAddress(MacAddress::from([
                1, 2, 3, 4, 5, 6,
            ]))],
        };
        let bytes = redirect.to_vec().unwrap();
        let back = Redirect::from_slice(&bytes).unwrap();
        assert_eq!(redirect, back);
    }

    #[test]
    fn unknown_option_round_trips_verbatim() {
        let opt = NdpOption::Unknown(200, vec![1, 2, 3, 4, 5, 6]);
        let bytes = opt.to_vec().unwrap();
        let back = NdpOption::from_slice(&bytes).unwrap();
        assert_eq!(opt, back);
    }
}
