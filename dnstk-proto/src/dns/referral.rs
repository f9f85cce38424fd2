use crate::core::DnsError;
use crate::dns::address::{DomainEndpoint, NameServerAddress, Protocol, TransportEndpoint};
use crate::dns::core::RecordType;
use crate::dns::message::Message;
use crate::dns::name::Name;
use crate::dns::rdata::RecordData;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_PORT: u16 = 53;

/// Name servers to query next based on the NS records in the authority section of
/// `msg` and any glue records for them in the additional section.
///
/// Each A glue record for a name server yields a candidate with that IP address.
/// AAAA glue records are only used when `prefer_ipv6` is set. A name server with no
/// A or AAAA glue at all yields a candidate that must be resolved by name unless
/// `glue_only` is set, in which case it's skipped.
pub fn extract_referrals(
    msg: &Message,
    prefer_ipv6: bool,
    glue_only: bool,
) -> Result<Vec<NameServerAddress>, DnsError> {
    let mut out = Vec::new();

    for r in msg.authority() {
        let ns = match r.rdata() {
            RecordData::NS(rd) if r.rtype() == RecordType::NS => rd.name(),
            _ => continue,
        };

        let mut has_glue = false;
        for ip in glue_for(msg, ns) {
            has_glue = true;
            if ip.is_ipv6() && !prefer_ipv6 {
                continue;
            }

            out.push(NameServerAddress::from_domain_socket(
                ns.to_string(),
                SocketAddr::new(ip, DEFAULT_PORT),
                Protocol::Udp,
            )?);
        }

        if !has_glue && !glue_only {
            out.push(NameServerAddress::from_endpoint(
                TransportEndpoint::Unresolved(DomainEndpoint::new(ns.to_string(), DEFAULT_PORT)),
                Protocol::Udp,
            )?);
        }
    }

    tracing::debug!(
        message = "extracted referral name servers",
        id = %msg.id(),
        prefer_ipv6 = prefer_ipv6,
        glue_only = glue_only,
        num_servers = out.len(),
    );

    Ok(out)
}

/// Addresses from A and AAAA records in the additional section owned by `ns`.
fn glue_for<'a>(msg: &'a Message, ns: &'a Name) -> impl Iterator<Item = IpAddr> + 'a {
    msg.additional()
        .iter()
        .filter(move |r| r.name() == ns)
        .filter_map(|r| match r.rdata() {
            RecordData::A(rd) => Some(IpAddr::V4(rd.addr())),
            RecordData::AAAA(rd) => Some(IpAddr::V6(rd.addr())),
            _ => None,
        })
}
