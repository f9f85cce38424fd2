use crate::core::DnsError;
use crate::dns::name::Name;
use arc_swap::ArcSwapOption;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::{Host, Url};

const DEFAULT_PORT: u16 = 53;
const TLS_PORT: u16 = 853;

/// Transport used to send queries to a name server.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Protocol {
    Udp = 0,
    Tcp = 1,
    Tls = 2,
    Https = 3,
    HttpsJson = 4,
}

impl TryFrom<u8> for Protocol {
    type Error = DnsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Protocol::Udp),
            1 => Ok(Protocol::Tcp),
            2 => Ok(Protocol::Tls),
            3 => Ok(Protocol::Https),
            4 => Ok(Protocol::HttpsJson),
            _ => Err(DnsError::runtime(format!("invalid or unsupported protocol {}", value))),
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udp => write!(f, "udp"),
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Tls => write!(f, "tls"),
            Protocol::Https => write!(f, "https"),
            Protocol::HttpsJson => write!(f, "https-json"),
        }
    }
}

impl FromStr for Protocol {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "udp" => Ok(Protocol::Udp),
            "tcp" => Ok(Protocol::Tcp),
            "tls" => Ok(Protocol::Tls),
            "https" => Ok(Protocol::Https),
            "https-json" | "httpsjson" => Ok(Protocol::HttpsJson),
            v => Err(DnsError::configuration(format!("unknown protocol '{}'", v))),
        }
    }
}

/// A name server reached by domain name and port.
///
/// Equality and hashing ignore ASCII case and a trailing `.` in the domain.
#[derive(Debug, Clone)]
pub struct DomainEndpoint {
    domain: String,
    port: u16,
}

impl DomainEndpoint {
    pub fn new<S>(domain: S, port: u16) -> Self
    where
        S: Into<String>,
    {
        Self {
            domain: domain.into(),
            port,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn normalized(&self) -> &str {
        self.domain.strip_suffix('.').unwrap_or(&self.domain)
    }
}

impl PartialEq for DomainEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.port == other.port && self.normalized().eq_ignore_ascii_case(other.normalized())
    }
}

impl Eq for DomainEndpoint {}

impl Hash for DomainEndpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.normalized().bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        self.port.hash(state);
    }
}

impl Display for DomainEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.port)
    }
}

/// The form a name server address was given in. Exactly one is present.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Endpoint {
    /// URL of a DNS-over-HTTPS resolver.
    Doh(Url),
    /// Domain name and port, the name must be resolved before use.
    Domain(DomainEndpoint),
    /// Literal IP address and port.
    Ip(SocketAddr),
}

/// Where a query should actually be sent: an IP address or a name and port
/// that still needs to be resolved.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum TransportEndpoint {
    Ip(SocketAddr),
    Unresolved(DomainEndpoint),
}

impl Display for TransportEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportEndpoint::Ip(addr) => Display::fmt(addr, f),
            TransportEndpoint::Unresolved(de) => Display::fmt(de, f),
        }
    }
}

/// IP address a domain or DoH name server resolved to, and when it stops being valid.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResolvedIp {
    addr: SocketAddr,
    expires: Option<DateTime<Utc>>,
}

impl ResolvedIp {
    pub fn new(addr: SocketAddr, expires: Option<DateTime<Utc>>) -> Self {
        Self { addr, expires }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.map(|e| now > e).unwrap_or(false)
    }
}

/// Address of a name server along with the protocol used to talk to it.
///
/// Addresses given as a domain name or DoH URL may carry the IP address the name
/// resolved to. That IP is the only part of an address that changes after
/// construction and it is always replaced as a whole, so readers on other threads
/// never see an IP paired with the wrong expiry.
pub struct NameServerAddress {
    protocol: Protocol,
    original: String,
    endpoint: Endpoint,
    resolved: ArcSwapOption<ResolvedIp>,
}

impl NameServerAddress {
    /// Default time a resolved IP address is used for before it's considered stale.
    pub const DEFAULT_IP_TTL: Duration = Duration::from_secs(900);

    const MAX_SHORT_STRING: usize = 255;

    fn new(protocol: Protocol, original: String, endpoint: Endpoint, resolved: Option<ResolvedIp>) -> Self {
        Self {
            protocol,
            original,
            endpoint,
            resolved: ArcSwapOption::new(resolved.map(Arc::new)),
        }
    }

    /// Parse an address and guess the protocol from it.
    ///
    /// Accepted forms are `ip[:port]`, `[ipv6][:port]`, `domain[:port]`, an
    /// `http://` or `https://` URL, and `domain[:port]` or a URL followed by an
    /// IP address in parentheses, e.g. `dns.example.com (192.0.2.1)`.
    pub fn parse(address: &str) -> Result<Self, DnsError> {
        let original = address.trim();
        let (endpoint, resolved) = parse_address(original)?;
        let protocol = guess_protocol(&endpoint);
        Ok(Self::new(protocol, original.to_owned(), endpoint, resolved))
    }

    /// Parse an address that must be used with `protocol`.
    pub fn parse_with_protocol(address: &str, protocol: Protocol) -> Result<Self, DnsError> {
        let original = address.trim();
        let (endpoint, resolved) = parse_address(original)?;
        let out = Self::new(protocol, original.to_owned(), endpoint, resolved);
        out.validate()?;
        Ok(out)
    }

    /// Copy of this address using a different protocol.
    pub fn with_protocol(&self, protocol: Protocol) -> Result<Self, DnsError> {
        let out = Self::new(
            protocol,
            self.original.clone(),
            self.endpoint.clone(),
            self.resolved_ip(),
        );
        out.validate()?;
        Ok(out)
    }

    /// Address of a DoH resolver. If the host of the URL is an IP address, it is
    /// also used as the resolved IP.
    pub fn from_doh_url(url: Url, protocol: Protocol) -> Result<Self, DnsError> {
        let port = url_port(&url)?;
        let resolved = match url.host() {
            Some(Host::Ipv4(ip)) => Some(ResolvedIp::new(SocketAddr::new(IpAddr::V4(ip), port), None)),
            Some(Host::Ipv6(ip)) => Some(ResolvedIp::new(SocketAddr::new(IpAddr::V6(ip), port), None)),
            _ => None,
        };

        let original = url.as_str().to_owned();
        let out = Self::new(protocol, original, Endpoint::Doh(url), resolved);
        out.validate()?;
        Ok(out)
    }

    /// Address of a DoH resolver whose host is known to resolve to `ip`.
    pub fn from_doh_url_with_ip(url: Url, ip: IpAddr, protocol: Protocol) -> Result<Self, DnsError> {
        let port = url_port(&url)?;
        let original = format!("{} ({})", url, bracketed(ip));
        let resolved = ResolvedIp::new(SocketAddr::new(ip, port), None);
        let out = Self::new(protocol, original, Endpoint::Doh(url), Some(resolved));
        out.validate()?;
        Ok(out)
    }

    /// Address of a name server at `ip` on port 53.
    pub fn from_ip(ip: IpAddr, protocol: Protocol) -> Result<Self, DnsError> {
        let out = Self::new(
            protocol,
            ip.to_string(),
            Endpoint::Ip(SocketAddr::new(ip, DEFAULT_PORT)),
            None,
        );
        out.validate()?;
        Ok(out)
    }

    /// Address of a name server called `domain` that resolves to `ip`, both on port 53.
    pub fn from_domain_ip<S>(domain: S, ip: IpAddr, protocol: Protocol) -> Result<Self, DnsError>
    where
        S: Into<String>,
    {
        let domain = domain.into();
        let original = format!("{} ({})", domain, bracketed(ip));
        let resolved = ResolvedIp::new(SocketAddr::new(ip, DEFAULT_PORT), None);
        let out = Self::new(
            protocol,
            original,
            Endpoint::Domain(DomainEndpoint::new(domain, DEFAULT_PORT)),
            Some(resolved),
        );
        out.validate()?;
        Ok(out)
    }

    /// Address of a name server called `domain` that resolves to `addr`. The port
    /// of `addr` is used for the domain as well.
    pub fn from_domain_socket<S>(domain: S, addr: SocketAddr, protocol: Protocol) -> Result<Self, DnsError>
    where
        S: Into<String>,
    {
        let domain = domain.into();
        let original = format!("{} ({})", domain, addr);
        let out = Self::new(
            protocol,
            original,
            Endpoint::Domain(DomainEndpoint::new(domain, addr.port())),
            Some(ResolvedIp::new(addr, None)),
        );
        out.validate()?;
        Ok(out)
    }

    /// Address of a name server at an IP address or an unresolved domain name.
    pub fn from_endpoint(endpoint: TransportEndpoint, protocol: Protocol) -> Result<Self, DnsError> {
        let original = endpoint.to_string();
        let endpoint = match endpoint {
            TransportEndpoint::Ip(addr) => Endpoint::Ip(addr),
            TransportEndpoint::Unresolved(de) => Endpoint::Domain(de),
        };

        let out = Self::new(protocol, original, endpoint, None);
        out.validate()?;
        Ok(out)
    }

    /// Read an address written by any version of the binary format.
    pub fn read_binary<R>(mut buf: R) -> Result<Self, DnsError>
    where
        R: Read,
    {
        match buf.read_u8()? {
            1 => Self::read_binary_v1(buf),
            2 => Self::parse(&read_short_string(&mut buf)?),
            3 => {
                let protocol = Protocol::try_from(buf.read_u8()?)?;
                Self::parse_with_protocol(&read_short_string(&mut buf)?, protocol)
            }
            v => Err(DnsError::unsupported_version(format!(
                "name server address version {} not supported",
                v
            ))),
        }
    }

    /// Version 1 stored each endpoint separately: optional URL, optional domain
    /// endpoint, and optional IP endpoint, each preceded by a flag.
    fn read_binary_v1<R>(mut buf: R) -> Result<Self, DnsError>
    where
        R: Read,
    {
        let doh = if buf.read_u8()? != 0 {
            let raw = read_short_string(&mut buf)?;
            Some(Url::parse(&raw).map_err(|e| DnsError::address_format_cause(format!("invalid URL '{}'", raw), e))?)
        } else {
            None
        };

        let domain = if buf.read_u8()? != 0 {
            match read_binary_endpoint(&mut buf)? {
                TransportEndpoint::Unresolved(de) => Some(de),
                TransportEndpoint::Ip(addr) => {
                    return Err(DnsError::address_format(format!(
                        "expected domain endpoint, got IP endpoint {}",
                        addr
                    )));
                }
            }
        } else {
            None
        };

        let ip = if buf.read_u8()? != 0 {
            match read_binary_endpoint(&mut buf)? {
                TransportEndpoint::Ip(addr) => Some(addr),
                TransportEndpoint::Unresolved(de) => {
                    return Err(DnsError::address_format(format!(
                        "expected IP endpoint, got domain endpoint {}",
                        de
                    )));
                }
            }
        } else {
            None
        };

        let original = match (&doh, &ip, &domain) {
            (Some(url), _, _) => url.to_string(),
            (None, Some(addr), _) => addr.to_string(),
            (None, None, Some(de)) => de.to_string(),
            (None, None, None) => return Err(DnsError::address_format("name server address has no endpoint")),
        };

        let (endpoint, resolved) = match (doh, domain, ip) {
            (Some(url), _, ip) => (Endpoint::Doh(url), ip),
            (None, Some(de), ip) => (Endpoint::Domain(de), ip),
            (None, None, Some(addr)) => (Endpoint::Ip(addr), None),
            (None, None, None) => return Err(DnsError::address_format("name server address has no endpoint")),
        };

        let protocol = guess_protocol(&endpoint);
        Ok(Self::new(
            protocol,
            original,
            endpoint,
            resolved.map(|addr| ResolvedIp::new(addr, None)),
        ))
    }

    /// Write this address in the current (version 3) binary format: the protocol
    /// followed by the address as originally given.
    pub fn write_binary<W>(&self, mut buf: W) -> Result<(), DnsError>
    where
        W: Write,
    {
        buf.write_u8(3)?;
        buf.write_u8(self.protocol as u8)?;
        write_short_string(&mut buf, &self.original)
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// The address exactly as it was given, before parsing.
    pub fn original_address(&self) -> &str {
        &self.original
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn doh_url(&self) -> Option<&Url> {
        match &self.endpoint {
            Endpoint::Doh(url) => Some(url),
            _ => None,
        }
    }

    pub fn domain_endpoint(&self) -> Option<&DomainEndpoint> {
        match &self.endpoint {
            Endpoint::Domain(de) => Some(de),
            _ => None,
        }
    }

    /// IP address and port of the name server: the address itself if it was given
    /// as an IP, otherwise the resolved IP if there is one.
    pub fn ip_endpoint(&self) -> Option<SocketAddr> {
        match &self.endpoint {
            Endpoint::Ip(addr) => Some(*addr),
            _ => self.resolved_ip().map(|r| r.addr()),
        }
    }

    /// Current resolved IP snapshot. Always `None` for addresses given as an IP.
    pub fn resolved_ip(&self) -> Option<ResolvedIp> {
        self.resolved.load_full().map(|r| *r)
    }

    pub fn host(&self) -> String {
        match &self.endpoint {
            Endpoint::Doh(url) => match url.host() {
                Some(Host::Domain(d)) => d.to_owned(),
                Some(Host::Ipv4(ip)) => ip.to_string(),
                Some(Host::Ipv6(ip)) => ip.to_string(),
                None => String::new(),
            },
            Endpoint::Domain(de) => de.domain().to_owned(),
            Endpoint::Ip(addr) => addr.ip().to_string(),
        }
    }

    pub fn port(&self) -> u16 {
        match &self.endpoint {
            Endpoint::Doh(url) => url.port_or_known_default().unwrap_or(DEFAULT_PORT),
            Endpoint::Domain(de) => de.port(),
            Endpoint::Ip(addr) => addr.port(),
        }
    }

    /// Where to send queries: the IP address if it's known and not stale, otherwise
    /// the host and port, which must be resolved first.
    pub fn transport_endpoint(&self) -> TransportEndpoint {
        self.transport_endpoint_at(Utc::now())
    }

    pub fn transport_endpoint_at(&self, now: DateTime<Utc>) -> TransportEndpoint {
        if !self.is_ip_stale_at(now) {
            if let Some(addr) = self.ip_endpoint() {
                return TransportEndpoint::Ip(addr);
            }
        }

        TransportEndpoint::Unresolved(DomainEndpoint::new(self.host(), self.port()))
    }

    /// True if there's no IP address to use or the resolved IP has expired.
    pub fn is_ip_stale(&self) -> bool {
        self.is_ip_stale_at(Utc::now())
    }

    pub fn is_ip_stale_at(&self, now: DateTime<Utc>) -> bool {
        match &self.endpoint {
            Endpoint::Ip(_) => false,
            _ => match self.resolved_ip() {
                Some(r) => r.is_expired_at(now),
                None => true,
            },
        }
    }

    /// Replace the resolved IP with `ip` valid for `ttl` from now. The port used is
    /// the port of this address.
    pub fn set_resolved_ip(&self, ip: IpAddr, ttl: Duration) -> Result<(), DnsError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| DnsError::out_of_range(format!("invalid resolved IP TTL {:?}: {}", ttl, e)))?;
        let expires = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| DnsError::out_of_range(format!("resolved IP TTL {} too large", ttl)))?;
        self.set_resolved_ip_until(ip, Some(expires));
        Ok(())
    }

    /// Replace the resolved IP with `ip` valid until `expires` or forever if `None`.
    pub fn set_resolved_ip_until(&self, ip: IpAddr, expires: Option<DateTime<Utc>>) {
        if let Endpoint::Ip(addr) = &self.endpoint {
            tracing::debug!(message = "ignoring resolved IP for name server given as an IP", address = %addr, ip = %ip);
            return;
        }

        let resolved = ResolvedIp::new(SocketAddr::new(ip, self.port()), expires);
        self.resolved.store(Some(Arc::new(resolved)));
    }

    pub fn clear_resolved_ip(&self) {
        self.resolved.store(None);
    }

    /// Preference weight for picking between name servers, lower is better: IPv4
    /// addresses first, then IPv6, then addresses that still need to be resolved.
    ///
    /// This is a weighting, not an ordering of addresses. Addresses with the same
    /// weight are not otherwise comparable.
    pub fn preference(&self) -> u8 {
        match self.ip_endpoint() {
            Some(SocketAddr::V4(_)) => 0,
            Some(SocketAddr::V6(_)) => 1,
            None => 2,
        }
    }

    /// Stable sort of addresses by `preference`, keeping the given order of
    /// addresses with the same weight.
    pub fn sort_by_preference(addresses: &mut [NameServerAddress]) {
        addresses.sort_by_key(|a| a.preference());
    }

    fn validate(&self) -> Result<(), DnsError> {
        let doh = matches!(self.endpoint, Endpoint::Doh(_));
        let port = self.port();
        let valid = match self.protocol {
            Protocol::Udp | Protocol::Tcp => !doh && port != TLS_PORT,
            Protocol::Tls => !doh && port != DEFAULT_PORT,
            Protocol::Https | Protocol::HttpsJson => doh && port != DEFAULT_PORT && port != TLS_PORT,
        };

        if valid {
            Ok(())
        } else {
            Err(DnsError::protocol_mismatch(format!(
                "invalid transport protocol {} for name server address {}",
                self.protocol, self.original
            )))
        }
    }
}

impl FromStr for NameServerAddress {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Clone for NameServerAddress {
    fn clone(&self) -> Self {
        Self {
            protocol: self.protocol,
            original: self.original.clone(),
            endpoint: self.endpoint.clone(),
            resolved: ArcSwapOption::new(self.resolved.load_full()),
        }
    }
}

impl PartialEq for NameServerAddress {
    fn eq(&self, other: &Self) -> bool {
        self.protocol == other.protocol && self.endpoint == other.endpoint && self.ip_endpoint() == other.ip_endpoint()
    }
}

impl Eq for NameServerAddress {}

/// Only the protocol and primary endpoint are hashed. The resolved IP can change
/// while an address is stored in a set or used as a map key, so it is left out.
/// Equal addresses still hash the same since equality also compares both fields.
impl Hash for NameServerAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.protocol.hash(state);
        self.endpoint.hash(state);
    }
}

impl Debug for NameServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameServerAddress")
            .field("protocol", &self.protocol)
            .field("original", &self.original)
            .field("endpoint", &self.endpoint)
            .field("resolved", &self.resolved_ip())
            .finish()
    }
}

impl Display for NameServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.endpoint {
            Endpoint::Doh(url) => write!(f, "{}", url)?,
            Endpoint::Domain(de) => write!(f, "{}", de)?,
            Endpoint::Ip(addr) => return write!(f, "{}", addr),
        }

        if let Some(r) = self.resolved_ip() {
            write!(f, " ({})", r.addr())?;
        }

        Ok(())
    }
}

fn guess_protocol(endpoint: &Endpoint) -> Protocol {
    match endpoint {
        Endpoint::Doh(_) => Protocol::Https,
        Endpoint::Domain(de) if de.port() == TLS_PORT => Protocol::Tls,
        Endpoint::Ip(addr) if addr.port() == TLS_PORT => Protocol::Tls,
        _ => Protocol::Udp,
    }
}

fn bracketed(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{}]", v6),
    }
}

fn url_port(url: &Url) -> Result<u16, DnsError> {
    url.port_or_known_default()
        .ok_or_else(|| DnsError::address_format(format!("no port for URL {}", url)))
}

fn is_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

fn parse_url(s: &str) -> Result<Url, DnsError> {
    let url = Url::parse(s).map_err(|e| DnsError::address_format_cause(format!("invalid URL '{}'", s), e))?;
    if url.host().is_none() {
        return Err(DnsError::address_format(format!("URL '{}' has no host", s)));
    }

    Ok(url)
}

fn parse_port(s: &str, original: &str) -> Result<u16, DnsError> {
    match s.trim().parse::<u16>() {
        Ok(0) => Err(DnsError::address_format(format!("port must not be 0 in '{}'", original))),
        Ok(p) => Ok(p),
        Err(e) => Err(DnsError::address_format_cause(
            format!("invalid port '{}' in '{}'", s, original),
            e,
        )),
    }
}

/// Host and port of either half of an address, `host` has any brackets removed.
struct HostPort<'a> {
    host: &'a str,
    port: Option<u16>,
    bracketed: bool,
}

fn split_host_port<'a>(s: &'a str, original: &str) -> Result<HostPort<'a>, DnsError> {
    if let Some(rest) = s.strip_prefix('[') {
        let end = rest
            .rfind(']')
            .ok_or_else(|| DnsError::address_format(format!("missing ']' in '{}'", original)))?;
        let host = &rest[..end];
        let after = rest[end + 1..].trim();
        let port = if after.is_empty() {
            None
        } else if let Some(p) = after.strip_prefix(':') {
            Some(parse_port(p, original)?)
        } else {
            return Err(DnsError::address_format(format!(
                "unexpected '{}' after ']' in '{}'",
                after, original
            )));
        };

        return Ok(HostPort {
            host,
            port,
            bracketed: true,
        });
    }

    // Unbracketed IPv6 addresses are allowed as long as there's no port.
    if IpAddr::from_str(s).is_ok() {
        return Ok(HostPort {
            host: s,
            port: None,
            bracketed: false,
        });
    }

    let (host, port) = match s.rsplit_once(':') {
        Some((host, port)) => (host.trim(), Some(parse_port(port, original)?)),
        None => (s, None),
    };

    if host.contains(':') {
        return Err(DnsError::address_format(format!(
            "IPv6 address with a port must use brackets in '{}'",
            original
        )));
    }

    Ok(HostPort {
        host,
        port,
        bracketed: false,
    })
}

fn check_domain(domain: &str, original: &str) -> Result<(), DnsError> {
    if domain.is_empty() {
        return Err(DnsError::address_format(format!("missing host in '{}'", original)));
    }

    Name::from_str(domain)
        .map(|_| ())
        .map_err(|e| DnsError::address_format_cause(format!("invalid domain '{}' in '{}'", domain, original), e))
}

fn parse_address(original: &str) -> Result<(Endpoint, Option<ResolvedIp>), DnsError> {
    let invalid = |reason: &str| DnsError::address_format(format!("{} in name server address '{}'", reason, original));

    let (outer, inner) = match original.find('(') {
        Some(start) => {
            let end = original[start + 1..]
                .find(')')
                .map(|i| start + 1 + i)
                .ok_or_else(|| invalid("missing ')'"))?;
            if !original[end + 1..].trim().is_empty() {
                return Err(invalid("unexpected text after ')'"));
            }

            (Some(original[..start].trim()), original[start + 1..end].trim())
        }
        None => (None, original),
    };

    if is_url(inner) {
        if outer.is_some() {
            return Err(invalid("URL inside parentheses"));
        }

        return Ok((Endpoint::Doh(parse_url(inner)?), None));
    }

    let hp = split_host_port(inner, original)?;
    let ip = IpAddr::from_str(hp.host).ok();

    match outer {
        Some(outer) if is_url(outer) => {
            let url = parse_url(outer)?;
            let url_port = url_port(&url)?;
            let port = match hp.port {
                None => url_port,
                Some(p) if p == url_port => p,
                Some(_) => return Err(invalid("port of IP address doesn't match URL")),
            };

            let ip = ip.ok_or_else(|| invalid("expected IP address inside parentheses"))?;
            Ok((Endpoint::Doh(url), Some(ResolvedIp::new(SocketAddr::new(ip, port), None))))
        }
        Some(outer) => {
            let domain = split_host_port(outer, original)?;
            if domain.bracketed {
                return Err(invalid("expected domain name before parentheses"));
            }

            check_domain(domain.host, original)?;
            let port = reconcile_ports(domain.port, hp.port).ok_or_else(|| invalid("mismatched ports"))?;
            let ip = ip.ok_or_else(|| invalid("expected IP address inside parentheses"))?;

            Ok((
                Endpoint::Domain(DomainEndpoint::new(domain.host, port)),
                Some(ResolvedIp::new(SocketAddr::new(ip, port), None)),
            ))
        }
        None => {
            let port = hp.port.unwrap_or(DEFAULT_PORT);
            match ip {
                Some(ip) => Ok((Endpoint::Ip(SocketAddr::new(ip, port)), None)),
                None if hp.bracketed => Err(invalid("expected IPv6 address inside brackets")),
                None => {
                    check_domain(hp.host, original)?;
                    Ok((Endpoint::Domain(DomainEndpoint::new(hp.host, port)), None))
                }
            }
        }
    }
}

/// Port to use when a port may be given for both the domain and its IP address,
/// `None` when they are both given and differ.
fn reconcile_ports(domain: Option<u16>, ip: Option<u16>) -> Option<u16> {
    match (domain, ip) {
        (None, None) => Some(DEFAULT_PORT),
        (Some(p), None) | (None, Some(p)) => Some(p),
        (Some(a), Some(b)) if a == b => Some(a),
        _ => None,
    }
}

fn read_short_string<R>(mut buf: R) -> Result<String, DnsError>
where
    R: Read,
{
    let len = buf.read_u8()?;
    let mut bytes = vec![0_u8; usize::from(len)];
    buf.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| DnsError::runtime_cause("invalid UTF-8 in string", e))
}

fn write_short_string<W>(mut buf: W, s: &str) -> Result<(), DnsError>
where
    W: Write,
{
    if s.len() > NameServerAddress::MAX_SHORT_STRING {
        return Err(DnsError::out_of_range(format!(
            "string of {} bytes exceeds max of {} bytes",
            s.len(),
            NameServerAddress::MAX_SHORT_STRING
        )));
    }

    buf.write_u8(s.len() as u8)?;
    Ok(buf.write_all(s.as_bytes())?)
}

/// Read an endpoint as written by version 1 of the binary format: a family tag,
/// the address, and the port.
fn read_binary_endpoint<R>(mut buf: R) -> Result<TransportEndpoint, DnsError>
where
    R: Read,
{
    match buf.read_u8()? {
        1 => {
            let mut octets = [0_u8; 4];
            buf.read_exact(&mut octets)?;
            let port = buf.read_u16::<LittleEndian>()?;
            Ok(TransportEndpoint::Ip(SocketAddr::new(IpAddr::V4(Ipv4Addr::from(octets)), port)))
        }
        2 => {
            let mut octets = [0_u8; 16];
            buf.read_exact(&mut octets)?;
            let port = buf.read_u16::<LittleEndian>()?;
            Ok(TransportEndpoint::Ip(SocketAddr::new(IpAddr::V6(Ipv6Addr::from(octets)), port)))
        }
        3 => {
            let domain = read_short_string(&mut buf)?;
            let port = buf.read_u16::<LittleEndian>()?;
            Ok(TransportEndpoint::Unresolved(DomainEndpoint::new(domain, port)))
        }
        f => Err(DnsError::address_format(format!("unsupported endpoint family {}", f))),
    }
}
