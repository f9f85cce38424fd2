use crate::core::{DnsError, ErrorKind};
use crate::dns::core::RecordType;
use crate::dns::name::{CompressionTable, Name};
use crate::io::OffsetStream;
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::io::{Read, Seek};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Payload of a resource record.
///
/// Every variant remembers the raw length of its encoded form as carried in the
/// record header it was read from (or the uncompressed size when built locally).
/// The raw length is bookkeeping only and is ignored by equality and hashing.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RecordData {
    A(RecordDataA),
    NS(RecordDataNS),
    PTR(RecordDataPTR),
    MX(RecordDataMX),
    TXT(RecordDataTXT),
    AAAA(RecordDataAAAA),
    Unknown(RecordDataUnknown),
}

impl RecordData {
    /// Size of the payload in bytes when written without name compression.
    pub fn size(&self) -> usize {
        match self {
            Self::A(rd) => rd.size(),
            Self::NS(rd) => rd.size(),
            Self::PTR(rd) => rd.size(),
            Self::MX(rd) => rd.size(),
            Self::TXT(rd) => rd.size(),
            Self::AAAA(rd) => rd.size(),
            Self::Unknown(rd) => rd.size(),
        }
    }

    /// Raw encoded length recorded when this payload was created.
    pub fn raw_len(&self) -> u16 {
        match self {
            Self::A(rd) => rd.len,
            Self::NS(rd) => rd.len,
            Self::PTR(rd) => rd.len,
            Self::MX(rd) => rd.len,
            Self::TXT(rd) => rd.len,
            Self::AAAA(rd) => rd.len,
            Self::Unknown(rd) => rd.len,
        }
    }

    pub fn write_network_bytes<T>(&self, buf: T, table: &mut CompressionTable) -> Result<(), DnsError>
    where
        T: WriteBytesExt + Seek,
    {
        match self {
            Self::A(rd) => rd.write_network_bytes(buf),
            Self::NS(rd) => rd.write_network_bytes(buf, table),
            Self::PTR(rd) => rd.write_network_bytes(buf, table),
            Self::MX(rd) => rd.write_network_bytes(buf, table),
            Self::TXT(rd) => rd.write_network_bytes(buf),
            Self::AAAA(rd) => rd.write_network_bytes(buf),
            Self::Unknown(rd) => rd.write_network_bytes(buf),
        }
    }

    /// Decode a payload of type `rtype` from `buf`, a view bounded to the end of the
    /// payload that starts at the beginning of the message (so that name pointers
    /// resolve correctly).
    pub fn read_network_bytes<S>(rtype: RecordType, rdata_len: u16, buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        match rtype {
            RecordType::A => Ok(RecordData::A(RecordDataA::read_network_bytes(rdata_len, buf)?)),
            RecordType::NS => Ok(RecordData::NS(RecordDataNS::read_network_bytes(rdata_len, buf)?)),
            RecordType::PTR => Ok(RecordData::PTR(RecordDataPTR::read_network_bytes(rdata_len, buf)?)),
            RecordType::MX => Ok(RecordData::MX(RecordDataMX::read_network_bytes(rdata_len, buf)?)),
            RecordType::TXT => Ok(RecordData::TXT(RecordDataTXT::read_network_bytes(rdata_len, buf)?)),
            RecordType::AAAA => Ok(RecordData::AAAA(RecordDataAAAA::read_network_bytes(rdata_len, buf)?)),
            RecordType::Unknown(_) => Ok(RecordData::Unknown(RecordDataUnknown::read_network_bytes(
                rdata_len, buf,
            )?)),
        }
    }

    /// Build a payload from its textual presentation form, as found in the `data`
    /// field of JSON DNS responses.
    ///
    /// Fails with an `UnsupportedOperation` error for types that have no textual
    /// form here.
    pub fn from_text(rtype: RecordType, text: &str) -> Result<Self, DnsError> {
        match rtype {
            RecordType::A => Ok(RecordData::A(RecordDataA::from_text(text)?)),
            RecordType::NS => Ok(RecordData::NS(RecordDataNS::from_text(text)?)),
            RecordType::PTR => Ok(RecordData::PTR(RecordDataPTR::from_text(text)?)),
            RecordType::MX => Ok(RecordData::MX(RecordDataMX::from_text(text)?)),
            RecordType::TXT => Ok(RecordData::TXT(RecordDataTXT::from_text(text)?)),
            RecordType::AAAA => Ok(RecordData::AAAA(RecordDataAAAA::from_text(text)?)),
            RecordType::Unknown(t) => Err(DnsError::unsupported_operation(format!(
                "no text form for record type {}",
                t
            ))),
        }
    }
}

impl Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(rd) => Display::fmt(rd, f),
            RecordData::NS(rd) => Display::fmt(rd, f),
            RecordData::PTR(rd) => Display::fmt(rd, f),
            RecordData::MX(rd) => Display::fmt(rd, f),
            RecordData::TXT(rd) => Display::fmt(rd, f),
            RecordData::AAAA(rd) => Display::fmt(rd, f),
            RecordData::Unknown(rd) => Display::fmt(rd, f),
        }
    }
}

/// Make sure a record decoder is being handed the number of bytes it needs.
fn expect_len(kind: &str, expected: u16, rdata_len: u16) -> Result<(), DnsError> {
    if expected != rdata_len {
        Err(DnsError::truncated(format!(
            "{} record data must be {} bytes, got {}",
            kind, expected, rdata_len
        )))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecordDataA {
    addr: Ipv4Addr,
    len: u16,
}

impl RecordDataA {
    pub fn new(addr: Ipv4Addr) -> Self {
        Self { addr, len: 4 }
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn size(&self) -> usize {
        4
    }

    pub fn write_network_bytes<T>(&self, mut buf: T) -> Result<(), DnsError>
    where
        T: WriteBytesExt,
    {
        Ok(buf.write_all(&self.addr.octets())?)
    }

    pub fn read_network_bytes<S>(rdata_len: u16, buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        expect_len("A", 4, rdata_len)?;
        let mut bytes = [0_u8; 4];
        buf.read_exact(&mut bytes)?;
        Ok(Self::new(Ipv4Addr::from(bytes)))
    }

    fn from_text(text: &str) -> Result<Self, DnsError> {
        Ipv4Addr::from_str(text.trim())
            .map(Self::new)
            .map_err(|e| DnsError::runtime_cause(format!("invalid A record data '{}'", text), e))
    }
}

impl PartialEq for RecordDataA {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for RecordDataA {}

impl Hash for RecordDataA {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state)
    }
}

impl Display for RecordDataA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.addr, f)
    }
}

#[derive(Debug, Clone)]
pub struct RecordDataNS {
    name: Name,
    len: u16,
}

impl RecordDataNS {
    pub fn new(name: Name) -> Self {
        let len = name.size();
        Self { name, len }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn size(&self) -> usize {
        usize::from(self.name.size())
    }

    pub fn write_network_bytes<T>(&self, buf: T, table: &mut CompressionTable) -> Result<(), DnsError>
    where
        T: WriteBytesExt + Seek,
    {
        self.name.write_compressed_bytes(buf, table)
    }

    pub fn read_network_bytes<S>(rdata_len: u16, buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        let name = Name::read_network_bytes(buf)?;
        Ok(Self { name, len: rdata_len })
    }

    fn from_text(text: &str) -> Result<Self, DnsError> {
        Name::from_str(text.trim()).map(Self::new)
    }
}

impl PartialEq for RecordDataNS {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for RecordDataNS {}

impl Hash for RecordDataNS {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl Display for RecordDataNS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.name, f)
    }
}

/// Pointer to a domain name, typically used for reverse lookups.
///
/// Equality and hashing ignore ASCII case of the domain.
#[derive(Debug, Clone)]
pub struct RecordDataPTR {
    domain: Name,
    len: u16,
}

impl RecordDataPTR {
    pub fn new(domain: Name) -> Self {
        let len = domain.size();
        Self { domain, len }
    }

    pub fn domain(&self) -> &Name {
        &self.domain
    }

    pub fn size(&self) -> usize {
        usize::from(self.domain.size())
    }

    pub fn write_network_bytes<T>(&self, buf: T, table: &mut CompressionTable) -> Result<(), DnsError>
    where
        T: WriteBytesExt + Seek,
    {
        self.domain.write_compressed_bytes(buf, table)
    }

    pub fn read_network_bytes<S>(rdata_len: u16, buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        let domain = Name::read_network_bytes(buf)?;
        Ok(Self { domain, len: rdata_len })
    }

    fn from_text(text: &str) -> Result<Self, DnsError> {
        Name::from_str(text.trim()).map(Self::new)
    }
}

impl PartialEq for RecordDataPTR {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
    }
}

impl Eq for RecordDataPTR {}

impl Hash for RecordDataPTR {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state)
    }
}

impl Display for RecordDataPTR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.domain, f)
    }
}

#[derive(Debug, Clone)]
pub struct RecordDataMX {
    preference: u16,
    exchange: Name,
    len: u16,
}

impl RecordDataMX {
    pub fn new(preference: u16, exchange: Name) -> Self {
        let len = 2 + exchange.size();
        Self {
            preference,
            exchange,
            len,
        }
    }

    pub fn preference(&self) -> u16 {
        self.preference
    }

    pub fn exchange(&self) -> &Name {
        &self.exchange
    }

    pub fn size(&self) -> usize {
        2 + usize::from(self.exchange.size())
    }

    pub fn write_network_bytes<T>(&self, mut buf: T, table: &mut CompressionTable) -> Result<(), DnsError>
    where
        T: WriteBytesExt + Seek,
    {
        buf.write_u16::<NetworkEndian>(self.preference)?;
        self.exchange.write_compressed_bytes(buf, table)
    }

    pub fn read_network_bytes<S>(rdata_len: u16, buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        let preference = buf.read_u16::<NetworkEndian>()?;
        let exchange = Name::read_network_bytes(buf)?;
        Ok(Self {
            preference,
            exchange,
            len: rdata_len,
        })
    }

    fn from_text(text: &str) -> Result<Self, DnsError> {
        let mut parts = text.split_whitespace();
        let (preference, exchange) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(e), None) => (p, e),
            _ => return Err(DnsError::runtime(format!("invalid MX record data '{}'", text))),
        };

        let preference = preference
            .parse()
            .map_err(|e| DnsError::runtime_cause(format!("invalid MX preference '{}'", preference), e))?;
        Ok(Self::new(preference, Name::from_str(exchange)?))
    }
}

impl PartialEq for RecordDataMX {
    fn eq(&self, other: &Self) -> bool {
        self.preference == other.preference && self.exchange == other.exchange
    }
}

impl Eq for RecordDataMX {}

impl Hash for RecordDataMX {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.preference.hash(state);
        self.exchange.hash(state);
    }
}

impl Display for RecordDataMX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

/// Free-form text, stored as a single string.
///
/// On the wire the text is split into chunks of at most 255 bytes, each prefixed
/// with its length. Chunks are concatenated when reading.
#[derive(Debug, Clone)]
pub struct RecordDataTXT {
    text: String,
    len: u16,
}

impl RecordDataTXT {
    const MAX_LENGTH: usize = 65535;
    const MAX_SEGMENT_LENGTH: usize = 255;

    pub fn new<S>(text: S) -> Result<Self, DnsError>
    where
        S: Into<String>,
    {
        let text = text.into();
        // One extra byte for each chunk to store the length as a u8. This ensures
        // that we don't allow the creation of RecordDataTXT objects that can't
        // actually be serialized because they're too large.
        let size = Self::encoded_size(&text);
        if size > Self::MAX_LENGTH {
            return Err(DnsError::runtime(format!(
                "TXT record too long; {} bytes, max {} bytes",
                size,
                Self::MAX_LENGTH
            )));
        }

        Ok(Self { text, len: size as u16 })
    }

    fn encoded_size(text: &str) -> usize {
        let chunks = text.len().div_ceil(Self::MAX_SEGMENT_LENGTH).max(1);
        text.len() + chunks
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn size(&self) -> usize {
        Self::encoded_size(&self.text)
    }

    pub fn write_network_bytes<T>(&self, mut buf: T) -> Result<(), DnsError>
    where
        T: WriteBytesExt,
    {
        let bytes = self.text.as_bytes();
        if bytes.is_empty() {
            return Ok(buf.write_u8(0)?);
        }

        // No trailing empty chunk when the length is an exact multiple of 255.
        for chunk in bytes.chunks(Self::MAX_SEGMENT_LENGTH) {
            buf.write_u8(chunk.len() as u8)?;
            buf.write_all(chunk)?;
        }

        Ok(())
    }

    pub fn read_network_bytes<S>(rdata_len: u16, buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        let total = usize::from(rdata_len);
        let mut all = Vec::with_capacity(total);
        let mut consumed = 0;

        while consumed < total {
            let len = buf
                .read_u8()
                .map_err(|_| DnsError::truncated(format!("missing TXT chunk length after {} bytes", consumed)))?;
            let len = usize::from(len);
            if consumed + 1 + len > total {
                return Err(DnsError::truncated(format!(
                    "TXT chunk exceeds record data; len: {}, consumed: {}, rdata: {}",
                    len, consumed, total
                )));
            }

            let start = all.len();
            all.resize(start + len, 0);
            buf.read_exact(&mut all[start..])?;
            consumed += 1 + len;
        }

        let text = String::from_utf8(all).map_err(|e| DnsError::runtime_cause("TXT record data is not UTF-8", e))?;
        Ok(Self { text, len: rdata_len })
    }

    /// Parse text in presentation form: either one or more quoted strings, which
    /// are concatenated, or bare text.
    fn from_text(text: &str) -> Result<Self, DnsError> {
        let trimmed = text.trim();
        if !trimmed.starts_with('"') {
            return Self::new(trimmed);
        }

        let mut out = String::with_capacity(trimmed.len());
        let mut quoted = false;
        let mut chars = trimmed.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => quoted = !quoted,
                '\\' if quoted => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                c if quoted => out.push(c),
                c if c.is_whitespace() => {}
                c => {
                    return Err(DnsError::runtime(format!(
                        "unexpected '{}' outside of quotes in TXT record data",
                        c
                    )));
                }
            }
        }

        if quoted {
            return Err(DnsError::runtime(format!("unterminated quote in TXT record data '{}'", text)));
        }

        Self::new(out)
    }
}

impl PartialEq for RecordDataTXT {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for RecordDataTXT {}

impl Hash for RecordDataTXT {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state)
    }
}

impl Display for RecordDataTXT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Escape any double quotes within the string since we use those to
        // delimit the string.
        write!(f, "\"{}\"", self.text.replace('\"', "\\\""))
    }
}

#[derive(Debug, Clone)]
pub struct RecordDataAAAA {
    addr: Ipv6Addr,
    len: u16,
}

impl RecordDataAAAA {
    pub fn new(addr: Ipv6Addr) -> Self {
        Self { addr, len: 16 }
    }

    pub fn addr(&self) -> Ipv6Addr {
        self.addr
    }

    pub fn size(&self) -> usize {
        16
    }

    pub fn write_network_bytes<T>(&self, mut buf: T) -> Result<(), DnsError>
    where
        T: WriteBytesExt,
    {
        Ok(buf.write_all(&self.addr.octets())?)
    }

    pub fn read_network_bytes<S>(rdata_len: u16, buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        expect_len("AAAA", 16, rdata_len)?;
        let mut bytes = [0_u8; 16];
        buf.read_exact(&mut bytes)?;
        Ok(Self::new(Ipv6Addr::from(bytes)))
    }

    /// The recorded length is always 16, the size of the binary address, regardless
    /// of how long the textual form was.
    fn from_text(text: &str) -> Result<Self, DnsError> {
        Ipv6Addr::from_str(text.trim())
            .map(Self::new)
            .map_err(|e| DnsError::runtime_cause(format!("invalid AAAA record data '{}'", text), e))
    }
}

impl PartialEq for RecordDataAAAA {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for RecordDataAAAA {}

impl Hash for RecordDataAAAA {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state)
    }
}

impl Display for RecordDataAAAA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.addr, f)
    }
}

#[derive(Debug, Clone)]
pub struct RecordDataUnknown {
    bytes: Vec<u8>,
    len: u16,
}

impl RecordDataUnknown {
    const MAX_LENGTH: usize = 65535;

    pub fn new(bytes: Vec<u8>) -> Result<Self, DnsError> {
        if bytes.len() > Self::MAX_LENGTH {
            Err(DnsError::runtime(format!(
                "record data too long; {} bytes, max {} bytes",
                bytes.len(),
                Self::MAX_LENGTH
            )))
        } else {
            let len = bytes.len() as u16;
            Ok(Self { bytes, len })
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn write_network_bytes<T>(&self, mut buf: T) -> Result<(), DnsError>
    where
        T: WriteBytesExt,
    {
        Ok(buf.write_all(&self.bytes)?)
    }

    pub fn read_network_bytes<S>(rdata_len: u16, buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        let mut bytes = vec![0_u8; usize::from(rdata_len)];
        buf.read_exact(&mut bytes).map_err(|e| match DnsError::from(e) {
            e if e.kind() == ErrorKind::TruncatedData => DnsError::truncated(format!(
                "short read for unknown record data; expected {} bytes",
                rdata_len
            )),
            e => e,
        })?;

        Ok(Self { bytes, len: rdata_len })
    }
}

impl PartialEq for RecordDataUnknown {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for RecordDataUnknown {}

impl Hash for RecordDataUnknown {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state)
    }
}

impl Display for RecordDataUnknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[unknown {} bytes]", self.bytes.len())
    }
}

#[cfg(test)]
mod test {
    use super::{
        RecordData, RecordDataA, RecordDataAAAA, RecordDataMX, RecordDataNS, RecordDataPTR, RecordDataTXT,
        RecordDataUnknown,
    };
    use crate::core::ErrorKind;
    use crate::dns::core::RecordType;
    use crate::dns::name::{CompressionTable, Name};
    use crate::io::OffsetStream;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::io::Cursor;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::str::FromStr;

    fn view(bytes: Vec<u8>) -> OffsetStream<Cursor<Vec<u8>>> {
        OffsetStream::new(Cursor::new(bytes), 0, None, true).unwrap()
    }

    fn encode(rdata: &RecordData) -> Vec<u8> {
        let mut cur = Cursor::new(Vec::new());
        let mut table = CompressionTable::new();
        rdata.write_network_bytes(&mut cur, &mut table).unwrap();
        cur.into_inner()
    }

    fn hash_of<T: Hash>(v: &T) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_record_data_a_write_network_bytes() {
        let rdata = RecordData::A(RecordDataA::new(Ipv4Addr::new(127, 0, 0, 1)));
        assert_eq!(vec![127, 0, 0, 1], encode(&rdata));
    }

    #[test]
    fn test_record_data_a_read_network_bytes() {
        let mut buf = view(vec![127, 0, 0, 53]);
        let rdata = RecordDataA::read_network_bytes(4, &mut buf).unwrap();
        assert_eq!(Ipv4Addr::new(127, 0, 0, 53), rdata.addr());
    }

    #[rustfmt::skip]
    #[test]
    fn test_record_data_ns_read_network_bytes() {
        let mut buf = view(vec![
            2,                                // length
            110, 115,                         // "ns"
            7,                                // length
            101, 120, 97, 109, 112, 108, 101, // "example"
            3,                                // length
            99, 111, 109,                     // "com"
            0,                                // root
        ]);

        let rdata = RecordDataNS::read_network_bytes(16, &mut buf).unwrap();
        assert_eq!("ns.example.com.", rdata.name().to_string());
    }

    #[rustfmt::skip]
    #[test]
    fn test_record_data_mx_write_network_bytes() {
        let rdata = RecordData::MX(RecordDataMX::new(10, Name::from_str("mail.example.com.").unwrap()));

        assert_eq!(
            vec![
                0, 10,                            // preference
                4,                                // length
                109, 97, 105, 108,                // "mail"
                7,                                // length
                101, 120, 97, 109, 112, 108, 101, // "example"
                3,                                // length
                99, 111, 109,                     // "com"
                0,                                // root
            ],
            encode(&rdata),
        );
    }

    #[rustfmt::skip]
    #[test]
    fn test_record_data_mx_write_network_bytes_compressed() {
        let mut cur = Cursor::new(Vec::new());
        let mut table = CompressionTable::new();
        Name::from_str("example.com.").unwrap().write_compressed_bytes(&mut cur, &mut table).unwrap();

        let rdata = RecordDataMX::new(5, Name::from_str("mx.EXAMPLE.com.").unwrap());
        rdata.write_network_bytes(&mut cur, &mut table).unwrap();
        let buf = cur.into_inner();

        assert_eq!(
            vec![
                7,                                // length
                101, 120, 97, 109, 112, 108, 101, // "example"
                3,                                // length
                99, 111, 109,                     // "com"
                0,                                // root
                0, 5,                             // preference
                2,                                // length
                109, 120,                         // "mx"
                192, 0,                           // pointer to offset 0
            ],
            buf,
        );

        let mut buf = view(buf);
        buf.set_position(13).unwrap();
        let decoded = RecordDataMX::read_network_bytes(7, &mut buf).unwrap();
        assert_eq!(rdata, decoded);
        assert_eq!(7, RecordData::MX(decoded).raw_len());
    }

    #[rustfmt::skip]
    #[test]
    fn test_record_data_mx_read_network_bytes() {
        let mut buf = view(vec![
            1, 0,                             // preference
            2,                                // length
            109, 120,                         // "mx"
            7,                                // length
            101, 120, 97, 109, 112, 108, 101, // "example"
            3,                                // length
            99, 111, 109,                     // "com"
            0,                                // root
        ]);

        let rdata = RecordDataMX::read_network_bytes(18, &mut buf).unwrap();
        assert_eq!(256, rdata.preference());
        assert_eq!("mx.example.com.", rdata.exchange().to_string());
        assert_eq!("256 mx.example.com.", rdata.to_string());
    }

    #[rustfmt::skip]
    #[test]
    fn test_record_data_ptr_read_network_bytes() {
        let mut buf = view(vec![
            3,                                // length
            119, 119, 119,                    // "www"
            7,                                // length
            101, 120, 97, 109, 112, 108, 101, // "example"
            3,                                // length
            99, 111, 109,                     // "com"
            0,                                // root
        ]);

        let rdata = RecordDataPTR::read_network_bytes(17, &mut buf).unwrap();
        assert_eq!("www.example.com.", rdata.to_string());
    }

    #[test]
    fn test_record_data_ptr_eq_ignores_case() {
        let a = RecordDataPTR::new(Name::from_str("Host.Example.COM").unwrap());
        let b = RecordDataPTR::new(Name::from_str("host.example.com.").unwrap());
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!("Host.Example.COM.", a.to_string());
    }

    #[test]
    fn test_record_data_txt_new_exceeds_max_size() {
        // 255 chunks of 255 bytes plus one length byte each is 65280 bytes. One
        // more full chunk would push the total past 65535.
        let res = RecordDataTXT::new("a".repeat(255 * 257));
        assert!(res.is_err());
    }

    #[test]
    fn test_record_data_txt_size() {
        assert_eq!(1, RecordDataTXT::new("").unwrap().size());
        assert_eq!(9, RecordDataTXT::new("id=hello").unwrap().size());
        assert_eq!(256, RecordDataTXT::new("a".repeat(255)).unwrap().size());
        assert_eq!(258, RecordDataTXT::new("a".repeat(256)).unwrap().size());
    }

    #[test]
    fn test_record_data_txt_write_network_bytes_empty() {
        let rdata = RecordData::TXT(RecordDataTXT::new("").unwrap());
        assert_eq!(vec![0], encode(&rdata));
    }

    #[rustfmt::skip]
    #[test]
    fn test_record_data_txt_write_network_bytes() {
        let rdata = RecordData::TXT(RecordDataTXT::new("id=hello").unwrap());

        assert_eq!(
            vec![
                8,                                     // length
                105, 100, 61, 104, 101, 108, 108, 111, // id=hello
            ],
            encode(&rdata),
        )
    }

    #[test]
    fn test_record_data_txt_write_network_bytes_chunks() {
        let rdata = RecordData::TXT(RecordDataTXT::new("a".repeat(256)).unwrap());
        let buf = encode(&rdata);

        assert_eq!(258, buf.len());
        assert_eq!(255, buf[0]);
        assert_eq!(1, buf[256]);
        assert_eq!(b'a', buf[257]);
    }

    #[rustfmt::skip]
    #[test]
    fn test_record_data_txt_read_network_bytes() {
        let mut buf = view(vec![
            8,                                               // length
            105, 100, 61, 104, 101, 108, 108, 111,           // id=hello
            10,                                              // length
            117, 115, 101, 114, 61, 119, 111, 114, 108, 100, // user=world
        ]);

        let rdata = RecordDataTXT::read_network_bytes(20, &mut buf).unwrap();
        assert_eq!("id=hellouser=world", rdata.text());
    }

    #[test]
    fn test_record_data_txt_round_trip_lengths() {
        for n in [0, 1, 255, 256, 510] {
            let text = "x".repeat(n);
            let rdata = RecordData::TXT(RecordDataTXT::new(text.clone()).unwrap());
            let bytes = encode(&rdata);
            let len = bytes.len() as u16;

            let mut buf = view(bytes);
            let decoded = RecordDataTXT::read_network_bytes(len, &mut buf).unwrap();
            assert_eq!(text, decoded.text(), "length {}", n);
        }
    }

    #[test]
    fn test_record_data_txt_read_network_bytes_missing_length() {
        let mut buf = view(vec![2, 104, 105]);
        let res = RecordDataTXT::read_network_bytes(4, &mut buf);
        assert_eq!(ErrorKind::TruncatedData, res.unwrap_err().kind());
    }

    #[test]
    fn test_record_data_txt_read_network_bytes_chunk_too_long() {
        let mut buf = view(vec![5, 104, 105]);
        let res = RecordDataTXT::read_network_bytes(3, &mut buf);
        assert_eq!(ErrorKind::TruncatedData, res.unwrap_err().kind());
    }

    #[test]
    fn test_record_data_txt_read_network_bytes_invalid_utf8() {
        #[rustfmt::skip]
        let mut buf = view(vec![
            2,          // length
            0xC3, 0x28, // invalid two byte sequence
        ]);
        let res = RecordDataTXT::read_network_bytes(3, &mut buf);
        assert_eq!(ErrorKind::Runtime, res.unwrap_err().kind());
    }

    #[test]
    fn test_record_data_txt_read_network_bytes_multibyte_split() {
        #[rustfmt::skip]
        let bytes = vec![
            3,                // length
            b'a', 0xC3, 0xA9, // "aé"
            1,                // length
            b'z',             // "z"
        ];
        let mut buf = view(bytes.clone());
        let rdata = RecordDataTXT::read_network_bytes(6, &mut buf).unwrap();
        assert_eq!("aéz", rdata.text());

        let mut out = Vec::new();
        rdata.write_network_bytes(&mut out).unwrap();
        assert_eq!(&[4, b'a', 0xC3, 0xA9, b'z'], out.as_slice());
    }

    #[test]
    fn test_record_data_txt_display() {
        let rdata = RecordDataTXT::new("say \"hi\"").unwrap();
        assert_eq!("\"say \\\"hi\\\"\"", rdata.to_string());
    }

    #[test]
    fn test_record_data_aaaa_write_network_bytes() {
        let rdata = RecordData::AAAA(RecordDataAAAA::new(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1)));
        assert_eq!(vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1], encode(&rdata));
    }

    #[test]
    fn test_record_data_aaaa_read_network_bytes() {
        let mut buf = view(vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        let rdata = RecordDataAAAA::read_network_bytes(16, &mut buf).unwrap();
        assert_eq!(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1), rdata.addr());
    }

    #[test]
    fn test_record_data_aaaa_read_network_bytes_short() {
        let mut buf = view(vec![0, 0, 0, 0, 0, 0, 0, 0]);
        let res = RecordDataAAAA::read_network_bytes(16, &mut buf);
        assert_eq!(ErrorKind::TruncatedData, res.unwrap_err().kind());
    }

    #[test]
    fn test_record_data_unknown_read_network_bytes() {
        let mut buf = view(vec![1, 2, 3, 4]);
        let rdata = RecordDataUnknown::read_network_bytes(3, &mut buf).unwrap();
        assert_eq!(&[1, 2, 3], rdata.bytes());

        let mut buf = view(vec![1, 2]);
        let res = RecordDataUnknown::read_network_bytes(3, &mut buf);
        assert_eq!(ErrorKind::TruncatedData, res.unwrap_err().kind());
    }

    #[test]
    fn test_record_data_from_text_aaaa_len_is_binary_size() {
        let rdata = RecordData::from_text(RecordType::AAAA, "2001:db8::1").unwrap();
        assert_eq!(16, rdata.raw_len());
        assert_eq!(
            RecordData::AAAA(RecordDataAAAA::new(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1))),
            rdata
        );
    }

    #[test]
    fn test_record_data_from_text_mx() {
        let rdata = RecordData::from_text(RecordType::MX, "10 mail.example.com.").unwrap();
        assert_eq!("10 mail.example.com.", rdata.to_string());
        assert!(RecordData::from_text(RecordType::MX, "mail.example.com.").is_err());
    }

    #[test]
    fn test_record_data_from_text_txt_quoted() {
        let rdata = RecordData::from_text(RecordType::TXT, "\"v=spf1 \" \"-all\"").unwrap();
        assert_eq!(RecordData::TXT(RecordDataTXT::new("v=spf1 -all").unwrap()), rdata);

        assert!(RecordData::from_text(RecordType::TXT, "\"unterminated").is_err());
    }

    #[test]
    fn test_record_data_from_text_unknown() {
        let res = RecordData::from_text(RecordType::Unknown(99), "whatever");
        assert_eq!(ErrorKind::UnsupportedOperation, res.unwrap_err().kind());
    }

    #[test]
    fn test_record_data_eq_ignores_raw_len() {
        let mut buf = view(vec![5, 104, 101, 108, 108, 111, 0]);
        // Trailing byte isn't part of the text but is counted in the declared length.
        let decoded = RecordDataTXT::read_network_bytes(7, &mut buf).unwrap();
        let built = RecordDataTXT::new("hello").unwrap();

        assert_eq!(built, decoded);
        assert_eq!(6, RecordData::TXT(built).raw_len());
        assert_eq!(7, RecordData::TXT(decoded).raw_len());
    }
}
