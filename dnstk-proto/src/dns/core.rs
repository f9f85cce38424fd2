use crate::core::DnsError;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// Type of a resource record or question. Types without a payload decoder are
/// carried as `Unknown` with their numeric code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RecordType {
    A,
    NS,
    PTR,
    MX,
    TXT,
    AAAA,
    Unknown(u16),
}

impl RecordType {
    const KNOWN: [(Self, u16, &'static str); 6] = [
        (Self::A, 1, "A"),
        (Self::NS, 2, "NS"),
        (Self::PTR, 12, "PTR"),
        (Self::MX, 15, "MX"),
        (Self::TXT, 16, "TXT"),
        (Self::AAAA, 28, "AAAA"),
    ];
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        Self::KNOWN
            .iter()
            .find(|(_, code, _)| *code == value)
            .map(|(t, _, _)| *t)
            .unwrap_or(Self::Unknown(value))
    }
}

impl From<RecordType> for u16 {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::Unknown(code) => code,
            known => RecordType::KNOWN
                .iter()
                .find(|(t, _, _)| *t == known)
                .map(|(_, code, _)| *code)
                .unwrap_or_default(),
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::KNOWN.iter().find(|(t, _, _)| t == self) {
            Some((_, _, name)) => f.write_str(name),
            None => write!(f, "Unknown({})", u16::from(*self)),
        }
    }
}

impl FromStr for RecordType {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::KNOWN
            .iter()
            .find(|(_, _, name)| name.eq_ignore_ascii_case(s))
            .map(|(t, _, _)| *t)
            .ok_or_else(|| DnsError::configuration(format!("unknown record type '{}'", s.to_uppercase())))
    }
}

/// Class of a resource record or question. `IN` is accepted as an alias of `INET`
/// when parsing text but `INET` is always displayed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RecordClass {
    INET,
    CHAOS,
    HESIOD,
    NONE,
    ANY,
    Unknown(u16),
}

impl RecordClass {
    const KNOWN: [(Self, u16, &'static str); 5] = [
        (Self::INET, 1, "INET"),
        (Self::CHAOS, 3, "CHAOS"),
        (Self::HESIOD, 4, "HESIOD"),
        (Self::NONE, 254, "NONE"),
        (Self::ANY, 255, "ANY"),
    ];
}

impl From<u16> for RecordClass {
    fn from(value: u16) -> Self {
        Self::KNOWN
            .iter()
            .find(|(_, code, _)| *code == value)
            .map(|(c, _, _)| *c)
            .unwrap_or(Self::Unknown(value))
    }
}

impl From<RecordClass> for u16 {
    fn from(value: RecordClass) -> Self {
        match value {
            RecordClass::Unknown(code) => code,
            known => RecordClass::KNOWN
                .iter()
                .find(|(c, _, _)| *c == known)
                .map(|(_, code, _)| *code)
                .unwrap_or_default(),
        }
    }
}

impl Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::KNOWN.iter().find(|(c, _, _)| c == self) {
            Some((_, _, name)) => f.write_str(name),
            None => write!(f, "Unknown({})", u16::from(*self)),
        }
    }
}

impl FromStr for RecordClass {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("IN") {
            return Ok(Self::INET);
        }

        Self::KNOWN
            .iter()
            .find(|(_, _, name)| name.eq_ignore_ascii_case(s))
            .map(|(c, _, _)| *c)
            .ok_or_else(|| DnsError::configuration(format!("unknown record class '{}'", s.to_uppercase())))
    }
}
