use std::error;
use std::fmt;
use std::io;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum ErrorKind {
    AddressFormat,
    ProtocolMismatch,
    UnsupportedVersion,
    TruncatedData,
    UnsupportedOperation,
    OutOfRange,
    ReadOnlyViolation,
    Configuration,
    Runtime,
    IO,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressFormat => write!(f, "invalid address"),
            Self::ProtocolMismatch => write!(f, "protocol mismatch"),
            Self::UnsupportedVersion => write!(f, "unsupported version"),
            Self::TruncatedData => write!(f, "truncated data"),
            Self::UnsupportedOperation => write!(f, "unsupported operation"),
            Self::OutOfRange => write!(f, "out of range"),
            Self::ReadOnlyViolation => write!(f, "read only"),
            Self::Configuration => write!(f, "configuration error"),
            Self::Runtime => write!(f, "runtime error"),
            Self::IO => write!(f, "io error"),
        }
    }
}

#[derive(Debug)]
enum ErrorRepr {
    Message(String),
    Cause(Box<dyn error::Error + Send + Sync + 'static>),
    MessageCause(String, Box<dyn error::Error + Send + Sync + 'static>),
}

/// Error returned by every fallible operation in this crate.
///
/// The `kind` identifies which class of failure occurred so that callers can
/// decide on a policy (try another server, re-resolve an address, etc.) without
/// having to inspect error messages.
#[derive(Debug)]
pub struct DnsError {
    kind: ErrorKind,
    repr: ErrorRepr,
}

impl DnsError {
    fn message<S>(kind: ErrorKind, msg: S) -> DnsError
    where
        S: Into<String>,
    {
        DnsError {
            kind,
            repr: ErrorRepr::Message(msg.into()),
        }
    }

    fn message_cause<S, E>(kind: ErrorKind, msg: S, e: E) -> DnsError
    where
        S: Into<String>,
        E: error::Error + Send + Sync + 'static,
    {
        DnsError {
            kind,
            repr: ErrorRepr::MessageCause(msg.into(), Box::new(e)),
        }
    }

    pub fn address_format<S>(msg: S) -> DnsError
    where
        S: Into<String>,
    {
        Self::message(ErrorKind::AddressFormat, msg)
    }

    pub fn address_format_cause<S, E>(msg: S, e: E) -> DnsError
    where
        S: Into<String>,
        E: error::Error + Send + Sync + 'static,
    {
        Self::message_cause(ErrorKind::AddressFormat, msg, e)
    }

    pub fn protocol_mismatch<S>(msg: S) -> DnsError
    where
        S: Into<String>,
    {
        Self::message(ErrorKind::ProtocolMismatch, msg)
    }

    pub fn unsupported_version<S>(msg: S) -> DnsError
    where
        S: Into<String>,
    {
        Self::message(ErrorKind::UnsupportedVersion, msg)
    }

    pub fn truncated<S>(msg: S) -> DnsError
    where
        S: Into<String>,
    {
        Self::message(ErrorKind::TruncatedData, msg)
    }

    pub fn unsupported_operation<S>(msg: S) -> DnsError
    where
        S: Into<String>,
    {
        Self::message(ErrorKind::UnsupportedOperation, msg)
    }

    pub fn out_of_range<S>(msg: S) -> DnsError
    where
        S: Into<String>,
    {
        Self::message(ErrorKind::OutOfRange, msg)
    }

    pub fn read_only<S>(msg: S) -> DnsError
    where
        S: Into<String>,
    {
        Self::message(ErrorKind::ReadOnlyViolation, msg)
    }

    pub fn configuration<S>(msg: S) -> DnsError
    where
        S: Into<String>,
    {
        Self::message(ErrorKind::Configuration, msg)
    }

    pub fn configuration_cause<S, E>(msg: S, e: E) -> DnsError
    where
        S: Into<String>,
        E: error::Error + Send + Sync + 'static,
    {
        Self::message_cause(ErrorKind::Configuration, msg, e)
    }

    pub fn runtime<S>(msg: S) -> DnsError
    where
        S: Into<String>,
    {
        Self::message(ErrorKind::Runtime, msg)
    }

    pub fn runtime_cause<S, E>(msg: S, e: E) -> DnsError
    where
        S: Into<String>,
        E: error::Error + Send + Sync + 'static,
    {
        Self::message_cause(ErrorKind::Runtime, msg, e)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for DnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            ErrorRepr::Message(msg) => write!(f, "{}: {}", self.kind, msg),
            ErrorRepr::Cause(e) => write!(f, "{}: {}", self.kind, e),
            ErrorRepr::MessageCause(msg, e) => write!(f, "{}: {}: {}", self.kind, msg, e),
        }
    }
}

impl error::Error for DnsError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Message(_) => None,
            ErrorRepr::Cause(e) => Some(e.as_ref()),
            ErrorRepr::MessageCause(_, e) => Some(e.as_ref()),
        }
    }
}

impl From<io::Error> for DnsError {
    fn from(e: io::Error) -> Self {
        // Errors raised by `OffsetStream` from within `Read`, `Write`, or `Seek`
        // implementations have to be wrapped in an `io::Error`. Unwrap them here
        // so callers see the original kind instead of a generic IO error.
        if e.get_ref().map(|inner| inner.is::<DnsError>()).unwrap_or(false) {
            if let Some(inner) = e.into_inner() {
                if let Ok(dns) = inner.downcast::<DnsError>() {
                    return *dns;
                }
            }

            return DnsError::runtime("unable to unwrap nested error");
        }

        let kind = if e.kind() == io::ErrorKind::UnexpectedEof {
            ErrorKind::TruncatedData
        } else {
            ErrorKind::IO
        };

        DnsError {
            kind,
            repr: ErrorRepr::Cause(Box::new(e)),
        }
    }
}

impl From<DnsError> for io::Error {
    fn from(e: DnsError) -> Self {
        let kind = match e.kind {
            ErrorKind::TruncatedData => io::ErrorKind::UnexpectedEof,
            ErrorKind::UnsupportedOperation => io::ErrorKind::Unsupported,
            ErrorKind::OutOfRange => io::ErrorKind::InvalidInput,
            ErrorKind::ReadOnlyViolation => io::ErrorKind::PermissionDenied,
            _ => io::ErrorKind::Other,
        };

        io::Error::new(kind, e)
    }
}
