use crate::core::DnsError;
use crate::io::OffsetStream;
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::io::{Read, Seek, SeekFrom};
use std::str::FromStr;

/// A domain name made up of labels, always treated as fully qualified.
///
/// The case of each label is preserved for display but comparison and hashing
/// ignore ASCII case, as DNS does.
#[derive(Debug, Clone)]
pub struct Name {
    labels: Vec<String>,
}

impl Name {
    const MAX_LENGTH: usize = 255;
    const MAX_LABEL_LENGTH: usize = 63;
    const MAX_POINTERS: u32 = 64;
    const POINTER_BITS: u16 = 0b1100_0000_0000_0000;

    pub fn root() -> Self {
        Name { labels: Vec::new() }
    }

    /// Size of the name in bytes when written without compression.
    pub fn size(&self) -> u16 {
        (self.labels.iter().map(|l| l.len()).sum::<usize>() + self.labels.len()) as u16 + 1
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The name formed by dropping the first `skip` labels of this name.
    fn suffix(&self, skip: usize) -> Name {
        Name {
            labels: self.labels[skip..].to_vec(),
        }
    }

    pub fn write_network_bytes<T>(&self, mut buf: T) -> Result<(), DnsError>
    where
        T: WriteBytesExt,
    {
        for label in self.labels.iter() {
            buf.write_u8(label.len() as u8)?;
            buf.write_all(label.as_bytes())?;
        }

        Ok(buf.write_u8(0)?)
    }

    /// Write this name using pointers to names already written to the same message.
    ///
    /// Each suffix of the name is looked up in `table`. The first one found is written as
    /// a two byte pointer and the name is complete. Suffixes that aren't found are added
    /// to `table` at the position they're about to be written at. Positions come from
    /// `buf` and so `buf` must start at the beginning of the message.
    pub fn write_compressed_bytes<T>(&self, mut buf: T, table: &mut CompressionTable) -> Result<(), DnsError>
    where
        T: WriteBytesExt + Seek,
    {
        for (i, label) in self.labels.iter().enumerate() {
            let suffix = self.suffix(i);
            if let Some(offset) = table.get(&suffix) {
                return Ok(buf.write_u16::<NetworkEndian>(Self::POINTER_BITS | offset)?);
            }

            let pos = buf.stream_position()?;
            table.insert(suffix, pos);

            buf.write_u8(label.len() as u8)?;
            buf.write_all(label.as_bytes())?;
        }

        Ok(buf.write_u8(0)?)
    }

    /// Read a possibly compressed name from a view over a DNS message.
    ///
    /// Pointers are interpreted as positions within `buf` so the view must start at
    /// the beginning of the message. Pointers may only refer to positions before the
    /// end of the view.
    ///
    /// Labels are taken as they appear on the wire, only the label and name length
    /// limits are enforced. Names that aren't valid host names, such as `*.example.com.`
    /// or `0/25.2.0.192.in-addr.arpa.`, are accepted.
    pub fn read_network_bytes<S>(buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        let mut labels = Vec::new();
        loop {
            let len = buf.read_u8()?;
            // If the length isn't a length but actually a pointer to another name
            // or label within the message, seek to that position within the message
            // and read the name from there. `read_offset_into` will follow any further
            // offsets and read the labels for the name into `labels`. After resolving
            // all pointers and reading labels, reset the stream back to immediately
            // after the pointer. This may be the very end of the view.
            if Self::is_offset(len) {
                let offset = Self::get_offset(len, buf.read_u8()?);
                let current = buf.position();
                Self::read_offset_into(buf, offset, &mut labels)?;
                buf.set_position(current)?;
                break;
            }

            // If the length is a length, read the next label (segment) of the name breaking
            // the loop once we read the "root" label (`.`) signified by a length of 0.
            if Self::read_label_into(buf, len, &mut labels)? {
                break;
            }
        }

        Ok(Name { labels })
    }

    fn read_offset_into<S>(buf: &mut OffsetStream<S>, offset: u64, out: &mut Vec<String>) -> Result<(), DnsError>
    where
        S: Read + Seek,
    {
        buf.seek(SeekFrom::Start(offset))?;
        let mut pointers = 1;

        loop {
            // To avoid loops from badly behaved servers, only follow a fixed number of
            // pointers when trying to resolve a single name. This number is picked to be
            // much higher than most names will use but still finite.
            if pointers > Self::MAX_POINTERS {
                return Err(DnsError::runtime(format!(
                    "reached max number of pointers ({}) while reading name",
                    Self::MAX_POINTERS
                )));
            }

            let len = buf.read_u8()?;
            if Self::is_offset(len) {
                let offset = Self::get_offset(len, buf.read_u8()?);
                buf.seek(SeekFrom::Start(offset))?;
                pointers += 1;
                continue;
            }

            if Self::read_label_into(buf, len, out)? {
                return Ok(());
            }
        }
    }

    /// Read the next name label of length `len` into `out` and return true if the
    /// label was the root label (`.`) and this name is complete, false otherwise.
    fn read_label_into<S>(buf: &mut OffsetStream<S>, len: u8, out: &mut Vec<String>) -> Result<bool, DnsError>
    where
        S: Read + Seek,
    {
        if len == 0 {
            return Ok(true);
        }

        // Only six bits of the length are supposed to be used to encode the
        // length of a label so 63 is the max length but double check just in
        // case one of the pointer bits was set for some reason.
        if len as usize > Self::MAX_LABEL_LENGTH {
            return Err(DnsError::runtime(format!(
                "max size for label would be exceeded reading {} bytes",
                len,
            )));
        }

        // Each label takes its length plus one byte for the length prefix, and the
        // name is terminated by the root label.
        let current: usize = out.iter().map(|l| l.len() + 1).sum();
        if current + len as usize + 2 > Self::MAX_LENGTH {
            return Err(DnsError::runtime(format!(
                "max size for name would be exceeded adding {} bytes to {}",
                len, current
            )));
        }

        let mut label = vec![0_u8; usize::from(len)];
        buf.read_exact(&mut label)
            .map_err(|e| DnsError::truncated(format!("short read for name label of {} bytes: {}", len, e)))?;

        let label = String::from_utf8(label).map_err(|e| DnsError::runtime_cause("name label is not UTF-8", e))?;
        out.push(label);
        Ok(false)
    }

    fn is_offset(len: u8) -> bool {
        // The top two bits of the length byte of a name label (section) are used
        // to indicate the name is actually an offset in the DNS message to a previous
        // name to avoid duplicating the same names over and over.
        len & 0b1100_0000 == 192
    }

    fn get_offset(len: u8, next: u8) -> u64 {
        let pointer = ((len & 0b0011_1111) as u16) << 8;
        (pointer | (next as u16)) as u64
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(other.labels.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels.iter() {
            state.write_usize(label.len());
            for b in label.bytes() {
                state.write_u8(b.to_ascii_lowercase());
            }
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.", self.labels.join("."))
    }
}

impl FromStr for Name {
    type Err = DnsError;

    /// Parse a name from text. A trailing `.` is optional since every name is
    /// treated as fully qualified.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(DnsError::runtime(format!(
                "Names are limited to {} bytes max: {}",
                Self::MAX_LENGTH,
                s
            )));
        }

        let mut labels = Vec::new();
        for label in s.strip_suffix('.').unwrap_or(s).split('.') {
            let len = label.len();
            if len == 0 {
                return Err(DnsError::runtime(format!("empty label in name: {}", s)));
            }

            if len > Self::MAX_LABEL_LENGTH {
                return Err(DnsError::runtime(format!(
                    "Name labels are limited to {} bytes max: {}",
                    Self::MAX_LABEL_LENGTH,
                    label
                )));
            }

            for (i, c) in label.char_indices() {
                if i == 0 && !c.is_ascii_alphanumeric() && c != '_' {
                    return Err(DnsError::runtime(format!(
                        "label must begin with ASCII letter, number, or underscore: {}",
                        label
                    )));
                } else if i == len - 1 && !c.is_ascii_alphanumeric() {
                    return Err(DnsError::runtime(format!(
                        "label must end with ASCII letter or number: {}",
                        label
                    )));
                } else if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
                    return Err(DnsError::runtime(format!(
                        "label must be ASCII letter, number, hyphen, or underscore: {}",
                        label
                    )));
                }
            }

            labels.push(label.to_owned());
        }

        Ok(Name { labels })
    }
}

/// Positions of names already written to a message being encoded.
///
/// Entries are only ever added. A table must only be used for a single message
/// since the positions it stores are relative to the start of that message.
#[derive(Debug, Default, Clone)]
pub struct CompressionTable {
    entries: HashMap<Name, u16>,
}

impl CompressionTable {
    /// Largest position that can be stored in the 14 bits of a name pointer.
    const MAX_OFFSET: u64 = 0b0011_1111_1111_1111;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &Name) -> Option<u16> {
        self.entries.get(name).copied()
    }

    /// Record that `name` was written at `offset`. Offsets that can't be represented
    /// by a pointer and names already present are ignored.
    pub fn insert(&mut self, name: Name, offset: u64) {
        if offset <= Self::MAX_OFFSET && !name.is_root() {
            self.entries.entry(name).or_insert(offset as u16);
        }
    }
}
