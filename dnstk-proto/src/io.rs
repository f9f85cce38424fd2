use crate::core::DnsError;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// Backing streams that can be truncated or extended, used by `OffsetStream::set_len`.
pub trait SetLength {
    fn set_length(&mut self, len: u64) -> io::Result<()>;
}

impl SetLength for File {
    fn set_length(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl SetLength for Cursor<Vec<u8>> {
    fn set_length(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

impl<T> SetLength for &mut T
where
    T: SetLength,
{
    fn set_length(&mut self, len: u64) -> io::Result<()> {
        (**self).set_length(len)
    }
}

/// Adapter for streams that can only be read or written in order, such as sockets
/// or pipes. Any attempt to seek fails with `io::ErrorKind::Unsupported`.
#[derive(Debug)]
pub struct Sequential<T>(T);

impl<T> Sequential<T> {
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Read> Read for Sequential<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<T: Write> Write for Sequential<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<T> Seek for Sequential<T> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "stream is not seekable"))
    }
}

/// Read and write cursor over the region `[offset, offset + length)` of a backing stream.
///
/// Positions reported and accepted by an `OffsetStream` are relative to the start of
/// the region. Reads never go past the end of the region: once the position reaches
/// the length, reads return zero bytes. This makes it possible to hand a parser a
/// window of a larger message (a single resource record, for example) without any
/// way for a malformed length field to cause reads of unrelated data.
///
/// Whether the view owns the backing stream is determined by `S`: an `OffsetStream<File>`
/// closes the file when dropped while an `OffsetStream<&mut File>` leaves it open.
#[derive(Debug)]
pub struct OffsetStream<S> {
    stream: S,
    offset: u64,
    length: u64,
    position: u64,
    read_only: bool,
    seekable: bool,
}

impl<S> OffsetStream<S>
where
    S: Seek,
{
    /// Create a new view over a seekable stream starting at `offset`. If `length` is
    /// `None` or zero, the view extends to the current end of the backing stream.
    pub fn new(mut stream: S, offset: u64, length: Option<u64>, read_only: bool) -> Result<Self, DnsError> {
        let total = stream.seek(SeekFrom::End(0))?;
        if offset > total {
            return Err(DnsError::truncated(format!(
                "view offset {} is beyond end of stream at {}",
                offset, total
            )));
        }

        let remaining = total - offset;
        let length = match length {
            None | Some(0) => remaining,
            Some(n) if n > remaining => {
                return Err(DnsError::truncated(format!(
                    "view length {} exceeds {} bytes remaining after offset {}",
                    n, remaining, offset
                )));
            }
            Some(n) => n,
        };

        Ok(Self {
            stream,
            offset,
            length,
            position: 0,
            read_only,
            seekable: true,
        })
    }
}

impl<S> OffsetStream<Sequential<S>> {
    /// Create a new view over a stream that doesn't support seeking. The view starts
    /// wherever the stream currently is and the length is trusted as given.
    pub fn sequential(stream: S, length: u64, read_only: bool) -> Self {
        Self {
            stream: Sequential::new(stream),
            offset: 0,
            length,
            position: 0,
            read_only,
            seekable: false,
        }
    }
}

impl<S> OffsetStream<S> {
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Number of bytes between the current position and the end of the view.
    pub fn remaining(&self) -> u64 {
        self.length - self.position
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Move to `pos` within the view. Unlike `Seek::seek`, moving to exactly the end
    /// of the view is allowed. Moving past the end grows the view unless it is read-only.
    pub fn set_position(&mut self, pos: u64) -> Result<(), DnsError> {
        if !self.seekable {
            return Err(DnsError::unsupported_operation("cannot change position of non-seekable stream"));
        }

        if pos > self.length {
            if self.read_only {
                return Err(DnsError::out_of_range(format!(
                    "position {} is past end of read-only view of {} bytes",
                    pos, self.length
                )));
            }

            self.length = pos;
        }

        self.position = pos;
        Ok(())
    }

    /// Re-target this view to a new region of the same backing stream. Used to parse
    /// many bounded regions (one per resource record, for example) with a single view.
    pub fn reset(&mut self, offset: u64, length: u64, position: u64) -> Result<(), DnsError> {
        if position > length {
            return Err(DnsError::out_of_range(format!(
                "position {} is past end of {} byte view",
                position, length
            )));
        }

        self.offset = offset;
        self.length = length;
        self.position = position;
        Ok(())
    }

    fn sync_backing(&mut self) -> io::Result<()>
    where
        S: Seek,
    {
        if self.seekable {
            self.stream.seek(SeekFrom::Start(self.offset + self.position))?;
        }

        Ok(())
    }
}

impl<S> OffsetStream<S>
where
    S: SetLength,
{
    /// Set the length of the view, resizing the backing stream to `offset + len`.
    pub fn set_len(&mut self, len: u64) -> Result<(), DnsError> {
        if self.read_only {
            return Err(DnsError::read_only("cannot set length of read-only view"));
        }

        self.stream.set_length(self.offset + len)?;
        self.length = len;
        self.position = self.position.min(len);
        Ok(())
    }
}

impl<S> Read for OffsetStream<S>
where
    S: Read + Seek,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.position >= self.length {
            return Ok(0);
        }

        let max = usize::try_from(self.length - self.position).unwrap_or(usize::MAX);
        let count = buf.len().min(max);

        self.sync_backing()?;
        let n = self.stream.read(&mut buf[..count])?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<S> Write for OffsetStream<S>
where
    S: Write + Seek,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.read_only {
            return Err(DnsError::read_only("cannot write to read-only view").into());
        }

        if buf.is_empty() {
            return Ok(0);
        }

        self.sync_backing()?;
        let n = self.stream.write(buf)?;
        self.position += n as u64;
        if self.position > self.length {
            self.length = self.position;
        }

        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.read_only {
            return Err(DnsError::read_only("cannot flush read-only view").into());
        }

        self.stream.flush()
    }
}

impl<S> Seek for OffsetStream<S>
where
    S: Seek,
{
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        if !self.seekable {
            return Err(DnsError::unsupported_operation("cannot seek non-seekable stream").into());
        }

        let target = match pos {
            SeekFrom::Start(n) => i128::from(n),
            SeekFrom::Current(n) => i128::from(self.position) + i128::from(n),
            SeekFrom::End(n) => i128::from(self.length) + i128::from(n),
        };

        // Seeking to exactly the end of the view is rejected, use `set_position` for that.
        if target < 0 || target >= i128::from(self.length) {
            return Err(DnsError::out_of_range(format!(
                "seek to {} outside of view [0, {})",
                target, self.length
            ))
            .into());
        }

        self.position = target as u64;
        Ok(self.position)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }
}
