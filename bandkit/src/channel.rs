mod sync_channel;
mod tcp_channel;
mod track_channel;
#[cfg(unix)]
mod unix_channel;

pub use sync_channel::SyncChannel;
pub use tcp_channel::{tcp_channel, TcpChannel};
pub use track_channel::TrackChannel;

#[cfg(unix)]
pub use unix_channel::{track_unix_channel_pair, unix_channel_pair, TrackUnixChannel, UnixChannel};

use crate::Block;
use std::{
    cell::RefCell,
    io::{Error, ErrorKind, Read, Result, Write},
    rc::Rc,
};

/// A trait for managing I/O. `AbstractChannel`s are clonable, and provide basic
/// read/write capabilities for both common and bandkit-specific types.
pub trait AbstractChannel {
    /// Read a slice of `u8`s from the channel.
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()>;
    /// Write a slice of `u8`s to the channel.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
    /// Flush the channel.
    fn flush(&mut self) -> Result<()>;
    /// Clone the channel.
    fn clone(&self) -> Self
    where
        Self: Sized;
    /// Read `nbytes` from the channel, and return it as a `Vec`.
    fn read_vec(&mut self, nbytes: usize) -> Result<Vec<u8>> {
        let mut data = vec![0; nbytes];
        self.read_bytes(&mut data)?;
        Ok(data)
    }

    /// Write a `u64` to the channel.
    #[inline(always)]
    fn write_u64(&mut self, s: u64) -> Result<()> {
        self.write_bytes(&s.to_le_bytes())
    }

    /// Read a `u64` from the channel.
    #[inline(always)]
    fn read_u64(&mut self) -> Result<u64> {
        let mut data = [0u8; 8];
        self.read_bytes(&mut data)?;
        Ok(u64::from_le_bytes(data))
    }

    /// Write a `usize` to the channel.
    #[inline(always)]
    fn write_usize(&mut self, s: usize) -> Result<()> {
        self.write_u64(s as u64)
    }

    /// Read a `usize` from the channel.
    #[inline(always)]
    fn read_usize(&mut self) -> Result<usize> {
        let x = self.read_u64()?;
        usize::try_from(x).map_err(|e| Error::new(ErrorKind::InvalidData, e))
    }

    /// Write a `Block` to the channel.
    #[inline(always)]
    fn write_block(&mut self, b: &Block) -> Result<()> {
        self.write_bytes(&b.to_bytes())
    }

    /// Read a `Block` from the channel.
    #[inline(always)]
    fn read_block(&mut self) -> Result<Block> {
        let mut data = [0u8; 16];
        self.read_bytes(&mut data)?;
        Ok(Block::from_bytes(data))
    }

    /// Write a slice of `Block`s to the channel as one contiguous buffer.
    fn write_blocks(&mut self, bs: &[Block]) -> Result<()> {
        self.write_bytes(&crate::utils::blocks_to_bytes(bs))
    }

    /// Read `n` `Block`s from the channel.
    fn read_blocks(&mut self, n: usize) -> Result<Vec<Block>> {
        let bytes = self.read_vec(n * 16)?;
        Ok(crate::utils::bytes_to_blocks(&bytes))
    }

    /// Send `payload` as one message labelled `tag`, and flush.
    ///
    /// The frame is the tag (length-prefixed), the payload length in bytes,
    /// then the payload itself.
    fn send_tagged(&mut self, tag: &str, payload: &[u8]) -> Result<()> {
        self.write_usize(tag.len())?;
        self.write_bytes(tag.as_bytes())?;
        self.write_usize(payload.len())?;
        self.write_bytes(payload)?;
        self.flush()
    }

    /// Read the header of a message sent with [`AbstractChannel::send_tagged`],
    /// check that it is labelled `tag`, and return the declared payload length
    /// in bytes.
    ///
    /// The payload itself is left on the channel, so that callers can reject
    /// an unexpected length before reading it.
    fn recv_tagged_header(&mut self, tag: &str) -> Result<usize> {
        let taglen = self.read_usize()?;
        if taglen != tag.len() {
            return Err(unexpected_tag(tag));
        }
        let got = self.read_vec(taglen)?;
        if got != tag.as_bytes() {
            return Err(unexpected_tag(tag));
        }
        self.read_usize()
    }
}

fn unexpected_tag(tag: &str) -> Error {
    Error::new(
        ErrorKind::InvalidData,
        format!("unexpected message: expected `{}`", tag),
    )
}

/// A standard read/write channel that implements `AbstractChannel`.
pub struct Channel<R, W> {
    reader: Rc<RefCell<R>>,
    writer: Rc<RefCell<W>>,
}

impl<R: Read, W: Write> Channel<R, W> {
    /// Make a new `Channel` from a `reader` and a `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        let reader = Rc::new(RefCell::new(reader));
        let writer = Rc::new(RefCell::new(writer));
        Self { reader, writer }
    }

    /// Return a reader object wrapped in `Rc<RefCell>`.
    pub fn reader(self) -> Rc<RefCell<R>> {
        self.reader
    }

    /// Return a writer object wrapped in `Rc<RefCell>`.
    pub fn writer(self) -> Rc<RefCell<W>> {
        self.writer
    }
}

impl<R: Read, W: Write> AbstractChannel for Channel<R, W> {
    #[inline(always)]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.borrow_mut().write_all(bytes)
    }

    #[inline(always)]
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()> {
        self.reader.borrow_mut().read_exact(bytes)
    }

    #[inline(always)]
    fn flush(&mut self) -> Result<()> {
        self.writer.borrow_mut().flush()
    }

    #[inline(always)]
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            writer: self.writer.clone(),
        }
    }
}
