use crate::SyncChannel;
use std::{
    io::{BufReader, BufWriter, Result},
    net::TcpStream,
};

/// A SyncChannel which uses a TcpStream.
pub type TcpChannel = SyncChannel<BufReader<TcpStream>, BufWriter<TcpStream>>;

/// Wrap a connected `stream` into a buffered channel.
pub fn tcp_channel(stream: TcpStream) -> Result<TcpChannel> {
    stream.set_nodelay(true)?;
    Ok(SyncChannel::new(
        BufReader::new(stream.try_clone()?),
        BufWriter::new(stream),
    ))
}
