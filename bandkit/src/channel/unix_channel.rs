use crate::{SyncChannel, TrackChannel};
use std::{
    io::{BufReader, BufWriter, Result},
    os::unix::net::UnixStream,
};

/// A SyncChannel which uses UnixStreams.
pub type UnixChannel = SyncChannel<BufReader<UnixStream>, BufWriter<UnixStream>>;

/// A TrackChannel which uses UnixStreams.
pub type TrackUnixChannel = TrackChannel<UnixChannel>;

fn unix_channel(stream: UnixStream) -> Result<UnixChannel> {
    Ok(SyncChannel::new(
        BufReader::new(stream.try_clone()?),
        BufWriter::new(stream),
    ))
}

/// Convenience function to create a pair of UnixChannels for local two-party runs.
pub fn unix_channel_pair() -> Result<(UnixChannel, UnixChannel)> {
    let (tx, rx) = UnixStream::pair()?;
    Ok((unix_channel(tx)?, unix_channel(rx)?))
}

/// Convenience function to create a pair of TrackUnixChannels for local two-party runs.
pub fn track_unix_channel_pair() -> Result<(TrackUnixChannel, TrackUnixChannel)> {
    let (tx, rx) = unix_channel_pair()?;
    Ok((TrackChannel::new(tx), TrackChannel::new(rx)))
}
