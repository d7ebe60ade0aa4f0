//! Run the PSI protocol between two parties, either on two local threads or
//! across TCP.
//!
//! The sender holds the integers `0..n` and the receiver holds
//! `offset..offset + n`, so the expected intersection has `n - offset`
//! elements.

use bandkit::{
    channel::tcp_channel, track_unix_channel_pair, AbstractChannel, Blake3Hash, Block, TrackChannel,
};
use bandpsi::{utils, PsiParams, Receiver, Sender};
use bandvole::dummy;
use clap::{Parser, ValueEnum};
use eyre::{bail, Result, WrapErr};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::{
    env,
    net::{TcpListener, TcpStream},
    time::Instant,
};

const DEFAULT_ADDR: &str = "127.0.0.1:5527";

/// Which party, or both.
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum Mode {
    Local,
    Sender,
    Receiver,
}

/// Private set intersection from VOLE and a band OKVS.
#[derive(Parser)]
#[clap(name = "psi")]
struct Cli {
    /// Number of elements held by each party
    #[clap(long, default_value_t = 1 << 20)]
    set_size: usize,

    /// How far the receiver's range is shifted from the sender's
    #[clap(long, default_value_t = 100)]
    intersection_offset: usize,

    /// OKVS band width in bits
    #[clap(long, default_value_t = 512)]
    band_width: usize,

    /// OKVS expansion factor
    #[clap(long, default_value_t = 1.01)]
    expansion: f64,

    /// Salt for the OKVS row hash; both parties must agree
    #[clap(long)]
    salt: Option<u128>,

    /// Run both parties locally, or one of them over TCP
    #[clap(value_enum, long, default_value_t = Mode::Local)]
    mode: Mode,

    /// Address the sender listens on and the receiver connects to
    #[clap(long, default_value_t = DEFAULT_ADDR.to_string())]
    address: String,
}

impl Cli {
    fn params(&self) -> PsiParams {
        PsiParams {
            band_width: self.band_width,
            expansion: self.expansion,
        }
    }

    fn hasher(&self) -> Blake3Hash {
        match self.salt {
            Some(salt) => Blake3Hash::with_salt(Block(salt)),
            None => Blake3Hash::new(),
        }
    }
}

fn run_sender<C: AbstractChannel>(cli: &Cli, channel: &mut TrackChannel<C>) -> Result<()> {
    let mut rng = ChaCha12Rng::from_entropy();
    let inputs = utils::range_items(0, cli.set_size);
    let vole = dummy::Sender::init(channel, &mut rng)?;
    let mut psi = Sender::with_hasher(vole, cli.params(), cli.hasher());
    let start = Instant::now();
    psi.send(&inputs, channel, &mut rng)?;
    info!("Sender :: send time: {} ms", start.elapsed().as_millis());
    info!(
        "Sender :: communication (read): {:.2} MB",
        channel.megabytes_read()
    );
    info!(
        "Sender :: communication (write): {:.2} MB",
        channel.megabytes_written()
    );
    Ok(())
}

fn run_receiver<C: AbstractChannel + Send>(
    cli: &Cli,
    channel: &mut TrackChannel<C>,
) -> Result<Vec<Block>> {
    let mut rng = ChaCha12Rng::from_entropy();
    let inputs = utils::range_items(cli.intersection_offset, cli.set_size);
    let vole = dummy::Receiver::init(channel, &mut rng)?;
    let mut psi = Receiver::with_hasher(vole, cli.params(), cli.hasher());
    let start = Instant::now();
    let intersection = psi.receive(&inputs, channel, &mut rng)?;
    info!(
        "Receiver :: receive time: {} ms",
        start.elapsed().as_millis()
    );
    info!(
        "Receiver :: communication (read): {:.2} MB",
        channel.megabytes_read()
    );
    info!(
        "Receiver :: communication (write): {:.2} MB",
        channel.megabytes_written()
    );
    Ok(intersection)
}

fn check(cli: &Cli, intersection: &[Block]) -> Result<()> {
    let expected = cli.set_size.saturating_sub(cli.intersection_offset);
    info!("intersection size: {} (expected {})", intersection.len(), expected);
    if intersection.len() != expected {
        bail!(
            "wrong intersection size: got {}, expected {}",
            intersection.len(),
            expected
        );
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    info!("set size:   {}", cli.set_size);
    info!("offset:     {}", cli.intersection_offset);
    info!("band width: {}", cli.band_width);
    info!("expansion:  {}", cli.expansion);
    info!("mode:       {:?}", cli.mode);

    match cli.mode {
        Mode::Local => {
            let (mut tx, mut rx) = track_unix_channel_pair()?;
            let intersection = std::thread::scope(|s| {
                let handle = s.spawn(|| run_sender(cli, &mut tx));
                let intersection = run_receiver(cli, &mut rx);
                match handle.join() {
                    Ok(sent) => sent.and(intersection),
                    Err(_) => bail!("sender thread panicked"),
                }
            })?;
            check(cli, &intersection)
        }
        Mode::Sender => {
            let listener = TcpListener::bind(&cli.address)
                .wrap_err_with(|| format!("cannot listen on {}", cli.address))?;
            info!("waiting for the receiver on {}", cli.address);
            let (stream, _) = listener.accept()?;
            let mut channel = TrackChannel::new(tcp_channel(stream)?);
            run_sender(cli, &mut channel)
        }
        Mode::Receiver => {
            let stream = TcpStream::connect(&cli.address)
                .wrap_err_with(|| format!("cannot connect to {}", cli.address))?;
            let mut channel = TrackChannel::new(tcp_channel(stream)?);
            let intersection = run_receiver(cli, &mut channel)?;
            check(cli, &intersection)
        }
    }
}

fn main() -> Result<()> {
    // if log-level `RUST_LOG` not already set, then set to info
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init_timed();

    let cli = Cli::parse();
    run(&cli)
}
