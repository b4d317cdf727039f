use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clap::ArgAction::Set;
use clap::{Parser, Subcommand};
use tracing::{Level, event, span};
use tracing_subscriber::prelude::*;

use base::prelude::*;
use host::{Fault, StreamTransport};
use machine::Loopback;

mod shortrun;

use shortrun::ShortRunOptions;

const AUTHOR: &str = "Colossus rebuild contributors";

/// Emulator and host for a register-mapped Colossus.
#[derive(Parser, Debug)]
#[clap(author = AUTHOR, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Serve the emulated device on standard input and output, one
    /// command frame per line.
    Serve,

    /// Load random wheel patterns and a random tape, then run through
    /// every setting of chi-1, printing a JSON line for each print
    /// record.
    ShortRun {
        /// Seed for the random tape and wheel patterns.
        #[clap(action = Set, long, default_value_t = 42)]
        seed: u64,

        /// Number of letters on the tape, not counting the stop letter.
        #[clap(action = Set, long, default_value_t = 164)]
        tape_length: usize,

        /// Only print settings whose impulse-1 count exceeds this.
        /// Without it, every setting is printed.
        #[clap(action = Set, long)]
        threshold: Option<u16>,

        /// Talk to this program (over its standard input and output)
        /// instead of an in-process emulation.
        #[clap(action = Set, long)]
        device: Option<OsString>,

        /// Arguments for the device program.
        #[clap(last = true)]
        device_args: Vec<OsString>,

        /// Copy the conversation with the device program to
        /// PREFIX.sent and PREFIX.received.
        #[clap(action = Set, long, value_name = "PREFIX")]
        spool: Option<PathBuf>,
    },
}

#[derive(Debug)]
enum Fail {
    /// We were not able to get started.
    InitialisationFailure(String),
    Io(io::Error),
    Session(Fault),
    Output(serde_json::Error),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
            Fail::Io(e) => write!(f, "I/O error: {e}"),
            Fail::Session(e) => write!(f, "session failed: {e}"),
            Fail::Output(e) => write!(f, "failed to write output: {e}"),
        }
    }
}

impl Error for Fail {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Fail::InitialisationFailure(_) => None,
            Fail::Io(e) => Some(e),
            Fail::Session(e) => Some(e),
            Fail::Output(e) => Some(e),
        }
    }
}

impl From<Fault> for Fail {
    fn from(e: Fault) -> Fail {
        Fail::Session(e)
    }
}

impl From<RangeError> for Fail {
    fn from(e: RangeError) -> Fail {
        Fail::Session(Fault::Range(e))
    }
}

impl From<io::Error> for Fail {
    fn from(e: io::Error) -> Fail {
        Fail::Io(e)
    }
}

impl From<serde_json::Error> for Fail {
    fn from(e: serde_json::Error) -> Fail {
        Fail::Output(e)
    }
}

fn serve() -> Result<(), Fail> {
    let mut device = machine::Colossus::new();
    let handled = machine::serve(&mut device, io::stdin().lock(), io::stdout().lock())?;
    event!(Level::INFO, "served {handled} command frames");
    Ok(())
}

fn spool_files(prefix: &Path) -> Result<(Box<dyn io::Write>, Box<dyn io::Write>), Fail> {
    let sent = File::create(prefix.with_extension("sent"))?;
    let received = File::create(prefix.with_extension("received"))?;
    Ok((Box::new(sent), Box::new(received)))
}

fn short_run_on_device(
    program: &OsString,
    args: &[OsString],
    spool: Option<&Path>,
    options: &ShortRunOptions,
) -> Result<(), Fail> {
    let span = span!(Level::INFO, "device", program = ?program);
    let _enter = span.enter();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Fail::InitialisationFailure(format!("failed to start device program {program:?}: {e}"))
        })?;
    let (Some(to_device), Some(from_device)) = (child.stdin.take(), child.stdout.take()) else {
        return Err(Fail::InitialisationFailure(
            "device program has no standard input or output".to_string(),
        ));
    };
    let mut transport = StreamTransport::new(BufReader::new(from_device), to_device);
    if let Some(prefix) = spool {
        let (sent, received) = spool_files(prefix)?;
        transport = transport.with_spool(sent, received);
    }
    let result = shortrun::short_run(transport, options, &mut io::stdout().lock());
    // The transport (and so the device's standard input) has been
    // dropped by now, so the device sees end of file and exits.
    let status = child.wait()?;
    event!(Level::INFO, "device program exited with {status}");
    result
}

fn run() -> Result<(), Fail> {
    let cli = Cli::parse();

    // See
    // https://docs.rs/tracing-subscriber/0.2.19/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables
    // for instructions on how to select which trace messages get
    // printed.  Standard output carries the wire protocol or the
    // results, so logging goes to standard error.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
            )));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    match cli.command {
        Action::Serve => serve(),
        Action::ShortRun {
            seed,
            tape_length,
            threshold,
            device,
            device_args,
            spool,
        } => {
            let options = ShortRunOptions {
                seed,
                tape_length,
                threshold,
            };
            match device {
                Some(program) => {
                    short_run_on_device(&program, &device_args, spool.as_deref(), &options)
                }
                None => {
                    if spool.is_some() {
                        event!(
                            Level::WARN,
                            "--spool has no effect without --device, ignoring it"
                        );
                    }
                    shortrun::short_run(Loopback::new(), &options, &mut io::stdout().lock())
                }
            }
        }
    }
}

fn main() {
    match run() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
