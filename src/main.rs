//! amilink - kirim pesan ASCII lewat sinyal AMI tiga level
//!
//! Usage:
//!   amilink --mode server [OPTIONS]
//!   amilink --mode client [--message TEXT] [OPTIONS]
//!
//! Tanpa `--message`, client membaca satu pesan per baris dari stdin.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use amilink::config::{parse_key, DEFAULT_ADDR, DEFAULT_RECV_BUFFER};
use amilink::network::{Receiver, Sender};
use amilink::protocol::Key;
use amilink::{LinkConfig, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Server,
    Client,
}

/// amilink - ASCII text over an AMI line code
#[derive(Parser, Debug)]
#[command(name = "amilink")]
#[command(author, version, about = "ASCII text over a three-level AMI line code", long_about = None)]
struct Cli {
    /// Mode to run
    #[arg(long, value_enum, env = "AMILINK_MODE", default_value = "client")]
    mode: Mode,

    /// Server address (bind for server, connect for client)
    #[arg(short, long, env = "AMILINK_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Cipher key, decimal or 0x hex; must match on both ends
    #[arg(short, long, env = "AMILINK_KEY", default_value = "0xFE", value_parser = parse_key)]
    key: Key,

    /// Send a single message and exit (client only)
    #[arg(short, long, env = "AMILINK_MESSAGE")]
    message: Option<String>,

    /// Max symbols per transmission unit
    #[arg(long, env = "AMILINK_RECV_BUFFER", default_value_t = DEFAULT_RECV_BUFFER)]
    recv_buffer: usize,

    /// Stop the server after this many messages (server only)
    #[arg(long, env = "AMILINK_MAX_MESSAGES")]
    max_messages: Option<u64>,

    /// Record every signal to this mmap capture log
    #[arg(long, env = "AMILINK_CAPTURE")]
    capture: Option<PathBuf>,

    /// Capture log size in KB (power of two)
    #[arg(long, env = "AMILINK_CAPTURE_SIZE_KB", default_value_t = 64)]
    capture_size_kb: usize,

    /// Reject a trailing partial byte instead of discarding it
    #[arg(long, env = "AMILINK_STRICT")]
    strict: bool,

    /// Do not print the waveform
    #[arg(long, env = "AMILINK_NO_RENDER")]
    no_render: bool,

    /// Debug logging
    #[arg(short, long, env = "AMILINK_VERBOSE")]
    verbose: bool,
}

impl Cli {
    fn link_config(&self) -> LinkConfig {
        LinkConfig {
            addr: self.addr.clone(),
            key: self.key,
            recv_buffer: self.recv_buffer,
            capture: self.capture.clone(),
            capture_size_kb: self.capture_size_kb,
            strict: self.strict,
            render: !self.no_render,
            max_messages: self.max_messages,
            verbose: self.verbose,
            ..LinkConfig::default()
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn run_server(config: &LinkConfig) -> Result<()> {
    println!("running server");
    let mut receiver = Receiver::bind(config)?;
    println!("🔌 Listening on {}", receiver.local_addr()?);

    let summary = receiver.run()?;

    println!("\n📊 Session Summary");
    println!("   Messages received: {}", summary.messages_received);
    println!("   Messages rejected: {}", summary.messages_rejected);
    println!("   Bytes received:    {}", summary.bytes_received);
    Ok(())
}

fn run_client(config: &LinkConfig, message: Option<&str>) -> Result<()> {
    println!("running client");
    let mut sender = Sender::connect(config)?;

    if let Some(message) = message {
        sender.send(message)?;
        return sender.close();
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Message to send: ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }

        // Pesan non-ASCII hanya ditolak, sesi tetap jalan
        match sender.send(line) {
            Ok(_) => println!("Sent {}", line),
            Err(e @ amilink::Error::InvalidInput { .. }) => eprintln!("⚠️ {}", e),
            Err(e @ amilink::Error::Config(_)) => eprintln!("⚠️ {}", e),
            Err(e) => return Err(e),
        }
    }

    sender.close()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.link_config();
    init_logging(config.verbose);
    let result = match cli.mode {
        Mode::Server => run_server(&config),
        Mode::Client => run_client(&config, cli.message.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "amilink failed");
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
