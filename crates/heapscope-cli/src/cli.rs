use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "heapscope",
    about = "heapscope — live view of a remote heap over its debug stream",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the monitor and print the live object set on every change
    Serve(ServeArgs),
    /// Check that a relay server accepts a pre-shared key
    Probe(ProbeArgs),
    /// Print the digest the probe would send for a pre-shared key
    Digest(DigestArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to accept instrumented processes on
    #[arg(long, default_value = "127.0.0.1:39999")]
    pub bind: SocketAddr,

    /// Relay server to hand to connecting processes, as host:port
    #[arg(long, requires = "psk")]
    pub relay: Option<String>,

    /// Pre-shared key to hand out with the relay address
    #[arg(long, requires = "relay")]
    pub psk: Option<String>,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// Relay endpoint to probe, as host:port
    pub server: String,

    /// Pre-shared key to validate
    #[arg(long)]
    pub psk: String,

    /// Seconds to wait before giving up
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,
}

#[derive(Args)]
pub struct DigestArgs {
    /// Pre-shared key to digest
    pub psk: String,
}
