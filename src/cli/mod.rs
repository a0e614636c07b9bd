use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "swim")]
#[command(about = "Change the published ports of a running container without losing its state")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(long, global = true, env = "SWIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Docker engine address (socket path, unix:// or tcp:// URL)
    #[arg(long, global = true, env = "SWIM_DOCKER_HOST")]
    pub docker_host: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Re-publish a running container with new port mappings
    UpdatePort(UpdatePortArgs),

    /// List running containers and their published ports
    Ls,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UpdatePortArgs {
    /// Container name or ID (pick interactively when omitted)
    pub container: Option<String>,

    /// Port mappings (hostIP:hostPort:containerPort[/udp]), repeatable or comma-separated
    #[arg(
        short,
        long,
        required = true,
        value_delimiter = ',',
        value_name = "IP:HOST:CONTAINER"
    )]
    pub ports: Vec<String>,

    /// Name for the snapshot image (default: random name)
    #[arg(short, long)]
    pub image: Option<String>,

    /// Name for the new container (default: random name)
    #[arg(short = 'c', long = "container")]
    pub container_name: Option<String>,

    /// Seconds to wait for the container to stop
    #[arg(
        short,
        long,
        env = "SWIM_STOP_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(..=swim::config::MAX_STOP_TIMEOUT_SECS)
    )]
    pub timeout: Option<u64>,

    /// Drop existing port bindings instead of merging
    #[arg(short, long)]
    pub force: bool,
}
