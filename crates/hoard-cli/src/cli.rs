use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hoard",
    about = "Hoard: content-addressed blob storage",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Number of nested shard directories
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub depth: Option<i64>,

    /// Identifier characters per shard directory
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub segment_len: Option<i64>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Store a file and print its identifier
    Put(PutArgs),
    /// Write a stored object to stdout or a file
    Get(GetArgs),
    /// Delete a stored object
    Rm(RmArgs),
    /// Print where an identifier lives on disk
    Path(PathArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct PutArgs {
    pub file: PathBuf,
    /// MIME type whose extension is appended to the identifier
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    pub id: String,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RmArgs {
    pub id: String,
}

#[derive(Args)]
pub struct PathArgs {
    pub id: String,
}
