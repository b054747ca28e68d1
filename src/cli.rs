use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "tubefetch", version)]
#[command(about = "Media retrieval service around an external download engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Server(ServerArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Bind address, overriding the configured `server.bind_addr`
    #[arg(long)]
    pub address: Option<SocketAddr>,
}
