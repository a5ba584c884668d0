//! Entry point for `drtp`.
//!
//! Parses CLI arguments, validates them into a [`Config`], and dispatches
//! into either **server** or **client** mode.  All protocol work is
//! delegated to library modules; `main.rs` owns only process setup (logging,
//! argument parsing, file handles) and exit-code mapping.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use drtp::client::FileSender;
use drtp::config::{Config, Role};
use drtp::connection::TransferError;
use drtp::fault;
use drtp::server::FileReceiver;
use drtp::socket::Socket;

/// Name of the destination file the server writes in its working directory.
const RECEIVED_FILE: &str = "Photo_received.jpg";

/// DRTP file transfer application.
#[derive(Parser)]
#[command(author, version, about)]
#[command(group(clap::ArgGroup::new("mode").required(true).args(["server", "client"])))]
struct Cli {
    /// Enable server mode.
    #[arg(short = 's', long)]
    server: bool,

    /// Enable client mode.
    #[arg(short = 'c', long)]
    client: bool,

    /// IP address of the server (the bind address in server mode).
    #[arg(short = 'i', long, default_value = "127.0.0.1")]
    ip: IpAddr,

    /// Port number.
    #[arg(short = 'p', long, default_value_t = 8080)]
    port: u16,

    /// Path of the file to transfer (client mode only).
    #[arg(short = 'f', long, value_parser = parse_source_file)]
    file: Option<PathBuf>,

    /// Size of the sliding window in segments.
    #[arg(short = 'w', long, default_value_t = 3)]
    window: u16,

    /// Test hook: sequence number the server discards exactly once.
    #[arg(short = 'd', long)]
    discard: Option<u16>,
}

/// Validate the `--file` argument before any socket work starts.
///
/// The transfer carries JPEG photos, so the path must exist and end in
/// `.jpeg` or `.jpg`.
fn parse_source_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    match path.extension().and_then(|e| e.to_str()) {
        Some("jpeg") | Some("jpg") => {}
        _ => return Err(format!("{s} is not a jpeg/jpg file")),
    }
    if !path.is_file() {
        return Err(format!("file {s} does not exist"));
    }
    Ok(path)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();
    let role = if cli.server { Role::Server } else { Role::Client };

    let config = match Config::new(role, cli.ip, cli.port, cli.file, cli.window, cli.discard) {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    let result = match config.role {
        Role::Server => run_server(&config).await,
        Role::Client => run_client(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(e: &dyn std::fmt::Display) -> ExitCode {
    eprintln!("error: {e}");
    ExitCode::FAILURE
}

async fn run_server(config: &Config) -> Result<(), TransferError> {
    let bind = SocketAddr::new(config.ip, config.port);
    let socket = Socket::bind(bind).await?;
    log::info!(
        "server is running with ip = {} and port = {}",
        config.ip,
        config.port
    );

    let mut conn = FileReceiver::accept(socket, fault::from_discard(config.discard)).await?;
    let mut dst = tokio::fs::File::create(RECEIVED_FILE).await?;
    conn.receive(&mut dst).await?;
    Ok(())
}

async fn run_client(config: &Config) -> Result<(), TransferError> {
    let peer = SocketAddr::new(config.ip, config.port);
    // Bind an ephemeral local port in the same address family as the server.
    let local = match config.ip {
        IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };
    let socket = Socket::bind(local).await?;

    // Config validation guarantees the file path is present in client mode.
    let path = config.file.as_ref().ok_or(TransferError::BadState)?;
    let mut src = tokio::fs::File::open(path).await?;

    let mut conn = FileSender::connect(socket, peer, config.window).await?;
    let stats = conn.transfer(&mut src).await?;
    log::info!(
        "sent {} bytes in {} segments ({} retransmissions)",
        stats.bytes,
        stats.data_segments,
        stats.retransmissions
    );
    conn.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("drtp-cli-{}-{name}", std::process::id()))
    }

    #[test]
    fn source_file_must_exist() {
        let missing = temp_path("missing.jpg");
        let err = parse_source_file(missing.to_str().unwrap()).unwrap_err();
        assert!(err.contains("does not exist"), "{err}");
    }

    #[test]
    fn source_file_must_be_a_jpeg() {
        let wrong = temp_path("notes.txt");
        std::fs::write(&wrong, b"plain text").unwrap();
        let err = parse_source_file(wrong.to_str().unwrap()).unwrap_err();
        assert!(err.contains("not a jpeg"), "{err}");
        std::fs::remove_file(&wrong).unwrap();
    }

    #[test]
    fn jpeg_and_jpg_extensions_are_accepted() {
        for name in ["photo.jpeg", "photo.jpg"] {
            let path = temp_path(name);
            std::fs::write(&path, b"\xff\xd8\xff").unwrap();
            let parsed = parse_source_file(path.to_str().unwrap()).unwrap();
            assert_eq!(parsed, path);
            std::fs::remove_file(&path).unwrap();
        }
    }
}
