mod browser;
mod logger;
mod server;
mod shutdown;
mod static_files;

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;

use server::HttpServer;
use server::config::{CliArgs, OPEN_TARGET, ServerConfig};

fn main() {
    logger::init();
    let args = CliArgs::parse();

    let root = match exe_dir() {
        Ok(dir) => dir,
        Err(e) => {
            println!("Failed to locate the server directory: {}", e);
            process::exit(1);
        }
    };

    // Requests resolve against the directory holding the executable, the
    // same place the test pages live.
    if let Err(e) = std::env::set_current_dir(&root) {
        println!("Failed to enter {}: {}", root.display(), e);
        process::exit(1);
    }

    let config = ServerConfig::new(root);

    let http_server = match HttpServer::new(&config) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            println!("Port {} is already in use.", config.port);
            println!("Close the program holding it and start the server again.");
            process::exit(1);
        }
        Err(e) => {
            println!("Failed to start server: {}", e);
            process::exit(1);
        }
    };

    let shutdown = http_server.shutdown_handle();
    shutdown::on_interrupt(move || {
        println!("\nServer stopped.");
        shutdown.store(true, Ordering::SeqCst);
    });

    print_banner(&config);
    browser::maybe_open_browser(&format!("{}{}", config.base_url(), OPEN_TARGET), args.open);

    http_server.run();
}

fn print_banner(config: &ServerConfig) {
    let base = config.base_url();
    println!("SDK test server started");
    println!("Serving {} at {}", config.root.display(), base);
    println!();
    println!("Available test pages:");
    println!("   {}/test-comprehensive.html", base);
    println!("   {}/dwell-time-test.html", base);
    println!("   {}/test.html", base);
    println!();
    println!("Hints:");
    println!("   1. make sure the backend is running on http://localhost:8080");
    println!("   2. add {} to the backend's ALLOWED_ORIGINS", base);
    println!("   3. press Ctrl+C to stop");
    println!();
}

fn exe_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent().map(PathBuf::from).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "executable has no parent directory",
        )
    })
}
