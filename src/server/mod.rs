pub mod config;
pub mod http_status;
mod request_handler;

use log::{debug, error, info};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use config::ServerConfig;

pub struct HttpServer {
    config: ServerConfig,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl HttpServer {
    pub fn new(config: &ServerConfig) -> std::io::Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)?;
        listener.set_nonblocking(true)?;

        info!("Server bound on {}", addr);

        Ok(Self {
            config: config.clone(),
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Raising this flag stops `run` between requests, so a response in
    /// flight is always finished first.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Serves one connection at a time until the shutdown flag is raised.
    pub fn run(&self) {
        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    if let Err(e) = stream.set_nonblocking(false) {
                        error!("Failed to set blocking on {}: {}", addr, e);
                        continue;
                    }
                    request_handler::handle_client(stream, &self.config.root);
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(1));
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}
