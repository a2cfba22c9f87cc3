use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Page opened by `--open`.
pub const OPEN_TARGET: &str = "/test-comprehensive.html";

/// Hosts the SDK test pages over http:// so the browser does not apply
/// file:// cross-origin restrictions to them.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Open the comprehensive test page in the default browser
    #[arg(long)]
    pub open: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub root: PathBuf,
}

impl ServerConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            root,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
