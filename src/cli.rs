//! Command line interface
//!
//! Flags given here override the configuration file and the environment.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(name = "fsgate", version)]
#[command(about = "Serve a directory tree read-only over HTTP", long_about = None)]
pub struct Cli {
    /// Configuration file, without extension
    #[arg(short, long, default_value = "fsgate")]
    pub config: String,

    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(short, long)]
    pub addr: Option<SocketAddr>,

    /// Directory to serve
    pub root: Option<String>,

    /// Filter rule such as "- *.bak", may be repeated
    #[arg(long = "filter", allow_hyphen_values = true)]
    pub filters: Vec<String>,

    /// Read filter rules from a file, may be repeated
    #[arg(long = "filter-from")]
    pub filter_files: Vec<PathBuf>,

    /// Log level or `RUST_LOG` style directives
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            addr: self.addr,
            root: self.root.clone(),
            log_level: self.log_level.clone(),
        }
    }
}
