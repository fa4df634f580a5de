//! Command-line options.
//!
//! Parsed by the `stream_probe` binary; kept in the library so the parsing
//! and the conversion into a `ProbeRequest` can be tested directly.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_MAX_REDIRECTS, DEFAULT_METHOD, DEFAULT_SERVER_PORT,
    DEFAULT_TIMEOUT_SECS,
};
use crate::config::types::{LogFormat, LogLevel, ServerConfig};
use crate::models::ProbeRequest;

/// Diagnostic HTTP/HTTPS probe for stream URLs.
#[derive(Debug, Parser)]
#[command(name = "stream_probe", version, about)]
pub struct Cli {
    /// Log level: error, warn, info, debug or trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain or json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// What to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe one URL and print the result as JSON
    Probe(ProbeArgs),
    /// Run the probe HTTP service
    Serve(ServeArgs),
}

/// Options for `stream_probe probe`.
#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// URL to probe
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = DEFAULT_METHOD)]
    pub method: String,

    /// Request header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Per-hop timeout in seconds (1-120)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// SOCKS5 proxy as `host:port`
    #[arg(long)]
    pub proxy: Option<String>,

    /// Proxy username
    #[arg(long, requires = "proxy")]
    pub proxy_username: Option<String>,

    /// Proxy password
    #[arg(long, requires = "proxy")]
    pub proxy_password: Option<String>,

    /// Do not follow redirects
    #[arg(long)]
    pub no_follow: bool,

    /// Maximum number of redirects to follow (0-50)
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS as u64)]
    pub max_redirects: u64,

    /// Hosts-file style overrides (`ip hostname` per line)
    #[arg(long, value_name = "FILE")]
    pub hosts_file: Option<PathBuf>,

    /// Single hosts override as `hostname=ip` (repeatable)
    #[arg(long = "resolve", value_name = "HOST=IP")]
    pub resolve: Vec<String>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

impl ProbeArgs {
    /// Builds the probe request, reading the hosts file if one was given.
    ///
    /// # Errors
    ///
    /// Returns an error if a header is not `Name: value`, a `--resolve`
    /// entry is not `host=ip`, or the hosts file cannot be read.
    pub fn into_request(self) -> Result<ProbeRequest> {
        let mut request = ProbeRequest::new(self.url);
        request.method = self.method;
        request.timeout = self.timeout;
        request.follow_redirects = !self.no_follow;
        request.max_redirects = self.max_redirects;
        request.proxy = self.proxy.unwrap_or_default();
        request.proxy_username = self.proxy_username.unwrap_or_default();
        request.proxy_password = self.proxy_password.unwrap_or_default();

        for header in &self.headers {
            let (name, value) = header
                .split_once(':')
                .with_context(|| format!("Header must be 'Name: value', got '{}'", header))?;
            request
                .headers
                .insert(name.trim().to_string(), value.trim().to_string());
        }

        let mut hosts = match &self.hosts_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read hosts file {}", path.display()))?,
            None => String::new(),
        };
        for entry in &self.resolve {
            let (host, ip) = entry
                .split_once('=')
                .with_context(|| format!("Override must be 'host=ip', got '{}'", entry))?;
            hosts.push_str(&format!("\n{} {}", ip.trim(), host.trim()));
        }
        request.host = hosts;

        Ok(request)
    }
}

/// Options for `stream_probe serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = DEFAULT_BIND_ADDRESS)]
    pub bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,

    /// Seconds a cached body stays downloadable
    #[arg(long, value_name = "SECONDS")]
    pub cache_ttl: Option<u64>,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        let defaults = ServerConfig::default();
        Self {
            bind_address: args.bind,
            port: args.port,
            cache_ttl: args
                .cache_ttl
                .map_or(defaults.cache_ttl, Duration::from_secs),
            sweep_interval: defaults.sweep_interval,
        }
    }
}
