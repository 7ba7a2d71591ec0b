//! Bridge configuration
//!
//! The decision gateway port can be overridden by a plain-text port file whose
//! first line holds the port number. A missing file is silently ignored; a
//! file that cannot be parsed is reported once and the default port is used.

use crate::error::{BridgeError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Port the decision gateway listens on unless overridden
pub const DEFAULT_PORT: u16 = 25368;

/// Port file looked up in the working directory
pub const DEFAULT_PORT_FILE: &str = "port.txt";

/// How many times to re-establish a lost connection within one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Reconnection attempts per failed call (no delay between attempts)
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_attempts: 1 }
    }
}

/// Configuration for a bridge connection
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Host the gateway runs on (default: 127.0.0.1)
    pub host: String,
    /// Gateway port (default: 25368)
    pub port: u16,
    /// Port file this config was resolved from
    pub port_file: PathBuf,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Recovery behavior on call failure
    pub reconnect: ReconnectPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            port_file: PathBuf::from(DEFAULT_PORT_FILE),
            connect_timeout: Duration::from_secs(5),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Build a config, taking the port from `port_file` when it holds one
    pub fn load(port_file: impl AsRef<Path>) -> Self {
        let port_file = port_file.as_ref();
        let port = match resolve_port(port_file) {
            Ok(Some(port)) => port,
            Ok(None) => DEFAULT_PORT,
            Err(e) => {
                warn!(
                    "Failed to parse port file! Will proceed with hard-coded port number. ({})",
                    e
                );
                DEFAULT_PORT
            }
        };

        Self {
            port,
            port_file: port_file.to_path_buf(),
            ..Default::default()
        }
    }

    /// Config pointing at an explicit port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// `host:port` of the gateway
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read the port from the first line of `path`.
///
/// Returns `Ok(None)` when the file does not exist or cannot be opened, and
/// `Err(InvalidPort)` when the first line is not an integer in port range.
pub fn resolve_port(path: &Path) -> Result<Option<u16>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                debug!("Ignoring unreadable port file {:?}: {}", path, e);
            }
            return Ok(None);
        }
    };

    let mut line = String::new();
    if let Err(e) = BufReader::new(file).read_line(&mut line) {
        debug!("Ignoring unreadable port file {:?}: {}", path, e);
        return Ok(None);
    }

    let value = line.trim();
    value
        .parse::<u16>()
        .map(Some)
        .map_err(|e| BridgeError::InvalidPort {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn port_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    /// Collects formatted log output so tests can count diagnostics
    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        let writer = CaptureWriter::default();
        let sink = writer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        let output = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
        let lines = output.lines().map(str::to_string).collect();
        (result, lines)
    }

    #[test]
    fn test_config_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.port, 25368);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.reconnect.max_attempts, 1);
        assert_eq!(config.address(), "127.0.0.1:25368");
    }

    #[test]
    fn test_port_from_first_line() {
        let file = port_file("31000\nignored\n");
        assert_eq!(resolve_port(file.path()).unwrap(), Some(31000));

        let config = BridgeConfig::load(file.path());
        assert_eq!(config.port, 31000);
        assert_eq!(config.port_file, file.path());
    }

    #[test]
    fn test_surrounding_whitespace_is_accepted() {
        let file = port_file("  4242 \r\n");
        assert_eq!(resolve_port(file.path()).unwrap(), Some(4242));
    }

    #[test]
    fn test_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("port.txt");

        assert_eq!(resolve_port(&missing).unwrap(), None);

        let (config, logs) = capture_logs(|| BridgeConfig::load(&missing));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(logs.is_empty(), "unexpected logs: {:?}", logs);
    }

    #[test]
    fn test_unparsable_port_falls_back_with_one_diagnostic() {
        let file = port_file("not-a-port\n");

        match resolve_port(file.path()) {
            Err(BridgeError::InvalidPort { value, .. }) => assert_eq!(value, "not-a-port"),
            other => panic!("Expected InvalidPort, got {:?}", other),
        }

        let (config, logs) = capture_logs(|| BridgeConfig::load(file.path()));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(logs.len(), 1, "expected one diagnostic, got {:?}", logs);
        assert!(logs[0].contains("Failed to parse port file"));
    }

    #[test]
    fn test_out_of_range_and_empty_are_invalid() {
        assert!(resolve_port(port_file("70000").path()).is_err());
        assert!(resolve_port(port_file("").path()).is_err());
        assert!(resolve_port(port_file("-1").path()).is_err());
    }
}
