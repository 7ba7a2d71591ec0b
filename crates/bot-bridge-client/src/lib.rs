//! Bot bridge client
//!
//! This crate provides the blocking client the host control loop calls once
//! per tick. It forwards input vectors to the decision process and always
//! hands back a control vector: when the call fails the connection is
//! re-established once and the failsafe vector is returned for that tick.

use bot_bridge_core::{
    BridgeConfig, BridgeError, DEFAULT_PORT_FILE, InputVectorPair, OutputVector, Result, Team,
};
use decision_gateway::GatewayConnection;
use std::future::Future;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info, warn};

/// Name shown for this bot in the host's display
pub const BOT_NAME: &str = "TareBot";

/// Blocking client for the decision gateway
///
/// Owns its connection and a single-threaded runtime to drive it. Not meant
/// to be shared between threads; the host calls it from one control loop.
/// Calls block the current thread, so they must not be made from inside an
/// async context. Dropping the client is fine anywhere.
pub struct BridgeClient {
    team: Team,
    config: BridgeConfig,
    /// Taken only in `Drop`
    runtime: Option<Runtime>,
    /// `None` after a failed reconnect until the next call reopens it
    connection: Option<GatewayConnection>,
}

impl BridgeClient {
    /// Connect using the port from `port.txt` in the working directory
    pub fn new(team: Team) -> Result<Self> {
        Self::with_config(team, BridgeConfig::load(DEFAULT_PORT_FILE))
    }

    /// Connect with an explicit configuration
    pub fn with_config(team: Team, config: BridgeConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BridgeError::Config(format!("Failed to start runtime: {}", e)))?;

        let connection = runtime.block_on(open(&config))?;
        info!(
            "Bridge for {} team connected to {} (port file {:?})",
            team,
            connection.address(),
            config.port_file
        );

        Ok(Self {
            team,
            config,
            runtime: Some(runtime),
            connection: Some(connection),
        })
    }

    /// Display name, independent of team and connection state
    pub fn get_bot_name(&self) -> &'static str {
        BOT_NAME
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Whether a connection handle is currently held
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Control vector for this tick.
    ///
    /// Blocks until the decision process replies. Without a connection one is
    /// opened first, per the reconnect policy. On any failure the connection
    /// is torn down and reopened, and [`OutputVector::FAILSAFE`] is returned.
    pub fn get_output_vector(&mut self, input: &InputVectorPair) -> OutputVector {
        if self.connection.is_none() {
            if let Err(e) = self.reconnect() {
                error!("Reinitialization failed: {}", e);
                return OutputVector::FAILSAFE;
            }
        }

        match self.request(input) {
            Ok(output) => output,
            Err(e) => {
                if e.is_transport() {
                    warn!("Can't connect to decision gateway: {}", e);
                } else {
                    warn!("Decision request failed: {}", e);
                }

                if let Err(e) = self.reconnect() {
                    error!("Reinitialization failed: {}", e);
                }

                OutputVector::FAILSAFE
            }
        }
    }

    fn request(&mut self, input: &InputVectorPair) -> Result<OutputVector> {
        let team = self.team;
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| BridgeError::Transport("Not connected".into()))?;

        block_on(&self.runtime, connection.get_output_vector(input, team))?
    }

    /// Drop the current connection and open a new one with the original settings
    fn reconnect(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            block_on(&self.runtime, connection.shutdown())?;
        }

        let attempts = self.config.reconnect.max_attempts;
        let mut last_error = None;

        for _ in 0..attempts {
            match block_on(&self.runtime, open(&self.config))? {
                Ok(connection) => {
                    info!("Reconnected to {}", connection.address());
                    self.connection = Some(connection);
                    return Ok(());
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(BridgeError::Reconnect {
            attempts,
            source: Box::new(
                last_error.unwrap_or_else(|| BridgeError::Transport("Reconnect disabled".into())),
            ),
        })
    }
}

fn block_on<F: Future>(runtime: &Option<Runtime>, future: F) -> Result<F::Output> {
    runtime
        .as_ref()
        .map(|runtime| runtime.block_on(future))
        .ok_or_else(|| BridgeError::Transport("Runtime stopped".into()))
}

async fn open(config: &BridgeConfig) -> Result<GatewayConnection> {
    GatewayConnection::connect(&config.host, config.port, config.connect_timeout).await
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        // Socket halves close on drop; the runtime must not block here
        self.connection.take();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bot_bridge_core::ReconnectPolicy;
    use decision_gateway::{DecisionService, GatewayServer};
    use std::io::Write;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::net::TcpListener;

    const REPLY: OutputVector = OutputVector([0, 32767, 32767, 0, 1, 1, 0]);

    /// Always answers with `REPLY` and counts requests
    #[derive(Clone, Default)]
    struct FixedService {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DecisionService for FixedService {
        async fn output_vector(&mut self, _: InputVectorPair, _: Team) -> Result<OutputVector> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(REPLY)
        }
    }

    /// Fails every request at the service level
    struct RefusingService;

    #[async_trait]
    impl DecisionService for RefusingService {
        async fn output_vector(&mut self, _: InputVectorPair, _: Team) -> Result<OutputVector> {
            Err(BridgeError::Protocol("no bot for team".into()))
        }
    }

    fn server_runtime() -> Runtime {
        Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    fn bind(rt: &Runtime) -> (TcpListener, u16) {
        let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    fn start_gateway<S: DecisionService>(rt: &Runtime, service: S) -> u16 {
        let (listener, port) = bind(rt);
        rt.spawn(GatewayServer::new(service).serve(listener));
        port
    }

    fn config(port: u16) -> BridgeConfig {
        BridgeConfig {
            connect_timeout: Duration::from_secs(2),
            ..BridgeConfig::with_port(port)
        }
    }

    fn input() -> InputVectorPair {
        InputVectorPair::new(vec![1.0, 2.0, 3.0], vec![4.0, 5.0])
    }

    #[test]
    fn test_returns_service_response() {
        let rt = server_runtime();
        let service = FixedService::default();
        let port = start_gateway(&rt, service.clone());

        let mut client = BridgeClient::with_config(Team::Blue, config(port)).unwrap();
        assert_eq!(client.get_output_vector(&input()), REPLY);
        assert_eq!(client.get_output_vector(&input()), REPLY);
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unreachable_service_yields_failsafe() {
        let rt = server_runtime();
        let port = start_gateway(&rt, FixedService::default());
        let mut client = BridgeClient::with_config(Team::Orange, config(port)).unwrap();

        // Stop the decision process: listener and live connections close
        drop(rt);

        let output = client.get_output_vector(&input());
        assert_eq!(output.to_vec(), vec![16383, 16383, 0, 0, 0, 0, 0]);
        assert!(!client.is_connected());

        // Still degraded on the next tick
        assert_eq!(client.get_output_vector(&input()), OutputVector::FAILSAFE);
        assert!(!client.is_connected());
    }

    #[test]
    fn test_recovers_after_transport_failure() {
        let rt = server_runtime();
        let (listener, port) = bind(&rt);
        let service = FixedService::default();
        let served = service.clone();

        // Drop the first connection, then serve normally
        rt.spawn(async move {
            let (first, _) = listener.accept().await.unwrap();
            drop(first);
            GatewayServer::new(served).serve(listener).await
        });

        let mut client = BridgeClient::with_config(Team::Blue, config(port)).unwrap();

        assert!(client.get_output_vector(&input()).is_failsafe());
        assert!(client.is_connected());

        assert_eq!(client.get_output_vector(&input()), REPLY);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_tick_after_service_returns_is_served() {
        let rt = server_runtime();
        let port = start_gateway(&rt, FixedService::default());
        let mut client = BridgeClient::with_config(Team::Blue, config(port)).unwrap();

        drop(rt);
        assert!(client.get_output_vector(&input()).is_failsafe());
        assert!(!client.is_connected());

        // Decision process comes back on the same port
        let rt = server_runtime();
        let listener = rt.block_on(TcpListener::bind(("127.0.0.1", port))).unwrap();
        let service = FixedService::default();
        rt.spawn(GatewayServer::new(service.clone()).serve(listener));

        assert_eq!(client.get_output_vector(&input()), REPLY);
        assert!(client.is_connected());
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_inside_async_context() {
        let rt = server_runtime();
        let port = start_gateway(&rt, FixedService::default());
        let client = BridgeClient::with_config(Team::Orange, config(port)).unwrap();

        rt.block_on(async move { drop(client) });
    }

    #[test]
    fn test_service_error_yields_failsafe() {
        let rt = server_runtime();
        let port = start_gateway(&rt, RefusingService);

        let mut client = BridgeClient::with_config(Team::Blue, config(port)).unwrap();
        assert!(client.get_output_vector(&input()).is_failsafe());
        assert!(client.is_connected());
    }

    #[test]
    fn test_bot_name_is_constant() {
        let rt = server_runtime();
        let port = start_gateway(&rt, FixedService::default());

        let blue = BridgeClient::with_config(Team::Blue, config(port)).unwrap();
        let mut orange = BridgeClient::with_config(Team::Orange, config(port)).unwrap();
        assert_eq!(blue.get_bot_name(), BOT_NAME);
        assert_eq!(orange.get_bot_name(), BOT_NAME);

        drop(rt);
        orange.get_output_vector(&input());
        assert!(!orange.is_connected());
        assert_eq!(orange.get_bot_name(), "TareBot");
    }

    #[test]
    fn test_initial_connect_failure_is_reported() {
        let rt = server_runtime();
        let (listener, port) = bind(&rt);
        drop(listener);

        match BridgeClient::with_config(Team::Blue, config(port)) {
            Err(e) => assert!(e.is_transport(), "got {:?}", e),
            Ok(_) => panic!("Expected connection failure"),
        }
    }

    #[test]
    fn test_zero_attempt_policy_never_reconnects() {
        let rt = server_runtime();
        let port = start_gateway(&rt, RefusingService);

        let mut client = BridgeClient::with_config(
            Team::Blue,
            BridgeConfig {
                reconnect: ReconnectPolicy { max_attempts: 0 },
                ..config(port)
            },
        )
        .unwrap();

        assert!(client.get_output_vector(&input()).is_failsafe());
        assert!(!client.is_connected());
    }

    #[test]
    fn test_port_file_selects_gateway() {
        let rt = server_runtime();
        let port = start_gateway(&rt, FixedService::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", port).unwrap();

        let mut client =
            BridgeClient::with_config(Team::Orange, BridgeConfig::load(file.path())).unwrap();
        assert_eq!(client.config().port, port);
        assert_eq!(client.team(), Team::Orange);
        assert_eq!(client.get_output_vector(&input()), REPLY);
    }
}
