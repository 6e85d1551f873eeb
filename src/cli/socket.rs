//! Unix Domain Socket communication for widget control
//!
//! One command line per connection: `press`, `release`, `cancel`, `blur`
//! or `status`. The server answers a single line.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::args::ControlAction;
use super::signals::WidgetSignal;
use crate::domain::widget::UiState;

/// Socket file name inside the runtime directory
const SOCKET_NAME: &str = "hold-record.sock";

/// Socket path resolver
#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    /// Create socket path, preferring XDG_RUNTIME_DIR over the temp dir
    pub fn new() -> Self {
        let path = std::env::var("XDG_RUNTIME_DIR")
            .map(|dir| PathBuf::from(dir).join(SOCKET_NAME))
            .unwrap_or_else(|_| std::env::temp_dir().join(SOCKET_NAME));
        Self { path }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the socket path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if socket file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove socket file if it exists
    pub fn cleanup(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Reply to a status query or an unknown command, or forward a gesture
enum Request {
    Signal(WidgetSignal),
    Status,
    Unknown,
}

fn parse_request(line: &str) -> Request {
    let Some(action) = ControlAction::from_command(line) else {
        return Request::Unknown;
    };
    match (action, action.release_trigger()) {
        (ControlAction::Status, _) => Request::Status,
        (_, Some(trigger)) => Request::Signal(WidgetSignal::Release(trigger)),
        _ => Request::Signal(WidgetSignal::Press),
    }
}

/// Widget socket server - listens for commands and sends them to a channel
pub struct WidgetSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl WidgetSocketServer {
    /// Create a new socket server
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }

    /// Bind to the socket
    pub fn bind(&mut self) -> io::Result<()> {
        // Remove stale socket file if it exists
        self.socket_path.cleanup()?;

        let listener = UnixListener::bind(self.socket_path.path())?;
        self.listener = Some(listener);
        Ok(())
    }

    /// Accept and handle connections
    ///
    /// Gestures are sent to `tx`; `status_fn` supplies the current
    /// status for `status` queries.
    pub async fn run<F>(&self, tx: mpsc::Sender<WidgetSignal>, status_fn: F) -> io::Result<()>
    where
        F: Fn() -> UiState + Send + Sync + 'static,
    {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"))?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let tx = tx.clone();
                    let status = status_fn();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, tx, status).await {
                            warn!("Socket connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    warn!("Socket accept error: {}", e);
                }
            }
        }
    }

    /// Cleanup socket file
    pub fn cleanup(&self) {
        let _ = self.socket_path.cleanup();
    }
}

impl Drop for WidgetSocketServer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Handle a single client connection
async fn handle_connection(
    stream: UnixStream,
    tx: mpsc::Sender<WidgetSignal>,
    status: UiState,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    reader.read_line(&mut line).await?;
    debug!("Control command: {}", line.trim());

    let response = match parse_request(&line) {
        Request::Signal(signal) => {
            if tx.send(signal).await.is_err() {
                "error: widget is shutting down".to_string()
            } else {
                "ok".to_string()
            }
        }
        Request::Status => status.as_wire(),
        Request::Unknown => "error: unknown command".to_string(),
    };

    writer.write_all(format!("{}\n", response).as_bytes()).await?;
    writer.flush().await?;

    Ok(())
}

/// Widget socket client - connects and sends commands
pub struct WidgetSocketClient {
    socket_path: SocketPath,
}

impl WidgetSocketClient {
    /// Create a new socket client
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }

    /// Check if the widget appears to be running (socket exists)
    pub fn is_widget_running(&self) -> bool {
        self.socket_path.exists()
    }

    /// Send a command and receive response
    pub async fn send_command(&self, cmd: &str) -> io::Result<String> {
        let stream = UnixStream::connect(self.socket_path.path()).await?;
        let (reader, mut writer) = stream.into_split();

        writer.write_all(format!("{}\n", cmd).as_bytes()).await?;
        writer.flush().await?;

        let mut reader = BufReader::new(reader);
        let mut response = String::new();
        reader.read_line(&mut response).await?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::widget::ReleaseTrigger;

    #[test]
    fn socket_path_uses_xdg_runtime_dir() {
        let path = std::env::var("XDG_RUNTIME_DIR")
            .map(|dir| PathBuf::from(dir).join("hold-record.sock"))
            .unwrap_or_else(|_| std::env::temp_dir().join("hold-record.sock"));

        let socket_path = SocketPath::new();
        assert_eq!(socket_path.path(), path.as_path());
    }

    #[test]
    fn release_commands_are_equivalent_gestures() {
        for (line, trigger) in [
            ("release\n", ReleaseTrigger::PointerUp),
            ("cancel", ReleaseTrigger::PointerCancel),
            (" blur ", ReleaseTrigger::WindowBlur),
        ] {
            match parse_request(line) {
                Request::Signal(WidgetSignal::Release(t)) => assert_eq!(t, trigger),
                _ => panic!("{:?} should parse as a release", line),
            }
        }
        assert!(matches!(
            parse_request("press"),
            Request::Signal(WidgetSignal::Press)
        ));
        assert!(matches!(parse_request("status"), Request::Status));
        assert!(matches!(parse_request("toggle"), Request::Unknown));
    }

    #[tokio::test]
    async fn server_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = SocketPath::with_path(dir.path().join("test.sock"));
        let mut server = WidgetSocketServer::new(socket_path.clone());
        server.bind().unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        tokio::spawn(async move {
            let _ = server
                .run(tx, || UiState::Error("Microphone access denied".into()))
                .await;
        });

        let client = WidgetSocketClient::new(socket_path);
        assert!(client.is_widget_running());

        assert_eq!(client.send_command("press").await.unwrap(), "ok\n");
        assert_eq!(rx.recv().await, Some(WidgetSignal::Press));

        assert_eq!(client.send_command("blur").await.unwrap(), "ok\n");
        assert_eq!(
            rx.recv().await,
            Some(WidgetSignal::Release(ReleaseTrigger::WindowBlur))
        );

        assert_eq!(
            client.send_command("status").await.unwrap(),
            "error: Microphone access denied\n"
        );
        assert_eq!(
            client.send_command("toggle").await.unwrap(),
            "error: unknown command\n"
        );
    }
}
