// Server loop module
// Accepts connections until a shutdown is requested

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Longest time in-flight connections get after the listener closes
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const DRAIN_POLL: Duration = Duration::from_millis(100);

/// Counters shared between the accept loop and the connection tasks
#[derive(Debug, Default)]
pub struct ServerStats {
    pub active_connections: Arc<AtomicU64>,
}

impl ServerStats {
    pub fn active(&self) -> u64 {
        self.active_connections.load(Ordering::SeqCst)
    }
}

/// Accept loop of the gateway
///
/// Returns once `shutdown` is notified. The listener is closed at that point, connections
/// already accepted keep running on their own tasks until they finish or the drain timeout
/// passes.
pub async fn run_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    stats: &ServerStats,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &stats.active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_server_stop();
    drain_connections(stats).await;
}

/// Wait for in-flight connections, bounded by `DRAIN_TIMEOUT`
async fn drain_connections(stats: &ServerStats) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    while stats.active() > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Drain timeout, {} connections still open",
                stats.active()
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use crate::config::{Config, Overrides};
    use crate::filter::Filter;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("two.txt"), b"0123456789\n").unwrap();

        let config = Config::load_from(
            &dir.path().join("absent").to_string_lossy(),
            &Overrides::default(),
        )
        .unwrap();
        let backend = LocalBackend::new(dir.path(), false).unwrap();
        let state = Arc::new(AppState::new(config, Arc::new(backend), Filter::new()));

        let listener = super::super::create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        let server = tokio::spawn({
            let shutdown = Arc::clone(&shutdown);
            async move {
                let stats = ServerStats::default();
                run_server_loop(listener, state, &stats, shutdown).await;
                stats.active()
            }
        });

        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"GET /two.txt HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("\r\n\r\n0123456789\n"));

        shutdown.notify_one();
        assert_eq!(server.await.unwrap(), 0);
    }
}
