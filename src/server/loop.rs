// Server loop module
// Accept loop with graceful shutdown: the listener closes first, then
// in-flight connections get a bounded grace period to finish

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections may keep running after the listener closes
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the accept loop until a shutdown signal arrives
///
/// # Errors
///
/// Currently always returns `Ok`; the signature leaves room for accept
/// loop failures to become fatal.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    signals: Arc<SignalHandler>,
) -> std::io::Result<()> {
    // notify_waiters stores no permit: keep one waiter registered across
    // iterations, and check the flag for requests that predate it
    let shutdown = signals.shutdown.notified();
    tokio::pin!(shutdown);
    shutdown.as_mut().enable();

    loop {
        if signals.is_shutdown_requested() {
            break;
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                break;
            }
        }
    }

    // Stop accepting, then let in-flight requests finish
    drop(listener);
    wait_for_active_connections(&active_connections).await;
    logger::log_shutdown_complete();

    Ok(())
}

/// Wait until active connections drain or the grace period elapses
async fn wait_for_active_connections(active_connections: &Arc<AtomicUsize>) {
    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE_PERIOD;

    loop {
        let active = active_connections.load(Ordering::SeqCst);
        if active == 0 {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {active} connections still active"
            ));
            return;
        }
        tokio::time::sleep(SHUTDOWN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_state(public_dir: &std::path::Path) -> Arc<AppState> {
        let absent = public_dir.join("absent-config");
        let mut config =
            Config::load_from(&absent.to_string_lossy()).expect("default configuration");
        config.assets.public_dir = public_dir.to_string_lossy().into_owned();
        config.logging.access_log = false;
        Arc::new(AppState::new(config))
    }

    async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr)
            .await
            .expect("connect to server");
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream
            .write_all(request.as_bytes())
            .await
            .expect("send request");

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .await
            .expect("read response");
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_serves_requests_then_shuts_down() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("login.html"), "<html>legacy</html>")
            .expect("write login.html");

        let state = test_state(dir.path());
        let listener =
            create_reusable_listener("127.0.0.1:0".parse().expect("addr")).expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let signals = Arc::new(SignalHandler::new());
        let active = Arc::new(AtomicUsize::new(0));
        let server = tokio::spawn(start_server_loop(
            listener,
            state,
            Arc::clone(&active),
            Arc::clone(&signals),
        ));

        let login = http_get(addr, "/login").await;
        assert!(login.starts_with("HTTP/1.1 200 OK"));
        assert!(login.contains("로그인 페이지"));
        assert!(login.to_lowercase().contains("\r\nserver: community-web"));

        let legacy = http_get(addr, "/login2").await;
        assert!(legacy.starts_with("HTTP/1.1 200 OK"));
        assert!(legacy.ends_with("<html>legacy</html>"));

        let missing = http_get(addr, "/nonexistent").await;
        assert!(missing.starts_with("HTTP/1.1 404"));

        signals.request_shutdown();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("loop should stop after shutdown")
            .expect("server task")
            .expect("server result");
    }

    #[tokio::test]
    async fn test_stops_when_shutdown_requested_before_start() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let listener =
            create_reusable_listener("127.0.0.1:0".parse().expect("addr")).expect("bind");

        // Signal arrives before the loop exists, so no waiter sees it
        let signals = Arc::new(SignalHandler::new());
        signals.request_shutdown();

        let server = tokio::spawn(start_server_loop(
            listener,
            state,
            Arc::new(AtomicUsize::new(0)),
            Arc::clone(&signals),
        ));

        tokio::time::timeout(Duration::from_secs(2), server)
            .await
            .expect("loop should observe the earlier shutdown request")
            .expect("server task")
            .expect("server result");
    }

    #[tokio::test]
    async fn test_connections_drain_before_return() {
        let active = Arc::new(AtomicUsize::new(0));

        // Simulate one in-flight connection finishing during the grace wait
        let counter = Arc::clone(&active);
        counter.store(1, Ordering::SeqCst);
        let release = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            counter.store(0, Ordering::SeqCst);
        });

        let waited = tokio::time::Instant::now();
        wait_for_active_connections(&active).await;
        assert!(waited.elapsed() < SHUTDOWN_GRACE_PERIOD);
        assert_eq!(active.load(Ordering::SeqCst), 0);

        release.await.expect("release task");
    }
}
