use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

use heapscope_proto::{parse_probe_verdict, ProbeRequest};

/// Default deadline for the whole probe exchange.
pub const PROBE_DEADLINE: Duration = Duration::from_secs(5);

/// Check whether `addr` hosts a relay server that accepts `secret`.
///
/// Connects, sends the one-line auth request, and reads the one-line
/// verdict. Every failure collapses to `false`: a refused or unreachable
/// endpoint, deadline expiry, a stream closed early, or a reply that is not
/// a JSON boolean.
pub async fn probe_server(addr: impl ToSocketAddrs, secret: &str) -> bool {
    probe_server_with_deadline(addr, secret, PROBE_DEADLINE).await
}

/// [`probe_server`] with a caller-chosen deadline.
pub async fn probe_server_with_deadline(
    addr: impl ToSocketAddrs,
    secret: &str,
    deadline: Duration,
) -> bool {
    match tokio::time::timeout(deadline, probe_exchange(addr, secret)).await {
        Ok(verdict) => verdict,
        Err(_) => {
            debug!("probe deadline expired");
            false
        }
    }
}

async fn probe_exchange(addr: impl ToSocketAddrs, secret: &str) -> bool {
    let stream = match TcpStream::connect(addr).await {
        Ok(stream) => stream,
        Err(err) => {
            debug!(error = %err, "probe connect failed");
            return false;
        }
    };

    let mut stream = BufReader::new(stream);
    let request = ProbeRequest::for_secret(secret).to_line();
    if let Err(err) = stream.get_mut().write_all(request.as_bytes()).await {
        debug!(error = %err, "probe write failed");
        return false;
    }

    let mut line = String::new();
    match stream.read_line(&mut line).await {
        Ok(_) => parse_probe_verdict(&line).unwrap_or(false),
        Err(err) => {
            debug!(error = %err, "probe read failed");
            false
        }
    }
}
