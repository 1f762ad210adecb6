//! TCP connection establishment
//!
//! Blocking connects with a per-address timeout, and HTTP CONNECT tunnels
//! through a proxy.

use std::io::{self, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::wire;

/// Connect to the first reachable address of `host:port`.
pub fn connect(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let addrs = (host, port).to_socket_addrs()?;
    let mut last_error = None;
    for addr in addrs {
        let attempt = if timeout.is_zero() {
            TcpStream::connect(addr)
        } else {
            TcpStream::connect_timeout(&addr, timeout)
        };
        match attempt {
            Ok(stream) => {
                tracing::debug!(target: "cachet::connect", %addr, "connected");
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!(target: "cachet::connect", %addr, error = %e, "connect attempt failed");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses resolved for {host}:{port}"),
        )
    }))
}

/// Apply read and write timeouts. A zero duration means no timeout.
pub fn configure(stream: &TcpStream, read_timeout: Duration) -> io::Result<()> {
    let timeout = (!read_timeout.is_zero()).then_some(read_timeout);
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)?;
    stream.set_nodelay(true)
}

/// Establish an HTTP CONNECT tunnel to `host:port` over a proxy stream.
pub fn establish_connect_tunnel(
    mut proxy_stream: TcpStream,
    host: &str,
    port: u16,
    auth: Option<&str>,
) -> io::Result<TcpStream> {
    let authority = format!("{host}:{port}");
    let mut request = format!("CONNECT {authority} HTTP/1.1\r\nHost: {authority}\r\n");
    if let Some(auth) = auth {
        request.push_str("Proxy-Authorization: Basic ");
        request.push_str(auth);
        request.push_str("\r\n");
    }
    request.push_str("\r\n");
    proxy_stream.write_all(request.as_bytes())?;
    proxy_stream.flush()?;

    // The proxy sends nothing after its response head until the tunnel is used,
    // so the buffered reader never holds tunnel bytes when dropped.
    let (code, reason, drained) = {
        let mut reader = BufReader::new(&proxy_stream);
        let head = wire::read_response_head(&mut reader)?;
        (head.code, head.reason, reader.buffer().is_empty())
    };
    if drained && (200..300).contains(&code) {
        tracing::debug!(target: "cachet::connect", %authority, "proxy tunnel established");
        return Ok(proxy_stream);
    }
    Err(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        format!("proxy refused CONNECT to {authority}: {code} {reason}"),
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    fn proxy_replying(reply: &'static [u8]) -> (u16, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut seen = Vec::new();
            let mut buf = [0u8; 512];
            while !seen.ends_with(b"\r\n\r\n") {
                let n = sock.read(&mut buf).unwrap();
                seen.extend_from_slice(&buf[..n]);
            }
            sock.write_all(reply).unwrap();
            String::from_utf8(seen).unwrap()
        });
        (port, handle)
    }

    #[test]
    fn tunnel_sends_auth_and_accepts_200() {
        let (port, peer) = proxy_replying(b"HTTP/1.1 200 Connection established\r\n\r\n");
        let stream = connect("127.0.0.1", port, Duration::from_secs(5)).unwrap();
        establish_connect_tunnel(stream, "example.com", 443, Some("dXNlcjpwYXNz")).unwrap();
        let seen = peer.join().unwrap();
        assert!(seen.starts_with("CONNECT example.com:443 HTTP/1.1\r\n"));
        assert!(seen.contains("Proxy-Authorization: Basic dXNlcjpwYXNz\r\n"));
    }

    #[test]
    fn tunnel_rejection_is_an_error() {
        let (port, peer) =
            proxy_replying(b"HTTP/1.1 407 Proxy Authentication Required\r\nContent-Length: 0\r\n\r\n");
        let stream = connect("127.0.0.1", port, Duration::from_secs(5)).unwrap();
        let err = establish_connect_tunnel(stream, "example.com", 443, None).unwrap_err();
        assert!(err.to_string().contains("407"));
        peer.join().unwrap();
    }
}
