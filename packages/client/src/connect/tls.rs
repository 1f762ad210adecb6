//! TLS over an established TCP stream using rustls

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

use rustls::pki_types::ServerName;
use url::{Host, Url};

/// Client configuration trusting the bundled webpki roots.
pub fn default_client_config() -> io::Result<Arc<rustls::ClientConfig>> {
    let roots = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(io::Error::other)?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

fn server_name(url: &Url) -> io::Result<ServerName<'static>> {
    let name = match url.host() {
        Some(Host::Domain(domain)) => ServerName::try_from(domain.to_owned())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        Some(Host::Ipv4(ip)) => ServerName::IpAddress(std::net::IpAddr::V4(ip).into()),
        Some(Host::Ipv6(ip)) => ServerName::IpAddress(std::net::IpAddr::V6(ip).into()),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("url `{url}` has no host"),
            ));
        }
    };
    Ok(name)
}

/// A plain or TLS-wrapped socket.
pub enum Stream {
    Plain(TcpStream),
    Tls(Box<rustls::StreamOwned<rustls::ClientConnection, TcpStream>>),
}

impl Stream {
    /// Wrap `tcp` in TLS for `url`'s host. The handshake runs on first I/O.
    pub fn tls(
        tcp: TcpStream,
        url: &Url,
        config: Option<Arc<rustls::ClientConfig>>,
    ) -> io::Result<Self> {
        let config = match config {
            Some(config) => config,
            None => default_client_config()?,
        };
        let conn = rustls::ClientConnection::new(config, server_name(url)?)
            .map_err(io::Error::other)?;
        Ok(Self::Tls(Box::new(rustls::StreamOwned::new(conn, tcp))))
    }

    pub fn tcp(&self) -> &TcpStream {
        match self {
            Self::Plain(tcp) => tcp,
            Self::Tls(tls) => tls.get_ref(),
        }
    }

    pub fn shutdown(&mut self) {
        if let Self::Tls(tls) = self {
            tls.conn.send_close_notify();
            let _ = tls.flush();
        }
        let _ = self.tcp().shutdown(Shutdown::Both);
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(tcp) => tcp.read(buf),
            Self::Tls(tls) => tls.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(tcp) => tcp.write(buf),
            Self::Tls(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(tcp) => tcp.flush(),
            Self::Tls(tls) => tls.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_roots() {
        assert!(default_client_config().is_ok());
    }

    #[test]
    fn server_names_for_domains_and_ips() {
        assert!(server_name(&Url::parse("https://example.com/").unwrap()).is_ok());
        assert!(server_name(&Url::parse("https://127.0.0.1/").unwrap()).is_ok());
        assert!(server_name(&Url::parse("https://[::1]/").unwrap()).is_ok());
    }
}
