use std::fmt;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("malformed connection url '{0}'")]
    MalformedUrl(String),
    #[error("no driver available for scheme '{scheme}' in '{url}'")]
    UnsupportedScheme { scheme: String, url: String },
    #[error("invalid host name '{0}'")]
    InvalidHost(String),
    #[error("could not resolve {host}: {source}")]
    Unresolvable {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("connection to {addr} refused: {source}")]
    Refused {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("connection to {0} timed out")]
    TimedOut(SocketAddr),
}

/// A parsed `scheme://host[:port][/database]` url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
}

impl Endpoint {
    pub fn parse(url: &str) -> Result<Self, ConnectionError> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| ConnectionError::MalformedUrl(url.to_string()))?;
        let default_port =
            default_port(scheme).ok_or_else(|| ConnectionError::UnsupportedScheme {
                scheme: scheme.to_string(),
                url: url.to_string(),
            })?;

        let (authority, database) = match rest.split_once('/') {
            Some((authority, db)) if !db.is_empty() => (authority, Some(db.to_string())),
            Some((authority, _)) => (authority, None),
            None => (rest, None),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ConnectionError::MalformedUrl(url.to_string()))?;
                (host, port)
            }
            None => (authority, default_port),
        };

        if !is_valid_host(host) {
            return Err(ConnectionError::InvalidHost(host.to_string()));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
            database,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)?;
        if let Some(db) = &self.database {
            write!(f, "/{db}")?;
        }
        Ok(())
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "mysql" => Some(3306),
        "postgres" | "postgresql" => Some(5432),
        _ => None,
    }
}

// RFC 1123 host names; dotted IPv4 literals pass the same check.
fn is_valid_host(host: &str) -> bool {
    if host.is_empty() || host.len() > 253 {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug)]
pub struct Connection {
    pub endpoint: Endpoint,
    pub user: String,
    _stream: TcpStream,
}

pub trait Connector {
    fn connect(&self, url: &str, credentials: &Credentials) -> Result<Connection, ConnectionError>;
}

#[derive(Debug, Clone)]
pub struct TcpConnector {
    timeout: Duration,
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self {
            timeout: CONNECT_TIMEOUT,
        }
    }
}

impl TcpConnector {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for TcpConnector {
    fn connect(&self, url: &str, credentials: &Credentials) -> Result<Connection, ConnectionError> {
        let endpoint = Endpoint::parse(url)?;
        let addr = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|source| ConnectionError::Unresolvable {
                host: endpoint.host.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| ConnectionError::Unresolvable {
                host: endpoint.host.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
            })?;

        tracing::debug!(%endpoint, %addr, user = %credentials.user, "opening connection");
        let stream = TcpStream::connect_timeout(&addr, self.timeout).map_err(|source| {
            if source.kind() == io::ErrorKind::TimedOut {
                ConnectionError::TimedOut(addr)
            } else {
                ConnectionError::Refused { addr, source }
            }
        })?;

        Ok(Connection {
            endpoint,
            user: credentials.user.clone(),
            _stream: stream,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn credentials() -> Credentials {
        Credentials {
            user: "user".to_string(),
            password: "password".to_string(),
        }
    }

    #[test]
    fn parses_full_url() {
        let endpoint = Endpoint::parse("postgres://db.internal:6543/orders").expect("parse");
        assert_eq!(endpoint.host, "db.internal");
        assert_eq!(endpoint.port, 6543);
        assert_eq!(endpoint.database.as_deref(), Some("orders"));
        assert_eq!(endpoint.to_string(), "postgres://db.internal:6543/orders");
    }

    #[test]
    fn applies_scheme_default_port() {
        let endpoint = Endpoint::parse("mysql://localhost").expect("parse");
        assert_eq!(endpoint.port, 3306);
        assert_eq!(endpoint.database, None);
    }

    #[test]
    fn underscore_host_is_invalid() {
        let err = Endpoint::parse("mysql://invalid_url").expect_err("invalid host");
        assert!(matches!(err, ConnectionError::InvalidHost(host) if host == "invalid_url"));
    }

    #[test]
    fn unknown_scheme_has_no_driver() {
        let err = Endpoint::parse("oracle://localhost").expect_err("scheme");
        assert!(matches!(err, ConnectionError::UnsupportedScheme { scheme, .. } if scheme == "oracle"));
    }

    #[test]
    fn bad_port_and_missing_separator_are_malformed() {
        assert!(matches!(
            Endpoint::parse("mysql://localhost:notaport"),
            Err(ConnectionError::MalformedUrl(_))
        ));
        assert!(matches!(
            Endpoint::parse("localhost:3306"),
            Err(ConnectionError::MalformedUrl(_))
        ));
    }

    #[test]
    fn connects_to_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let url = format!("mysql://127.0.0.1:{port}/test");

        let connection = TcpConnector::default()
            .connect(&url, &credentials())
            .expect("connect");
        assert_eq!(connection.endpoint.port, port);
        assert_eq!(connection.user, "user");
    }

    #[test]
    fn closed_port_is_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let url = format!("mysql://127.0.0.1:{port}");

        let err = TcpConnector::with_timeout(Duration::from_millis(500))
            .connect(&url, &credentials())
            .expect_err("closed port");
        assert!(matches!(
            err,
            ConnectionError::Refused { .. } | ConnectionError::TimedOut(_)
        ));
    }

    #[test]
    fn credentials_debug_masks_password() {
        let rendered = format!("{:?}", credentials());
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("password\""));
    }
}
