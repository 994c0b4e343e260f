//! Erreurs de la couche réseau

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Erreur d'un appel HTTP sortant
#[derive(Debug, Error)]
pub enum FetchError {
    /// Statut HTTP non 2xx
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Essai interrompu par le délai maximal
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// Erreur réseau (connexion, DNS, lecture du corps)
    #[error("Network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Construction du client impossible
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Classe une erreur reqwest
    pub(crate) fn from_reqwest(url: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
                timeout,
            };
        }
        Self::Network {
            url: url.to_string(),
            source: err,
        }
    }

    /// Indique si l'erreur est transitoire (nouvel essai possible)
    ///
    /// Transitoires : délai dépassé, échec de connexion ou de résolution DNS,
    /// connexion réinitialisée ou interrompue.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Network { source, .. } => is_transient(source),
            Self::Status { .. } | Self::Client(_) => false,
        }
    }

    /// Statut HTTP si l'erreur en porte un
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }

    let mut cause: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(e) = cause {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }

        let msg = e.to_string().to_lowercase();
        if msg.contains("connection reset")
            || msg.contains("connection closed before message completed")
            || msg.contains("dns error")
            || msg.contains("operation was aborted")
        {
            return true;
        }
        cause = e.source();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_not_retriable_by_itself() {
        let err = FetchError::Status {
            url: "http://x".into(),
            status: 503,
        };
        assert!(!err.is_retriable());
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_timeout_is_retriable() {
        let err = FetchError::Timeout {
            url: "http://x".into(),
            timeout: Duration::from_millis(10),
        };
        assert!(err.is_retriable());
        assert!(err.to_string().contains("timed out"));
    }
}
