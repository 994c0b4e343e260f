//! Couche réseau résiliente
//!
//! Chaque essai est borné par un délai ; les statuts et erreurs transitoires
//! déclenchent un nouvel essai après `backoff × 2^essai + gigue`.

mod error;
mod retry;

pub use error::FetchError;
pub use retry::{RetryPolicy, DEFAULT_RETRY_STATUSES};

use bytes::Bytes;
use reqwest::{Client, Response};
use tracing::{debug, warn};

/// Client HTTP partagé, porteur de sa politique de nouvel essai
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Crée un client avec la politique donnée
    pub fn new(policy: RetryPolicy) -> Result<Self, FetchError> {
        let inner = Client::builder()
            .user_agent(concat!("dp-pack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { inner, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET avec délai par essai et nouveaux essais
    ///
    /// Retourne la réponse même si son statut n'est pas 2xx, une fois les
    /// essais épuisés ou si le statut n'est pas transitoire.
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Response, FetchError> {
        let mut attempt = 0u32;

        loop {
            let sent = self
                .inner
                .get(url)
                .query(query)
                .timeout(self.policy.timeout)
                .send()
                .await;

            match sent {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success()
                        && self.policy.is_retriable_status(status.as_u16())
                        && attempt < self.policy.retries
                    {
                        let wait = self.policy.delay_for(attempt);
                        debug!(
                            url,
                            status = status.as_u16(),
                            attempt,
                            wait_ms = wait.as_millis() as u64,
                            "Transient status, retrying"
                        );
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    let err = FetchError::from_reqwest(url, self.policy.timeout, e);
                    if attempt < self.policy.retries && err.is_retriable() {
                        let wait = self.policy.delay_for(attempt);
                        debug!(url, attempt, error = %err, "Transient error, retrying");
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// GET dont le statut doit être 2xx, corps complet en mémoire
    pub async fn fetch_bytes(&self, url: &str, query: &[(&str, String)]) -> Result<Bytes, FetchError> {
        let response = self.fetch_with_retry(url, query).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, self.policy.timeout, e))
    }

    /// GET texte (réponses JSON des services)
    pub async fn fetch_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let bytes = self.fetch_bytes(url, query).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Variante qui absorbe toutes les erreurs : `None` si l'image manque
    pub async fn fetch_bytes_or_none(&self, url: &str, query: &[(&str, String)]) -> Option<Bytes> {
        match self.fetch_bytes(url, query).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(url, error = %e, "Fetch failed, continuing without content");
                None
            }
        }
    }
}
