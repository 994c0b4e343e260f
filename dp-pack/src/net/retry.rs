//! Politique de nouvel essai : délai exponentiel + gigue

use std::time::Duration;

use rand::Rng;

/// Statuts HTTP considérés comme transitoires par défaut
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Politique de nouvel essai, immuable, passée au client HTTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Nombre d'essais supplémentaires après le premier
    pub retries: u32,
    /// Durée maximale d'un essai
    pub timeout: Duration,
    /// Délai de base, doublé à chaque essai
    pub backoff: Duration,
    /// Gigue aléatoire maximale ajoutée au délai
    pub jitter: Duration,
    /// Statuts HTTP qui déclenchent un nouvel essai
    pub retry_on_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            timeout: Duration::from_millis(12_000),
            backoff: Duration::from_millis(450),
            jitter: Duration::from_millis(200),
            retry_on_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Politique déterministe sans attente (tests)
    pub fn immediate(retries: u32) -> Self {
        Self {
            retries,
            backoff: Duration::ZERO,
            jitter: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration, jitter: Duration) -> Self {
        self.backoff = backoff;
        self.jitter = jitter;
        self
    }

    /// Indique si un statut HTTP justifie un nouvel essai
    pub fn is_retriable_status(&self, status: u16) -> bool {
        self.retry_on_statuses.contains(&status)
    }

    /// Délai minimal avant l'essai suivant : `backoff × 2^attempt`
    pub fn base_delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Délai effectif : délai de base + gigue dans `[0, jitter)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
    }
}
