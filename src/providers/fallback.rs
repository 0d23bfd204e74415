//! Provider fallback order
//!
//! The order itself is the contract: index 0 is tried first, the self-hosted
//! provider is the last resort after the three hosted providers.

use super::Provider;
use crate::error::{AppError, AppResult};
use std::collections::HashSet;

/// Process-wide provider priority, index 0 tried first
pub const PROVIDER_FALLBACK_ORDER: [Provider; 4] = [
    Provider::OpenAi,
    Provider::Anthropic,
    Provider::GoogleGenAi,
    Provider::Ollama,
];

/// Index the self-hosted provider must occupy
pub const SELF_HOSTED_INDEX: usize = 3;

/// Set of providers a resolution walk should skip
pub type ProviderSet = HashSet<Provider>;

/// Immutable, verified provider priority sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackOrder(&'static [Provider]);

impl FallbackOrder {
    /// The verified process-wide order
    pub fn standard() -> Self {
        Self(&PROVIDER_FALLBACK_ORDER)
    }

    /// Verify an order: no duplicates, every provider present, and the
    /// self-hosted provider at [`SELF_HOSTED_INDEX`]
    ///
    /// # Errors
    /// Returns `AppError::Config` describing the first violation found.
    pub fn verify(order: &'static [Provider]) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for provider in order {
            if !seen.insert(*provider) {
                return Err(AppError::Config(format!(
                    "Provider fallback order lists '{}' more than once",
                    provider
                )));
            }
        }

        if let Some(missing) = Provider::ALL.into_iter().find(|p| !seen.contains(p)) {
            return Err(AppError::Config(format!(
                "Provider fallback order is missing '{}'",
                missing
            )));
        }

        match order.iter().position(Provider::is_self_hosted) {
            Some(SELF_HOSTED_INDEX) => Ok(Self(order)),
            Some(index) => Err(AppError::Config(format!(
                "Self-hosted provider must be at fallback index {}, found at {}",
                SELF_HOSTED_INDEX, index
            ))),
            None => Err(AppError::Config(
                "Provider fallback order has no self-hosted provider".to_string(),
            )),
        }
    }

    /// Providers in priority order
    pub fn providers(&self) -> &'static [Provider] {
        self.0
    }

    /// Priority index of a provider
    pub fn position(&self, provider: Provider) -> Option<usize> {
        self.0.iter().position(|p| *p == provider)
    }

    /// Walk order with `first` moved to the front, others keeping their priority
    pub fn pinned(&self, first: Provider) -> Vec<Provider> {
        std::iter::once(first)
            .chain(self.0.iter().copied().filter(|p| *p != first))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FallbackOrder {
    fn default() -> Self {
        Self::standard()
    }
}
