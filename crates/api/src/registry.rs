//! Bank registry.
//!
//! Each bank adapter contributes a configurator that adds its routes to a
//! fresh router. The registry nests every bank under `/api/banks/{name}` and
//! hands the bank its mount prefix through [`BankPrefix`].

use axum::{Extension, Router};

use crate::AppState;

/// Adds a bank's routes to a router.
pub type BankConfigurator = fn(Router<AppState>) -> Router<AppState>;

/// Path under which a bank is mounted, e.g. `/api/banks/saman`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankPrefix(pub String);

impl BankPrefix {
    /// Returns the prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Explicit registry of bank adapters, built at startup.
#[derive(Debug, Default, Clone)]
pub struct BankRegistry {
    banks: Vec<(String, BankConfigurator)>,
}

impl BankRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every bank this service emulates.
    #[must_use]
    pub fn with_default_banks() -> Self {
        let mut registry = Self::new();
        registry.register(crate::routes::sep::BANK_NAME, crate::routes::sep::configure);
        registry
    }

    /// Registers a bank. Registering a name again replaces its configurator.
    pub fn register(&mut self, name: impl Into<String>, configurator: BankConfigurator) -> &mut Self {
        let name = name.into();
        if let Some(entry) = self.banks.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = configurator;
        } else {
            self.banks.push((name, configurator));
        }
        self
    }

    /// Returns the registered bank names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.banks.iter().map(|(name, _)| name.as_str())
    }

    /// Nests every registered bank into `router`.
    #[must_use]
    pub fn mount(&self, router: Router<AppState>) -> Router<AppState> {
        self.banks.iter().fold(router, |router, (name, configure)| {
            let prefix = format!("/api/banks/{name}");
            tracing::debug!(bank = %name, %prefix, "Mounting bank");
            let bank = configure(Router::new()).layer(Extension(BankPrefix(prefix.clone())));
            router.nest(&prefix, bank)
        })
    }
}
