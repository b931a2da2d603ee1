//! Cart store configuration.

use serde::{Deserialize, Serialize};

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Language for user-facing error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR", alias = "pt-br", alias = "pt")]
    PtBr,
}

impl Locale {
    /// The tag this locale is configured with.
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
        }
    }

    pub(crate) fn stock_unavailable(self) -> &'static str {
        match self {
            Locale::En => "requested quantity unavailable",
            Locale::PtBr => "Quantidade solicitada fora de estoque",
        }
    }

    pub(crate) fn add_failed(self) -> &'static str {
        match self {
            Locale::En => "product could not be added",
            Locale::PtBr => "Erro na adição do produto",
        }
    }

    pub(crate) fn remove_failed(self) -> &'static str {
        match self {
            Locale::En => "product could not be removed",
            Locale::PtBr => "Erro na remoção do produto",
        }
    }

    pub(crate) fn update_failed(self) -> &'static str {
        match self {
            Locale::En => "product could not be updated",
            Locale::PtBr => "Erro na alteração de quantidade do produto",
        }
    }

    pub(crate) fn load_failed(self) -> &'static str {
        match self {
            Locale::En => "cart could not be loaded",
            Locale::PtBr => "Erro ao carregar o carrinho",
        }
    }
}

/// When committed carts are written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    /// Write right after each commit, before the operation returns.
    #[default]
    Immediate,
    /// Write from a background task watching the cart
    /// (see [`CartStore::spawn_persistence`](crate::CartStore::spawn_persistence)).
    Deferred,
}

impl PersistenceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PersistenceMode::Immediate => "immediate",
            PersistenceMode::Deferred => "deferred",
        }
    }
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Storage key for the serialized cart.
    pub storage_key: String,
    /// Language for error notifications.
    pub locale: Locale,
    /// Persistence timing.
    pub persistence: PersistenceMode,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: CART_STORAGE_KEY.to_string(),
            locale: Locale::default(),
            persistence: PersistenceMode::default(),
        }
    }
}

impl CartConfig {
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_persistence(mut self, persistence: PersistenceMode) -> Self {
        self.persistence = persistence;
        self
    }
}
