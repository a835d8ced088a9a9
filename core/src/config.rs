//! Explicitly constructed store configuration.
//!
//! Values come from the environment (or any key lookup in tests). Unset
//! values fall back to the demo defaults. A blank endpoint or store slug is
//! an error; other blank values count as unset.

use crate::auth::Credentials;
use crate::checkout::CheckoutPolicy;
use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/graphql";
pub const DEFAULT_STORE_SLUG: &str = "demo";

/// Everything the client needs, read once and passed in at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub api_url: String,
    pub customer: Credentials,
    pub merchant: Credentials,
    pub default_store_slug: String,
    pub checkout_policy: CheckoutPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            customer: Credentials::new("customer_demo", "customer_demo_pw"),
            merchant: Credentials::new("merchant_demo", "merchant_demo_pw"),
            default_store_slug: DEFAULT_STORE_SLUG.to_string(),
            checkout_policy: CheckoutPolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let api_url = lookup("PETSTORE_API_URL").unwrap_or(defaults.api_url);
        let default_store_slug = lookup("PETSTORE_STORE_SLUG").unwrap_or(defaults.default_store_slug);
        if default_store_slug.contains('/') {
            return Err(ConfigError::Invalid {
                key: "PETSTORE_STORE_SLUG",
                value: default_store_slug,
            });
        }

        let checkout_policy = match get("PETSTORE_CHECKOUT_POLICY") {
            None => defaults.checkout_policy,
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "PETSTORE_CHECKOUT_POLICY",
                value,
            })?,
        };

        let customer = Credentials::new(
            get("PETSTORE_CUSTOMER_USER").unwrap_or(defaults.customer.username),
            get("PETSTORE_CUSTOMER_PASS").unwrap_or(defaults.customer.password),
        );
        let merchant = Credentials::new(
            get("PETSTORE_MERCHANT_USER").unwrap_or(defaults.merchant.username),
            get("PETSTORE_MERCHANT_PASS").unwrap_or(defaults.merchant.password),
        );

        let config = Self {
            api_url,
            customer,
            merchant,
            default_store_slug,
            checkout_policy,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Blank("PETSTORE_API_URL"));
        }
        if self.default_store_slug.trim().is_empty() {
            return Err(ConfigError::Blank("PETSTORE_STORE_SLUG"));
        }
        Ok(())
    }
}
