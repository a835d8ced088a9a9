//! Domain DTOs for the pet store API.
//!
//! # Design
//! These types mirror the GraphQL schema's camelCase field names but are
//! defined independently from the mock-server crate; integration tests catch
//! any schema drift between the two.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned pet identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(String);

impl PetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Species {
    #[default]
    Cat,
    Dog,
    Frog,
}

impl Species {
    pub fn as_str(self) -> &'static str {
        match self {
            Species::Cat => "CAT",
            Species::Dog => "DOG",
            Species::Frog => "FROG",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CAT" => Ok(Species::Cat),
            "DOG" => Ok(Species::Dog),
            "FROG" => Ok(Species::Frog),
            other => Err(format!("unknown species {other:?}")),
        }
    }
}

/// A pet as returned by the API.
///
/// `purchased_at` is absent until the pet is bought; once set it never
/// changes from the client's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: Species,
    pub age_years: u32,
    pub picture_url: String,
    pub description: String,
    pub breeder_name: String,
    #[serde(default)]
    pub breeder_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub purchased_at: Option<DateTime<Utc>>,
}

impl Pet {
    pub fn is_purchased(&self) -> bool {
        self.purchased_at.is_some()
    }
}

/// Attributes for registering a new pet. The server assigns `id` and
/// `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    pub name: String,
    pub species: Species,
    pub age_years: u32,
    pub picture_url: String,
    pub description: String,
    pub breeder_name: String,
    pub breeder_email: String,
}

impl Default for NewPet {
    fn default() -> Self {
        Self {
            name: String::new(),
            species: Species::Cat,
            age_years: 1,
            picture_url: String::new(),
            description: String::new(),
            breeder_name: String::new(),
            breeder_email: String::new(),
        }
    }
}

/// Label carried by the synthetic entry produced when a checkout call fails
/// as a whole.
pub const CHECKOUT_LABEL: &str = "Checkout";

/// A named failure for one pet within a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseError {
    pub pet_name: String,
    pub message: String,
}

impl PurchaseError {
    pub fn new(pet_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pet_name: pet_name.into(),
            message: message.into(),
        }
    }

    pub fn checkout_failure(message: impl Into<String>) -> Self {
        Self::new(CHECKOUT_LABEL, message)
    }

    pub fn is_checkout_failure(&self) -> bool {
        self.pet_name == CHECKOUT_LABEL
    }
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pet_name, self.message)
    }
}

/// Outcome of a batch purchase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResult {
    #[serde(default)]
    pub purchased_ids: Vec<PetId>,
    #[serde(default)]
    pub errors: Vec<PurchaseError>,
}
