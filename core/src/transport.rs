//! The I/O seam and the four domain operations built on it.
//!
//! # Design
//! The host implements `Transport` to turn an `HttpRequest` into an
//! `HttpResponse`. `PetStoreApi` pairs it with the stateless client so that
//! each operation reads as build → execute → parse. One attempt per call: no
//! retry, no timeout, no cancellation.

use std::future::Future;

use tracing::debug;

use crate::client::PetStoreClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{NewPet, Pet, PetId, PurchaseResult};

/// Executes one HTTP exchange. Non-2xx statuses are returned as data, not
/// as `Err`; `Err` is reserved for exchanges that produced no response.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>>;
}

#[derive(Debug, Clone)]
pub struct PetStoreApi<T> {
    client: PetStoreClient,
    transport: T,
}

impl<T: Transport> PetStoreApi<T> {
    pub fn new(client: PetStoreClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PetStoreClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Pets not yet purchased in `store_slug`.
    pub async fn store_pets(&self, store_slug: &str) -> Result<Vec<Pet>, ApiError> {
        let request = self.client.build_store_pets(store_slug)?;
        let response = self.transport.execute(request).await?;
        let pets = self.client.parse_store_pets(response)?;
        debug!(store_slug, count = pets.len(), "fetched store pets");
        Ok(pets)
    }

    /// Pets already purchased in `store_slug`, in server order.
    pub async fn purchased_pets(&self, store_slug: &str) -> Result<Vec<Pet>, ApiError> {
        let request = self.client.build_purchased_pets(store_slug)?;
        let response = self.transport.execute(request).await?;
        let pets = self.client.parse_purchased_pets(response)?;
        debug!(store_slug, count = pets.len(), "fetched purchased pets");
        Ok(pets)
    }

    pub async fn purchase_pets(&self, store_slug: &str, pet_ids: &[PetId]) -> Result<PurchaseResult, ApiError> {
        let request = self.client.build_purchase_pets(store_slug, pet_ids)?;
        let response = self.transport.execute(request).await?;
        let result = self.client.parse_purchase_pets(response)?;
        debug!(
            store_slug,
            requested = pet_ids.len(),
            purchased = result.purchased_ids.len(),
            errors = result.errors.len(),
            "purchase submitted"
        );
        Ok(result)
    }

    /// Sent with merchant credentials.
    pub async fn create_pet(&self, input: &NewPet) -> Result<Pet, ApiError> {
        let request = self.client.build_create_pet(input)?;
        let response = self.transport.execute(request).await?;
        let pet = self.client.parse_create_pet(response)?;
        debug!(id = %pet.id, "created pet");
        Ok(pet)
    }
}
