//! Stateless GraphQL request builder and response parser for the pet store.
//!
//! # Design
//! `PetStoreClient` holds the endpoint and both credential pairs and carries
//! no mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. The host executes the round-trip, keeping the
//! core deterministic and free of I/O dependencies.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::auth::{Credentials, Role};
use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::graphql::{self, Operation};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewPet, Pet, PetId, PurchaseResult};

/// Stateless client for the pet store GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct PetStoreClient {
    endpoint: String,
    customer: Credentials,
    merchant: Credentials,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorePetsData {
    store_pets: Vec<Pet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchasedPetsData {
    purchased_pets: Vec<Pet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchasePetsData {
    purchase_pets: PurchaseResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePetData {
    create_pet: Pet,
}

impl PetStoreClient {
    pub fn new(endpoint: &str, customer: Credentials, merchant: Credentials) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            customer,
            merchant,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.api_url, config.customer.clone(), config.merchant.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn credentials(&self, role: Role) -> &Credentials {
        match role {
            Role::Customer => &self.customer,
            Role::Merchant => &self.merchant,
        }
    }

    /// Build the `POST` for any operation under the given role.
    pub fn build_operation(&self, operation: &Operation, role: Role) -> Result<HttpRequest, ApiError> {
        let body = operation.to_body()?;
        debug!(operation = operation.name, ?role, "built graphql request");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoint.clone(),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                (
                    "authorization".to_string(),
                    self.credentials(role).authorization_header(),
                ),
            ],
            body: Some(body),
        })
    }

    pub fn build_store_pets(&self, store_slug: &str) -> Result<HttpRequest, ApiError> {
        let op = Operation::new(
            "StorePets",
            graphql::store_pets_query(),
            json!({ "storeSlug": store_slug }),
        );
        self.build_operation(&op, Role::Customer)
    }

    pub fn build_purchased_pets(&self, store_slug: &str) -> Result<HttpRequest, ApiError> {
        let op = Operation::new(
            "PurchasedPets",
            graphql::purchased_pets_query(),
            json!({ "storeSlug": store_slug }),
        );
        self.build_operation(&op, Role::Customer)
    }

    pub fn build_purchase_pets(&self, store_slug: &str, pet_ids: &[PetId]) -> Result<HttpRequest, ApiError> {
        let op = Operation::new(
            "PurchasePets",
            graphql::PURCHASE_PETS_MUTATION,
            json!({ "input": { "storeSlug": store_slug, "petIds": pet_ids } }),
        );
        self.build_operation(&op, Role::Customer)
    }

    pub fn build_create_pet(&self, input: &NewPet) -> Result<HttpRequest, ApiError> {
        let input = serde_json::to_value(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let op = Operation::new(
            "CreatePet",
            graphql::create_pet_mutation(),
            json!({ "input": input }),
        );
        self.build_operation(&op, Role::Merchant)
    }

    pub fn parse_store_pets(&self, response: HttpResponse) -> Result<Vec<Pet>, ApiError> {
        check_status(&response)?;
        let data: StorePetsData = graphql::decode(&response.body)?;
        Ok(data.store_pets)
    }

    /// Pets come back in server order; no client-side sort.
    pub fn parse_purchased_pets(&self, response: HttpResponse) -> Result<Vec<Pet>, ApiError> {
        check_status(&response)?;
        let data: PurchasedPetsData = graphql::decode(&response.body)?;
        Ok(data.purchased_pets)
    }

    pub fn parse_purchase_pets(&self, response: HttpResponse) -> Result<PurchaseResult, ApiError> {
        check_status(&response)?;
        let data: PurchasePetsData = graphql::decode(&response.body)?;
        Ok(data.purchase_pets)
    }

    pub fn parse_create_pet(&self, response: HttpResponse) -> Result<Pet, ApiError> {
        check_status(&response)?;
        let data: CreatePetData = graphql::decode(&response.body)?;
        Ok(data.create_pet)
    }
}

/// Map non-2xx status codes to `ApiError::Status`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}
