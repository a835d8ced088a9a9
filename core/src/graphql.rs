//! GraphQL wire envelope and the operation texts the store issues.
//!
//! Requests are `{query, variables, operationName}`; responses are
//! `{data?, errors?: [{message}]}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

const PET_FIELDS: &str = "id name species ageYears pictureUrl description breederName breederEmail createdAt purchasedAt";

pub fn store_pets_query() -> String {
    format!(
        "query StorePets($storeSlug: String!) {{ storePets(storeSlug: $storeSlug) {{ {PET_FIELDS} }} }}"
    )
}

pub fn purchased_pets_query() -> String {
    format!(
        "query PurchasedPets($storeSlug: String!) {{ purchasedPets(storeSlug: $storeSlug) {{ {PET_FIELDS} }} }}"
    )
}

pub const PURCHASE_PETS_MUTATION: &str = "mutation PurchasePets($input: PurchasePetsInput!) { purchasePets(input: $input) { purchasedIds errors { petName message } } }";

pub fn create_pet_mutation() -> String {
    format!(
        "mutation CreatePet($input: CreatePetInput!) {{ createPet(input: $input) {{ {PET_FIELDS} }} }}"
    )
}

/// An operation descriptor: the document text plus its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: &'static str,
    pub query: String,
    pub variables: Value,
}

impl Operation {
    pub fn new(name: &'static str, query: impl Into<String>, variables: Value) -> Self {
        Self {
            name,
            query: query.into(),
            variables,
        }
    }

    pub fn to_body(&self) -> Result<String, ApiError> {
        let body = GraphqlRequest {
            query: &self.query,
            variables: &self.variables,
            operation_name: self.name,
        };
        serde_json::to_string(&body).map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: &'a Value,
    operation_name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphqlError>>,
}

impl<T> GraphqlResponse<T> {
    /// Errors win over data; a response with neither is `NoData`.
    pub fn into_result(self) -> Result<T, ApiError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            let joined = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ApiError::Graphql(joined));
        }
        self.data.ok_or(ApiError::NoData)
    }
}

/// Deserialize an envelope body and unwrap its `data`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: GraphqlResponse<T> =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    debug!(
        has_data = envelope.data.is_some(),
        error_count = envelope.errors.as_ref().map_or(0, Vec::len),
        "decoded graphql envelope"
    );
    envelope.into_result()
}
