//! In-memory stand-in for the pet store GraphQL server.
//!
//! Serves `POST /graphql` behind HTTP basic auth and dispatches on the root
//! field of the query document. It is not a GraphQL engine: selections are
//! ignored and every resolver returns the full object.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const DEMO_SLUG: &str = "demo";
pub const CUSTOMER: (&str, &str) = ("customer_demo", "customer_demo_pw");
pub const MERCHANT: (&str, &str) = ("merchant_demo", "merchant_demo_pw");

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub species: String,
    pub age_years: i64,
    pub picture_url: String,
    pub description: String,
    pub breeder_name: String,
    pub breeder_email: String,
    pub created_at: DateTime<Utc>,
    pub purchased_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub purchased_by: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetInput {
    pub name: String,
    pub species: String,
    pub age_years: i64,
    pub picture_url: String,
    pub description: String,
    pub breeder_name: String,
    pub breeder_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Value,
    #[serde(default)]
    pub operation_name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Customer,
    Merchant,
}

#[derive(Clone, Debug)]
struct Account {
    password: String,
    role: Role,
    store_slug: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
    pub store_slug: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreArgs {
    store_slug: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseInput {
    store_slug: String,
    pet_ids: Vec<String>,
}

#[derive(Deserialize)]
struct Input<T> {
    input: T,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResult {
    pub purchased_ids: Vec<String>,
    pub errors: Vec<PurchaseError>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseError {
    pub pet_name: String,
    pub message: String,
}

/// Stores keyed by slug, plus the accounts allowed into them.
#[derive(Debug, Default)]
pub struct Db {
    stores: HashMap<String, Vec<Pet>>,
    accounts: HashMap<String, Account>,
}

pub type SharedDb = Arc<RwLock<Db>>;

impl Db {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The demo store with one merchant, one customer, and three pets.
    pub fn seeded() -> Result<Self, String> {
        let mut db = Self::empty();
        db.add_store(DEMO_SLUG);
        db.add_account(MERCHANT.0, MERCHANT.1, Role::Merchant, DEMO_SLUG);
        db.add_account(CUSTOMER.0, CUSTOMER.1, Role::Customer, DEMO_SLUG);
        let seeds = [
            ("Miso", "CAT", 2, "Playful kitten who loves strings and sunbeams.", "Jane Doe", "jane@example.com"),
            ("Barkley", "DOG", 4, "Friendly golden retriever who enjoys long walks.", "Tom Rivers", "tom@example.com"),
            ("Sprout", "FROG", 1, "Tiny tree frog with a calm personality.", "Lena Moss", "lena@example.com"),
        ];
        let inputs = seeds.map(|(name, species, age_years, description, breeder_name, breeder_email)| {
            CreatePetInput {
                name: name.to_string(),
                species: species.to_string(),
                age_years,
                picture_url: format!("https://images.example/{}.jpg", name.to_lowercase()),
                description: description.to_string(),
                breeder_name: breeder_name.to_string(),
                breeder_email: breeder_email.to_string(),
            }
        });
        db.seed(DEMO_SLUG, inputs)?;
        Ok(db)
    }

    /// Create each pet in order, stopping at the first invalid one.
    pub fn seed(&mut self, slug: &str, inputs: impl IntoIterator<Item = CreatePetInput>) -> Result<(), String> {
        for input in inputs {
            let name = input.name.clone();
            self.create_pet(slug, input)
                .map_err(|e| format!("seeding {name}: {e}"))?;
        }
        Ok(())
    }

    pub fn add_store(&mut self, slug: &str) {
        self.stores.entry(slug.to_string()).or_default();
    }

    pub fn add_account(&mut self, username: &str, password: &str, role: Role, store_slug: &str) {
        self.accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                role,
                store_slug: store_slug.to_string(),
            },
        );
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Option<Principal> {
        let username = username.trim();
        let account = self.accounts.get(username)?;
        (account.password == password).then(|| Principal {
            username: username.to_string(),
            role: account.role,
            store_slug: account.store_slug.clone(),
        })
    }

    pub fn pets(&self, slug: &str) -> &[Pet] {
        self.stores.get(slug).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn available_pets(&self, slug: &str) -> Vec<Pet> {
        let mut pets: Vec<Pet> = self
            .pets(slug)
            .iter()
            .filter(|p| p.purchased_at.is_none())
            .cloned()
            .collect();
        pets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        pets
    }

    pub fn purchased_pets(&self, slug: &str, customer: &str) -> Vec<Pet> {
        let mut pets: Vec<Pet> = self
            .pets(slug)
            .iter()
            .filter(|p| p.purchased_by.as_deref() == Some(customer))
            .cloned()
            .collect();
        pets.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        pets
    }

    pub fn create_pet(&mut self, slug: &str, input: CreatePetInput) -> Result<Pet, String> {
        validate_new_pet(&input)?;
        let pets = self.stores.get_mut(slug).ok_or("store not found")?;
        // Strictly increasing so newest-first ordering is stable.
        let created_at = pets
            .iter()
            .map(|p| p.created_at + Duration::milliseconds(1))
            .max()
            .map_or_else(Utc::now, |floor| floor.max(Utc::now()));
        let pet = Pet {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            species: input.species,
            age_years: input.age_years,
            picture_url: input.picture_url,
            description: input.description,
            breeder_name: input.breeder_name,
            breeder_email: input.breeder_email,
            created_at,
            purchased_at: None,
            purchased_by: None,
        };
        pets.push(pet.clone());
        Ok(pet)
    }

    /// Purchase whatever is still available; report the rest per item.
    pub fn purchase(&mut self, slug: &str, customer: &str, pet_ids: &[String]) -> Result<PurchaseResult, String> {
        if pet_ids.is_empty() {
            return Err("no pets in cart".to_string());
        }
        let pets = self.stores.get_mut(slug).ok_or("store not found")?;
        let now = Utc::now();
        let mut result = PurchaseResult::default();
        let mut seen: Vec<&str> = Vec::new();
        for id in pet_ids {
            if seen.contains(&id.as_str()) {
                continue;
            }
            seen.push(id);
            match pets.iter_mut().find(|p| &p.id == id) {
                None => result.errors.push(PurchaseError {
                    pet_name: id.clone(),
                    message: "not found".to_string(),
                }),
                Some(pet) if pet.purchased_at.is_some() => result.errors.push(PurchaseError {
                    pet_name: pet.name.clone(),
                    message: "already purchased".to_string(),
                }),
                Some(pet) => {
                    pet.purchased_at = Some(now);
                    pet.purchased_by = Some(customer.to_string());
                    result.purchased_ids.push(pet.id.clone());
                }
            }
        }
        Ok(result)
    }

    /// Resolve one request. `Ok` is the `data` object, `Err` a single message.
    pub fn execute(&mut self, principal: &Principal, request: &GraphqlRequest) -> Result<Value, String> {
        let field = root_field(&request.query).ok_or("unknown operation")?;
        let variables = request.variables.clone();
        match field {
            "storePets" => {
                let args: StoreArgs = parse_args(variables)?;
                authorize(principal, Role::Customer, Some(&args.store_slug))?;
                Ok(json!({ "storePets": self.available_pets(&args.store_slug) }))
            }
            "purchasedPets" => {
                let args: StoreArgs = parse_args(variables)?;
                authorize(principal, Role::Customer, Some(&args.store_slug))?;
                Ok(json!({ "purchasedPets": self.purchased_pets(&args.store_slug, &principal.username) }))
            }
            "purchasePets" => {
                let Input { input } = parse_args::<Input<PurchaseInput>>(variables)?;
                authorize(principal, Role::Customer, Some(&input.store_slug))?;
                let result = self.purchase(&input.store_slug, &principal.username, &input.pet_ids)?;
                Ok(json!({ "purchasePets": result }))
            }
            "createPet" => {
                let Input { input } = parse_args::<Input<CreatePetInput>>(variables)?;
                authorize(principal, Role::Merchant, None)?;
                let pet = self.create_pet(&principal.store_slug, input)?;
                Ok(json!({ "createPet": pet }))
            }
            _ => Err("unknown operation".to_string()),
        }
    }
}

fn validate_new_pet(input: &CreatePetInput) -> Result<(), String> {
    if input.name.is_empty() {
        return Err("name is required".to_string());
    }
    if input.age_years < 0 {
        return Err("age must be positive".to_string());
    }
    if input.picture_url.is_empty() {
        return Err("picture url is required".to_string());
    }
    if input.description.is_empty() {
        return Err("description is required".to_string());
    }
    if input.breeder_name.is_empty() {
        return Err("breeder name is required".to_string());
    }
    if !matches!(input.species.as_str(), "CAT" | "DOG" | "FROG") {
        return Err("invalid species".to_string());
    }
    if input.breeder_email.is_empty() {
        return Err("breeder email is required".to_string());
    }
    if !input.breeder_email.contains('@') {
        return Err("breeder email is invalid".to_string());
    }
    Ok(())
}

fn authorize(principal: &Principal, role: Role, store_slug: Option<&str>) -> Result<(), String> {
    if principal.role != role {
        return Err(match role {
            Role::Customer => "customer access required",
            Role::Merchant => "merchant access required",
        }
        .to_string());
    }
    if store_slug.is_some_and(|slug| slug != principal.store_slug) {
        return Err("store access denied".to_string());
    }
    Ok(())
}

fn parse_args<T: for<'de> Deserialize<'de>>(variables: Value) -> Result<T, String> {
    serde_json::from_value(variables).map_err(|e| format!("invalid variables: {e}"))
}

/// The first field name inside the first selection set.
pub fn root_field(query: &str) -> Option<&str> {
    let start = query.find('{')? + 1;
    let rest = query[start..].trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

/// Decode `Authorization: Basic base64(user:pass)`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(token.trim()).ok()?).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

pub fn app() -> Result<Router, String> {
    Ok(app_with(Db::seeded()?))
}

pub fn app_with(db: Db) -> Router {
    let db: SharedDb = Arc::new(RwLock::new(db));
    Router::new()
        .route("/graphql", post(graphql))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let app = app().map_err(std::io::Error::other)?;
    axum::serve(listener, app).await
}

const SECURITY_HEADERS: [(header::HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
];

async fn graphql(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(request): Json<GraphqlRequest>,
) -> Response {
    let principal = match basic_credentials(&headers) {
        Some((user, pass)) if !user.trim().is_empty() => db.read().await.authenticate(&user, &pass),
        _ => None,
    };
    let Some(principal) = principal else {
        warn!("rejected request without valid credentials");
        return (
            StatusCode::UNAUTHORIZED,
            SECURITY_HEADERS,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"petstore\"")],
            "unauthorized",
        )
            .into_response();
    };

    let outcome = db.write().await.execute(&principal, &request);
    let body = match outcome {
        Ok(data) => {
            info!(
                operation = request.operation_name.as_deref().unwrap_or("-"),
                user = %principal.username,
                "resolved"
            );
            json!({ "data": data })
        }
        Err(message) => {
            warn!(user = %principal.username, %message, "resolver error");
            json!({ "data": null, "errors": [{ "message": message }] })
        }
    };
    (SECURITY_HEADERS, Json(body)).into_response()
}
