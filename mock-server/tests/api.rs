use axum::http::{self, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine};
use http_body_util::BodyExt;
use mock_server::{app, CUSTOMER, MERCHANT};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn basic((user, pass): (&str, &str)) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
}

fn graphql_request(auth: Option<(&str, &str)>, query: &str, variables: Value) -> Request<String> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(creds) = auth {
        builder = builder.header(http::header::AUTHORIZATION, basic(creds));
    }
    builder
        .body(json!({ "query": query, "variables": variables }).to_string())
        .unwrap()
}

const STORE_PETS: &str = "query StorePets($storeSlug: String!) { storePets(storeSlug: $storeSlug) { id name } }";
const PURCHASED_PETS: &str = "query PurchasedPets($storeSlug: String!) { purchasedPets(storeSlug: $storeSlug) { id name } }";
const PURCHASE_PETS: &str = "mutation PurchasePets($input: PurchasePetsInput!) { purchasePets(input: $input) { purchasedIds errors { petName message } } }";
const CREATE_PET: &str = "mutation CreatePet($input: CreatePetInput!) { createPet(input: $input) { id } }";

// --- auth ---

#[tokio::test]
async fn missing_credentials_return_401() {
    let resp = app().unwrap()
        .oneshot(graphql_request(None, STORE_PETS, json!({ "storeSlug": "demo" })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(http::header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"petstore\""
    );
    assert_eq!(body_bytes(resp).await, "unauthorized");
}

#[tokio::test]
async fn wrong_password_returns_401() {
    let resp = app().unwrap()
        .oneshot(graphql_request(
            Some((CUSTOMER.0, "wrong")),
            STORE_PETS,
            json!({ "storeSlug": "demo" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let resp = app().unwrap()
        .oneshot(graphql_request(Some(CUSTOMER), STORE_PETS, json!({ "storeSlug": "demo" })))
        .await
        .unwrap();

    assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(resp.headers().get("x-frame-options").unwrap(), "DENY");
    assert_eq!(resp.headers().get("referrer-policy").unwrap(), "no-referrer");
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let resp = app().unwrap()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/graphql")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header(http::header::AUTHORIZATION, basic(CUSTOMER))
                .body(r#"{"not_query":1}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- queries ---

#[tokio::test]
async fn store_pets_lists_seeded_pets() {
    let resp = app().unwrap()
        .oneshot(graphql_request(Some(CUSTOMER), STORE_PETS, json!({ "storeSlug": "demo" })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body.get("errors").is_none());
    assert_eq!(body["data"]["storePets"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn merchant_cannot_browse_as_customer() {
    let resp = app().unwrap()
        .oneshot(graphql_request(Some(MERCHANT), STORE_PETS, json!({ "storeSlug": "demo" })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["data"].is_null());
    assert_eq!(body["errors"][0]["message"], "customer access required");
}

#[tokio::test]
async fn unknown_root_field_is_an_error() {
    let resp = app().unwrap()
        .oneshot(graphql_request(Some(CUSTOMER), "{ merchantPets { id } }", json!({})))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["message"], "unknown operation");
}

// --- full purchase lifecycle ---

#[tokio::test]
async fn purchase_lifecycle() {
    use tower::Service;

    let mut app = app().unwrap().into_service();

    // list available
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(graphql_request(Some(CUSTOMER), STORE_PETS, json!({ "storeSlug": "demo" })))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let pets = body["data"]["storePets"].as_array().unwrap().clone();
    let first = pets[0]["id"].as_str().unwrap().to_string();
    let first_name = pets[0]["name"].as_str().unwrap().to_string();

    // buy one plus an unknown id
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(graphql_request(
            Some(CUSTOMER),
            PURCHASE_PETS,
            json!({ "input": { "storeSlug": "demo", "petIds": [first, "missing"] } }),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let result = &body["data"]["purchasePets"];
    assert_eq!(result["purchasedIds"], json!([first]));
    assert_eq!(result["errors"], json!([{ "petName": "missing", "message": "not found" }]));

    // buy it again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(graphql_request(
            Some(CUSTOMER),
            PURCHASE_PETS,
            json!({ "input": { "storeSlug": "demo", "petIds": [first] } }),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(
        body["data"]["purchasePets"]["errors"],
        json!([{ "petName": first_name, "message": "already purchased" }])
    );

    // available shrinks, history grows
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(graphql_request(Some(CUSTOMER), STORE_PETS, json!({ "storeSlug": "demo" })))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["storePets"].as_array().unwrap().len(), 2);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(graphql_request(Some(CUSTOMER), PURCHASED_PETS, json!({ "storeSlug": "demo" })))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let history = body["data"]["purchasedPets"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], first.as_str());
    assert!(history[0]["purchasedAt"].is_string());

    // merchant adds a pet; it shows up first
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(graphql_request(
            Some(MERCHANT),
            CREATE_PET,
            json!({ "input": {
                "name": "Pickle", "species": "FROG", "ageYears": 2,
                "pictureUrl": "https://images.example/pickle.jpg",
                "description": "Very green.", "breederName": "Lena Moss",
                "breederEmail": "lena@example.com"
            } }),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let created = &body["data"]["createPet"];
    assert_eq!(created["name"], "Pickle");
    assert!(created["purchasedAt"].is_null());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(graphql_request(Some(CUSTOMER), STORE_PETS, json!({ "storeSlug": "demo" })))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["storePets"][0]["name"], "Pickle");
}

#[tokio::test]
async fn empty_purchase_is_an_application_error() {
    let resp = app().unwrap()
        .oneshot(graphql_request(
            Some(CUSTOMER),
            PURCHASE_PETS,
            json!({ "input": { "storeSlug": "demo", "petIds": [] } }),
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["message"], "no pets in cart");
}
