//! Line-oriented REPL over a single `StoreView`.

use std::io::{self, BufRead, Write};

use petstore_core::{session, PetId, PetStoreApi, Route, StoreView, Tab, Transport};

use crate::render;

const HELP: &str = "commands: open <path> | tab <store|add|history> | toggle <id> | cart | checkout | reload | quit";

pub async fn run<T, R, W>(
    view: &mut StoreView,
    api: &PetStoreApi<T>,
    input: R,
    out: &mut W,
    default_slug: &str,
) -> io::Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    render::view(out, view)?;
    prompt(out)?;
    for line in input.lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (None, _) => {}
            (Some("quit" | "exit"), _) => break,
            (Some("help"), _) => writeln!(out, "{HELP}")?,
            (Some("open"), Some(path)) => {
                let slug = Route::slug_for(path, default_slug);
                session::load(view, api, &slug).await;
                render::view(out, view)?;
            }
            (Some("tab"), Some(name)) => match name.parse::<Tab>() {
                Ok(tab) => {
                    view.select_tab(tab);
                    render::view(out, view)?;
                }
                Err(err) => writeln!(out, "{err}")?,
            },
            (Some("toggle"), Some(id)) => toggle(view, out, id)?,
            (Some("cart"), _) => render::cart(out, view.cart())?,
            (Some("checkout"), _) => {
                if !view.checkout_enabled() {
                    writeln!(out, "cart is empty")?;
                } else {
                    session::checkout(view, api).await;
                    render::view(out, view)?;
                }
            }
            (Some("reload"), _) => {
                let slug = view.slug().to_string();
                session::load(view, api, &slug).await;
                render::view(out, view)?;
            }
            _ => writeln!(out, "unrecognised input; {HELP}")?,
        }
        prompt(out)?;
    }
    view.teardown();
    Ok(())
}

fn toggle<W: Write>(view: &mut StoreView, out: &mut W, id: &str) -> io::Result<()> {
    let id = PetId::from(id);
    let Some(pet) = view.available().iter().find(|pet| pet.id == id).cloned() else {
        return writeln!(out, "no available pet {id}");
    };
    if view.toggle_cart(&pet) {
        writeln!(out, "added {} to cart", pet.name)
    } else {
        writeln!(out, "removed {} from cart", pet.name)
    }
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use std::future::{ready, Future};

    use petstore_core::{
        ApiError, CheckoutPolicy, Credentials, HttpRequest, HttpResponse, PetStoreClient,
    };
    use serde_json::{json, Value};

    use super::*;

    /// Answers every operation from a fixed store: one available pet and an
    /// always-successful purchase.
    struct FixedStore;

    impl Transport for FixedStore {
        fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> {
            let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
            let pet = json!({
                "id": "p1", "name": "Miso", "species": "CAT", "ageYears": 2,
                "pictureUrl": "https://images.example/miso.jpg", "description": "Playful kitten.",
                "breederName": "Jane Doe", "breederEmail": "jane@example.com",
                "createdAt": "2024-05-01T10:00:00Z", "purchasedAt": null
            });
            let data = match body["operationName"].as_str().unwrap() {
                "StorePets" => json!({ "storePets": [pet] }),
                "PurchasedPets" => json!({ "purchasedPets": [] }),
                "PurchasePets" => json!({ "purchasePets": { "purchasedIds": ["p1"], "errors": [] } }),
                other => panic!("unexpected operation {other}"),
            };
            ready(Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: json!({ "data": data }).to_string(),
            }))
        }
    }

    fn api() -> PetStoreApi<FixedStore> {
        let client = PetStoreClient::new(
            "http://localhost:8080/graphql",
            Credentials::new("customer_demo", "customer_demo_pw"),
            Credentials::new("merchant_demo", "merchant_demo_pw"),
        );
        PetStoreApi::new(client, FixedStore)
    }

    async fn script(view: &mut StoreView, input: &str) -> String {
        let mut out = Vec::new();
        run(view, &api(), input.as_bytes(), &mut out, "demo").await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn toggle_then_checkout_empties_cart() {
        let mut view = StoreView::new(CheckoutPolicy::default());
        let output = script(&mut view, "open /store/demo\ntoggle p1\ncart\ncheckout\nquit\n").await;

        assert!(output.contains("added Miso to cart"));
        assert!(output.contains("cart (1): Miso"));
        assert!(output.contains("cart: empty"));
        assert!(view.cart().is_empty());
    }

    #[tokio::test]
    async fn unknown_input_and_missing_pet() {
        let mut view = StoreView::new(CheckoutPolicy::default());
        let output = script(&mut view, "open /nowhere\ntoggle nope\ncheckout\ntab zoo\nfly\n").await;

        assert_eq!(view.slug(), "demo");
        assert!(output.contains("no available pet nope"));
        assert!(output.contains("cart is empty"));
        assert!(output.contains("unknown tab \"zoo\""));
        assert!(output.contains("unrecognised input"));
    }

    #[tokio::test]
    async fn tab_switch_renders_history() {
        let mut view = StoreView::new(CheckoutPolicy::default());
        let output = script(&mut view, "tab history\n").await;

        assert_eq!(view.tab(), Tab::History);
        assert!(output.contains("no purchases yet"));
    }
}
