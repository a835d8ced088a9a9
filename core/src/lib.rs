//! Client core for the pet storefront.
//!
//! # Overview
//! Builds GraphQL `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). On top of that sit
//! the cart, checkout reconciliation, and the store view state machine, all
//! deterministic. `session` drives them asynchronously through a host-supplied
//! `Transport`.
//!
//! # Design
//! - `PetStoreClient` is stateless: endpoint plus the customer and merchant
//!   credential pairs, fixed at construction from a `StoreConfig`.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit.
//! - `StoreView` hands out generation-stamped tickets for every fetch; a
//!   result whose ticket is no longer current is discarded.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod graphql;
pub mod http;
pub mod route;
pub mod session;
pub mod transport;
pub mod types;
pub mod view;

pub use auth::{Credentials, Role};
pub use cart::Cart;
pub use checkout::{CheckoutPolicy, CheckoutReport};
pub use client::PetStoreClient;
pub use config::StoreConfig;
pub use error::{ApiError, ConfigError, FormError};
pub use form::PetForm;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use route::Route;
pub use transport::{PetStoreApi, Transport};
pub use types::{NewPet, Pet, PetId, PurchaseError, PurchaseResult, Species};
pub use view::{CheckoutStep, LoadTicket, StoreView, Tab};
