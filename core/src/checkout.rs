//! Reconciling a batch purchase outcome against the cart.
//!
//! The server may accept a subset of the submitted pets. Under the default
//! policy any per-item error means nothing is considered confirmed: the cart
//! is left as it was and the follow-up list re-fetch corrects the catalog.

use std::collections::HashSet;
use std::str::FromStr;

use tracing::{info, warn};

use crate::cart::Cart;
use crate::types::{PetId, PurchaseError, PurchaseResult};

/// How the cart is updated when a checkout reports per-item errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPolicy {
    /// Clear the cart only when there are no errors; otherwise leave it as is.
    #[default]
    KeepCartOnErrors,
    /// Always drop the identifiers the server reports as purchased.
    RemovePurchased,
}

impl FromStr for CheckoutPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" | "keep-cart-on-errors" => Ok(Self::KeepCartOnErrors),
            "remove-purchased" => Ok(Self::RemovePurchased),
            other => Err(format!("unknown checkout policy {other:?}")),
        }
    }
}

/// Message for a submitted pet the server neither purchased nor named.
pub const UNCONFIRMED_MESSAGE: &str = "purchase not confirmed";

/// What the view should show after reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutReport {
    /// Per-item errors to display, replacing any earlier list. Includes one
    /// entry per unaccounted pet.
    pub errors: Vec<PurchaseError>,
    /// Submitted identifiers the server neither purchased nor named in an error.
    pub unaccounted: Vec<PetId>,
}

impl CheckoutReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.unaccounted.is_empty()
    }
}

/// Apply a purchase result to `cart`.
///
/// `submitted` must be the identifiers sent with the purchase, captured
/// before the call so their display names are still available.
pub fn reconcile(
    cart: &mut Cart,
    submitted: &[PetId],
    result: &PurchaseResult,
    policy: CheckoutPolicy,
) -> CheckoutReport {
    let unaccounted = find_unaccounted(cart, submitted, result);
    let mut errors = result.errors.clone();
    if !unaccounted.is_empty() {
        warn!(?unaccounted, "purchase result did not mention every submitted pet");
        errors.extend(unaccounted.iter().map(|id| {
            let name = cart.get(id).map_or_else(|| id.to_string(), |pet| pet.name.clone());
            PurchaseError::new(name, UNCONFIRMED_MESSAGE)
        }));
    }

    if errors.is_empty() {
        cart.clear();
    } else if policy == CheckoutPolicy::RemovePurchased {
        cart.remove_ids(&result.purchased_ids);
    }

    info!(
        submitted = submitted.len(),
        purchased = result.purchased_ids.len(),
        failed = errors.len(),
        remaining_in_cart = cart.len(),
        "checkout reconciled"
    );

    CheckoutReport { errors, unaccounted }
}

// Errors name a pet by display name, or by identifier when the server could
// not resolve it.
fn find_unaccounted(cart: &Cart, submitted: &[PetId], result: &PurchaseResult) -> Vec<PetId> {
    let purchased: HashSet<&PetId> = result.purchased_ids.iter().collect();
    let named: HashSet<&str> = result.errors.iter().map(|e| e.pet_name.as_str()).collect();

    submitted
        .iter()
        .filter(|id| !purchased.contains(id))
        .filter(|id| {
            let by_id = named.contains(id.as_str());
            let by_name = cart
                .get(id)
                .is_some_and(|pet| named.contains(pet.name.as_str()));
            !(by_id || by_name)
        })
        .cloned()
        .collect()
}
