//! Async orchestration of the store view against a live API.
//!
//! Suspension points are exactly the network calls. Within a checkout the
//! purchase strictly precedes the two re-fetches, which run concurrently and
//! both complete before the view is updated.

use crate::checkout::CheckoutReport;
use crate::error::{ApiError, FormError};
use crate::form::PetForm;
use crate::transport::{PetStoreApi, Transport};
use crate::types::Pet;
use crate::view::{CheckoutStep, PetLists, StoreView};

/// Fetch both lists for `store_slug` concurrently.
pub async fn fetch_lists<T: Transport>(api: &PetStoreApi<T>, store_slug: &str) -> Result<PetLists, ApiError> {
    let (available, purchased) = tokio::join!(api.store_pets(store_slug), api.purchased_pets(store_slug));
    Ok((available?, purchased?))
}

/// Enter loading for `store_slug` and apply the result. Returns `false` if
/// the result went stale before it arrived.
pub async fn load<T: Transport>(view: &mut StoreView, api: &PetStoreApi<T>, store_slug: &str) -> bool {
    let ticket = view.begin_load(store_slug);
    let result = fetch_lists(api, ticket.slug()).await;
    view.finish_load(&ticket, result)
}

/// Submit the cart and reconcile. Returns `None` when checkout was not
/// offered (empty cart) or the purchase call itself failed.
pub async fn checkout<T: Transport>(view: &mut StoreView, api: &PetStoreApi<T>) -> Option<CheckoutReport> {
    let ticket = view.begin_checkout()?;
    let result = api.purchase_pets(ticket.slug(), ticket.pet_ids()).await;
    match view.finish_checkout(ticket, result) {
        CheckoutStep::Refresh { ticket, report } => {
            let (available, purchased) =
                tokio::join!(api.store_pets(ticket.slug()), api.purchased_pets(ticket.slug()));
            view.finish_refresh(&ticket, available, purchased);
            Some(report)
        }
        CheckoutStep::Failed | CheckoutStep::Stale => None,
    }
}

/// Validate and send the add-pet form, then re-fetch the available list.
/// Returns the created pet, `None` if the server rejected it.
pub async fn submit_pet_form<T: Transport>(
    view: &mut StoreView,
    form: &mut PetForm,
    api: &PetStoreApi<T>,
) -> Result<Option<Pet>, FormError> {
    let input = form.begin_submit()?;
    let result = api.create_pet(&input).await;
    let created = result.as_ref().ok().cloned();
    form.finish_submit(result);
    if created.is_some() {
        let ticket = view.refresh_ticket();
        let available = api.store_pets(ticket.slug()).await;
        view.finish_available_refresh(&ticket, available);
    }
    Ok(created)
}
