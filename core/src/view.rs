//! Store view state: the loading → ready → (error) lifecycle for one store.
//!
//! # Design
//! Like the client, the view never performs I/O. Every fetch is started with
//! a ticket stamped with the view's generation; results are handed back with
//! that ticket and applied only if no newer load (or teardown) has happened
//! in between. This is what keeps a slow response for a previous store from
//! overwriting the state of the current one.

use tracing::{debug, info, warn};

use crate::cart::Cart;
use crate::checkout::{self, CheckoutPolicy, CheckoutReport};
use crate::error::ApiError;
use crate::types::{Pet, PetId, PurchaseError, PurchaseResult};

/// Available pets and purchased pets, in that order.
pub type PetLists = (Vec<Pet>, Vec<Pet>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Store,
    Add,
    History,
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" | "purchase" => Ok(Tab::Store),
            "add" => Ok(Tab::Add),
            "history" => Ok(Tab::History),
            other => Err(format!("unknown tab {other:?}")),
        }
    }
}

/// Proof that a fetch was started for a given store at a given generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    slug: String,
}

impl LoadTicket {
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

/// A checkout in flight: the identifiers submitted, captured up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutTicket {
    load: LoadTicket,
    pet_ids: Vec<PetId>,
}

impl CheckoutTicket {
    pub fn slug(&self) -> &str {
        self.load.slug()
    }

    pub fn pet_ids(&self) -> &[PetId] {
        &self.pet_ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    /// The purchase call returned; both lists must now be re-fetched.
    Refresh {
        ticket: LoadTicket,
        report: CheckoutReport,
    },
    /// The purchase call itself failed. Nothing to re-fetch.
    Failed,
    /// The view moved on while the call was in flight; result dropped.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct StoreView {
    slug: String,
    generation: u64,
    loading: bool,
    error: Option<String>,
    available: Vec<Pet>,
    purchased: Vec<Pet>,
    cart: Cart,
    checkout_errors: Vec<PurchaseError>,
    tab: Tab,
    policy: CheckoutPolicy,
}

impl StoreView {
    pub fn new(policy: CheckoutPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn available(&self) -> &[Pet] {
        &self.available
    }

    pub fn purchased(&self) -> &[Pet] {
        &self.purchased
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn checkout_errors(&self) -> &[PurchaseError] {
        &self.checkout_errors
    }

    /// Checkout errors are only shown alongside the store tab.
    pub fn visible_checkout_errors(&self) -> &[PurchaseError] {
        if self.tab == Tab::Store {
            &self.checkout_errors
        } else {
            &[]
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn policy(&self) -> CheckoutPolicy {
        self.policy
    }

    pub fn toggle_cart(&mut self, pet: &Pet) -> bool {
        self.cart.toggle(pet)
    }

    pub fn checkout_enabled(&self) -> bool {
        !self.cart.is_empty()
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Start loading `slug`. Any ticket issued before this one goes stale.
    pub fn begin_load(&mut self, slug: &str) -> LoadTicket {
        self.generation += 1;
        self.slug = slug.to_string();
        self.loading = true;
        debug!(slug, generation = self.generation, "store load started");
        self.refresh_ticket()
    }

    /// Apply a load result. Returns `false` if the ticket was stale and the
    /// result was discarded.
    pub fn finish_load(&mut self, ticket: &LoadTicket, result: Result<PetLists, ApiError>) -> bool {
        if !self.is_current(ticket) {
            warn!(
                slug = ticket.slug(),
                current = %self.slug,
                "discarding stale store load"
            );
            return false;
        }
        match result {
            Ok((available, purchased)) => {
                info!(
                    slug = %self.slug,
                    available = available.len(),
                    purchased = purchased.len(),
                    "store loaded"
                );
                self.available = available;
                self.purchased = purchased;
                self.error = None;
            }
            Err(err) => {
                warn!(slug = %self.slug, error = %err, "store load failed");
                self.error = Some(err.to_string());
            }
        }
        self.loading = false;
        true
    }

    /// The view is going away; every in-flight ticket becomes stale.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    /// A ticket for re-fetching the current store without a new load cycle.
    pub fn refresh_ticket(&self) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            slug: self.slug.clone(),
        }
    }

    /// `None` when the cart is empty: checkout is not offered.
    pub fn begin_checkout(&mut self) -> Option<CheckoutTicket> {
        if self.cart.is_empty() {
            return None;
        }
        self.checkout_errors.clear();
        Some(CheckoutTicket {
            load: self.refresh_ticket(),
            pet_ids: self.cart.ids(),
        })
    }

    pub fn finish_checkout(
        &mut self,
        ticket: CheckoutTicket,
        result: Result<PurchaseResult, ApiError>,
    ) -> CheckoutStep {
        if !self.is_current(&ticket.load) {
            warn!(slug = ticket.slug(), "discarding stale checkout result");
            return CheckoutStep::Stale;
        }
        match result {
            Ok(result) => {
                let report = checkout::reconcile(&mut self.cart, &ticket.pet_ids, &result, self.policy);
                self.checkout_errors = report.errors.clone();
                CheckoutStep::Refresh {
                    ticket: ticket.load,
                    report,
                }
            }
            Err(err) => {
                warn!(error = %err, "checkout request failed");
                self.checkout_errors = vec![PurchaseError::checkout_failure(err.to_string())];
                CheckoutStep::Failed
            }
        }
    }

    /// Apply the post-checkout re-fetch. Lists that arrived are applied even
    /// if the other failed; a failure replaces the checkout errors with a
    /// single synthetic entry.
    pub fn finish_refresh(
        &mut self,
        ticket: &LoadTicket,
        available: Result<Vec<Pet>, ApiError>,
        purchased: Result<Vec<Pet>, ApiError>,
    ) -> bool {
        if !self.is_current(ticket) {
            warn!(slug = ticket.slug(), "discarding stale refresh");
            return false;
        }
        let mut failure = None;
        match available {
            Ok(pets) => self.available = pets,
            Err(err) => failure = Some(err),
        }
        match purchased {
            Ok(pets) => self.purchased = pets,
            Err(err) => failure = failure.or(Some(err)),
        }
        if let Some(err) = failure {
            warn!(error = %err, "refresh after checkout failed");
            self.checkout_errors = vec![PurchaseError::checkout_failure(err.to_string())];
        }
        true
    }

    /// Apply a re-fetch of the available list only (after creating a pet).
    pub fn finish_available_refresh(&mut self, ticket: &LoadTicket, available: Result<Vec<Pet>, ApiError>) -> bool {
        if !self.is_current(ticket) {
            warn!(slug = ticket.slug(), "discarding stale refresh");
            return false;
        }
        match available {
            Ok(pets) => {
                self.available = pets;
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::pet;

    fn loaded(slug: &str, available: Vec<Pet>) -> StoreView {
        let mut view = StoreView::new(CheckoutPolicy::KeepCartOnErrors);
        let ticket = view.begin_load(slug);
        assert!(view.finish_load(&ticket, Ok((available, Vec::new()))));
        view
    }

    #[test]
    fn new_view_starts_on_store_tab_with_nothing_loaded() {
        let view = StoreView::new(CheckoutPolicy::default());
        assert_eq!(view.tab(), Tab::Store);
        assert!(!view.is_loading());
        assert!(view.available().is_empty());
        assert!(!view.checkout_enabled());
    }

    #[test]
    fn load_success_populates_lists_and_clears_error() {
        let mut view = StoreView::new(CheckoutPolicy::default());
        let ticket = view.begin_load("demo");
        assert!(view.is_loading());
        view.finish_load(&ticket, Err(ApiError::NoData));
        assert_eq!(view.error(), Some("no data returned"));
        assert!(!view.is_loading());

        let ticket = view.begin_load("demo");
        view.finish_load(&ticket, Ok((vec![pet("a", "A")], vec![pet("b", "B")])));
        assert!(view.error().is_none());
        assert!(!view.is_loading());
        assert_eq!(view.available().len(), 1);
        assert_eq!(view.purchased().len(), 1);
    }

    #[test]
    fn stale_load_does_not_overwrite_newer_store() {
        let mut view = StoreView::new(CheckoutPolicy::default());
        let old = view.begin_load("old");
        let new = view.begin_load("new");

        assert!(view.finish_load(&new, Ok((vec![pet("n", "New")], Vec::new()))));
        assert!(!view.finish_load(&old, Ok((vec![pet("o", "Old")], Vec::new()))));

        assert_eq!(view.slug(), "new");
        assert_eq!(view.available()[0].id, PetId::from("n"));
    }

    #[test]
    fn stale_failure_does_not_set_error_or_stop_loading() {
        let mut view = StoreView::new(CheckoutPolicy::default());
        let old = view.begin_load("old");
        let _new = view.begin_load("new");
        assert!(!view.finish_load(&old, Err(ApiError::NoData)));
        assert!(view.error().is_none());
        assert!(view.is_loading());
    }

    #[test]
    fn teardown_invalidates_in_flight_loads() {
        let mut view = StoreView::new(CheckoutPolicy::default());
        let ticket = view.begin_load("demo");
        view.teardown();
        assert!(!view.finish_load(&ticket, Ok((vec![pet("a", "A")], Vec::new()))));
        assert!(view.available().is_empty());
    }

    #[test]
    fn tab_switch_has_no_side_effects() {
        let mut view = loaded("demo", vec![pet("a", "A")]);
        view.toggle_cart(&pet("a", "A"));
        let before = (view.available().to_vec(), view.cart().clone());
        for tab in [Tab::Add, Tab::History, Tab::Store] {
            view.select_tab(tab);
            assert_eq!(view.tab(), tab);
        }
        assert_eq!((view.available().to_vec(), view.cart().clone()), before);
    }

    #[test]
    fn empty_cart_offers_no_checkout() {
        let mut view = loaded("demo", vec![pet("a", "A")]);
        assert!(view.begin_checkout().is_none());
    }

    #[test]
    fn checkout_ticket_captures_cart_ids_and_clears_old_errors() {
        let mut view = loaded("demo", vec![pet("a", "A"), pet("b", "B")]);
        view.toggle_cart(&pet("a", "A"));
        view.toggle_cart(&pet("b", "B"));
        let ticket = view.begin_checkout().unwrap();
        view.finish_checkout(ticket, Err(ApiError::NoData));
        assert_eq!(view.checkout_errors().len(), 1);

        let ticket = view.begin_checkout().unwrap();
        assert!(view.checkout_errors().is_empty());
        assert_eq!(ticket.slug(), "demo");
        assert_eq!(ticket.pet_ids(), &[PetId::from("a"), PetId::from("b")]);
    }

    #[test]
    fn clean_checkout_clears_cart_and_requests_refresh() {
        let mut view = loaded("demo", vec![pet("a", "A"), pet("b", "B")]);
        view.toggle_cart(&pet("a", "A"));
        view.toggle_cart(&pet("b", "B"));
        let ticket = view.begin_checkout().unwrap();
        let step = view.finish_checkout(
            ticket,
            Ok(PurchaseResult {
                purchased_ids: vec![PetId::from("a"), PetId::from("b")],
                errors: Vec::new(),
            }),
        );
        assert!(matches!(step, CheckoutStep::Refresh { .. }));
        assert!(view.cart().is_empty());
        assert!(view.checkout_errors().is_empty());
    }

    #[test]
    fn partial_failure_keeps_cart_and_replaces_errors() {
        let mut view = loaded("demo", vec![pet("a", "A"), pet("b", "B")]);
        view.toggle_cart(&pet("a", "A"));
        view.toggle_cart(&pet("b", "B"));
        let before = view.cart().ids();
        let ticket = view.begin_checkout().unwrap();
        let step = view.finish_checkout(
            ticket,
            Ok(PurchaseResult {
                purchased_ids: vec![PetId::from("a")],
                errors: vec![PurchaseError::new("B", "already sold")],
            }),
        );
        assert!(matches!(step, CheckoutStep::Refresh { .. }));
        assert_eq!(view.cart().ids(), before);
        assert_eq!(view.checkout_errors(), &[PurchaseError::new("B", "already sold")]);
    }

    #[test]
    fn pet_missing_from_result_is_shown_and_stays_in_cart() {
        let mut view = loaded("demo", vec![pet("a", "A"), pet("b", "B")]);
        view.toggle_cart(&pet("a", "A"));
        view.toggle_cart(&pet("b", "B"));
        let before = view.cart().ids();
        let ticket = view.begin_checkout().unwrap();
        let step = view.finish_checkout(
            ticket,
            Ok(PurchaseResult {
                purchased_ids: vec![PetId::from("a")],
                errors: Vec::new(),
            }),
        );
        let CheckoutStep::Refresh { report, .. } = step else {
            panic!("expected a refresh step");
        };
        assert!(!report.is_clean());
        assert_eq!(view.cart().ids(), before);
        assert_eq!(
            view.visible_checkout_errors(),
            &[PurchaseError::new("B", checkout::UNCONFIRMED_MESSAGE)]
        );
    }

    #[test]
    fn request_failure_yields_one_synthetic_error_and_keeps_cart() {
        let mut view = loaded("demo", vec![pet("a", "A")]);
        view.toggle_cart(&pet("a", "A"));
        let ticket = view.begin_checkout().unwrap();
        let step = view.finish_checkout(
            ticket,
            Err(ApiError::Status {
                status: 502,
                body: String::new(),
            }),
        );
        assert_eq!(step, CheckoutStep::Failed);
        assert_eq!(view.cart().len(), 1);
        assert_eq!(
            view.checkout_errors(),
            &[PurchaseError::checkout_failure("request failed (502)")]
        );
    }

    #[test]
    fn checkout_result_after_navigation_is_stale() {
        let mut view = loaded("demo", vec![pet("a", "A")]);
        view.toggle_cart(&pet("a", "A"));
        let ticket = view.begin_checkout().unwrap();
        view.begin_load("uptown");
        let step = view.finish_checkout(ticket, Ok(PurchaseResult::default()));
        assert_eq!(step, CheckoutStep::Stale);
        assert_eq!(view.cart().len(), 1);
    }

    #[test]
    fn refresh_applies_what_arrived_and_reports_failure() {
        let mut view = loaded("demo", vec![pet("a", "A")]);
        let ticket = view.refresh_ticket();
        view.finish_refresh(&ticket, Ok(Vec::new()), Err(ApiError::NoData));
        assert!(view.available().is_empty());
        assert_eq!(
            view.checkout_errors(),
            &[PurchaseError::checkout_failure("no data returned")]
        );
    }

    #[test]
    fn checkout_errors_only_visible_on_store_tab() {
        let mut view = loaded("demo", vec![pet("a", "A")]);
        view.toggle_cart(&pet("a", "A"));
        let ticket = view.begin_checkout().unwrap();
        view.finish_checkout(ticket, Err(ApiError::NoData));
        assert_eq!(view.visible_checkout_errors().len(), 1);
        view.select_tab(Tab::History);
        assert!(view.visible_checkout_errors().is_empty());
    }

    #[test]
    fn available_refresh_failure_sets_banner() {
        let mut view = loaded("demo", vec![pet("a", "A")]);
        let ticket = view.refresh_ticket();
        view.finish_available_refresh(&ticket, Err(ApiError::Transport("refused".to_string())));
        assert_eq!(view.error(), Some("transport failed: refused"));
        assert_eq!(view.available().len(), 1);
    }

    #[test]
    fn available_refresh_success_clears_old_banner() {
        let mut view = StoreView::new(CheckoutPolicy::default());
        let ticket = view.begin_load("demo");
        view.finish_load(&ticket, Err(ApiError::NoData));
        assert_eq!(view.error(), Some("no data returned"));

        let ticket = view.refresh_ticket();
        assert!(view.finish_available_refresh(&ticket, Ok(vec![pet("a", "A")])));
        assert_eq!(view.error(), None);
        assert_eq!(view.available().len(), 1);
    }

    #[test]
    fn tab_parses_from_names() {
        assert_eq!("history".parse::<Tab>().unwrap(), Tab::History);
        assert!("settings".parse::<Tab>().is_err());
    }
}
