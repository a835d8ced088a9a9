//! Client-local cart of pets pending purchase.
//!
//! Each pet is either absent or present; `toggle` flips membership and is the
//! only way in. The cart also caches the full `Pet` so the view never has to
//! look details up again. Iteration order follows identifier order, which the
//! server does not rely on.

use std::collections::BTreeMap;

use crate::types::{Pet, PetId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: BTreeMap<PetId, Pet>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `pet`. Returns `true` when the pet is now in the cart.
    pub fn toggle(&mut self, pet: &Pet) -> bool {
        if self.items.remove(&pet.id).is_some() {
            false
        } else {
            self.items.insert(pet.id.clone(), pet.clone());
            true
        }
    }

    pub fn contains(&self, id: &PetId) -> bool {
        self.items.contains_key(id)
    }

    pub fn get(&self, id: &PetId) -> Option<&Pet> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pets(&self) -> impl Iterator<Item = &Pet> {
        self.items.values()
    }

    /// The identifiers to submit at checkout.
    pub fn ids(&self) -> Vec<PetId> {
        self.items.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop the given identifiers, ignoring any not present.
    pub fn remove_ids<'a>(&mut self, ids: impl IntoIterator<Item = &'a PetId>) {
        for id in ids {
            self.items.remove(id);
        }
    }
}
