//! Add-pet form state.
//!
//! Mirrors what the storefront form enforces before anything is sent; the
//! server still validates on its own.

use tracing::info;

use crate::error::{ApiError, FormError};
use crate::types::{NewPet, Pet};

pub const CREATED_MESSAGE: &str = "Pet created successfully.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
    pub draft: NewPet,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl PetForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear messages and validate the draft. Returns the payload to send.
    pub fn begin_submit(&mut self) -> Result<NewPet, FormError> {
        self.error = None;
        self.success = None;
        if let Err(err) = validate(&self.draft) {
            self.error = Some(err.to_string());
            return Err(err);
        }
        Ok(self.draft.clone())
    }

    pub fn finish_submit(&mut self, result: Result<Pet, ApiError>) {
        match result {
            Ok(pet) => {
                info!(id = %pet.id, name = %pet.name, "pet created");
                self.success = Some(CREATED_MESSAGE.to_string());
                self.draft = NewPet::default();
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }
}

pub fn validate(input: &NewPet) -> Result<(), FormError> {
    let required = [
        ("name", &input.name),
        ("picture url", &input.picture_url),
        ("description", &input.description),
        ("breeder name", &input.breeder_name),
        ("breeder email", &input.breeder_email),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(FormError::Required(field));
        }
    }
    if !input.breeder_email.contains('@') {
        return Err(FormError::InvalidEmail);
    }
    Ok(())
}
