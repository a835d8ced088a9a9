//! Plain-text rendering of the store view.

use std::io::{self, Write};

use petstore_core::{Cart, Pet, PetForm, StoreView, Tab};

pub fn view<W: Write>(out: &mut W, view: &StoreView) -> io::Result<()> {
    writeln!(out, "== store {} :: {} ==", view.slug(), tab_label(view.tab()))?;
    if view.is_loading() {
        writeln!(out, "loading...")?;
    }
    if let Some(err) = view.error() {
        writeln!(out, "error: {err}")?;
    }

    match view.tab() {
        Tab::Store => {
            if view.available().is_empty() {
                writeln!(out, "no pets available")?;
            }
            for pet in view.available() {
                let mark = if view.cart().contains(&pet.id) { "x" } else { " " };
                writeln!(out, "[{mark}] {}", pet_line(pet))?;
            }
            cart(out, view.cart())?;
            for err in view.visible_checkout_errors() {
                writeln!(out, "! {err}")?;
            }
        }
        Tab::History => {
            if view.purchased().is_empty() {
                writeln!(out, "no purchases yet")?;
            }
            for pet in view.purchased() {
                match pet.purchased_at {
                    Some(at) => writeln!(out, "{}  bought {}", pet_line(pet), at.format("%Y-%m-%d %H:%M"))?,
                    None => writeln!(out, "{}", pet_line(pet))?,
                }
            }
        }
        Tab::Add => writeln!(out, "add a pet with `petstore add --name ...`")?,
    }
    Ok(())
}

pub fn cart<W: Write>(out: &mut W, cart: &Cart) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "cart: empty");
    }
    let names: Vec<&str> = cart.pets().map(|pet| pet.name.as_str()).collect();
    writeln!(out, "cart ({}): {}", cart.len(), names.join(", "))
}

pub fn form<W: Write>(out: &mut W, form: &PetForm) -> io::Result<()> {
    if let Some(success) = &form.success {
        writeln!(out, "{success}")?;
    }
    if let Some(err) = &form.error {
        writeln!(out, "error: {err}")?;
    }
    Ok(())
}

fn pet_line(pet: &Pet) -> String {
    format!(
        "{}  {} ({}, {}y) from {}: {}",
        pet.id, pet.name, pet.species, pet.age_years, pet.breeder_name, pet.description
    )
}

fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Store => "purchase",
        Tab::Add => "add pet",
        Tab::History => "history",
    }
}
