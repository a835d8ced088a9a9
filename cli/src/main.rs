//! `petstore`: command-line host for the pet storefront.
//!
//! Executes requests with ureq and renders the store view as text, either
//! once per subcommand or interactively through `shell`.

mod render;
mod shell;
mod transport;

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use petstore_core::{
    session, NewPet, PetForm, PetId, PetStoreApi, PetStoreClient, Route, Species, StoreConfig, StoreView, Tab,
};
use tracing_subscriber::EnvFilter;

use crate::transport::UreqTransport;

/// Browse, buy and list pets in a store
#[derive(Debug, Parser)]
#[command(name = "petstore", version)]
struct Cli {
    /// Store route to open, e.g. `/store/demo`
    #[arg(long, global = true, default_value = "/")]
    path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the pets available for purchase
    Browse,
    /// List the pets you have bought
    History,
    /// Put the given pets in the cart and check out
    Buy {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Register a new pet (merchant)
    Add(AddArgs),
    /// Interactive session
    Shell,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long, default_value_t)]
    name: String,

    #[arg(long, default_value = "CAT")]
    species: Species,

    #[arg(long, default_value_t = 1)]
    age: u32,

    #[arg(long, default_value_t)]
    picture_url: String,

    #[arg(long, default_value_t)]
    description: String,

    #[arg(long, default_value_t)]
    breeder_name: String,

    #[arg(long, default_value_t)]
    breeder_email: String,
}

impl From<AddArgs> for NewPet {
    fn from(args: AddArgs) -> Self {
        Self {
            name: args.name,
            species: args.species,
            age_years: args.age,
            picture_url: args.picture_url,
            description: args.description,
            breeder_name: args.breeder_name,
            breeder_email: args.breeder_email,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StoreConfig::from_env().context("invalid configuration")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli, config))
}

async fn run(cli: Cli, config: StoreConfig) -> Result<()> {
    let slug = Route::slug_for(&cli.path, &config.default_store_slug);
    let api = PetStoreApi::new(PetStoreClient::from_config(&config), UreqTransport::new());
    let mut view = StoreView::new(config.checkout_policy);
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Browse => {
            session::load(&mut view, &api, &slug).await;
            render::view(&mut out, &view)?;
        }
        Command::History => {
            view.select_tab(Tab::History);
            session::load(&mut view, &api, &slug).await;
            render::view(&mut out, &view)?;
        }
        Command::Buy { ids } => {
            session::load(&mut view, &api, &slug).await;
            if let Some(err) = view.error() {
                bail!("could not load store {slug}: {err}");
            }
            for id in ids {
                let id = PetId::new(id);
                let pet = view
                    .available()
                    .iter()
                    .find(|pet| pet.id == id)
                    .cloned()
                    .with_context(|| format!("pet {id} is not available in store {slug}"))?;
                if !view.cart().contains(&pet.id) {
                    view.toggle_cart(&pet);
                }
            }
            let report = session::checkout(&mut view, &api).await;
            render::view(&mut out, &view)?;
            match report {
                Some(report) if report.is_clean() => {}
                _ => bail!("checkout did not complete cleanly"),
            }
        }
        Command::Add(args) => {
            view.select_tab(Tab::Add);
            session::load(&mut view, &api, &slug).await;
            let mut form = PetForm::new();
            form.draft = args.into();
            let created = session::submit_pet_form(&mut view, &mut form, &api).await;
            render::form(&mut out, &form)?;
            if let Some(pet) = created? {
                writeln!(out, "{}  {}", pet.id, pet.name)?;
            } else {
                bail!("pet was not created");
            }
        }
        Command::Shell => {
            session::load(&mut view, &api, &slug).await;
            let stdin = io::stdin().lock();
            shell::run(&mut view, &api, stdin, &mut out, &config.default_store_slug).await?;
        }
    }
    Ok(())
}
