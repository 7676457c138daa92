pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::Settings;

pub use adapters::LocalStorage;
pub use core::{
    catalog::CatalogStore,
    clock::Clock,
    ledger::{LoanEntry, LoanLedger},
    library::Library,
    persistence::{LoadOutcome, Persistence, RestoreReport, Snapshot},
};
pub use utils::error::{LibraryError, Result};
