//! CLI commands, one per screen.
//!
//! Every command prints each slot of its screen once the slot settles and
//! fails if the slot the command is about ended in an error.

pub mod browse;
pub mod search;
pub mod shop;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use woostore_core::EmailError;
use woostore_storefront::config::ConfigError;
use woostore_storefront::repository::LoadState;
use woostore_storefront::screens::Slot;
use woostore_storefront::woo::WooError;

use crate::output;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store client error: {0}")]
    Store(#[from] WooError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} did not settle")]
    Unsettled(&'static str),

    #[error("{slot} failed: {error}")]
    Slot {
        slot: &'static str,
        error: Arc<WooError>,
    },
}

/// Wait for `slot` to settle and print it.
async fn report<T>(name: &'static str, slot: &Slot<T>) -> Result<LoadState<T>, CommandError>
where
    T: Serialize + Clone,
{
    let state = slot.settled().await;
    output::emit(name, &state)?;
    Ok(state)
}

/// Like [`report`], but an `Error` state fails the command.
async fn require<T>(name: &'static str, slot: &Slot<T>) -> Result<T, CommandError>
where
    T: Serialize + Clone,
{
    match report(name, slot).await? {
        LoadState::Success(value) => Ok(value),
        LoadState::Error(error) => Err(CommandError::Slot { slot: name, error }),
        LoadState::Loading => Err(CommandError::Unsettled(name)),
    }
}
