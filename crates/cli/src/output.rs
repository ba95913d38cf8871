//! JSON rendering of slot states on stdout.

use std::io::Write;

use serde::Serialize;
use woostore_storefront::repository::LoadState;

#[derive(Serialize)]
struct SlotReport<'a, T> {
    slot: &'a str,
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a, T> SlotReport<'a, T> {
    fn new(slot: &'a str, state: &'a LoadState<T>) -> Self {
        let (name, value, error) = match state {
            LoadState::Loading => ("loading", None, None),
            LoadState::Success(value) => ("success", Some(value), None),
            LoadState::Error(error) => ("error", None, Some(error.to_string())),
        };
        Self {
            slot,
            state: name,
            value,
            error,
        }
    }
}

/// Write one slot state as a pretty JSON object followed by a newline.
pub fn emit<T: Serialize>(slot: &str, state: &LoadState<T>) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &SlotReport::new(slot, state))?;
    writeln!(out)
}
