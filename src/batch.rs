// Runs one operation per input item, strictly in order. A failing item is
// recorded in its own slot and the loop moves on; only problems that stop the
// batch from starting at all are returned as errors.

use std::error::Error as StdError;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::decode::{Decoded, StandardResponse};
use crate::error::{Error, Result};

/// Outcome of one item, kept in the item's input position.
#[derive(Debug)]
pub struct BatchResult<I, T> {
    pub index: usize,
    pub item: I,
    pub outcome: Result<Decoded<T>>,
}

impl<I, T> BatchResult<I, T> {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Ok(Decoded::Success(_)))
    }

    pub fn is_remote_error(&self) -> bool {
        matches!(self.outcome, Ok(Decoded::Failure(_)))
    }

    /// Printable summary of this item.
    pub fn report(&self) -> ItemReport<'_, I, T> {
        let outcome = match &self.outcome {
            Ok(Decoded::Success(response)) => Outcome::Success { response },
            Ok(Decoded::Failure(response)) => Outcome::RemoteError { response },
            Ok(Decoded::Malformed { status, body }) => Outcome::Malformed {
                status: *status,
                body,
            },
            Err(err) => Outcome::Failed {
                error: error_chain(err),
            },
        };
        ItemReport {
            index: self.index,
            item: &self.item,
            outcome,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemReport<'a, I, T> {
    pub index: usize,
    pub item: &'a I,
    #[serde(flatten)]
    pub outcome: Outcome<'a, T>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome<'a, T> {
    Success { response: &'a T },
    RemoteError { response: &'a StandardResponse },
    Malformed { status: u16, body: &'a str },
    Failed { error: String },
}

fn error_chain(err: &Error) -> String {
    let mut message = err.to_string();
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = StdError::source(cause);
    }
    message
}

/// Apply `op` to every item in order, one call per item.
pub fn run<I, T, F>(items: Vec<I>, op: F) -> Vec<BatchResult<I, T>>
where
    F: FnMut(&I) -> Result<Decoded<T>>,
{
    run_observed(items, op, |_, _| {})
}

/// [`run`], calling `observe(done, total)` after each item.
pub fn run_observed<I, T, F, O>(items: Vec<I>, mut op: F, mut observe: O) -> Vec<BatchResult<I, T>>
where
    F: FnMut(&I) -> Result<Decoded<T>>,
    O: FnMut(usize, usize),
{
    let total = items.len();
    let mut results = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        let outcome = op(&item);
        debug!(
            index,
            ok = matches!(outcome, Ok(Decoded::Success(_))),
            "batch item done"
        );
        results.push(BatchResult {
            index,
            item,
            outcome,
        });
        observe(index + 1, total);
    }
    results
}

/// Read one item per non-blank line of `path`, trimmed. An unreadable file is
/// fatal to the batch.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::BatchInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}
