//! Splitting work across concurrent cloud jobs.
//!
//! Sharded suites are distributed over the account's concurrency budget with
//! [`bin_pack`], a round-robin bin packer. The same function splits spec
//! files, test names read from a list file, and Cucumber scenario names.
//!
//! # Example
//!
//! ```
//! use saucectl::concurrency::bin_pack;
//!
//! let bins = bin_pack(&["1", "2", "3", "4", "5"], 3);
//! assert_eq!(bins, vec![vec!["1", "4"], vec!["2", "5"], vec!["3"]]);
//! ```

use tracing::warn;

/// Splits `items` into at most `n` bins using round-robin distribution.
///
/// Bin `i` receives the items at indices `i`, `i + n`, `i + 2n`, ... so bin
/// sizes differ by at most one and the relative order of items inside a bin
/// follows the input order.
///
/// * `n <= 1` returns a single bin holding every item in input order.
/// * `n > items.len()` is clamped to `items.len()`, one item per bin.
///
/// The result is a pure function of `(items, n)`. Callers that need
/// reproducible shards across machines must sort `items` first.
pub fn bin_pack<T: Clone>(items: &[T], n: usize) -> Vec<Vec<T>> {
    if n <= 1 {
        return vec![items.to_vec()];
    }

    let n = n.min(items.len());
    let mut bins: Vec<Vec<T>> = (0..n).map(|_| Vec::new()).collect();

    for (i, item) in items.iter().enumerate() {
        bins[i % n].push(item.clone());
    }

    bins
}

/// Source of the concurrency an account is allowed to use.
///
/// The real implementation lives with the REST clients; this crate only
/// needs the number.
pub trait ConcurrencyReader {
    /// Returns the maximum number of concurrent jobs allowed.
    fn allowed_concurrency(&self) -> anyhow::Result<usize>;
}

/// A fixed concurrency limit, e.g. taken from the project configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedLimit(pub usize);

impl ConcurrencyReader for FixedLimit {
    fn allowed_concurrency(&self) -> anyhow::Result<usize> {
        Ok(self.0)
    }
}

/// Clamps `requested` to the concurrency allowed by `reader`.
///
/// If the limit cannot be read, a concurrency of 1 is used.
pub fn min(reader: &dyn ConcurrencyReader, requested: usize) -> usize {
    match reader.allowed_concurrency() {
        Ok(allowed) => requested.min(allowed),
        Err(e) => {
            warn!(error = %e, "Unable to read allowed concurrency, defaulting to 1");
            1
        }
    }
}
