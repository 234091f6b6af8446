//! Offset/size pagination over listing endpoints
//!
//! ```text
//! size = 25, batch = 10
//! page 0: limit 10 offset 0   -> 10 records
//! page 1: limit 10 offset 10  -> 10 records
//! page 2: limit 5  offset 20  ->  5 records  (stop: size reached)
//! ```
//!
//! A "no results" server error ends the listing; a short page ends it too.

use tracing::debug;

use crate::{Error, Result};

/// Records requested per page when the caller does not ask for fewer.
pub const DEFAULT_BATCH_SIZE: u64 = 10_000;

/// A collection that can be assembled page by page.
pub trait Paged: Default {
    /// Number of records held.
    fn record_count(&self) -> usize;

    /// Merge a later page into this collection.
    fn absorb(&mut self, page: Self);

    /// Drop records beyond the first `len`.
    fn truncate_to(&mut self, len: usize);
}

impl<T> Paged for Vec<T> {
    fn record_count(&self) -> usize {
        self.len()
    }

    fn absorb(&mut self, page: Self) {
        self.extend(page);
    }

    fn truncate_to(&mut self, len: usize) {
        self.truncate(len);
    }
}

/// Fetch every page of a listing.
///
/// `fetch(limit, offset)` performs one call. `offset` and `size` are the
/// caller's window; `batch_size` is the page size used when `size` does not
/// impose a smaller one. The result never holds more than `size` records.
///
/// # Errors
///
/// Propagates any error from `fetch` other than "no results", and returns
/// [`Error::InvalidInput`] if a page offset would overflow `u64`.
pub fn list_all<P, F>(
    offset: Option<u64>,
    size: Option<u64>,
    batch_size: u64,
    mut fetch: F,
) -> Result<P>
where
    P: Paged,
    F: FnMut(u64, u64) -> Result<P>,
{
    let mut result = P::default();
    if size == Some(0) {
        return Ok(result);
    }

    let batch_orig = size.map_or(batch_size, |limit| batch_size.min(limit)).max(1);
    let start = offset.unwrap_or(0);
    let mut batch = batch_orig;
    let mut page: u64 = 0;

    loop {
        let current_offset = batch_orig
            .checked_mul(page)
            .and_then(|skip| start.checked_add(skip))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "page {page} of {batch_orig} records past offset {start} overflows"
                ))
            })?;
        let fetched = match fetch(batch, current_offset) {
            Ok(fetched) => fetched,
            Err(e) if e.is_no_result() => {
                debug!(page, offset = current_offset, "Listing exhausted (no results)");
                break;
            }
            Err(e) => return Err(e),
        };

        let fetched_len = fetched.record_count() as u64;
        debug!(page, limit = batch, offset = current_offset, records = fetched_len, "Fetched page");
        result.absorb(fetched);

        if fetched_len < batch {
            break;
        }
        page += 1;

        if let Some(limit) = size {
            let held = result.record_count() as u64;
            if held >= limit {
                break;
            }
            if batch_orig > limit - held {
                batch = limit - held;
            }
        }
    }

    if let Some(limit) = size {
        result.truncate_to(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    Ok(result)
}
