//! Cursor paginator
//!
//! Forward-only keyset pagination over any [`RecordStore`]. One extra
//! "lookahead" record per fetch tells whether another page exists, so no
//! separate existence query is needed.

use super::types::{Cursor, Page, PageRequest};
use crate::error::{Error, Result};
use crate::store::{Record, RecordStore};
use std::future::Future;

/// Cursor-based paginator over a record store
///
/// Stateless: every call is independent and nothing is cached between calls.
#[derive(Debug)]
pub struct CursorPaginator<'a, S: ?Sized> {
    store: &'a S,
}

impl<S: ?Sized> Clone for CursorPaginator<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for CursorPaginator<'_, S> {}

impl<'a, S> CursorPaginator<'a, S>
where
    S: RecordStore + ?Sized,
{
    /// Create a paginator over `store`
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fetch the page described by `request`
    ///
    /// `request.take` must be at least 1. Store errors are returned unchanged. When `include_total` is set the
    /// count runs concurrently with the page fetch and is not transactionally
    /// tied to it.
    pub async fn paginate(&self, request: &PageRequest<S::Filter>) -> Result<Page<S::Record>> {
        debug_assert!(request.take > 0, "take must be at least 1");
        let limit = request.take.saturating_add(1);
        let resume_after = request.cursor.as_ref().map(Cursor::as_str);

        tracing::debug!(
            take = request.take,
            order = %request.order_by,
            has_cursor = resume_after.is_some(),
            include_total = request.include_total,
            "Fetching page"
        );

        let fetch = self
            .store
            .fetch_page(&request.filter, &request.order_by, resume_after, limit);

        let (records, total) = if request.include_total {
            tokio::try_join!(fetch, self.store.count(&request.filter))?
        } else {
            (fetch.await?, None)
        };

        let page = split_lookahead(records, request.take, total);

        tracing::debug!(
            returned = page.len(),
            has_more = page.has_more(),
            total = ?page.total,
            "Fetched page"
        );

        Ok(page)
    }

    /// Fetch a page and project each record into a response entity
    pub async fn paginate_entities<E, P>(
        &self,
        request: &PageRequest<S::Filter>,
        project: P,
    ) -> Result<Page<E>>
    where
        P: FnMut(S::Record) -> E,
    {
        Ok(self.paginate(request).await?.map(project))
    }

    /// Fetch a page unless `cancel` completes first
    ///
    /// On cancellation the in-flight store calls are dropped and
    /// [`Error::Cancelled`] is returned; no partial page is produced.
    pub async fn paginate_until<C>(
        &self,
        request: &PageRequest<S::Filter>,
        cancel: C,
    ) -> Result<Page<S::Record>>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = cancel => {
                tracing::debug!("Pagination cancelled");
                Err(Error::Cancelled)
            }
            page = self.paginate(request) => page,
        }
    }
}

/// Turn a `take + 1` fetch into a page
///
/// The lookahead record is dropped; the cursor is the id of the last record
/// kept, so resuming strictly after it starts at the lookahead record.
fn split_lookahead<R: Record>(mut records: Vec<R>, take: usize, total: Option<u64>) -> Page<R> {
    let limit = take.saturating_add(1);
    if records.len() > limit {
        tracing::warn!(
            returned = records.len(),
            limit,
            "Record store returned more records than requested"
        );
        records.truncate(limit);
    }

    let next_cursor = if records.len() > take {
        records.truncate(take);
        records.last().map(|r| Cursor::new(r.id()))
    } else {
        None
    };

    Page {
        data: records,
        next_cursor,
        total,
    }
}
