use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::ApiResult;

/// One page of a listing endpoint, normalized from the wire envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_results: u64,
    /// Offset of the next page; `None` when the listing ends.
    pub next_offset: Option<u64>,
}

impl<T: DeserializeOwned> Page<T> {
    /// Builds a page from a raw envelope, reading the items array under
    /// `items_key` and the `totalItemCount`/`totalResultCount` and
    /// `nextOffset` fields (`nextOffset` is null or absent on the last
    /// page).
    pub fn from_value(value: &Value, items_key: &str) -> ApiResult<Self> {
        let items = value
            .get(items_key)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let items: Vec<T> = serde_json::from_value(items)?;
        let total_results = value
            .get("totalItemCount")
            .or_else(|| value.get("totalResultCount"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let next_offset = value.get("nextOffset").and_then(Value::as_u64);
        Ok(Self {
            items,
            total_results,
            next_offset,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct PageCursor {
    next_offset: u64,
    exhausted: bool,
}

type PageFuture<T> = Pin<Box<dyn Future<Output = ApiResult<Page<T>>> + Send>>;
type PageFetch<T> = Box<dyn FnMut(u64, u64) -> PageFuture<T> + Send>;

/// Lazy pull-based iteration over a paginated endpoint.
///
/// Fetches one page at a time, on demand, yielding items in server order
/// across page boundaries. Finite: iteration ends once a page comes back
/// short, the reported total is reached, or the optional overall cap is
/// hit. Restart by constructing a new instance.
pub struct Paginator<T> {
    fetch: PageFetch<T>,
    page_size: u64,
    total_limit: Option<u64>,
    cursor: PageCursor,
    buffer: VecDeque<T>,
    total_results: Option<u64>,
    yielded: u64,
}

impl<T> Paginator<T> {
    pub fn new<F, Fut>(page_size: u64, mut fetch: F) -> Self
    where
        F: FnMut(u64, u64) -> Fut + Send + 'static,
        Fut: Future<Output = ApiResult<Page<T>>> + Send + 'static,
    {
        Self {
            fetch: Box::new(move |offset, limit| Box::pin(fetch(offset, limit))),
            page_size,
            total_limit: None,
            cursor: PageCursor {
                next_offset: 0,
                exhausted: false,
            },
            buffer: VecDeque::new(),
            total_results: None,
            yielded: 0,
        }
    }

    /// Caps the overall number of items yielded, shrinking the final page
    /// request accordingly.
    pub fn with_total_limit(mut self, limit: u64) -> Self {
        self.total_limit = Some(limit);
        self
    }

    /// Total item count reported by the server, known after the first fetch.
    pub fn total_results(&self) -> Option<u64> {
        self.total_results
    }

    /// Pulls the next item, fetching the next page only when the buffered
    /// one is drained.
    pub async fn next(&mut self) -> ApiResult<Option<T>> {
        loop {
            if self
                .total_limit
                .is_some_and(|limit| self.yielded >= limit)
            {
                return Ok(None);
            }
            if let Some(item) = self.buffer.pop_front() {
                self.yielded += 1;
                return Ok(Some(item));
            }
            if self.cursor.exhausted {
                return Ok(None);
            }
            self.fetch_page().await?;
            if self.buffer.is_empty() {
                self.cursor.exhausted = true;
                return Ok(None);
            }
        }
    }

    /// Drains the remainder of the sequence into a vector.
    pub async fn collect_remaining(mut self) -> ApiResult<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    async fn fetch_page(&mut self) -> ApiResult<()> {
        let requested = match self.total_limit {
            Some(limit) => self.page_size.min(limit - self.yielded),
            None => self.page_size,
        };
        if requested == 0 {
            self.cursor.exhausted = true;
            return Ok(());
        }

        let page = (self.fetch)(self.cursor.next_offset, requested).await?;
        let count = page.items.len() as u64;
        let end = self.cursor.next_offset + count;
        self.total_results = Some(page.total_results);

        if count < requested || end >= page.total_results || page.next_offset.is_none() {
            self.cursor.exhausted = true;
        } else {
            self.cursor.next_offset = page.next_offset.unwrap_or(end);
        }

        self.buffer.extend(page.items);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serves `total` sequential numbers a page at a time, the way the
    /// listing endpoints do.
    fn numbered_pages(
        total: u64,
        calls: Arc<AtomicUsize>,
    ) -> impl FnMut(u64, u64) -> std::future::Ready<ApiResult<Page<u64>>> {
        move |offset, limit| {
            calls.fetch_add(1, Ordering::SeqCst);
            let count = limit.min(total.saturating_sub(offset));
            let items: Vec<u64> = (offset..offset + count).collect();
            let end = offset + count;
            std::future::ready(Ok(Page {
                items,
                total_results: total,
                next_offset: if end >= total { None } else { Some(end) },
            }))
        }
    }

    #[tokio::test]
    async fn yields_all_items_across_page_boundaries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let paginator = Paginator::new(10, numbered_pages(25, calls.clone()));

        let items = paginator.collect_remaining().await.unwrap();
        assert_eq!(items, (0..25).collect::<Vec<u64>>());
        // Pages of 10, 10, and 5; the short page marks exhaustion.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_listing_fetches_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let paginator = Paginator::new(10, numbered_pages(0, calls.clone()));

        let items = paginator.collect_remaining().await.unwrap();
        assert!(items.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exact_multiple_of_page_size_does_not_overfetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let paginator = Paginator::new(10, numbered_pages(20, calls.clone()));

        let items = paginator.collect_remaining().await.unwrap();
        assert_eq!(items.len(), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn total_limit_caps_iteration_and_shrinks_the_last_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let paginator =
            Paginator::new(10, numbered_pages(25, calls.clone())).with_total_limit(12);

        let items = paginator.collect_remaining().await.unwrap();
        assert_eq!(items, (0..12).collect::<Vec<u64>>());
        // 10 items, then a request trimmed to 2.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn total_results_is_known_after_the_first_page() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut paginator = Paginator::new(10, numbered_pages(25, calls));

        assert_eq!(paginator.total_results(), None);
        let first = paginator.next().await.unwrap();
        assert_eq!(first, Some(0));
        assert_eq!(paginator.total_results(), Some(25));
    }

    #[tokio::test]
    async fn fetch_errors_propagate_to_the_caller() {
        let mut paginator: Paginator<u64> = Paginator::new(10, |_, _| {
            std::future::ready(Err(crate::http::ApiError::RateLimited))
        });
        assert!(paginator.next().await.is_err());
    }

    #[test]
    fn page_from_value_reads_psn_envelope_fields() {
        let envelope = serde_json::json!({
            "trophyTitles": [{"id": 1}, {"id": 2}],
            "totalItemCount": 7,
            "nextOffset": 2
        });
        let page: Page<Value> = Page::from_value(&envelope, "trophyTitles").unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_results, 7);
        assert_eq!(page.next_offset, Some(2));
    }

    #[test]
    fn page_from_value_handles_terminal_envelope() {
        let envelope = serde_json::json!({
            "trophyTitles": [{"id": 7}],
            "totalItemCount": 7,
            "nextOffset": null
        });
        let page: Page<Value> = Page::from_value(&envelope, "trophyTitles").unwrap();
        assert_eq!(page.next_offset, None);

        let missing_items = serde_json::json!({ "totalItemCount": 0 });
        let page: Page<Value> = Page::from_value(&missing_items, "trophyTitles").unwrap();
        assert!(page.items.is_empty());
    }
}
