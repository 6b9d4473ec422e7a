//! Paginated collection fetching with a bounded retry budget.
//!
//! BigCommerce collections are served one page at a time. [`Paginator`] turns
//! a "fetch page N" closure into "fetch the whole collection", retrying
//! transient failures and always handing back what it managed to collect.
//!
//! # Architecture
//!
//! - [`PageResult`] is one decoded page plus the server's "more pages" signal
//! - [`RetryClassify`] lets the paginator tell transient errors from fatal ones
//! - [`RetryPolicy`] bounds the number of transient failures per traversal
//! - [`IncompleteFetch`] carries the partial collection when a traversal stops
//!
//! The retry counter belongs to one traversal and is never reset between
//! pages. Cancellation is cooperative: the in-flight page request and any
//! backoff sleep are raced against a [`CancellationToken`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use bigcommerce_core::Envelope;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Classifies an error as worth retrying or not.
pub trait RetryClassify {
    /// `true` for failures that may succeed when repeated (timeouts,
    /// connection resets, 5xx, throttling).
    fn is_transient(&self) -> bool;
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Whether the server reports pages after this one.
    pub has_more: bool,
    /// Total page count, when the endpoint reports it.
    pub total_pages: Option<u32>,
}

impl<T> PageResult<T> {
    /// A page with an explicit continuation flag.
    #[must_use]
    pub const fn new(items: Vec<T>, has_more: bool) -> Self {
        Self {
            items,
            has_more,
            total_pages: None,
        }
    }

    /// The final page of a collection.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self::new(items, false)
    }

    /// An empty terminal page (what a 204 response becomes).
    #[must_use]
    pub const fn empty() -> Self {
        Self::last(Vec::new())
    }

    /// Build a page from a v3 `{data, meta}` envelope.
    ///
    /// `has_more` comes from `current_page < total_pages`; the number of
    /// items on the page is not consulted.
    #[must_use]
    pub fn from_envelope(envelope: Envelope<Vec<T>>) -> Self {
        let pagination = envelope.pagination();
        Self {
            has_more: envelope.has_more(),
            total_pages: pagination.map(|p| p.total_pages),
            items: envelope.data,
        }
    }

    /// Build a page from a v2 endpoint, which carries no metadata.
    ///
    /// Any non-empty page may have successors; the traversal ends on the
    /// first empty page (or 204).
    #[must_use]
    pub fn from_unpaginated(items: Vec<T>) -> Self {
        let has_more = !items.is_empty();
        Self::new(items, has_more)
    }

    /// Attach a known page count.
    #[must_use]
    pub const fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }
}

/// What to do after a transient failure that is still within budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryMode {
    /// Back off, then request the same page again.
    #[default]
    RetrySamePage,
    /// Stop the traversal and report what was collected.
    StopOnFirstFailure,
}

impl RetryMode {
    /// Name used in configuration and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RetrySamePage => "retry",
            Self::StopOnFirstFailure => "stop",
        }
    }
}

impl fmt::Display for RetryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retry" | "retry-same-page" => Ok(Self::RetrySamePage),
            "stop" | "stop-on-first-failure" => Ok(Self::StopOnFirstFailure),
            other => Err(format!("unknown retry mode {other:?} (expected retry or stop)")),
        }
    }
}

/// Retry budget for one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Transient failures tolerated before giving up.
    pub max_retries: u32,
    /// Behaviour after a tolerated failure.
    pub mode: RetryMode,
    /// Base delay; the n-th retry waits `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            mode: RetryMode::default(),
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based).
    #[must_use]
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(retry)
    }
}

/// Why a traversal stopped early.
#[derive(Debug)]
pub enum FetchFailure<E> {
    /// More transient failures than the budget allows.
    MaxRetriesExceeded {
        /// The failure that exhausted the budget.
        last: E,
    },
    /// Stopped on a tolerated failure ([`RetryMode::StopOnFirstFailure`]).
    Interrupted(E),
    /// A non-transient failure; never retried.
    Fatal(E),
    /// The cancellation token fired.
    Cancelled,
}

impl<E> FetchFailure<E> {
    /// The underlying error, unless the traversal was cancelled.
    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        match self {
            Self::MaxRetriesExceeded { last: e } | Self::Interrupted(e) | Self::Fatal(e) => Some(e),
            Self::Cancelled => None,
        }
    }

    /// Consume and return the underlying error.
    #[must_use]
    pub fn into_error(self) -> Option<E> {
        match self {
            Self::MaxRetriesExceeded { last: e } | Self::Interrupted(e) | Self::Fatal(e) => Some(e),
            Self::Cancelled => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for FetchFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxRetriesExceeded { last } => write!(f, "retry budget exhausted: {last}"),
            Self::Interrupted(e) => write!(f, "interrupted: {e}"),
            Self::Fatal(e) => write!(f, "{e}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// A traversal that stopped before the last page.
///
/// `items` holds every item of every page fetched before `page`, in order.
#[derive(Debug)]
pub struct IncompleteFetch<T, E> {
    /// Items collected before the traversal stopped.
    pub items: Vec<T>,
    /// The page that could not be fetched.
    pub page: u32,
    /// Failed page requests observed.
    pub failures: u32,
    /// Why the traversal stopped.
    pub kind: FetchFailure<E>,
}

impl<T, E> IncompleteFetch<T, E> {
    /// The underlying error, unless the traversal was cancelled.
    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        self.kind.error()
    }

    /// Whether the traversal was stopped by cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, FetchFailure::Cancelled)
    }

    /// Split into the partial collection and the reason.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, FetchFailure<E>) {
        (self.items, self.kind)
    }

    /// Convert the collected items, keeping the failure.
    #[must_use]
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> IncompleteFetch<U, E> {
        IncompleteFetch {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            failures: self.failures,
            kind: self.kind,
        }
    }
}

impl<T, E: fmt::Display> fmt::Display for IncompleteFetch<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collection fetch stopped at page {} after {} failure(s) with {} item(s) collected: {}",
            self.page,
            self.failures,
            self.items.len(),
            self.kind
        )
    }
}

impl<T: fmt::Debug, E: std::error::Error + 'static> std::error::Error for IncompleteFetch<T, E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.error().map(|e| e as _)
    }
}

/// Drives page-fetch closures to completion.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl Paginator {
    /// Create a paginator with the given policy and a fresh token.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an existing cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The retry policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch every page, starting at page 1, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the items of all pages fetched so far
    /// when a page fails fatally, the retry budget runs out, the policy says
    /// to stop, or the token is cancelled.
    pub async fn fetch_all<T, E, F, Fut>(&self, fetch_page: F) -> Result<Vec<T>, IncompleteFetch<T, E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<PageResult<T>, E>>,
        E: RetryClassify + fmt::Display,
    {
        self.fetch_from(1, Vec::new(), &Budget::default(), fetch_page)
            .await
    }

    /// Fetch page 1, then the remaining pages `concurrency` at a time.
    ///
    /// Results are appended in page order. All pages draw on the same retry
    /// budget as page 1. When the first page reports no page count the
    /// traversal continues sequentially.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] holding the items of every page before
    /// the first one that could not be fetched.
    pub async fn fetch_all_buffered<T, E, F, Fut>(
        &self,
        concurrency: usize,
        fetch_page: F,
    ) -> Result<Vec<T>, IncompleteFetch<T, E>>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<PageResult<T>, E>>,
        E: RetryClassify + fmt::Display,
    {
        let budget = Budget::default();
        let first = match self.attempt_page(1, &budget, || fetch_page(1)).await {
            Ok(first) => first,
            Err(kind) => return Err(budget.incomplete(Vec::new(), 1, kind)),
        };

        let mut items = first.items;
        if !first.has_more {
            return Ok(items);
        }

        let Some(total_pages) = first.total_pages else {
            return self.fetch_from(2, items, &budget, &fetch_page).await;
        };
        debug!(total_pages, concurrency, "fetching remaining pages concurrently");

        let pages = futures::stream::iter(2..=total_pages)
            .map(|page| {
                let fetch_page = &fetch_page;
                let budget = &budget;
                async move { (page, self.attempt_page(page, budget, || fetch_page(page)).await) }
            })
            .buffered(concurrency.max(1));
        let mut pages = std::pin::pin!(pages);

        while let Some((page, result)) = pages.next().await {
            match result {
                Ok(result) => items.extend(result.items),
                Err(kind) => return Err(budget.incomplete(items, page, kind)),
            }
        }

        Ok(items)
    }

    async fn fetch_from<T, E, F, Fut>(
        &self,
        mut page: u32,
        mut items: Vec<T>,
        budget: &Budget,
        mut fetch_page: F,
    ) -> Result<Vec<T>, IncompleteFetch<T, E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<PageResult<T>, E>>,
        E: RetryClassify + fmt::Display,
    {
        loop {
            let result = match self
                .attempt_page(page, budget, || fetch_page(page))
                .await
            {
                Ok(result) => result,
                Err(kind) => return Err(budget.incomplete(items, page, kind)),
            };

            debug!(page, count = result.items.len(), has_more = result.has_more, "page fetched");
            items.extend(result.items);
            if !result.has_more {
                return Ok(items);
            }
            page += 1;
        }
    }

    /// Request one page until it succeeds or the policy gives up.
    async fn attempt_page<T, E, Fut>(
        &self,
        page: u32,
        budget: &Budget,
        mut call: impl FnMut() -> Fut,
    ) -> Result<PageResult<T>, FetchFailure<E>>
    where
        Fut: Future<Output = Result<PageResult<T>, E>>,
        E: RetryClassify + fmt::Display,
    {
        loop {
            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(FetchFailure::Cancelled),
                outcome = call() => outcome,
            };

            let err = match outcome {
                Ok(result) => return Ok(result),
                Err(err) => err,
            };
            let failures = budget.record_failure();

            if !err.is_transient() {
                error!(page, error = %err, "page fetch failed with a non-retryable error");
                return Err(FetchFailure::Fatal(err));
            }

            let retries = budget.record_retry();
            warn!(
                page,
                attempt = retries,
                max_retries = self.policy.max_retries,
                error = %err,
                "page fetch failed"
            );

            if retries > self.policy.max_retries {
                error!(page, failures, error = %err, "retry budget exhausted");
                return Err(FetchFailure::MaxRetriesExceeded { last: err });
            }

            match self.policy.mode {
                RetryMode::StopOnFirstFailure => return Err(FetchFailure::Interrupted(err)),
                RetryMode::RetrySamePage => {
                    let delay = self.policy.backoff_for(retries);
                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => return Err(FetchFailure::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

/// Failure counters for one traversal, shared by every page it fetches.
#[derive(Debug, Default)]
struct Budget {
    retries: AtomicU32,
    failures: AtomicU32,
}

impl Budget {
    /// Count a failed request; returns the traversal total.
    fn record_failure(&self) -> u32 {
        self.failures.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }

    /// Spend one retry; returns the retries spent so far.
    fn record_retry(&self) -> u32 {
        self.retries.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }

    fn incomplete<T, E>(
        &self,
        items: Vec<T>,
        page: u32,
        kind: FetchFailure<E>,
    ) -> IncompleteFetch<T, E> {
        IncompleteFetch {
            items,
            page,
            failures: self.failures.load(Ordering::Relaxed),
            kind,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use bigcommerce_core::{Meta, Pagination, PaginationWithLinks};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    enum TestError {
        #[error("connection reset")]
        Network,
        #[error("bad json")]
        Decode,
    }

    impl RetryClassify for TestError {
        fn is_transient(&self) -> bool {
            matches!(self, Self::Network)
        }
    }

    type Step = Result<PageResult<u32>, TestError>;

    /// Replays scripted responses and counts calls.
    #[derive(Clone)]
    struct Script {
        steps: Arc<Vec<(u32, Step)>>,
        calls: Arc<AtomicU32>,
    }

    impl Script {
        fn new(steps: Vec<(u32, Step)>) -> Self {
            Self {
                steps: Arc::new(steps),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        async fn call(&self, page: u32) -> Step {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let (expected, step) = self.steps.get(n).cloned().unwrap_or((page, Err(TestError::Decode)));
            assert_eq!(expected, page, "call {n} requested the wrong page");
            step
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn policy(max_retries: u32, mode: RetryMode) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            mode,
            backoff: Duration::ZERO,
        }
    }

    fn page(items: &[u32], has_more: bool) -> Step {
        Ok(PageResult::new(items.to_vec(), has_more))
    }

    #[tokio::test]
    async fn test_all_pages_concatenated_in_order() {
        let script = Script::new(vec![
            (1, page(&[1, 2], true)),
            (2, page(&[3], true)),
            (3, page(&[4, 5], false)),
        ]);
        let paginator = Paginator::new(policy(1, RetryMode::RetrySamePage));

        let items = paginator.fetch_all(|p| script.call(p)).await.unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(script.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let script = Script::new(vec![(1, Ok(PageResult::empty()))]);
        let items = Paginator::default().fetch_all(|p| script.call(p)).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_stop_mode_keeps_earlier_pages() {
        // Budget 1, second page fails once: the counter reaches 1, which is
        // within budget, so the stop mode reports an interruption.
        let script = Script::new(vec![
            (1, page(&[1, 2], true)),
            (2, Err(TestError::Network)),
        ]);
        let paginator = Paginator::new(policy(1, RetryMode::StopOnFirstFailure));

        let err = paginator.fetch_all(|p| script.call(p)).await.unwrap_err();
        assert_eq!(err.items, vec![1, 2]);
        assert_eq!(err.page, 2);
        assert_eq!(err.failures, 1);
        assert!(matches!(err.kind, FetchFailure::Interrupted(TestError::Network)));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_mode_zero_budget_exhausts_immediately() {
        let script = Script::new(vec![
            (1, page(&[1, 2], true)),
            (2, Err(TestError::Network)),
        ]);
        let paginator = Paginator::new(policy(0, RetryMode::RetrySamePage));

        let err = paginator.fetch_all(|p| script.call(p)).await.unwrap_err();
        assert_eq!(err.items, vec![1, 2]);
        assert!(matches!(
            err.kind,
            FetchFailure::MaxRetriesExceeded {
                last: TestError::Network
            }
        ));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_mode_reattempts_same_page() {
        let script = Script::new(vec![
            (1, page(&[1, 2], true)),
            (2, Err(TestError::Network)),
            (2, Err(TestError::Network)),
        ]);
        let paginator = Paginator::new(policy(1, RetryMode::RetrySamePage));

        let err = paginator.fetch_all(|p| script.call(p)).await.unwrap_err();
        assert_eq!(err.items, vec![1, 2]);
        assert_eq!(err.failures, 2);
        assert!(matches!(err.kind, FetchFailure::MaxRetriesExceeded { .. }));
        assert_eq!(script.calls(), 3);
    }

    #[tokio::test]
    async fn test_retry_recovers_and_continues() {
        let script = Script::new(vec![
            (1, page(&[1], true)),
            (2, Err(TestError::Network)),
            (2, page(&[2], true)),
            (3, page(&[3], false)),
        ]);
        let paginator = Paginator::new(policy(2, RetryMode::RetrySamePage));

        let items = paginator.fetch_all(|p| script.call(p)).await.unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(script.calls(), 4);
    }

    #[tokio::test]
    async fn test_budget_is_shared_across_pages() {
        // One failure on page 2 and one on page 3 exhaust a budget of 1.
        let script = Script::new(vec![
            (1, page(&[1], true)),
            (2, Err(TestError::Network)),
            (2, page(&[2], true)),
            (3, Err(TestError::Network)),
        ]);
        let paginator = Paginator::new(policy(1, RetryMode::RetrySamePage));

        let err = paginator.fetch_all(|p| script.call(p)).await.unwrap_err();
        assert_eq!(err.items, vec![1, 2]);
        assert_eq!(err.page, 3);
        assert!(matches!(err.kind, FetchFailure::MaxRetriesExceeded { .. }));
    }

    #[tokio::test]
    async fn test_fatal_error_is_never_retried() {
        let script = Script::new(vec![(1, page(&[1], true)), (2, Err(TestError::Decode))]);
        let paginator = Paginator::new(policy(5, RetryMode::RetrySamePage));

        let err = paginator.fetch_all(|p| script.call(p)).await.unwrap_err();
        assert_eq!(err.items, vec![1]);
        assert!(matches!(err.kind, FetchFailure::Fatal(TestError::Decode)));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_never_exceed_budget_plus_one() {
        for budget in 0..4 {
            for mode in [RetryMode::RetrySamePage, RetryMode::StopOnFirstFailure] {
                let calls = AtomicU32::new(0);
                let paginator = Paginator::new(policy(budget, mode));
                let err = paginator
                    .fetch_all(|p| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async move {
                            if p == 1 {
                                page(&[7], true)
                            } else {
                                Err(TestError::Network)
                            }
                        }
                    })
                    .await
                    .unwrap_err();
                assert_eq!(err.items, vec![7]);
                assert!(err.failures <= budget + 1, "{mode} with budget {budget}");
            }
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let script = Script::new(vec![(1, page(&[1], false))]);
        let paginator = Paginator::default().with_cancellation(token);

        let err = paginator.fetch_all(|p| script.call(p)).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.items.is_empty());
        assert_eq!(script.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_pending_page() {
        let token = CancellationToken::new();
        let paginator = Paginator::default().with_cancellation(token.clone());

        let err = paginator
            .fetch_all(|p| {
                let token = token.clone();
                async move {
                    if p == 1 {
                        return page(&[1, 2], true);
                    }
                    token.cancel();
                    std::future::pending::<Step>().await
                }
            })
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(err.items, vec![1, 2]);
        assert_eq!(err.page, 2);
    }

    #[tokio::test]
    async fn test_buffered_preserves_page_order() {
        let paginator = Paginator::new(policy(1, RetryMode::RetrySamePage));

        let items = paginator
            .fetch_all_buffered(3, |p| async move {
                // Later pages finish first.
                tokio::time::sleep(Duration::from_millis(u64::from(10 - p))).await;
                Ok::<_, TestError>(PageResult::new(vec![p * 10, p * 10 + 1], p < 5).with_total_pages(5))
            })
            .await
            .unwrap();

        assert_eq!(items, vec![10, 11, 20, 21, 30, 31, 40, 41, 50, 51]);
    }

    #[tokio::test]
    async fn test_buffered_reports_pages_before_failure() {
        let paginator = Paginator::new(policy(0, RetryMode::RetrySamePage));

        let err = paginator
            .fetch_all_buffered(2, |p| async move {
                if p == 3 {
                    Err(TestError::Network)
                } else {
                    Ok(PageResult::new(vec![p], p < 4).with_total_pages(4))
                }
            })
            .await
            .unwrap_err();

        assert_eq!(err.items, vec![1, 2]);
        assert_eq!(err.page, 3);
        assert!(matches!(err.kind, FetchFailure::MaxRetriesExceeded { .. }));
    }

    #[tokio::test]
    async fn test_buffered_budget_is_shared_across_pages() {
        // Pages 2-5 each fail once; a budget of 1 covers only one of them.
        let attempts: Vec<AtomicU32> = (0..=5).map(|_| AtomicU32::new(0)).collect();
        let paginator = Paginator::new(policy(1, RetryMode::RetrySamePage));

        let err = paginator
            .fetch_all_buffered(4, |p| {
                let attempt = attempts[p as usize].fetch_add(1, Ordering::SeqCst);
                async move {
                    if p > 1 && attempt == 0 {
                        Err(TestError::Network)
                    } else {
                        Ok(PageResult::new(vec![p], p < 5).with_total_pages(5))
                    }
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err.kind, FetchFailure::MaxRetriesExceeded { .. }));
        assert!(err.failures >= 2, "failures counted per traversal: {}", err.failures);
        assert_eq!(err.items[0], 1);
    }

    #[tokio::test]
    async fn test_buffered_failures_include_first_page() {
        let attempts: Vec<AtomicU32> = (0..=3).map(|_| AtomicU32::new(0)).collect();
        let paginator = Paginator::new(policy(1, RetryMode::RetrySamePage));

        let err = paginator
            .fetch_all_buffered(2, |p| {
                let attempt = attempts[p as usize].fetch_add(1, Ordering::SeqCst);
                async move {
                    if (p == 1 && attempt == 0) || p == 3 {
                        Err(TestError::Network)
                    } else {
                        Ok(PageResult::new(vec![p], p < 3).with_total_pages(3))
                    }
                }
            })
            .await
            .unwrap_err();

        // One retry spent on page 1 leaves nothing for page 3.
        assert_eq!(err.items, vec![1, 2]);
        assert_eq!(err.page, 3);
        assert_eq!(err.failures, 2);
        assert!(matches!(err.kind, FetchFailure::MaxRetriesExceeded { .. }));
    }

    #[tokio::test]
    async fn test_buffered_without_page_count_falls_back_to_sequential() {
        let script = Script::new(vec![
            (1, page(&[1], true)),
            (2, page(&[2], true)),
            (3, page(&[], false)),
        ]);
        let paginator = Paginator::default();

        let items = paginator
            .fetch_all_buffered(4, |p| script.call(p))
            .await
            .unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn test_page_from_envelope_uses_metadata() {
        let envelope = Envelope {
            data: vec![1_u32],
            meta: Meta {
                pagination: Some(PaginationWithLinks {
                    counters: Pagination {
                        current_page: 1,
                        total_pages: 3,
                        per_page: 250,
                        count: 1,
                        ..Pagination::default()
                    },
                    ..PaginationWithLinks::default()
                }),
            },
        };
        let page = PageResult::from_envelope(envelope);
        assert!(page.has_more);
        assert_eq!(page.total_pages, Some(3));
    }

    #[test]
    fn test_unpaginated_page_ends_on_empty() {
        assert!(PageResult::from_unpaginated(vec![1]).has_more);
        assert!(!PageResult::<u32>::from_unpaginated(Vec::new()).has_more);
    }

    #[test]
    fn test_retry_mode_parse() {
        assert_eq!("retry".parse::<RetryMode>().unwrap(), RetryMode::RetrySamePage);
        assert_eq!(" STOP ".parse::<RetryMode>().unwrap(), RetryMode::StopOnFirstFailure);
        assert!("sometimes".parse::<RetryMode>().is_err());
        assert_eq!(RetryMode::StopOnFirstFailure.to_string(), "stop");
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy {
            backoff: Duration::from_millis(200),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(600));
    }

    #[test]
    fn test_incomplete_fetch_display() {
        let err: IncompleteFetch<u32, TestError> = IncompleteFetch {
            items: vec![1, 2],
            page: 2,
            failures: 1,
            kind: FetchFailure::Interrupted(TestError::Network),
        };
        assert_eq!(
            err.to_string(),
            "collection fetch stopped at page 2 after 1 failure(s) with 2 item(s) collected: interrupted: connection reset"
        );
    }
}
