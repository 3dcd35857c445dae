// src/warmer/observer.rs
// =============================================================================
// The observer: how a warming run reports each request back to the caller.
//
// Exactly one callback fires per URL:
// - on_fulfilled when a response came back (any status, 404 and 500 included)
// - on_rejected when the request never produced a response
//
// Both methods default to doing nothing, so an observer only implements what
// it cares about, and "no observer" is just NoopObserver.
// =============================================================================

use std::sync::Arc;

use crate::transport::{RequestFailure, WarmResponse};

/// Receives the outcome of every request of a warming run.
///
/// Callbacks run on the runtime's worker threads and may be invoked for
/// different URLs concurrently, in completion order.
pub trait Observer: Send + Sync {
    fn on_fulfilled(&self, response: WarmResponse, url: &str) {
        let _ = (response, url);
    }

    fn on_rejected(&self, error: RequestFailure, url: &str) {
        let _ = (error, url);
    }
}

/// The observer used when the caller did not configure one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

impl<O: Observer + ?Sized> Observer for Arc<O> {
    fn on_fulfilled(&self, response: WarmResponse, url: &str) {
        (**self).on_fulfilled(response, url)
    }

    fn on_rejected(&self, error: RequestFailure, url: &str) {
        (**self).on_rejected(error, url)
    }
}

/// The result of one request, tagged with the URL it was for.
#[derive(Debug)]
pub enum RequestOutcome {
    Fulfilled { url: String, response: WarmResponse },
    Rejected { url: String, error: RequestFailure },
}

impl RequestOutcome {
    pub fn new(url: String, result: Result<WarmResponse, RequestFailure>) -> Self {
        match result {
            Ok(response) => Self::Fulfilled { url, response },
            Err(error) => Self::Rejected { url, error },
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Fulfilled { url, .. } | Self::Rejected { url, .. } => url,
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    /// Hands the outcome to the matching callback, consuming it.
    pub fn deliver(self, observer: &dyn Observer) {
        match self {
            Self::Fulfilled { url, response } => observer.on_fulfilled(response, &url),
            Self::Rejected { url, error } => observer.on_rejected(error, &url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FailureKind;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Observer for Recorder {
        fn on_fulfilled(&self, response: WarmResponse, url: &str) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("ok {} {}", response.status.as_u16(), url));
        }

        fn on_rejected(&self, error: RequestFailure, url: &str) {
            self.calls.lock().unwrap().push(format!("err {} {}", error, url));
        }
    }

    #[test]
    fn test_deliver_routes_to_one_callback() {
        let recorder = Arc::new(Recorder::default());

        let fulfilled = RequestOutcome::new(
            "https://x.test/a".to_string(),
            Ok(WarmResponse::new(StatusCode::NOT_FOUND, "https://x.test/a")),
        );
        assert!(fulfilled.is_fulfilled());
        fulfilled.deliver(&recorder);

        let rejected = RequestOutcome::new(
            "https://x.test/b".to_string(),
            Err(RequestFailure::new(FailureKind::Timeout, "timed out")),
        );
        assert_eq!(rejected.url(), "https://x.test/b");
        rejected.deliver(&recorder);

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec!["ok 404 https://x.test/a", "err timed out https://x.test/b"]
        );
    }

    #[test]
    fn test_noop_observer_accepts_everything() {
        let outcome = RequestOutcome::new(
            "https://x.test".to_string(),
            Err(RequestFailure::new(FailureKind::Connect, "refused")),
        );
        outcome.deliver(&NoopObserver);
    }
}
