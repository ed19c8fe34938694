//! Per-Request Cache (§4.8): at-most-one evaluation per schema per request.
//!
//! A fresh instance is created per incoming request and discarded when the
//! request completes; nothing here is persisted across requests.

use ceval_core::{EvaluationResult, SchemeId};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type SharedResult = Shared<BoxFuture<'static, Arc<EvaluationResult>>>;

#[derive(Default)]
pub struct PerRequestCache {
    inflight: Mutex<HashMap<SchemeId, SharedResult>>,
}

impl PerRequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// If `id` is already in-flight or settled, await that handle. Otherwise
    /// register `compute` as the canonical evaluation for `id` and await it.
    /// Concurrent callers for the same id always observe the same result.
    pub async fn get_or_evaluate<F>(&self, id: &SchemeId, compute: F) -> Arc<EvaluationResult>
    where
        F: FnOnce() -> BoxFuture<'static, Arc<EvaluationResult>>,
    {
        let existing = {
            let guard = self.inflight.lock().unwrap();
            guard.get(id).cloned()
        };
        if let Some(shared) = existing {
            return shared.await;
        }

        let shared: SharedResult = compute().shared();
        let winner = {
            let mut guard = self.inflight.lock().unwrap();
            guard.entry(id.clone()).or_insert_with(|| shared.clone()).clone()
        };
        winner.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceval_core::{ScaleInfo, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dummy(id: &str) -> Arc<EvaluationResult> {
        Arc::new(EvaluationResult {
            scheme_id: SchemeId::new(id),
            dimension: id.to_string(),
            value: Value::Int(1),
            label: "x".into(),
            reasoning: None,
            confidence: 1.0,
            scale_info: ScaleInfo::BinaryGate { rules: 0 },
            criteria: None,
            error: None,
        })
    }

    #[tokio::test]
    async fn concurrent_demand_evaluates_once() {
        let cache = Arc::new(PerRequestCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let id = SchemeId::new("a");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_evaluate(&id, move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async move {
                            tokio::task::yield_now().await;
                            dummy("a")
                        }
                        .boxed()
                    })
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
