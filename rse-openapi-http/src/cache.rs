use bytes::Bytes;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// A single-slot TTL cache for a rendered document.
///
/// Readers share the slot; when it is empty or expired, one task takes the
/// render lock, re-checks, renders and publishes. Concurrent misses wait
/// for that render instead of starting their own.
pub struct SpecCache {
    slot: RwLock<Option<(Bytes, Instant)>>,
    render_lock: Mutex<()>,
    ttl: Duration,
}

impl SpecCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            render_lock: Mutex::new(()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the cached body if it exists and hasn't expired.
    pub async fn get(&self) -> Option<Bytes> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some((body, rendered_at)) if rendered_at.elapsed() < self.ttl => Some(body.clone()),
            _ => None,
        }
    }

    /// Returns the cached body, or runs `render` once to refresh it.
    pub async fn get_or_render<F, Fut, E>(&self, render: F) -> Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, E>>,
    {
        if let Some(body) = self.get().await {
            return Ok(body);
        }

        let _guard = self.render_lock.lock().await;
        if let Some(body) = self.get().await {
            return Ok(body);
        }

        let body = render().await?;
        *self.slot.write().await = Some((body.clone(), Instant::now()));
        Ok(body)
    }

    /// Drop the cached body so the next read renders again.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn render_counted(counter: &AtomicUsize) -> Result<Bytes, ()> {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Bytes::from(format!("render {n}")))
    }

    #[tokio::test]
    async fn fresh_body_is_reused() {
        let cache = SpecCache::new(Duration::from_secs(60));
        let counter = AtomicUsize::new(0);

        let first = cache.get_or_render(|| render_counted(&counter)).await.unwrap();
        let second = cache.get_or_render(|| render_counted(&counter)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_ttl_renders_every_time() {
        let cache = SpecCache::new(Duration::ZERO);
        let counter = AtomicUsize::new(0);

        cache.get_or_render(|| render_counted(&counter)).await.unwrap();
        let second = cache.get_or_render(|| render_counted(&counter)).await.unwrap();
        assert_eq!(second, Bytes::from("render 2"));
    }

    #[tokio::test]
    async fn invalidate_forces_a_render() {
        let cache = SpecCache::new(Duration::from_secs(60));
        let counter = AtomicUsize::new(0);

        cache.get_or_render(|| render_counted(&counter)).await.unwrap();
        cache.invalidate().await;
        assert!(cache.get().await.is_none());
        cache.get_or_render(|| render_counted(&counter)).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_render_leaves_slot_empty() {
        let cache = SpecCache::new(Duration::from_secs(60));
        let result: Result<Bytes, &str> = cache.get_or_render(|| async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));
        assert!(cache.get().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_render_once() {
        let cache = Arc::new(SpecCache::new(Duration::from_secs(60)));
        let counter = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_render(move || async move {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            render_counted(&counter).await
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), Bytes::from("render 1"));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
