//! Page-cache invalidation.
//!
//! The rendering tier caches pages by path. After a job mutation the affected
//! paths are announced here; the renderer drops its cached copy and rebuilds
//! on the next visit.

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Serialize;
use tracing::{info, warn};

/// Redis channel the rendering tier subscribes to.
pub const REVALIDATE_CHANNEL: &str = "revalidate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathScope {
    /// Only the page at this exact path.
    Page,
    /// The layout at this path and every page nested under it.
    Layout,
}

#[async_trait]
pub trait Revalidator: Send + Sync {
    async fn revalidate(&self, path: &str, scope: PathScope) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct RevalidateMessage<'a> {
    path: &'a str,
    scope: PathScope,
}

/// Publishes invalidations on [`REVALIDATE_CHANNEL`].
pub struct RedisRevalidator {
    client: redis::Client,
}

impl RedisRevalidator {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Revalidator for RedisRevalidator {
    async fn revalidate(&self, path: &str, scope: PathScope) -> Result<()> {
        let payload = serde_json::to_string(&RevalidateMessage { path, scope })?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let receivers: i64 = conn.publish(REVALIDATE_CHANNEL, payload).await?;
        info!("Revalidated {path} ({scope:?}), {receivers} subscriber(s)");
        Ok(())
    }
}

/// Used when no Redis is configured: invalidations are only logged.
pub struct LogRevalidator;

#[async_trait]
impl Revalidator for LogRevalidator {
    async fn revalidate(&self, path: &str, scope: PathScope) -> Result<()> {
        info!("Revalidate {path} ({scope:?}): no cache channel configured");
        Ok(())
    }
}

/// Announces every path in order. A failed path is logged and the rest are still sent.
pub async fn revalidate_paths(revalidator: &dyn Revalidator, paths: &[(String, PathScope)]) {
    for (path, scope) in paths {
        if let Err(e) = revalidator.revalidate(path, *scope).await {
            warn!("Failed to revalidate {path}: {e:#}");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every invalidation instead of publishing it.
    #[derive(Default)]
    pub struct RecordingRevalidator {
        pub calls: Mutex<Vec<(String, PathScope)>>,
    }

    impl RecordingRevalidator {
        pub fn paths(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
        }
    }

    #[async_trait]
    impl Revalidator for RecordingRevalidator {
        async fn revalidate(&self, path: &str, scope: PathScope) -> Result<()> {
            self.calls.lock().unwrap().push((path.to_string(), scope));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingRevalidator;
    use super::*;

    struct FailingRevalidator;

    #[async_trait]
    impl Revalidator for FailingRevalidator {
        async fn revalidate(&self, path: &str, _scope: PathScope) -> Result<()> {
            anyhow::bail!("redis down while revalidating {path}")
        }
    }

    #[test]
    fn test_message_wire_format() {
        let json = serde_json::to_value(RevalidateMessage {
            path: "/resumes",
            scope: PathScope::Layout,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"path": "/resumes", "scope": "layout"}));
    }

    #[tokio::test]
    async fn test_revalidate_paths_in_order() {
        let recorder = RecordingRevalidator::default();
        let paths = vec![
            ("/resumes/1".to_string(), PathScope::Page),
            ("/".to_string(), PathScope::Layout),
        ];
        revalidate_paths(&recorder, &paths).await;
        assert_eq!(*recorder.calls.lock().unwrap(), paths);
    }

    #[tokio::test]
    async fn test_revalidate_paths_swallows_failures() {
        let paths = vec![("/".to_string(), PathScope::Layout)];
        // Must not panic or propagate.
        revalidate_paths(&FailingRevalidator, &paths).await;
    }
}
