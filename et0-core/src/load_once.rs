//! Load-once guard for lazily initialized provider resources.
//!
//! The first caller runs the loader; concurrent callers wait on the same
//! initialization. Failures and timeouts are not cached.

use std::{future::Future, time::Duration};
use tokio::sync::OnceCell;

use crate::error::GeocodeError;

#[derive(Debug)]
pub struct LoadOnce<T> {
    cell: OnceCell<T>,
    what: &'static str,
    timeout: Duration,
}

impl<T> LoadOnce<T> {
    pub fn new(what: &'static str, timeout: Duration) -> Self {
        Self { cell: OnceCell::new(), what, timeout }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<&T, GeocodeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GeocodeError>>,
    {
        self.cell
            .get_or_try_init(|| async {
                tracing::debug!("Loading {}", self.what);
                match tokio::time::timeout(self.timeout, load()).await {
                    Ok(result) => result,
                    Err(_) => Err(GeocodeError::LoadTimeout(self.what.to_string())),
                }
            })
            .await
    }
}
