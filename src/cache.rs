use std::future::Future;

use tokio::sync::OnceCell;

use crate::error::AppResult;

/// Process-wide holder for the code host's detected organization.
///
/// The value is computed at most once. Callers arriving while the first
/// detection is in flight wait for it instead of starting their own; a failed
/// detection leaves the holder empty so a later caller can try again.
#[derive(Debug, Default)]
pub struct DetectedScope {
    cell: OnceCell<String>,
}

impl DetectedScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A holder that never performs detection.
    pub fn preset(value: impl Into<String>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(value.into())),
        }
    }

    pub async fn get_or_detect<F, Fut>(&self, detect: F) -> AppResult<&str>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<String>>,
    {
        self.cell.get_or_try_init(detect).await.map(String::as_str)
    }
}
