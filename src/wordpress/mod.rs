//! WordPress content repository access.
//!
//! The aggregation driver only sees the [`ContentRepository`] trait; the
//! REST implementation lives in [`client`].

pub mod client;
#[cfg(test)]
pub mod fake;

pub use client::WordPressClient;

use crate::error::AnalyticsError;
use crate::models::{Central, VolumeRecord};
use std::future::Future;

/// Source of centrals and their volume verification records.
pub trait ContentRepository {
    /// All centrals known to the repository.
    fn list_centrals(&self) -> impl Future<Output = Result<Vec<Central>, AnalyticsError>> + Send;

    /// Volume records whose content matches the central's display name.
    fn search_volume_records(
        &self,
        central_name: &str,
    ) -> impl Future<Output = Result<Vec<VolumeRecord>, AnalyticsError>> + Send;
}
