//! In-memory repository for tests.

use crate::error::AnalyticsError;
use crate::models::{Central, PostTitle, RecordMeta, VolumeRecord};
use crate::wordpress::ContentRepository;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Repository serving canned centrals and records, keyed by central name.
#[derive(Debug, Default)]
pub struct FakeRepository {
    pub centrals: Vec<Central>,
    pub records: HashMap<String, Result<Vec<VolumeRecord>, String>>,
    pub listing_error: Option<String>,
    pub delay: Option<Duration>,
}

impl FakeRepository {
    /// Four centrals: one with a failing search and one without records.
    pub fn sample() -> Self {
        let mut records = HashMap::new();
        records.insert(
            "Central Norte".to_string(),
            Ok(vec![
                record("2024-01-10T08:00:00", "10"),
                record("2024-03-05T08:00:00", "20"),
            ]),
        );
        records.insert(
            "Central Sul".to_string(),
            Ok(vec![record("2024-02-01T08:00:00", "100.5")]),
        );
        records.insert("Central Leste".to_string(), Err("status 502".to_string()));

        Self {
            centrals: vec![
                central(1, "Central Norte"),
                central(2, "Central Leste"),
                central(3, "Central Sul"),
                central(4, "Central Oeste"),
            ],
            records,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            listing_error: Some(message.to_string()),
            ..Self::default()
        }
    }
}

pub fn central(id: u64, name: &str) -> Central {
    Central {
        id,
        slug: Some(name.to_lowercase().replace(' ', "-")),
        name: None,
        title: Some(PostTitle::Rendered {
            rendered: name.to_string(),
        }),
    }
}

/// A dated record with a string volume, as WordPress usually sends it.
pub fn record(date: &str, volume: &str) -> VolumeRecord {
    VolumeRecord {
        id: None,
        date: Some(date.to_string()),
        meta: Some(RecordMeta {
            volume: Some(Value::String(volume.to_string())),
        }),
    }
}

impl ContentRepository for FakeRepository {
    async fn list_centrals(&self) -> Result<Vec<Central>, AnalyticsError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.listing_error {
            Some(message) => Err(AnalyticsError::UpstreamUnavailable {
                url: "fake://central".to_string(),
                message: message.clone(),
            }),
            None => Ok(self.centrals.clone()),
        }
    }

    async fn search_volume_records(
        &self,
        central_name: &str,
    ) -> Result<Vec<VolumeRecord>, AnalyticsError> {
        match self.records.get(central_name) {
            Some(Ok(records)) => Ok(records.clone()),
            Some(Err(message)) => Err(AnalyticsError::UpstreamUnavailable {
                url: "fake://verificacoes-de-volu".to_string(),
                message: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}
