//! Remembers the most recently classified garment between runs

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::{
    cache::{PersistentCache, TypedCache},
    models::GarmentLabel,
};

const LAST_LABEL_KEY: &str = "last_garment_label";
const LAST_LABEL_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Storage for the last garment the pipeline classified
#[async_trait]
pub trait GarmentHistory: Send + Sync {
    async fn remember(&self, label: &GarmentLabel) -> Result<()>;

    async fn last(&self) -> Result<Option<GarmentLabel>>;
}

#[derive(Clone)]
pub struct LabelHistory {
    labels: TypedCache<String>,
}

impl LabelHistory {
    #[must_use]
    pub fn new(cache: PersistentCache) -> Self {
        Self {
            labels: cache.typed("history"),
        }
    }
}

#[async_trait]
impl GarmentHistory for LabelHistory {
    async fn remember(&self, label: &GarmentLabel) -> Result<()> {
        self.labels
            .put(LAST_LABEL_KEY, label.as_str().to_string(), LAST_LABEL_TTL)
            .await
    }

    async fn last(&self) -> Result<Option<GarmentLabel>> {
        let stored = self.labels.get(LAST_LABEL_KEY).await?;
        Ok(stored.and_then(|raw| GarmentLabel::new(raw).ok()))
    }
}
