use catalog_core::mapping::IndexMapping;
use catalog_core::traits::SearchIndex;
use catalog_core::types::{RefreshInterval, SettingsPatch};
use catalog_core::Result;

/// Index-level settings around a bulk load: refresh off while loading, back
/// on afterwards, and delete-then-create for full rebuilds.
pub struct IndexSettingsController<'a> {
    index: &'a dyn SearchIndex,
    mapping: &'a IndexMapping,
    refresh_interval: String,
}

impl<'a> IndexSettingsController<'a> {
    pub fn new(index: &'a dyn SearchIndex, mapping: &'a IndexMapping, refresh_interval: impl Into<String>) -> Self {
        Self { index, mapping, refresh_interval: refresh_interval.into() }
    }

    pub fn prepare_for_bulk_load(&self, name: &str) -> Result<()> {
        tracing::debug!(index = name, "disabling refresh");
        self.index.put_settings(name, &SettingsPatch::refresh(RefreshInterval::Disabled))
    }

    pub fn restore_after_bulk_load(&self, name: &str) -> Result<()> {
        tracing::debug!(index = name, refresh = %self.refresh_interval, "restoring refresh");
        self.index.put_settings(name, &SettingsPatch::refresh(RefreshInterval::Every(self.refresh_interval.clone())))
    }

    pub fn rebuild_index(&self, name: &str) -> Result<()> {
        tracing::info!(index = name, "rebuilding index");
        self.index.delete_index(name)?;
        self.index.create_index(name, self.mapping)
    }
}
