use crate::model::{Asset, AssetType, Project, StyleProfile};
use crate::StoreError;

impl Project {
    pub fn asset(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == asset_id)
    }

    pub fn assets_of_type(&self, asset_type: AssetType) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(move |a| a.asset_type == asset_type)
    }

    pub fn add_asset(&mut self, asset: Asset) -> &Asset {
        self.assets.push(asset);
        let last = self.assets.len() - 1;
        &self.assets[last]
    }

    pub fn replace_asset(&mut self, asset: Asset) -> Result<(), StoreError> {
        let slot = self
            .assets
            .iter_mut()
            .find(|a| a.id == asset.id)
            .ok_or_else(|| StoreError::AssetNotFound(asset.id.clone()))?;
        *slot = asset;
        Ok(())
    }

    pub fn add_style_profile(&mut self, profile: StyleProfile) {
        self.style_profiles.push(profile);
    }

    /// Deletes a saved profile; the current reference is cleared when it
    /// pointed at that profile.
    pub fn delete_style_profile(&mut self, profile_id: &str) -> Option<StyleProfile> {
        let index = self.style_profiles.iter().position(|p| p.id == profile_id)?;
        if self
            .current_style_reference
            .as_ref()
            .is_some_and(|current| current.id == profile_id)
        {
            self.current_style_reference = None;
        }
        Some(self.style_profiles.remove(index))
    }

    pub fn set_style_reference(&mut self, profile_id: &str) -> Result<&StyleProfile, StoreError> {
        let profile = self
            .style_profiles
            .iter()
            .find(|p| p.id == profile_id)
            .cloned()
            .ok_or_else(|| StoreError::StyleProfileNotFound(profile_id.to_string()))?;
        Ok(self.current_style_reference.insert(profile))
    }

    pub fn clear_style_reference(&mut self) {
        self.current_style_reference = None;
    }
}
