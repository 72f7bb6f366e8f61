//! Compiled-in feature registry: which features exist, their titles, and their icons.

use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::Value;

use crate::model::{AppId, SettingsState};
use crate::reducer::WorkspaceAction;

include!(concat!(env!("OUT_DIR"), "/feature_catalog_generated.rs"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    Code,
    Editor,
    Workspace,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureDescriptor {
    pub feature_id: String,
    pub title: String,
    pub icon: String,
    pub category: FeatureCategory,
    pub description: String,
}

impl FeatureDescriptor {
    pub fn app_id(&self) -> AppId {
        AppId::new(self.feature_id.clone())
    }
}

/// Returns every registered feature in catalog order.
pub fn feature_catalog() -> &'static [FeatureDescriptor] {
    static CATALOG: OnceLock<Vec<FeatureDescriptor>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        serde_json::from_str(FEATURE_CATALOG_JSON)
            .expect("generated feature catalog should parse")
    })
}

pub fn feature_descriptor(app_id: &AppId) -> Option<&'static FeatureDescriptor> {
    feature_catalog()
        .iter()
        .find(|entry| entry.feature_id == app_id.as_str())
}

/// Returns the features the user has not hidden, in catalog order.
pub fn visible_features(settings: &SettingsState) -> Vec<&'static FeatureDescriptor> {
    feature_catalog()
        .iter()
        .filter(|entry| !settings.is_feature_hidden(&entry.feature_id))
        .collect()
}

/// Builds an Open action titled from the registry. Returns `None` for unregistered features.
pub fn open_action(app_id: &AppId, props: Option<Value>) -> Option<WorkspaceAction> {
    let descriptor = feature_descriptor(app_id)?;
    Some(WorkspaceAction::Open {
        app_id: app_id.clone(),
        title: descriptor.title.clone(),
        props,
    })
}
