//! Web-map marker interface.
//!
//! The web-map extension owns marker rendering and persistence. This module
//! describes the handful of calls the add-on makes against it:
//! - [`MarkerApi`] - marker sets and icons
//! - [`MarkerSet`] - one overlay layer and its markers
//! - [`MemoryMarkerApi`] - in-memory implementation for replays and tests

mod memory;

pub use memory::{MemoryIcon, MemoryMarkerApi, MemoryMarkerSet};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebMapError {
    #[error("web-map refused to create marker set {0}")]
    MarkerSetRefused(String),
    #[error("web-map refused to create icon {0}")]
    IconRefused(String),
    #[error("unknown icon {0}")]
    UnknownIcon(String),
    #[error("could not write marker {id}: {reason}")]
    MarkerWrite { id: String, reason: String },
    #[error("unknown marker {0}")]
    UnknownMarker(String),
}

/// Handle to an icon registered with the web-map
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconRef(pub String);

impl IconRef {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// A marker as handed to [`MarkerSet::create_marker`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub id: String,
    pub label: String,
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub icon: Option<IconRef>,
    pub persistent: bool,
}

/// Entry point of the web-map's marker API
pub trait MarkerApi: Send + Sync {
    fn marker_set(&self, id: &str) -> Option<Arc<dyn MarkerSet>>;

    fn create_marker_set(
        &self,
        id: &str,
        label: &str,
        persistent: bool,
    ) -> Result<Arc<dyn MarkerSet>, WebMapError>;

    fn marker_icon(&self, id: &str) -> Option<IconRef>;

    /// Register an icon from PNG bytes
    fn create_marker_icon(&self, id: &str, label: &str, png: &[u8]) -> Result<IconRef, WebMapError>;

    /// Replace the image of an existing icon
    fn set_marker_icon_image(&self, id: &str, png: &[u8]) -> Result<(), WebMapError>;
}

/// One named overlay layer
pub trait MarkerSet: Send + Sync {
    fn id(&self) -> &str;

    fn set_hide_by_default(&self, hide: bool);

    fn set_layer_priority(&self, priority: i32);

    fn set_min_zoom(&self, zoom: i32);

    /// Create a marker, replacing any marker with the same id
    fn create_marker(&self, marker: MarkerSpec) -> Result<(), WebMapError>;

    fn marker_ids(&self) -> Vec<String>;

    fn delete_marker(&self, id: &str) -> Result<(), WebMapError>;
}
