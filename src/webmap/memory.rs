//! In-memory web-map backend.
//!
//! Keeps marker sets and icons in RAM. Used by the replay command and the
//! test suite; nothing is persisted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::{IconRef, MarkerApi, MarkerSet, MarkerSpec, WebMapError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryIcon {
    pub label: String,
    pub image: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MemoryMarkerApi {
    sets: RwLock<BTreeMap<String, Arc<MemoryMarkerSet>>>,
    icons: RwLock<BTreeMap<String, MemoryIcon>>,
}

impl MemoryMarkerApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concrete handle to a set, for inspection
    pub fn memory_set(&self, id: &str) -> Option<Arc<MemoryMarkerSet>> {
        self.sets.read().unwrap_or_else(|e| e.into_inner()).get(id).cloned()
    }

    pub fn icon(&self, id: &str) -> Option<MemoryIcon> {
        self.icons.read().unwrap_or_else(|e| e.into_inner()).get(id).cloned()
    }

    pub fn icon_count(&self) -> usize {
        self.icons.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl MarkerApi for MemoryMarkerApi {
    fn marker_set(&self, id: &str) -> Option<Arc<dyn MarkerSet>> {
        self.memory_set(id).map(|set| set as Arc<dyn MarkerSet>)
    }

    fn create_marker_set(
        &self,
        id: &str,
        label: &str,
        persistent: bool,
    ) -> Result<Arc<dyn MarkerSet>, WebMapError> {
        let mut sets = self.sets.write().unwrap_or_else(|e| e.into_inner());
        if sets.contains_key(id) {
            return Err(WebMapError::MarkerSetRefused(id.to_string()));
        }
        let set = Arc::new(MemoryMarkerSet::new(id, label, persistent));
        sets.insert(id.to_string(), set.clone());
        Ok(set)
    }

    fn marker_icon(&self, id: &str) -> Option<IconRef> {
        self.icons
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
            .then(|| IconRef(id.to_string()))
    }

    fn create_marker_icon(&self, id: &str, label: &str, png: &[u8]) -> Result<IconRef, WebMapError> {
        let mut icons = self.icons.write().unwrap_or_else(|e| e.into_inner());
        if icons.contains_key(id) {
            return Err(WebMapError::IconRefused(id.to_string()));
        }
        icons.insert(
            id.to_string(),
            MemoryIcon {
                label: label.to_string(),
                image: png.to_vec(),
            },
        );
        Ok(IconRef(id.to_string()))
    }

    fn set_marker_icon_image(&self, id: &str, png: &[u8]) -> Result<(), WebMapError> {
        let mut icons = self.icons.write().unwrap_or_else(|e| e.into_inner());
        let icon = icons
            .get_mut(id)
            .ok_or_else(|| WebMapError::UnknownIcon(id.to_string()))?;
        icon.image = png.to_vec();
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SetState {
    hide_by_default: bool,
    layer_priority: i32,
    min_zoom: Option<i32>,
    markers: BTreeMap<String, MarkerSpec>,
}

/// Marker set held in memory
#[derive(Debug)]
pub struct MemoryMarkerSet {
    id: String,
    label: String,
    persistent: bool,
    state: RwLock<SetState>,
    reject_writes: AtomicBool,
}

impl MemoryMarkerSet {
    pub fn new(id: &str, label: &str, persistent: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            persistent,
            state: RwLock::new(SetState::default()),
            reject_writes: AtomicBool::new(false),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn hide_by_default(&self) -> bool {
        self.state.read().unwrap_or_else(|e| e.into_inner()).hide_by_default
    }

    pub fn layer_priority(&self) -> i32 {
        self.state.read().unwrap_or_else(|e| e.into_inner()).layer_priority
    }

    /// Minimum zoom, if one was ever set
    pub fn min_zoom(&self) -> Option<i32> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).min_zoom
    }

    pub fn marker(&self, id: &str) -> Option<MarkerSpec> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).markers.get(id).cloned()
    }

    /// All markers ordered by id
    pub fn markers(&self) -> Vec<MarkerSpec> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .markers
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(|e| e.into_inner()).markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make marker writes fail, as a full or read-only store would
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Relaxed);
    }
}

impl MarkerSet for MemoryMarkerSet {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_hide_by_default(&self, hide: bool) {
        self.state.write().unwrap_or_else(|e| e.into_inner()).hide_by_default = hide;
    }

    fn set_layer_priority(&self, priority: i32) {
        self.state.write().unwrap_or_else(|e| e.into_inner()).layer_priority = priority;
    }

    fn set_min_zoom(&self, zoom: i32) {
        self.state.write().unwrap_or_else(|e| e.into_inner()).min_zoom = Some(zoom);
    }

    fn create_marker(&self, marker: MarkerSpec) -> Result<(), WebMapError> {
        if self.reject_writes.load(Ordering::Relaxed) {
            return Err(WebMapError::MarkerWrite {
                id: marker.id,
                reason: "store is read-only".to_string(),
            });
        }
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .markers
            .insert(marker.id.clone(), marker);
        Ok(())
    }

    fn marker_ids(&self) -> Vec<String> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .markers
            .keys()
            .cloned()
            .collect()
    }

    fn delete_marker(&self, id: &str) -> Result<(), WebMapError> {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .markers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| WebMapError::UnknownMarker(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: &str, label: &str) -> MarkerSpec {
        MarkerSpec {
            id: id.to_string(),
            label: label.to_string(),
            world: "world".to_string(),
            x: 0,
            y: 64,
            z: 0,
            icon: None,
            persistent: true,
        }
    }

    #[test]
    fn test_marker_set_lifecycle() {
        let api = MemoryMarkerApi::new();
        assert!(api.marker_set("structures").is_none());

        let set = api.create_marker_set("structures", "Structures", true).unwrap();
        assert_eq!(set.id(), "structures");
        assert!(api.marker_set("structures").is_some());
        assert!(api.create_marker_set("structures", "Structures", true).is_err());

        let memory = api.memory_set("structures").unwrap();
        assert_eq!(memory.label(), "Structures");
        assert!(memory.is_persistent());
    }

    #[test]
    fn test_create_marker_overwrites() {
        let set = MemoryMarkerSet::new("structures", "Structures", true);
        set.create_marker(marker("village,1,2", "Village")).unwrap();
        set.create_marker(marker("village,1,2", "Town")).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.marker("village,1,2").unwrap().label, "Town");
    }

    #[test]
    fn test_delete_marker() {
        let set = MemoryMarkerSet::new("structures", "Structures", true);
        set.create_marker(marker("igloo,0,0", "Igloo")).unwrap();

        set.delete_marker("igloo,0,0").unwrap();
        assert!(set.is_empty());
        assert_eq!(
            set.delete_marker("igloo,0,0"),
            Err(WebMapError::UnknownMarker("igloo,0,0".to_string()))
        );
    }

    #[test]
    fn test_rejected_writes() {
        let set = MemoryMarkerSet::new("structures", "Structures", true);
        set.reject_writes(true);
        assert!(matches!(
            set.create_marker(marker("village,0,0", "Village")),
            Err(WebMapError::MarkerWrite { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_icons() {
        let api = MemoryMarkerApi::new();
        assert!(api.marker_icon("structures.village").is_none());
        assert!(api.set_marker_icon_image("structures.village", b"x").is_err());

        let icon = api.create_marker_icon("structures.village", "village", b"old").unwrap();
        assert_eq!(icon.id(), "structures.village");
        api.set_marker_icon_image("structures.village", b"new").unwrap();
        assert_eq!(api.icon("structures.village").unwrap().image, b"new".to_vec());
        assert_eq!(api.icon_count(), 1);
    }

    #[test]
    fn test_layer_properties() {
        let set = MemoryMarkerSet::new("structures", "Structures", true);
        assert_eq!(set.min_zoom(), None);
        set.set_hide_by_default(true);
        set.set_layer_priority(7);
        set.set_min_zoom(3);
        assert!(set.hide_by_default());
        assert_eq!(set.layer_priority(), 7);
        assert_eq!(set.min_zoom(), Some(3));
    }
}
