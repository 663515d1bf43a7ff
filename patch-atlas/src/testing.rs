//! Test helpers for patch-atlas tests.
//!
//! This module is public but doc(hidden).

use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use image::RgbaImage;

use crate::{AtlasStore, ContentHash, HullAdjacency, Orientation, SlotId, TextureTarget, VoxelPoint};

/// [`HullAdjacency`] with no borders anywhere, so no border extension happens.
#[derive(Clone, Copy, Debug, Default)]
#[allow(clippy::exhaustive_structs)]
pub struct NoHull;

impl HullAdjacency for NoHull {
    fn has_border(&self, _: VoxelPoint, _: Orientation) -> bool {
        false
    }
}

/// [`HullAdjacency`] implemented by a function.
#[allow(clippy::exhaustive_structs)]
pub struct HullFn<F>(pub F);

impl<F: Fn(VoxelPoint, Orientation) -> bool> HullAdjacency for HullFn<F> {
    fn has_border(&self, position: VoxelPoint, orientation: Orientation) -> bool {
        (self.0)(position, orientation)
    }
}

impl<F> fmt::Debug for HullFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HullFn").finish_non_exhaustive()
    }
}

/// [`AtlasStore`] which records every load and eviction, and panics if they are
/// inconsistent with each other.
#[derive(Debug, Default)]
pub struct TestAtlasStore {
    live: HashMap<ContentHash, (SlotId, RgbaImage)>,
    loaded: Vec<(ContentHash, SlotId)>,
    evicted: Vec<(ContentHash, SlotId)>,
}

impl TestAtlasStore {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times [`AtlasStore::load_image()`] was called.
    pub fn count_loaded(&self) -> usize {
        self.loaded.len()
    }

    /// Number of times [`AtlasStore::evict_image()`] was called.
    pub fn count_evicted(&self) -> usize {
        self.evicted.len()
    }

    #[allow(missing_docs)]
    pub fn loaded(&self) -> &[(ContentHash, SlotId)] {
        &self.loaded
    }

    #[allow(missing_docs)]
    pub fn evicted(&self) -> &[(ContentHash, SlotId)] {
        &self.evicted
    }

    /// Returns the image currently loaded for `hash`.
    pub fn image(&self, hash: ContentHash) -> Option<&RgbaImage> {
        self.live.get(&hash).map(|(_, image)| image)
    }

    /// Number of images loaded and not yet evicted.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl AtlasStore for TestAtlasStore {
    fn load_image(&mut self, hash: ContentHash, image: RgbaImage) -> SlotId {
        let slot = SlotId(self.loaded.len() as u32);
        let previous = self.live.insert(hash, (slot, image));
        assert!(previous.is_none(), "{hash:?} loaded twice");
        self.loaded.push((hash, slot));
        slot
    }

    fn evict_image(&mut self, hash: ContentHash, slot: SlotId) {
        match self.live.remove(&hash) {
            Some((live_slot, _)) => assert_eq!(live_slot, slot, "{hash:?} evicted from wrong slot"),
            None => panic!("{hash:?} evicted but not loaded"),
        }
        self.evicted.push((hash, slot));
    }
}

/// [`TextureTarget`] which records every binding it is given.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct RecordingTarget {
    /// All calls to [`TextureTarget::set_texture()`], in order.
    pub bindings: Vec<(ContentHash, SlotId)>,
}

impl RecordingTarget {
    /// The most recent binding.
    pub fn last(&self) -> Option<(ContentHash, SlotId)> {
        self.bindings.last().copied()
    }
}

impl TextureTarget for RecordingTarget {
    fn set_texture(&mut self, hash: ContentHash, slot: SlotId) {
        self.bindings.push((hash, slot));
    }
}
