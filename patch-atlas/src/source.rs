//! Traits for the services the rasterizer consults: tile images and hull adjacency.

use alloc::borrow::Cow;
use alloc::sync::Arc;

use hashbrown::HashMap;
use image::RgbaImage;

use crate::{Orientation, TileId, TileTransform, VoxelPoint};

/// Source of tile images, looked up by [`TileId`].
///
/// A tile may be missing because it has not been loaded yet or was already removed while
/// faces still refer to it; that is not an error, and the face is simply not drawn.
pub trait TileStore {
    /// Returns the image for `id`, if it is currently available.
    fn tile(&self, id: TileId) -> Option<&RgbaImage>;

    /// Returns the image for `id` with `transform` applied.
    ///
    /// The default implementation transforms a fresh copy on every call; implementations
    /// which keep pre-rotated variants should override this.
    fn transformed_tile(
        &self,
        id: TileId,
        transform: TileTransform,
    ) -> Option<Cow<'_, RgbaImage>> {
        self.tile(id).map(|image| Cow::Owned(transform.apply(image)))
    }
}

impl<T: TileStore + ?Sized> TileStore for &T {
    #[mutants::skip] // trivial
    fn tile(&self, id: TileId) -> Option<&RgbaImage> {
        <T as TileStore>::tile(self, id)
    }
    #[mutants::skip] // trivial
    fn transformed_tile(
        &self,
        id: TileId,
        transform: TileTransform,
    ) -> Option<Cow<'_, RgbaImage>> {
        <T as TileStore>::transformed_tile(self, id, transform)
    }
}
impl<T: TileStore + ?Sized> TileStore for Arc<T> {
    #[mutants::skip] // trivial
    fn tile(&self, id: TileId) -> Option<&RgbaImage> {
        <T as TileStore>::tile(self, id)
    }
    #[mutants::skip] // trivial
    fn transformed_tile(
        &self,
        id: TileId,
        transform: TileTransform,
    ) -> Option<Cow<'_, RgbaImage>> {
        <T as TileStore>::transformed_tile(self, id, transform)
    }
}

/// Knowledge of which voxel sides are exposed edges of the solid model.
pub trait HullAdjacency {
    /// Whether the side of the voxel at `position` facing `orientation` is part of the
    /// model's visible hull.
    fn has_border(&self, position: VoxelPoint, orientation: Orientation) -> bool;
}

impl<T: HullAdjacency + ?Sized> HullAdjacency for &T {
    #[mutants::skip] // trivial
    fn has_border(&self, position: VoxelPoint, orientation: Orientation) -> bool {
        <T as HullAdjacency>::has_border(self, position, orientation)
    }
}
impl<T: HullAdjacency + ?Sized> HullAdjacency for Arc<T> {
    #[mutants::skip] // trivial
    fn has_border(&self, position: VoxelPoint, orientation: Orientation) -> bool {
        <T as HullAdjacency>::has_border(self, position, orientation)
    }
}

/// In-memory [`TileStore`].
#[derive(Clone, Debug, Default)]
pub struct TileMap {
    tiles: HashMap<TileId, RgbaImage>,
}

impl TileMap {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a tile, returning the previous image.
    pub fn insert(&mut self, id: TileId, image: RgbaImage) -> Option<RgbaImage> {
        self.tiles.insert(id, image)
    }

    /// Removes a tile. Faces referring to it will not be drawn until it is inserted again.
    pub fn remove(&mut self, id: TileId) -> Option<RgbaImage> {
        self.tiles.remove(&id)
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileStore for TileMap {
    fn tile(&self, id: TileId) -> Option<&RgbaImage> {
        self.tiles.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    #[test]
    fn tile_map_insert_remove() {
        let mut map = TileMap::new();
        assert!(map.is_empty());
        let image = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
        assert_eq!(map.insert(TileId(3), image.clone()), None);
        assert_eq!(map.tile(TileId(3)), Some(&image));
        assert_eq!(map.tile(TileId(4)), None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(TileId(3)), Some(image));
        assert_eq!(map.tile(TileId(3)), None);
    }

    #[test]
    fn default_transformed_tile_applies_transform() {
        let mut map = TileMap::new();
        let image = RgbaImage::from_fn(2, 1, |x, _| Rgba([x as u8, 0, 0, 255]));
        map.insert(TileId(0), image.clone());
        let store: &dyn TileStore = &map;
        let rotated = store
            .transformed_tile(TileId(0), TileTransform::Clockwise)
            .unwrap();
        assert_eq!(*rotated, TileTransform::Clockwise.apply(&image));
        assert_eq!(rotated.dimensions(), (1, 2));
        assert!(store.transformed_tile(TileId(1), TileTransform::Mirror).is_none());
    }
}
