//! Texturing of voxel model surfaces: rasterizing coplanar groups of voxel faces
//! (“patches”) into images, and sharing identical images through a reference-counted,
//! content-addressed texture atlas cache.
//!
//! # Getting started
//!
//! A [`Patch`] is a group of [`Face`]s lying in one plane and facing in one [`Orientation`].
//! [`PatchRasterizer`] draws it, using a [`TileStore`] for faces that carry a texture tile
//! and a [`HullAdjacency`] to decide where the colors of edge faces are extended outward.
//! The result is hashed to a [`ContentHash`] and loaded into an [`AtlasStore`] through a
//! [`TextureAtlasCache`], so that identical patches anywhere in the model share one image.
//!
//! [`PatchTexture`] ties these together for one patch: call [`PatchTexture::refresh()`]
//! whenever the patch's voxels or tiles may have changed, and it will keep exactly one
//! reference to the current image in the cache.
//!
//! To connect this crate to a renderer or exporter, implement [`TileStore`],
//! [`HullAdjacency`], [`AtlasStore`], and [`TextureTarget`]. In-memory implementations
//! [`TileMap`] and [`MemoryAtlas`] are provided.

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

extern crate alloc;

mod binding;
pub use binding::*;
mod dedup;
pub use dedup::*;
mod digest;
pub use digest::*;
mod geometry;
pub use geometry::*;
mod orient;
pub use orient::*;
mod raster;
pub use raster::*;
mod rasterize;
pub use rasterize::*;
mod seam;
pub use seam::*;
mod source;
pub use source::*;
mod voxel;
pub use voxel::*;

#[doc(hidden)]
pub mod testing;


/// Default side length, in pixels, of a tile image and of each face's cell on a tiled canvas.
pub const TILE_RESOLUTION: u32 = 32;

/// Parameters for rasterizing patches that aren't the patch data itself.
///
/// Create one with [`RasterOptions::default()`] and modify the fields as needed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct RasterOptions {
    /// Color of canvas pixels not covered by any face or border extension.
    ///
    /// The default is opaque black.
    pub background: Texel,

    /// Side length in pixels of each face's cell once a canvas switches to tile resolution.
    /// Tile images of other sizes are resized to fit.
    ///
    /// The default is [`TILE_RESOLUTION`].
    pub tile_resolution: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 255],
            tile_resolution: TILE_RESOLUTION,
        }
    }
}
