//! [`PatchRasterizer`], which draws a [`Patch`] into a [`PatchCanvas`].

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::{
    CanvasMode, Face, FaceTile, HullAdjacency, LocalPoint, Patch, PatchCanvas, PlanePoint,
    RasterOptions, RenderedPatch, TileStore, TileTransform, boundary_offsets, extend_border,
};

/// Draws patches, using the given sources of tile images and hull information.
///
/// Each face is drawn as a single pixel of its color until the first face with a tile for
/// the patch's orientation is reached; from then on the canvas is at tile resolution,
/// with the earlier pixels stretched to fill their cells.
#[derive(Debug)]
pub struct PatchRasterizer<'a, T: ?Sized, H: ?Sized> {
    tiles: &'a T,
    hull: &'a H,
    options: &'a RasterOptions,
}

impl<'a, T, H> PatchRasterizer<'a, T, H>
where
    T: TileStore + ?Sized,
    H: HullAdjacency + ?Sized,
{
    #[allow(missing_docs)]
    pub fn new(tiles: &'a T, hull: &'a H, options: &'a RasterOptions) -> Self {
        Self {
            tiles,
            hull,
            options,
        }
    }

    /// Draws `patch`.
    ///
    /// If `seen` is given, the local position of every face is inserted into it.
    ///
    /// Faces are drawn in the order the patch lists them, so the output is deterministic
    /// for a given patch, tile store contents, and hull.
    pub fn render(
        &self,
        patch: &Patch,
        mut seen: Option<&mut HashSet<LocalPoint>>,
    ) -> RenderedPatch {
        let orientation = patch.orientation();
        let mut canvas = PatchCanvas::new(patch.size(), self.options);
        // Untextured faces on the edge of the patch, to extend once everything is drawn.
        let mut edge_faces: Vec<(&Face, PlanePoint, LocalPoint)> = Vec::new();

        for face in patch.faces() {
            let (plane, local) = patch.locate(face);
            match face.tile(orientation) {
                Some(tile) => {
                    if canvas.upscale() {
                        log::trace!("patch has tiles starting at {local:?}");
                    }
                    self.draw_tile(&mut canvas, patch, local, tile);
                }
                None => {
                    if !canvas.fill_cell(local, face.color) {
                        log::debug!(
                            "face at {:?} is outside of its patch bounds",
                            face.position
                        );
                    }
                    if patch.is_on_boundary(local) {
                        edge_faces.push((face, plane, local));
                    }
                }
            }
            if let Some(seen) = seen.as_deref_mut() {
                seen.insert(local);
            }
        }

        for (face, plane, local) in edge_faces {
            for offset in boundary_offsets(local, patch.size()) {
                extend_border(
                    face,
                    plane,
                    patch.axis(),
                    orientation,
                    self.hull,
                    &mut canvas,
                    local,
                    offset,
                );
            }
        }

        debug_assert!(
            canvas.mode() == CanvasMode::Tiled
                || patch.faces().iter().all(|f| f.tile(orientation).is_none())
        );
        canvas.finish()
    }

    fn draw_tile(
        &self,
        canvas: &mut PatchCanvas,
        patch: &Patch,
        local: LocalPoint,
        tile: FaceTile,
    ) {
        let transform = TileTransform::resolve(patch.orientation(), tile.rotation, tile.flip);
        let drawn = match transform {
            TileTransform::Identity => self
                .tiles
                .tile(tile.id)
                .map(|image| canvas.draw_tile(local, image)),
            TileTransform::Rotate180 => self
                .tiles
                .tile(tile.id)
                .map(|image| canvas.draw_tile_reflected(local, image)),
            _ => self
                .tiles
                .transformed_tile(tile.id, transform)
                .map(|image| canvas.draw_tile(local, &image)),
        };
        match drawn {
            Some(true) => {}
            Some(false) => log::debug!("{} at {local:?} is outside of its patch", tile.id),
            // Not an error: the owner will refresh again once the tile is available.
            None => log::trace!("{} is not available; leaving a gap at {local:?}", tile.id),
        }
    }
}
