//! [`PatchTexture`], which keeps one patch's texture bound in a shared [`TextureAtlasCache`].

use alloc::sync::Arc;

use hashbrown::HashSet;

use crate::{
    AtlasError, AtlasStore, ContentHash, HullAdjacency, LocalPoint, Patch, PatchRasterizer,
    RasterOptions, SlotId, TextureAtlasCache, TileStore,
};

/// The object that draws a patch, such as a mesh, which is told which atlas slot to
/// sample its texture from.
pub trait TextureTarget {
    /// Called when the patch's texture changes to the image `hash` loaded in `slot`.
    fn set_texture(&mut self, hash: ContentHash, slot: SlotId);
}

impl<T: TextureTarget + ?Sized> TextureTarget for &mut T {
    #[mutants::skip] // trivial
    fn set_texture(&mut self, hash: ContentHash, slot: SlotId) {
        <T as TextureTarget>::set_texture(self, hash, slot)
    }
}

/// The texture of one [`Patch`], holding at most one reference into a shared
/// [`TextureAtlasCache`].
///
/// The reference is released by [`PatchTexture::destroy()`] or when the `PatchTexture` is
/// dropped.
#[derive(Debug)]
pub struct PatchTexture<S: AtlasStore> {
    patch: Patch,
    cache: Arc<TextureAtlasCache<S>>,
    options: RasterOptions,
    /// The hash this texture holds a reference to, and the slot it was loaded into.
    binding: Option<(ContentHash, SlotId)>,
}

impl<S: AtlasStore> PatchTexture<S> {
    /// Creates a `PatchTexture` with default [`RasterOptions`]. It is not bound until the
    /// first [`refresh()`](Self::refresh).
    pub fn new(patch: Patch, cache: Arc<TextureAtlasCache<S>>) -> Self {
        Self::with_options(patch, cache, RasterOptions::default())
    }

    #[allow(missing_docs)]
    pub fn with_options(
        patch: Patch,
        cache: Arc<TextureAtlasCache<S>>,
        options: RasterOptions,
    ) -> Self {
        Self {
            patch,
            cache,
            options,
            binding: None,
        }
    }

    /// Rasterizes the patch and, if the resulting image differs from the bound one, binds
    /// `target` to the new image and releases the old one.
    ///
    /// Returns whether the binding changed. `seen` is passed on to
    /// [`PatchRasterizer::render()`].
    ///
    /// If acquiring the new image fails, the previous binding is left in place.
    pub fn refresh<T, H>(
        &mut self,
        tiles: &T,
        hull: &H,
        seen: Option<&mut HashSet<LocalPoint>>,
        target: &mut (impl TextureTarget + ?Sized),
    ) -> Result<bool, AtlasError>
    where
        T: TileStore + ?Sized,
        H: HullAdjacency + ?Sized,
    {
        let rendered = PatchRasterizer::new(tiles, hull, &self.options).render(&self.patch, seen);
        let hash = rendered.content_hash();
        if self.current_hash() == Some(hash) {
            return Ok(false);
        }

        let slot = self.cache.acquire(hash, || rendered.into_image())?;
        target.set_texture(hash, slot);
        // The new reference must be recorded before releasing the old one, so that a
        // failed release does not leave it unaccounted for.
        if let Some((old_hash, _)) = self.binding.replace((hash, slot)) {
            self.cache.release(old_hash)?;
        }
        Ok(true)
    }

    /// Releases the bound image, if any.
    ///
    /// Calling this more than once has no further effect. The texture may be bound again
    /// by [`refresh()`](Self::refresh).
    pub fn destroy(&mut self) -> Result<(), AtlasError> {
        match self.binding.take() {
            Some((hash, _)) => self.cache.release(hash),
            None => Ok(()),
        }
    }

    /// The atlas slot currently bound, if any.
    pub fn current_slot_id(&self) -> Option<SlotId> {
        self.binding.map(|(_, slot)| slot)
    }

    #[allow(missing_docs)]
    pub fn current_hash(&self) -> Option<ContentHash> {
        self.binding.map(|(hash, _)| hash)
    }

    #[allow(missing_docs)]
    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    /// Replaces the patch to be drawn, when the voxel group it represents has changed.
    ///
    /// The existing binding is kept until the next [`refresh()`](Self::refresh).
    pub fn set_patch(&mut self, patch: Patch) {
        self.patch = patch;
    }

    #[allow(missing_docs)]
    pub fn cache(&self) -> &Arc<TextureAtlasCache<S>> {
        &self.cache
    }
}

impl<S: AtlasStore> Drop for PatchTexture<S> {
    fn drop(&mut self) {
        if let Err(error) = self.destroy() {
            log::error!("failed to release patch texture on drop: {error}");
        }
    }
}
