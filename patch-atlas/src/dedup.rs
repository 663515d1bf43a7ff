//! [`TextureAtlasCache`]: reference-counted, content-addressed storage of patch textures.

use alloc::vec::Vec;
use core::fmt;
use core::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use hashbrown::HashMap;
use image::RgbaImage;

use crate::ContentHash;

/// Identifies an image registered with an [`AtlasStore`]; this is what meshes refer to
/// in order to be drawn with the texture.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

/// The destination of patch textures: a GPU texture atlas, an export buffer, etc.
///
/// [`TextureAtlasCache`] guarantees that each hash is loaded at most once until it has
/// been evicted, and that every eviction matches a previous load.
pub trait AtlasStore {
    /// Registers `image` under `hash` and returns the slot it can be drawn from.
    fn load_image(&mut self, hash: ContentHash, image: RgbaImage) -> SlotId;

    /// Unregisters the image previously loaded as `hash` into `slot`.
    fn evict_image(&mut self, hash: ContentHash, slot: SlotId);
}

/// Errors reported by [`TextureAtlasCache`].
///
/// All of these indicate that some owner of a binding released it more times than it
/// acquired it, so the cache's counts can no longer be trusted.
#[derive(Clone, Debug, Eq, Hash, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum AtlasError {
    /// A hash was released that has no entry.
    #[error("released texture {0} which is not in the atlas cache")]
    UntrackedHash(ContentHash),
    /// An earlier operation on this cache failed or panicked.
    #[error("atlas cache is unusable because a previous operation on it failed")]
    Failed,
}

/// The state of one hash in a [`TextureAtlasCache`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AtlasEntry {
    slot: SlotId,
    refcount: NonZeroUsize,
}

impl AtlasEntry {
    /// Where the image for this entry was loaded.
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Number of bindings currently referring to this entry; always at least 1.
    pub fn refcount(&self) -> usize {
        self.refcount.get()
    }
}

/// Content-addressed, reference-counted cache in front of an [`AtlasStore`].
///
/// Identical images are loaded into the store only once, and are evicted when the last
/// binding to them is released.
///
/// Acquire and release take a lock which guards both the entry table and the store, so
/// the cache may be shared between threads (typically via `Arc`) without the counts being
/// disturbed.
pub struct TextureAtlasCache<S> {
    state: Mutex<State<S>>,
}

struct State<S> {
    entries: HashMap<ContentHash, AtlasEntry>,
    store: S,
    /// Set when an invariant violation is detected; all further operations fail.
    failed: bool,
}

impl<S: AtlasStore> TextureAtlasCache<S> {
    /// Creates an empty cache which loads images into `store`.
    pub fn new(store: S) -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::new(),
                store,
                failed: false,
            }),
        }
    }

    /// Adds one reference to the image with `hash`, and returns the slot it is loaded in.
    ///
    /// If the hash is new, `image` is called to produce the image, which is loaded into the
    /// store. Otherwise `image` is not called.
    pub fn acquire<F>(&self, hash: ContentHash, image: F) -> Result<SlotId, AtlasError>
    where
        F: FnOnce() -> RgbaImage,
    {
        let mut state = self.lock()?;
        let State { entries, store, .. } = &mut *state;
        match entries.get_mut(&hash) {
            Some(entry) => {
                entry.refcount = entry.refcount.saturating_add(1);
                log::trace!("{hash:?} now has {} references", entry.refcount);
                Ok(entry.slot)
            }
            None => {
                let slot = store.load_image(hash, image());
                log::debug!("loaded {hash:?} into {slot}");
                entries.insert(
                    hash,
                    AtlasEntry {
                        slot,
                        refcount: NonZeroUsize::MIN,
                    },
                );
                Ok(slot)
            }
        }
    }

    /// Removes one reference to the image with `hash`, evicting it from the store if that
    /// was the last one.
    ///
    /// Releasing a hash that has no entry is an error, after which the cache refuses all
    /// further operations.
    pub fn release(&self, hash: ContentHash) -> Result<(), AtlasError> {
        let mut state = self.lock()?;
        let State {
            entries,
            store,
            failed,
        } = &mut *state;
        let Some(entry) = entries.get_mut(&hash) else {
            *failed = true;
            log::error!("released {hash:?} which has no atlas cache entry");
            return Err(AtlasError::UntrackedHash(hash));
        };
        match NonZeroUsize::new(entry.refcount.get() - 1) {
            Some(decremented) => {
                entry.refcount = decremented;
                log::trace!("{hash:?} now has {decremented} references");
            }
            None => {
                let slot = entry.slot;
                entries.remove(&hash);
                store.evict_image(hash, slot);
                log::debug!("evicted {hash:?} from {slot}");
            }
        }
        Ok(())
    }

    /// Returns the entry for `hash`, if it is currently loaded.
    pub fn entry(&self, hash: ContentHash) -> Result<Option<AtlasEntry>, AtlasError> {
        Ok(self.lock()?.entries.get(&hash).copied())
    }

    /// Returns the number of references to `hash`; zero if it has no entry.
    pub fn refcount(&self, hash: ContentHash) -> Result<usize, AtlasError> {
        Ok(self.entry(hash)?.map_or(0, |entry| entry.refcount()))
    }

    /// Returns all current entries, in no particular order.
    pub fn entries(&self) -> Result<Vec<(ContentHash, AtlasEntry)>, AtlasError> {
        Ok(self
            .lock()?
            .entries
            .iter()
            .map(|(&hash, &entry)| (hash, entry))
            .collect())
    }

    /// Number of distinct images currently loaded.
    pub fn len(&self) -> Result<usize, AtlasError> {
        Ok(self.lock()?.entries.len())
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> Result<bool, AtlasError> {
        Ok(self.len()? == 0)
    }

    /// Calls `f` with the store, for inspection.
    ///
    /// Do not call back into this cache from `f`; that will deadlock.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> Result<R, AtlasError> {
        Ok(f(&self.lock()?.store))
    }

    fn lock(&self) -> Result<MutexGuard<'_, State<S>>, AtlasError> {
        // A panic while the lock was held may have left the counts inconsistent with the
        // store, so poisoning is treated the same as a detected invariant violation.
        let state = self.state.lock().map_err(|_| AtlasError::Failed)?;
        if state.failed {
            Err(AtlasError::Failed)
        } else {
            Ok(state)
        }
    }
}

impl<S: AtlasStore + Default> Default for TextureAtlasCache<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: fmt::Debug> fmt::Debug for TextureAtlasCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ds = f.debug_struct("TextureAtlasCache");
        match self.state.try_lock() {
            Ok(state) => ds
                .field("entries", &state.entries)
                .field("store", &state.store)
                .field("failed", &state.failed),
            Err(_) => ds.field("state", &"<locked>"),
        };
        ds.finish()
    }
}

/// [`AtlasStore`] that keeps the images in memory, as a flat list of independently sized
/// images with sequentially assigned slots.
///
/// Slots of evicted images are not reused.
#[derive(Clone, Debug, Default)]
pub struct MemoryAtlas {
    images: HashMap<SlotId, (ContentHash, RgbaImage)>,
    next_slot: u32,
}

impl MemoryAtlas {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the image in `slot`, if it is loaded.
    pub fn image(&self, slot: SlotId) -> Option<&RgbaImage> {
        self.images.get(&slot).map(|(_, image)| image)
    }

    /// Returns the hash the image in `slot` was loaded under.
    pub fn hash(&self, slot: SlotId) -> Option<ContentHash> {
        self.images.get(&slot).map(|&(hash, _)| hash)
    }

    /// Number of images currently loaded.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl AtlasStore for MemoryAtlas {
    fn load_image(&mut self, hash: ContentHash, image: RgbaImage) -> SlotId {
        let slot = SlotId(self.next_slot);
        self.next_slot += 1;
        self.images.insert(slot, (hash, image));
        slot
    }

    fn evict_image(&mut self, hash: ContentHash, slot: SlotId) {
        let removed = self.images.remove(&slot);
        debug_assert!(
            removed.as_ref().is_some_and(|(h, _)| *h == hash),
            "evicted {slot} as {hash:?} but it held {removed:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestAtlasStore;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    fn solid(color: [u8; 4]) -> (ContentHash, RgbaImage) {
        let image = RgbaImage::from_pixel(2, 2, Rgba(color));
        (ContentHash::of_image(&image), image)
    }

    #[test]
    fn acquire_new_loads_once() {
        let cache = TextureAtlasCache::new(TestAtlasStore::new());
        let (hash, image) = solid([1, 2, 3, 255]);

        let slot1 = cache.acquire(hash, || image.clone()).unwrap();
        let slot2 = cache
            .acquire(hash, || panic!("should not render a cached image"))
            .unwrap();
        assert_eq!(slot1, slot2);
        assert_eq!(cache.refcount(hash), Ok(2));
        assert_eq!(cache.with_store(|s| s.count_loaded()), Ok(1));
        assert_eq!(cache.len(), Ok(1));
    }

    #[test]
    fn release_to_zero_evicts_once() {
        let cache = TextureAtlasCache::new(TestAtlasStore::new());
        let (hash, image) = solid([1, 2, 3, 255]);
        let slot = cache.acquire(hash, || image.clone()).unwrap();
        cache.acquire(hash, || image.clone()).unwrap();

        cache.release(hash).unwrap();
        assert_eq!(cache.refcount(hash), Ok(1));
        assert_eq!(cache.with_store(|s| s.count_evicted()), Ok(0));

        cache.release(hash).unwrap();
        assert_eq!(cache.entry(hash), Ok(None));
        assert_eq!(cache.is_empty(), Ok(true));
        assert_eq!(cache.with_store(|s| s.evicted().to_vec()), Ok(vec![(hash, slot)]));
    }

    #[test]
    fn distinct_images_get_distinct_slots() {
        let cache = TextureAtlasCache::new(MemoryAtlas::new());
        let (hash_a, image_a) = solid([255, 0, 0, 255]);
        let (hash_b, image_b) = solid([0, 0, 255, 255]);
        let slot_a = cache.acquire(hash_a, || image_a.clone()).unwrap();
        let slot_b = cache.acquire(hash_b, || image_b.clone()).unwrap();
        assert_ne!(slot_a, slot_b);
        assert_eq!(
            cache.with_store(|s| s.image(slot_b).cloned()),
            Ok(Some(image_b))
        );
        assert_eq!(cache.with_store(|s| s.hash(slot_a)), Ok(Some(hash_a)));
        let mut entries = cache.entries().unwrap();
        entries.sort_by_key(|&(_, entry)| entry.slot());
        assert_eq!(
            entries.iter().map(|&(h, _)| h).collect::<Vec<_>>(),
            vec![hash_a, hash_b]
        );
    }

    #[test]
    fn reacquire_after_eviction_loads_again() {
        let cache = TextureAtlasCache::new(MemoryAtlas::new());
        let (hash, image) = solid([9, 9, 9, 255]);
        let first = cache.acquire(hash, || image.clone()).unwrap();
        cache.release(hash).unwrap();
        let second = cache.acquire(hash, || image.clone()).unwrap();
        assert_ne!(first, second);
        assert_eq!(cache.with_store(|s| s.len()), Ok(1));
    }

    #[test]
    fn release_untracked_is_fatal() {
        let cache = TextureAtlasCache::new(TestAtlasStore::new());
        let (hash, image) = solid([1, 1, 1, 255]);
        let (other, _) = solid([2, 2, 2, 255]);
        cache.acquire(hash, || image.clone()).unwrap();

        assert_eq!(cache.release(other), Err(AtlasError::UntrackedHash(other)));
        // The cache refuses to continue rather than guessing.
        assert_eq!(cache.release(hash), Err(AtlasError::Failed));
        assert_eq!(
            cache.acquire(hash, || image.clone()),
            Err(AtlasError::Failed)
        );
        assert_eq!(cache.with_store(|s| s.count_evicted()), Err(AtlasError::Failed));
    }

    #[test]
    fn error_messages() {
        let hash = ContentHash::from_bytes([0; 32]);
        assert_eq!(
            AtlasError::UntrackedHash(hash).to_string(),
            format!("released texture {hash} which is not in the atlas cache")
        );
    }
}
