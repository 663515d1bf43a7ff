use core::fmt;

use image::RgbaImage;
use sha2::{Digest as _, Sha256};

/// Digest of a rendered patch image, used as its key in the [`TextureAtlasCache`].
///
/// Images with identical dimensions and pixels have identical hashes; any difference gives
/// a different hash with overwhelming probability.
///
/// [`TextureAtlasCache`]: crate::TextureAtlasCache
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hashes the dimensions and RGBA bytes of `image`.
    pub fn of_image(image: &RgbaImage) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(image.width().to_le_bytes());
        hasher.update(image.height().to_le_bytes());
        hasher.update(image.as_raw());
        Self(hasher.finalize().into())
    }

    /// Constructs a hash from raw digest bytes, e.g. ones previously obtained from
    /// [`Self::as_bytes()`].
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[allow(missing_docs)]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Lowercase hexadecimal, 64 digits.
impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Abbreviated to the first 8 hex digits, which is plenty to tell entries apart in logs.
impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentHash(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        f.write_str("…)")
    }
}
