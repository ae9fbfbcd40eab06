use std::sync::LazyLock;

use crate::error::{CoreError, CoreResult};

/// Number of symbols in every gradient alphabet.
pub const GRADIENT_LEN: usize = 16;

/// Alphabet of the text artifact, ordered most ink → least ink.
///
/// Density-ordered for plain-text readability. Index 0 is the darkest
/// intensity, index 15 (space) the lightest.
pub const SAMPLE_GRADIENT: [char; GRADIENT_LEN] = [
    '@', '&', '%', '#', '*', '+', '~', '=', '_', '-', ';', ':', '`', '\'', '.', ' ',
];

/// Alphabet used when a text artifact is rasterized, ordered most ink → least ink.
///
/// Ordered by ink coverage of typical monospace fonts, so rendered cells keep
/// the visual density of the sampled ones.
pub const RENDER_GRADIENT: [char; GRADIENT_LEN] = [
    '$', '&', '8', 'W', 'M', 'B', '@', '%', '#', '*', '+', '=', '-', ':', '.', ' ',
];

/// Gradient index of an intensity: `intensity * 15 / 255`, truncating.
///
/// # Example
/// ```
/// use ap_core::charset::gradient_index;
/// assert_eq!(gradient_index(0), 0);
/// assert_eq!(gradient_index(255), 15);
/// assert_eq!(gradient_index(16), 0);
/// assert_eq!(gradient_index(17), 1);
/// ```
#[inline(always)]
#[must_use]
pub fn gradient_index(intensity: u8) -> usize {
    usize::from(intensity) * (GRADIENT_LEN - 1) / 255
}

/// Map an intensity to a symbol of `alphabet`.
///
/// # Example
/// ```
/// use ap_core::charset::{char_for_intensity, SAMPLE_GRADIENT};
/// assert_eq!(char_for_intensity(0, &SAMPLE_GRADIENT), '@');
/// assert_eq!(char_for_intensity(255, &SAMPLE_GRADIENT), ' ');
/// ```
#[inline(always)]
#[must_use]
pub fn char_for_intensity(intensity: u8, alphabet: &[char; GRADIENT_LEN]) -> char {
    alphabet[gradient_index(intensity)]
}

/// Lookup table mapping intensity [0..255] → gradient character.
///
/// Pre-computed once for O(1) per-cell cost.
///
/// # Example
/// ```
/// use ap_core::charset::{GradientLut, SAMPLE_GRADIENT};
/// let lut = GradientLut::new(&SAMPLE_GRADIENT);
/// assert_eq!(lut.map(0), '@');
/// assert_eq!(lut.map(255), ' ');
/// ```
pub struct GradientLut {
    lut: [char; 256],
}

impl GradientLut {
    /// Build the table for a 16-symbol alphabet.
    #[must_use]
    pub fn new(alphabet: &[char; GRADIENT_LEN]) -> Self {
        let mut lut = [' '; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = char_for_intensity(i as u8, alphabet);
        }
        Self { lut }
    }

    /// Map an intensity to its character.
    #[inline(always)]
    #[must_use]
    pub fn map(&self, intensity: u8) -> char {
        self.lut[usize::from(intensity)]
    }
}

/// Closed mapping from [`SAMPLE_GRADIENT`] symbols to [`RENDER_GRADIENT`] symbols.
///
/// Indexed by byte value. Only the 16 sampling symbols have an entry; any
/// other character is an [`CoreError::UnmappedCharacter`].
pub struct RenderCharMap {
    table: [Option<char>; 128],
}

impl RenderCharMap {
    /// Build the table. Prefer the shared [`RENDER_CHAR_MAP`].
    #[must_use]
    pub fn new() -> Self {
        let mut table = [None; 128];
        for (src, dst) in SAMPLE_GRADIENT.iter().zip(RENDER_GRADIENT.iter()) {
            table[*src as usize] = Some(*dst);
        }
        Self { table }
    }

    /// Translate a sampled character into its render glyph.
    ///
    /// `position` is only used to describe the error.
    ///
    /// # Errors
    /// Returns [`CoreError::UnmappedCharacter`] if `ch` is not a sampling symbol.
    ///
    /// # Example
    /// ```
    /// use ap_core::charset::RENDER_CHAR_MAP;
    /// assert_eq!(RENDER_CHAR_MAP.map('@', 0).unwrap(), '$');
    /// assert_eq!(RENDER_CHAR_MAP.map(' ', 0).unwrap(), ' ');
    /// assert!(RENDER_CHAR_MAP.map('x', 3).is_err());
    /// ```
    #[inline]
    pub fn map(&self, ch: char, position: usize) -> CoreResult<char> {
        self.table
            .get(ch as usize)
            .copied()
            .flatten()
            .ok_or(CoreError::UnmappedCharacter { ch, position })
    }
}

impl Default for RenderCharMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, immutable sample → render table.
pub static RENDER_CHAR_MAP: LazyLock<RenderCharMap> = LazyLock::new(RenderCharMap::new);
