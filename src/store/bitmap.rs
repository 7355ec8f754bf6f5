//! Word-oriented bitmap payload

/// Width of a storage word in bits
pub const WORD_BITS: u64 = u64::BITS as u64;

/// Bitmap stored as a sequence of 64-bit words
///
/// Word 0 holds offsets 0..64, and bit 0 of a word is its least significant
/// bit. Offsets past the last word read as zero; high words are only
/// materialized when a 1 is written into them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitMap {
    words: Vec<u64>,
}

impl BitMap {
    /// Create an empty bitmap
    pub fn new() -> Self {
        BitMap { words: Vec::new() }
    }

    /// Create a bitmap from raw words (index 0 = least significant word)
    pub fn from_words(words: Vec<u64>) -> Self {
        BitMap { words }
    }

    /// Raw words
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Split an offset into (word index, bit index)
    ///
    /// The word index stays a u64 here; callers convert it with `try_from`
    /// so huge offsets on 32-bit targets fall out of range instead of
    /// wrapping.
    fn locate(offset: u64) -> (u64, u32) {
        (offset / WORD_BITS, (offset % WORD_BITS) as u32)
    }

    /// Read the bit at `offset`
    pub fn get(&self, offset: u64) -> bool {
        let (word, bit) = Self::locate(offset);

        usize::try_from(word)
            .ok()
            .and_then(|idx| self.words.get(idx))
            .map_or(false, |w| (w >> bit) & 1 == 1)
    }

    /// Write the bit at `offset` and return its previous value
    ///
    /// Returns None if the offset cannot be addressed on this platform.
    pub fn set(&mut self, offset: u64, value: bool) -> Option<bool> {
        let (word, bit) = Self::locate(offset);
        let idx = usize::try_from(word).ok()?;

        if idx >= self.words.len() {
            if !value {
                // Clearing an unmaterialized bit is a no-op
                return Some(false);
            }
            self.words.resize(idx.checked_add(1)?, 0);
        }

        let mask = 1u64 << bit;
        let previous = self.words[idx] & mask != 0;
        if value {
            self.words[idx] |= mask;
        } else {
            self.words[idx] &= !mask;
        }

        Some(previous)
    }

    /// Number of set bits
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Approximate heap usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }
}
