use crate::control::DELETED;
use crate::control::EMPTY;
use crate::control::GROUP_WIDTH;

cfg_if::cfg_if! {
    if #[cfg(all(
        target_arch = "x86_64",
        target_feature = "sse2",
        not(feature = "portable-group")
    ))] {
        use sse2 as backend;
    } else {
        use portable as backend;
    }
}

/// Name of the group matcher compiled into this build.
pub(crate) const BACKEND: &str = backend::NAME;

/// One bit per control byte of a group, bit `i` for byte `i`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct BitMask(pub(crate) u16);

impl BitMask {
    #[inline(always)]
    pub(crate) fn any_bit_set(self) -> bool {
        self.0 != 0
    }

    #[inline(always)]
    pub(crate) fn lowest_set_bit(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    #[inline(always)]
    pub(crate) fn remove_lowest_bit(self) -> Self {
        BitMask(self.0 & self.0.wrapping_sub(1))
    }
}

impl IntoIterator for BitMask {
    type Item = usize;
    type IntoIter = BitMaskIter;

    #[inline(always)]
    fn into_iter(self) -> BitMaskIter {
        BitMaskIter(self)
    }
}

pub(crate) struct BitMaskIter(BitMask);

impl Iterator for BitMaskIter {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        let bit = self.0.lowest_set_bit()?;
        self.0 = self.0.remove_lowest_bit();
        Some(bit)
    }
}

/// A copy of `GROUP_WIDTH` consecutive control bytes.
#[derive(Clone, Copy)]
pub(crate) struct Group([u8; GROUP_WIDTH]);

impl Group {
    /// Load a group starting at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `GROUP_WIDTH` bytes. No alignment is
    /// required.
    #[inline(always)]
    pub(crate) unsafe fn load(ptr: *const u8) -> Self {
        // SAFETY: Caller guarantees `GROUP_WIDTH` readable bytes at `ptr`.
        Group(unsafe { core::ptr::read_unaligned(ptr as *const [u8; GROUP_WIDTH]) })
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; GROUP_WIDTH]) -> Self {
        Group(bytes)
    }

    /// Positions whose control byte equals `byte`.
    #[inline(always)]
    pub(crate) fn match_byte(self, byte: u8) -> BitMask {
        BitMask(backend::match_byte(&self.0, byte))
    }

    #[inline(always)]
    pub(crate) fn match_empty(self) -> BitMask {
        self.match_byte(EMPTY)
    }

    /// Positions an insertion may claim.
    #[inline(always)]
    pub(crate) fn match_empty_or_deleted(self) -> BitMask {
        BitMask(backend::match_byte(&self.0, EMPTY) | backend::match_byte(&self.0, DELETED))
    }

    #[inline(always)]
    pub(crate) fn match_full(self) -> BitMask {
        BitMask(backend::match_full(&self.0))
    }
}

/// Bit-trick matcher working on two 64-bit words.
///
/// The usual `(v - 0x01..01) & !v & 0x80..80` zero-byte test can flag a
/// `0x01` byte sitting above a real zero because of borrow propagation. That
/// is harmless for fragment matches, which are verified against the key, but
/// not for empty-slot searches, so the carry-free form is used instead and
/// the result is exact.
#[cfg_attr(
    all(
        target_arch = "x86_64",
        target_feature = "sse2",
        not(feature = "portable-group"),
        not(test)
    ),
    allow(dead_code)
)]
pub(crate) mod portable {
    use crate::control::GROUP_WIDTH;

    pub(crate) const NAME: &str = "portable";

    const LSB: u64 = 0x0101_0101_0101_0101;
    const MSB: u64 = 0x8080_8080_8080_8080;
    const LOW7: u64 = 0x7F7F_7F7F_7F7F_7F7F;

    #[inline(always)]
    fn words(bytes: &[u8; GROUP_WIDTH]) -> (u64, u64) {
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&bytes[..8]);
        hi.copy_from_slice(&bytes[8..]);
        (u64::from_le_bytes(lo), u64::from_le_bytes(hi))
    }

    /// Sets the high bit of every zero byte of `word` and nothing else.
    #[inline(always)]
    fn zero_bytes(word: u64) -> u64 {
        !((word & LOW7).wrapping_add(LOW7) | word | LOW7)
    }

    /// Gathers the high bit of each byte into the low 8 bits.
    #[inline(always)]
    fn compress(high_bits: u64) -> u16 {
        ((high_bits >> 7).wrapping_mul(0x0102_0408_1020_4080) >> 56) as u16
    }

    #[inline(always)]
    pub(crate) fn match_byte(bytes: &[u8; GROUP_WIDTH], byte: u8) -> u16 {
        let (lo, hi) = words(bytes);
        let pattern = LSB.wrapping_mul(byte as u64);
        compress(zero_bytes(lo ^ pattern)) | (compress(zero_bytes(hi ^ pattern)) << 8)
    }

    #[inline(always)]
    pub(crate) fn match_full(bytes: &[u8; GROUP_WIDTH]) -> u16 {
        let (lo, hi) = words(bytes);
        compress(!lo & MSB) | (compress(!hi & MSB) << 8)
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
#[cfg_attr(feature = "portable-group", allow(dead_code))]
mod sse2 {
    use core::arch::x86_64::*;

    use crate::control::GROUP_WIDTH;

    pub(crate) const NAME: &str = "sse2";

    #[inline(always)]
    pub(crate) fn match_byte(bytes: &[u8; GROUP_WIDTH], byte: u8) -> u16 {
        // SAFETY: SSE2 is statically enabled for this target and `bytes` is
        // exactly 16 readable bytes; `_mm_loadu_si128` has no alignment
        // requirement.
        unsafe {
            let data = _mm_loadu_si128(bytes.as_ptr() as *const __m128i);
            let cmp = _mm_cmpeq_epi8(data, _mm_set1_epi8(byte as i8));
            _mm_movemask_epi8(cmp) as u16
        }
    }

    /// Full bytes are the ones with the sign bit clear.
    #[inline(always)]
    pub(crate) fn match_full(bytes: &[u8; GROUP_WIDTH]) -> u16 {
        // SAFETY: See `match_byte`.
        unsafe {
            let data = _mm_loadu_si128(bytes.as_ptr() as *const __m128i);
            !(_mm_movemask_epi8(data) as u16)
        }
    }
}
