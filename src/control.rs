//! Control byte encoding.
//!
//! Every slot owns one control byte. A byte with the high bit clear is
//! occupied and carries a 7-bit fragment of the element's hash; the remaining
//! values are the special markers below. Special markers all have the sign bit
//! set so the SSE2 backend can tell them apart from fragments with a single
//! `movemask`.

/// Number of control bytes scanned together by the group matcher.
pub(crate) const GROUP_WIDTH: usize = 16;

/// Marks a slot that has never held a value since the last rehash or clear.
///
/// Probing for a key stops at the first group containing this byte.
pub(crate) const EMPTY: u8 = 0x80;

/// Marks a slot whose value was removed while its group had no empty byte.
///
/// Probes walk through tombstones, insertions may reuse them.
pub(crate) const DELETED: u8 = 0xFE;

/// Marks the end of the per-slot control bytes and fills the guard bytes.
///
/// Never reported as empty, deleted, or full.
pub(crate) const SENTINEL: u8 = 0xFF;

const FRAGMENT_BITS: u32 = 7;

/// Low 7 bits of the hash, stored in the control byte of an occupied slot.
#[inline(always)]
pub(crate) fn fragment(hash: u64) -> u8 {
    (hash & ((1 << FRAGMENT_BITS) - 1)) as u8
}

/// Hash bits above the fragment, used to pick the first group to probe.
#[inline(always)]
pub(crate) fn group_bits(hash: u64) -> usize {
    (hash >> FRAGMENT_BITS) as usize
}

#[inline(always)]
pub(crate) fn is_full(byte: u8) -> bool {
    byte & 0x80 == 0
}

/// Decoded view of a control byte, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    Empty,
    Deleted,
    Sentinel,
    Full(u8),
}

impl From<u8> for Control {
    #[inline]
    fn from(byte: u8) -> Self {
        match byte {
            EMPTY => Control::Empty,
            DELETED => Control::Deleted,
            SENTINEL => Control::Sentinel,
            b if is_full(b) => Control::Full(b),
            b => unreachable!("invalid control byte {b:#04x}"),
        }
    }
}
