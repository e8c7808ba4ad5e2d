use crate::control::group_bits;

/// Triangular probe over group indices.
///
/// With a power-of-two group count, the offsets `0, 1, 3, 6, 10, ...` taken
/// modulo the count hit every group exactly once, so the sequence yields
/// `group_mask + 1` indices and then stops.
#[derive(Clone)]
pub(crate) struct ProbeSeq {
    group: usize,
    stride: usize,
    group_mask: usize,
    remaining: usize,
}

impl ProbeSeq {
    #[inline(always)]
    pub(crate) fn new(hash: u64, group_mask: usize) -> Self {
        debug_assert!(group_mask.wrapping_add(1).is_power_of_two());
        ProbeSeq {
            group: group_bits(hash) & group_mask,
            stride: 0,
            group_mask,
            remaining: group_mask + 1,
        }
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let group = self.group;
        self.stride += 1;
        self.group = (self.group + self.stride) & self.group_mask;
        Some(group)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProbeSeq {}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn visits_every_group_once() {
        for shift in 0..12 {
            let groups = 1usize << shift;
            for start in [0u64, 1, 7, 0x1234_5678, u64::MAX] {
                let mut seen = vec![false; groups];
                let seq = ProbeSeq::new(start, groups - 1);
                assert_eq!(seq.len(), groups);
                for group in seq {
                    assert!(!seen[group], "group {group} visited twice ({groups} groups)");
                    seen[group] = true;
                }
                assert!(seen.iter().all(|s| *s));
            }
        }
    }

    #[test]
    fn starts_at_hash_group() {
        let hash = (5u64 << 7) | 0x2A;
        let seq: Vec<usize> = ProbeSeq::new(hash, 7).collect();
        assert_eq!(seq[0], 5);
        assert_eq!(&seq[..4], &[5, 6, 0, 3]);
    }

    #[test]
    fn single_group() {
        let seq: Vec<usize> = ProbeSeq::new(u64::MAX, 0).collect();
        assert_eq!(seq, [0]);
    }
}
