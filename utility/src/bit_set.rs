#[derive(Default, Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    blocks: Vec<u64>,
    len: usize,
}

impl BitSet {
    const BLOCK_BITS: usize = u64::BITS as usize;

    pub fn new(len: usize) -> Self {
        Self {
            blocks: vec![0; len.div_ceil(Self::BLOCK_BITS)],
            len,
        }
    }

    pub fn from_indices(len: usize, indices: impl Iterator<Item = usize>) -> Self {
        let mut bit_set = Self::new(len);
        for index in indices {
            bit_set.insert(index);
        }
        return bit_set;
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn contains(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        return (self.blocks[index / Self::BLOCK_BITS] >> (index % Self::BLOCK_BITS)) & 1 == 1;
    }

    #[inline(always)]
    pub fn insert(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.blocks[index / Self::BLOCK_BITS] |= 1u64 << (index % Self::BLOCK_BITS);
    }

    #[inline(always)]
    pub fn remove(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.blocks[index / Self::BLOCK_BITS] &= !(1u64 << (index % Self::BLOCK_BITS));
    }

    #[inline(always)]
    pub fn toggle(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.blocks[index / Self::BLOCK_BITS] ^= 1u64 << (index % Self::BLOCK_BITS);
    }

    pub fn xor_assign(&mut self, other: &BitSet) {
        debug_assert!(self.len == other.len);
        for (lhs, rhs) in self.blocks.iter_mut().zip(other.blocks.iter()) {
            *lhs ^= rhs;
        }
    }

    pub fn is_zero(&self) -> bool {
        return self.blocks.iter().all(|&block| block == 0);
    }

    pub fn first_one(&self) -> Option<usize> {
        for (b, &block) in self.blocks.iter().enumerate() {
            if block != 0 {
                return Some(b * Self::BLOCK_BITS + block.trailing_zeros() as usize);
            }
        }
        return None;
    }

    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + Clone + '_ {
        self.blocks.iter().enumerate().flat_map(|(b, &block)| {
            let mut rest = block;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let offset = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                return Some(b * Self::BLOCK_BITS + offset);
            })
        })
    }
}

impl std::fmt::Debug for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for index in 0..self.len {
            write!(f, "{}", if self.contains(index) { '1' } else { '0' })?;
        }
        return Ok(());
    }
}

impl std::fmt::Display for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Debug>::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    use super::BitSet;

    #[test]
    fn test_basic_operations() {
        let mut bit_set = BitSet::new(130);
        assert!(bit_set.is_zero());
        assert_eq!(bit_set.first_one(), None);

        bit_set.insert(0);
        bit_set.insert(64);
        bit_set.insert(129);
        assert_eq!(bit_set.first_one(), Some(0));
        assert_eq!(bit_set.iter_ones().collect::<Vec<_>>(), vec![0, 64, 129]);

        bit_set.remove(0);
        bit_set.toggle(64);
        bit_set.toggle(65);
        assert_eq!(bit_set.iter_ones().collect::<Vec<_>>(), vec![65, 129]);
        assert_eq!(bit_set.first_one(), Some(65));
        assert!(bit_set.contains(129));
        assert!(!bit_set.contains(64));
    }

    #[test]
    fn test_xor_assign_is_involution() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..100 {
            let len = rng.gen_range(0..200);
            let lhs = BitSet::from_indices(len, (0..len).filter(|_| rng.gen_bool(0.5)));
            let rhs = BitSet::from_indices(len, (0..len).filter(|_| rng.gen_bool(0.5)));
            let mut sum = lhs.clone();
            sum.xor_assign(&rhs);
            for index in 0..len {
                assert_eq!(sum.contains(index), lhs.contains(index) != rhs.contains(index));
            }
            sum.xor_assign(&rhs);
            assert_eq!(sum, lhs);
        }
    }

    #[test]
    fn test_debug_format() {
        let bit_set = BitSet::from_indices(5, [1, 4].into_iter());
        assert_eq!(format!("{:?}", bit_set), "01001");
    }
}
