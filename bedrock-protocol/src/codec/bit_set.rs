/// Fixed width bit vector. On the wire it is a varuint32 bit length followed by
/// `ceil(len / 8)` bytes, least significant byte first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitSet {
    len: usize,
    bytes: Vec<u8>,
}

impl BitSet {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            bytes: vec![0; len.div_ceil(8)],
        }
    }

    /// Builds a set from its wire bytes. Bits past `len` are cleared.
    pub fn from_bytes(len: usize, mut bytes: Vec<u8>) -> Self {
        bytes.resize(len.div_ceil(8), 0);
        if len % 8 != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << (len % 8)) - 1;
            }
        }
        Self { len, bytes }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn index(&self, i: usize) -> Option<(usize, u8)> {
        (i < self.len).then(|| (i / 8, 1 << (i % 8)))
    }

    /// Bits at or past [`BitSet::len`] read as unset.
    pub fn get(&self, i: usize) -> bool {
        self.index(i)
            .is_some_and(|(byte, mask)| self.bytes[byte] & mask != 0)
    }

    /// Returns false, leaving the set untouched, if `i` is out of range.
    #[must_use]
    pub fn set(&mut self, i: usize) -> bool {
        let Some((byte, mask)) = self.index(i) else {
            return false;
        };
        self.bytes[byte] |= mask;
        true
    }

    /// Returns false, leaving the set untouched, if `i` is out of range.
    #[must_use]
    pub fn unset(&mut self, i: usize) -> bool {
        let Some((byte, mask)) = self.index(i) else {
            return false;
        };
        self.bytes[byte] &= !mask;
        true
    }

    /// Indices of all set bits, in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|i| self.get(*i))
    }
}

#[cfg(test)]
mod test {
    use super::BitSet;

    #[test]
    fn test_set_get() {
        let mut set = BitSet::new(65);
        assert_eq!(set.as_bytes().len(), 9);
        assert!(set.set(0));
        assert!(set.set(9));
        assert!(set.set(64));
        assert!(set.get(9));
        assert!(!set.get(10));
        assert_eq!(set.as_bytes()[0], 0x01);
        assert_eq!(set.as_bytes()[1], 0x02);
        assert_eq!(set.as_bytes()[8], 0x01);
        assert!(set.unset(9));
        assert_eq!(set.ones().collect::<Vec<_>>(), [0, 64]);
    }

    #[test]
    fn test_out_of_range() {
        let mut set = BitSet::new(8);
        assert!(!set.set(8));
        assert!(!set.unset(100));
        assert!(!set.get(8));
        assert_eq!(set.as_bytes(), [0x00]);

        let empty = BitSet::default();
        assert!(!empty.get(0));
    }

    #[test]
    fn test_from_bytes_masks_tail() {
        let set = BitSet::from_bytes(4, vec![0xFF]);
        assert_eq!(set.as_bytes(), [0x0F]);
    }
}
