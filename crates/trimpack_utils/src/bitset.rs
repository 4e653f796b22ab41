use std::fmt::{Debug, Display};

/// A fixed-size set of entry indices. Code splitting groups modules by the set of entries
/// reaching them, so equality and hashing of the whole set matter more than speed of single ops.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitSet {
  entries: Vec<u8>,
}

impl BitSet {
  pub fn new(max_bit_count: u32) -> Self {
    Self { entries: vec![0; max_bit_count.div_ceil(8) as usize] }
  }

  pub fn has_bit(&self, bit: u32) -> bool {
    (self.entries[bit as usize / 8] & (1 << (bit & 7))) != 0
  }

  pub fn set_bit(&mut self, bit: u32) {
    self.entries[bit as usize / 8] |= 1 << (bit & 7);
  }

  pub fn is_empty(&self) -> bool {
    self.entries.iter().all(|byte| *byte == 0)
  }
}

impl Display for BitSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let bits = self.entries.iter().rev().map(|byte| format!("{byte:08b}")).collect::<Vec<_>>();
    write!(f, "{}", bits.join("_"))
  }
}

impl Debug for BitSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("BitSet").field(&self.to_string()).finish()
  }
}

#[test]
fn test_bitset() {
  let mut bs = BitSet::new(10);
  assert!(bs.is_empty());
  bs.set_bit(0);
  bs.set_bit(9);
  assert!(bs.has_bit(9));
  assert!(!bs.has_bit(8));
  assert!(!bs.is_empty());
  assert_eq!(bs.to_string(), "00000010_00000001");

  let mut same = BitSet::new(10);
  same.set_bit(9);
  same.set_bit(0);
  assert_eq!(bs, same);
}
