use xxhash_rust::xxh3::xxh3_128;

pub fn xxhash_base64_url(input: &[u8]) -> String {
  let hash = xxh3_128(input).to_le_bytes();
  base64_simd::URL_SAFE_NO_PAD.encode_to_string(hash)
}

/// A short, file-name safe digest. Stable across runs and platforms for the same input.
pub fn short_hash(input: &[u8], len: usize) -> String {
  let mut hash = xxhash_base64_url(input);
  hash.truncate(len);
  hash
}

#[test]
fn test_short_hash() {
  let a = short_hash(b"hello", 8);
  assert_eq!(a.len(), 8);
  assert_eq!(a, short_hash(b"hello", 8));
  assert_ne!(a, short_hash(b"hello!", 8));
  assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_')));
}
