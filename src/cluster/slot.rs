//! Key-to-slot hashing for the fixed 16384-slot hash space.

use crc::{Crc, CRC_16_XMODEM};

/// Number of hash slots a cluster partitions keys across.
pub const SLOT_COUNT: u16 = 16384;

/// CRC-16/XMODEM, the checksum Redis Cluster hashes keys with.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Computes the hash slot owning `key`.
///
/// If the key contains a hash tag — a non-empty `{...}` substring, taking
/// the first `{` and the first `}` after it — only the tag is hashed, so
/// related keys can be forced onto the same slot. Deterministic and total:
/// the empty key hashes to slot 0 (CRC16 of no bytes is 0) and that value
/// is stable.
///
/// # Examples
///
/// ```
/// use shardis::key_slot;
///
/// assert_eq!(key_slot(b"{user1000}.following"), key_slot(b"{user1000}.followers"));
/// assert_ne!(key_slot(b"user1000"), key_slot(b"user2000"));
/// ```
pub fn key_slot(key: &[u8]) -> u16 {
    CRC16.checksum(hash_tag(key)) % SLOT_COUNT
}

/// Returns the hash-tag substring of `key`, or the whole key when no valid
/// (non-empty, properly delimited) tag exists.
fn hash_tag(key: &[u8]) -> &[u8] {
    if let Some(open) = key.iter().position(|&b| b == b'{') {
        if let Some(len) = key[open + 1..].iter().position(|&b| b == b'}') {
            if len > 0 {
                return &key[open + 1..open + 1 + len];
            }
        }
    }
    key
}
