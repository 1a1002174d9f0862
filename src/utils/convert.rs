//! Byte encodings for sled keys.
//!
//! Every id is stored big-endian so that lexicographic key order matches
//! numeric order and prefix scans by poll or by voter work.

use crate::PollId;
use crate::Result;
use crate::StorageError;
use crate::VoterId;

/// Converts a `u64` to an 8-byte array in big-endian byte order.
///
/// # Examples
/// ```
/// use vote_engine::convert::safe_kv;
///
/// let bytes = safe_kv(0x1234_5678_9ABC_DEF0);
/// assert_eq!(bytes, [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0]);
/// ```
pub const fn safe_kv(num: u64) -> [u8; 8] {
    num.to_be_bytes()
}

pub fn safe_vk<K: AsRef<[u8]>>(bytes: K) -> Result<u64> {
    let bytes = bytes.as_ref();
    let array: [u8; 8] = bytes.try_into().map_err(|_| StorageError::DataCorruption {
        location: format!("u64 key: expected 8 bytes, received {} bytes", bytes.len()),
    })?;
    Ok(u64::from_be_bytes(array))
}

/// Two ids packed into one 16-byte key: `high ‖ low`.
pub fn pair_key(
    high: u64,
    low: u64,
) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&high.to_be_bytes());
    key[8..].copy_from_slice(&low.to_be_bytes());
    key
}

/// Splits a key produced by [`pair_key`].
pub fn split_pair_key<K: AsRef<[u8]>>(bytes: K) -> Result<(u64, u64)> {
    let bytes = bytes.as_ref();
    if bytes.len() != 16 {
        return Err(StorageError::DataCorruption {
            location: format!("pair key: expected 16 bytes, received {} bytes", bytes.len()),
        }
        .into());
    }
    Ok((safe_vk(&bytes[..8])?, safe_vk(&bytes[8..])?))
}

/// Key of the `votes` tree. The composite (poll, voter) key is the
/// uniqueness constraint of the ledger.
pub fn ballot_key(
    poll_id: PollId,
    voter_id: VoterId,
) -> [u8; 16] {
    pair_key(poll_id.0, voter_id.0)
}

/// Key of the `voter_polls` reverse index.
pub fn voter_poll_key(
    voter_id: VoterId,
    poll_id: PollId,
) -> [u8; 16] {
    pair_key(voter_id.0, poll_id.0)
}
