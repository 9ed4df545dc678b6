//! Replays a chain and reports the first inconsistency.

use std::fmt;

use thiserror::Error;

use crate::{constants::GENESIS_PREVIOUS_HASH, Block};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationReason {
    /// Stored `hash` differs from the digest recomputed over the block content.
    HashMismatch,
    /// `previous_hash` does not name the preceding block (or `"0"` for genesis).
    LinkBroken,
    /// `index` is not one more than the preceding block's index.
    IndexGap,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolationReason::HashMismatch => "hash mismatch",
            ViolationReason::LinkBroken => "link broken",
            ViolationReason::IndexGap => "index gap",
        };
        f.write_str(s)
    }
}

/// `index` is the 1-based position in the chain, which stays meaningful even
/// when the stored index field is the thing that is wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("integrity violation at block {index}: {reason}")]
pub struct IntegrityViolation {
    pub index: u64,
    pub reason: ViolationReason,
}

/// Walks the chain from genesis to tip. Per block the link is checked first,
/// then the hash, then the index, so a rewritten `previous_hash` reports
/// `LinkBroken` and any other edit to a sealed block reports `HashMismatch`.
pub fn verify_chain(chain: &[Block]) -> Result<(), IntegrityViolation> {
    let mut previous: Option<&Block> = None;

    for (pos, block) in chain.iter().enumerate() {
        let at = pos as u64 + 1;
        let violation = |reason| IntegrityViolation { index: at, reason };

        let expected_link = previous.map_or(GENESIS_PREVIOUS_HASH, |p| p.hash());
        if block.previous_hash() != expected_link {
            return Err(violation(ViolationReason::LinkBroken));
        }

        match block.content_digest() {
            Ok(digest) if digest == block.hash() => {}
            _ => return Err(violation(ViolationReason::HashMismatch)),
        }

        let expected_index = previous.map_or(1, |p| p.index() + 1);
        if block.index() != expected_index {
            return Err(violation(ViolationReason::IndexGap));
        }

        previous = Some(block);
    }

    Ok(())
}
