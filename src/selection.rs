//! Selection Policy: a pure function choosing the best endpoint from a
//! registry snapshot.
//!
//! Iterates in list order, carrying a running winner seeded with a
//! synthetic `{ last_block: -infinity, last_response_time: +infinity }` so
//! that the first non-failed candidate always beats it. Earlier list
//! position is an implicit tie-breaker: both replacement rules below use
//! strict inequalities, so the incumbent wins ties.

use crate::registry::Endpoint;

/// Choose the best endpoint in `servers`, or `None` if every candidate is
/// `failed`.
///
/// `allowed_blocks_behind` is the tolerance window: a candidate must be
/// strictly ahead of the winner by more than this many blocks to win purely
/// on freshness; within tolerance, the tie-break is lower `last_response_time_ms`
/// at the *same* block height as the winner.
pub fn select(servers: &[Endpoint], allowed_blocks_behind: i64) -> Option<usize> {
    let mut winner_index: Option<usize> = None;
    let mut winner_last_block: i64 = i64::MIN;
    let mut winner_response_time: u64 = u64::MAX;

    for (index, candidate) in servers.iter().enumerate() {
        if candidate.failed {
            continue;
        }

        let candidate_block = candidate.last_block as i64;

        if candidate_block - allowed_blocks_behind > winner_last_block {
            winner_index = Some(index);
            winner_last_block = candidate_block;
            winner_response_time = candidate.last_response_time_ms;
        } else if candidate_block == winner_last_block
            && candidate.last_response_time_ms < winner_response_time
        {
            winner_index = Some(index);
            winner_response_time = candidate.last_response_time_ms;
        }
    }

    winner_index
}
