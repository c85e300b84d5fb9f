//! Threshold arithmetic for size maintenance, shared by every workload that
//! implements it so they all agree on when cleanup starts.
use crate::SIZE_TOLERANCE;

/// Size above which maintenance starts deleting data.
pub fn cleanup_threshold(target_size: u64) -> u64 {
    (target_size as f64 * SIZE_TOLERANCE) as u64
}

/// Whether `current_size` is far enough past `target_size` to warrant deletion.
pub fn needs_cleanup(current_size: u64, target_size: u64) -> bool {
    current_size > cleanup_threshold(target_size)
}

/// Bytes to reclaim to get back down to `target_size`. Zero while inside the tolerance.
pub fn excess(current_size: u64, target_size: u64) -> u64 {
    if needs_cleanup(current_size, target_size) {
        current_size - target_size
    } else {
        0
    }
}
