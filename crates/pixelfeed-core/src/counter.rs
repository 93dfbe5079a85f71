//! Counter partitioning.
//!
//! The cumulative pixel count is written as a 12-digit zero-padded decimal
//! and split into 3-digit slices, one per feed. Only all feeds together
//! show the whole number.

use crate::error::{FeedError, FeedResult};
use crate::frame::FrameIndex;

/// Index of the counter slice a feed displays.
pub type FeedIndex = u32;

/// Width of the zero-padded counter.
pub const TOTAL_DIGITS: usize = 12;

/// Digits shown by each feed.
pub const DIGITS_PER_FEED: usize = 3;

/// Number of feeds needed to show the full counter.
pub const MAX_FEEDS: u32 = (TOTAL_DIGITS / DIGITS_PER_FEED) as u32;

/// Exclusive upper bound of a count that fits the counter window.
pub const COUNTER_LIMIT: u64 = 1_000_000_000_000;

/// Frame index after debouncing: held constant across each
/// `text_update_interval` window, except on the final frame.
pub fn effective_frame(frame: FrameIndex, text_update_interval: u64, is_final_frame: bool) -> FeedResult<u64> {
    if text_update_interval == 0 {
        return Err(FeedError::config("text update interval must be non-zero"));
    }
    let effective = frame
        .checked_add(1)
        .ok_or_else(|| FeedError::Range(format!("frame index {} is out of range", frame)))?;
    if is_final_frame {
        Ok(effective)
    } else {
        Ok(effective - frame % text_update_interval)
    }
}

/// Cumulative pixels shown up to and including `frame`.
pub fn pixel_count(
    frame: FrameIndex,
    pixels_per_frame: u64,
    text_update_interval: u64,
    is_final_frame: bool,
) -> FeedResult<u64> {
    let effective = effective_frame(frame, text_update_interval, is_final_frame)?;
    effective.checked_mul(pixels_per_frame).ok_or_else(|| {
        FeedError::Range(format!(
            "pixel count overflows at frame {} ({} pixels per frame)",
            frame, pixels_per_frame
        ))
    })
}

/// The whole counter as a zero-padded decimal string.
///
/// Counts at or above [`COUNTER_LIMIT`] produce more than [`TOTAL_DIGITS`]
/// characters; callers are expected to keep
/// `pixels_per_frame * total_frames` below the limit.
pub fn full_counter(
    frame: FrameIndex,
    pixels_per_frame: u64,
    text_update_interval: u64,
    is_final_frame: bool,
) -> FeedResult<String> {
    let count = pixel_count(frame, pixels_per_frame, text_update_interval, is_final_frame)?;
    Ok(format!("{:0width$}", count, width = TOTAL_DIGITS))
}

/// Check that `feed` addresses a slice inside the counter window.
pub fn check_feed(feed: FeedIndex) -> FeedResult<usize> {
    let offset = feed as usize * DIGITS_PER_FEED;
    if offset + DIGITS_PER_FEED > TOTAL_DIGITS {
        return Err(FeedError::Range(format!(
            "feed {} needs digits {}..{} of a {}-digit counter",
            feed,
            offset,
            offset + DIGITS_PER_FEED,
            TOTAL_DIGITS
        )));
    }
    Ok(offset)
}

/// The digit slice that `feed` displays at `frame`.
pub fn partition(
    frame: FrameIndex,
    feed: FeedIndex,
    pixels_per_frame: u64,
    text_update_interval: u64,
    is_final_frame: bool,
) -> FeedResult<String> {
    let offset = check_feed(feed)?;
    let text = full_counter(frame, pixels_per_frame, text_update_interval, is_final_frame)?;
    Ok(text[offset..offset + DIGITS_PER_FEED].to_string())
}
