//! Reconciliation of freshly aggregated frames with persisted ones.
//!
//! Only the boundary frame is ever rewritten. Every other persisted bucket is
//! treated as final.

use super::model::OhlcFrame;
use crate::errors::{Error, Result};

/// Result of reconciling new frames against the persisted boundary frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Persisted boundary frame, extended with the overlapping new frame
    pub updated: Option<OhlcFrame>,
    /// Frames with no persisted counterpart, ascending
    pub appended: Vec<OhlcFrame>,
}

impl MergeOutcome {
    /// Every frame the store needs to write, ascending.
    pub fn into_frames(self) -> Vec<OhlcFrame> {
        let MergeOutcome {
            updated,
            mut appended,
        } = self;
        if let Some(frame) = updated {
            appended.push(frame);
            appended.sort_by_key(|f| f.bucket_start);
        }
        appended
    }

    pub fn is_empty(&self) -> bool {
        self.updated.is_none() && self.appended.is_empty()
    }
}

fn ensure_ascending(frames: &[OhlcFrame]) -> Result<()> {
    match frames
        .windows(2)
        .find(|pair| pair[0].bucket_start >= pair[1].bucket_start)
    {
        Some(pair) => Err(Error::invariant(format!(
            "frame buckets out of order: {} then {}",
            pair[0].bucket_start, pair[1].bucket_start
        ))),
        None => Ok(()),
    }
}

/// Reconciles `new_frames` with the newest persisted frame.
///
/// Frames older than `last_persisted` are dropped. A leading frame on the
/// same bucket continues it: `open` is kept, `close` is taken from the new
/// frame, bounds widen and volumes add up.
pub fn merge(new_frames: Vec<OhlcFrame>, last_persisted: Option<&OhlcFrame>) -> Result<MergeOutcome> {
    ensure_ascending(&new_frames)?;

    let Some(last) = last_persisted else {
        return Ok(MergeOutcome {
            updated: None,
            appended: new_frames,
        });
    };

    let mut remaining = new_frames
        .into_iter()
        .filter(|frame| frame.bucket_start >= last.bucket_start)
        .peekable();

    let updated = remaining
        .next_if(|frame| frame.bucket_start == last.bucket_start)
        .map(|continuation| OhlcFrame {
            bucket_start: last.bucket_start,
            open: last.open,
            high: last.high.max(continuation.high),
            low: last.low.min(continuation.low),
            close: continuation.close,
            volume: last.volume + continuation.volume,
        });

    Ok(MergeOutcome {
        updated,
        appended: remaining.collect(),
    })
}

/// Reconciles `new_frames` with the oldest persisted frame.
///
/// Backward counterpart of [`merge`] for pages walked from newest to oldest.
/// Frames newer than `first_persisted` are dropped. A trailing frame on the
/// same bucket precedes it: `open` is taken from the new frame, `close` is
/// kept, bounds widen and volumes add up.
pub fn merge_preceding(
    new_frames: Vec<OhlcFrame>,
    first_persisted: Option<&OhlcFrame>,
) -> Result<MergeOutcome> {
    ensure_ascending(&new_frames)?;

    let Some(first) = first_persisted else {
        return Ok(MergeOutcome {
            updated: None,
            appended: new_frames,
        });
    };

    let mut appended: Vec<OhlcFrame> = new_frames
        .into_iter()
        .filter(|frame| frame.bucket_start <= first.bucket_start)
        .collect();

    let updated = match appended.last() {
        Some(frame) if frame.bucket_start == first.bucket_start => {
            appended.pop().map(|preceding| OhlcFrame {
                bucket_start: first.bucket_start,
                open: preceding.open,
                high: first.high.max(preceding.high),
                low: first.low.min(preceding.low),
                close: first.close,
                volume: first.volume + preceding.volume,
            })
        }
        _ => None,
    };

    Ok(MergeOutcome { updated, appended })
}
