//! Wave records and the shared, ordered wave list.

use crate::{abi::IWavePortal, error::InvalidTimestamp};
use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::{fmt, sync::Arc};
use tokio::sync::watch;

/// One wave: who sent it, when, and what they said.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Wave {
    pub address: Address,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl Wave {
    /// Creates a wave from the raw contract values, reading `timestamp` as epoch seconds.
    pub fn new(
        address: Address,
        timestamp: U256,
        message: impl Into<String>,
    ) -> Result<Self, InvalidTimestamp> {
        Ok(Self { address, timestamp: timestamp_from_secs(timestamp)?, message: message.into() })
    }
}

impl TryFrom<IWavePortal::Wave> for Wave {
    type Error = InvalidTimestamp;

    fn try_from(wave: IWavePortal::Wave) -> Result<Self, Self::Error> {
        Self::new(wave.waver, wave.timestamp, wave.message)
    }
}

impl TryFrom<IWavePortal::NewWave> for Wave {
    type Error = InvalidTimestamp;

    fn try_from(event: IWavePortal::NewWave) -> Result<Self, Self::Error> {
        Self::new(event.from, event.timestamp, event.message)
    }
}

impl fmt::Display for Wave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Address: {}", self.address)?;
        writeln!(f, "Time: {}", self.timestamp.to_rfc2822())?;
        write!(f, "Message: {}", self.message)
    }
}

/// Converts a raw `uint256` epoch-seconds value into a UTC date-time.
pub fn timestamp_from_secs(secs: U256) -> Result<DateTime<Utc>, InvalidTimestamp> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or(InvalidTimestamp(secs))
}

/// A wave delivered by the live feed, with the block it was mined in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveWave {
    pub wave: Wave,
    /// `None` for logs that are not mined yet.
    pub block_number: Option<u64>,
}

/// The in-memory wave list shared by the bulk fetch and the live feed.
///
/// Both writers go through this type, which sequences them:
///
/// - While a fetch is in flight, live waves are buffered.
/// - A fetch replaces the list with a snapshot taken at a known block. Buffered waves mined at or
///   before that block are already part of the snapshot and are dropped, the rest are appended in
///   arrival order.
/// - Outside a fetch, live waves are appended unless the latest snapshot already covers their
///   block.
///
/// Records are never compared by content, so identical messages from the same sender stay
/// distinct entries.
#[derive(Clone, Debug)]
pub struct WaveList {
    inner: Arc<Mutex<WaveListInner>>,
    revision: Arc<watch::Sender<u64>>,
}

#[derive(Debug, Default)]
struct WaveListInner {
    waves: Vec<Wave>,
    /// Block of the latest applied snapshot.
    snapshot_block: Option<u64>,
    /// Number of fetches in flight.
    fetching: usize,
    /// Live waves held back while a fetch is in flight.
    buffered: Vec<LiveWave>,
}

impl WaveListInner {
    fn covered(&self, live: &LiveWave) -> bool {
        matches!((self.snapshot_block, live.block_number), (Some(snapshot), Some(block)) if block <= snapshot)
    }

    fn drain_buffered(&mut self) -> usize {
        let mut appended = 0;
        for live in std::mem::take(&mut self.buffered) {
            if self.covered(&live) {
                trace!(block = ?live.block_number, "dropping buffered wave covered by snapshot");
                continue;
            }
            self.waves.push(live.wave);
            appended += 1;
        }
        appended
    }
}

impl Default for WaveList {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveList {
    /// Creates an empty list.
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self { inner: Default::default(), revision: Arc::new(revision) }
    }

    /// Returns a copy of the waves in order.
    pub fn snapshot(&self) -> Vec<Wave> {
        self.inner.lock().waves.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the block of the latest applied snapshot.
    pub fn snapshot_block(&self) -> Option<u64> {
        self.inner.lock().snapshot_block
    }

    /// Returns a receiver that is notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Marks a bulk fetch as in flight. Live waves are buffered until it is finished or aborted.
    pub fn begin_fetch(&self) {
        self.inner.lock().fetching += 1;
    }

    /// Replaces the list with `waves`, a snapshot of the contract taken at `block`.
    ///
    /// A snapshot older than the one already applied is discarded. Returns whether the snapshot
    /// was applied.
    pub fn finish_fetch(&self, waves: Vec<Wave>, block: u64) -> bool {
        let applied = {
            let mut inner = self.inner.lock();
            inner.fetching = inner.fetching.saturating_sub(1);
            let stale = inner.snapshot_block.is_some_and(|current| block < current);
            if stale {
                debug!(block, current = ?inner.snapshot_block, "discarding stale wave snapshot");
            } else {
                inner.waves = waves;
                inner.snapshot_block = Some(block);
            }
            if inner.fetching == 0 {
                let appended = inner.drain_buffered();
                trace!(appended, "merged buffered waves");
            }
            !stale
        };
        self.bump();
        applied
    }

    /// Ends a failed fetch, releasing any buffered waves.
    pub fn abort_fetch(&self) {
        let appended = {
            let mut inner = self.inner.lock();
            inner.fetching = inner.fetching.saturating_sub(1);
            if inner.fetching == 0 { inner.drain_buffered() } else { 0 }
        };
        if appended > 0 {
            self.bump();
        }
    }

    /// Adds a wave delivered by the live feed.
    pub fn push_live(&self, live: LiveWave) {
        {
            let mut inner = self.inner.lock();
            if inner.fetching > 0 {
                inner.buffered.push(live);
                return;
            }
            if inner.covered(&live) {
                trace!(block = ?live.block_number, "dropping live wave covered by snapshot");
                return;
            }
            inner.waves.push(live.wave);
        }
        self.bump();
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}
