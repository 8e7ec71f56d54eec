// MoodLog - app/requests.rs
//
// Record store request lifecycle. Each request runs on its own short-lived
// background thread and reports its result to the UI thread over an mpsc
// channel, polled once per frame.
//
// Architecture:
//   - `StoreManager` lives on the UI thread; request threads only touch the
//     shared `RecordStore` and the channel sender.
//   - Requests are independent: overlapping loads are not coalesced and the
//     last one to complete wins.
//   - No retry, no cancellation. A request that never completes simply keeps
//     `in_flight` above zero.

use crate::core::model::{Emoji, JournalEntry, NewEntry};
use crate::core::store::{self, Decoded, Query, RecordStore};
use crate::util::constants::{EMOJIS_TABLE, ENTRIES_TABLE};
use crate::util::error::StoreError;
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Result of one background store request.
#[derive(Debug)]
pub enum StoreProgress {
    /// Entries that decoded; unreadable rows are counted in `skipped`.
    EntriesLoaded(Result<Decoded<JournalEntry>, StoreError>),
    EmojisLoaded(Result<Vec<Emoji>, StoreError>),
    EntryInserted(Result<(), StoreError>),
}

/// Spawns store requests and collects their results.
pub struct StoreManager {
    store: Arc<dyn RecordStore>,
    tx: mpsc::Sender<StoreProgress>,
    rx: mpsc::Receiver<StoreProgress>,
    in_flight: usize,
}

impl StoreManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            store,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// The store shared with request threads.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Number of requests started but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Fetch entries matching `query`.
    pub fn spawn_load_entries(&mut self, query: Query) {
        self.spawn("load-entries", move |store| {
            let result = store
                .select(ENTRIES_TABLE, &query)
                .map(|rows| store::decode_rows(ENTRIES_TABLE, rows));
            StoreProgress::EntriesLoaded(result)
        });
    }

    /// Fetch the emoji reference set.
    pub fn spawn_load_emojis(&mut self) {
        self.spawn("load-emojis", |store| {
            let query = Query::new().order_asc("id");
            let result = store
                .select(EMOJIS_TABLE, &query)
                .map(|rows| store::decode_rows::<Emoji>(EMOJIS_TABLE, rows).rows);
            StoreProgress::EmojisLoaded(result)
        });
    }

    /// Insert one entry.
    pub fn spawn_insert(&mut self, entry: NewEntry) {
        self.spawn("insert-entry", move |store| {
            let result = store::encode_record(ENTRIES_TABLE, &entry)
                .and_then(|record| store.insert(ENTRIES_TABLE, &record));
            StoreProgress::EntryInserted(result)
        });
    }

    fn spawn<F>(&mut self, label: &'static str, work: F)
    where
        F: FnOnce(&dyn RecordStore) -> StoreProgress + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tracing::debug!(request = label, in_flight = self.in_flight, "Store request started");

        std::thread::spawn(move || {
            let msg = work(store.as_ref());
            // Receiver dropped means the window closed; nothing left to notify.
            let _ = tx.send(msg);
        });
    }

    /// Collect every finished request without blocking.
    pub fn poll(&mut self) -> Vec<StoreProgress> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        self.in_flight = self.in_flight.saturating_sub(messages.len());
        messages
    }

    /// Block up to `timeout` for the next finished request.
    pub fn wait(&mut self, timeout: Duration) -> Option<StoreProgress> {
        let msg = self.rx.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(msg)
    }
}
