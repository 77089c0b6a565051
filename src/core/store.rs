use super::error::Result;
use super::record::{Analysis, EntryDraft, MemoryRecord, UserFeedback};
use super::storage::Storage;

/// Sole owner of the in-memory record list and its durable mirror.
///
/// The list is loaded once at construction and written back whole after
/// every mutation. It is always sorted by timestamp descending (ties by
/// id descending, so the newer of two same-day records comes first).
pub struct MemoryStore<S: Storage> {
    storage: S,
    records: Vec<MemoryRecord>,
}

impl<S: Storage> MemoryStore<S> {
    /// Load the persisted collection. An absent slot starts empty; a
    /// malformed one is reported on stderr and also starts empty, so a
    /// corrupt data file can never prevent startup.
    pub fn new(storage: S) -> Self {
        let records = match storage.get() {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<MemoryRecord>>(&payload) {
                Ok(records) => records,
                Err(e) => {
                    eprintln!("⚠️  Stored memories are unreadable, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                eprintln!("⚠️  Could not read stored memories, starting empty: {}", e);
                Vec::new()
            }
        };

        let mut store = MemoryStore { storage, records };
        store.resort();
        store
    }

    /// Construct a record from the draft and analysis outcome, insert it,
    /// re-sort, and persist the full list. The caller has already run the
    /// creation sequence; the draft is assumed validated.
    pub fn create(
        &mut self,
        draft: EntryDraft,
        analysis: Analysis,
        image_url: String,
    ) -> Result<MemoryRecord> {
        let record = MemoryRecord::new(draft, analysis, image_url);

        self.records.push(record.clone());
        self.resort();
        self.persist()?;

        Ok(record)
    }

    /// Record the user's verdict on the inferred emotion. An absent id is
    /// a silent no-op: a deletion may have raced the feedback action.
    pub fn set_feedback(&mut self, id: &str, correct: bool) -> Result<()> {
        let feedback = if correct {
            UserFeedback::Correct
        } else {
            UserFeedback::Incorrect
        };

        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.user_feedback = feedback;
                self.persist()
            }
            None => Ok(()),
        }
    }

    /// Remove a record. An absent id is a silent no-op.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);

        if self.records.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// The current list, newest first. Views project from this.
    pub fn records(&self) -> &[MemoryRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&MemoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn resort(&mut self) {
        self.records
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
    }

    /// Write the entire collection back to the slot. A failed write does
    /// not roll back the in-memory list; the error propagates so the
    /// caller can surface it.
    fn persist(&self) -> Result<()> {
        let payload = serde_json::to_string_pretty(&self.records)?;
        self.storage.set(&payload)
    }
}
