use std::path::PathBuf;

use super::error::Result;

/// A single named persistence slot holding the serialized record list.
/// The handle is constructed for one slot; `get` returns the stored
/// payload if any, `set` replaces it whole.
pub trait Storage {
    fn get(&self) -> Result<Option<String>>;
    fn set(&self, payload: &str) -> Result<()>;
}

/// File-backed slot under the data directory
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        FileStorage { path }
    }
}

impl Storage for FileStorage {
    fn get(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }

    fn set(&self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// In-memory slot for tests; can be flipped to reject writes
#[cfg(test)]
pub struct MemoryStorage {
    slot: std::cell::RefCell<Option<String>>,
    fail_writes: std::cell::Cell<bool>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            slot: std::cell::RefCell::new(None),
            fail_writes: std::cell::Cell::new(false),
        }
    }

    pub fn with_payload(payload: &str) -> Self {
        let storage = Self::new();
        *storage.slot.borrow_mut() = Some(payload.to_string());
        storage
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn payload(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.slot.borrow().clone())
    }

    fn set(&self, payload: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(super::error::DiaryError::Storage(
                "write rejected".to_string(),
            ));
        }
        *self.slot.borrow_mut() = Some(payload.to_string());
        Ok(())
    }
}
