#![forbid(unsafe_code)]

//! `sessionStorage` / `localStorage` backends. Only compiled on `wasm32`.

use oxford_core::{StorageBackend, StorageError};

/// Which browser store to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebStore {
    Session,
    Local,
}

/// A browser storage area. Every call reports
/// [`StorageError::Unavailable`] when the browser refuses access.
#[derive(Debug, Clone, Copy)]
pub struct WebStorage {
    store: WebStore,
}

impl WebStorage {
    #[must_use]
    pub const fn new(store: WebStore) -> Self {
        Self { store }
    }

    fn area(&self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let area = match self.store {
            WebStore::Session => window.session_storage(),
            WebStore::Local => window.local_storage(),
        };
        area.ok().flatten().ok_or(StorageError::Unavailable)
    }
}

impl StorageBackend for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.area()?.get_item(key).map_err(|_| StorageError::Unavailable)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.area()?
            .set_item(key, &value)
            .map_err(|_| StorageError::QuotaExceeded { key: key.to_string() })
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.area()?.remove_item(key).map_err(|_| StorageError::Unavailable)
    }
}
