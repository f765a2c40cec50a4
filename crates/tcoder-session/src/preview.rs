//! Preview reference management.
//!
//! A preview reference is the local, revocable handle that allows playback
//! of a selected file before it is uploaded. The manager enforces the
//! lifetime contract: at most one reference is live at any time, acquiring
//! always revokes the previous reference first, and release is idempotent.

use tracing::debug;
use uuid::Uuid;

use crate::file::SelectedFile;

/// A revocable reference to a selected file, usable for playback until the
/// manager revokes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    id: Uuid,
    uri: String,
    source_name: String,
}

impl PreviewHandle {
    fn new(source_name: &str) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            uri: format!("preview://{}", id),
            source_name: source_name.to_string(),
        }
    }

    /// Process-local URI for this reference.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Name of the file this reference was created for.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

/// Owner of the single live preview reference.
#[derive(Debug, Default)]
pub struct PreviewManager {
    current: Option<PreviewHandle>,
}

impl PreviewManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a reference for `file`, revoking any current reference
    /// first. This is the only place a reference is ever replaced.
    pub fn acquire(&mut self, file: &SelectedFile) -> PreviewHandle {
        self.release_current();

        let handle = PreviewHandle::new(&file.name);
        debug!(uri = %handle.uri, file = %file.name, "Acquired preview reference");
        self.current = Some(handle.clone());
        handle
    }

    /// Revoke `handle` if it is the live reference. Releasing a stale or
    /// already-released handle is a no-op.
    pub fn release(&mut self, handle: &PreviewHandle) {
        if self.current.as_ref().map(|c| c.id) == Some(handle.id) {
            self.release_current();
        }
    }

    /// Revoke the live reference, if any. Idempotent.
    pub fn release_current(&mut self) {
        if let Some(old) = self.current.take() {
            debug!(uri = %old.uri, "Released preview reference");
        }
    }

    /// Whether `handle` is still the live reference.
    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.current.as_ref().map(|c| c.id) == Some(handle.id)
    }

    /// The live reference, if any.
    pub fn current(&self) -> Option<&PreviewHandle> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp4(name: &str) -> SelectedFile {
        SelectedFile::new(name, "video/mp4", vec![0u8; 4])
    }

    #[test]
    fn test_acquire_revokes_previous() {
        let mut manager = PreviewManager::new();

        let first = manager.acquire(&mp4("a.mp4"));
        assert!(manager.is_live(&first));

        let second = manager.acquire(&mp4("b.mp4"));
        assert!(!manager.is_live(&first));
        assert!(manager.is_live(&second));
        assert_eq!(manager.current().map(|h| h.source_name()), Some("b.mp4"));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut manager = PreviewManager::new();
        let handle = manager.acquire(&mp4("a.mp4"));

        manager.release(&handle);
        assert!(manager.current().is_none());

        // Releasing again, or releasing with nothing held, is a no-op.
        manager.release(&handle);
        manager.release_current();
        assert!(manager.current().is_none());
    }

    #[test]
    fn test_release_of_stale_handle_keeps_current() {
        let mut manager = PreviewManager::new();
        let old = manager.acquire(&mp4("a.mp4"));
        let new = manager.acquire(&mp4("b.mp4"));

        // A late release of the superseded handle must not revoke the new one.
        manager.release(&old);
        assert!(manager.is_live(&new));
    }

    #[test]
    fn test_handle_uri_shape() {
        let mut manager = PreviewManager::new();
        let handle = manager.acquire(&mp4("a.mp4"));
        assert!(handle.uri().starts_with("preview://"));
    }
}
