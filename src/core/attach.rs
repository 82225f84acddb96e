//! Per-document attachment registry.
//!
//! Associates (document id, formatting capability id) pairs with immutable
//! config snapshots. This is an explicit owned object, not process-global
//! state: hosts construct one, key it however they identify documents, and
//! iterate a document's attachments to trigger reformat invocations.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::reformat::SessionConfig;

/// One registered capability/config pair for a document.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub capability: String,
    pub config: Arc<SessionConfig>,
}

/// Registry of attachments, iteration-ordered by time of attachment.
#[derive(Debug, Default)]
pub struct AttachmentRegistry {
    entries: IndexMap<(String, String), Arc<SessionConfig>>,
}

impl AttachmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a capability to a document with a config snapshot, replacing
    /// any previous snapshot for the same pair. Returns the prior snapshot.
    pub fn attach(
        &mut self,
        document: &str,
        capability: &str,
        config: SessionConfig,
    ) -> Option<Arc<SessionConfig>> {
        self.entries
            .insert((document.to_string(), capability.to_string()), Arc::new(config))
    }

    /// Remove one attachment; true when something was removed.
    pub fn detach(&mut self, document: &str, capability: &str) -> bool {
        self.entries
            .shift_remove(&(document.to_string(), capability.to_string()))
            .is_some()
    }

    /// Drop every attachment of a document (e.g. when it closes).
    pub fn detach_document(&mut self, document: &str) {
        self.entries.retain(|(doc, _), _| doc != document);
    }

    pub fn is_attached(&self, document: &str, capability: &str) -> bool {
        self.entries
            .contains_key(&(document.to_string(), capability.to_string()))
    }

    /// All attachments of one document, in attachment order.
    pub fn for_document(&self, document: &str) -> Vec<Attachment> {
        self.entries
            .iter()
            .filter(|((doc, _), _)| doc == document)
            .map(|((_, capability), config)| Attachment {
                capability: capability.clone(),
                config: Arc::clone(config),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vcs::VcsKind;

    fn cfg() -> SessionConfig {
        SessionConfig {
            vcs: VcsKind::Git,
            trim_blank_lines: false,
            format_on_save: false,
        }
    }

    #[test]
    fn attach_then_lookup() {
        let mut reg = AttachmentRegistry::new();
        assert!(reg.attach("a.rs", "rustfmt", cfg()).is_none());
        assert!(reg.is_attached("a.rs", "rustfmt"));
        assert!(!reg.is_attached("a.rs", "clang-format"));
        assert_eq!(reg.for_document("a.rs").len(), 1);
    }

    #[test]
    fn reattach_replaces_snapshot() {
        let mut reg = AttachmentRegistry::new();
        reg.attach("a.rs", "rustfmt", cfg());
        let mut newer = cfg();
        newer.trim_blank_lines = true;
        let prior = reg.attach("a.rs", "rustfmt", newer).unwrap();
        assert!(!prior.trim_blank_lines);
        assert!(reg.for_document("a.rs")[0].config.trim_blank_lines);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn detach_document_clears_all_capabilities() {
        let mut reg = AttachmentRegistry::new();
        reg.attach("a.rs", "one", cfg());
        reg.attach("a.rs", "two", cfg());
        reg.attach("b.rs", "one", cfg());
        reg.detach_document("a.rs");
        assert!(reg.for_document("a.rs").is_empty());
        assert!(reg.is_attached("b.rs", "one"));
    }

    #[test]
    fn attachment_order_is_preserved() {
        let mut reg = AttachmentRegistry::new();
        reg.attach("a.rs", "first", cfg());
        reg.attach("a.rs", "second", cfg());
        let caps: Vec<String> =
            reg.for_document("a.rs").into_iter().map(|a| a.capability).collect();
        assert_eq!(caps, vec!["first", "second"]);
    }
}
