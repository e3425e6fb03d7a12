use sqlchat_agent::Attachment;
use thiserror::Error;

/// Accepted file-name suffix (SQLite database), compared case-insensitively
pub const DATABASE_EXTENSION: &str = ".db";

/// 50 MiB
pub const MAX_ATTACHMENT_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("{name} is not a .db database file")]
    InvalidExtension { name: String },

    #[error("{name} is {size} bytes; the limit is {max} bytes")]
    TooLarge { name: String, size: u64, max: u64 },
}

/// Name and size of the attachment waiting for the next send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    pub name: String,
    pub byte_size: u64,
}

/// Holds at most one validated attachment until the next send takes it
#[derive(Debug, Default)]
pub struct AttachmentGate {
    pending: Option<Attachment>,
}

impl AttachmentGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a file by name and size without holding its bytes
    pub fn check(name: &str, size: u64) -> Result<(), AttachmentError> {
        if !name.to_lowercase().ends_with(DATABASE_EXTENSION) {
            return Err(AttachmentError::InvalidExtension {
                name: name.to_string(),
            });
        }
        if size > MAX_ATTACHMENT_BYTES {
            return Err(AttachmentError::TooLarge {
                name: name.to_string(),
                size,
                max: MAX_ATTACHMENT_BYTES,
            });
        }
        Ok(())
    }

    /// Replace the pending attachment. A rejected file also drops whatever was pending.
    pub fn accept(&mut self, attachment: Attachment) -> Result<(), AttachmentError> {
        if let Err(e) = Self::check(&attachment.name, attachment.byte_size()) {
            self.pending = None;
            return Err(e);
        }
        self.pending = Some(attachment);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Hand the attachment to an outgoing request, leaving the gate empty
    pub fn take(&mut self) -> Option<Attachment> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<PendingAttachment> {
        self.pending.as_ref().map(|a| PendingAttachment {
            name: a.name.clone(),
            byte_size: a.byte_size(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_db_case_insensitive() {
        let mut gate = AttachmentGate::new();
        gate.accept(Attachment::new("Chinook.DB", vec![1, 2, 3])).unwrap();

        let pending = gate.pending().unwrap();
        assert_eq!(pending.name, "Chinook.DB");
        assert_eq!(pending.byte_size, 3);
    }

    #[test]
    fn test_rejects_other_extensions() {
        for name in ["notes.txt", "dump.sql", "db", "archive.db.zip"] {
            assert!(
                matches!(
                    AttachmentGate::check(name, 10),
                    Err(AttachmentError::InvalidExtension { .. })
                ),
                "{name}"
            );
        }
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(AttachmentGate::check("a.db", MAX_ATTACHMENT_BYTES).is_ok());
        assert_eq!(
            AttachmentGate::check("a.db", MAX_ATTACHMENT_BYTES + 1),
            Err(AttachmentError::TooLarge {
                name: "a.db".to_string(),
                size: 52_428_801,
                max: 52_428_800,
            })
        );
    }

    #[test]
    fn test_invalid_file_clears_previous() {
        let mut gate = AttachmentGate::new();
        gate.accept(Attachment::new("good.db", vec![0])).unwrap();

        let err = gate.accept(Attachment::new("bad.csv", vec![0])).unwrap_err();
        assert!(matches!(err, AttachmentError::InvalidExtension { .. }));
        assert!(gate.pending().is_none());
    }

    #[test]
    fn test_take_is_one_shot() {
        let mut gate = AttachmentGate::new();
        gate.accept(Attachment::new("a.db", vec![9])).unwrap();

        assert!(gate.take().is_some());
        assert!(gate.take().is_none());
    }

    #[test]
    fn test_clear() {
        let mut gate = AttachmentGate::new();
        gate.accept(Attachment::new("a.db", vec![9])).unwrap();
        gate.clear();
        gate.clear();
        assert!(gate.pending().is_none());
    }
}
