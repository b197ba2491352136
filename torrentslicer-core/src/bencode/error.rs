//! Bencode syntax and resource-limit errors

/// Errors raised while decoding a bencoded byte buffer.
///
/// Every syntax variant carries the byte offset at which decoding stopped so
/// that reporters can point at the offending position in the source file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("unexpected byte 0x{byte:02x} at byte {offset}")]
    UnexpectedByte { offset: usize, byte: u8 },

    #[error("invalid integer at byte {offset}: {reason}")]
    InvalidInteger { offset: usize, reason: String },

    #[error("invalid byte string length at byte {offset}: {reason}")]
    InvalidStringLength { offset: usize, reason: String },

    #[error("dictionary key at byte {offset} is not a byte string")]
    NonStringKey { offset: usize },

    #[error("duplicate dictionary key {key:?} at byte {offset}")]
    DuplicateKey { offset: usize, key: String },

    #[error("nesting depth exceeds limit of {limit} at byte {offset}")]
    NestingTooDeep { offset: usize, limit: usize },

    #[error("input of {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },
}

impl DecodeError {
    /// Returns true when the input was rejected for its size or shape rather
    /// than for corrupt syntax.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            DecodeError::NestingTooDeep { .. } | DecodeError::InputTooLarge { .. }
        )
    }

    /// Byte offset the error refers to, if it refers to one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::UnexpectedEof { offset }
            | DecodeError::UnexpectedByte { offset, .. }
            | DecodeError::InvalidInteger { offset, .. }
            | DecodeError::InvalidStringLength { offset, .. }
            | DecodeError::NonStringKey { offset }
            | DecodeError::DuplicateKey { offset, .. }
            | DecodeError::NestingTooDeep { offset, .. } => Some(*offset),
            DecodeError::InputTooLarge { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_limit_classification() {
        assert!(DecodeError::NestingTooDeep { offset: 3, limit: 2 }.is_resource_limit());
        assert!(DecodeError::InputTooLarge { size: 10, limit: 5 }.is_resource_limit());
        assert!(!DecodeError::UnexpectedEof { offset: 0 }.is_resource_limit());
    }

    #[test]
    fn test_error_messages_name_offset() {
        let error = DecodeError::UnexpectedByte { offset: 7, byte: b'x' };
        assert_eq!(error.to_string(), "unexpected byte 0x78 at byte 7");
        assert_eq!(error.offset(), Some(7));
        assert_eq!(DecodeError::InputTooLarge { size: 2, limit: 1 }.offset(), None);
    }
}
