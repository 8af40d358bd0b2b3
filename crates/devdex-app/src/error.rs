// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::ids::DeviceId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The request never completed (DNS, connect, timeout, body read).
    #[error("failed to load devices: {0}; check the connection and retry")]
    Transport(String),
    #[error("failed to load devices: HTTP error! Status: {status}")]
    Response { status: u16 },
    /// The body arrived but did not match the catalog shape.
    #[error("failed to load devices: unexpected response body")]
    Decode(String),
    #[error("Device with ID \"{0}\" not found")]
    NotFound(DeviceId),
}

impl CatalogError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::CatalogError;
    use crate::DeviceId;

    #[test]
    fn response_error_mentions_status() {
        let error = CatalogError::Response { status: 500 };
        assert!(error.to_string().contains("500"));
        assert_eq!(error.status(), Some(500));
    }

    #[test]
    fn decode_error_hides_parser_detail() {
        let error = CatalogError::Decode("expected `,` at line 1".to_owned());
        assert!(!error.to_string().contains("line 1"));
        assert_eq!(error.status(), None);
    }

    #[test]
    fn not_found_is_distinct() {
        let error = CatalogError::NotFound(DeviceId::from("abc"));
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "Device with ID \"abc\" not found");
        assert!(!CatalogError::Transport("timeout".to_owned()).is_not_found());
    }
}
