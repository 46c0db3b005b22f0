/// Structural errors in input documents.
///
/// Rule-expression failures are not errors; they degrade to
/// [`crate::interpret::Bound::Unresolvable`] and fail open downstream.
#[derive(Debug, thiserror::Error)]
pub enum ZoningError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed zoning document: {message}")]
    ZoningDocument { message: String },

    #[error("malformed building document: {message}")]
    BuildingDocument { message: String },

    #[error("malformed parcel document: {message}")]
    ParcelDocument { message: String },
}

impl ZoningError {
    pub fn zoning(message: impl Into<String>) -> Self {
        ZoningError::ZoningDocument {
            message: message.into(),
        }
    }

    pub fn building(message: impl Into<String>) -> Self {
        ZoningError::BuildingDocument {
            message: message.into(),
        }
    }

    pub fn parcel(message: impl Into<String>) -> Self {
        ZoningError::ParcelDocument {
            message: message.into(),
        }
    }
}
