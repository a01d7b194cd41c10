use thiserror::Error;

use crate::domain::part::PartId;

/// Failure reported by a collaborator store. Details stay server-side.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(String),
    #[error("store decode failed: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("part {0} was not found")]
    PartNotFound(PartId),
    #[error("price list `{code}` was not found")]
    ListNotFound { code: String },
    #[error("no price list could be determined: default list `{code}` is missing")]
    NoDefaultList { code: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid pricing configuration: {0}")]
    InvalidConfiguration(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PricingError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request ({code}): {message}")]
    BadRequest { code: String, message: String, correlation_id: String },
    #[error("not found ({code}): {message}")]
    NotFound { code: String, message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.to_string(),
            message: message.into(),
            correlation_id: "unassigned".to_owned(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::BadRequest { code, .. } | Self::NotFound { code, .. } => code,
            Self::Internal { .. } => "InternalError",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }

    /// Text that is safe to hand back to a caller. Internal failures never echo their cause.
    pub fn user_message(&self) -> String {
        match self {
            Self::BadRequest { message, .. } | Self::NotFound { message, .. } => message.clone(),
            Self::Internal { .. } => "An unexpected internal error occurred.".to_string(),
        }
    }
}

impl From<PricingError> for InterfaceError {
    fn from(value: PricingError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            PricingError::PartNotFound(part_id) => Self::NotFound {
                code: "PartNotFound".to_string(),
                message: format!("part {part_id} was not found"),
                correlation_id,
            },
            PricingError::ListNotFound { code } => Self::BadRequest {
                code: "ListNotFound".to_string(),
                message: format!("price list `{code}` does not exist"),
                correlation_id,
            },
            PricingError::InvalidInput(message) => {
                Self::BadRequest { code: "InvalidInput".to_string(), message, correlation_id }
            }
            PricingError::NoDefaultList { .. }
            | PricingError::InvalidConfiguration(_)
            | PricingError::Store(_) => Self::Internal { message: value.to_string(), correlation_id },
        }
    }
}
