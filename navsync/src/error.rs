//! Error types crossing the core's collaborator seams.
//!
//! ERROR HANDLING
//! ==============
//! Adapters report failures precisely; the controller is the one place that
//! decides what a failure means (fail closed for auth, fail soft for cache and
//! bus). None of these errors ever reaches the host page.

/// Errors produced by an identity provider or role lookup.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider has no URL or key configured.
    #[error("identity provider not configured: {0}")]
    NotConfigured(String),
    /// The request never produced a response.
    #[error("identity provider transport failed: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("identity provider returned status {0}")]
    Status(u16),
    /// The response body could not be parsed.
    #[error("identity provider response decode failed: {0}")]
    Decode(String),
}

/// Errors produced by the per-origin key-value slot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Storage is disabled or missing (private mode, SSR).
    #[error("storage unavailable")]
    Unavailable,
    /// Reading the slot failed.
    #[error("storage read failed: {0}")]
    Read(String),
    /// Writing the slot failed (quota, security policy).
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Errors produced by the cross-tab broadcast channel.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The platform has no broadcast primitive, or construction failed.
    #[error("broadcast channel unavailable: {0}")]
    Unavailable(String),
    /// Posting a message failed.
    #[error("broadcast send failed: {0}")]
    Send(String),
    /// The message could not be encoded.
    #[error("broadcast encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}
