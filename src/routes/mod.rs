//! Router Module Index
//!
//! Organizes the application's routing logic into security-segregated modules.
//! Access control is applied explicitly at the module level (via Axum layers),
//! preventing accidental exposure of protected endpoints.
//!
//! The three modules map directly to the principal roles.

/// Routes accessible to all clients: registration, both token endpoints, and
/// read-only pet/state data.
pub mod public;

/// Routes protected by the `AuthUser` extractor layer and reserved for
/// ordinary user accounts (role checks inside the handlers).
pub mod users;

/// Routes protected by the `AuthUser` extractor layer and reserved for
/// shelter accounts.
pub mod shelters;
