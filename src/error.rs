//! Core error kinds (`spec.md` §7). Callers that can safely ignore one of
//! these do so explicitly by matching the variant; none of them are
//! propagated as panics.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// Input arrived for an unknown or disconnected player. Dropped silently
    /// by the orchestrator.
    #[error("input ignored for unknown or disconnected player {0}")]
    InputIgnored(String),

    /// A purchase was attempted that doesn't resolve (no stock, insufficient
    /// funds, unknown item, or the player isn't in a shop's radius).
    #[error("invalid purchase")]
    InvalidPurchase,

    /// An item-use key transitioned but the item can't currently be used
    /// (not held, or not usable in the player's current state).
    #[error("invalid item use")]
    InvalidItemUse,

    /// A shoot request arrived but ammo was empty or the weapon is still on
    /// cooldown.
    #[error("shoot suppressed: ammo empty or cooldown active")]
    ShootSuppressed,
}

/// Errors surfaced at the orchestrator/store boundary, where collaborator
/// faults are recoverable but worth a named type rather than bare `anyhow`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
