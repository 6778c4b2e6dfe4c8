//! Dependency injection infrastructure.
//!
//! This module provides compile-time dependency injection using the `FromRef` trait
//! and derive macros from `di-macros`.
//!
//! # Overview
//!
//! - `FromRef<T>`: Trait for extracting a value from a reference to `T`
//! - `#[derive(Context)]`: Makes each field of the root context extractable via `FromRef`
//! - `#[derive(FromContext)]`: Generates a `FromRef<Context>` impl resolving every field
//!
//! # Example
//!
//! ```ignore
//! use crate::di::FromContext;
//!
//! #[derive(FromContext, Clone)]
//! pub struct TokenRepository {
//!     ledger: AppLedger,  // resolved via FromRef<Context>
//! }
//!
//! // Usage
//! let repo = TokenRepository::from_ref(&ctx);
//! ```

/// Trait for extracting a value from a reference to another type.
///
/// This is the core trait for compile-time dependency injection.
/// Types that implement `FromRef<T>` can be extracted from `&T`.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Blanket implementation: any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}

// Re-export derive macros
pub use di_macros::{Context, FromContext};

#[cfg(test)]
mod tests {
    use super::{Context, FromContext, FromRef};

    #[derive(Context, Clone)]
    struct Root {
        name: String,
        port: u16,
    }

    #[derive(FromContext)]
    #[from_context(Context = "Root")]
    struct Endpoint {
        name: String,
        port: u16,
    }

    #[test]
    fn test_context_derive_extracts_by_type() {
        let root = Root {
            name: "ledger".to_string(),
            port: 8545,
        };
        assert_eq!(String::from_ref(&root), "ledger");
        assert_eq!(u16::from_ref(&root), 8545);
    }

    #[test]
    fn test_from_context_resolves_every_field() {
        let root = Root {
            name: "snapshot".to_string(),
            port: 8545,
        };
        let endpoint = Endpoint::from_ref(&root);
        assert_eq!(endpoint.name, "snapshot");
        assert_eq!(endpoint.port, 8545);
    }

    #[test]
    fn test_blanket_from_self() {
        let value = 42u32;
        assert_eq!(u32::from_ref(&value), 42);
    }
}
