//! Derive macros for Provenance's `FromRef` dependency injection.
//!
//! - `#[derive(Context)]` on the root context: every field type becomes
//!   extractable from it.
//! - `#[derive(FromContext)]` on repositories and services: the struct is
//!   built by extracting each of its fields from the context.
//!
//! Generated code names `crate::FromRef`, so the consuming crate re-exports
//! the trait at its root.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod context;
mod fields;
mod from_context;

/// Implements `FromRef<Self>` for the type of every named field.
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct Context {
///     pub ledger: AppLedger,
///     pub config: AppConfig,
/// }
///
/// // impl FromRef<Context> for AppLedger { ctx.ledger.clone() }
/// // impl FromRef<Context> for AppConfig { ctx.config.clone() }
/// ```
///
/// Field types must be `Clone` and distinct.
#[proc_macro_derive(Context)]
pub fn derive_context(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Implements `FromRef<Context>` by resolving each field from the context.
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct TokenRepository {
///     ledger: AppLedger,
///     config: AppConfig,
/// }
/// ```
///
/// The context type defaults to `crate::context::Context` and can be overridden
/// with `#[from_context(Context = "path::To::Context")]`.
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
