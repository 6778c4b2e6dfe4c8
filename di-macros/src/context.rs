use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::fields;

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let impls = fields::named(input, "Context")?.iter().map(|field| {
        let ty = &field.ty;
        let ident = &field.ident;
        quote! {
            impl #impl_generics crate::FromRef<#name #ty_generics> for #ty #where_clause {
                fn from_ref(ctx: &#name #ty_generics) -> Self {
                    ::core::clone::Clone::clone(&ctx.#ident)
                }
            }
        }
    });

    Ok(quote! { #(#impls)* })
}
