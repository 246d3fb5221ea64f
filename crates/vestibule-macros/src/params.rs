//! `#[derive(Params)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Fields};

use crate::parse::{crate_paths, param_attr};

/// Generates the `ParamSchema` impl.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let extract = crate_paths(&input.attrs)?.extract;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new(
                    input.span(),
                    "Params can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "Params can only be derived for structs",
            ))
        }
    };

    let mut path_stmts = Vec::new();
    let mut query_stmts = Vec::new();
    let mut key_stmts = Vec::new();

    for field in fields {
        let Some(attr) = param_attr(&field.attrs)? else {
            continue;
        };
        let Some(ident) = &field.ident else {
            continue;
        };

        if attr.nested {
            query_stmts.push(quote! {
                #extract::ParamSchema::decode_query(&mut self.#ident, args)?;
            });
            key_stmts.push(quote! {
                #extract::ParamSchema::param_keys(&self.#ident, keys);
            });
            continue;
        }

        let Some(key) = attr.key else {
            continue;
        };
        path_stmts.push(quote! {
            #extract::assign_path(&mut self.#ident, #key, params)?;
        });
        query_stmts.push(quote! {
            #extract::assign_query(&mut self.#ident, #key, args)?;
        });
        key_stmts.push(quote! {
            keys.push(#key);
        });
    }

    Ok(quote! {
        impl #impl_generics #extract::ParamSchema for #name #ty_generics #where_clause {
            fn decode_path(
                &mut self,
                params: &#extract::Params,
            ) -> ::core::result::Result<(), #extract::ExtractionError> {
                let _ = params;
                #(#path_stmts)*
                ::core::result::Result::Ok(())
            }

            fn decode_query(
                &mut self,
                args: &#extract::QueryArgs,
            ) -> ::core::result::Result<(), #extract::ExtractionError> {
                let _ = args;
                #(#query_stmts)*
                ::core::result::Result::Ok(())
            }

            fn param_keys(&self, keys: &mut ::std::vec::Vec<&'static str>) {
                let _ = &keys;
                #(#key_stmts)*
            }
        }
    })
}
