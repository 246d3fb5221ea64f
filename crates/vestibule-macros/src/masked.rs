//! `#[derive(Masked)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Data, DeriveInput, Fields};

use crate::parse::{crate_paths, mask_attr, rename_field, serde_attr};

/// Generates the `MaskSchema` impl.
pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let container = serde_attr(&input.attrs)?;
    let krate = crate_paths(&input.attrs)?.mask;

    let mut generics = input.generics.clone();
    let has_type_params = generics.type_params().next().is_some();

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) if !container.transparent => {
                let mut pushes = Vec::new();
                for field in &named.named {
                    let serde = serde_attr(&field.attrs)?;
                    let mask = mask_attr(&field.attrs)?;
                    if serde.skip || mask.skip {
                        continue;
                    }
                    let ty = &field.ty;
                    if has_type_params {
                        generics
                            .make_where_clause()
                            .predicates
                            .push(parse_quote!(#ty: #krate::MaskSchema));
                    }

                    if serde.flatten {
                        pushes.push(quote! {
                            fields.append(
                                <#ty as #krate::MaskSchema>::mask_kind(tag).into_fields(),
                            );
                        });
                        continue;
                    }

                    let ident = field
                        .ident
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    let attr_name = match serde.rename {
                        Some(rename) => rename,
                        None => rename_field(&ident, container.rename_all.as_deref())?,
                    };

                    let arms = mask.directives.iter().map(|(tag, directive)| {
                        quote! { #tag => #directive, }
                    });
                    let directive = quote! {
                        match tag {
                            #(#arms)*
                            _ => "",
                        }
                    };

                    let kind = if mask.opaque {
                        quote! { #krate::FieldKind::Scalar }
                    } else {
                        quote! { <#ty as #krate::MaskSchema>::mask_kind(tag) }
                    };

                    pushes.push(quote! {
                        fields.push(#krate::FieldMeta::new(#attr_name, #directive, #kind));
                    });
                }
                quote! {
                    let mut fields = #krate::Fields::new();
                    #(#pushes)*
                    #krate::FieldKind::Object(fields)
                }
            }
            Fields::Named(named) => match named.named.first() {
                Some(field) => forward(&krate, &field.ty),
                None => scalar(&krate),
            },
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                forward(&krate, &unnamed.unnamed[0].ty)
            }
            _ => scalar(&krate),
        },
        Data::Enum(_) | Data::Union(_) => scalar(&krate),
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #krate::MaskSchema for #name #ty_generics #where_clause {
            fn mask_kind(tag: &str) -> #krate::FieldKind {
                let _ = tag;
                #body
            }
        }
    })
}

fn forward(krate: &syn::Path, ty: &syn::Type) -> TokenStream {
    quote! { <#ty as #krate::MaskSchema>::mask_kind(tag) }
}

fn scalar(krate: &syn::Path) -> TokenStream {
    quote! { #krate::FieldKind::Scalar }
}
