//! Attribute parsing shared by the derives.

use proc_macro2::TokenStream;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Ident, LitStr, Token,
};

/// Parsed `#[param(...)]` attribute.
#[derive(Debug, Default)]
pub struct ParamAttr {
    /// Source key.
    pub key: Option<LitStr>,
    /// Decode by recursion into the field's own schema.
    pub nested: bool,
}

impl Parse for ParamAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self {
                key: Some(input.parse()?),
                nested: false,
            });
        }

        let mut attr = Self::default();
        let ident: Ident = input.parse()?;
        match ident.to_string().as_str() {
            "nested" => attr.nested = true,
            "name" => {
                input.parse::<Token![=]>()?;
                attr.key = Some(input.parse()?);
            }
            other => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown param attribute: {other}"),
                ))
            }
        }
        if !input.is_empty() {
            return Err(input.error("expected a single param attribute"));
        }
        Ok(attr)
    }
}

/// Reads the `#[param]` attribute of a field, if any.
pub fn param_attr(attrs: &[Attribute]) -> syn::Result<Option<ParamAttr>> {
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("param")) {
        if found.is_some() {
            return Err(syn::Error::new(attr.span(), "duplicate param attribute"));
        }
        found = Some(attr.parse_args::<ParamAttr>()?);
    }
    Ok(found)
}

/// Paths the generated code uses to reach the runtime crates.
#[derive(Debug)]
pub struct CratePaths {
    /// Path of the parameter extraction crate.
    pub extract: syn::Path,
    /// Path of the masking crate.
    pub mask: syn::Path,
}

impl Default for CratePaths {
    fn default() -> Self {
        Self {
            extract: syn::parse_quote!(::vestibule_extract),
            mask: syn::parse_quote!(::vestibule_mask),
        }
    }
}

/// Reads `#[vestibule(crate = "path")]` from a container.
///
/// `path` names the facade crate; the runtime crates are then reached as
/// `path::extract` and `path::mask`.
pub fn crate_paths(attrs: &[Attribute]) -> syn::Result<CratePaths> {
    let mut out = CratePaths::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("vestibule")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("crate") {
                return Err(meta.error("unknown vestibule attribute"));
            }
            let lit: LitStr = meta.value()?.parse()?;
            let root: syn::Path = lit.parse()?;
            out.extract = syn::parse_quote!(#root::extract);
            out.mask = syn::parse_quote!(#root::mask);
            Ok(())
        })?;
    }
    Ok(out)
}

/// One item of a `#[mask(...)]` list.
enum MaskItem {
    Default(LitStr),
    Tagged(Ident, LitStr),
    Flag(Ident),
}

impl Parse for MaskItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self::Default(input.parse()?));
        }
        let ident: Ident = input.parse()?;
        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            return Ok(Self::Tagged(ident, input.parse()?));
        }
        Ok(Self::Flag(ident))
    }
}

/// Parsed `#[mask(...)]` attributes of a field.
#[derive(Debug, Default)]
pub struct MaskAttr {
    /// `(tag, directive)` pairs.
    pub directives: Vec<(String, String)>,
    /// Leave the field out of the metadata.
    pub skip: bool,
    /// Treat the field as a scalar whatever its type.
    pub opaque: bool,
}

/// Reads every `#[mask]` attribute of a field.
pub fn mask_attr(attrs: &[Attribute]) -> syn::Result<MaskAttr> {
    let mut out = MaskAttr::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("mask")) {
        let items = attr.parse_args_with(Punctuated::<MaskItem, Token![,]>::parse_terminated)?;
        for item in items {
            match item {
                MaskItem::Default(lit) => out.push(crate::DEFAULT_TAG, lit)?,
                MaskItem::Tagged(tag, lit) => out.push(&tag.to_string(), lit)?,
                MaskItem::Flag(flag) => match flag.to_string().as_str() {
                    "skip" => out.skip = true,
                    "opaque" => out.opaque = true,
                    other => {
                        return Err(syn::Error::new(
                            flag.span(),
                            format!("unknown mask attribute: {other}"),
                        ))
                    }
                },
            }
        }
    }
    Ok(out)
}

impl MaskAttr {
    fn push(&mut self, tag: &str, lit: LitStr) -> syn::Result<()> {
        if self.directives.iter().any(|(t, _)| t == tag) {
            return Err(syn::Error::new(
                lit.span(),
                format!("duplicate directive for tag {tag}"),
            ));
        }
        self.directives.push((tag.to_string(), lit.value()));
        Ok(())
    }
}

/// The subset of serde attributes that changes the serialized shape.
#[derive(Debug, Default)]
pub struct SerdeAttr {
    /// `rename` / `rename(serialize = ...)`.
    pub rename: Option<String>,
    /// `rename_all` / `rename_all(serialize = ...)`, containers only.
    pub rename_all: Option<String>,
    /// `skip` / `skip_serializing`.
    pub skip: bool,
    /// `flatten`.
    pub flatten: bool,
    /// `transparent`, containers only.
    pub transparent: bool,
}

/// Reads the serde attributes relevant to the serialized shape, ignoring the
/// rest.
pub fn serde_attr(attrs: &[Attribute]) -> syn::Result<SerdeAttr> {
    let mut out = SerdeAttr::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            let name = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();
            match name.as_str() {
                "rename" | "rename_all" => {
                    let value = serialize_name(&meta)?;
                    if name == "rename" {
                        out.rename = value.or(out.rename.take());
                    } else {
                        out.rename_all = value.or(out.rename_all.take());
                    }
                }
                "skip" | "skip_serializing" => out.skip = true,
                "flatten" => out.flatten = true,
                "transparent" => out.transparent = true,
                _ => skip_meta_value(&meta)?,
            }
            Ok(())
        })?;
    }
    Ok(out)
}

/// Value of `name = "x"` or the `serialize` half of `name(serialize = "x")`.
fn serialize_name(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        let lit: LitStr = meta.value()?.parse()?;
        return Ok(Some(lit.value()));
    }
    let mut found = None;
    meta.parse_nested_meta(|inner| {
        let lit: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("serialize") {
            found = Some(lit.value());
        }
        Ok(())
    })?;
    Ok(found)
}

fn skip_meta_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<TokenStream>()?;
    }
    Ok(())
}

/// Applies a serde `rename_all` rule to a Rust field name.
pub fn rename_field(field: &str, rule: Option<&str>) -> syn::Result<String> {
    let field = field.strip_prefix("r#").unwrap_or(field);
    let words: Vec<&str> = field.split('_').filter(|w| !w.is_empty()).collect();
    let capitalize = |w: &str| {
        let mut chars = w.chars();
        chars
            .next()
            .map(|c| c.to_uppercase().collect::<String>() + chars.as_str())
            .unwrap_or_default()
    };

    let renamed = match rule {
        None => field.to_string(),
        Some("lowercase") => field.to_lowercase(),
        Some("UPPERCASE") => field.to_uppercase(),
        Some("snake_case") => field.to_string(),
        Some("SCREAMING_SNAKE_CASE") => field.to_uppercase(),
        Some("kebab-case") => words.join("-"),
        Some("SCREAMING-KEBAB-CASE") => words.join("-").to_uppercase(),
        Some("PascalCase") => words.iter().map(|w| capitalize(w)).collect(),
        Some("camelCase") => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { (*w).to_string() } else { capitalize(w) })
            .collect(),
        Some(other) => {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                format!("unsupported rename_all rule: {other}"),
            ))
        }
    };
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_crate_paths() {
        let CratePaths { extract, .. } = crate_paths(&[]).unwrap();
        assert_eq!(
            quote::quote!(#extract).to_string(),
            quote::quote!(::vestibule_extract).to_string()
        );

        let attrs: Vec<Attribute> = vec![parse_quote!(#[vestibule(crate = "::vestibule")])];
        let CratePaths { extract, mask } = crate_paths(&attrs).unwrap();
        assert_eq!(
            quote::quote!(#extract).to_string(),
            quote::quote!(::vestibule::extract).to_string()
        );
        assert_eq!(quote::quote!(#mask).to_string(), quote::quote!(::vestibule::mask).to_string());

        let attrs: Vec<Attribute> = vec![parse_quote!(#[vestibule(krate = "x")])];
        assert!(crate_paths(&attrs).is_err());
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(rename_field("deleted_only", Some("camelCase")).unwrap(), "deletedOnly");
        assert_eq!(rename_field("deleted_only", Some("PascalCase")).unwrap(), "DeletedOnly");
        assert_eq!(rename_field("deleted_only", Some("kebab-case")).unwrap(), "deleted-only");
        assert_eq!(
            rename_field("deleted_only", Some("SCREAMING_SNAKE_CASE")).unwrap(),
            "DELETED_ONLY"
        );
        assert_eq!(rename_field("r#type", None).unwrap(), "type");
        assert!(rename_field("a", Some("Title Case")).is_err());
    }

    #[test]
    fn test_param_attr_forms() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[param("id")])];
        assert_eq!(param_attr(&attrs).unwrap().unwrap().key.unwrap().value(), "id");

        let attrs: Vec<Attribute> = vec![parse_quote!(#[param(name = "billNum")])];
        assert_eq!(
            param_attr(&attrs).unwrap().unwrap().key.unwrap().value(),
            "billNum"
        );

        let attrs: Vec<Attribute> = vec![parse_quote!(#[param(nested)])];
        assert!(param_attr(&attrs).unwrap().unwrap().nested);

        let attrs: Vec<Attribute> = vec![parse_quote!(#[param(bogus)])];
        assert!(param_attr(&attrs).is_err());
    }

    #[test]
    fn test_mask_attr_forms() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[mask("email", audit = "-")])];
        let attr = mask_attr(&attrs).unwrap();
        assert_eq!(
            attr.directives,
            vec![
                ("mask".to_string(), "email".to_string()),
                ("audit".to_string(), "-".to_string())
            ]
        );

        let attrs: Vec<Attribute> = vec![parse_quote!(#[mask(skip)]), parse_quote!(#[mask(opaque)])];
        let attr = mask_attr(&attrs).unwrap();
        assert!(attr.skip && attr.opaque);

        let attrs: Vec<Attribute> = vec![parse_quote!(#[mask("a", "b")])];
        assert!(mask_attr(&attrs).is_err());
    }

    #[test]
    fn test_serde_attr_ignores_unrelated_items() {
        let attrs: Vec<Attribute> = vec![parse_quote!(
            #[serde(default, rename = "typeId", skip_serializing_if = "Option::is_none", with = "x")]
        )];
        let attr = serde_attr(&attrs).unwrap();
        assert_eq!(attr.rename.as_deref(), Some("typeId"));
        assert!(!attr.skip);

        let attrs: Vec<Attribute> = vec![parse_quote!(
            #[serde(rename(serialize = "out", deserialize = "in"), flatten)]
        )];
        let attr = serde_attr(&attrs).unwrap();
        assert_eq!(attr.rename.as_deref(), Some("out"));
        assert!(attr.flatten);
    }
}
