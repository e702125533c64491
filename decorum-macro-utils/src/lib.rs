//! Shared utilities for decorum procedural macros
//!
//! Attribute parsing and code generation helpers used by `decorum-macros`.
//! Errors are returned as ready-to-emit `compile_error!` token streams.

use proc_macro2::{TokenStream as TokenStream2, TokenTree};
use quote::quote;
use syn::{
    parse::Parser, punctuated::Punctuated, Expr, FnArg, GenericArgument, Ident, Lit,
    MetaNameValue, Pat, PathArguments, ReturnType, Signature, Token, Type,
};

/// Parsed `#[cached(...)]` attributes
pub struct CachedAttributes {
    pub size: usize,
    pub custom_name: Option<String>,
}

/// Parsed `#[save_it(...)]` attributes
pub struct SaveItAttributes {
    pub slot: Ident,
}

/// Parsed `#[prevent_recursion(...)]` attributes
pub struct PreventRecursionAttributes {
    pub flag: Ident,
    /// Value returned by a re-entrant call; `Default::default()` when absent.
    pub default: Option<Expr>,
}

/// Parsed `#[deprecated_call(...)]` attributes
#[derive(Default)]
pub struct DeprecatedAttributes {
    pub message: Option<String>,
}

/// How a function receives its arguments.
pub struct CallArguments {
    /// `Some(true)` for `&mut self`, `Some(false)` for `&self` or `self`.
    pub receiver: Option<bool>,
    pub idents: Vec<Ident>,
}

impl CallArguments {
    pub fn has_self(&self) -> bool {
        self.receiver.is_some()
    }
}

fn error(msg: &str) -> TokenStream2 {
    quote! { compile_error!(#msg) }
}

fn parse_name_values(
    attr: TokenStream2,
) -> Result<Punctuated<MetaNameValue, Token![,]>, TokenStream2> {
    let parser = Punctuated::<MetaNameValue, Token![,]>::parse_terminated;
    parser.parse2(attr).map_err(|e| {
        let msg = format!("Failed to parse attributes: {}", e);
        quote! { compile_error!(#msg) }
    })
}

fn unknown_attribute(nv: &MetaNameValue, expected: &str) -> TokenStream2 {
    let name = nv
        .path
        .get_ident()
        .map(|ident| ident.to_string())
        .unwrap_or_else(|| "<path>".to_string());
    error(&format!(
        "Unknown attribute `{}`: expected {}",
        name, expected
    ))
}

/// Parse the `size` attribute
pub fn parse_size_attribute(nv: &MetaNameValue) -> Result<usize, TokenStream2> {
    match &nv.value {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Int(lit_int) => match lit_int.base10_parse::<usize>() {
                Ok(0) => Err(error("Invalid `size`: cache size must be a positive integer, got 0")),
                Ok(val) => Ok(val),
                Err(_) => Err(error("Invalid `size`: expected a positive integer")),
            },
            _ => Err(error("Invalid literal for `size`: expected integer")),
        },
        _ => Err(error("Invalid syntax for `size`: expected `size = <integer>`")),
    }
}

/// Parse a non-empty string attribute such as `name` or `message`
pub fn parse_string_attribute(nv: &MetaNameValue, attr_name: &str) -> Result<String, TokenStream2> {
    match &nv.value {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(s) => {
                let val = s.value();
                if val.trim().is_empty() {
                    Err(error(&format!("Invalid `{}`: must not be empty", attr_name)))
                } else {
                    Ok(val)
                }
            }
            _ => Err(error(&format!(
                "Invalid literal for `{}`: expected string",
                attr_name
            ))),
        },
        _ => Err(error(&format!(
            "Invalid syntax for `{}`: expected `{} = \"...\"`",
            attr_name, attr_name
        ))),
    }
}

/// Parse an attribute naming a field of `self`, like `slot = line_count`
pub fn parse_field_attribute(nv: &MetaNameValue, attr_name: &str) -> Result<Ident, TokenStream2> {
    match &nv.value {
        Expr::Path(expr_path) if expr_path.qself.is_none() => {
            expr_path.path.get_ident().cloned().ok_or_else(|| {
                error(&format!(
                    "Invalid `{}`: expected a field name of `self`",
                    attr_name
                ))
            })
        }
        _ => Err(error(&format!(
            "Invalid syntax for `{}`: expected `{} = <field>`",
            attr_name, attr_name
        ))),
    }
}

/// Parse `#[cached(size = N, name = "...")]` attributes
pub fn parse_cached_attributes(attr: TokenStream2) -> Result<CachedAttributes, TokenStream2> {
    let mut size = None;
    let mut custom_name = None;

    for nv in parse_name_values(attr)? {
        if nv.path.is_ident("size") {
            size = Some(parse_size_attribute(&nv)?);
        } else if nv.path.is_ident("name") {
            custom_name = Some(parse_string_attribute(&nv, "name")?);
        } else {
            return Err(unknown_attribute(&nv, "`size` or `name`"));
        }
    }

    let size = size.ok_or_else(|| error("Missing `size`: expected `#[cached(size = <integer>)]`"))?;
    Ok(CachedAttributes { size, custom_name })
}

/// Parse `#[save_it(slot = field)]` attributes
pub fn parse_save_it_attributes(attr: TokenStream2) -> Result<SaveItAttributes, TokenStream2> {
    let mut slot = None;

    for nv in parse_name_values(attr)? {
        if nv.path.is_ident("slot") {
            slot = Some(parse_field_attribute(&nv, "slot")?);
        } else {
            return Err(unknown_attribute(&nv, "`slot`"));
        }
    }

    let slot = slot.ok_or_else(|| error("Missing `slot`: expected `#[save_it(slot = <field>)]`"))?;
    Ok(SaveItAttributes { slot })
}

/// Parse `#[prevent_recursion(flag = field, default = expr)]` attributes
pub fn parse_prevent_recursion_attributes(
    attr: TokenStream2,
) -> Result<PreventRecursionAttributes, TokenStream2> {
    let mut flag = None;
    let mut default = None;

    for nv in parse_name_values(attr)? {
        if nv.path.is_ident("flag") {
            flag = Some(parse_field_attribute(&nv, "flag")?);
        } else if nv.path.is_ident("default") {
            default = Some(nv.value);
        } else {
            return Err(unknown_attribute(&nv, "`flag` or `default`"));
        }
    }

    let flag = flag.ok_or_else(|| {
        error("Missing `flag`: expected `#[prevent_recursion(flag = <field>)]`")
    })?;
    Ok(PreventRecursionAttributes { flag, default })
}

/// Parse `#[deprecated_call]` / `#[deprecated_call(message = "...")]` attributes
pub fn parse_deprecated_attributes(
    attr: TokenStream2,
) -> Result<DeprecatedAttributes, TokenStream2> {
    let mut attrs = DeprecatedAttributes::default();

    for nv in parse_name_values(attr)? {
        if nv.path.is_ident("message") {
            attrs.message = Some(parse_string_attribute(&nv, "message")?);
        } else {
            return Err(unknown_attribute(&nv, "`message`"));
        }
    }

    Ok(attrs)
}

/// Collect the receiver and argument names of a function signature
///
/// Only plain identifier patterns (`x: T`, `mut x: T`) are accepted, since
/// every argument takes part in the cache key.
pub fn collect_arguments(sig: &Signature) -> Result<CallArguments, TokenStream2> {
    let mut receiver = None;
    let mut idents = Vec::new();

    for arg in sig.inputs.iter() {
        match arg {
            FnArg::Receiver(recv) => {
                let is_mut = recv.reference.is_some() && recv.mutability.is_some();
                receiver = Some(is_mut);
            }
            FnArg::Typed(pat_type) => match &*pat_type.pat {
                Pat::Ident(pat_ident) if pat_ident.subpat.is_none() => {
                    idents.push(pat_ident.ident.clone());
                }
                _ => {
                    return Err(error(
                        "Unsupported argument pattern: cached arguments must be plain identifiers",
                    ))
                }
            },
        }
    }

    Ok(CallArguments { receiver, idents })
}

/// Generate an expression evaluating to `Result<CacheKey, KeyError>`
///
/// The key is `Seq([self?, args...])`, built through `Canonicalize` on a
/// reference to each argument, so nothing is moved.
pub fn generate_key_expr(has_self: bool, arg_idents: &[Ident]) -> TokenStream2 {
    let self_part = if has_self {
        quote! { ::decorum_core::Canonicalize::canonicalize(&self)?, }
    } else {
        quote! {}
    };

    quote! {
        (|| -> ::core::result::Result<::decorum_core::CacheKey, ::decorum_core::KeyError> {
            ::core::result::Result::Ok(::decorum_core::CacheKey::Seq(::std::vec![
                #self_part
                #( ::decorum_core::Canonicalize::canonicalize(&#arg_idents)?, )*
            ]))
        })()
    }
}

/// The declared return type, `()` when omitted
pub fn return_type(output: &ReturnType) -> TokenStream2 {
    match output {
        ReturnType::Type(_, ty) => quote! { #ty },
        ReturnType::Default => quote! { () },
    }
}

/// The `T` of a `Result<T, ..>` return type, or `None` for other types
///
/// Matches on the last path segment, so `Result<T, E>`,
/// `std::result::Result<T, E>` and aliases like `io::Result<T>` all qualify.
pub fn result_ok_type(output: &ReturnType) -> Option<Type> {
    let ty = match output {
        ReturnType::Type(_, ty) => &**ty,
        ReturnType::Default => return None,
    };
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ok) => Some(ok.clone()),
            _ => None,
        }),
        _ => None,
    }
}

/// Whether the return type holds a borrow that is not `'static`
///
/// Elided references count as borrows.
pub fn returns_borrow(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => holds_borrow(quote! { #ty }),
        ReturnType::Default => false,
    }
}

fn holds_borrow(tokens: TokenStream2) -> bool {
    let mut iter = tokens.into_iter().peekable();
    while let Some(tree) = iter.next() {
        match tree {
            TokenTree::Group(group) => {
                if holds_borrow(group.stream()) {
                    return true;
                }
            }
            TokenTree::Punct(punct) if punct.as_char() == '&' => match iter.peek() {
                Some(TokenTree::Punct(next)) if next.as_char() == '\'' => {}
                _ => return true,
            },
            TokenTree::Punct(punct) if punct.as_char() == '\'' => match iter.next() {
                Some(TokenTree::Ident(lifetime)) if lifetime == "static" => {}
                _ => return true,
            },
            _ => {}
        }
    }
    false
}
