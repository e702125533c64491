use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, parse_quote, Data, DeriveInput, Fields, Ident, Index, ItemFn, Signature,
};

// Import shared utilities
use decorum_macro_utils::{
    collect_arguments, generate_key_expr, parse_cached_attributes, parse_deprecated_attributes,
    parse_prevent_recursion_attributes, parse_save_it_attributes, result_ok_type, return_type,
    returns_borrow, CachedAttributes, DeprecatedAttributes, PreventRecursionAttributes,
    SaveItAttributes,
};

fn error(msg: &str) -> TokenStream2 {
    quote! { compile_error!(#msg) }
}

/// Reject signatures a per-function static cache cannot serve
fn check_cacheable_signature(sig: &Signature) -> Result<(), TokenStream2> {
    if sig.asyncness.is_some() {
        return Err(error("#[cached] does not support async functions"));
    }
    if sig.generics.type_params().next().is_some() || sig.generics.const_params().next().is_some()
    {
        return Err(error(
            "#[cached] does not support generic functions: the cache is a single static per function",
        ));
    }
    if returns_borrow(&sig.output) {
        return Err(error(
            "#[cached] functions must return an owned value: borrowed return types \
             (other than `'static`) cannot be stored in the cache",
        ));
    }
    Ok(())
}

/// Require a `&self` receiver, as state lives in a field of `self`
fn check_shared_receiver(sig: &Signature, macro_name: &str) -> Result<(), TokenStream2> {
    match sig.receiver() {
        Some(recv) if recv.reference.is_some() && recv.mutability.is_none() => Ok(()),
        _ => Err(error(&format!(
            "#[{}] can only be used on methods taking `&self`",
            macro_name
        ))),
    }
}

/// Generate the body of a `#[cached]` function
fn generate_cached(attrs: CachedAttributes, input: &ItemFn) -> Result<TokenStream2, TokenStream2> {
    let fn_attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    check_cacheable_signature(sig)?;
    let args = collect_arguments(sig)?;

    let ident = &sig.ident;
    let fn_name_str = attrs.custom_name.unwrap_or_else(|| ident.to_string());
    let size = attrs.size;
    let cache_ident = format_ident!("DECORUM_CACHE_{}", ident.to_string().to_uppercase());

    let key_expr = generate_key_expr(args.has_self(), &args.idents);
    let ret_type = return_type(&sig.output);

    // Result-returning functions cache the Ok value only
    let (value_type, hit_return, store) = match result_ok_type(&sig.output) {
        Some(ok_type) => (
            quote! { #ok_type },
            quote! { return ::core::result::Result::Ok(__hit); },
            quote! {
                if let ::core::result::Result::Ok(__value) = &__result {
                    #cache_ident.with(|__cache| {
                        __cache
                            .borrow_mut()
                            .insert(__key, ::core::clone::Clone::clone(__value));
                    });
                }
            },
        ),
        None => (
            ret_type.clone(),
            quote! { return __hit; },
            quote! {
                #cache_ident.with(|__cache| {
                    __cache
                        .borrow_mut()
                        .insert(__key, ::core::clone::Clone::clone(&__result));
                });
            },
        ),
    };

    Ok(quote! {
        #(#fn_attrs)*
        #vis #sig {
            thread_local! {
                static #cache_ident: ::decorum_core::__private::RefCell<::decorum_core::BoundedCache<#value_type>> = {
                    const __CAPACITY: ::decorum_core::__private::NonZeroUsize =
                        match ::decorum_core::__private::NonZeroUsize::new(#size) {
                            ::core::option::Option::Some(capacity) => capacity,
                            ::core::option::Option::None => panic!("cache size must be positive"),
                        };
                    ::decorum_core::__private::RefCell::new(
                        ::decorum_core::BoundedCache::registered(#fn_name_str, __CAPACITY),
                    )
                };
            }

            let __key = #key_expr;
            #[allow(unused_mut)]
            let mut __body = || -> #ret_type #block;

            let __key = match __key {
                ::core::result::Result::Ok(__key) => __key,
                ::core::result::Result::Err(__err) => {
                    ::decorum_core::__private::key_failure(#fn_name_str, &__err);
                    return __body();
                }
            };

            // The borrow ends before the body runs, so recursive calls can use the cache
            let __cached = #cache_ident.with(|__cache| {
                __cache
                    .borrow_mut()
                    .get(&__key)
                    .map(::core::clone::Clone::clone)
            });
            if let ::core::option::Option::Some(__hit) = __cached {
                #hit_return
            }

            let __result = __body();
            #store
            __result
        }
    })
}

/// Generate the body of a `#[save_it]` method
fn generate_save_it(attrs: SaveItAttributes, input: &ItemFn) -> Result<TokenStream2, TokenStream2> {
    let fn_attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    check_shared_receiver(sig, "save_it")?;

    let slot = &attrs.slot;
    let ret_type = return_type(&sig.output);

    Ok(quote! {
        #(#fn_attrs)*
        #vis #sig {
            ::core::clone::Clone::clone(self.#slot.get_or_init(|| -> #ret_type #block))
        }
    })
}

/// Generate the body of a `#[prevent_recursion]` method
fn generate_prevent_recursion(
    attrs: PreventRecursionAttributes,
    input: &ItemFn,
) -> Result<TokenStream2, TokenStream2> {
    let fn_attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    check_shared_receiver(sig, "prevent_recursion")?;

    let flag = &attrs.flag;
    let ret_type = return_type(&sig.output);
    let default = match attrs.default {
        Some(expr) => quote! { #expr },
        None => quote! { ::core::default::Default::default() },
    };

    Ok(quote! {
        #(#fn_attrs)*
        #vis #sig {
            self.#flag.run(|| -> #ret_type { #default }, || -> #ret_type #block)
        }
    })
}

/// Generate the body of a `#[deprecated_call]` function
fn generate_deprecated(attrs: DeprecatedAttributes, input: &ItemFn) -> TokenStream2 {
    let fn_attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    let fn_name_str = sig.ident.to_string();
    let message = attrs
        .message
        .unwrap_or_else(|| format!("{} is deprecated", fn_name_str));

    // The warning reports the caller of the deprecated function
    let track_caller = if sig.asyncness.is_none() {
        quote! { #[track_caller] }
    } else {
        quote! {}
    };

    quote! {
        #(#fn_attrs)*
        #track_caller
        #vis #sig {
            ::decorum_core::warn_deprecated(#fn_name_str, #message);
            #block
        }
    }
}

/// Check a field for `#[canonicalize(skip)]`
fn is_skipped(field: &syn::Field) -> Result<bool, TokenStream2> {
    for attr in &field.attrs {
        if !attr.path().is_ident("canonicalize") {
            continue;
        }
        match attr.parse_args::<Ident>() {
            Ok(option) if option == "skip" => return Ok(true),
            _ => {
                return Err(error(
                    "Invalid `canonicalize` attribute: expected `#[canonicalize(skip)]`",
                ))
            }
        }
    }
    Ok(false)
}

/// Key parts for the fields of a struct, read through `self`
fn struct_field_parts(fields: &Fields) -> Result<Vec<TokenStream2>, TokenStream2> {
    let mut parts = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if is_skipped(field)? {
            continue;
        }
        let access = match &field.ident {
            Some(name) => quote! { self.#name },
            None => {
                let index = Index::from(index);
                quote! { self.#index }
            }
        };
        parts.push(quote! { ::decorum_core::Canonicalize::canonicalize(&#access)? });
    }
    Ok(parts)
}

/// Match pattern and key parts for one enum variant
fn variant_arm(
    type_name: &str,
    variant: &syn::Variant,
) -> Result<TokenStream2, TokenStream2> {
    let variant_ident = &variant.ident;
    let tag = format!("{}::{}", type_name, variant_ident);
    let mut parts = Vec::new();

    let pattern = match &variant.fields {
        Fields::Named(named) => {
            let mut bindings = Vec::new();
            for field in &named.named {
                if is_skipped(field)? {
                    continue;
                }
                let name = &field.ident;
                bindings.push(quote! { #name });
                parts.push(quote! { ::decorum_core::Canonicalize::canonicalize(#name)? });
            }
            quote! { Self::#variant_ident { #(#bindings,)* .. } }
        }
        Fields::Unnamed(unnamed) => {
            let mut bindings = Vec::new();
            for (index, field) in unnamed.unnamed.iter().enumerate() {
                if is_skipped(field)? {
                    bindings.push(quote! { _ });
                    continue;
                }
                let binding = format_ident!("__field{}", index);
                parts.push(quote! { ::decorum_core::Canonicalize::canonicalize(#binding)? });
                bindings.push(quote! { #binding });
            }
            quote! { Self::#variant_ident(#(#bindings),*) }
        }
        Fields::Unit => quote! { Self::#variant_ident },
    };

    Ok(quote! {
        #pattern => ::core::result::Result::Ok(::decorum_core::CacheKey::Seq(::std::vec![
            ::decorum_core::CacheKey::Str(::std::string::String::from(#tag)),
            #(#parts,)*
        ])),
    })
}

fn generate_canonicalize(input: &DeriveInput) -> Result<TokenStream2, TokenStream2> {
    let ident = &input.ident;
    let type_name = ident.to_string();

    let body = match &input.data {
        Data::Struct(data) => {
            let parts = struct_field_parts(&data.fields)?;
            quote! {
                ::core::result::Result::Ok(::decorum_core::CacheKey::Seq(::std::vec![
                    ::decorum_core::CacheKey::Str(::std::string::String::from(#type_name)),
                    #(#parts,)*
                ]))
            }
        }
        Data::Enum(data) if data.variants.is_empty() => quote! { match *self {} },
        Data::Enum(data) => {
            let arms = data
                .variants
                .iter()
                .map(|variant| variant_arm(&type_name, variant))
                .collect::<Result<Vec<_>, _>>()?;
            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Union(_) => return Err(error("Canonicalize cannot be derived for unions")),
    };

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::decorum_core::Canonicalize));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::decorum_core::Canonicalize for #ident #ty_generics #where_clause {
            fn canonicalize(
                &self,
            ) -> ::core::result::Result<::decorum_core::CacheKey, ::decorum_core::KeyError> {
                #body
            }
        }
    })
}

/// Memoizes a function or method in a bounded, thread-local LRU cache.
///
/// Calls are keyed by the canonical form of their arguments (and of `self`
/// for methods): equal arguments hit the same entry even when they arrive in
/// different containers, and maps or sets hit regardless of order. When the
/// cache is full, the least recently used entry is evicted.
///
/// # Requirements
///
/// - **Arguments**: every argument, and `self` for methods, must implement
///   `Canonicalize` (derive it with `#[derive(Canonicalize)]`)
/// - **Return type**: must implement `Clone`
/// - **Signature**: no type or const generics, no `async`, arguments bound
///   to plain identifiers
/// - **Dependency**: the generated code refers to `decorum_core`
///
/// # Macro Parameters
///
/// - `size` (required): maximum number of entries per thread. Must be a
///   positive integer literal; `size = 0` does not compile.
/// - `name` (optional): key of the cache in the statistics registry.
///   Default: the function name.
///
/// # Cache Behavior
///
/// - **Regular functions**: all results are cached
/// - **Result-returning functions**: only `Ok` values are cached, `Err` values are not
/// - **Thread-local storage**: each thread keeps its own cache, all of them
///   reporting to the same registry entry
/// - **Recursion**: the cache is not borrowed while the body runs
/// - **Unkeyable arguments**: a NaN float, for instance, runs the body
///   uncached and logs a `debug` event
///
/// # Examples
///
/// ## Basic Function Caching
///
/// ```ignore
/// use decorum::cached;
///
/// #[cached(size = 128)]
/// fn fibonacci(n: u64) -> u64 {
///     if n <= 1 {
///         return n;
///     }
///     fibonacci(n - 1) + fibonacci(n - 2)
/// }
/// ```
///
/// ## Result Type Caching (Errors NOT Cached)
///
/// ```ignore
/// use decorum::cached;
///
/// #[cached(size = 16, name = "parse_config")]
/// fn parse(source: String) -> Result<Config, ParseError> {
///     Config::from_str(&source)
/// }
/// ```
///
/// ## Method Caching
///
/// ```ignore
/// use decorum::{cached, Canonicalize};
///
/// #[derive(Canonicalize)]
/// struct Project {
///     root: String,
/// }
///
/// impl Project {
///     #[cached(size = 32)]
///     fn resolve(&self, module: String) -> Option<String> {
///         find_module(&self.root, &module)
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn cached(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match parse_cached_attributes(attr.into()) {
        Ok(attrs) => attrs,
        Err(err) => return err.into(),
    };
    let input = parse_macro_input!(item as ItemFn);

    match generate_cached(attrs, &input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.into(),
    }
}

/// Computes a method's result once per instance and returns it afterwards.
///
/// The result of the first call is stored in the `SaveSlot` field named by
/// `slot`; later calls return a clone of it without running the body,
/// whatever their arguments.
///
/// # Requirements
///
/// - a `&self` receiver
/// - a field `slot: SaveSlot<R>` where `R` is the return type, `R: Clone`
///
/// # Examples
///
/// ```ignore
/// use decorum::{save_it, SaveSlot};
///
/// struct Module {
///     source: String,
///     names: SaveSlot<Vec<String>>,
/// }
///
/// impl Module {
///     #[save_it(slot = names)]
///     fn defined_names(&self) -> Vec<String> {
///         scan_names(&self.source)
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn save_it(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match parse_save_it_attributes(attr.into()) {
        Ok(attrs) => attrs,
        Err(err) => return err.into(),
    };
    let input = parse_macro_input!(item as ItemFn);

    match generate_save_it(attrs, &input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.into(),
    }
}

/// Returns a default value instead of re-entering a method on the same instance.
///
/// While the method body runs, the `ReentrancyFlag` field named by `flag` is
/// raised. A nested call on the same instance returns `default` (or
/// `Default::default()` when omitted) without running the body. The flag is
/// lowered on every exit, panics included.
///
/// # Examples
///
/// ```ignore
/// use decorum::{prevent_recursion, ReentrancyFlag};
///
/// struct Scope {
///     parent: Option<Rc<Scope>>,
///     walking: ReentrancyFlag,
/// }
///
/// impl Scope {
///     #[prevent_recursion(flag = walking, default = 0)]
///     fn depth(&self) -> usize {
///         self.parent.as_ref().map_or(0, |p| p.depth() + 1)
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn prevent_recursion(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match parse_prevent_recursion_attributes(attr.into()) {
        Ok(attrs) => attrs,
        Err(err) => return err.into(),
    };
    let input = parse_macro_input!(item as ItemFn);

    match generate_prevent_recursion(attrs, &input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.into(),
    }
}

/// Logs a deprecation warning every time the function is called.
///
/// The warning is a `tracing` event at `WARN` level with target
/// `decorum::deprecation`. The message defaults to `"<name> is deprecated"`.
///
/// # Examples
///
/// ```ignore
/// use decorum::deprecated_call;
///
/// #[deprecated_call]
/// fn old_lookup(name: &str) -> Option<u32> {
///     lookup(name)
/// }
///
/// #[deprecated_call(message = "use `lookup` instead")]
/// fn older_lookup(name: &str) -> Option<u32> {
///     lookup(name)
/// }
/// ```
#[proc_macro_attribute]
pub fn deprecated_call(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match parse_deprecated_attributes(attr.into()) {
        Ok(attrs) => attrs,
        Err(err) => return err.into(),
    };
    let input = parse_macro_input!(item as ItemFn);

    generate_deprecated(attrs, &input).into()
}

/// Derives `Canonicalize` from a type's fields.
///
/// A struct becomes `Seq([Str("Type"), fields...])` and an enum value
/// `Seq([Str("Type::Variant"), fields...])`. Fields marked
/// `#[canonicalize(skip)]` are left out of the key. Type parameters get a
/// `Canonicalize` bound.
///
/// # Examples
///
/// ```ignore
/// use decorum::Canonicalize;
///
/// #[derive(Canonicalize)]
/// struct Request {
///     path: String,
///     depth: u8,
///     #[canonicalize(skip)]
///     trace_id: u64,
/// }
/// ```
#[proc_macro_derive(Canonicalize, attributes(canonicalize))]
pub fn derive_canonicalize(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    match generate_canonicalize(&input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.into(),
    }
}
