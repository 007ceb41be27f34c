//! Derive macro for type-injector
//!
//! `#[derive(Inject)]` marks the fields of a struct that an `Injector`
//! fills in, and generates:
//!
//! - `Inject::inject`, which assigns the tagged fields of an existing value
//!   (what `Injector::apply` calls),
//! - `Constructible::fallback`, used by `Injector::construct` when no
//!   provider is registered for the struct,
//! - an inherent `from_injector(&Injector) -> Result<Self>` constructor.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use type_injector::{Inject, Injector};
//!
//! #[derive(Inject, Default)]
//! struct UserService {
//!     #[inject]
//!     db: Option<Arc<Database>>,
//!     #[inject(optional)]
//!     cache: Option<Arc<Cache>>,
//!     // untagged: left alone by apply, Default when constructed
//!     requests: u64,
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Meta, Type, parse_macro_input, parse_quote};

/// Derive `Inject` and `Constructible` for a struct with named fields.
///
/// # Attributes
///
/// - `#[inject]` - resolve the field. Any tag content (`#[inject = "t"]`,
///   `#[inject(name)]`) only marks the field; it is not interpreted.
/// - `#[inject(optional)]` - resolve the field if possible, leave `None`
///   otherwise. The field must be `Option<Arc<T>>`.
///
/// Tagged fields must be `Arc<T>` or `Option<Arc<T>>`, where `T` is a
/// concrete type or a `dyn Trait` declared with `interface!`.
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "Inject can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Inject can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let mut assignments = Vec::new();
    let mut field_inits = Vec::new();

    for field in fields.iter() {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;

        let resolved = match find_inject_attr(&field.attrs) {
            Some(InjectAttr::Required) => {
                if extract_arc_inner_type(field_type).is_some() {
                    quote! {
                        ::type_injector::__private::resolve_field::<#field_type>(injector)?
                    }
                } else if let Some(inner) = extract_option_arc_inner_type(field_type) {
                    quote! {
                        ::std::option::Option::Some(
                            ::type_injector::__private::resolve_field::<
                                ::std::sync::Arc<#inner>
                            >(injector)?
                        )
                    }
                } else {
                    return syn::Error::new_spanned(
                        field_type,
                        "Fields marked with #[inject] must have type Arc<T> or Option<Arc<T>>",
                    )
                    .to_compile_error()
                    .into();
                }
            }
            Some(InjectAttr::Optional) => {
                if extract_option_arc_inner_type(field_type).is_some() {
                    quote! {
                        ::type_injector::__private::resolve_field::<#field_type>(injector)?
                    }
                } else {
                    return syn::Error::new_spanned(
                        field_type,
                        "Fields marked with #[inject(optional)] must have type Option<Arc<T>>",
                    )
                    .to_compile_error()
                    .into();
                }
            }
            None => {
                field_inits.push(quote! {
                    #field_name: ::std::default::Default::default()
                });
                continue;
            }
        };

        assignments.push(quote! {
            self.#field_name = #resolved;
        });
        field_inits.push(quote! {
            #field_name: #resolved
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut constructible_generics = input.generics.clone();
    constructible_generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(Self: ::type_injector::Resolvable));
    let (_, _, constructible_where) = constructible_generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::type_injector::Inject for #name #ty_generics #where_clause {
            fn inject(
                &mut self,
                injector: &::type_injector::Injector,
            ) -> ::type_injector::Result<()> {
                #(#assignments)*
                ::std::result::Result::Ok(())
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            /// Build a value with every `#[inject]` field resolved from
            /// `injector` and every other field set to its default.
            pub fn from_injector(
                injector: &::type_injector::Injector,
            ) -> ::type_injector::Result<Self> {
                ::std::result::Result::Ok(Self {
                    #(#field_inits),*
                })
            }
        }

        impl #impl_generics ::type_injector::Constructible for #name #ty_generics #constructible_where {
            fn fallback(
                injector: &::type_injector::Injector,
            ) -> ::type_injector::Result<::std::sync::Arc<Self>> {
                Self::from_injector(injector).map(::std::sync::Arc::new)
            }
        }
    };

    TokenStream::from(expanded)
}

enum InjectAttr {
    Required,
    Optional,
}

/// Find the `#[inject]` tag on a field.
///
/// `#[inject(optional)]` is the only content that means anything; every
/// other form is a plain marker.
fn find_inject_attr(attrs: &[Attribute]) -> Option<InjectAttr> {
    let attr = attrs.iter().find(|attr| attr.path().is_ident("inject"))?;

    match &attr.meta {
        Meta::List(_) => match attr.parse_args::<syn::Ident>() {
            Ok(nested) if nested == "optional" => Some(InjectAttr::Optional),
            _ => Some(InjectAttr::Required),
        },
        _ => Some(InjectAttr::Required),
    }
}

/// Extract T from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first()? {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// Extract T from Option<Arc<T>>
fn extract_option_arc_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first()? {
            syn::GenericArgument::Type(inner) => extract_arc_inner_type(inner),
            _ => None,
        },
        _ => None,
    }
}
