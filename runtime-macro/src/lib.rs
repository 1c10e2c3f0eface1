use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Type, parse_macro_input};

/// Derive the `Reflect` trait for a module struct, providing runtime
/// reflection and value serialization.
///
/// The struct must also derive `serde::Serialize` and `serde::Deserialize`.
/// Fields whose name starts with `_` or that carry `#[reflect(skip)]` are
/// hidden from reflection; mark them `#[serde(skip)]` as well when they hold
/// runtime-only state.
///
/// Adding `#[module(family = PATH)]` also implements `ModuleType`, naming the
/// family the module belongs to. `#[module(family = PATH, name = "Alias")]`
/// overrides the registered type name.
///
/// ```ignore
/// #[derive(Default, Serialize, Deserialize, Reflect)]
/// #[module(family = SAMPLE_FAMILY)]
/// struct MoveX {
///     amplitude: f32,
///     #[serde(skip)]
///     _origin: f32,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect, module))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_reflect(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct ModuleAttr {
    family: Option<syn::Path>,
    name: Option<LitStr>,
}

fn expand_reflect(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let module_attr = parse_module_attr(&input.attrs)?;
    let name_str = module_attr
        .name
        .as_ref()
        .map(LitStr::value)
        .unwrap_or_else(|| name.to_string());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Reflect can only be derived for structs",
        ));
    };

    let mut infos = Vec::new();

    match &data.fields {
        Fields::Named(fields) => {
            for f in &fields.named {
                let Some(fname) = f.ident.as_ref() else {
                    continue;
                };
                let fname_str = fname.to_string();
                if fname_str.starts_with('_') || has_reflect_skip(&f.attrs)? {
                    continue;
                }
                let ftype = &f.ty;
                let kind = infer_field_kind(ftype);
                infos.push(quote! {
                    ::modkit_runtime::FieldInfo {
                        name: #fname_str,
                        type_name: ::core::any::type_name::<#ftype>(),
                        kind: #kind,
                    }
                });
            }
        }
        Fields::Unnamed(fields) => {
            for (i, f) in fields.unnamed.iter().enumerate() {
                if has_reflect_skip(&f.attrs)? {
                    continue;
                }
                let idx_str = i.to_string();
                let ftype = &f.ty;
                let kind = infer_field_kind(ftype);
                infos.push(quote! {
                    ::modkit_runtime::FieldInfo {
                        name: #idx_str,
                        type_name: ::core::any::type_name::<#ftype>(),
                        kind: #kind,
                    }
                });
            }
        }
        Fields::Unit => {}
    }

    let reflect_impl = quote! {
        impl #impl_generics ::modkit_runtime::Reflect for #name #ty_generics #where_clause {
            fn module_name(&self) -> &'static str {
                #name_str
            }

            fn field_infos(&self) -> &'static [::modkit_runtime::FieldInfo] {
                static INFOS: ::std::sync::LazyLock<::std::vec::Vec<::modkit_runtime::FieldInfo>> =
                    ::std::sync::LazyLock::new(|| ::std::vec![#(#infos),*]);
                &INFOS
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            fn to_value(
                &self,
            ) -> ::core::result::Result<
                ::modkit_runtime::serialize::Value,
                ::modkit_runtime::serialize::SerializeError,
            > {
                ::modkit_runtime::serialize::to_value(self)
            }
        }
    };

    let module_type_impl = match &module_attr.family {
        Some(family) => quote! {
            impl #impl_generics ::modkit_runtime::ModuleType for #name #ty_generics #where_clause {
                const NAME: &'static str = #name_str;

                fn family() -> &'static ::modkit_runtime::ModuleFamily {
                    &#family
                }
            }
        },
        None => quote! {},
    };

    Ok(quote! {
        #reflect_impl
        #module_type_impl
    })
}

fn parse_module_attr(attrs: &[Attribute]) -> syn::Result<ModuleAttr> {
    let mut out = ModuleAttr {
        family: None,
        name: None,
    };
    for attr in attrs.iter().filter(|a| a.path().is_ident("module")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("family") {
                out.family = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("name") {
                out.name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `family = PATH` or `name = \"...\"`"))
            }
        })?;
    }
    Ok(out)
}

fn has_reflect_skip(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skip = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

/// Infer `FieldKind` from a type by matching the last path segment.
///
/// Unknown types map to `FieldKind::Opaque`; they are still serialized,
/// the editor just renders them through the generic value tree.
fn infer_field_kind(ty: &Type) -> proc_macro2::TokenStream {
    let type_name = extract_last_segment(ty);
    match type_name.as_str() {
        "bool" => quote! { ::modkit_runtime::FieldKind::Bool },
        "i8" | "i16" | "i32" => quote! { ::modkit_runtime::FieldKind::I32 },
        "i64" | "isize" => quote! { ::modkit_runtime::FieldKind::I64 },
        "u8" | "u16" | "u32" => quote! { ::modkit_runtime::FieldKind::U32 },
        "u64" | "usize" => quote! { ::modkit_runtime::FieldKind::U64 },
        "f32" => quote! { ::modkit_runtime::FieldKind::F32 },
        "f64" => quote! { ::modkit_runtime::FieldKind::F64 },
        "String" => quote! { ::modkit_runtime::FieldKind::String },
        "Vec3" => quote! { ::modkit_runtime::FieldKind::Vec3 },
        "Quat" => quote! { ::modkit_runtime::FieldKind::Quat },
        _ => quote! { ::modkit_runtime::FieldKind::Opaque },
    }
}

/// Extract the last segment name from a type path (e.g. `glam::Vec3` → `"Vec3"`).
fn extract_last_segment(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
