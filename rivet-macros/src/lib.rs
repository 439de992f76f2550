mod decode_fields;
mod table_name;

use decode_fields::decode_fields;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};
use table_name::table_name;

#[proc_macro_derive(Model, attributes(table_name))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    let type_name = name.to_string();
    let table_name = table_name(&item);
    let fields = decode_fields(&item);
    let field_names = fields.iter().map(|f| &f.name);
    let to_attributes = fields.iter().map(|f| {
        let ident = &f.ident;
        let name = &f.name;
        quote! {
            attributes.insert(
                #name.to_string(),
                ::rivet::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)),
            );
        }
    });
    let from_attributes = fields.iter().map(|f| {
        let ident = &f.ident;
        let name = &f.name;
        let ty = &f.ty;
        quote! {
            #ident: match attributes.remove(#name) {
                Some(v) => ::rivet::Context::with_context(
                    <#ty as ::rivet::AsValue>::try_from_value(v),
                    || format!("While decoding field `{}` of `{}`", #name, #type_name),
                )?,
                None => ::std::default::Default::default(),
            }
        }
    });
    quote! {
        impl ::rivet::Model for #name {
            fn type_name() -> &'static str {
                #type_name
            }

            fn table_name() -> &'static str {
                #table_name
            }

            fn fields() -> &'static [&'static str] {
                &[#(#field_names),*]
            }

            fn id(&self) -> ::std::option::Option<i64> {
                self.id
            }

            fn set_id(&mut self, id: ::std::option::Option<i64>) {
                self.id = id;
            }

            fn to_attributes(&self) -> ::rivet::Attributes {
                let mut attributes = ::rivet::Attributes::new();
                #(#to_attributes)*
                attributes
            }

            fn from_attributes(mut attributes: ::rivet::Attributes) -> ::rivet::Result<Self> {
                Ok(Self {
                    #(#from_attributes,)*
                })
            }
        }
    }
    .into()
}
