use rivet_core::ID_COLUMN;
use syn::{Fields, Ident, ItemStruct, Type, ext::IdentExt};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    /// Column the field is stored in.
    pub(crate) name: String,
    pub(crate) ty: Type,
}

pub(crate) fn decode_fields(item: &ItemStruct) -> Vec<FieldMetadata> {
    let name = &item.ident;
    if !item.generics.params.is_empty() {
        panic!("Model `{}` cannot have generic parameters", name);
    }
    let Fields::Named(fields) = &item.fields else {
        panic!("Model `{}` must be a struct with named fields", name);
    };
    let result: Vec<_> = fields
        .named
        .iter()
        .filter_map(|f| {
            let ident = f.ident.clone()?;
            Some(FieldMetadata {
                name: ident.unraw().to_string(),
                ident,
                ty: f.ty.clone(),
            })
        })
        .collect();
    if !result.iter().any(|f| f.name == ID_COLUMN) {
        panic!(
            "Model `{}` must declare the identifier field `{}: Option<i64>`",
            name, ID_COLUMN
        );
    }
    result
}
