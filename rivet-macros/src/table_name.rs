use rivet_core::to_snake_case;
use syn::{ItemStruct, LitStr};

pub(crate) fn table_name(item: &ItemStruct) -> String {
    let default_table_name = to_snake_case(&item.ident.to_string());
    item.attrs
        .iter()
        .find_map(|attr| {
            if attr.meta.path().is_ident("table_name") {
                let Ok(v) = attr
                    .meta
                    .require_list()
                    .and_then(|v| v.parse_args::<LitStr>())
                else {
                    panic!(
                        "Error while parsing `table_name`, use it like #[table_name(\"{}\")]",
                        &default_table_name
                    );
                };
                return Some(v.value());
            }
            None
        })
        .unwrap_or(default_table_name)
}
