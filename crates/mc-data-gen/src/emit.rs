//! Renders the encoded tables as Rust source.

use proc_macro2::{Literal, Span, TokenStream};
use quote::quote;
use syn::LitInt;

use crate::GenConfig;
use crate::block::BlockTables;
use crate::error::Result;
use crate::property::PropertyTables;

fn hex16(value: u16) -> LitInt {
    LitInt::new(&format!("0x{value:04x}"), Span::call_site())
}

fn hex8(value: u8) -> LitInt {
    LitInt::new(&format!("0x{value:02x}"), Span::call_site())
}

fn count(len: usize) -> Literal {
    Literal::usize_unsuffixed(len)
}

fn property_module(tables: &PropertyTables<'_>) -> TokenStream {
    let len = count(tables.flags.len());
    let values_len = count(tables.values.len());
    let flags = tables.flags.iter().map(|f| hex16(f.0));
    let names = &tables.names;
    let keys = &tables.keys;
    let values = &tables.values;

    quote! {
        pub mod property {
            pub const COUNT: usize = #len;

            /// bits 0-4 value count, 5-6 kind (enum, bool, int from 0,
            /// int from 1), 8-15 offset into `VALUES` for enums
            pub static FLAGS: [u16; COUNT] = [#(#flags),*];
            pub static NAME: [&str; COUNT] = [#(#names),*];
            pub static KEY: [&str; COUNT] = [#(#keys),*];
            pub static VALUES: [&str; #values_len] = [#(#values),*];
        }
    }
}

fn block_module(tables: &BlockTables<'_>) -> TokenStream {
    let len = count(tables.names.len());
    let map_len = count(tables.property_map.len());
    let names = &tables.names;
    let translation_keys = &tables.translation_keys;
    let first_state_ids = tables.first_state_ids.iter().copied().map(hex16);
    let default_state_ids = tables.default_state_ids.iter().copied().map(hex16);
    let properties = tables.properties.iter().map(|p| hex16(p.0));
    let property_map = tables.property_map.iter().copied().map(hex8);

    quote! {
        pub mod block {
            use super::{PropertyId, StateId};

            pub const COUNT: usize = #len;

            pub static NAME: [&str; COUNT] = [#(#names),*];
            pub static TRANSLATION_KEY: [&str; COUNT] = [#(#translation_keys),*];
            pub static FIRST_STATE_ID: [StateId; COUNT] = [#(#first_state_ids),*];
            pub static DEFAULT_STATE_ID: [StateId; COUNT] = [#(#default_state_ids),*];

            /// bits 0-10 offset into `PROPERTY_MAP`, 11-13 property count
            pub static PROPERTIES: [u16; COUNT] = [#(#properties),*];

            /// Property ids of each block, last declared first
            pub static PROPERTY_MAP: [PropertyId; #map_len] = [#(#property_map),*];
        }
    }
}

fn state_module(tables: &BlockTables<'_>) -> TokenStream {
    let len = count(tables.state_blocks.len());
    let blocks = tables.state_blocks.iter().copied().map(hex16);

    quote! {
        pub mod state {
            use super::BlockId;

            pub const COUNT: usize = #len;

            pub static BLOCK: [BlockId; COUNT] = [#(#blocks),*];
        }
    }
}

/// Renders both table sets as one formatted source file.
///
/// # Errors
/// Fails only if the generated tokens are not a valid Rust file.
pub fn render(
    config: &GenConfig,
    properties: &PropertyTables<'_>,
    blocks: &BlockTables<'_>,
) -> Result<String> {
    let property = property_module(properties);
    let block = block_module(blocks);
    let state = state_module(blocks);

    let tokens = quote! {
        pub type StateId = u16;
        pub type BlockId = u16;
        pub type PropertyId = u8;

        #property
        #block
        #state
    };

    let file: syn::File = syn::parse2(tokens)?;
    Ok(format!(
        "// Automatically generated by {}\n\n{}",
        config.generator,
        prettyplease::unparse(&file)
    ))
}
