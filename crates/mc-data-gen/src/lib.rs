//! Generator for the packed block, property and block state tables.
//!
//! Reads two JSON documents extracted from the game:
//!
//! - `block_properties.json`: internal property name -> `{ key, values }`
//! - `blocks.json`: block name -> `{ id, translationKey, defaultStateId, properties, states }`
//!
//! and writes one Rust file holding the `property`, `block` and `state`
//! table modules. The bit packing of the descriptor words is documented in
//! [`layout`].
//!
//! ```text
//!  block_properties.json ──► PropertyRegistry ──► encode_properties ──┐
//!                                  │                                  ├──► render ──► write_atomic
//!  blocks.json ──────────► resolve_blocks ──────► encode_blocks ──────┘
//! ```
//!
//! Generation is all or nothing: any validation error aborts before the
//! output file is touched.

pub mod block;
pub mod emit;
mod error;
pub mod layout;
pub mod output;
pub mod property;
pub mod schema;

use std::fs;
use std::path::Path;

use tracing::info;

pub use block::{Block, BlockState, BlockTables, encode_blocks, resolve_blocks};
pub use error::{DataGenError, Result};
pub use property::{Property, PropertyRegistry, PropertyTables, PropertyValues, encode_properties};

/// Settings shared by every generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenConfig {
    /// Tool name written into the header comment
    pub generator: String,
}

impl GenConfig {
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
        }
    }
}

impl Default for GenConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

/// Generates the table source from the two JSON documents.
///
/// # Errors
/// Returns the first parse, validation or encoding error.
pub fn generate(config: &GenConfig, blocks_json: &str, properties_json: &str) -> Result<String> {
    let registry = PropertyRegistry::from_defs(schema::parse_property_defs(properties_json)?)?;
    let properties = encode_properties(&registry)?;

    let block_defs: schema::BlockDefs =
        serde_json::from_str(blocks_json).map_err(|source| DataGenError::Json {
            document: "blocks",
            source,
        })?;
    let blocks = resolve_blocks(block_defs, &registry)?;
    let tables = encode_blocks(&blocks)?;

    emit::render(config, &properties, &tables)
}

/// Reads both documents, generates, and atomically replaces `out_path`.
///
/// # Errors
/// Returns IO errors and everything [`generate`] can return. On error
/// `out_path` is left as it was.
pub fn generate_file(
    config: &GenConfig,
    blocks_path: &Path,
    properties_path: &Path,
    out_path: &Path,
) -> Result<()> {
    let properties_json = fs::read_to_string(properties_path)?;
    let blocks_json = fs::read_to_string(blocks_path)?;

    let source = generate(config, &blocks_json, &properties_json)?;
    output::write_atomic(out_path, &source)?;

    info!("Generated {}", out_path.display());
    Ok(())
}
