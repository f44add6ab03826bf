//! Block and block state model, id validation, and the block table encoder.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{DataGenError, Result};
use crate::layout::{
    BlockId, BlockProperties, MAX_BLOCK_PROPERTIES, MAX_IDS, MAX_PROPERTY_OFFSET, PropertyId,
    StateId,
};
use crate::property::PropertyRegistry;
use crate::schema::{BlockDefs, StateValue};

/// One concrete property value combination of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockState {
    pub id: StateId,
    pub properties: IndexMap<String, StateValue>,
    /// Not emitted by the table writer
    pub air: bool,
    /// Not emitted by the table writer
    pub render_shape: String,
}

/// A placeable block type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub name: String,
    /// Equal to the block's position in the input
    pub id: BlockId,
    pub translation_key: String,
    pub default_state_id: StateId,
    /// Property ids in declaration order
    pub properties: Vec<PropertyId>,
    /// Ordered by ascending id, never empty
    pub states: Vec<BlockState>,
}

impl Block {
    pub fn first_state_id(&self) -> StateId {
        self.states[0].id
    }

    pub fn last_state_id(&self) -> StateId {
        self.states[self.states.len() - 1].id
    }
}

/// Running position while walking blocks in document order.
#[derive(Debug, Clone, Copy, Default)]
struct IdCursor {
    block: usize,
    state: usize,
}

/// Builds the block list, resolving property names and checking that
/// block ids equal their position and state ids run `0..N` in the order
/// they appear.
///
/// # Errors
/// Fails on the first block that references an unknown property, has no
/// states, or whose ids disagree with the document order.
pub fn resolve_blocks(defs: BlockDefs, registry: &PropertyRegistry) -> Result<Vec<Block>> {
    if defs.len() > MAX_IDS {
        return Err(DataGenError::IdOverflow {
            what: "blocks",
            count: defs.len(),
        });
    }

    let mut blocks = Vec::with_capacity(defs.len());
    defs.into_iter()
        .try_fold(IdCursor::default(), |cursor, (name, def)| -> Result<_> {
            if def.id != cursor.block as u64 {
                return Err(DataGenError::BlockIdMismatch {
                    block: name,
                    declared: def.id,
                    expected: cursor.block,
                });
            }
            if def.states.is_empty() {
                return Err(DataGenError::NoStates { block: name });
            }

            let properties = def
                .properties
                .iter()
                .map(|property| {
                    registry.get(property).map(|p| p.id).ok_or_else(|| {
                        DataGenError::UnknownProperty {
                            block: name.clone(),
                            property: property.clone(),
                        }
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let first_state = cursor.state;
            let mut states = Vec::with_capacity(def.states.len());
            for (expected, state) in (first_state..).zip(def.states) {
                if state.state_id != expected as u64 {
                    return Err(DataGenError::StateIdMismatch {
                        block: name,
                        declared: state.state_id,
                        expected,
                    });
                }
                if expected >= MAX_IDS {
                    return Err(DataGenError::IdOverflow {
                        what: "states",
                        count: expected + 1,
                    });
                }
                states.push(BlockState {
                    id: expected as StateId,
                    properties: state.properties,
                    air: state.air,
                    render_shape: state.render_shape,
                });
            }

            let block = Block {
                name,
                id: cursor.block as BlockId,
                translation_key: def.translation_key,
                default_state_id: 0,
                properties,
                states,
            };
            let (first, last) = (block.first_state_id(), block.last_state_id());
            if !(u64::from(first)..=u64::from(last)).contains(&def.default_state_id) {
                return Err(DataGenError::DefaultStateOutOfRange {
                    block: block.name,
                    default: def.default_state_id,
                    first,
                    last,
                });
            }

            let next = IdCursor {
                block: cursor.block + 1,
                state: cursor.state + block.states.len(),
            };
            blocks.push(Block {
                default_state_id: def.default_state_id as StateId,
                ..block
            });
            Ok(next)
        })?;

    Ok(blocks)
}

/// Flattened block and state tables.
///
/// `names` through `properties` are index-aligned with [`BlockId`],
/// `state_blocks` with [`StateId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockTables<'a> {
    pub names: Vec<&'a str>,
    pub translation_keys: Vec<&'a str>,
    pub first_state_ids: Vec<StateId>,
    pub default_state_ids: Vec<StateId>,
    pub properties: Vec<BlockProperties>,
    /// Each block's property ids, last declared first
    pub property_map: Vec<PropertyId>,
    /// Owning block of every state
    pub state_blocks: Vec<BlockId>,
}

/// Encodes the resolved blocks into their flattened tables.
///
/// # Errors
/// Fails if a block has more than 7 properties, or starts past the
/// largest offset the 11-bit field can hold.
pub fn encode_blocks(blocks: &[Block]) -> Result<BlockTables<'_>> {
    let tables = blocks
        .iter()
        .try_fold(BlockTables::default(), |mut tables, block| -> Result<_> {
            let offset = tables.property_map.len();
            let count = block.properties.len();
            if offset > MAX_PROPERTY_OFFSET {
                return Err(DataGenError::PropertyOffsetOverflow {
                    block: block.name.clone(),
                    offset,
                });
            }
            if count > MAX_BLOCK_PROPERTIES {
                return Err(DataGenError::TooManyBlockProperties {
                    block: block.name.clone(),
                    count,
                });
            }

            tables.names.push(&block.name);
            tables.translation_keys.push(&block.translation_key);
            tables.first_state_ids.push(block.first_state_id());
            tables.default_state_ids.push(block.default_state_id);
            tables
                .properties
                .push(BlockProperties::new(offset as u16, count as u8));
            // The first declared property is the most significant digit of a
            // state's index within its block, so it is stored last.
            tables
                .property_map
                .extend(block.properties.iter().rev().copied());
            tables
                .state_blocks
                .extend(std::iter::repeat_n(block.id, block.states.len()));
            Ok(tables)
        })?;

    debug!(
        blocks = tables.names.len(),
        block_properties = tables.property_map.len(),
        states = tables.state_blocks.len(),
        "encoded block tables"
    );
    Ok(tables)
}
