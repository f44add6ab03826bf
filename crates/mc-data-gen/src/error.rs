//! Generator error types.

use std::io;

use thiserror::Error;

/// Everything that can abort a generation run.
///
/// None of these are recoverable: the run stops and no output is written.
#[derive(Debug, Error)]
pub enum DataGenError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse {document}: {source}")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("property `{property}` values must be all strings, all booleans or all integers: {source}")]
    PropertyValueTypes {
        property: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("property `{property}` has no values")]
    EmptyValues { property: String },

    #[error("property `{property}` has {count} values, at most 31 fit the count field")]
    TooManyValues { property: String, count: usize },

    #[error("boolean property `{property}` must list exactly [true, false]")]
    BooleanValues { property: String },

    #[error(
        "integer property `{property}` must be a contiguous ascending run starting at 0 or 1"
    )]
    IntegerRange { property: String },

    #[error("enum values reach {total} at property `{property}`, at most 255 fit the offset field")]
    EnumValueOverflow { property: String, total: usize },

    #[error("{count} properties defined, at most 256 fit a property id")]
    TooManyProperties { count: usize },

    #[error("block `{block}` references unknown property `{property}`")]
    UnknownProperty { block: String, property: String },

    #[error("block `{block}` has no states")]
    NoStates { block: String },

    #[error("block `{block}` declares id {declared} but is at position {expected}")]
    BlockIdMismatch {
        block: String,
        declared: u64,
        expected: usize,
    },

    #[error("block `{block}` lists state id {declared} where {expected} was expected")]
    StateIdMismatch {
        block: String,
        declared: u64,
        expected: usize,
    },

    #[error("block `{block}` default state {default} is outside its states {first}..={last}")]
    DefaultStateOutOfRange {
        block: String,
        default: u64,
        first: u16,
        last: u16,
    },

    #[error("{count} {what} defined, ids must fit in 16 bits")]
    IdOverflow { what: &'static str, count: usize },

    #[error("block `{block}` has {count} properties, at most 7 fit the count field")]
    TooManyBlockProperties { block: String, count: usize },

    #[error("block `{block}` starts at property offset {offset}, at most 2047 fits the offset field")]
    PropertyOffsetOverflow { block: String, offset: usize },

    #[error("generated code failed to parse: {0}")]
    Syntax(#[from] syn::Error),
}

pub type Result<T> = std::result::Result<T, DataGenError>;
