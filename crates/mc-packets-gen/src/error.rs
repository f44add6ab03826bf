use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PacketGenError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse packets: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no connection states defined")]
    NoStates,
    #[error("{what} `{name}` does not form a Rust identifier")]
    InvalidName { what: &'static str, name: String },
    #[error("states `{first}` and `{second}` share id {id}")]
    DuplicateStateId { first: String, second: String, id: i32 },
    #[error("states `{first}` and `{second}` both generate `{generated}`")]
    DuplicateState {
        first: String,
        second: String,
        generated: String,
    },
    #[error("{direction} packets `{first}` and `{second}` in state `{state}` share id {id}")]
    DuplicatePacketId {
        state: String,
        direction: &'static str,
        first: String,
        second: String,
        id: i32,
    },
    #[error("{direction} packet `{name}` appears twice in state `{state}`")]
    DuplicatePacket {
        state: String,
        direction: &'static str,
        name: String,
    },
    #[error("`{name}` has negative id {id}")]
    NegativeId { name: String, id: i32 },
    #[error("generated code failed to parse: {0}")]
    Syntax(#[from] syn::Error),
}

pub type Result<T> = std::result::Result<T, PacketGenError>;
