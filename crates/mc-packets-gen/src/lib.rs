//! Code generator for packet ids, connection states and directions.
//!
//! Input is a `packets.json` of the form
//!
//! ```json
//! {
//!   "HANDSHAKING": {
//!     "id": 0,
//!     "SERVERBOUND": [{ "name": "ServerboundClientIntentionPacket", "id": 0 }],
//!     "CLIENTBOUND": []
//!   }
//! }
//! ```
//!
//! Output is a module directory with `mod.rs`, `misc.rs` (the
//! `ConnectionState` and `PacketDirection` enums and the `Packet` trait),
//! and one file per direction with a module per state.

mod error;

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use heck::{ToSnakeCase, ToUpperCamelCase};
use indexmap::IndexMap;
use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{format_ident, quote};
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub use error::{PacketGenError, Result};

/// Packet entry from `packets.json`
#[derive(Debug, Clone, Deserialize)]
struct PacketInfo {
    name: String,
    id: i32,
}

/// Connection state entry from `packets.json`
#[derive(Debug, Clone, Deserialize)]
struct StateInfo {
    id: i32,
    #[serde(rename = "SERVERBOUND", default)]
    serverbound: Vec<PacketInfo>,
    #[serde(rename = "CLIENTBOUND", default)]
    clientbound: Vec<PacketInfo>,
}

/// State name -> StateInfo, in document order
type PacketsData = IndexMap<String, StateInfo>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Serverbound,
    Clientbound,
}

impl Direction {
    pub const ALL: [Self; 2] = [Self::Serverbound, Self::Clientbound];

    /// Module and display name
    pub const fn lower(self) -> &'static str {
        match self {
            Self::Serverbound => "serverbound",
            Self::Clientbound => "clientbound",
        }
    }

    /// Prefix stripped from packet names
    pub const fn title(self) -> &'static str {
        match self {
            Self::Serverbound => "Serverbound",
            Self::Clientbound => "Clientbound",
        }
    }
}

/// A packet with the names derived for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Name as given in the input
    pub name: String,
    /// Generated struct name: direction prefix stripped, UpperCamelCase
    pub struct_name: String,
    pub id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// Name as given in the input
    pub name: String,
    /// Module and display name
    pub lower: String,
    /// Enum variant name
    pub variant: String,
    pub id: i32,
    pub serverbound: Vec<Packet>,
    pub clientbound: Vec<Packet>,
}

impl State {
    pub fn packets(&self, direction: Direction) -> &[Packet] {
        match direction {
            Direction::Serverbound => &self.serverbound,
            Direction::Clientbound => &self.clientbound,
        }
    }
}

/// Validated protocol description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protocol {
    pub states: Vec<State>,
}

fn check_ident(what: &'static str, name: &str) -> Result<()> {
    syn::parse_str::<Ident>(name)
        .map(drop)
        .map_err(|_| PacketGenError::InvalidName {
            what,
            name: name.to_owned(),
        })
}

fn check_id(name: &str, id: i32) -> Result<()> {
    if id < 0 {
        return Err(PacketGenError::NegativeId {
            name: name.to_owned(),
            id,
        });
    }
    Ok(())
}

fn to_packets(state: &str, direction: Direction, infos: Vec<PacketInfo>) -> Result<Vec<Packet>> {
    let mut by_id: HashMap<i32, String> = HashMap::new();
    let mut by_struct: HashMap<String, String> = HashMap::new();

    infos
        .into_iter()
        .map(|info| -> Result<Packet> {
            check_id(&info.name, info.id)?;
            let stripped = info
                .name
                .strip_prefix(direction.title())
                .unwrap_or(&info.name);
            let struct_name = stripped.to_upper_camel_case();
            check_ident("packet", &struct_name)?;

            if let Some(first) = by_id.insert(info.id, info.name.clone()) {
                return Err(PacketGenError::DuplicatePacketId {
                    state: state.to_owned(),
                    direction: direction.lower(),
                    first,
                    second: info.name,
                    id: info.id,
                });
            }
            if by_struct
                .insert(struct_name.clone(), info.name.clone())
                .is_some()
            {
                return Err(PacketGenError::DuplicatePacket {
                    state: state.to_owned(),
                    direction: direction.lower(),
                    name: struct_name,
                });
            }

            Ok(Packet {
                name: info.name,
                struct_name,
                id: info.id,
            })
        })
        .collect()
}

impl Protocol {
    /// Parses and validates `packets.json`.
    ///
    /// # Errors
    /// Fails on malformed JSON, names that cannot become identifiers,
    /// negative ids, or ids and names that collide.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: PacketsData = serde_json::from_str(json)?;
        if data.is_empty() {
            return Err(PacketGenError::NoStates);
        }

        let mut state_ids: HashMap<i32, String> = HashMap::new();
        let mut state_modules: HashMap<String, String> = HashMap::new();
        let mut state_variants: HashMap<String, String> = HashMap::new();
        let states = data
            .into_iter()
            .map(|(name, info)| -> Result<State> {
                check_id(&name, info.id)?;
                let lower = name.to_snake_case();
                let variant = name.to_upper_camel_case();
                check_ident("state", &lower)?;
                check_ident("state", &variant)?;
                if let Some(first) = state_ids.insert(info.id, name.clone()) {
                    return Err(PacketGenError::DuplicateStateId {
                        first,
                        second: name,
                        id: info.id,
                    });
                }
                for (seen, generated) in [
                    (&mut state_variants, &variant),
                    (&mut state_modules, &lower),
                ] {
                    if let Some(first) = seen.insert(generated.clone(), name.clone()) {
                        return Err(PacketGenError::DuplicateState {
                            first,
                            second: name,
                            generated: generated.clone(),
                        });
                    }
                }

                Ok(State {
                    serverbound: to_packets(&name, Direction::Serverbound, info.serverbound)?,
                    clientbound: to_packets(&name, Direction::Clientbound, info.clientbound)?,
                    name,
                    lower,
                    variant,
                    id: info.id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { states })
    }
}

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: &'static str,
    pub contents: String,
}

fn unparse(generator: &str, tokens: TokenStream) -> Result<String> {
    let file: syn::File = syn::parse2(tokens)?;
    Ok(format!(
        "// Automatically generated by {generator}\n\n{}",
        prettyplease::unparse(&file)
    ))
}

fn generate_misc(protocol: &Protocol) -> TokenStream {
    let variants: Vec<Ident> = protocol
        .states
        .iter()
        .map(|s| format_ident!("{}", s.variant))
        .collect();
    let ids: Vec<Literal> = protocol
        .states
        .iter()
        .map(|s| Literal::i32_unsuffixed(s.id))
        .collect();
    let lowers = protocol.states.iter().map(|s| s.lower.as_str());

    quote! {
        use std::fmt;

        /// Which way a packet travels
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PacketDirection {
            Serverbound,
            Clientbound,
        }

        impl fmt::Display for PacketDirection {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    Self::Serverbound => "serverbound",
                    Self::Clientbound => "clientbound",
                })
            }
        }

        /// Protocol state of a connection
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum ConnectionState {
            #(#variants = #ids,)*
        }

        impl ConnectionState {
            pub const ALL: &'static [ConnectionState] = &[#(Self::#variants),*];

            #[inline]
            pub const fn id(self) -> i32 {
                self as i32
            }

            pub const fn from_id(id: i32) -> Option<Self> {
                match id {
                    #(#ids => Some(Self::#variants),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for ConnectionState {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    #(Self::#variants => #lowers,)*
                })
            }
        }

        /// Trait for all packets - provides ID, name, state, and direction
        pub trait Packet {
            /// The packet ID
            const ID: i32;
            /// The packet name as extracted from the game
            const NAME: &'static str;
            /// Whether this packet is clientbound or serverbound
            const DIRECTION: PacketDirection;
            /// The protocol state this packet belongs to
            const STATE: ConnectionState;
        }
    }
}

fn gen_packet(packet: &Packet, state: &State, direction: Direction) -> TokenStream {
    let struct_ident = format_ident!("{}", packet.struct_name);
    let id = Literal::i32_unsuffixed(packet.id);
    let name = &packet.name;
    let doc = format!(" Packet ID: {:#04x}", packet.id);
    let state_variant = format_ident!("{}", state.variant);
    let dir_variant = format_ident!("{}", direction.title());

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct #struct_ident;

        impl Packet for #struct_ident {
            const ID: i32 = #id;
            const NAME: &'static str = #name;
            const DIRECTION: PacketDirection = PacketDirection::#dir_variant;
            const STATE: ConnectionState = ConnectionState::#state_variant;
        }
    }
}

fn gen_state_module(state: &State, direction: Direction) -> TokenStream {
    let packets = state.packets(direction);
    let state_ident = Ident::new(&state.lower, Span::call_site());
    let packet_tokens = packets.iter().map(|p| gen_packet(p, state, direction));
    let ids: Vec<Literal> = packets
        .iter()
        .map(|p| Literal::i32_unsuffixed(p.id))
        .collect();
    let names: Vec<&str> = packets.iter().map(|p| p.name.as_str()).collect();

    quote! {
        pub mod #state_ident {
            use super::*;

            #(#packet_tokens)*

            /// Every packet of this state as (id, name)
            pub static PACKETS: &[(i32, &str)] = &[#((#ids, #names)),*];

            /// Get the packet name for a given packet ID, or None if unknown
            pub fn packet_name(id: i32) -> Option<&'static str> {
                match id {
                    #(#ids => Some(#names),)*
                    _ => None,
                }
            }
        }
    }
}

fn generate_direction(protocol: &Protocol, direction: Direction) -> TokenStream {
    let modules = protocol
        .states
        .iter()
        .map(|state| gen_state_module(state, direction));
    let variants = protocol
        .states
        .iter()
        .map(|s| format_ident!("{}", s.variant));
    let state_idents = protocol
        .states
        .iter()
        .map(|s| Ident::new(&s.lower, Span::call_site()));

    quote! {
        #![allow(unused_imports)]

        use super::misc::{ConnectionState, Packet, PacketDirection};

        #(#modules)*

        /// Get the packet name for a given state and packet ID, or None if unknown
        pub fn packet_name(state: ConnectionState, id: i32) -> Option<&'static str> {
            match state {
                #(ConnectionState::#variants => #state_idents::packet_name(id),)*
            }
        }
    }
}

fn generate_mod_rs() -> TokenStream {
    quote! {
        pub mod clientbound;
        pub mod misc;
        pub mod serverbound;

        pub use misc::{ConnectionState, Packet, PacketDirection};
    }
}

/// Renders every output file. Nothing is written.
///
/// # Errors
/// Returns validation errors from [`Protocol::from_json`].
pub fn generate(generator: &str, json: &str) -> Result<Vec<GeneratedFile>> {
    let protocol = Protocol::from_json(json)?;
    for state in &protocol.states {
        debug!(
            state = %state.name,
            serverbound = state.serverbound.len(),
            clientbound = state.clientbound.len(),
            "collected packets"
        );
    }

    let mut files = vec![
        GeneratedFile {
            name: "mod.rs",
            contents: unparse(generator, generate_mod_rs())?,
        },
        GeneratedFile {
            name: "misc.rs",
            contents: unparse(generator, generate_misc(&protocol))?,
        },
    ];
    for direction in Direction::ALL {
        let name = match direction {
            Direction::Serverbound => "serverbound.rs",
            Direction::Clientbound => "clientbound.rs",
        };
        files.push(GeneratedFile {
            name,
            contents: unparse(generator, generate_direction(&protocol, direction))?,
        });
    }
    Ok(files)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Generates from `json_path` into `out_dir`, creating it if needed.
///
/// Every file is rendered before the first one is written.
///
/// # Errors
/// Returns IO errors and everything [`generate`] can return.
pub fn generate_dir(generator: &str, json_path: &Path, out_dir: &Path) -> Result<()> {
    let json = fs::read_to_string(json_path)?;
    let files = generate(generator, &json)?;

    fs::create_dir_all(out_dir)?;
    for file in files {
        let path = out_dir.join(file.name);
        write_atomic(&path, &file.contents)?;
        info!("Generated {}", path.display());
    }
    Ok(())
}
