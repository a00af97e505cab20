//! Reader for OpenStreetMap's Protocol Buffer Binary Format (OSM PBF).
//!
//! The decode pipeline is four layers, leaves first: a generic Protocol
//! Buffers wire-format reader ([`wire`]), a zlib compression adapter
//! ([`zlib`]), an OSM-specific blob framer ([`blob::read_map`], the single
//! entry point), and a domain decoder ([`decode`]) that builds the
//! in-memory [`model::Map`].
//!
//! Out of scope: writing PBF, Relations, dense-node tags, non-default
//! granularity/offsets, non-zlib compression, and multithreaded decode (see
//! `DESIGN.md`).

mod blob;
mod decode;
mod error;
mod schema;
mod varint;
mod wire;
mod zlib;

pub mod model;

pub use blob::read_map;
pub use error::{Error, Result};
pub use model::{BBox, Map, Node, Tag, Way};
pub use wire::{Cursor, Direction, ExpectedType, Field, FieldValue, Message, WireType};
