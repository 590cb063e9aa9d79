//! Code generation modules for protobuf source
//!
//! This module contains the generators for the pieces of a schema file:
//! table message families, enums for `enum`/`set` columns and the RPC
//! service.

pub mod enumeration;
pub mod message;
pub mod service;

pub use enumeration::{Enum, EnumField};
pub use message::{FieldLabel, FieldType, Message, MessageField, Variant};
pub use service::{MethodGroup, RpcMethod, Service};

/// Indentation for fields and methods
pub(crate) const INDENT: &str = "  ";
