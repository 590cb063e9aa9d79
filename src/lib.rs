//! sql2proto library
//!
//! This crate turns relational column metadata into a protocol buffer
//! schema: one message family per table, one enum per enum/set column and
//! a CRUD-style RPC service.

#![deny(warnings)]
#![deny(missing_docs)]

pub mod codegen;
pub mod column;
pub mod descriptor;
pub mod naming;
pub mod options;
pub mod schema;
pub mod source;
pub mod types;

pub use column::ColumnDescriptor;
pub use options::{Dialect, FieldStyle, GeneratorOptions};
pub use schema::{Diagnostic, Schema};

use thiserror::Error;

/// Errors that can occur while discovering columns or building a schema
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Could not open a connection to the database
    #[error("Failed to connect to database: {0}")]
    Connection(#[source] sqlx::Error),

    /// Could not determine the active schema/database name
    #[error("Failed to discover active schema: {0}")]
    SchemaDiscovery(#[source] sqlx::Error),

    /// Querying or decoding column metadata failed
    #[error("Failed to query columns for `{table}`: {source}")]
    ColumnQuery {
        /// Table (or `*` for the whole schema) being queried
        table: String,
        /// Underlying driver error
        #[source]
        source: sqlx::Error,
    },

    /// No protobuf type matches the native column type (strict mode only)
    #[error("No compatible protobuf type found for `{data_type}`. column: `{table}`.`{column}`")]
    UnsupportedColumnType {
        /// Table name
        table: String,
        /// Column name
        column: String,
        /// Native SQL type
        data_type: String,
    },

    /// The literal value list of an enum/set column could not be parsed
    #[error("Malformed enum definition `{column_type}` for column `{table}`.`{column}`")]
    EnumParse {
        /// Table name
        table: String,
        /// Column name
        column: String,
        /// Full native column type
        column_type: String,
    },

    /// Two fields of one message share a tag
    #[error("Internal error: tag `{tag}` is already in use by field `{existing}` in message `{message}`")]
    DuplicateFieldTag {
        /// Message being built
        message: String,
        /// Conflicting tag
        tag: u32,
        /// Field already holding the tag
        existing: String,
    },

    /// Two values of one enum share a tag
    #[error("Internal error: tag `{tag}` is already in use by value `{existing}` in enum `{name}`")]
    DuplicateEnumTag {
        /// Enum being built
        name: String,
        /// Conflicting tag
        tag: i32,
        /// Value already holding the tag
        existing: String,
    },

    /// Invalid generator options
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GeneratorError {
    /// Whether this error signals a bug in the generator rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            GeneratorError::DuplicateFieldTag { .. } | GeneratorError::DuplicateEnumTag { .. }
        )
    }
}

/// Build a [`Schema`] from column descriptors
///
/// This is the main entry point of the core: columns are grouped per table,
/// mapped to protobuf types and accumulated into messages and enums.
pub fn generate(
    columns: &[ColumnDescriptor],
    options: &GeneratorOptions,
) -> Result<Schema, GeneratorError> {
    Schema::from_columns(columns, options)
}

/// Build a [`Schema`] and render it to protobuf source text
pub fn generate_text(
    columns: &[ColumnDescriptor],
    options: &GeneratorOptions,
) -> Result<String, GeneratorError> {
    Ok(generate(columns, options)?.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_are_distinct() {
        let dup = GeneratorError::DuplicateFieldTag {
            message: "Users".to_string(),
            tag: 1,
            existing: "id".to_string(),
        };
        assert!(dup.is_internal());

        let parse = GeneratorError::EnumParse {
            table: "users".to_string(),
            column: "status".to_string(),
            column_type: "enum".to_string(),
        };
        assert!(!parse.is_internal());
        assert_eq!(
            parse.to_string(),
            "Malformed enum definition `enum` for column `users`.`status`"
        );
    }
}
