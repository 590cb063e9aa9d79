//! Schema aggregation and rendering
//!
//! A [`Schema`] owns every message, enum and import of one generated
//! `.proto` file. It is built in a single pass over the column descriptors
//! and rendered to text without further mutation.

use crate::codegen::{Enum, FieldType, Message, MessageField, Service};
use crate::column::ColumnDescriptor;
use crate::naming;
use crate::options::GeneratorOptions;
use crate::types::{map_column, MappedType, ScalarType};
use crate::GeneratorError;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

const SECTION_RULE: &str = "// ------------------------------------ ";

/// A column that could not be mapped faithfully and fell back to `string`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No mapping rule matched the native type
    #[error("no compatible protobuf type found for `{data_type}`. column: `{table}`.`{column}`. falling back to `string`")]
    UnsupportedType {
        /// Table name
        table: String,
        /// Column name
        column: String,
        /// Native SQL type
        data_type: String,
    },

    /// An `enum`/`set` column whose value list could not be read
    #[error("malformed enum definition `{column_type}` for column `{table}`.`{column}`. falling back to `string`")]
    MalformedEnum {
        /// Table name
        table: String,
        /// Column name
        column: String,
        /// Full native column type
        column_type: String,
    },
}

impl Diagnostic {
    /// Promote the diagnostic to a hard error
    pub fn into_error(self) -> GeneratorError {
        match self {
            Diagnostic::UnsupportedType {
                table,
                column,
                data_type,
            } => GeneratorError::UnsupportedColumnType {
                table,
                column,
                data_type,
            },
            Diagnostic::MalformedEnum {
                table,
                column,
                column_type,
            } => GeneratorError::EnumParse {
                table,
                column,
                column_type,
            },
        }
    }
}

/// A generated protobuf file
#[derive(Debug, Clone)]
pub struct Schema {
    /// `syntax` statement value
    pub syntax: String,
    /// RPC service name
    pub service_name: String,
    /// `option go_package` value
    pub go_package: String,
    /// `package` statement value
    pub package: String,
    imports: BTreeSet<String>,
    messages: Vec<Message>,
    enums: Vec<Enum>,
    enum_index: HashMap<String, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl Schema {
    /// Create an empty proto3 schema
    pub fn new(service_name: &str, go_package: &str, package: &str) -> Self {
        Self {
            syntax: "proto3".to_string(),
            service_name: service_name.to_string(),
            go_package: go_package.to_string(),
            package: package.to_string(),
            imports: BTreeSet::new(),
            messages: Vec::new(),
            enums: Vec::new(),
            enum_index: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Build a schema from column descriptors
    ///
    /// Columns are grouped into one message per table in first-seen order.
    /// Ignored tables and columns are skipped before any type mapping, so
    /// they never produce messages, fields or enums.
    pub fn from_columns(
        columns: &[ColumnDescriptor],
        options: &GeneratorOptions,
    ) -> Result<Self, GeneratorError> {
        options.validate()?;

        let mut schema = Schema::new(&options.service_name, &options.go_package, &options.package);
        let mut message_index: HashMap<String, usize> = HashMap::new();

        for col in columns {
            if options.ignore_tables.contains(&col.table_name)
                || options.ignore_columns.contains(&col.column_name)
            {
                continue;
            }

            let name = naming::message_name(&col.table_name);
            let idx = match message_index.get(&name).copied() {
                Some(idx) => idx,
                None => {
                    let comment = if col.table_comment.is_empty() {
                        naming::lower_camel(&col.table_name)
                    } else {
                        col.table_comment.clone()
                    };
                    debug!(table = %col.table_name, message = %name, "grouping table");
                    schema
                        .messages
                        .push(Message::new(name.clone(), comment, options.field_style));
                    message_index.insert(name, schema.messages.len() - 1);
                    schema.messages.len() - 1
                }
            };

            let ty = schema.field_type(col, options)?;
            let msg = &mut schema.messages[idx];
            let field = MessageField::new(
                ty,
                col.column_name.clone(),
                msg.next_tag(),
                col.column_comment.clone(),
            );
            msg.append_field(field)?;
        }

        Ok(schema)
    }

    /// Resolve the protobuf type of a column, registering an enum if needed
    fn field_type(
        &mut self,
        col: &ColumnDescriptor,
        options: &GeneratorOptions,
    ) -> Result<FieldType, GeneratorError> {
        match map_column(col, options.dialect) {
            MappedType::Scalar(scalar) => Ok(FieldType::Scalar(scalar)),
            MappedType::Enum => match Enum::from_column(col) {
                Ok(e) => {
                    let name = e.name.clone();
                    self.add_enum(e);
                    Ok(FieldType::Enum(name))
                }
                Err(GeneratorError::EnumParse {
                    table,
                    column,
                    column_type,
                }) => {
                    self.degrade(
                        Diagnostic::MalformedEnum {
                            table,
                            column,
                            column_type,
                        },
                        options,
                    )?;
                    Ok(FieldType::Scalar(ScalarType::String))
                }
                Err(e) => Err(e),
            },
            MappedType::Unsupported => {
                self.degrade(
                    Diagnostic::UnsupportedType {
                        table: col.table_name.clone(),
                        column: col.column_name.clone(),
                        data_type: col.data_type.clone(),
                    },
                    options,
                )?;
                Ok(FieldType::Scalar(ScalarType::String))
            }
        }
    }

    /// Record a degradation, or fail in strict mode
    fn degrade(
        &mut self,
        diagnostic: Diagnostic,
        options: &GeneratorOptions,
    ) -> Result<(), GeneratorError> {
        if options.strict {
            return Err(diagnostic.into_error());
        }
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
        Ok(())
    }

    /// Register an enum; enums are never merged, even with equal values
    pub fn add_enum(&mut self, e: Enum) {
        self.enum_index
            .entry(e.name.clone())
            .or_insert(self.enums.len());
        self.enums.push(e);
    }

    /// Add an import path
    pub fn add_import(&mut self, path: impl Into<String>) {
        self.imports.insert(path.into());
    }

    /// Add a base message
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Look up an enum by generated type name (first registered wins)
    pub fn enum_by_name(&self, name: &str) -> Option<&Enum> {
        self.enum_index.get(name).map(|idx| &self.enums[*idx])
    }

    /// Base messages, one per table
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Generated enums in encounter order
    pub fn enums(&self) -> &[Enum] {
        &self.enums
    }

    /// Import paths, sorted
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    /// Degradations recorded while building
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The CRUD service over every table
    pub fn service(&self) -> Service {
        Service::new(self.service_name.clone(), &self.messages)
    }

    /// Render the schema as protobuf source
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "syntax = \"{}\";", self.syntax)?;
        writeln!(f)?;
        writeln!(f, "option go_package =\"{}\";", self.go_package)?;
        writeln!(f)?;
        writeln!(f, "package {};", self.package)?;
        writeln!(f)?;

        if !self.imports.is_empty() {
            for import in &self.imports {
                writeln!(f, "import \"{}\";", import)?;
            }
            writeln!(f)?;
        }

        write_banner(f, "Messages")?;
        for m in &self.messages {
            writeln!(
                f,
                "//--------------------------------{}--------------------------------",
                m.comment
            )?;
            writeln!(f)?;
            for variant in m.family() {
                writeln!(f, "{}", variant)?;
            }
        }
        writeln!(f)?;

        if !self.enums.is_empty() {
            write_banner(f, "Enums")?;
            for e in &self.enums {
                writeln!(f, "{}", e)?;
            }
        }

        writeln!(f)?;
        write_banner(f, "Rpc Func")?;
        write!(f, "{}", self.service())
    }
}

fn write_banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", SECTION_RULE)?;
    writeln!(f, "// {}", title)?;
    writeln!(f, "{}", SECTION_RULE)?;
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("users", "id", "bigint").with_table_comment("user"),
            ColumnDescriptor::new("users", "status", "enum")
                .with_column_type("enum('active','banned')")
                .with_table_comment("user"),
        ]
    }

    #[test]
    fn test_groups_columns_by_table() {
        let mut cols = users_columns();
        cols.push(ColumnDescriptor::new("order_items", "id", "int"));
        let schema = Schema::from_columns(&cols, &GeneratorOptions::default()).unwrap();

        assert_eq!(schema.messages().len(), 2);
        assert_eq!(schema.messages()[0].name, "Users");
        assert_eq!(schema.messages()[0].comment, "user");
        assert_eq!(schema.messages()[0].fields().len(), 2);
        assert_eq!(schema.messages()[1].name, "OrderItems");
        // missing table comments fall back to the lower camel table name
        assert_eq!(schema.messages()[1].comment, "orderItems");
    }

    #[test]
    fn test_enum_column_registers_enum() {
        let schema = Schema::from_columns(&users_columns(), &GeneratorOptions::default()).unwrap();
        assert_eq!(schema.enums().len(), 1);
        assert!(schema.enum_by_name("UserStatus").is_some());
        assert_eq!(
            schema.messages()[0].fields()[1].ty,
            FieldType::Enum("UserStatus".to_string())
        );
    }

    #[test]
    fn test_equal_enums_are_not_merged() {
        let cols = vec![
            ColumnDescriptor::new("users", "a", "enum").with_column_type("enum('x','y')"),
            ColumnDescriptor::new("users", "b", "enum").with_column_type("enum('x','y')"),
        ];
        let schema = Schema::from_columns(&cols, &GeneratorOptions::default()).unwrap();
        let names: Vec<_> = schema.enums().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["UserA", "UserB"]);
    }

    #[test]
    fn test_malformed_enum_degrades() {
        let cols = vec![ColumnDescriptor::new("users", "kind", "enum").with_column_type("enum")];
        let schema = Schema::from_columns(&cols, &GeneratorOptions::default()).unwrap();
        assert!(schema.enums().is_empty());
        assert_eq!(
            schema.messages()[0].fields()[0].ty,
            FieldType::Scalar(ScalarType::String)
        );
        assert!(matches!(
            schema.diagnostics(),
            [Diagnostic::MalformedEnum { .. }]
        ));

        let strict = GeneratorOptions::default().strict(true);
        assert!(matches!(
            Schema::from_columns(&cols, &strict),
            Err(GeneratorError::EnumParse { .. })
        ));
    }

    #[test]
    fn test_unsupported_type_in_strict_mode() {
        let cols = vec![ColumnDescriptor::new("places", "shape", "geometry")];
        let err = Schema::from_columns(&cols, &GeneratorOptions::default().strict(true))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::UnsupportedColumnType { .. }));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_render_header_and_imports() {
        let mut schema = Schema::new("Svc", "./pb", "pb");
        schema.add_import("b.proto");
        schema.add_import("a.proto");
        let text = schema.render();
        assert!(text.starts_with(
            "syntax = \"proto3\";\n\noption go_package =\"./pb\";\n\npackage pb;\n\nimport \"a.proto\";\nimport \"b.proto\";\n\n"
        ));
        assert!(!text.contains("// Enums"));
        assert!(text.contains("service Svc {\n}\n"));
    }
}
