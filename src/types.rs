//! Native SQL type to protobuf type mapping

use crate::column::ColumnDescriptor;
use crate::options::Dialect;
use std::fmt;

/// Protobuf scalar types produced by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `string`
    String,
    /// `bytes`
    Bytes,
    /// `int64`
    Int64,
    /// `bool`
    Bool,
    /// `double`
    Double,
}

impl ScalarType {
    /// Protobuf source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
            ScalarType::Int64 => "int64",
            ScalarType::Bool => "bool",
            ScalarType::Double => "double",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of mapping one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedType {
    /// A known scalar mapping
    Scalar(ScalarType),
    /// `enum`/`set` column: an enum type has to be built from the column
    Enum,
    /// No rule matched; the column falls back to `string`
    Unsupported,
}

impl MappedType {
    /// The scalar used when this mapping is rendered without an enum
    pub fn scalar_or_fallback(&self) -> ScalarType {
        match self {
            MappedType::Scalar(scalar) => *scalar,
            MappedType::Enum | MappedType::Unsupported => ScalarType::String,
        }
    }
}

/// Map a column's native type to a protobuf type
///
/// Matching is case-insensitive on `data_type`. `tinyint(1)` is treated as a
/// boolean only for MySQL, where it is the conventional boolean spelling.
pub fn map_column(column: &ColumnDescriptor, dialect: Dialect) -> MappedType {
    let data_type = column.data_type.trim().to_lowercase();

    match data_type.as_str() {
        "char" | "varchar" | "text" | "longtext" | "mediumtext" | "tinytext" => {
            MappedType::Scalar(ScalarType::String)
        }
        "enum" | "set" => MappedType::Enum,
        "blob" | "mediumblob" | "longblob" | "varbinary" | "binary" => {
            MappedType::Scalar(ScalarType::Bytes)
        }
        "date" | "time" | "datetime" | "timestamp" | "timestamptz" => {
            MappedType::Scalar(ScalarType::Int64)
        }
        "bool" | "bit" => MappedType::Scalar(ScalarType::Bool),
        "tinyint" | "smallint" | "int" | "mediumint" | "bigint" | "int2" | "int4" | "int8" => {
            if dialect == Dialect::MySql && is_mysql_bool(&column.column_type) {
                MappedType::Scalar(ScalarType::Bool)
            } else {
                MappedType::Scalar(ScalarType::Int64)
            }
        }
        "float" | "decimal" | "double" => MappedType::Scalar(ScalarType::Double),
        "json" => MappedType::Scalar(ScalarType::String),
        _ => MappedType::Unsupported,
    }
}

fn is_mysql_bool(column_type: &str) -> bool {
    column_type.trim().eq_ignore_ascii_case("tinyint(1)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(data_type: &str) -> MappedType {
        map_column(&ColumnDescriptor::new("t", "c", data_type), Dialect::MySql)
    }

    #[test]
    fn test_map_string_family() {
        for ty in ["char", "VARCHAR", "text", "longtext", "mediumtext", "tinytext", "json"] {
            assert_eq!(map(ty), MappedType::Scalar(ScalarType::String), "{}", ty);
        }
    }

    #[test]
    fn test_map_bytes_family() {
        for ty in ["blob", "mediumblob", "longblob", "varbinary", "binary"] {
            assert_eq!(map(ty), MappedType::Scalar(ScalarType::Bytes), "{}", ty);
        }
    }

    #[test]
    fn test_map_time_family_to_int64() {
        for ty in ["date", "time", "datetime", "timestamp", "timestamptz"] {
            assert_eq!(map(ty), MappedType::Scalar(ScalarType::Int64), "{}", ty);
        }
    }

    #[test]
    fn test_map_integer_family() {
        for ty in ["tinyint", "smallint", "int", "mediumint", "bigint", "int2", "int4", "int8"] {
            assert_eq!(map(ty), MappedType::Scalar(ScalarType::Int64), "{}", ty);
        }
        assert_eq!(map("bool"), MappedType::Scalar(ScalarType::Bool));
        assert_eq!(map("bit"), MappedType::Scalar(ScalarType::Bool));
        assert_eq!(map("decimal"), MappedType::Scalar(ScalarType::Double));
    }

    #[test]
    fn test_tinyint_one_is_bool_on_mysql() {
        let col = ColumnDescriptor::new("t", "flag", "tinyint").with_column_type("tinyint(1)");
        assert_eq!(
            map_column(&col, Dialect::MySql),
            MappedType::Scalar(ScalarType::Bool)
        );
        assert_eq!(
            map_column(&col.clone().nullable(), Dialect::MySql),
            MappedType::Scalar(ScalarType::Bool)
        );
        assert_eq!(
            map_column(&col, Dialect::Postgres),
            MappedType::Scalar(ScalarType::Int64)
        );

        let wide = ColumnDescriptor::new("t", "n", "tinyint").with_column_type("tinyint(4)");
        assert_eq!(
            map_column(&wide, Dialect::MySql),
            MappedType::Scalar(ScalarType::Int64)
        );
    }

    #[test]
    fn test_enum_and_unsupported() {
        assert_eq!(map("enum"), MappedType::Enum);
        assert_eq!(map("SET"), MappedType::Enum);
        assert_eq!(map("geometry"), MappedType::Unsupported);
        assert_eq!(map("geometry").scalar_or_fallback(), ScalarType::String);
    }
}
