//! Generator options
//!
//! Run-scoped configuration consumed by the schema builder. Options are a
//! plain value handed to [`Schema::from_columns`](crate::Schema::from_columns);
//! nothing here is global.

use crate::GeneratorError;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Database dialect the column metadata came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// MySQL / MariaDB
    #[default]
    MySql,
    /// PostgreSQL
    Postgres,
}

impl Dialect {
    /// Default TCP port for the dialect
    pub fn default_port(&self) -> u16 {
        match self {
            Dialect::MySql => 3306,
            Dialect::Postgres => 5432,
        }
    }
}

impl FromStr for Dialect {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            other => Err(GeneratorError::InvalidConfig(format!(
                "unsupported database type `{}` (expected mysql | postgres)",
                other
            ))),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::MySql => f.write_str("mysql"),
            Dialect::Postgres => f.write_str("postgres"),
        }
    }
}

/// Casing applied to field names in generated messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStyle {
    /// `create_time`
    #[default]
    Snake,
    /// `createTime`
    LowerCamel,
}

impl FromStr for FieldStyle {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `sql_pb` / `sqlPb` are the spellings used by older command lines
        match s.trim().to_lowercase().as_str() {
            "snake" | "snake_case" | "sql_pb" => Ok(FieldStyle::Snake),
            "lower-camel" | "lower_camel" | "lowercamel" | "camel" | "sqlpb" => {
                Ok(FieldStyle::LowerCamel)
            }
            other => Err(GeneratorError::InvalidConfig(format!(
                "unknown field style `{}` (expected snake | lower-camel)",
                other
            ))),
        }
    }
}

/// Options for one generation run
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Dialect of the column metadata
    pub dialect: Dialect,
    /// Name of the generated RPC service
    pub service_name: String,
    /// Protobuf package
    pub package: String,
    /// `option go_package` value
    pub go_package: String,
    /// Tables skipped entirely
    pub ignore_tables: BTreeSet<String>,
    /// Column names skipped in every table
    pub ignore_columns: BTreeSet<String>,
    /// Field naming style
    pub field_style: FieldStyle,
    /// Promote degraded columns to hard errors
    pub strict: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            service_name: "Service".to_string(),
            package: "proto".to_string(),
            go_package: "./proto".to_string(),
            ignore_tables: BTreeSet::new(),
            ignore_columns: BTreeSet::new(),
            field_style: FieldStyle::default(),
            strict: false,
        }
    }
}

impl GeneratorOptions {
    /// Set the dialect
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the service name
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Set the protobuf package
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Set the go_package option
    pub fn with_go_package(mut self, go_package: impl Into<String>) -> Self {
        self.go_package = go_package.into();
        self
    }

    /// Add tables to skip
    pub fn ignore_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_tables.extend(tables.into_iter().map(Into::into));
        self
    }

    /// Add column names to skip
    pub fn ignore_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Set the field naming style
    pub fn with_field_style(mut self, style: FieldStyle) -> Self {
        self.field_style = style;
        self
    }

    /// Enable or disable strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Check the options are usable
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.service_name.trim().is_empty() {
            return Err(GeneratorError::InvalidConfig(
                "service name must not be empty".to_string(),
            ));
        }
        if self.package.trim().is_empty() {
            return Err(GeneratorError::InvalidConfig(
                "package must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split a comma separated list, trimming entries and dropping empty ones
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_style_from_str() {
        assert_eq!("snake".parse::<FieldStyle>().unwrap(), FieldStyle::Snake);
        assert_eq!("sql_pb".parse::<FieldStyle>().unwrap(), FieldStyle::Snake);
        assert_eq!("sqlPb".parse::<FieldStyle>().unwrap(), FieldStyle::LowerCamel);
        assert_eq!("SQL_PB".parse::<FieldStyle>().unwrap(), FieldStyle::Snake);
        assert_eq!("SQLPB".parse::<FieldStyle>().unwrap(), FieldStyle::LowerCamel);
        assert_eq!(
            "Lower-Camel".parse::<FieldStyle>().unwrap(),
            FieldStyle::LowerCamel
        );
        assert!("kebab".parse::<FieldStyle>().is_err());
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("pg".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!("oracle".parse::<Dialect>().is_err());
        assert_eq!(Dialect::Postgres.default_port(), 5432);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_service() {
        let opts = GeneratorOptions::default().with_service_name("  ");
        assert!(matches!(
            opts.validate(),
            Err(GeneratorError::InvalidConfig(_))
        ));
        assert!(GeneratorOptions::default().validate().is_ok());
    }
}
