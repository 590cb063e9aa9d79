//! Enum generation for `enum`/`set` columns
//!
//! The literal value list of the column type (`enum('a','b')`) becomes a
//! protobuf enum whose values are tagged by position, starting at 0.

use super::INDENT;
use crate::column::ColumnDescriptor;
use crate::naming;
use crate::GeneratorError;
use std::fmt;

/// A single value of a generated enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumField {
    name: String,
    tag: i32,
}

impl EnumField {
    /// Create an enum value, normalizing the raw name
    pub fn new(raw: &str, tag: i32) -> Self {
        Self {
            name: naming::enum_value_name(raw),
            tag,
        }
    }

    /// Normalized value name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric tag
    pub fn tag(&self) -> i32 {
        self.tag
    }
}

impl fmt::Display for EnumField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.tag)
    }
}

/// A generated protobuf enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    /// Type name
    pub name: String,
    /// Comment, taken from the column comment
    pub comment: String,
    fields: Vec<EnumField>,
}

impl Enum {
    /// Create an empty enum
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            fields: Vec::new(),
        }
    }

    /// Build an enum from raw value names, tagging each by its position
    pub fn from_values<S: AsRef<str>>(
        name: &str,
        comment: &str,
        values: &[S],
    ) -> Result<Self, GeneratorError> {
        let mut e = Enum::new(name, comment);
        for (i, value) in values.iter().enumerate() {
            e.append_field(EnumField::new(value.as_ref(), i as i32))?;
        }
        Ok(e)
    }

    /// Build the enum for an `enum`/`set` column
    ///
    /// The name is the singular table name followed by the column name, both
    /// upper camel case.
    pub fn from_column(column: &ColumnDescriptor) -> Result<Self, GeneratorError> {
        let values = parse_literal_list(&column.column_type)
            .filter(|values| !values.is_empty())
            .ok_or_else(|| GeneratorError::EnumParse {
                table: column.table_name.clone(),
                column: column.column_name.clone(),
                column_type: column.column_type.clone(),
            })?;

        let name = naming::enum_name(&column.table_name, &column.column_name);
        Enum::from_values(&name, &column.column_comment, &values)
    }

    /// Append a value; fails if its tag is already used
    pub fn append_field(&mut self, field: EnumField) -> Result<(), GeneratorError> {
        if let Some(existing) = self.fields.iter().find(|f| f.tag == field.tag) {
            return Err(GeneratorError::DuplicateEnumTag {
                name: self.name.clone(),
                tag: field.tag,
                existing: existing.name.clone(),
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Values in declaration order
    pub fn fields(&self) -> &[EnumField] {
        &self.fields
    }
}

impl fmt::Display for Enum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// {} ", self.comment)?;
        writeln!(f, "enum {} {{", self.name)?;
        for field in &self.fields {
            writeln!(f, "{}{};", INDENT, field)?;
        }
        writeln!(f, "}}")
    }
}

/// Extract the quoted values of `enum('a','b')` / `set('x','y')`
///
/// Commas inside quotes are kept and `''` is read as an escaped quote.
/// Empty values are dropped. Returns `None` when there is no parenthesized
/// group.
pub fn parse_literal_list(column_type: &str) -> Option<Vec<String>> {
    let open = column_type.find('(')?;
    let close = column_type.rfind(')')?;
    if close <= open {
        return None;
    }
    let inner = &column_type[open + 1..close];

    let mut values = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' if quoted && chars.peek() == Some(&'\'') => {
                chars.next();
                current.push('\'');
            }
            '\'' => quoted = !quoted,
            ',' if !quoted => values.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    values.push(current);

    Some(
        values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal_list() {
        assert_eq!(
            parse_literal_list("enum('active','banned')").unwrap(),
            vec!["active", "banned"]
        );
        assert_eq!(
            parse_literal_list("set('a', 'b,c', 'it''s')").unwrap(),
            vec!["a", "b,c", "it's"]
        );
        assert_eq!(
            parse_literal_list("enum('x','x')").unwrap(),
            vec!["x", "x"]
        );
        assert!(parse_literal_list("enum").is_none());
        assert!(parse_literal_list("enum()").unwrap().is_empty());
    }

    #[test]
    fn test_from_column() {
        let col = ColumnDescriptor::new("users", "status", "enum")
            .with_column_type("enum('active','banned')")
            .with_comment("account status");
        let e = Enum::from_column(&col).unwrap();
        assert_eq!(e.name, "UserStatus");
        assert_eq!(e.comment, "account status");
        assert_eq!(e.fields().len(), 2);
        assert_eq!(e.fields()[0].name(), "ACTIVE");
        assert_eq!(e.fields()[0].tag(), 0);
        assert_eq!(e.fields()[1].name(), "BANNED");
        assert_eq!(e.fields()[1].tag(), 1);
    }

    #[test]
    fn test_from_column_malformed() {
        let col = ColumnDescriptor::new("users", "status", "enum").with_column_type("enum");
        assert!(matches!(
            Enum::from_column(&col),
            Err(GeneratorError::EnumParse { .. })
        ));

        let empty = ColumnDescriptor::new("users", "status", "enum").with_column_type("enum()");
        assert!(Enum::from_column(&empty).is_err());
    }

    #[test]
    fn test_duplicate_values_are_kept() {
        let e = Enum::from_values("Dup", "", &["a", "A"]).unwrap();
        assert_eq!(e.fields()[0].name(), "A");
        assert_eq!(e.fields()[1].name(), "A");
        assert_eq!(e.fields()[1].tag(), 1);
    }

    #[test]
    fn test_append_duplicate_tag() {
        let mut e = Enum::new("E", "");
        e.append_field(EnumField::new("a", 0)).unwrap();
        let err = e.append_field(EnumField::new("b", 0)).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_render_enum() {
        let e = Enum::from_values("UserStatus", "status", &["active", "banned"]).unwrap();
        assert_eq!(
            e.to_string(),
            "// status \nenum UserStatus {\n  ACTIVE = 0;\n  BANNED = 1;\n}\n"
        );
    }
}
