//! Column metadata as reported by the database

/// One database column, as supplied by the data source
///
/// Records are expected ordered by table name, then ordinal position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Owning table
    pub table_name: String,
    /// Column name as stored in the database
    pub column_name: String,
    /// Whether the column accepts NULL
    pub is_nullable: bool,
    /// Native SQL type name (e.g. `varchar`, `enum`)
    pub data_type: String,
    /// Maximum character length, for character types
    pub character_max_length: Option<i64>,
    /// Numeric precision, for numeric types
    pub numeric_precision: Option<i64>,
    /// Numeric scale, for numeric types
    pub numeric_scale: Option<i64>,
    /// Full native type string (e.g. `tinyint(1)`, `enum('a','b')`)
    pub column_type: String,
    /// Column comment, possibly empty
    pub column_comment: String,
    /// Table comment, possibly empty
    pub table_comment: String,
}

impl ColumnDescriptor {
    /// Create a descriptor with the given table, column and native type
    ///
    /// `column_type` defaults to `data_type`; use the `with_*` methods for
    /// the remaining metadata.
    pub fn new(table: &str, column: &str, data_type: &str) -> Self {
        Self {
            table_name: table.to_string(),
            column_name: column.to_string(),
            data_type: data_type.to_string(),
            column_type: data_type.to_string(),
            ..Default::default()
        }
    }

    /// Set the full native type string
    pub fn with_column_type(mut self, column_type: &str) -> Self {
        self.column_type = column_type.to_string();
        self
    }

    /// Set the column comment
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.column_comment = comment.to_string();
        self
    }

    /// Set the table comment
    pub fn with_table_comment(mut self, comment: &str) -> Self {
        self.table_comment = comment.to_string();
        self
    }

    /// Mark the column nullable
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    /// `table.column`, for diagnostics
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table_name, self.column_name)
    }
}
