//! Column discovery
//!
//! Reads column metadata from `information_schema` over a single
//! connection: connect, discover the active schema, then fetch the columns
//! of the requested tables ordered by table name and ordinal position.

use crate::column::ColumnDescriptor;
use crate::options::{parse_list, Dialect};
use crate::GeneratorError;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;
use tracing::{debug, info};

const MYSQL_COLUMNS: &str = r#"SELECT
    CAST(c.TABLE_NAME AS CHAR) AS table_name,
    CAST(c.COLUMN_NAME AS CHAR) AS column_name,
    CAST(c.IS_NULLABLE AS CHAR) AS is_nullable,
    CAST(c.DATA_TYPE AS CHAR) AS data_type,
    CAST(c.CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS character_max_length,
    CAST(c.NUMERIC_PRECISION AS SIGNED) AS numeric_precision,
    CAST(c.NUMERIC_SCALE AS SIGNED) AS numeric_scale,
    CAST(c.COLUMN_TYPE AS CHAR) AS column_type,
    CAST(COALESCE(c.COLUMN_COMMENT, '') AS CHAR) AS column_comment,
    CAST(COALESCE(t.TABLE_COMMENT, '') AS CHAR) AS table_comment
FROM INFORMATION_SCHEMA.COLUMNS AS c
LEFT JOIN INFORMATION_SCHEMA.TABLES AS t
    ON c.TABLE_NAME = t.TABLE_NAME AND c.TABLE_SCHEMA = t.TABLE_SCHEMA
WHERE c.TABLE_SCHEMA = ?"#;

const MYSQL_TABLE_FILTER: &str = " AND c.TABLE_NAME = ?";

const MYSQL_ORDER: &str = " ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION";

const POSTGRES_COLUMNS: &str = r#"SELECT
    col.table_name::text AS table_name,
    col.column_name::text AS column_name,
    col.is_nullable::text AS is_nullable,
    col.udt_name::text AS data_type,
    col.character_maximum_length::bigint AS character_max_length,
    col.numeric_precision::bigint AS numeric_precision,
    col.numeric_scale::bigint AS numeric_scale,
    col.udt_name::text AS column_type,
    COALESCE(col_description(
        to_regclass(quote_ident(col.table_schema) || '.' || quote_ident(col.table_name))::oid,
        col.ordinal_position::int
    ), '') AS column_comment,
    COALESCE(obj_description(
        to_regclass(quote_ident(col.table_schema) || '.' || quote_ident(col.table_name))::oid,
        'pg_class'
    ), '') AS table_comment
FROM information_schema.columns AS col
WHERE col.table_schema = $1"#;

const POSTGRES_TABLE_FILTER: &str = " AND col.table_name = $2";

const POSTGRES_ORDER: &str = " ORDER BY col.table_name, col.ordinal_position";

/// Where and how to connect
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Database dialect
    pub dialect: Dialect,
    /// Host name
    pub host: String,
    /// TCP port
    pub port: u16,
    /// User name
    pub user: String,
    /// Password, possibly empty
    pub password: String,
    /// Database name
    pub dbname: String,
    /// Connection URL; overrides the individual settings when present
    pub url: Option<String>,
}

impl ConnectionOptions {
    fn mysql(&self) -> Result<MySqlConnectOptions, GeneratorError> {
        let opts = match &self.url {
            Some(url) => MySqlConnectOptions::from_str(url).map_err(GeneratorError::Connection)?,
            None => {
                let mut opts = MySqlConnectOptions::new()
                    .host(&self.host)
                    .port(self.port)
                    .username(&self.user)
                    .password(&self.password);
                if !self.dbname.is_empty() {
                    opts = opts.database(&self.dbname);
                }
                opts
            }
        };
        Ok(opts.disable_statement_logging())
    }

    fn postgres(&self) -> Result<PgConnectOptions, GeneratorError> {
        let opts = match &self.url {
            Some(url) => PgConnectOptions::from_str(url).map_err(GeneratorError::Connection)?,
            None => {
                let mut opts = PgConnectOptions::new()
                    .host(&self.host)
                    .port(self.port)
                    .username(&self.user)
                    .password(&self.password);
                if !self.dbname.is_empty() {
                    opts = opts.database(&self.dbname);
                }
                opts
            }
        };
        Ok(opts.disable_statement_logging())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ColumnRow {
    table_name: String,
    column_name: String,
    is_nullable: String,
    data_type: String,
    character_max_length: Option<i64>,
    numeric_precision: Option<i64>,
    numeric_scale: Option<i64>,
    column_type: String,
    column_comment: String,
    table_comment: String,
}

impl From<ColumnRow> for ColumnDescriptor {
    fn from(row: ColumnRow) -> Self {
        ColumnDescriptor {
            table_name: row.table_name,
            column_name: row.column_name,
            is_nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
            data_type: row.data_type,
            character_max_length: row.character_max_length,
            numeric_precision: row.numeric_precision,
            numeric_scale: row.numeric_scale,
            column_type: row.column_type,
            column_comment: row.column_comment,
            table_comment: row.table_comment,
        }
    }
}

/// Table names from a comma separated list, sorted and de-duplicated
///
/// An empty result means every table of the active schema.
pub fn requested_tables(list: &str) -> Vec<String> {
    let mut tables = parse_list(list);
    tables.sort();
    tables.dedup();
    tables
}

/// Column query for a dialect, optionally restricted to one table
pub fn column_query(dialect: Dialect, single_table: bool) -> String {
    let (base, filter, order) = match dialect {
        Dialect::MySql => (MYSQL_COLUMNS, MYSQL_TABLE_FILTER, MYSQL_ORDER),
        Dialect::Postgres => (POSTGRES_COLUMNS, POSTGRES_TABLE_FILTER, POSTGRES_ORDER),
    };
    let mut sql = String::from(base);
    if single_table {
        sql.push_str(filter);
    }
    sql.push_str(order);
    sql
}

/// Fetch column descriptors for the requested tables
///
/// `tables` is a comma separated list; an empty list fetches every table.
/// Any failure here is fatal for the run.
pub async fn load_columns(
    options: &ConnectionOptions,
    tables: &str,
) -> Result<Vec<ColumnDescriptor>, GeneratorError> {
    let tables = requested_tables(tables);
    let rows = match options.dialect {
        Dialect::MySql => load_mysql(options, &tables).await?,
        Dialect::Postgres => load_postgres(options, &tables).await?,
    };
    Ok(rows.into_iter().map(ColumnDescriptor::from).collect())
}

async fn load_mysql(
    options: &ConnectionOptions,
    tables: &[String],
) -> Result<Vec<ColumnRow>, GeneratorError> {
    let mut conn = MySqlConnection::connect_with(&options.mysql()?)
        .await
        .map_err(GeneratorError::Connection)?;
    info!(dialect = %options.dialect, host = %options.host, "connected");

    let schema: String = sqlx::query_scalar::<_, Option<String>>("SELECT CAST(DATABASE() AS CHAR)")
        .fetch_one(&mut conn)
        .await
        .map_err(GeneratorError::SchemaDiscovery)?
        .ok_or_else(|| {
            GeneratorError::SchemaDiscovery(sqlx::Error::Configuration(
                "no database selected".into(),
            ))
        })?;
    info!(schema = %schema, "discovered active schema");

    let mut rows = Vec::new();
    if tables.is_empty() {
        let sql = column_query(Dialect::MySql, false);
        rows = sqlx::query_as::<_, ColumnRow>(&sql)
            .bind(&schema)
            .fetch_all(&mut conn)
            .await
            .map_err(|source| GeneratorError::ColumnQuery {
                table: "*".to_string(),
                source,
            })?;
    } else {
        let sql = column_query(Dialect::MySql, true);
        for table in tables {
            let found = sqlx::query_as::<_, ColumnRow>(&sql)
                .bind(&schema)
                .bind(table)
                .fetch_all(&mut conn)
                .await
                .map_err(|source| GeneratorError::ColumnQuery {
                    table: table.clone(),
                    source,
                })?;
            debug!(table = %table, columns = found.len(), "fetched columns");
            rows.extend(found);
        }
    }

    conn.close().await.map_err(GeneratorError::Connection)?;
    Ok(rows)
}

async fn load_postgres(
    options: &ConnectionOptions,
    tables: &[String],
) -> Result<Vec<ColumnRow>, GeneratorError> {
    let mut conn = PgConnection::connect_with(&options.postgres()?)
        .await
        .map_err(GeneratorError::Connection)?;
    info!(dialect = %options.dialect, host = %options.host, "connected");

    let schema: String = sqlx::query_scalar::<_, String>("SELECT current_schema()::text")
        .fetch_one(&mut conn)
        .await
        .map_err(GeneratorError::SchemaDiscovery)?;
    info!(schema = %schema, "discovered active schema");

    let mut rows = Vec::new();
    if tables.is_empty() {
        let sql = column_query(Dialect::Postgres, false);
        rows = sqlx::query_as::<_, ColumnRow>(&sql)
            .bind(&schema)
            .fetch_all(&mut conn)
            .await
            .map_err(|source| GeneratorError::ColumnQuery {
                table: "*".to_string(),
                source,
            })?;
    } else {
        let sql = column_query(Dialect::Postgres, true);
        for table in tables {
            let found = sqlx::query_as::<_, ColumnRow>(&sql)
                .bind(&schema)
                .bind(table)
                .fetch_all(&mut conn)
                .await
                .map_err(|source| GeneratorError::ColumnQuery {
                    table: table.clone(),
                    source,
                })?;
            debug!(table = %table, columns = found.len(), "fetched columns");
            rows.extend(found);
        }
    }

    conn.close().await.map_err(GeneratorError::Connection)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_tables() {
        assert_eq!(requested_tables("users, orders,users,"), vec!["orders", "users"]);
        assert!(requested_tables(" ").is_empty());
    }

    #[test]
    fn test_column_query() {
        let all = column_query(Dialect::MySql, false);
        assert!(all.contains("c.TABLE_SCHEMA = ?"));
        assert!(!all.contains("c.TABLE_NAME = ?"));
        assert!(all.ends_with("ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION"));

        let one = column_query(Dialect::Postgres, true);
        assert!(one.contains("col.table_name = $2"));
        assert!(one.ends_with("ORDER BY col.table_name, col.ordinal_position"));
    }

    #[test]
    fn test_row_into_descriptor() {
        let row = ColumnRow {
            table_name: "users".to_string(),
            column_name: "flag".to_string(),
            is_nullable: "YES".to_string(),
            data_type: "tinyint".to_string(),
            character_max_length: None,
            numeric_precision: Some(3),
            numeric_scale: Some(0),
            column_type: "tinyint(1)".to_string(),
            column_comment: String::new(),
            table_comment: "user".to_string(),
        };
        let col = ColumnDescriptor::from(row);
        assert!(col.is_nullable);
        assert_eq!(col.numeric_precision, Some(3));
        assert_eq!(col.column_type, "tinyint(1)");
    }

    #[test]
    fn test_url_overrides_settings() {
        let opts = ConnectionOptions {
            dialect: Dialect::Postgres,
            host: "ignored".to_string(),
            port: 1,
            user: "nobody".to_string(),
            password: String::new(),
            dbname: String::new(),
            url: Some("postgres://app@db.internal:6543/shop".to_string()),
        };
        let pg = opts.postgres().unwrap();
        assert_eq!(pg.get_host(), "db.internal");
        assert_eq!(pg.get_port(), 6543);
    }
}
