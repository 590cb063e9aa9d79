//! sql2proto - generate a protobuf schema from database column metadata
//!
//! Connects to MySQL or PostgreSQL, reads the column metadata of the
//! requested tables and prints the generated `.proto` source to stdout (or
//! `--out`). Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use sql2proto::options::parse_list;
use sql2proto::source::{load_columns, ConnectionOptions};
use sql2proto::{Dialect, FieldStyle, GeneratorOptions, Schema};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sql2proto")]
#[command(version, about = "Generates a protobuf schema from your database", long_about = None)]
struct Cli {
    /// Database type: mysql | postgres
    #[arg(long, env = "SQL2PROTO_DB_TYPE", default_value = "mysql")]
    db_type: Dialect,

    /// Database host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Database port (defaults to 3306 for mysql, 5432 for postgres)
    #[arg(long)]
    port: Option<u16>,

    /// Database user
    #[arg(long, default_value = "root")]
    user: String,

    /// Database password
    #[arg(long, env = "SQL2PROTO_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Database name
    #[arg(long, default_value = "")]
    dbname: String,

    /// Connection URL, overrides host/port/user/password/dbname
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    url: Option<String>,

    /// Tables to generate, comma separated (all tables when empty)
    #[arg(long, default_value = "")]
    table: String,

    /// RPC service name (defaults to the database name)
    #[arg(long)]
    service_name: Option<String>,

    /// Protobuf package (defaults to the database name)
    #[arg(long)]
    package: Option<String>,

    /// go_package option (defaults to ./<package>)
    #[arg(long)]
    go_package: Option<String>,

    /// Tables to ignore, comma separated
    #[arg(long, default_value = "")]
    ignore_tables: String,

    /// Column names to ignore in every table, comma separated
    #[arg(long, default_value = "")]
    ignore_columns: String,

    /// Field naming style: snake | lower-camel
    #[arg(long, default_value = "snake")]
    field_style: FieldStyle,

    /// Fail instead of falling back to `string` for unmappable columns
    #[arg(long)]
    strict: bool,

    /// Write the schema to a file instead of stdout
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn connection(&self) -> ConnectionOptions {
        ConnectionOptions {
            dialect: self.db_type,
            host: self.host.clone(),
            port: self.port.unwrap_or_else(|| self.db_type.default_port()),
            user: self.user.clone(),
            password: self.password.clone(),
            dbname: self.dbname.clone(),
            url: self.url.clone(),
        }
    }

    fn generator(&self) -> GeneratorOptions {
        let fallback = if self.dbname.is_empty() {
            "proto".to_string()
        } else {
            self.dbname.clone()
        };
        let package = self.package.clone().unwrap_or_else(|| fallback.clone());
        let go_package = self
            .go_package
            .clone()
            .unwrap_or_else(|| format!("./{}", package));

        GeneratorOptions::default()
            .with_dialect(self.db_type)
            .with_service_name(self.service_name.clone().unwrap_or(fallback))
            .with_package(package)
            .with_go_package(go_package)
            .ignore_tables(parse_list(&self.ignore_tables))
            .ignore_columns(parse_list(&self.ignore_columns))
            .with_field_style(self.field_style)
            .strict(self.strict)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "sql2proto=debug"
    } else {
        "sql2proto=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = cli.generator();
    options.validate()?;

    let columns = load_columns(&cli.connection(), &cli.table)
        .await
        .context("failed to read column metadata")?;
    tracing::info!(columns = columns.len(), "loaded column metadata");

    let schema = Schema::from_columns(&columns, &options)?;
    if !schema.diagnostics().is_empty() {
        tracing::warn!(
            count = schema.diagnostics().len(),
            "some columns fell back to `string`"
        );
    }

    let text = schema.render();
    match &cli.out {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            emit(&mut file, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote schema");
        }
        None => {
            let mut stdout = io::stdout().lock();
            emit(&mut stdout, &text).context("failed to write schema to stdout")?;
        }
    }

    Ok(())
}

/// Write the rendered schema as is; it already ends with a newline
fn emit<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql2proto::ColumnDescriptor;

    #[test]
    fn test_emit_writes_rendered_text_unchanged() {
        let columns = vec![ColumnDescriptor::new("users", "id", "bigint")];
        let text = Schema::from_columns(&columns, &GeneratorOptions::default())
            .unwrap()
            .render();

        let mut buf = Vec::new();
        emit(&mut buf, &text).unwrap();
        let written = String::from_utf8(buf).unwrap();
        assert_eq!(written, text);
        assert!(written.ends_with("}\n"));
        assert!(!written.ends_with("\n\n"));
    }
}
