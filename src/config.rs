//! Command line and environment configuration.
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::CommandFactory;
use clap::Parser;
use fieldx::fxstruct;
use garde::Validate;

use crate::concurrency::Expected;
use crate::types::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Pg,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Create or upgrade the database schema.
    Migrate,
    /// Print all live records of a kind.
    List { kind: EntityKind },
    /// Print one live record.
    Get { kind: EntityKind, id: i32 },
    /// Insert a record given as a JSON object.
    Add {
        kind:  EntityKind,
        json:  String,
        /// Id of the person performing the change.
        #[clap(long, default_value_t = 0)]
        actor: i32,
    },
    /// Update a record given as a JSON object. Its `id` and `version` must match the stored row.
    Edit {
        kind:  EntityKind,
        json:  String,
        #[clap(long, default_value_t = 0)]
        actor: i32,
    },
    /// Soft-delete a record last seen at `version`.
    Delete {
        kind:    EntityKind,
        id:      i32,
        version: i64,
        #[clap(long, default_value_t = 0)]
        actor:   i32,
    },
    /// Soft-delete several records at once, all or nothing.
    BatchDelete {
        kind:  EntityKind,
        /// Records as `id:version` pairs.
        #[clap(required = true, value_parser = parse_expected)]
        items: Vec<Expected>,
        #[clap(long, default_value_t = 0)]
        actor: i32,
    },
    /// Print what changed after a watermark.
    Delta { kind: EntityKind, watermark: i64 },
}

fn parse_expected(arg: &str) -> Result<Expected, String> {
    let (id, version) = arg
        .split_once(':')
        .ok_or_else(|| format!("'{arg}' is not an id:version pair"))?;
    let id = id.trim().parse::<i32>().map_err(|e| format!("bad id in '{arg}': {e}"))?;
    let version = version
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("bad version in '{arg}': {e}"))?;
    Ok(Expected::new(id, version))
}

#[derive(Debug, Clone, clap::Parser, Validate)]
#[fxstruct(no_new, get(copy))]
#[clap(about, version, author, name = "sitesafe")]
pub struct Config {
    /// Use SQLite as the database backend. This is the default when no backend is chosen.
    #[clap(long, env = "SITESAFE_SQLITE", default_value_t = false, conflicts_with = "pg")]
    #[garde(custom(Self::feature_enabled(cfg!(feature = "sqlite"), "sqlite")))]
    sqlite: bool,

    /// Path to the SQLite database file.
    #[clap(long, env = "SITESAFE_SQLITE_PATH", default_value = "sitesafe.db")]
    #[fieldx(get(clone))]
    #[garde(skip)]
    sqlite_path: PathBuf,

    /// Use PostgreSQL as the database backend.
    #[clap(long, env = "SITESAFE_PG", default_value_t = false)]
    #[garde(custom(Self::feature_enabled(cfg!(feature = "pg"), "pg")))]
    pg: bool,

    #[clap(long, env = "SITESAFE_PG_HOST", default_value = "localhost")]
    #[fieldx(get(clone))]
    #[garde(skip)]
    pg_host: String,

    #[clap(long, env = "SITESAFE_PG_PORT", default_value_t = 5432)]
    #[garde(skip)]
    pg_port: u16,

    #[clap(long, env = "SITESAFE_PG_USER", default_value = "sitesafe")]
    #[fieldx(get(clone))]
    #[garde(skip)]
    pg_user: String,

    #[clap(long, env = "SITESAFE_PG_PASSWORD", hide_env_values = true, default_value = "sitesafe")]
    #[fieldx(get(clone))]
    #[garde(skip)]
    pg_password: String,

    #[clap(long, env = "SITESAFE_PG_DATABASE", default_value = "sitesafe")]
    #[fieldx(get(clone))]
    #[garde(length(min = 1))]
    pg_database: String,

    /// Maximum number of records kept in the cache.
    #[clap(long, env = "SITESAFE_CACHE_CAPACITY", default_value_t = 10_000)]
    #[garde(range(min = 1))]
    cache_capacity: u64,

    /// Usage check codes to turn off, e.g. `person.ppe_recipient`.
    #[clap(long = "disable-usage-check", env = "SITESAFE_DISABLE_USAGE_CHECKS", value_delimiter = ',')]
    #[fieldx(get(clone))]
    #[garde(skip)]
    disabled_usage_checks: Vec<String>,

    /// File to send log into
    #[clap(long, env = "SITESAFE_LOG_FILE")]
    #[fieldx(get(clone))]
    #[garde(skip)]
    log_file: Option<PathBuf>,

    /// Only log warnings and errors unless RUST_LOG says otherwise.
    #[clap(long, short, env = "SITESAFE_QUIET", default_value_t = false)]
    #[garde(skip)]
    quiet: bool,

    #[clap(subcommand)]
    #[fieldx(get(clone))]
    #[garde(skip)]
    command: Command,
}

impl Config {
    /// Parse the process arguments and environment, then validate the result.
    pub fn load() -> Result<Self, clap::Error> {
        Self::checked(Self::try_parse()?)
    }

    pub fn load_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::checked(Self::try_parse_from(args)?)
    }

    fn checked(config: Self) -> Result<Self, clap::Error> {
        if let Err(err) = config.validate() {
            let mut cmd = <Self as CommandFactory>::command();
            return Err(cmd.error(ErrorKind::InvalidValue, err));
        }
        Ok(config)
    }

    pub fn backend(&self) -> Backend {
        if self.pg {
            Backend::Pg
        }
        else {
            Backend::Sqlite
        }
    }

    fn feature_enabled<'a>(enabled: bool, feature: &'static str) -> impl FnOnce(&'a bool, &()) -> garde::Result {
        move |value, _| {
            if !*value || enabled {
                Ok(())
            }
            else {
                Err(garde::Error::new(format!("Build feature '{feature}' must be enabled.")))
            }
        }
    }
}
