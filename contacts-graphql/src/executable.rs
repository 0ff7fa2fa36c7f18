//! Main entry point for CLI command to start server.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use futures::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::axum_factory::serve;
use crate::configuration::generate_config_schema;
use crate::configuration::Configuration;
use crate::graphql::build_schema;
use crate::store::RecordStore;
use crate::store::UuidGenerator;

/// Options for the contacts server
#[derive(Parser, Debug)]
#[command(
    name = "contacts",
    about = "GraphQL contacts server",
    disable_version_flag = true
)]
pub(crate) struct Opt {
    /// Log level (off|error|warn|info|debug|trace).
    #[arg(
        long = "log",
        default_value = "info",
        alias = "log-level",
        env = "CONTACTS_LOG"
    )]
    log_level: String,

    /// Configuration location relative to the current directory.
    #[arg(short, long = "config", env = "CONTACTS_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Prints the configuration schema.
    #[arg(long)]
    schema: bool,

    /// Prints the GraphQL schema of the API.
    #[arg(long)]
    sdl: bool,

    /// Display version and exit.
    #[arg(long, short = 'V')]
    version: bool,
}

/// This is the main contacts entrypoint.
pub fn main() -> Result<()> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(nb) = std::env::var("CONTACTS_NUM_CORES")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
    {
        builder.worker_threads(nb);
    }
    let runtime = builder.build()?;
    runtime.block_on(Executable::builder().start())
}

/// Entry point into creating a contacts executable.
pub struct Executable {}

#[buildstructor::buildstructor]
impl Executable {
    /// Build an executable that will parse commandline options and set up logging.
    /// You may optionally supply the `store` to serve; it defaults to the sample contacts.
    ///
    /// Note that you must be in the context of an existing tokio runtime.
    #[builder(entry = "builder", exit = "start")]
    pub async fn start(store: Option<RecordStore>) -> Result<()> {
        let opt = Opt::parse();

        if opt.version {
            println!("{}", std::env!("CARGO_PKG_VERSION"));
            return Ok(());
        }

        if opt.schema {
            let schema = generate_config_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            return Ok(());
        }

        if opt.sdl {
            let schema = build_schema(RecordStore::empty(UuidGenerator), &Configuration::default());
            println!("{}", schema.sdl());
            return Ok(());
        }

        let builder = tracing_subscriber::fmt::fmt().with_env_filter(
            EnvFilter::try_new(&opt.log_level).context("could not parse log configuration")?,
        );
        let initialized = if std::io::stdout().is_terminal() {
            builder.try_init()
        } else {
            builder.json().try_init()
        };
        initialized.map_err(|err| anyhow!("could not set up logging: {err}"))?;

        let configuration = match opt.config_path {
            Some(path) => {
                let path = if path.is_relative() {
                    std::env::current_dir()?.join(path)
                } else {
                    path
                };
                tracing::debug!(path = %path.display(), "loading configuration");
                Configuration::from_file(&path)?
            }
            None => Configuration::default(),
        };
        let configuration = Arc::new(configuration);

        let handle = serve(configuration.clone(), store.unwrap_or_default()).await?;
        tracing::info!(
            "Server ready at {}{}",
            handle.listen_address(),
            configuration.graphql_path()
        );

        if let Err(err) = handle.serve_until(ctrl_c()).await {
            tracing::error!("{}", err);
            return Err(err.into());
        }
        tracing::info!("stopped");
        Ok(())
    }
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // without a signal handler the server runs until it fails
        tracing::error!("cannot listen for ctrl-c: {}", err);
        future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_line_is_well_formed() {
        Opt::command().debug_assert();
    }

    #[test]
    fn options_parse_from_flags() {
        let opt = Opt::try_parse_from([
            "contacts",
            "--log",
            "debug",
            "--config",
            "contacts.yaml",
            "--sdl",
        ])
        .unwrap();
        assert_eq!(opt.log_level, "debug");
        assert_eq!(opt.config_path, Some(PathBuf::from("contacts.yaml")));
        assert!(opt.sdl);
        assert!(!opt.schema);
        assert!(!opt.version);
    }
}
