//! Logging config and subscriber setup
//!
//! Stdout carries the MCP protocol, so log lines go to stderr unless a log
//! directory is configured.

mod defaults;
mod format_style;
mod log_rotation_kind;
mod parsers;

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub use format_style::FormatStyle;
pub use log_rotation_kind::LogRotationKind;

const LOG_FILE_PREFIX: &str = "shopify_mcp_server";

/// A formatting layer over the bare registry
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging related options
#[derive(Debug, Deserialize, JsonSchema)]
pub struct Logging {
    /// The log level to use for tracing
    #[serde(
        default = "defaults::log_level",
        deserialize_with = "parsers::from_str"
    )]
    #[schemars(schema_with = "level")]
    pub level: Level,

    /// Directory to write rotating log files to. Logs go to stderr when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Log file rotation period, used only with `path`
    #[serde(default = "defaults::rotation")]
    pub rotation: LogRotationKind,

    #[serde(default)]
    pub format: FormatStyle,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            path: None,
            rotation: defaults::rotation(),
            format: FormatStyle::default(),
        }
    }
}

impl Logging {
    /// Install the global subscriber.
    ///
    /// File output is written on a background worker; the returned guard must
    /// be held until shutdown so buffered lines are flushed.
    pub fn init(&self) -> Result<Option<WorkerGuard>, anyhow::Error> {
        let (writer, guard, ansi) = self.writer();
        let layer = self.fmt_layer(writer, ansi).with_filter(self.env_filter()?);

        tracing_subscriber::registry().with(layer).try_init()?;
        Ok(guard)
    }

    /// The configured level, refined by `RUST_LOG`
    pub fn env_filter(&self) -> Result<EnvFilter, anyhow::Error> {
        let mut filter = EnvFilter::from_default_env().add_directive(self.level.into());

        if self.level == Level::INFO {
            filter = filter.add_directive("rmcp=warn".parse()?);
        }
        Ok(filter)
    }

    pub fn fmt_layer<W>(&self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false);

        match self.format {
            FormatStyle::Full => layer.boxed(),
            FormatStyle::Compact => layer.compact().boxed(),
            FormatStyle::Json => layer.json().boxed(),
            FormatStyle::Pretty => layer.pretty().boxed(),
        }
    }

    fn writer(&self) -> (BoxMakeWriter, Option<WorkerGuard>, bool) {
        let Some(path) = &self.path else {
            return (BoxMakeWriter::new(std::io::stderr), None, true);
        };

        let appender = std::fs::create_dir_all(path)
            .map_err(anyhow::Error::from)
            .and_then(|()| {
                RollingFileAppender::builder()
                    .rotation(self.rotation.into())
                    .filename_prefix(LOG_FILE_PREFIX)
                    .filename_suffix("log")
                    .build(path)
                    .map_err(anyhow::Error::from)
            });

        match appender {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                (BoxMakeWriter::new(writer), Some(guard), false)
            }
            Err(e) => {
                eprintln!("Failed to set up log file in {}: {e}; logging to stderr", path.display());
                (BoxMakeWriter::new(std::io::stderr), None, true)
            }
        }
    }
}

fn level(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
    /// Log level
    #[derive(JsonSchema)]
    #[schemars(rename_all = "lowercase")]
    #[allow(dead_code)]
    enum Level {
        Trace,
        Debug,
        Info,
        Warn,
        Error,
    }

    Level::json_schema(generator)
}
