use std::fmt::{self as stdfmt, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pr_config::{LogFormat, LoggingConfig};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::DefaultFields;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormattedFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::{LookupSpan, Registry};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialise the `tracing` subscriber stack from [`LoggingConfig`].
///
/// Events go to stderr and, when `logging.file` is set, to that file as
/// well. The returned [`WorkerGuard`] flushes the file writer on drop and
/// must be held until the process exits.
///
/// `RUST_LOG`, when set, replaces the configured directives.
pub fn init_tracing(config: &LoggingConfig, base_dir: &Path) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<BoxedLayer> = vec![
        console_layer(config.format)
            .with_filter(build_filter(config)?)
            .boxed(),
    ];

    let mut guard = None;
    if let Some(file) = &config.file {
        let (writer, file_guard) = file_writer(&resolve_path(file, base_dir))?;
        guard = Some(file_guard);
        layers.push(
            file_layer(config.format, writer)
                .with_filter(build_filter(config)?)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).init();
    Ok(guard)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if std::env::var("RUST_LOG").is_ok() {
        return Ok(EnvFilter::from_default_env());
    }
    let mut directives = config.level.clone();
    let mut modules: Vec<_> = config.modules.iter().collect();
    modules.sort();
    for (module, level) in modules {
        write!(directives, ",{module}={level}").ok();
    }
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))
}

fn resolve_path(file: &Path, base_dir: &Path) -> PathBuf {
    if file.is_relative() {
        base_dir.join(file)
    } else {
        file.to_path_buf()
    }
}

fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("log file path has no parent directory"))?;
    let name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log file path has no file name"))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, name);
    Ok(tracing_appender::non_blocking(appender))
}

fn console_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Plain => fmt::layer()
            .event_format(DomainFormat)
            .with_writer(std::io::stderr)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, writer: NonBlocking) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .fmt_fields(FileFields::default())
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Plain => fmt::layer()
            .event_format(DomainFormat)
            .fmt_fields(FileFields::default())
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
    }
}

// ---------------------------------------------------------------------------
// FileFields
// ---------------------------------------------------------------------------

/// Distinct field formatter type so the file layer caches its own (ANSI-free)
/// span fields instead of reusing the console layer's.
#[derive(Default)]
struct FileFields(DefaultFields);

impl<'writer> fmt::FormatFields<'writer> for FileFields {
    fn format_fields<R: tracing_subscriber::field::RecordFields>(
        &self,
        writer: fmt::format::Writer<'writer>,
        fields: R,
    ) -> stdfmt::Result {
        self.0.format_fields(writer, fields)
    }
}

// ---------------------------------------------------------------------------
// DomainFormat
// ---------------------------------------------------------------------------

/// Plain formatter that lifts the `domain` field into a `[domain]` prefix:
///
/// ```text
/// 2026-10-18T09:12:01Z  INFO [sys] workspace loaded records=120 files=2
/// ```
struct DomainFormat;

impl<S, N> FormatEvent<S, N> for DomainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> fmt::FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let ansi = writer.has_ansi_escapes();
        let paint = |code: &str, text: &dyn stdfmt::Display| {
            if ansi {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text.to_string()
            }
        };

        let mut stamp = String::new();
        if SystemTime
            .format_time(&mut fmt::format::Writer::new(&mut stamp))
            .is_err()
        {
            stamp.push_str("<unknown time>");
        }
        write!(writer, "{}", paint("2", &stamp))?;

        let level = *event.metadata().level();
        let color = match level {
            Level::ERROR => "31",
            Level::WARN => "33",
            Level::INFO => "32",
            Level::DEBUG => "34",
            Level::TRACE => "35",
        };
        write!(writer, " {} ", paint(color, &format_args!("{level:>5}")))?;

        let mut fields = EventFields::default();
        event.record(&mut fields);

        if let Some(domain) = &fields.domain {
            write!(writer, "{} ", paint("1;36", &format_args!("[{domain}]")))?;
        }

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}{{", paint("1", &span.name()))?;
                if let Some(cached) = span.extensions().get::<FormattedFields<N>>()
                    && !cached.is_empty()
                {
                    write!(writer, "{cached}")?;
                }
                write!(writer, "}}: ")?;
            }
        }

        write!(writer, "{}", fields.message)?;
        if !fields.rest.is_empty() {
            write!(writer, " {}", paint("3", &fields.rest))?;
        }
        writeln!(writer)
    }
}

/// Splits an event into its domain, message and remaining `key=value` pairs.
#[derive(Default)]
struct EventFields {
    domain: Option<String>,
    message: String,
    rest: String,
}

impl EventFields {
    fn push(&mut self, name: &str, value: &dyn stdfmt::Display) {
        if !self.rest.is_empty() {
            self.rest.push(' ');
        }
        write!(self.rest, "{name}={value}").ok();
    }
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => self.push(name, &format_args!("{value:?}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "domain" => self.domain = Some(format!("{value:?}").trim_matches('"').to_string()),
            "message" => {
                write!(self.message, "{value:?}").ok();
            }
            name => self.push(name, &format_args!("{value:?}")),
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field.name(), &value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field.name(), &value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field.name(), &value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field.name(), &value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_directives_are_included() {
        let mut config = LoggingConfig::default();
        config.level = "warn".into();
        config.modules.insert("pr_runtime".into(), "debug".into());
        config.modules.insert("pr_core".into(), "trace".into());
        // Only exercised when RUST_LOG is unset in the test environment.
        if std::env::var("RUST_LOG").is_err() {
            let filter = build_filter(&config).unwrap();
            let rendered = filter.to_string();
            assert!(rendered.contains("pr_runtime=debug"));
            assert!(rendered.contains("pr_core=trace"));
        }
    }

    #[test]
    fn bad_level_is_rejected() {
        let mut config = LoggingConfig::default();
        config.level = "pr_runtime=loud".into();
        if std::env::var("RUST_LOG").is_err() {
            assert!(build_filter(&config).is_err());
        }
    }

    #[test]
    fn relative_log_file_resolves_against_base() {
        let base = Path::new("/srv/payroll");
        assert_eq!(
            resolve_path(Path::new("logs/run.log"), base),
            PathBuf::from("/srv/payroll/logs/run.log")
        );
        assert_eq!(
            resolve_path(Path::new("/var/log/run.log"), base),
            PathBuf::from("/var/log/run.log")
        );
    }
}
