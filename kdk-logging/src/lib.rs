//! Structured logging setup for kdk.
//!
//! Configured from the environment:
//! - `LOG_LEVEL` (default `warn`, or `debug` with `--debug`)
//! - `LOG_OUTPUT`: `console` | `file` | `both`
//! - `LOG_FORMAT`: `human` | `json`
//! - `LOG_TAGS`: `key:value` pairs, comma separated, matched against span fields
//! - `LOG_FILE_PATH` (default `/tmp/kdk.log`, rolled daily)
//!
//! Console logs go to stderr so they never mix with command output.

use std::{
    collections::HashMap,
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{field::Visit, span, Metadata, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::MakeWriter,
    layer::{Context, Layer},
    prelude::*,
    registry, EnvFilter,
};

// --- Writer duplicating every line to two sinks ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write_all(buf);
        let res_b = self.b.write_all(buf);
        res_a.or(res_b).map(|_| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a>,
    B: MakeWriter<'a>,
{
    type Writer = Tee<A::Writer, B::Writer>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

// --- Tag-based filtering ---
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

struct TagFilterLayer {
    filters: Vec<Tag>,
}

impl<S> Layer<S> for TagFilterLayer
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        span.extensions_mut().insert(fields);
    }

    fn enabled(&self, _meta: &Metadata<'_>, ctx: Context<'_, S>) -> bool {
        if self.filters.is_empty() {
            return true;
        }

        // With tags configured, events outside any span are dropped.
        let Some(scope) = ctx.current_span().id().and_then(|id| ctx.span_scope(id)) else {
            return false;
        };

        let mut all_fields = HashMap::new();
        for span_ref in scope {
            if let Some(fields) = span_ref.extensions().get::<HashMap<String, String>>() {
                for (k, v) in fields {
                    all_fields.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
        }

        self.filters.iter().all(|filter| {
            all_fields
                .get(&filter.key)
                .is_some_and(|value| filter.value == "*" || value.contains(&filter.value))
        })
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    Off,
}

/// Logging configuration resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub output: LogOutput,
    pub json: bool,
    pub tags: Vec<Tag>,
    pub file_path: PathBuf,
}

impl LogSettings {
    pub fn from_env(debug: bool) -> Self {
        let default_level = if debug { "debug" } else { "warn" };
        let level = if debug {
            default_level.to_string()
        } else {
            env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string())
        };

        let output = match env::var("LOG_OUTPUT").as_deref() {
            Ok("file") => LogOutput::File,
            Ok("both") => LogOutput::Both,
            Ok("off") | Ok("none") => LogOutput::Off,
            _ => LogOutput::Console,
        };

        Self {
            level,
            output,
            json: env::var("LOG_FORMAT").is_ok_and(|f| f == "json"),
            tags: parse_tags(&env::var("LOG_TAGS").unwrap_or_default()),
            file_path: env::var("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/kdk.log")),
        }
    }
}

/// Parses `key:value,key2:value2`; malformed entries are ignored.
pub fn parse_tags(raw: &str) -> Vec<Tag> {
    raw.split(',')
        .filter_map(|s| {
            let (key, value) = s.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(Tag {
                key: key.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

/// Initializes the global tracing subscriber.
///
/// Keep the returned guard alive for the life of the process when file
/// output is enabled, or buffered lines are lost.
pub fn init_subscriber(debug: bool) -> Option<WorkerGuard> {
    let settings = LogSettings::from_env(debug);

    let mut env_filter = if debug {
        EnvFilter::new(&settings.level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
    };
    for noisy in ["reqwest=warn", "hyper=warn", "rustls=warn"] {
        if let Ok(directive) = noisy.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    let subscriber = registry().with(env_filter).with(TagFilterLayer {
        filters: settings.tags.clone(),
    });

    let log_dir = settings
        .file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("/tmp"))
        .to_path_buf();
    let log_filename = settings
        .file_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "kdk.log".into());

    let mut guard: Option<WorkerGuard> = None;
    let mut file_writer = || {
        let appender = tracing_appender::rolling::daily(&log_dir, &log_filename);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);
        non_blocking
    };

    let result = match settings.output {
        LogOutput::Both => {
            let writer = MakeTee {
                make_a: std::io::stderr,
                make_b: file_writer(),
            };
            let fmt_layer = tracing_subscriber::fmt::layer().with_writer(writer);
            if settings.json {
                subscriber.with(fmt_layer.json()).try_init()
            } else {
                subscriber.with(fmt_layer.compact()).try_init()
            }
        }
        LogOutput::Console => {
            let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if settings.json {
                subscriber.with(fmt_layer.json()).try_init()
            } else {
                subscriber.with(fmt_layer.compact()).try_init()
            }
        }
        LogOutput::File => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer());
            if settings.json {
                subscriber.with(fmt_layer.json()).try_init()
            } else {
                subscriber.with(fmt_layer).try_init()
            }
        }
        LogOutput::Off => subscriber.try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {e}");
    }

    guard
}
