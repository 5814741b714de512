//! Env-gated trace output.
//!
//! The level is read once from `NODEOPS_TRACE` (`1` for basic, `full` for
//! everything).
use std::env;
use std::fmt::Arguments;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Verbosity of the trace output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLevel {
    Off,
    Basic,
    Full,
}

const TRACE_ENV: &str = "NODEOPS_TRACE";

const COLOR_WARNING: &str = "33";
const COLOR_ERROR: &str = "91";
const COLOR_CRITICAL: &str = "31";
const COLOR_TRACE: &str = "34";

static TRACE_LEVEL: OnceLock<TraceLevel> = OnceLock::new();

impl TraceLevel {
    fn parse(value: &str) -> TraceLevel {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "basic" => TraceLevel::Basic,
            "full" => TraceLevel::Full,
            _ => TraceLevel::Off,
        }
    }
}

/// Current trace level.
pub fn trace_level() -> TraceLevel {
    *TRACE_LEVEL.get_or_init(|| {
        env::var(TRACE_ENV)
            .ok()
            .as_deref()
            .map(TraceLevel::parse)
            .unwrap_or(TraceLevel::Off)
    })
}

fn full_enabled() -> bool {
    matches!(trace_level(), TraceLevel::Full)
}

fn basic_enabled() -> bool {
    matches!(trace_level(), TraceLevel::Full | TraceLevel::Basic)
}

fn timestamp_hms() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3_600,
        (secs % 3_600) / 60,
        secs % 60
    )
}

fn emit(kind: &str, color: &str, args: Arguments) {
    let ts = timestamp_hms();
    eprintln!("{ts} [\u{001b}[{color}m{kind}\u{001b}[0m] -- {args}");
}

/// Emit a warning message at full trace level.
pub fn emit_warning(args: Arguments) {
    if full_enabled() {
        emit("WARNING", COLOR_WARNING, args);
    }
}

/// Emit an error message at basic trace level or above.
pub fn emit_error(args: Arguments) {
    if basic_enabled() {
        emit("ERROR", COLOR_ERROR, args);
    }
}

/// Emit a critical message unconditionally.
pub fn emit_critical(args: Arguments) {
    emit("CRITICAL", COLOR_CRITICAL, args);
}

/// Emit a trace message at basic trace level or above.
pub fn emit_trace(args: Arguments) {
    if basic_enabled() {
        emit("TRACE", COLOR_TRACE, args);
    }
}

#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {
        $crate::logging::emit_warning(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logging::emit_error(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! critical {
    ($($arg:tt)*) => {
        $crate::logging::emit_critical(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::logging::emit_trace(format_args!($($arg)*))
    };
}
