//! Server settings read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `APIPROBE_LISTEN` | `0.0.0.0:8080` |
//! | `APIPROBE_WORKER_THREADS` | available parallelism |
//! | `APIPROBE_BLOCKING_DELAY_MS` | `100` |
//! | `APIPROBE_SLOW_DELAY_MS` | `2000` |
//! | `APIPROBE_LOG_FORMAT` | `text` (`text` or `json`) |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::env::Env;
use crate::error::Error;

pub const LISTEN: &str = "APIPROBE_LISTEN";
pub const WORKER_THREADS: &str = "APIPROBE_WORKER_THREADS";
pub const BLOCKING_DELAY_MS: &str = "APIPROBE_BLOCKING_DELAY_MS";
pub const SLOW_DELAY_MS: &str = "APIPROBE_SLOW_DELAY_MS";
pub const LOG_FORMAT: &str = "APIPROBE_LOG_FORMAT";

/// How the binary renders log records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// Delays applied by the two simulated-latency endpoints.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Delays {
    /// Worker-blocking sleep in `POST /api/users`.
    pub blocking: Duration,
    /// Scheduler-yielding sleep in `GET /api/slow`.
    pub slow: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            blocking: Duration::from_millis(100),
            slow: Duration::from_millis(2000),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub listen: SocketAddr,
    pub worker_threads: usize,
    pub delays: Delays,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env(env: &Env) -> Result<Self, Error> {
        let defaults = Delays::default();

        let listen = parse_or(env, LISTEN, || SocketAddr::from(([0, 0, 0, 0], 8080)))?;
        let worker_threads = parse_or(env, WORKER_THREADS, default_worker_threads)?;
        if worker_threads == 0 {
            return Err(Error::config(WORKER_THREADS, "must be at least 1"));
        }
        let blocking = parse_or(env, BLOCKING_DELAY_MS, || defaults.blocking.as_millis() as u64)?;
        let slow = parse_or(env, SLOW_DELAY_MS, || defaults.slow.as_millis() as u64)?;
        let log_format = parse_or(env, LOG_FORMAT, LogFormat::default)?;

        Ok(Self {
            listen,
            worker_threads,
            delays: Delays {
                blocking: Duration::from_millis(blocking),
                slow: Duration::from_millis(slow),
            },
            log_format,
        })
    }
}

fn default_worker_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn parse_or<T>(env: &Env, key: &'static str, default: impl FnOnce() -> T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| Error::config(key, format!("`{raw}`: {e}"))),
        None => Ok(default()),
    }
}
