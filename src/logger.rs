use chrono::Utc;
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Initialise the logger with UTC ISO8601 timestamps, writing to stderr.
/// `configured` is the level from the config file; `RUST_LOG` still wins.
pub fn init_logger(debug: bool, configured: Option<&str>) {
    builder(debug, configured).init();
}

fn builder(debug: bool, configured: Option<&str>) -> Builder {
    let filter_level = resolve_level(debug, configured).to_string();

    let mut builder = Builder::from_env(Env::default().default_filter_or(filter_level));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{} {} {}] {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder
}

/// --debug never lowers a more verbose configured level.
fn resolve_level(debug: bool, configured: Option<&str>) -> LevelFilter {
    let level = configured
        .map(|level| level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info))
        .unwrap_or(LevelFilter::Info);
    if debug {
        level.max(LevelFilter::Debug)
    } else {
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level(false, None), LevelFilter::Info);
        assert_eq!(resolve_level(false, Some("WARN")), LevelFilter::Warn);
        assert_eq!(resolve_level(false, Some("nonsense")), LevelFilter::Info);
        assert_eq!(resolve_level(true, Some("warn")), LevelFilter::Debug);
        assert_eq!(resolve_level(true, Some("trace")), LevelFilter::Trace);
    }

    #[test]
    fn test_configured_level_reaches_the_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(builder(false, Some("debug")).build().filter(), LevelFilter::Debug);
        assert_eq!(builder(false, Some("trace")).build().filter(), LevelFilter::Trace);
        assert_eq!(builder(false, None).build().filter(), LevelFilter::Info);
    }
}
