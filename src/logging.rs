use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize the logger with elapsed-time stamps.
///
/// Verbose sets the level to Info, otherwise Warn. `RUST_LOG` still applies
/// on top (e.g. `RUST_LOG=ipcount=debug` for per-chunk detail).
/// Output format: [HH:MM:SS] LEVEL: message, on stderr.
pub fn init_logger(verbose: bool) {
    START_TIME.get_or_init(Instant::now);

    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let elapsed = START_TIME.get().map(Instant::elapsed).unwrap_or_default();
            let hours = elapsed.as_secs() / 3600;
            let minutes = (elapsed.as_secs() % 3600) / 60;
            let seconds = elapsed.as_secs() % 60;

            writeln!(
                buf,
                "[{:02}:{:02}:{:02}] {}: {}",
                hours,
                minutes,
                seconds,
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
