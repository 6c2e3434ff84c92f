//! Logging setup for binaries and tests built on the OBEX crates.
//!
//! The codec itself only ever talks to the `log` facade; this crate installs the backend.

/// Level used when `RUST_LOG` isn't set.  Refused encodes and corrupt packets log at warn.
pub const DEFAULT_FILTER: &str = "warn";

/// Log to stderr, filtered by `RUST_LOG`.
///
/// If called multiple times in the same process, only applies once.
pub fn log_to_stderr() {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        let res = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
            .format(|buf, record| {
                use std::io::Write;

                let now = time::OffsetDateTime::now_utc();

                writeln!(
                    buf,
                    "{} {} time={} target={}",
                    record.level(),
                    record.args(),
                    now,
                    record.target()
                )
            })
            .try_init();

        if let Err(e) = res {
            log::debug!("A logger was already installed: {}", e);
        }
    });
}
