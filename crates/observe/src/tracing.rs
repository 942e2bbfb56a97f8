use {
    std::io::IsTerminal,
    time::macros::format_description,
    tracing::level_filters::LevelFilter,
    tracing_subscriber::{
        fmt::{time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
        EnvFilter,
        Layer,
    },
};

/// Initializes tracing setup that is shared between the binaries.
/// `env_filter` has similar syntax to env_logger. It is documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
///
/// Events at least as severe as `stderr_threshold` go to stderr, everything
/// else to stdout.
pub fn initialize(env_filter: &str, stderr_threshold: LevelFilter) {
    let writer = std::io::stderr
        .with_max_level(
            stderr_threshold
                .into_level()
                .unwrap_or(tracing::Level::ERROR),
        )
        .or_else(std::io::stdout);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_timer(UtcTime::new(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        )))
        .with_ansi(std::io::stdout().is_terminal())
        .with_filter(EnvFilter::new(env_filter));

    tracing_subscriber::registry().with(fmt_layer).init();
    crate::panic_hook::install();
}
