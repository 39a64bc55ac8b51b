use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    filter::FilterFn, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Install the diagnostic logger, writing to stderr.
///
/// Only events from this crate and from `lettre` are shown.
pub fn init(level: LevelFilter) {
    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_timer(
                    tracing_subscriber::fmt::time::ChronoLocal::rfc_3339(),
                )
                .with_filter(level)
                .with_filter(FilterFn::new(|metadata| {
                    metadata.target().starts_with("smtp_test_tool")
                        || metadata.target().starts_with("lettre")
                })),
        )
        .init();
}
