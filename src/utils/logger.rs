use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "gs_tools=debug,info"
    } else {
        "gs_tools=info"
    }
}

/// Logs go to stderr; stdout carries the report and the prompts.
pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    // 測試或嵌入時可能已有全域 subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init();
}
