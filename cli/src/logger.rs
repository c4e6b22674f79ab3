use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use std::sync::OnceLock;
use std::time::Duration;

/// Log setup shared by all commands
///
/// Logs are written through the progress bars, so they don't break the spinner
/// shown while a stack is being observed.
pub struct Logger {
    multi_progress: MultiProgress,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

impl<'a> Logger {
    /// Initialize once, later calls return the existing logger
    ///
    /// No logs are shown by default, only human-friendly messages.
    /// `--verbose` turns on debug logs of this tool but not of the AWS SDK,
    /// RUST_LOG overrides both.
    pub fn init(verbose: bool) -> &'a Self {
        LOGGER.get_or_init(|| {
            let filter = if verbose {
                "stackformation=debug,stackformation_engine=debug"
            } else {
                "off"
            };

            let logger = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(filter),
            )
            .format_timestamp(None)
            .build();

            let level = logger.filter();
            let multi_progress = MultiProgress::new();

            if let Err(e) = LogWrapper::new(multi_progress.clone(), logger).try_init() {
                eprintln!("Failed to initialize logger: {e}");
            }

            log::set_max_level(level);
            Self { multi_progress }
        })
    }

    pub fn multi_progress() -> &'a MultiProgress {
        &Self::init(false).multi_progress
    }

    /// Spinner with a message, printed lines go above it
    pub fn spinner(message: &str) -> ProgressBar {
        let spinner = Self::multi_progress().add(ProgressBar::new_spinner());

        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {wide_msg:.dim}") {
            spinner.set_style(style);
        }

        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }
}
