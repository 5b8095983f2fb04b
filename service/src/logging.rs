use crate::config::Config;
use log::LevelFilter;
use simplelog::{self, ConfigBuilder};

/// Dependency modules whose logs are hidden unless running at Trace level.
/// WebSocket frame handling in particular logs every ping and pong.
const FILTERED_MODULES: &[&str] = &["tower", "hyper", "axum", "tungstenite", "tokio_tungstenite"];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger described by `config`.
    ///
    /// Fails if a global logger has already been installed.
    pub fn init_logger(config: &Config) -> Result<(), log::SetLoggerError> {
        let apply_filters = config.log_level_filter != LevelFilter::Trace;

        simplelog::TermLogger::init(
            Self::convert_level_filter(config.log_level_filter),
            Self::build_log_config(apply_filters),
            simplelog::TerminalMode::Mixed,
            Self::color_choice(config),
        )
    }

    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    // Production output usually ends up in a log collector, not a terminal.
    fn color_choice(config: &Config) -> simplelog::ColorChoice {
        if config.is_production() {
            simplelog::ColorChoice::Never
        } else {
            simplelog::ColorChoice::Auto
        }
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
