pub fn level_filter(log_level: &str) -> log::LevelFilter {
    match log_level {
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Off,
    }
}

pub fn builder(log_level: &str) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level_filter(log_level));
    builder
}

pub fn setup_logger(config: &super::config::Config) {
    builder(&config.log_level).init();
}
