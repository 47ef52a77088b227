use log::{LevelFilter, Log, Metadata, Record};

/// Fans every record out to several loggers.
pub struct MultiLogger {
    loggers: Vec<Box<dyn Log>>,
    target_filters: Vec<(String, LevelFilter)>,
}

impl Default for MultiLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiLogger {
    pub fn new() -> Self {
        Self {
            loggers: Vec::new(),
            target_filters: Vec::new(),
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn Log>) -> Self {
        self.loggers.push(logger);
        self
    }

    /// Caps the level of records whose target starts with `target`, for all
    /// loggers.
    pub fn with_target_filter(mut self, target: impl Into<String>, max_level: LevelFilter) -> Self {
        self.target_filters.push((target.into(), max_level));
        self
    }

    pub fn add_logger(&mut self, logger: Box<dyn Log>) {
        self.loggers.push(logger);
    }

    /// Installs this logger as the global one. Levels are left to the
    /// individual loggers.
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        log::set_max_level(LevelFilter::Trace);
        log::set_boxed_logger(Box::new(self))
    }

    fn filtered(&self, metadata: &Metadata) -> bool {
        self.target_filters
            .iter()
            .any(|(target, max_level)| {
                metadata.target().starts_with(target.as_str()) && metadata.level() > *max_level
            })
    }
}

impl Log for MultiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        !self.filtered(metadata) && self.loggers.iter().any(|l| l.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        if self.filtered(record.metadata()) {
            return;
        }

        self.loggers
            .iter()
            .filter(|l| l.enabled(record.metadata()))
            .for_each(|l| l.log(record));
    }

    fn flush(&self) {
        self.loggers.iter().for_each(|l| l.flush());
    }
}
