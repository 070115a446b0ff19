use crate::logger::format::LoggerFormat;

/// Stream the text and json formats write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerTarget {
    /// Keeps stdout free for tools that print results.
    #[default]
    Stderr,
    Stdout,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directives, e.g. `info` or `lcp_core=debug,info`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
    pub target: LoggerTarget,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || atty::is(atty::Stream::Stderr);
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color,
            target: LoggerTarget::Stderr,
        }
    }
}

impl LoggerConfig {
    pub fn with_format(mut self, format: LoggerFormat) -> Self {
        if format != LoggerFormat::Text {
            self.use_color = false;
        }
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_target(mut self, target: LoggerTarget) -> Self {
        self.use_color = match target {
            LoggerTarget::Stderr => atty::is(atty::Stream::Stderr),
            LoggerTarget::Stdout => atty::is(atty::Stream::Stdout),
        } && self.format == LoggerFormat::Text;
        self.target = target;
        self
    }

    /// Level for a `-v` count: 0 info, 1 debug, 2 and more trace.
    ///
    /// Only the orchestrator crates get the louder level; dependencies stay at info.
    pub fn with_verbosity(self, verbose: u8) -> Self {
        match verbose {
            0 => self.with_level("info"),
            1 => self.with_level("info,lcp_core=debug,lcp_exec=debug,multitile=debug"),
            _ => self.with_level("info,lcp_core=trace,lcp_exec=trace,multitile=trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_text_on_stderr_at_info() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.target, LoggerTarget::Stderr);
        assert!(cfg.with_targets);
    }

    #[test]
    fn json_disables_color() {
        let cfg = LoggerConfig::default().with_format(LoggerFormat::Json);
        assert!(!cfg.use_color);
    }

    #[test]
    fn stdout_target_keeps_json_uncolored() {
        let cfg = LoggerConfig::default()
            .with_format(LoggerFormat::Json)
            .with_target(LoggerTarget::Stdout);
        assert_eq!(cfg.target, LoggerTarget::Stdout);
        assert!(!cfg.use_color);
    }

    #[test]
    fn verbosity_raises_only_own_crates() {
        assert_eq!(LoggerConfig::default().with_verbosity(0).level, "info");
        let debug = LoggerConfig::default().with_verbosity(1).level;
        assert!(debug.starts_with("info,"));
        assert!(debug.contains("lcp_core=debug"));
        assert!(LoggerConfig::default().with_verbosity(5).level.contains("lcp_core=trace"));
    }
}
