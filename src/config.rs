//! Per-thread configuration for the condition system.
//!
//! Configuration decides two things: where diagnostics are written and what
//! happens after a fatal signal resolution failure. Each thread carries its
//! own [`ConditionConfig`]; threads that never call
//! [`configure`](crate::cx::configure) use the defaults.
//!
//! # Sources
//!
//! [`ConfigLoader`] layers, lowest precedence first:
//!
//! 1. [`ConditionConfig::default`] (or an explicit base)
//! 2. a TOML file (requires the `config-file` feature)
//! 3. environment variables
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `CONDITIO_FATAL_ACTION` | `exit` / `panic` | `exit` |
//! | `CONDITIO_EXIT_CODE` | any `i32` | `1` |
//! | `CONDITIO_DIAGNOSTICS` | `stderr` / `stdout` | `stderr` |
//!
//! The TOML file uses the same keys in lowercase without the prefix:
//!
//! ```toml
//! fatal_action = "panic"
//! exit_code = 3
//! diagnostics = "stdout"
//! ```

use crate::diagnostics::DiagnosticSink;
#[cfg(feature = "config-file")]
use std::path::{Path, PathBuf};

/// Environment variable selecting the [`FatalAction`].
pub const ENV_FATAL_ACTION: &str = "CONDITIO_FATAL_ACTION";
/// Environment variable selecting the exit code for [`FatalAction::Exit`].
pub const ENV_EXIT_CODE: &str = "CONDITIO_EXIT_CODE";
/// Environment variable selecting the diagnostic stream.
pub const ENV_DIAGNOSTICS: &str = "CONDITIO_DIAGNOSTICS";

/// Exit code used when none is configured.
pub const DEFAULT_EXIT_CODE: i32 = 1;

/// What to do once a fatal error has been rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FatalAction {
    /// Terminate the process with the given exit code.
    Exit(i32),
    /// Unwind the current thread with the [`Error`](crate::Error) as the
    /// panic payload.
    Panic,
}

impl Default for FatalAction {
    fn default() -> Self {
        Self::Exit(DEFAULT_EXIT_CODE)
    }
}

/// Configuration for one thread's condition system.
#[derive(Debug, Clone, Default)]
pub struct ConditionConfig {
    fatal_action: FatalAction,
    sink: DiagnosticSink,
}

impl ConditionConfig {
    /// Creates the default configuration: diagnostics to stderr, exit code 1
    /// on fatal errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fatal action.
    #[must_use]
    pub fn with_fatal_action(mut self, action: FatalAction) -> Self {
        self.fatal_action = action;
        self
    }

    /// Sets the diagnostic sink.
    #[must_use]
    pub fn with_sink(mut self, sink: DiagnosticSink) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the fatal action.
    #[must_use]
    pub const fn fatal_action(&self) -> FatalAction {
        self.fatal_action
    }

    /// Returns the diagnostic sink.
    #[must_use]
    pub const fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// Loads the default configuration with overrides from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable holds an
    /// unrecognised value.
    pub fn from_env() -> Result<Self, ConfigError> {
        ConfigLoader::new().process_env().load()
    }
}

/// Settings being layered by [`ConfigLoader`].
///
/// The exit code is kept apart from the action so that a code set while the
/// action is `panic` still applies if a later layer switches back to `exit`.
#[derive(Debug)]
struct Layered {
    panic: bool,
    exit_code: i32,
    sink: DiagnosticSink,
}

impl Layered {
    fn from_base(base: ConditionConfig) -> Self {
        let (panic, exit_code) = match base.fatal_action {
            FatalAction::Exit(code) => (false, code),
            FatalAction::Panic => (true, DEFAULT_EXIT_CODE),
        };
        Self {
            panic,
            exit_code,
            sink: base.sink,
        }
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            ENV_FATAL_ACTION => {
                self.panic = match value.trim().to_ascii_lowercase().as_str() {
                    "exit" => false,
                    "panic" => true,
                    _ => return Err(invalid()),
                };
            }
            ENV_EXIT_CODE => {
                self.exit_code = value.trim().parse::<i32>().map_err(|_| invalid())?;
            }
            ENV_DIAGNOSTICS => {
                self.sink = match value.trim().to_ascii_lowercase().as_str() {
                    "stderr" => DiagnosticSink::Stderr,
                    "stdout" => DiagnosticSink::Stdout,
                    _ => return Err(invalid()),
                };
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> ConditionConfig {
        let fatal_action = if self.panic {
            FatalAction::Panic
        } else {
            FatalAction::Exit(self.exit_code)
        };
        ConditionConfig {
            fatal_action,
            sink: self.sink,
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A setting holds a value that is not recognised.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// The setting name.
        key: String,
        /// The rejected value.
        value: String,
    },
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {message}")]
    Io {
        /// The file path.
        path: String,
        /// The underlying I/O error.
        message: String,
    },
    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config file {path}: {message}")]
    Parse {
        /// The file path.
        path: String,
        /// The parser's message.
        message: String,
    },
}

#[cfg(feature = "config-file")]
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    fatal_action: Option<String>,
    exit_code: Option<i32>,
    diagnostics: Option<String>,
}

/// Layered configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    base: ConditionConfig,
    #[cfg(feature = "config-file")]
    file: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl ConfigLoader {
    /// Creates a loader starting from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the base configuration.
    #[must_use]
    pub fn base(mut self, base: ConditionConfig) -> Self {
        self.base = base;
        self
    }

    /// Reads settings from a TOML file.
    #[cfg(feature = "config-file")]
    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds environment-style overrides from an explicit iterator.
    #[must_use]
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds the `CONDITIO_*` variables from the process environment.
    #[must_use]
    pub fn process_env(self) -> Self {
        let vars: Vec<(String, String)> = std::env::vars()
            .filter(|(key, _)| key.starts_with("CONDITIO_"))
            .collect();
        self.env_vars(vars)
    }

    /// Resolves the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or if
    /// any setting holds an unrecognised value.
    pub fn load(self) -> Result<ConditionConfig, ConfigError> {
        let mut layered = Layered::from_base(self.base);

        #[cfg(feature = "config-file")]
        if let Some(path) = &self.file {
            apply_file(&mut layered, path)?;
        }

        for (key, value) in &self.env {
            layered.apply(key, value)?;
        }
        Ok(layered.finish())
    }
}

#[cfg(feature = "config-file")]
fn apply_file(layered: &mut Layered, path: &Path) -> Result<(), ConfigError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: display.clone(),
        message: err.to_string(),
    })?;
    let file: FileConfig = toml::from_str(&text).map_err(|err| ConfigError::Parse {
        path: display,
        message: err.to_string(),
    })?;
    if let Some(action) = &file.fatal_action {
        layered.apply(ENV_FATAL_ACTION, action)?;
    }
    if let Some(code) = file.exit_code {
        layered.apply(ENV_EXIT_CODE, &code.to_string())?;
    }
    if let Some(diagnostics) = &file.diagnostics {
        layered.apply(ENV_DIAGNOSTICS, diagnostics)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;

    fn init_test(name: &str) {
        init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn defaults() {
        init_test("defaults");
        let config = ConditionConfig::default();
        assert_eq!(config.fatal_action(), FatalAction::Exit(1));
        assert!(matches!(config.sink(), DiagnosticSink::Stderr));
        crate::test_complete!("defaults");
    }

    #[test]
    fn env_overrides_apply() {
        init_test("env_overrides_apply");
        let config = ConfigLoader::new()
            .env_vars([
                (ENV_EXIT_CODE, "7"),
                (ENV_DIAGNOSTICS, "STDOUT"),
                ("UNRELATED", "ignored"),
            ])
            .load()
            .unwrap();
        assert_eq!(config.fatal_action(), FatalAction::Exit(7));
        assert!(matches!(config.sink(), DiagnosticSink::Stdout));
        crate::test_complete!("env_overrides_apply");
    }

    #[test]
    fn panic_action_from_env() {
        init_test("panic_action_from_env");
        let config = ConfigLoader::new()
            .env_vars([(ENV_FATAL_ACTION, "panic"), (ENV_EXIT_CODE, "9")])
            .load()
            .unwrap();
        assert_eq!(config.fatal_action(), FatalAction::Panic);
        crate::test_complete!("panic_action_from_env");
    }

    #[test]
    fn exit_code_survives_explicit_exit_action() {
        init_test("exit_code_survives_explicit_exit_action");
        let config = ConfigLoader::new()
            .env_vars([(ENV_EXIT_CODE, "4"), (ENV_FATAL_ACTION, "exit")])
            .load()
            .unwrap();
        assert_eq!(config.fatal_action(), FatalAction::Exit(4));
        crate::test_complete!("exit_code_survives_explicit_exit_action");
    }

    #[test]
    fn exit_code_set_under_panic_survives_switch_back_to_exit() {
        init_test("exit_code_set_under_panic_survives_switch_back_to_exit");
        let config = ConfigLoader::new()
            .base(ConditionConfig::new().with_fatal_action(FatalAction::Panic))
            .env_vars([(ENV_EXIT_CODE, "3"), (ENV_FATAL_ACTION, "exit")])
            .load()
            .unwrap();
        crate::assert_with_log!(
            config.fatal_action() == FatalAction::Exit(3),
            "exit code kept across the action switch",
            FatalAction::Exit(3),
            config.fatal_action()
        );

        let config = ConfigLoader::new()
            .env_vars([(ENV_FATAL_ACTION, "panic"), (ENV_EXIT_CODE, "5")])
            .load()
            .unwrap();
        assert_eq!(config.fatal_action(), FatalAction::Panic);
        crate::test_complete!("exit_code_set_under_panic_survives_switch_back_to_exit");
    }

    #[test]
    fn invalid_values_are_rejected() {
        init_test("invalid_values_are_rejected");
        let err = ConfigLoader::new()
            .env_vars([(ENV_FATAL_ACTION, "explode")])
            .load()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_FATAL_ACTION.to_string(),
                value: "explode".to_string(),
            }
        );
        let err = ConfigLoader::new()
            .env_vars([(ENV_EXIT_CODE, "one")])
            .load()
            .unwrap_err();
        assert!(err.to_string().contains(ENV_EXIT_CODE));
        crate::test_complete!("invalid_values_are_rejected");
    }

    #[test]
    fn base_is_respected() {
        init_test("base_is_respected");
        let config = ConfigLoader::new()
            .base(ConditionConfig::new().with_fatal_action(FatalAction::Panic))
            .load()
            .unwrap();
        assert_eq!(config.fatal_action(), FatalAction::Panic);
        crate::test_complete!("base_is_respected");
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn file_then_env_precedence() {
        use std::io::Write;

        init_test("file_then_env_precedence");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fatal_action = \"exit\"\nexit_code = 3\ndiagnostics = \"stdout\"").unwrap();

        let config = ConfigLoader::new().file(file.path()).load().unwrap();
        assert_eq!(config.fatal_action(), FatalAction::Exit(3));
        assert!(matches!(config.sink(), DiagnosticSink::Stdout));

        let config = ConfigLoader::new()
            .file(file.path())
            .env_vars([(ENV_DIAGNOSTICS, "stderr")])
            .load()
            .unwrap();
        assert!(matches!(config.sink(), DiagnosticSink::Stderr));
        crate::test_complete!("file_then_env_precedence");
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn file_exit_code_applies_when_env_selects_exit() {
        use std::io::Write;

        init_test("file_exit_code_applies_when_env_selects_exit");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fatal_action = \"panic\"\nexit_code = 3").unwrap();

        let config = ConfigLoader::new()
            .file(file.path())
            .env_vars([(ENV_FATAL_ACTION, "exit")])
            .load()
            .unwrap();
        assert_eq!(config.fatal_action(), FatalAction::Exit(3));
        crate::test_complete!("file_exit_code_applies_when_env_selects_exit");
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn unknown_file_keys_are_parse_errors() {
        use std::io::Write;

        init_test("unknown_file_keys_are_parse_errors");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "verbosity = 3").unwrap();
        let err = ConfigLoader::new().file(file.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
        crate::test_complete!("unknown_file_keys_are_parse_errors");
    }
}
