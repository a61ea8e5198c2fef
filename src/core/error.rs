//! Error types for shipgate with contextual messages and exit codes
//!
//! Every error carries a category that decides the process exit code, and most
//! carry a help message pointing at the fix. Publish step failures keep the
//! exit code of the external command that failed.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for shipgate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, non-release tag)
  User,
  /// System error (git, I/O, missing tag history)
  System,
  /// Validation failure (bad outcome strings, invalid config values)
  Validation,
  /// The pipeline gate blocked the publish stage
  Blocked,
  /// Exit code of a failed external publish step, passed through unchanged
  Passthrough(i32),
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    match self {
      ExitCode::User => 1,
      ExitCode::System => 2,
      ExitCode::Validation => 3,
      ExitCode::Blocked => 4,
      ExitCode::Passthrough(code) => code,
    }
  }
}

/// Main error type for shipgate
#[derive(Debug)]
pub enum ShipError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Release stage errors (tag history, classification, publish steps)
  Release(ReleaseError),

  /// Pipeline gate errors
  Gate(GateError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Only generic messages accumulate context; categorized errors are kept
  /// intact so their exit code and help text survive propagation.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipError::Message { message, context, help } => ShipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ShipError::Io(err) => ShipError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ShipError::Config(ConfigError::Invalid { .. }) => ExitCode::Validation,
      ShipError::Config(_) => ExitCode::User,
      ShipError::Git(_) => ExitCode::System,
      ShipError::Release(e) => e.exit_code(),
      ShipError::Gate(GateError::Blocked { .. }) => ExitCode::Blocked,
      ShipError::Gate(GateError::InvalidOutcome { .. }) => ExitCode::Validation,
      ShipError::Io(_) => ExitCode::System,
      ShipError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipError::Config(e) => e.help_message(),
      ShipError::Git(e) => e.help_message(),
      ShipError::Release(e) => e.help_message(),
      ShipError::Gate(e) => e.help_message(),
      ShipError::Message { help, .. } => help.clone(),
      ShipError::Io(_) => None,
    }
  }
}

impl fmt::Display for ShipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipError::Config(e) => write!(f, "{}", e),
      ShipError::Git(e) => write!(f, "{}", e),
      ShipError::Release(e) => write!(f, "{}", e),
      ShipError::Gate(e) => write!(f, "{}", e),
      ShipError::Io(e) => write!(f, "I/O error: {}", e),
      ShipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipError {
  fn from(err: io::Error) -> Self {
    ShipError::Io(err)
  }
}

impl From<String> for ShipError {
  fn from(msg: String) -> Self {
    ShipError::message(msg)
  }
}

impl From<&str> for ShipError {
  fn from(msg: &str) -> Self {
    ShipError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ShipError {
  fn from(err: toml_edit::de::Error) -> Self {
    ShipError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ShipError {
  fn from(err: serde_json::Error) -> Self {
    ShipError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for ShipError {
  fn from(err: glob::PatternError) -> Self {
    ShipError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<ConfigError> for ShipError {
  fn from(err: ConfigError) -> Self {
    ShipError::Config(err)
  }
}

impl From<GitError> for ShipError {
  fn from(err: GitError) -> Self {
    ShipError::Git(err)
  }
}

impl From<ReleaseError> for ShipError {
  fn from(err: ReleaseError) -> Self {
    ShipError::Release(err)
  }
}

impl From<GateError> for ShipError {
  fn from(err: GateError) -> Self {
    ShipError::Gate(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A config file already exists where `init` would write one
  AlreadyExists { path: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// A field is present but its value is unusable
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::AlreadyExists { .. } => Some("Re-run with --force to overwrite the existing file.".to_string()),
      ConfigError::MissingField { field } => Some(format!(
        "Add `{}` to shipgate.toml (run `shipgate init` for a commented template).",
        field
      )),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::AlreadyExists { path } => {
        write!(f, "Configuration already exists: {}", path.display())
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid value for `{}`: {}", field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Fetching tag objects from a remote failed
  FetchFailed { remote: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run shipgate from inside the repository checkout, or check the path: {}",
        path.display()
      )),
      GitError::FetchFailed { remote, .. } => Some(format!(
        "Check that remote '{}' exists and is reachable: git remote -v",
        remote
      )),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::FetchFailed { remote, reason } => {
        write!(f, "Fetching tags from '{}' failed: {}", remote, reason)
      }
    }
  }
}

/// Why the tag annotation could not be read from local history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShallowReason {
  /// The clone is shallow
  ShallowClone,
  /// No ref exists for the tag
  TagMissing,
  /// The tag ref points straight at a commit, so the tag object was never fetched
  NotAnnotated,
}

impl fmt::Display for ShallowReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShallowReason::ShallowClone => write!(f, "the repository is a shallow clone"),
      ShallowReason::TagMissing => write!(f, "the tag does not exist locally"),
      ShallowReason::NotAnnotated => write!(f, "the local tag ref has no annotated tag object"),
    }
  }
}

/// Release stage errors
#[derive(Debug)]
pub enum ReleaseError {
  /// Tag history or annotation missing from the local clone
  ShallowHistory { tag: String, reason: ShallowReason },

  /// Publish attempted against a tag that is not a release
  InvalidClassification { tag: String },

  /// Tag object is not valid UTF-8
  UndecodableAnnotation { tag: String, encoding: Option<String> },

  /// An external publish step failed; remaining steps were not run
  StepFailed {
    step: String,
    code: Option<i32>,
    detail: String,
  },
}

impl ReleaseError {
  fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::ShallowHistory { .. } => ExitCode::System,
      ReleaseError::InvalidClassification { .. } => ExitCode::User,
      ReleaseError::UndecodableAnnotation { .. } => ExitCode::System,
      ReleaseError::StepFailed { code: Some(code), .. } if *code != 0 => ExitCode::Passthrough(*code),
      ReleaseError::StepFailed { .. } => ExitCode::System,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::ShallowHistory { .. } => Some(
        "Check out with full history and tags (e.g. fetch-depth: 0), or re-run with --fetch to run `git fetch --tags --force`."
          .to_string(),
      ),
      ReleaseError::InvalidClassification { .. } => {
        Some("Release tags look like v1.2.3, v1.2.3a1, v1.2.3b2 or v1.2.3rc1.".to_string())
      }
      ReleaseError::UndecodableAnnotation { encoding: Some(encoding), .. } => Some(format!(
        "The tag message is stored as {}. Re-create the tag with a UTF-8 message (unset i18n.commitEncoding).",
        encoding
      )),
      ReleaseError::UndecodableAnnotation { encoding: None, .. } => {
        Some("Release notes must be UTF-8. Re-create the tag with a UTF-8 message.".to_string())
      }
      ReleaseError::StepFailed { step, .. } => Some(format!(
        "Nothing is retried automatically. Inspect what the {} step already published, then re-run the whole publish stage.",
        step
      )),
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::ShallowHistory { tag, reason } => {
        write!(f, "Cannot read annotation for tag '{}': {}", tag, reason)
      }
      ReleaseError::InvalidClassification { tag } => {
        write!(f, "Refusing to publish: '{}' is not a release tag", tag)
      }
      ReleaseError::UndecodableAnnotation { tag, encoding } => match encoding {
        Some(encoding) => write!(f, "Annotation of tag '{}' is not UTF-8 (encoding {})", tag, encoding),
        None => write!(f, "Annotation of tag '{}' is not UTF-8", tag),
      },
      ReleaseError::StepFailed { step, code, detail } => {
        match code {
          Some(code) => write!(f, "Publish step '{}' failed with exit code {}", step, code)?,
          None => write!(f, "Publish step '{}' failed", step)?,
        }
        if !detail.trim().is_empty() {
          write!(f, "\n{}", detail.trim_end())?;
        }
        Ok(())
      }
    }
  }
}

/// Pipeline gate errors
#[derive(Debug)]
pub enum GateError {
  /// The gate blocked the publish stage
  Blocked { blockers: Vec<String> },

  /// An upstream status string could not be understood
  InvalidOutcome { input: String },
}

impl GateError {
  fn help_message(&self) -> Option<String> {
    match self {
      GateError::Blocked { .. } => Some("Publishing requires lint and every test cell to succeed.".to_string()),
      GateError::InvalidOutcome { .. } => {
        Some("Valid outcomes: success, failure, skipped, cancelled.".to_string())
      }
    }
  }
}

impl fmt::Display for GateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GateError::Blocked { blockers } => {
        write!(f, "Pipeline gate blocked publishing: {}", blockers.join(", "))
      }
      GateError::InvalidOutcome { input } => {
        write!(f, "Unknown stage outcome '{}'", input)
      }
    }
  }
}

/// Result type alias for shipgate
pub type ShipResult<T> = Result<T, ShipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ShipError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
