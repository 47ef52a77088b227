use std::fmt::{Debug, Write};
use std::{borrow::Cow, panic::Location};

use log::warn;
use serde::{ser::SerializeStruct, Deserialize, Serialize};
use strum_macros::IntoStaticStr;

/// The tool cannot run because of how it was launched.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionEnvironmentMisconfigurationError {
    #[error("Root privileges are required to provision swap")]
    MissingRequiredPermissions,
    #[error("Required binary '{binary}' was not found")]
    MissingBinary { binary: &'static str },
}

/// User provided input was invalid.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidInputError {
    #[error("Failed to load configuration file from '{path}'")]
    LoadConfig { path: String },
    #[error("Failed to parse configuration")]
    ParseConfig,
}

/// The host is not in a shape the provisioner can work with.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum UnsupportedConfigurationError {
    #[error("Cannot find the partition backing the root filesystem")]
    RootDeviceNotFound,
    #[error("Unable to recognize the disk type of '{device}'")]
    UnrecognizedDevice { device: String },
    #[error("Failed to determine available space on '{path}'")]
    AvailableSpace { path: String },
    #[error("Insufficient space: {requested} GiB requested, {available} GiB available")]
    InsufficientSpace { requested: u64, available: u64 },
}

/// A provisioning step failed.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisioningError {
    #[error("Failed to create swap directory '{path}'")]
    CreateSwapDirectory { path: String },
    #[error("Failed to detect the filesystem type of '{path}'")]
    DetectFilesystem { path: String },
    #[error("Failed to disable copy-on-write for the swap file")]
    DisableCopyOnWrite,
    #[error("Failed to allocate the swap file")]
    AllocateSwapFile,
    #[error("Failed to restrict swap file permissions")]
    SetPermissions,
    #[error("Failed to format the swap file")]
    FormatSwapFile,
    #[error("Failed to activate the swap file")]
    ActivateSwapFile,
    #[error("Failed to update the mount table")]
    UpdateFstab,
    #[error("Failed to disable zram swap")]
    DisableZramSwap,
    #[error("Failed to write provisioning report")]
    WriteReport,
    #[error("Failed to execute '{binary}'")]
    CommandCouldNotExecute { binary: &'static str },
    #[error("'{binary}' failed: {explanation}")]
    CommandFailed {
        binary: &'static str,
        explanation: String,
    },
}

#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum InternalError {
    #[error("Panicked: {0}")]
    Panic(String),
}

/// Each variant of `ErrorKind` corresponds to a different category of error.
#[derive(Debug, Eq, thiserror::Error, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// The tool was launched in an environment it cannot work in.
    #[error(transparent)]
    ExecutionEnvironmentMisconfiguration(#[from] ExecutionEnvironmentMisconfigurationError),

    /// Invalid user input.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// The host's disk layout or free space does not allow a swap file.
    #[error(transparent)]
    UnsupportedConfiguration(#[from] UnsupportedConfigurationError),

    /// A step of creating the swap file failed. The host may be left with a
    /// partially created swap file.
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    /// A bug.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Debug)]
struct SwapErrorInner {
    kind: ErrorKind,
    location: &'static Location<'static>,
    source: Option<anyhow::Error>,
    context: Vec<(Cow<'static, str>, &'static Location<'static>)>,
}

/// Fatal error of a provisioning run.
pub struct SwapError(Box<SwapErrorInner>);
impl SwapError {
    #[track_caller]
    pub fn new(kind: impl Into<ErrorKind>) -> Self {
        SwapError(Box::new(SwapErrorInner {
            kind: kind.into(),
            location: Location::caller(),
            source: None,
            context: Vec::new(),
        }))
    }

    #[track_caller]
    pub fn with_source(kind: impl Into<ErrorKind>, source: anyhow::Error) -> Self {
        SwapError(Box::new(SwapErrorInner {
            kind: kind.into(),
            location: Location::caller(),
            source: Some(source),
            context: Vec::new(),
        }))
    }

    /// Records an error that happened while handling this one.
    #[track_caller]
    pub fn secondary_error_context(mut self, secondary: impl Debug) -> Self {
        self.0.context.push((format!(
            "While handling the error, an additional error was caught: \n\n{secondary:?}\n\nThe earlier error:"
        ).into(), Location::caller()));
        self
    }

    /// Returns a reference to the inner ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }
}

pub trait ReportError<T, K> {
    /// Convert this error into a structured SwapError.
    fn structured(self, kind: K) -> Result<T, SwapError>;
}

impl<T, K> ReportError<T, K> for Option<T>
where
    K: Into<ErrorKind>,
{
    #[track_caller]
    fn structured(self, kind: K) -> Result<T, SwapError> {
        match self {
            Some(t) => Ok(t),
            None => Err(SwapError(Box::new(SwapErrorInner {
                kind: kind.into(),
                location: Location::caller(),
                source: None,
                context: Vec::new(),
            }))),
        }
    }
}

impl<T, E, K> ReportError<T, K> for Result<T, E>
where
    E: Into<anyhow::Error>,
    K: Into<ErrorKind>,
{
    #[track_caller]
    fn structured(self, kind: K) -> Result<T, SwapError> {
        match self {
            Ok(o) => Ok(o),
            Err(e) => Err(SwapError(Box::new(SwapErrorInner {
                kind: kind.into(),
                location: Location::caller(),
                source: Some(e.into()),
                context: Vec::new(),
            }))),
        }
    }
}

pub trait SwapResultExt<T> {
    /// Attach a context message to the error.
    fn message(self, context: impl Into<Cow<'static, str>>) -> Result<T, SwapError>;
}

impl<T> SwapResultExt<T> for Result<T, SwapError> {
    #[track_caller]
    fn message(mut self, context: impl Into<Cow<'static, str>>) -> Result<T, SwapError> {
        if let Err(ref mut e) = self {
            e.0.context.push((context.into(), Location::caller()));
        }
        self
    }
}

/// Marks a step whose failure must not abort the run.
///
/// The error is logged as a warning and dropped.
pub trait BestEffort<T> {
    fn best_effort(self, step: &str) -> Option<T>;
}

impl<T, E> BestEffort<T> for Result<T, E>
where
    E: Debug,
{
    fn best_effort(self, step: &str) -> Option<T> {
        match self {
            Ok(t) => Some(t),
            Err(e) => {
                warn!("Ignoring failure to {step}: {e:?}");
                None
            }
        }
    }
}

impl Serialize for SwapError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("swap-error", 5)?;
        state.serialize_field("message", &self.0.kind.to_string())?;
        match self.0.kind {
            ErrorKind::ExecutionEnvironmentMisconfiguration(ref e) => {
                state.serialize_field("error", e)?
            }
            ErrorKind::InvalidInput(ref e) => state.serialize_field("error", e)?,
            ErrorKind::UnsupportedConfiguration(ref e) => state.serialize_field("error", e)?,
            ErrorKind::Provisioning(ref e) => state.serialize_field("error", e)?,
            ErrorKind::Internal(ref e) => state.serialize_field("error", e)?,
        }
        state.serialize_field("category", <&str>::from(&self.0.kind))?;
        state.serialize_field(
            "location",
            &format!("{}:{}", self.0.location.file(), self.0.location.line()),
        )?;
        match self.0.source {
            Some(ref e) => state.serialize_field("cause", &Some(format!("{:?}", e)))?,
            None => state.serialize_field("cause", &None::<String>)?,
        }
        state.end()
    }
}

impl Debug for SwapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.0.kind,
            self.0.location.file(),
            self.0.location.line()
        )?;

        if !self.0.context.is_empty() {
            writeln!(f, "\n\nContext:")?;
            for (i, (context, location)) in self.0.context.iter().enumerate() {
                for (j, line) in context.split('\n').enumerate() {
                    if j == 0 {
                        write!(f, "{: >5}: ", i)?;
                    } else {
                        f.write_str("\n       ")?;
                    }
                    f.write_str(line)?;
                }
                writeln!(f, " at {}:{}", location.file(), location.line())?;
            }
        }

        if let Some(ref source) = self.0.source {
            writeln!(f, "\n\nCaused by:")?;
            let mut index = 0;
            let mut source: Option<&dyn std::error::Error> = Some(source.as_ref());
            while let Some(e) = source {
                for (i, line) in e.to_string().split('\n').enumerate() {
                    if i == 0 {
                        write!(f, "{: >5}: ", index)?;
                    } else {
                        f.write_str("\n       ")?;
                    }
                    f.write_str(line)?;
                }
                f.write_char('\n')?;
                source = e.source();
                index += 1;
            }
        }
        Ok(())
    }
}
