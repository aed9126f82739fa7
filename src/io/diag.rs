//! Diagnostics collected while reading a netlist

use std::fmt;

use log::warn;

use crate::io::scan::Loc;

/// How bad a diagnostic is
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Suspicious input, the file is still read
    Warning,
    /// Invalid input, reading continues to report more issues
    Error,
    /// Reading could not proceed at all
    Failure,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Failure => "failure",
        };
        write!(f, "{}", s)
    }
}

/// A single message tied to a source region
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity of the message
    pub severity: Severity,
    /// Region of the input it refers to, if any
    pub loc: Option<Loc>,
    /// Human-readable message
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.loc {
            Some(loc) => write!(f, "{}: {}: {}", loc, self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// All diagnostics produced by one read
///
/// A read fails if and only if it produced at least one diagnostic of
/// severity [`Error`](Severity::Error) or worse; warnings alone never fail it.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    file: Option<String>,
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn new() -> Diagnostics {
        Diagnostics::default()
    }

    /// Name of the file being read, if known
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub(crate) fn set_file(&mut self, file: &str) {
        self.file = Some(file.to_string());
    }

    pub(crate) fn warning(&mut self, loc: Loc, message: impl Into<String>) {
        let message = message.into();
        warn!("{}: {}", loc, message);
        self.list.push(Diagnostic {
            severity: Severity::Warning,
            loc: Some(loc),
            message,
        });
    }

    pub(crate) fn error(&mut self, loc: Loc, message: impl Into<String>) {
        self.list.push(Diagnostic {
            severity: Severity::Error,
            loc: Some(loc),
            message: message.into(),
        });
    }

    pub(crate) fn failure(&mut self, message: impl Into<String>) {
        self.list.push(Diagnostic {
            severity: Severity::Failure,
            loc: None,
            message: message.into(),
        });
    }

    /// Whether any diagnostic is an error or a failure
    pub fn has_errors(&self) -> bool {
        self.list.iter().any(|d| d.severity >= Severity::Error)
    }

    /// Number of diagnostics, warnings included
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether no diagnostic was produced
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// All diagnostics, in the order they were produced
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.list {
            match &self.file {
                Some(file) => writeln!(f, "{}:{}", file, d)?,
                None => writeln!(f, "{}", d)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
