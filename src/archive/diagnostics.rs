use std::fmt;

/// Severity of a diagnostic reported while parsing an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParseLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for ParseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseLevel::Info => write!(f, "INFO"),
            ParseLevel::Warning => write!(f, "WARNING"),
            ParseLevel::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub level: ParseLevel,
    pub message: String,
    /// File inside the archive the diagnostic refers to, if any.
    pub file: Option<String>,
}

impl ParseDiagnostic {
    pub fn new(level: ParseLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            file: None,
        }
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "[{}] {}: {}", self.level, file, self.message),
            None => write!(f, "[{}] {}", self.level, self.message),
        }
    }
}

/// Outcome of uploading one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsingResult {
    /// Name of the topology registered by the upload, if any.
    pub topology: Option<String>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsingResult {
    /// Returns true if any diagnostic is at `level` or above.
    pub fn has_level(&self, level: ParseLevel) -> bool {
        self.diagnostics.iter().any(|d| d.level >= level)
    }

    pub fn has_errors(&self) -> bool {
        self.has_level(ParseLevel::Error)
    }
}
