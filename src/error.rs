use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyTallyError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Writing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory Walk Error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid Pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Format Error: {0}")]
    Format(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    /// Parser failure annotated with the 1-based physical line it was detected on.
    #[error("line: {line}, {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<KeyTallyError>,
    },

    /// Failure that escaped a single source file during a run.
    #[error("path_src: '{root}', name: {name}: {source}")]
    InFile {
        root: String,
        name: String,
        #[source]
        source: Box<KeyTallyError>,
    },
}

impl KeyTallyError {
    pub fn at_line(line: usize, source: KeyTallyError) -> Self {
        Self::AtLine {
            line,
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping line and file annotations.
    pub fn root_cause(&self) -> &KeyTallyError {
        match self {
            Self::AtLine { source, .. } | Self::InFile { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self.root_cause(), Self::Format(_))
    }

    /// Line number of the first `AtLine` annotation, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::AtLine { line, .. } => Some(*line),
            Self::InFile { source, .. } => source.line(),
            _ => None,
        }
    }
}

pub type KtResult<T> = Result<T, KeyTallyError>;
