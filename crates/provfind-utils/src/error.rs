use std::{error::Error, fmt};

#[derive(Debug)]
pub enum PathError {
    CurrentDir { source: std::io::Error },

    Empty,

    MissingEnvVar { var: String, input: String },

    UnclosedVariable { input: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Empty => write!(f, "Path is empty"),
            PathError::CurrentDir { source } => {
                write!(f, "Failed to get current directory: {source}")
            }
            PathError::UnclosedVariable { input } => {
                write!(f, "Unclosed variable expression starting at `{input}`")
            }
            PathError::MissingEnvVar { var, input } => {
                write!(f, "Environment variable `{var}` not set in `{input}`")
            }
        }
    }
}

impl Error for PathError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PathError::CurrentDir { source } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum DurationError {
    Invalid { input: String },
}

impl fmt::Display for DurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationError::Invalid { input } => {
                write!(f, "Invalid duration `{input}`, expected e.g. `30s`, `1m30s`")
            }
        }
    }
}

impl Error for DurationError {}

pub type PathResult<T> = std::result::Result<T, PathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_error_display() {
        assert_eq!(PathError::Empty.to_string(), "Path is empty");

        let err = PathError::MissingEnvVar {
            var: "FOO".into(),
            input: "$FOO/bar".into(),
        };
        assert_eq!(
            err.to_string(),
            "Environment variable `FOO` not set in `$FOO/bar`"
        );
    }

    #[test]
    fn test_path_error_source() {
        let err = PathError::CurrentDir {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(PathError::Empty.source().is_none());
    }

    #[test]
    fn test_duration_error_display() {
        let err = DurationError::Invalid {
            input: "10x".into(),
        };
        assert!(err.to_string().contains("`10x`"));
    }
}
