use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Stored data (a map, a postings or metadata file) is malformed.
    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        let (element, message) = (element.into(), message.into());
        Error::new(ErrorKind::InvalidFormat { element, message })
    }

    /// Well-formed stored files disagree with each other.
    pub fn integrity(element: impl Into<String>, message: impl Into<String>) -> Error {
        let (element, message) = (element.into(), message.into());
        Error::new(ErrorKind::Integrity { element, message })
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        let (name, message) = (name.into(), message.into());
        Error::new(ErrorKind::InvalidArgument { name, message })
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error::new(ErrorKind::InvalidOperation { name: name.into() })
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        let context = context.into();
        Error::new(ErrorKind::Io { context, source })
    }

    /// Returns `true` for errors caused by malformed stored data.
    pub fn is_format_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidFormat { .. })
    }

    /// Returns `true` for errors caused by inconsistent (but well-formed) data.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Integrity { .. })
    }

    /// Returns `true` for errors caused by invalid caller-supplied arguments.
    pub fn is_invalid_arg(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("integrity violation in '{element}': {message}")]
    Integrity { element: String, message: String },

    #[error("I/O error on '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(_: std::convert::Infallible) -> Self {
        Error::invalid_operation("conversion")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let e = Error::invalid_format("dictionary", "bad tag");
        assert!(e.is_format_error());
        assert_eq!(
            e.to_string(),
            "invalid storage format for 'dictionary': bad tag"
        );

        let e = Error::integrity("postings", "wrong token");
        assert!(e.is_integrity_error());
        assert!(!e.is_format_error());

        let e = Error::invalid_arg("k", "k > 0");
        assert!(e.is_invalid_arg());
        assert_eq!(e.to_string(), "invalid argument k: k > 0");

        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        let e: Error = io.into();
        assert!(matches!(e.into_kind(), ErrorKind::Io { .. }));
    }
}
