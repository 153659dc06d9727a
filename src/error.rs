/// Failure classes the pipeline can hit.
///
/// Keeping the class separate from the message lets tests assert on *what*
/// failed without pinning exact error strings, and gives each class a stable
/// process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input file does not exist or could not be opened.
    MissingFile,
    /// A required column is absent after applying the column mapping.
    MissingColumn,
    /// Cleaning/filtering left zero usable rows.
    NoValidData,
    /// Fewer than two usable observations (or no SD spread) — the
    /// regression has no unique solution.
    UnderdeterminedFit,
    /// Any other parse/compute/write failure.
    Processing,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::MissingFile | ErrorKind::MissingColumn => 2,
            ErrorKind::NoValidData => 3,
            ErrorKind::UnderdeterminedFit => 4,
            ErrorKind::Processing => 1,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_file(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingFile, message)
    }

    pub fn missing_column(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingColumn, message)
    }

    pub fn no_valid_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoValidData, message)
    }

    pub fn underdetermined(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnderdeterminedFit, message)
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Processing, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(AppError::missing_file("x").exit_code(), 2);
        assert_eq!(AppError::missing_column("x").exit_code(), 2);
        assert_eq!(AppError::no_valid_data("x").exit_code(), 3);
        assert_eq!(AppError::underdetermined("x").exit_code(), 4);
        assert_eq!(AppError::processing("x").exit_code(), 1);
    }
}
