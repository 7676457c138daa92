use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// 找不到可借出的書：ISBN 不存在，或該書目前已借出（兩者不區分）
    #[error("Book with ISBN '{isbn}' not found or not available")]
    BookNotAvailable { isbn: String },

    #[error("Member with ID '{member_id}' not found")]
    MemberNotFound { member_id: String },

    /// 沒有符合的未歸還借閱：從未借過，或已經歸還
    #[error("No open loan for book '{isbn}' and member '{member_id}'")]
    LoanNotFound { isbn: String, member_id: String },

    #[error("Invalid duration: {days} days")]
    InvalidDuration { days: i64 },

    #[error("Data file is corrupt: {message}")]
    Corrupt { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Domain,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LibraryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LibraryError::BookNotAvailable { .. }
            | LibraryError::MemberNotFound { .. }
            | LibraryError::LoanNotFound { .. }
            | LibraryError::InvalidDuration { .. } => ErrorCategory::Domain,
            LibraryError::Corrupt { .. }
            | LibraryError::IoError(_)
            | LibraryError::SerializationError(_) => ErrorCategory::Storage,
            LibraryError::ConfigError { .. }
            | LibraryError::ConfigValidationError { .. }
            | LibraryError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 業務規則拒絕屬於 Medium：使用者修正輸入後重試即可
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Domain => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LibraryError::BookNotAvailable { isbn } => {
                format!("Book with ISBN {} was not found or is currently on loan.", isbn)
            }
            LibraryError::MemberNotFound { member_id } => {
                format!("Member with ID {} was not found.", member_id)
            }
            LibraryError::LoanNotFound { isbn, member_id } => format!(
                "No loan found for book ISBN {} and member ID {}, or it was already returned.",
                isbn, member_id
            ),
            LibraryError::InvalidDuration { days } => {
                format!("{} is not a valid number of days; use a positive number.", days)
            }
            LibraryError::Corrupt { .. } => "The library data file could not be read.".to_string(),
            LibraryError::IoError(e) => format!("File access failed: {}", e),
            LibraryError::SerializationError(e) => format!("Could not encode library data: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LibraryError::BookNotAvailable { .. } => {
                "Check the ISBN with `books`; the copy may still be on loan"
            }
            LibraryError::MemberNotFound { .. } => "Register the member first with `add-member`",
            LibraryError::LoanNotFound { .. } => "List open loans with `loans --open`",
            LibraryError::InvalidDuration { .. } => "Pass a number of days greater than zero",
            LibraryError::Corrupt { .. } => {
                "Inspect the saved .corrupt copy of the data file, or start over with a new file"
            }
            LibraryError::IoError(_) => "Check that the data file path exists and is writable",
            LibraryError::SerializationError(_) => "Report this as a bug",
            LibraryError::ConfigError { .. }
            | LibraryError::ConfigValidationError { .. }
            | LibraryError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
