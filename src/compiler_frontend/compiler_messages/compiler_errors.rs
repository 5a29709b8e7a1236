use crate::compiler_frontend::source_location::TextLocation;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

// The final set of errors emitted while lowering a function's lvalues
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
}

impl CompilerMessages {
    pub fn new() -> Self {
        CompilerMessages { errors: Vec::new() }
    }

    pub fn push(&mut self, error: CompilerError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl From<CompilerError> for CompilerMessages {
    fn from(error: CompilerError) -> Self {
        CompilerMessages {
            errors: vec![error],
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    CompilationStage,

    // Optional suggestions
    PrimarySuggestion,
    AlternativeSuggestion,

    // Representation kinds for base mismatches
    ExpectedBase,
    FoundBase,

    // Which path component or expression node was involved
    ComponentKind,
    NodeKind,
}

impl ErrorMetaDataKey {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorMetaDataKey::CompilationStage => "Stage",
            ErrorMetaDataKey::PrimarySuggestion => "Suggestion",
            ErrorMetaDataKey::AlternativeSuggestion => "Alternative",
            ErrorMetaDataKey::ExpectedBase => "Expected base",
            ErrorMetaDataKey::FoundBase => "Found base",
            ErrorMetaDataKey::ComponentKind => "Component",
            ErrorMetaDataKey::NodeKind => "Node",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilerError {
    pub msg: String,
    pub location: TextLocation,
    pub error_type: ErrorType,

    // This is for creating more structured and detailed error messages
    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

impl CompilerError {
    pub fn new(
        msg: impl Into<String>,
        location: TextLocation,
        error_type: ErrorType,
    ) -> CompilerError {
        CompilerError {
            msg: msg.into(),
            location,
            error_type,
            metadata: HashMap::new(),
        }
    }

    /// Create a compiler error (internal bug, not user's fault)
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        CompilerError::new(msg, TextLocation::default(), ErrorType::Compiler)
    }

    pub fn with_location(mut self, location: TextLocation) -> Self {
        if self.location.is_unknown() {
            self.location = location;
        }
        self
    }

    pub fn new_metadata_entry(&mut self, key: ErrorMetaDataKey, value: &'static str) {
        self.metadata.insert(key, value);
    }

    /// Lowering faults are compiler defects, never something the user wrote wrong
    pub fn is_internal(&self) -> bool {
        matches!(
            self.error_type,
            ErrorType::Compiler | ErrorType::LvalueLowering
        )
    }
}

impl Display for CompilerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", error_type_to_str(&self.error_type), self.msg)
    }
}

impl std::error::Error for CompilerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Config,
    File,
    Compiler,
    LvalueLowering,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Compiler => "Compiler Bug",
        ErrorType::Config => "Malformed Config",
        ErrorType::File => "File Error",
        ErrorType::LvalueLowering => "Lvalue Lowering",
    }
}

/// Returns a new CompilerError for internal compiler bugs.
///
/// These are contract violations between the path builder and the components it creates.
/// A well formed expression tree can never trigger one.
///
/// Usage: `return_compiler_error!("base must be an address" ; { ComponentKind => "Element" })`;
#[macro_export]
macro_rules! return_compiler_error {
    // Variant with format string, arguments, and metadata (with semicolon separator)
    ($fmt:expr, $($arg:expr),+ ; { $( $key:ident => $value:expr ),* $(,)? }) => {{
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: format!($fmt, $($arg),+),
            location: $crate::compiler_frontend::source_location::TextLocation::default(),
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Compiler,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        });
    }};
    // Variant with format string and arguments (no metadata)
    ($fmt:expr, $($arg:expr),+ $(,)?) => {{
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: format!($fmt, $($arg),+),
            location: $crate::compiler_frontend::source_location::TextLocation::default(),
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Compiler,
            metadata: std::collections::HashMap::new(),
        });
    }};
    // Variant with message and metadata (with semicolon separator)
    ($msg:expr ; { $( $key:ident => $value:expr ),* $(,)? }) => {{
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $crate::compiler_frontend::source_location::TextLocation::default(),
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Compiler,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        });
    }};
    // Simple variant with just message (no metadata)
    ($msg:expr) => {{
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $crate::compiler_frontend::source_location::TextLocation::default(),
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Compiler,
            metadata: std::collections::HashMap::new(),
        });
    }};
}

/// Returns a new CompilerError for expressions that can't become an lvalue path.
///
/// Semantic analysis should have rejected these already,
/// so reaching one is treated as a bug in an earlier phase.
///
/// Usage: `return_lvalue_lowering_error!("message", location, { NodeKind => "Call" })`;
#[macro_export]
macro_rules! return_lvalue_lowering_error {
    ($msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::LvalueLowering,
            metadata: {
                let mut map = std::collections::HashMap::new();
                map.insert(
                    $crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::CompilationStage,
                    "Lvalue Lowering",
                );
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr, $location:expr) => {
        $crate::return_lvalue_lowering_error!($msg, $location, {})
    };
}

/// Returns a new CompilerError for a malformed lowering config.
///
/// Usage: `return_config_error!("message", location, { PrimarySuggestion => "..." })`;
#[macro_export]
macro_rules! return_config_error {
    ($msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Config,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr, $location:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Config,
            metadata: std::collections::HashMap::new(),
        })
    };
}

/// Returns a new CompilerError for a file that couldn't be read.
///
/// Usage: `return_file_error!(path, "message")`;
#[macro_export]
macro_rules! return_file_error {
    ($path:expr, $msg:expr) => {{
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: format!("{} ({})", $msg, $path.display()),
            location: $crate::compiler_frontend::source_location::TextLocation::default(),
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::File,
            metadata: std::collections::HashMap::new(),
        });
    }};
}
