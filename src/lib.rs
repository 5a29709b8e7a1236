pub mod compiler_frontend;
pub mod settings;

pub use compiler_frontend::compiler_errors::{CompilerError, CompilerMessages, ErrorType};
pub use compiler_frontend::lvalue::cleanup_scope::{CleanupScope, with_cleanup_scope};
pub use compiler_frontend::lvalue::collaborators::{EvalContext, LvalueCollaborators};
pub use compiler_frontend::lvalue::lvalue_path::LvaluePath;
pub use compiler_frontend::lvalue::path_access::{load_lvalue, store_lvalue};
pub use compiler_frontend::lvalue::path_builder::build_lvalue_path;
pub use settings::LoweringConfig;
