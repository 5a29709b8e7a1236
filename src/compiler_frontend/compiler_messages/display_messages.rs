use crate::compiler_frontend::compiler_errors::{
    CompilerError, CompilerMessages, ErrorType, error_type_to_str,
};
use saying::say;

pub fn print_compiler_messages(messages: CompilerMessages) {
    for err in messages.errors {
        print_formatted_error(&err);
    }
}

pub fn print_formatted_error(e: &CompilerError) {
    match e.error_type {
        ErrorType::Compiler => {
            say!(Yellow "COMPILER BUG - ");
            say!(Dark Yellow "compiler_frontend developer skill issue (not your fault)");
        }

        ErrorType::LvalueLowering => {
            say!(Yellow "LVALUE LOWERING BUG - ");
            say!(Dark Yellow "an earlier phase let a non-assignable expression through (not your fault)");
        }

        ErrorType::Config => {
            say!(Yellow "CONFIG FILE ISSUE - ");
        }

        ErrorType::File => {
            say!(Yellow "🏚 Can't find/read file: ");
        }
    }

    let body = format_error(e);
    say!(Red body);
}

/// Renders an error as plain text.
/// Metadata lines are sorted so the output is stable between runs.
pub fn format_error(e: &CompilerError) -> String {
    let mut output = String::from(error_type_to_str(&e.error_type));

    if !e.location.is_unknown() {
        output.push_str(&format!(" (line {})", e.location));
    }

    output.push_str(": ");
    output.push_str(&e.msg);

    let mut metadata: Vec<_> = e.metadata.iter().collect();
    metadata.sort_by_key(|(key, _)| key.label());

    for (key, value) in metadata {
        output.push_str(&format!("\n  {}: {}", key.label(), value));
    }

    output
}
