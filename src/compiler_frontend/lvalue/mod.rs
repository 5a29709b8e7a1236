//! Lvalue lowering
//!
//! Turns an assignable expression into a chain of path components that a
//! consumer can read from or write through.

pub mod accessor_args;
pub mod cleanup_scope;
pub mod collaborators;
pub mod lvalue_datatypes;
pub mod lvalue_display;
pub mod lvalue_expression;
pub mod lvalue_path;
pub mod path_access;
pub mod path_builder;
pub mod path_component;

#[cfg(test)]
mod tests;
