//! Construct-specific resolution rules, one module per stepped construct.

mod conditional;
mod generic;
mod indexed;
mod mapped;
mod template;
