pub mod file;
pub mod source;
pub mod stdin;
