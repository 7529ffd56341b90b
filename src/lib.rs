//! `simplec` translates `.simple` line scripts into Go programs.
//!
//! The pipeline is lexer → [`parser::Translator`] (scope and block checks
//! while building [`parser::ast::Program`]) → [`codegen::Target`] printer.
//! [`driver`] and [`config`] wrap it for the command line.

pub mod analyzer;
pub mod codegen;
pub mod config;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod parser;

use codegen::{GoTarget, Target};
use errors::TranslateError;
use parser::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Reject unknown statements instead of skipping them.
    pub strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { strict: true }
    }
}

/// Translates one source unit into Go source text.
///
/// Nothing is produced unless the whole unit translates.
pub fn compile(source: &str, options: &Options) -> Result<String, TranslateError> {
    let program = Translator::new().strict(options.strict).translate(source)?;
    Ok(GoTarget::new().generate(&program))
}
