//! External collaborator seams
//!
//! The core never compiles or minifies anything itself; it drives
//! these traits. Production implementations shell out to the
//! configured executables, tests substitute in-crate fakes.

pub mod compiler;
pub mod minifier;

pub use compiler::{CommandCompiler, CompileOutput, StylesheetCompiler};
pub use minifier::{CommandMinifier, Minifier};

use crate::config::Config;
use crate::error::AssetCacheResult;
use crate::request::StylesheetKind;

/// The full adapter set an orchestrator needs
pub struct Adapters {
    pub less: Box<dyn StylesheetCompiler>,
    pub sass: Box<dyn StylesheetCompiler>,
    pub css_minifier: Box<dyn Minifier>,
    pub js_minifier: Box<dyn Minifier>,
}

impl Adapters {
    /// Build command-backed adapters from configuration
    pub fn from_config(config: &Config) -> AssetCacheResult<Self> {
        Ok(Self {
            less: Box::new(CommandCompiler::from_command_line(
                StylesheetKind::Less,
                &config.compilers.less,
            )?),
            sass: Box::new(CommandCompiler::from_command_line(
                StylesheetKind::Sass,
                &config.compilers.sass,
            )?),
            css_minifier: Box::new(CommandMinifier::from_command_line(&config.minifiers.css)?),
            js_minifier: Box::new(CommandMinifier::from_command_line(&config.minifiers.js)?),
        })
    }
}
