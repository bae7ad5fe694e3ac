//! Command pattern interfaces
//!
//! Each CLI run maps to one command object: analyze, edit or strip.
//! The factory inspects the parsed arguments and builds the right one.

use crate::exif::errors::ExifResult;
use crate::utils::logger::Logger;

/// An executable metadata operation selected on the command line
pub trait Command {
    /// Runs the operation against the input file
    fn execute(&self) -> ExifResult<()>;
}

/// Builds the command matching a set of parsed CLI arguments
pub trait CommandFactory<'a> {
    /// Picks and constructs the command the arguments ask for
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Logger for recording operations
    fn create_command(&self, args: &clap::ArgMatches, logger: &'a Logger) -> ExifResult<Box<dyn Command + 'a>>;
}
