//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod analyze_command;
pub mod edit_command;
pub mod strip_command;

pub use command_traits::{Command, CommandFactory};
pub use analyze_command::AnalyzeCommand;
pub use edit_command::EditCommand;
pub use strip_command::StripCommand;

use clap::ArgMatches;
use crate::utils::logger::Logger;
use crate::exif::errors::ExifResult;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct ExifkitCommandFactory;

impl ExifkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        ExifkitCommandFactory
    }

    /// Whether any of the editing arguments was given
    fn has_edit_request(args: &ArgMatches) -> bool {
        const EDIT_ARGS: &[&str] = &[
            "copy-from", "date-taken", "date-digitized", "artist",
            "description", "copyright", "software", "comment",
            "gps", "altitude",
        ];

        EDIT_ARGS.iter().any(|name| args.contains_id(name))
            || args.get_flag("remove-gps")
            || args.get_flag("remove-thumbnail")
    }
}

impl<'a> CommandFactory<'a> for ExifkitCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> ExifResult<Box<dyn Command + 'a>> {
        // Determine which command to run based on args
        if args.get_flag("strip") {
            Ok(Box::new(StripCommand::new(args, logger)?))
        } else if Self::has_edit_request(args) {
            Ok(Box::new(EditCommand::new(args, logger)?))
        } else {
            // Default to analyze command
            Ok(Box::new(AnalyzeCommand::new(args, logger)?))
        }
    }
}
