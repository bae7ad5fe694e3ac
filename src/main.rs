use clap::{Arg, Command as ClapCommand, ArgAction};
use std::process;
use log::{error, LevelFilter};

// Import from your library
use exifkit::utils::logger::Logger;
use exifkit::commands::{CommandFactory, ExifkitCommandFactory};

fn main() {
    let matches = ClapCommand::new("ExifKit")
        .version("0.1")
        .about("Read, edit and strip EXIF/IPTC/XMP metadata in JPEG, TIFF and PNG files")
        .arg(
            Arg::new("input")
                .help("Input image file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output image file, edits rewrite the input when omitted")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write diagnostics to this file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("strip")
                .short('s')
                .long("strip")
                .help("Remove all metadata from the image")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("blocks")
                .long("blocks")
                .help("With --strip, remove only these blocks (comma-separated: exif,iptc,xmp,comment,pngtext,pngtime)")
                .value_name("LIST")
                .required(false),
        )
        .arg(
            Arg::new("copy-from")
                .long("copy-from")
                .help("Replace the image's tags with those of another file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("date-taken")
                .long("date-taken")
                .help("Set the capture date ('YYYY:MM:DD HH:MM:SS')")
                .value_name("DATE")
                .required(false),
        )
        .arg(
            Arg::new("date-digitized")
                .long("date-digitized")
                .help("Set the digitization date ('YYYY:MM:DD HH:MM:SS')")
                .value_name("DATE")
                .required(false),
        )
        .arg(
            Arg::new("artist")
                .long("artist")
                .help("Set the creator name")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("description")
                .long("description")
                .help("Set the image description")
                .value_name("TEXT")
                .required(false),
        )
        .arg(
            Arg::new("copyright")
                .long("copyright")
                .help("Set the copyright notice")
                .value_name("TEXT")
                .required(false),
        )
        .arg(
            Arg::new("software")
                .long("software")
                .help("Set the producing software name")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("comment")
                .long("comment")
                .help("Set the user comment")
                .value_name("TEXT")
                .required(false),
        )
        .arg(
            Arg::new("gps")
                .long("gps")
                .help("Set the GPS position in decimal degrees ('lat,lon')")
                .value_name("POSITION")
                .required(false),
        )
        .arg(
            Arg::new("altitude")
                .long("altitude")
                .help("Set the GPS altitude in meters, negative below sea level")
                .value_name("METERS")
                .required(false),
        )
        .arg(
            Arg::new("remove-gps")
                .long("remove-gps")
                .help("Remove the GPS position")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("remove-thumbnail")
                .long("remove-thumbnail")
                .help("Remove the embedded thumbnail image")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file = matches.get_one::<String>("log-file").map(|s| s.as_str());
    let logger = match log_file {
        Some(path) => match Logger::new(path, level) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error initializing logger: {}", e);
                process::exit(1);
            }
        },
        None => Logger::console_only(level),
    };

    if let Err(e) = Logger::init_global_logger(log_file, level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = ExifkitCommandFactory::new();

    let command_result = factory.create_command(&matches, &logger);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
