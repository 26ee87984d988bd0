mod output;

use clap::{Arg, ArgAction, ArgMatches, Command};
use ir2js_core::lower::FileSelection;
use ir2js_core::{IrModule, LoweredModule, LoweringOptions, lower_module};
use std::fs;
use std::process::ExitCode;

use output::ReportPrinter;

fn main() -> ExitCode {
    let cli = Command::new("ir2js")
        .version("0.1.0")
        .about("Lowers a JSON-encoded IR module to a target AST");

    let cli = setup_cli(cli);
    let matches = cli.get_matches();
    dispatch_commands(&matches)
}

/// Sets up the CLI with subcommands and arguments.
fn setup_cli(cli: Command) -> Command {
    cli.subcommand_required(true).subcommand(
        Command::new("lower")
            .about("Lower the specified IR module")
            .arg(
                Arg::new("file")
                    .help("The JSON-encoded IR module")
                    .required(true)
                    .index(1),
            )
            .arg(
                Arg::new("options")
                    .help("JSON file with lowering options")
                    .long("options")
                    .value_parser(clap::value_parser!(String))
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("dump")
                    .help("Format of the lowered program")
                    .short('d')
                    .long("dump")
                    .value_parser(["ast", "json"])
                    .default_value("ast")
                    .value_name("FORMAT"),
            )
            .arg(
                Arg::new("output")
                    .help("Write the lowered program to this file instead of stdout")
                    .short('o')
                    .long("output")
                    .value_parser(clap::value_parser!(String))
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("first-file-only")
                    .help("Lower only the first file of the module")
                    .long("first-file-only")
                    .action(ArgAction::SetTrue),
            ),
    )
}

/// Dispatches the command based on the parsed arguments.
fn dispatch_commands(matches: &ArgMatches) -> ExitCode {
    match matches.subcommand() {
        Some(("lower", sub_m)) => match run_lower(sub_m) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("{}", message);
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("No valid subcommand was used. Use --help for more information.");
            ExitCode::FAILURE
        }
    }
}

fn run_lower(sub_m: &ArgMatches) -> Result<(), String> {
    let file = sub_m.get_one::<String>("file").ok_or("missing IR file argument")?;
    let mut module = IrModule::load_from_file(file)?;

    let mut options = match sub_m.get_one::<String>("options") {
        Some(path) => LoweringOptions::load_from_file(path)?,
        None => LoweringOptions::default(),
    };
    if sub_m.get_flag("first-file-only") {
        options.files = FileSelection::FirstOnly;
    }

    let printer = ReportPrinter::new();
    let lowered = lower_module(&mut module, options).map_err(|e| printer.failure(&e))?;
    eprint!("{}", printer.lowered(&module.name, &lowered));

    let format = sub_m.get_one::<String>("dump").map(String::as_str).unwrap_or("ast");
    let rendered = render(&lowered, format)?;
    match sub_m.get_one::<String>("output") {
        Some(path) => fs::write(path, rendered).map_err(|e| format!("write {}: {}", path, e)),
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}

fn render(lowered: &LoweredModule, format: &str) -> Result<String, String> {
    match format {
        "json" => serde_json::to_string_pretty(&lowered.program).map_err(|e| format!("encode program: {}", e)),
        _ => Ok(format!("{:#?}", lowered.program)),
    }
}
