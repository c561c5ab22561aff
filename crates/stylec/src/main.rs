//! Stylec - compiles stylesheets into a binary style tree
//!
//! Usage: stylec <input.css> [OPTIONS]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stylec_compiler::{CompileOptions, CompileOutput, Compiler};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Default, PartialEq)]
struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
    deps: bool,
    classes: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Version,
    Compile(Args),
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("stylec");

    match parse_args(&args[1.min(args.len())..]) {
        Ok(Command::Help) => {
            print_usage(program);
            ExitCode::SUCCESS
        }
        Ok(Command::Version) => {
            println!("stylec {}", VERSION);
            ExitCode::SUCCESS
        }
        Ok(Command::Compile(args)) => {
            if let Err(e) = run(&args) {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage(program);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut parsed = Args::default();
    let mut input = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "-o" | "--output" => {
                let value = iter.next().ok_or_else(|| format!("{} requires a path", arg))?;
                parsed.output = Some(PathBuf::from(value));
            }
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--json" => parsed.json = true,
            "--deps" => parsed.deps = true,
            "--classes" => parsed.classes = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("Unknown option: {}", flag));
            }
            path => {
                if input.is_some() {
                    return Err(format!("Unexpected argument: {}", path));
                }
                input = Some(PathBuf::from(path));
            }
        }
    }

    parsed.input = input.ok_or("No input file given")?;
    Ok(Command::Compile(parsed))
}

fn print_usage(program: &str) {
    println!(
        r#"stylec {} - Stylesheet compiler

USAGE:
    {} <INPUT> [OPTIONS]

OPTIONS:
    -h, --help            Print this help message
    -V, --version         Print version information
    -o, --output <PATH>   Write the compiled tree to PATH (default: <INPUT>.stylec)
    --config <PATH>       Read compile options from a JSON file
    --json                Print the compiled tree as JSON
    --deps                Print every file the compile read
    --classes             Print the generated class identifiers

EXAMPLES:
    {} styles/main.css
    {} styles/main.css -o build/main.stylec --deps

"#,
        VERSION, program, program, program
    );
}

fn default_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".stylec");
    PathBuf::from(name)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let options = match &args.config {
        Some(path) => CompileOptions::from_json_file(path)?,
        None => CompileOptions::default(),
    };

    let output = Compiler::new(options).compile(&args.input)?;

    let out_path = args.output.clone().unwrap_or_else(|| default_output(&args.input));
    fs::write(&out_path, &output.bytes).map_err(|e| format!("{}: {}", out_path.display(), e))?;
    log::info!("Wrote {}", out_path.display());

    report(args, &output)
}

fn report(args: &Args, output: &CompileOutput) -> Result<(), Box<dyn std::error::Error>> {
    if args.json {
        println!("{}", stylec_style::to_json(&output.wire)?);
    }
    if args.deps {
        for path in &output.dependencies {
            println!("{}", path.display());
        }
    }
    if args.classes {
        for (class, ident) in output.class_names.iter() {
            println!("{} {}", class, ident);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        parse_args(&args)
    }

    #[test]
    fn test_parse_compile() {
        let command = parse(&["main.css", "-o", "out.bin", "--deps", "--classes"]).unwrap();
        assert_eq!(
            command,
            Command::Compile(Args {
                input: PathBuf::from("main.css"),
                output: Some(PathBuf::from("out.bin")),
                deps: true,
                classes: true,
                ..Args::default()
            })
        );
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(parse(&["-h"]).unwrap(), Command::Help);
        assert_eq!(parse(&["main.css", "--version"]).unwrap(), Command::Version);
        assert!(parse(&[]).is_err());
        assert!(parse(&["a.css", "b.css"]).is_err());
        assert!(parse(&["a.css", "--config"]).is_err());
        assert!(parse(&["a.css", "--fast"]).is_err());
    }

    #[test]
    fn test_default_output() {
        assert_eq!(default_output(Path::new("styles/main.css")), PathBuf::from("styles/main.css.stylec"));
    }
}
