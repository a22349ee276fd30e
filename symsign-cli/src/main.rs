//! Command-line front end for the symsign library.
//!
//! Exit codes: 0 when the operation produced at least one useful result,
//! 1 when a precondition failed or nothing could be produced. Failure
//! reasons go to stderr; reports and listings only ever contain results.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};

use symsign::{
    detect, dump_signatures, enumerate_sources, load_path_list, rewrite_source_links, PatchTool,
    SignatureKind,
};

fn print_error(error: &anyhow::Error) {
    eprintln!("Error: {error}");

    for cause in error.chain().skip(1) {
        eprintln!("   caused by {cause}");
    }
}

fn dump(matches: &ArgMatches, kind: SignatureKind) -> Result<()> {
    let output = matches.get_one::<PathBuf>("output").unwrap();
    let input = matches.get_one::<PathBuf>("input").unwrap();

    let paths = load_path_list(input)
        .with_context(|| format!("could not read the input file list {}", input.display()))?;
    let count = dump_signatures(output, &paths, kind)?;

    println!(
        "Dumped {count} signature entries to the file {}",
        output.display()
    );
    Ok(())
}

fn list_sources(matches: &ArgMatches) -> Result<()> {
    let symbols_file = matches.get_one::<PathBuf>("symbols").unwrap();

    let sources = enumerate_sources(symbols_file)
        .with_context(|| format!("unable to read indexed sources from {}", symbols_file.display()))?;
    for source in sources {
        println!("{source}");
    }
    Ok(())
}

fn pdb_type(matches: &ArgMatches) -> Result<()> {
    let symbols_file = matches.get_one::<PathBuf>("symbols").unwrap();
    if !symbols_file.is_file() {
        bail!("PDB file {} does not exist", symbols_file.display());
    }

    let format = detect(symbols_file)
        .with_context(|| format!("unable to read the PDB type of {}", symbols_file.display()))?;
    println!("{format}");
    Ok(())
}

fn update_source_urls(matches: &ArgMatches) -> Result<()> {
    let symbols_file = matches.get_one::<PathBuf>("symbols").unwrap();
    let descriptor = matches.get_one::<PathBuf>("descriptor").unwrap();
    let tool = matches.get_one::<PathBuf>("patch-tool").unwrap();

    rewrite_source_links(symbols_file, descriptor, &PatchTool::new(tool))
        .with_context(|| format!("cannot update the PDB file {}", symbols_file.display()))?;

    println!("Updated source links in {}", symbols_file.display());
    Ok(())
}

fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("dump-symbol-signs", matches)) => dump(matches, SignatureKind::Symbol),
        Some(("dump-bin-signs", matches)) => dump(matches, SignatureKind::Binary),
        Some(("list-sources", matches)) => list_sources(matches),
        Some(("pdb-type", matches)) => pdb_type(matches),
        Some(("update-source-urls", matches)) => update_source_urls(matches),
        _ => unreachable!("subcommand required"),
    }
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .required(true)
        .value_name("file")
        .value_parser(value_parser!(PathBuf))
        .help("Path of the XML report to write")
}

fn input_arg() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .required(true)
        .value_name("list-file")
        .value_parser(value_parser!(PathBuf))
        .help("File containing the target paths, one per line")
}

fn symbols_arg() -> Arg {
    Arg::new("symbols")
        .required(true)
        .value_name("symbols-file")
        .value_parser(value_parser!(PathBuf))
        .help("Path to the symbol file")
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("symsign")
        .about("Extracts symbol and binary signatures for symbol-server indexing")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("dump-symbol-signs")
                .about("Dumps signatures of PDB symbol files into an XML report")
                .arg(output_arg())
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("dump-bin-signs")
                .about("Dumps signatures of PE binaries into an XML report")
                .arg(output_arg())
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("list-sources")
                .about("Prints the source files referenced by a symbol file")
                .arg(symbols_arg()),
        )
        .subcommand(
            Command::new("pdb-type")
                .about("Prints the debug-information format of a symbol file")
                .arg(symbols_arg()),
        )
        .subcommand(
            Command::new("update-source-urls")
                .about("Rewrites the source-link metadata of a Portable PDB")
                .arg(symbols_arg())
                .arg(
                    Arg::new("descriptor")
                        .short('d')
                        .long("descriptor")
                        .required(true)
                        .value_name("json-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Source descriptor mapping document names to URLs"),
                )
                .arg(
                    Arg::new("patch-tool")
                        .long("patch-tool")
                        .required(true)
                        .value_name("executable")
                        .value_parser(value_parser!(PathBuf))
                        .help("External tool performing the container rewrite"),
                ),
        )
        .get_matches();

    if let Err(error) = execute(&matches) {
        print_error(&error);
        std::process::exit(1);
    }
}
