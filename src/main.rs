use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use docpages::build::build_site;
use docpages::config::Config;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = App::new("docpages")
        .about("Builds documentation and guide pages")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Raises the log level (-v for debug, -vv for trace)"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(
                    Arg::with_name("project")
                        .index(1)
                        .default_value(".")
                        .help("The project directory, or any directory beneath it"),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .help("The output directory (defaults to {project}/_output)"),
                ),
        )
        .get_matches();

    init_tracing(matches.occurrences_of("verbose"));

    if let Err(e) = run(&matches) {
        // Error messages already include their causes.
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(matches) = matches.subcommand_matches("build") {
        let project = Path::new(matches.value_of("project").unwrap_or("."));
        let config = Config::from_directory(project, matches.value_of("output").map(Path::new))?;
        let pages = build_site(&config)?;
        println!(
            "Wrote {} pages to {}",
            pages,
            config.root_output_directory.display()
        );
    }
    Ok(())
}

fn init_tracing(verbosity: u64) {
    let filter = match verbosity {
        0 => "docpages=info",
        1 => "docpages=debug",
        _ => "docpages=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
