use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use unheralded::build::build_site;
use unheralded::config::Config;

fn main() {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Logs every file read and written"),
        )
        .subcommand(project_args(
            SubCommand::with_name("build").about("Generates the site into the output directory"),
        ))
        .subcommand(project_args(
            SubCommand::with_name("publish").about("Generates the site and deploys it"),
        ))
        .get_matches();

    let verbose = matches.is_present("verbose")
        || matches
            .subcommand()
            .1
            .map_or(false, |m| m.is_present("verbose"));
    init_logging(verbose);

    let result = match matches.subcommand() {
        ("build", Some(matches)) => run(matches, false),
        ("publish", Some(matches)) => run(matches, true),
        _ => Ok(()),
    };

    if let Err(err) = result {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        log::error!("{}", message);
        std::process::exit(1);
    }
}

fn project_args<'a, 'b>(command: App<'a, 'b>) -> App<'a, 'b> {
    command
        .arg(
            Arg::with_name("project")
                .long("project")
                .takes_value(true)
                .value_name("DIR")
                .help("The project directory; by default `site.yaml` is searched for from the current directory upwards"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .takes_value(true)
                .value_name("DIR")
                .help("Overrides the output directory"),
        )
}

fn run(matches: &ArgMatches, deploy: bool) -> Result<(), Box<dyn Error>> {
    let mut config = match matches.value_of("project") {
        Some(dir) => Config::from_project_file(&Path::new(dir).join(unheralded::config::PROJECT_FILE))?,
        None => Config::from_directory(&std::env::current_dir()?)?,
    };
    if let Some(output) = matches.value_of("output") {
        config.output_directory = PathBuf::from(output);
    }
    log::debug!("loaded project `{}`", config.root_directory.display());

    build_site(config, deploy)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}
