use std::io::IsTerminal;
use std::path::Path;

use clap::Parser;

use pvecheck::api::pve::PveEndpoint;
use pvecheck::cli::{Cli, Command};
use pvecheck::config;
use pvecheck::credentials;
use pvecheck::logging::{self, Verbosity};
use pvecheck::observer::Observer;
use pvecheck::observer::interactive::InteractiveObserver;
use pvecheck::observer::plain::PlainObserver;
use pvecheck::paths;
use pvecheck::preflight::{Preflight, Suite};
use pvecheck::report;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Spinners and tracing output on the same terminal corrupt each other,
    // so the interactive UI silences the stderr layer.
    let interactive = !cli.verbose && std::io::stdout().is_terminal();
    let verbosity = match (cli.verbose, interactive) {
        (true, _) => Verbosity::Verbose,
        (false, true) => Verbosity::Silent,
        (false, false) => Verbosity::Normal,
    };
    logging::init(verbosity, cli.log_file.as_deref())?;

    let (suite, password) = match cli.command {
        Some(Command::Init { force }) => {
            return pvecheck::init::run(Path::new(paths::LOCAL_CONFIG), force).map_err(Into::into);
        }
        Some(Command::Template { password }) => (Suite::Template, password),
        Some(Command::Check { password }) => (Suite::Full, password),
        None => (Suite::Full, None),
    };

    let (mut sys_config, source) = config::resolve_config(cli.config.as_deref())?;
    match &source {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!("no config file found, using defaults"),
    }
    sys_config.apply(&cli.target.overrides());
    config::validate_config(&sys_config)?;

    let creds = credentials::credentials(&sys_config.proxmox.user, password)?;
    let endpoint = PveEndpoint::new(&sys_config.proxmox)?;
    tracing::debug!(addr = endpoint.address(), url = %endpoint.api_url(), "checking endpoint");

    for line in report::banner(suite) {
        println!("{line}");
    }

    let report = {
        let mut observer: Box<dyn Observer> = if interactive {
            Box::new(InteractiveObserver::new())
        } else {
            Box::new(PlainObserver)
        };
        Preflight::new(&endpoint, &sys_config)
            .run(suite, &creds, observer.as_mut())
            .await
    };

    for line in report::summary_lines(&report, suite) {
        println!("{line}");
    }

    let code = report.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
