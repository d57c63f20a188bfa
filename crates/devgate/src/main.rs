//! DevGate CLI entry point.
//!
//! Parses the invocation, wires configuration defaults under the
//! explicit flags, builds the session factory for the selected
//! transport, and renders the dispatched result. Usage errors never get
//! this far: clap prints help and exits before a device is contacted.

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use clap::Parser;
use devgate::cli::commands::exit_codes::{EXIT_ERROR, EXIT_SUCCESS};
use devgate::cli::{dispatch, Cli, OutputFormat, SessionFactory, TransportOpt};
use devgate::logging::{init_logging, verbosity_to_level, LogConfig};
use devgate_core::error::DevgateError;
use devgate_core::report::{error_envelope, Report};
use devgate_core::Config;
use devgate_device::{DeviceClient, TransportKind, WireClient};

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: verbosity_to_level(cli.verbose),
        show_targets: cli.verbose >= 2,
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("{e}");
        std::process::exit(EXIT_ERROR);
    }

    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let Cli {
        verbose: _,
        transport,
        path,
        format,
        command,
    } = cli;

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => return report_error(&e.into(), resolve_format(format, None)),
    };
    let format = resolve_format(format, config.defaults.format.as_deref());

    let kind = match resolve_transport(transport, &config) {
        Ok(kind) => kind,
        Err(e) => return report_error(&e, format),
    };
    let path = path
        .or_else(|| config.defaults.path.clone())
        .unwrap_or_default();

    let session: SessionFactory<'_> = Box::new(move || {
        WireClient::open(kind, &path)
            .map(|client| Box::new(client) as Box<dyn DeviceClient>)
            .map_err(DevgateError::from)
    });

    match dispatch(command, &config, session) {
        Ok(report) => {
            render(&report, format);
            EXIT_SUCCESS
        }
        Err(e) => report_error(&e, format),
    }
}

/// Explicit flag beats config default beats text.
fn resolve_format(flag: Option<OutputFormat>, configured: Option<&str>) -> OutputFormat {
    flag.or(match configured {
        Some("json") => Some(OutputFormat::Json),
        Some("text") => Some(OutputFormat::Text),
        _ => None,
    })
    .unwrap_or(OutputFormat::Text)
}

/// Explicit flag beats config default beats USB.
fn resolve_transport(
    flag: Option<TransportOpt>,
    config: &Config,
) -> Result<TransportKind, DevgateError> {
    match flag {
        Some(opt) => Ok(opt.kind()),
        None => match &config.defaults.transport {
            Some(name) => name.parse::<TransportKind>().map_err(DevgateError::from),
            None => Ok(TransportKind::Usb),
        },
    }
}

fn render(report: &Report, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", report.render_text().trim_end_matches('\n'));
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&report.to_json()) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => eprintln!("Error: failed to render output: {e}"),
        },
    }
}

fn report_error(error: &DevgateError, format: OutputFormat) -> i32 {
    match format {
        OutputFormat::Text => eprintln!("Error: {error}"),
        OutputFormat::Json => {
            let envelope = error_envelope(error.kind(), error.protocol_code(), &error.to_string());
            match serde_json::to_string_pretty(&envelope) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => eprintln!("Error: failed to render error: {e}"),
            }
        }
    }
    error.exit_code()
}
