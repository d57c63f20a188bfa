//! Command handlers and dispatch.
//!
//! [`dispatch`] is the tagged-variant dispatcher: an exhaustive match
//! from the parsed [`Commands`] value to its handler. Every command
//! opens one Device Session through the injected session factory —
//! except the enumeration pseudo-command `list-devices`, which never
//! touches a device. Handlers receive the open session and return a
//! [`Report`] for the dispatcher to render.

pub mod device;
pub mod ethereum;
pub mod exit_codes;
pub mod firmware;
pub mod message;

use devgate_chain::rpc::DEFAULT_NODE;
use devgate_chain::units::UnitTable;
use devgate_core::error::DevgateError;
use devgate_core::report::Report;
use devgate_core::Config;
use devgate_device::DeviceClient;
use devgate_firmware::{FirmwareSelector, DEFAULT_CATALOG_URL};

use crate::cli::args::Commands;

/// Produces the Device Session for the invocation. Called at most once.
pub type SessionFactory<'a> =
    Box<dyn FnOnce() -> Result<Box<dyn DeviceClient>, DevgateError> + 'a>;

/// Route a parsed command to its handler.
///
/// `config` supplies defaults for per-command options the caller left
/// unset (node address, catalog URL); explicit flags always win.
///
/// # Errors
///
/// Propagates session-open failures and whatever the handler returns.
pub fn dispatch(
    command: Commands,
    config: &Config,
    session: SessionFactory<'_>,
) -> Result<Report, DevgateError> {
    match command {
        // Enumeration pseudo-command: no session, by design.
        Commands::ListDevices => device::ListDevicesCommand.run(),

        Commands::Features => {
            let mut session = session()?;
            device::FeaturesCommand.run(session.as_mut())
        }

        Commands::Entropy { length } => {
            let mut session = session()?;
            device::EntropyCommand { length }.run(session.as_mut())
        }

        Commands::SetLabel { label } => {
            let mut session = session()?;
            device::SetLabelCommand { label }.run(session.as_mut())
        }

        Commands::SignMessage {
            derivation,
            message,
        } => {
            let mut session = session()?;
            message::SignMessageCommand {
                derivation,
                message,
            }
            .run(session.as_mut())
        }

        Commands::Ethereum { command } => match command {
            crate::cli::args::EthereumCommands::Address { derivation } => {
                let mut session = session()?;
                ethereum::AddressCommand { derivation }.run(session.as_mut())
            }
            crate::cli::args::EthereumCommands::Sign(args) => {
                let node = args
                    .node
                    .clone()
                    .or_else(|| config.defaults.node.clone())
                    .unwrap_or_else(|| DEFAULT_NODE.to_string());
                let mut session = session()?;
                ethereum::SignCommand::new(args, node, UnitTable::ethereum())
                    .run(session.as_mut())
            }
        },

        Commands::FirmwareUpdate(args) => {
            let catalog_url = args
                .catalog_url
                .or_else(|| config.defaults.catalog_url.clone())
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
            let mut session = session()?;
            firmware::FirmwareUpdateCommand {
                selector: FirmwareSelector {
                    file: args.file,
                    url: args.url,
                    version: args.fw_version,
                },
                skip_check: args.skip_check,
                catalog_url,
            }
            .run(session.as_mut())
        }
    }
}

// ============================================================================
// Test support
// ============================================================================
