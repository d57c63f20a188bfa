//! CLI argument definitions.
//!
//! The command table is assembled statically from these clap derive
//! structures: each subcommand declares its argument specs (name, value
//! kind, default, closed choice set) through attributes, and dispatch is
//! an exhaustive match over [`Commands`] — completeness is checked at
//! compile time.
//!
//! ## Global Options
//!
//! - `-v, --verbose` - Increase verbosity level
//! - `-t, --transport <KIND>` - Device transport (usb, udp, pipe, bridge)
//! - `-p, --path <PATH>` - Transport path (device address, socket, ...)
//! - `--format <FORMAT>` - Output rendering (text, json)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use devgate_device::TransportKind;

/// Default derivation path for Ethereum keys.
pub const DEFAULT_ETH_PATH: &str = "m/44'/60'/0'/0/0";

/// Operator CLI for the DevGate hardware signing device.
///
/// DevGate turns command invocations into device-protocol calls,
/// enriches transaction fields from an external node where needed, and
/// renders the results.
#[derive(Debug, Parser)]
#[command(name = "devgate")]
#[command(author, version, about = "Control a DevGate hardware signing device")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Device transport kind
    ///
    /// How to reach the device: enumerated USB, the UDP emulator, a
    /// local pipe, or the bridge daemon.
    #[arg(short, long, global = true, value_enum, value_name = "KIND")]
    pub transport: Option<TransportOpt>,

    /// Transport path
    ///
    /// Device address for enumerated transports (empty selects the
    /// first device found), `host:port` for udp, socket path for pipe.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub path: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List connected devices
    ///
    /// Scans the enumerated transports once and prints what was found.
    /// This command never opens a device session.
    ListDevices,

    /// Display the device feature report
    ///
    /// Shows vendor, model, firmware version, label, and whether the
    /// device holds a seed.
    Features,

    /// Request device-generated entropy
    Entropy {
        /// Number of random bytes to request
        #[arg(value_name = "LENGTH")]
        length: u32,
    },

    /// Set the device label
    ///
    /// The device asks for confirmation on its own display before
    /// applying the change.
    SetLabel {
        /// New label text
        #[arg(value_name = "LABEL")]
        label: String,
    },

    /// Sign a personal message with a device key
    ///
    /// The signature prints as base64; the signing address as hex.
    SignMessage {
        /// Derivation path selecting the signing key
        #[arg(short = 'n', long, default_value = DEFAULT_ETH_PATH, value_name = "PATH")]
        derivation: String,

        /// The message to sign (UTF-8 text)
        #[arg(value_name = "MESSAGE")]
        message: String,
    },

    /// Ethereum commands
    ///
    /// Address derivation and transaction signing against the device,
    /// with optional field enrichment from an external node.
    Ethereum {
        /// Ethereum command to execute
        #[command(subcommand)]
        command: EthereumCommands,
    },

    /// Install a firmware image on the device
    ///
    /// The image comes from an explicit file, an explicit URL, an exact
    /// release version, or — with no selector — the latest release in
    /// the catalog. The device asks for confirmation on its own display
    /// before accepting the transfer.
    FirmwareUpdate(FirmwareUpdateArgs),
}

/// Ethereum-specific commands.
#[derive(Debug, Subcommand)]
pub enum EthereumCommands {
    /// Display the address for a derivation path
    ///
    /// The address is derived on the device, never computed locally.
    Address {
        /// Derivation path selecting the key
        #[arg(short = 'n', long, default_value = DEFAULT_ETH_PATH, value_name = "PATH")]
        derivation: String,
    },

    /// Build, enrich, and sign a transaction
    ///
    /// Gas price, gas limit, and nonce may be omitted; missing fields
    /// are fetched from the external node before signing.
    Sign(EthereumSignArgs),
}

/// Arguments for `ethereum sign`.
#[derive(Debug, Clone, Args)]
pub struct EthereumSignArgs {
    /// Derivation path selecting the signing key
    #[arg(short = 'n', long, default_value = DEFAULT_ETH_PATH, value_name = "PATH")]
    pub derivation: String,

    /// Recipient address (0x-prefixed hex)
    #[arg(value_name = "TO")]
    pub to: String,

    /// Amount to transfer: "<integer> <unit>" or wei
    ///
    /// For example "1 ether", "20 gwei", or "1000000000000000000".
    #[arg(value_name = "VALUE")]
    pub value: String,

    /// Gas price, same amount syntax as VALUE
    ///
    /// Fetched from the node when omitted.
    #[arg(long, value_name = "AMOUNT")]
    pub gas_price: Option<String>,

    /// Gas limit
    ///
    /// Estimated by the node when omitted. A non-empty DATA payload
    /// always re-estimates, replacing this value.
    #[arg(long, value_name = "GAS")]
    pub gas_limit: Option<u64>,

    /// Account nonce
    ///
    /// Fetched from the node when omitted.
    #[arg(long, value_name = "NONCE")]
    pub nonce: Option<u64>,

    /// Call payload as hex (with or without 0x prefix)
    #[arg(long, default_value = "", value_name = "DATA")]
    pub data: String,

    /// Chain id for replay protection
    #[arg(long, default_value_t = 1, value_name = "ID")]
    pub chain_id: u64,

    /// External node as host:port
    #[arg(long, value_name = "NODE")]
    pub node: Option<String>,

    /// Publish the signed transaction through the node
    #[arg(long)]
    pub publish: bool,
}

/// Arguments for `firmware-update`.
#[derive(Debug, Clone, Args)]
pub struct FirmwareUpdateArgs {
    /// Read the image from a local file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Fetch the image from a URL
    #[arg(short, long, value_name = "URL", conflicts_with = "file")]
    pub url: Option<String>,

    /// Install an exact release version, e.g. "1.2.0"
    #[arg(long, value_name = "VERSION", conflicts_with_all = ["file", "url"])]
    pub fw_version: Option<String>,

    /// Skip image validation and fingerprint verification
    #[arg(long)]
    pub skip_check: bool,

    /// Release catalog URL
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,
}

/// Transport kinds accepted by `--transport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportOpt {
    /// Enumerated USB HID devices
    Usb,
    /// Datagram link to a device emulator
    Udp,
    /// Local stream socket
    Pipe,
    /// Devices held by the local bridge daemon
    Bridge,
}

impl TransportOpt {
    /// The resolver-facing transport kind.
    #[must_use]
    pub const fn kind(self) -> TransportKind {
        match self {
            Self::Usb => TransportKind::Usb,
            Self::Udp => TransportKind::Udp,
            Self::Pipe => TransportKind::Pipe,
            Self::Bridge => TransportKind::Bridge,
        }
    }
}

/// Output rendering modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (the default)
    Text,
    /// Machine-readable JSON
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_declaration_is_consistent() {
        // Duplicate names, conflicting shorts, and similar registry
        // configuration errors surface here at build time.
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ethereum_sign() {
        let cli = Cli::try_parse_from([
            "devgate",
            "ethereum",
            "sign",
            "--gas-limit",
            "21000",
            "--nonce",
            "9",
            "0x3535353535353535353535353535353535353535",
            "1 ether",
        ])
        .unwrap();

        match cli.command {
            Commands::Ethereum {
                command: EthereumCommands::Sign(args),
            } => {
                assert_eq!(args.to, "0x3535353535353535353535353535353535353535");
                assert_eq!(args.value, "1 ether");
                assert_eq!(args.gas_limit, Some(21_000));
                assert_eq!(args.nonce, Some(9));
                assert!(args.gas_price.is_none());
                assert!(!args.publish);
                assert_eq!(args.derivation, DEFAULT_ETH_PATH);
            }
            other => panic!("parsed into {other:?}"),
        }
    }

    #[test]
    fn test_unknown_command_is_usage_error() {
        assert!(Cli::try_parse_from(["devgate", "frobnicate"]).is_err());
    }

    #[test]
    fn test_missing_arguments_is_usage_error() {
        assert!(Cli::try_parse_from(["devgate", "ethereum", "sign"]).is_err());
        assert!(Cli::try_parse_from(["devgate", "entropy"]).is_err());
    }

    #[test]
    fn test_transport_choices_are_closed() {
        assert!(Cli::try_parse_from(["devgate", "-t", "serial", "features"]).is_err());
        let cli = Cli::try_parse_from(["devgate", "-t", "bridge", "features"]).unwrap();
        assert_eq!(cli.transport, Some(TransportOpt::Bridge));
    }

    #[test]
    fn test_firmware_selectors_conflict() {
        assert!(Cli::try_parse_from([
            "devgate",
            "firmware-update",
            "--file",
            "fw.bin",
            "--url",
            "http://example/fw.bin",
        ])
        .is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["devgate", "features", "--format", "json", "-t", "udp"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.transport.map(TransportOpt::kind), Some(TransportKind::Udp));
    }
}
