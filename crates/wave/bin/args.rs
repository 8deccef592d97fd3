use clap::{Parser, Subcommand};
use wave_cli::opts::PortalOpts;

/// Wave at the WavePortal contract.
#[derive(Parser)]
#[command(name = "wave", version, next_display_order = None)]
pub struct Wave {
    #[command(flatten)]
    pub portal: PortalOpts,

    #[command(subcommand)]
    pub cmd: WaveSubcommand,
}

#[derive(Subcommand)]
pub enum WaveSubcommand {
    /// Prints every wave sent so far.
    #[command(visible_alias = "ls")]
    List,

    /// Prints every wave sent so far, then each new wave as it is mined, until interrupted.
    #[command(visible_alias = "w")]
    Watch,

    /// Asks the wallet to connect and prints the connected account.
    Connect,

    /// Sends a wave and waits until it is mined.
    #[command(visible_alias = "s")]
    Send {
        /// The message to wave with.
        message: String,
    },

    /// Prints the total number of waves.
    #[command(visible_alias = "c")]
    Count,
}
