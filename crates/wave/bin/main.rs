#[macro_use]
extern crate tracing;

use args::{Wave as WaveArgs, WaveSubcommand};
use clap::Parser;
use eyre::Result;
use tokio::signal::ctrl_c;
use wave::{no_waves, render_waves};
use wave_cli::{handler, utils};
use wave_portal::WavePortal;
use yansi::Paint;

mod args;

fn main() -> Result<()> {
    handler::install();
    utils::load_dotenv();
    utils::subscriber();
    utils::enable_paint();
    let args = WaveArgs::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: WaveArgs) -> Result<()> {
    let config = args.portal.load_config()?;
    debug!(profile = %config.profile, contract = %config.contract, "loaded config");
    let portal = WavePortal::from_config(&config).await;

    match args.cmd {
        WaveSubcommand::List => {
            portal.start().await;
            print_waves(&portal.waves());
            portal.teardown().await;
        }
        WaveSubcommand::Watch => watch(&portal).await,
        WaveSubcommand::Connect => match portal.connect_wallet().await {
            Some(account) => println!("{account}"),
            None => eyre::bail!("no account connected"),
        },
        WaveSubcommand::Send { message } => {
            portal.check_if_wallet_is_connected().await;
            portal.set_message(message);
            match portal.wave().await {
                Some(tx_hash) => println!("{tx_hash}"),
                None => eyre::bail!("wave was not mined"),
            }
        }
        WaveSubcommand::Count => {
            let count = portal.gateway().get_total_count().await?;
            println!("{count}");
        }
    }
    Ok(())
}

fn print_waves(waves: &[wave_portal::Wave]) {
    if waves.is_empty() {
        println!("{}", no_waves());
    } else {
        println!("{}", render_waves(waves));
    }
}

/// Prints the history, then every wave appended to the list until ctrl-c.
async fn watch(portal: &WavePortal) {
    let mut revisions = portal.wave_list().subscribe();
    portal.start().await;

    let mut printed = 0;
    loop {
        let waves = portal.waves();
        // a new snapshot may have replaced what was printed so far
        if waves.len() < printed {
            printed = 0;
        }
        if printed < waves.len() {
            if printed > 0 {
                println!();
            }
            println!("{}", render_waves(&waves[printed..]));
            printed = waves.len();
        }

        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = ctrl_c() => {
                println!("{}", "stopped watching".dim());
                break;
            }
        }
    }

    portal.teardown().await;
}
