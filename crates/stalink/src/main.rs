mod cli;
mod error;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stalink_core::{
    AnqpInfoId, ChannelCallback, Command, Hs20AnqpSubtype, MacAddress, SimulatedEngine, StaIface,
    StaIfaceEvent, Supplicant,
};

use crate::cli::Cli;
use crate::error::CliError;

const DEMO_PEER: MacAddress = MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
const DEMO_SSID: &[u8] = b"stalink-demo";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, default_level: &str, json: bool) {
    let level = match verbosity {
        0 => default_level,
        1 => "debug",
        _ => "trace",
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = stalink_config::load_config(cli.config.as_deref())?;

    if cli.write_config {
        let path = cli.config.clone().unwrap_or_else(stalink_config::config_path);
        stalink_config::save_config(&cfg, &path)?;
        println!("{}", path.display());
        return Ok(());
    }

    init_tracing(cli.verbose, &cfg.log_level, cli.log_json);
    let sup_cfg = cfg.to_supplicant_config()?;

    // The simulated engine brings up exactly the configured interfaces.
    let engine = sup_cfg
        .interfaces
        .iter()
        .fold(SimulatedEngine::new(), |engine, name| engine.with_interface(name))
        .into_shared();
    let supplicant = Supplicant::new(sup_cfg, engine);
    let ifaces = supplicant.add_configured_interfaces()?;

    let mut loggers = Vec::with_capacity(ifaces.len());
    for iface in &ifaces {
        loggers.push(attach_event_logger(iface)?);
    }

    supplicant.start().await;
    info!(interfaces = ?supplicant.list_interfaces(), "stalink running");

    if cli.demo {
        for iface in &ifaces {
            run_demo(&supplicant, iface.name()).await;
        }
    }

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    supplicant.shutdown().await;

    // Shutdown drops every subscriber, which closes the logger channels.
    for logger in loggers {
        let _ = logger.await;
    }
    Ok(())
}

fn attach_event_logger(iface: &Arc<StaIface>) -> Result<JoinHandle<()>, CliError> {
    let (callback, rx) = ChannelCallback::new();
    iface.register_callback(callback)?;
    Ok(tokio::spawn(log_events(iface.name().to_owned(), rx)))
}

async fn log_events(ifname: String, mut rx: mpsc::UnboundedReceiver<StaIfaceEvent>) {
    while let Some(event) = rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(json) => info!(iface = %ifname, kind = event.kind(), event = %json, "station event"),
            Err(e) => warn!(iface = %ifname, error = %e, "failed to encode event"),
        }
    }
}

/// Walk one interface through the command surface and log each reply.
async fn run_demo(supplicant: &Supplicant, ifname: &str) {
    let reply = supplicant.execute(ifname, Command::AddNetwork).await;
    log_reply(ifname, "add_network", &reply);

    if let Some(network) = reply.into_network() {
        let selected = network.set_ssid(DEMO_SSID).and_then(|()| network.select());
        if let Err(e) = selected {
            warn!(iface = ifname, network_id = %network.id(), error = %e, "demo network setup failed");
        }
    }

    let script = [
        Command::SetPowerSave { enable: true },
        Command::InitiateTdlsDiscover { peer: DEMO_PEER },
        Command::InitiateAnqpQuery {
            peer: DEMO_PEER,
            info_ids: vec![AnqpInfoId::VenueName, AnqpInfoId::DomainName],
            subtypes: vec![Hs20AnqpSubtype::WanMetrics],
        },
        Command::InitiateHs20IconQuery {
            peer: DEMO_PEER,
            file_name: "icon.png".into(),
        },
        Command::ListNetworks,
    ];
    for command in script {
        let op = command.name();
        let reply = supplicant.execute(ifname, command).await;
        log_reply(ifname, op, &reply);
    }
}

fn log_reply(ifname: &str, op: &str, reply: &stalink_core::Reply) {
    if reply.is_success() {
        info!(iface = ifname, op, payload = ?reply.payload, "reply");
    } else {
        warn!(
            iface = ifname,
            op,
            status = %reply.code(),
            message = %reply.status.debug_message,
            "reply"
        );
    }
}
