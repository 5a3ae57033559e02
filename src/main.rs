use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use superres_scripts::{
    cli::{self, Cli},
    console::Console,
    error::Error,
    logging,
    ports::{self, PortChoice},
    serial::connection::Connection,
    session::Session,
};
use tokio::sync::Notify;
use tracing::{error, info};

async fn forward_ctrl_c(interrupt: Arc<Notify>) {
    loop {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C");
                interrupt.notify_one();
            }
            Err(e) => {
                error!(?e, "Cannot listen for Ctrl-C");
                return;
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level, cli.log_dir.clone()).await;

    let config = cli.load_config()?;

    let discovered = ports::list_ports();
    for port in &discovered {
        println!("{port}");
    }

    let mut console = Console::stdio();

    let port = match ports::choose_port(&discovered, config.port.as_deref()) {
        PortChoice::Configured(port) | PortChoice::AutoSelected(port) => port,
        PortChoice::AskOperator => ports::pick_port(&mut console, &discovered).await?,
        PortChoice::NoPorts => return Err(Error::NoPorts.into()),
    };

    let connection = match Connection::open(&port, config.baud) {
        Ok(connection) => connection,
        Err(e) => {
            println!("Port unavailable");
            error!(%e, "Cannot continue without the port");
            return Err(e.into());
        }
    };

    let interrupt = Arc::new(Notify::new());
    tokio::spawn(forward_ctrl_c(interrupt.clone()));

    Session::new(connection, config.script_table(), console, interrupt)
        .with_echo_idle_timeout(config.echo_idle_timeout())
        .run()
        .await?;

    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let mut cli = Cli::parse();

    if let Some(command) = cli.command.take() {
        cli::handle_command(command, &cli.load_config()?)?;

        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(cli));

    logging::shutdown();

    // A pending stdin read lives on a blocking thread, don't wait for it.
    runtime.shutdown_background();

    result
}
