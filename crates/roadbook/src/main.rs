//! `roadbook` - CLI for delivery records and driver routes

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;
use roadbook_core::{DeliveryStatus, ReferencePoint};

use roadbook::cli::{
    display, Cli, Command, ConfigCommand, CreateCommand, ListCommand, OutputFormat, RecordRef,
    RouteCommand, SetStatusCommand, UpdateCommand,
};
use roadbook::{
    init_logging, locate, Config, DeliveryService, FixedLocation, LocationProvider, RecordKind,
    RecordStore, Storage, Unavailable,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Config(cmd) => handle_config(&config, cmd),
        Command::Create(cmd) => handle_create(&open_service(&config)?, &cmd),
        Command::Update(cmd) => handle_update(&open_service(&config)?, &cmd),
        Command::Delete(cmd) => handle_delete(&open_service(&config)?, &cmd),
        Command::Get(cmd) => handle_get(&open_service(&config)?, &cmd),
        Command::List(cmd) => handle_list(&open_service(&config)?, &cmd),
        Command::SetStatus(cmd) => handle_set_status(&open_service(&config)?, &cmd),
        Command::Route(cmd) => handle_route(&config, &open_service(&config)?, &cmd).await,
        Command::Status(cmd) => handle_status(&config, &open_service(&config)?, cmd.json),
    }
}

type Service = DeliveryService<Storage>;

fn open_service(config: &Config) -> anyhow::Result<Service> {
    let storage = Storage::open(config.database_path())?;
    Ok(DeliveryService::new(storage))
}

fn handle_create(service: &Service, cmd: &CreateCommand) -> anyhow::Result<()> {
    let id = service.store().create(cmd.kind.into(), &cmd.payload)?;
    println!("{id}");
    Ok(())
}

fn handle_update(service: &Service, cmd: &UpdateCommand) -> anyhow::Result<()> {
    let kind: RecordKind = cmd.kind.into();
    if !service.store().update(kind, &cmd.id, &cmd.patch)? {
        bail!(roadbook::Error::not_found(kind, &cmd.id));
    }
    println!("Updated {kind} {}", cmd.id);
    Ok(())
}

fn handle_delete(service: &Service, cmd: &RecordRef) -> anyhow::Result<()> {
    let kind: RecordKind = cmd.kind.into();
    if !service.store().delete(kind, &cmd.id)? {
        bail!(roadbook::Error::not_found(kind, &cmd.id));
    }
    println!("Deleted {kind} {}", cmd.id);
    Ok(())
}

fn handle_get(service: &Service, cmd: &RecordRef) -> anyhow::Result<()> {
    let kind: RecordKind = cmd.kind.into();
    if kind == RecordKind::Delivery {
        let record = service
            .delivery(&cmd.id)?
            .ok_or_else(|| roadbook::Error::not_found(kind, &cmd.id))?;
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let doc = service
            .store()
            .get(kind, &cmd.id)?
            .ok_or_else(|| roadbook::Error::not_found(kind, &cmd.id))?;
        println!("{}", serde_json::to_string_pretty(&doc)?);
    }
    Ok(())
}

fn handle_list(service: &Service, cmd: &ListCommand) -> anyhow::Result<()> {
    let kind: RecordKind = cmd.kind.into();

    if kind == RecordKind::Delivery {
        let records = service.deliveries(cmd.status.map(DeliveryStatus::from));
        match cmd.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
            OutputFormat::Table => print!("{}", display::deliveries_table(&records)),
            OutputFormat::Plain => print!("{}", display::deliveries_plain(&records)),
        }
        return Ok(());
    }

    if cmd.status.is_some() {
        bail!("--status only applies to deliveries");
    }
    let docs = service
        .store()
        .list(kind)
        .with_context(|| format!("failed to list {kind} records"))?;
    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&docs)?),
        OutputFormat::Table => print!("{}", display::records_table(&docs)),
        OutputFormat::Plain => print!("{}", display::records_plain(&docs)),
    }
    Ok(())
}

fn handle_set_status(service: &Service, cmd: &SetStatusCommand) -> anyhow::Result<()> {
    let status = DeliveryStatus::from(cmd.status);
    if !service.set_status(&cmd.id, status)? {
        bail!(roadbook::Error::not_found(RecordKind::Delivery, &cmd.id));
    }
    println!("Delivery {} is now {status}", cmd.id);
    Ok(())
}

async fn handle_route(config: &Config, service: &Service, cmd: &RouteCommand) -> anyhow::Result<()> {
    let provider: Box<dyn LocationProvider> = match (cmd.lat, cmd.lon) {
        (Some(lat), Some(lon)) => {
            let mut point = ReferencePoint::new(lat, lon);
            point.accuracy = cmd.accuracy;
            Box::new(FixedLocation::new(point))
        }
        _ => match config.depot() {
            Some(depot) => Box::new(FixedLocation::new(depot)),
            None => Box::new(Unavailable),
        },
    };
    let reference = locate(provider.as_ref(), config.location_timeout()).await;

    let statuses: Vec<DeliveryStatus> = if cmd.status.is_empty() {
        config.dispatch.route_statuses.clone()
    } else {
        cmd.status.iter().copied().map(DeliveryStatus::from).collect()
    };

    let route = service.driver_route(cmd.driver.as_deref(), &statuses, reference.as_ref());

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&route)?),
        OutputFormat::Table => print!("{}", display::route_table(&route)),
        OutputFormat::Plain => print!("{}", display::route_plain(&route)),
    }
    Ok(())
}

fn handle_status(config: &Config, service: &Service, json: bool) -> anyhow::Result<()> {
    let stats = service.store().stats()?;
    let active = service
        .deliveries(None)
        .iter()
        .filter(|r| r.status.is_active())
        .count();

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "records": stats,
            "active_deliveries": active,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("roadbook status");
        println!("---------------");
        println!("Database:          {}", config.database_path().display());
        println!("Database size:     {} bytes", stats.db_size_bytes);
        println!("Customers:         {}", stats.customers);
        println!("Products:          {}", stats.products);
        println!("Drivers:           {}", stats.drivers);
        println!("Deliveries:        {}", stats.deliveries);
        println!("Active deliveries: {active}");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let statuses: Vec<&str> = config
                    .dispatch
                    .route_statuses
                    .iter()
                    .map(DeliveryStatus::as_str)
                    .collect();
                let depot = config.depot().map_or_else(
                    || "not set".to_string(),
                    |d| format!("{}, {}", d.latitude, d.longitude),
                );

                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Dispatch]");
                println!("  Depot:              {depot}");
                println!(
                    "  Location timeout:   {}ms",
                    config.dispatch.location_timeout_ms
                );
                println!("  Route statuses:     {}", statuses.join(", "));
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
