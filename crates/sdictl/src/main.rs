//! sdictl entry point.
//!
//! Loads a platform description, builds the SDI registry over the
//! in-memory bus declared in its `simulation` section and runs one command.

mod cli;

use anyhow::{anyhow, Context};
use clap::Parser;
use cli::{parse_hex_bytes, Cli, Commands, EntityCommands, MediaCommands};
use log::{debug, error, info};
use sdi_types::{EntityType, ResourceType};
use serde_json::{json, Map, Value};
use sonic_sdi::media::{
    ChannelMonitor, ChannelMonitorStatus, ChannelStatus, MediaParameter, ModuleMonitor,
    ModuleStatus, Monitor, VendorInfoType,
};
use sonic_sdi::{
    EntityHdl, PlatformConfig, Registry, ResourceHdl, SdiError, SdiObject, SdiResult, SharedBus,
};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let args = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("sdictl: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> anyhow::Result<()> {
    let config = PlatformConfig::load(&args.platform)
        .with_context(|| format!("loading {}", args.platform.display()))?;
    let bus: SharedBus = Arc::new(config.simulation_bus()?);
    let registry = Registry::from_platform(&config, bus)?;
    info!("Using platform {:?}", config.name);

    let report = match &args.command {
        Commands::Entities => entities(&registry)?,
        Commands::Entity(cmd) => entity_command(&registry, cmd)?,
        Commands::Media(cmd) => media_command(&registry, cmd)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report, 0);
    }
    Ok(())
}

/// Successful values as JSON; unsupported features as null.
fn field<T: serde::Serialize>(result: SdiResult<T>) -> Value {
    match result {
        Ok(v) => serde_json::to_value(v).unwrap_or(Value::Null),
        Err(SdiError::Unsupported { .. }) => Value::Null,
        Err(e) => Value::String(format!("error: {}", e)),
    }
}

fn entities(registry: &Registry) -> anyhow::Result<Value> {
    let api = registry.entity_api();
    let mut list = Vec::new();
    for hdl in registry.entities() {
        let entity = registry.entity(hdl)?;
        let resources: Vec<Value> = registry
            .resources(hdl)?
            .map(|r| -> SdiResult<Value> {
                let resource = registry.resource(r)?;
                Ok(json!({
                    "type": resource.resource_type().to_string(),
                    "alias": resource.alias(),
                }))
            })
            .collect::<SdiResult<_>>()?;
        list.push(json!({
            "type": entity.entity_type().to_string(),
            "instance": entity.instance(),
            "name": entity.name(),
            "state": field(api.state_get(hdl).map(|s| s.to_string())),
            "resources": resources,
        }));
    }
    Ok(Value::Array(list))
}

fn lookup(registry: &Registry, entity_type: EntityType, instance: u32) -> anyhow::Result<EntityHdl> {
    registry
        .entity_lookup(entity_type, instance)
        .with_context(|| format!("no {} #{}", entity_type, instance))
}

fn entity_command(registry: &Registry, cmd: &EntityCommands) -> anyhow::Result<Value> {
    let api = registry.entity_api();
    match cmd {
        EntityCommands::Status {
            entity_type,
            instance,
        } => {
            let hdl = lookup(registry, *entity_type, *instance)?;
            let mut report = json!({
                "name": registry.entity_name(hdl)?,
                "present": api.presence_get(hdl)?,
                "faulted": api.fault_status_get(hdl)?,
                "state": api.state_get(hdl)?.to_string(),
            });
            if entity_type.is_power_capable() {
                report["output_power_good"] = field(api.psu_output_power_status_get(hdl));
            }
            Ok(report)
        }
        EntityCommands::Reset {
            entity_type,
            instance,
            kind,
        } => {
            let hdl = lookup(registry, *entity_type, *instance)?;
            api.reset(hdl, *kind)?;
            Ok(json!({ "reset": kind.to_string(), "name": registry.entity_name(hdl)? }))
        }
        EntityCommands::Init {
            entity_type,
            instance,
        } => match entity_type {
            Some(t) => {
                let hdl = lookup(registry, *t, instance.unwrap_or(0))?;
                api.init(hdl)?;
                Ok(json!({ "initialized": [registry.entity_name(hdl)?] }))
            }
            None => {
                api.init_all()?;
                let names: Vec<&str> = registry
                    .entities()
                    .map(|h| registry.entity_name(h))
                    .collect::<SdiResult<_>>()?;
                Ok(json!({ "initialized": names }))
            }
        },
        EntityCommands::Power {
            entity_type,
            instance,
            state,
        } => {
            let hdl = lookup(registry, *entity_type, *instance)?;
            api.power_status_control(hdl, *state)?;
            let power = if *state { "on" } else { "off" };
            Ok(json!({ "power": power, "name": registry.entity_name(hdl)? }))
        }
    }
}

/// Media resource with the given alias on any entity.
fn find_media(registry: &Registry, alias: &str) -> anyhow::Result<ResourceHdl> {
    registry
        .entities()
        .find_map(|e| {
            registry
                .resource_lookup(e, ResourceType::Media, Some(alias))
                .ok()
        })
        .ok_or_else(|| anyhow!("no media resource {:?}", alias))
}

fn media_command(registry: &Registry, cmd: &MediaCommands) -> anyhow::Result<Value> {
    let api = registry.media_api();
    match cmd {
        MediaCommands::Show { alias } => media_show(registry, find_media(registry, alias)?),
        MediaCommands::Read { alias, offset, len } => {
            let hdl = find_media(registry, alias)?;
            let mut buf = vec![0u8; *len as usize];
            api.read(hdl, *offset, &mut buf)?;
            let lines: Vec<Value> = buf
                .chunks(16)
                .enumerate()
                .map(|(i, chunk)| {
                    let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
                    Value::String(format!("{:04x}: {}", *offset as usize + i * 16, hex.join(" ")))
                })
                .collect();
            Ok(Value::Array(lines))
        }
        MediaCommands::Write {
            alias,
            offset,
            bytes,
        } => {
            let hdl = find_media(registry, alias)?;
            let data = parse_hex_bytes(bytes).map_err(|e| anyhow!(e))?;
            debug!("Writing {} bytes to {} at {}", data.len(), alias, offset);
            api.write(hdl, *offset, &data)?;
            Ok(json!({ "written": data.len(), "offset": offset }))
        }
    }
}

fn media_show(registry: &Registry, hdl: ResourceHdl) -> anyhow::Result<Value> {
    let api = registry.media_api();
    let device = api.device(hdl)?;
    if !api.presence_get(hdl)? {
        return Ok(json!({ "present": false }));
    }

    let mut report = Map::new();
    report.insert("present".into(), Value::Bool(true));
    report.insert("form_factor".into(), json!(device.form_factor().to_string()));
    report.insert("identifier".into(), field(api.refresh(hdl).map(|id| format!("0x{:02x}", id))));

    let mut vendor = Map::new();
    for kind in VendorInfoType::ALL {
        vendor.insert(kind.to_string(), field(api.vendor_info(hdl, kind)));
    }
    report.insert("vendor".into(), Value::Object(vendor));
    report.insert(
        "compliance".into(),
        field(api.transceiver_code_get(hdl).map(|d| d.names())),
    );
    report.insert("speed".into(), field(api.speed_get(hdl).map(|s| s.to_string())));
    report.insert("features".into(), field(api.feature_support_get(hdl)));
    report.insert("checksum".into(), field(api.checksum_verify(hdl)));
    report.insert("rx_power_type".into(), field(api.rx_power_type_get(hdl)));

    let mut params = Map::new();
    for param in MediaParameter::ALL {
        if let Ok(value) = api.parameter_get(hdl, param) {
            params.insert(param.to_string(), json!(value));
        }
    }
    report.insert("parameters".into(), Value::Object(params));

    let mut monitors = Map::new();
    for monitor in [ModuleMonitor::Temperature, ModuleMonitor::Voltage] {
        let name = Monitor::from(monitor);
        monitors.insert(
            format!("{} ({})", name, name.unit()),
            field(api.module_monitor_get(hdl, monitor)),
        );
    }
    for channel in 0..device.lane_count() {
        for monitor in [ChannelMonitor::RxPower, ChannelMonitor::TxBias, ChannelMonitor::TxPower] {
            let name = Monitor::from(monitor);
            monitors.insert(
                format!("channel {} {} ({})", channel, name, name.unit()),
                field(api.channel_monitor_get(hdl, channel, monitor)),
            );
        }
    }
    report.insert("monitors".into(), Value::Object(monitors));

    let mut thresholds = Map::new();
    for monitor in Monitor::ALL {
        thresholds.insert(monitor.to_string(), field(api.thresholds(hdl, monitor)));
    }
    report.insert("thresholds".into(), Value::Object(thresholds));

    let module_flags = api
        .module_monitor_status_get(hdl, ModuleStatus::all())
        .map(|s| flag_names(s.iter_names()));
    report.insert("module_flags".into(), field(module_flags));
    let mut channels = Vec::new();
    for channel in 0..device.lane_count() {
        let monitor_flags = api
            .channel_monitor_status_get(hdl, channel, ChannelMonitorStatus::all())
            .map(|s| flag_names(s.iter_names()));
        let status = api
            .channel_status_get(hdl, channel, ChannelStatus::all())
            .map(|s| flag_names(s.iter_names()));
        channels.push(json!({
            "channel": channel,
            "tx_enabled": field(api.tx_control_status_get(hdl, channel)),
            "monitor_flags": field(monitor_flags),
            "status": field(status),
        }));
    }
    report.insert("channels".into(), Value::Array(channels));
    Ok(Value::Object(report))
}

fn flag_names<T>(names: impl Iterator<Item = (&'static str, T)>) -> Vec<&'static str> {
    names.map(|(name, _)| name).collect()
}

fn print_text(value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                match v {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{}{}:", indent, key);
                        print_text(v, depth + 1);
                    }
                    _ => println!("{}{}: {}", indent, key, scalar(v)),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{}-", indent);
                        print_text(item, depth + 1);
                    }
                    _ => println!("{}{}", indent, scalar(item)),
                }
            }
        }
        _ => println!("{}{}", indent, scalar(value)),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "n/a".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
