use super::load_store;
use crate::cli::commands::CopyArgs;
use anyhow::{Context, Result};
use colored::Colorize;
use crm_record_copy::config::Config;
use crm_record_copy::copy::CopyLogger;
use crm_record_copy::{ChannelDelegate, CopyServices, RecordCopy, RecordIdentification};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

/// Copy a record tree from the fixture and print the new records as JSON
///
/// # Returns
/// * `Ok(())` - Copy finished and the records were printed
/// * `Err(anyhow::Error)` - Fixture, configuration or query error
pub async fn copy_command(args: CopyArgs, config: &Config) -> Result<()> {
    let parameters = parse_parameters(&args.params)?;
    debug!("Copy parameters: {:?}", parameters);

    let store = load_store(args.fixture, config)?.with_server_mode(args.server_mode);
    let services = CopyServices::from_backend(Arc::new(store));
    let request_option = args.request_option.unwrap_or(config.copy.request_option);

    let (delegate, receiver) = ChannelDelegate::new();
    let copy = RecordCopy::new(&args.filter, services, delegate)?
        .with_request_option(request_option)
        .with_apply_default_values(config.copy.apply_default_values)
        .with_logger(CopyLogger::new(config.monitoring_config()));

    let source = RecordIdentification::from(args.source);
    info!("Copying {} with filter '{}' ({})", source, args.filter, request_option);

    let started = match args.destination {
        Some(destination) => copy.start_with_source_and_destination(
            source,
            RecordIdentification::from(destination),
            parameters,
        ),
        None => copy.start_with_source_record_identification(source, parameters),
    };
    if !started {
        anyhow::bail!("Copy could not be started");
    }

    let report = receiver.wait().await;
    for skipped in &report.skipped {
        eprintln!(
            "{} {} below {}: {}",
            "skipped".yellow(),
            skipped.info_area_id,
            skipped.source_record,
            skipped.reason
        );
    }

    let records = report.result.context("Copy failed")?;
    let output = if args.pretty {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string(&records)?
    };
    println!("{}", output);

    eprintln!("{} {} records created", "done".green(), records.len());
    Ok(())
}

/// Parses `NAME=VALUE` pairs into filter parameters
fn parse_parameters(params: &[String]) -> Result<HashMap<String, String>> {
    params
        .iter()
        .map(|param| -> Result<(String, String)> {
            let (name, value) = param
                .split_once('=')
                .with_context(|| format!("Invalid parameter '{}', expected NAME=VALUE", param))?;
            if name.is_empty() {
                anyhow::bail!("Invalid parameter '{}', name is empty", param);
            }
            Ok((name.to_string(), value.to_string()))
        })
        .collect()
}
