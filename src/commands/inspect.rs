use super::load_store;
use crate::cli::commands::InspectArgs;
use anyhow::Result;
use colored::Colorize;
use crm_record_copy::config::Config;
use crm_record_copy::copy::resolve_step_configuration;
use crm_record_copy::{ConfigurationStore, QueryTableNode};
use log::info;

/// Print the query-table tree of a template filter with the configuration
/// each table resolves to
pub async fn inspect_command(args: InspectArgs, config: &Config) -> Result<()> {
    info!("Inspecting template filter: {}", args.filter);

    let store = load_store(args.fixture, config)?;
    let filter = store
        .filter_by_name(&args.filter)
        .ok_or_else(|| anyhow::anyhow!("Template filter '{}' not found", args.filter))?;

    println!("Template filter: {}", filter.name.bold());
    println!("{}", "-".repeat(50));
    print_table(&store, &filter.root, 0);
    println!("\nTotal tables: {}", filter.root.table_count());
    Ok(())
}

fn print_table(store: &dyn ConfigurationStore, table: &QueryTableNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let fetch_config = resolve_step_configuration(store, table);
    let resolved = if fetch_config.is_resolved() {
        fetch_config.describe().green()
    } else {
        fetch_config.describe().red()
    };

    println!(
        "{}{} (link {}) -> {}",
        indent, table.info_area_id, table.link_id, resolved
    );
    for field in &table.field_values {
        println!("{}    field {} = {:?}", indent, field.field_id, field.value);
    }
    for child in &table.sub_tables {
        print_table(store, child, depth + 1);
    }
}
