//! Fetch configuration resolution for copy steps

use super::step::FetchConfig;
use crate::crm::{ConfigurationStore, FieldControlMode, QueryTableNode, SOURCE_CONFIG_PROPERTY};
use log::debug;

/// Resolves which configuration a step uses to fetch its source values.
///
/// A non-empty `SourceConfig` property names a search-and-list whose list
/// field group is fetched. Without it the table's info-area names the
/// configuration and no search-and-list is looked up. Whatever name is in
/// play then falls back to a field control, `Edit` before `List`.
pub fn resolve_step_configuration(
    store: &dyn ConfigurationStore,
    query_table: &QueryTableNode,
) -> FetchConfig {
    let source_config = query_table
        .property_condition(SOURCE_CONFIG_PROPERTY)
        .and_then(|values| values.first())
        .filter(|name| !name.is_empty());

    let config_name = match source_config {
        Some(name) => {
            if let Some(search) = store.search_and_list_by_name(name) {
                match store.field_control_by_name(&search.field_group_name, FieldControlMode::List) {
                    Some(field_control) => {
                        return FetchConfig::SearchAndList {
                            search,
                            field_control,
                        };
                    }
                    None => debug!(
                        "Search '{}' names missing field group '{}'",
                        search.name, search.field_group_name
                    ),
                }
            }
            name.as_str()
        }
        None => query_table.info_area_id.as_str(),
    };

    store
        .field_control_by_name(config_name, FieldControlMode::Edit)
        .or_else(|| store.field_control_by_name(config_name, FieldControlMode::List))
        .map(FetchConfig::FieldControl)
        .unwrap_or(FetchConfig::Unresolved)
}
