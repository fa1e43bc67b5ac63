//! Turns the rows of a step's query into new destination records

use super::step::CopyStep;
use crate::crm::{
    ConfigurationStore, CrmRecord, LinkReader, QueryResult, RecordIdentification, ResultRow,
    link_descriptor,
};
use log::{debug, trace};

/// Records built for one step and the steps spawned for its child tables
#[derive(Debug, Default)]
pub struct ProcessedStep {
    pub records: Vec<CrmRecord>,
    pub child_steps: Vec<CopyStep>,
}

pub struct RecordBuilder<'a> {
    config_store: &'a dyn ConfigurationStore,
    link_reader: &'a dyn LinkReader,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(config_store: &'a dyn ConfigurationStore, link_reader: &'a dyn LinkReader) -> Self {
        Self {
            config_store,
            link_reader,
        }
    }

    /// Builds one record per result row, in row order
    pub fn process_result(&self, step: &CopyStep, result: &QueryResult) -> ProcessedStep {
        let mut processed = ProcessedStep::default();

        for row in &result.rows {
            let record = self.build_record(step, result, row);

            match row.root_record_identification() {
                Some(source) => {
                    for child_table in &step.query_table.sub_tables {
                        processed.child_steps.push(CopyStep::resolved(
                            self.config_store,
                            source.clone(),
                            Some(record.identification.clone()),
                            child_table.clone(),
                        ));
                    }
                }
                None if !step.query_table.sub_tables.is_empty() => debug!(
                    "Row of {} has no record identification, child tables not copied",
                    step.info_area_id()
                ),
                None => {}
            }

            processed.records.push(record);
        }

        processed
    }

    fn build_record(&self, step: &CopyStep, result: &QueryResult, row: &ResultRow) -> CrmRecord {
        let table = &step.query_table;
        let mut record = CrmRecord::new_with_info_area(&table.info_area_id);

        if let Some(parent) = &step.destination_record {
            record.add_link(parent.clone(), table.link_id);
        }

        for (index, joined) in result.tables.iter().enumerate().skip(1) {
            let linked = match row.record_identification(index) {
                Some(id) => Some(id.clone()),
                None if !result.is_server_response => self.read_link(row, &joined.info_area_id, joined.link_id),
                None => None,
            };

            let Some(linked) = linked else {
                continue;
            };
            if !linked.is_valid_link() {
                trace!("Ignoring short link identification '{}'", linked);
                continue;
            }
            let duplicates_parent = step
                .destination_record
                .as_ref()
                .is_some_and(|parent| parent.info_area_id() == linked.info_area_id());
            if duplicates_parent {
                continue;
            }

            record.add_link(linked, joined.link_id);
        }

        let row_table = table.apply_value_dictionary(row.values_by_function());

        if step.fetch_config.info_area_id() == Some(table.info_area_id.as_str()) {
            if let Some(field_control) = step.fetch_config.field_control() {
                for (position, field) in field_control.primary_fields() {
                    match row.raw_value(position) {
                        Some(value) if !value.is_empty() => record.set_value(field.field_id, value),
                        _ => {}
                    }
                }
            }
        }

        record.apply_template(&row_table, true);
        record
    }

    fn read_link(&self, row: &ResultRow, info_area_id: &str, link_id: i32) -> Option<RecordIdentification> {
        let source = row.root_record_identification()?;
        self.link_reader
            .linked_record(source, &link_descriptor(info_area_id, link_id))
    }
}
