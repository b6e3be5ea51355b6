//! The batch core: `(records, config) -> (with_id, without_id)`.
//!
//! 1. Check every record has [`FIELD_COUNT`] fields.
//! 2. Normalize the company name (or every field) with the configured
//!    [`Normalizer`], then run [`clean_adjacent`] over every field.
//! 3. Stable-sort by [`group_name`].
//! 4. Split on whether [`IdDetector`] finds a branch ID in the company name.

use indicatif::ProgressBar;

use crate::config::Config;
use crate::detector::IdDetector;
use crate::error::{PipelineError, Result};
use crate::models::{FieldRole, NormalizeScope, Partition, Record, FIELD_COUNT, SCHEMA};
use crate::normalize::brackets::clean_adjacent;
use crate::normalize::{self, strip_parentheticals, Normalizer};

pub struct Pipeline {
    normalizer: Box<dyn Normalizer>,
    scope: NormalizeScope,
    detector: IdDetector,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            normalizer: normalize::build(config.normalize.strategy, config.normalize.reinsert),
            scope: config.normalize.scope,
            detector: IdDetector::new(config.id_pattern())?,
        })
    }

    pub fn detector(&self) -> &IdDetector {
        &self.detector
    }

    /// Run the whole batch. Any error rejects the batch; nothing is returned
    /// for the records that did pass.
    pub fn run(&self, batch: Vec<Record>, progress: Option<&ProgressBar>) -> Result<Partition> {
        validate(&batch)?;

        let normalized: Vec<Record> = batch
            .into_iter()
            .map(|record| {
                let record = self.normalize_record(record);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                record
            })
            .collect();

        let partition = self.partition(sort_by_group(normalized));
        tracing::info!(
            with_id = partition.with_id.len(),
            without_id = partition.without_id.len(),
            "partitioned batch"
        );
        Ok(partition)
    }

    /// Normalize one record's fields in place of the raw values.
    pub fn normalize_record(&self, record: Record) -> Record {
        let Record { line, fields } = record;
        let fields = fields
            .into_iter()
            .zip(SCHEMA)
            .map(|(value, role)| self.normalize_field(line, value, role))
            .collect();
        Record::new(line, fields)
    }

    fn normalize_field(&self, line: u64, value: Option<String>, role: FieldRole) -> Option<String> {
        let value = value?;
        let cleaned = match (self.scope, role) {
            (_, FieldRole::CompanyName) => clean_adjacent(&self.normalizer.normalize(&value)),
            (NormalizeScope::AllFields, _) => {
                clean_adjacent(&self.normalizer.normalize_other(&value))
            }
            _ => clean_adjacent(&value),
        };
        if cleaned != value {
            tracing::trace!(line, field = %role, before = %value, after = %cleaned, "normalized");
        }
        Some(cleaned)
    }

    /// Split a sorted batch on branch-ID presence, keeping order in both halves.
    pub fn partition(&self, sorted: Vec<Record>) -> Partition {
        let (with_id, without_id): (Vec<Record>, Vec<Record>) =
            sorted.into_iter().partition(|record| {
                record
                    .company_name()
                    .and_then(|name| self.detector.detect(name))
                    .is_some()
            });
        Partition {
            with_id,
            without_id,
        }
    }
}

/// Reject the batch if any record has the wrong number of fields.
pub fn validate(batch: &[Record]) -> Result<()> {
    match batch.iter().find(|r| r.fields.len() != FIELD_COUNT) {
        Some(record) => Err(PipelineError::MalformedRecord {
            line: record.line,
            expected: FIELD_COUNT,
            found: record.fields.len(),
        }),
        None => Ok(()),
    }
}

/// Sort key: the company name with every parenthetical removed.
pub fn group_name(record: &Record) -> String {
    record
        .company_name()
        .map(strip_parentheticals)
        .unwrap_or_default()
}

/// Stable ascending sort by [`group_name`] (code-point order).
pub fn sort_by_group(batch: Vec<Record>) -> Vec<Record> {
    let mut keyed: Vec<(String, Record)> = batch
        .into_iter()
        .map(|record| (group_name(&record), record))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, record)| record).collect()
}
