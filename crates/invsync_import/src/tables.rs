//! Typed import template tables.
//!
//! An import template is a YAML document with four optional tables, each a
//! list of typed rows. Unknown keys are ignored; absent optional cells
//! deserialize to `None` and the database cells among them can be backfilled
//! with the configured foreground name before assembly.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ImportError, ImportResult};

/// One activity to create in the assembled database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateActivityRow {
    /// Activity name.
    pub activity: String,
    /// Name of the activity's reference product.
    pub reference_product: String,
    /// Unit of the reference product.
    pub reference_product_unit: String,
    /// Geographic location code.
    pub activity_location: String,
    /// Initial version of the activity.
    pub activity_version: u64,
    /// Database the activity belongs to; backfilled when absent.
    #[serde(default)]
    pub activity_database: Option<String>,
    /// Activity type; defaults to `production` during assembly.
    #[serde(default)]
    pub activity_type: Option<String>,
    /// Explicit activity code; generated when absent.
    #[serde(default)]
    pub code: Option<String>,
    /// Free-form comment.
    #[serde(default)]
    pub comment: Option<String>,
}

/// One exchange to attach to a created activity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddExchangeRow {
    /// Name of the owning activity.
    pub activity: String,
    /// Location of the owning activity.
    pub activity_location: String,
    /// Name of the input the exchange points at.
    pub exchange: String,
    /// Quantity of the input.
    pub amount: f64,
    /// Unit of the amount.
    pub unit: String,
    /// Exchange type, e.g. `technosphere` or `biosphere`.
    pub exchange_type: String,
    /// Database of the owning activity; backfilled when absent.
    #[serde(default)]
    pub activity_database: Option<String>,
    /// Database of the input; backfilled when absent.
    #[serde(default)]
    pub exchange_database: Option<String>,
    /// Explicit code of the owning activity; resolved from
    /// `create_activities` when absent.
    #[serde(default)]
    pub activity_code: Option<String>,
    /// Explicit code of the input; resolved against created reference
    /// products when absent.
    #[serde(default)]
    pub exchange_code: Option<String>,
    /// Location of the input; informational, resolution matches on the
    /// owner's location.
    #[serde(default)]
    pub exchange_location: Option<String>,
    /// Uncertainty distribution selector.
    #[serde(default)]
    pub uncertainty_type: Option<u32>,
}

/// One activity to copy from an existing database into the assembled one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopyActivityRow {
    /// Database the activity is copied from.
    pub source_database: String,
    /// Activity name, used in log and warning messages.
    pub activity: String,
    /// Code of the activity in the source database.
    pub activity_code: String,
}

/// One exchange to remove from the assembled database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteExchangeRow {
    /// Name of the owning activity.
    pub activity: String,
    /// Name of the input the exchange points at.
    pub exchange: String,
    /// Database of the owning activity; backfilled when absent.
    #[serde(default)]
    pub activity_database: Option<String>,
    /// Explicit code of the owning activity; resolved by name when absent.
    #[serde(default)]
    pub activity_code: Option<String>,
    /// Database of the input; backfilled when absent.
    #[serde(default)]
    pub exchange_database: Option<String>,
    /// Explicit code of the input; resolved by name when absent.
    #[serde(default)]
    pub exchange_code: Option<String>,
}

/// A parsed import template: four optional typed tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportTemplate {
    /// Activities to create.
    #[serde(default)]
    pub create_activities: Vec<CreateActivityRow>,
    /// Exchanges to attach.
    #[serde(default)]
    pub add_exchanges: Vec<AddExchangeRow>,
    /// Activities to copy from existing databases.
    #[serde(default)]
    pub copy_activities: Vec<CopyActivityRow>,
    /// Exchanges to remove.
    #[serde(default)]
    pub delete_exchanges: Vec<DeleteExchangeRow>,
}

impl ImportTemplate {
    /// Loads and parses a template file.
    ///
    /// # Errors
    ///
    /// Fails with [`ImportError::TemplateIo`] when the file cannot be read
    /// and [`ImportError::TemplateFormat`] when it is not a valid template
    /// document.
    pub fn from_path(path: impl AsRef<Path>) -> ImportResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ImportError::TemplateIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ImportError::TemplateFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fills every absent `*_database` cell with `database`.
    ///
    /// Returns the total number of backfilled cells; per-table counts are
    /// logged at debug level.
    pub fn backfill_database(&mut self, database: &str) -> usize {
        let mut total = 0;

        let mut filled = 0;
        for row in &mut self.create_activities {
            filled += fill(&mut row.activity_database, database);
        }
        debug!(table = "create_activities", filled, "backfilled database cells");
        total += filled;

        let mut filled = 0;
        for row in &mut self.add_exchanges {
            filled += fill(&mut row.activity_database, database);
            filled += fill(&mut row.exchange_database, database);
        }
        debug!(table = "add_exchanges", filled, "backfilled database cells");
        total += filled;

        let mut filled = 0;
        for row in &mut self.delete_exchanges {
            filled += fill(&mut row.activity_database, database);
            filled += fill(&mut row.exchange_database, database);
        }
        debug!(table = "delete_exchanges", filled, "backfilled database cells");
        total += filled;

        total
    }

    /// Checks every row before assembly: names, locations, units and types
    /// non-empty, amounts finite.
    ///
    /// Empty tables are allowed and only logged.
    ///
    /// # Errors
    ///
    /// Fails with [`ImportError::InvalidRow`] naming the first offending
    /// table and row.
    pub fn validate(&self) -> ImportResult<()> {
        for (table, empty) in [
            ("create_activities", self.create_activities.is_empty()),
            ("add_exchanges", self.add_exchanges.is_empty()),
            ("copy_activities", self.copy_activities.is_empty()),
            ("delete_exchanges", self.delete_exchanges.is_empty()),
        ] {
            if empty {
                warn!(table, "template table has no rows");
            }
        }

        for (row, data) in self.create_activities.iter().enumerate() {
            let table = "create_activities";
            require(table, row, "activity", &data.activity)?;
            require(table, row, "reference_product", &data.reference_product)?;
            require(table, row, "reference_product_unit", &data.reference_product_unit)?;
            require(table, row, "activity_location", &data.activity_location)?;
        }

        for (row, data) in self.add_exchanges.iter().enumerate() {
            let table = "add_exchanges";
            require(table, row, "activity", &data.activity)?;
            require(table, row, "exchange", &data.exchange)?;
            require(table, row, "unit", &data.unit)?;
            require(table, row, "exchange_type", &data.exchange_type)?;
            if !data.amount.is_finite() {
                return Err(ImportError::InvalidRow {
                    table,
                    row,
                    problem: format!("non-finite amount {}", data.amount),
                });
            }
        }

        for (row, data) in self.copy_activities.iter().enumerate() {
            let table = "copy_activities";
            require(table, row, "source_database", &data.source_database)?;
            require(table, row, "activity", &data.activity)?;
            require(table, row, "activity_code", &data.activity_code)?;
        }

        for (row, data) in self.delete_exchanges.iter().enumerate() {
            let table = "delete_exchanges";
            require(table, row, "activity", &data.activity)?;
            require(table, row, "exchange", &data.exchange)?;
        }

        Ok(())
    }
}

fn fill(cell: &mut Option<String>, value: &str) -> usize {
    if cell.is_none() {
        *cell = Some(value.to_owned());
        1
    } else {
        0
    }
}

fn require(table: &'static str, row: usize, field: &'static str, value: &str) -> ImportResult<()> {
    if value.trim().is_empty() {
        return Err(ImportError::InvalidRow {
            table,
            row,
            problem: format!("empty {field}"),
        });
    }
    Ok(())
}
