//! Load metadata: named output partitions consumed downstream

use crate::error::{CoreError, CoreResult};
use crate::sql_utils::format_short_name;
use serde::{Deserialize, Serialize};

/// A named output partition: which columns a consumer wants, from which file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadPart {
    /// Partition name
    pub name: String,

    /// Output file; the part before the first `.` names the table
    pub file: String,

    /// Requested columns, in output order
    pub columns: Vec<String>,
}

impl LoadPart {
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Table this part reads, derived from the file name
    ///
    /// # Examples
    /// ```
    /// use sf_core::load::LoadPart;
    /// let part = LoadPart::new("sales", "F_Sales.csv", ["amount"]);
    /// assert_eq!(part.table_name(), "f_sales");
    /// ```
    pub fn table_name(&self) -> String {
        let stem = self.file.split('.').next().unwrap_or_default();
        format_short_name(stem)
    }
}

/// Find a load part by name
pub fn find_part<'a>(parts: &'a [LoadPart], name: &str) -> CoreResult<&'a LoadPart> {
    parts
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| CoreError::LoadPartNotFound {
            name: name.to_string(),
        })
}
