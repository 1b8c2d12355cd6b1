//! Shopping-list aggregation output and report rendering.
//!
//! Amount summing happens in the database; this module owns the line type
//! and turns the aggregate rows into the plain-text report served as a
//! download. Lines are ordered by ingredient name and then measurement unit
//! so the report is byte-stable for a fixed cart.

use serde::{Deserialize, Serialize};

/// One aggregated ingredient line of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListLine {
    /// Ingredient name, the primary grouping key.
    pub name: String,
    /// Measurement unit, the secondary grouping key.
    pub measurement_unit: String,
    /// Total amount across every recipe in the cart.
    pub total_amount: i64,
}

/// Render the plain-text shopping list report.
///
/// The caller is expected to pass lines already aggregated per
/// `(name, measurement_unit)`; this function only sorts and formats.
pub fn render_report(mut lines: Vec<ShoppingListLine>) -> String {
    lines.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
    });

    let mut report = String::from("Shopping list:\n");
    for line in &lines {
        report.push_str(&format!(
            "{} ({}): {}\n",
            line.name, line.measurement_unit, line.total_amount
        ));
    }
    report
}

/// File name for the report download, derived from the requesting user.
pub fn report_filename(username: &str) -> String {
    format!("{username}_shopping_list.txt")
}
