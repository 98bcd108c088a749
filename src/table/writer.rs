//! Assignment to rows of cells.

use crate::model::Assignment;

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRow {
    pub cells: Vec<String>,

    /// Set on member rows of every other group, so a renderer can shade
    /// consecutive groups differently.
    pub highlight: bool,
}

impl TableRow {
    fn plain(cells: Vec<String>) -> Self {
        Self {
            cells,
            highlight: false,
        }
    }
}

/// Lays an assignment out as a table.
///
/// Per iteration: a title row `Iteration k`, a header row `Group` plus the
/// attribute columns, then one row per member with its 1-based group
/// number and attribute values. Iterations are separated by an empty row.
///
/// `attributes` selects and orders the columns; `None` uses the
/// population's attribute classes. Missing values are written as empty
/// cells.
pub fn write_assignment(assignment: &Assignment, attributes: Option<&[String]>) -> Vec<TableRow> {
    let classes: Vec<String> = match attributes {
        Some(a) => a.to_vec(),
        None => assignment.population().attribute_classes(),
    };

    let mut rows = Vec::new();
    for (k, iteration) in assignment.iterations().iter().enumerate() {
        if k > 0 {
            rows.push(TableRow::plain(Vec::new()));
        }
        rows.push(TableRow::plain(vec![format!("Iteration {}", k + 1)]));

        let mut header = Vec::with_capacity(classes.len() + 1);
        header.push("Group".to_string());
        header.extend(classes.iter().cloned());
        rows.push(TableRow::plain(header));

        for (g, group) in iteration.groups().iter().enumerate() {
            for id in group.iter() {
                let mut cells = Vec::with_capacity(classes.len() + 1);
                cells.push((g + 1).to_string());
                let participant = assignment.participant(id);
                cells.extend(classes.iter().map(|class| {
                    participant
                        .and_then(|p| p.attribute(class))
                        .unwrap_or_default()
                        .to_string()
                }));
                rows.push(TableRow {
                    cells,
                    highlight: g % 2 == 1,
                });
            }
        }
    }
    rows
}
