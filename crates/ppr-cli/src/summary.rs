//! Run summary printed after a pipeline completes.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use ppr_core::OutputSheet;

use crate::commands::RunResult;

pub fn print_summary(result: &RunResult) {
    match &result.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Dry run: no artifact written"),
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Sheet", "Rows"]);
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for sheet in &result.artifacts.sheets {
        let rows = match sheet {
            OutputSheet::Table { table, .. } => table.height(),
            OutputSheet::Grid { rows, .. } => rows.len(),
        };
        table.add_row(vec![Cell::new(sheet.name()), Cell::new(rows)]);
    }
    println!("{table}");
}
