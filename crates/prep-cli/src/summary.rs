use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use prep_cli::pipeline::PipelineResult;
use prep_model::{StageKind, StageStatus};

pub fn print_summary(result: &PipelineResult) {
    println!("{}", summary_table(result));
    let failures: Vec<_> = result
        .outcomes
        .iter()
        .filter_map(|outcome| match &outcome.status {
            StageStatus::Failed { reason } => Some((outcome.stage, reason)),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        eprintln!("Errors:");
        for (stage, reason) in failures {
            eprintln!("- {stage}: {reason}");
        }
    }
}

pub fn print_stages() {
    println!("{}", stages_table());
}

pub fn summary_table(result: &PipelineResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Time"),
        header_cell("Output"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    let mut total_rows = 0usize;
    for outcome in &result.outcomes {
        let (rows, columns, output) = match outcome.summary() {
            Some(summary) => {
                total_rows += summary.rows;
                (
                    Cell::new(summary.rows),
                    Cell::new(summary.columns),
                    Cell::new(summary.output.display()),
                )
            }
            None => (dim_cell("-"), dim_cell("-"), detail_cell(&outcome.status)),
        };
        table.add_row(vec![
            stage_cell(outcome.stage),
            status_cell(&outcome.status),
            rows,
            columns,
            dim_cell(format!("{} ms", outcome.duration_ms)),
            output,
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    table
}

pub fn stages_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Description"),
        header_cell("Cohort"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for stage in StageKind::ALL {
        let cohort = if stage.needs_cohort() { "reads" } else { "writes" };
        table.add_row(vec![
            stage_cell(stage),
            Cell::new(stage.description()),
            dim_cell(cohort),
        ]);
    }
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: &StageStatus) -> Cell {
    match status {
        StageStatus::Succeeded(_) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        StageStatus::Failed { .. } => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        StageStatus::Skipped { .. } => Cell::new("SKIPPED").fg(Color::Yellow),
    }
}

fn detail_cell(status: &StageStatus) -> Cell {
    match status {
        StageStatus::Failed { reason } => Cell::new(reason).fg(Color::Red),
        StageStatus::Skipped { reason } => dim_cell(reason),
        StageStatus::Succeeded(_) => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn stage_cell(stage: StageKind) -> Cell {
    Cell::new(stage.as_str())
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
