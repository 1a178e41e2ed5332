//! CLI presentation: text and json formatters for check and solve.

use crate::error::ApiError;
use crate::solution::{Solution, SolutionElement};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn format_check_result(satisfiable: bool, shape_count: usize) -> String {
    if satisfiable {
        format!(
            "{} ({} shape(s))",
            "Constraints are satisfiable".green(),
            shape_count
        )
    } else {
        format!(
            "{} ({} shape(s))",
            "Constraints are NOT satisfiable".red(),
            shape_count
        )
    }
}

fn placement(element: &SolutionElement) -> String {
    let mut out = element.name.to_string();
    if let Some(location) = element.location {
        out.push_str(&format!(" @ ({}, {})", location.x, location.y));
    }
    if let Some(size) = element.size {
        out.push_str(&format!(" {}x{}", size.width, size.height));
    }
    out
}

pub fn format_solutions_text(solutions: &[Solution]) -> String {
    if solutions.is_empty() {
        return "No solutions returned by the solver.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Cost", "Elements", "Placements"]);
    for solution in solutions {
        let cost = solution
            .cost()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let placements: Vec<String> = solution.elements.iter().map(placement).collect();
        table.add_row(vec![
            solution.id().to_string(),
            cost,
            solution.elements.len().to_string(),
            placements.join("\n"),
        ]);
    }
    format!("{}\n\nTotal: {} solution(s)", table, solutions.len())
}

pub fn format_solutions_json(solutions: &[Solution]) -> Result<String, ApiError> {
    let list: Vec<_> = solutions
        .iter()
        .map(|s| {
            json!({
                "id": s.id(),
                "cost": s.cost(),
                "elements": s.elements,
            })
        })
        .collect();
    let out = json!({ "solutions": list, "total": solutions.len() });
    Ok(serde_json::to_string_pretty(&out)?)
}
