use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::detector::IdDetector;
use crate::models::{Partition, Record, RunSummary};
use crate::pipeline::group_name;

/// IDs listed per group before the cell is cut short.
const MAX_IDS_SHOWN: usize = 5;

/// Render a colored terminal report.
pub fn render(
    summary: &RunSummary,
    partition: &Partition,
    detector: &IdDetector,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    if quiet {
        println!(
            "Total: {}  With ID: {}  Without ID: {}",
            summary.total,
            summary.with_id.to_string().green(),
            summary.without_id.to_string().yellow(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "branch-splitr".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Input: {}\n", summary.input);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Records         : {}", summary.total));
    println!(
        " │  {:<48} │",
        format!("{}  With ID       : {:>6}", "✓".green(), summary.with_id)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Without ID    : {:>6}", "⚠".yellow(), summary.without_id)
    );
    println!(" │  {:<48} │", format!("Strategy        : {}", summary.strategy));
    println!(" │  {:<48} │", format!("Scope           : {}", summary.scope));
    println!(" │  {:<48} │", format!("ID pattern      : {}", summary.id_pattern));
    println!(" └────────────────────────────────────────────────────┘\n");

    for output in &summary.outputs {
        println!("  {} {}", "→".cyan(), output);
    }
    println!();

    if verbose {
        if !partition.with_id.is_empty() {
            println!(" {} Groups with a branch ID:\n", "[ID]".green().bold());
            render_table(&partition.with_id, detector);
            println!();
        }
        if !partition.without_id.is_empty() {
            println!(" {} Groups without a branch ID:\n", "[NO ID]".yellow().bold());
            render_table(&partition.without_id, detector);
            println!();
        }
    }

    Ok(())
}

struct GroupRow {
    name: String,
    records: usize,
    ids: Vec<String>,
}

/// Collapse a sorted record set into one row per group.
fn group_rows(records: &[Record], detector: &IdDetector) -> Vec<GroupRow> {
    let mut rows: Vec<GroupRow> = Vec::new();
    for record in records {
        let name = group_name(record);
        let id = record
            .company_name()
            .and_then(|c| detector.detect(c))
            .map(str::to_string);

        match rows.last_mut() {
            Some(row) if row.name == name => {
                row.records += 1;
                row.ids.extend(id);
            }
            _ => rows.push(GroupRow {
                name,
                records: 1,
                ids: id.into_iter().collect(),
            }),
        }
    }
    rows
}

fn render_table(records: &[Record], detector: &IdDetector) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Group").add_attribute(Attribute::Bold),
            Cell::new("Records").add_attribute(Attribute::Bold),
            Cell::new("Branch IDs").add_attribute(Attribute::Bold),
        ]);

    for row in group_rows(records, detector) {
        let ids = if row.ids.is_empty() {
            Cell::new("-").fg(Color::DarkGrey)
        } else {
            Cell::new(format_ids(&row.ids)).fg(Color::Green)
        };
        let name = if row.name.is_empty() {
            "(empty)".to_string()
        } else {
            row.name
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(row.records).set_alignment(CellAlignment::Right),
            ids,
        ]);
    }

    println!("{}", table);
}

fn format_ids(ids: &[String]) -> String {
    let shown: Vec<&str> = ids.iter().take(MAX_IDS_SHOWN).map(String::as_str).collect();
    if ids.len() > MAX_IDS_SHOWN {
        format!("{} (+{})", shown.join(", "), ids.len() - MAX_IDS_SHOWN)
    } else {
        shown.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdPattern, FIELD_COUNT};

    fn record(company: &str) -> Record {
        let mut fields = vec![None; FIELD_COUNT];
        fields[9] = Some(company.to_string());
        Record::new(1, fields)
    }

    #[test]
    fn test_group_rows_merge_consecutive_groups() {
        let detector = IdDetector::new(IdPattern::Variable).unwrap();
        let records = vec![
            record("Shop Alpha (00001)"),
            record("Shop Alpha (00002)"),
            record("Shop Beta"),
        ];
        let rows = group_rows(&records, &detector);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Shop Alpha");
        assert_eq!(rows[0].records, 2);
        assert_eq!(rows[0].ids, vec!["00001", "00002"]);
        assert_eq!(rows[1].records, 1);
        assert!(rows[1].ids.is_empty());
    }

    #[test]
    fn test_format_ids_truncates() {
        let ids: Vec<String> = (1..=7).map(|i| format!("0000{}", i)).collect();
        assert_eq!(
            format_ids(&ids),
            "00001, 00002, 00003, 00004, 00005 (+2)"
        );
        assert_eq!(format_ids(&ids[..2]), "00001, 00002");
    }
}
