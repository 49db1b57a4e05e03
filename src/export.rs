use crate::browser::Browser;
use crate::record::{ColumnDescriptor, Record};

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping =
        needs_escaping || c.chars().any(|c| matches!(c, ' ' | '\t' | ',' | '\n' | '\r'));
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

/// One CSV line with the displayed cells of `record`.
pub fn row_to_csv(columns: &[ColumnDescriptor], record: &Record) -> String {
    columns
        .iter()
        .map(|c| wrap_cell_content(&c.display(record)))
        .collect::<Vec<String>>()
        .join(",")
}

/// Header line followed by one line per record.
pub fn to_csv(columns: &[ColumnDescriptor], records: &[&Record]) -> String {
    let header = columns
        .iter()
        .map(|c| wrap_cell_content(&c.header))
        .collect::<Vec<String>>()
        .join(",");
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header);
    lines.extend(records.iter().map(|r| row_to_csv(columns, r)));
    lines.join("\n")
}

/// All records currently passing the browser's search, in sorted order.
pub fn export_filtered(browser: &Browser) -> String {
    to_csv(browser.columns(), &browser.filtered_records())
}
