//! Per-part tables for the `ani info` report

use prettytable::format::Alignment;
use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::{Cell, Row, Table};
use std::fmt::Display;

/// Create a table with bold titles and no separators between rows
pub fn create_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        titles
            .iter()
            .map(|title| Cell::new(title).style_spec("b"))
            .collect(),
    ));
    table
}

/// Append a row; the first column holds a part index and is right-aligned
pub fn add_table_row<I>(table: &mut Table, cells: I)
where
    I: IntoIterator,
    I::Item: Display,
{
    let row = cells
        .into_iter()
        .enumerate()
        .map(|(column, value)| {
            let align = if column == 0 {
                Alignment::RIGHT
            } else {
                Alignment::LEFT
            };
            Cell::new_align(&value.to_string(), align)
        })
        .collect();
    table.add_row(Row::new(row));
}
