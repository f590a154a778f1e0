use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use keytally::aggregate::FrequencyCounter;
use keytally::escape::escape_string;

/// Table of the `limit` most frequent (key name, key code) pairs with their
/// share of all keystrokes.
pub fn top_pairs(counter: &FrequencyCounter, limit: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Key Name").add_attribute(Attribute::Bold),
        Cell::new("Key Code"),
        Cell::new("Count").fg(Color::Cyan),
        Cell::new("Share"),
    ]);

    for i in [0, 3, 4] {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    let total = counter.total().max(1) as f64;
    for (rank, (key, count)) in counter.most_common().into_iter().take(limit).enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(escape_string(&key.key_name)).add_attribute(Attribute::Bold),
            Cell::new(&key.key_code),
            Cell::new(count).fg(Color::Cyan),
            Cell::new(format!("{:.2}%", count as f64 * 100.0 / total)),
        ]);
    }
    table
}
