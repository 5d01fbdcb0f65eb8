//! Table columns and the rendered values of one row.

use crate::fetch::StatusRecord;

/// Number of columns in the node table.
pub const COLUMN_COUNT: usize = 13;

/// A column of the node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Stable identifier, used as the key in JSON exports.
    pub key: &'static str,
    /// Header shown in the table.
    pub title: &'static str,
    /// Minimum display width in cells.
    pub min_width: u16,
}

/// All columns, in display order.
pub const COLUMNS: [Column; COLUMN_COUNT] = [
    Column { key: "name", title: "Name", min_width: 10 },
    Column { key: "version", title: "Version", min_width: 8 },
    Column { key: "host", title: "IP", min_width: 12 },
    Column { key: "connected_peers", title: "Peers", min_width: 5 },
    Column { key: "synced", title: "Synced", min_width: 6 },
    Column { key: "top_layer", title: "Top", min_width: 6 },
    Column { key: "verified_layer", title: "Verified", min_width: 8 },
    Column { key: "synced_layer", title: "Synced", min_width: 6 },
    Column { key: "smeshing", title: "Smeshing", min_width: 8 },
    Column { key: "post_state", title: "PoST State", min_width: 11 },
    Column { key: "space_units", title: "Space Units", min_width: 11 },
    Column { key: "size_gib", title: "GiB", min_width: 5 },
    Column { key: "assigned_layers_count", title: "Layers", min_width: 6 },
];

/// The rendered text of every column of a row.
///
/// Values are always produced together from one [`StatusRecord`], so a row
/// never mixes columns from different fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowValues([String; COLUMN_COUNT]);

impl RowValues {
    /// Render a status record into column text.
    pub fn from_record(record: &StatusRecord) -> Self {
        Self([
            record.name.clone(),
            record.version.clone(),
            record.host.clone(),
            record.connected_peers.to_string(),
            yes_no(record.synced),
            record.top_layer.to_string(),
            record.verified_layer.to_string(),
            record.synced_layer.to_string(),
            yes_no(record.smeshing),
            record.post_state.label().to_string(),
            record.space_units.to_string(),
            record.size_gib.to_string(),
            record.assigned_layers_count.to_string(),
        ])
    }

    /// Value of the column at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Iterate `(column, value)` pairs in display order.
    pub fn with_columns(&self) -> impl Iterator<Item = (&'static Column, &str)> {
        COLUMNS.iter().zip(self.iter())
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::scripted::record;

    #[test]
    fn test_from_record_fills_every_column() {
        let values = RowValues::from_record(&record("alpha", 1200));
        let rendered: Vec<&str> = values.iter().collect();
        assert_eq!(
            rendered,
            [
                "alpha",
                "v1.7.0",
                "alpha.local",
                "20",
                "Yes",
                "1200",
                "1199",
                "1200",
                "Yes",
                "Complete",
                "4",
                "256",
                "3"
            ]
        );
    }

    #[test]
    fn test_column_keys_are_unique() {
        let mut keys: Vec<&str> = COLUMNS.iter().map(|c| c.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), COLUMN_COUNT);
    }

    #[test]
    fn test_get_out_of_range() {
        let values = RowValues::from_record(&record("alpha", 1));
        assert_eq!(values.get(0), Some("alpha"));
        assert_eq!(values.get(COLUMN_COUNT), None);
    }
}
