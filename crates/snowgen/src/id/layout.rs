use core::fmt;

use crate::SnowflakeId;

/// One named bit field of a packed ID, as decoded from a concrete value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitField {
    /// Field name as shown in the layout table.
    pub name: &'static str,
    /// Width of the field in bits.
    pub bits: u32,
    /// Value of the field, shifted down to bit zero.
    pub value: u64,
}

impl SnowflakeId {
    /// Returns the fields from most to least significant, excluding the
    /// reserved bit.
    pub const fn fields(&self) -> [BitField; 4] {
        [
            BitField {
                name: "timestamp",
                bits: Self::TIMESTAMP_BITS,
                value: self.timestamp(),
            },
            BitField {
                name: "datacenter",
                bits: Self::DATACENTER_ID_BITS,
                value: self.datacenter_id(),
            },
            BitField {
                name: "worker",
                bits: Self::WORKER_ID_BITS,
                value: self.worker_id(),
            },
            BitField {
                name: "sequence",
                bits: Self::SEQUENCE_BITS,
                value: self.sequence(),
            },
        ]
    }
}

fn center(s: impl ToString, width: usize) -> String {
    let s = s.to_string();
    let len = s.len();
    if len >= width {
        return s;
    }
    let pad = width - len;
    let left = pad / 2;
    let right = pad - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

fn write_border(f: &mut fmt::Formatter<'_>, columns: &[usize]) -> fmt::Result {
    write!(f, "        +")?;
    for &w in columns {
        write!(f, "{}+", "-".repeat(w))?;
    }
    writeln!(f)
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    cells: impl IntoIterator<Item = String>,
    columns: &[usize],
) -> fmt::Result {
    write!(f, "        |")?;
    for (cell, &w) in cells.into_iter().zip(columns) {
        write!(f, "{}|", center(cell, w))?;
    }
    writeln!(f)
}

/// Renders an ID as a table of its fields in decimal and hex.
///
/// ```text
/// SnowflakeId {
///     raw id     : 0x00000000fa021000 (4194439168)
///     padded     : 00000000004194439168
///     layout     :
///         +----------------+----------------+------------+---------------+
///         | timestamp (41) | datacenter (5) | worker (5) | sequence (12) |
///         ...
/// }
/// ```
pub(crate) fn write_bit_layout_debug(
    f: &mut fmt::Formatter<'_>,
    id: &SnowflakeId,
    type_name: &str,
) -> fmt::Result {
    let fields = id.fields();

    // Widest of label, decimal and hex, plus padding
    let columns: Vec<usize> = fields
        .iter()
        .map(|field| {
            let label_len = format!("{} ({})", field.name, field.bits).len();
            let dec_len = field.value.to_string().len();
            let hex_len = format!("0x{:x}", field.value).len();
            label_len.max(dec_len).max(hex_len) + 2
        })
        .collect();

    writeln!(f, "{type_name} {{")?;
    writeln!(f, "    raw id     : 0x{:016x} ({})", id.to_raw(), id.to_raw())?;
    writeln!(f, "    padded     : {}", id.to_padded_string())?;
    writeln!(f, "    unix ms    : {}", id.unix_millis())?;
    writeln!(f, "    layout     :")?;

    write_border(f, &columns)?;
    write_row(
        f,
        fields.iter().map(|field| format!("{} ({})", field.name, field.bits)),
        &columns,
    )?;
    write_border(f, &columns)?;
    write_row(f, fields.iter().map(|field| field.value.to_string()), &columns)?;
    write_row(
        f,
        fields.iter().map(|field| format!("0x{:x}", field.value)),
        &columns,
    )?;
    write_border(f, &columns)?;

    write!(f, "}}")
}
