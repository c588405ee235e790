use std::fmt;

/// A single non-blank spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(text) => f.write_str(text),
            // Integral numbers render without a trailing ".0" so host ids and
            // boolean flags stored as numbers read back the way they were typed.
            RawValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            RawValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One spreadsheet row: source header text paired with the cell under it,
/// in sheet column order. Blank cells are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    cells: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, value: RawValue) {
        self.cells.push((header.into(), value));
    }

    pub fn with(mut self, header: impl Into<String>, value: RawValue) -> Self {
        self.push(header, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v))
    }
}
