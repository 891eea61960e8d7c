use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Number of positional columns (A through Z) in a journal export.
pub const COLUMN_COUNT: usize = 26;

/// Columns of a general-ledger journal export, in sheet order A–Z.
///
/// Columns are bound by position, never by the label found in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    SchemeId,
    SchemeShortName,
    JournalEntryNo,
    DocumentType,
    DocumentDate,
    PostingDate,
    CompanyCode,
    Reference,
    DocumentHeaderText,
    Amount,
    Currency,
    PostingKey,
    CrossCompany,
    GlAccount,
    VendorId,
    CustomerId,
    TaxCode,
    WithholdingTaxType,
    WithholdingTaxCode,
    WithholdingTaxBaseAmount,
    CostCenter,
    ProfitCenter,
    Order,
    FundCenter,
    Assignment,
    Text,
}

impl Column {
    /// All columns in sheet order.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::SchemeId,
        Column::SchemeShortName,
        Column::JournalEntryNo,
        Column::DocumentType,
        Column::DocumentDate,
        Column::PostingDate,
        Column::CompanyCode,
        Column::Reference,
        Column::DocumentHeaderText,
        Column::Amount,
        Column::Currency,
        Column::PostingKey,
        Column::CrossCompany,
        Column::GlAccount,
        Column::VendorId,
        Column::CustomerId,
        Column::TaxCode,
        Column::WithholdingTaxType,
        Column::WithholdingTaxCode,
        Column::WithholdingTaxBaseAmount,
        Column::CostCenter,
        Column::ProfitCenter,
        Column::Order,
        Column::FundCenter,
        Column::Assignment,
        Column::Text,
    ];

    /// Columns forming the consolidation key.
    pub const KEY: [Column; 3] = [Column::SchemeId, Column::GlAccount, Column::DocumentType];

    /// Zero-based sheet column index (A = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header label used when the column is written out.
    pub fn header(self) -> &'static str {
        match self {
            Column::SchemeId => "schemeid",
            Column::SchemeShortName => "Scheme Short Name",
            Column::JournalEntryNo => "Journal Entry No",
            Column::DocumentType => "Document Type",
            Column::DocumentDate => "Document Date",
            Column::PostingDate => "Posting Date",
            Column::CompanyCode => "Company Code",
            Column::Reference => "Reference",
            Column::DocumentHeaderText => "Document Header Text",
            Column::Amount => "Amount",
            Column::Currency => "Currency",
            Column::PostingKey => "Posting Key",
            Column::CrossCompany => "Cross Company",
            Column::GlAccount => "GL Account",
            Column::VendorId => "Vendor ID",
            Column::CustomerId => "Customer ID",
            Column::TaxCode => "Tax Code",
            Column::WithholdingTaxType => "Withholding Tax Type",
            Column::WithholdingTaxCode => "Withholding Tax Code",
            Column::WithholdingTaxBaseAmount => "Withholding Tax Base Amount",
            Column::CostCenter => "Cost Center",
            Column::ProfitCenter => "Profit Center",
            Column::Order => "Order",
            Column::FundCenter => "Fund Center",
            Column::Assignment => "Assignment",
            Column::Text => "Text",
        }
    }

    /// Spreadsheet letter of the column, used in error messages.
    pub fn letter(self) -> char {
        (b'A' + self.index() as u8) as char
    }

    /// Column order of a consolidated export: the key columns first, then the
    /// remaining columns in sheet order.
    pub fn output_order() -> Vec<Column> {
        let mut columns = Column::KEY.to_vec();
        columns.extend(Column::ALL.iter().copied().filter(|c| !c.is_key()));
        columns
    }

    pub fn is_key(self) -> bool {
        Column::KEY.contains(&self)
    }
}

/// A single cell read from a journal export.
#[derive(Debug, Clone, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    /// Numeric cell. Integer cells are folded in here.
    Number(f64),
    Bool(bool),
    /// Excel serial date (days since 1899-12-30, fraction is time of day).
    DateTime(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Converts the serial date into a calendar timestamp.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(serial) => serial_to_datetime(*serial),
            _ => None,
        }
    }
}

// Counting from 1899-12-30 absorbs the phantom 1900-02-29 of the 1900 date
// system, so serials from 61 (1900-03-01) on are exact. Serials below 60 come
// out one day early, as they do in every reader that ignores the phantom day.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if !millis.is_finite() {
        return None;
    }
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}

// Keys must compare by type and value; numbers compare on a canonical bit
// pattern so they can be hashed.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => true,
            (CellValue::Text(lhs), CellValue::Text(rhs)) => lhs == rhs,
            (CellValue::Number(lhs), CellValue::Number(rhs)) => {
                canonical_bits(*lhs) == canonical_bits(*rhs)
            }
            (CellValue::Bool(lhs), CellValue::Bool(rhs)) => lhs == rhs,
            (CellValue::DateTime(lhs), CellValue::DateTime(rhs)) => {
                canonical_bits(*lhs) == canonical_bits(*rhs)
            }
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Empty => {}
            CellValue::Text(value) => value.hash(state),
            CellValue::Number(value) | CellValue::DateTime(value) => {
                canonical_bits(*value).hash(state)
            }
            CellValue::Bool(value) => value.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(stamp) if stamp.num_seconds_from_midnight() == 0 => {
                    write!(f, "{}", stamp.format("%Y-%m-%d"))
                }
                Some(stamp) => write!(f, "{}", stamp.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{serial}"),
            },
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Text(value) => serializer.serialize_str(value),
            CellValue::Number(value) => serializer.serialize_f64(*value),
            CellValue::Bool(value) => serializer.serialize_bool(*value),
            CellValue::DateTime(_) => serializer.collect_str(self),
        }
    }
}

/// One journal line bound positionally to the 26 columns.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalRow {
    /// 1-based sheet line the row was read from.
    pub line: u32,
    cells: [CellValue; COLUMN_COUNT],
}

impl JournalRow {
    /// Builds a row from cells in sheet order. Whatever the Amount cell held
    /// is replaced by `amount`.
    pub fn new(line: u32, mut cells: [CellValue; COLUMN_COUNT], amount: f64) -> Self {
        cells[Column::Amount.index()] = CellValue::Number(amount);
        Self { line, cells }
    }

    pub fn get(&self, column: Column) -> &CellValue {
        &self.cells[column.index()]
    }

    pub fn set(&mut self, column: Column, value: CellValue) {
        self.cells[column.index()] = value;
    }

    pub fn amount(&self) -> f64 {
        self.get(Column::Amount).as_number().unwrap_or(0.0)
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.set(Column::Amount, CellValue::Number(amount));
    }

    /// The (schemeid, GL Account, Document Type) identity of the row.
    pub fn key(&self) -> GroupKey {
        GroupKey(Column::KEY.map(|column| self.get(column).clone()))
    }

    /// First key column holding no value, if any.
    pub fn empty_key_column(&self) -> Option<Column> {
        Column::KEY
            .into_iter()
            .find(|column| self.get(*column).is_empty())
    }
}

impl Serialize for JournalRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let columns = Column::output_order();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            map.serialize_entry(column.header(), self.get(column))?;
        }
        map.end()
    }
}

/// Composite consolidation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(pub [CellValue; 3]);

/// The rows loaded from one input, in sheet order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Label of the input the rows came from (usually the file name).
    pub source: String,
    pub rows: Vec<JournalRow>,
}

impl Table {
    pub fn new(source: impl Into<String>, rows: Vec<JournalRow>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }
}

/// Counters describing one consolidation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidationSummary {
    pub input_rows: usize,
    pub groups: usize,
    pub dropped_rows: usize,
}

/// Result of consolidation: one row per distinct key, in first-appearance
/// order, with Amount as the absolute value of the group sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedTable {
    pub rows: Vec<JournalRow>,
    pub summary: ConsolidationSummary,
}

impl ConsolidatedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
