//! Predicate stages of the filter pipeline.
//!
//! The [`Stage`] enum names each step in the order the engine runs them.
//! Every stage can only narrow the surviving set; a later stage never brings
//! back a record an earlier one dropped.

/// One step of the filter pipeline.
///
/// Stages run in declaration order:
/// - **Search**: case-insensitive substring over the searchable fields
/// - **DateRange**: inclusive day range over the effective date field
/// - **Status**: entity-specific status rule
/// - **Category**, **Course**, **Year**, **Returnable**, **Lender**: exact matches
/// - **ValueRange**: numeric min/max over the value field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Text search.
    Search,
    /// Date range.
    DateRange,
    /// Status rule.
    Status,
    /// Category id or name (products).
    Category,
    /// Course (students).
    Course,
    /// Year of study (students).
    Year,
    /// Returnable flag (products).
    Returnable,
    /// Lender id or name (orders).
    Lender,
    /// Min/max numeric range.
    ValueRange,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 9] = [
        Stage::Search,
        Stage::DateRange,
        Stage::Status,
        Stage::Category,
        Stage::Course,
        Stage::Year,
        Stage::Returnable,
        Stage::Lender,
        Stage::ValueRange,
    ];

    /// Returns `true` if a record missing the stage's field is kept.
    ///
    /// Only the value range behaves this way: an unpriced record cannot be
    /// judged out of range. Every other stage drops such a record.
    pub fn keeps_missing(self) -> bool {
        matches!(self, Stage::ValueRange)
    }

    /// Returns the display name of this stage.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Search => "search",
            Stage::DateRange => "date_range",
            Stage::Status => "status",
            Stage::Category => "category",
            Stage::Course => "course",
            Stage::Year => "year",
            Stage::Returnable => "returnable",
            Stage::Lender => "lender",
            Stage::ValueRange => "value_range",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
