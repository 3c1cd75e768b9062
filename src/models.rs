//! Domain models that mirror the SQLite schema and travel between the HTTP API,
//! the persistence layer, and the TUI. The field descriptor table below is the
//! single source of truth for which attributes exist, which ones are required,
//! and which ones feed the autocomplete suggestions. Every layer iterates over
//! it instead of looking fields up by name.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of attributes a brew carries (identity and timestamp excluded).
pub const FIELD_COUNT: usize = 28;

/// Maximum number of distinct values returned per suggestible field.
pub const SUGGESTION_LIMIT: usize = 20;

/// Field name to recently used distinct values, newest first.
pub type Suggestions = std::collections::BTreeMap<String, Vec<String>>;

/// Every attribute recorded for a brew, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BrewField {
    Date,
    Coffee,
    Roaster,
    Origin,
    Process,
    Notes,
    Grind,
    Grinder,
    Dripper,
    Filter,
    WaterType,
    WaterTemp,
    Dose,
    WaterWeight,
    BrewTime,
    Bloom,
    Pours,
    Agitation,
    FlavorHot,
    Acidity,
    Sweetness,
    Body,
    Bitterness,
    FlavorCool,
    NewNotes,
    Balance,
    Score,
    ExtraNotes,
}

impl BrewField {
    /// Canonical ordering. Required-field checks walk this array front to back,
    /// so the first missing field reported is always the earliest one here.
    pub const ALL: [BrewField; FIELD_COUNT] = [
        BrewField::Date,
        BrewField::Coffee,
        BrewField::Roaster,
        BrewField::Origin,
        BrewField::Process,
        BrewField::Notes,
        BrewField::Grind,
        BrewField::Grinder,
        BrewField::Dripper,
        BrewField::Filter,
        BrewField::WaterType,
        BrewField::WaterTemp,
        BrewField::Dose,
        BrewField::WaterWeight,
        BrewField::BrewTime,
        BrewField::Bloom,
        BrewField::Pours,
        BrewField::Agitation,
        BrewField::FlavorHot,
        BrewField::Acidity,
        BrewField::Sweetness,
        BrewField::Body,
        BrewField::Bitterness,
        BrewField::FlavorCool,
        BrewField::NewNotes,
        BrewField::Balance,
        BrewField::Score,
        BrewField::ExtraNotes,
    ];

    /// Name used as the JSON key on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            BrewField::Date => "date",
            BrewField::Coffee => "coffee",
            BrewField::Roaster => "roaster",
            BrewField::Origin => "origin",
            BrewField::Process => "process",
            BrewField::Notes => "notes",
            BrewField::Grind => "grind",
            BrewField::Grinder => "grinder",
            BrewField::Dripper => "dripper",
            BrewField::Filter => "filter",
            BrewField::WaterType => "waterType",
            BrewField::WaterTemp => "waterTemp",
            BrewField::Dose => "dose",
            BrewField::WaterWeight => "waterWeight",
            BrewField::BrewTime => "brewTime",
            BrewField::Bloom => "bloom",
            BrewField::Pours => "pours",
            BrewField::Agitation => "agitation",
            BrewField::FlavorHot => "flavorHot",
            BrewField::Acidity => "acidity",
            BrewField::Sweetness => "sweetness",
            BrewField::Body => "body",
            BrewField::Bitterness => "bitterness",
            BrewField::FlavorCool => "flavorCool",
            BrewField::NewNotes => "newNotes",
            BrewField::Balance => "balance",
            BrewField::Score => "score",
            BrewField::ExtraNotes => "extraNotes",
        }
    }

    /// Column name in the `brews` table. These are compile-time constants, so
    /// interpolating them into SQL never involves user input.
    pub const fn column(self) -> &'static str {
        match self {
            BrewField::Date => "date",
            BrewField::Coffee => "coffee",
            BrewField::Roaster => "roaster",
            BrewField::Origin => "origin",
            BrewField::Process => "process",
            BrewField::Notes => "notes",
            BrewField::Grind => "grind",
            BrewField::Grinder => "grinder",
            BrewField::Dripper => "dripper",
            BrewField::Filter => "filter",
            BrewField::WaterType => "water_type",
            BrewField::WaterTemp => "water_temp",
            BrewField::Dose => "dose",
            BrewField::WaterWeight => "water_weight",
            BrewField::BrewTime => "brew_time",
            BrewField::Bloom => "bloom",
            BrewField::Pours => "pours",
            BrewField::Agitation => "agitation",
            BrewField::FlavorHot => "flavor_hot",
            BrewField::Acidity => "acidity",
            BrewField::Sweetness => "sweetness",
            BrewField::Body => "body",
            BrewField::Bitterness => "bitterness",
            BrewField::FlavorCool => "flavor_cool",
            BrewField::NewNotes => "new_notes",
            BrewField::Balance => "balance",
            BrewField::Score => "score",
            BrewField::ExtraNotes => "extra_notes",
        }
    }

    /// Human-readable label shown in the form and the list views.
    pub const fn label(self) -> &'static str {
        match self {
            BrewField::Date => "Date",
            BrewField::Coffee => "Coffee",
            BrewField::Roaster => "Roaster",
            BrewField::Origin => "Origin",
            BrewField::Process => "Process",
            BrewField::Notes => "Notes",
            BrewField::Grind => "Grind Setting",
            BrewField::Grinder => "Grinder",
            BrewField::Dripper => "Dripper",
            BrewField::Filter => "Filter",
            BrewField::WaterType => "Water Type",
            BrewField::WaterTemp => "Water Temp (°C)",
            BrewField::Dose => "Coffee Dose (g)",
            BrewField::WaterWeight => "Water Weight (g)",
            BrewField::BrewTime => "Brew Time",
            BrewField::Bloom => "Bloom",
            BrewField::Pours => "Pours",
            BrewField::Agitation => "Agitation",
            BrewField::FlavorHot => "Flavor (Hot)",
            BrewField::Acidity => "Acidity",
            BrewField::Sweetness => "Sweetness",
            BrewField::Body => "Body",
            BrewField::Bitterness => "Bitterness",
            BrewField::FlavorCool => "Flavor (Cool)",
            BrewField::NewNotes => "New Notes",
            BrewField::Balance => "Balance",
            BrewField::Score => "Score",
            BrewField::ExtraNotes => "Extra Notes",
        }
    }

    /// Example value rendered in place of an empty input.
    pub const fn placeholder(self) -> &'static str {
        match self {
            BrewField::Date => "YYYY-MM-DD",
            BrewField::Coffee => "e.g. Ethiopia Guji",
            BrewField::Roaster => "e.g. Black & White",
            BrewField::Origin => "e.g. Ethiopia",
            BrewField::Process => "e.g. Natural",
            BrewField::Grind => "e.g. 16 clicks",
            BrewField::Grinder => "e.g. Timemore C3 Max",
            BrewField::Dripper => "e.g. Bee House",
            BrewField::Filter => "e.g. CAFEC Abaca",
            BrewField::WaterType => "e.g. Third Wave",
            BrewField::WaterTemp => "e.g. 96",
            BrewField::Dose => "e.g. 15",
            BrewField::WaterWeight => "e.g. 250",
            BrewField::BrewTime => "e.g. 2:15",
            BrewField::Bloom => "e.g. 45g/45s",
            BrewField::Pours => "e.g. 2",
            BrewField::Agitation => "e.g. Fast/hard pour",
            BrewField::FlavorHot => "e.g. Milk chocolate",
            BrewField::Acidity => "e.g. Medium",
            BrewField::Sweetness => "e.g. High",
            BrewField::Body => "e.g. Light",
            BrewField::Bitterness => "e.g. Low",
            BrewField::FlavorCool => "e.g. Slightly dry",
            BrewField::Balance => "e.g. Good",
            BrewField::Score => "1-10",
            BrewField::Notes | BrewField::NewNotes | BrewField::ExtraNotes => "<optional>",
        }
    }

    /// Free-text notes are the only optional attributes.
    pub const fn is_required(self) -> bool {
        !matches!(
            self,
            BrewField::Notes | BrewField::NewNotes | BrewField::ExtraNotes
        )
    }

    /// Whether prior values of this field are offered as autocomplete hints.
    pub const fn is_suggestible(self) -> bool {
        !matches!(
            self,
            BrewField::Date
                | BrewField::Score
                | BrewField::Notes
                | BrewField::NewNotes
                | BrewField::ExtraNotes
        )
    }

    /// Position of the field inside [`BrewField::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Required fields in canonical order.
    pub fn required() -> impl Iterator<Item = BrewField> {
        Self::ALL.into_iter().filter(|field| field.is_required())
    }

    /// Suggestible fields in canonical order.
    pub fn suggestible() -> impl Iterator<Item = BrewField> {
        Self::ALL.into_iter().filter(|field| field.is_suggestible())
    }
}

impl fmt::Display for BrewField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reasons a brew is refused before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing field: {0}")]
    MissingField(BrewField),

    #[error("Invalid field: {0}")]
    InvalidField(BrewField),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// One slot per field, indexed by [`BrewField::index`].
pub(crate) type FieldSlots = [Option<String>; FIELD_COUNT];

/// The recorded attributes of a brew. Declaration order follows
/// [`BrewField::ALL`] so serialized records read in the same order as the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrewFields {
    pub date: String,
    pub coffee: String,
    pub roaster: String,
    pub origin: String,
    pub process: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub grind: String,
    pub grinder: String,
    pub dripper: String,
    pub filter: String,
    pub water_type: String,
    pub water_temp: String,
    pub dose: String,
    pub water_weight: String,
    pub brew_time: String,
    pub bloom: String,
    pub pours: String,
    pub agitation: String,
    pub flavor_hot: String,
    pub acidity: String,
    pub sweetness: String,
    pub body: String,
    pub bitterness: String,
    pub flavor_cool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_notes: Option<String>,
    pub balance: String,
    pub score: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_notes: Option<String>,
}

impl BrewFields {
    /// Validate raw values and assemble the record.
    ///
    /// `value_of` is asked for every field in canonical order. A required field
    /// counts as missing when it yields `None` or an empty string, and the first
    /// such field aborts the whole build. Optional notes keep whatever was
    /// supplied, including an empty string. Once all required fields are
    /// present the date must be a `YYYY-MM-DD` calendar date.
    pub fn from_values<F>(mut value_of: F) -> Result<Self, ValidationError>
    where
        F: FnMut(BrewField) -> Result<Option<String>, ValidationError>,
    {
        let mut slots: FieldSlots = Default::default();
        for field in BrewField::ALL {
            match value_of(field)? {
                Some(value) if !(field.is_required() && value.is_empty()) => {
                    slots[field.index()] = Some(value);
                }
                _ if field.is_required() => return Err(ValidationError::MissingField(field)),
                _ => {}
            }
        }

        let fields = Self::from_slots(slots);
        validate_date(&fields.date)?;
        Ok(fields)
    }

    /// Assemble a record from stored slots without validating it. Required
    /// slots that come back empty collapse to an empty string.
    pub(crate) fn from_slots(mut slots: FieldSlots) -> Self {
        let mut take = |field: BrewField| slots[field.index()].take();
        Self {
            date: take(BrewField::Date).unwrap_or_default(),
            coffee: take(BrewField::Coffee).unwrap_or_default(),
            roaster: take(BrewField::Roaster).unwrap_or_default(),
            origin: take(BrewField::Origin).unwrap_or_default(),
            process: take(BrewField::Process).unwrap_or_default(),
            notes: take(BrewField::Notes),
            grind: take(BrewField::Grind).unwrap_or_default(),
            grinder: take(BrewField::Grinder).unwrap_or_default(),
            dripper: take(BrewField::Dripper).unwrap_or_default(),
            filter: take(BrewField::Filter).unwrap_or_default(),
            water_type: take(BrewField::WaterType).unwrap_or_default(),
            water_temp: take(BrewField::WaterTemp).unwrap_or_default(),
            dose: take(BrewField::Dose).unwrap_or_default(),
            water_weight: take(BrewField::WaterWeight).unwrap_or_default(),
            brew_time: take(BrewField::BrewTime).unwrap_or_default(),
            bloom: take(BrewField::Bloom).unwrap_or_default(),
            pours: take(BrewField::Pours).unwrap_or_default(),
            agitation: take(BrewField::Agitation).unwrap_or_default(),
            flavor_hot: take(BrewField::FlavorHot).unwrap_or_default(),
            acidity: take(BrewField::Acidity).unwrap_or_default(),
            sweetness: take(BrewField::Sweetness).unwrap_or_default(),
            body: take(BrewField::Body).unwrap_or_default(),
            bitterness: take(BrewField::Bitterness).unwrap_or_default(),
            flavor_cool: take(BrewField::FlavorCool).unwrap_or_default(),
            new_notes: take(BrewField::NewNotes),
            balance: take(BrewField::Balance).unwrap_or_default(),
            score: take(BrewField::Score).unwrap_or_default(),
            extra_notes: take(BrewField::ExtraNotes),
        }
    }

    /// Read a field through its descriptor. Only optional notes can be `None`.
    pub fn value(&self, field: BrewField) -> Option<&str> {
        match field {
            BrewField::Date => Some(&self.date),
            BrewField::Coffee => Some(&self.coffee),
            BrewField::Roaster => Some(&self.roaster),
            BrewField::Origin => Some(&self.origin),
            BrewField::Process => Some(&self.process),
            BrewField::Notes => self.notes.as_deref(),
            BrewField::Grind => Some(&self.grind),
            BrewField::Grinder => Some(&self.grinder),
            BrewField::Dripper => Some(&self.dripper),
            BrewField::Filter => Some(&self.filter),
            BrewField::WaterType => Some(&self.water_type),
            BrewField::WaterTemp => Some(&self.water_temp),
            BrewField::Dose => Some(&self.dose),
            BrewField::WaterWeight => Some(&self.water_weight),
            BrewField::BrewTime => Some(&self.brew_time),
            BrewField::Bloom => Some(&self.bloom),
            BrewField::Pours => Some(&self.pours),
            BrewField::Agitation => Some(&self.agitation),
            BrewField::FlavorHot => Some(&self.flavor_hot),
            BrewField::Acidity => Some(&self.acidity),
            BrewField::Sweetness => Some(&self.sweetness),
            BrewField::Body => Some(&self.body),
            BrewField::Bitterness => Some(&self.bitterness),
            BrewField::FlavorCool => Some(&self.flavor_cool),
            BrewField::NewNotes => self.new_notes.as_deref(),
            BrewField::Balance => Some(&self.balance),
            BrewField::Score => Some(&self.score),
            BrewField::ExtraNotes => self.extra_notes.as_deref(),
        }
    }
}

/// The date must be a real calendar day written as `YYYY-MM-DD`.
fn validate_date(date: &str) -> Result<(), ValidationError> {
    let well_formed = date.len() == 10
        && date
            .char_indices()
            .all(|(idx, ch)| if idx == 4 || idx == 7 { ch == '-' } else { ch.is_ascii_digit() });
    if well_formed && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() {
        Ok(())
    } else {
        Err(ValidationError::InvalidDate(date.to_string()))
    }
}

/// A persisted brew: the recorded attributes plus server-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brew {
    /// Sequential primary key assigned by SQLite.
    pub id: i64,
    #[serde(flatten)]
    pub fields: BrewFields,
    /// Insertion time in UTC, truncated to milliseconds.
    pub created_at: DateTime<Utc>,
}

impl Brew {
    pub fn value(&self, field: BrewField) -> Option<&str> {
        self.fields.value(field)
    }
}

/// In-progress form input. Each edit produces a whole new draft through
/// [`BrewDraft::with_value`], so the editing session owns exactly one value at
/// a time and nothing else can observe half-applied changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrewDraft {
    values: [String; FIELD_COUNT],
}

impl BrewDraft {
    /// A blank draft dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self::default().with_value(BrewField::Date, today.format("%Y-%m-%d").to_string())
    }

    pub fn value(&self, field: BrewField) -> &str {
        &self.values[field.index()]
    }

    pub fn with_value(mut self, field: BrewField, value: impl Into<String>) -> Self {
        self.values[field.index()] = value.into();
        self
    }

    /// Run the same checks the server applies, on trimmed values.
    pub fn validate(&self) -> Result<BrewFields, ValidationError> {
        BrewFields::from_values(|field| Ok(Some(self.value(field).trim().to_string())))
    }

    /// JSON body for the create operation, sent only after [`validate`] passed.
    ///
    /// [`validate`]: BrewDraft::validate
    pub fn to_payload(&self) -> serde_json::Map<String, serde_json::Value> {
        BrewField::ALL
            .into_iter()
            .map(|field| {
                (
                    field.name().to_string(),
                    serde_json::Value::String(self.value(field).trim().to_string()),
                )
            })
            .collect()
    }
}
