use alloc::string::String;
use core::fmt;

/// Broad failure family, used by callers that only care whether to fix
/// their input, fix whitelist state, or look elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Authorization,
    NotFound,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Authorization => write!(f, "authorization"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridError {
    InvalidSize { linear_size: u32 },
    InvalidWordBits { word_bits: u32 },
    PositionOutOfRange { position: u64, cell_count: u64 },
    CellOutOfRange { row: u32, col: u32, linear_size: u32 },
    WordIndexOutOfRange { word_index: u64, len: usize },
    MapTooShort { expected: u32, actual: usize },
    WordOverflow { word_index: usize, word_bits: u32 },
}

impl GridError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { linear_size } => {
                write!(f, "invalid grid size: {linear_size}")
            }
            Self::InvalidWordBits { word_bits } => {
                write!(f, "invalid word width: {word_bits} bits (allowed 1..=256)")
            }
            Self::PositionOutOfRange {
                position,
                cell_count,
            } => write!(
                f,
                "position out of range: {position} (grid has {cell_count} cells)"
            ),
            Self::CellOutOfRange {
                row,
                col,
                linear_size,
            } => write!(
                f,
                "cell ({row}, {col}) out of range for a {linear_size}x{linear_size} grid"
            ),
            Self::WordIndexOutOfRange { word_index, len } => write!(
                f,
                "word index out of range: {word_index} (map has {len} words)"
            ),
            Self::MapTooShort { expected, actual } => write!(
                f,
                "map too short: expected {expected} words, got {actual}"
            ),
            Self::WordOverflow {
                word_index,
                word_bits,
            } => write!(
                f,
                "word {word_index} does not fit in {word_bits} bits"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GridError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoreError {
    KindNotWhitelisted { kind: u64 },
    PoiNotWhitelisted { poi: u64 },
    PropNotWhitelisted { prop: u64 },
    NotAdmin,
    EntityNotFound { entity_id: u64 },
    RevisionNotFound { entity_id: u64, revision_id: u64 },
    MalformedEntity { entity_id: u64, reason: &'static str },
}

impl LoreError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::KindNotWhitelisted { .. }
            | Self::PoiNotWhitelisted { .. }
            | Self::PropNotWhitelisted { .. }
            | Self::NotAdmin => ErrorClass::Authorization,
            Self::EntityNotFound { .. } | Self::RevisionNotFound { .. } => ErrorClass::NotFound,
            Self::MalformedEntity { .. } => ErrorClass::Validation,
        }
    }
}

impl fmt::Display for LoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KindNotWhitelisted { kind } => write!(f, "kind {kind} is not whitelisted"),
            Self::PoiNotWhitelisted { poi } => {
                write!(f, "point of interest {poi} is not whitelisted")
            }
            Self::PropNotWhitelisted { prop } => write!(f, "property {prop} is not whitelisted"),
            Self::NotAdmin => write!(f, "caller is not the lore admin"),
            Self::EntityNotFound { entity_id } => write!(f, "entity {entity_id} not found"),
            Self::RevisionNotFound {
                entity_id,
                revision_id,
            } => write!(f, "entity {entity_id} has no revision {revision_id}"),
            Self::MalformedEntity { entity_id, reason } => {
                write!(f, "malformed entity {entity_id}: {reason}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LoreError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalldataError {
    Truncated { needed: usize, remaining: usize },
    TrailingData { extra: usize },
    ValueOutOfRange { field: &'static str },
    UnknownFunction(String),
    UnknownCategory { code: u64 },
}

impl CalldataError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}

impl fmt::Display for CalldataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, remaining } => write!(
                f,
                "calldata truncated: need {needed} more words, {remaining} left"
            ),
            Self::TrailingData { extra } => {
                write!(f, "calldata has {extra} unexpected trailing words")
            }
            Self::ValueOutOfRange { field } => write!(f, "calldata value out of range: {field}"),
            Self::UnknownFunction(name) => write!(f, "unknown function: {name}"),
            Self::UnknownCategory { code } => write!(f, "unknown whitelist category: {code}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CalldataError {}

/// Any failure of a calldata invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvokeError {
    Calldata(CalldataError),
    Grid(GridError),
    Lore(LoreError),
}

impl InvokeError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Calldata(err) => err.class(),
            Self::Grid(err) => err.class(),
            Self::Lore(err) => err.class(),
        }
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calldata(err) => err.fmt(f),
            Self::Grid(err) => err.fmt(f),
            Self::Lore(err) => err.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvokeError {}

impl From<CalldataError> for InvokeError {
    fn from(err: CalldataError) -> Self {
        Self::Calldata(err)
    }
}

impl From<GridError> for InvokeError {
    fn from(err: GridError) -> Self {
        Self::Grid(err)
    }
}

impl From<LoreError> for InvokeError {
    fn from(err: LoreError) -> Self {
        Self::Lore(err)
    }
}
