use async_trait::async_trait;
use dashboard_core::{ContentRecord, CostRecord, FetchError, RecordKind};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Ascending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// A whole-collection read, ordered by one column.
///
/// The order column is checked against the collection's known columns when
/// the query is built, so backends can put it into a request verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    kind: RecordKind,
    order_by: String,
    direction: SortDirection,
}

impl Query {
    pub fn new(kind: RecordKind, order_by: &str, ascending: bool) -> Result<Self, FetchError> {
        if !kind.has_column(order_by) {
            return Err(FetchError::rejected(format!(
                "unknown sort column '{}' for {} records",
                order_by,
                kind.label()
            )));
        }

        Ok(Self {
            kind,
            order_by: order_by.to_string(),
            direction: SortDirection::from_ascending(ascending),
        })
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} {}",
            self.kind.label(),
            self.order_by,
            self.direction.as_str()
        )
    }
}

/// Rows returned by a data source, tagged by collection.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSet {
    Content(Vec<ContentRecord>),
    Cost(Vec<CostRecord>),
}

impl RecordSet {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordSet::Content(_) => RecordKind::Content,
            RecordSet::Cost(_) => RecordKind::Cost,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordSet::Content(rows) => rows.len(),
            RecordSet::Cost(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A record type the fetcher can return.
pub trait Record: Sized + Send {
    const KIND: RecordKind;

    fn unpack(set: RecordSet) -> Result<Vec<Self>, FetchError>;
}

impl Record for ContentRecord {
    const KIND: RecordKind = RecordKind::Content;

    fn unpack(set: RecordSet) -> Result<Vec<Self>, FetchError> {
        match set {
            RecordSet::Content(rows) => Ok(rows),
            other => Err(mismatch(Self::KIND, other.kind())),
        }
    }
}

impl Record for CostRecord {
    const KIND: RecordKind = RecordKind::Cost;

    fn unpack(set: RecordSet) -> Result<Vec<Self>, FetchError> {
        match set {
            RecordSet::Cost(rows) => Ok(rows),
            other => Err(mismatch(Self::KIND, other.kind())),
        }
    }
}

fn mismatch(expected: RecordKind, got: RecordKind) -> FetchError {
    FetchError::malformed(format!(
        "expected {} records, data source returned {} records",
        expected.label(),
        got.label()
    ))
}

/// Backend holding the scraper's collections.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short backend name for logs and metrics
    fn name(&self) -> &str;

    async fn select_all(&self, query: &Query) -> Result<RecordSet, FetchError>;
}
