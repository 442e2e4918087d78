//! Paginated feedback retrieval.
//!
//! Storage pagination is key-based, the API exposes page numbers. A caller
//! that already holds the cursor of the previous page passes it back and the
//! store resumes directly; without one, page `N` is reached by walking `N`
//! continuation keys from the start. Nothing is cached between invocations.
//!
//! Sorting applies to the fetched page only.

use std::cmp::Ordering;
use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Feedback;
use crate::store::{ContinuationKey, FeedbackSlice, Stores};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortProperty {
    Rate,
    #[default]
    Date,
}

impl SortProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortProperty::Rate => "rate",
            SortProperty::Date => "date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Asc)
    }
}

/// Sort order parsed from a `property,direction` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedbackSort {
    pub property: SortProperty,
    pub direction: SortDirection,
}

impl FeedbackSort {
    /// Expects `property,direction`; anything else, including a bare
    /// property, falls back to `date` / `asc`.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some((property, direction)) = raw.and_then(|r| r.split_once(',')) else {
            return Self::default();
        };
        let property = match property.trim().to_ascii_lowercase().as_str() {
            "rate" => SortProperty::Rate,
            _ => SortProperty::Date,
        };
        let direction = direction.split(',').next().unwrap_or_default();
        let direction = match direction.trim().to_ascii_lowercase().as_str() {
            "desc" => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Self {
            property,
            direction,
        }
    }

    fn compare(&self, a: &Feedback, b: &Feedback) -> Ordering {
        let ordering = match self.property {
            SortProperty::Rate => a.rate.total_cmp(&b.rate),
            SortProperty::Date => a.date.cmp(&b.date),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn apply(&self, items: &mut [Feedback]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for FeedbackSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}",
            self.property.as_str(),
            self.direction.as_str().to_ascii_lowercase()
        )
    }
}

/// Validated feedback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackQuery {
    pub location_id: String,
    pub feedback_type: String,
    pub page: u32,
    pub size: u32,
    pub sort: FeedbackSort,
    pub cursor: Option<ContinuationKey>,
}

impl FeedbackQuery {
    pub fn parse(
        location_id: &str,
        feedback_type: Option<&str>,
        page: Option<&str>,
        size: Option<&str>,
        sort: Option<&str>,
        cursor: Option<&str>,
    ) -> Result<Self> {
        let feedback_type = feedback_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::invalid_parameter("Feedback type is required"))?;

        let page = match page.map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                Error::invalid_parameter("Page must be a non-negative integer")
            })?,
            None => 0,
        };

        let size = match size.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
                .ok_or_else(|| {
                    Error::invalid_parameter(format!(
                        "Size must be between 1 and {MAX_PAGE_SIZE}"
                    ))
                })?,
            None => DEFAULT_PAGE_SIZE,
        };

        let cursor = match cursor.map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => Some(decode_cursor(raw)?),
            None => None,
        };

        Ok(Self {
            location_id: location_id.to_string(),
            feedback_type: feedback_type.to_string(),
            page,
            size,
            sort: FeedbackSort::parse(sort),
            cursor,
        })
    }
}

/// Encode a continuation key as an opaque URL-safe token.
pub fn encode_cursor(key: &ContinuationKey) -> Result<String> {
    let json = serde_json::to_vec(key)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_cursor(token: &str) -> Result<ContinuationKey> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| Error::invalid_parameter("Invalid cursor"))?;
    serde_json::from_slice(&bytes).map_err(|_| Error::invalid_parameter("Invalid cursor"))
}

/// One page of feedback plus the counters needed to describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackPage {
    pub content: Vec<Feedback>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub sort: FeedbackSort,
    pub next_cursor: Option<String>,
}

impl FeedbackPage {
    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.size.max(1)))
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
            || (u64::from(self.page) + 1) * u64::from(self.size) >= self.total_elements
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

pub async fn get_feedbacks(stores: &Stores, query: &FeedbackQuery) -> Result<FeedbackPage> {
    let total_elements = stores
        .feedback
        .count_feedback(&query.location_id, &query.feedback_type)
        .await?;

    let limit = query.size as usize;
    let start = match &query.cursor {
        Some(cursor) => Some(cursor.clone()),
        None => match skip_pages(stores, query, limit).await? {
            Skip::At(key) => key,
            Skip::PastEnd => {
                return Ok(FeedbackPage {
                    content: Vec::new(),
                    page: query.page,
                    size: query.size,
                    total_elements,
                    sort: query.sort,
                    next_cursor: None,
                })
            }
        },
    };

    let FeedbackSlice { mut items, next } = stores
        .feedback
        .feedback_page(
            &query.location_id,
            &query.feedback_type,
            limit,
            start.as_ref(),
        )
        .await?;

    query.sort.apply(&mut items);

    let next_cursor = match next {
        Some(key) => Some(encode_cursor(&key)?),
        None => None,
    };

    debug!(
        location_id = %query.location_id,
        page = query.page,
        returned = items.len(),
        total = total_elements,
        "fetched feedback page"
    );

    Ok(FeedbackPage {
        content: items,
        page: query.page,
        size: query.size,
        total_elements,
        sort: query.sort,
        next_cursor,
    })
}

enum Skip {
    At(Option<ContinuationKey>),
    PastEnd,
}

/// Follow continuation keys from the start of the query to `query.page`.
async fn skip_pages(stores: &Stores, query: &FeedbackQuery, limit: usize) -> Result<Skip> {
    let mut key: Option<ContinuationKey> = None;
    for _ in 0..query.page {
        let slice = stores
            .feedback
            .feedback_page(
                &query.location_id,
                &query.feedback_type,
                limit,
                key.as_ref(),
            )
            .await?;
        match slice.next {
            Some(next) => key = Some(next),
            None => return Ok(Skip::PastEnd),
        }
    }
    Ok(Skip::At(key))
}
