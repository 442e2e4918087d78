//! Table availability resolution.
//!
//! A table's free slots are its configured slots minus every slot that
//! overlaps a confirmed reservation's 90 minute window. The result is then
//! narrowed by the optional start-time and party-size filters.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Reservation, Table};
use crate::slot::{parse_date, parse_time, TimeWindow};
use crate::store::Stores;

/// Validated availability filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub location_id: String,
    pub date: Option<NaiveDate>,
    /// Only slots starting strictly after this time are kept.
    pub time: Option<NaiveTime>,
    pub guests: Option<u32>,
}

impl AvailabilityQuery {
    pub fn for_location(location_id: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            date: None,
            time: None,
            guests: None,
        }
    }

    /// Build a query from raw query-string values.
    pub fn parse(
        location_id: Option<&str>,
        date: Option<&str>,
        time: Option<&str>,
        guests: Option<&str>,
    ) -> Result<Self> {
        let location_id = location_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::invalid_parameter("Location ID is required."))?;

        let date = match non_blank(date) {
            Some(raw) => Some(parse_date(raw).ok_or_else(|| {
                Error::invalid_parameter("Invalid date format. Expected format: YYYY-MM-DD")
            })?),
            None => None,
        };

        let time = match non_blank(time) {
            Some(raw) => Some(parse_time(raw).ok_or_else(|| {
                Error::invalid_parameter("Invalid time format. Expected format: HH:mm")
            })?),
            None => None,
        };

        let guests = match non_blank(guests) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(Error::invalid_parameter(
                        "Guests must be a positive integer",
                    ))
                }
            },
            None => None,
        };

        Ok(Self {
            location_id: location_id.to_string(),
            date,
            time,
            guests,
        })
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_guests(mut self, guests: u32) -> Self {
        self.guests = Some(guests);
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A table with at least one free slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableAvailability {
    pub location_id: String,
    pub location_address: String,
    pub table_number: u32,
    pub capacity: u32,
    pub available_slots: Vec<String>,
}

/// Resolve the tables at a location that can still be booked.
///
/// Returns [`Error::TableNotFound`] when the location has no tables at all;
/// callers treat that as an empty result.
pub async fn find_available_tables(
    stores: &Stores,
    query: &AvailabilityQuery,
) -> Result<Vec<TableAvailability>> {
    let tables = stores
        .tables
        .tables_for_location(&query.location_id)
        .await?;
    if tables.is_empty() {
        return Err(Error::TableNotFound {
            message: format!("No tables found for location {}", query.location_id),
        });
    }

    let location = stores
        .locations
        .get_location(&query.location_id)
        .await?
        .ok_or_else(|| Error::LocationNotFound {
            id: query.location_id.clone(),
        })?;

    let table_ids: Vec<String> = tables.iter().map(|t| t.table_id.clone()).collect();
    let date = query.date.map(|d| d.format("%Y-%m-%d").to_string());
    let reservations = stores
        .reservations
        .reservations_for_tables(&table_ids, date.as_deref())
        .await?;

    let booked = booked_windows(&reservations, date.as_deref());

    let mut available: Vec<TableAvailability> = tables
        .iter()
        .filter(|table| query.guests.map_or(true, |guests| table.capacity >= guests))
        .filter_map(|table| {
            let windows = booked
                .get(table.table_id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let slots = free_slots(table, windows, query.time);
            (!slots.is_empty()).then(|| TableAvailability {
                location_id: location.id.clone(),
                location_address: location.address.clone(),
                table_number: table.table_number,
                capacity: table.capacity,
                available_slots: slots,
            })
        })
        .collect();

    available.sort_by_key(|t| t.table_number);

    debug!(
        location_id = %query.location_id,
        tables = tables.len(),
        available = available.len(),
        "resolved table availability"
    );

    Ok(available)
}

/// Confirmed reservation windows grouped by table id.
fn booked_windows<'a>(
    reservations: &'a [Reservation],
    date: Option<&str>,
) -> HashMap<&'a str, Vec<TimeWindow>> {
    let mut booked: HashMap<&str, Vec<TimeWindow>> = HashMap::new();
    for reservation in reservations {
        if !reservation.status.blocks_table() {
            continue;
        }
        if date.is_some_and(|d| d != reservation.date) {
            continue;
        }
        match parse_time(&reservation.time) {
            Some(start) => booked
                .entry(reservation.table_id.as_str())
                .or_default()
                .push(TimeWindow::slot_at(start)),
            None => warn!(
                reservation_id = %reservation.id,
                time = %reservation.time,
                "skipping reservation with unparsable start time"
            ),
        }
    }
    booked
}

/// Configured slots of `table` not overlapping any of `booked`.
pub fn free_slots(table: &Table, booked: &[TimeWindow], after: Option<NaiveTime>) -> Vec<String> {
    table
        .available_slots
        .iter()
        .filter_map(|raw| match TimeWindow::parse_slot(raw) {
            Some(window) => Some((raw.trim(), window)),
            None => {
                warn!(table_id = %table.table_id, slot = %raw, "skipping malformed slot");
                None
            }
        })
        .filter(|(_, window)| !booked.iter().any(|b| b.overlaps(window)))
        .filter(|(_, window)| after.map_or(true, |time| window.starts_after(time)))
        .map(|(raw, _)| raw.to_string())
        .collect()
}
