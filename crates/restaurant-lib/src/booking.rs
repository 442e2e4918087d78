//! Reservation creation.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Reservation, ReservationStatus};
use crate::slot::{parse_date, parse_time, TimeWindow};
use crate::store::Stores;

/// Client booking request as received on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    #[serde(default)]
    pub location_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub table_number: String,
    #[serde(default)]
    pub guests_number: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time_from: String,
    #[serde(default)]
    pub time_to: String,
}

/// A request that passed every field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReservation {
    pub location_id: String,
    pub table_number: u32,
    pub guests: u32,
    pub date: NaiveDate,
    pub time_from: NaiveTime,
    pub window: TimeWindow,
}

impl ReservationRequest {
    /// Fail-fast validation; the first failing rule determines the message.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidReservation> {
        let location_id = self.location_id.trim();
        if location_id.is_empty() {
            return Err(Error::invalid_request("Location ID is required"));
        }
        let table_number = self.table_number.trim();
        if table_number.is_empty() {
            return Err(Error::invalid_request("Table number is required"));
        }
        if self.guests_number <= 0 {
            return Err(Error::invalid_request(
                "Number of guests must be greater than 0",
            ));
        }
        if self.date.trim().is_empty() {
            return Err(Error::invalid_request("Date is required"));
        }
        if self.time_from.trim().is_empty() {
            return Err(Error::invalid_request("Start time is required"));
        }
        if self.time_to.trim().is_empty() {
            return Err(Error::invalid_request("End time is required"));
        }

        let date = parse_date(&self.date)
            .ok_or_else(|| Error::invalid_request("Invalid date format. Use yyyy-MM-dd"))?;
        if date < today {
            return Err(Error::invalid_request(
                "Reservation date cannot be in the past",
            ));
        }

        let (time_from, time_to) = match (parse_time(&self.time_from), parse_time(&self.time_to)) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(Error::invalid_request("Invalid time format. Use HH:mm")),
        };
        let window = TimeWindow::between(time_from, time_to)
            .ok_or_else(|| Error::invalid_request("End time must be after start time"))?;

        let table_number = table_number
            .parse::<u32>()
            .map_err(|_| Error::invalid_request("Table number must be a positive integer"))?;
        let guests = u32::try_from(self.guests_number)
            .map_err(|_| Error::invalid_request("Number of guests is too large"))?;

        Ok(ValidReservation {
            location_id: location_id.to_string(),
            table_number,
            guests,
            date,
            time_from,
            window,
        })
    }
}

/// What the caller gets back after a successful booking.
///
/// `time_slot` is always `timeFrom` plus the standard slot width, not the
/// requested `timeTo`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationReceipt {
    pub reservation_id: String,
    pub status: ReservationStatus,
    pub location_address: String,
    pub date: String,
    pub time_slot: String,
    pub guests: u32,
    pub waiter_id: Option<String>,
}

/// Validate, check for overlaps, and persist a confirmed reservation.
///
/// The overlap check and the insert are separate store calls; only the
/// reservation id is protected by the conditional write.
pub async fn create_reservation(
    stores: &Stores,
    request: &ReservationRequest,
    today: NaiveDate,
) -> Result<ReservationReceipt> {
    let valid = request.validate(today)?;

    let table = stores
        .tables
        .tables_for_location(&valid.location_id)
        .await?
        .into_iter()
        .find(|t| t.table_number == valid.table_number)
        .ok_or_else(|| Error::TableNotFound {
            message: format!(
                "Table {} not found at location {}",
                valid.table_number, valid.location_id
            ),
        })?;

    if table.capacity < valid.guests {
        return Err(Error::invalid_request(format!(
            "Table {} seats at most {} guests",
            table.table_number, table.capacity
        )));
    }

    let date = valid.date.format("%Y-%m-%d").to_string();
    let existing = stores
        .reservations
        .reservations_for_tables(std::slice::from_ref(&table.table_id), Some(&date))
        .await?;
    let conflict = existing
        .iter()
        .filter(|r| r.status.blocks_table() && r.date == date)
        .filter_map(|r| parse_time(&r.time))
        .any(|start| TimeWindow::slot_at(start).overlaps(&valid.window));
    if conflict {
        return Err(Error::ReservationConflict(
            "Table is already reserved for the requested time".to_string(),
        ));
    }

    let location = stores
        .locations
        .get_location(&valid.location_id)
        .await?
        .ok_or_else(|| Error::LocationNotFound {
            id: valid.location_id.clone(),
        })?;

    let reservation = Reservation {
        id: Uuid::new_v4().to_string(),
        location_id: valid.location_id.clone(),
        table_id: table.table_id.clone(),
        table_number: table.table_number,
        date: date.clone(),
        time: valid.time_from.format("%H:%M").to_string(),
        guests: valid.guests,
        status: ReservationStatus::Confirmed,
        waiter_id: None,
    };
    stores.reservations.insert_reservation(&reservation).await?;

    info!(
        reservation_id = %reservation.id,
        location_id = %reservation.location_id,
        table_number = reservation.table_number,
        "reservation confirmed"
    );

    Ok(ReservationReceipt {
        reservation_id: reservation.id,
        status: reservation.status,
        location_address: location.address,
        date,
        time_slot: TimeWindow::slot_at(valid.time_from).to_string(),
        guests: reservation.guests,
        waiter_id: reservation.waiter_id,
    })
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn request() -> ReservationRequest {
        ReservationRequest {
            location_id: "1".into(),
            table_number: "5".into(),
            guests_number: 2,
            date: "2025-06-14".into(),
            time_from: "12:00".into(),
            time_to: "13:30".into(),
        }
    }

    fn message(request: ReservationRequest) -> String {
        request.validate(today()).unwrap_err().to_string()
    }

    #[test]
    fn valid_request_passes() {
        let valid = request().validate(today()).unwrap();
        assert_eq!(valid.table_number, 5);
        assert_eq!(valid.window.to_string(), "12:00-13:30");
    }

    #[test]
    fn required_fields_are_checked_in_order() {
        let mut r = request();
        r.location_id = " ".into();
        r.table_number = String::new();
        assert_eq!(message(r), "Location ID is required");

        let mut r = request();
        r.table_number = String::new();
        assert_eq!(message(r), "Table number is required");

        let mut r = request();
        r.guests_number = 0;
        assert_eq!(message(r), "Number of guests must be greater than 0");

        let mut r = request();
        r.date = String::new();
        assert_eq!(message(r), "Date is required");

        let mut r = request();
        r.time_from = String::new();
        assert_eq!(message(r), "Start time is required");

        let mut r = request();
        r.time_to = String::new();
        assert_eq!(message(r), "End time is required");
    }

    #[test]
    fn rejects_past_and_malformed_dates() {
        let mut r = request();
        r.date = "2025-05-31".into();
        assert_eq!(message(r), "Reservation date cannot be in the past");

        let mut r = request();
        r.date = "14.06.2025".into();
        assert_eq!(message(r), "Invalid date format. Use yyyy-MM-dd");
    }

    #[test]
    fn rejects_inverted_or_empty_windows() {
        let mut r = request();
        r.time_to = "12:00".into();
        assert_eq!(message(r), "End time must be after start time");

        let mut r = request();
        r.time_to = "11:00".into();
        let err = r.validate(today()).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        let mut r = request();
        r.time_from = "noon".into();
        assert_eq!(message(r), "Invalid time format. Use HH:mm");
    }

    #[test]
    fn table_number_accepts_json_numbers() {
        let request: ReservationRequest = serde_json::from_value(serde_json::json!({
            "locationId": "1",
            "tableNumber": 7,
            "guestsNumber": 3,
            "date": "2025-06-14",
            "timeFrom": "18:00",
            "timeTo": "19:30"
        }))
        .unwrap();
        assert_eq!(request.table_number, "7");
    }
}
