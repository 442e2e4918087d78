//! Response bodies, one DTO per endpoint shape.

use serde::Serialize;

use restaurant_lib::{
    Dish, Feedback, FeedbackPage, FeedbackSort, Location, Profile, ReservationReceipt,
    ReservationStatus, Session, TableAvailability, UserRole,
};

/// `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MessageDto {
    pub message: String,
}

impl MessageDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    pub id: String,
    pub address: String,
    pub description: String,
    pub image_url: String,
    pub rating: Option<f64>,
}

impl From<Location> for LocationDto {
    fn from(value: Location) -> Self {
        Self {
            id: value.id,
            address: value.address,
            description: value.description.unwrap_or_default(),
            image_url: value.image_url.unwrap_or_default(),
            rating: value.rating,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationOptionDto {
    pub id: String,
    pub address: String,
}

impl From<(String, String)> for LocationOptionDto {
    fn from((id, address): (String, String)) -> Self {
        Self { id, address }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DishDto {
    pub name: String,
    pub price: f64,
    pub weight: String,
    pub image_url: String,
}

impl From<Dish> for DishDto {
    fn from(value: Dish) -> Self {
        Self {
            name: value.name,
            price: value.price,
            weight: value.weight,
            image_url: value.image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDto {
    pub id: String,
    pub rate: f64,
    pub comment: String,
    pub user_name: String,
    pub user_avatar_url: String,
    pub date: String,
    #[serde(rename = "type")]
    pub feedback_type: String,
    pub location_id: String,
}

impl From<Feedback> for FeedbackDto {
    fn from(value: Feedback) -> Self {
        Self {
            id: value.id,
            rate: value.rate,
            comment: value.comment,
            user_name: value.user_name,
            user_avatar_url: value.user_avatar_url,
            date: value.date,
            feedback_type: value.feedback_type,
            location_id: value.location_id,
        }
    }
}

/// One entry of the page's `sort` array.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SortDto {
    pub direction: &'static str,
    pub null_handling: &'static str,
    pub ascending: bool,
    pub property: &'static str,
    pub ignore_case: bool,
}

impl From<FeedbackSort> for SortDto {
    fn from(value: FeedbackSort) -> Self {
        Self {
            direction: value.direction.as_str(),
            null_handling: "NATIVE",
            ascending: value.direction.is_ascending(),
            property: value.property.as_str(),
            ignore_case: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageableDto {
    pub offset: u64,
    pub sort: Vec<SortDto>,
    pub paged: bool,
    pub page_size: u32,
    pub page_number: u32,
    pub unpaged: bool,
}

/// Page-object view of a feedback page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPageDto {
    pub total_pages: u64,
    pub total_elements: u64,
    pub size: u32,
    pub content: Vec<FeedbackDto>,
    pub number: u32,
    pub sort: Vec<SortDto>,
    pub first: bool,
    pub last: bool,
    pub number_of_elements: usize,
    pub pageable: PageableDto,
    pub empty: bool,
    /// Opaque token for the following page; absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl From<FeedbackPage> for FeedbackPageDto {
    fn from(page: FeedbackPage) -> Self {
        let sort = vec![SortDto::from(page.sort)];
        let last = page.is_last();
        Self {
            total_pages: page.total_pages(),
            total_elements: page.total_elements,
            size: page.size,
            number: page.page,
            sort: sort.clone(),
            first: page.is_first(),
            last,
            number_of_elements: page.content.len(),
            pageable: PageableDto {
                offset: page.offset(),
                sort,
                paged: true,
                page_size: page.size,
                page_number: page.page,
                unpaged: false,
            },
            empty: page.is_empty(),
            next_cursor: if last { None } else { page.next_cursor },
            content: page.content.into_iter().map(FeedbackDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTableDto {
    pub location_id: String,
    pub location_address: String,
    pub table_number: u32,
    pub capacity: u32,
    pub available_slots: Vec<String>,
}

impl From<TableAvailability> for AvailableTableDto {
    fn from(value: TableAvailability) -> Self {
        Self {
            location_id: value.location_id,
            location_address: value.location_address,
            table_number: value.table_number,
            capacity: value.capacity,
            available_slots: value.available_slots,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub reservation_id: String,
    pub status: ReservationStatus,
    pub location_address: String,
    pub date: String,
    pub time_slot: String,
    pub guests_number: u32,
    pub assigned_waiter_id: Option<String>,
}

impl From<ReservationReceipt> for ReservationDto {
    fn from(value: ReservationReceipt) -> Self {
        Self {
            reservation_id: value.reservation_id,
            status: value.status,
            location_address: value.location_address,
            date: value.date,
            time_slot: value.time_slot,
            guests_number: value.guests,
            assigned_waiter_id: value.waiter_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub access_token: String,
    pub username: String,
    pub role: UserRole,
}

impl From<Session> for SessionDto {
    fn from(value: Session) -> Self {
        Self {
            access_token: value.access_token,
            username: value.username,
            role: value.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub email: String,
    pub image_url: String,
}

impl From<Profile> for ProfileDto {
    fn from(value: Profile) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            role: value.role,
            email: value.email,
            image_url: value.image_url.unwrap_or_default(),
        }
    }
}
