//! Read-only reference data: locations and dishes.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::model::{Dish, Location};
use crate::store::Stores;

pub async fn list_locations(stores: &Stores) -> Result<Vec<Location>> {
    let mut locations = stores.locations.list_locations().await?;
    locations.sort_by(|a, b| compare_ids(&a.id, &b.id));
    Ok(locations)
}

/// `(id, address)` pairs for selection widgets.
pub async fn location_options(stores: &Stores) -> Result<Vec<(String, String)>> {
    Ok(list_locations(stores)
        .await?
        .into_iter()
        .map(|l| (l.id, l.address))
        .collect())
}

/// Dishes a location lists as specialities, in the location's order.
pub async fn speciality_dishes(stores: &Stores, location_id: &str) -> Result<Vec<Dish>> {
    let location = stores
        .locations
        .get_location(location_id)
        .await?
        .ok_or_else(|| Error::LocationNotFound {
            id: location_id.to_string(),
        })?;

    if location.speciality_dish_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut dishes = stores
        .dishes
        .dishes_by_ids(&location.speciality_dish_ids)
        .await?;
    let position = |dish: &Dish| {
        location
            .speciality_dish_ids
            .iter()
            .position(|id| *id == dish.id)
            .unwrap_or(usize::MAX)
    };
    dishes.sort_by_key(position);
    Ok(dishes)
}

pub async fn popular_dishes(stores: &Stores) -> Result<Vec<Dish>> {
    let mut dishes = stores.dishes.popular_dishes().await?;
    dishes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(dishes)
}

/// Numeric ids first in numeric order, then the rest lexicographically.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
