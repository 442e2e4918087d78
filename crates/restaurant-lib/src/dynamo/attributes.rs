//! Bridge between serde models and DynamoDB attribute maps.
//!
//! Items go through `serde_json::Value`, so any `Serialize`/`Deserialize`
//! model can be stored without per-field mapping code.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::types::AttributeValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::store::ContinuationKey;

pub type Item = HashMap<String, AttributeValue>;

pub fn to_item<T: Serialize>(model: &T) -> Result<Item> {
    match serde_json::to_value(model)? {
        Value::Object(map) => map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| Ok((k, json_to_attribute(v)?)))
            .collect(),
        other => Err(Error::Serialization(format!(
            "expected an object, got {other}"
        ))),
    }
}

pub fn from_item<T: DeserializeOwned>(item: &Item) -> Result<T> {
    let mut map = Map::new();
    for (key, value) in item {
        map.insert(key.clone(), attribute_to_json(value)?);
    }
    Ok(serde_json::from_value(Value::Object(map))?)
}

pub fn from_items<T: DeserializeOwned>(items: &[Item]) -> Result<Vec<T>> {
    items.iter().map(from_item).collect()
}

fn json_to_attribute(value: Value) -> Result<AttributeValue> {
    Ok(match value {
        Value::String(s) => AttributeValue::S(s),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Null => AttributeValue::Null(true),
        Value::Array(values) => AttributeValue::L(
            values
                .into_iter()
                .map(json_to_attribute)
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => AttributeValue::M(
            map.into_iter()
                .map(|(k, v)| Ok((k, json_to_attribute(v)?)))
                .collect::<Result<_>>()?,
        ),
    })
}

fn number(raw: &str) -> Result<Value> {
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Value::Number(i.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| Error::Serialization(format!("unsupported number attribute {raw}")))
}

fn attribute_to_json(value: &AttributeValue) -> Result<Value> {
    Ok(match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number(n)?,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| number(n))
                .collect::<Result<_>>()?,
        ),
        AttributeValue::L(values) => Value::Array(
            values
                .iter()
                .map(attribute_to_json)
                .collect::<Result<_>>()?,
        ),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), attribute_to_json(v)?)))
                .collect::<Result<_>>()?,
        ),
        _ => {
            return Err(Error::Serialization(
                "unsupported attribute type".to_string(),
            ))
        }
    })
}

/// Continuation keys only carry string attributes.
pub fn key_from_item(item: &Item) -> Result<ContinuationKey> {
    item.iter()
        .map(|(k, v)| match v {
            AttributeValue::S(s) => Ok((k.clone(), s.clone())),
            _ => Err(Error::Serialization(format!(
                "non-string key attribute {k}"
            ))),
        })
        .collect::<Result<BTreeMap<_, _>>>()
        .map(ContinuationKey)
}

pub fn item_from_key(key: &ContinuationKey) -> Item {
    key.0
        .iter()
        .map(|(k, v)| (k.clone(), AttributeValue::S(v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Table, User, UserRole};

    #[test]
    fn model_round_trips_through_attributes() {
        let table = Table {
            table_id: "t-1".into(),
            location_id: "1".into(),
            table_number: 3,
            capacity: 4,
            available_slots: vec!["12:00-13:30".into()],
        };
        let item = to_item(&table).unwrap();
        assert_eq!(item.get("tableNumber"), Some(&AttributeValue::N("3".into())));
        assert_eq!(from_item::<Table>(&item).unwrap(), table);
    }

    #[test]
    fn absent_optionals_are_not_written() {
        let user = User {
            cognito_id: "sub".into(),
            email: "a@b.c".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            profile_image_url: None,
            role: UserRole::Customer,
        };
        let item = to_item(&user).unwrap();
        assert!(!item.contains_key("profileImageUrl"));
        assert_eq!(item.get("userRole"), Some(&AttributeValue::S("Customer".into())));
    }

    #[test]
    fn string_sets_read_as_lists() {
        let item = Item::from([
            ("locationId".to_string(), AttributeValue::S("1".into())),
            ("address".to_string(), AttributeValue::S("Main St".into())),
            (
                "specialityDishIds".to_string(),
                AttributeValue::Ss(vec!["d1".into(), "d2".into()]),
            ),
            ("rating".to_string(), AttributeValue::N("4.5".into())),
        ]);
        let location: crate::model::Location = from_item(&item).unwrap();
        assert_eq!(location.speciality_dish_ids, vec!["d1", "d2"]);
        assert_eq!(location.rating, Some(4.5));
    }

    #[test]
    fn continuation_keys_convert_both_ways() {
        let item = Item::from([("feedbackId".to_string(), AttributeValue::S("f".into()))]);
        let key = key_from_item(&item).unwrap();
        assert_eq!(item_from_key(&key), item);

        let numeric = Item::from([("n".to_string(), AttributeValue::N("1".into()))]);
        assert!(key_from_item(&numeric).is_err());
    }
}
