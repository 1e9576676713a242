//! The `House` record and its world-state encoding.
//!
//! Houses are stored as JSON objects whose field names are part of the
//! storage contract shared with records written by earlier deployments:
//!
//! ```json
//! {"NagarPalikaID":"H1","Owner":"OrgA","Address":"221B Baker St","Size":120}
//! ```
//!
//! Field order follows the declaration order below. Decoding is as lenient
//! as the readers of the existing records:
//!
//! - field names match case-insensitively, so `"owner"` fills `Owner`;
//! - when a field appears more than once the last value wins;
//! - missing fields and `null` values leave the zero value in place;
//! - unknown fields are ignored;
//! - a bare `null` document decodes to an all-zero record.
//!
//! Anything that is not a JSON object, or a field of the wrong type, is a
//! decoding error.

use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::HouseRegistryError;

/// A registered house.
///
/// ## Invariants
/// - `id` is the world-state key the record is stored under.
/// - `owner` only changes through a transfer made by the current owner.
///
/// # Examples
/// ```
/// use house_registry::House;
///
/// let house = House::new("H1", "OrgA", "221B Baker St", 120);
/// let bytes = house.to_state_bytes().expect("encode");
/// let decoded = House::from_state_bytes("H1", &bytes).expect("decode");
///
/// assert_eq!(decoded, house);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct House {
    /// Municipal identifier; doubles as the world-state key.
    #[serde(rename = "NagarPalikaID")]
    pub id: String,
    /// MSP identifier of the owning organisation.
    #[serde(rename = "Owner")]
    pub owner: String,
    /// Free-form postal address.
    #[serde(rename = "Address")]
    pub address: String,
    /// Size as supplied at creation; not validated.
    #[serde(rename = "Size")]
    pub size: i64,
}

impl House {
    /// Build a house record from its parts.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        owner: impl Into<String>,
        address: impl Into<String>,
        size: i64,
    ) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            address: address.into(),
            size,
        }
    }

    /// Encode the record into the bytes stored in the world state.
    ///
    /// # Errors
    ///
    /// Returns [`HouseRegistryError::Encoding`] if serialisation fails.
    pub fn to_state_bytes(&self) -> Result<Vec<u8>, HouseRegistryError> {
        serde_json::to_vec(self)
            .map_err(|err| HouseRegistryError::encoding(&self.id, err.to_string()))
    }

    /// Decode a record previously stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`HouseRegistryError::Decoding`] naming `key` when the bytes
    /// are neither `null` nor a JSON object shaped like a house.
    pub fn from_state_bytes(key: &str, bytes: &[u8]) -> Result<Self, HouseRegistryError> {
        serde_json::from_slice::<Option<Self>>(bytes)
            .map(Option::unwrap_or_default)
            .map_err(|err| HouseRegistryError::decoding(key, err.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HouseField {
    Id,
    Owner,
    Address,
    Size,
}

impl HouseField {
    const ALL: [Self; 4] = [Self::Id, Self::Owner, Self::Address, Self::Size];

    const fn stored_name(self) -> &'static str {
        match self {
            Self::Id => "NagarPalikaID",
            Self::Owner => "Owner",
            Self::Address => "Address",
            Self::Size => "Size",
        }
    }

    fn matching(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.stored_name() == key)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|field| field.stored_name().eq_ignore_ascii_case(key))
            })
    }
}

struct HouseVisitor;

impl<'de> Visitor<'de> for HouseVisitor {
    type Value = House;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a house record object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut house = House::default();
        while let Some(key) = map.next_key::<String>()? {
            match HouseField::matching(&key) {
                Some(HouseField::Id) => assign(&mut house.id, map.next_value()?),
                Some(HouseField::Owner) => assign(&mut house.owner, map.next_value()?),
                Some(HouseField::Address) => assign(&mut house.address, map.next_value()?),
                Some(HouseField::Size) => assign(&mut house.size, map.next_value()?),
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(house)
    }
}

// A `null` field value keeps whatever the field already holds.
fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(present) = value {
        *slot = present;
    }
}

impl<'de> Deserialize<'de> for House {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(HouseVisitor)
    }
}
