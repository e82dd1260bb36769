//! Serde for the data model. Datetimes serialize as their source text.

use super::{Datetime, Table};
use serde::{ser::SerializeMap, Serialize, Serializer};

impl Serialize for Table {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = ser.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Datetime {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser.serialize_str(self.raw())
    }
}

#[cfg(test)]
mod tests {
    use crate::from_str;

    #[test]
    fn test_to_json() {
        let table = from_str(
            "title = \"x\"\nwhen = 1979-05-27T07:32:00Z\n[owner]\nage = 3\nratio = 0.5\ntags = [true, false]\n",
        )
        .unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"{"title":"x","when":"1979-05-27T07:32:00Z","owner":{"age":3,"ratio":0.5,"tags":[true,false]}}"#
        );
    }
}
