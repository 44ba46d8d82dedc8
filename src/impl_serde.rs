#![cfg_attr(docsrs, doc(cfg(feature = "serde")))]

//! Provides [`serde::Serialize`] for [`Tree`] and its views.
//!
//! Tables serialize as maps in entry order, arrays as sequences, and
//! date-times as their TOML text. Shapes and spans are not serialized.

use crate::{ArrayRef, Datetime, Item, TableRef, Tree, ValueKind};
use serde::ser::{SerializeMap, SerializeSeq};

impl serde::Serialize for Item<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.kind() {
            ValueKind::String => ser.serialize_str(self.as_str().unwrap_or_default()),
            ValueKind::Integer => ser.serialize_i64(self.as_i64().unwrap_or_default()),
            ValueKind::Float => ser.serialize_f64(self.as_float().unwrap_or_default()),
            ValueKind::Boolean => ser.serialize_bool(self.as_bool().unwrap_or_default()),
            ValueKind::Datetime => match self.as_datetime() {
                Some(datetime) => datetime.serialize(ser),
                None => ser.serialize_unit(),
            },
            ValueKind::Table => match self.as_table() {
                Some(table) => table.serialize(ser),
                None => ser.serialize_unit(),
            },
            ValueKind::Array => match self.as_array() {
                Some(array) => array.serialize(ser),
                None => ser.serialize_unit(),
            },
        }
    }
}

impl serde::Serialize for TableRef<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = ser.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k.name.as_str(), &v)?;
        }
        map.end()
    }
}

impl serde::Serialize for ArrayRef<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = ser.serialize_seq(Some(self.len()))?;
        for ele in self.iter() {
            seq.serialize_element(&ele)?;
        }
        seq.end()
    }
}

impl serde::Serialize for Tree {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.root().serialize(ser)
    }
}

impl serde::Serialize for Datetime {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ser.collect_str(self)
    }
}
