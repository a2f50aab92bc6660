//! JSON encoding for request models.
//!
//! serde_json writes NaN and infinities as `null`. For an order that would
//! turn a bad price into "no price", so every model is walked once by
//! `FiniteCheck` before it is encoded and non-finite numbers are rejected.

use serde::ser::{self, Serialize};
use thiserror::Error;

use crate::error::EmsError;

/// Encode `model` as compact JSON, refusing values JSON cannot represent.
pub(crate) fn to_json<T>(model: &T) -> Result<String, EmsError>
where
    T: Serialize + ?Sized,
{
    let mut check = FiniteCheck::default();
    model
        .serialize(&mut check)
        .map_err(|e| EmsError::SerializationError(e.to_string()))?;
    serde_json::to_string(model).map_err(|e| EmsError::SerializationError(e.to_string()))
}

#[derive(Debug, Error)]
#[error("{0}")]
pub(crate) struct CheckError(String);

impl ser::Error for CheckError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        CheckError(msg.to_string())
    }
}

/// A serializer that produces nothing and fails on non-finite floats.
/// Struct field names are tracked so the error points at the offending field.
#[derive(Debug, Default)]
struct FiniteCheck {
    path: Vec<&'static str>,
}

impl FiniteCheck {
    fn float(&self, value: f64) -> Result<(), CheckError> {
        if value.is_finite() {
            return Ok(());
        }
        let at = if self.path.is_empty() {
            "model".to_string()
        } else {
            self.path.join(".")
        };
        Err(CheckError(format!("non-finite number {value} at `{at}` cannot be encoded as JSON")))
    }
}

impl ser::Serializer for &mut FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_i128(self, _v: i128) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_u128(self, _v: u128) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), CheckError> {
        self.float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), CheckError> {
        self.float(v)
    }

    fn serialize_char(self, _v: char) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        self.path.push(variant);
        value.serialize(&mut *self)?;
        self.path.pop();
        Ok(())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, CheckError> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, CheckError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for &mut FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeTuple for &mut FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for &mut FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for &mut FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeMap for &mut FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        key.serialize(&mut **self)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeStruct for &mut FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        self.path.push(key);
        value.serialize(&mut **self)?;
        self.path.pop();
        Ok(())
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for &mut FiniteCheck {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), CheckError>
    where
        T: Serialize + ?Sized,
    {
        self.path.push(key);
        value.serialize(&mut **self)?;
        self.path.pop();
        Ok(())
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}
