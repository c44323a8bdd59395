use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
    convert::{TryFrom, TryInto},
    path::Path,
};

use anyhow::Context;

use crate::core::color::Color;

pub struct InputParams {
    params: HashMap<String, InputParamsValue>,
    name: Cow<'static, str>,
    visited_names: HashSet<String>,
}

pub enum InputParamsValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    String(String),
    Array(Vec<InputParamsValue>),
    Object(InputParams),
}

impl InputParamsValue {
    fn as_int(&self) -> Option<i64> {
        if let Self::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// JSON integers are accepted wherever a float is expected.
    fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f32),
            _ => None,
        }
    }
}

macro_rules! params_get {
    ( $( ( $name:ident, $type:ty, $as:ident, $hint:expr ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[allow(dead_code)]
                pub fn [<get_ $name>](&mut self, key: &str) -> anyhow::Result<$type> {
                    if let Some(value) = self.params.get(key) {
                        if let Some(value) = value.$as() {
                            self.visited_names.insert(key.to_owned());
                            return Ok(value);
                        }
                        anyhow::bail!(format!("{} - '{}' should be {}", self.name, key, $hint));
                    }
                    anyhow::bail!(format!("{} - there is no '{}' field", self.name, key));
                }

                /// Falls back only when the key is absent; a present key of the wrong type is
                /// still an error.
                #[allow(dead_code)]
                pub fn [<get_ $name _or>](
                    &mut self,
                    key: &str,
                    fallback: $type,
                ) -> anyhow::Result<$type> {
                    if self.contains_key(key) {
                        self.[<get_ $name>](key)
                    } else {
                        Ok(fallback)
                    }
                }
            }
        )+
    };
}

macro_rules! params_get_int {
    ( $( ( $name:ident, $type:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[allow(dead_code)]
                pub fn [<get_ $name>](&mut self, key: &str) -> anyhow::Result<$type> {
                    if let Some(value) = self.params.get(key) {
                        if let Some(value) = value.as_int() {
                            if let Ok(value) = <$type>::try_from(value) {
                                self.visited_names.insert(key.to_owned());
                                return Ok(value);
                            }
                            anyhow::bail!(format!("{} - '{}' out of range", self.name, key));
                        }
                        anyhow::bail!(format!("{} - '{}' should be integer", self.name, key));
                    }
                    anyhow::bail!(format!("{} - there is no '{}' field", self.name, key));
                }

                #[allow(dead_code)]
                pub fn [<get_ $name _or>](
                    &mut self,
                    key: &str,
                    fallback: $type,
                ) -> anyhow::Result<$type> {
                    if self.contains_key(key) {
                        self.[<get_ $name>](key)
                    } else {
                        Ok(fallback)
                    }
                }
            }
        )+
    };
}

macro_rules! params_get_vec {
    ( $( ( $name:ident, $type:ty, $len:expr, $as:ident, $hint:expr ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[allow(dead_code)]
                pub fn [<get_ $name>](&mut self, key: &str) -> anyhow::Result<[$type; $len]> {
                    if let Some(value) = self.params.get(key) {
                        let error_info = format!(
                            "{} - '{}' should be array with {} {}s",
                            self.name,
                            key,
                            $len,
                            $hint,
                        );
                        if let InputParamsValue::Array(arr) = value {
                            if arr.len() == $len {
                                let mut result: [$type; $len] = [Default::default(); $len];
                                for i in 0..$len {
                                    if let Some(ele) = arr[i].$as() {
                                        result[i] = ele;
                                    } else {
                                        anyhow::bail!(error_info.clone());
                                    }
                                }
                                self.visited_names.insert(key.to_owned());
                                return Ok(result);
                            }
                        }
                        anyhow::bail!(error_info);
                    }
                    anyhow::bail!(format!("{} - there is no '{}' field", self.name, key));
                }
            }
        )+
    };
}

impl InputParams {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json_file = std::fs::File::open(path)
            .with_context(|| format!("can't open '{}'", path.display()))?;
        let json_reader = std::io::BufReader::new(json_file);
        let json_value: serde_json::Value = serde_json::from_reader(json_reader)
            .with_context(|| format!("can't parse '{}' as json", path.display()))?;
        json_value.try_into()
    }

    pub fn set_name(&mut self, name: Cow<'static, str>) {
        self.name = name;
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    params_get! {
        (float, f32, as_float, "float"),
    }

    params_get_int! {
        (uint, u32),
        (ulong, u64),
    }

    params_get_vec! {
        (float3, f32, 3, as_float, "float"),
    }

    /// Reads a color given either as an array of 3 numbers or as a single number applied to
    /// every channel.
    pub fn get_color(&mut self, key: &str) -> anyhow::Result<Color> {
        let is_array = matches!(self.params.get(key), Some(InputParamsValue::Array(_)));
        if is_array {
            return Ok(self.get_float3(key)?.into());
        }
        if let Some(value) = self.params.get(key) {
            if let Some(value) = value.as_float() {
                self.visited_names.insert(key.to_owned());
                return Ok(Color::gray(value));
            }
            anyhow::bail!(format!(
                "{} - '{}' should be a number or an array with 3 floats",
                self.name, key
            ));
        }
        anyhow::bail!(format!("{} - there is no '{}' field", self.name, key));
    }

    pub fn get_color_or(&mut self, key: &str, fallback: Color) -> anyhow::Result<Color> {
        if self.contains_key(key) {
            self.get_color(key)
        } else {
            Ok(fallback)
        }
    }

    pub fn get_str(&mut self, key: &str) -> anyhow::Result<String> {
        if let Some(value) = self.params.get(key) {
            if let InputParamsValue::String(value) = value {
                self.visited_names.insert(key.to_owned());
                return Ok(value.clone());
            }
            anyhow::bail!(format!("{} - '{}' should be string", self.name, key));
        }
        anyhow::bail!(format!("{} - there is no '{}' field", self.name, key));
    }

    pub fn get_str_or(&mut self, key: &str, fallback: &str) -> anyhow::Result<String> {
        if self.contains_key(key) {
            self.get_str(key)
        } else {
            Ok(fallback.to_owned())
        }
    }

    /// Moves a nested object out of these params.
    pub fn take_object(&mut self, key: &str) -> anyhow::Result<InputParams> {
        match self.params.remove(key) {
            Some(InputParamsValue::Object(mut object)) => {
                object.set_name(format!("{}.{}", self.name, key).into());
                Ok(object)
            }
            Some(other) => {
                self.params.insert(key.to_owned(), other);
                anyhow::bail!(format!("{} - '{}' should be object", self.name, key));
            }
            None => anyhow::bail!(format!("{} - there is no '{}' field", self.name, key)),
        }
    }

    pub fn check_unused_keys(&self) {
        for k in self.params.keys() {
            if !k.starts_with("#") && !self.visited_names.contains(k) {
                log::warn!("{} - unused key '{}'", self.name, k);
            }
        }
    }
}

impl TryFrom<serde_json::Value> for InputParamsValue {
    type Error = anyhow::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => {
                anyhow::bail!("can't convert to InputParamsValue from null json")
            }
            serde_json::Value::Bool(v) => Ok(Self::Bool(v)),
            serde_json::Value::Number(v) => {
                if let Some(v) = v.as_i64() {
                    Ok(Self::Int(v))
                } else if let Some(v) = v.as_f64() {
                    Ok(Self::Float(v as f32))
                } else {
                    anyhow::bail!(format!("can't convert number {}", v))
                }
            }
            serde_json::Value::String(v) => Ok(Self::String(v)),
            serde_json::Value::Array(arr) => {
                let mut values = Vec::<InputParamsValue>::with_capacity(arr.len());
                for v in arr {
                    match v.try_into() {
                        Ok(v) => values.push(v),
                        Err(e) => {
                            anyhow::bail!(format!("can't convert array element: {}", e))
                        }
                    }
                }
                Ok(Self::Array(values))
            }
            value @ serde_json::Value::Object(_) => Ok(Self::Object(value.try_into()?)),
        }
    }
}

impl TryFrom<serde_json::Value> for InputParams {
    type Error = anyhow::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        if let serde_json::Value::Object(value) = value {
            let mut params = HashMap::<String, InputParamsValue>::with_capacity(value.len());
            for (k, v) in value {
                match v.try_into() {
                    Ok(v) => {
                        params.insert(k, v);
                    }
                    Err(e) => {
                        anyhow::bail!(format!("can't convert member '{}': {}", k, e))
                    }
                }
            }
            Ok(Self {
                params,
                name: Cow::Owned("".to_owned()),
                visited_names: HashSet::new(),
            })
        } else {
            anyhow::bail!("can't convert to InputParams from non-object json value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: serde_json::Value) -> InputParams {
        let mut params: InputParams = value.try_into().unwrap();
        params.set_name("test".into());
        params
    }

    #[test]
    fn integers_read_as_floats() {
        let mut p = params(serde_json::json!({ "a": 2, "b": 0.5 }));
        assert_eq!(p.get_float("a").unwrap(), 2.0);
        assert_eq!(p.get_float("b").unwrap(), 0.5);
        assert!(p.get_uint("b").is_err());
    }

    #[test]
    fn color_from_array_or_scalar() {
        let mut p = params(serde_json::json!({ "rgb": [0.1, 2, 0.3], "gray": 4 }));
        assert_eq!(p.get_color("rgb").unwrap(), Color::new(0.1, 2.0, 0.3));
        assert_eq!(p.get_color("gray").unwrap(), Color::gray(4.0));
        assert_eq!(
            p.get_color_or("missing", Color::WHITE).unwrap(),
            Color::WHITE
        );
    }

    #[test]
    fn malformed_color_is_rejected() {
        let mut p = params(serde_json::json!({ "short": [1.0, 2.0], "text": "red" }));
        assert!(p.get_color("short").is_err());
        assert!(p.get_color("text").is_err());
    }

    #[test]
    fn fallback_only_when_absent() {
        let mut p = params(serde_json::json!({ "max": "many" }));
        assert_eq!(p.get_uint_or("other", 5).unwrap(), 5);
        assert!(p.get_uint_or("max", 5).is_err());
        assert_eq!(p.get_str_or("max", "few").unwrap(), "many");
    }

    #[test]
    fn nested_objects() {
        let mut p = params(serde_json::json!({ "inner": { "x": 1 }, "flat": 3 }));
        let mut inner = p.take_object("inner").unwrap();
        assert_eq!(inner.name(), "test.inner");
        assert_eq!(inner.get_uint("x").unwrap(), 1);
        assert!(p.take_object("flat").is_err());
        assert!(p.contains_key("flat"));
        assert!(p.take_object("inner").is_err());
    }

    #[test]
    fn integers_are_range_checked() {
        let mut p = params(serde_json::json!({
            "big": 4294967296_i64,
            "negative": -1,
            "large": 4294967297_u64,
        }));
        assert!(p.get_uint("big").is_err());
        assert!(p.get_uint("negative").is_err());
        assert!(p.get_ulong("negative").is_err());
        assert_eq!(p.get_ulong("large").unwrap(), 4294967297);
        assert_eq!(p.get_ulong("big").unwrap(), 4294967296);
    }

    #[test]
    fn null_members_are_rejected() {
        let value = serde_json::json!({ "a": null });
        let result: anyhow::Result<InputParams> = value.try_into();
        assert!(result.is_err());
    }
}
