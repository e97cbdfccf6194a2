use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::SnowflakeId;

impl Serialize for SnowflakeId {
    /// Serializes as the native integer.
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_raw().serialize(s)
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    /// Deserializes from the native integer, rejecting values with the reserved
    /// bit set.
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = Self::from_raw(u64::deserialize(d)?);
        if !id.is_valid() {
            return Err(de::Error::custom(format_args!(
                "snowflake id {} has the reserved bit set",
                id.to_raw()
            )));
        }
        Ok(id)
    }
}

/// Serialize a [`SnowflakeId`] as a zero-padded decimal string.
///
/// Useful for JSON consumers that lose precision above 2^53.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use snowgen::SnowflakeId;
///
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     #[serde(with = "snowgen::as_padded_string")]
///     id: SnowflakeId,
/// }
///
/// let row = Row { id: SnowflakeId::from_raw(4_194_439_168) };
/// let json = serde_json::to_string(&row).unwrap();
/// assert_eq!(json, r#"{"id":"00000000004194439168"}"#);
/// ```
pub mod as_padded_string {
    use super::{Deserializer, Serializer, de};
    use crate::SnowflakeId;

    /// Serialize a snowflake ID as a 20-digit zero-padded string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_padded_string())
    }

    /// Deserialize a snowflake ID from a decimal string, padded or not.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a valid `u64`
    /// - The value has the reserved bit set
    pub fn deserialize<'de, D>(d: D) -> Result<SnowflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PaddedVisitor;

        impl de::Visitor<'_> for PaddedVisitor {
            type Value = SnowflakeId;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a decimal snowflake id string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let raw: u64 = v.parse().map_err(E::custom)?;
                let id = SnowflakeId::from_raw(raw);
                if !id.is_valid() {
                    return Err(E::custom(format_args!(
                        "snowflake id {raw} has the reserved bit set"
                    )));
                }
                Ok(id)
            }
        }

        d.deserialize_str(PaddedVisitor)
    }
}
