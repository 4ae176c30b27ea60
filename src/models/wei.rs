/// Wei-scaled amount of the native value currency. 10^18 wei equal one
/// whole currency unit; keeping the full scale lets the pricing engine
/// reproduce whole-currency equality exactly with integer arithmetic.
pub type Wei = u128;

/// Serde adapter carrying `Wei` as a decimal string in JSON, since JSON
/// numbers cannot hold a full u128.
pub mod wei_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid wei amount: {}", raw)))
    }
}
