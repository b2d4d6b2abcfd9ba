pub mod company;
pub mod job;

/// Deserializer for `Option<Option<T>>` fields: a present JSON null becomes
/// `Some(None)` instead of collapsing into the outer `None` (which `default`
/// reserves for an absent field).
pub(crate) fn double_option<'de, T, D>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
