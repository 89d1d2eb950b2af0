//! JSON decoding that reports schema drift.
//!
//! With the `tracing` feature enabled, fields present in a response but absent from the target
//! type are logged at `warn`, and decoding failures are logged at `error` together with the
//! JSON path that failed. Without the feature this is plain `serde_json::from_value`.

use serde::de::DeserializeOwned;
use serde_json::Value;

#[cfg(feature = "tracing")]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    use std::any::type_name;

    tracing::trace!(type_name = %type_name::<T>(), json = %value, "deserializing JSON");

    let original = value.clone();
    let mut unknown_paths: Vec<String> = Vec::new();

    let result: T = serde_ignored::deserialize(value, |path| {
        unknown_paths.push(path.to_string());
    })
    .inspect_err(|_| {
        // serde_ignored loses the location of the failure, so decode again to find it
        let text = original.to_string();
        let jd = &mut serde_json::Deserializer::from_str(&text);
        if let Err(path_err) = serde_path_to_error::deserialize::<_, T>(jd) {
            let path = path_err.path().to_string();
            tracing::error!(
                type_name = %type_name::<T>(),
                path = %path,
                value = %format_value(lookup_value(&original, &path)),
                error = %path_err.inner(),
                "deserialization failed"
            );
        }
    })?;

    for path in unknown_paths {
        tracing::warn!(
            type_name = %type_name::<T>(),
            field = %path,
            value = %format_value(lookup_value(&original, &path)),
            "unknown field in API response"
        );
    }

    Ok(result)
}

#[cfg(not(feature = "tracing"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Resolves a `serde_ignored` / `serde_path_to_error` path such as `data.children[3].data.id`
/// against `value`. `?` segments mark `Option` layers and are skipped.
#[cfg(feature = "tracing")]
fn lookup_value<'value>(value: &'value Value, path: &str) -> Option<&'value Value> {
    let normalized = path.replace('[', ".").replace(']', "");

    normalized
        .split('.')
        .filter(|segment| !segment.is_empty() && *segment != "?")
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        })
}

#[cfg(feature = "tracing")]
fn format_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "<unable to retrieve>".to_owned(), Value::to_string)
}
