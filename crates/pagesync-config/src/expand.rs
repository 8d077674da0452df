//! `${VAR}` expansion for string fields of the configuration file.

use crate::ConfigError;

/// Marker returned by the lookup when a variable is unset.
struct Unset;

/// Expands `${VAR}` and `${VAR:-default}` in configuration fields.
///
/// Variables are resolved through `lookup`, so the same code serves the
/// process environment and test fixtures.
pub(crate) struct EnvExpander<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvExpander<F> {
    pub(crate) fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Expand `value` in place. `None` and strings without `${` are left alone.
    ///
    /// `field` is the dotted TOML key reported when a variable is unset and
    /// has no default.
    pub(crate) fn field(&self, value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
        let Some(raw) = value.as_deref().filter(|v| v.contains("${")) else {
            return Ok(());
        };

        let expanded = shellexpand::env_with_context(raw, |var| {
            (self.lookup)(var).map(Some).ok_or(Unset)
        })
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })?;

        *value = Some(expanded.into_owned());
        Ok(())
    }
}
