//! Config types for file-driven route table construction.
//!
//! These types mirror the registration API but are serde-deserializable, so a
//! route table can be described in YAML or JSON and loaded with
//! [`RouteTable::from_config()`].
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime effect |
//! |-------------|----------------|
//! | [`RoutesConfig::allowed_verbs`] | [`RouteTable::set_allowed_verbs`] |
//! | [`RoutesConfig::param_types`] | [`RouteTable::with_param_types`] |
//! | [`RouteConfig`] | [`RouteTable::add_route_with_params`] |
//! | [`DispatchConfig`] | [`DispatchOptions`] |
//!
//! ```yaml
//! allowed_verbs: [get, post]
//! param_types:
//!   uuid: "[0-9a-f]{8}(?:-[0-9a-f]{4}){3}-[0-9a-f]{12}"
//! dispatch:
//!   mount_prefix: /index.php
//! routes:
//!   - { verb: get, pattern: "user/numeric:id", response: UserController.show }
//!   - { verb: get, pattern: "post/any:slug?", response: [PostController, show], params: { lang: en } }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{DispatchOptions, ParamTypes, Params, Response, RouteError, RouteTable};

/// Configuration for a whole [`RouteTable`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesConfig {
    /// Narrow the allowed verbs before any route is registered.
    /// Absent keeps the default set.
    #[serde(default)]
    pub allowed_verbs: Option<Vec<String>>,

    /// Extra (or replacement) parameter types, tag → regex fragment.
    #[serde(default)]
    pub param_types: BTreeMap<String, String>,

    /// Routes, registered in order.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    /// Ambient path normalization for `dispatch_request`.
    #[serde(default)]
    pub dispatch: Option<DispatchConfig>,
}

impl RoutesConfig {
    /// Parse a route file written in JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if the text is not a valid route file.
    pub fn from_json(json: &str) -> Result<Self, RouteError> {
        serde_json::from_str(json).map_err(|e| RouteError::InvalidConfig {
            reason: format!("JSON parse error: {e}"),
        })
    }

    /// Parse a route file written in YAML.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if the text is not a valid route file.
    pub fn from_yaml(yaml: &str) -> Result<Self, RouteError> {
        serde_yaml::from_str(yaml).map_err(|e| RouteError::InvalidConfig {
            reason: format!("YAML parse error: {e}"),
        })
    }
}

/// Configuration for one rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Request verb, any case.
    pub verb: String,

    /// Route pattern, e.g. `user/numeric:id`.
    pub pattern: String,

    /// Response descriptor. Missing registers the rule with a warning.
    #[serde(default)]
    pub response: Response,

    /// Static parameters returned with every match of this rule.
    #[serde(default)]
    pub params: Params,
}

/// Configuration for [`DispatchOptions`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Base path the application is mounted under.
    #[serde(default)]
    pub mount_prefix: String,

    /// Suffix to strip. Absent keeps the default (`.html`).
    #[serde(default)]
    pub suffix: Option<String>,
}

impl From<DispatchConfig> for DispatchOptions {
    fn from(config: DispatchConfig) -> Self {
        let options = DispatchOptions::default().with_mount_prefix(config.mount_prefix);
        match config.suffix {
            Some(suffix) => options.with_suffix(suffix),
            None => options,
        }
    }
}

/// A table loaded from config, with the per-route problems met on the way.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    /// The loaded table.
    pub table: RouteTable,
    /// Normalization options from the `dispatch` section.
    pub options: DispatchOptions,
    /// Skipped or degraded routes, in config order.
    pub warnings: Vec<RouteError>,
}

impl RouteTable {
    /// Build a table from config.
    ///
    /// Allowed verbs and parameter types are applied first, then routes in
    /// order. A route that is rejected (forbidden verb, bad pattern) or
    /// degraded (missing response) does not stop the load; its error is
    /// collected in [`ConfigLoad::warnings`].
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter type is invalid. Nothing is loaded.
    ///
    /// # Example
    ///
    /// ```
    /// use ruta::{RouteTable, RoutesConfig};
    ///
    /// let config: RoutesConfig = serde_json::from_value(serde_json::json!({
    ///     "routes": [
    ///         { "verb": "get", "pattern": "user/numeric:id", "response": "show" },
    ///         { "verb": "trace", "pattern": "debug", "response": "debug" }
    ///     ]
    /// })).unwrap();
    ///
    /// let loaded = RouteTable::from_config(config).unwrap();
    /// assert_eq!(loaded.table.len(), 1);
    /// assert_eq!(loaded.warnings.len(), 1);
    /// ```
    pub fn from_config(config: RoutesConfig) -> Result<ConfigLoad, RouteError> {
        let mut types = ParamTypes::default();
        types.register_all(config.param_types)?;
        let mut table = RouteTable::with_param_types(types);
        if let Some(verbs) = &config.allowed_verbs {
            table.set_allowed_verbs(verbs);
        }

        let mut warnings = Vec::new();
        for route in config.routes {
            match table.add_route_with_params(&route.verb, &route.pattern, route.response, route.params) {
                Ok(registered) => warnings.extend(registered.warning),
                Err(error) => warnings.push(error),
            }
        }

        Ok(ConfigLoad {
            table,
            options: config.dispatch.map(DispatchOptions::from).unwrap_or_default(),
            warnings,
        })
    }
}
