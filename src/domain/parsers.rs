// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parsers turning flag values into Kubernetes and std types.
//!
//! The `env_var*` parsers assume their input already passed validation; an
//! unexpected shape produces a best-effort value instead of an error.

use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use regex::Regex;
use serde_json::json;
use std::sync::OnceLock;
use std::time::Duration;

pub const CONFIG_MAP_KEY_REF: &str = "configMapKeyRef";
pub const SECRET_KEY_REF: &str = "secretKeyRef";

/// Parses `NAME=value`.
pub fn env_var(line: &str) -> EnvVar {
    let (name, value) = line.split_once('=').unwrap_or((line, ""));
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        value_from: None,
    }
}

/// Parses `NAME=configMapKeyRef:<config-map>:<key>` or
/// `NAME=secretKeyRef:<secret>:<key>`.
pub fn env_var_from(line: &str) -> EnvVar {
    let (name, kind, resource, key) =
        split_env_var_from(line).unwrap_or((line, SECRET_KEY_REF, "", ""));
    let kind = if kind == CONFIG_MAP_KEY_REF {
        CONFIG_MAP_KEY_REF
    } else {
        SECRET_KEY_REF
    };
    let value_from: EnvVarSource =
        serde_json::from_value(json!({ kind: { "name": resource, "key": key } }))
            .unwrap_or_default();

    EnvVar {
        name: name.to_string(),
        value: None,
        value_from: Some(value_from),
    }
}

/// Splits an env-from value into `(name, kind, resource, key)`.
pub fn split_env_var_from(line: &str) -> Option<(&str, &str, &str, &str)> {
    let (name, source) = line.split_once('=')?;
    let mut parts = source.split(':');
    let kind = parts.next()?;
    let resource = parts.next()?;
    let key = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((name, kind, resource, key))
}

fn quantity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)(Ki|Mi|Gi|Ti|Pi|Ei|n|u|m|k|M|G|T|P|E|[eE][+-]?\d+)?$")
            .expect("quantity pattern compiles")
    })
}

/// Parses a Kubernetes resource quantity such as `512Mi` or `1.5G`.
pub fn quantity(value: &str) -> Option<Quantity> {
    if quantity_pattern().is_match(value) {
        Some(Quantity(value.to_string()))
    } else {
        None
    }
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)(ns|us|µs|ms|s|m|h)").expect("duration pattern compiles")
    })
}

/// Largest duration representable as signed nanoseconds, about 292 years.
const MAX_DURATION_SECS: f64 = i64::MAX as f64 / 1e9;

/// Parses durations in the `1h30m`, `10m`, `500ms` format.
pub fn duration(value: &str) -> Option<Duration> {
    if value == "0" {
        return Some(Duration::ZERO);
    }
    let mut consumed = 0;
    let mut total = 0f64;
    for capture in duration_pattern().captures_iter(value) {
        let whole = capture.get(0)?;
        if whole.start() != consumed {
            return None;
        }
        consumed = whole.end();

        let amount: f64 = capture[1].parse().ok()?;
        let seconds = match &capture[2] {
            "ns" => amount / 1e9,
            "us" | "µs" => amount / 1e6,
            "ms" => amount / 1e3,
            "s" => amount,
            "m" => amount * 60.0,
            _ => amount * 3600.0,
        };
        total += seconds;
    }
    if consumed == 0 || consumed != value.len() {
        return None;
    }
    if total > MAX_DURATION_SECS {
        return None;
    }
    Duration::try_from_secs_f64(total).ok()
}
