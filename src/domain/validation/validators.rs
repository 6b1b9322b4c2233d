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

use super::field_error::{FieldError, CURRENT_FIELD};
use crate::domain::parsers;
use regex::Regex;
use std::sync::OnceLock;

const DNS1123_LABEL_MAX_LENGTH: usize = 63;

fn dns1123_label() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("dns-1123 pattern compiles")
    })
}

/// Names must be DNS-1123 labels.
pub fn k8s_name(name: &str, field: &str) -> FieldError {
    if name.len() > DNS1123_LABEL_MAX_LENGTH || !dns1123_label().is_match(name) {
        return FieldError::invalid_value(name, field);
    }
    FieldError::empty()
}

pub fn k8s_names(names: &[String], field: &str) -> FieldError {
    names
        .iter()
        .enumerate()
        .fold(FieldError::empty(), |errs, (index, name)| {
            errs.also(k8s_name(name, CURRENT_FIELD).via_field_index(field, index))
        })
}

pub fn env_var(line: &str, field: &str) -> FieldError {
    match line.split_once('=') {
        Some((name, _)) if !name.is_empty() => FieldError::empty(),
        _ => FieldError::invalid_value(line, field),
    }
}

pub fn env_vars(lines: &[String], field: &str) -> FieldError {
    lines
        .iter()
        .enumerate()
        .fold(FieldError::empty(), |errs, (index, line)| {
            errs.also(env_var(line, CURRENT_FIELD).via_field_index(field, index))
        })
}

pub fn env_var_from(line: &str, field: &str) -> FieldError {
    match parsers::split_env_var_from(line) {
        Some((name, kind, resource, key))
            if !name.is_empty()
                && (kind == parsers::CONFIG_MAP_KEY_REF || kind == parsers::SECRET_KEY_REF)
                && !resource.is_empty()
                && !key.is_empty() =>
        {
            FieldError::empty()
        }
        _ => FieldError::invalid_value(line, field),
    }
}

pub fn env_var_froms(lines: &[String], field: &str) -> FieldError {
    lines
        .iter()
        .enumerate()
        .fold(FieldError::empty(), |errs, (index, line)| {
            errs.also(env_var_from(line, CURRENT_FIELD).via_field_index(field, index))
        })
}

pub fn quantity(value: &str, field: &str) -> FieldError {
    match parsers::quantity(value) {
        Some(_) => FieldError::empty(),
        None => FieldError::invalid_value(value, field),
    }
}

fn mime_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9!#$&^_.+-]+/[A-Za-z0-9!#$&^_.+*-]+(\s*;\s*[A-Za-z0-9_.-]+=\S+)*$")
            .expect("mime type pattern compiles")
    })
}

/// Content types such as `application/json` or `text/plain; charset=utf-8`.
pub fn mime_type(value: &str, field: &str) -> FieldError {
    if mime_type_pattern().is_match(value) {
        FieldError::empty()
    } else {
        FieldError::invalid_value(value, field)
    }
}

/// Required duration flag, e.g. `--wait-timeout`.
pub fn duration(value: &str, field: &str) -> FieldError {
    if value.is_empty() {
        FieldError::missing_field([field])
    } else if parsers::duration(value).is_none() {
        FieldError::invalid_value(value, field)
    } else {
        FieldError::empty()
    }
}
