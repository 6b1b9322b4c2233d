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

use crate::domain::validation::FieldError;
use thiserror::Error;
pub type Result<T> = std::result::Result<T, RiffError>;

#[derive(Error, Debug)]
pub enum RiffError {
    /// Kubernetes API failure, carrying the server's message verbatim.
    #[error("{0}")]
    Kube(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    InvalidOptions(FieldError),

    /// Failure that has already been reported to the user.
    #[error("{0}")]
    Silent(Box<RiffError>),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("{0}")]
    Process(String),

    #[error("{0}")]
    Command(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<kube::Error> for RiffError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(status) if status.code == 404 => RiffError::NotFound(status.message),
            kube::Error::Api(status) if status.code == 409 => {
                RiffError::AlreadyExists(status.message)
            }
            kube::Error::Api(status) => RiffError::Kube(status.message),
            other => RiffError::Kube(other.to_string()),
        }
    }
}

impl From<FieldError> for RiffError {
    fn from(errs: FieldError) -> Self {
        RiffError::InvalidOptions(errs)
    }
}

impl RiffError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::Config(context.into())
    }

    pub fn command(message: impl Into<String>) -> Self {
        Self::Command(message.into())
    }

    pub fn silent(err: RiffError) -> Self {
        match err {
            silent @ RiffError::Silent(_) => silent,
            other => Self::Silent(Box::new(other)),
        }
    }

    /// Not-found error worded the way the API server reports it, e.g.
    /// `functions.build.projectriff.io "square" not found`.
    pub fn not_found(resource: &str, name: &str) -> Self {
        Self::NotFound(format!("{} {:?} not found", resource, name))
    }

    pub fn already_exists(resource: &str, name: &str) -> Self {
        Self::AlreadyExists(format!("{} {:?} already exists", resource, name))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RiffError::NotFound(_))
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, RiffError::Silent(_))
    }
}
