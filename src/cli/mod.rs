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

pub mod application;
pub mod build;
pub mod commands;
pub mod completion;
pub mod config;
pub mod credential;
pub mod display;
pub mod doctor;
pub mod flags;
pub mod function;
pub mod handler;
pub mod options;
pub mod processor;
pub mod request_processor;
pub mod route;
pub mod stream;
pub mod verbs;
pub mod workload;

pub use commands::{CliArgs, Commands};
pub use config::{Config, GlobalOptions};
