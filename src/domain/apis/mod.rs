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

// Resource types reconciled by the riff system controllers

pub mod build;
pub mod conditions;
pub mod request;
pub mod stream;

pub use build::{Application, ApplicationSpec, ApplicationStatus, Function, FunctionSpec, FunctionStatus, GitSource, Source};
pub use conditions::{Condition, Conditioned, Status, CONDITION_READY};
pub use request::{
    Build, Handler, HandlerSpec, HandlerStatus, RequestProcessor, RequestProcessorItem,
    RequestProcessorSpec, RequestProcessorStatus, Route, RouteSpec, RouteStatus,
};
pub use stream::{Processor, ProcessorSpec, ProcessorStatus, Stream, StreamAddress, StreamSpec, StreamStatus};
