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

use crate::infrastructure::kubernetes::client::{qualified_resource, to_dynamic};
use crate::infrastructure::kubernetes::RiffKubeClient;
use crate::shared::error::{Result, RiffError};
use http::Uri;
use kube::core::{ApiResource, DynamicObject};
use kube::Resource;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub const VERB_CREATE: &str = "create";
pub const VERB_UPDATE: &str = "update";
pub const VERB_GET: &str = "get";
pub const VERB_LIST: &str = "list";
pub const VERB_DELETE: &str = "delete";
pub const VERB_DELETE_COLLECTION: &str = "delete-collection";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteAction {
    pub group: String,
    pub resource: String,
    pub namespace: String,
    pub name: String,
}

impl DeleteAction {
    pub fn new(resource: &str, namespace: &str, name: &str) -> Self {
        let (resource, group) = split_resource(resource);
        Self {
            group,
            resource,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteCollectionAction {
    pub group: String,
    pub resource: String,
    pub namespace: String,
    pub label_selector: String,
}

impl DeleteCollectionAction {
    pub fn new(resource: &str, namespace: &str, label_selector: &str) -> Self {
        let (resource, group) = split_resource(resource);
        Self {
            group,
            resource,
            namespace: namespace.to_string(),
            label_selector: label_selector.to_string(),
        }
    }
}

/// Splits `applications.build.projectriff.io` into plural and group.
fn split_resource(resource: &str) -> (String, String) {
    match resource.split_once('.') {
        Some((plural, group)) => (plural.to_string(), group.to_string()),
        None => (resource.to_string(), String::new()),
    }
}

type Mutation = Arc<dyn Fn(&mut DynamicObject) + Send + Sync>;

#[derive(Clone)]
enum Reaction {
    Fail,
    Mutate(Mutation),
}

/// Intercepts a verb on a resource plural; `*` matches any.
#[derive(Clone)]
pub struct Reactor {
    verb: String,
    resource: String,
    reaction: Reaction,
}

impl Reactor {
    pub fn induce_failure(verb: &str, resource: &str) -> Self {
        Self {
            verb: verb.to_string(),
            resource: resource.to_string(),
            reaction: Reaction::Fail,
        }
    }

    /// Rewrites objects returned by `verb`, e.g. to mark them ready.
    pub fn mutate<F>(verb: &str, resource: &str, mutation: F) -> Self
    where
        F: Fn(&mut DynamicObject) + Send + Sync + 'static,
    {
        Self {
            verb: verb.to_string(),
            resource: resource.to_string(),
            reaction: Reaction::Mutate(Arc::new(mutation)),
        }
    }

    fn matches(&self, verb: &str, resource: &str) -> bool {
        (self.verb == "*" || self.verb == verb) && (self.resource == "*" || self.resource == resource)
    }
}

type ObjectKey = (String, String, String, String);

#[derive(Default)]
struct Tracker {
    objects: BTreeMap<ObjectKey, DynamicObject>,
    creates: Vec<DynamicObject>,
    updates: Vec<DynamicObject>,
    deletes: Vec<DeleteAction>,
    delete_collections: Vec<DeleteCollectionAction>,
    reactors: Vec<Reactor>,
}

/// In-memory [`RiffKubeClient`] recording every mutating call.
#[derive(Clone)]
pub struct FakeKubeClient {
    tracker: Arc<Mutex<Tracker>>,
    default_namespace: String,
    cluster_url: Arc<Mutex<Uri>>,
}

impl Default for FakeKubeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeKubeClient {
    pub fn new() -> Self {
        Self {
            tracker: Arc::new(Mutex::new(Tracker::default())),
            default_namespace: "default".to_string(),
            cluster_url: Arc::new(Mutex::new(Uri::from_static("https://localhost:8443"))),
        }
    }

    pub fn set_cluster_url(&self, url: Uri) {
        *self
            .cluster_url
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = url;
    }

    fn tracker(&self) -> MutexGuard<'_, Tracker> {
        self.tracker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seeds the tracker without recording an action.
    pub fn add_object<K>(&self, object: &K)
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let resource = ApiResource::erase::<K>(&());
        let object = to_dynamic(object).unwrap_or_else(|e| panic!("unable to convert object: {e}"));
        self.add_dynamic(&resource, object);
    }

    pub fn add_dynamic(&self, resource: &ApiResource, object: DynamicObject) {
        let namespace = object.metadata.namespace.clone().unwrap_or_default();
        let name = object.metadata.name.clone().unwrap_or_default();
        self.tracker()
            .objects
            .insert(key(resource, &namespace, &name), object);
    }

    pub fn add_reactor(&self, reactor: Reactor) {
        self.tracker().reactors.push(reactor);
    }

    pub fn creates(&self) -> Vec<DynamicObject> {
        self.tracker().creates.clone()
    }

    pub fn updates(&self) -> Vec<DynamicObject> {
        self.tracker().updates.clone()
    }

    pub fn deletes(&self) -> Vec<DeleteAction> {
        self.tracker().deletes.clone()
    }

    pub fn delete_collections(&self) -> Vec<DeleteCollectionAction> {
        self.tracker().delete_collections.clone()
    }

    fn react(&self, verb: &str, resource: &ApiResource, object: Option<&mut DynamicObject>) -> Result<()> {
        let reactors: Vec<Reactor> = self
            .tracker()
            .reactors
            .iter()
            .filter(|r| r.matches(verb, &resource.plural))
            .cloned()
            .collect();
        let mut object = object;
        for reactor in reactors {
            match reactor.reaction {
                Reaction::Fail => {
                    return Err(RiffError::Kube(format!(
                        "inducing failure for {} {}",
                        verb, resource.plural
                    )))
                }
                Reaction::Mutate(mutation) => {
                    if let Some(object) = object.as_deref_mut() {
                        mutation(object);
                    }
                }
            }
        }
        Ok(())
    }
}

fn key(resource: &ApiResource, namespace: &str, name: &str) -> ObjectKey {
    (
        resource.group.clone(),
        resource.plural.clone(),
        namespace.to_string(),
        name.to_string(),
    )
}

/// Supports `key`, `!key` and `key=value` terms joined by commas.
fn matches_selector(object: &DynamicObject, selector: Option<&str>) -> bool {
    let Some(selector) = selector.filter(|s| !s.is_empty()) else {
        return true;
    };
    let labels = object.metadata.labels.clone().unwrap_or_default();
    selector.split(',').map(str::trim).all(|term| {
        if let Some((k, v)) = term.split_once("!=") {
            labels.get(k).map(String::as_str) != Some(v)
        } else if let Some((k, v)) = term.split_once('=') {
            labels.get(k).map(String::as_str) == Some(v)
        } else if let Some(k) = term.strip_prefix('!') {
            !labels.contains_key(k)
        } else {
            labels.contains_key(term)
        }
    })
}

#[async_trait::async_trait]
impl RiffKubeClient for FakeKubeClient {
    async fn create(
        &self,
        resource: &ApiResource,
        namespace: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        self.tracker().creates.push(object.clone());
        let mut object = object.clone();
        self.react(VERB_CREATE, resource, Some(&mut object))?;

        let name = object.metadata.name.clone().unwrap_or_default();
        object.metadata.namespace = Some(namespace.to_string());
        // reviews and other virtual resources are answered, never stored
        if name.is_empty() {
            return Ok(object);
        }
        let mut tracker = self.tracker();
        let key = key(resource, namespace, &name);
        if tracker.objects.contains_key(&key) {
            return Err(RiffError::already_exists(&qualified_resource(resource), &name));
        }
        tracker.objects.insert(key, object.clone());
        Ok(object)
    }

    async fn update(
        &self,
        resource: &ApiResource,
        namespace: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        self.tracker().updates.push(object.clone());
        let mut object = object.clone();
        self.react(VERB_UPDATE, resource, Some(&mut object))?;

        let name = object.metadata.name.clone().unwrap_or_default();
        let mut tracker = self.tracker();
        let key = key(resource, namespace, &name);
        if !tracker.objects.contains_key(&key) {
            return Err(RiffError::not_found(&qualified_resource(resource), &name));
        }
        tracker.objects.insert(key, object.clone());
        Ok(object)
    }

    async fn get(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject> {
        let found = self
            .tracker()
            .objects
            .get(&key(resource, namespace, name))
            .cloned();
        let mut object = match found {
            Some(object) => object,
            None => {
                self.react(VERB_GET, resource, None)?;
                return Err(RiffError::not_found(&qualified_resource(resource), name));
            }
        };
        self.react(VERB_GET, resource, Some(&mut object))?;
        Ok(object)
    }

    async fn list(
        &self,
        resource: &ApiResource,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        self.react(VERB_LIST, resource, None)?;
        let tracker = self.tracker();
        Ok(tracker
            .objects
            .iter()
            .filter(|((group, plural, ns, _), _)| {
                *group == resource.group
                    && *plural == resource.plural
                    && (namespace.is_empty() || ns == namespace)
            })
            .map(|(_, object)| object)
            .filter(|object| matches_selector(object, label_selector))
            .cloned()
            .collect())
    }

    async fn delete(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<()> {
        self.tracker().deletes.push(DeleteAction {
            group: resource.group.clone(),
            resource: resource.plural.clone(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        self.react(VERB_DELETE, resource, None)?;

        match self.tracker().objects.remove(&key(resource, namespace, name)) {
            Some(_) => Ok(()),
            None => Err(RiffError::not_found(&qualified_resource(resource), name)),
        }
    }

    async fn delete_collection(
        &self,
        resource: &ApiResource,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<()> {
        self.tracker().delete_collections.push(DeleteCollectionAction {
            group: resource.group.clone(),
            resource: resource.plural.clone(),
            namespace: namespace.to_string(),
            label_selector: label_selector.unwrap_or_default().to_string(),
        });
        self.react(VERB_DELETE_COLLECTION, resource, None)?;

        self.tracker().objects.retain(|(group, plural, ns, _), object| {
            !(*group == resource.group
                && *plural == resource.plural
                && (namespace.is_empty() || ns == namespace)
                && matches_selector(object, label_selector))
        });
        Ok(())
    }

    fn default_namespace(&self) -> String {
        self.default_namespace.clone()
    }

    fn cluster_url(&self) -> Uri {
        self.cluster_url
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
