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

use crate::shared::error::{Result, RiffError};
use http::Uri;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::core::{ApiResource, DynamicObject};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Untyped access to the Kubernetes API.
///
/// An empty namespace addresses every namespace for `list` and
/// `delete_collection`.
#[async_trait::async_trait]
pub trait RiffKubeClient: Send + Sync {
    async fn create(
        &self,
        resource: &ApiResource,
        namespace: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject>;

    async fn update(
        &self,
        resource: &ApiResource,
        namespace: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject>;

    async fn get(&self, resource: &ApiResource, namespace: &str, name: &str)
        -> Result<DynamicObject>;

    async fn list(
        &self,
        resource: &ApiResource,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>>;

    async fn delete(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<()>;

    async fn delete_collection(
        &self,
        resource: &ApiResource,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<()>;

    /// Namespace of the current kubeconfig context.
    fn default_namespace(&self) -> String;

    /// Base URL of the API server, e.g. `https://10.0.0.1:6443`.
    fn cluster_url(&self) -> Uri;
}

/// Resource name as the API server words it in errors, e.g.
/// `functions.build.projectriff.io` or `secrets`.
pub fn qualified_resource(resource: &ApiResource) -> String {
    if resource.group.is_empty() {
        resource.plural.clone()
    } else {
        format!("{}.{}", resource.plural, resource.group)
    }
}

pub struct RiffKubeClientImpl {
    client: Client,
    default_namespace: String,
    cluster_url: Uri,
}

impl RiffKubeClientImpl {
    pub async fn new_with_config(
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        let kubeconfig = if let Some(path) = kubeconfig_path {
            Kubeconfig::read_from(path)
                .map_err(|e| RiffError::Kube(format!("Failed to load kubeconfig: {}", e)))?
        } else {
            Kubeconfig::read()
                .map_err(|e| RiffError::Kube(format!("Failed to load kubeconfig: {}", e)))?
        };

        let config_options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                RiffError::Kube(format!("Failed to create Kubernetes config: {}", e))
            })?;

        let default_namespace = config.default_namespace.clone();
        let cluster_url = config.cluster_url.clone();

        let client = Client::try_from(config).map_err(|e| {
            RiffError::Kube(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self {
            client,
            default_namespace,
            cluster_url,
        })
    }

    pub fn get_client(&self) -> Client {
        self.client.clone()
    }

    fn api(&self, resource: &ApiResource, namespace: &str) -> Api<DynamicObject> {
        if namespace.is_empty() {
            Api::all_with(self.client.clone(), resource)
        } else {
            Api::namespaced_with(self.client.clone(), namespace, resource)
        }
    }
}

fn object_name(object: &DynamicObject) -> Result<&str> {
    object
        .metadata
        .name
        .as_deref()
        .ok_or_else(|| RiffError::config_error("resource name is required"))
}

#[async_trait::async_trait]
impl RiffKubeClient for RiffKubeClientImpl {
    async fn create(
        &self,
        resource: &ApiResource,
        namespace: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        let name = object.metadata.name.as_deref().unwrap_or_default();
        debug!(resource = %resource.plural, %namespace, %name, "create");

        let pp = PostParams::default();
        Ok(self.api(resource, namespace).create(&pp, object).await?)
    }

    async fn update(
        &self,
        resource: &ApiResource,
        namespace: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        let name = object_name(object)?;
        debug!(resource = %resource.plural, %namespace, %name, "update");

        let pp = PostParams::default();
        Ok(self.api(resource, namespace).replace(name, &pp, object).await?)
    }

    async fn get(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject> {
        debug!(resource = %resource.plural, %namespace, %name, "get");

        Ok(self.api(resource, namespace).get(name).await?)
    }

    async fn list(
        &self,
        resource: &ApiResource,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        debug!(resource = %resource.plural, %namespace, ?label_selector, "list");

        let mut lp = ListParams::default();
        if let Some(selector) = label_selector {
            lp = lp.labels(selector);
        }
        let list = self.api(resource, namespace).list(&lp).await?;
        Ok(list.items)
    }

    async fn delete(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<()> {
        debug!(resource = %resource.plural, %namespace, %name, "delete");

        self.api(resource, namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }

    async fn delete_collection(
        &self,
        resource: &ApiResource,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<()> {
        debug!(resource = %resource.plural, %namespace, ?label_selector, "delete collection");

        let mut lp = ListParams::default();
        if let Some(selector) = label_selector {
            lp = lp.labels(selector);
        }
        self.api(resource, namespace)
            .delete_collection(&DeleteParams::default(), &lp)
            .await?;
        Ok(())
    }

    fn default_namespace(&self) -> String {
        self.default_namespace.clone()
    }

    fn cluster_url(&self) -> Uri {
        self.cluster_url.clone()
    }
}

/// Types that can travel through [`TypedApi`].
pub trait RiffResource:
    Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<K> RiffResource for K where
    K: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

pub fn to_dynamic<K: Serialize>(object: &K) -> Result<DynamicObject> {
    Ok(serde_json::from_value(serde_json::to_value(object)?)?)
}

pub fn from_dynamic<K: DeserializeOwned>(object: DynamicObject) -> Result<K> {
    Ok(serde_json::from_value(serde_json::to_value(object)?)?)
}

/// Typed view over a [`RiffKubeClient`] for one resource kind and namespace.
pub struct TypedApi<K> {
    client: Arc<dyn RiffKubeClient>,
    resource: ApiResource,
    namespace: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for TypedApi<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            resource: self.resource.clone(),
            namespace: self.namespace.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: RiffResource> TypedApi<K> {
    pub fn new(client: Arc<dyn RiffKubeClient>, namespace: impl Into<String>) -> Self {
        Self {
            client,
            resource: ApiResource::erase::<K>(&()),
            namespace: namespace.into(),
            _kind: PhantomData,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn create(&self, object: &K) -> Result<K> {
        let created = self
            .client
            .create(&self.resource, &self.namespace, &to_dynamic(object)?)
            .await?;
        from_dynamic(created)
    }

    pub async fn update(&self, object: &K) -> Result<K> {
        let updated = self
            .client
            .update(&self.resource, &self.namespace, &to_dynamic(object)?)
            .await?;
        from_dynamic(updated)
    }

    pub async fn get(&self, name: &str) -> Result<K> {
        let object = self.client.get(&self.resource, &self.namespace, name).await?;
        from_dynamic(object)
    }

    /// Like [`TypedApi::get`], mapping not-found to `None`.
    pub async fn get_opt(&self, name: &str) -> Result<Option<K>> {
        match self.get(name).await {
            Ok(object) => Ok(Some(object)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self, label_selector: Option<&str>) -> Result<Vec<K>> {
        self.client
            .list(&self.resource, &self.namespace, label_selector)
            .await?
            .into_iter()
            .map(from_dynamic)
            .collect()
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        self.client
            .delete(&self.resource, &self.namespace, name)
            .await
    }

    pub async fn delete_collection(&self, label_selector: Option<&str>) -> Result<()> {
        self.client
            .delete_collection(&self.resource, &self.namespace, label_selector)
            .await
    }
}
