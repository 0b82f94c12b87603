//! Shared test utilities for satchel-bundler tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use satchel_bundler::{
    AssetService, MemorySourceLoader, PublishError, PublishingGateway, ResourceHandle,
    StaticConfiguration,
};
use serde_json::Value;

/// Gateway that keeps published content in memory.
///
/// URIs are `mem://<n>/<filename>` where `n` counts created resources, so
/// tests can tell publishes apart and check their order.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    created: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Created resources as `(filename, content)` in creation order
    pub fn created(&self) -> Vec<(String, String)> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(name, content)| (name.clone(), String::from_utf8_lossy(content).into_owned()))
            .collect()
    }

    pub fn contents(&self) -> Vec<String> {
        self.created().into_iter().map(|(_, content)| content).collect()
    }
}

impl PublishingGateway for RecordingGateway {
    fn create_resource(
        &self,
        content: &[u8],
        filename: &str,
    ) -> Result<ResourceHandle, PublishError> {
        let mut created = self.created.lock().unwrap();
        created.push((filename.to_string(), content.to_vec()));
        Ok(ResourceHandle {
            hash: (created.len() - 1).to_string(),
            filename: filename.to_string(),
        })
    }

    fn publish_persistent_resource(&self, handle: &ResourceHandle) -> Result<String, PublishError> {
        Ok(format!("mem://{}/{}", handle.hash, handle.filename))
    }
}

/// Gateway whose every call fails.
#[derive(Debug, Default)]
pub struct FailingGateway;

impl PublishingGateway for FailingGateway {
    fn create_resource(&self, _: &[u8], filename: &str) -> Result<ResourceHandle, PublishError> {
        Err(PublishError::InvalidFilename {
            filename: filename.to_string(),
            reason: "storage offline".to_string(),
        })
    }

    fn publish_persistent_resource(&self, handle: &ResourceHandle) -> Result<String, PublishError> {
        Err(PublishError::UnknownResource {
            hash: handle.hash.clone(),
        })
    }
}

/// In-memory sources named after their content: `a.js` contains `a`.
pub fn echo_loader(paths: &[&str]) -> MemorySourceLoader {
    paths.iter().fold(MemorySourceLoader::new(), |loader, path| {
        let stem = path.rsplit('/').next().unwrap_or(path);
        let stem = stem.split('.').next().unwrap_or(stem);
        loader.with_file(*path, stem)
    })
}

/// Service over an `Assets` tree, echo sources and a recording gateway.
pub fn service(assets: Value, paths: &[&str]) -> (AssetService, Arc<RecordingGateway>) {
    let gateway = RecordingGateway::new();
    let service = AssetService::new(Arc::new(StaticConfiguration::assets(assets)), gateway.clone())
        .with_loader(Arc::new(echo_loader(paths)));
    (service, gateway)
}
