#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use client_deploy_lambda::adapters::archive_source::ArchiveSource;
use client_deploy_lambda::adapters::callback::CallbackSender;
use client_deploy_lambda::adapters::cdn::CdnInvalidator;
use client_deploy_lambda::adapters::identity::IdentityLookup;
use client_deploy_lambda::adapters::object_store::{ObjectPage, ObjectStore};
use client_deploy_lambda::handlers::lifecycle::LifecycleServices;
use client_deploy_lambda::runtime::contract::{LifecycleRequest, RequestType};
use client_deploy_lambda::runtime::settings::{DeploymentConfig, WaitPolicy};
use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const LOG_STREAM: &str = "2026/10/18/[$LATEST]0123456789abcdef";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// One fake standing in for every provider, journaling each side effect.
pub struct FakeProviders {
    journal: Mutex<Vec<&'static str>>,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    callbacks: Mutex<Vec<(String, Vec<u8>)>>,
    archive: Option<Vec<u8>>,
    pub client_secret: Option<String>,
    pub denied_key_suffix: Option<&'static str>,
    pub callback_fails: bool,
}

impl FakeProviders {
    pub fn with_archive(archive: Vec<u8>) -> Self {
        Self {
            journal: Mutex::new(Vec::new()),
            objects: Mutex::new(BTreeMap::new()),
            callbacks: Mutex::new(Vec::new()),
            archive: Some(archive),
            client_secret: Some("s3cret".to_string()),
            denied_key_suffix: None,
            callback_fails: false,
        }
    }

    pub fn with_unreachable_archive() -> Self {
        Self {
            archive: None,
            ..Self::with_archive(Vec::new())
        }
    }

    pub fn services(&self) -> LifecycleServices<'_> {
        LifecycleServices {
            object_store: self,
            cdn: self,
            identity: self,
            archive_source: self,
            callback: self,
        }
    }

    pub fn seed_object(&self, key: &str, body: &[u8]) {
        let object = StoredObject {
            body: body.to_vec(),
            content_type: "text/plain".to_string(),
        };
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), object);
    }

    pub fn objects(&self) -> BTreeMap<String, StoredObject> {
        self.objects.lock().expect("poisoned mutex").clone()
    }

    pub fn object_keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    /// Side effects in order, with consecutive repeats collapsed.
    pub fn side_effects(&self) -> Vec<&'static str> {
        let mut effects = self.journal.lock().expect("poisoned mutex").clone();
        effects.dedup();
        effects
    }

    pub fn callbacks(&self) -> Vec<(String, Value)> {
        self.callbacks
            .lock()
            .expect("poisoned mutex")
            .iter()
            .map(|(url, body)| {
                (
                    url.clone(),
                    serde_json::from_slice(body).expect("callback body should be json"),
                )
            })
            .collect()
    }

    fn record(&self, effect: &'static str) {
        self.journal.lock().expect("poisoned mutex").push(effect);
    }
}

impl ObjectStore for FakeProviders {
    fn put_file(
        &self,
        _bucket: &str,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> Result<(), String> {
        self.record("upload_all");
        if matches!(self.denied_key_suffix, Some(suffix) if key.ends_with(suffix)) {
            return Err(format!("simulated put failure for key: {key}"));
        }
        let body = fs::read(source).map_err(|error| error.to_string())?;
        let object = StoredObject {
            body,
            content_type: content_type.to_string(),
        };
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), object);
        Ok(())
    }

    fn list_objects(
        &self,
        _bucket: &str,
        _continuation_token: Option<&str>,
    ) -> Result<ObjectPage, String> {
        self.record("clean_bucket");
        Ok(ObjectPage {
            keys: self.object_keys(),
            next_token: None,
        })
    }

    fn delete_objects(&self, _bucket: &str, keys: &[String]) -> Result<(), String> {
        self.record("clean_bucket");
        let mut objects = self.objects.lock().expect("poisoned mutex");
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}

impl CdnInvalidator for FakeProviders {
    fn create_invalidation(
        &self,
        _distribution_id: &str,
        paths: &[String],
        _caller_reference: &str,
    ) -> Result<String, String> {
        assert_eq!(paths, ["/*".to_string()]);
        self.record("invalidate_all");
        Ok("I2EXAMPLE".to_string())
    }

    fn invalidation_status(
        &self,
        _distribution_id: &str,
        _invalidation_id: &str,
    ) -> Result<String, String> {
        Ok("Completed".to_string())
    }
}

impl IdentityLookup for FakeProviders {
    fn client_secret(
        &self,
        _user_pool_id: &str,
        _client_id: &str,
    ) -> Result<Option<String>, String> {
        self.record("inject");
        Ok(self.client_secret.clone())
    }
}

impl ArchiveSource for FakeProviders {
    fn download(&self, url: &str, destination: &Path) -> Result<(), String> {
        self.record("fetch_and_extract");
        match &self.archive {
            Some(bytes) => fs::write(destination, bytes).map_err(|error| error.to_string()),
            None => Err(format!("failed to reach {url}")),
        }
    }
}

impl CallbackSender for FakeProviders {
    fn put(&self, url: &str, body: &[u8]) -> Result<u16, String> {
        self.callbacks
            .lock()
            .expect("poisoned mutex")
            .push((url.to_string(), body.to_vec()));
        if self.callback_fails {
            Err("connection reset by peer".to_string())
        } else {
            Ok(200)
        }
    }
}

/// Log sink handed to a `tracing_subscriber` writer.
#[derive(Clone, Default)]
pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("poisoned mutex")).into_owned()
    }
}

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("poisoned mutex").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("zip entry should start");
        writer
            .write_all(body.as_bytes())
            .expect("zip entry should write");
    }
    writer.finish().expect("zip should finish").into_inner()
}

pub fn sample_archive() -> Vec<u8> {
    zip_archive(&[("index.html", "<html></html>"), ("css/a.css", "body{}")])
}

pub fn sample_config(scratch_root: &Path) -> DeploymentConfig {
    DeploymentConfig {
        download_url: "https://example/app.zip".to_string(),
        bucket: "b1".to_string(),
        distribution_id: "d1".to_string(),
        identity_pool_id: "us-east-1:pool".to_string(),
        user_pool_id: "us-east-1_abc".to_string(),
        user_pool_custom_domain: "https://auth.example".to_string(),
        application_id: "client-1".to_string(),
        region: "us-east-1".to_string(),
        scratch_dir: scratch_root.join("brclient"),
        upload_prefix: String::new(),
        invalidation_wait: WaitPolicy {
            interval: Duration::ZERO,
            max_attempts: 2,
        },
    }
}

pub fn sample_request(request_type: RequestType, physical_id: Option<&str>) -> LifecycleRequest {
    LifecycleRequest {
        request_type,
        response_url: "https://cb.example/x".to_string(),
        stack_id: "s1".to_string(),
        request_id: "r1".to_string(),
        logical_resource_id: "L1".to_string(),
        physical_resource_id: physical_id.map(str::to_string),
        resource_type: Some("Custom::BRClientDeployment".to_string()),
    }
}

pub fn scratch_root() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().to_path_buf();
    (dir, path)
}
