//! Endpoint URLs and header-less request values.
//!
//! Every URL is rooted at `<base>/service/<service_id>/version`.

use edgesync_core::{Artifact, ArtifactKind, Config, HttpMethod, ServiceId};

use crate::transport::FormData;

/// URL builder for one service on one API host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
    service_id: ServiceId,
}

impl Endpoints {
    pub fn new(base_url: &str, service_id: ServiceId) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
            service_id,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_base_url, config.service_id.clone())
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    /// `<base>/service/<id>`: target of the connection probe.
    pub fn service(&self) -> String {
        format!("{}/service/{}", self.base, self.service_id)
    }

    /// The versions collection.
    pub fn versions(&self) -> String {
        format!("{}/version", self.service())
    }

    pub fn version(&self, number: u32) -> String {
        format!("{}/{number}", self.versions())
    }

    pub fn clone_version(&self, number: u32) -> String {
        format!("{}/clone", self.version(number))
    }

    pub fn validate(&self, number: u32) -> String {
        format!("{}/validate", self.version(number))
    }

    pub fn activate(&self, number: u32) -> String {
        format!("{}/activate", self.version(number))
    }

    /// Collection URL of `kind` in version `number` (insert target).
    pub fn collection(&self, number: u32, kind: ArtifactKind) -> String {
        format!("{}/{}", self.version(number), kind.path_segment())
    }

    /// Named resource URL (existence check and update target).
    pub fn resource(&self, number: u32, kind: ArtifactKind, name: &str) -> String {
        format!("{}/{name}", self.collection(number, kind))
    }
}

/// A request built by the reconciler; headers are attached at dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub data: FormData,
    pub method: HttpMethod,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            data: FormData::new(),
            method: HttpMethod::Get,
        }
    }

    pub fn put(url: impl Into<String>, data: FormData) -> Self {
        Self {
            url: url.into(),
            data,
            method: HttpMethod::Put,
        }
    }

    pub fn post(url: impl Into<String>, data: FormData) -> Self {
        Self {
            url: url.into(),
            data,
            method: HttpMethod::Post,
        }
    }

    /// POST the artifact to its collection.
    pub fn insert(endpoints: &Endpoints, version: u32, artifact: &Artifact) -> Self {
        Self::post(
            endpoints.collection(version, artifact.kind()),
            artifact.form_fields(),
        )
    }

    /// PUT the artifact to its named resource.
    pub fn update(endpoints: &Endpoints, version: u32, artifact: &Artifact) -> Self {
        Self::put(
            endpoints.resource(version, artifact.kind(), artifact.name()),
            artifact.form_fields(),
        )
    }

    pub fn upsert(endpoints: &Endpoints, version: u32, artifact: &Artifact, exists: bool) -> Self {
        if exists {
            Self::update(endpoints, version, artifact)
        } else {
            Self::insert(endpoints, version, artifact)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgesync_core::Condition;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://api.example.test/", ServiceId::from("S"))
    }

    fn condition() -> Artifact {
        Artifact::Condition(Condition {
            name: "is_admin".into(),
            statement: "req.url ~ \"^/admin\"".into(),
            condition_type: "REQUEST".into(),
            priority: 10,
        })
    }

    #[test]
    fn urls_are_rooted_at_the_versions_collection() {
        let e = endpoints();
        assert_eq!(e.versions(), "https://api.example.test/service/S/version");
        assert_eq!(e.clone_version(4), "https://api.example.test/service/S/version/4/clone");
        assert_eq!(e.validate(5), "https://api.example.test/service/S/version/5/validate");
        assert_eq!(
            e.resource(5, ArtifactKind::RequestSetting, "pass_admin"),
            "https://api.example.test/service/S/version/5/request_settings/pass_admin"
        );
    }

    #[test]
    fn insert_posts_to_collection_and_update_puts_to_resource() {
        let e = endpoints();
        let insert = Request::upsert(&e, 3, &condition(), false);
        assert_eq!(insert.method, HttpMethod::Post);
        assert_eq!(insert.url, "https://api.example.test/service/S/version/3/condition");

        let update = Request::upsert(&e, 3, &condition(), true);
        assert_eq!(update.method, HttpMethod::Put);
        assert_eq!(update.url, "https://api.example.test/service/S/version/3/condition/is_admin");
        assert_eq!(insert.data, update.data);
        assert_eq!(update.data["priority"], "10");
    }
}
