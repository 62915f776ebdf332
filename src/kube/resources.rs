//! API descriptors for the OpenShift resources the build chain reads
//!
//! These are not part of k8s-openapi, so they are accessed through
//! `Api<DynamicObject>` with an explicit `ApiResource`.

use kube::core::ApiResource;

fn openshift_resource(group: &str, kind: &str, plural: &str) -> ApiResource {
    let version = "v1";
    ApiResource {
        group: group.to_string(),
        version: version.to_string(),
        api_version: format!("{}/{}", group, version),
        kind: kind.to_string(),
        plural: plural.to_string(),
    }
}

/// build.openshift.io/v1 BuildConfig
pub fn build_config_resource() -> ApiResource {
    openshift_resource("build.openshift.io", "BuildConfig", "buildconfigs")
}

/// image.openshift.io/v1 ImageStream
pub fn image_stream_resource() -> ApiResource {
    openshift_resource("image.openshift.io", "ImageStream", "imagestreams")
}

/// project.openshift.io/v1 Project (cluster scoped)
pub fn project_resource() -> ApiResource {
    openshift_resource("project.openshift.io", "Project", "projects")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_resource() {
        let resource = build_config_resource();
        assert_eq!(resource.api_version, "build.openshift.io/v1");
        assert_eq!(resource.plural, "buildconfigs");
        assert_eq!(resource.kind, "BuildConfig");
    }

    #[test]
    fn test_project_resource() {
        assert_eq!(project_resource().group, "project.openshift.io");
        assert_eq!(image_stream_resource().plural, "imagestreams");
    }
}
