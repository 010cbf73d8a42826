use super::*;
use crate::testutil::{FixedStatusJobManager, service_row};

fn driver() -> NamespaceExportDriver {
    NamespaceExportDriver::new(false, FixedStatusJobManager::allocated())
}

fn attrs(namespace: Option<&str>, mountpoint: Option<&str>, storagesize: Option<&str>) -> ServiceAttributes {
    ServiceAttributes {
        namespace: namespace.map(str::to_string),
        mountpoint: mountpoint.map(str::to_string),
        storagesize: storagesize.map(str::to_string),
        ..Default::default()
    }
}

#[test]
fn valid_attributes_pass() {
    let attrs = attrs(Some("/ns/data"), Some("/mnt/data"), Some("20Gi"));
    assert_eq!(driver().check_attributes(&attrs), None);
}

#[test]
fn each_mandatory_attribute_is_reported_by_name() {
    let reason = driver()
        .check_attributes(&attrs(None, Some("/mnt"), Some("20Gi")))
        .unwrap();
    assert!(reason.contains("namespace"));

    let reason = driver()
        .check_attributes(&attrs(Some("/ns"), None, Some("20Gi")))
        .unwrap();
    assert!(reason.contains("mountpoint"));

    let reason = driver()
        .check_attributes(&attrs(Some("/ns"), Some("/mnt"), None))
        .unwrap();
    assert!(reason.contains("storagesize"));
}

#[test]
fn malformed_storage_size_is_reported_with_the_value() {
    let reason = driver()
        .check_attributes(&attrs(Some("/ns"), Some("/mnt"), Some("twenty")))
        .unwrap();
    assert_eq!(reason, "storage size 'twenty' is not a correct size format");
}

#[test]
fn size_suffixes_accepted() {
    for size in ["20", "20Ki", "20Mi", "20Gi", "512MiB"] {
        let attrs = attrs(Some("/ns"), Some("/mnt"), Some(size));
        assert_eq!(driver().check_attributes(&attrs), None, "{size} should parse");
    }
}

#[test]
fn reservation_request_carries_size_and_mountpoint() {
    let spec = ServiceSpec {
        name: "nfs1".to_string(),
        kind: ServiceKind::NamespaceExport,
        attributes: attrs(Some("/ns/data"), Some("/mnt/data"), Some("20Gi")),
    };
    let request = driver().reservation_request(&spec, "alice");
    assert_eq!(request.srv_type, "GBF");
    assert_eq!(request.attributes.ssize, "20Gi");
    assert_eq!(request.attributes.mountpoint, "/mnt/data");
    assert!(request.attributes.targets.is_empty());
}

#[test]
fn create_directive_describes_the_export() {
    let service = service_row("nfs1", ServiceKind::NamespaceExport);
    let directive = driver().job_directives(&service, DirectiveAction::Create);
    assert_eq!(
        directive,
        "GBF create_persistent Name=nfs1 StorageSize=20Gi Path=/mnt/data FSType=ganesha \
         MetaDataServers=0 StorageDataServers=1 data_dst=/ns/data"
    );
}

#[test]
fn destroy_directive_names_the_service() {
    let service = service_row("nfs1", ServiceKind::NamespaceExport);
    assert_eq!(
        driver().job_directives(&service, DirectiveAction::Destroy),
        "GBF destroy_persistent Name=nfs1"
    );
}

#[tokio::test]
async fn status_comes_from_the_scheduler_report() {
    assert_eq!(driver().query_status("nfs1").await, Some(ServiceStatus::Allocated));
}
