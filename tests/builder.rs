mod common;

use common::{auth, microservice};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use microservice_operator::builder::{
    build_child, build_deployment, build_ingress, build_service, BuildOptions,
};
use microservice_operator::crd::{CoreUiSpec, PlatformServiceSpec};
use microservice_operator::{ChildKind, CoreUi};

#[test]
fn equal_specs_build_identical_children() {
    let options = BuildOptions {
        ingress_class: Some("nginx".to_string()),
    };
    for kind in ChildKind::ALL {
        let a = build_child(kind, &auth(), &options);
        let b = build_child(kind, &auth(), &options);
        assert_eq!(a, b, "{kind} differs");
        assert_eq!(
            serde_json::to_string(&a.metadata()).unwrap(),
            serde_json::to_string(&b.metadata()).unwrap()
        );
    }
    assert_eq!(
        serde_json::to_vec(&build_deployment(&auth())).unwrap(),
        serde_json::to_vec(&build_deployment(&auth())).unwrap()
    );
}

#[test]
fn service_selector_matches_pod_labels() {
    for name in ["auth", "billing", "ui-gateway"] {
        let ms = microservice(name, "team-a", None, "img:1", 3000);
        let deployment = build_deployment(&ms);
        let service = build_service(&ms);

        let spec = deployment.spec.unwrap();
        let pod_labels = spec.template.metadata.unwrap().labels.unwrap();
        let selector = service.spec.unwrap().selector.unwrap();
        assert_eq!(selector, pod_labels);
        assert_eq!(spec.selector.match_labels.unwrap(), pod_labels);
    }
}

#[test]
fn children_share_parent_identity() {
    let ms = microservice("billing", "payments", None, "billing:2", 9000);
    for kind in ChildKind::ALL {
        let child = build_child(kind, &ms, &BuildOptions::default());
        assert_eq!(child.name(), "billing");
        assert_eq!(child.namespace(), "payments");
        assert!(child.metadata().owner_references.is_none());
    }
}

#[test]
fn replicas_default_to_one() {
    let ms = microservice("auth", "default", None, "auth:v1", 8080);
    let spec = build_deployment(&ms).spec.unwrap();
    assert_eq!(spec.replicas, Some(1));
}

#[test]
fn zero_replicas_are_kept() {
    let ms = microservice("auth", "default", Some(0), "auth:v1", 8080);
    assert_eq!(build_deployment(&ms).spec.unwrap().replicas, Some(0));
}

#[test]
fn deployment_has_single_named_container() {
    let spec = build_deployment(&auth()).spec.unwrap();
    let containers = spec.template.spec.unwrap().containers;
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].name, "auth");
    let port = &containers[0].ports.as_ref().unwrap()[0];
    assert_eq!(port.container_port, 8080);
    assert_eq!(port.name.as_deref(), Some("http"));
}

#[test]
fn service_forwards_port_80_to_container_port() {
    let ports = build_service(&auth()).spec.unwrap().ports.unwrap();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].port, 80);
    assert_eq!(ports[0].target_port, Some(IntOrString::Int(8080)));
}

#[test]
fn ingress_routes_root_prefix_to_service() {
    let mut ms = auth();
    ms.spec.ingress_host = Some("auth.example.com".to_string());

    let spec = build_ingress(&ms, &BuildOptions::default()).spec.unwrap();
    assert_eq!(spec.ingress_class_name, None);
    let rules = spec.rules.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].host.as_deref(), Some("auth.example.com"));

    let paths = &rules[0].http.as_ref().unwrap().paths;
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].path.as_deref(), Some("/"));
    assert_eq!(paths[0].path_type, "Prefix");
    let backend = paths[0].backend.service.as_ref().unwrap();
    assert_eq!(backend.name, "auth");
    assert_eq!(backend.port.as_ref().unwrap().number, Some(80));
}

#[test]
fn empty_ingress_host_matches_all_hosts() {
    for host in [None, Some(String::new())] {
        let mut ms = auth();
        ms.spec.ingress_host = host;
        let rules = build_ingress(&ms, &BuildOptions::default())
            .spec
            .unwrap()
            .rules
            .unwrap();
        assert_eq!(rules[0].host, None);
    }
}

#[test]
fn ingress_class_comes_from_options() {
    let options = BuildOptions {
        ingress_class: Some("nginx".to_string()),
    };
    let spec = build_ingress(&auth(), &options).spec.unwrap();
    assert_eq!(spec.ingress_class_name.as_deref(), Some("nginx"));
}

#[test]
fn platform_kinds_use_the_same_builder() {
    let mut ui = CoreUi::new(
        "coreui",
        CoreUiSpec {
            service: PlatformServiceSpec {
                replicas: 3,
                image: "coreui:2.1".to_string(),
                port: 80,
                ingress_host: None,
            },
        },
    );
    ui.metadata.namespace = Some("web".to_string());

    let spec = build_deployment(&ui).spec.unwrap();
    assert_eq!(spec.replicas, Some(3));
    let pod = spec.template.spec.unwrap();
    assert_eq!(pod.containers[0].image.as_deref(), Some("coreui:2.1"));

    let ports = build_service(&ui).spec.unwrap().ports.unwrap();
    assert_eq!(ports[0].target_port, Some(IntOrString::Int(80)));
}
