//! Integration tests for configuration submission.

use std::sync::Arc;

use ixgen::peering::LocalRegistryClient;
use serde_json::{json, Value};

mod common;

use common::{decix_submission, start_programmable_backend, start_server, start_server_with};

fn neighbor_order(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| l.contains(" remote-as "))
        .map(|l| l.rsplit(' ').next().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_brocade_configuration_is_enriched() {
    let server = start_server(|_| {}).await;

    let res = server
        .submit("/ixgen/brocade/netiron", &decix_submission(&["196922", "3356"]))
        .await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/plain; charset=utf-8");

    let text = res.text().await.unwrap();
    assert!(text.lines().any(|l| l == "neighbor 80.81.194.25 remote-as 196922"));
    assert!(text.contains("neighbor 80.81.194.25 maximum-prefix 64"));
    assert!(text.contains("neighbor 80.81.194.25 description Hofmeir Media"));
    assert!(text.contains("neighbor 2001:7f8::d1c:0:1 activate"));
    assert!(text.contains("neighbor 2001:7f8::d1c:0:1 maximum-prefix 20000"));
}

#[tokio::test]
async fn test_output_follows_submission_order() {
    let server = start_server(|_| {}).await;

    let res = server
        .submit("/ixgen/brocade/netiron", &decix_submission(&["3356", "196922"]))
        .await;
    let text = res.text().await.unwrap();
    let order = neighbor_order(&text);
    assert_eq!(order, vec!["3356", "3356", "196922", "196922"]);
}

#[tokio::test]
async fn test_raw_body_keeps_submitted_order() {
    let server = start_server(|_| {}).await;
    let body = r#"{"ixname":"DE-CIX Frankfurt/Main","peers_configured":{"DE-CIX Frankfurt/Main":{"3356":[{"asn":"3356"}],"196922":[{"asn":"196922"}]}}}"#;

    let res = server.submit_raw("/ixgen/brocade/netiron", body).await;
    assert_eq!(res.status(), 200);
    let order = neighbor_order(&res.text().await.unwrap());
    assert_eq!(order, vec!["3356", "3356", "196922", "196922"]);
}

#[tokio::test]
async fn test_juniper_and_json_styles() {
    let server = start_server(|_| {}).await;
    let body = decix_submission(&["196922"]);

    let res = server.submit("/ixgen/juniper/set", &body).await;
    assert_eq!(res.status(), 200);
    let text = res.text().await.unwrap();
    assert!(text.contains("set protocols bgp group peering-v4 neighbor 80.81.194.25 peer-as 196922"));

    let res = server.submit("/ixgen/native/json", &body).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    let rendered: Value = res.json().await.unwrap();
    let peer = &rendered[0]["peers"][0];
    assert_eq!(peer["asn"], "196922");
    assert_eq!(peer["ipv4addr"], "80.81.194.25");
    assert_eq!(peer["irrasset"], "AS-HOFMEIR");
    assert_eq!(peer["infoprefixes6"], 10);
}

#[tokio::test]
async fn test_target_asn_is_excluded() {
    let server = start_server(|_| {}).await;

    let res = server
        .submit(
            "/ixgen/brocade/netiron/196922",
            &decix_submission(&["196922", "3356"]),
        )
        .await;
    assert_eq!(res.status(), 200);
    let text = res.text().await.unwrap();
    assert!(!text.contains("remote-as 196922"));
    assert!(text.contains("neighbor 80.81.192.47 remote-as 3356"));
}

#[tokio::test]
async fn test_wildcard_adds_route_servers() {
    let server = start_server(|_| {}).await;

    let mut body = decix_submission(&[]);
    body["options"] = json!({"wildcard": true});

    let res = server.submit("/ixgen/brocade/netiron/196922", &body).await;
    assert_eq!(res.status(), 200);
    let text = res.text().await.unwrap();
    assert_eq!(neighbor_order(&text), vec!["3356", "3356", "6695", "6695"]);
    assert!(text.contains("neighbor 80.81.192.157 enforce-first-as disable"));
}

#[tokio::test]
async fn test_submitted_peersready_passes_through() {
    let server = start_server(|_| {}).await;

    let body = json!([{
        "ixname": "Private Exchange",
        "peersready": [{"asn": "64500", "ipv4addr": "192.0.2.1", "ipv6enabled": false}]
    }]);
    let res = server.submit("/ixgen/brocade/netiron", &body).await;
    assert_eq!(res.status(), 200);
    let text = res.text().await.unwrap();
    assert!(text.contains("neighbor 192.0.2.1 remote-as 64500"));
}

#[tokio::test]
async fn test_rejected_submissions() {
    let server = start_server(|_| {}).await;
    let body = decix_submission(&["196922"]);

    let res = server
        .client
        .get(server.url("/ixgen/brocade/netiron"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);
    assert_eq!(res.headers()["allow"], "POST");

    let res = server
        .client
        .post(server.url("/ixgen/brocade/netiron"))
        .header("content-type", "text/plain")
        .body("DE-CIX 196922")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 415);

    let res = server
        .client
        .post(server.url("/ixgen/brocade/netiron"))
        .header("content-type", "application/json")
        .body("{\"ixname\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = server.submit("/ixgen/cisco/ios", &body).await;
    assert_eq!(res.status(), 400);

    let res = server.submit("/ixgen/brocade/net-iron", &body).await;
    assert_eq!(res.status(), 400);

    let res = server.submit("/ixgen/brocade/netiron/peer", &body).await;
    assert_eq!(res.status(), 400);

    let res = server.submit("/ixgen/brocade/netiron", &json!([])).await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_trailing_slash_after_style() {
    let server = start_server(|_| {}).await;
    let body = decix_submission(&["196922", "3356"]);

    let res = server.submit("/ixgen/brocade/netiron/", &body).await;
    assert_eq!(res.status(), 200);
    let order = neighbor_order(&res.text().await.unwrap());
    assert_eq!(order, vec!["196922", "196922", "3356", "3356"]);

    let res = server
        .client
        .get(server.url("/ixgen/brocade/netiron/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);
}

#[tokio::test]
async fn test_custom_namespace() {
    let server = start_server(|config| config.api.submit_namespace = "peering".into()).await;
    let body = decix_submission(&["196922"]);

    assert_eq!(server.submit("/peering/brocade/netiron", &body).await.status(), 200);
    assert_eq!(server.submit("/ixgen/brocade/netiron", &body).await.status(), 404);
}

#[tokio::test]
async fn test_failing_mirror_is_bad_gateway() {
    let mirror = start_programmable_backend(|| async { (503, "down".to_string()) }).await;
    let server = start_server(|config| {
        config.registry.url = Some(format!("http://{}/api", mirror));
        config.registry.timeout_secs = 2;
    })
    .await;

    let res = server
        .submit("/ixgen/brocade/netiron", &decix_submission(&["196922"]))
        .await;
    assert_eq!(res.status(), 502);
}

#[tokio::test]
async fn test_in_process_client_matches_loopback() {
    let body = decix_submission(&["3356", "196922"]);

    let loopback = start_server(|_| {}).await;
    let expected = loopback
        .submit("/ixgen/juniper/set", &body)
        .await
        .text()
        .await
        .unwrap();

    let local = start_server_with(
        true,
        |_| {},
        |server| {
            let client = LocalRegistryClient::new(server.registry().clone());
            server.with_registry_client(Arc::new(client))
        },
    )
    .await;
    let actual = local
        .submit("/ixgen/juniper/set", &body)
        .await
        .text()
        .await
        .unwrap();

    assert_eq!(actual, expected);
}
