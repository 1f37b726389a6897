use qblast_core::{
    HttpTransport, OutputFormat, QblastError, QblastResult, ServiceConfig, ServiceRequest, Transport,
};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ServiceConfig {
    ServiceConfig {
        base_url: server.uri(),
        email: Some("someone@example.org".to_string()),
        ..ServiceConfig::default()
    }
}

/// The blocking client must stay off the async worker threads
async fn send(config: ServiceConfig, request: ServiceRequest) -> QblastResult<String> {
    tokio::task::spawn_blocking(move || HttpTransport::new(&config)?.send(&request))
        .await
        .expect("transport task panicked")
}

#[tokio::test]
async fn put_is_sent_as_form_post() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("CMD=Put"))
        .and(body_string_contains("QUERY=ACGTACGT"))
        .and(body_string_contains("FORMAT_TYPE=XML"))
        .respond_with(ResponseTemplate::new(200).set_body_string("RID = R1\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = ServiceRequest::put("blastn", "nt", "ACGTACGT", OutputFormat::Xml);
    let body = send(config_for(&mock_server), request).await.unwrap();
    assert_eq!(body, "RID = R1\n");

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.query(), None);
    let form = String::from_utf8_lossy(&received[0].body);
    assert!(form.contains("tool=qblast"));
    assert!(form.contains("email=someone%40example.org"));
}

#[tokio::test]
async fn get_is_sent_as_query_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("CMD", "Get"))
        .and(query_param("RID", "R1"))
        .and(query_param("FORMAT_OBJECT", "SearchInfo"))
        .and(query_param("tool", "qblast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Status=READY"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = send(config_for(&mock_server), ServiceRequest::search_info("R1")).await.unwrap();
    assert_eq!(body, "Status=READY");

    let received = mock_server.received_requests().await.unwrap();
    assert!(received[0].body.is_empty());
}

#[tokio::test]
async fn server_error_becomes_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal trouble"))
        .mount(&mock_server)
        .await;

    let request = ServiceRequest::results("R1", OutputFormat::Text);
    let err = send(config_for(&mock_server), request).await.unwrap_err();

    match err {
        QblastError::Transport { message } => {
            assert!(message.contains("500"), "{}", message);
            assert!(message.contains("internal trouble"), "{}", message);
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}
