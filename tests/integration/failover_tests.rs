/*!
 * Integration tests for failover across the endpoint pool
 */

use pooltrans::errors::{AttemptError, TranslationError, TransportError};
use pooltrans::transport::{HttpMethod, MockReply, MockTransportFactory};

use crate::common::{
    INITIAL_SEQUENCE, SERVICE_URL, mock_service, proxy_labels, request_id, test_config, translated,
};

#[tokio::test]
async fn test_pool_withThreeProxies_shouldHaveFourEndpointsDirectLast() {
    let factory = MockTransportFactory::new(translated(&["Hallo"]));
    let service = mock_service(&test_config(3), &factory);

    let labels: Vec<&str> = service.pool().attempt_order().map(|e| e.label()).collect();
    let mut expected = proxy_labels(3);
    expected.push("direct".to_string());

    assert_eq!(labels, expected);
    assert!(service.pool().primary().is_some_and(|e| e.is_primary()));
}

#[tokio::test]
async fn test_translate_withUnsupportedTarget_shouldFailWithoutNetwork() {
    let factory = MockTransportFactory::new(translated(&["Xin chào"]));
    let service = mock_service(&test_config(2), &factory);

    for target in ["vi", "th", "ar-EG", "bel"] {
        let result = service.translate("Hello", "en", target).await;
        match result {
            Err(TranslationError::UnsupportedLanguage { backend, language }) => {
                assert_eq!(backend, "DeepL");
                assert_eq!(language, target);
            }
            other => panic!("expected UnsupportedLanguage for {}, got {:?}", target, other),
        }
    }

    assert_eq!(factory.call_count(), 0);
    for endpoint in service.pool().attempt_order() {
        assert_eq!(endpoint.sequence().await, INITIAL_SEQUENCE);
    }
}

#[tokio::test]
async fn test_translate_withHealthyFirstProxy_shouldUseOnlyThatEndpoint() {
    let factory = MockTransportFactory::new(translated(&["Hallo Welt"]));
    let service = mock_service(&test_config(3), &factory);

    let text = service.translate("Hello world", "en", "de").await.unwrap();

    assert_eq!(text, "Hallo Welt");
    assert_eq!(factory.called_endpoints(), vec!["10.0.0.1:3128".to_string()]);
}

#[tokio::test]
async fn test_translate_withFailingProxies_shouldFallBackToDirect() {
    let labels = proxy_labels(4);
    let factory = MockTransportFactory::new(translated(&["Bonjour", "monde"]))
        .reply_for(&labels[0], MockReply::unavailable())
        .reply_for(&labels[1], MockReply::connection_refused())
        .reply_for(&labels[2], MockReply::body("<html>blocked</html>"))
        .reply_for(&labels[3], MockReply::body(r#"{"result":{"translations":[]}}"#));
    let service = mock_service(&test_config(4), &factory);

    let text = service.translate("Hello\nworld", "en", "fr").await.unwrap();

    assert_eq!(text, "Bonjour\nmonde");
    let mut expected = labels.clone();
    expected.push("direct".to_string());
    assert_eq!(factory.called_endpoints(), expected);

    for endpoint in service.pool().attempt_order() {
        assert_eq!(endpoint.sequence().await, INITIAL_SEQUENCE + 1, "endpoint {}", endpoint.label());
    }
}

#[tokio::test]
async fn test_translate_withAllEndpointsFailing_shouldReportExhaustion() {
    let factory = MockTransportFactory::new(MockReply::Status(429, "Too many requests".to_string()))
        .reply_for("direct", MockReply::Fault(TransportError::Timeout("30s".to_string())));
    let service = mock_service(&test_config(2), &factory);

    let result = service.translate("Hello", "en", "de").await;

    match &result {
        Err(TranslationError::ServiceExhausted { attempts, last }) => {
            assert_eq!(*attempts, 3);
            assert!(matches!(
                last.as_ref(),
                AttemptError::TransportFailure { status: None, source: Some(TransportError::Timeout(_)), .. }
            ));
        }
        other => panic!("expected ServiceExhausted, got {:?}", other),
    }
    assert_eq!(
        result.as_ref().err().and_then(|e| e.transport_error()),
        Some(&TransportError::Timeout("30s".to_string()))
    );

    let called = factory.called_endpoints();
    assert_eq!(called.len(), 3);
    assert_eq!(called, vec!["10.0.0.1:3128", "10.0.0.2:3128", "direct"]);
}

#[tokio::test]
async fn test_translate_afterExhaustion_shouldStartAgainFromFirstProxy() {
    let labels = proxy_labels(1);
    let factory = MockTransportFactory::new(translated(&["Hallo"]))
        .queue_for(&labels[0], vec![MockReply::unavailable()])
        .queue_for("direct", vec![MockReply::unavailable()]);
    let service = mock_service(&test_config(1), &factory);

    assert!(service.translate("Hello", "en", "de").await.is_err());
    assert_eq!(service.translate("Hello", "en", "de").await.unwrap(), "Hallo");

    assert_eq!(factory.called_endpoints(), vec!["10.0.0.1:3128", "direct", "10.0.0.1:3128"]);
}

#[tokio::test]
async fn test_translate_shouldPostWithCookieAcceptanceAndConsecutiveIds() {
    let factory = MockTransportFactory::new(translated(&["Hallo"]));
    let service = mock_service(&test_config(0), &factory);

    service.translate("Hello", "en", "de").await.unwrap();
    service.translate("Hello again", "en", "de").await.unwrap();

    let calls = factory.calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert_eq!(call.url, SERVICE_URL);
        assert_eq!(call.method, HttpMethod::Post);
        assert!(call.accept_cookie);
        assert!(call.body.contains("LMT_handle_jobs"));
    }
    assert_eq!(request_id(&calls[0].body), INITIAL_SEQUENCE);
    assert_eq!(request_id(&calls[1].body), INITIAL_SEQUENCE + 1);
}

#[tokio::test]
async fn test_translate_withRegionalTarget_shouldSendRegionalVariant() {
    let factory = MockTransportFactory::new(translated(&["Colour"]));
    let service = mock_service(&test_config(0), &factory);

    service.translate("Farbe", "de", "en-GB").await.unwrap();

    let body: serde_json::Value = serde_json::from_str(&factory.calls()[0].body).unwrap();
    assert_eq!(body["params"]["lang"]["target_lang"], "EN");
    assert_eq!(body["params"]["lang"]["source_lang_user_selected"], "DE");
    assert_eq!(body["params"]["commonJobParams"]["regionalVariant"], "en-GB");
}

#[tokio::test]
async fn test_translate_withShortResponse_shouldReturnWhatWasTranslated() {
    let factory = MockTransportFactory::new(translated(&["Bonjour"]));
    let service = mock_service(&test_config(0), &factory);

    let text = service.translate("Hello\nworld", "en", "fr").await.unwrap();
    assert_eq!(text, "Bonjour");
}

#[tokio::test]
async fn test_translate_withSequenceNearMaximum_shouldNotPanic() {
    let mut config = test_config(0);
    config.initial_sequence = Some(u64::MAX - 2);
    let factory = MockTransportFactory::new(translated(&["Hallo"]));
    let service = mock_service(&config, &factory);

    for _ in 0..3 {
        assert_eq!(service.translate("Hello", "en", "de").await.unwrap(), "Hallo");
    }

    let ids: Vec<u64> = factory.calls().iter().map(|call| request_id(&call.body)).collect();
    assert_eq!(ids, vec![u64::MAX - 2, u64::MAX - 1, u64::MAX]);
}

#[test]
fn test_translate_fromBlockingContext_shouldWorkWithBlockOn() {
    let factory = MockTransportFactory::new(translated(&["Hola"]));
    let service = mock_service(&test_config(1), &factory);

    let text = tokio_test::block_on(service.translate("Hello", "en", "es")).unwrap();

    assert_eq!(text, "Hola");
    assert_eq!(factory.call_count(), 1);
}
