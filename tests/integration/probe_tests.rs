/*!
 * Integration tests for the endpoint health probe
 */

use pooltrans::errors::{AttemptError, TranslationError};
use pooltrans::transport::{MockReply, MockTransportFactory};

use crate::common::{INITIAL_SEQUENCE, mock_service, test_config, translated};

#[tokio::test]
async fn test_probe_shouldTryEveryEndpointExactlyOnce() {
    let factory = MockTransportFactory::new(translated(&["Hallo"]))
        .reply_for("10.0.0.2:3128", MockReply::unavailable());
    let service = mock_service(&test_config(3), &factory);

    let reports = service.probe("en", "de").await.unwrap();

    assert_eq!(reports.len(), 4);
    assert_eq!(factory.call_count(), 4);

    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| r.outcome.is_err())
        .map(|r| r.endpoint.as_str())
        .collect();
    assert_eq!(failed, vec!["10.0.0.2:3128"]);
    assert!(matches!(
        reports[1].outcome,
        Err(AttemptError::TransportFailure { status: Some(503), .. })
    ));

    assert_eq!(reports.iter().filter(|r| r.primary).count(), 1);
    assert!(reports[3].primary);

    for endpoint in service.pool().attempt_order() {
        assert_eq!(endpoint.sequence().await, INITIAL_SEQUENCE + 1);
    }
}

#[tokio::test]
async fn test_probe_withInvalidLanguage_shouldFailBeforeNetwork() {
    let factory = MockTransportFactory::new(translated(&["Hallo"]));
    let service = mock_service(&test_config(1), &factory);

    let result = service.probe("en", "12").await;

    assert!(matches!(result, Err(TranslationError::Language(_))));
    assert_eq!(factory.call_count(), 0);
}
