//! Mock classifiers and loaders for testing
//!
//! Provides configurable mock implementations of the Classifier, ModelLoader
//! and LanguageIdentifier traits, and drives the detection pipeline with them.

use async_trait::async_trait;
use autext_classifiers::{
    Classifier, Detection, Detector, EncodedSequence, Encoder, LanguageIdentifier, LanguageModel,
    ModelLoader, ModelRegistry, ProfileIdentifier, Vocabulary,
};
use autext_core::{Error, Language, Result, ValidationError, MAX_SEQUENCE_LENGTH};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Token that makes [`MockClassifier`] report a confident AI paragraph
const AI_MARKER: &str = "generado";
/// Token that makes [`MockClassifier`] report a human paragraph
const HUMAN_MARKER: &str = "humano";

fn mock_vocabulary() -> Vocabulary {
    Vocabulary::from_json(r#"{"<pad>": 0, "<unk>": 1, "generado": 2, "humano": 3}"#).unwrap()
}

/// A configurable mock classifier for testing
pub struct MockClassifier {
    name: String,
    probability: f32,
    call_count: AtomicU32,
    seen_lengths: Mutex<Vec<usize>>,
}

impl MockClassifier {
    /// Create a new mock classifier with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            probability: 0.5,
            call_count: AtomicU32::new(0),
            seen_lengths: Mutex::new(Vec::new()),
        }
    }

    /// Set the probability returned for paragraphs without a marker token
    pub fn with_probability(mut self, probability: f32) -> Self {
        self.probability = probability;
        self
    }

    /// Get the number of times score was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Widths of every sequence scored so far
    pub fn seen_lengths(&self) -> Vec<usize> {
        self.seen_lengths.lock().unwrap().clone()
    }
}

impl Classifier for MockClassifier {
    fn score(&self, sequence: &EncodedSequence) -> Result<f32> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.seen_lengths.lock().unwrap().push(sequence.len());

        // Dynamic scoring based on marker tokens (for testing)
        let ids = sequence.ids();
        let probability = if ids.contains(&2) {
            0.995
        } else if ids.contains(&3) {
            0.05
        } else {
            self.probability
        };
        Ok(probability)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A classifier that always fails - for testing error paths
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn score(&self, _sequence: &EncodedSequence) -> Result<f32> {
        Err(Error::classifier("Simulated classifier failure"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Loader handing out one shared classifier, counting calls
pub struct MockLoader {
    classifier: Arc<dyn Classifier>,
    calls: AtomicU32,
    failures_left: AtomicU32,
    latency: Option<Duration>,
}

impl MockLoader {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            calls: AtomicU32::new(0),
            failures_left: AtomicU32::new(0),
            latency: None,
        }
    }

    /// Fail the next `count` loads
    pub fn failing(self, count: u32) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// Set simulated load latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for MockLoader {
    async fn load(&self, language: Language) -> Result<LanguageModel> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::load(format!("artifact store unreachable for {}", language)));
        }

        Ok(LanguageModel::new(
            Arc::clone(&self.classifier),
            Arc::new(mock_vocabulary()),
        ))
    }

    fn available_languages(&self) -> Vec<Language> {
        Language::ALL.to_vec()
    }
}

/// Identifier that always reports the same code
pub struct FixedIdentifier(pub &'static str);

impl LanguageIdentifier for FixedIdentifier {
    fn identify(&self, _text: &str) -> Result<Detection> {
        Ok(Detection {
            code: self.0.to_string(),
            confidence: 1.0,
        })
    }
}

const SPANISH: &str = "El gobierno anunció ayer que no va a subir los impuestos este año. La decisión \
    fue tomada después de una larga reunión con los ministros y también con representantes de \
    los sindicatos. Muchos ciudadanos todavía no saben cómo esto va a afectar a su vida diaria, \
    pero la mayoría parece tranquila.";

fn detector_with(
    identifier: Arc<dyn LanguageIdentifier>,
    loader: Arc<MockLoader>,
    languages: Vec<Language>,
) -> Detector {
    Detector::new(
        identifier,
        Arc::new(ModelRegistry::new(loader)),
        Encoder::default(),
        languages,
    )
    .unwrap()
}

fn spanish_detector(classifier: Arc<dyn Classifier>) -> (Detector, Arc<MockLoader>) {
    let loader = Arc::new(MockLoader::new(classifier));
    let detector = detector_with(
        Arc::new(ProfileIdentifier::default()),
        Arc::clone(&loader),
        Language::ALL.to_vec(),
    );
    (detector, loader)
}

#[tokio::test]
async fn test_short_text_is_rejected_without_loading() {
    let (detector, loader) = spanish_detector(Arc::new(MockClassifier::new("mock")));

    let err = detector.analyze("A. B.").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::TooShort { chars: 5 })
    ));
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let (detector, loader) = spanish_detector(Arc::new(MockClassifier::new("mock")));

    let err = detector.analyze("").await.unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::Empty)));
    assert!(err.is_client_error());
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn test_spanish_paragraph_above_threshold_is_all_ai() {
    let classifier = Arc::new(MockClassifier::new("mock").with_probability(0.995));
    let (detector, loader) = spanish_detector(classifier.clone());

    assert!(SPANISH.chars().count() > 250);
    let result = detector.analyze(SPANISH).await.unwrap();

    assert_eq!(result.language, Language::Es);
    assert_eq!(result.analyzed_paragraphs(), 1);
    assert_eq!(result.ai_paragraphs, 1);
    assert_eq!(result.ai_content_percentage, 100.0);
    assert!((result.paragraphs[0].ai_probability - 99.5).abs() < 1e-3);
    assert_eq!(loader.calls(), 1);
    assert_eq!(classifier.call_count(), 1);
}

#[tokio::test]
async fn test_whitespace_only_text_has_no_paragraphs() {
    let classifier = Arc::new(MockClassifier::new("mock"));
    let loader = Arc::new(MockLoader::new(classifier.clone()));
    let detector = detector_with(
        Arc::new(FixedIdentifier("es")),
        loader,
        Language::ALL.to_vec(),
    );

    let text = " \n\n \t ".repeat(60);
    let result = detector.analyze(&text).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.analyzed_paragraphs(), 0);
    assert_eq!(result.ai_content_percentage, 0.0);
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_mixed_paragraphs_aggregate() {
    let classifier = Arc::new(MockClassifier::new("mock").with_probability(0.2));
    let loader = Arc::new(MockLoader::new(classifier.clone()));
    let detector = detector_with(
        Arc::new(FixedIdentifier("es")),
        loader,
        Language::ALL.to_vec(),
    );

    let filler = "palabra ".repeat(12);
    let text = format!(
        "{f} {ai}\n\n{f} {human}\n   \n{f}\r\n\r\n{f} {ai}",
        f = filler,
        ai = AI_MARKER,
        human = HUMAN_MARKER
    );

    let result = detector.analyze(&text).await.unwrap();

    assert_eq!(result.analyzed_paragraphs(), 4);
    assert_eq!(result.ai_paragraphs, 2);
    assert_eq!(result.ai_content_percentage, 50.0);
    let verdicts: Vec<bool> = result.paragraphs.iter().map(|p| p.verdict.is_ai()).collect();
    assert_eq!(verdicts, vec![true, false, false, true]);
    assert!(result
        .paragraphs
        .iter()
        .all(|p| (0.0..=100.0).contains(&p.ai_probability)));
}

#[tokio::test]
async fn test_long_paragraph_is_truncated_to_window() {
    let classifier = Arc::new(MockClassifier::new("mock"));
    let loader = Arc::new(MockLoader::new(classifier.clone()));
    let detector = detector_with(
        Arc::new(FixedIdentifier("ca")),
        loader,
        Language::ALL.to_vec(),
    );

    // The AI marker sits past the 62-token window and must not be seen
    let text = format!("{} {}", "paraula ".repeat(100), AI_MARKER);
    let result = detector.analyze(&text).await.unwrap();

    assert_eq!(classifier.seen_lengths(), vec![MAX_SEQUENCE_LENGTH]);
    assert_eq!(result.ai_paragraphs, 0);
}

#[tokio::test]
async fn test_classifier_failure_propagates() {
    let loader = Arc::new(MockLoader::new(Arc::new(FailingClassifier)));
    let detector = detector_with(
        Arc::new(FixedIdentifier("pt")),
        loader,
        Language::ALL.to_vec(),
    );

    let err = detector.analyze(&"texto ".repeat(60)).await.unwrap_err();
    assert!(matches!(err, Error::Classifier(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_failed_load_fails_request_and_retries_later() {
    let loader = Arc::new(MockLoader::new(Arc::new(MockClassifier::new("mock"))).failing(1));
    let detector = detector_with(
        Arc::new(FixedIdentifier("gl")),
        Arc::clone(&loader),
        Language::ALL.to_vec(),
    );
    let text = "texto ".repeat(60);

    let err = detector.analyze(&text).await.unwrap_err();
    assert!(matches!(err, Error::Load(_)));
    assert!(!detector.registry().is_loaded(Language::Gl));

    detector.analyze(&text).await.unwrap();
    assert_eq!(loader.calls(), 2);
    assert!(detector.registry().is_loaded(Language::Gl));
}

#[tokio::test]
async fn test_concurrent_requests_share_one_load() {
    let loader = Arc::new(
        MockLoader::new(Arc::new(MockClassifier::new("mock")))
            .with_latency(Duration::from_millis(30)),
    );
    let detector = Arc::new(detector_with(
        Arc::new(FixedIdentifier("eu")),
        Arc::clone(&loader),
        Language::ALL.to_vec(),
    ));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let detector = Arc::clone(&detector);
            tokio::spawn(async move { detector.analyze(&"testu ".repeat(60)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn test_language_outside_enabled_set_is_unsupported() {
    let loader = Arc::new(MockLoader::new(Arc::new(MockClassifier::new("mock"))));
    let detector = detector_with(
        Arc::new(FixedIdentifier("es")),
        Arc::clone(&loader),
        vec![Language::En, Language::Ca],
    );

    let err = detector.analyze(SPANISH).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedLanguage(ref code) if code == "es"));
    assert!(err.is_client_error());
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn test_unknown_code_from_identifier_is_unsupported() {
    let loader = Arc::new(MockLoader::new(Arc::new(MockClassifier::new("mock"))));
    let detector = detector_with(
        Arc::new(FixedIdentifier("fr")),
        Arc::clone(&loader),
        Language::ALL.to_vec(),
    );

    let err = detector.analyze(SPANISH).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedLanguage(_)));
    assert_eq!(loader.calls(), 0);
}
