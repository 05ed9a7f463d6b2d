//! Integration Tests for the Inference Engine
//!
//! Engine + schema + preprocessing + stub models, end to end.

#[cfg(test)]
mod engine_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use ndarray::{array, ArrayView3};

    use crate::logic::features::{
        FeatureKind, FeatureSchema, FeatureSpec, FeatureValue, SchemaError, TelemetryRecord,
    };
    use crate::logic::model::{
        EngineError, FnModel, InferenceEngine, Model, ModelError, Postprocessor, Preprocessor,
        Score, ScalerStats,
    };

    fn schema() -> FeatureSchema {
        FeatureSchema::new(
            1,
            vec![
                FeatureSpec::new("power", FeatureKind::Float),
                FeatureSpec::new("charging", FeatureKind::Boolean),
            ],
        )
        .unwrap()
    }

    fn record(ts: &str, power: f64, charging: &str) -> TelemetryRecord {
        TelemetryRecord::from_pairs(
            ts,
            [
                ("power", FeatureValue::Float(power)),
                ("charging", FeatureValue::Text(charging.to_string())),
            ],
        )
    }

    /// Sum of the whole (already standardized) window
    fn sum_model() -> Arc<dyn Model> {
        Arc::new(FnModel::new("sum", |input: ArrayView3<'_, f32>| {
            Ok(input.outer_iter().map(|w| w.sum()).collect())
        }))
    }

    fn engine(history: usize, post: Option<Postprocessor>, model: Arc<dyn Model>) -> InferenceEngine {
        let pre = Preprocessor::new(ScalerStats::identity(2)).unwrap();
        InferenceEngine::new("test", schema(), history, pre, post, model).unwrap()
    }

    #[test]
    fn test_warmup_then_sliding_scores() {
        let engine = engine(3, None, sum_model());

        assert_eq!(engine.step("agv", &record("t1", 1.0, "false")).unwrap(), None);
        assert_eq!(engine.step("agv", &record("t2", 2.0, "false")).unwrap(), None);
        assert_eq!(
            engine.step("agv", &record("t3", 3.0, "true")).unwrap(),
            Some(Score::Value(7.0))
        );

        // Oldest row (1.0) drops out
        assert_eq!(
            engine.step("agv", &record("t4", 4.0, "false")).unwrap(),
            Some(Score::Value(10.0))
        );
    }

    #[test]
    fn test_window_reaches_model_in_arrival_order() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let model = Arc::new(FnModel::new("capture", move |input: ArrayView3<'_, f32>| {
            sink.lock().push(input.to_owned());
            Ok(vec![0.0])
        }));

        let engine = engine(2, None, model);
        engine.step("agv", &record("t1", 5.0, "true")).unwrap();
        engine.step("agv", &record("t2", 6.0, "false")).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], array![[[5.0, 1.0], [6.0, 0.0]]]);
    }

    #[test]
    fn test_regression_output_is_inverted() {
        let post = Postprocessor::new(331.105838, 73.6188028);
        let model = Arc::new(FnModel::new("one", |_: ArrayView3<'_, f32>| Ok(vec![1.0])));
        let engine = engine(1, Some(post), model);

        let score = engine.step("agv", &record("t1", 0.0, "false")).unwrap().unwrap();
        assert!((score.value() - 404.7246408).abs() < 1e-3);
        assert!(engine.is_regression());
    }

    #[test]
    fn test_classifier_label_passes_through() {
        let model = Arc::new(FnModel::new("label", |_: ArrayView3<'_, f32>| Ok(vec![2.0])));
        let engine = engine(1, None, model);

        let record = record("t1", 0.0, "false");
        assert_eq!(engine.score_record(&record).unwrap(), Score::Value(2.0));
        // Stateless path leaves no buffers behind
        assert_eq!(engine.entity_count(), 0);
    }

    #[test]
    fn test_failing_model_degrades_instead_of_erroring() {
        let model = Arc::new(FnModel::new("broken", |_: ArrayView3<'_, f32>| {
            Err(ModelError::Inference("boom".to_string()))
        }));
        let engine = engine(1, None, model);

        let score = engine.step("agv", &record("t1", 1.0, "true")).unwrap();
        assert_eq!(score, Some(Score::Degraded));
        assert_eq!(engine.status().degraded_count, 1);
    }

    #[test]
    fn test_non_finite_output_degrades() {
        let model = Arc::new(FnModel::new("nan", |_: ArrayView3<'_, f32>| Ok(vec![f32::NAN])));
        let engine = engine(1, None, model);
        assert_eq!(
            engine.step("agv", &record("t1", 1.0, "true")).unwrap(),
            Some(Score::Degraded)
        );

        let empty = Arc::new(FnModel::new("empty", |_: ArrayView3<'_, f32>| Ok(Vec::new())));
        let engine = self::engine(1, None, empty);
        assert_eq!(
            engine.step("agv", &record("t1", 1.0, "true")).unwrap(),
            Some(Score::Degraded)
        );
    }

    #[test]
    fn test_genuine_zero_is_not_degraded() {
        let model = Arc::new(FnModel::new("zero", |_: ArrayView3<'_, f32>| Ok(vec![0.0])));
        let engine = engine(1, None, model);

        let score = engine.step("agv", &record("t1", 1.0, "true")).unwrap().unwrap();
        assert_eq!(score.value(), 0.0);
        assert!(!score.is_degraded());
        assert_eq!(Score::Degraded.value(), 0.0);
        assert_ne!(score, Score::Degraded);
    }

    #[test]
    fn test_payload_scoring() {
        let engine = engine(2, None, sum_model());

        assert_eq!(engine.score_payload("[[1, 0], [2, 1]]"), Score::Value(4.0));
        // Malformed JSON, wrong H, ragged rows
        assert_eq!(engine.score_payload("not json"), Score::Degraded);
        assert_eq!(engine.score_payload("[[1, 0]]"), Score::Degraded);
        assert_eq!(engine.score_payload("[[1, 0], [2]]"), Score::Degraded);
        assert_eq!(engine.status().degraded_count, 3);
        assert_eq!(engine.status().inference_count, 4);

        assert_eq!(engine.score_missing_payload(), Score::Degraded);
        assert_eq!(engine.status().degraded_count, 4);
    }

    #[test]
    fn test_schema_errors_propagate_without_touching_buffer() {
        let engine = engine(2, None, sum_model());

        let missing = TelemetryRecord::from_pairs("t1", [("power", FeatureValue::Float(1.0))]);
        let err = engine.step("agv", &missing).unwrap_err();
        assert!(matches!(err, SchemaError::MissingFeature { ref feature } if feature == "charging"));

        let bad = TelemetryRecord::from_pairs(
            "t1",
            [
                ("power", FeatureValue::Text("n/a".to_string())),
                ("charging", FeatureValue::Integer(0)),
            ],
        );
        assert!(matches!(
            engine.step("agv", &bad),
            Err(SchemaError::Uncoercible { .. })
        ));

        let extra = TelemetryRecord::from_pairs(
            "t1",
            [
                ("power", FeatureValue::Float(1.0)),
                ("charging", FeatureValue::Integer(0)),
                ("agv_type", FeatureValue::Text("v1".to_string())),
            ],
        );
        assert!(matches!(
            engine.step("agv", &extra),
            Err(SchemaError::UnexpectedFeature { ref field }) if field == "agv_type"
        ));

        assert!(engine.buffer_status("agv").is_none());
    }

    #[test]
    fn test_entities_have_independent_windows() {
        let engine = engine(2, None, sum_model());

        assert_eq!(engine.step("a", &record("t1", 1.0, "false")).unwrap(), None);
        assert_eq!(engine.step("b", &record("t1", 10.0, "false")).unwrap(), None);
        assert_eq!(
            engine.step("a", &record("t2", 2.0, "false")).unwrap(),
            Some(Score::Value(3.0))
        );
        assert_eq!(
            engine.step("b", &record("t2", 20.0, "false")).unwrap(),
            Some(Score::Value(30.0))
        );
        assert_eq!(engine.entity_count(), 2);
    }

    #[test]
    fn test_end_session_resets_window() {
        let engine = engine(2, None, sum_model());
        engine.step("agv", &record("t1", 1.0, "false")).unwrap();

        let status = engine.buffer_status("agv").unwrap();
        assert_eq!(status.current_size, 1);
        assert!(!status.is_ready);

        assert!(engine.end_session("agv"));
        assert!(!engine.end_session("agv"));
        assert_eq!(engine.step("agv", &record("t2", 2.0, "false")).unwrap(), None);
    }

    #[test]
    fn test_concurrent_steps_on_one_entity_are_serialized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let model = Arc::new(FnModel::new("count", move |_: ArrayView3<'_, f32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0])
        }));
        let engine = Arc::new(engine(4, None, model));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        let ts = format!("t{}-{}", i, j);
                        engine.step("agv", &record(&ts, 1.0, "false")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // 80 pushes into one H=4 window: only the first 3 warm up
        assert_eq!(calls.load(Ordering::SeqCst), 77);
        assert_eq!(engine.buffer_status("agv").unwrap().current_size, 4);
    }

    #[test]
    fn test_constructor_checks() {
        let pre = Preprocessor::new(ScalerStats::identity(2)).unwrap();
        assert!(matches!(
            InferenceEngine::new("x", schema(), 0, pre, None, sum_model()),
            Err(EngineError::ZeroHistory)
        ));

        let pre = Preprocessor::new(ScalerStats::identity(3)).unwrap();
        assert!(matches!(
            InferenceEngine::new("x", schema(), 1, pre, None, sum_model()),
            Err(EngineError::FeatureCountMismatch { schema: 2, stats: 3 })
        ));
    }

    #[test]
    fn test_status_reports_shape() {
        let engine = engine(3, None, sum_model());
        let status = engine.status();

        assert_eq!(status.model_name, "sum");
        assert_eq!(status.history, 3);
        assert_eq!(status.feature_count, 2);
        assert_eq!(status.layout_hash, engine.schema().layout_hash());
        assert_eq!(status.inference_count, 0);
        assert_eq!(status.avg_latency_ms, 0.0);
    }
}
