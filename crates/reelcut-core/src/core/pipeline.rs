//! Highlight Pipeline
//!
//! Orchestrates one transcript-to-timeline run:
//!
//! ```text
//! WindowPlanner -> ClassificationDispatcher ─┐
//! SilenceDetector (media) ───────────────────┼─> build_intervals -> [KeyframeAligner]
//! KeyframeProbe (media, lossless only) ──────┘
//! ```
//!
//! Classification and the media probes have no data dependency on each other
//! and run concurrently; the first failure cancels the rest.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::captions::group_by_boundaries;
use crate::core::config::{CutMode, PipelineConfig};
use crate::core::ffmpeg::{
    lossless_trim_args, select_filter_expression, KeyframeProbe, SilenceDetector,
};
use crate::core::selection::{
    ClassificationContext, ClassificationDispatcher, Classifier, SelectionIndexSet, WindowPlanner,
};
use crate::core::timeline::{build_intervals, KeyframeAligner, KeyframeCut};
use crate::core::{CoreError, CoreResult, Cue, Interval, Keyframe, SilenceMidpoint};

// =============================================================================
// Outcome
// =============================================================================

/// Timeline produced by a successful run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightTimeline {
    /// Cue indices chosen by the classifier
    pub selected: SelectionIndexSet,
    /// Sorted, non-overlapping intervals to keep
    pub intervals: Vec<Interval>,
    /// Keyframe-aligned cuts; empty unless the run used lossless cutting
    pub cuts: Vec<KeyframeCut>,
}

impl HighlightTimeline {
    /// `select`/`aselect` predicate for frame-accurate re-encoding
    pub fn select_expression(&self) -> String {
        select_filter_expression(&self.intervals)
    }

    /// Per-cut seek arguments for stream-copy trimming
    pub fn lossless_args(&self) -> Vec<Vec<String>> {
        self.cuts.iter().map(lossless_trim_args).collect()
    }
}

/// Result of a pipeline run
#[derive(Clone, Debug, PartialEq)]
pub enum HighlightOutcome {
    /// No window selected any cue
    NothingSelected,
    Timeline(HighlightTimeline),
}

impl HighlightOutcome {
    pub fn is_nothing_selected(&self) -> bool {
        matches!(self, Self::NothingSelected)
    }

    /// Returns the timeline, treating an empty selection as an error
    pub fn into_timeline(self) -> CoreResult<HighlightTimeline> {
        match self {
            Self::NothingSelected => Err(CoreError::EmptySelection),
            Self::Timeline(timeline) => Ok(timeline),
        }
    }

    /// Returns the interval list, treating an empty selection as an error
    pub fn into_intervals(self) -> CoreResult<Vec<Interval>> {
        self.into_timeline().map(|t| t.intervals)
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Transcript-to-timeline pipeline with injected collaborators
#[derive(Clone)]
pub struct HighlightPipeline {
    config: PipelineConfig,
    classifier: Arc<dyn Classifier>,
    silence_detector: Option<Arc<dyn SilenceDetector>>,
    keyframe_probe: Option<Arc<dyn KeyframeProbe>>,
}

impl HighlightPipeline {
    pub fn new(config: PipelineConfig, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            config,
            classifier,
            silence_detector: None,
            keyframe_probe: None,
        }
    }

    pub fn with_silence_detector(mut self, detector: Arc<dyn SilenceDetector>) -> Self {
        self.silence_detector = Some(detector);
        self
    }

    pub fn with_keyframe_probe(mut self, probe: Arc<dyn KeyframeProbe>) -> Self {
        self.keyframe_probe = Some(probe);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the pipeline over `cues`.
    ///
    /// Silence snapping needs both `media` and a detector, and is skipped
    /// when `silence.enabled` is false. Keyframe alignment additionally
    /// requires `cutMode = lossless`.
    pub async fn run(
        &self,
        cues: &[Cue],
        context: &ClassificationContext,
        media: Option<&Path>,
    ) -> CoreResult<HighlightOutcome> {
        self.config.validate()?;
        let windows = WindowPlanner::from_config(&self.config.windowing)?.plan(cues.len());
        let dispatcher = ClassificationDispatcher::new(
            Arc::clone(&self.classifier),
            self.config.dispatch.max_workers,
        );

        info!(
            cues = cues.len(),
            windows = windows.len(),
            media = media.map(|m| m.display().to_string()).unwrap_or_default(),
            cut_mode = ?self.config.cut_mode,
            "Starting highlight pipeline"
        );

        let (selected, midpoints, keyframes) = tokio::try_join!(
            dispatcher.dispatch(cues, &windows, context),
            self.detect_silences(media),
            self.probe_keyframes(media),
        )?;

        if selected.is_empty() {
            info!("Classifier selected nothing");
            return Ok(HighlightOutcome::NothingSelected);
        }

        let intervals = build_intervals(
            cues,
            selected.as_slice(),
            midpoints.as_deref(),
            &self.config.tolerances,
        );

        let cuts = match keyframes {
            Some(keyframes) => {
                KeyframeAligner::from_config(keyframes, &self.config.tolerances).align_all(&intervals)
            }
            None => Vec::new(),
        };

        info!(
            selected = selected.len(),
            intervals = intervals.len(),
            cuts = cuts.len(),
            "Highlight pipeline finished"
        );

        Ok(HighlightOutcome::Timeline(HighlightTimeline {
            selected,
            intervals,
            cuts,
        }))
    }

    async fn detect_silences(&self, media: Option<&Path>) -> CoreResult<Option<Vec<SilenceMidpoint>>> {
        match (&self.silence_detector, media) {
            (Some(detector), Some(media)) if self.config.silence.enabled => {
                let midpoints = detector.detect(media, &self.config.silence).await?;
                debug!(midpoints = midpoints.len(), "Silence detection finished");
                Ok(Some(midpoints))
            }
            _ => Ok(None),
        }
    }

    async fn probe_keyframes(&self, media: Option<&Path>) -> CoreResult<Option<Vec<Keyframe>>> {
        match (&self.keyframe_probe, media) {
            (Some(probe), Some(media)) if self.config.cut_mode == CutMode::Lossless => {
                probe.keyframes(media).await.map(Some)
            }
            _ => Ok(None),
        }
    }
}

/// Regroups word-level cues into phrases using a phrase-boundary classifier.
///
/// The classifier returns the indices of phrase-final words; they are
/// dispatched with the same windowing and worker limit as highlight
/// selection.
pub async fn group_by_classified_boundaries(
    words: &[Cue],
    classifier: Arc<dyn Classifier>,
    config: &PipelineConfig,
    context: &ClassificationContext,
) -> CoreResult<Vec<Cue>> {
    config.validate()?;
    let windows = WindowPlanner::from_config(&config.windowing)?.plan(words.len());
    let ends = ClassificationDispatcher::new(classifier, config.dispatch.max_workers)
        .dispatch(words, &windows, context)
        .await?;
    Ok(group_by_boundaries(words, ends.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SilenceConfig;
    use crate::core::selection::WindowRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Selects every cue whose text is in `keep`
    struct KeywordClassifier {
        keep: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl KeywordClassifier {
        fn new(keep: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                keep,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Classifier for KeywordClassifier {
        async fn classify(
            &self,
            request: &WindowRequest,
            _context: &ClassificationContext,
        ) -> CoreResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let indices: Vec<usize> = request
                .indexed_cues()
                .filter(|(_, cue)| self.keep.contains(&cue.text.as_str()))
                .map(|(i, _)| i)
                .collect();
            Ok(serde_json::json!({ "result": { "indices": indices } }).to_string())
        }
    }

    struct FixedSilences(Vec<SilenceMidpoint>);

    #[async_trait]
    impl SilenceDetector for FixedSilences {
        async fn detect(
            &self,
            _media: &Path,
            _config: &SilenceConfig,
        ) -> CoreResult<Vec<SilenceMidpoint>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSilences;

    #[async_trait]
    impl SilenceDetector for FailingSilences {
        async fn detect(
            &self,
            _media: &Path,
            _config: &SilenceConfig,
        ) -> CoreResult<Vec<SilenceMidpoint>> {
            Err(CoreError::FFmpeg("silencedetect failed".to_string()))
        }
    }

    struct FixedKeyframes(Vec<Keyframe>);

    #[async_trait]
    impl KeyframeProbe for FixedKeyframes {
        async fn keyframes(&self, _media: &Path) -> CoreResult<Vec<Keyframe>> {
            Ok(self.0.clone())
        }
    }

    fn two_cues() -> Vec<Cue> {
        vec![Cue::new("a", 0.0, 2.0), Cue::new("b", 2.5, 4.0)]
    }

    fn context() -> ClassificationContext {
        ClassificationContext::new("Talk", "A talk.")
    }

    // -------------------------------------------------------------------------
    // End to end
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_run_snaps_to_silences_then_merges() {
        let pipeline = HighlightPipeline::new(
            PipelineConfig::default(),
            KeywordClassifier::new(vec!["a", "b"]),
        )
        .with_silence_detector(Arc::new(FixedSilences(vec![1.9, 2.6])));

        let outcome = pipeline
            .run(&two_cues(), &context(), Some(Path::new("talk.mp4")))
            .await
            .unwrap();

        let timeline = outcome.into_timeline().unwrap();
        assert_eq!(timeline.selected.as_slice(), &[0, 1]);
        assert_eq!(timeline.intervals, vec![Interval::new(0.0, 4.0)]);
        assert!(timeline.cuts.is_empty());
        assert_eq!(timeline.select_expression(), "between(t,0,4)");
    }

    #[tokio::test]
    async fn test_run_without_media_skips_snapping() {
        let pipeline = HighlightPipeline::new(
            PipelineConfig::default(),
            KeywordClassifier::new(vec!["a", "b"]),
        )
        .with_silence_detector(Arc::new(FixedSilences(vec![1.9, 2.6])));

        let intervals = pipeline
            .run(&two_cues(), &context(), None)
            .await
            .unwrap()
            .into_intervals()
            .unwrap();
        assert_eq!(
            intervals,
            vec![Interval::new(0.0, 2.0), Interval::new(2.5, 4.0)]
        );
    }

    #[tokio::test]
    async fn test_run_silence_disabled() {
        let mut config = PipelineConfig::default();
        config.silence.enabled = false;
        let pipeline = HighlightPipeline::new(config, KeywordClassifier::new(vec!["a", "b"]))
            .with_silence_detector(Arc::new(FailingSilences));

        let intervals = pipeline
            .run(&two_cues(), &context(), Some(Path::new("talk.mp4")))
            .await
            .unwrap()
            .into_intervals()
            .unwrap();
        assert_eq!(intervals.len(), 2);
    }

    #[tokio::test]
    async fn test_run_lossless_aligns_cuts() {
        let config = PipelineConfig {
            cut_mode: CutMode::Lossless,
            ..Default::default()
        };
        let cues = vec![Cue::new("a", 1.0, 2.0), Cue::new("b", 5.5, 7.0)];
        let pipeline = HighlightPipeline::new(config, KeywordClassifier::new(vec!["a", "b"]))
            .with_keyframe_probe(Arc::new(FixedKeyframes(vec![0.0, 4.0, 6.0])));

        let timeline = pipeline
            .run(&cues, &context(), Some(Path::new("talk.mp4")))
            .await
            .unwrap()
            .into_timeline()
            .unwrap();

        assert_eq!(timeline.cuts.len(), 2);
        assert_eq!(timeline.cuts[0].start, 0.0);
        assert_eq!(timeline.cuts[0].duration, 2.0);
        assert_eq!(timeline.cuts[1].start, 4.0);
        assert_eq!(timeline.cuts[1].end, 7.0);
        assert_eq!(timeline.lossless_args()[1], vec!["-ss", "4.000", "-t", "3.000"]);
    }

    #[tokio::test]
    async fn test_run_lossless_cuts_never_overlap() {
        let config = PipelineConfig {
            cut_mode: CutMode::Lossless,
            ..Default::default()
        };
        // Both intervals pull back to the keyframe at 4.0.
        let cues = vec![Cue::new("a", 4.5, 5.0), Cue::new("b", 5.5, 7.0)];
        let pipeline = HighlightPipeline::new(config, KeywordClassifier::new(vec!["a", "b"]))
            .with_keyframe_probe(Arc::new(FixedKeyframes(vec![0.0, 4.0, 10.0])));

        let timeline = pipeline
            .run(&cues, &context(), Some(Path::new("talk.mp4")))
            .await
            .unwrap()
            .into_timeline()
            .unwrap();

        assert_eq!(
            timeline.intervals,
            vec![Interval::new(4.5, 5.0), Interval::new(5.5, 7.0)]
        );
        assert_eq!(
            timeline.cuts,
            vec![KeyframeCut {
                start: 4.0,
                end: 7.0,
                duration: 3.0,
            }]
        );
        assert!(timeline.cuts.windows(2).all(|w| w[1].start > w[0].end));
        assert_eq!(timeline.lossless_args(), vec![vec!["-ss", "4.000", "-t", "3.000"]]);
    }

    #[tokio::test]
    async fn test_run_reencode_ignores_keyframe_probe() {
        let pipeline = HighlightPipeline::new(
            PipelineConfig::default(),
            KeywordClassifier::new(vec!["a"]),
        )
        .with_keyframe_probe(Arc::new(FixedKeyframes(vec![0.0])));

        let timeline = pipeline
            .run(&two_cues(), &context(), Some(Path::new("talk.mp4")))
            .await
            .unwrap()
            .into_timeline()
            .unwrap();
        assert!(timeline.cuts.is_empty());
    }

    // -------------------------------------------------------------------------
    // Outcomes and errors
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_nothing_selected_is_distinct_outcome() {
        let pipeline =
            HighlightPipeline::new(PipelineConfig::default(), KeywordClassifier::new(vec![]));

        let outcome = pipeline.run(&two_cues(), &context(), None).await.unwrap();
        assert!(outcome.is_nothing_selected());
        assert!(matches!(
            outcome.into_intervals(),
            Err(CoreError::EmptySelection)
        ));
    }

    #[tokio::test]
    async fn test_empty_transcript_selects_nothing() {
        let classifier = KeywordClassifier::new(vec!["a"]);
        let pipeline = HighlightPipeline::new(PipelineConfig::default(), classifier.clone());

        let outcome = pipeline.run(&[], &context(), None).await.unwrap();
        assert!(outcome.is_nothing_selected());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_windowing_fails_before_dispatch() {
        let mut config = PipelineConfig::default();
        config.windowing.chunk_size = 10;
        config.windowing.overlap = 25;
        let classifier = KeywordClassifier::new(vec!["a"]);
        let pipeline = HighlightPipeline::new(config, classifier.clone());

        let result = pipeline.run(&two_cues(), &context(), None).await;
        assert!(matches!(result, Err(CoreError::Configuration(_))));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_silence_failure_fails_run() {
        let pipeline = HighlightPipeline::new(
            PipelineConfig::default(),
            KeywordClassifier::new(vec!["a"]),
        )
        .with_silence_detector(Arc::new(FailingSilences));

        let result = pipeline
            .run(&two_cues(), &context(), Some(Path::new("talk.mp4")))
            .await;
        assert!(matches!(result, Err(CoreError::FFmpeg(_))));
    }

    #[test]
    fn test_timeline_serializes_intervals() {
        let timeline = HighlightTimeline {
            selected: [0usize, 1].into_iter().collect(),
            intervals: vec![Interval::new(0.0, 4.0)],
            cuts: vec![],
        };
        let json = serde_json::to_value(&timeline).unwrap();
        assert_eq!(json["selected"], serde_json::json!([0, 1]));
        assert_eq!(
            json["intervals"],
            serde_json::json!([{ "start": 0.0, "end": 4.0 }])
        );
    }

    // -------------------------------------------------------------------------
    // Phrase regrouping
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_group_by_classified_boundaries() {
        let words = vec![
            Cue::new("I", 0.0, 0.1),
            Cue::new("agree.", 0.1, 0.4),
            Cue::new("Me", 0.6, 0.7),
            Cue::new("too.", 0.7, 0.9),
        ];
        let classifier = KeywordClassifier::new(vec!["agree.", "too."]);

        let phrases = group_by_classified_boundaries(
            &words,
            classifier,
            &PipelineConfig::default(),
            &context(),
        )
        .await
        .unwrap();

        assert_eq!(
            phrases,
            vec![Cue::new("I agree.", 0.0, 0.4), Cue::new("Me too.", 0.6, 0.9)]
        );
    }
}
