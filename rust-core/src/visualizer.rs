//! Acquire → analyze → aggregate → render → display
//!
//! `Visualizer` owns everything that survives between frames: the cached
//! band layout, the FFT plan and the selected renderer. Each chunk flows
//! through once and leaves nothing behind but the frame handed to the sink.

use crate::audio::SpectrumSource;
use crate::bands::BandLayout;
use crate::config::VisualizerConfig;
use crate::display::DisplaySink;
use crate::error::VizError;
use crate::render::{build_renderer, Frame, RenderStyle, Renderer};
use crate::spectrum::{AnalyzerConfig, SpectrumAnalyzer};
use log::{debug, error, info};

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Source ran out of full chunks
    EndOfStream,
    /// Sink reported a close request
    SinkClosed,
    /// Source failed mid-session; the read is not retried
    SourceFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: usize,
    pub reason: StopReason,
}

pub struct Visualizer {
    config: VisualizerConfig,
    layout: BandLayout,
    analyzer: SpectrumAnalyzer,
    renderer: Box<dyn Renderer>,
}

impl Visualizer {
    /// Validate `config` and build the pipeline
    pub fn new(config: VisualizerConfig) -> Result<Self, VizError> {
        config.validate()?;

        let layout = BandLayout::new(config.frequencies.clone(), config.sample_rate, config.chunk_size);
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig {
            chunk_size: config.chunk_size,
            window_type: config.window,
        });
        let renderer = build_renderer(&config, layout.band_count())?;

        debug!(
            "{} renderer, {} bands, ranges {:?}",
            config.style,
            layout.band_count(),
            layout.ranges()
        );

        Ok(Self {
            config,
            layout,
            analyzer,
            renderer,
        })
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    pub fn style(&self) -> RenderStyle {
        self.renderer.style()
    }

    /// Switch to another render style
    pub fn set_style(&mut self, style: RenderStyle) -> Result<(), VizError> {
        let config = VisualizerConfig {
            style,
            ..self.config.clone()
        };
        config.validate()?;

        self.renderer = build_renderer(&config, self.layout.band_count())?;
        self.config = config;
        Ok(())
    }

    /// Replace the band definition; the layout is recomputed immediately
    pub fn set_frequencies(&mut self, frequencies: Vec<f64>) -> Result<(), VizError> {
        let config = VisualizerConfig {
            frequencies: frequencies.clone(),
            ..self.config.clone()
        };
        config.validate()?;

        self.renderer = build_renderer(&config, config.band_count())?;
        self.layout.set_frequencies(frequencies);
        self.config = config;
        Ok(())
    }

    /// Adopt a source's sample rate and chunk size
    pub fn set_format(&mut self, sample_rate: u32, chunk_size: usize) -> Result<(), VizError> {
        let config = VisualizerConfig {
            sample_rate,
            chunk_size,
            ..self.config.clone()
        };
        config.validate()?;

        self.layout.set_format(sample_rate, chunk_size);
        self.analyzer.update_config(AnalyzerConfig {
            chunk_size,
            window_type: config.window,
        });
        self.config = config;
        Ok(())
    }

    /// Per-band peak magnitudes of one chunk
    pub fn band_magnitudes(&mut self, chunk: &[i16]) -> Vec<f64> {
        let spectrum = self.analyzer.analyze(chunk);
        self.layout.magnitudes(&spectrum)
    }

    /// Render one chunk at display size (zoom applied)
    pub fn render_chunk(&mut self, chunk: &[i16]) -> Frame {
        let magnitudes = self.band_magnitudes(chunk);
        self.renderer.render(&magnitudes).upscale(self.config.zoom)
    }

    /// Drive the pipeline until the source ends or the sink closes
    pub fn run<S, D>(&mut self, source: &mut S, sink: &mut D) -> Result<SessionSummary, VizError>
    where
        S: SpectrumSource + ?Sized,
        D: DisplaySink + ?Sized,
    {
        self.set_format(source.sample_rate(), source.chunk_size())?;
        info!(
            "session started: {} Hz, {} samples per chunk, {} style",
            source.sample_rate(),
            source.chunk_size(),
            self.style()
        );

        let mut frames = 0;
        let reason = loop {
            let chunk = match source.next_chunk() {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break StopReason::EndOfStream,
                Err(e) => {
                    error!("source failed: {}", e);
                    break StopReason::SourceFailed(e.to_string());
                }
            };

            sink.present(self.render_chunk(&chunk))?;
            frames += 1;

            if sink.poll_closed() {
                break StopReason::SinkClosed;
            }
        };

        info!("session ended after {} frame(s): {:?}", frames, reason);
        Ok(SessionSummary { frames, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MemorySource;
    use crate::bands::{compute_band_ranges, BandRange, SILENCE_MAGNITUDE};
    use std::f64::consts::PI;
    use crate::display::MemorySink;

    fn small_config() -> VisualizerConfig {
        VisualizerConfig {
            chunk_size: 256,
            sample_rate: 8000,
            zoom: 1,
            ..VisualizerConfig::default()
        }
    }

    #[test]
    fn test_frequency_change_invalidates_layout() {
        let mut viz = Visualizer::new(small_config()).unwrap();
        let before = viz.layout().ranges().to_vec();

        viz.set_frequencies(vec![400.0, 1200.0]).unwrap();
        assert_ne!(viz.layout().ranges(), before.as_slice());
        assert_eq!(
            viz.layout().ranges(),
            compute_band_ranges(&[400.0, 1200.0], 8000, 256).as_slice()
        );

        let frame = viz.render_chunk(&vec![0; 256]);
        assert_eq!(frame.lit_count(), 3 * (200 / 3));
    }

    #[test]
    fn test_rejected_frequencies_keep_old_layout() {
        let mut viz = Visualizer::new(small_config()).unwrap();
        let before = viz.layout().ranges().to_vec();

        assert!(viz.set_frequencies(vec![]).is_err());
        assert_eq!(viz.layout().ranges(), before.as_slice());
    }

    #[test]
    fn test_zero_hz_band_renders_silence_floor() {
        let config = VisualizerConfig {
            frequencies: vec![0.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2000.0],
            ..small_config()
        };
        let mut viz = Visualizer::new(config).unwrap();
        assert_eq!(viz.layout().ranges()[0], BandRange::new(0, 0));

        let chunk: Vec<i16> = (0..256)
            .map(|n| (20000.0 * (2.0 * PI * 1500.0 * n as f64 / 8000.0).sin()) as i16)
            .collect();
        let magnitudes = viz.band_magnitudes(&chunk);
        assert_eq!(magnitudes[0], SILENCE_MAGNITUDE);

        // One-pixel floor bar in the first band's column
        let frame = viz.render_chunk(&chunk);
        assert!(frame.get(0, 79) > 0);
        assert_eq!(frame.get(0, 78), 0);
    }

    #[test]
    fn test_run_follows_source_format() {
        let mut viz = Visualizer::new(small_config()).unwrap();
        let mut source = MemorySource::new(vec![0; 3 * 512 + 100], 16000, 512).unwrap();
        let mut sink = MemorySink::new();

        let summary = viz.run(&mut source, &mut sink).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.reason, StopReason::EndOfStream);
        assert_eq!(viz.layout().sample_rate(), 16000);
        assert_eq!(viz.layout().chunk_size(), 512);
        assert_eq!(viz.layout().ranges().last().unwrap().end, 256);
    }

    #[test]
    fn test_sink_close_stops_immediately() {
        let mut viz = Visualizer::new(small_config()).unwrap();
        let mut source = MemorySource::new(vec![0; 10 * 256], 8000, 256).unwrap();
        let mut sink = MemorySink::closing_after(4);

        let summary = viz.run(&mut source, &mut sink).unwrap();
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.reason, StopReason::SinkClosed);
        assert_eq!(source.remaining_chunks(), 6);
    }

    #[test]
    fn test_zoom_applied_to_frames() {
        let config = VisualizerConfig {
            zoom: 2,
            ..small_config()
        };
        let mut viz = Visualizer::new(config).unwrap();
        let frame = viz.render_chunk(&vec![0; 256]);

        assert_eq!((frame.width(), frame.height()), (400, 160));
    }

    #[test]
    fn test_style_switch() {
        let mut viz = Visualizer::new(small_config()).unwrap();
        viz.set_style(RenderStyle::RadialBars).unwrap();
        assert_eq!(viz.style(), RenderStyle::RadialBars);

        let frame = viz.render_chunk(&vec![0; 256]);
        assert_eq!(frame.width(), frame.height());
    }
}
