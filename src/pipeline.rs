//! Per-frame pipeline: acquire -> mirror/resize -> detect -> classify ->
//! zone check -> key dispatch -> annotate -> JPEG encode -> multipart part.
//!
//! One frame is fully processed before the next is read; the blocking
//! camera read is the only pacing point. All collaborators are capability
//! objects so the whole pipeline runs against fakes in tests.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use opencv::core::{Mat, Size, Vector};
use opencv::prelude::*;
use opencv::{imgcodecs, imgproc};

use crate::camera::VideoSource;
use crate::config::{ControlConfig, StreamConfig};
use crate::control::{detect_zone, DispatchGate, KeySink, NavCommand, NavKey};
use crate::pose::{classify, LandmarkDetector, LandmarkIndex, Verdict};
use crate::render::annotate_frame;
use crate::stream::encode_part;

/// What happened to one frame.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    /// Encoded multipart part, ready to write to the HTTP stream.
    pub part: Bytes,
    /// Classification verdict; `None` when no skeleton was detected.
    /// An incomplete skeleton still classifies, to the default label.
    pub verdict: Option<Verdict>,
    /// Set when required joints were missing and the default label was used.
    pub incomplete: Option<LandmarkIndex>,
    /// Zone command seen this frame, before the dispatch gate.
    pub command: Option<NavCommand>,
    /// Whether a key press was actually dispatched.
    pub dispatched: bool,
}

/// Mirror the frame (selfie view) and scale it to the canonical height,
/// preserving aspect ratio. Classification, zone checks and streaming all
/// run on this conditioned frame.
pub fn condition_frame(frame: Mat, canonical_height: i32) -> Result<Mat> {
    // Some capture backends hand back BGRA; normalize to BGR up front
    let frame = if frame.channels() == 4 {
        let mut bgr = Mat::default();
        imgproc::cvt_color_def(&frame, &mut bgr, imgproc::COLOR_BGRA2BGR)
            .context("BGRA conversion failed")?;
        bgr
    } else {
        frame
    };

    let mut mirrored = Mat::default();
    opencv::core::flip(&frame, &mut mirrored, 1).context("mirror flip failed")?;

    let width = mirrored.cols();
    let height = mirrored.rows();
    let scaled_width = (width as f64 * canonical_height as f64 / height as f64) as i32;
    let mut resized = Mat::default();
    imgproc::resize(
        &mirrored,
        &mut resized,
        Size::new(scaled_width, canonical_height),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )
    .context("resize failed")?;

    Ok(resized)
}

pub struct FramePipeline<S, D, K> {
    source: S,
    detector: D,
    sink: K,
    gate: DispatchGate,
    control_enabled: bool,
    canonical_height: i32,
    jpeg_quality: i32,
}

impl<S: VideoSource, D: LandmarkDetector, K: KeySink> FramePipeline<S, D, K> {
    pub fn new(
        source: S,
        detector: D,
        sink: K,
        stream: &StreamConfig,
        control: &ControlConfig,
    ) -> Self {
        Self {
            source,
            detector,
            sink,
            gate: DispatchGate::new(Duration::from_millis(control.cooldown_ms)),
            control_enabled: control.enabled,
            canonical_height: stream.canonical_height,
            jpeg_quality: stream.jpeg_quality,
        }
    }

    /// Process one frame.
    ///
    /// - `Ok(Some(outcome))`: a frame went through the whole pipeline
    /// - `Ok(None)`: the source is exhausted; the pipeline is done
    /// - `Err(_)`: this frame failed (acquisition, inference or encode).
    ///   Per-frame failures carry no state into the next call, so callers
    ///   log and keep iterating.
    pub fn next_outcome(&mut self) -> Result<Option<FrameOutcome>> {
        let frame = match self.source.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(e) => return Err(e.context("frame acquisition failed")),
        };

        let mut frame = condition_frame(frame, self.canonical_height)?;

        let landmarks = self
            .detector
            .detect(&frame)
            .context("landmark detection failed")?;

        let mut verdict = None;
        let mut incomplete = None;
        let mut command = None;
        let mut dispatched = false;

        if let Some(set) = &landmarks {
            let v = match classify(set) {
                Ok(v) => v,
                Err(e) => {
                    incomplete = Some(e.missing);
                    Verdict::unmatched()
                }
            };
            verdict = Some(v);

            command = detect_zone(set);
            if let Some(cmd) = command {
                if self.control_enabled && self.gate.admit(Instant::now()) {
                    // fire-and-forget: injection failure must not stall the stream
                    match self.sink.press(NavKey::from(cmd)) {
                        Ok(()) => dispatched = true,
                        Err(e) => eprintln!("key dispatch failed: {e:#}"),
                    }
                }
            }

            // annotation is cosmetic; a drawing error does not drop the frame
            if let Err(e) = annotate_frame(&mut frame, set, &v, command) {
                eprintln!("annotation failed: {e:#}");
            }
        }

        let jpeg = self.encode_jpeg(&frame)?;
        Ok(Some(FrameOutcome {
            part: encode_part(&jpeg),
            verdict,
            incomplete,
            command,
            dispatched,
        }))
    }

    fn encode_jpeg(&self, frame: &Mat) -> Result<Vec<u8>> {
        let params = Vector::from_iter([imgcodecs::IMWRITE_JPEG_QUALITY, self.jpeg_quality]);
        let mut buf: Vector<u8> = Vector::new();
        let ok = imgcodecs::imencode(".jpg", frame, &mut buf, &params)
            .context("jpeg encode failed")?;
        if !ok {
            bail!("jpeg encoder rejected frame");
        }
        Ok(buf.to_vec())
    }
}
