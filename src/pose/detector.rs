use anyhow::{Context, Result};
use ndarray::Array4;
use opencv::core::Mat;
use opencv::prelude::*;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use super::landmark::{Landmark, LandmarkIndex, LandmarkSet};
use super::preprocess::{preprocess_for_landmarks, LANDMARK_INPUT_SIZE};

/// ランドマーク検出器。フレームを与えると骨格を返す能力オブジェクト。
/// `Ok(None)` は「人物を検出できなかった」という正常な結果
pub trait LandmarkDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>>;
}

/// モデル生出力の行数（本体 33 + 補助 6 ランドマーク）
const RAW_LANDMARK_ROWS: usize = 39;

/// BlazePose 系全身ランドマークモデル (ONNX) を使用した検出器
///
/// 入力: "input_1" [1, 256, 256, 3] の f32 (0.0-1.0, RGB)
/// 出力: "Identity"   [1, 195] = 39 ランドマーク x (x, y, z, visibility, presence)。
///                    x, y, z は入力正方形のピクセル座標、
///                    visibility / presence はロジット
///       "Identity_1" [1, 1]   = 人物存在スコア (0.0-1.0)
pub struct BlazeDetector {
    session: Session,
    min_detection_confidence: f32,
    min_landmark_visibility: f32,
}

impl BlazeDetector {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        min_detection_confidence: f32,
        min_landmark_visibility: f32,
    ) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path.as_ref())
            .context("Failed to load ONNX model")?;

        Ok(Self {
            session,
            min_detection_confidence,
            min_landmark_visibility,
        })
    }

    fn run_model(&mut self, input: Array4<f32>) -> Result<(Vec<[f32; 5]>, f32)> {
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs!["input_1" => input_tensor])
            .context("Inference failed")?;

        let landmarks: ndarray::ArrayViewD<f32> = outputs["Identity"]
            .try_extract_array()
            .context("Failed to extract landmark tensor")?;
        let score: ndarray::ArrayViewD<f32> = outputs["Identity_1"]
            .try_extract_array()
            .context("Failed to extract score tensor")?;

        // [1, 195] -> 39 行 x 5 列
        let mut rows = Vec::with_capacity(RAW_LANDMARK_ROWS);
        for i in 0..RAW_LANDMARK_ROWS {
            rows.push([
                landmarks[[0, i * 5]],
                landmarks[[0, i * 5 + 1]],
                landmarks[[0, i * 5 + 2]],
                landmarks[[0, i * 5 + 3]],
                landmarks[[0, i * 5 + 4]],
            ]);
        }

        Ok((rows, score[[0, 0]]))
    }
}

impl LandmarkDetector for BlazeDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>> {
        let width = frame.cols() as u32;
        let height = frame.rows() as u32;

        let input = preprocess_for_landmarks(frame)?;
        let (rows, presence) = self.run_model(input)?;

        if presence < self.min_detection_confidence {
            return Ok(None);
        }

        let scale = LANDMARK_INPUT_SIZE as f32;
        let mut set = LandmarkSet::new(width, height);
        for (i, row) in rows.iter().take(LandmarkIndex::COUNT).enumerate() {
            if let Some(index) = LandmarkIndex::from_index(i) {
                let visibility = sigmoid(row[3]);
                if visibility < self.min_landmark_visibility {
                    continue;
                }
                set.set(
                    index,
                    Landmark::from_normalized(
                        row[0] / scale,
                        row[1] / scale,
                        row[2] / scale,
                        width,
                        height,
                    ),
                );
            }
        }

        // 全ランドマークが可視性で落ちた骨格は検出なし扱い
        if set.present_count() == 0 {
            return Ok(None);
        }

        Ok(Some(set))
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
