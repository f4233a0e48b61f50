use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// HTTPサーバの待ち受けアドレス
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// 毎フレームの判定結果をログに出す
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    /// カメラデバイスのインデックス
    #[serde(default)]
    pub index: i32,
    /// 要求する解像度。実際の値はデバイス依存
    #[serde(default = "default_camera_width")]
    pub width: u32,
    #[serde(default = "default_camera_height")]
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    /// JPEG品質 (0-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: i32,
    /// 配信フレームの高さ。幅はアスペクト比を保って決まる
    #[serde(default = "default_canonical_height")]
    pub canonical_height: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectorConfig {
    /// ランドマークモデル (ONNX) のパス
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// 人物存在スコアの下限。下回るフレームは検出なし扱い
    #[serde(default = "default_min_detection_confidence")]
    pub min_detection_confidence: f32,
    /// ランドマーク可視性の下限。下回る関節は未検出になる
    #[serde(default = "default_min_landmark_visibility")]
    pub min_landmark_visibility: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ControlConfig {
    /// キー送出の有効化。false で判定だけ行う
    #[serde(default = "default_control_enabled")]
    pub enabled: bool,
    /// キー送出のクールダウン（ミリ秒）。
    /// 0 は条件を満たす毎フレーム送出する従来挙動
    #[serde(default)]
    pub cooldown_ms: u64,
}

fn default_listen_addr() -> String { "0.0.0.0:5000".to_string() }
fn default_camera_width() -> u32 { 1280 }
fn default_camera_height() -> u32 { 960 }
fn default_jpeg_quality() -> i32 { 80 }
fn default_canonical_height() -> i32 { 640 }
fn default_model_path() -> String { "models/pose_landmark_full.onnx".to_string() }
fn default_min_detection_confidence() -> f32 { 0.5 }
fn default_min_landmark_visibility() -> f32 { 0.3 }
fn default_control_enabled() -> bool { true }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: default_camera_width(),
            height: default_camera_height(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            canonical_height: default_canonical_height(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            min_detection_confidence: default_min_detection_confidence(),
            min_landmark_visibility: default_min_landmark_visibility(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: default_control_enabled(),
            cooldown_ms: 0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            verbose: false,
            camera: CameraConfig::default(),
            stream: StreamConfig::default(),
            detector: DetectorConfig::default(),
            control: ControlConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// ファイルが無ければデフォルト設定を返す。
    /// 壊れたファイルは黙って無視せず、デフォルトに落ちたことを報せる
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("config parse error: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
