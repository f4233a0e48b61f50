use anyhow::{Context, Result};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs, VideoCaptureTrait},
};

/// フレーム供給源。パイプラインはこの能力オブジェクト越しに読む。
///
/// - `Ok(Some(frame))` : 次のフレーム（BGR）
/// - `Ok(None)`        : ストリーム終端。ライブカメラは終端を報告
///                       しないため、ファイル入力やテスト用の
///                       フェイクだけが返す
/// - `Err(_)`          : 一時的な取得失敗。呼び出し側はこの
///                       フレームをスキップして継続する
pub trait VideoSource {
    fn read_frame(&mut self) -> Result<Option<Mat>>;
}

/// OpenCVを使用したカメラキャプチャ
pub struct OpenCvCamera {
    capture: VideoCapture,
    width: u32,
    height: u32,
}

impl OpenCvCamera {
    /// カメラを開く（デフォルト設定）
    pub fn open(index: i32) -> Result<Self> {
        Self::open_with_config(index, None, None, None)
    }

    /// 解像度とFPSを指定してカメラを開く。
    /// 実際に適用される値はデバイス依存で、要求値と異なることがある
    pub fn open_with_config(
        index: i32,
        width: Option<u32>,
        height: Option<u32>,
        fps: Option<u32>,
    ) -> Result<Self> {
        let mut capture = VideoCapture::new(index, VideoCaptureAPIs::CAP_ANY as i32)
            .context("Failed to open camera")?;

        if !capture.is_opened()? {
            anyhow::bail!("Camera {} is not available", index);
        }

        if let Some(w) = width {
            capture.set(videoio::CAP_PROP_FRAME_WIDTH, w as f64)?;
        }
        if let Some(h) = height {
            capture.set(videoio::CAP_PROP_FRAME_HEIGHT, h as f64)?;
        }
        if let Some(f) = fps {
            capture.set(videoio::CAP_PROP_FPS, f as f64)?;
        }
        // 古いフレームを溜めない
        capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)?;

        let actual_width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let actual_height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;

        Ok(Self {
            capture,
            width: actual_width,
            height: actual_height,
        })
    }

    /// 実際の解像度を取得
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// デバイスを明示的に解放する。以降の read_frame は失敗する
    pub fn close(&mut self) -> Result<()> {
        self.capture.release()?;
        Ok(())
    }
}

impl VideoSource for OpenCvCamera {
    fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .context("Failed to read frame")?;

        if !grabbed || frame.empty() {
            anyhow::bail!("Empty frame received");
        }

        Ok(Some(frame))
    }
}
