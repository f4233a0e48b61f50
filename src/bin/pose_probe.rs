//! 角度プローブ: カメラ映像の関節角度と分類ラベルを毎秒コンソールに出す。
//! HTTPサーバもキー送出も動かさずに、ルールテーブルの角度範囲を
//! 較正するためのツール

use std::time::{Duration, Instant};

use anyhow::Result;

use surya_deck::camera::{OpenCvCamera, VideoSource};
use surya_deck::config::Config;
use surya_deck::control::detect_zone;
use surya_deck::pipeline::condition_frame;
use surya_deck::pose::{classify_angles, BlazeDetector, JointAngles, LandmarkDetector};

const CONFIG_PATH: &str = "deck_server.toml";

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);

    println!("=== ポーズプローブ ({}) ===", env!("GIT_VERSION"));
    println!("camera index {} / model {}", config.camera.index, config.detector.model_path);

    let mut camera = OpenCvCamera::open_with_config(
        config.camera.index,
        Some(config.camera.width),
        Some(config.camera.height),
        None,
    )?;
    let (width, height) = camera.resolution();
    println!("解像度: {}x{}", width, height);

    let mut detector = BlazeDetector::new(
        &config.detector.model_path,
        config.detector.min_detection_confidence,
        config.detector.min_landmark_visibility,
    )?;
    println!("モデル読み込み完了");
    println!();

    let mut last_print: Option<Instant> = None;
    loop {
        let frame = match camera.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                eprintln!("フレーム取得失敗: {}", e);
                std::thread::sleep(Duration::from_millis(100));
                continue;
            }
        };

        // サーバと同じ前処理を通して角度を合わせる
        let frame = condition_frame(frame, config.stream.canonical_height)?;

        let set = match detector.detect(&frame)? {
            Some(set) => set,
            None => continue,
        };

        if let Some(at) = last_print {
            if at.elapsed() < Duration::from_secs(1) {
                continue;
            }
        }
        last_print = Some(Instant::now());

        match JointAngles::measure(&set) {
            Ok(angles) => {
                let verdict = classify_angles(&angles);
                let zone = detect_zone(&set).map_or("-", |c| c.as_str());
                println!(
                    "elbow={:5.1} shoulder={:5.1} knee={:5.1}/{:5.1} wrist={:5.1} hip={:5.1} | {} (zone: {})",
                    angles.right_elbow,
                    angles.right_shoulder,
                    angles.right_knee,
                    angles.left_knee,
                    angles.right_wrist,
                    angles.right_hip,
                    verdict.label,
                    zone
                );
            }
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}
