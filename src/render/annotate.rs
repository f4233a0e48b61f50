use anyhow::Result;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

use crate::control::NavCommand;
use crate::pose::{LandmarkSet, Verdict};
use crate::render::skeleton::{CONNECTION_COLOR, LANDMARK_COLOR, POSE_CONNECTIONS};

/// ラベル文字色: 一致時は緑、不一致時は赤 (BGR)
const LABEL_MATCHED: (f64, f64, f64) = (0.0, 255.0, 0.0);
const LABEL_UNMATCHED: (f64, f64, f64) = (0.0, 0.0, 255.0);

/// トリガー領域の塗りつぶし色 (BGR)
const ZONE_FILL: (f64, f64, f64) = (66.0, 148.0, 45.0);
const GUIDE_TEXT: (f64, f64, f64) = (255.0, 255.0, 255.0);

fn scalar((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

/// 骨格（接続線と関節点）をフレームに描き込む
pub fn draw_skeleton(frame: &mut Mat, set: &LandmarkSet) -> Result<()> {
    for (from, to) in POSE_CONNECTIONS {
        if let (Some(a), Some(b)) = (set.get(from), set.get(to)) {
            imgproc::line(
                frame,
                Point::new(a.x as i32, a.y as i32),
                Point::new(b.x as i32, b.y as i32),
                scalar(CONNECTION_COLOR),
                2,
                imgproc::LINE_8,
                0,
            )?;
        }
    }

    for (_, lm) in set.iter_present() {
        imgproc::circle(
            frame,
            Point::new(lm.x as i32, lm.y as i32),
            3,
            scalar(LANDMARK_COLOR),
            3,
            imgproc::LINE_8,
            0,
        )?;
    }

    Ok(())
}

/// 分類ラベルを描き込む。位置とフォントは固定
pub fn draw_label(frame: &mut Mat, verdict: &Verdict) -> Result<()> {
    let color = if verdict.matched {
        LABEL_MATCHED
    } else {
        LABEL_UNMATCHED
    };
    imgproc::put_text(
        frame,
        verdict.label,
        Point::new(10, 180),
        imgproc::FONT_HERSHEY_PLAIN,
        2.0,
        scalar(color),
        2,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}

/// 左右上隅のトリガー領域ガイドと、検出中のコマンドを描き込む
pub fn draw_zone_guides(frame: &mut Mat, command: Option<NavCommand>) -> Result<()> {
    let width = frame.cols();
    let height = frame.rows();
    let zone_w = width / 8;
    let zone_h = height / 8;

    // 塗りつぶした領域の上にキャプションを重ねる
    imgproc::rectangle(
        frame,
        Rect::new(0, 0, zone_w, zone_h),
        scalar(ZONE_FILL),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::put_text(
        frame,
        "PREV",
        Point::new(10, zone_h / 2),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        scalar(GUIDE_TEXT),
        2,
        imgproc::LINE_8,
        false,
    )?;

    let right_x = width * 7 / 8;
    imgproc::rectangle(
        frame,
        Rect::new(right_x, 0, width - right_x, zone_h),
        scalar(ZONE_FILL),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::put_text(
        frame,
        "NEXT",
        Point::new(right_x + 10, zone_h / 2),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        scalar(GUIDE_TEXT),
        2,
        imgproc::LINE_8,
        false,
    )?;

    // 領域の縁を白線でなぞる（塗りの後に描かないと隠れる）
    let edges = [
        (Point::new(zone_w, 0), Point::new(zone_w, zone_h)),
        (Point::new(0, zone_h), Point::new(zone_w, zone_h)),
        (Point::new(right_x, 0), Point::new(right_x, zone_h)),
        (Point::new(right_x, zone_h), Point::new(width, zone_h)),
    ];
    for (from, to) in edges {
        imgproc::line(frame, from, to, scalar(GUIDE_TEXT), 2, imgproc::LINE_8, 0)?;
    }

    // 検出中のコマンドを左下に表示
    if let Some(cmd) = command {
        imgproc::put_text(
            frame,
            cmd.as_str(),
            Point::new(5, height - 10),
            imgproc::FONT_HERSHEY_PLAIN,
            2.0,
            scalar(GUIDE_TEXT),
            3,
            imgproc::LINE_8,
            false,
        )?;
    }

    Ok(())
}

/// 1フレーム分の注釈をまとめて描き込む。
/// 描画は外観だけの問題なので、呼び出し側はエラーをログに留めて継続する
pub fn annotate_frame(
    frame: &mut Mat,
    set: &LandmarkSet,
    verdict: &Verdict,
    command: Option<NavCommand>,
) -> Result<()> {
    draw_skeleton(frame, set)?;
    draw_label(frame, verdict)?;
    draw_zone_guides(frame, command)?;
    Ok(())
}
