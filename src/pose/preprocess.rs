use anyhow::Result;
use ndarray::Array4;
use opencv::{
    core::{AlgorithmHint, Mat, Size, CV_32FC3},
    imgproc,
    prelude::*,
};

/// ランドマークモデルの入力サイズ
pub const LANDMARK_INPUT_SIZE: i32 = 256;

/// OpenCV Mat をランドマークモデル用の入力テンソルに変換
///
/// - BGR -> RGB
/// - 256x256 にリサイズ。アスペクト比は無視して引き伸ばす。
///   正規化座標をフレームの幅・高さで戻すため、引き伸ばしは
///   復元時に相殺される
/// - [1, 256, 256, 3] の f32 テンソルに変換 (0.0-1.0)
pub fn preprocess_for_landmarks(frame: &Mat) -> Result<Array4<f32>> {
    // BGR -> RGB
    let mut rgb = Mat::default();
    imgproc::cvt_color(
        frame,
        &mut rgb,
        imgproc::COLOR_BGR2RGB,
        0,
        AlgorithmHint::ALGO_HINT_DEFAULT,
    )?;

    // 256x256 にリサイズ
    let mut resized = Mat::default();
    imgproc::resize(
        &rgb,
        &mut resized,
        Size::new(LANDMARK_INPUT_SIZE, LANDMARK_INPUT_SIZE),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    // f32 に変換して 0.0-1.0 に正規化
    let mut float_mat = Mat::default();
    resized.convert_to(&mut float_mat, CV_32FC3, 1.0 / 255.0, 0.0)?;

    // ndarray に変換 [1, 256, 256, 3]
    let mut tensor = Array4::<f32>::zeros((
        1,
        LANDMARK_INPUT_SIZE as usize,
        LANDMARK_INPUT_SIZE as usize,
        3,
    ));

    for y in 0..LANDMARK_INPUT_SIZE {
        for x in 0..LANDMARK_INPUT_SIZE {
            let pixel = float_mat.at_2d::<opencv::core::Vec3f>(y, x)?;
            tensor[[0, y as usize, x as usize, 0]] = pixel[0];
            tensor[[0, y as usize, x as usize, 1]] = pixel[1];
            tensor[[0, y as usize, x as usize, 2]] = pixel[2];
        }
    }

    Ok(tensor)
}
