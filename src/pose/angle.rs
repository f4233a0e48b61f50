use super::landmark::Landmark;

/// 3点 a-b-c のなす角度を度数で返す（b が頂点）。
///
/// 値域は [0, 360)。atan2 の差が負になった場合は 360 を足す
/// 回り込み規約で、姿勢分類テーブルの角度範囲はこの規約に
/// 合わせて較正されている。内角 (0〜180) に畳んではいけない
///
/// 前提条件: a != b かつ c != b。長さゼロのベクトルでは角度が
/// 定義できないため、呼び出し側は検出済みランドマークからのみ
/// 組み立てること
pub fn joint_angle(a: Landmark, b: Landmark, c: Landmark) -> f32 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let mut degrees = radians.to_degrees();
    if degrees < 0.0 {
        degrees += 360.0;
    }
    // 微小な負の角度が f32 丸めで 360.0 ちょうどに乗ることがある
    if degrees >= 360.0 {
        degrees -= 360.0;
    }
    degrees
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.0)
    }

    #[test]
    fn test_right_angle() {
        // 頂点 b から見て a が真上、c が真右
        let angle = joint_angle(lm(0.0, -1.0), lm(0.0, 0.0), lm(1.0, 0.0));
        assert!((angle - 90.0).abs() < 0.001);
    }

    #[test]
    fn test_collinear_is_180() {
        let angle = joint_angle(lm(-1.0, 0.0), lm(0.0, 0.0), lm(1.0, 0.0));
        assert!((angle - 180.0).abs() < 0.001);
    }

    #[test]
    fn test_negative_sweep_wraps_to_315() {
        // c が a から時計回りに 45 度: atan2 の差は -45 度
        let angle = joint_angle(lm(1.0, 0.0), lm(0.0, 0.0), lm(0.7071, -0.7071));
        assert!((angle - 315.0).abs() < 0.01);
    }

    #[test]
    fn test_chirality_not_folded() {
        // 鏡像の三点は 360 - θ になる。内角に畳むと両方 90 になってしまう
        let angle = joint_angle(lm(0.0, -1.0), lm(0.0, 0.0), lm(-1.0, 0.0));
        assert!((angle - 270.0).abs() < 0.001);
    }

    #[test]
    fn test_translation_invariance() {
        let base = joint_angle(lm(10.0, 40.0), lm(50.0, 80.0), lm(90.0, 30.0));
        let shifted = joint_angle(lm(210.0, 340.0), lm(250.0, 380.0), lm(290.0, 330.0));
        assert!((base - shifted).abs() < 0.001);
    }

    #[test]
    fn test_scale_invariance() {
        let base = joint_angle(lm(1.0, 4.0), lm(5.0, 8.0), lm(9.0, 3.0));
        let scaled = joint_angle(lm(10.0, 40.0), lm(50.0, 80.0), lm(90.0, 30.0));
        assert!((base - scaled).abs() < 0.001);
    }

    #[test]
    fn test_range_over_grid() {
        // 非退化な三点の総当たりで値域 [0, 360) を確認する
        let coords = [-3.0f32, -1.0, 0.0, 2.0, 5.0];
        for &ax in &coords {
            for &ay in &coords {
                for &cx in &coords {
                    for &cy in &coords {
                        if (ax, ay) == (0.0, 0.0) || (cx, cy) == (0.0, 0.0) {
                            continue;
                        }
                        let angle = joint_angle(lm(ax, ay), lm(0.0, 0.0), lm(cx, cy));
                        assert!(
                            (0.0..360.0).contains(&angle),
                            "angle {} out of range for a=({},{}) c=({},{})",
                            angle,
                            ax,
                            ay,
                            cx,
                            cy
                        );
                    }
                }
            }
        }
    }
}
