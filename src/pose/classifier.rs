use std::fmt;

use super::angle::joint_angle;
use super::landmark::{Landmark, LandmarkIndex, LandmarkSet};

/// どのルールにも一致しなかった場合のラベル
pub const DEFAULT_LABEL: &str = "Correct your posture";

/// 角度計測に必要なランドマーク。
/// どれか1つでも欠けると分類できない
pub const REQUIRED_LANDMARKS: [LandmarkIndex; 10] = [
    LandmarkIndex::RightShoulder,
    LandmarkIndex::RightElbow,
    LandmarkIndex::RightWrist,
    LandmarkIndex::RightIndex,
    LandmarkIndex::RightHip,
    LandmarkIndex::RightKnee,
    LandmarkIndex::RightAnkle,
    LandmarkIndex::LeftHip,
    LandmarkIndex::LeftKnee,
    LandmarkIndex::LeftAnkle,
];

/// 必須ランドマークが欠けていて角度を計測できない状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteSkeleton {
    pub missing: LandmarkIndex,
}

impl fmt::Display for IncompleteSkeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "incomplete skeleton: missing {:?}", self.missing)
    }
}

impl std::error::Error for IncompleteSkeleton {}

/// 分類に使う6つの関節角度（度数、[0, 360)）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    /// 右肩 - 右肘 - 右手首
    pub right_elbow: f32,
    /// 右肘 - 右肩 - 右腰
    pub right_shoulder: f32,
    /// 右腰 - 右膝 - 右足首
    pub right_knee: f32,
    /// 左腰 - 左膝 - 左足首
    pub left_knee: f32,
    /// 右肘 - 右手首 - 右人差し指
    pub right_wrist: f32,
    /// 右膝 - 右腰 - 右肩
    pub right_hip: f32,
}

impl JointAngles {
    /// 骨格から6角度を計測する。
    /// 必須ランドマークが欠けていれば最初に見つかった欠損を返す
    pub fn measure(set: &LandmarkSet) -> Result<Self, IncompleteSkeleton> {
        let r_shoulder = need(set, LandmarkIndex::RightShoulder)?;
        let r_elbow = need(set, LandmarkIndex::RightElbow)?;
        let r_wrist = need(set, LandmarkIndex::RightWrist)?;
        let r_index = need(set, LandmarkIndex::RightIndex)?;
        let r_hip = need(set, LandmarkIndex::RightHip)?;
        let r_knee = need(set, LandmarkIndex::RightKnee)?;
        let r_ankle = need(set, LandmarkIndex::RightAnkle)?;
        let l_hip = need(set, LandmarkIndex::LeftHip)?;
        let l_knee = need(set, LandmarkIndex::LeftKnee)?;
        let l_ankle = need(set, LandmarkIndex::LeftAnkle)?;

        Ok(Self {
            right_elbow: joint_angle(r_shoulder, r_elbow, r_wrist),
            right_shoulder: joint_angle(r_elbow, r_shoulder, r_hip),
            right_knee: joint_angle(r_hip, r_knee, r_ankle),
            left_knee: joint_angle(l_hip, l_knee, l_ankle),
            right_wrist: joint_angle(r_elbow, r_wrist, r_index),
            right_hip: joint_angle(r_knee, r_hip, r_shoulder),
        })
    }
}

fn need(set: &LandmarkSet, index: LandmarkIndex) -> Result<Landmark, IncompleteSkeleton> {
    set.get(index).ok_or(IncompleteSkeleton { missing: index })
}

/// 半開区間 [lo, hi)。上限なしの条件は hi = INFINITY で表す
#[derive(Debug, Clone, Copy)]
struct Band {
    lo: f32,
    hi: f32,
}

impl Band {
    const fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    const fn above(lo: f32) -> Self {
        Self {
            lo,
            hi: f32::INFINITY,
        }
    }

    fn contains(self, angle: f32) -> bool {
        self.lo <= angle && angle < self.hi
    }
}

/// 1つのアーサナの角度条件。None の関節は不問
struct AsanaRule {
    label: &'static str,
    right_elbow: Option<Band>,
    right_shoulder: Option<Band>,
    right_knee: Option<Band>,
    left_knee: Option<Band>,
    right_wrist: Option<Band>,
    right_hip: Option<Band>,
}

impl AsanaRule {
    fn matches(&self, angles: &JointAngles) -> bool {
        in_band(self.right_elbow, angles.right_elbow)
            && in_band(self.right_shoulder, angles.right_shoulder)
            && in_band(self.right_knee, angles.right_knee)
            && in_band(self.left_knee, angles.left_knee)
            && in_band(self.right_wrist, angles.right_wrist)
            && in_band(self.right_hip, angles.right_hip)
    }
}

fn in_band(band: Option<Band>, angle: f32) -> bool {
    band.map_or(true, |b| b.contains(angle))
}

/// スーリヤナマスカーラ8姿勢のルールテーブル。
///
/// 上から順に全行を評価し、最後に一致した行のラベルが勝つ（後勝ち）。
/// 角度範囲は右半身を正面やや斜めから撮った映像で較正した経験値。
/// Ashwa Sanchalanasana の「右膝または左膝が深く曲がる」条件は
/// 同ラベルの隣接2行で表現している
const RULES: [AsanaRule; 9] = [
    AsanaRule {
        label: "1, 12. Pranamasana",
        right_elbow: Some(Band::new(50.0, 90.0)),
        right_shoulder: Some(Band::new(20.0, 50.0)),
        right_knee: None,
        left_knee: None,
        right_wrist: Some(Band::new(120.0, 160.0)),
        right_hip: None,
    },
    AsanaRule {
        label: "2, 11. Hasta Uttanasana",
        right_elbow: Some(Band::new(140.0, 170.0)),
        right_shoulder: Some(Band::new(170.0, 210.0)),
        right_knee: None,
        left_knee: None,
        right_wrist: Some(Band::new(130.0, 170.0)),
        right_hip: None,
    },
    AsanaRule {
        label: "3, 10. Pada Hastasana",
        right_elbow: Some(Band::new(160.0, 210.0)),
        right_shoulder: None,
        right_knee: None,
        left_knee: None,
        right_wrist: None,
        right_hip: Some(Band::above(280.0)),
    },
    AsanaRule {
        label: "4, 9. Ashwa Sanchalanasana",
        right_elbow: Some(Band::new(160.0, 190.0)),
        right_shoulder: Some(Band::new(30.0, 60.0)),
        right_knee: Some(Band::above(210.0)),
        left_knee: None,
        right_wrist: None,
        right_hip: Some(Band::new(160.0, 190.0)),
    },
    AsanaRule {
        label: "4, 9. Ashwa Sanchalanasana",
        right_elbow: Some(Band::new(160.0, 190.0)),
        right_shoulder: Some(Band::new(30.0, 60.0)),
        right_knee: None,
        left_knee: Some(Band::above(210.0)),
        right_wrist: None,
        right_hip: Some(Band::new(160.0, 190.0)),
    },
    AsanaRule {
        label: "5. Dandasana",
        right_elbow: Some(Band::new(160.0, 190.0)),
        right_shoulder: Some(Band::new(50.0, 80.0)),
        right_knee: Some(Band::new(160.0, 190.0)),
        left_knee: None,
        right_wrist: Some(Band::new(80.0, 120.0)),
        right_hip: Some(Band::new(160.0, 190.0)),
    },
    AsanaRule {
        label: "6. Ashtanga Namaskara",
        right_elbow: Some(Band::new(30.0, 60.0)),
        right_shoulder: Some(Band::above(320.0)),
        right_knee: Some(Band::new(190.0, 240.0)),
        left_knee: None,
        right_wrist: None,
        right_hip: Some(Band::new(210.0, 250.0)),
    },
    AsanaRule {
        label: "7. Bhujang Asana",
        right_elbow: Some(Band::new(150.0, 185.0)),
        right_shoulder: Some(Band::new(10.0, 50.0)),
        right_knee: Some(Band::new(175.0, 200.0)),
        left_knee: None,
        right_wrist: None,
        right_hip: Some(Band::new(100.0, 140.0)),
    },
    AsanaRule {
        label: "8. Adho mukha savasana",
        right_elbow: Some(Band::new(160.0, 190.0)),
        right_shoulder: Some(Band::new(150.0, 190.0)),
        right_knee: Some(Band::new(150.0, 190.0)),
        left_knee: None,
        right_wrist: None,
        right_hip: Some(Band::new(250.0, 310.0)),
    },
];

/// 分類結果。matched が false のときは label == DEFAULT_LABEL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub label: &'static str,
    pub matched: bool,
}

impl Verdict {
    /// 不一致を表す結果
    pub fn unmatched() -> Self {
        Self {
            label: DEFAULT_LABEL,
            matched: false,
        }
    }
}

/// ルールテーブルを全行評価し、最後に一致した行のラベルを返す。
/// 意図的に早期リターンしない（後勝ちがテーブルの解決規則）
pub fn classify_angles(angles: &JointAngles) -> Verdict {
    let mut verdict = Verdict::unmatched();
    for rule in &RULES {
        if rule.matches(angles) {
            verdict = Verdict {
                label: rule.label,
                matched: true,
            };
        }
    }
    verdict
}

/// 計測と分類をまとめて行う
pub fn classify(set: &LandmarkSet) -> Result<Verdict, IncompleteSkeleton> {
    Ok(classify_angles(&JointAngles::measure(set)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angles(
        right_elbow: f32,
        right_shoulder: f32,
        right_knee: f32,
        left_knee: f32,
        right_wrist: f32,
        right_hip: f32,
    ) -> JointAngles {
        JointAngles {
            right_elbow,
            right_shoulder,
            right_knee,
            left_knee,
            right_wrist,
            right_hip,
        }
    }

    /// 全必須ランドマークを埋めた骨格を作るヘルパ
    fn full_required_set() -> LandmarkSet {
        let mut set = LandmarkSet::new(640, 480);
        for (i, index) in REQUIRED_LANDMARKS.iter().enumerate() {
            let offset = i as f32 * 10.0;
            set.set(*index, Landmark::new(100.0 + offset, 200.0 + offset, 0.0));
        }
        set
    }

    #[test]
    fn test_pranamasana_midpoints() {
        let verdict = classify_angles(&angles(70.0, 35.0, 90.0, 90.0, 140.0, 90.0));
        assert!(verdict.matched);
        assert_eq!(verdict.label, "1, 12. Pranamasana");
    }

    #[test]
    fn test_hasta_uttanasana() {
        let verdict = classify_angles(&angles(155.0, 190.0, 100.0, 100.0, 150.0, 200.0));
        assert!(verdict.matched);
        assert_eq!(verdict.label, "2, 11. Hasta Uttanasana");
    }

    #[test]
    fn test_no_match_yields_default() {
        let verdict = classify_angles(&angles(10.0, 100.0, 10.0, 10.0, 10.0, 10.0));
        assert!(!verdict.matched);
        assert_eq!(verdict.label, DEFAULT_LABEL);
    }

    #[test]
    fn test_last_match_wins() {
        // Pada Hastasana と Adho mukha savasana の両方に一致する角度。
        // テーブルで後にある Adho が勝たなければならない
        let both = angles(170.0, 170.0, 170.0, 170.0, 100.0, 285.0);
        let verdict = classify_angles(&both);
        assert!(verdict.matched);
        assert_eq!(verdict.label, "8. Adho mukha savasana");

        // 肩を Adho の範囲から外すと Pada だけが残る
        let pada_only = angles(170.0, 100.0, 170.0, 170.0, 100.0, 285.0);
        let verdict = classify_angles(&pada_only);
        assert!(verdict.matched);
        assert_eq!(verdict.label, "3, 10. Pada Hastasana");
    }

    #[test]
    fn test_ashwa_right_knee_bent() {
        let verdict = classify_angles(&angles(170.0, 45.0, 250.0, 90.0, 50.0, 170.0));
        assert!(verdict.matched);
        assert_eq!(verdict.label, "4, 9. Ashwa Sanchalanasana");
    }

    #[test]
    fn test_ashwa_left_knee_bent() {
        let verdict = classify_angles(&angles(170.0, 45.0, 90.0, 250.0, 50.0, 170.0));
        assert!(verdict.matched);
        assert_eq!(verdict.label, "4, 9. Ashwa Sanchalanasana");
    }

    #[test]
    fn test_ashwa_neither_knee_bent() {
        let verdict = classify_angles(&angles(170.0, 45.0, 90.0, 90.0, 50.0, 170.0));
        assert!(!verdict.matched);
    }

    #[test]
    fn test_bhujang_asana() {
        let verdict = classify_angles(&angles(170.0, 30.0, 180.0, 180.0, 60.0, 120.0));
        assert!(verdict.matched);
        assert_eq!(verdict.label, "7. Bhujang Asana");
    }

    #[test]
    fn test_ashtanga_namaskara() {
        let verdict = classify_angles(&angles(45.0, 330.0, 210.0, 90.0, 60.0, 230.0));
        assert!(verdict.matched);
        assert_eq!(verdict.label, "6. Ashtanga Namaskara");
    }

    #[test]
    fn test_dandasana() {
        let verdict = classify_angles(&angles(170.0, 65.0, 170.0, 90.0, 100.0, 170.0));
        assert!(verdict.matched);
        assert_eq!(verdict.label, "5. Dandasana");
    }

    #[test]
    fn test_band_lower_bound_inclusive() {
        // 下限ちょうどは一致する
        let verdict = classify_angles(&angles(50.0, 35.0, 90.0, 90.0, 140.0, 90.0));
        assert!(verdict.matched);
        assert_eq!(verdict.label, "1, 12. Pranamasana");
    }

    #[test]
    fn test_band_upper_bound_exclusive() {
        // 上限ちょうどは一致しない
        let verdict = classify_angles(&angles(90.0, 35.0, 90.0, 90.0, 140.0, 90.0));
        assert!(!verdict.matched);
    }

    #[test]
    fn test_measure_reports_each_missing_landmark() {
        for missing in REQUIRED_LANDMARKS {
            let mut set = full_required_set();
            // 1つだけ欠けた骨格を作り直す
            let mut incomplete = LandmarkSet::new(set.width(), set.height());
            for (index, lm) in set.iter_present() {
                if index != missing {
                    incomplete.set(index, lm);
                }
            }
            set = incomplete;

            let err = JointAngles::measure(&set).unwrap_err();
            assert_eq!(err.missing, missing);
        }
    }

    #[test]
    fn test_measure_straight_leg_angles() {
        let mut set = full_required_set();
        // 左脚を一直線に並べる: 腰(100,100) 膝(100,200) 足首(100,300)
        set.set(LandmarkIndex::LeftHip, Landmark::new(100.0, 100.0, 0.0));
        set.set(LandmarkIndex::LeftKnee, Landmark::new(100.0, 200.0, 0.0));
        set.set(LandmarkIndex::LeftAnkle, Landmark::new(100.0, 300.0, 0.0));

        let measured = JointAngles::measure(&set).unwrap();
        assert!((measured.left_knee - 180.0).abs() < 0.001);
    }

    #[test]
    fn test_classify_incomplete_skeleton() {
        let set = LandmarkSet::new(640, 480);
        let err = classify(&set).unwrap_err();
        assert_eq!(err.missing, LandmarkIndex::RightShoulder);
    }
}
