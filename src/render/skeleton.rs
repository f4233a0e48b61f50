use crate::pose::LandmarkIndex;

/// 骨格の接続定義 (開始ランドマーク, 終了ランドマーク)
pub const POSE_CONNECTIONS: [(LandmarkIndex, LandmarkIndex); 35] = [
    // 顔
    (LandmarkIndex::Nose, LandmarkIndex::LeftEyeInner),
    (LandmarkIndex::LeftEyeInner, LandmarkIndex::LeftEye),
    (LandmarkIndex::LeftEye, LandmarkIndex::LeftEyeOuter),
    (LandmarkIndex::LeftEyeOuter, LandmarkIndex::LeftEar),
    (LandmarkIndex::Nose, LandmarkIndex::RightEyeInner),
    (LandmarkIndex::RightEyeInner, LandmarkIndex::RightEye),
    (LandmarkIndex::RightEye, LandmarkIndex::RightEyeOuter),
    (LandmarkIndex::RightEyeOuter, LandmarkIndex::RightEar),
    (LandmarkIndex::MouthLeft, LandmarkIndex::MouthRight),
    // 腕
    (LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftElbow),
    (LandmarkIndex::LeftElbow, LandmarkIndex::LeftWrist),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightElbow),
    (LandmarkIndex::RightElbow, LandmarkIndex::RightWrist),
    // 手
    (LandmarkIndex::LeftWrist, LandmarkIndex::LeftPinky),
    (LandmarkIndex::LeftWrist, LandmarkIndex::LeftIndex),
    (LandmarkIndex::LeftWrist, LandmarkIndex::LeftThumb),
    (LandmarkIndex::LeftPinky, LandmarkIndex::LeftIndex),
    (LandmarkIndex::RightWrist, LandmarkIndex::RightPinky),
    (LandmarkIndex::RightWrist, LandmarkIndex::RightIndex),
    (LandmarkIndex::RightWrist, LandmarkIndex::RightThumb),
    (LandmarkIndex::RightPinky, LandmarkIndex::RightIndex),
    // 胴体
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftHip),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightHip),
    (LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
    // 脚
    (LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee),
    (LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
    (LandmarkIndex::RightHip, LandmarkIndex::RightKnee),
    (LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
    // 足
    (LandmarkIndex::LeftAnkle, LandmarkIndex::LeftHeel),
    (LandmarkIndex::LeftHeel, LandmarkIndex::LeftFootIndex),
    (LandmarkIndex::LeftAnkle, LandmarkIndex::LeftFootIndex),
    (LandmarkIndex::RightAnkle, LandmarkIndex::RightHeel),
    (LandmarkIndex::RightHeel, LandmarkIndex::RightFootIndex),
    (LandmarkIndex::RightAnkle, LandmarkIndex::RightFootIndex),
];

/// ランドマーク点の色 (BGR)
pub const LANDMARK_COLOR: (f64, f64, f64) = (255.0, 255.0, 255.0); // 白

/// 接続線の色 (BGR)
pub const CONNECTION_COLOR: (f64, f64, f64) = (49.0, 125.0, 237.0); // 橙

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connections_reference_valid_indices() {
        for (from, to) in POSE_CONNECTIONS {
            assert!((from as usize) < LandmarkIndex::COUNT);
            assert!((to as usize) < LandmarkIndex::COUNT);
            assert_ne!(from, to);
        }
    }
}
