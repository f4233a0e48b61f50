/// BlazePose 系全身モデルの 33 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEyeInner),
            2 => Some(Self::LeftEye),
            3 => Some(Self::LeftEyeOuter),
            4 => Some(Self::RightEyeInner),
            5 => Some(Self::RightEye),
            6 => Some(Self::RightEyeOuter),
            7 => Some(Self::LeftEar),
            8 => Some(Self::RightEar),
            9 => Some(Self::MouthLeft),
            10 => Some(Self::MouthRight),
            11 => Some(Self::LeftShoulder),
            12 => Some(Self::RightShoulder),
            13 => Some(Self::LeftElbow),
            14 => Some(Self::RightElbow),
            15 => Some(Self::LeftWrist),
            16 => Some(Self::RightWrist),
            17 => Some(Self::LeftPinky),
            18 => Some(Self::RightPinky),
            19 => Some(Self::LeftIndex),
            20 => Some(Self::RightIndex),
            21 => Some(Self::LeftThumb),
            22 => Some(Self::RightThumb),
            23 => Some(Self::LeftHip),
            24 => Some(Self::RightHip),
            25 => Some(Self::LeftKnee),
            26 => Some(Self::RightKnee),
            27 => Some(Self::LeftAnkle),
            28 => Some(Self::RightAnkle),
            29 => Some(Self::LeftHeel),
            30 => Some(Self::RightHeel),
            31 => Some(Self::LeftFootIndex),
            32 => Some(Self::RightFootIndex),
            _ => None,
        }
    }
}

/// 単一ランドマーク（フレームのピクセル座標）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// X座標（ピクセル）
    pub x: f32,
    /// Y座標（ピクセル）
    pub y: f32,
    /// 奥行き。腰を原点とし、幅と同じスケールで表す
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 正規化座標 (0.0〜1.0) からピクセル座標へ変換して生成。
    /// z は幅でスケールする
    pub fn from_normalized(nx: f32, ny: f32, nz: f32, width: u32, height: u32) -> Self {
        Self {
            x: nx * width as f32,
            y: ny * height as f32,
            z: nz * width as f32,
        }
    }
}

/// 1フレーム分の骨格。検出できなかった関節は None のまま残る
#[derive(Debug, Clone)]
pub struct LandmarkSet {
    landmarks: [Option<Landmark>; LandmarkIndex::COUNT],
    width: u32,
    height: u32,
}

impl LandmarkSet {
    /// 全ランドマークが未検出の空の骨格を作る。
    /// width / height は座標変換に使ったフレーム寸法
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            landmarks: [None; LandmarkIndex::COUNT],
            width,
            height,
        }
    }

    /// 座標変換に使ったフレーム幅（ピクセル）
    pub fn width(&self) -> u32 {
        self.width
    }

    /// 座標変換に使ったフレーム高さ（ピクセル）
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set(&mut self, index: LandmarkIndex, landmark: Landmark) {
        self.landmarks[index as usize] = Some(landmark);
    }

    pub fn get(&self, index: LandmarkIndex) -> Option<Landmark> {
        self.landmarks[index as usize]
    }

    /// 検出済みランドマークの数
    pub fn present_count(&self) -> usize {
        self.landmarks.iter().filter(|l| l.is_some()).count()
    }

    /// required のうち最初に欠けているインデックスを返す。
    /// 全て揃っていれば None
    pub fn first_missing(&self, required: &[LandmarkIndex]) -> Option<LandmarkIndex> {
        required
            .iter()
            .copied()
            .find(|&index| self.landmarks[index as usize].is_none())
    }

    /// 検出済みランドマークを列挙する
    pub fn iter_present(&self) -> impl Iterator<Item = (LandmarkIndex, Landmark)> + '_ {
        self.landmarks
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| Some((LandmarkIndex::from_index(i)?, (*slot)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_index_count() {
        assert_eq!(LandmarkIndex::COUNT, 33);
    }

    #[test]
    fn test_landmark_index_from_index() {
        assert_eq!(LandmarkIndex::from_index(0), Some(LandmarkIndex::Nose));
        assert_eq!(LandmarkIndex::from_index(16), Some(LandmarkIndex::RightWrist));
        assert_eq!(
            LandmarkIndex::from_index(32),
            Some(LandmarkIndex::RightFootIndex)
        );
        assert_eq!(LandmarkIndex::from_index(33), None);
    }

    #[test]
    fn test_landmark_index_roundtrip() {
        for i in 0..LandmarkIndex::COUNT {
            let index = LandmarkIndex::from_index(i).unwrap();
            assert_eq!(index as usize, i);
        }
    }

    #[test]
    fn test_landmark_from_normalized() {
        let lm = Landmark::from_normalized(0.5, 0.25, 0.1, 640, 480);
        assert_eq!(lm.x, 320.0);
        assert_eq!(lm.y, 120.0);
        assert_eq!(lm.z, 64.0);
    }

    #[test]
    fn test_set_get() {
        let mut set = LandmarkSet::new(640, 480);
        assert_eq!(set.get(LandmarkIndex::Nose), None);

        set.set(LandmarkIndex::Nose, Landmark::new(320.0, 100.0, 0.0));
        let nose = set.get(LandmarkIndex::Nose).unwrap();
        assert_eq!(nose.x, 320.0);
        assert_eq!(nose.y, 100.0);
        assert_eq!(set.present_count(), 1);
    }

    #[test]
    fn test_first_missing() {
        let required = [
            LandmarkIndex::RightShoulder,
            LandmarkIndex::RightElbow,
            LandmarkIndex::RightWrist,
        ];

        let mut set = LandmarkSet::new(640, 480);
        assert_eq!(set.first_missing(&required), Some(LandmarkIndex::RightShoulder));

        set.set(LandmarkIndex::RightShoulder, Landmark::new(1.0, 1.0, 0.0));
        assert_eq!(set.first_missing(&required), Some(LandmarkIndex::RightElbow));

        set.set(LandmarkIndex::RightElbow, Landmark::new(2.0, 2.0, 0.0));
        set.set(LandmarkIndex::RightWrist, Landmark::new(3.0, 3.0, 0.0));
        assert_eq!(set.first_missing(&required), None);
    }

    #[test]
    fn test_iter_present() {
        let mut set = LandmarkSet::new(640, 480);
        set.set(LandmarkIndex::LeftWrist, Landmark::new(10.0, 20.0, 0.0));
        set.set(LandmarkIndex::RightWrist, Landmark::new(30.0, 40.0, 0.0));

        let present: Vec<_> = set.iter_present().collect();
        assert_eq!(present.len(), 2);
        assert_eq!(present[0].0, LandmarkIndex::LeftWrist);
        assert_eq!(present[1].0, LandmarkIndex::RightWrist);
    }
}
