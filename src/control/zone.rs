use crate::pose::{LandmarkIndex, LandmarkSet};

/// 手首の位置から導出されるスライド操作コマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    /// 前のスライドへ（左上隅）
    Prev,
    /// 次のスライドへ（右上隅）
    Next,
}

impl NavCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prev => "prev",
            Self::Next => "next",
        }
    }
}

/// トリガー領域に手首が入っているか判定する。
///
/// 領域はフレーム上端 1/8 の帯のうち、左端 1/8（prev）と
/// 右端 1/8（next）。境界はどちらも領域側に含む。
///
/// セルフィー反転済みフレームを前提に、「左」の判定点として
/// RIGHT_WRIST を、「右」の判定点として LEFT_WRIST を読む。
/// どちらの判定も両手首の OR なので、この入れ替えが結果を
/// 変えることはない。prev 判定が next 判定より優先される
///
/// どちらかの手首が未検出なら None（コマンドなし）
pub fn detect_zone(set: &LandmarkSet) -> Option<NavCommand> {
    let left = set.get(LandmarkIndex::RightWrist)?;
    let right = set.get(LandmarkIndex::LeftWrist)?;

    let x_left = (set.width() / 8) as f32;
    let x_right = (set.width() * 7 / 8) as f32;
    let y_top = (set.height() / 8) as f32;

    let in_top_left = |x: f32, y: f32| x <= x_left && y <= y_top;
    let in_top_right = |x: f32, y: f32| x >= x_right && y <= y_top;

    if in_top_left(left.x, left.y) || in_top_left(right.x, right.y) {
        Some(NavCommand::Prev)
    } else if in_top_right(left.x, left.y) || in_top_right(right.x, right.y) {
        Some(NavCommand::Next)
    } else {
        None
    }
}
