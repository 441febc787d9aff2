/// 永続配列・永続UnionFindの操作で起こるエラー
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 存在しないバージョンを指定した
    #[error("invalid version {version} (version count is {count})")]
    InvalidVersion { version: usize, count: usize },

    /// 配列の範囲外の添字を指定した
    #[error("invalid index {index} (length is {len})")]
    InvalidIndex { index: usize, len: usize },

    /// UnionFindの範囲外の要素を指定した
    #[error("invalid element {element} (size is {len})")]
    InvalidElement { element: usize, len: usize },

    /// 構築時のサイズが不正
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// 関係の値が不正
    #[error("invalid relation {0}")]
    InvalidRelation(i32),

    /// 初期バージョンより前には戻れない
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// ファイルは読めたが中身が壊れている
    #[error("malformed file: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, Error>;
