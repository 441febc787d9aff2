use crate::binio::{expect_eof, read_i32, read_len, write_i32, write_len};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// ノードを指す添字が無いことを表すファイル上の値
const ABSENT: i32 = -1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Node {
    Value(i32),
    Relay(usize, usize),
}
use Node::*;

/// 全永続配列
///
/// 長さ`N`の`i32`の配列で, `set`するたびに新しいバージョンができる.
/// 過去のバージョンも全て読み書きの起点にできる.
///
/// ノードは追記のみのアリーナに置かれ, 一度作ったノードは書き換えない.
/// `set`は根から葉までの経路だけを複製し, それ以外の部分木は元のバージョンと共有する.
#[derive(Clone)]
pub struct PersistentIndexedArray {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    n: usize,
}

impl PersistentIndexedArray {
    /// 長さ`size`で中身が`initial_data`の配列を作る. これがバージョン0になる.
    ///
    /// # Errors
    ///
    /// - `size`が0または`i32`に収まらない場合
    /// - `initial_data.len() != size`の場合
    ///
    /// # Time complexity
    ///
    /// - *O*(*N*)
    pub fn build(size: usize, initial_data: &[i32]) -> Result<Self> {
        if size == 0 || i32::try_from(size).is_err() {
            return Err(Error::InvalidSize(format!("array size {size} is out of range")));
        }
        if initial_data.len() != size {
            return Err(Error::InvalidSize(format!(
                "initial data has {} elements, expected {size}",
                initial_data.len()
            )));
        }
        let mut this = Self {
            nodes: Vec::with_capacity(2 * size - 1),
            roots: vec![],
            n: size,
        };
        let root = this.build_internal(0, size - 1, initial_data);
        this.roots.push(root);
        Ok(this)
    }

    fn build_internal(&mut self, l: usize, r: usize, data: &[i32]) -> usize {
        let node = if l == r {
            Value(data[l])
        } else {
            let mid = (l + r) / 2;
            let left = self.build_internal(l, mid, data);
            let right = self.build_internal(mid + 1, r, data);
            Relay(left, right)
        };
        self.push_node(node)
    }

    fn push_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// 配列の長さを返す
    ///
    /// # Time complexity
    ///
    /// - *O*(1)
    #[must_use]
    pub fn size(&self) -> usize {
        self.n
    }

    /// これまでに作られたバージョンの数を返す
    ///
    /// # Time complexity
    ///
    /// - *O*(1)
    #[must_use]
    pub fn version_count(&self) -> usize {
        self.roots.len()
    }

    /// アリーナ中のノードの総数を返す
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn check(&self, version: usize, idx: usize) -> Result<()> {
        if version >= self.roots.len() {
            return Err(Error::InvalidVersion {
                version,
                count: self.roots.len(),
            });
        }
        if idx >= self.n {
            return Err(Error::InvalidIndex {
                index: idx,
                len: self.n,
            });
        }
        Ok(())
    }

    /// バージョン`version`の`idx`番目の値を返す
    ///
    /// # Time complexity
    ///
    /// - *O*(log *N*)
    pub fn get(&self, version: usize, idx: usize) -> Result<i32> {
        self.check(version, idx)?;
        let mut node = self.roots[version];
        let (mut l, mut r) = (0, self.n - 1);
        loop {
            match self.nodes[node] {
                Value(v) => {
                    debug_assert_eq!(l, r);
                    return Ok(v);
                }
                Relay(left, right) => {
                    let mid = (l + r) / 2;
                    if idx <= mid {
                        node = left;
                        r = mid;
                    } else {
                        node = right;
                        l = mid + 1;
                    }
                }
            }
        }
    }

    /// バージョン`version`の`idx`番目を`value`にした新しいバージョンを作り, その番号を返す.
    ///
    /// 返り値は常に呼び出し前の`version_count()`に等しい.
    ///
    /// # Time complexity
    ///
    /// - *O*(log *N*)
    pub fn set(&mut self, version: usize, idx: usize, value: i32) -> Result<usize> {
        self.check(version, idx)?;
        let root = self.update(self.roots[version], 0, self.n - 1, idx, value);
        self.roots.push(root);
        Ok(self.roots.len() - 1)
    }

    fn update(&mut self, node: usize, l: usize, r: usize, idx: usize, value: i32) -> usize {
        let node = match self.nodes[node] {
            Value(_) => Value(value),
            Relay(left, right) => {
                let mid = (l + r) / 2;
                if idx <= mid {
                    Relay(self.update(left, l, mid, idx, value), right)
                } else {
                    Relay(left, self.update(right, mid + 1, r, idx, value))
                }
            }
        };
        self.push_node(node)
    }

    /// バージョン`version`の中身を全て取り出す
    ///
    /// # Time complexity
    ///
    /// - *O*(*N*)
    pub fn snapshot(&self, version: usize) -> Result<Vec<i32>> {
        self.check(version, 0)?;
        let mut ret = Vec::with_capacity(self.n);
        let mut stack = vec![self.roots[version]];
        while let Some(node) = stack.pop() {
            match self.nodes[node] {
                Value(v) => ret.push(v),
                Relay(left, right) => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        Ok(ret)
    }

    /// 全てのノードと全てのバージョンの根を書き出す
    pub fn write_to(&self, w: &mut impl Write) -> Result<()> {
        write_len(w, self.n)?;
        write_len(w, self.nodes.len())?;
        for node in &self.nodes {
            match *node {
                Value(v) => {
                    write_i32(w, ABSENT)?;
                    write_i32(w, ABSENT)?;
                    write_i32(w, v)?;
                }
                Relay(left, right) => {
                    write_len(w, left)?;
                    write_len(w, right)?;
                    write_i32(w, 0)?;
                }
            }
        }
        write_len(w, self.roots.len())?;
        for &root in &self.roots {
            write_len(w, root)?;
        }
        Ok(())
    }

    /// `write_to`で書き出したものを読み込む
    ///
    /// 全ての根が`[0, N-1]`の分割どおりの木になっていることを確かめる.
    pub fn read_from(r: &mut impl Read) -> Result<Self> {
        let n = read_len(r, "array size")?;
        if n == 0 {
            return Err(Error::Format("array size is zero".into()));
        }
        let node_count = read_len(r, "node count")?;
        let mut nodes = Vec::with_capacity(node_count.min(1 << 20));
        for i in 0..node_count {
            let left = read_i32(r)?;
            let right = read_i32(r)?;
            let value = read_i32(r)?;
            let node = match (left, right) {
                (ABSENT, ABSENT) => Value(value),
                (left, right) => {
                    let child = |c: i32| {
                        usize::try_from(c)
                            .ok()
                            .filter(|&c| c < node_count)
                            .ok_or_else(|| Error::Format(format!("node {i} has bad child {c}")))
                    };
                    Relay(child(left)?, child(right)?)
                }
            };
            nodes.push(node);
        }
        let version_count = read_len(r, "version count")?;
        if version_count == 0 {
            return Err(Error::Format("no versions".into()));
        }
        let mut roots = Vec::with_capacity(version_count.min(1 << 20));
        for _ in 0..version_count {
            let root = read_len(r, "root")?;
            if root >= node_count {
                return Err(Error::Format(format!("root {root} is out of the arena")));
            }
            roots.push(root);
        }
        let this = Self { nodes, roots, n };
        this.validate()?;
        Ok(this)
    }

    /// 各ノードが常に同じ区間を担当していて, 葉がちょうど長さ1の区間にあることを確かめる
    fn validate(&self) -> Result<()> {
        let mut span = vec![None; self.nodes.len()];
        let mut stack = vec![];
        for &root in &self.roots {
            stack.push((root, 0, self.n - 1));
            while let Some((node, l, r)) = stack.pop() {
                let seen = span[node];
                match seen {
                    Some(s) if s == (l, r) => continue,
                    Some((sl, sr)) => {
                        return Err(Error::Format(format!(
                            "node {node} covers both [{sl}, {sr}] and [{l}, {r}]"
                        )));
                    }
                    None => span[node] = Some((l, r)),
                }
                match self.nodes[node] {
                    Value(_) if l == r => {}
                    Relay(left, right) if l < r => {
                        let mid = (l + r) / 2;
                        stack.push((left, l, mid));
                        stack.push((right, mid + 1, r));
                    }
                    _ => {
                        return Err(Error::Format(format!(
                            "node {node} does not fit the range [{l}, {r}]"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// ファイル`path`に保存する
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w)?;
        w.flush()?;
        log::debug!(
            "saved persistent array to {}: {} nodes, {} versions",
            path.display(),
            self.nodes.len(),
            self.roots.len()
        );
        Ok(())
    }

    /// ファイル`path`から読み込む
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut r = BufReader::new(File::open(path)?);
        let this = Self::read_from(&mut r)?;
        expect_eof(&mut r)?;
        log::debug!(
            "loaded persistent array from {}: {} nodes, {} versions",
            path.display(),
            this.nodes.len(),
            this.roots.len()
        );
        Ok(this)
    }
}

impl std::fmt::Debug for PersistentIndexedArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        struct Versions<'a>(&'a PersistentIndexedArray);
        impl std::fmt::Debug for Versions<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut list = f.debug_list();
                for v in 0..self.0.version_count() {
                    if let Ok(s) = self.0.snapshot(v) {
                        list.entry(&s);
                    }
                }
                list.finish()
            }
        }

        f.debug_struct("PersistentIndexedArray")
            .field("size", &self.n)
            .field("nodes", &self.nodes.len())
            .field("versions", &Versions(self))
            .finish()
    }
}
