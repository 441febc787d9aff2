use crate::binio::{expect_eof, read_list, write_list};
use crate::error::{Error, Result};
use crate::persistentindexedarray::PersistentIndexedArray;
use crate::relation::Relation;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// `relate`で関係を追加した結果
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Assertion {
    /// 別のグループだったのでマージし, 新しいバージョンができた
    Merged(usize),
    /// 既に同じ関係が導かれていた
    Consistent,
    /// 既に導かれている関係と矛盾する
    Contradiction,
}

/// 全永続な重み付きUnionFind
///
/// 各要素は親との関係 ([`Relation`]) を辺の重みとして持つ.
/// `parent`, `weight`, `rank`の3本の[`PersistentIndexedArray`]からなり,
/// 3本のバージョン数は常に等しく, 同じバージョン番号は同じ時点の状態を表す.
///
/// 過去のバージョンを書き換えられないので経路圧縮はせず, rankによるマージだけで木の深さを *O*(log *N*) に抑える.
///
/// バージョンとは別に, `undo`と`time_travel`のための移動履歴を持つ. その先頭が現在のバージョンになる.
#[derive(Clone, Debug)]
pub struct PersistentWeightedUnionFind {
    parent: PersistentIndexedArray,
    weight: PersistentIndexedArray,
    rank: PersistentIndexedArray,
    version_stack: Vec<usize>,
}

impl PersistentWeightedUnionFind {
    /// `size`個の要素がそれぞれ別のグループに属しているUnionFindを作る
    ///
    /// # Errors
    ///
    /// - `size`が0または`i32`に収まらない場合
    ///
    /// # Time complexity
    ///
    /// - *O*(*N*)
    pub fn new(size: usize) -> Result<Self> {
        let parents = (0..i32::try_from(size).map_err(|_| {
            Error::InvalidSize(format!("union-find size {size} is out of range"))
        })?)
            .collect::<Vec<_>>();
        let zeros = vec![0; size];
        Ok(Self {
            parent: PersistentIndexedArray::build(size, &parents)?,
            weight: PersistentIndexedArray::build(size, &zeros)?,
            rank: PersistentIndexedArray::build(size, &zeros)?,
            version_stack: vec![0],
        })
    }

    /// 要素数を返す
    ///
    /// # Time complexity
    ///
    /// - *O*(1)
    #[must_use]
    pub fn get_size(&self) -> usize {
        self.parent.size()
    }

    /// これまでに作られたバージョンの数を返す
    #[must_use]
    pub fn get_version_count(&self) -> usize {
        debug_assert_eq!(self.parent.version_count(), self.weight.version_count());
        debug_assert_eq!(self.parent.version_count(), self.rank.version_count());
        self.parent.version_count()
    }

    /// 現在のバージョンを返す
    #[must_use]
    pub fn get_current_version(&self) -> usize {
        *self.version_stack.last().unwrap_or(&0)
    }

    /// 移動履歴を古い順に返す. 最後が現在のバージョン.
    #[must_use]
    pub fn history(&self) -> &[usize] {
        &self.version_stack
    }

    fn check_version(&self, version: usize) -> Result<()> {
        let count = self.get_version_count();
        if version >= count {
            return Err(Error::InvalidVersion { version, count });
        }
        Ok(())
    }

    fn check_element(&self, x: usize) -> Result<()> {
        if x >= self.get_size() {
            return Err(Error::InvalidElement {
                element: x,
                len: self.get_size(),
            });
        }
        Ok(())
    }

    /// バージョン`version`で`x`が属するグループの根と, `x`の根に対する関係を返す
    ///
    /// # Time complexity
    ///
    /// - *O*(log² *N*)
    pub fn find(&self, x: usize, version: usize) -> Result<(usize, Relation)> {
        self.check_version(version)?;
        self.check_element(x)?;
        let mut x = x;
        let mut h = Relation::Same;
        // 読み込んだファイルが壊れていても止まるように, 要素数を超えて辿らない
        for _ in 0..=self.get_size() {
            let p = self.parent.get(version, x)?;
            let p = usize::try_from(p)
                .map_err(|_| Error::Format(format!("element {x} has parent {p}")))?;
            if p == x {
                log::trace!("find at version {version}: root {x}, relation {h}");
                return Ok((x, h));
            }
            h = h + Relation::from_weight(self.weight.get(version, x)?);
            x = p;
        }
        Err(Error::Format(format!("parent links at version {version} form a cycle")))
    }

    /// バージョン`version`で`a`と`b`が同じグループに属するか判定する
    pub fn same(&self, a: usize, b: usize, version: usize) -> Result<bool> {
        Ok(self.find(a, version)?.0 == self.find(b, version)?.0)
    }

    /// バージョン`version`で導かれる`a`の`b`に対する関係を返す.
    /// 別のグループなら`None`.
    pub fn relation(&self, a: usize, b: usize, version: usize) -> Result<Option<Relation>> {
        let (ra, wa) = self.find(a, version)?;
        let (rb, wb) = self.find(b, version)?;
        Ok((ra == rb).then_some(wa - wb))
    }

    /// バージョン`version`で「`a`の`b`に対する関係は`rel`」という情報を追加する.
    ///
    /// `rel`は0 (同じ種類) か1 (`a`が`b`を支配する).
    /// 別のグループならマージして新しいバージョンを返し, 移動履歴にも積む.
    /// 既に同じグループなら, 矛盾していてもいなくても`version`をそのまま返す.
    ///
    /// # Time complexity
    ///
    /// - *O*(log² *N*)
    pub fn union_sets(&mut self, a: usize, b: usize, rel: i32, version: usize) -> Result<usize> {
        let rel = Relation::from_assertion(rel)?;
        match self.relate(a, b, rel, version)? {
            Assertion::Merged(v) => Ok(v),
            Assertion::Consistent | Assertion::Contradiction => Ok(version),
        }
    }

    /// `union_sets`と同じだが, 結果を[`Assertion`]で返し, `rel`に[`Relation::DominatedBy`]も使える
    pub fn relate(&mut self, a: usize, b: usize, rel: Relation, version: usize) -> Result<Assertion> {
        self.check_version(version)?;
        self.check_element(a)?;
        self.check_element(b)?;
        let (ra, wa) = self.find(a, version)?;
        let (rb, wb) = self.find(b, version)?;
        if ra == rb {
            return Ok(if wa - wb == rel {
                Assertion::Consistent
            } else {
                Assertion::Contradiction
            });
        }
        let rank_a = self.rank.get(version, ra)?;
        let rank_b = self.rank.get(version, rb)?;
        // 子の根 -> 親の根, 辺の重み, 親の根の新しいrank
        let (child, root, w, rank) = if rank_a > rank_b {
            (rb, ra, wa - wb - rel, rank_a)
        } else {
            let rank = if rank_a == rank_b { rank_b + 1 } else { rank_b };
            (ra, rb, rel + wb - wa, rank)
        };
        let new_version = self.commit(version, child, root, w, rank)?;
        self.version_stack.push(new_version);
        log::debug!(
            "union {a} and {b} at version {version}: {child} under {root} with weight {w}, version {new_version}"
        );
        Ok(Assertion::Merged(new_version))
    }

    /// 3本の配列それぞれに1回ずつ書き込み, 新しいバージョンを1つ作る
    fn commit(
        &mut self,
        version: usize,
        child: usize,
        root: usize,
        w: Relation,
        rank: i32,
    ) -> Result<usize> {
        let expected = self.get_version_count();
        // 親の値は要素数未満なので i32 に収まる
        let p = self.parent.set(version, child, root as i32)?;
        let q = self.weight.set(version, child, w.weight())?;
        let r = self.rank.set(version, root, rank)?;
        debug_assert_eq!(p, expected);
        debug_assert_eq!(q, expected);
        debug_assert_eq!(r, expected);
        Ok(p)
    }

    /// 移動履歴を1つ戻し, 戻った先のバージョンを返す
    ///
    /// # Errors
    ///
    /// - 初期バージョンしか残っていない場合
    pub fn undo(&mut self) -> Result<usize> {
        if self.version_stack.len() <= 1 {
            return Err(Error::NothingToUndo);
        }
        self.version_stack.pop();
        let v = self.get_current_version();
        log::debug!("undo to version {v}");
        Ok(v)
    }

    /// 任意の既存バージョンに移動する. 履歴の順序は問わない.
    pub fn time_travel(&mut self, version: usize) -> Result<usize> {
        self.check_version(version)?;
        self.version_stack.push(version);
        log::debug!("time travel to version {version}");
        Ok(version)
    }

    fn paths(path: &Path) -> [PathBuf; 4] {
        let with = |ext: &str| {
            let mut s = path.as_os_str().to_owned();
            s.push(ext);
            PathBuf::from(s)
        };
        [
            with(".parent"),
            with(".weight"),
            with(".rank"),
            with(".version"),
        ]
    }

    /// `path.parent`, `path.weight`, `path.rank`, `path.version`の4つのファイルに保存する
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let [parent, weight, rank, version] = Self::paths(path.as_ref());
        self.parent.save(parent)?;
        self.weight.save(weight)?;
        self.rank.save(rank)?;
        let mut w = BufWriter::new(File::create(&version)?);
        write_list(&mut w, &self.version_stack)?;
        w.flush()?;
        log::debug!(
            "saved union-find to {}: {} versions",
            path.as_ref().display(),
            self.get_version_count()
        );
        Ok(())
    }

    /// `save`で保存したものを読み込む
    ///
    /// # Errors
    ///
    /// - 3本の配列の長さかバージョン数が揃っていない場合
    /// - 移動履歴が空か, 存在しないバージョンを含む場合
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let [parent, weight, rank, version] = Self::paths(path.as_ref());
        let parent = PersistentIndexedArray::load(parent)?;
        let weight = PersistentIndexedArray::load(weight)?;
        let rank = PersistentIndexedArray::load(rank)?;
        let mut r = BufReader::new(File::open(&version)?);
        let version_stack = read_list(&mut r, "version id")?;
        expect_eof(&mut r)?;

        for a in [&weight, &rank] {
            if a.size() != parent.size() || a.version_count() != parent.version_count() {
                return Err(Error::Format(format!(
                    "arrays are out of step: {} elements / {} versions vs {} / {}",
                    a.size(),
                    a.version_count(),
                    parent.size(),
                    parent.version_count()
                )));
            }
        }
        if version_stack.is_empty() {
            return Err(Error::Format("empty version history".into()));
        }
        if let Some(&v) = version_stack.iter().find(|&&v| v >= parent.version_count()) {
            return Err(Error::Format(format!("history refers to missing version {v}")));
        }
        log::debug!(
            "loaded union-find from {}: {} versions",
            path.as_ref().display(),
            parent.version_count()
        );
        Ok(Self {
            parent,
            weight,
            rank,
            version_stack,
        })
    }
}
