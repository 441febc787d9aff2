use crate::error::Result;
use crate::persistentweightedunionfind::{Assertion, PersistentWeightedUnionFind};
use crate::relation::Relation;

/// 「`x`と`y`は同じ種類」「`x`は`y`を食べる」という発言を順に受け取り, 嘘の発言を数える.
///
/// 要素は1-indexedで受け取る. 次の発言が嘘になる.
///
/// - 種類が1, 2以外
/// - `x`または`y`が`[1, N]`の外
/// - 種類2で`x == y`
/// - それまでの本当の発言と矛盾する
///
/// 本当の発言だけが状態に反映される.
#[derive(Clone, Debug)]
pub struct StatementChecker {
    uf: PersistentWeightedUnionFind,
    version: usize,
    false_count: usize,
}

impl StatementChecker {
    /// 要素数`n`で作る
    pub fn new(n: usize) -> Result<Self> {
        Ok(Self {
            uf: PersistentWeightedUnionFind::new(n)?,
            version: 0,
            false_count: 0,
        })
    }

    /// 発言を1つ処理し, 本当なら`true`を返す
    ///
    /// # Time complexity
    ///
    /// - *O*(log² *N*)
    pub fn check(&mut self, kind: i32, x: usize, y: usize) -> Result<bool> {
        let n = self.uf.get_size();
        let rel = match kind {
            1 => Some(Relation::Same),
            2 if x != y => Some(Relation::Dominates),
            _ => None,
        };
        let truth = match rel {
            Some(rel) if (1..=n).contains(&x) && (1..=n).contains(&y) => {
                match self.uf.relate(x - 1, y - 1, rel, self.version)? {
                    Assertion::Merged(v) => {
                        self.version = v;
                        true
                    }
                    Assertion::Consistent => true,
                    Assertion::Contradiction => false,
                }
            }
            _ => false,
        };
        if !truth {
            log::debug!("statement ({kind}, {x}, {y}) is false");
            self.false_count += 1;
        }
        Ok(truth)
    }

    /// 発言の列をまとめて処理し, 嘘の総数を返す
    pub fn check_all(
        &mut self,
        statements: impl IntoIterator<Item = (i32, usize, usize)>,
    ) -> Result<usize> {
        for (kind, x, y) in statements {
            self.check(kind, x, y)?;
        }
        Ok(self.false_count)
    }

    /// これまでの嘘の数を返す
    #[must_use]
    pub fn false_count(&self) -> usize {
        self.false_count
    }

    /// 本当の発言を反映した最新のバージョンを返す
    #[must_use]
    pub fn version(&self) -> usize {
        self.version
    }

    /// 中のUnionFindを返す
    #[must_use]
    pub fn union_find(&self) -> &PersistentWeightedUnionFind {
        &self.uf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn food_chain() {
        let mut checker = StatementChecker::new(100).unwrap();
        let statements = [
            (1, 101, 1),
            (2, 1, 2),
            (2, 2, 3),
            (2, 3, 3),
            (1, 1, 3),
            (2, 3, 1),
            (1, 5, 5),
        ];
        assert_eq!(checker.check_all(statements).unwrap(), 3);
        assert_eq!(checker.version(), 2);
        assert_eq!(checker.union_find().get_version_count(), 3);
    }

    #[test]
    fn bad_kind() {
        let mut checker = StatementChecker::new(2).unwrap();
        assert!(!checker.check(3, 1, 2).unwrap());
        assert!(!checker.check(1, 0, 1).unwrap());
        assert!(checker.check(1, 1, 2).unwrap());
        assert!(checker.check(1, 2, 1).unwrap());
        assert!(!checker.check(2, 2, 1).unwrap());
        assert_eq!(checker.false_count(), 3);
    }
}
