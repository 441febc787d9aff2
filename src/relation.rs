use crate::error::{Error, Result};
use std::ops::{Add, Neg, Sub};

/// mod 3 の巡回的な関係
///
/// `Same`が単位元の位数3の巡回群をなす.
/// 要素から親への辺の重みとして使われ, 経路上の重みの和が根との関係になる.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Relation {
    /// 同じ種類
    #[default]
    Same,
    /// 左が右を支配する (食べる)
    Dominates,
    /// 左が右に支配される (食べられる)
    DominatedBy,
}

impl Relation {
    /// 重み`w`を mod 3 で関係に変換する. 負の値も受け付ける.
    ///
    /// # Time complexity
    ///
    /// - *O*(1)
    #[must_use]
    pub fn from_weight(w: i32) -> Self {
        match w.rem_euclid(3) {
            0 => Relation::Same,
            1 => Relation::Dominates,
            _ => Relation::DominatedBy,
        }
    }

    /// `{0, 1, 2}`の重みを返す
    ///
    /// # Time complexity
    ///
    /// - *O*(1)
    #[must_use]
    pub fn weight(self) -> i32 {
        match self {
            Relation::Same => 0,
            Relation::Dominates => 1,
            Relation::DominatedBy => 2,
        }
    }

    /// `union_sets`に渡せる`{0, 1}`の値を関係に変換する
    pub fn from_assertion(rel: i32) -> Result<Self> {
        match rel {
            0 => Ok(Relation::Same),
            1 => Ok(Relation::Dominates),
            _ => Err(Error::InvalidRelation(rel)),
        }
    }
}

impl Add for Relation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_weight(self.weight() + rhs.weight())
    }
}

impl Sub for Relation {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_weight(self.weight() - rhs.weight())
    }
}

impl Neg for Relation {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_weight(-self.weight())
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.weight())
    }
}
