use std::fmt;
use std::str::FromStr;

use super::error::MiningError;
use super::Item;

/// Validated mining thresholds.
///
/// * `sigma`: minimum support, the summed weight of supporting transactions
/// * `gamma`: maximum number of irrelevant items between two matched items
/// * `lambda`: maximum pattern length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningParams {
    sigma: u64,
    gamma: u32,
    lambda: u32,
}

impl MiningParams {
    pub fn new(sigma: u64, gamma: u32, lambda: u32) -> Result<Self, MiningError> {
        if sigma < 1 {
            return Err(MiningError::InvalidParameter {
                name: "sigma",
                value: sigma as i64,
                reason: "minimum support must be at least 1",
            });
        }
        if lambda < 1 {
            return Err(MiningError::InvalidParameter {
                name: "lambda",
                value: i64::from(lambda),
                reason: "maximum pattern length must be at least 1",
            });
        }
        Ok(Self {
            sigma,
            gamma,
            lambda,
        })
    }

    /// Validates parameters arriving as signed integers, e.g. from bindings.
    pub fn from_signed(sigma: i64, gamma: i64, lambda: i64) -> Result<Self, MiningError> {
        let sigma = u64::try_from(sigma).map_err(|_| MiningError::InvalidParameter {
            name: "sigma",
            value: sigma,
            reason: "minimum support must be at least 1",
        })?;
        let gamma = u32::try_from(gamma).map_err(|_| MiningError::InvalidParameter {
            name: "gamma",
            value: gamma,
            reason: "maximum gap must lie in 0..=u32::MAX",
        })?;
        let lambda = u32::try_from(lambda).map_err(|_| MiningError::InvalidParameter {
            name: "lambda",
            value: lambda,
            reason: "maximum pattern length must lie in 1..=u32::MAX",
        })?;
        Self::new(sigma, gamma, lambda)
    }

    pub fn sigma(&self) -> u64 {
        self.sigma
    }

    pub fn gamma(&self) -> u32 {
        self.gamma
    }

    pub fn lambda(&self) -> u32 {
        self.lambda
    }

    /// `lambda` as a length bound for slices.
    pub fn max_len(&self) -> usize {
        self.lambda as usize
    }
}

/// Inclusive range of items that qualify as pivots. Only patterns containing
/// at least one item of the range are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotRange {
    begin: Item,
    end: Item,
}

impl PivotRange {
    pub fn new(begin: Item, end: Item) -> Result<Self, MiningError> {
        if begin > end {
            return Err(MiningError::InvalidPivotRange { begin, end });
        }
        Ok(Self { begin, end })
    }

    pub fn all() -> Self {
        Self {
            begin: 0,
            end: Item::MAX,
        }
    }

    pub fn single(pivot: Item) -> Self {
        Self {
            begin: pivot,
            end: pivot,
        }
    }

    pub fn begin(&self) -> Item {
        self.begin
    }

    pub fn end(&self) -> Item {
        self.end
    }

    pub fn contains(&self, item: Item) -> bool {
        self.begin <= item && item <= self.end
    }
}

impl Default for PivotRange {
    fn default() -> Self {
        Self::all()
    }
}

/// Mining strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// Depth-first prefix growth.
    Dfs,
    /// Level-wise join.
    Bfs,
    /// Pivot-anchored growth.
    Pivot,
    /// Pivot-anchored growth with memoized right extensions.
    IndexedPivot,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Dfs,
        EngineKind::Bfs,
        EngineKind::Pivot,
        EngineKind::IndexedPivot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Dfs => "dfs",
            EngineKind::Bfs => "bfs",
            EngineKind::Pivot => "psm",
            EngineKind::IndexedPivot => "psm-index",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dfs" => Ok(EngineKind::Dfs),
            "bfs" | "join" => Ok(EngineKind::Bfs),
            "psm" | "pivot" => Ok(EngineKind::Pivot),
            "psm-index" | "psm_index" | "indexed-pivot" => Ok(EngineKind::IndexedPivot),
            _ => Err(MiningError::UnknownEngine(s.to_string())),
        }
    }
}

/// Everything a mining session needs apart from the taxonomy.
#[derive(Debug, Clone, Copy)]
pub struct MiningConfig {
    pub engine: EngineKind,
    pub params: MiningParams,
    pub pivot_range: PivotRange,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Dfs,
            params: MiningParams {
                sigma: 1,
                gamma: 0,
                lambda: 5,
            },
            pivot_range: PivotRange::all(),
        }
    }
}

impl MiningConfig {
    pub fn new(params: MiningParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_pivot_range(mut self, range: PivotRange) -> Self {
        self.pivot_range = range;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_are_validated() {
        assert!(MiningParams::new(1, 0, 1).is_ok());
        assert!(matches!(
            MiningParams::new(0, 0, 1),
            Err(MiningError::InvalidParameter { name: "sigma", .. })
        ));
        assert!(matches!(
            MiningParams::new(1, 0, 0),
            Err(MiningError::InvalidParameter { name: "lambda", .. })
        ));
        assert!(matches!(
            MiningParams::from_signed(2, -1, 3),
            Err(MiningError::InvalidParameter { name: "gamma", value: -1, .. })
        ));
        assert!(matches!(
            MiningParams::from_signed(-4, 0, 3),
            Err(MiningError::InvalidParameter { name: "sigma", value: -4, .. })
        ));
    }

    #[test]
    fn pivot_range_bounds() {
        assert!(PivotRange::new(5, 4).is_err());
        let range = PivotRange::new(2, 4).unwrap();
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5));
        assert!(PivotRange::all().contains(Item::MAX));
    }

    #[test]
    fn engine_names_round_trip() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.name().parse::<EngineKind>().unwrap(), kind);
        }
        assert_eq!("PSM".parse::<EngineKind>().unwrap(), EngineKind::Pivot);
        assert!(matches!(
            "apriori".parse::<EngineKind>(),
            Err(MiningError::UnknownEngine(name)) if name == "apriori"
        ));
    }
}
