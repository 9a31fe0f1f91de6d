use std::str::FromStr;

use crate::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum Strategy {
    CountCheck,
    #[default]
    UnitPropagation,
    /// 単位伝播が不動点に達したときに毎回ゼロから掃き出す (理由は遅延して求める)
    GjeFixpoint,
    /// 割り当てのたびにゼロから掃き出す (行の由来を常に追跡する)
    GjeReasoned,
    /// 簡約行階段形を行ごとに更新し続ける
    GjeIncremental,
    /// GjeIncremental と同じだが，ピボットを fill-in が最小になる列から選ぶ
    GjeTableau,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::CountCheck,
        Strategy::UnitPropagation,
        Strategy::GjeFixpoint,
        Strategy::GjeReasoned,
        Strategy::GjeIncremental,
        Strategy::GjeTableau,
    ];

    pub fn name(&self) -> &'static str {
        return match self {
            Self::CountCheck => "count-check",
            Self::UnitPropagation => "unit",
            Self::GjeFixpoint => "gje-fixpoint",
            Self::GjeReasoned => "gje-reasoned",
            Self::GjeIncremental => "gje-incremental",
            Self::GjeTableau => "gje-tableau",
        };
    }

    pub fn uses_elimination(&self) -> bool {
        return matches!(
            self,
            Self::GjeFixpoint | Self::GjeReasoned | Self::GjeIncremental | Self::GjeTableau
        );
    }
}

impl FromStr for Strategy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        return Self::ALL
            .iter()
            .find(|strategy| strategy.name() == s)
            .copied()
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()));
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct Cutoff(f64);

impl Cutoff {
    pub fn new(value: f64) -> Result<Self> {
        // NaN もここで弾かれる
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidCutoff(value));
        }
        return Ok(Self(value));
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// 関係する変数のうち割り当て済みのものの割合が閾値以上であれば true
    pub fn admits(&self, number_of_assigned: usize, number_of_relevant: usize) -> bool {
        if number_of_relevant == 0 {
            return true;
        }
        return number_of_assigned as f64 >= self.0 * number_of_relevant as f64;
    }
}

#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct EngineConfig {
    pub strategy: Strategy,
    pub cutoff: Cutoff,
    pub display: bool,
}

impl EngineConfig {
    pub fn new(strategy: Strategy, cutoff: f64, display: bool) -> Result<Self> {
        return Ok(Self {
            strategy,
            cutoff: Cutoff::new(cutoff)?,
            display,
        });
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::{Cutoff, EngineConfig, Strategy};
    use crate::Error;

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>(), Ok(strategy));
        }
        assert_eq!(
            "gauss".parse::<Strategy>(),
            Err(Error::UnknownStrategy("gauss".to_string()))
        );
    }

    #[test]
    fn test_cutoff_validation() {
        assert!(Cutoff::new(0.0).is_ok());
        assert!(Cutoff::new(1.0).is_ok());
        assert_eq!(Cutoff::new(1.5), Err(Error::InvalidCutoff(1.5)));
        assert_eq!(Cutoff::new(-0.1), Err(Error::InvalidCutoff(-0.1)));
        assert!(matches!(Cutoff::new(f64::NAN), Err(Error::InvalidCutoff(_))));
        assert!(EngineConfig::new(Strategy::GjeReasoned, 2.0, false).is_err());
    }

    #[test]
    fn test_cutoff_admits() {
        let zero = Cutoff::new(0.0).unwrap();
        assert!(zero.admits(0, 10));

        let half = Cutoff::new(0.5).unwrap();
        assert!(!half.admits(4, 10));
        assert!(half.admits(5, 10));

        let one = Cutoff::new(1.0).unwrap();
        assert!(!one.admits(9, 10));
        assert!(one.admits(10, 10));
        assert!(one.admits(0, 0));
    }
}
