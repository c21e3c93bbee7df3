//! The fixed fourteen-tag simplification strategy vocabulary (spec §4.5, GLOSSARY).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyCode {
    #[serde(rename = "AS+")]
    AS,
    #[serde(rename = "DL+")]
    DL,
    #[serde(rename = "EXP+")]
    EXP,
    #[serde(rename = "IN+")]
    IN,
    #[serde(rename = "MOD+")]
    MOD,
    #[serde(rename = "MT+")]
    MT,
    #[serde(rename = "OM+")]
    OM,
    #[serde(rename = "PRO+")]
    PRO,
    #[serde(rename = "RF+")]
    RF,
    #[serde(rename = "RD+")]
    RD,
    #[serde(rename = "RP+")]
    RP,
    #[serde(rename = "SL+")]
    SL,
    #[serde(rename = "TA+")]
    TA,
    #[serde(rename = "MV+")]
    MV,
}

impl StrategyCode {
    pub const ALL: [StrategyCode; 14] = [
        StrategyCode::AS,
        StrategyCode::DL,
        StrategyCode::EXP,
        StrategyCode::IN,
        StrategyCode::MOD,
        StrategyCode::MT,
        StrategyCode::OM,
        StrategyCode::PRO,
        StrategyCode::RF,
        StrategyCode::RD,
        StrategyCode::RP,
        StrategyCode::SL,
        StrategyCode::TA,
        StrategyCode::MV,
    ];

    pub fn as_tag(&self) -> &'static str {
        match self {
            StrategyCode::AS => "AS+",
            StrategyCode::DL => "DL+",
            StrategyCode::EXP => "EXP+",
            StrategyCode::IN => "IN+",
            StrategyCode::MOD => "MOD+",
            StrategyCode::MT => "MT+",
            StrategyCode::OM => "OM+",
            StrategyCode::PRO => "PRO+",
            StrategyCode::RF => "RF+",
            StrategyCode::RD => "RD+",
            StrategyCode::RP => "RP+",
            StrategyCode::SL => "SL+",
            StrategyCode::TA => "TA+",
            StrategyCode::MV => "MV+",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_tag() == tag)
    }

    /// Human-readable Portuguese name, for evidence strings and export headers.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyCode::AS => "Alteração de sentido",
            StrategyCode::DL => "Reorganização (deslocamento)",
            StrategyCode::EXP => "Explicitação",
            StrategyCode::IN => "Inserção",
            StrategyCode::MOD => "Reinterpretação",
            StrategyCode::MT => "Otimização de título",
            StrategyCode::OM => "Supressão seletiva",
            StrategyCode::PRO => "Desvio semântico",
            StrategyCode::RF => "Reescrita global",
            StrategyCode::RD => "Estruturação de conteúdo",
            StrategyCode::RP => "Fragmentação sintática",
            StrategyCode::SL => "Adequação de vocabulário",
            StrategyCode::TA => "Clareza referencial",
            StrategyCode::MV => "Mudança de voz",
        }
    }

    /// True for tags the Classifier may never auto-emit (PRO+) or only
    /// emits when explicitly enabled (OM+).
    pub fn requires_human_origin(&self) -> bool {
        matches!(self, StrategyCode::PRO)
    }
}

impl fmt::Display for StrategyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_tag() {
        for code in StrategyCode::ALL {
            assert_eq!(StrategyCode::from_tag(code.as_tag()), Some(code));
        }
    }

    #[test]
    fn unknown_tag_is_none() {
        assert_eq!(StrategyCode::from_tag("ZZZ"), None);
    }

    #[test]
    fn pro_requires_human_origin() {
        assert!(StrategyCode::PRO.requires_human_origin());
        assert!(!StrategyCode::OM.requires_human_origin());
    }
}
