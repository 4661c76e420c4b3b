use std::{fmt, str::FromStr};

use envconfig::Envconfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    ReportMissedSleep,
    Nominate,
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "report_missed_sleep" => Ok(Self::ReportMissedSleep),
            "nominate" => Ok(Self::Nominate),
            other => Err(format!("unknown flow: {other}")),
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReportMissedSleep => f.write_str("report_missed_sleep"),
            Self::Nominate => f.write_str("nominate"),
        }
    }
}

#[derive(Debug, Clone, Envconfig)]
pub struct LogConfig {
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: log::Level,
}

#[derive(Debug, Clone, Envconfig)]
pub struct FlowConfig {
    #[envconfig(from = "OPERATOR_FLOW", default = "report_missed_sleep")]
    pub flow: Flow,

    #[envconfig(from = "CHALLENGE_ID")]
    pub challenge_id: Option<String>,

    #[envconfig(from = "DAY_ID")]
    pub day_id: Option<String>,

    #[envconfig(from = "NOMINATION_PROMPT_FILE")]
    pub nomination_prompt_file: Option<String>,

    /// JSON list of candidate validators; used to build the prompt when no
    /// prompt file is given.
    #[envconfig(from = "VALIDATORS_FILE")]
    pub validators_file: Option<String>,

    /// ABI JSON replacing the built-in SleepFine interface.
    #[envconfig(from = "CONTRACT_ABI_FILE")]
    pub contract_abi_file: Option<String>,

    #[envconfig(from = "WAIT_FOR_RECEIPT", default = "false")]
    pub wait_for_receipt: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_config: LogConfig,
    pub flow_config: FlowConfig,
}

impl AppConfig {
    pub fn fetch() -> anyhow::Result<Self> {
        let log_config = LogConfig::init_from_env()
            .map_err(|e| anyhow::anyhow!("failed to load log config: {e}"))?;
        let flow_config = FlowConfig::init_from_env()
            .map_err(|e| anyhow::anyhow!("failed to load flow config: {e}"))?;

        Ok(Self {
            log_config,
            flow_config,
        })
    }
}
