use serde::{Deserialize, Serialize};

use crate::errors::{DbError, Result};

/// Ask the backend to plan (and with `analyze`, execute) the query and report on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExplainOptions {
    #[serde(default)]
    pub analyze: bool,
}

/// Execution hints attached with [`Query::with_run_options`](super::Query::with_run_options).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOption {
    Explain(ExplainOptions),
}

impl RunOption {
    #[must_use]
    pub const fn explain(analyze: bool) -> Self {
        Self::Explain(ExplainOptions { analyze })
    }
}

impl From<ExplainOptions> for RunOption {
    fn from(e: ExplainOptions) -> Self {
        Self::Explain(e)
    }
}

/// Options accumulated on a query. Each kind may be set once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSettings {
    pub explain: Option<ExplainOptions>,
}

impl RunSettings {
    pub(crate) fn apply(&mut self, opt: Option<RunOption>) -> Result<()> {
        match opt {
            None => Err(DbError::InvalidOption("run option cannot be None".into())),
            Some(RunOption::Explain(e)) => {
                if self.explain.is_some() {
                    return Err(DbError::DuplicateOption("ExplainOptions"));
                }
                self.explain = Some(e);
                Ok(())
            }
        }
    }
}
