use crate::error::TabularError;
use crate::spreadsheet::cell::CellValue;
use glob::Pattern;
use std::collections::HashSet;

/// Criteria for selecting sheets and interpreting their values during analysis.
#[derive(Clone, Debug)]
pub struct Criteria {
    /// Sheet name patterns for filtering which sheets to analyze.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Maximum number of non-empty sheets to analyze.
    pub sheet_limit: Option<usize>,

    /// Text literals treated as null (default: empty string).
    pub nulls: HashSet<String>,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            sheet_name_patterns: None,
            sheet_limit: None,
            nulls: HashSet::from([String::new()]),
        }
    }
}

impl Criteria {
    /// Builds criteria that only accept sheets matching one of the glob patterns.
    pub fn with_sheet_patterns(patterns: &[&str]) -> Result<Self, TabularError> {
        let patterns = patterns
            .iter()
            .map(|pattern| Pattern::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Criteria {
            sheet_name_patterns: Some(patterns),
            ..Criteria::default()
        })
    }

    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }

    /// Returns true if the value counts as null: absent, or one of the null literals.
    pub fn is_null(&self, value: &CellValue) -> bool {
        value.is_null(&self.nulls)
    }
}
