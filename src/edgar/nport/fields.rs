//! Where each N-PORT fact lives and what it falls back to.
//!
//! Every scalar follows the same rule: take the first element with the tag inside
//! the scope, trim it and convert it; when the tag is missing, or a number does not
//! parse, use the default. Integer fields have no default and stay `None`.

use log::warn;

use super::document::Element;
use super::FieldIssue;

pub struct TextField {
    pub tag: &'static str,
    pub default: &'static str,
}

pub struct DecimalField {
    pub tag: &'static str,
    pub default: f64,
}

pub struct IntegerField {
    pub tag: &'static str,
}

// Fund level
pub const REPORT_PERIOD_DATE: TextField = TextField {
    tag: "repPdDate",
    default: "",
};
pub const CIK: IntegerField = IntegerField { tag: "cik" };
pub const SERIES_NAME: TextField = TextField {
    tag: "seriesName",
    default: "",
};
pub const SERIES_ID: TextField = TextField {
    tag: "seriesId",
    default: "",
};
pub const TOTAL_ASSETS: DecimalField = DecimalField {
    tag: "totAssets",
    default: 0.0,
};
pub const NET_ASSETS: DecimalField = DecimalField {
    tag: "netAssets",
    default: 0.0,
};

// Repeated elements
pub const TICKER_TAG: &str = "CLASS-CONTRACT-TICKER-SYMBOL";
pub const HOLDING_TAG: &str = "invstOrSec";

// Holding level, read inside each `invstOrSec`
pub const HOLDING_NAME: TextField = TextField {
    tag: "name",
    default: "N/A",
};
pub const HOLDING_TITLE: TextField = TextField {
    tag: "title",
    default: "N/A",
};
pub const HOLDING_BALANCE: DecimalField = DecimalField {
    tag: "balance",
    default: 0.0,
};
pub const HOLDING_VALUE: DecimalField = DecimalField {
    tag: "valUSD",
    default: 0.0,
};
pub const HOLDING_ASSET_CATEGORY: TextField = TextField {
    tag: "assetCat",
    default: "OTHER",
};

/// Trimmed text of the first `tag` element in scope.
fn raw_value(scope: Element<'_>, tag: &str) -> Option<String> {
    scope.find(tag).map(|e| e.text().trim().to_string())
}

fn unparsable(source_name: &str, tag: &'static str, raw: String, issues: &mut Vec<FieldIssue>) {
    warn!(
        "{}: <{}> value '{}' is not a number, using the default",
        source_name, tag, raw
    );
    issues.push(FieldIssue::UnparsableNumber { tag, raw });
}

impl TextField {
    pub fn read(&self, scope: Element<'_>) -> String {
        raw_value(scope, self.tag).unwrap_or_else(|| self.default.to_string())
    }
}

impl DecimalField {
    pub fn read(
        &self,
        scope: Element<'_>,
        source_name: &str,
        issues: &mut Vec<FieldIssue>,
    ) -> f64 {
        match raw_value(scope, self.tag) {
            None => self.default,
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) => value,
                Err(_) => {
                    unparsable(source_name, self.tag, raw, issues);
                    self.default
                }
            },
        }
    }
}

impl IntegerField {
    pub fn read(
        &self,
        scope: Element<'_>,
        source_name: &str,
        issues: &mut Vec<FieldIssue>,
    ) -> Option<u64> {
        let raw = raw_value(scope, self.tag)?;
        match raw.parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => {
                unparsable(source_name, self.tag, raw, issues);
                None
            }
        }
    }
}
