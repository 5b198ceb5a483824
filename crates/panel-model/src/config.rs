//! Engine configuration.
//!
//! Every recognized entity list, header keyword and label rule lives here and
//! is passed explicitly to the components that need it. [`EngineConfig::default`]
//! carries the built-in lists; a TOML file can override any section.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gap_policy: GapPolicy,
    pub locations: LocationConfig,
    pub labels: LabelConfig,
    pub columns: ColumnConfig,
    pub files: FileConfig,
    pub fx: FxConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|source| ModelError::ConfigParse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|source| ModelError::ConfigSerialize { source })
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.locations.targets.is_empty() {
            return Err(invalid("locations.targets must not be empty"));
        }
        if self.locations.aggregate.trim().is_empty() {
            return Err(invalid("locations.aggregate must not be empty"));
        }
        if self.columns.export_keyword.is_empty() || self.columns.import_keyword.is_empty() {
            return Err(invalid("columns export/import keywords must not be empty"));
        }
        if self.columns.export_keyword == self.columns.import_keyword {
            return Err(invalid("columns export and import keywords must differ"));
        }
        if self.fx.triad_rows.len() != 3 {
            return Err(invalid("fx.triad_rows must name exactly three rows"));
        }
        Ok(())
    }

    /// Output order of entities: aggregate, national targets, regional entities.
    ///
    /// Regional names are passed through `normalize` so they match the
    /// normalized entity identity.
    pub fn entity_order(&self, normalize: impl Fn(&str) -> String) -> Vec<String> {
        let mut order = vec![self.locations.aggregate.clone()];
        for target in &self.locations.targets {
            if *target == self.locations.aggregate_source {
                continue;
            }
            if !order.contains(target) {
                order.push(target.clone());
            }
        }
        for regional in &self.locations.regional {
            let name = normalize(regional);
            if !order.contains(&name) {
                order.push(name);
            }
        }
        order
    }
}

fn invalid(message: &str) -> ModelError {
    ModelError::InvalidConfig {
        message: message.to_string(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Entity lists for both feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// National entities kept from national extracts.
    pub targets: Vec<String>,
    /// Label of the aggregate row in national extracts.
    pub aggregate_source: String,
    /// Canonical identifier of the aggregate entity.
    pub aggregate: String,
    /// Raw labels of regional sub-entities.
    pub regional: Vec<String>,
    /// Regional total row, always excluded.
    pub regional_total: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            targets: strings(&[
                "总值", "北京市", "上海市", "深圳市", "南京市", "合肥市", "浙江省", "杭州市",
                "宁波市", "温州市", "湖州市", "金华市", "台州市", "嘉兴市", "丽水市", "衢州市",
                "绍兴市", "舟山市",
            ]),
            aggregate_source: "总值".to_string(),
            aggregate: "全国".to_string(),
            regional: strings(&[
                "杭州地区", "宁波地区", "温州地区", "湖州地区", "嘉兴地区", "绍兴地区",
                "金华地区", "衢州地区", "台州地区", "丽水地区", "舟山地区",
            ]),
            regional_total: "合计".to_string(),
        }
    }
}

/// One rule of the label normalization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelRule {
    /// Whole-label replacement.
    Exact { from: String, to: String },
    /// Replaces a trailing suffix.
    Suffix { from: String, to: String },
    /// Any label containing `keyword` maps to `canonical`.
    Contains { keyword: String, canonical: String },
}

/// Label normalization and category settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub rules: Vec<LabelRule>,
    /// Canonical product categories in display order.
    pub categories: Vec<String>,
    /// Category recovered by subtraction when absent.
    pub other_category: String,
    /// Label of a block's total row.
    pub total_label: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            rules: vec![LabelRule::Suffix {
                from: "地区".to_string(),
                to: "市".to_string(),
            }],
            categories: strings(&[
                "农产品",
                "矿产品",
                "化学制品",
                "纺织服装",
                "木制品",
                "金属石料制品",
                "电子设备",
                "交通设备",
                "其他制品",
            ]),
            other_category: "其他制品".to_string(),
            total_label: "总值".to_string(),
        }
    }
}

/// Header keywords and names used by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Header text of combined flows; ignored when looking for export/import keywords.
    pub combined_keyword: String,
    pub export_keyword: String,
    pub import_keyword: String,
    pub regional_entity: String,
    pub regional_combined_ytd: String,
    pub regional_export_ytd: String,
    pub regional_import_ytd: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            combined_keyword: "进出口".to_string(),
            export_keyword: "出口".to_string(),
            import_keyword: "进口".to_string(),
            regional_entity: "收发货人所在地".to_string(),
            regional_combined_ytd: "当期进出口".to_string(),
            regional_export_ytd: "当期出口".to_string(),
            regional_import_ytd: "当期进口".to_string(),
        }
    }
}

/// Extract file naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Prefix of regional extract file names, followed by `YYYY-MM.csv`.
    pub regional_prefix: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            regional_prefix: "浙江省-".to_string(),
        }
    }
}

/// How the differencer fills a month whose predecessor YTD is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Current value becomes zero.
    #[default]
    Zero,
    /// Current value stays undefined.
    Missing,
}

/// FX sheet layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// Zero-based line of the period header row in the sheet export.
    pub header_line: usize,
    pub settlement_label: String,
    pub sale_label: String,
    pub balance_label: String,
    pub forward_signed_label: String,
    pub forward_outstanding_label: String,
    pub current_account_keyword: String,
    pub capital_account_keyword: String,
    /// Second-column labels of a triad, in order.
    pub triad_rows: Vec<String>,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            header_line: 3,
            settlement_label: "一、结汇".to_string(),
            sale_label: "二、售汇".to_string(),
            balance_label: "三、差额".to_string(),
            forward_signed_label: "四、远期结售汇签约额".to_string(),
            forward_outstanding_label: "七、本期末远期结售汇累计未到期额".to_string(),
            current_account_keyword: "经常项目".to_string(),
            capital_account_keyword: "资本与金融项目".to_string(),
            triad_rows: strings(&["结汇", "售汇", "差额"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
gap_policy = "missing"

[files]
regional_prefix = "江苏省-"
"#,
        )
        .unwrap();
        assert_eq!(config.gap_policy, GapPolicy::Missing);
        assert_eq!(config.files.regional_prefix, "江苏省-");
        assert_eq!(config.locations.aggregate, "全国");
    }

    #[test]
    fn test_label_rules_parse_tagged() {
        let config = EngineConfig::from_toml_str(
            r#"
[[labels.rules]]
kind = "contains"
keyword = "农"
canonical = "农产品"
"#,
        )
        .unwrap();
        assert_eq!(
            config.labels.rules,
            vec![LabelRule::Contains {
                keyword: "农".into(),
                canonical: "农产品".into()
            }]
        );
    }

    #[test]
    fn test_validate_rejects_bad_triads() {
        let err = EngineConfig::from_toml_str("[fx]\ntriad_rows = [\"结汇\"]").unwrap_err();
        assert!(err.to_string().contains("triad_rows"));
    }

    #[test]
    fn test_entity_order() {
        let config = EngineConfig::default();
        let order = config.entity_order(|name| name.replace("地区", "市"));
        assert_eq!(order[0], "全国");
        assert_eq!(order[1], "北京市");
        assert!(!order.contains(&"总值".to_string()));
        // 杭州市 is both a national target and a regional entity.
        assert_eq!(order.iter().filter(|n| *n == "杭州市").count(), 1);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
