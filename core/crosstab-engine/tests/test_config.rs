//! FILENAME: tests/test_config.rs
//! PURPOSE: JSON configuration, validation and fact query derivation.

mod common;

use common::BizFixture;
use crosstab_engine::{
    build_display_grid, AxisConfig, DimensionItem, FactTable, IndicatorMember, LayoutError,
    TableConfig,
};

const BIZ_CONFIG: &str = r#"{
    "left": {
        "type": "dimensions",
        "dimensions": [
            { "meta": { "code": "region", "name": "Region" } },
            { "meta": { "code": "biz_line", "name": "Business Line" } },
            { "meta": { "code": "sub_biz_line", "name": "Sub Business Line" } }
        ]
    },
    "head": {
        "type": "with_indicator",
        "dimensions": [{ "meta": { "code": "date", "name": "Date" } }],
        "indicator": {
            "index": 0,
            "members": [
                { "meta": { "code": "gmv", "name": "GMV" } },
                {
                    "meta": { "code": "profit", "name": "Profit" },
                    "ignore_dimensions": [{ "code": "date", "name": "Date" }]
                }
            ]
        }
    }
}"#;

#[test]
fn test_json_config_matches_fixture() {
    let config = TableConfig::from_json(BIZ_CONFIG).unwrap();
    assert_eq!(config, BizFixture::config());
}

#[test]
fn test_config_serialization_roundtrip() {
    let json = serde_json::to_string(&BizFixture::config()).unwrap();
    let config = TableConfig::from_json(&json).unwrap();
    assert_eq!(config, BizFixture::config());
}

#[test]
fn test_facts_from_json() {
    let json = serde_json::to_string(&BizFixture::facts()).unwrap();
    let facts: FactTable = FactTable::from_json(&json).unwrap();
    assert_eq!(facts.len(), 10);

    let config = TableConfig::from_json(BIZ_CONFIG).unwrap();
    let from_json = build_display_grid(&config, &facts).unwrap();
    let from_code = build_display_grid(&BizFixture::config(), &BizFixture::facts()).unwrap();
    assert_eq!(from_json.labels(), from_code.labels());
}

#[test]
fn test_invalid_configs() {
    let head = BizFixture::gmv_only_head_axis();

    let not_trailing = TableConfig::new(
        AxisConfig::dimensions(vec![
            DimensionItem::new(BizFixture::region()),
            DimensionItem::aligned(BizFixture::biz_line()),
            DimensionItem::new(BizFixture::sub_biz_line()),
        ]),
        head.clone(),
    );
    assert!(matches!(
        build_display_grid(&not_trailing, &BizFixture::facts()),
        Err(LayoutError::AlignmentNotTrailing { .. })
    ));

    let empty_indicator = TableConfig::new(
        BizFixture::left_axis(),
        AxisConfig::with_indicator(vec![], Vec::<IndicatorMember>::new(), 0),
    );
    assert!(matches!(empty_indicator.validate(), Err(LayoutError::EmptyIndicator)));

    let broken = BIZ_CONFIG.replace("\"index\": 0", "\"index\": 5");
    let err = TableConfig::from_json(&broken).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Indicator insertion index 5 is out of range for 1 dimensions"
    );
}

#[test]
fn test_fact_query() {
    let query = BizFixture::config().query();
    assert_eq!(
        query.dimensions,
        vec![
            BizFixture::region(),
            BizFixture::biz_line(),
            BizFixture::sub_biz_line(),
            BizFixture::date(),
        ]
    );
    assert_eq!(query.indicators, vec![BizFixture::gmv(), BizFixture::profit()]);
}
