//! Pass-through to the analytical procedures that live in the database.
//!
//! Each procedure is called with named arguments and every result row comes
//! back as a JSON object, so whatever columns a procedure returns are
//! republished unchanged apart from synonym coalescing.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::{
    database::Database,
    error::{AppError, AppResult},
};

/// Canonical field name followed by the column names it may arrive under, in
/// order of preference.
pub type Synonyms = &'static [(&'static str, &'static [&'static str])];

pub const REPORT_SYNONYMS: Synonyms = &[
    ("ProductName", &["product_name", "ProductName"]),
    ("SupplierName", &["supplier_name", "SupplierName"]),
    ("ShopName", &["shop_name", "ShopName"]),
];

pub const SALES_ANALYSIS_FIELDS: Synonyms = &[
    ("product_id", &["product_id", "ProductID"]),
    ("ProductName", &["product_name", "ProductName"]),
    ("SupplierName", &["supplier_name", "SupplierName"]),
    ("TotalQuantitySold", &["total_quantity_sold", "TotalQuantitySold"]),
    ("TotalRevenue", &["total_revenue", "TotalRevenue"]),
    ("NumberOfOrders", &["number_of_orders", "NumberOfOrders"]),
    ("NumberOfShops", &["number_of_shops", "NumberOfShops"]),
];

#[derive(Debug, Clone, PartialEq)]
pub enum ReportParam {
    Int(i32),
    Text(String),
    Decimal(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastInterval {
    Month,
    Minutes(i32),
}

impl ForecastInterval {
    pub const DEFAULT_MINUTES: i32 = 5;

    /// Anything other than `minute` forecasts by month.
    pub fn from_query(interval: Option<&str>, minutes: Option<i32>) -> AppResult<Self> {
        match interval {
            Some("minute") => {
                let minutes = minutes.unwrap_or(Self::DEFAULT_MINUTES);
                if minutes <= 0 {
                    return Err(AppError::invalid("Interval minutes must be positive"));
                }
                Ok(ForecastInterval::Minutes(minutes))
            }
            _ => Ok(ForecastInterval::Month),
        }
    }

    fn params(self) -> (&'static str, i32) {
        match self {
            ForecastInterval::Month => ("month", 1),
            ForecastInterval::Minutes(m) => ("minute", m),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    pub procedure: &'static str,
    pub args: Vec<(&'static str, ReportParam)>,
}

impl ProcedureCall {
    pub fn sales_forecast(product_id: i32, interval: ForecastInterval) -> Self {
        let (interval_type, interval_value) = interval.params();
        Self {
            procedure: "sp_generate_sales_forecast",
            args: vec![
                ("p_product_id", ReportParam::Int(product_id)),
                ("p_interval_type", ReportParam::Text(interval_type.to_string())),
                ("p_interval_value", ReportParam::Int(interval_value)),
            ],
        }
    }

    pub fn generate_sales_forecast(product_id: i32, periods: i32, alpha: Decimal) -> Self {
        Self {
            procedure: "sp_generate_sales_forecast",
            args: vec![
                ("p_product_id", ReportParam::Int(product_id)),
                ("p_forecast_periods", ReportParam::Int(periods)),
                ("p_alpha", ReportParam::Decimal(alpha)),
            ],
        }
    }

    /// Without thresholds the procedure applies its own defaults.
    pub fn product_associations(thresholds: Option<(Decimal, Decimal)>) -> Self {
        let args = match thresholds {
            Some((min_support, min_confidence)) => vec![
                ("p_min_support", ReportParam::Decimal(min_support)),
                ("p_min_confidence", ReportParam::Decimal(min_confidence)),
            ],
            None => Vec::new(),
        };
        Self { procedure: "sp_generate_product_associations", args }
    }

    pub fn customer_segments() -> Self {
        Self { procedure: "sp_generate_customer_segments", args: Vec::new() }
    }

    pub fn product_recommendations(shop_id: i32) -> Self {
        Self {
            procedure: "sp_generate_product_recommendations",
            args: vec![("p_shop_id", ReportParam::Int(shop_id))],
        }
    }

    pub fn sql(&self) -> String {
        let args = self
            .args
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{} => ${}", name, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT to_jsonb(r) FROM {}({}) AS r", self.procedure, args)
    }
}

/// Moves every synonym of a canonical field onto the canonical name. The first
/// non-null synonym wins; other fields are left as they are.
pub fn normalize_row(row: Value, synonyms: Synonyms) -> Value {
    let mut fields = match row {
        Value::Object(fields) => fields,
        other => return other,
    };

    for (canonical, aliases) in synonyms {
        let mut present = false;
        let mut chosen: Option<Value> = None;
        for alias in aliases.iter() {
            if let Some(value) = fields.remove(*alias) {
                present = true;
                if chosen.is_none() && !value.is_null() {
                    chosen = Some(value);
                }
            }
        }
        if present {
            fields.insert(canonical.to_string(), chosen.unwrap_or(Value::Null));
        }
    }

    Value::Object(fields)
}

/// Keeps only the canonical fields, filling absent ones with null.
pub fn project_row(row: Value, fields: Synonyms) -> Value {
    let Value::Object(normalized) = normalize_row(row, fields) else {
        return Value::Null;
    };

    let projected: Map<String, Value> = fields
        .iter()
        .map(|(canonical, _)| {
            let value = normalized.get(*canonical).cloned().unwrap_or(Value::Null);
            (canonical.to_string(), value)
        })
        .collect();

    Value::Object(projected)
}

pub async fn run_procedure(db: &Database, call: &ProcedureCall) -> AppResult<Vec<Value>> {
    let sql = call.sql();
    let mut query = sqlx::query_scalar::<_, Value>(&sql);
    for (_, param) in &call.args {
        query = match param {
            ReportParam::Int(v) => query.bind(*v),
            ReportParam::Text(v) => query.bind(v.as_str()),
            ReportParam::Decimal(v) => query.bind(*v),
        };
    }

    let rows = query.fetch_all(db).await?;
    log::debug!("{} returned {} rows", call.procedure, rows.len());

    Ok(rows
        .into_iter()
        .map(|row| normalize_row(row, REPORT_SYNONYMS))
        .collect())
}

pub async fn product_sales_analysis(db: &Database, supplier_id: Option<i32>) -> AppResult<Vec<Value>> {
    let rows = sqlx::query_scalar::<_, Value>(
        r#"
        SELECT to_jsonb(v)
        FROM vw_product_sales_analysis v
        WHERE $1::INTEGER IS NULL OR v.supplier_id = $1
        ORDER BY v.product_id
        "#,
    )
    .bind(supplier_id)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| project_row(row, SALES_ANALYSIS_FIELDS))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forecast_call_uses_named_arguments() {
        let call = ProcedureCall::sales_forecast(7, ForecastInterval::Minutes(15));
        assert_eq!(
            call.sql(),
            "SELECT to_jsonb(r) FROM sp_generate_sales_forecast(p_product_id => $1, p_interval_type => $2, p_interval_value => $3) AS r"
        );
        assert_eq!(call.args[1].1, ReportParam::Text("minute".to_string()));
        assert_eq!(call.args[2].1, ReportParam::Int(15));
    }

    #[test]
    fn procedures_without_arguments_have_empty_parens() {
        assert_eq!(
            ProcedureCall::customer_segments().sql(),
            "SELECT to_jsonb(r) FROM sp_generate_customer_segments() AS r"
        );
        assert!(ProcedureCall::product_associations(None).args.is_empty());
    }

    #[test]
    fn interval_defaults_to_month() {
        assert_eq!(ForecastInterval::from_query(None, None).unwrap(), ForecastInterval::Month);
        assert_eq!(
            ForecastInterval::from_query(Some("week"), Some(3)).unwrap(),
            ForecastInterval::Month
        );
        assert_eq!(
            ForecastInterval::from_query(Some("minute"), None).unwrap(),
            ForecastInterval::Minutes(5)
        );
        assert!(ForecastInterval::from_query(Some("minute"), Some(0)).is_err());
    }

    #[test]
    fn synonyms_collapse_onto_canonical_name() {
        let row = json!({ "product_name": "Soap", "ProductName": "Ignored", "forecast": 12 });
        let normalized = normalize_row(row, REPORT_SYNONYMS);
        assert_eq!(normalized, json!({ "ProductName": "Soap", "forecast": 12 }));
    }

    #[test]
    fn null_synonym_falls_back_to_the_next() {
        let row = json!({ "supplier_name": null, "SupplierName": "Acme" });
        assert_eq!(normalize_row(row, REPORT_SYNONYMS), json!({ "SupplierName": "Acme" }));
    }

    #[test]
    fn analysis_rows_are_projected_to_canonical_fields() {
        let row = json!({
            "product_id": 5,
            "supplier_id": 2,
            "product_name": "Soap",
            "supplier_name": "Acme",
            "total_quantity_sold": 10,
            "total_revenue": 152.5,
            "number_of_orders": 1,
            "number_of_shops": 1
        });

        assert_eq!(
            project_row(row, SALES_ANALYSIS_FIELDS),
            json!({
                "product_id": 5,
                "ProductName": "Soap",
                "SupplierName": "Acme",
                "TotalQuantitySold": 10,
                "TotalRevenue": 152.5,
                "NumberOfOrders": 1,
                "NumberOfShops": 1
            })
        );
    }

    #[test]
    fn non_object_rows_pass_through() {
        assert_eq!(normalize_row(json!([1, 2]), REPORT_SYNONYMS), json!([1, 2]));
    }
}
