//! Multi-predicate lookup over the product/transaction join.
//!
//! Each criterion becomes an optional predicate. Absent criteria are
//! pass-through and present ones are ANDed. The join is an inner join, so
//! products without transactions never match, and a product is returned once
//! per matching transaction row.

use crate::entities::{inventory_details, inventory_master, TransactionStatus};
use chrono::{Duration, NaiveDate};
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select,
};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::IntoParams;

/// Optional filter criteria accepted by `GET /inventory/filter`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InventoryFilterCriteria {
    /// Exact product name
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Inclusive lower bound on unit price
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<f64>,
    /// Inclusive upper bound on unit price
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub supplier_id: Option<i64>,
    /// Calendar day (UTC) the product was added, `YYYY-MM-DD`
    #[param(value_type = Option<String>, format = Date)]
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_added: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub transaction_status: Option<TransactionStatus>,
    pub transaction_type: Option<String>,
}

/// Reads `key=` the same as an absent key. Text criteria keep the empty
/// string, which matches only empty values.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

impl InventoryFilterCriteria {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

pub fn product_name_is(name: Option<&str>) -> Option<SimpleExpr> {
    name.map(|n| inventory_master::Column::ProductName.eq(n))
}

pub fn category_is(category: Option<&str>) -> Option<SimpleExpr> {
    category.map(|c| inventory_master::Column::Category.eq(c))
}

pub fn brand_is(brand: Option<&str>) -> Option<SimpleExpr> {
    brand.map(|b| inventory_master::Column::Brand.eq(b))
}

pub fn price_at_least(min_price: Option<f64>) -> Option<SimpleExpr> {
    min_price.map(|p| inventory_master::Column::UnitPrice.gte(p))
}

pub fn price_at_most(max_price: Option<f64>) -> Option<SimpleExpr> {
    max_price.map(|p| inventory_master::Column::UnitPrice.lte(p))
}

pub fn supplier_is(supplier_id: Option<i64>) -> Option<SimpleExpr> {
    supplier_id.map(|s| inventory_master::Column::SupplierId.eq(s))
}

/// Matches the whole UTC day: `[date 00:00, date + 1 00:00)`.
pub fn added_on(date: Option<NaiveDate>) -> Option<SimpleExpr> {
    let start = date?.and_hms_opt(0, 0, 0)?.and_utc();
    let end = start + Duration::days(1);
    Some(
        inventory_master::Column::DateAdded
            .gte(start)
            .and(inventory_master::Column::DateAdded.lt(end)),
    )
}

pub fn status_is(status: Option<TransactionStatus>) -> Option<SimpleExpr> {
    status.map(|s| inventory_details::Column::TransactionStatus.eq(s))
}

pub fn transaction_type_is(transaction_type: Option<&str>) -> Option<SimpleExpr> {
    transaction_type.map(|t| inventory_details::Column::TransactionType.eq(t))
}

/// ANDs every present predicate.
pub fn filter_condition(criteria: &InventoryFilterCriteria) -> Condition {
    Condition::all()
        .add_option(product_name_is(criteria.product_name.as_deref()))
        .add_option(category_is(criteria.category.as_deref()))
        .add_option(brand_is(criteria.brand.as_deref()))
        .add_option(price_at_least(criteria.min_price))
        .add_option(price_at_most(criteria.max_price))
        .add_option(supplier_is(criteria.supplier_id))
        .add_option(added_on(criteria.date_added))
        .add_option(status_is(criteria.transaction_status))
        .add_option(transaction_type_is(criteria.transaction_type.as_deref()))
}

/// Builds the joined lookup. Rows are not de-duplicated.
pub fn build_filter_query(criteria: &InventoryFilterCriteria) -> Select<inventory_master::Entity> {
    let mut query = inventory_master::Entity::find().join(
        JoinType::InnerJoin,
        inventory_master::Relation::InventoryDetails.def(),
    );

    let condition = filter_condition(criteria);
    if !condition.is_empty() {
        query = query.filter(condition);
    }

    query
        .order_by_asc(inventory_master::Column::ProductId)
        .order_by_asc(inventory_details::Column::TransactionId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use axum::extract::Query;
    use axum::http::Uri;
    use sea_orm::{DbBackend, QueryTrait};

    fn parse(query: &str) -> InventoryFilterCriteria {
        let uri: Uri = format!("/inventory/filter?{query}").parse().unwrap();
        Query::<InventoryFilterCriteria>::try_from_uri(&uri).unwrap().0
    }

    fn sql(criteria: &InventoryFilterCriteria) -> String {
        build_filter_query(criteria)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn empty_criteria_is_a_bare_inner_join() {
        let criteria = InventoryFilterCriteria::default();
        assert!(criteria.is_empty());

        let rendered = sql(&criteria);
        assert!(rendered.contains("INNER JOIN \"inventory_details\""));
        assert!(!rendered.contains("WHERE"));
    }

    #[rstest]
    #[case::product_name(
        InventoryFilterCriteria { product_name: Some("Widget".into()), ..Default::default() },
        "\"inventory_master\".\"product_name\" = 'Widget'"
    )]
    #[case::category(
        InventoryFilterCriteria { category: Some("Tools".into()), ..Default::default() },
        "\"inventory_master\".\"category\" = 'Tools'"
    )]
    #[case::brand(
        InventoryFilterCriteria { brand: Some("Acme".into()), ..Default::default() },
        "\"inventory_master\".\"brand\" = 'Acme'"
    )]
    #[case::min_price(
        InventoryFilterCriteria { min_price: Some(5.0), ..Default::default() },
        "\"inventory_master\".\"unit_price\" >="
    )]
    #[case::max_price(
        InventoryFilterCriteria { max_price: Some(15.0), ..Default::default() },
        "\"inventory_master\".\"unit_price\" <="
    )]
    #[case::supplier(
        InventoryFilterCriteria { supplier_id: Some(77), ..Default::default() },
        "\"inventory_master\".\"supplier_id\" = 77"
    )]
    #[case::status(
        InventoryFilterCriteria {
            transaction_status: Some(TransactionStatus::Completed),
            ..Default::default()
        },
        "\"inventory_details\".\"transaction_status\" = 'completed'"
    )]
    #[case::transaction_type(
        InventoryFilterCriteria { transaction_type: Some("sale".into()), ..Default::default() },
        "\"inventory_details\".\"transaction_type\" = 'sale'"
    )]
    fn single_predicate_renders(
        #[case] criteria: InventoryFilterCriteria,
        #[case] fragment: &str,
    ) {
        let rendered = sql(&criteria);
        assert!(
            rendered.contains(fragment),
            "expected `{fragment}` in `{rendered}`"
        );
        assert_eq!(rendered.matches("WHERE").count(), 1);
    }

    #[test]
    fn date_added_covers_the_whole_day() {
        let criteria = InventoryFilterCriteria {
            date_added: NaiveDate::from_ymd_opt(2024, 3, 9),
            ..Default::default()
        };

        let rendered = sql(&criteria);
        assert!(rendered.contains("\"inventory_master\".\"date_added\" >= '2024-03-09"));
        assert!(rendered.contains("\"inventory_master\".\"date_added\" < '2024-03-10"));
    }

    #[test]
    fn absent_predicates_contribute_nothing() {
        assert!(product_name_is(None).is_none());
        assert!(price_at_least(None).is_none());
        assert!(added_on(None).is_none());
        assert!(status_is(None).is_none());
    }

    #[test]
    fn combined_predicates_are_anded() {
        let criteria = InventoryFilterCriteria {
            category: Some("Tools".into()),
            min_price: Some(1.0),
            max_price: Some(2.0),
            transaction_type: Some("restock".into()),
            ..Default::default()
        };

        let rendered = sql(&criteria);
        let where_clause = rendered.split("WHERE").nth(1).unwrap();
        assert_eq!(where_clause.matches(" AND ").count(), 3);
        assert!(!where_clause.contains(" OR "));
    }

    #[test]
    fn empty_typed_values_are_absent() {
        let criteria =
            parse("minPrice=&maxPrice=&supplierId=&dateAdded=&transactionStatus=");
        assert!(criteria.is_empty());
    }

    #[test]
    fn empty_text_values_are_kept() {
        let criteria = parse("productName=&brand=Acme");
        assert_eq!(criteria.product_name.as_deref(), Some(""));
        assert_eq!(criteria.brand.as_deref(), Some("Acme"));
    }

    #[test]
    fn typed_values_still_parse() {
        let criteria = parse("minPrice=2.5&supplierId=7&dateAdded=2024-03-09&transactionStatus=CANCELLED");
        assert_eq!(criteria.min_price, Some(2.5));
        assert_eq!(criteria.supplier_id, Some(7));
        assert_eq!(criteria.date_added, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(criteria.transaction_status, Some(TransactionStatus::Cancelled));
    }

    #[test]
    fn malformed_typed_values_are_rejected() {
        let uri: Uri = "/inventory/filter?minPrice=cheap".parse().unwrap();
        assert!(Query::<InventoryFilterCriteria>::try_from_uri(&uri).is_err());
    }
}
