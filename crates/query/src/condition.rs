//! Condition building: filter object → ordered predicate sequence.

use std::collections::BTreeMap;

use storefront_core::UserId;

use crate::filter::{Filter, FilterValue, Scalar};
use crate::normalize::normalize;

/// Column holding the owning user of a catalog row.
pub const OWNER_COLUMN: &str = "ownerId";

/// Comparison operator a condition applies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Gte,
    Lte,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
        }
    }
}

/// A single parameterized predicate, immutable once built.
///
/// Carries both the rendered template (`product.priceSubunit >= :priceSubunitGte`)
/// for query layers that splice SQL, and the structured column/operator/value
/// triple for layers that evaluate rows directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    op: CompareOp,
    value: Scalar,
    placeholder: String,
    template: String,
}

impl Condition {
    fn new(table: &str, column: String, op: CompareOp, value: Scalar, placeholder: String) -> Self {
        let template = format!("{table}.{column} {} :{placeholder}", op.as_sql());
        Self {
            column,
            op,
            value,
            placeholder,
            template,
        }
    }

    /// Normalized column the predicate restricts.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// The bound value.
    pub fn value(&self) -> &Scalar {
        &self.value
    }

    /// Parameter name; unique within one build.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Rendered predicate template with a named parameter.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter map for this condition (always a single entry).
    pub fn parameters(&self) -> BTreeMap<&str, &Scalar> {
        BTreeMap::from([(self.placeholder.as_str(), &self.value)])
    }

    /// Evaluate the predicate against a row's value for this column.
    ///
    /// `None` (column absent on the row) and incomparable kinds both fail
    /// the predicate.
    pub fn matches(&self, candidate: Option<&Scalar>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        let Some(ordering) = candidate.compare(&self.value) else {
            return false;
        };
        match self.op {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::Gte => ordering.is_ge(),
            CompareOp::Lte => ordering.is_le(),
        }
    }
}

/// Builds the condition sequence for one listing query.
///
/// The owner-scope predicate is always the first element and cannot be
/// omitted or overridden by filter input. Emission is deterministic: filter
/// entries in input order, `gte` before `lte` within a field. Presence, not
/// truthiness, decides emission, so `0` and `false` are valid filter values.
#[derive(Debug, Clone, Copy)]
pub struct ConditionBuilder {
    table: &'static str,
}

impl ConditionBuilder {
    pub fn new(table: &'static str) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// The mandatory owner-scope predicate.
    pub fn owner_condition(&self, owner: UserId) -> Condition {
        Condition::new(
            self.table,
            OWNER_COLUMN.to_string(),
            CompareOp::Eq,
            Scalar::Uuid(*owner.as_uuid()),
            OWNER_COLUMN.to_string(),
        )
    }

    /// Build the full condition sequence: owner scope first, then one
    /// condition per recognized filter restriction. Unrecognized value
    /// shapes emit nothing and raise nothing.
    pub fn build(&self, owner: UserId, filter: &Filter) -> Vec<Condition> {
        let mut conditions = vec![self.owner_condition(owner)];

        for (key, value) in filter.iter() {
            let column = normalize(key);
            match value {
                FilterValue::Scalar(scalar) => {
                    conditions.push(Condition::new(
                        self.table,
                        column.clone(),
                        CompareOp::Eq,
                        scalar.clone(),
                        column,
                    ));
                }
                FilterValue::Range(range) => {
                    if let Some(bound) = &range.gte {
                        conditions.push(Condition::new(
                            self.table,
                            column.clone(),
                            CompareOp::Gte,
                            bound.clone(),
                            format!("{column}Gte"),
                        ));
                    }
                    if let Some(bound) = &range.lte {
                        conditions.push(Condition::new(
                            self.table,
                            column.clone(),
                            CompareOp::Lte,
                            bound.clone(),
                            format!("{column}Lte"),
                        ));
                    }
                }
                FilterValue::Unrecognized => {}
            }
        }

        debug_assert!(
            {
                let mut names: Vec<&str> = conditions.iter().map(|c| c.placeholder()).collect();
                names.sort_unstable();
                names.windows(2).all(|w| w[0] != w[1])
            },
            "parameter names must be unique within one build"
        );

        conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RangeSpec;
    use proptest::prelude::*;

    fn builder() -> ConditionBuilder {
        ConditionBuilder::new("product")
    }

    fn owner() -> UserId {
        UserId::new()
    }

    #[test]
    fn empty_filter_yields_owner_scope_only() {
        let conditions = builder().build(owner(), &Filter::new());
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].column(), OWNER_COLUMN);
        assert_eq!(conditions[0].template(), "product.ownerId = :ownerId");
    }

    #[test]
    fn owner_scope_is_always_first() {
        let filter = Filter::new().with_eq("name", "widget");
        let conditions = builder().build(owner(), &filter);
        assert_eq!(conditions[0].column(), OWNER_COLUMN);
        assert_eq!(conditions[0].op(), CompareOp::Eq);
    }

    #[test]
    fn scalar_value_emits_one_equality_condition() {
        let filter = Filter::new().with_eq("name", "widget");
        let conditions = builder().build(owner(), &filter);

        assert_eq!(conditions.len(), 2);
        let cond = &conditions[1];
        assert_eq!(cond.template(), "product.name = :name");
        assert_eq!(
            cond.parameters(),
            BTreeMap::from([("name", &Scalar::Text("widget".to_string()))])
        );
    }

    #[test]
    fn range_with_both_bounds_emits_gte_before_lte() {
        let filter = Filter::new().with_range(
            "price_subunit",
            Some(Scalar::Int(100)),
            Some(Scalar::Int(500)),
        );
        let conditions = builder().build(owner(), &filter);

        assert_eq!(conditions.len(), 3);
        assert_eq!(
            conditions[1].template(),
            "product.priceSubunit >= :priceSubunitGte"
        );
        assert_eq!(conditions[1].value(), &Scalar::Int(100));
        assert_eq!(
            conditions[2].template(),
            "product.priceSubunit <= :priceSubunitLte"
        );
        assert_eq!(conditions[2].value(), &Scalar::Int(500));
    }

    #[test]
    fn zero_lower_bound_still_emits() {
        // Presence, not truthiness: a gte of 0 is a real restriction.
        let filter = Filter::new().with_range("price_subunit", Some(Scalar::Int(0)), None);
        let conditions = builder().build(owner(), &filter);

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[1].op(), CompareOp::Gte);
        assert_eq!(conditions[1].value(), &Scalar::Int(0));
        assert_eq!(conditions[1].placeholder(), "priceSubunitGte");
    }

    #[test]
    fn false_equality_value_still_emits() {
        let filter = Filter::new().with_eq("active", false);
        let conditions = builder().build(owner(), &filter);

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[1].value(), &Scalar::Bool(false));
    }

    #[test]
    fn empty_range_emits_nothing_for_that_field() {
        let filter = Filter::new()
            .with("price_subunit", FilterValue::Range(RangeSpec::default()))
            .with_eq("name", "widget");
        let conditions = builder().build(owner(), &filter);

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[1].column(), "name");
    }

    #[test]
    fn unrecognized_values_are_ignored() {
        let filter = Filter::new()
            .with("tags", FilterValue::Unrecognized)
            .with_eq("name", "widget");
        let conditions = builder().build(owner(), &filter);

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[1].column(), "name");
    }

    #[test]
    fn emission_preserves_filter_entry_order() {
        let filter = Filter::new()
            .with_eq("name", "widget")
            .with_range("price_subunit", Some(Scalar::Int(1)), None)
            .with_eq("active", true);
        let conditions = builder().build(owner(), &filter);

        let columns: Vec<&str> = conditions.iter().map(Condition::column).collect();
        assert_eq!(columns, vec![OWNER_COLUMN, "name", "priceSubunit", "active"]);
    }

    #[test]
    fn placeholders_are_unique_within_a_build() {
        let filter = Filter::new()
            .with_eq("name", "widget")
            .with_range("price_subunit", Some(Scalar::Int(1)), Some(Scalar::Int(9)))
            .with_eq("active", true);
        let conditions = builder().build(owner(), &filter);

        let mut names: Vec<&str> = conditions.iter().map(Condition::placeholder).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), conditions.len());
    }

    #[test]
    fn matches_applies_operator_semantics() {
        let filter = Filter::new().with_range("price_subunit", Some(Scalar::Int(100)), None);
        let conditions = builder().build(owner(), &filter);
        let gte = &conditions[1];

        assert!(gte.matches(Some(&Scalar::Int(100))));
        assert!(gte.matches(Some(&Scalar::Int(150))));
        assert!(!gte.matches(Some(&Scalar::Int(99))));
        assert!(!gte.matches(None));
        assert!(!gte.matches(Some(&Scalar::Text("100".to_string()))));
    }

    proptest! {
        #[test]
        fn every_bound_value_emits_a_condition(bound in any::<i64>()) {
            let filter = Filter::new().with_range("price_subunit", Some(Scalar::Int(bound)), None);
            let conditions = builder().build(owner(), &filter);
            prop_assert_eq!(conditions.len(), 2);
            prop_assert_eq!(conditions[1].value(), &Scalar::Int(bound));
        }

        #[test]
        fn build_is_deterministic(price in any::<i64>(), name in "[a-z]{1,12}") {
            let user = owner();
            let filter = Filter::new()
                .with_eq("name", name.as_str())
                .with_range("price_subunit", Some(Scalar::Int(price)), None);
            let a = builder().build(user, &filter);
            let b = builder().build(user, &filter);
            prop_assert_eq!(a, b);
        }
    }
}
