//! Function return-type signatures

use lf_sql::TypeTag;
use std::collections::HashMap;

/// Source of function return types for type inference
pub trait FunctionSignatures: Send + Sync {
    /// Return type of `name` applied to arguments of the given types, or
    /// `None` when the function is unknown.
    fn return_type(&self, name: &str, args: &[TypeTag]) -> Option<TypeTag>;
}

/// How a registered function's result type is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnRule {
    /// Always this type
    Fixed(TypeTag),
    /// Same type as the first argument
    FirstArgument,
    /// Same type as the second argument (`IF(cond, then, else)`)
    SecondArgument,
    /// `SUM`: integer input widens to BIGINT, floats to DOUBLE, decimals stay DECIMAL
    NumericSum,
}

const BIGINT_FUNCTIONS: &[&str] = &[
    "COUNT",
    "COUNT_IF",
    "COUNTIF",
    "APPROX_COUNT_DISTINCT",
    "LENGTH",
    "CHAR_LENGTH",
    "CHARACTER_LENGTH",
    "ROW_NUMBER",
    "RANK",
    "DENSE_RANK",
    "NTILE",
];

const DOUBLE_FUNCTIONS: &[&str] = &[
    "AVG",
    "STDDEV",
    "STDDEV_POP",
    "STDDEV_SAMP",
    "VARIANCE",
    "VAR_POP",
    "VAR_SAMP",
    "PERCENT_RANK",
    "CUME_DIST",
];

const TEXT_FUNCTIONS: &[&str] = &[
    "CONCAT",
    "CONCAT_WS",
    "STRING_AGG",
    "LISTAGG",
    "GROUP_CONCAT",
];

const BOOL_FUNCTIONS: &[&str] = &[
    "LOGICAL_AND",
    "LOGICAL_OR",
    "BOOL_AND",
    "BOOL_OR",
    "STARTS_WITH",
    "ENDS_WITH",
    "REGEXP_CONTAINS",
];

const FIRST_ARGUMENT_FUNCTIONS: &[&str] = &[
    "MIN",
    "MAX",
    "ANY_VALUE",
    "FIRST_VALUE",
    "LAST_VALUE",
    "LAG",
    "LEAD",
    "COALESCE",
    "IFNULL",
    "NULLIF",
    "ABS",
    "UPPER",
    "LOWER",
    "TRIM",
    "LTRIM",
    "RTRIM",
    "REPLACE",
    "SUBSTR",
    "SUBSTRING",
    "LEFT",
    "RIGHT",
    "REVERSE",
];

/// Case-insensitive table of function return rules
///
/// Current-time builtins (`NOW`, `CURRENT_TIMESTAMP`, ...) are deliberately
/// absent, so they infer as `UNKNOWN`.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    rules: HashMap<String, ReturnRule>,
}

impl FunctionRegistry {
    /// A registry with no functions
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in aggregate, window and string function table
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        let fixed = [
            (BIGINT_FUNCTIONS, TypeTag::BigInt),
            (DOUBLE_FUNCTIONS, TypeTag::Double),
            (TEXT_FUNCTIONS, TypeTag::Text),
            (BOOL_FUNCTIONS, TypeTag::Bool),
        ];
        for (names, tag) in fixed {
            for name in names {
                registry.insert(name, ReturnRule::Fixed(tag));
            }
        }
        for name in FIRST_ARGUMENT_FUNCTIONS {
            registry.insert(name, ReturnRule::FirstArgument);
        }
        for name in ["IF", "IIF"] {
            registry.insert(name, ReturnRule::SecondArgument);
        }
        registry.insert("SUM", ReturnRule::NumericSum);
        registry
    }

    /// Register (or override) a function with a fixed return type
    pub fn with_return_type(self, name: &str, tag: TypeTag) -> Self {
        self.with_rule(name, ReturnRule::Fixed(tag))
    }

    /// Register (or override) a function with an arbitrary rule
    pub fn with_rule(mut self, name: &str, rule: ReturnRule) -> Self {
        self.insert(name, rule);
        self
    }

    /// Rule registered for `name`
    pub fn rule(&self, name: &str) -> Option<ReturnRule> {
        self.rules.get(&name.to_ascii_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn insert(&mut self, name: &str, rule: ReturnRule) {
        self.rules.insert(name.to_ascii_uppercase(), rule);
    }
}

impl FunctionSignatures for FunctionRegistry {
    fn return_type(&self, name: &str, args: &[TypeTag]) -> Option<TypeTag> {
        let first = args.first().copied().unwrap_or(TypeTag::Unknown);
        self.rule(name).map(|rule| match rule {
            ReturnRule::Fixed(tag) => tag,
            ReturnRule::FirstArgument => first,
            ReturnRule::SecondArgument => args.get(1).copied().unwrap_or(TypeTag::Unknown),
            ReturnRule::NumericSum if first.is_integer() => TypeTag::BigInt,
            ReturnRule::NumericSum if first.is_float() => TypeTag::Double,
            ReturnRule::NumericSum if first == TypeTag::Decimal => TypeTag::Decimal,
            ReturnRule::NumericSum => TypeTag::Unknown,
        })
    }
}

#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;
