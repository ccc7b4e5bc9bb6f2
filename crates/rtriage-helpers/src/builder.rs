//! Helper factories: definition → validated, compiled term.
//!
//! [`build_helper`] is the single entry point the expression-builder layer
//! calls for every `field: +name/p1/p2/…` expression it encounters. All
//! validation happens here; the returned term only executes captured
//! configuration.

use regex::Regex;

use crate::error::{BuildError, Result};
use crate::ops;
use crate::param::{Parameter, to_pointer};
use crate::term::Term;

/// A raw helper definition: the target field being mapped, the operator
/// name, and its raw parameter strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub target_field: String,
    pub name: String,
    pub params: Vec<String>,
}

impl Definition {
    pub fn new(target_field: &str, name: &str, params: &[&str]) -> Self {
        Definition {
            target_field: target_field.to_string(),
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// All operator names in the catalogue.
pub fn helper_names() -> &'static [&'static str] {
    &[
        "s_up",
        "s_lo",
        "s_trim",
        "s_concat",
        "s_from_array",
        "s_from_hexa",
        "s_hex_to_num",
        "s_replace",
        "s_to_array",
        "i_calc",
        "r_ext",
        "a_append",
        "merge",
        "ef_delete",
        "ef_rename",
        "s_ip_version",
        "sys_epoch",
        "h_sha1",
    ]
}

/// Compile a helper definition into a term.
///
/// Classifies parameters by the `$` sigil, validates arity and per-position
/// constraints, and returns the compiled term. Every error here is a
/// build-time error; nothing is deferred to event time that can be checked
/// now.
pub fn build_helper(def: &Definition) -> Result<Term> {
    let target = to_pointer(&def.target_field);
    let params: Vec<Parameter> = def.params.iter().map(|p| Parameter::parse(p)).collect();
    let name = format_term_name(&def.name, &target, &params);

    match def.name.as_str() {
        "s_up" => string_case(def, target, &params, name, ops::Case::Upper),
        "s_lo" => string_case(def, target, &params, name, ops::Case::Lower),
        "s_trim" => trim(def, target, &params, name),
        "s_concat" => concat(def, target, &params, name),
        "s_from_array" => from_array(def, target, &params, name),
        "s_from_hexa" => from_hexa(def, target, &params, name),
        "s_hex_to_num" => hex_to_num(def, target, &params, name),
        "s_replace" => replace(def, target, &params, name),
        "s_to_array" => to_array(def, target, &params, name),
        "i_calc" => int_calc(def, target, &params, name),
        "r_ext" => regex_extract(def, target, &params, name),
        "a_append" => append(def, target, &params, name),
        "merge" => merge(def, target, &params, name),
        "ef_delete" => delete_field(def, target, &params, name),
        "ef_rename" => rename_field(def, target, &params, name),
        "s_ip_version" => ip_version(def, target, &params, name),
        "sys_epoch" => sys_epoch(def, target, &params, name),
        "h_sha1" => sha1(def, target, &params, name),
        other => Err(BuildError::UnknownHelper(other.to_string())),
    }
}

/// Format the display name used in traces: `name(/target, p1, p2, …)`.
fn format_term_name(name: &str, target: &str, params: &[Parameter]) -> String {
    let mut parts = vec![target.to_string()];
    parts.extend(params.iter().map(ToString::to_string));
    format!("{}({})", name, parts.join(", "))
}

// =============================================================================
// Validation helpers
// =============================================================================

fn check_exact_arity(helper: &str, params: &[Parameter], expected: usize) -> Result<()> {
    if params.len() != expected {
        return Err(BuildError::InvalidArity {
            helper: helper.to_string(),
            expected: expected.to_string(),
            got: params.len(),
        });
    }
    Ok(())
}

fn check_min_arity(helper: &str, params: &[Parameter], min: usize) -> Result<()> {
    if params.len() < min {
        return Err(BuildError::InvalidArity {
            helper: helper.to_string(),
            expected: format!("at least {min}"),
            got: params.len(),
        });
    }
    Ok(())
}

fn expect_value<'a>(helper: &str, params: &'a [Parameter], position: usize) -> Result<&'a str> {
    match &params[position] {
        Parameter::Value(v) => Ok(v),
        Parameter::Reference(_) => Err(BuildError::ExpectedValue {
            helper: helper.to_string(),
            position,
        }),
    }
}

fn expect_reference<'a>(helper: &str, params: &'a [Parameter], position: usize) -> Result<&'a str> {
    match &params[position] {
        Parameter::Reference(path) => Ok(path),
        Parameter::Value(_) => Err(BuildError::ExpectedReference {
            helper: helper.to_string(),
            position,
        }),
    }
}

fn invalid_parameter(helper: &str, detail: String) -> BuildError {
    BuildError::InvalidParameter {
        helper: helper.to_string(),
        detail,
    }
}

// =============================================================================
// Factories
// =============================================================================

fn string_case(
    def: &Definition,
    target: String,
    params: &[Parameter],
    name: String,
    case: ops::Case,
) -> Result<Term> {
    check_exact_arity(&def.name, params, 1)?;
    Ok(Term::new(
        name,
        ops::StringCase {
            target,
            source: params[0].clone(),
            case,
        },
    ))
}

fn trim(def: &Definition, target: String, params: &[Parameter], name: String) -> Result<Term> {
    check_exact_arity(&def.name, params, 2)?;
    let side = match expect_value(&def.name, params, 0)? {
        "begin" => ops::TrimSide::Begin,
        "end" => ops::TrimSide::End,
        "both" => ops::TrimSide::Both,
        other => {
            return Err(invalid_parameter(
                &def.name,
                format!("invalid trim side '{other}' (expected begin, end or both)"),
            ));
        }
    };
    let raw = expect_value(&def.name, params, 1)?;
    let mut chars = raw.chars();
    let ch = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(invalid_parameter(
                &def.name,
                format!("trim character must be a single character, got '{raw}'"),
            ));
        }
    };
    Ok(Term::new(name, ops::Trim { target, side, ch }))
}

fn concat(def: &Definition, target: String, params: &[Parameter], name: String) -> Result<Term> {
    check_min_arity(&def.name, params, 2)?;
    Ok(Term::new(
        name,
        ops::Concat {
            target,
            parts: params.to_vec(),
        },
    ))
}

fn from_array(
    def: &Definition,
    target: String,
    params: &[Parameter],
    name: String,
) -> Result<Term> {
    check_exact_arity(&def.name, params, 2)?;
    let array = expect_reference(&def.name, params, 0)?.to_string();
    let separator = expect_value(&def.name, params, 1)?.to_string();
    Ok(Term::new(
        name,
        ops::JoinArray {
            target,
            array,
            separator,
        },
    ))
}

fn from_hexa(
    def: &Definition,
    target: String,
    params: &[Parameter],
    name: String,
) -> Result<Term> {
    check_exact_arity(&def.name, params, 1)?;
    let source = expect_reference(&def.name, params, 0)?.to_string();
    Ok(Term::new(name, ops::FromHex { target, source }))
}

fn hex_to_num(
    def: &Definition,
    target: String,
    params: &[Parameter],
    name: String,
) -> Result<Term> {
    check_exact_arity(&def.name, params, 1)?;
    let source = expect_reference(&def.name, params, 0)?.to_string();
    Ok(Term::new(name, ops::HexToNum { target, source }))
}

fn replace(def: &Definition, target: String, params: &[Parameter], name: String) -> Result<Term> {
    check_exact_arity(&def.name, params, 2)?;
    if let Parameter::Value(old) = &params[0]
        && old.is_empty()
    {
        return Err(invalid_parameter(
            &def.name,
            "first parameter cannot be empty".to_string(),
        ));
    }
    Ok(Term::new(
        name,
        ops::Replace {
            target,
            old: params[0].clone(),
            new: params[1].clone(),
        },
    ))
}

fn to_array(def: &Definition, target: String, params: &[Parameter], name: String) -> Result<Term> {
    check_exact_arity(&def.name, params, 2)?;
    let source = expect_reference(&def.name, params, 0)?.to_string();
    let raw = expect_value(&def.name, params, 1)?;
    let mut chars = raw.chars();
    let separator = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(invalid_parameter(
                &def.name,
                format!("separator must be a single character, got '{raw}'"),
            ));
        }
    };
    Ok(Term::new(
        name,
        ops::SplitToArray {
            target,
            source,
            separator,
        },
    ))
}

fn int_calc(def: &Definition, target: String, params: &[Parameter], name: String) -> Result<Term> {
    check_exact_arity(&def.name, params, 2)?;
    let op = match expect_value(&def.name, params, 0)? {
        "sum" => ops::CalcOp::Sum,
        "sub" => ops::CalcOp::Sub,
        "mul" => ops::CalcOp::Mul,
        "div" => ops::CalcOp::Div,
        other => {
            return Err(invalid_parameter(
                &def.name,
                format!("unknown operation '{other}' (expected sum, sub, mul or div)"),
            ));
        }
    };
    let rhs = match &params[1] {
        Parameter::Reference(path) => ops::CalcOperand::Reference(path.clone()),
        Parameter::Value(raw) => {
            let value: i64 = raw.parse().map_err(|_| {
                invalid_parameter(&def.name, format!("could not convert '{raw}' to an integer"))
            })?;
            if op == ops::CalcOp::Div && value == 0 {
                return Err(BuildError::DivisionByZero {
                    helper: def.name.clone(),
                });
            }
            ops::CalcOperand::Literal(value)
        }
    };
    Ok(Term::new(name, ops::Calc { target, op, rhs }))
}

fn regex_extract(
    def: &Definition,
    target: String,
    params: &[Parameter],
    name: String,
) -> Result<Term> {
    check_exact_arity(&def.name, params, 2)?;
    let source = expect_reference(&def.name, params, 0)?.to_string();
    let pattern = expect_value(&def.name, params, 1)?;
    let regex = Regex::new(pattern).map_err(|source| BuildError::InvalidRegex {
        helper: def.name.clone(),
        source,
    })?;
    Ok(Term::new(
        name,
        ops::RegexExtract {
            target,
            source,
            regex,
        },
    ))
}

fn append(def: &Definition, target: String, params: &[Parameter], name: String) -> Result<Term> {
    check_min_arity(&def.name, params, 1)?;
    Ok(Term::new(
        name,
        ops::Append {
            target,
            items: params.to_vec(),
        },
    ))
}

fn merge(def: &Definition, target: String, params: &[Parameter], name: String) -> Result<Term> {
    check_exact_arity(&def.name, params, 1)?;
    let source = expect_reference(&def.name, params, 0)?.to_string();
    Ok(Term::new(name, ops::MergeFields { target, source }))
}

fn delete_field(
    def: &Definition,
    target: String,
    params: &[Parameter],
    name: String,
) -> Result<Term> {
    check_exact_arity(&def.name, params, 0)?;
    Ok(Term::new(name, ops::DeleteField { target }))
}

fn rename_field(
    def: &Definition,
    target: String,
    params: &[Parameter],
    name: String,
) -> Result<Term> {
    check_exact_arity(&def.name, params, 1)?;
    let source = expect_reference(&def.name, params, 0)?.to_string();
    Ok(Term::new(name, ops::RenameField { target, source }))
}

fn ip_version(
    def: &Definition,
    target: String,
    params: &[Parameter],
    name: String,
) -> Result<Term> {
    check_exact_arity(&def.name, params, 1)?;
    let source = expect_reference(&def.name, params, 0)?.to_string();
    Ok(Term::new(name, ops::IpVersion { target, source }))
}

fn sys_epoch(
    def: &Definition,
    target: String,
    params: &[Parameter],
    name: String,
) -> Result<Term> {
    check_exact_arity(&def.name, params, 0)?;
    Ok(Term::new(name, ops::SysEpoch { target }))
}

fn sha1(def: &Definition, target: String, params: &[Parameter], name: String) -> Result<Term> {
    check_exact_arity(&def.name, params, 1)?;
    Ok(Term::new(
        name,
        ops::Sha1Digest {
            target,
            input: params[0].clone(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalogue_name_builds() {
        // Arity-valid definitions for each operator.
        let defs = [
            Definition::new("a", "s_up", &["$b"]),
            Definition::new("a", "s_lo", &["lit"]),
            Definition::new("a", "s_trim", &["both", "x"]),
            Definition::new("a", "s_concat", &["x", "$b"]),
            Definition::new("a", "s_from_array", &["$arr", ","]),
            Definition::new("a", "s_from_hexa", &["$hex"]),
            Definition::new("a", "s_hex_to_num", &["$hex"]),
            Definition::new("a", "s_replace", &["old", "new"]),
            Definition::new("a", "s_to_array", &["$csv", ","]),
            Definition::new("a", "i_calc", &["sum", "2"]),
            Definition::new("a", "r_ext", &["$msg", "(x)"]),
            Definition::new("a", "a_append", &["$b"]),
            Definition::new("a", "merge", &["$b"]),
            Definition::new("a", "ef_delete", &[]),
            Definition::new("a", "ef_rename", &["$b"]),
            Definition::new("a", "s_ip_version", &["$ip"]),
            Definition::new("a", "sys_epoch", &[]),
            Definition::new("a", "h_sha1", &["$b"]),
        ];
        assert_eq!(defs.len(), helper_names().len());
        for def in &defs {
            assert!(
                build_helper(def).is_ok(),
                "helper '{}' should build",
                def.name
            );
        }
    }

    #[test]
    fn test_unknown_helper() {
        let err = build_helper(&Definition::new("a", "frobnicate", &[])).unwrap_err();
        assert!(matches!(err, BuildError::UnknownHelper(ref n) if n == "frobnicate"));
    }

    #[test]
    fn test_arity_errors() {
        assert!(matches!(
            build_helper(&Definition::new("a", "s_up", &[])).unwrap_err(),
            BuildError::InvalidArity { .. }
        ));
        assert!(matches!(
            build_helper(&Definition::new("a", "s_concat", &["only-one"])).unwrap_err(),
            BuildError::InvalidArity { .. }
        ));
        assert!(matches!(
            build_helper(&Definition::new("a", "a_append", &[])).unwrap_err(),
            BuildError::InvalidArity { .. }
        ));
        assert!(matches!(
            build_helper(&Definition::new("a", "ef_delete", &["extra"])).unwrap_err(),
            BuildError::InvalidArity { .. }
        ));
    }

    #[test]
    fn test_trim_build_validation() {
        let err = build_helper(&Definition::new("a", "s_trim", &["sideways", "x"])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter { .. }));
        assert!(err.to_string().contains("sideways"));

        let err = build_helper(&Definition::new("a", "s_trim", &["both", "xy"])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter { .. }));

        // Side and char must be literals.
        let err = build_helper(&Definition::new("a", "s_trim", &["$side", "x"])).unwrap_err();
        assert!(matches!(err, BuildError::ExpectedValue { position: 0, .. }));
    }

    #[test]
    fn test_replace_empty_old_rejected() {
        let err = build_helper(&Definition::new("a", "s_replace", &["", "new"])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter { .. }));
        // An empty replacement is fine; an empty reference path is not the
        // same thing as an empty literal.
        assert!(build_helper(&Definition::new("a", "s_replace", &["old", ""])).is_ok());
        assert!(build_helper(&Definition::new("a", "s_replace", &["$old", "new"])).is_ok());
    }

    #[test]
    fn test_to_array_separator_must_be_one_char() {
        let err = build_helper(&Definition::new("a", "s_to_array", &["$csv", ",,"])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter { .. }));
    }

    #[test]
    fn test_int_calc_build_validation() {
        let err = build_helper(&Definition::new("a", "i_calc", &["mod", "2"])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter { .. }));

        let err = build_helper(&Definition::new("a", "i_calc", &["sum", "two"])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter { .. }));

        let err = build_helper(&Definition::new("a", "i_calc", &["div", "0"])).unwrap_err();
        assert!(matches!(err, BuildError::DivisionByZero { .. }));

        // A reference divisor is only checked at event time.
        assert!(build_helper(&Definition::new("a", "i_calc", &["div", "$zero"])).is_ok());
    }

    #[test]
    fn test_regex_syntax_is_a_build_error() {
        let err = build_helper(&Definition::new("a", "r_ext", &["$msg", "[unclosed"])).unwrap_err();
        assert!(matches!(err, BuildError::InvalidRegex { .. }));
    }

    #[test]
    fn test_reference_position_enforced() {
        for (name, params) in [
            ("s_from_array", vec!["not-a-ref", ","]),
            ("s_from_hexa", vec!["not-a-ref"]),
            ("s_hex_to_num", vec!["not-a-ref"]),
            ("s_to_array", vec!["not-a-ref", ","]),
            ("r_ext", vec!["not-a-ref", "(x)"]),
            ("merge", vec!["not-a-ref"]),
            ("ef_rename", vec!["not-a-ref"]),
            ("s_ip_version", vec!["not-a-ref"]),
        ] {
            let err = build_helper(&Definition::new("a", name, &params)).unwrap_err();
            assert!(
                matches!(err, BuildError::ExpectedReference { position: 0, .. }),
                "helper '{name}' should require a reference, got: {err}"
            );
        }
    }

    #[test]
    fn test_term_name_format() {
        let term = build_helper(&Definition::new("out", "s_concat", &["$a.b", "lit"])).unwrap();
        assert_eq!(term.name(), "s_concat(/out, $/a/b, lit)");

        let term = build_helper(&Definition::new("ts", "sys_epoch", &[])).unwrap();
        assert_eq!(term.name(), "sys_epoch(/ts)");
    }
}
