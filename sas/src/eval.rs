//! Expression evaluation (spec §4.4): an [`Expr`] plus an explicit row
//! context in, a [`Cell`] out. The evaluator never reads or writes any
//! process-wide state — every variable/array lookup goes through
//! [`EvalContext`], matching the "explicit context passing" design note
//! (spec §9) so the same evaluator serves both the DATA step executor and a
//! PROC's WHERE-clause filter over a plain dataset row.

use std::cmp::Ordering;

use sas_ast::{BinOp, Expr, UnOp};
use sas_core::{Cell, CoreError, StringInterner};

/// A source of variable and array-element values for expression evaluation.
/// The DATA step executor implements this over the live PDV; PROCs
/// implement it over one read-only dataset row.
pub(crate) trait EvalContext {
    /// Resolves a bare variable reference. Unknown names are the caller's
    /// business (the executor pre-declares every LHS name during its
    /// pre-scan, so this should not normally miss); implementations that
    /// cannot find `name` return missing rather than fail, matching how a
    /// dataset row with no such column would behave.
    fn var(&self, name: &str) -> Cell;

    /// Resolves `name{index}`. Contexts with no array support (PROC row
    /// views) report [`CoreError::UndefinedArray`].
    fn array_elem(&self, name: &str, index: i64) -> Result<Cell, CoreError>;
}

/// Evaluates `expr` against `ctx`, interning any new strings the evaluation
/// produces (string literals, function results, `||` concatenation).
pub(crate) fn eval(
    expr: &Expr,
    ctx: &impl EvalContext,
    interner: &mut StringInterner,
) -> Result<Cell, CoreError> {
    match expr {
        Expr::NumberLit(n) => Ok(Cell::Number(*n)),
        Expr::StringLit(s) => Ok(Cell::from_str(interner, s)),
        Expr::VarRef(name) => Ok(ctx.var(name)),
        Expr::ArrayElemRef { name, index } => {
            let idx = eval(index, ctx, interner)?.to_number(interner);
            if idx.is_nan() {
                return Err(CoreError::TypeMismatch(format!(
                    "array subscript for {name} did not evaluate to a number"
                )));
            }
            ctx.array_elem(name, idx as i64)
        }
        Expr::UnaryOp { op, expr } => {
            let v = eval(expr, ctx, interner)?;
            match op {
                UnOp::Neg => Ok(Cell::Number(-v.to_number(interner))),
                UnOp::Not => Ok(bool_cell(!v.is_truthy(interner))),
            }
        }
        Expr::BinaryOp { op, lhs, rhs } => eval_binop(*op, lhs, rhs, ctx, interner),
        Expr::FunctionCall { name, args } => {
            let values = args
                .iter()
                .map(|arg| eval(arg, ctx, interner))
                .collect::<Result<Vec<_>, _>>()?;
            call_function(name, &values, interner)
        }
    }
}

fn bool_cell(b: bool) -> Cell {
    Cell::Number(if b { 1.0 } else { 0.0 })
}

fn eval_binop(
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    ctx: &impl EvalContext,
    interner: &mut StringInterner,
) -> Result<Cell, CoreError> {
    match op {
        // Short-circuiting, per the spec's "Logical" operator semantics.
        BinOp::And => {
            let l = eval(lhs, ctx, interner)?;
            if !l.is_truthy(interner) {
                return Ok(bool_cell(false));
            }
            let r = eval(rhs, ctx, interner)?;
            Ok(bool_cell(r.is_truthy(interner)))
        }
        BinOp::Or => {
            let l = eval(lhs, ctx, interner)?;
            if l.is_truthy(interner) {
                return Ok(bool_cell(true));
            }
            let r = eval(rhs, ctx, interner)?;
            Ok(bool_cell(r.is_truthy(interner)))
        }
        BinOp::Concat => {
            let l = eval(lhs, ctx, interner)?;
            let r = eval(rhs, ctx, interner)?;
            let joined = format!("{}{}", l.to_display_string(interner), r.to_display_string(interner));
            Ok(Cell::from_str(interner, &joined))
        }
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let l = eval(lhs, ctx, interner)?;
            let r = eval(rhs, ctx, interner)?;
            let ordering = l.compare(&r, interner);
            let result = match ordering {
                // Unordered (mixed types, non-numeric string side): every
                // relational operator reports false (spec §4.4).
                None => false,
                Some(ord) => match op {
                    BinOp::Eq => ord == Ordering::Equal,
                    BinOp::Ne => ord != Ordering::Equal,
                    BinOp::Lt => ord == Ordering::Less,
                    BinOp::Le => ord != Ordering::Greater,
                    BinOp::Gt => ord == Ordering::Greater,
                    BinOp::Ge => ord != Ordering::Less,
                    _ => unreachable!("non-comparison op in comparison arm"),
                },
            };
            if ordering.is_none() {
                tracing::warn!(?op, "comparison between incompatible values, treated as false");
            }
            Ok(bool_cell(result))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Pow => {
            let l = eval(lhs, ctx, interner)?.to_number(interner);
            let r = eval(rhs, ctx, interner)?.to_number(interner);
            if l.is_nan() || r.is_nan() {
                return Ok(Cell::MISSING_NUMBER);
            }
            let result = match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => {
                    if r == 0.0 {
                        tracing::warn!("division by zero");
                        f64::NAN
                    } else {
                        l / r
                    }
                }
                BinOp::Pow => l.powf(r),
                _ => unreachable!("non-arithmetic op in arithmetic arm"),
            };
            if result.is_infinite() {
                return Err(CoreError::NumericOverflow(format!("{op:?}")));
            }
            Ok(Cell::Number(result))
        }
    }
}

fn arity(function: &str, args: &[Cell], expected: usize) -> Result<(), CoreError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CoreError::ArityMismatch {
            function: function.to_string(),
            expected,
            actual: args.len(),
        })
    }
}

fn arity_range(function: &str, args: &[Cell], min: usize, max: usize) -> Result<(), CoreError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(CoreError::ArityMismatch {
            function: function.to_string(),
            expected: min,
            actual: args.len(),
        })
    }
}

fn arg_str(args: &[Cell], i: usize, interner: &StringInterner) -> String {
    args[i].to_display_string(interner)
}

fn arg_num(args: &[Cell], i: usize, interner: &StringInterner) -> f64 {
    args[i].to_number(interner)
}

fn arg_int(function: &str, args: &[Cell], i: usize, interner: &StringInterner) -> Result<i64, CoreError> {
    let n = arg_num(args, i, interner);
    if n.is_nan() {
        Err(CoreError::TypeMismatch(format!(
            "{function} expects a numeric argument at position {}",
            i + 1
        )))
    } else {
        Ok(n as i64)
    }
}

/// Dispatches one of the spec §4.4 function-catalog calls.
pub(crate) fn call_function(
    name: &str,
    args: &[Cell],
    interner: &mut StringInterner,
) -> Result<Cell, CoreError> {
    match name {
        "SUBSTR" => {
            arity_range(name, args, 2, 3)?;
            let s = arg_str(args, 0, interner);
            let start = arg_int(name, args, 1, interner)?.max(1) as usize;
            let chars: Vec<char> = s.chars().collect();
            let from = (start - 1).min(chars.len());
            let len = if args.len() == 3 {
                arg_int(name, args, 2, interner)?.max(0) as usize
            } else {
                chars.len() - from
            };
            let to = (from + len).min(chars.len());
            Ok(Cell::from_str(interner, &chars[from..to].iter().collect::<String>()))
        }
        "TRIM" => {
            arity(name, args, 1)?;
            let s = arg_str(args, 0, interner);
            Ok(Cell::from_str(interner, s.trim_end()))
        }
        "LEFT" => {
            arity(name, args, 1)?;
            let s = arg_str(args, 0, interner);
            Ok(Cell::from_str(interner, s.trim_start()))
        }
        "RIGHT" => {
            arity(name, args, 1)?;
            let s = arg_str(args, 0, interner);
            Ok(Cell::from_str(interner, s.trim_end()))
        }
        "UPCASE" => {
            arity(name, args, 1)?;
            let s = arg_str(args, 0, interner).to_uppercase();
            Ok(Cell::from_str(interner, &s))
        }
        "LOWCASE" => {
            arity(name, args, 1)?;
            let s = arg_str(args, 0, interner).to_lowercase();
            Ok(Cell::from_str(interner, &s))
        }
        "INDEX" => {
            arity(name, args, 2)?;
            let haystack = arg_str(args, 0, interner);
            let needle = arg_str(args, 1, interner);
            let position = haystack.find(&needle).map(|byte| {
                haystack[..byte].chars().count() as f64 + 1.0
            });
            Ok(Cell::Number(position.unwrap_or(0.0)))
        }
        "SCAN" => {
            arity_range(name, args, 2, 3)?;
            let s = arg_str(args, 0, interner);
            let n = arg_int(name, args, 1, interner)?;
            let delims = if args.len() == 3 {
                arg_str(args, 2, interner)
            } else {
                " ".to_string()
            };
            let words: Vec<&str> = s.split(|c| delims.contains(c)).filter(|w| !w.is_empty()).collect();
            let word = if n > 0 {
                words.get(n as usize - 1).copied()
            } else if n < 0 {
                let idx = words.len() as i64 + n;
                (idx >= 0).then(|| words[idx as usize])
            } else {
                None
            };
            Ok(Cell::from_str(interner, word.unwrap_or("")))
        }
        "LENGTH" => {
            arity(name, args, 1)?;
            let s = arg_str(args, 0, interner);
            Ok(Cell::Number(if s.is_empty() { 1.0 } else { s.chars().count() as f64 }))
        }
        "CATX" => {
            if args.is_empty() {
                return Err(CoreError::ArityMismatch {
                    function: name.to_string(),
                    expected: 2,
                    actual: 0,
                });
            }
            let delim = arg_str(args, 0, interner);
            let parts: Vec<String> = args[1..]
                .iter()
                .filter(|cell| !cell.is_missing())
                .map(|cell| cell.to_display_string(interner))
                .collect();
            Ok(Cell::from_str(interner, &parts.join(&delim)))
        }
        "ABS" => unary_math(name, args, interner, f64::abs),
        "CEIL" => unary_math(name, args, interner, f64::ceil),
        "FLOOR" => unary_math(name, args, interner, f64::floor),
        "ROUND" => {
            arity_range(name, args, 1, 2)?;
            let x = arg_num(args, 0, interner);
            let unit = if args.len() == 2 { arg_num(args, 1, interner) } else { 1.0 };
            if x.is_nan() || unit == 0.0 {
                Ok(Cell::MISSING_NUMBER)
            } else {
                Ok(Cell::Number((x / unit).round() * unit))
            }
        }
        "EXP" => unary_math(name, args, interner, f64::exp),
        "LOG" => unary_math(name, args, interner, f64::ln),
        "LOG10" => unary_math(name, args, interner, f64::log10),
        "SQRT" => unary_math(name, args, interner, f64::sqrt),
        "SUM" => {
            let values: Vec<f64> = args.iter().map(|c| c.to_number(interner)).filter(|n| !n.is_nan()).collect();
            Ok(if values.is_empty() {
                Cell::MISSING_NUMBER
            } else {
                Cell::Number(values.iter().sum())
            })
        }
        "MEAN" => {
            let values: Vec<f64> = args.iter().map(|c| c.to_number(interner)).filter(|n| !n.is_nan()).collect();
            Ok(if values.is_empty() {
                Cell::MISSING_NUMBER
            } else {
                Cell::Number(values.iter().sum::<f64>() / values.len() as f64)
            })
        }
        "TODAY" => {
            arity(name, args, 0)?;
            Ok(Cell::Number(today_sas_date()))
        }
        "DATEPART" => {
            arity(name, args, 1)?;
            let dt = arg_num(args, 0, interner);
            Ok(Cell::Number(if dt.is_nan() { dt } else { (dt / 86_400.0).floor() }))
        }
        "TIMEPART" => {
            arity(name, args, 1)?;
            let dt = arg_num(args, 0, interner);
            Ok(Cell::Number(if dt.is_nan() { dt } else { dt.rem_euclid(86_400.0) }))
        }
        "INTCK" => {
            arity(name, args, 3)?;
            let interval = arg_str(args, 0, interner);
            let start = arg_num(args, 1, interner);
            let end = arg_num(args, 2, interner);
            Ok(Cell::Number(intck(&interval, start, end)))
        }
        "INTNX" => {
            arity(name, args, 3)?;
            let interval = arg_str(args, 0, interner);
            let start = arg_num(args, 1, interner);
            let n = arg_num(args, 2, interner);
            Ok(Cell::Number(intnx(&interval, start, n)))
        }
        _ => Err(CoreError::TypeMismatch(format!("unknown function {name}"))),
    }
}

fn unary_math(
    name: &str,
    args: &[Cell],
    interner: &StringInterner,
    f: impl Fn(f64) -> f64,
) -> Result<Cell, CoreError> {
    arity(name, args, 1)?;
    let x = arg_num(args, 0, interner);
    Ok(Cell::Number(if x.is_nan() { x } else { f(x) }))
}

// -- Calendar math -----------------------------------------------------
//
// SAS dates are a day count from 1960-01-01. The conversions below use
// Howard Hinnant's `days_from_civil`/`civil_from_days` algorithm (a
// standard proleptic-Gregorian day-count construction), calibrated to a
// 1970-01-01 epoch, then rebased onto the SAS epoch.

fn days_from_civil(y: i64, m: u32, d: u32) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (m as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

fn sas_epoch_offset() -> i64 {
    days_from_civil(1960, 1, 1)
}

fn sas_date_to_unix_days(sas_date: f64) -> i64 {
    sas_date as i64 + sas_epoch_offset()
}

fn unix_days_to_sas_date(unix_days: i64) -> f64 {
    (unix_days - sas_epoch_offset()) as f64
}

fn today_sas_date() -> f64 {
    let elapsed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    unix_days_to_sas_date((elapsed.as_secs() / 86_400) as i64)
}

fn intck(interval: &str, start: f64, end: f64) -> f64 {
    if start.is_nan() || end.is_nan() {
        return f64::NAN;
    }
    match interval.to_ascii_uppercase().as_str() {
        "DAY" => (end - start).trunc(),
        "MONTH" => {
            let (y1, m1, _) = civil_from_days(sas_date_to_unix_days(start));
            let (y2, m2, _) = civil_from_days(sas_date_to_unix_days(end));
            ((y2 - y1) * 12 + (m2 as i64 - m1 as i64)) as f64
        }
        "YEAR" => {
            let (y1, _, _) = civil_from_days(sas_date_to_unix_days(start));
            let (y2, _, _) = civil_from_days(sas_date_to_unix_days(end));
            (y2 - y1) as f64
        }
        _ => f64::NAN,
    }
}

fn intnx(interval: &str, start: f64, n: f64) -> f64 {
    if start.is_nan() || n.is_nan() {
        return f64::NAN;
    }
    let n = n as i64;
    match interval.to_ascii_uppercase().as_str() {
        "DAY" => start + n as f64,
        "MONTH" => {
            let (y, m, d) = civil_from_days(sas_date_to_unix_days(start));
            let total = y * 12 + (m as i64 - 1) + n;
            let ny = total.div_euclid(12);
            let nm = (total.rem_euclid(12) + 1) as u32;
            unix_days_to_sas_date(days_from_civil(ny, nm, d))
        }
        "YEAR" => {
            let (y, m, d) = civil_from_days(sas_date_to_unix_days(start));
            unix_days_to_sas_date(days_from_civil(y + n, m, d))
        }
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoVars;
    impl EvalContext for NoVars {
        fn var(&self, _name: &str) -> Cell {
            Cell::MISSING_NUMBER
        }
        fn array_elem(&self, name: &str, _index: i64) -> Result<Cell, CoreError> {
            Err(CoreError::UndefinedArray(name.to_string()))
        }
    }

    fn eval_str(source: Expr) -> (Cell, StringInterner) {
        let mut interner = StringInterner::new();
        let value = eval(&source, &NoVars, &mut interner).unwrap();
        (value, interner)
    }

    #[test]
    fn addition_is_missing_propagating() {
        let (value, interner) = eval_str(Expr::BinaryOp {
            op: BinOp::Add,
            lhs: Box::new(Expr::NumberLit(f64::NAN)),
            rhs: Box::new(Expr::NumberLit(1.0)),
        });
        assert!(value.to_number(&interner).is_nan());
    }

    #[test]
    fn division_by_zero_yields_missing_not_error() {
        let (value, interner) = eval_str(Expr::BinaryOp {
            op: BinOp::Div,
            lhs: Box::new(Expr::NumberLit(1.0)),
            rhs: Box::new(Expr::NumberLit(0.0)),
        });
        assert!(value.to_number(&interner).is_nan());
    }

    #[test]
    fn concat_converts_both_sides_to_string() {
        let (value, interner) = eval_str(Expr::BinaryOp {
            op: BinOp::Concat,
            lhs: Box::new(Expr::StringLit("a".to_string())),
            rhs: Box::new(Expr::NumberLit(1.0)),
        });
        assert_eq!(value.to_display_string(&interner), "a1");
    }

    #[test]
    fn substr_extracts_one_based_range() {
        let mut interner = StringInterner::new();
        let args = vec![Cell::from_str(&mut interner, "hello world"), Cell::Number(1.0), Cell::Number(5.0)];
        let result = call_function("SUBSTR", &args, &mut interner).unwrap();
        assert_eq!(result.to_display_string(&interner), "hello");
    }

    #[test]
    fn sum_ignores_missing_unlike_plus_operator() {
        let mut interner = StringInterner::new();
        let args = vec![Cell::Number(1.0), Cell::MISSING_NUMBER, Cell::Number(2.0)];
        let result = call_function("SUM", &args, &mut interner).unwrap();
        assert_eq!(result.to_number(&interner), 3.0);
    }

    #[test]
    fn today_round_trips_through_datepart() {
        let mut interner = StringInterner::new();
        let today = today_sas_date();
        let args = vec![Cell::Number(today * 86_400.0)];
        let result = call_function("DATEPART", &args, &mut interner).unwrap();
        assert_eq!(result.to_number(&interner), today);
    }

    #[test]
    fn intnx_month_advances_calendar_month() {
        // 1960-01-01 is SAS date 0; one month on is 1960-02-01.
        let result = intnx("MONTH", 0.0, 1.0);
        assert_eq!(result, days_from_civil(1960, 2, 1) as f64 - sas_epoch_offset() as f64);
    }
}
