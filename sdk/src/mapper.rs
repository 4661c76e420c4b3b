use std::{cmp::Ordering, collections::HashSet};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    json_abi::Function,
};
use blockchain::binding::parameter_types;
use log::debug;
use serde_json::{Map, Value};

use crate::{
    delegation::{CompletionStatus, DecisionResult},
    error::MappingError,
};

/// Turns a delivered decision into the arguments of one contract function.
///
/// Scalar parameters are filled by name when every role names an input.
/// Otherwise entries are taken in natural role-name order (`validator_2`
/// before `validator_10`), so the same selection always yields the same
/// argument list.
#[derive(Debug, Clone)]
pub struct ArgumentMapper {
    function: Function,
    selection_size: Option<usize>,
}

enum Shape {
    Fixed(DynSolType, usize),
    Dynamic(DynSolType, usize),
    Scalars(Vec<DynSolType>),
}

impl ArgumentMapper {
    pub fn new(function: Function) -> Self {
        Self {
            function,
            selection_size: None,
        }
    }

    /// Number of entries a dynamic array parameter must receive.
    pub fn with_selection_size(mut self, size: usize) -> Self {
        self.selection_size = Some(size);
        self
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn map(&self, result: DecisionResult) -> Result<Vec<DynSolValue>, MappingError> {
        if result.status != CompletionStatus::Delivered {
            return Err(MappingError::Incomplete {
                request_id: result.request_id,
                status: result.status,
            });
        }

        let selection = parse_selection(&result.payload)?;
        let shape = self.shape()?;
        let expected = match &shape {
            Shape::Fixed(_, k) | Shape::Dynamic(_, k) => *k,
            Shape::Scalars(types) => types.len(),
        };
        if selection.len() != expected {
            return Err(MappingError::CountMismatch {
                expected,
                actual: selection.len(),
            });
        }

        let entries = self.order(selection, &shape);
        let mut seen = HashSet::new();
        let mut values = Vec::with_capacity(expected);
        for (i, (role, raw)) in entries.into_iter().enumerate() {
            let value = match &shape {
                Shape::Fixed(inner, _) | Shape::Dynamic(inner, _) => {
                    let value = coerce(&role, &raw, inner)?;
                    if !seen.insert(value.abi_encode()) {
                        return Err(MappingError::Duplicate { role });
                    }
                    value
                }
                Shape::Scalars(types) => coerce(&role, &raw, &types[i])?,
            };
            values.push(value);
        }
        debug!(
            "mapped {} selections for {}",
            values.len(),
            self.function.signature()
        );

        Ok(match shape {
            Shape::Fixed(..) => vec![DynSolValue::FixedArray(values)],
            Shape::Dynamic(..) => vec![DynSolValue::Array(values)],
            Shape::Scalars(_) => values,
        })
    }

    fn order(&self, mut selection: Map<String, Value>, shape: &Shape) -> Vec<(String, Value)> {
        if let Shape::Scalars(_) = shape {
            let by_name = self
                .function
                .inputs
                .iter()
                .all(|input| !input.name.is_empty() && selection.contains_key(&input.name));
            if by_name {
                return self
                    .function
                    .inputs
                    .iter()
                    .filter_map(|input| {
                        let raw = selection.remove(&input.name)?;
                        Some((input.name.clone(), raw))
                    })
                    .collect();
            }
        }
        let mut entries: Vec<_> = selection.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| role_order(a, b));
        entries
    }

    fn shape(&self) -> Result<Shape, MappingError> {
        let mut types = parameter_types(&self.function)?;
        if types.len() == 1 {
            match types.remove(0) {
                DynSolType::FixedArray(inner, k) => return Ok(Shape::Fixed(*inner, k)),
                DynSolType::Array(inner) => {
                    let size = self.selection_size.ok_or_else(|| {
                        MappingError::Signature(format!(
                            "{} takes a dynamic array; set a selection size",
                            self.function.signature()
                        ))
                    })?;
                    return Ok(Shape::Dynamic(*inner, size));
                }
                scalar => types.push(scalar),
            }
        }
        if let Some(nested) = types.iter().find(|t| !is_scalar(t)) {
            return Err(MappingError::Signature(format!(
                "{} has non-scalar parameter {}",
                self.function.signature(),
                nested.sol_type_name()
            )));
        }
        Ok(Shape::Scalars(types))
    }
}

fn is_scalar(ty: &DynSolType) -> bool {
    !matches!(
        ty,
        DynSolType::Array(_) | DynSolType::FixedArray(..) | DynSolType::Tuple(_)
    )
}

/// Compares role names with digit runs read as numbers.
pub fn role_order(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (x_run, x_rest) = split_digits(a);
                let (y_run, y_rest) = split_digits(b);
                let x_num = x_run.trim_start_matches('0');
                let y_num = y_run.trim_start_matches('0');
                let ord = x_num
                    .len()
                    .cmp(&y_num.len())
                    .then_with(|| x_num.cmp(y_num))
                    .then_with(|| x_run.len().cmp(&y_run.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
                (a, b) = (x_rest, y_rest);
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                (a, b) = (&a[x.len_utf8()..], &b[y.len_utf8()..]);
            }
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn coerce(role: &str, raw: &Value, ty: &DynSolType) -> Result<DynSolValue, MappingError> {
    let mismatch = || MappingError::ValueType {
        role: role.to_string(),
        expected: ty.sol_type_name().into_owned(),
    };
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(fields) => match fields.get("address") {
            Some(Value::String(s)) => s.trim().to_string(),
            _ => return Err(mismatch()),
        },
        _ => return Err(mismatch()),
    };
    ty.coerce_str(&text).map_err(|_| mismatch())
}

/// Reads a role -> value mapping out of a mech payload.
///
/// Accepts a JSON object, or a string holding a JSON object or a Python dict
/// literal, possibly wrapped in prose or a code fence.
pub fn parse_selection(payload: &Value) -> Result<Map<String, Value>, MappingError> {
    match payload {
        Value::Object(map) => Ok(map.clone()),
        Value::String(text) => parse_text(text),
        other => Err(MappingError::Payload(format!(
            "expected a mapping, got {}",
            kind(other)
        ))),
    }
}

fn parse_text(text: &str) -> Result<Map<String, Value>, MappingError> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(MappingError::Payload("no mapping found in text".into())),
    };
    match parse_relaxed(&text[start..=end]).map_err(MappingError::Payload)? {
        Value::Object(map) => Ok(map),
        other => Err(MappingError::Payload(format!(
            "expected a mapping, got {}",
            kind(&other)
        ))),
    }
}

fn parse_relaxed(raw: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Ok(value),
        Err(primary_error) => json5::from_str::<Value>(raw)
            .or_else(|_| json5::from_str::<Value>(&python_keywords(raw)))
            .map_err(|_| primary_error.to_string()),
    }
}

/// Replaces Python's `True`, `False` and `None` outside string literals.
fn python_keywords(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut quote: Option<char> = None;
    let mut chars = src.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !next.is_ascii_alphanumeric() && next != '_' {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    _ => word.as_str(),
                });
            }
            other => out.push(other),
        }
    }
    out
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
