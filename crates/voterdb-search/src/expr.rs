//! Typed WHERE-clause and scoring expressions.
//!
//! Every expression renders to Postgres SQL (with named parameters turned
//! into `$n` placeholders by [`SqlWriter`]) and evaluates against an
//! in-memory [`Row`] with the same semantics. A NULL column never matches
//! and contributes no score.

use std::collections::HashMap;

use voterdb_core::error::Result;

use crate::like::ilike;
use crate::params::{ParamKey, Params};
use crate::similarity::{is_similar, similarity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    RelationName,
    EpicNumber,
    PartNo,
    HouseNumber,
}

impl Field {
    pub const NAMES: [Field; 2] = [Field::FullName, Field::RelationName];

    fn column(self) -> &'static str {
        match self {
            Field::FullName => "v.full_name",
            Field::RelationName => "v.relation_name",
            Field::EpicNumber => "v.epic_number",
            Field::PartNo => "v.part_no::text",
            Field::HouseNumber => "v.house_number::text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    AtLeast,
    Exactly,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field % $param`
    Similar(Field, ParamKey),
    /// `similarity(field, $param) > threshold`
    SimilarityAbove(Field, ParamKey, f64),
    /// `field ILIKE $param`
    ILike(Field, ParamKey),
    EqualsIgnoreCase(Field, ParamKey),
    Equals(Field, ParamKey),
    /// The row's part number belongs to the ward bound to the parameter.
    InWard(ParamKey),
    Compare(Box<Score>, Cmp, f64),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Score {
    Const(f64),
    /// `COALESCE(similarity(field, $param), 0)`
    Similarity(Field, ParamKey),
    /// `CASE WHEN predicate THEN weight ELSE 0 END`
    When(Box<Predicate>, f64),
    Greatest(Vec<Score>),
    Sum(Vec<Score>),
}

impl Predicate {
    pub fn all(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::All(parts.into_iter().collect())
    }

    pub fn any(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Any(parts.into_iter().collect())
    }

    /// `predicate(full_name) OR predicate(relation_name)`
    pub fn either_name(build: impl Fn(Field) -> Predicate) -> Self {
        Predicate::any(Field::NAMES.map(build))
    }

    pub fn at_least(score: Score, threshold: f64) -> Self {
        Predicate::Compare(Box::new(score), Cmp::AtLeast, threshold)
    }

    pub fn exactly(score: Score, value: f64) -> Self {
        Predicate::Compare(Box::new(score), Cmp::Exactly, value)
    }

    pub fn uses_similarity(&self) -> bool {
        match self {
            Predicate::Similar(..) | Predicate::SimilarityAbove(..) => true,
            Predicate::Compare(score, ..) => score.uses_similarity(),
            Predicate::All(parts) | Predicate::Any(parts) => parts.iter().any(Predicate::uses_similarity),
            _ => false,
        }
    }

    pub fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        match self {
            Predicate::Similar(field, key) => {
                w.push(field.column());
                w.push(" % ");
                w.bind(*key)
            }
            Predicate::SimilarityAbove(field, key, threshold) => {
                w.push("similarity(");
                w.push(field.column());
                w.push(", ");
                w.bind(*key)?;
                w.push(") > ");
                w.push(&literal(*threshold));
                Ok(())
            }
            Predicate::ILike(field, key) => {
                w.push(field.column());
                w.push(" ILIKE ");
                w.bind(*key)
            }
            Predicate::EqualsIgnoreCase(field, key) => {
                w.push("UPPER(");
                w.push(field.column());
                w.push(") = UPPER(");
                w.bind(*key)?;
                w.push(")");
                Ok(())
            }
            Predicate::Equals(field, key) => {
                w.push(field.column());
                w.push(" = ");
                w.bind(*key)
            }
            Predicate::InWard(key) => {
                w.push("v.part_no IN (SELECT p.part_no FROM \"PartNo\" p WHERE p.ward_no::text = ");
                w.bind(*key)?;
                w.push(")");
                Ok(())
            }
            Predicate::Compare(score, cmp, value) => {
                w.push("(");
                score.render(w)?;
                w.push(match cmp {
                    Cmp::AtLeast => ") >= ",
                    Cmp::Exactly => ") = ",
                });
                w.push(&literal(*value));
                Ok(())
            }
            Predicate::All(parts) => render_joined(w, parts, " AND ", "TRUE"),
            Predicate::Any(parts) => render_joined(w, parts, " OR ", "FALSE"),
        }
    }

    pub fn eval<R: Row + ?Sized>(&self, row: &R, cx: &EvalContext<'_>) -> Result<bool> {
        Ok(match self {
            Predicate::Similar(field, key) => {
                let param = cx.params.get(*key)?;
                row.field(*field).is_some_and(|v| is_similar(v, param, cx.similarity_threshold))
            }
            Predicate::SimilarityAbove(field, key, threshold) => {
                let param = cx.params.get(*key)?;
                row.field(*field).is_some_and(|v| similarity(v, param) > *threshold)
            }
            Predicate::ILike(field, key) => {
                let param = cx.params.get(*key)?;
                row.field(*field).is_some_and(|v| ilike(v, param))
            }
            Predicate::EqualsIgnoreCase(field, key) => {
                let param = cx.params.get(*key)?;
                row.field(*field).is_some_and(|v| v.to_uppercase() == param.to_uppercase())
            }
            Predicate::Equals(field, key) => {
                let param = cx.params.get(*key)?;
                row.field(*field) == Some(param)
            }
            Predicate::InWard(key) => row.in_ward(cx.params.get(*key)?),
            Predicate::Compare(score, cmp, value) => {
                let actual = score.eval(row, cx)?;
                match cmp {
                    Cmp::AtLeast => actual >= *value,
                    Cmp::Exactly => (actual - value).abs() < 1e-9,
                }
            }
            Predicate::All(parts) => {
                for part in parts {
                    if !part.eval(row, cx)? {
                        return Ok(false);
                    }
                }
                true
            }
            Predicate::Any(parts) => {
                for part in parts {
                    if part.eval(row, cx)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }
}

impl Score {
    pub fn when(predicate: Predicate, weight: f64) -> Self {
        Score::When(Box::new(predicate), weight)
    }

    /// Number of predicates that hold.
    pub fn count(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Score::Sum(predicates.into_iter().map(|p| Score::when(p, 1.0)).collect())
    }

    pub fn uses_similarity(&self) -> bool {
        match self {
            Score::Const(_) => false,
            Score::Similarity(..) => true,
            Score::When(predicate, _) => predicate.uses_similarity(),
            Score::Greatest(parts) | Score::Sum(parts) => parts.iter().any(Score::uses_similarity),
        }
    }

    pub fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        match self {
            Score::Const(value) => {
                w.push(&literal(*value));
                Ok(())
            }
            Score::Similarity(field, key) => {
                w.push("COALESCE(similarity(");
                w.push(field.column());
                w.push(", ");
                w.bind(*key)?;
                w.push("), 0)");
                Ok(())
            }
            Score::When(predicate, weight) => {
                w.push("CASE WHEN ");
                predicate.render(w)?;
                w.push(" THEN ");
                w.push(&literal(*weight));
                w.push(" ELSE 0 END");
                Ok(())
            }
            Score::Greatest(parts) => match parts.as_slice() {
                [] => {
                    w.push("0");
                    Ok(())
                }
                [only] => only.render(w),
                _ => {
                    w.push("GREATEST(");
                    for (i, part) in parts.iter().enumerate() {
                        if i > 0 {
                            w.push(", ");
                        }
                        part.render(w)?;
                    }
                    w.push(")");
                    Ok(())
                }
            },
            Score::Sum(parts) => {
                if parts.is_empty() {
                    w.push("0");
                    return Ok(());
                }
                w.push("(");
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        w.push(" + ");
                    }
                    part.render(w)?;
                }
                w.push(")");
                Ok(())
            }
        }
    }

    pub fn eval<R: Row + ?Sized>(&self, row: &R, cx: &EvalContext<'_>) -> Result<f64> {
        Ok(match self {
            Score::Const(value) => *value,
            Score::Similarity(field, key) => {
                let param = cx.params.get(*key)?;
                row.field(*field).map_or(0.0, |v| similarity(v, param))
            }
            Score::When(predicate, weight) => {
                if predicate.eval(row, cx)? {
                    *weight
                } else {
                    0.0
                }
            }
            Score::Greatest(parts) => {
                let mut best = if parts.is_empty() { 0.0 } else { f64::MIN };
                for part in parts {
                    best = best.max(part.eval(row, cx)?);
                }
                best
            }
            Score::Sum(parts) => {
                let mut total = 0.0;
                for part in parts {
                    total += part.eval(row, cx)?;
                }
                total
            }
        })
    }
}

fn render_joined(w: &mut SqlWriter<'_>, parts: &[Predicate], op: &str, empty: &str) -> Result<()> {
    if parts.is_empty() {
        w.push(empty);
        return Ok(());
    }
    w.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            w.push(op);
        }
        part.render(w)?;
    }
    w.push(")");
    Ok(())
}

fn literal(value: f64) -> String {
    format!("{}", value)
}

/// Column access for in-memory evaluation.
pub trait Row {
    fn field(&self, field: Field) -> Option<&str>;
    fn in_ward(&self, ward: &str) -> bool;
}

pub struct EvalContext<'a> {
    pub params: &'a Params,
    /// Threshold of the `%` operator.
    pub similarity_threshold: f64,
}

/// SQL text plus its positional bind values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSql {
    pub sql: String,
    pub binds: Vec<String>,
}

/// Accumulates SQL text and assigns `$n` placeholders in first-use order.
/// A parameter used several times shares one placeholder.
pub struct SqlWriter<'p> {
    params: &'p Params,
    sql: String,
    slots: HashMap<ParamKey, usize>,
    binds: Vec<String>,
}

impl<'p> SqlWriter<'p> {
    pub fn new(params: &'p Params) -> Self {
        Self { params, sql: String::new(), slots: HashMap::new(), binds: Vec::new() }
    }

    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    pub fn bind(&mut self, key: ParamKey) -> Result<()> {
        let slot = match self.slots.get(&key) {
            Some(slot) => *slot,
            None => {
                self.binds.push(self.params.get(key)?.to_string());
                let slot = self.binds.len();
                self.slots.insert(key, slot);
                slot
            }
        };
        self.sql.push('$');
        self.sql.push_str(&slot.to_string());
        Ok(())
    }

    pub fn finish(self) -> RenderedSql {
        RenderedSql { sql: self.sql, binds: self.binds }
    }
}
