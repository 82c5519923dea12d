//! 内存后端的查询匹配、排序与投影
//!
//! 支持常用的比较运算符和逻辑运算符，字段名可以使用点号访问嵌套文档

use crate::error::QuickDocResult;
use bson::{Bson, Document};
use regex::Regex;
use std::cmp::Ordering;

/// 按点号路径读取字段
pub fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            Bson::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// 按点号路径写入字段，中间层不存在时创建空文档
pub fn set_path(document: &mut Document, path: &str, value: Bson) -> QuickDocResult<()> {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }
            match document.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, rest, value),
                _ => Err(crate::quick_error!(
                    query,
                    format!("无法在非文档字段 {} 上设置 {}", head, rest)
                )),
            }
        }
    }
}

/// 按点号路径删除字段
pub fn unset_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = document.get_mut(head) {
                unset_path(inner, rest);
            }
        }
    }
}

pub(crate) fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// 值相等，数值类型之间按数值比较
pub fn values_equal(left: &Bson, right: &Bson) -> bool {
    match (as_f64(left), as_f64(right)) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

/// 同类值之间的大小比较，类型不同返回 `None`
pub fn compare_values(left: &Bson, right: &Bson) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (as_f64(left), as_f64(right)) {
        return a.partial_cmp(&b);
    }
    match (left, right) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.cmp(b)),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 0,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
        Some(Bson::String(_)) | Some(Bson::Symbol(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::Binary(_)) => 5,
        Some(Bson::ObjectId(_)) => 6,
        Some(Bson::Boolean(_)) => 7,
        Some(Bson::DateTime(_)) => 8,
        Some(Bson::Timestamp(_)) => 9,
        Some(_) => 10,
    }
}

/// 排序用的全序比较：先按类型，再按值
pub fn sort_ordering(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    let by_type = type_rank(left).cmp(&type_rank(right));
    if by_type != Ordering::Equal {
        return by_type;
    }
    match (left, right) {
        (Some(a), Some(b)) => compare_values(a, b)
            .unwrap_or_else(|| a.to_string().cmp(&b.to_string())),
        _ => Ordering::Equal,
    }
}

/// 按排序键排序，方向为负数时降序
pub fn sort_documents(documents: &mut [Document], sort: &Document) {
    documents.sort_by(|a, b| {
        for (field, direction) in sort {
            let mut ordering = sort_ordering(lookup(a, field), lookup(b, field));
            if as_f64(direction).map(|d| d < 0.0).unwrap_or(false) {
                ordering = ordering.reverse();
            }
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Null => false,
        other => as_f64(other).map(|v| v != 0.0).unwrap_or(true),
    }
}

/// 应用投影
///
/// 包含式投影只保留列出的字段（`_id` 默认保留），排除式投影删除列出的字段
pub fn project(document: &Document, projection: &Document) -> QuickDocResult<Document> {
    if projection.is_empty() {
        return Ok(document.clone());
    }

    let inclusive = projection
        .iter()
        .filter(|(field, _)| field.as_str() != "_id")
        .any(|(_, value)| is_truthy(value));

    if inclusive {
        let mut projected = Document::new();
        let keep_id = projection.get("_id").map(is_truthy).unwrap_or(true);
        if keep_id {
            if let Some(id) = document.get("_id") {
                projected.insert("_id", id.clone());
            }
        }
        for (field, value) in projection {
            if field == "_id" || !is_truthy(value) {
                continue;
            }
            if let Some(found) = lookup(document, field) {
                set_path(&mut projected, field, found.clone())?;
            }
        }
        Ok(projected)
    } else {
        let mut projected = document.clone();
        for (field, value) in projection {
            if !is_truthy(value) {
                unset_path(&mut projected, field);
            }
        }
        Ok(projected)
    }
}

/// 判断文档是否满足过滤条件
pub fn matches(document: &Document, filter: &Document) -> QuickDocResult<bool> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !matches(document, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in clauses(key, condition)? {
                    if matches(document, clause)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "$nor" => {
                let mut none = true;
                for clause in clauses(key, condition)? {
                    if matches(document, clause)? {
                        none = false;
                        break;
                    }
                }
                none
            }
            op if op.starts_with('$') => {
                return Err(crate::quick_error!(query, format!("不支持的查询运算符: {}", op)));
            }
            field => field_matches(lookup(document, field), condition)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clauses<'a>(key: &str, condition: &'a Bson) -> QuickDocResult<Vec<&'a Document>> {
    match condition {
        Bson::Array(items) => items
            .iter()
            .map(|item| match item {
                Bson::Document(clause) => Ok(clause),
                _ => Err(crate::quick_error!(query, format!("{} 的元素必须是文档", key))),
            })
            .collect(),
        _ => Err(crate::quick_error!(query, format!("{} 需要数组参数", key))),
    }
}

fn is_operator_document(condition: &Bson) -> Option<&Document> {
    match condition {
        Bson::Document(inner) => {
            let is_operator = inner.keys().next().map(|k| k.starts_with('$')).unwrap_or(false);
            is_operator.then_some(inner)
        }
        _ => None,
    }
}

/// 数组字段与标量条件比较时，任一元素满足即可
fn equals_or_contains(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        None => matches!(expected, Bson::Null),
        Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(actual) => values_equal(actual, expected),
    }
}

fn compare_matches(value: Option<&Bson>, expected: &Bson, accept: fn(Ordering) -> bool) -> bool {
    match value {
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| compare_values(item, expected).map(accept).unwrap_or(false)),
        Some(actual) => compare_values(actual, expected).map(accept).unwrap_or(false),
        None => false,
    }
}

fn build_regex(pattern: &str, options: &str) -> QuickDocResult<Regex> {
    let flags: String = options
        .chars()
        .filter(|c| matches!(c, 'i' | 'm' | 's' | 'x'))
        .collect();
    let source = if flags.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{}){}", flags, pattern)
    };
    Regex::new(&source).map_err(|e| crate::quick_error!(query, format!("无效的正则表达式: {}", e)))
}

fn regex_matches(value: Option<&Bson>, regex: &Regex) -> bool {
    match value {
        Some(Bson::String(s)) => regex.is_match(s),
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Bson::String(s) if regex.is_match(s))),
        _ => false,
    }
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> QuickDocResult<bool> {
    if let Bson::RegularExpression(expression) = condition {
        let regex = build_regex(&expression.pattern, &expression.options)?;
        return Ok(regex_matches(value, &regex));
    }

    let operators = match is_operator_document(condition) {
        Some(operators) => operators,
        None => return Ok(equals_or_contains(value, condition)),
    };

    for (operator, argument) in operators {
        let matched = match operator.as_str() {
            "$eq" => equals_or_contains(value, argument),
            "$ne" => !equals_or_contains(value, argument),
            "$gt" => compare_matches(value, argument, |o| o == Ordering::Greater),
            "$gte" => compare_matches(value, argument, |o| o != Ordering::Less),
            "$lt" => compare_matches(value, argument, |o| o == Ordering::Less),
            "$lte" => compare_matches(value, argument, |o| o != Ordering::Greater),
            "$in" => in_list(value, operator, argument)?,
            "$nin" => !in_list(value, operator, argument)?,
            "$exists" => value.is_some() == is_truthy(argument),
            "$regex" => {
                let options = operators.get_str("$options").unwrap_or_default();
                let regex = match argument {
                    Bson::String(pattern) => build_regex(pattern, options)?,
                    Bson::RegularExpression(expression) => {
                        build_regex(&expression.pattern, &expression.options)?
                    }
                    _ => return Err(crate::quick_error!(query, "$regex 需要字符串参数")),
                };
                regex_matches(value, &regex)
            }
            "$options" => true,
            "$not" => !field_matches(value, argument)?,
            other => {
                return Err(crate::quick_error!(query, format!("不支持的查询运算符: {}", other)));
            }
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn in_list(value: Option<&Bson>, operator: &str, argument: &Bson) -> QuickDocResult<bool> {
    match argument {
        Bson::Array(candidates) => Ok(candidates
            .iter()
            .any(|candidate| equals_or_contains(value, candidate))),
        _ => Err(crate::quick_error!(query, format!("{} 需要数组参数", operator))),
    }
}
